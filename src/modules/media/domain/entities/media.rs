use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::modules::media::domain::value_objects::MediaStatus;
use crate::shared::domain::{MediaType, ProviderId};

/// Catalog entry as reported by one provider.
///
/// Snapshots are immutable once mapped; enrichment produces a new value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaEntity {
    /// Provider-scoped identifier
    pub id: String,
    pub title: String,
    /// Romanised, native and English titles plus synonyms
    #[serde(default)]
    pub alternative_titles: Vec<String>,
    #[serde(rename = "type")]
    pub media_type: MediaType,
    pub source_id: ProviderId,
    pub source_name: String,
    pub cover_image: Option<String>,
    pub banner_image: Option<String>,
    pub total_episodes: Option<u32>,
    pub total_chapters: Option<u32>,
    pub start_date: Option<NaiveDate>,
    #[serde(default)]
    pub status: MediaStatus,
    pub rating: Option<f64>,
    #[serde(default)]
    pub genres: Vec<String>,
}

impl MediaEntity {
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        media_type: MediaType,
        source_id: ProviderId,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            alternative_titles: Vec::new(),
            media_type,
            source_id,
            source_name: source_id.display_name().to_string(),
            cover_image: None,
            banner_image: None,
            total_episodes: None,
            total_chapters: None,
            start_date: None,
            status: MediaStatus::Unknown,
            rating: None,
            genres: Vec::new(),
        }
    }

    pub fn year(&self) -> Option<i32> {
        self.start_date.map(|date| date.year())
    }

    /// Main title followed by every distinct alternative title
    pub fn all_titles(&self) -> Vec<&str> {
        let mut titles = vec![self.title.as_str()];
        for alt in &self.alternative_titles {
            let alt = alt.trim();
            if !alt.is_empty() && !titles.iter().any(|t| t.eq_ignore_ascii_case(alt)) {
                titles.push(alt);
            }
        }
        titles
    }

    pub fn has_artwork(&self) -> bool {
        self.cover_image.is_some() && self.banner_image.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_year_comes_from_start_date() {
        let mut media = MediaEntity::new("20", "Naruto", MediaType::Anime, ProviderId::AniList);
        assert_eq!(media.year(), None);

        media.start_date = NaiveDate::from_ymd_opt(2002, 10, 3);
        assert_eq!(media.year(), Some(2002));
    }

    #[test]
    fn test_all_titles_skips_duplicates_and_blanks() {
        let mut media = MediaEntity::new("1", "Naruto", MediaType::Anime, ProviderId::Kitsu);
        media.alternative_titles = vec![
            "NARUTO".to_string(),
            " ".to_string(),
            "ナルト".to_string(),
        ];

        assert_eq!(media.all_titles(), vec!["Naruto", "ナルト"]);
    }

    #[test]
    fn test_serializes_type_field() {
        let media = MediaEntity::new("1", "Berserk", MediaType::Manga, ProviderId::Kitsu);
        let json = serde_json::to_value(&media).unwrap();
        assert_eq!(json["type"], "manga");
        assert_eq!(json["sourceId"], "kitsu");
        assert_eq!(json["sourceName"], "Kitsu");
    }
}
