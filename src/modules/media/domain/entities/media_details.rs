use serde::{Deserialize, Serialize};

use super::MediaEntity;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CharacterEntity {
    pub name: String,
    pub role: String,
    pub image: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StaffEntity {
    pub name: String,
    pub role: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewEntity {
    pub summary: String,
    pub score: Option<f64>,
}

/// Full record for a details page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaDetailsEntity {
    #[serde(flatten)]
    pub media: MediaEntity,
    pub description: Option<String>,
    #[serde(default)]
    pub characters: Vec<CharacterEntity>,
    #[serde(default)]
    pub staff: Vec<StaffEntity>,
    #[serde(default)]
    pub reviews: Vec<ReviewEntity>,
}

impl MediaDetailsEntity {
    pub fn from_media(media: MediaEntity) -> Self {
        Self {
            media,
            description: None,
            characters: Vec::new(),
            staff: Vec::new(),
            reviews: Vec::new(),
        }
    }

    pub fn needs_artwork(&self) -> bool {
        !self.media.has_artwork()
    }

    /// Fill missing cover/banner from `other`. Populated fields are never overwritten.
    ///
    /// Returns true if anything was filled.
    pub fn backfill_artwork(&mut self, other: &MediaEntity) -> bool {
        let mut filled = false;

        if self.media.banner_image.is_none() {
            if let Some(banner) = &other.banner_image {
                self.media.banner_image = Some(banner.clone());
                filled = true;
            }
        }

        if self.media.cover_image.is_none() {
            if let Some(cover) = &other.cover_image {
                self.media.cover_image = Some(cover.clone());
                filled = true;
            }
        }

        filled
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::domain::{MediaType, ProviderId};

    #[test]
    fn test_backfill_never_overwrites() {
        let mut primary = MediaEntity::new("1", "Naruto", MediaType::Anime, ProviderId::Jikan);
        primary.cover_image = Some("mal-cover".to_string());
        let mut details = MediaDetailsEntity::from_media(primary);

        let mut other = MediaEntity::new("2", "Naruto", MediaType::TvShow, ProviderId::Tmdb);
        other.cover_image = Some("tmdb-cover".to_string());
        other.banner_image = Some("tmdb-banner".to_string());

        assert!(details.backfill_artwork(&other));
        assert_eq!(details.media.cover_image.as_deref(), Some("mal-cover"));
        assert_eq!(details.media.banner_image.as_deref(), Some("tmdb-banner"));
        assert!(!details.needs_artwork());
        assert!(!details.backfill_artwork(&other));
    }
}
