use std::fmt;

use crate::modules::matching::domain::services::title_normalizer::normalize_title;
use crate::modules::matching::domain::services::confidence::TitleFacts;
use crate::modules::media::MediaEntity;
use crate::shared::domain::{MediaType, ProviderId};

/// Everything the matcher needs to know about the title being matched
#[derive(Debug, Clone, PartialEq)]
pub struct MatchQuery {
    pub title: String,
    pub alternative_titles: Vec<String>,
    pub media_type: MediaType,
    pub year: Option<i32>,
    pub total_episodes: Option<u32>,
    pub primary_source: ProviderId,
}

impl MatchQuery {
    pub fn new(title: impl Into<String>, media_type: MediaType, primary_source: ProviderId) -> Self {
        Self {
            title: title.into(),
            alternative_titles: Vec::new(),
            media_type,
            year: None,
            total_episodes: None,
            primary_source,
        }
    }

    pub fn from_media(media: &MediaEntity) -> Self {
        Self {
            title: media.title.clone(),
            alternative_titles: media.alternative_titles.clone(),
            media_type: media.media_type,
            year: media.year(),
            total_episodes: media.total_episodes,
            primary_source: media.source_id,
        }
    }

    pub fn with_year(mut self, year: Option<i32>) -> Self {
        self.year = year;
        self
    }

    pub fn with_alternative_titles(mut self, titles: Vec<String>) -> Self {
        self.alternative_titles = titles;
        self
    }

    pub fn with_total_episodes(mut self, total: Option<u32>) -> Self {
        self.total_episodes = total;
        self
    }

    pub fn cache_key(&self) -> MatchCacheKey {
        MatchCacheKey::new(&self.title, self.media_type, self.primary_source, self.year)
    }

    pub fn facts(&self) -> TitleFacts<'_> {
        TitleFacts::new(&self.title, self.media_type)
            .with_alternative_titles(&self.alternative_titles)
            .with_year(self.year)
            .with_total_episodes(self.total_episodes)
    }
}

/// Match cache key: normalized title, type, primary catalog and optional year
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MatchCacheKey(String);

impl MatchCacheKey {
    pub fn new(title: &str, media_type: MediaType, primary_source: ProviderId, year: Option<i32>) -> Self {
        let year = year.map(|y| y.to_string()).unwrap_or_default();
        Self(format!(
            "{}|{}|{}|{}",
            normalize_title(title),
            media_type,
            primary_source,
            year
        ))
    }

    /// Keys for the title at the given year and its neighbours, plus the yearless key
    pub fn year_variants(
        title: &str,
        media_type: MediaType,
        primary_source: ProviderId,
        year: Option<i32>,
    ) -> Vec<Self> {
        let mut keys = vec![Self::new(title, media_type, primary_source, None)];
        if let Some(year) = year {
            for y in [year, year - 1, year + 1] {
                keys.push(Self::new(title, media_type, primary_source, Some(y)));
            }
        }
        keys
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MatchCacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<MatchCacheKey> for String {
    fn from(key: MatchCacheKey) -> Self {
        key.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_key_normalizes_title() {
        let a = MatchCacheKey::new("NARUTO!", MediaType::Anime, ProviderId::Jikan, Some(2002));
        let b = MatchCacheKey::new("naruto", MediaType::Anime, ProviderId::Jikan, Some(2002));
        assert_eq!(a, b);
        assert_eq!(a.as_str(), "naruto|anime|jikan|2002");
    }

    #[test]
    fn test_key_distinguishes_type_source_and_year() {
        let base = MatchCacheKey::new("Berserk", MediaType::Anime, ProviderId::AniList, None);
        assert_ne!(base, MatchCacheKey::new("Berserk", MediaType::Manga, ProviderId::AniList, None));
        assert_ne!(base, MatchCacheKey::new("Berserk", MediaType::Anime, ProviderId::Kitsu, None));
        assert_ne!(base, MatchCacheKey::new("Berserk", MediaType::Anime, ProviderId::AniList, Some(1997)));
    }

    #[test]
    fn test_year_variants() {
        let keys = MatchCacheKey::year_variants("Naruto", MediaType::Anime, ProviderId::Jikan, Some(2002));
        let keys: Vec<&str> = keys.iter().map(MatchCacheKey::as_str).collect();
        assert_eq!(
            keys,
            vec![
                "naruto|anime|jikan|",
                "naruto|anime|jikan|2002",
                "naruto|anime|jikan|2001",
                "naruto|anime|jikan|2003",
            ]
        );

        assert_eq!(
            MatchCacheKey::year_variants("Naruto", MediaType::Anime, ProviderId::Jikan, None).len(),
            1
        );
    }

    #[test]
    fn test_query_from_media() {
        let mut media = MediaEntity::new("20", "Naruto", MediaType::Anime, ProviderId::Jikan);
        media.start_date = NaiveDate::from_ymd_opt(2002, 10, 3);
        media.total_episodes = Some(220);

        let query = MatchQuery::from_media(&media);
        assert_eq!(query.year, Some(2002));
        assert_eq!(query.primary_source, ProviderId::Jikan);
        assert_eq!(query.cache_key().as_str(), "naruto|anime|jikan|2002");
    }
}
