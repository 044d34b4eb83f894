use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::shared::domain::ProviderId;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChapterEntity {
    pub id: String,
    pub media_id: String,
    /// Fractional for extra chapters such as 10.5
    pub number: f64,
    pub title: String,
    pub thumbnail: Option<String>,
    pub release_date: Option<NaiveDate>,
    pub source_provider: ProviderId,
    #[serde(default)]
    pub is_placeholder: bool,
}

impl ChapterEntity {
    pub fn new(media_id: &str, number: f64, title: impl Into<String>, source: ProviderId) -> Self {
        Self {
            id: format!("{}-{}-{}", source, media_id, number),
            media_id: media_id.to_string(),
            number,
            title: title.into(),
            thumbnail: None,
            release_date: None,
            source_provider: source,
            is_placeholder: false,
        }
    }

    /// Numbered stand-in when only the chapter count is known
    pub fn placeholder(media_id: &str, number: u32, source: ProviderId) -> Self {
        Self {
            is_placeholder: true,
            ..Self::new(media_id, number as f64, format!("Chapter {}", number), source)
        }
    }

    pub fn placeholders(media_id: &str, total: u32, source: ProviderId) -> Vec<Self> {
        (1..=total)
            .map(|number| Self::placeholder(media_id, number, source))
            .collect()
    }
}
