use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::shared::domain::ProviderId;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EpisodeEntity {
    pub id: String,
    pub media_id: String,
    pub number: u32,
    pub season_number: Option<u32>,
    pub title: String,
    pub thumbnail: Option<String>,
    pub release_date: Option<NaiveDate>,
    /// Minutes
    pub duration: Option<u32>,
    pub source_provider: ProviderId,
    #[serde(default)]
    pub is_placeholder: bool,
}

impl EpisodeEntity {
    pub fn new(media_id: &str, number: u32, title: impl Into<String>, source: ProviderId) -> Self {
        Self {
            id: format!("{}-{}-{}", source, media_id, number),
            media_id: media_id.to_string(),
            number,
            season_number: None,
            title: title.into(),
            thumbnail: None,
            release_date: None,
            duration: None,
            source_provider: source,
            is_placeholder: false,
        }
    }

    /// Numbered stand-in when only the episode count is known
    pub fn placeholder(media_id: &str, number: u32, source: ProviderId) -> Self {
        Self {
            is_placeholder: true,
            ..Self::new(media_id, number, format!("Episode {}", number), source)
        }
    }
}
