use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::shared::errors::AppError;

/// Supported metadata catalogs
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ProviderId {
    /// AniList GraphQL API
    #[serde(rename = "anilist")]
    AniList,
    /// Kitsu JSON:API, the only catalog with chapter-level data
    #[serde(rename = "kitsu")]
    Kitsu,
    /// Jikan (MyAnimeList API)
    #[serde(rename = "jikan", alias = "mal", alias = "myanimelist")]
    Jikan,
    /// TMDB for movies and TV
    #[serde(rename = "tmdb")]
    Tmdb,
    /// Simkl
    #[serde(rename = "simkl")]
    Simkl,
}

impl ProviderId {
    pub const ALL: [ProviderId; 5] = [
        ProviderId::AniList,
        ProviderId::Kitsu,
        ProviderId::Jikan,
        ProviderId::Tmdb,
        ProviderId::Simkl,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderId::AniList => "anilist",
            ProviderId::Kitsu => "kitsu",
            ProviderId::Jikan => "jikan",
            ProviderId::Tmdb => "tmdb",
            ProviderId::Simkl => "simkl",
        }
    }

    /// Human readable catalog name
    pub fn display_name(&self) -> &'static str {
        match self {
            ProviderId::AniList => "AniList",
            ProviderId::Kitsu => "Kitsu",
            ProviderId::Jikan => "MyAnimeList",
            ProviderId::Tmdb => "TMDB",
            ProviderId::Simkl => "Simkl",
        }
    }
}

impl fmt::Display for ProviderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ProviderId {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "anilist" => Ok(ProviderId::AniList),
            "kitsu" => Ok(ProviderId::Kitsu),
            // MAL ids are served through Jikan
            "jikan" | "mal" | "myanimelist" => Ok(ProviderId::Jikan),
            "tmdb" => Ok(ProviderId::Tmdb),
            "simkl" => Ok(ProviderId::Simkl),
            other => Err(AppError::InvalidInput(format!("Unknown provider: {}", other))),
        }
    }
}
