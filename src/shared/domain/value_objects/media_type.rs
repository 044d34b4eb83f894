use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::shared::errors::AppError;

/// Kind of media a catalog entry describes
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub enum MediaType {
    Anime,
    Manga,
    Novel,
    Movie,
    TvShow,
    Cartoon,
    Documentary,
    Livestream,
    Nsfw,
}

impl MediaType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaType::Anime => "anime",
            MediaType::Manga => "manga",
            MediaType::Novel => "novel",
            MediaType::Movie => "movie",
            MediaType::TvShow => "tvShow",
            MediaType::Cartoon => "cartoon",
            MediaType::Documentary => "documentary",
            MediaType::Livestream => "livestream",
            MediaType::Nsfw => "nsfw",
        }
    }

    /// Media read page by page rather than watched
    pub fn is_readable(&self) -> bool {
        matches!(self, MediaType::Manga | MediaType::Novel)
    }

    /// Whether a candidate of type `other` can plausibly describe the same title.
    ///
    /// Catalogs disagree on classification (TMDB files anime under TV, AniList
    /// files anime films under anime), so compatibility is grouped rather than exact.
    pub fn is_compatible_with(&self, other: MediaType) -> bool {
        use MediaType::*;

        if *self == other {
            return true;
        }

        matches!(
            (*self, other),
            (Anime, TvShow | Cartoon | Movie | Nsfw)
                | (TvShow | Cartoon | Movie | Nsfw, Anime)
                | (TvShow, Cartoon | Documentary)
                | (Cartoon | Documentary, TvShow)
                | (Manga, Novel)
                | (Novel, Manga)
        )
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for MediaType {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "anime" => Ok(MediaType::Anime),
            "manga" => Ok(MediaType::Manga),
            "novel" => Ok(MediaType::Novel),
            "movie" => Ok(MediaType::Movie),
            "tvshow" | "tv" => Ok(MediaType::TvShow),
            "cartoon" => Ok(MediaType::Cartoon),
            "documentary" => Ok(MediaType::Documentary),
            "livestream" => Ok(MediaType::Livestream),
            "nsfw" => Ok(MediaType::Nsfw),
            other => Err(AppError::InvalidInput(format!("Unknown media type: {}", other))),
        }
    }
}
