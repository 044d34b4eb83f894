use serde::{Deserialize, Serialize};
use std::fmt;

/// Publication status, normalised across catalog vocabularies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum MediaStatus {
    Releasing,
    Finished,
    NotYetReleased,
    Cancelled,
    Hiatus,
    #[default]
    Unknown,
}

impl MediaStatus {
    pub fn display_name(&self) -> &'static str {
        match self {
            MediaStatus::Releasing => "Releasing",
            MediaStatus::Finished => "Finished",
            MediaStatus::NotYetReleased => "Not Yet Released",
            MediaStatus::Cancelled => "Cancelled",
            MediaStatus::Hiatus => "On Hiatus",
            MediaStatus::Unknown => "Unknown",
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, MediaStatus::Unknown)
    }
}

impl fmt::Display for MediaStatus {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

impl From<&str> for MediaStatus {
    fn from(s: &str) -> Self {
        match s.trim().to_lowercase().replace('_', " ").as_str() {
            "releasing" | "currently airing" | "airing" | "current" | "publishing"
            | "ongoing" | "returning series" | "in production" => MediaStatus::Releasing,
            "finished" | "finished airing" | "ended" | "released" | "completed" => {
                MediaStatus::Finished
            }
            "not yet released" | "not yet aired" | "tba" | "unreleased" | "upcoming"
            | "planned" => MediaStatus::NotYetReleased,
            "cancelled" | "canceled" | "discontinued" => MediaStatus::Cancelled,
            "hiatus" | "on hiatus" => MediaStatus::Hiatus,
            _ => MediaStatus::Unknown,
        }
    }
}

impl From<String> for MediaStatus {
    fn from(s: String) -> Self {
        s.as_str().into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_vocabularies() {
        assert_eq!(MediaStatus::from("RELEASING"), MediaStatus::Releasing);
        assert_eq!(MediaStatus::from("Currently Airing"), MediaStatus::Releasing);
        assert_eq!(MediaStatus::from("NOT_YET_RELEASED"), MediaStatus::NotYetReleased);
        assert_eq!(MediaStatus::from("Returning Series"), MediaStatus::Releasing);
        assert_eq!(MediaStatus::from("Canceled"), MediaStatus::Cancelled);
        assert_eq!(MediaStatus::from("On Hiatus"), MediaStatus::Hiatus);
        assert_eq!(MediaStatus::from("something else"), MediaStatus::Unknown);
    }
}
