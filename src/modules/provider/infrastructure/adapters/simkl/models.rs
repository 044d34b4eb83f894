// Simkl API models
// https://simkl.docs.apiary.io/

use serde::{Deserialize, Serialize};

/// Poster and fanart paths are relative to the image CDN
pub const IMAGE_BASE_URL: &str = "https://wsrv.nl/?url=https://simkl.in";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct SimklIds {
    #[serde(default)]
    pub simkl: Option<u64>,
    #[serde(default)]
    pub simkl_id: Option<u64>,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub mal: Option<String>,
    #[serde(default)]
    pub anilist: Option<String>,
    #[serde(default)]
    pub kitsu: Option<String>,
    #[serde(default)]
    pub tmdb: Option<String>,
}

impl SimklIds {
    pub fn id(&self) -> Option<u64> {
        self.simkl.or(self.simkl_id)
    }
}

/// Row of `/search/{type}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct SimklSearchItem {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub title_en: Option<String>,
    #[serde(default)]
    pub title_romaji: Option<String>,
    #[serde(default)]
    pub year: Option<i32>,
    #[serde(default)]
    pub poster: Option<String>,
    #[serde(default)]
    pub ids: SimklIds,
    /// "anime", "tv" or "movie"
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub ep_count: Option<i64>,
    #[serde(default)]
    pub anime_type: Option<String>,
}

/// `/anime/{id}`, `/tv/{id}` and `/movies/{id}` with `extended=full`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct SimklDetails {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub en_title: Option<String>,
    #[serde(default)]
    pub year: Option<i32>,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub ids: SimklIds,
    #[serde(default)]
    pub poster: Option<String>,
    #[serde(default)]
    pub fanart: Option<String>,
    #[serde(default)]
    pub first_aired: Option<String>,
    #[serde(default)]
    pub overview: Option<String>,
    #[serde(default)]
    pub genres: Vec<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub total_episodes: Option<i64>,
    #[serde(default)]
    pub runtime: Option<i64>,
    #[serde(default)]
    pub ratings: Option<SimklRatings>,
    #[serde(default)]
    pub alt_titles: Vec<AltTitle>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct SimklRatings {
    #[serde(default)]
    pub simkl: Option<SimklRating>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct SimklRating {
    #[serde(default)]
    pub rating: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AltTitle {
    pub name: String,
}

/// Row of `/anime/episodes/{id}` and `/tv/episodes/{id}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct SimklEpisode {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub season: Option<i64>,
    #[serde(default)]
    pub episode: Option<i64>,
    /// "episode" or "special"
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub aired: Option<bool>,
    #[serde(default)]
    pub img: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
}

impl SimklEpisode {
    pub fn is_special(&self) -> bool {
        self.kind.as_deref() == Some("special")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_item() {
        let json = r#"[{"title": "Naruto", "year": 2002, "type": "anime", "poster": "74/74415",
                        "ids": {"simkl_id": 38337, "slug": "naruto"}, "ep_count": 220}]"#;

        let items: Vec<SimklSearchItem> = serde_json::from_str(json).unwrap();
        assert_eq!(items[0].ids.id(), Some(38337));
        assert_eq!(items[0].kind.as_deref(), Some("anime"));
    }

    #[test]
    fn test_special_episode() {
        let json = r#"{"title": "Recap", "episode": 1, "type": "special"}"#;
        let episode: SimklEpisode = serde_json::from_str(json).unwrap();
        assert!(episode.is_special());
    }
}
