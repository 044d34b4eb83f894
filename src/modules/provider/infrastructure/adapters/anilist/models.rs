//! AniList GraphQL models

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AniListMediaType {
    Anime,
    Manga,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MediaFormat {
    Tv,
    TvShort,
    Movie,
    Special,
    Ova,
    Ona,
    Music,
    Manga,
    Novel,
    OneShot,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct FuzzyDate {
    pub year: Option<i32>,
    pub month: Option<u32>,
    pub day: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct Media {
    pub id: Option<i64>,
    pub id_mal: Option<i64>,
    #[serde(rename = "type")]
    pub media_type: Option<AniListMediaType>,
    pub format: Option<MediaFormat>,
    /// Kept as text; mapped through the shared status vocabulary
    pub status: Option<String>,
    pub title: Option<MediaTitle>,
    #[serde(default)]
    pub synonyms: Option<Vec<String>>,
    pub episodes: Option<i64>,
    pub chapters: Option<i64>,
    pub duration: Option<i64>,
    pub genres: Option<Vec<String>>,
    pub average_score: Option<i64>,
    pub start_date: Option<FuzzyDate>,
    pub cover_image: Option<MediaCoverImage>,
    pub banner_image: Option<String>,
    pub description: Option<String>,
    pub characters: Option<CharacterConnection>,
    pub staff: Option<StaffConnection>,
    pub reviews: Option<ReviewConnection>,
    pub streaming_episodes: Option<Vec<MediaStreamingEpisode>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct MediaTitle {
    pub romaji: Option<String>,
    pub english: Option<String>,
    pub native: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct MediaCoverImage {
    pub extra_large: Option<String>,
    pub large: Option<String>,
    pub medium: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct MediaStreamingEpisode {
    pub title: Option<String>,
    pub thumbnail: Option<String>,
    pub url: Option<String>,
    pub site: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct CharacterConnection {
    #[serde(default)]
    pub edges: Vec<CharacterEdge>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct CharacterEdge {
    pub role: Option<String>,
    pub node: Option<PersonNode>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct StaffConnection {
    #[serde(default)]
    pub edges: Vec<StaffEdge>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct StaffEdge {
    pub role: Option<String>,
    pub node: Option<PersonNode>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct PersonNode {
    pub name: Option<PersonName>,
    pub image: Option<PersonImage>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct PersonName {
    pub full: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct PersonImage {
    pub large: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct ReviewConnection {
    #[serde(default)]
    pub nodes: Vec<ReviewNode>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct ReviewNode {
    pub summary: Option<String>,
    pub score: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    pub total: Option<i64>,
    pub per_page: Option<i64>,
    pub current_page: Option<i64>,
    pub last_page: Option<i64>,
    pub has_next_page: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct Page {
    #[serde(default)]
    pub media: Vec<Media>,
    pub page_info: Option<PageInfo>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AniListPageResponse {
    #[serde(rename = "Page")]
    pub page: Page,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AniListMediaResponse {
    #[serde(rename = "Media")]
    pub media: Option<Media>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AniListError {
    pub message: String,
    pub status: Option<u16>,
}
