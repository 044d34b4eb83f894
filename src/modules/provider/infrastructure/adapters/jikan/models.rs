// Jikan v4 API models
// https://docs.api.jikan.moe/

use serde::{Deserialize, Serialize};

// Response envelopes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JikanItem<T> {
    pub data: T,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JikanList<T> {
    pub data: Vec<T>,
    #[serde(default)]
    pub pagination: Option<Pagination>,
}

impl<T> JikanList<T> {
    pub fn has_next_page(&self) -> bool {
        self.pagination
            .as_ref()
            .map(|p| p.has_next_page)
            .unwrap_or(false)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pagination {
    #[serde(default)]
    pub last_visible_page: u32,
    #[serde(default)]
    pub has_next_page: bool,
    #[serde(default)]
    pub items: Option<PaginationItems>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaginationItems {
    pub count: u32,
    pub total: u32,
    pub per_page: u32,
}

pub type MalId = u32;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MalEntity {
    pub mal_id: MalId,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MalEntityWithImages {
    pub mal_id: MalId,
    #[serde(default)]
    pub images: Option<Images>,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Images {
    #[serde(default)]
    pub jpg: Option<ImageUrls>,
    #[serde(default)]
    pub webp: Option<ImageUrls>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ImageUrls {
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub small_image_url: Option<String>,
    #[serde(default)]
    pub large_image_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TitleEntry {
    pub r#type: String, // "Default", "English", "Japanese", "Synonym"
    pub title: String,
}

/// `aired` for anime, `published` for manga
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct DateRange {
    #[serde(default)]
    pub from: Option<String>, // ISO8601 UTC
    #[serde(default)]
    pub to: Option<String>,
}

/// Anime and manga entries share one shape; unused fields stay `None`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct JikanMedia {
    pub mal_id: MalId,
    #[serde(default)]
    pub images: Option<Images>,
    #[serde(default)]
    pub titles: Option<Vec<TitleEntry>>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub title_english: Option<String>,
    #[serde(default)]
    pub title_japanese: Option<String>,
    #[serde(default)]
    pub title_synonyms: Option<Vec<String>>,
    /// "TV", "Movie", "Manga", "Light Novel", ...
    #[serde(default)]
    pub r#type: Option<String>,
    #[serde(default)]
    pub episodes: Option<i64>,
    #[serde(default)]
    pub chapters: Option<i64>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub aired: Option<DateRange>,
    #[serde(default)]
    pub published: Option<DateRange>,
    #[serde(default)]
    pub year: Option<i32>,
    #[serde(default)]
    pub score: Option<f64>,
    #[serde(default)]
    pub synopsis: Option<String>,
    #[serde(default)]
    pub genres: Option<Vec<MalEntity>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CharacterEdge {
    pub character: MalEntityWithImages,
    pub role: String, // Main / Supporting
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StaffEdge {
    pub person: MalEntityWithImages,
    #[serde(default)]
    pub positions: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Review {
    #[serde(default)]
    pub review: Option<String>,
    #[serde(default)]
    pub score: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnimeEpisode {
    pub mal_id: MalId,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub title_romanji: Option<String>,
    #[serde(default)]
    pub aired: Option<String>, // ISO8601
    #[serde(default)]
    pub filler: Option<bool>,
    #[serde(default)]
    pub recap: Option<bool>,
}

/// MyAnimeList v2 `GET /manga/{id}?fields=num_chapters`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MalMangaChapters {
    pub id: MalId,
    #[serde(default)]
    pub num_chapters: Option<i64>,
}
