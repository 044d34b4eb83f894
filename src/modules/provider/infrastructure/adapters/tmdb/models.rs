// TMDB v3 API models
// https://developer.themoviedb.org/reference

use serde::{Deserialize, Serialize};

/// TMDB image CDN; paths in responses are relative to a size bucket
pub const IMAGE_BASE_URL: &str = "https://image.tmdb.org/t/p";
pub const GENRE_ANIMATION: u32 = 16;
pub const GENRE_DOCUMENTARY: u32 = 99;

// Response envelopes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TmdbPage<T> {
    pub page: u32,
    pub results: Vec<T>,
    #[serde(default)]
    pub total_pages: u32,
    #[serde(default)]
    pub total_results: u32,
}

impl<T> TmdbPage<T> {
    pub fn has_next_page(&self) -> bool {
        self.page < self.total_pages
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TmdbError {
    pub status_code: u16,
    pub status_message: String,
}

/// Search/list result; TV rows carry `name`, movie rows carry `title`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct TmdbEntry {
    pub id: u32,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub original_name: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub original_title: Option<String>,
    #[serde(default)]
    pub original_language: Option<String>,
    #[serde(default)]
    pub overview: Option<String>,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub backdrop_path: Option<String>,
    #[serde(default)]
    pub first_air_date: Option<String>,
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub vote_average: Option<f64>,
    #[serde(default)]
    pub genre_ids: Vec<u32>,
    #[serde(default)]
    pub origin_country: Vec<String>,
    /// Only present on `/trending/all`
    #[serde(default)]
    pub media_type: Option<String>,
}

impl TmdbEntry {
    pub fn is_movie(&self) -> bool {
        self.media_type.as_deref() == Some("movie")
            || (self.title.is_some() && self.name.is_none())
    }
}

/// `/tv/{id}` and `/movie/{id}` with `append_to_response=credits,reviews`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct TmdbDetails {
    #[serde(flatten)]
    pub entry: TmdbEntry,
    #[serde(default)]
    pub genres: Vec<Genre>,
    #[serde(default)]
    pub status: Option<String>, // "Returning Series", "Ended", "Canceled", "Released"
    #[serde(default)]
    pub number_of_episodes: Option<i64>,
    #[serde(default)]
    pub number_of_seasons: Option<i64>,
    #[serde(default)]
    pub episode_run_time: Vec<i64>,
    #[serde(default)]
    pub runtime: Option<i64>,
    #[serde(default)]
    pub seasons: Vec<Season>,
    #[serde(default)]
    pub credits: Option<Credits>,
    #[serde(default)]
    pub reviews: Option<TmdbPage<Review>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Genre {
    pub id: u32,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Season {
    pub id: u32,
    #[serde(default)]
    pub name: Option<String>,
    pub season_number: u32,
    #[serde(default)]
    pub episode_count: Option<u32>,
    #[serde(default)]
    pub air_date: Option<String>,
    #[serde(default)]
    pub poster_path: Option<String>,
}

/// `/tv/{id}/season/{n}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeasonDetails {
    pub season_number: u32,
    #[serde(default)]
    pub episodes: Vec<Episode>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Episode {
    pub id: u32,
    #[serde(default)]
    pub name: Option<String>,
    pub episode_number: u32,
    pub season_number: u32,
    #[serde(default)]
    pub air_date: Option<String>,
    #[serde(default)]
    pub runtime: Option<i64>,
    #[serde(default)]
    pub still_path: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Credits {
    #[serde(default)]
    pub cast: Vec<CastMember>,
    #[serde(default)]
    pub crew: Vec<CrewMember>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CastMember {
    pub name: String,
    #[serde(default)]
    pub character: Option<String>,
    #[serde(default)]
    pub profile_path: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrewMember {
    pub name: String,
    #[serde(default)]
    pub job: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Review {
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub author_details: Option<AuthorDetails>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthorDetails {
    #[serde(default)]
    pub rating: Option<f64>,
}
