use async_trait::async_trait;
use dashmap::DashMap;

use super::{mapper::TmdbMapper, models::*};
use crate::modules::media::{EpisodeEntity, MediaDetailsEntity, MediaEntity, SearchPage};
use crate::modules::provider::infrastructure::adapters::mapper::MediaMapper;
use crate::modules::provider::infrastructure::http_client::RateLimitClient;
use crate::modules::provider::traits::{DetailsOptions, ProviderClient, RateLimiterInfo};
use crate::shared::domain::{MediaType, ProviderId};
use crate::shared::errors::{AppError, AppResult};

const BASE_URL: &str = "https://api.themoviedb.org/3";
const PER_PAGE: u32 = 20;
const SUPPORTED_TYPES: &[MediaType] = &[
    MediaType::Movie,
    MediaType::TvShow,
    MediaType::Cartoon,
    MediaType::Documentary,
];

/// TMDB (The Movie Database) provider adapter with REST API
pub struct TmdbAdapter {
    http_client: RateLimitClient,
    base_url: String,
    api_key: String,
    mapper: TmdbMapper,
    /// Season list per TV id, filled on first episode lookup
    seasons: DashMap<u32, Vec<Season>>,
}

impl TmdbAdapter {
    pub fn new(api_key: String, user_agent: &str) -> Self {
        Self::with_client(RateLimitClient::for_tmdb(user_agent), BASE_URL, api_key)
    }

    /// Create adapter with custom HTTP client (for testing)
    pub fn with_client(http_client: RateLimitClient, base_url: &str, api_key: String) -> Self {
        Self {
            http_client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            mapper: TmdbMapper::new(),
            seasons: DashMap::new(),
        }
    }

    /// Check if a request can be made immediately (for testing and monitoring)
    pub fn can_make_request_now(&self) -> bool {
        self.http_client.can_make_request_now()
    }

    /// Build URL with API key and additional query parameters
    fn build_url(&self, endpoint: &str, params: &[(&str, String)]) -> String {
        let mut url = format!("{}{}?api_key={}", self.base_url, endpoint, self.api_key);
        for (key, value) in params {
            url.push_str(&format!("&{}={}", key, urlencoding::encode(value)));
        }
        url
    }

    fn parse_id(id: &str) -> AppResult<u32> {
        id.trim()
            .parse()
            .map_err(|_| AppError::InvalidInput(format!("Invalid TMDB ID: {}", id)))
    }

    /// `tv` or `movie` path segment; anime is catalogued as TV
    fn catalog_for(media_type: MediaType) -> &'static str {
        match media_type {
            MediaType::Movie => "movie",
            _ => "tv",
        }
    }

    async fn get_page(&self, url: &str) -> AppResult<TmdbPage<TmdbEntry>> {
        self.http_client.get(url).await
    }

    /// Seasons of a TV show, excluding specials, served from the per-adapter cache
    pub async fn get_seasons(&self, tv_id: u32) -> AppResult<Vec<Season>> {
        let cached = self.seasons.get(&tv_id).map(|entry| entry.value().clone());
        if let Some(seasons) = cached {
            log::debug!("TMDB: Season list cache hit for '{}'", tv_id);
            return Ok(seasons);
        }

        let url = self.build_url(&format!("/tv/{}", tv_id), &[]);
        let details: TmdbDetails = self.http_client.get(&url).await?;

        let mut seasons: Vec<Season> = details
            .seasons
            .into_iter()
            .filter(|s| s.season_number > 0)
            .collect();
        seasons.sort_by_key(|s| s.season_number);

        self.seasons.insert(tv_id, seasons.clone());
        Ok(seasons)
    }

    pub fn cached_season_count(&self) -> usize {
        self.seasons.len()
    }

    async fn get_season(&self, tv_id: u32, season_number: u32) -> AppResult<SeasonDetails> {
        let url = self.build_url(&format!("/tv/{}/season/{}", tv_id, season_number), &[]);
        self.http_client.get(&url).await
    }
}

#[async_trait]
impl ProviderClient for TmdbAdapter {
    fn provider_id(&self) -> ProviderId {
        ProviderId::Tmdb
    }

    fn get_rate_limit_info(&self) -> RateLimiterInfo {
        RateLimiterInfo::from_interval(self.http_client.min_interval())
    }

    fn supported_types(&self) -> &'static [MediaType] {
        SUPPORTED_TYPES
    }

    async fn search_media(
        &self,
        query: &str,
        media_type: MediaType,
        page: u32,
        year: Option<i32>,
    ) -> AppResult<SearchPage> {
        let page = page.max(1);
        let catalog = Self::catalog_for(media_type);
        let mut params = vec![
            ("query", query.to_string()),
            ("page", page.to_string()),
            ("include_adult", "false".to_string()),
        ];
        if let Some(year) = year {
            let key = if catalog == "movie" {
                "primary_release_year"
            } else {
                "first_air_date_year"
            };
            params.push((key, year.to_string()));
        }

        log::info!("TMDB: Searching for '{}' ({})", query, media_type);

        let url = self.build_url(&format!("/search/{}", catalog), &params);
        let response = self.get_page(&url).await?;
        let has_next_page = response.has_next_page();
        let total_count = Some(response.total_results);

        Ok(SearchPage {
            items: self.mapper.map_media_list(response.results),
            total_count,
            current_page: page,
            has_next_page,
            per_page: PER_PAGE,
        })
    }

    async fn get_trending(&self, media_type: MediaType, page: u32) -> AppResult<Vec<MediaEntity>> {
        let url = self.build_url(
            &format!("/trending/{}/week", Self::catalog_for(media_type)),
            &[("page", page.max(1).to_string())],
        );
        let response = self.get_page(&url).await?;
        Ok(self.mapper.map_media_list(response.results))
    }

    async fn get_popular(&self, media_type: MediaType, page: u32) -> AppResult<Vec<MediaEntity>> {
        let url = self.build_url(
            &format!("/{}/popular", Self::catalog_for(media_type)),
            &[("page", page.max(1).to_string())],
        );
        let response = self.get_page(&url).await?;
        Ok(self.mapper.map_media_list(response.results))
    }

    async fn get_media_details(
        &self,
        id: &str,
        media_type: MediaType,
        options: DetailsOptions,
    ) -> AppResult<MediaDetailsEntity> {
        let tmdb_id = Self::parse_id(id)?;
        let mut appended = Vec::new();
        if options.include_characters || options.include_staff {
            appended.push("credits");
        }
        if options.include_reviews {
            appended.push("reviews");
        }

        let params: Vec<(&str, String)> = if appended.is_empty() {
            Vec::new()
        } else {
            vec![("append_to_response", appended.join(","))]
        };

        log::info!("TMDB: Getting details for ID '{}'", tmdb_id);

        let url = self.build_url(
            &format!("/{}/{}", Self::catalog_for(media_type), tmdb_id),
            &params,
        );
        let details: TmdbDetails = self.http_client.get(&url).await?;

        let mut mapped = self.mapper.map_details(details)?;
        if !options.include_characters {
            mapped.characters.clear();
        }
        if !options.include_staff {
            mapped.staff.clear();
        }
        Ok(mapped)
    }

    /// Every regular season in order, numbered continuously
    async fn get_episodes(
        &self,
        media_id: &str,
        cover_image_hint: Option<&str>,
    ) -> AppResult<Vec<EpisodeEntity>> {
        let tv_id = Self::parse_id(media_id)?;
        let seasons = self.get_seasons(tv_id).await?;
        let mut episodes = Vec::new();

        for season in seasons {
            let details = match self.get_season(tv_id, season.season_number).await {
                Ok(details) => details,
                Err(AppError::NotFound(_)) => {
                    log::debug!("TMDB: Season {} of '{}' not found", season.season_number, tv_id);
                    continue;
                }
                Err(e) => return Err(e),
            };

            let offset = episodes.len() as u32;
            episodes.extend(self.mapper.map_season_episodes(
                media_id,
                details,
                offset,
                cover_image_hint,
            ));
        }

        log::info!("TMDB: Found {} episodes for TV show '{}'", episodes.len(), tv_id);
        Ok(episodes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn adapter() -> TmdbAdapter {
        TmdbAdapter::new("test-key".to_string(), "kizuna-test")
    }

    #[test]
    fn test_build_url_encodes_params() {
        let url = adapter().build_url("/search/tv", &[("query", "Attack on Titan".to_string())]);
        assert_eq!(
            url,
            "https://api.themoviedb.org/3/search/tv?api_key=test-key&query=Attack%20on%20Titan"
        );
    }

    #[test]
    fn test_anime_is_searched_as_tv() {
        assert_eq!(TmdbAdapter::catalog_for(MediaType::Anime), "tv");
        assert_eq!(TmdbAdapter::catalog_for(MediaType::Movie), "movie");
    }

    #[test]
    fn test_supported_types() {
        let adapter = adapter();
        assert!(adapter.supports_type(MediaType::TvShow));
        assert!(!adapter.supports_type(MediaType::Anime));
        assert!(!adapter.supports_episode_paging());
        assert_eq!(adapter.cached_season_count(), 0);
    }

    #[tokio::test]
    async fn test_cached_seasons_skip_the_network() {
        let adapter = TmdbAdapter::with_client(
            RateLimitClient::for_tmdb("kizuna-test"),
            "http://127.0.0.1:9",
            "test-key".to_string(),
        );
        adapter.seasons.insert(
            46260,
            vec![Season {
                id: 1,
                name: Some("Season 1".to_string()),
                season_number: 1,
                episode_count: Some(220),
                air_date: None,
                poster_path: None,
            }],
        );

        let seasons = adapter.get_seasons(46260).await.unwrap();
        assert_eq!(seasons.len(), 1);
        assert_eq!(seasons[0].episode_count, Some(220));
    }
}
