use async_trait::async_trait;

use super::{mapper::SimklMapper, models::*};
use crate::modules::media::{EpisodeEntity, MediaDetailsEntity, SearchPage};
use crate::modules::provider::infrastructure::http_client::RateLimitClient;
use crate::modules::provider::traits::{DetailsOptions, ProviderClient, RateLimiterInfo};
use crate::shared::domain::{MediaType, ProviderId};
use crate::shared::errors::{AppError, AppResult};

const BASE_URL: &str = "https://api.simkl.com";
const SEARCH_LIMIT: u32 = 20;
const SUPPORTED_TYPES: &[MediaType] = &[MediaType::Anime, MediaType::TvShow, MediaType::Movie];

/// Simkl provider adapter; every request carries the client id header
pub struct SimklAdapter {
    http_client: RateLimitClient,
    base_url: String,
    mapper: SimklMapper,
}

impl SimklAdapter {
    pub fn new(user_agent: &str, client_id: &str) -> AppResult<Self> {
        Ok(Self::with_client(
            RateLimitClient::for_simkl(user_agent, client_id)?,
            BASE_URL,
        ))
    }

    /// Create adapter with custom HTTP client (for testing)
    pub fn with_client(http_client: RateLimitClient, base_url: &str) -> Self {
        Self {
            http_client,
            base_url: base_url.trim_end_matches('/').to_string(),
            mapper: SimklMapper::new(),
        }
    }

    fn parse_id(id: &str) -> AppResult<u64> {
        id.trim()
            .parse()
            .map_err(|_| AppError::InvalidInput(format!("Invalid Simkl ID: {}", id)))
    }

    /// Search path segment for a media type
    fn search_catalog(media_type: MediaType) -> &'static str {
        match media_type {
            MediaType::Movie => "movie",
            MediaType::TvShow => "tv",
            _ => "anime",
        }
    }

    /// Details path segment for a media type
    fn details_catalog(media_type: MediaType) -> &'static str {
        match media_type {
            MediaType::Movie => "movies",
            MediaType::TvShow => "tv",
            _ => "anime",
        }
    }

    async fn get_episode_list(&self, catalog: &str, id: u64) -> AppResult<Vec<SimklEpisode>> {
        let url = format!("{}/{}/episodes/{}?extended=full", self.base_url, catalog, id);
        self.http_client.get(&url).await
    }
}

#[async_trait]
impl ProviderClient for SimklAdapter {
    fn provider_id(&self) -> ProviderId {
        ProviderId::Simkl
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
        let url = format!(
            "{}/search/{}?q={}&page={}&limit={}",
            self.base_url,
            Self::search_catalog(media_type),
            urlencoding::encode(query),
            page,
            SEARCH_LIMIT
        );

        log::info!("Simkl: Searching for '{}' ({})", query, media_type);

        let items: Vec<SimklSearchItem> = self.http_client.get(&url).await?;
        let received = items.len() as u32;
        let mut results = self.mapper.map_search_results(items, media_type);
        // Simkl has no year filter on search
        if let Some(year) = year {
            results.retain(|m| m.year().map_or(true, |y| (y - year).abs() <= 1));
        }

        Ok(SearchPage {
            items: results,
            total_count: None,
            current_page: page,
            has_next_page: received >= SEARCH_LIMIT,
            per_page: SEARCH_LIMIT,
        })
    }

    async fn get_media_details(
        &self,
        id: &str,
        media_type: MediaType,
        _options: DetailsOptions,
    ) -> AppResult<MediaDetailsEntity> {
        let simkl_id = Self::parse_id(id)?;
        let url = format!(
            "{}/{}/{}?extended=full",
            self.base_url,
            Self::details_catalog(media_type),
            simkl_id
        );

        log::info!("Simkl: Getting details for ID '{}'", simkl_id);

        let details: SimklDetails = self.http_client.get(&url).await?;
        self.mapper.map_details(details, media_type)
    }

    /// Anime episode list first, then the TV list for non-anime shows
    async fn get_episodes(
        &self,
        media_id: &str,
        cover_image_hint: Option<&str>,
    ) -> AppResult<Vec<EpisodeEntity>> {
        let simkl_id = Self::parse_id(media_id)?;

        let mut episodes = match self.get_episode_list("anime", simkl_id).await {
            Ok(episodes) => episodes,
            Err(AppError::NotFound(_)) => Vec::new(),
            Err(e) => return Err(e),
        };
        if episodes.is_empty() {
            episodes = self.get_episode_list("tv", simkl_id).await?;
        }

        let mapped = self.mapper.map_episodes(media_id, episodes, cover_image_hint);
        log::debug!("Simkl: {} episodes for '{}'", mapped.len(), simkl_id);
        Ok(mapped)
    }
}
