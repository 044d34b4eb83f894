use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::modules::media::{
    ChapterEntity, EpisodeEntity, MediaDetailsEntity, MediaEntity, PageProvider, PageResult,
    SearchPage,
};
use crate::shared::domain::{MediaType, ProviderId};
use crate::shared::errors::{AppError, AppResult};

/// Uniform contract every catalog adapter implements
#[async_trait]
pub trait ProviderClient: Send + Sync {
    /// Get the provider this client handles
    fn provider_id(&self) -> ProviderId;

    /// Get rate limiter info from the actual client (single source of truth)
    fn get_rate_limit_info(&self) -> RateLimiterInfo;

    /// Media types this catalog can search
    fn supported_types(&self) -> &'static [MediaType];

    fn supports_type(&self, media_type: MediaType) -> bool {
        self.supported_types().contains(&media_type)
    }

    /// Whether episodes can be requested page by page from the catalog itself
    fn supports_episode_paging(&self) -> bool {
        false
    }

    async fn search_media(
        &self,
        query: &str,
        media_type: MediaType,
        page: u32,
        year: Option<i32>,
    ) -> AppResult<SearchPage>;

    async fn get_trending(&self, media_type: MediaType, _page: u32) -> AppResult<Vec<MediaEntity>> {
        Err(AppError::NotImplemented(format!(
            "Trending {} not supported by {}",
            media_type,
            self.provider_id()
        )))
    }

    async fn get_popular(&self, media_type: MediaType, _page: u32) -> AppResult<Vec<MediaEntity>> {
        Err(AppError::NotImplemented(format!(
            "Popular {} not supported by {}",
            media_type,
            self.provider_id()
        )))
    }

    async fn get_media_details(
        &self,
        id: &str,
        media_type: MediaType,
        options: DetailsOptions,
    ) -> AppResult<MediaDetailsEntity>;

    async fn get_episodes(
        &self,
        media_id: &str,
        _cover_image_hint: Option<&str>,
    ) -> AppResult<Vec<EpisodeEntity>> {
        Err(AppError::DataUnavailable(format!(
            "{} has no episode data for {}",
            self.provider_id(),
            media_id
        )))
    }

    async fn get_chapters(&self, media_id: &str) -> AppResult<Vec<ChapterEntity>> {
        Err(AppError::DataUnavailable(format!(
            "{} has no chapter data for {}",
            self.provider_id(),
            media_id
        )))
    }

    /// Client-side window over the full list unless the catalog pages natively
    async fn get_episode_page(
        &self,
        media_id: &str,
        offset: usize,
        limit: usize,
    ) -> AppResult<PageResult<EpisodeEntity>> {
        let episodes = self.get_episodes(media_id, None).await?;
        Ok(PageResult::slice(
            &episodes,
            offset,
            limit,
            PageProvider::Provider(self.provider_id()),
            Some(media_id.to_string()),
        ))
    }

    async fn get_chapter_page(
        &self,
        media_id: &str,
        _offset: usize,
        _limit: usize,
    ) -> AppResult<PageResult<ChapterEntity>> {
        Err(AppError::DataUnavailable(format!(
            "{} does not page chapters for {}",
            self.provider_id(),
            media_id
        )))
    }
}

/// Search seam used by the cross-provider matcher
#[async_trait]
pub trait MediaSearcher: Send + Sync {
    /// Providers that can be searched for `media_type`
    fn searchable_providers(&self, media_type: MediaType) -> Vec<ProviderId>;

    async fn search(
        &self,
        provider: ProviderId,
        query: &str,
        media_type: MediaType,
    ) -> AppResult<Vec<MediaEntity>>;
}

/// Episode/chapter seam used by the data aggregator
#[async_trait]
pub trait ContentFetcher: Send + Sync {
    async fn fetch_episodes(
        &self,
        provider: ProviderId,
        media_id: &str,
        cover_image_hint: Option<&str>,
    ) -> AppResult<Vec<EpisodeEntity>>;

    async fn fetch_chapters(
        &self,
        provider: ProviderId,
        media_id: &str,
    ) -> AppResult<Vec<ChapterEntity>>;
}

/// Media type a catalog should be searched with.
///
/// TMDB has no anime category; anime lives under TV.
pub fn search_type_for(provider: ProviderId, media_type: MediaType) -> MediaType {
    match (provider, media_type) {
        (ProviderId::Tmdb, MediaType::Anime) => MediaType::TvShow,
        _ => media_type,
    }
}

/// Which optional sections a details request should include
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetailsOptions {
    pub include_characters: bool,
    pub include_staff: bool,
    pub include_reviews: bool,
}

impl DetailsOptions {
    pub fn full() -> Self {
        Self {
            include_characters: true,
            include_staff: true,
            include_reviews: true,
        }
    }

    pub fn basic() -> Self {
        Self::default()
    }
}

/// Rate limiter information from the actual client implementation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimiterInfo {
    pub requests_per_second: f64,
    pub requests_per_minute: u32,
    /// Minimum delay between requests (in milliseconds)
    pub min_delay_ms: u32,
}

impl RateLimiterInfo {
    pub fn new(requests_per_second: f64) -> Self {
        Self {
            requests_per_second,
            requests_per_minute: (requests_per_second * 60.0) as u32,
            min_delay_ms: ((1.0 / requests_per_second) * 1000.0) as u32,
        }
    }

    pub fn from_interval(min_interval: Duration) -> Self {
        let secs = min_interval.as_secs_f64().max(0.001);
        Self::new(1.0 / secs)
    }

    pub fn min_delay(&self) -> Duration {
        Duration::from_millis(self.min_delay_ms as u64)
    }
}
