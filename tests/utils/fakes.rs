/// Hand-written provider fakes
///
/// `FakeProvider` answers every `ProviderClient` call from canned data and
/// counts calls so tests can assert on fallback and caching behaviour.
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use kizuna::modules::media::{
    ChapterEntity, EpisodeEntity, MediaDetailsEntity, MediaEntity, PageProvider, PageResult,
    SearchPage,
};
use kizuna::modules::provider::{DetailsOptions, ProviderClient, ProviderRegistry, RateLimiterInfo};
use kizuna::shared::errors::{AppError, AppResult};
use kizuna::{MediaType, ProviderId};

pub const SCREEN_TYPES: &[MediaType] = &[MediaType::Anime, MediaType::Movie];
pub const TV_TYPES: &[MediaType] = &[MediaType::TvShow, MediaType::Movie];
pub const PRINT_TYPES: &[MediaType] = &[MediaType::Manga, MediaType::Novel];
pub const ALL_TYPES: &[MediaType] = &[
    MediaType::Anime,
    MediaType::Manga,
    MediaType::Novel,
    MediaType::Movie,
];

pub struct FakeProvider {
    provider: ProviderId,
    types: &'static [MediaType],
    pages_episodes: bool,
    search_results: Mutex<AppResult<Vec<MediaEntity>>>,
    episodes: AppResult<Vec<EpisodeEntity>>,
    chapters: AppResult<Vec<ChapterEntity>>,
    episode_page_error: Option<AppError>,
    details: Option<MediaDetailsEntity>,
    search_delay: Option<Duration>,
    pub search_calls: AtomicUsize,
    pub episode_calls: AtomicUsize,
    pub episode_page_calls: AtomicUsize,
    pub chapter_calls: AtomicUsize,
}

impl FakeProvider {
    pub fn new(provider: ProviderId, types: &'static [MediaType]) -> Self {
        Self {
            provider,
            types,
            pages_episodes: false,
            search_results: Mutex::new(Ok(Vec::new())),
            episodes: Err(AppError::DataUnavailable(format!("{} has no episodes", provider))),
            chapters: Err(AppError::DataUnavailable(format!("{} has no chapters", provider))),
            episode_page_error: None,
            details: None,
            search_delay: None,
            search_calls: AtomicUsize::new(0),
            episode_calls: AtomicUsize::new(0),
            episode_page_calls: AtomicUsize::new(0),
            chapter_calls: AtomicUsize::new(0),
        }
    }

    pub fn with_search_results(self, results: Vec<MediaEntity>) -> Self {
        self.set_search_results(Ok(results));
        self
    }

    pub fn with_search_error(self, error: AppError) -> Self {
        self.set_search_results(Err(error));
        self
    }

    /// Replace canned search results after the provider was registered
    pub fn set_search_results(&self, results: AppResult<Vec<MediaEntity>>) {
        *self.search_results.lock().unwrap() = results;
    }

    pub fn with_episodes(mut self, episodes: Vec<EpisodeEntity>) -> Self {
        self.episodes = Ok(episodes);
        self
    }

    pub fn with_episode_error(mut self, error: AppError) -> Self {
        self.episodes = Err(error);
        self
    }

    pub fn with_episode_page_error(mut self, error: AppError) -> Self {
        self.episode_page_error = Some(error);
        self
    }

    pub fn with_chapters(mut self, chapters: Vec<ChapterEntity>) -> Self {
        self.chapters = Ok(chapters);
        self
    }

    pub fn with_chapter_error(mut self, error: AppError) -> Self {
        self.chapters = Err(error);
        self
    }

    pub fn with_details(mut self, details: MediaDetailsEntity) -> Self {
        self.details = Some(details);
        self
    }

    pub fn with_episode_paging(mut self) -> Self {
        self.pages_episodes = true;
        self
    }

    pub fn with_search_delay(mut self, delay: Duration) -> Self {
        self.search_delay = Some(delay);
        self
    }

    pub fn searches(&self) -> usize {
        self.search_calls.load(Ordering::SeqCst)
    }

    pub fn episode_fetches(&self) -> usize {
        self.episode_calls.load(Ordering::SeqCst)
    }

    pub fn episode_page_fetches(&self) -> usize {
        self.episode_page_calls.load(Ordering::SeqCst)
    }

    pub fn chapter_fetches(&self) -> usize {
        self.chapter_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ProviderClient for FakeProvider {
    fn provider_id(&self) -> ProviderId {
        self.provider
    }

    fn get_rate_limit_info(&self) -> RateLimiterInfo {
        RateLimiterInfo::new(100.0)
    }

    fn supported_types(&self) -> &'static [MediaType] {
        self.types
    }

    fn supports_episode_paging(&self) -> bool {
        self.pages_episodes
    }

    async fn search_media(
        &self,
        _query: &str,
        _media_type: MediaType,
        page: u32,
        _year: Option<i32>,
    ) -> AppResult<SearchPage> {
        self.search_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.search_delay {
            tokio::time::sleep(delay).await;
        }
        let results = self.search_results.lock().unwrap().clone()?;
        Ok(SearchPage::single(results, page, false))
    }

    async fn get_media_details(
        &self,
        id: &str,
        _media_type: MediaType,
        _options: DetailsOptions,
    ) -> AppResult<MediaDetailsEntity> {
        self.details
            .clone()
            .filter(|details| details.media.id == id)
            .ok_or_else(|| AppError::NotFound(format!("{} has no media {}", self.provider, id)))
    }

    async fn get_episodes(
        &self,
        _media_id: &str,
        _cover_image_hint: Option<&str>,
    ) -> AppResult<Vec<EpisodeEntity>> {
        self.episode_calls.fetch_add(1, Ordering::SeqCst);
        self.episodes.clone()
    }

    async fn get_chapters(&self, _media_id: &str) -> AppResult<Vec<ChapterEntity>> {
        self.chapter_calls.fetch_add(1, Ordering::SeqCst);
        self.chapters.clone()
    }

    async fn get_episode_page(
        &self,
        media_id: &str,
        offset: usize,
        limit: usize,
    ) -> AppResult<PageResult<EpisodeEntity>> {
        self.episode_page_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(error) = &self.episode_page_error {
            return Err(error.clone());
        }
        let episodes = self.episodes.clone()?;
        Ok(PageResult::slice(
            &episodes,
            offset,
            limit,
            PageProvider::Provider(self.provider),
            Some(media_id.to_string()),
        ))
    }

    async fn get_chapter_page(
        &self,
        media_id: &str,
        offset: usize,
        limit: usize,
    ) -> AppResult<PageResult<ChapterEntity>> {
        let chapters = self.chapters.clone()?;
        Ok(PageResult::slice(
            &chapters,
            offset,
            limit,
            PageProvider::Provider(self.provider),
            Some(media_id.to_string()),
        ))
    }
}

/// Registry over the given fakes; keeps handles so tests can read call counters
pub fn registry_of(providers: &[Arc<FakeProvider>]) -> ProviderRegistry {
    providers
        .iter()
        .fold(ProviderRegistry::builder(), |builder, provider| {
            builder.register(provider.clone() as Arc<dyn ProviderClient>)
        })
        .build()
}
