use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use super::dto::PageRequest;
use crate::modules::aggregation::domain::{DataAggregator, StaleMatchDetector};
use crate::modules::matching::{CrossProviderMatcher, MatchQuery, MatchSet};
use crate::modules::media::{
    ChapterEntity, EpisodeEntity, MediaDetailsEntity, MediaEntity, PageProvider, PageResult,
    SearchPage,
};
use crate::modules::provider::traits::{search_type_for, DetailsOptions};
use crate::modules::provider::ProviderRegistry;
use crate::shared::config::EngineConfig;
use crate::shared::domain::{MediaType, ProviderId};
use crate::shared::errors::{AppError, AppResult};
use crate::shared::utils::cancellation::{ensure_active, run_cancellable, run_with_deadline};
use crate::shared::utils::logger::LogContext;

/// Catalogs always consulted for anime even when the cached set lacks them
const FORCED_ANIME_PROVIDERS: [ProviderId; 2] = [ProviderId::AniList, ProviderId::Tmdb];
/// Match candidates tried for paged episodes when the caller names no catalog
const EPISODE_PAGE_CANDIDATES: [ProviderId; 3] =
    [ProviderId::Jikan, ProviderId::Kitsu, ProviderId::AniList];
/// Artwork donors, in order
const BACKFILL_PROVIDERS: [ProviderId; 2] = [ProviderId::Tmdb, ProviderId::Kitsu];

#[derive(Debug, Clone, PartialEq)]
pub struct OrchestratorConfig {
    /// Minimum confidence before artwork is borrowed from another catalog
    pub backfill_threshold: f64,
    pub fetch_timeout: Duration,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            backfill_threshold: 0.85,
            fetch_timeout: Duration::from_secs(20),
        }
    }
}

impl From<&EngineConfig> for OrchestratorConfig {
    fn from(config: &EngineConfig) -> Self {
        Self {
            backfill_threshold: config.backfill_threshold,
            fetch_timeout: config.fetch_timeout(),
        }
    }
}

/// Façade over matching and aggregation
///
/// Resolves which catalog serves a request, falls back to the aggregated
/// view when that catalog fails, and enriches details with artwork from
/// matched catalogs. Only `AuthRequired` and `Cancelled` escape the
/// fallback paths.
pub struct AggregationOrchestrator {
    registry: Arc<ProviderRegistry>,
    matcher: Arc<CrossProviderMatcher>,
    aggregator: DataAggregator,
    stale_detector: StaleMatchDetector,
    config: OrchestratorConfig,
}

impl AggregationOrchestrator {
    pub fn new(
        registry: Arc<ProviderRegistry>,
        matcher: Arc<CrossProviderMatcher>,
        config: OrchestratorConfig,
    ) -> Self {
        let aggregator = DataAggregator::new(registry.clone(), config.fetch_timeout);
        Self {
            registry,
            matcher,
            aggregator,
            stale_detector: StaleMatchDetector::new(),
            config,
        }
    }

    pub fn registry(&self) -> &ProviderRegistry {
        &self.registry
    }

    pub fn matcher(&self) -> &CrossProviderMatcher {
        &self.matcher
    }

    // ========================================================================
    // MATCH RESOLUTION
    // ========================================================================

    /// Cached or fresh matches for `media`, with stale entries replaced.
    ///
    /// Only a cached set is refreshed when stale. Stale entries of a fresh
    /// search are dropped, since searching again would return the same answer.
    pub async fn resolve_matches(&self, media: &MediaEntity, cancel: &CancellationToken) -> AppResult<MatchSet> {
        let query = MatchQuery::from_media(media);
        let lookup = self.matcher.lookup_matches(&query, cancel).await?;
        let mut matches = lookup.matches;

        if lookup.from_cache {
            let stale = self.stale_detector.stale_providers(media, &matches);
            if !stale.is_empty() {
                log::info!(
                    "Refreshing matches for '{}': stale {:?}",
                    media.title,
                    stale
                );
                self.matcher.invalidate_query(&query).await;
                matches = self.matcher.find_matches(&query, cancel).await?;
                self.drop_stale_and_store(media, &query, &mut matches).await;
            }
        } else {
            self.drop_stale_and_store(media, &query, &mut matches).await;
        }

        if media.media_type == MediaType::Anime {
            self.force_anime_providers(media, &query, &mut matches, cancel).await?;
        }

        Ok(matches)
    }

    /// Stale verdicts on a fresh search are final
    async fn drop_stale_and_store(&self, media: &MediaEntity, query: &MatchQuery, matches: &mut MatchSet) {
        if self.stale_detector.drop_stale(media, matches) > 0 {
            self.matcher.store_matches(query, matches).await;
        }
    }

    /// Consult AniList and TMDB when the set has never asked them; misses are recorded too
    async fn force_anime_providers(
        &self,
        media: &MediaEntity,
        query: &MatchQuery,
        matches: &mut MatchSet,
        cancel: &CancellationToken,
    ) -> AppResult<()> {
        let mut changed = false;

        for provider in FORCED_ANIME_PROVIDERS {
            if provider == query.primary_source
                || matches.was_searched(provider)
                || !self.registry.contains(provider)
            {
                continue;
            }

            match self.matcher.match_provider(query, provider, None, cancel).await {
                Ok(Some(found)) if self.stale_detector.is_stale(media, &found) => {
                    log::debug!(
                        "Forced {} match for '{}' is stale: {}",
                        provider,
                        query.title,
                        found.provider_media_id
                    );
                    matches.mark_searched(provider);
                    changed = true;
                }
                Ok(Some(found)) => {
                    log::debug!(
                        "Forced {} match for '{}': {} ({:.2})",
                        provider,
                        query.title,
                        found.provider_media_id,
                        found.confidence
                    );
                    matches.insert(found);
                    changed = true;
                }
                Ok(None) => {
                    matches.mark_searched(provider);
                    changed = true;
                }
                Err(e) if e.is_fatal() => return Err(e),
                Err(e) => e.log_provider_failure(provider.as_str(), "forced match"),
            }
        }

        if changed {
            self.matcher.store_matches(query, matches).await;
        }
        Ok(())
    }

    // ========================================================================
    // FULL LISTS
    // ========================================================================

    pub async fn get_episodes(&self, media: &MediaEntity, cancel: &CancellationToken) -> AppResult<Vec<EpisodeEntity>> {
        let matches = self.resolve_matches(media, cancel).await?;
        self.aggregator.aggregate_episodes(media, &matches, cancel).await
    }

    pub async fn get_chapters(&self, media: &MediaEntity, cancel: &CancellationToken) -> AppResult<Vec<ChapterEntity>> {
        let matches = self.resolve_matches(media, cancel).await?;
        self.aggregator.aggregate_chapters(media, &matches, cancel).await
    }

    // ========================================================================
    // PAGED LISTS
    // ========================================================================

    /// One window of episodes from a single catalog, or of the aggregated list
    pub async fn get_episode_page(
        &self,
        request: &PageRequest,
        cancel: &CancellationToken,
    ) -> AppResult<PageResult<EpisodeEntity>> {
        request.validate()?;
        ensure_active(cancel)?;

        if request.is_aggregated() {
            return self.aggregated_episode_page(request, cancel).await;
        }

        let target = match self.resolve_episode_target(request, cancel).await {
            Ok(target) => target,
            Err(e) if e.is_fatal() => return Err(e),
            Err(e) => {
                e.log_provider_failure("orchestrator", "episode target resolution");
                None
            }
        };

        let Some((provider, media_id)) = target else {
            LogContext::fallback(&request.media.title, "episode page", "aggregated", "no paging catalog");
            return self.aggregated_episode_page(request, cancel).await;
        };

        match self.provider_episode_page(provider, &media_id, request, cancel).await {
            Ok(page) if !page.items.is_empty() || request.offset > 0 => Ok(page),
            Ok(_) => {
                LogContext::fallback(&request.media.title, provider.as_str(), "aggregated", "empty first page");
                self.aggregated_episode_page(request, cancel).await
            }
            Err(e) if e.is_fatal() => Err(e),
            Err(e) => {
                e.log_provider_failure(provider.as_str(), "episode page");
                LogContext::fallback(&request.media.title, provider.as_str(), "aggregated", "catalog failed");
                self.aggregated_episode_page(request, cancel).await
            }
        }
    }

    async fn provider_episode_page(
        &self,
        provider: ProviderId,
        media_id: &str,
        request: &PageRequest,
        cancel: &CancellationToken,
    ) -> AppResult<PageResult<EpisodeEntity>> {
        let client = self.registry.require(provider)?;
        let label = format!("{} episode page", provider);
        run_with_deadline(
            cancel,
            self.config.fetch_timeout,
            &label,
            client.get_episode_page(media_id, request.offset, request.catalog_limit()),
        )
        .await
    }

    /// Catalog and id to page episodes from, or `None` when nothing resolves
    async fn resolve_episode_target(
        &self,
        request: &PageRequest,
        cancel: &CancellationToken,
    ) -> AppResult<Option<(ProviderId, String)>> {
        let media = &request.media;

        if let Some(provider) = request.provider_id.and_then(|p| p.provider()) {
            if let Some(id) = &request.provider_media_id {
                return Ok(Some((provider, id.clone())));
            }
            if provider == media.source_id {
                return Ok(Some((provider, media.id.clone())));
            }
            let matches = self.resolve_matches(media, cancel).await?;
            return Ok(matches
                .get(provider)
                .map(|found| (provider, found.provider_media_id.clone())));
        }

        // MAL ids are served by Jikan
        if media.source_id == ProviderId::Jikan {
            return Ok(Some((ProviderId::Jikan, media.id.clone())));
        }

        if self
            .registry
            .get(media.source_id)
            .is_some_and(|client| client.supports_episode_paging())
        {
            return Ok(Some((media.source_id, media.id.clone())));
        }

        let matches = self.resolve_matches(media, cancel).await?;
        Ok(EPISODE_PAGE_CANDIDATES
            .into_iter()
            .filter(|provider| self.registry.contains(*provider))
            .find_map(|provider| {
                matches
                    .get(provider)
                    .map(|found| (provider, found.provider_media_id.clone()))
            }))
    }

    async fn aggregated_episode_page(
        &self,
        request: &PageRequest,
        cancel: &CancellationToken,
    ) -> AppResult<PageResult<EpisodeEntity>> {
        let episodes = self.get_episodes(&request.media, cancel).await?;
        Ok(PageResult::slice(
            &episodes,
            request.offset,
            request.limit,
            PageProvider::Aggregated,
            Some(request.media.id.clone()),
        ))
    }

    /// One window of chapters from Kitsu (or the named catalog), or of the aggregated list.
    ///
    /// Unlike episodes there is no fallback: catalog errors propagate.
    pub async fn get_chapter_page(
        &self,
        request: &PageRequest,
        cancel: &CancellationToken,
    ) -> AppResult<PageResult<ChapterEntity>> {
        request.validate()?;
        ensure_active(cancel)?;

        if request.is_aggregated() {
            let chapters = self.get_chapters(&request.media, cancel).await?;
            return Ok(PageResult::slice(
                &chapters,
                request.offset,
                request.limit,
                PageProvider::Aggregated,
                Some(request.media.id.clone()),
            ));
        }

        let media = &request.media;
        let provider = request
            .provider_id
            .and_then(|p| p.provider())
            .unwrap_or(ProviderId::Kitsu);

        let media_id = match (&request.provider_media_id, provider == media.source_id) {
            (Some(id), _) => id.clone(),
            (None, true) => media.id.clone(),
            (None, false) => self
                .resolve_matches(media, cancel)
                .await?
                .get(provider)
                .map(|found| found.provider_media_id.clone())
                .ok_or_else(|| {
                    AppError::NotFound(format!(
                        "No {} entry matched for '{}'",
                        provider, media.title
                    ))
                })?,
        };

        let client = self.registry.require(provider)?;
        let label = format!("{} chapter page", provider);
        run_with_deadline(
            cancel,
            self.config.fetch_timeout,
            &label,
            client.get_chapter_page(&media_id, request.offset, request.catalog_limit()),
        )
        .await
    }

    // ========================================================================
    // DETAILS
    // ========================================================================

    /// Details from the owning catalog with missing artwork borrowed from TMDB, then Kitsu
    pub async fn get_media_details(
        &self,
        id: &str,
        source: ProviderId,
        media_type: MediaType,
        cancel: &CancellationToken,
    ) -> AppResult<MediaDetailsEntity> {
        let client = self.registry.require(source)?;
        let mut details = run_cancellable(
            cancel,
            client.get_media_details(id, media_type, DetailsOptions::full()),
        )
        .await?;

        if details.needs_artwork() {
            self.backfill_artwork(&mut details, cancel).await?;
        }
        Ok(details)
    }

    async fn backfill_artwork(&self, details: &mut MediaDetailsEntity, cancel: &CancellationToken) -> AppResult<()> {
        let query = MatchQuery::from_media(&details.media);

        for provider in BACKFILL_PROVIDERS {
            if !details.needs_artwork() {
                break;
            }
            if provider == details.media.source_id || !self.registry.contains(provider) {
                continue;
            }

            let found = match self
                .matcher
                .match_provider(&query, provider, Some(self.config.backfill_threshold), cancel)
                .await
            {
                Ok(found) => found,
                Err(e) if e.is_fatal() => return Err(e),
                Err(e) => {
                    e.log_provider_failure(provider.as_str(), "artwork backfill");
                    continue;
                }
            };

            if let Some(snapshot) = found.and_then(|m| m.media) {
                if details.backfill_artwork(&snapshot) {
                    log::debug!(
                        "Backfilled artwork for '{}' from {}",
                        details.media.title,
                        provider
                    );
                }
            }
        }
        Ok(())
    }

    // ========================================================================
    // CATALOG BROWSING
    // ========================================================================

    pub async fn search(
        &self,
        provider: ProviderId,
        query: &str,
        media_type: MediaType,
        page: u32,
        year: Option<i32>,
        cancel: &CancellationToken,
    ) -> AppResult<SearchPage> {
        if query.trim().is_empty() {
            return Err(AppError::InvalidInput("Search query must not be empty".to_string()));
        }
        let client = self.registry.require(provider)?;
        run_cancellable(
            cancel,
            client.search_media(query, search_type_for(provider, media_type), page.max(1), year),
        )
        .await
    }

    pub async fn trending(
        &self,
        provider: ProviderId,
        media_type: MediaType,
        page: u32,
        cancel: &CancellationToken,
    ) -> AppResult<Vec<MediaEntity>> {
        let client = self.registry.require(provider)?;
        run_cancellable(
            cancel,
            client.get_trending(search_type_for(provider, media_type), page.max(1)),
        )
        .await
    }

    pub async fn popular(
        &self,
        provider: ProviderId,
        media_type: MediaType,
        page: u32,
        cancel: &CancellationToken,
    ) -> AppResult<Vec<MediaEntity>> {
        let client = self.registry.require(provider)?;
        run_cancellable(
            cancel,
            client.get_popular(search_type_for(provider, media_type), page.max(1)),
        )
        .await
    }
}
