pub mod modules;
mod schema;
pub mod shared;

use std::sync::Arc;

use modules::aggregation::{AggregationOrchestrator, OrchestratorConfig};
use modules::matching::{CrossProviderMatcher, MatchCache, MatcherConfig};
use modules::provider::{registry_from_config, CredentialStore};
use shared::errors::{AppError, AppResult};
use shared::EngineConfig;

pub use modules::aggregation::PageRequest;
pub use modules::matching::{MatchQuery, MatchSet, ProviderMatch};
pub use modules::media::{
    ChapterEntity, EpisodeEntity, MediaDetailsEntity, MediaEntity, PageProvider, PageResult,
    SearchPage,
};
pub use shared::domain::{MediaType, ProviderId};
pub use tokio_util::sync::CancellationToken;

/// Wire the engine from configuration.
///
/// Builds the provider registry, opens the match cache (an unusable cache
/// only costs cache hits) and returns the orchestrator every operation goes
/// through. `credentials` enables MyAnimeList-authenticated chapter lookups.
pub async fn bootstrap(
    config: &EngineConfig,
    credentials: Option<Arc<dyn CredentialStore>>,
) -> AppResult<AggregationOrchestrator> {
    config.validate().map_err(AppError::ConfigError)?;

    let registry = Arc::new(registry_from_config(config, credentials));

    let cache = Arc::new(MatchCache::for_path(&config.match_cache_path));
    if !cache.init().await {
        log::warn!(
            "Match cache at '{}' unavailable; matches will not be reused",
            config.match_cache_path
        );
    }

    let matcher = Arc::new(CrossProviderMatcher::new(
        registry.clone(),
        cache,
        MatcherConfig::from(config),
    ));

    Ok(AggregationOrchestrator::new(
        registry,
        matcher,
        OrchestratorConfig::from(config),
    ))
}

/// [`bootstrap`] from `KIZUNA_*` environment variables (and `.env`)
pub async fn bootstrap_from_env(
    credentials: Option<Arc<dyn CredentialStore>>,
) -> AppResult<AggregationOrchestrator> {
    shared::utils::init_logger();
    let config = EngineConfig::from_env().map_err(|e| AppError::ConfigError(e.to_string()))?;
    bootstrap(&config, credentials).await
}
