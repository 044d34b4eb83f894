//! Builds the provider registry from engine configuration

use std::sync::Arc;

use crate::modules::provider::credentials::CredentialStore;
use crate::modules::provider::infrastructure::{
    AniListAdapter, JikanAdapter, KitsuAdapter, SimklAdapter, TmdbAdapter,
};
use crate::modules::provider::registry::ProviderRegistry;
use crate::modules::provider::traits::ProviderClient;
use crate::shared::config::EngineConfig;

/// AniList, Kitsu and Jikan are always registered; TMDB and Simkl need keys
pub fn registry_from_config(
    config: &EngineConfig,
    credentials: Option<Arc<dyn CredentialStore>>,
) -> ProviderRegistry {
    let user_agent = config.user_agent.as_str();

    let tmdb = config
        .tmdb_api_key
        .as_deref()
        .filter(|key| !key.trim().is_empty())
        .map(|key| Arc::new(TmdbAdapter::new(key.to_string(), user_agent)) as Arc<dyn ProviderClient>);
    if tmdb.is_none() {
        log::info!("TMDB disabled: no API key configured");
    }

    let simkl = config
        .simkl_client_id
        .as_deref()
        .filter(|id| !id.trim().is_empty())
        .and_then(|id| match SimklAdapter::new(user_agent, id) {
            Ok(adapter) => Some(Arc::new(adapter) as Arc<dyn ProviderClient>),
            Err(e) => {
                log::warn!("Simkl disabled: {}", e);
                None
            }
        });

    ProviderRegistry::builder()
        .register(Arc::new(AniListAdapter::new(user_agent)))
        .register(Arc::new(KitsuAdapter::new(user_agent)))
        .register(Arc::new(JikanAdapter::new(user_agent, credentials)))
        .register_opt(tmdb)
        .register_opt(simkl)
        .build()
}
