use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::modules::media::{ChapterEntity, EpisodeEntity, MediaEntity};
use crate::modules::provider::traits::{
    search_type_for, ContentFetcher, MediaSearcher, ProviderClient,
};
use crate::shared::domain::{MediaType, ProviderId};
use crate::shared::errors::{AppError, AppResult};
use crate::shared::utils::logger::LogContext;

/// Enum-keyed table of catalog clients, built once at startup
#[derive(Clone, Default)]
pub struct ProviderRegistry {
    clients: BTreeMap<ProviderId, Arc<dyn ProviderClient>>,
}

impl ProviderRegistry {
    pub fn builder() -> ProviderRegistryBuilder {
        ProviderRegistryBuilder::default()
    }

    pub fn get(&self, provider: ProviderId) -> Option<Arc<dyn ProviderClient>> {
        self.clients.get(&provider).cloned()
    }

    /// Like [`get`](Self::get) but an unregistered provider is an error
    pub fn require(&self, provider: ProviderId) -> AppResult<Arc<dyn ProviderClient>> {
        self.get(provider).ok_or_else(|| {
            AppError::DataUnavailable(format!("Provider {} is not configured", provider))
        })
    }

    pub fn contains(&self, provider: ProviderId) -> bool {
        self.clients.contains_key(&provider)
    }

    pub fn providers(&self) -> Vec<ProviderId> {
        self.clients.keys().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.clients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }
}

#[derive(Default)]
pub struct ProviderRegistryBuilder {
    clients: BTreeMap<ProviderId, Arc<dyn ProviderClient>>,
}

impl ProviderRegistryBuilder {
    /// Register a client under the provider it reports; a later registration replaces an earlier one
    pub fn register(mut self, client: Arc<dyn ProviderClient>) -> Self {
        let provider = client.provider_id();
        if self.clients.insert(provider, client).is_some() {
            log::warn!("Provider {} registered twice, keeping the last client", provider);
        }
        self
    }

    pub fn register_opt(self, client: Option<Arc<dyn ProviderClient>>) -> Self {
        match client {
            Some(client) => self.register(client),
            None => self,
        }
    }

    pub fn build(self) -> ProviderRegistry {
        log::info!(
            "Provider registry ready: {}",
            self.clients
                .keys()
                .map(|p| p.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        );
        ProviderRegistry {
            clients: self.clients,
        }
    }
}

#[async_trait]
impl MediaSearcher for ProviderRegistry {
    fn searchable_providers(&self, media_type: MediaType) -> Vec<ProviderId> {
        self.clients
            .iter()
            .filter(|(provider, client)| client.supports_type(search_type_for(**provider, media_type)))
            .map(|(provider, _)| *provider)
            .collect()
    }

    async fn search(
        &self,
        provider: ProviderId,
        query: &str,
        media_type: MediaType,
    ) -> AppResult<Vec<MediaEntity>> {
        let client = self.require(provider)?;
        LogContext::search_operation(query, provider, None);

        let page = client.search_media(query, media_type, 1, None).await?;

        LogContext::search_operation(query, provider, Some(page.items.len()));
        Ok(page.items)
    }
}

#[async_trait]
impl ContentFetcher for ProviderRegistry {
    async fn fetch_episodes(
        &self,
        provider: ProviderId,
        media_id: &str,
        cover_image_hint: Option<&str>,
    ) -> AppResult<Vec<EpisodeEntity>> {
        self.require(provider)?
            .get_episodes(media_id, cover_image_hint)
            .await
    }

    async fn fetch_chapters(
        &self,
        provider: ProviderId,
        media_id: &str,
    ) -> AppResult<Vec<ChapterEntity>> {
        self.require(provider)?.get_chapters(media_id).await
    }
}
