use async_trait::async_trait;
use dashmap::DashMap;
use std::fmt;

use crate::shared::errors::AppResult;

/// Tracking services whose APIs need a user token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TrackingService {
    MyAnimeList,
    AniList,
}

impl fmt::Display for TrackingService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrackingService::MyAnimeList => write!(f, "MyAnimeList"),
            TrackingService::AniList => write!(f, "AniList"),
        }
    }
}

/// Source of user OAuth tokens; the OAuth flow itself lives outside this crate
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// `Ok(None)` when the user has not connected the service
    async fn access_token(&self, service: TrackingService) -> AppResult<Option<String>>;
}

/// Process-local token store for embedders that manage tokens themselves
#[derive(Debug, Default)]
pub struct InMemoryCredentialStore {
    tokens: DashMap<TrackingService, String>,
}

impl InMemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_token(&self, service: TrackingService, token: impl Into<String>) {
        self.tokens.insert(service, token.into());
    }

    pub fn remove_token(&self, service: TrackingService) {
        self.tokens.remove(&service);
    }
}

#[async_trait]
impl CredentialStore for InMemoryCredentialStore {
    async fn access_token(&self, service: TrackingService) -> AppResult<Option<String>> {
        Ok(self.tokens.get(&service).map(|token| token.value().clone()))
    }
}
