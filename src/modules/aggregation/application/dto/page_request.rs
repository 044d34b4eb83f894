use serde::{Deserialize, Serialize};

use crate::modules::media::{MediaEntity, PageProvider};
use crate::shared::errors::{AppError, AppResult};

/// Largest window forwarded to a catalog's own pager; aggregated windows are unbounded
pub const MAX_PAGE_LIMIT: usize = 100;
pub const DEFAULT_PAGE_LIMIT: usize = 20;

/// Request DTO for one window of an episode or chapter list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageRequest {
    /// Title the list belongs to
    pub media: MediaEntity,
    /// `aggregated`, a catalog, or unset to let the engine choose
    pub provider_id: Option<PageProvider>,
    /// The catalog's own id for the title, when already known
    pub provider_media_id: Option<String>,
    #[serde(default)]
    pub offset: usize,
    #[serde(default = "default_limit")]
    pub limit: usize,
}

fn default_limit() -> usize {
    DEFAULT_PAGE_LIMIT
}

impl PageRequest {
    pub fn new(media: MediaEntity) -> Self {
        Self {
            media,
            provider_id: None,
            provider_media_id: None,
            offset: 0,
            limit: DEFAULT_PAGE_LIMIT,
        }
    }

    pub fn aggregated(media: MediaEntity) -> Self {
        Self::new(media).with_provider(PageProvider::Aggregated)
    }

    pub fn with_provider(mut self, provider: impl Into<PageProvider>) -> Self {
        self.provider_id = Some(provider.into());
        self
    }

    pub fn with_provider_media_id(mut self, id: impl Into<String>) -> Self {
        self.provider_media_id = Some(id.into());
        self
    }

    pub fn with_window(mut self, offset: usize, limit: usize) -> Self {
        self.offset = offset;
        self.limit = limit;
        self
    }

    /// Window size to ask a single catalog for
    pub fn catalog_limit(&self) -> usize {
        self.limit.min(MAX_PAGE_LIMIT)
    }

    pub fn is_aggregated(&self) -> bool {
        self.provider_id.is_some_and(|p| p.is_aggregated())
    }

    pub fn validate(&self) -> AppResult<()> {
        if self.limit == 0 {
            return Err(AppError::InvalidInput("Page limit must be at least 1".to_string()));
        }
        if self.media.id.trim().is_empty() {
            return Err(AppError::InvalidInput("Media id must not be empty".to_string()));
        }
        if self
            .provider_media_id
            .as_deref()
            .is_some_and(|id| id.trim().is_empty())
        {
            return Err(AppError::InvalidInput(
                "Provider media id must not be blank".to_string(),
            ));
        }
        Ok(())
    }
}
