use serde::{Deserialize, Serialize};
use std::fmt;

use crate::modules::media::domain::entities::MediaEntity;
use crate::shared::domain::ProviderId;
use crate::shared::errors::AppError;

const AGGREGATED: &str = "aggregated";

/// Where a page of episodes/chapters came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum PageProvider {
    /// The fallback-ordered list built from every matched catalog
    Aggregated,
    Provider(ProviderId),
}

impl PageProvider {
    pub fn provider(&self) -> Option<ProviderId> {
        match self {
            PageProvider::Aggregated => None,
            PageProvider::Provider(id) => Some(*id),
        }
    }

    pub fn is_aggregated(&self) -> bool {
        matches!(self, PageProvider::Aggregated)
    }
}

impl fmt::Display for PageProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PageProvider::Aggregated => write!(f, "{}", AGGREGATED),
            PageProvider::Provider(id) => write!(f, "{}", id),
        }
    }
}

impl From<ProviderId> for PageProvider {
    fn from(id: ProviderId) -> Self {
        PageProvider::Provider(id)
    }
}

impl From<PageProvider> for String {
    fn from(provider: PageProvider) -> Self {
        provider.to_string()
    }
}

impl TryFrom<String> for PageProvider {
    type Error = AppError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        if value.eq_ignore_ascii_case(AGGREGATED) {
            Ok(PageProvider::Aggregated)
        } else {
            value.parse::<ProviderId>().map(PageProvider::Provider)
        }
    }
}

/// One window of an episode or chapter list.
///
/// `next_offset` is `None` exactly when there are no further items.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageResult<T> {
    pub items: Vec<T>,
    pub next_offset: Option<usize>,
    pub provider_id: PageProvider,
    pub provider_media_id: Option<String>,
}

impl<T: Clone> PageResult<T> {
    /// Window `items[offset..min(offset + limit, len)]` of an already complete list
    pub fn slice(
        items: &[T],
        offset: usize,
        limit: usize,
        provider_id: PageProvider,
        provider_media_id: Option<String>,
    ) -> Self {
        let len = items.len();
        let start = offset.min(len);
        let end = offset.saturating_add(limit).min(len);

        Self {
            items: items[start..end.max(start)].to_vec(),
            next_offset: (end < len).then_some(end),
            provider_id,
            provider_media_id,
        }
    }
}

impl<T> PageResult<T> {
    pub fn empty(provider_id: PageProvider, provider_media_id: Option<String>) -> Self {
        Self {
            items: Vec::new(),
            next_offset: None,
            provider_id,
            provider_media_id,
        }
    }

    pub fn has_more(&self) -> bool {
        self.next_offset.is_some()
    }
}

/// One page of catalog search/browse results
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchPage {
    pub items: Vec<MediaEntity>,
    pub total_count: Option<u32>,
    pub current_page: u32,
    pub has_next_page: bool,
    pub per_page: u32,
}

impl SearchPage {
    pub fn single(items: Vec<MediaEntity>, current_page: u32, has_next_page: bool) -> Self {
        let per_page = items.len() as u32;
        Self {
            total_count: None,
            current_page,
            has_next_page,
            per_page,
            items,
        }
    }
}
