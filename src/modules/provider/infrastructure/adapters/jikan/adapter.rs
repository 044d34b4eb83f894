use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use std::sync::Arc;

use super::{mapper::JikanMapper, models::*};
use crate::modules::media::{
    ChapterEntity, EpisodeEntity, MediaDetailsEntity, MediaEntity, PageProvider, PageResult,
    SearchPage,
};
use crate::modules::provider::credentials::{CredentialStore, TrackingService};
use crate::modules::provider::infrastructure::adapters::mapper::MediaMapper;
use crate::modules::provider::infrastructure::http_client::{RateLimitClient, RetryPolicy};
use crate::modules::provider::traits::{DetailsOptions, ProviderClient, RateLimiterInfo};
use crate::shared::domain::{MediaType, ProviderId};
use crate::shared::errors::{AppError, AppResult};

const BASE_URL: &str = "https://api.jikan.moe/v4";
const MAL_API_URL: &str = "https://api.myanimelist.net/v2";
/// Jikan serves episode lists in fixed pages of 100
pub const EPISODES_PER_PAGE: usize = 100;
/// Upper bound on pages walked for a full episode list (One Piece sized)
const MAX_EPISODE_PAGES: u32 = 15;
const SEARCH_LIMIT: u32 = 20;
const SUPPORTED_TYPES: &[MediaType] = &[MediaType::Anime, MediaType::Manga, MediaType::Novel];

/// Jikan (MyAnimeList) provider adapter
pub struct JikanAdapter {
    http_client: RateLimitClient,
    mal_client: RateLimitClient,
    base_url: String,
    mal_api_url: String,
    mapper: JikanMapper,
    credentials: Option<Arc<dyn CredentialStore>>,
}

impl JikanAdapter {
    pub fn new(user_agent: &str, credentials: Option<Arc<dyn CredentialStore>>) -> Self {
        Self {
            http_client: RateLimitClient::for_jikan(user_agent),
            // Token failures must surface at once, never retried
            mal_client: RateLimitClient::for_jikan(user_agent).with_retry_policy(RetryPolicy::no_retry()),
            base_url: BASE_URL.to_string(),
            mal_api_url: MAL_API_URL.to_string(),
            mapper: JikanMapper::new(),
            credentials,
        }
    }

    /// Point both APIs at another host (for testing)
    pub fn with_base_urls(mut self, base_url: &str, mal_api_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self.mal_api_url = mal_api_url.trim_end_matches('/').to_string();
        self
    }

    fn parse_id(id: &str) -> AppResult<u32> {
        id.trim()
            .parse()
            .map_err(|_| AppError::InvalidInput(format!("Invalid MyAnimeList ID: {}", id)))
    }

    fn catalog_for(media_type: MediaType) -> &'static str {
        if media_type.is_readable() {
            "manga"
        } else {
            "anime"
        }
    }

    /// Jikan's `type` filter for the search endpoint
    fn type_filter(media_type: MediaType) -> Option<&'static str> {
        match media_type {
            MediaType::Novel => Some("lightnovel"),
            MediaType::Movie => Some("movie"),
            _ => None,
        }
    }

    /// One native page of episodes (1-based)
    pub async fn get_episodes_native_page(
        &self,
        id: u32,
        page: u32,
    ) -> AppResult<JikanList<AnimeEpisode>> {
        let url = format!("{}/anime/{}/episodes?page={}", self.base_url, id, page);
        log::debug!("Jikan: Getting episodes for anime ID '{}' (page {})", id, page);
        self.http_client.get(&url).await
    }

    async fn get_list<T>(&self, url: &str) -> AppResult<Vec<T>>
    where
        T: serde::de::DeserializeOwned,
    {
        let response: JikanList<T> = self.http_client.get(url).await?;
        Ok(response.data)
    }

    /// Optional detail sections never fail the details call
    async fn get_optional_list<T>(&self, enabled: bool, url: String) -> Vec<T>
    where
        T: serde::de::DeserializeOwned,
    {
        if !enabled {
            return Vec::new();
        }

        match self.get_list(&url).await {
            Ok(items) => items,
            Err(e) => {
                e.log_provider_failure("jikan", "detail section");
                Vec::new()
            }
        }
    }

    async fn browse(&self, media_type: MediaType, page: u32, filter: &str) -> AppResult<Vec<MediaEntity>> {
        let url = format!(
            "{}/top/{}?filter={}&page={}&limit={}",
            self.base_url,
            Self::catalog_for(media_type),
            filter,
            page.max(1),
            SEARCH_LIMIT
        );
        let items: Vec<JikanMedia> = self.get_list(&url).await?;
        Ok(self.mapper.map_media_list(items))
    }

    /// Chapter count from the authenticated MyAnimeList API
    async fn get_mal_chapter_count(&self, id: u32) -> AppResult<Option<u32>> {
        let Some(credentials) = &self.credentials else {
            return Err(AppError::DataUnavailable(
                "MyAnimeList chapter data needs a connected account".to_string(),
            ));
        };

        let token = credentials
            .access_token(TrackingService::MyAnimeList)
            .await?
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| {
                AppError::AuthRequired("MyAnimeList login required to read chapter data".to_string())
            })?;

        let mut headers = HeaderMap::new();
        let bearer = HeaderValue::from_str(&format!("Bearer {}", token))
            .map_err(|_| AppError::AuthRequired("Stored MyAnimeList token is malformed".to_string()))?;
        headers.insert(AUTHORIZATION, bearer);

        let url = format!("{}/manga/{}?fields=num_chapters", self.mal_api_url, id);
        let response: MalMangaChapters = match self.mal_client.get_with_headers(&url, headers).await {
            Ok(response) => response,
            Err(AppError::Unauthorized(msg)) => {
                return Err(AppError::AuthRequired(format!(
                    "MyAnimeList token rejected: {}",
                    msg
                )))
            }
            Err(e) => return Err(e),
        };

        Ok(response
            .num_chapters
            .filter(|n| *n > 0)
            .and_then(|n| u32::try_from(n).ok()))
    }
}

#[async_trait]
impl ProviderClient for JikanAdapter {
    fn provider_id(&self) -> ProviderId {
        ProviderId::Jikan
    }

    fn get_rate_limit_info(&self) -> RateLimiterInfo {
        RateLimiterInfo::from_interval(self.http_client.min_interval())
    }

    fn supported_types(&self) -> &'static [MediaType] {
        SUPPORTED_TYPES
    }

    fn supports_episode_paging(&self) -> bool {
        true
    }

    async fn search_media(
        &self,
        query: &str,
        media_type: MediaType,
        page: u32,
        year: Option<i32>,
    ) -> AppResult<SearchPage> {
        let page = page.max(1);
        let mut url = format!(
            "{}/{}?q={}&page={}&limit={}",
            self.base_url,
            Self::catalog_for(media_type),
            urlencoding::encode(query),
            page,
            SEARCH_LIMIT
        );
        if let Some(kind) = Self::type_filter(media_type) {
            url.push_str(&format!("&type={}", kind));
        }
        if let Some(year) = year {
            url.push_str(&format!("&start_date={}-01-01&end_date={}-12-31", year, year));
        }

        log::info!("Jikan: Searching for '{}' ({})", query, media_type);

        let response: JikanList<JikanMedia> = self.http_client.get(&url).await?;
        let has_next_page = response.has_next_page();
        let total_count = response
            .pagination
            .as_ref()
            .and_then(|p| p.items.as_ref())
            .map(|items| items.total);

        Ok(SearchPage {
            items: self.mapper.map_media_list(response.data),
            total_count,
            current_page: page,
            has_next_page,
            per_page: SEARCH_LIMIT,
        })
    }

    async fn get_trending(&self, media_type: MediaType, page: u32) -> AppResult<Vec<MediaEntity>> {
        let filter = if media_type.is_readable() { "publishing" } else { "airing" };
        self.browse(media_type, page, filter).await
    }

    async fn get_popular(&self, media_type: MediaType, page: u32) -> AppResult<Vec<MediaEntity>> {
        self.browse(media_type, page, "bypopularity").await
    }

    async fn get_media_details(
        &self,
        id: &str,
        media_type: MediaType,
        options: DetailsOptions,
    ) -> AppResult<MediaDetailsEntity> {
        let mal_id = Self::parse_id(id)?;
        let catalog = Self::catalog_for(media_type);

        log::info!("Jikan: Getting details for {} ID '{}'", catalog, mal_id);

        let url = format!("{}/{}/{}/full", self.base_url, catalog, mal_id);
        let media: JikanItem<JikanMedia> = self.http_client.get(&url).await?;

        let characters = self
            .get_optional_list(
                options.include_characters,
                format!("{}/{}/{}/characters", self.base_url, catalog, mal_id),
            )
            .await;
        // Jikan has no manga staff endpoint
        let staff = self
            .get_optional_list(
                options.include_staff && catalog == "anime",
                format!("{}/anime/{}/staff", self.base_url, mal_id),
            )
            .await;
        let reviews = self
            .get_optional_list(
                options.include_reviews,
                format!("{}/{}/{}/reviews", self.base_url, catalog, mal_id),
            )
            .await;

        self.mapper.map_details(media.data, characters, staff, reviews)
    }

    async fn get_episodes(
        &self,
        media_id: &str,
        cover_image_hint: Option<&str>,
    ) -> AppResult<Vec<EpisodeEntity>> {
        let id = Self::parse_id(media_id)?;
        let mut episodes = Vec::new();

        for page in 1..=MAX_EPISODE_PAGES {
            let response = self.get_episodes_native_page(id, page).await?;
            let has_next = response.has_next_page();

            episodes.extend(
                response
                    .data
                    .into_iter()
                    .map(|e| self.mapper.map_episode(media_id, e, cover_image_hint)),
            );

            if !has_next {
                break;
            }
        }

        log::info!("Jikan: Found {} episodes for anime ID '{}'", episodes.len(), id);
        Ok(episodes)
    }

    /// Window over Jikan's native 100-episode pages
    async fn get_episode_page(
        &self,
        media_id: &str,
        offset: usize,
        limit: usize,
    ) -> AppResult<PageResult<EpisodeEntity>> {
        let id = Self::parse_id(media_id)?;
        let mut page = (offset / EPISODES_PER_PAGE) as u32 + 1;
        let mut skip = offset % EPISODES_PER_PAGE;
        let mut items = Vec::with_capacity(limit);
        let mut more = false;

        loop {
            let response = self.get_episodes_native_page(id, page).await?;
            let has_next = response.has_next_page();
            let available = response.data.len().saturating_sub(skip);
            let taken = available.min(limit - items.len());

            items.extend(
                response
                    .data
                    .into_iter()
                    .skip(skip)
                    .take(taken)
                    .map(|e| self.mapper.map_episode(media_id, e, None)),
            );

            if items.len() >= limit {
                more = available > taken || has_next;
                break;
            }
            if !has_next {
                break;
            }

            page += 1;
            skip = 0;
        }

        let next_offset = more.then_some(offset + items.len());
        Ok(PageResult {
            items,
            next_offset,
            provider_id: PageProvider::Provider(ProviderId::Jikan),
            provider_media_id: Some(media_id.to_string()),
        })
    }

    /// Jikan has no chapter list; MyAnimeList only exposes a count, returned as placeholders
    async fn get_chapters(&self, media_id: &str) -> AppResult<Vec<ChapterEntity>> {
        let id = Self::parse_id(media_id)?;

        match self.get_mal_chapter_count(id).await? {
            Some(total) => Ok(ChapterEntity::placeholders(media_id, total, ProviderId::Jikan)),
            None => Ok(Vec::new()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::provider::credentials::MockCredentialStore;

    #[tokio::test]
    async fn test_chapters_without_store_are_unavailable() {
        let adapter = JikanAdapter::new("kizuna-test", None);
        let result = adapter.get_chapters("2").await;
        assert!(matches!(result, Err(AppError::DataUnavailable(_))));
    }

    #[tokio::test]
    async fn test_chapters_without_token_require_auth() {
        let mut store = MockCredentialStore::new();
        store
            .expect_access_token()
            .withf(|service| *service == TrackingService::MyAnimeList)
            .times(1)
            .returning(|_| Ok(None));

        let adapter = JikanAdapter::new("kizuna-test", Some(Arc::new(store)));
        let result = adapter.get_chapters("2").await;
        assert!(matches!(result, Err(AppError::AuthRequired(_))));
    }

    #[tokio::test]
    async fn test_blank_token_requires_auth() {
        let mut store = MockCredentialStore::new();
        store
            .expect_access_token()
            .returning(|_| Ok(Some("  ".to_string())));

        let adapter = JikanAdapter::new("kizuna-test", Some(Arc::new(store)));
        assert!(matches!(
            adapter.get_chapters("2").await,
            Err(AppError::AuthRequired(_))
        ));
    }

    #[tokio::test]
    async fn test_invalid_id_is_rejected() {
        let adapter = JikanAdapter::new("kizuna-test", None);
        assert!(matches!(
            adapter.get_episodes("one-piece", None).await,
            Err(AppError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_catalog_selection() {
        assert_eq!(JikanAdapter::catalog_for(MediaType::Manga), "manga");
        assert_eq!(JikanAdapter::catalog_for(MediaType::Anime), "anime");
        assert_eq!(JikanAdapter::type_filter(MediaType::Novel), Some("lightnovel"));
    }
}
