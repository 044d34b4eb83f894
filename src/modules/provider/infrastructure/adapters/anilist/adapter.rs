//! AniList provider adapter
//!
//! GraphQL-based adapter for the AniList API. AniList has no chapter-level
//! data, so chapters fall back to the trait default.

use async_trait::async_trait;
use serde_json::{json, Value};

use super::{mapper::AniListMapper, models::*, queries};
use crate::modules::media::{EpisodeEntity, MediaDetailsEntity, MediaEntity, SearchPage};
use crate::modules::provider::infrastructure::adapters::mapper::MediaMapper;
use crate::modules::provider::infrastructure::http_client::RateLimitClient;
use crate::modules::provider::traits::{DetailsOptions, ProviderClient, RateLimiterInfo};
use crate::shared::domain::{MediaType, ProviderId};
use crate::shared::errors::{AppError, AppResult};

const BASE_URL: &str = "https://graphql.anilist.co";
const PER_PAGE: u32 = 20;
const SUPPORTED_TYPES: &[MediaType] = &[MediaType::Anime, MediaType::Manga, MediaType::Novel];

/// AniList provider adapter with GraphQL API
pub struct AniListAdapter {
    http_client: RateLimitClient,
    base_url: String,
    mapper: AniListMapper,
}

impl AniListAdapter {
    pub fn new(user_agent: &str) -> Self {
        Self::with_client(RateLimitClient::for_anilist(user_agent), BASE_URL)
    }

    /// Create adapter with custom HTTP client (for testing)
    pub fn with_client(http_client: RateLimitClient, base_url: &str) -> Self {
        Self {
            http_client,
            base_url: base_url.to_string(),
            mapper: AniListMapper::new(),
        }
    }

    /// Make a GraphQL request to AniList API
    async fn make_graphql_request<T>(&self, query: &str, variables: Value) -> AppResult<T>
    where
        T: serde::de::DeserializeOwned,
    {
        let body = json!({
            "query": query,
            "variables": variables,
        });

        let graphql_response: Value = self.http_client.post_json(&self.base_url, &body).await?;
        Self::extract_data(graphql_response)
    }

    /// Unwrap the `data` field, turning GraphQL errors into the error taxonomy
    fn extract_data<T>(mut graphql_response: Value) -> AppResult<T>
    where
        T: serde::de::DeserializeOwned,
    {
        if let Some(errors) = graphql_response.get("errors").filter(|e| !e.is_null()) {
            let errors: Vec<AniListError> =
                serde_json::from_value(errors.clone()).unwrap_or_default();
            let not_found = errors.iter().any(|e| e.status == Some(404));
            let message = errors
                .iter()
                .map(|e| e.message.as_str())
                .collect::<Vec<_>>()
                .join("; ");

            return Err(if not_found {
                AppError::NotFound(format!("AniList: {}", message))
            } else {
                AppError::ApiError(format!("AniList GraphQL errors: {}", message))
            });
        }

        let data = graphql_response
            .get_mut("data")
            .map(Value::take)
            .ok_or_else(|| AppError::ApiError("No data field in AniList response".to_string()))?;

        serde_json::from_value(data).map_err(|e| {
            AppError::SerializationError(format!("Failed to deserialize AniList data: {}", e))
        })
    }

    fn media_type_variables(media_type: MediaType) -> (&'static str, Option<Vec<&'static str>>) {
        match media_type {
            MediaType::Manga => ("MANGA", Some(vec!["MANGA", "ONE_SHOT"])),
            MediaType::Novel => ("MANGA", Some(vec!["NOVEL"])),
            _ => ("ANIME", None),
        }
    }

    fn parse_id(id: &str) -> AppResult<i64> {
        id.trim()
            .parse()
            .map_err(|_| AppError::InvalidInput(format!("Invalid AniList ID: {}", id)))
    }

    async fn browse(&self, media_type: MediaType, page: u32, sort: &str) -> AppResult<Vec<MediaEntity>> {
        let (kind, formats) = Self::media_type_variables(media_type);
        let variables = json!({
            "page": page.max(1),
            "perPage": PER_PAGE,
            "type": kind,
            "format": formats,
            "sort": [sort],
        });

        let response: AniListPageResponse = self
            .make_graphql_request(&queries::browse_query(), variables)
            .await?;
        Ok(self.mapper.map_media_list(response.page.media))
    }

    async fn fetch_media(&self, query: &str, variables: Value) -> AppResult<Media> {
        let response: AniListMediaResponse = self.make_graphql_request(query, variables).await?;
        response
            .media
            .ok_or_else(|| AppError::NotFound("AniList media not found".to_string()))
    }
}

#[async_trait]
impl ProviderClient for AniListAdapter {
    fn provider_id(&self) -> ProviderId {
        ProviderId::AniList
    }

    fn get_rate_limit_info(&self) -> RateLimiterInfo {
        RateLimiterInfo::from_interval(self.http_client.min_interval())
    }

    fn supported_types(&self) -> &'static [MediaType] {
        SUPPORTED_TYPES
    }

    async fn search_media(
        &self,
        query: &str,
        media_type: MediaType,
        page: u32,
        year: Option<i32>,
    ) -> AppResult<SearchPage> {
        let (kind, formats) = Self::media_type_variables(media_type);
        let page = page.max(1);
        let variables = json!({
            "search": query,
            "page": page,
            "perPage": PER_PAGE,
            "type": kind,
            "format": formats,
            "seasonYear": year,
        });

        log::info!("AniList: Searching for '{}' ({})", query, media_type);

        let response: AniListPageResponse = self
            .make_graphql_request(&queries::search_query(), variables)
            .await?;
        let info = response.page.page_info.clone().unwrap_or_default();
        let items = self.mapper.map_media_list(response.page.media);

        Ok(SearchPage {
            total_count: info.total.and_then(|t| u32::try_from(t).ok()),
            current_page: page,
            has_next_page: info.has_next_page.unwrap_or(false),
            per_page: PER_PAGE,
            items,
        })
    }

    async fn get_trending(&self, media_type: MediaType, page: u32) -> AppResult<Vec<MediaEntity>> {
        self.browse(media_type, page, "TRENDING_DESC").await
    }

    async fn get_popular(&self, media_type: MediaType, page: u32) -> AppResult<Vec<MediaEntity>> {
        self.browse(media_type, page, "POPULARITY_DESC").await
    }

    async fn get_media_details(
        &self,
        id: &str,
        _media_type: MediaType,
        options: DetailsOptions,
    ) -> AppResult<MediaDetailsEntity> {
        let variables = json!({
            "id": Self::parse_id(id)?,
            "withCharacters": options.include_characters,
            "withStaff": options.include_staff,
            "withReviews": options.include_reviews,
        });

        log::info!("AniList: Getting details for ID '{}'", id);

        let media = self.fetch_media(&queries::details_query(), variables).await?;
        self.mapper.map_details(media)
    }

    async fn get_episodes(
        &self,
        media_id: &str,
        cover_image_hint: Option<&str>,
    ) -> AppResult<Vec<EpisodeEntity>> {
        let variables = json!({ "id": Self::parse_id(media_id)? });
        let media = self.fetch_media(&queries::episodes_query(), variables).await?;

        let episodes = self.mapper.map_episodes(&media, cover_image_hint);
        log::debug!("AniList: {} episodes for '{}'", episodes.len(), media_id);
        Ok(episodes)
    }
}
