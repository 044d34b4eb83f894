//! Kitsu provider adapter
//!
//! JSON:API REST adapter. Kitsu is the only catalog that pages both episodes
//! and chapters natively, with a hard page size of 20.

use async_trait::async_trait;

use super::{mapper::KitsuMapper, models::*};
use crate::modules::media::{
    ChapterEntity, EpisodeEntity, MediaDetailsEntity, MediaEntity, PageProvider, PageResult,
    SearchPage,
};
use crate::modules::provider::infrastructure::adapters::mapper::MediaMapper;
use crate::modules::provider::infrastructure::http_client::RateLimitClient;
use crate::modules::provider::traits::{DetailsOptions, ProviderClient, RateLimiterInfo};
use crate::shared::domain::{MediaType, ProviderId};
use crate::shared::errors::{AppError, AppResult};

const BASE_URL: &str = "https://kitsu.io/api/edge";
/// Largest page Kitsu serves
pub const MAX_PAGE_SIZE: usize = 20;
/// Bounds a full episode or chapter walk (2000 entries)
const MAX_PAGES: usize = 100;
const SUPPORTED_TYPES: &[MediaType] = &[
    MediaType::Anime,
    MediaType::Manga,
    MediaType::Novel,
    MediaType::Movie,
];

/// Which paged sub-collection of a media entry to read
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Listing {
    Episodes,
    Chapters,
}

impl Listing {
    fn path(&self, id: &str) -> String {
        match self {
            Listing::Episodes => format!("/anime/{}/episodes", id),
            Listing::Chapters => format!("/manga/{}/chapters", id),
        }
    }
}

/// Kitsu provider adapter with JSON:API
pub struct KitsuAdapter {
    http_client: RateLimitClient,
    base_url: String,
    mapper: KitsuMapper,
}

impl KitsuAdapter {
    pub fn new(user_agent: &str) -> Self {
        Self::with_client(RateLimitClient::for_kitsu(user_agent), BASE_URL)
    }

    /// Create adapter with custom HTTP client (for testing)
    pub fn with_client(http_client: RateLimitClient, base_url: &str) -> Self {
        Self {
            http_client,
            base_url: base_url.trim_end_matches('/').to_string(),
            mapper: KitsuMapper::new(),
        }
    }

    fn validate_id(id: &str) -> AppResult<&str> {
        let id = id.trim();
        if id.is_empty() || !id.chars().all(|c| c.is_ascii_digit()) {
            return Err(AppError::InvalidInput(format!("Invalid Kitsu ID: {}", id)));
        }
        Ok(id)
    }

    fn catalog_for(media_type: MediaType) -> &'static str {
        if media_type.is_readable() {
            "manga"
        } else {
            "anime"
        }
    }

    fn subtype_filter(media_type: MediaType) -> Option<&'static str> {
        match media_type {
            MediaType::Novel => Some("novel"),
            MediaType::Movie => Some("movie"),
            _ => None,
        }
    }

    fn page_params(offset: usize, limit: usize) -> String {
        format!("page[limit]={}&page[offset]={}", limit.clamp(1, MAX_PAGE_SIZE), offset)
    }

    async fn get_listing_page<A>(
        &self,
        listing: Listing,
        id: &str,
        offset: usize,
        limit: usize,
    ) -> AppResult<KitsuCollection<A>>
    where
        A: serde::de::DeserializeOwned,
    {
        let url = format!(
            "{}{}?sort=number&{}",
            self.base_url,
            listing.path(id),
            Self::page_params(offset, limit)
        );
        self.http_client.get(&url).await
    }

    /// Every entry of a listing, walked page by page
    async fn get_full_listing<A>(&self, listing: Listing, id: &str) -> AppResult<Vec<KitsuResource<A>>>
    where
        A: serde::de::DeserializeOwned,
    {
        let mut items = Vec::new();

        for page in 0..MAX_PAGES {
            let response: KitsuCollection<A> = self
                .get_listing_page(listing, id, page * MAX_PAGE_SIZE, MAX_PAGE_SIZE)
                .await?;
            let has_next = response.has_next_page() && !response.data.is_empty();
            items.extend(response.data);

            if !has_next {
                break;
            }
        }

        Ok(items)
    }

    /// Window over native pages, stitching several requests when `limit` exceeds one page
    async fn get_listing_window<A>(
        &self,
        listing: Listing,
        id: &str,
        offset: usize,
        limit: usize,
    ) -> AppResult<(Vec<KitsuResource<A>>, bool)>
    where
        A: serde::de::DeserializeOwned,
    {
        let mut items = Vec::with_capacity(limit);
        let mut more = false;

        while items.len() < limit {
            let cursor = offset + items.len();
            let wanted = (limit - items.len()).min(MAX_PAGE_SIZE);
            let response: KitsuCollection<A> =
                self.get_listing_page(listing, id, cursor, wanted).await?;

            let received = response.data.len();
            more = match response.total_count() {
                Some(total) => (cursor + received) < total as usize,
                None => response.has_next_page(),
            };
            items.extend(response.data);

            if received == 0 || !more {
                break;
            }
        }

        Ok((items, more))
    }

    async fn get_collection(&self, url: &str) -> AppResult<KitsuCollection<MediaAttributes>> {
        self.http_client.get(url).await
    }
}

#[async_trait]
impl ProviderClient for KitsuAdapter {
    fn provider_id(&self) -> ProviderId {
        ProviderId::Kitsu
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
        let offset = (page as usize - 1) * MAX_PAGE_SIZE;
        let mut url = format!(
            "{}/{}?filter[text]={}&{}",
            self.base_url,
            Self::catalog_for(media_type),
            urlencoding::encode(query),
            Self::page_params(offset, MAX_PAGE_SIZE)
        );
        if let Some(subtype) = Self::subtype_filter(media_type) {
            url.push_str(&format!("&filter[subtype]={}", subtype));
        }
        if let (Some(year), false) = (year, media_type.is_readable()) {
            url.push_str(&format!("&filter[seasonYear]={}", year));
        }

        log::info!("Kitsu: Searching for '{}' ({})", query, media_type);

        let response = self.get_collection(&url).await?;
        let has_next_page = response.has_next_page();
        let total_count = response.total_count();

        Ok(SearchPage {
            items: self.mapper.map_media_list(response.data),
            total_count,
            current_page: page,
            has_next_page,
            per_page: MAX_PAGE_SIZE as u32,
        })
    }

    async fn get_trending(&self, media_type: MediaType, _page: u32) -> AppResult<Vec<MediaEntity>> {
        // The trending endpoint has no pagination
        let url = format!(
            "{}/trending/{}?limit={}",
            self.base_url,
            Self::catalog_for(media_type),
            MAX_PAGE_SIZE
        );
        let response = self.get_collection(&url).await?;
        Ok(self.mapper.map_media_list(response.data))
    }

    async fn get_popular(&self, media_type: MediaType, page: u32) -> AppResult<Vec<MediaEntity>> {
        let offset = (page.max(1) as usize - 1) * MAX_PAGE_SIZE;
        let url = format!(
            "{}/{}?sort=popularityRank&{}",
            self.base_url,
            Self::catalog_for(media_type),
            Self::page_params(offset, MAX_PAGE_SIZE)
        );
        let response = self.get_collection(&url).await?;
        Ok(self.mapper.map_media_list(response.data))
    }

    async fn get_media_details(
        &self,
        id: &str,
        media_type: MediaType,
        options: DetailsOptions,
    ) -> AppResult<MediaDetailsEntity> {
        let id = Self::validate_id(id)?;
        let mut includes = Vec::new();
        if options.include_characters {
            includes.push("characters.character");
        }
        if options.include_staff {
            includes.push("staff.person");
        }
        if options.include_reviews {
            includes.push("reviews");
        }

        let mut url = format!("{}/{}/{}", self.base_url, Self::catalog_for(media_type), id);
        if !includes.is_empty() {
            url.push_str(&format!("?include={}", includes.join(",")));
        }

        log::info!("Kitsu: Getting details for ID '{}'", id);

        let response: KitsuSingle<MediaAttributes> = self.http_client.get(&url).await?;
        self.mapper.map_details(response)
    }

    async fn get_episodes(
        &self,
        media_id: &str,
        cover_image_hint: Option<&str>,
    ) -> AppResult<Vec<EpisodeEntity>> {
        let id = Self::validate_id(media_id)?;
        let episodes: Vec<KitsuEpisode> = self.get_full_listing(Listing::Episodes, id).await?;

        log::debug!("Kitsu: {} episodes for '{}'", episodes.len(), id);
        Ok(self.mapper.map_episodes(id, episodes, cover_image_hint))
    }

    async fn get_chapters(&self, media_id: &str) -> AppResult<Vec<ChapterEntity>> {
        let id = Self::validate_id(media_id)?;
        let chapters: Vec<KitsuChapter> = self.get_full_listing(Listing::Chapters, id).await?;

        log::debug!("Kitsu: {} chapters for '{}'", chapters.len(), id);
        Ok(self.mapper.map_chapters(id, chapters))
    }

    async fn get_episode_page(
        &self,
        media_id: &str,
        offset: usize,
        limit: usize,
    ) -> AppResult<PageResult<EpisodeEntity>> {
        let id = Self::validate_id(media_id)?;
        let (episodes, more): (Vec<KitsuEpisode>, bool) =
            self.get_listing_window(Listing::Episodes, id, offset, limit).await?;

        let fetched = episodes.len();
        Ok(PageResult {
            items: self.mapper.map_episodes(id, episodes, None),
            next_offset: more.then_some(offset + fetched),
            provider_id: PageProvider::Provider(ProviderId::Kitsu),
            provider_media_id: Some(id.to_string()),
        })
    }

    async fn get_chapter_page(
        &self,
        media_id: &str,
        offset: usize,
        limit: usize,
    ) -> AppResult<PageResult<ChapterEntity>> {
        let id = Self::validate_id(media_id)?;
        let (chapters, more): (Vec<KitsuChapter>, bool) =
            self.get_listing_window(Listing::Chapters, id, offset, limit).await?;

        let fetched = chapters.len();
        Ok(PageResult {
            items: self.mapper.map_chapters(id, chapters),
            next_offset: more.then_some(offset + fetched),
            provider_id: PageProvider::Provider(ProviderId::Kitsu),
            provider_media_id: Some(id.to_string()),
        })
    }
}
