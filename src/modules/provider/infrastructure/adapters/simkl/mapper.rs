use super::models::*;
use crate::modules::media::{EpisodeEntity, MediaDetailsEntity, MediaEntity, MediaStatus};
use crate::modules::provider::infrastructure::adapters::mapper::{
    alternative_titles, clean_description, parse_date, positive_count, MediaMapper,
};
use crate::shared::domain::{MediaType, ProviderId};
use crate::shared::errors::{AppError, AppResult};

/// Simkl specific mapper implementation
#[derive(Debug, Clone, Default)]
pub struct SimklMapper;

impl SimklMapper {
    pub fn new() -> Self {
        Self
    }

    fn map_media_type(kind: Option<&str>, fallback: MediaType) -> MediaType {
        match kind {
            Some("anime") => MediaType::Anime,
            Some("tv") | Some("show") => MediaType::TvShow,
            Some("movie") => MediaType::Movie,
            _ => fallback,
        }
    }

    fn image_url(path: Option<&str>, kind: &str, suffix: &str) -> Option<String> {
        path.filter(|p| !p.is_empty())
            .map(|p| format!("{}/{}/{}{}.webp", IMAGE_BASE_URL, kind, p, suffix))
    }

    fn year_start(year: Option<i32>) -> Option<chrono::NaiveDate> {
        year.and_then(|y| chrono::NaiveDate::from_ymd_opt(y, 1, 1))
    }

    /// Search rows carry no type when the catalog was chosen by the path
    pub fn map_search_item(&self, item: SimklSearchItem, searched: MediaType) -> AppResult<MediaEntity> {
        let id = item
            .ids
            .id()
            .ok_or_else(|| AppError::SerializationError("Simkl entry without id".to_string()))?;
        let title = item
            .title_en
            .as_deref()
            .or(item.title.as_deref())
            .or(item.title_romaji.as_deref())
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| AppError::SerializationError(format!("Simkl entry {} has no title", id)))?
            .to_string();

        let alternative_titles = alternative_titles(
            &title,
            [item.title.as_deref(), item.title_romaji.as_deref()],
        );

        let mut media = MediaEntity::new(
            id.to_string(),
            title,
            Self::map_media_type(item.kind.as_deref(), searched),
            ProviderId::Simkl,
        );
        media.alternative_titles = alternative_titles;
        media.cover_image = Self::image_url(item.poster.as_deref(), "posters", "_m");
        media.total_episodes = positive_count(item.ep_count);
        media.start_date = Self::year_start(item.year);
        Ok(media)
    }

    pub fn map_search_results(&self, items: Vec<SimklSearchItem>, searched: MediaType) -> Vec<MediaEntity> {
        items
            .into_iter()
            .filter_map(|item| match self.map_search_item(item, searched) {
                Ok(media) => Some(media),
                Err(e) => {
                    log::debug!("Dropping unmappable Simkl entry: {}", e);
                    None
                }
            })
            .collect()
    }

    pub fn map_details(&self, details: SimklDetails, requested: MediaType) -> AppResult<MediaDetailsEntity> {
        let description = clean_description(details.overview.as_deref());
        let mut media = self.map_media(details.clone())?;
        if details.kind.is_none() {
            media.media_type = requested;
        }
        Ok(MediaDetailsEntity {
            description,
            ..MediaDetailsEntity::from_media(media)
        })
    }

    /// Regular episodes only, numbered by position when Simkl omits the number
    pub fn map_episodes(
        &self,
        media_id: &str,
        episodes: Vec<SimklEpisode>,
        cover_image_hint: Option<&str>,
    ) -> Vec<EpisodeEntity> {
        episodes
            .into_iter()
            .filter(|e| !e.is_special())
            .enumerate()
            .map(|(index, episode)| {
                let number = positive_count(episode.episode).unwrap_or(index as u32 + 1);
                let title = episode
                    .title
                    .filter(|t| !t.trim().is_empty())
                    .unwrap_or_else(|| format!("Episode {}", number));

                let mut entity = EpisodeEntity::new(media_id, number, title, ProviderId::Simkl);
                entity.season_number = positive_count(episode.season);
                entity.release_date = parse_date(episode.date.as_deref());
                entity.thumbnail = Self::image_url(episode.img.as_deref(), "episodes", "_w")
                    .or_else(|| cover_image_hint.map(str::to_string));
                entity
            })
            .collect()
    }
}

impl MediaMapper<SimklDetails> for SimklMapper {
    fn map_media(&self, details: SimklDetails) -> AppResult<MediaEntity> {
        let id = details
            .ids
            .id()
            .ok_or_else(|| AppError::SerializationError("Simkl entry without id".to_string()))?;
        let title = details
            .en_title
            .as_deref()
            .or(details.title.as_deref())
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| AppError::SerializationError(format!("Simkl entry {} has no title", id)))?
            .to_string();

        let mut candidates = vec![details.title.as_deref()];
        candidates.extend(details.alt_titles.iter().map(|t| Some(t.name.as_str())));
        let alternative_titles = alternative_titles(&title, candidates);

        let mut media = MediaEntity::new(
            id.to_string(),
            title,
            Self::map_media_type(details.kind.as_deref(), MediaType::Anime),
            ProviderId::Simkl,
        );
        media.alternative_titles = alternative_titles;
        media.cover_image = Self::image_url(details.poster.as_deref(), "posters", "_m");
        media.banner_image = Self::image_url(details.fanart.as_deref(), "fanart", "_medium");
        media.total_episodes = positive_count(details.total_episodes);
        media.start_date =
            parse_date(details.first_aired.as_deref()).or_else(|| Self::year_start(details.year));
        media.status = details
            .status
            .as_deref()
            .map(MediaStatus::from)
            .unwrap_or_default();
        media.rating = details
            .ratings
            .and_then(|r| r.simkl)
            .and_then(|r| r.rating);
        media.genres = details.genres;
        Ok(media)
    }
}
