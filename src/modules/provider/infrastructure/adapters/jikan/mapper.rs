use super::models::*;
use crate::modules::media::{
    CharacterEntity, EpisodeEntity, MediaDetailsEntity, MediaEntity, MediaStatus, ReviewEntity,
    StaffEntity,
};
use crate::modules::provider::infrastructure::adapters::mapper::{
    alternative_titles, clean_description, parse_date, positive_count, MediaMapper,
};
use crate::shared::domain::{MediaType, ProviderId};
use crate::shared::errors::{AppError, AppResult};

/// Jikan specific mapper implementation
#[derive(Debug, Clone, Default)]
pub struct JikanMapper;

impl JikanMapper {
    pub fn new() -> Self {
        Self
    }

    fn map_media_type(kind: Option<&str>) -> MediaType {
        match kind.map(|k| k.to_lowercase()).as_deref() {
            Some("manga") | Some("manhwa") | Some("manhua") | Some("one-shot")
            | Some("doujinshi") => MediaType::Manga,
            Some("light novel") | Some("novel") => MediaType::Novel,
            _ => MediaType::Anime,
        }
    }

    fn extract_image_url(images: Option<&Images>) -> Option<String> {
        let images = images?;
        let pick = |urls: &ImageUrls| {
            urls.large_image_url
                .clone()
                .or_else(|| urls.image_url.clone())
        };
        images
            .jpg
            .as_ref()
            .and_then(pick)
            .or_else(|| images.webp.as_ref().and_then(pick))
    }

    pub fn map_details(
        &self,
        media: JikanMedia,
        characters: Vec<CharacterEdge>,
        staff: Vec<StaffEdge>,
        reviews: Vec<Review>,
    ) -> AppResult<MediaDetailsEntity> {
        let description = clean_description(media.synopsis.as_deref());

        Ok(MediaDetailsEntity {
            media: self.map_media(media)?,
            description,
            characters: characters
                .into_iter()
                .map(|edge| CharacterEntity {
                    image: Self::extract_image_url(edge.character.images.as_ref()),
                    name: edge.character.name,
                    role: edge.role,
                })
                .collect(),
            staff: staff
                .into_iter()
                .map(|edge| StaffEntity {
                    name: edge.person.name,
                    role: edge.positions.join(", "),
                })
                .collect(),
            reviews: reviews
                .into_iter()
                .filter_map(|review| {
                    Some(ReviewEntity {
                        summary: review.review?.chars().take(500).collect(),
                        score: review.score,
                    })
                })
                .collect(),
        })
    }

    pub fn map_episode(
        &self,
        media_id: &str,
        episode: AnimeEpisode,
        cover_image_hint: Option<&str>,
    ) -> EpisodeEntity {
        let title = episode
            .title
            .or(episode.title_romanji)
            .filter(|t| !t.trim().is_empty())
            .unwrap_or_else(|| format!("Episode {}", episode.mal_id));

        let mut entity = EpisodeEntity::new(media_id, episode.mal_id, title, ProviderId::Jikan);
        entity.release_date = parse_date(episode.aired.as_deref());
        entity.thumbnail = cover_image_hint.map(str::to_string);
        entity
    }
}

impl MediaMapper<JikanMedia> for JikanMapper {
    fn map_media(&self, media: JikanMedia) -> AppResult<MediaEntity> {
        let default_title = media
            .titles
            .as_ref()
            .and_then(|titles| titles.iter().find(|t| t.r#type == "Default"))
            .map(|t| t.title.clone());

        let title = media
            .title_english
            .clone()
            .or(media.title.clone())
            .or(default_title)
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .ok_or_else(|| {
                AppError::SerializationError(format!("Jikan entry {} has no title", media.mal_id))
            })?;

        let mut candidates: Vec<Option<&str>> = vec![
            media.title.as_deref(),
            media.title_english.as_deref(),
            media.title_japanese.as_deref(),
        ];
        if let Some(synonyms) = &media.title_synonyms {
            candidates.extend(synonyms.iter().map(|s| Some(s.as_str())));
        }
        if let Some(titles) = &media.titles {
            candidates.extend(titles.iter().map(|t| Some(t.title.as_str())));
        }
        let alternative_titles = alternative_titles(&title, candidates);

        let media_type = Self::map_media_type(media.r#type.as_deref());
        let dates = if media_type.is_readable() {
            media.published.as_ref()
        } else {
            media.aired.as_ref()
        };

        let mut entity = MediaEntity::new(
            media.mal_id.to_string(),
            title,
            media_type,
            ProviderId::Jikan,
        );
        entity.alternative_titles = alternative_titles;
        entity.cover_image = Self::extract_image_url(media.images.as_ref());
        entity.total_episodes = positive_count(media.episodes);
        entity.total_chapters = positive_count(media.chapters);
        entity.start_date = dates
            .and_then(|d| parse_date(d.from.as_deref()))
            .or_else(|| media.year.and_then(|y| chrono::NaiveDate::from_ymd_opt(y, 1, 1)));
        entity.status = media
            .status
            .as_deref()
            .map(MediaStatus::from)
            .unwrap_or_default();
        entity.rating = media.score;
        entity.genres = media
            .genres
            .unwrap_or_default()
            .into_iter()
            .map(|g| g.name)
            .collect();

        Ok(entity)
    }
}
