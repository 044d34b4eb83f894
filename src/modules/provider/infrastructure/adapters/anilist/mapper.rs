use chrono::NaiveDate;
use regex::Regex;
use std::sync::LazyLock;

use super::models::*;
use crate::modules::media::{
    CharacterEntity, EpisodeEntity, MediaDetailsEntity, MediaEntity, MediaStatus, ReviewEntity,
    StaffEntity,
};
use crate::modules::provider::infrastructure::adapters::mapper::{
    alternative_titles, clean_description, positive_count, MediaMapper,
};
use crate::shared::domain::{MediaType, ProviderId};
use crate::shared::errors::{AppError, AppResult};

static STREAMING_TITLE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?i)episode\s+(\d+)\s*(?:[-:]\s*(.*))?$")
        .expect("streaming title regex should compile")
});

/// AniList specific mapper implementation
#[derive(Debug, Clone, Default)]
pub struct AniListMapper;

impl AniListMapper {
    pub fn new() -> Self {
        Self
    }

    /// Fuzzy dates fall back to the first of the month/year
    fn map_fuzzy_date(date: Option<&FuzzyDate>) -> Option<NaiveDate> {
        let date = date?;
        let year = date.year?;
        NaiveDate::from_ymd_opt(year, date.month.unwrap_or(1), date.day.unwrap_or(1))
            .or_else(|| NaiveDate::from_ymd_opt(year, 1, 1))
    }

    fn map_media_type(media: &Media) -> MediaType {
        match (&media.media_type, &media.format) {
            (Some(AniListMediaType::Manga), Some(MediaFormat::Novel)) => MediaType::Novel,
            (Some(AniListMediaType::Manga), _) => MediaType::Manga,
            _ => MediaType::Anime,
        }
    }

    fn cover_image(media: &Media) -> Option<String> {
        media.cover_image.as_ref().and_then(|cover| {
            cover
                .extra_large
                .clone()
                .or_else(|| cover.large.clone())
                .or_else(|| cover.medium.clone())
        })
    }

    /// Details with whichever optional sections were requested
    pub fn map_details(&self, media: Media) -> AppResult<MediaDetailsEntity> {
        let description = clean_description(media.description.as_deref());

        let characters = media
            .characters
            .as_ref()
            .map(|connection| {
                connection
                    .edges
                    .iter()
                    .filter_map(|edge| {
                        let node = edge.node.as_ref()?;
                        Some(CharacterEntity {
                            name: node.name.as_ref()?.full.clone()?,
                            role: edge.role.clone().unwrap_or_else(|| "SUPPORTING".to_string()),
                            image: node.image.as_ref().and_then(|i| i.large.clone()),
                        })
                    })
                    .collect()
            })
            .unwrap_or_default();

        let staff = media
            .staff
            .as_ref()
            .map(|connection| {
                connection
                    .edges
                    .iter()
                    .filter_map(|edge| {
                        Some(StaffEntity {
                            name: edge.node.as_ref()?.name.as_ref()?.full.clone()?,
                            role: edge.role.clone().unwrap_or_default(),
                        })
                    })
                    .collect()
            })
            .unwrap_or_default();

        let reviews = media
            .reviews
            .as_ref()
            .map(|connection| {
                connection
                    .nodes
                    .iter()
                    .filter_map(|node| {
                        Some(ReviewEntity {
                            summary: node.summary.clone()?,
                            score: node.score.map(|s| s as f64 / 10.0),
                        })
                    })
                    .collect()
            })
            .unwrap_or_default();

        Ok(MediaDetailsEntity {
            media: self.map_media(media)?,
            description,
            characters,
            staff,
            reviews,
        })
    }

    /// Streaming episodes when listed, else numbered entries from the episode count
    pub fn map_episodes(&self, media: &Media, cover_image_hint: Option<&str>) -> Vec<EpisodeEntity> {
        let media_id = media.id.map(|id| id.to_string()).unwrap_or_default();
        let duration = positive_count(media.duration);

        let streaming = media.streaming_episodes.as_deref().unwrap_or_default();
        if !streaming.is_empty() {
            let mut episodes: Vec<EpisodeEntity> = streaming
                .iter()
                .enumerate()
                .map(|(index, episode)| {
                    let raw_title = episode.title.as_deref().unwrap_or_default().trim();
                    let (number, title) = Self::parse_streaming_title(raw_title)
                        .unwrap_or((index as u32 + 1, raw_title.to_string()));
                    let title = if title.is_empty() {
                        format!("Episode {}", number)
                    } else {
                        title
                    };

                    let mut entity = EpisodeEntity::new(&media_id, number, title, ProviderId::AniList);
                    entity.thumbnail = episode.thumbnail.clone();
                    entity.duration = duration;
                    entity
                })
                .collect();

            episodes.sort_by_key(|e| e.number);
            episodes.dedup_by_key(|e| e.number);
            return episodes;
        }

        let total = positive_count(media.episodes).unwrap_or(0);
        let thumbnail = cover_image_hint
            .map(str::to_string)
            .or_else(|| Self::cover_image(media));

        (1..=total)
            .map(|number| {
                let mut entity = EpisodeEntity::new(
                    &media_id,
                    number,
                    format!("Episode {}", number),
                    ProviderId::AniList,
                );
                entity.thumbnail = thumbnail.clone();
                entity.duration = duration;
                entity
            })
            .collect()
    }

    fn parse_streaming_title(raw: &str) -> Option<(u32, String)> {
        let captures = STREAMING_TITLE_REGEX.captures(raw)?;
        let number = captures.get(1)?.as_str().parse().ok()?;
        let title = captures
            .get(2)
            .map(|m| m.as_str().trim().to_string())
            .unwrap_or_default();
        Some((number, title))
    }
}

impl MediaMapper<Media> for AniListMapper {
    fn map_media(&self, media: Media) -> AppResult<MediaEntity> {
        let id = media
            .id
            .ok_or_else(|| AppError::SerializationError("AniList media without id".to_string()))?;

        let titles = media.title.clone().unwrap_or_default();
        let title = titles
            .english
            .as_deref()
            .or(titles.romaji.as_deref())
            .or(titles.native.as_deref())
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| AppError::SerializationError(format!("AniList media {} has no title", id)))?
            .to_string();

        let mut candidates = vec![
            titles.romaji.as_deref(),
            titles.english.as_deref(),
            titles.native.as_deref(),
        ];
        let synonyms = media.synonyms.clone().unwrap_or_default();
        candidates.extend(synonyms.iter().map(|s| Some(s.as_str())));

        let mut entity = MediaEntity::new(
            id.to_string(),
            title.clone(),
            Self::map_media_type(&media),
            ProviderId::AniList,
        );
        entity.alternative_titles = alternative_titles(&title, candidates);
        entity.cover_image = Self::cover_image(&media);
        entity.banner_image = media.banner_image.clone();
        entity.total_episodes = positive_count(media.episodes);
        entity.total_chapters = positive_count(media.chapters);
        entity.start_date = Self::map_fuzzy_date(media.start_date.as_ref());
        entity.status = media
            .status
            .as_deref()
            .map(MediaStatus::from)
            .unwrap_or_default();
        entity.rating = media.average_score.map(|score| score as f64 / 10.0);
        entity.genres = media.genres.unwrap_or_default();

        Ok(entity)
    }
}
