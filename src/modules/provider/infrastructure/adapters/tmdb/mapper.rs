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

/// Crew jobs worth surfacing as staff
const STAFF_JOBS: &[&str] = &[
    "Director",
    "Series Director",
    "Producer",
    "Executive Producer",
    "Original Music Composer",
    "Screenplay",
    "Writer",
    "Series Composition",
];
const MAX_CHARACTERS: usize = 25;

/// TMDB (The Movie Database) specific mapper implementation
#[derive(Debug, Clone, Default)]
pub struct TmdbMapper;

impl TmdbMapper {
    pub fn new() -> Self {
        Self
    }

    fn image_url(path: Option<&str>, size: &str) -> Option<String> {
        path.filter(|p| !p.is_empty())
            .map(|p| format!("{}/{}{}", IMAGE_BASE_URL, size, p))
    }

    /// TMDB has no anime category: Japanese animation is anime, other animation a cartoon
    fn map_media_type(entry: &TmdbEntry, genre_ids: &[u32]) -> MediaType {
        if entry.is_movie() {
            return MediaType::Movie;
        }

        let japanese = entry.original_language.as_deref() == Some("ja")
            || entry.origin_country.iter().any(|c| c == "JP");
        if genre_ids.contains(&GENRE_ANIMATION) {
            if japanese {
                MediaType::Anime
            } else {
                MediaType::Cartoon
            }
        } else if genre_ids.contains(&GENRE_DOCUMENTARY) {
            MediaType::Documentary
        } else {
            MediaType::TvShow
        }
    }

    fn map_entry(&self, entry: TmdbEntry, genre_ids: &[u32]) -> AppResult<MediaEntity> {
        let media_type = Self::map_media_type(&entry, genre_ids);
        let title = entry
            .name
            .as_deref()
            .or(entry.title.as_deref())
            .or(entry.original_name.as_deref())
            .or(entry.original_title.as_deref())
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| AppError::SerializationError(format!("TMDB entry {} has no title", entry.id)))?
            .to_string();

        let alternative_titles = alternative_titles(
            &title,
            [entry.original_name.as_deref(), entry.original_title.as_deref()],
        );
        let start_date = if media_type == MediaType::Movie {
            entry.release_date.as_deref()
        } else {
            entry.first_air_date.as_deref()
        };

        let mut media = MediaEntity::new(entry.id.to_string(), title, media_type, ProviderId::Tmdb);
        media.alternative_titles = alternative_titles;
        media.cover_image = Self::image_url(entry.poster_path.as_deref(), "w500");
        media.banner_image = Self::image_url(entry.backdrop_path.as_deref(), "original");
        media.start_date = parse_date(start_date);
        media.rating = entry.vote_average.filter(|r| *r > 0.0);
        Ok(media)
    }

    pub fn map_details(&self, details: TmdbDetails) -> AppResult<MediaDetailsEntity> {
        let genre_ids: Vec<u32> = details.genres.iter().map(|g| g.id).collect();
        let description = clean_description(details.entry.overview.as_deref());
        let is_movie = details.entry.is_movie();

        let mut media = self.map_entry(details.entry, &genre_ids)?;
        media.genres = details.genres.into_iter().map(|g| g.name).collect();
        media.status = details
            .status
            .as_deref()
            .map(MediaStatus::from)
            .unwrap_or_default();
        media.total_episodes = if is_movie {
            Some(1)
        } else {
            positive_count(details.number_of_episodes)
        };

        let credits = details.credits.unwrap_or_default();
        let characters = credits
            .cast
            .into_iter()
            .take(MAX_CHARACTERS)
            .filter_map(|member| {
                Some(CharacterEntity {
                    name: member.character.filter(|c| !c.trim().is_empty())?,
                    role: format!("Voiced by {}", member.name),
                    image: Self::image_url(member.profile_path.as_deref(), "w185"),
                })
            })
            .collect();
        let staff = credits
            .crew
            .into_iter()
            .filter_map(|member| {
                let job = member.job?;
                STAFF_JOBS
                    .contains(&job.as_str())
                    .then_some(StaffEntity { name: member.name, role: job })
            })
            .collect();
        let reviews = details
            .reviews
            .map(|page| page.results)
            .unwrap_or_default()
            .into_iter()
            .filter_map(|review| {
                Some(ReviewEntity {
                    summary: review.content?.chars().take(500).collect(),
                    score: review.author_details.and_then(|a| a.rating),
                })
            })
            .collect();

        Ok(MediaDetailsEntity {
            media,
            description,
            characters,
            staff,
            reviews,
        })
    }

    /// Episodes of one season, numbered continuously after `offset` earlier episodes
    pub fn map_season_episodes(
        &self,
        media_id: &str,
        season: SeasonDetails,
        offset: u32,
        cover_image_hint: Option<&str>,
    ) -> Vec<EpisodeEntity> {
        season
            .episodes
            .into_iter()
            .enumerate()
            .map(|(index, episode)| {
                let number = offset + index as u32 + 1;
                let title = episode
                    .name
                    .filter(|n| !n.trim().is_empty())
                    .unwrap_or_else(|| format!("Episode {}", episode.episode_number));

                let mut entity = EpisodeEntity::new(media_id, number, title, ProviderId::Tmdb);
                entity.season_number = Some(episode.season_number);
                entity.release_date = parse_date(episode.air_date.as_deref());
                entity.duration = positive_count(episode.runtime);
                entity.thumbnail = Self::image_url(episode.still_path.as_deref(), "w300")
                    .or_else(|| cover_image_hint.map(str::to_string));
                entity
            })
            .collect()
    }
}

impl MediaMapper<TmdbEntry> for TmdbMapper {
    fn map_media(&self, entry: TmdbEntry) -> AppResult<MediaEntity> {
        let genre_ids = entry.genre_ids.clone();
        self.map_entry(entry, &genre_ids)
    }
}
