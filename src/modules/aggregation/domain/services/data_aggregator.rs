use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use crate::modules::matching::MatchSet;
use crate::modules::media::{ChapterEntity, EpisodeEntity, MediaEntity};
use crate::modules::provider::traits::ContentFetcher;
use crate::shared::domain::ProviderId;
use crate::shared::errors::AppResult;
use crate::shared::utils::cancellation::{ensure_active, run_with_deadline};

/// Fallback order for episode lists after the primary catalog
pub const EPISODE_PRIORITY: [ProviderId; 5] = [
    ProviderId::Kitsu,
    ProviderId::AniList,
    ProviderId::Jikan,
    ProviderId::Tmdb,
    ProviderId::Simkl,
];

/// Kitsu first since it is the only catalog with chapter-level data
const CHAPTER_PRIORITY_HEAD: ProviderId = ProviderId::Kitsu;
const CHAPTER_PRIORITY_TAIL: [ProviderId; 2] = [ProviderId::AniList, ProviderId::Jikan];

/// A catalog to ask, with the id that catalog knows the title by
#[derive(Debug, Clone, PartialEq)]
pub struct FetchTarget {
    pub provider: ProviderId,
    pub media_id: String,
    pub cover_image: Option<String>,
}

/// Turns a primary title plus its matches into one episode or chapter list.
///
/// The first catalog that returns a non-empty list wins; lists are never merged.
pub struct DataAggregator {
    fetcher: Arc<dyn ContentFetcher>,
    fetch_timeout: Duration,
}

impl DataAggregator {
    pub fn new(fetcher: Arc<dyn ContentFetcher>, fetch_timeout: Duration) -> Self {
        Self {
            fetcher,
            fetch_timeout,
        }
    }

    /// Primary catalog first, then [`EPISODE_PRIORITY`], skipping catalogs without an id
    pub fn episode_targets(primary: &MediaEntity, matches: &MatchSet) -> Vec<FetchTarget> {
        let order = std::iter::once(primary.source_id)
            .chain(EPISODE_PRIORITY.into_iter().filter(|p| *p != primary.source_id));
        Self::targets(order, primary, matches)
    }

    /// Kitsu, then the primary catalog, then AniList and Jikan
    pub fn chapter_targets(primary: &MediaEntity, matches: &MatchSet) -> Vec<FetchTarget> {
        let mut order = vec![CHAPTER_PRIORITY_HEAD];
        for provider in std::iter::once(primary.source_id).chain(CHAPTER_PRIORITY_TAIL) {
            if !order.contains(&provider) {
                order.push(provider);
            }
        }
        Self::targets(order.into_iter(), primary, matches)
    }

    fn targets(
        order: impl Iterator<Item = ProviderId>,
        primary: &MediaEntity,
        matches: &MatchSet,
    ) -> Vec<FetchTarget> {
        order
            .filter_map(|provider| {
                if provider == primary.source_id {
                    return Some(FetchTarget {
                        provider,
                        media_id: primary.id.clone(),
                        cover_image: primary.cover_image.clone(),
                    });
                }
                matches.get(provider).map(|found| FetchTarget {
                    provider,
                    media_id: found.provider_media_id.clone(),
                    cover_image: found
                        .cover_image()
                        .map(str::to_string)
                        .or_else(|| primary.cover_image.clone()),
                })
            })
            .collect()
    }

    pub async fn aggregate_episodes(
        &self,
        primary: &MediaEntity,
        matches: &MatchSet,
        cancel: &CancellationToken,
    ) -> AppResult<Vec<EpisodeEntity>> {
        for target in Self::episode_targets(primary, matches) {
            ensure_active(cancel)?;

            let label = format!("{} episodes", target.provider);
            let result = run_with_deadline(
                cancel,
                self.fetch_timeout,
                &label,
                self.fetcher.fetch_episodes(
                    target.provider,
                    &target.media_id,
                    target.cover_image.as_deref(),
                ),
            )
            .await;

            match result {
                Ok(episodes) if !episodes.is_empty() => {
                    tracing::info!(
                        provider = %target.provider,
                        count = episodes.len(),
                        "Episodes for '{}'",
                        primary.title
                    );
                    return Ok(episodes);
                }
                Ok(_) => tracing::debug!(provider = %target.provider, "No episodes for '{}'", primary.title),
                Err(e) if e.is_fatal() => return Err(e),
                Err(e) => e.log_provider_failure(target.provider.as_str(), "episode fetch"),
            }
        }

        tracing::info!("No catalog returned episodes for '{}'", primary.title);
        Ok(Vec::new())
    }

    /// First real chapter list in [`Self::chapter_targets`] order, else placeholders.
    ///
    /// A list made only of placeholders is a count, not chapter data: it is
    /// used for the total only when neither the primary nor a match knows one.
    pub async fn aggregate_chapters(
        &self,
        primary: &MediaEntity,
        matches: &MatchSet,
        cancel: &CancellationToken,
    ) -> AppResult<Vec<ChapterEntity>> {
        let mut reported_total: Option<(ProviderId, String, u32)> = None;

        for target in Self::chapter_targets(primary, matches) {
            ensure_active(cancel)?;

            let label = format!("{} chapters", target.provider);
            let result = run_with_deadline(
                cancel,
                self.fetch_timeout,
                &label,
                self.fetcher.fetch_chapters(target.provider, &target.media_id),
            )
            .await;

            match result {
                Ok(chapters) if !chapters.is_empty() && chapters.iter().all(|c| c.is_placeholder) => {
                    tracing::debug!(
                        provider = %target.provider,
                        count = chapters.len(),
                        "Only a chapter count for '{}'",
                        primary.title
                    );
                    if reported_total.is_none() {
                        let total = u32::try_from(chapters.len()).unwrap_or(u32::MAX);
                        reported_total = Some((target.provider, target.media_id.clone(), total));
                    }
                }
                Ok(chapters) if !chapters.is_empty() => {
                    tracing::info!(
                        provider = %target.provider,
                        count = chapters.len(),
                        "Chapters for '{}'",
                        primary.title
                    );
                    return Ok(chapters);
                }
                Ok(_) => tracing::debug!(provider = %target.provider, "No chapters for '{}'", primary.title),
                Err(e) if e.is_fatal() => return Err(e),
                Err(e) => e.log_provider_failure(target.provider.as_str(), "chapter fetch"),
            }
        }

        match Self::known_chapter_total(primary, matches).or(reported_total) {
            Some((provider, media_id, total)) => {
                tracing::info!(
                    provider = %provider,
                    total,
                    "Synthesising placeholder chapters for '{}'",
                    primary.title
                );
                Ok(ChapterEntity::placeholders(&media_id, total, provider))
            }
            None => Ok(Vec::new()),
        }
    }

    /// Best-known chapter count: the primary's, then each match's in chapter priority order
    fn known_chapter_total(primary: &MediaEntity, matches: &MatchSet) -> Option<(ProviderId, String, u32)> {
        if let Some(total) = primary.total_chapters.filter(|t| *t > 0) {
            return Some((primary.source_id, primary.id.clone(), total));
        }

        let prioritized = Self::chapter_targets(primary, matches)
            .into_iter()
            .map(|target| target.provider)
            .chain(matches.providers());

        for provider in prioritized {
            let total = matches
                .get(provider)
                .and_then(|found| found.media.as_ref())
                .and_then(|media| media.total_chapters)
                .filter(|t| *t > 0);
            if let (Some(total), Some(found)) = (total, matches.get(provider)) {
                return Some((provider, found.provider_media_id.clone(), total));
            }
        }
        None
    }
}
