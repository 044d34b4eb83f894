use crate::modules::matching::{MatchSet, ProviderMatch};
use crate::modules::media::MediaEntity;
use crate::shared::domain::ProviderId;

const LONG_RUNNING_EPISODES: u32 = 100;
const MAX_EPISODE_DRIFT: f64 = 0.5;
const MAX_YEAR_GAP: i32 = 10;

/// Flags cached matches that no longer look like the primary title
#[derive(Debug, Clone, Copy, Default)]
pub struct StaleMatchDetector;

impl StaleMatchDetector {
    pub fn new() -> Self {
        Self
    }

    /// Why `candidate` is stale relative to `primary`, if it is
    pub fn stale_reason(&self, primary: &MediaEntity, candidate: &ProviderMatch) -> Option<&'static str> {
        let Some(snapshot) = candidate.media.as_ref() else {
            return Some("no media snapshot");
        };

        if let (Some(primary_total), Some(candidate_total)) = (primary.total_episodes, snapshot.total_episodes) {
            if primary_total >= LONG_RUNNING_EPISODES {
                let drift = primary_total.abs_diff(candidate_total) as f64 / primary_total as f64;
                if drift >= MAX_EPISODE_DRIFT {
                    return Some("episode count drift");
                }
            }
        }

        if let (Some(primary_year), Some(candidate_year)) = (primary.year(), snapshot.year()) {
            if (primary_year - candidate_year).abs() >= MAX_YEAR_GAP {
                return Some("year gap");
            }
        }

        None
    }

    pub fn is_stale(&self, primary: &MediaEntity, candidate: &ProviderMatch) -> bool {
        self.stale_reason(primary, candidate).is_some()
    }

    /// Providers whose match is stale
    pub fn stale_providers(&self, primary: &MediaEntity, matches: &MatchSet) -> Vec<ProviderId> {
        matches
            .iter()
            .filter_map(|candidate| {
                self.stale_reason(primary, candidate).map(|reason| {
                    log::debug!(
                        "Stale {} match '{}' for '{}': {}",
                        candidate.provider_id,
                        candidate.matched_title,
                        primary.title,
                        reason
                    );
                    candidate.provider_id
                })
            })
            .collect()
    }

    /// Remove stale matches in place, returning how many were dropped
    pub fn drop_stale(&self, primary: &MediaEntity, matches: &mut MatchSet) -> usize {
        let before = matches.len();
        matches.retain(|candidate| !self.is_stale(primary, candidate));
        before - matches.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::domain::MediaType;
    use chrono::NaiveDate;

    fn media(provider: ProviderId, year: i32, episodes: Option<u32>) -> MediaEntity {
        let mut media = MediaEntity::new("1", "One Piece", MediaType::Anime, provider);
        media.start_date = NaiveDate::from_ymd_opt(year, 10, 20);
        media.total_episodes = episodes;
        media
    }

    #[test]
    fn test_missing_snapshot_is_stale() {
        let mut candidate = ProviderMatch::from_candidate(media(ProviderId::Kitsu, 1999, Some(1100)), 0.9);
        candidate.media = None;

        let primary = media(ProviderId::Jikan, 1999, Some(1100));
        assert_eq!(
            StaleMatchDetector.stale_reason(&primary, &candidate),
            Some("no media snapshot")
        );
    }

    #[test]
    fn test_episode_drift_only_for_long_runners() {
        let primary = media(ProviderId::Jikan, 1999, Some(1100));
        let drifted = ProviderMatch::from_candidate(media(ProviderId::Tmdb, 1999, Some(61)), 0.9);
        assert!(StaleMatchDetector.is_stale(&primary, &drifted));

        let short = media(ProviderId::Jikan, 2020, Some(12));
        let half = ProviderMatch::from_candidate(media(ProviderId::Tmdb, 2020, Some(24)), 0.9);
        assert!(!StaleMatchDetector.is_stale(&short, &half));
    }

    #[test]
    fn test_year_gap_of_ten_is_stale() {
        let primary = media(ProviderId::Jikan, 1999, None);
        let remake = ProviderMatch::from_candidate(media(ProviderId::Kitsu, 2009, None), 0.8);
        let close = ProviderMatch::from_candidate(media(ProviderId::AniList, 2000, None), 0.8);

        let mut matches: MatchSet = [remake, close].into_iter().collect();
        assert_eq!(
            StaleMatchDetector.stale_providers(&primary, &matches),
            vec![ProviderId::Kitsu]
        );
        assert_eq!(StaleMatchDetector.drop_stale(&primary, &mut matches), 1);
        assert_eq!(matches.providers(), vec![ProviderId::AniList]);
    }
}
