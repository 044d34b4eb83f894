use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::modules::media::MediaEntity;
use crate::shared::domain::ProviderId;

/// Accepted correspondence between a primary title and one catalog's entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderMatch {
    pub provider_id: ProviderId,
    pub provider_media_id: String,
    pub confidence: f64,
    pub matched_title: String,
    /// Snapshot of the candidate when it was accepted
    #[serde(default)]
    pub media: Option<MediaEntity>,
}

impl ProviderMatch {
    pub fn from_candidate(candidate: MediaEntity, confidence: f64) -> Self {
        Self {
            provider_id: candidate.source_id,
            provider_media_id: candidate.id.clone(),
            confidence: confidence.clamp(0.0, 1.0),
            matched_title: candidate.title.clone(),
            media: Some(candidate),
        }
    }

    pub fn cover_image(&self) -> Option<&str> {
        self.media.as_ref().and_then(|m| m.cover_image.as_deref())
    }
}

/// Matches keyed by catalog, iterated in [`ProviderId`] order.
///
/// Also records every catalog consulted for the set, so a catalog that had
/// no acceptable candidate is not searched again while the set is cached.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchSet {
    matches: BTreeMap<ProviderId, ProviderMatch>,
    #[serde(default)]
    searched: BTreeSet<ProviderId>,
}

impl MatchSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert, keeping whichever match for the provider is more confident
    pub fn insert(&mut self, provider_match: ProviderMatch) {
        let provider = provider_match.provider_id;
        self.searched.insert(provider);
        match self.matches.get(&provider) {
            Some(existing) if existing.confidence >= provider_match.confidence => {}
            _ => {
                self.matches.insert(provider, provider_match);
            }
        }
    }

    /// Record that `provider` was consulted, with or without a match
    pub fn mark_searched(&mut self, provider: ProviderId) {
        self.searched.insert(provider);
    }

    pub fn was_searched(&self, provider: ProviderId) -> bool {
        self.searched.contains(&provider)
    }

    pub fn get(&self, provider: ProviderId) -> Option<&ProviderMatch> {
        self.matches.get(&provider)
    }

    pub fn contains(&self, provider: ProviderId) -> bool {
        self.matches.contains_key(&provider)
    }

    pub fn remove(&mut self, provider: ProviderId) -> Option<ProviderMatch> {
        self.matches.remove(&provider)
    }

    pub fn retain<F>(&mut self, mut keep: F)
    where
        F: FnMut(&ProviderMatch) -> bool,
    {
        self.matches.retain(|_, m| keep(m));
    }

    pub fn iter(&self) -> impl Iterator<Item = &ProviderMatch> {
        self.matches.values()
    }

    pub fn providers(&self) -> Vec<ProviderId> {
        self.matches.keys().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.matches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }
}

impl FromIterator<ProviderMatch> for MatchSet {
    fn from_iter<I: IntoIterator<Item = ProviderMatch>>(iter: I) -> Self {
        let mut set = MatchSet::new();
        for provider_match in iter {
            set.insert(provider_match);
        }
        set
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::domain::MediaType;

    fn candidate(provider: ProviderId, id: &str) -> MediaEntity {
        MediaEntity::new(id, "Naruto", MediaType::Anime, provider)
    }

    #[test]
    fn test_insert_keeps_more_confident_match() {
        let mut set = MatchSet::new();
        set.insert(ProviderMatch::from_candidate(candidate(ProviderId::Kitsu, "11"), 0.9));
        set.insert(ProviderMatch::from_candidate(candidate(ProviderId::Kitsu, "12"), 0.8));
        assert_eq!(set.get(ProviderId::Kitsu).unwrap().provider_media_id, "11");

        set.insert(ProviderMatch::from_candidate(candidate(ProviderId::Kitsu, "13"), 0.95));
        assert_eq!(set.get(ProviderId::Kitsu).unwrap().provider_media_id, "13");
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_iterates_in_provider_order() {
        let set: MatchSet = [
            ProviderMatch::from_candidate(candidate(ProviderId::Tmdb, "46260"), 0.8),
            ProviderMatch::from_candidate(candidate(ProviderId::AniList, "20"), 0.9),
        ]
        .into_iter()
        .collect();

        assert_eq!(set.providers(), vec![ProviderId::AniList, ProviderId::Tmdb]);
    }

    #[test]
    fn test_dropped_match_stays_searched() {
        let mut set: MatchSet = [ProviderMatch::from_candidate(candidate(ProviderId::Kitsu, "11"), 0.9)]
            .into_iter()
            .collect();
        set.mark_searched(ProviderId::AniList);
        set.remove(ProviderId::Kitsu);

        assert!(set.is_empty());
        assert!(set.was_searched(ProviderId::Kitsu));
        assert!(set.was_searched(ProviderId::AniList));
        assert!(!set.was_searched(ProviderId::Tmdb));
    }

    #[test]
    fn test_serializes_as_provider_keyed_map() {
        let mut set: MatchSet = [ProviderMatch::from_candidate(candidate(ProviderId::Kitsu, "11"), 0.9)]
            .into_iter()
            .collect();
        set.mark_searched(ProviderId::Tmdb);

        let json = serde_json::to_value(&set).unwrap();
        assert_eq!(json["matches"]["kitsu"]["providerMediaId"], "11");
        assert_eq!(json["matches"]["kitsu"]["matchedTitle"], "Naruto");
        assert_eq!(json["searched"], serde_json::json!(["kitsu", "tmdb"]));

        let back: MatchSet = serde_json::from_value(json).unwrap();
        assert_eq!(back, set);
    }
}
