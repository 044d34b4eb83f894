use futures::stream::{self, StreamExt};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use super::confidence::{ConfidenceScorer, TitleFacts};
use crate::modules::matching::domain::entities::{MatchCacheKey, MatchQuery, MatchSet, ProviderMatch};
use crate::modules::matching::infrastructure::MatchCache;
use crate::modules::media::MediaEntity;
use crate::modules::provider::traits::{search_type_for, MediaSearcher};
use crate::shared::config::EngineConfig;
use crate::shared::domain::{MediaType, ProviderId};
use crate::shared::errors::AppResult;
use crate::shared::utils::cancellation::{ensure_active, run_with_deadline};
use crate::shared::utils::logger::TimedOperation;

/// Tunables of the matcher
#[derive(Debug, Clone, PartialEq)]
pub struct MatcherConfig {
    pub acceptance_threshold: f64,
    pub search_timeout: Duration,
    pub max_concurrent_searches: usize,
}

impl Default for MatcherConfig {
    fn default() -> Self {
        Self {
            acceptance_threshold: 0.75,
            search_timeout: Duration::from_secs(10),
            max_concurrent_searches: 4,
        }
    }
}

impl From<&EngineConfig> for MatcherConfig {
    fn from(config: &EngineConfig) -> Self {
        Self {
            acceptance_threshold: config.acceptance_threshold,
            search_timeout: config.search_timeout(),
            max_concurrent_searches: config.max_concurrent_searches.max(1),
        }
    }
}

/// A match set and whether it came from the cache
#[derive(Debug, Clone, PartialEq)]
pub struct MatchLookup {
    pub matches: MatchSet,
    pub from_cache: bool,
}

/// Finds the entry for one title in every other catalog
pub struct CrossProviderMatcher {
    searcher: Arc<dyn MediaSearcher>,
    cache: Arc<MatchCache>,
    scorer: ConfidenceScorer,
    config: MatcherConfig,
}

impl CrossProviderMatcher {
    pub fn new(searcher: Arc<dyn MediaSearcher>, cache: Arc<MatchCache>, config: MatcherConfig) -> Self {
        Self {
            searcher,
            cache,
            scorer: ConfidenceScorer::default(),
            config,
        }
    }

    pub fn with_scorer(mut self, scorer: ConfidenceScorer) -> Self {
        self.scorer = scorer;
        self
    }

    pub fn config(&self) -> &MatcherConfig {
        &self.config
    }

    pub fn cache(&self) -> &Arc<MatchCache> {
        &self.cache
    }

    /// Cache-first match set for `query` over every searchable catalog except its own
    pub async fn find_matches(&self, query: &MatchQuery, cancel: &CancellationToken) -> AppResult<MatchSet> {
        self.lookup_matches(query, cancel).await.map(|lookup| lookup.matches)
    }

    /// [`Self::find_matches`], also telling whether the cache answered
    pub async fn lookup_matches(&self, query: &MatchQuery, cancel: &CancellationToken) -> AppResult<MatchLookup> {
        ensure_active(cancel)?;

        let key = query.cache_key();
        if let Some(cached) = self.cache.get(&key).await {
            log::debug!("Matcher: cached {} match(es) for '{}'", cached.len(), query.title);
            return Ok(MatchLookup {
                matches: cached,
                from_cache: true,
            });
        }

        let timer = TimedOperation::new(&format!("match '{}'", query.title));
        let providers: Vec<ProviderId> = self
            .searcher
            .searchable_providers(query.media_type)
            .into_iter()
            .filter(|provider| *provider != query.primary_source)
            .collect();

        let outcomes: Vec<(ProviderId, AppResult<Option<ProviderMatch>>)> = stream::iter(providers)
            .map(|provider| async move {
                let label = format!("{} search", provider);
                let outcome = run_with_deadline(
                    cancel,
                    self.config.search_timeout,
                    &label,
                    self.best_match(query, provider, self.config.acceptance_threshold),
                )
                .await;
                (provider, outcome)
            })
            .buffer_unordered(self.config.max_concurrent_searches.max(1))
            .collect()
            .await;

        let mut matches = MatchSet::new();
        for (provider, outcome) in outcomes {
            match outcome {
                Ok(Some(found)) => matches.insert(found),
                Ok(None) => {
                    log::debug!("Matcher: no acceptable {} candidate for '{}'", provider, query.title);
                    matches.mark_searched(provider);
                }
                Err(e) if e.is_fatal() => return Err(e),
                Err(e) => e.log_provider_failure(provider.as_str(), "match search"),
            }
        }

        self.cache.put(&key, &matches).await;
        timer.finish_with_info(&format!("{} match(es)", matches.len()));
        Ok(MatchLookup {
            matches,
            from_cache: false,
        })
    }

    /// Uncached best match in a single catalog
    pub async fn match_provider(
        &self,
        query: &MatchQuery,
        provider: ProviderId,
        threshold: Option<f64>,
        cancel: &CancellationToken,
    ) -> AppResult<Option<ProviderMatch>> {
        let threshold = threshold.unwrap_or(self.config.acceptance_threshold);
        let label = format!("{} search", provider);
        run_with_deadline(
            cancel,
            self.config.search_timeout,
            &label,
            self.best_match(query, provider, threshold),
        )
        .await
    }

    /// Persist a match set under the query's key, replacing what was there
    pub async fn store_matches(&self, query: &MatchQuery, matches: &MatchSet) {
        self.cache.put(&query.cache_key(), matches).await;
    }

    /// Drop cached sets for the title and each alternative title at `year` and its neighbours
    pub async fn invalidate_cached_matches(
        &self,
        title: &str,
        alternative_titles: &[String],
        year: Option<i32>,
        media_type: MediaType,
        primary_source: ProviderId,
    ) {
        let titles = std::iter::once(title).chain(alternative_titles.iter().map(String::as_str));
        let mut removed = 0;
        for title in titles {
            for key in MatchCacheKey::year_variants(title, media_type, primary_source, year) {
                self.cache.delete(&key).await;
                removed += 1;
            }
        }
        log::debug!("Matcher: invalidated {} cache key(s) for '{}'", removed, title);
    }

    pub async fn invalidate_query(&self, query: &MatchQuery) {
        self.invalidate_cached_matches(
            &query.title,
            &query.alternative_titles,
            query.year,
            query.media_type,
            query.primary_source,
        )
        .await
    }

    async fn best_match(
        &self,
        query: &MatchQuery,
        provider: ProviderId,
        threshold: f64,
    ) -> AppResult<Option<ProviderMatch>> {
        let search_type = search_type_for(provider, query.media_type);
        let candidates = self.searcher.search(provider, &query.title, search_type).await?;
        Ok(self.pick_best(query, candidates, threshold))
    }

    /// Highest-scoring candidate at or above `threshold`; the earlier one wins ties
    pub fn pick_best(
        &self,
        query: &MatchQuery,
        candidates: Vec<MediaEntity>,
        threshold: f64,
    ) -> Option<ProviderMatch> {
        let source = query.facts();
        let mut best: Option<(f64, MediaEntity)> = None;

        for candidate in candidates {
            let target = TitleFacts::new(&candidate.title, candidate.media_type)
                .with_alternative_titles(&candidate.alternative_titles)
                .with_year(candidate.year())
                .with_total_episodes(candidate.total_episodes);

            let Some(confidence) = self.scorer.score(&source, &target) else {
                log::trace!("Matcher: rejected {} '{}'", candidate.source_id, candidate.title);
                continue;
            };
            if best.as_ref().map_or(true, |(top, _)| confidence > *top) {
                best = Some((confidence, candidate));
            }
        }

        best.filter(|(confidence, _)| *confidence >= threshold)
            .map(|(confidence, candidate)| ProviderMatch::from_candidate(candidate, confidence))
    }
}
