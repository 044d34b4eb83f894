/// Test helper functions and engine builders
use std::sync::Arc;

use super::fakes::{registry_of, FakeProvider};
use kizuna::modules::aggregation::{AggregationOrchestrator, OrchestratorConfig};
use kizuna::modules::matching::{CrossProviderMatcher, MatchCache, MatcherConfig};

pub struct TestEngine {
    pub orchestrator: AggregationOrchestrator,
    pub cache: Arc<MatchCache>,
}

impl TestEngine {
    pub fn matcher(&self) -> &CrossProviderMatcher {
        self.orchestrator.matcher()
    }
}

/// Matcher over the fakes with an in-memory match cache
pub fn build_matcher(providers: &[Arc<FakeProvider>]) -> (CrossProviderMatcher, Arc<MatchCache>) {
    let cache = Arc::new(MatchCache::in_memory());
    let matcher = CrossProviderMatcher::new(
        Arc::new(registry_of(providers)),
        cache.clone(),
        MatcherConfig::default(),
    );
    (matcher, cache)
}

/// Full orchestrator over the fakes with an in-memory match cache
pub fn build_engine(providers: &[Arc<FakeProvider>]) -> TestEngine {
    let registry = Arc::new(registry_of(providers));
    let cache = Arc::new(MatchCache::in_memory());
    let matcher = Arc::new(CrossProviderMatcher::new(
        registry.clone(),
        cache.clone(),
        MatcherConfig::default(),
    ));

    TestEngine {
        orchestrator: AggregationOrchestrator::new(registry, matcher, OrchestratorConfig::default()),
        cache,
    }
}
