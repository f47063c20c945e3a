//! Search orchestration.
//!
//! A search classifies the query, orders the engines by intent fit and
//! reliability, dispatches to them, records every completed call and merges
//! the batches. An optional response cache sits in front of all of it.

use std::collections::BTreeMap;
use std::future::Future;
use std::sync::Arc;

use futures::stream::{FuturesUnordered, StreamExt};
use serde::{Deserialize, Serialize};
use tokio::time::{timeout, timeout_at, Duration, Instant};
use tracing::{debug, warn};

use crate::cache::{self, ResponseCache};
use crate::reliability::{Outcome, ReliabilityTracker};
use crate::selector::SourceSelector;
use crate::{
    Aggregator, Engine, IntentAnalysis, IntentClassifier, Result, SearchError, SearchIntent,
    SearchQuery, SearchResult, SearchResults,
};

/// How engines in the visit order are invoked.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DispatchMode {
    /// One engine at a time, stopping once enough results have accumulated.
    #[default]
    Sequential,
    /// Every engine at once; no short-circuit.
    Concurrent,
}

/// Reliability summary for one configured engine.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EngineStatus {
    pub success_rate: f64,
    pub success_count: u64,
    pub failure_count: u64,
}

/// Aggregating search across multiple engines.
pub struct Search {
    engines: Vec<Arc<dyn Engine>>,
    classifier: IntentClassifier,
    selector: SourceSelector,
    tracker: Arc<ReliabilityTracker>,
    aggregator: Aggregator,
    cache: Option<Arc<dyn ResponseCache>>,
    mode: DispatchMode,
    timeout_override: Option<Duration>,
    deadline: Option<Duration>,
}

impl Search {
    /// Creates a new search instance with the built-in intent tables and
    /// routing table, sequential dispatch and no cache.
    pub fn new() -> Self {
        Self {
            engines: Vec::new(),
            classifier: IntentClassifier::default(),
            selector: SourceSelector::default(),
            tracker: Arc::new(ReliabilityTracker::new()),
            aggregator: Aggregator::new(),
            cache: None,
            mode: DispatchMode::default(),
            timeout_override: None,
            deadline: None,
        }
    }

    /// Uses a custom intent classifier.
    pub fn with_classifier(mut self, classifier: IntentClassifier) -> Self {
        self.classifier = classifier;
        self
    }

    /// Uses a custom source selector.
    pub fn with_selector(mut self, selector: SourceSelector) -> Self {
        self.selector = selector;
        self
    }

    /// Shares a reliability tracker with other instances.
    pub fn with_tracker(mut self, tracker: Arc<ReliabilityTracker>) -> Self {
        self.tracker = tracker;
        self
    }

    /// Adds a search engine. Registration order is the tie-break priority.
    ///
    /// Engine names are unique; an engine whose name is already registered
    /// is skipped.
    pub fn add_engine<E: Engine + 'static>(&mut self, engine: E) {
        if self.engines.iter().any(|e| e.name() == engine.name()) {
            warn!("Engine {} is already registered, skipping", engine.name());
            return;
        }
        self.engines.push(Arc::new(engine));
    }

    /// Overrides every engine's own timeout.
    pub fn set_timeout(&mut self, timeout: Duration) {
        self.timeout_override = Some(timeout);
    }

    /// Bounds a whole search. Calls still in flight when it fires are
    /// abandoned unrecorded and the results gathered so far are returned.
    pub fn set_deadline(&mut self, deadline: Duration) {
        self.deadline = Some(deadline);
    }

    /// Sets the dispatch mode.
    pub fn set_dispatch_mode(&mut self, mode: DispatchMode) {
        self.mode = mode;
    }

    /// Enables the response cache.
    pub fn set_cache(&mut self, cache: Arc<dyn ResponseCache>) {
        self.cache = Some(cache);
    }

    /// Returns the number of configured engines.
    pub fn engine_count(&self) -> usize {
        self.engines.len()
    }

    /// Returns the configured engines in registration order.
    pub fn engines(&self) -> &[Arc<dyn Engine>] {
        &self.engines
    }

    /// Returns the reliability tracker.
    pub fn tracker(&self) -> &Arc<ReliabilityTracker> {
        &self.tracker
    }

    /// Returns the intent for a query: the caller's override if set,
    /// otherwise the classifier's verdict.
    pub fn classify(&self, query: &SearchQuery) -> IntentAnalysis {
        match query.intent {
            Some(intent) => IntentAnalysis::forced(intent),
            None => self.classifier.classify(&query.query),
        }
    }

    /// Returns the names of the engines a search would visit, in order.
    pub fn visit_order(&self, query: &SearchQuery) -> Result<Vec<String>> {
        let (_, order) = self.plan(query)?;
        Ok(order.iter().map(|e| e.name().to_string()).collect())
    }

    /// Returns reliability counters for every configured engine.
    pub fn status(&self) -> BTreeMap<String, EngineStatus> {
        self.engines
            .iter()
            .map(|engine| {
                let state = self.tracker.state(engine.name());
                (
                    engine.name().to_string(),
                    EngineStatus {
                        success_rate: state.success_rate(),
                        success_count: state.success_count,
                        failure_count: state.failure_count,
                    },
                )
            })
            .collect()
    }

    /// Performs a search.
    ///
    /// Engine failures and timeouts are logged and counted but never fail
    /// the search; if every engine fails the result list is empty.
    pub async fn search(&self, query: SearchQuery) -> Result<SearchResults> {
        if self.engines.is_empty() {
            return Err(SearchError::NoEngines);
        }

        if query.query.trim().is_empty() {
            return Err(SearchError::InvalidQuery("Query cannot be empty".into()));
        }

        if query.limit == 0 {
            return Err(SearchError::InvalidQuery("Limit must be at least 1".into()));
        }

        let start = Instant::now();
        let (intent, order) = self.plan(&query)?;
        let signature = cache::signature(&query);

        if let Some(items) = self.cache_get(&signature).await {
            debug!("Cache hit for '{}' ({} results)", query.query, items.len());
            let mut results = SearchResults::from_items(items);
            results.intent = intent;
            results.cached = true;
            results.set_duration(start.elapsed().as_millis() as u64);
            return Ok(results);
        }

        let engine_query = self.scoped_query(&query, intent.as_ref());
        debug!("Visiting {} engines in {:?} mode", order.len(), self.mode);

        let dispatch = match self.mode {
            DispatchMode::Sequential => self.dispatch_sequential(&order, &engine_query).await,
            DispatchMode::Concurrent => self.dispatch_concurrent(&order, &engine_query).await,
        };

        let merged = self.aggregator.merge(dispatch.batches, query.limit);

        if !dispatch.interrupted && !merged.is_empty() {
            self.cache_set(&signature, &query.query, &merged).await;
        }

        let mut results = SearchResults::from_items(merged);
        results.intent = intent;
        results.engines_visited = dispatch.visited;
        results.set_duration(start.elapsed().as_millis() as u64);

        Ok(results)
    }

    /// Resolves the intent and the visit order.
    ///
    /// A pinned source skips classification and yields just that engine
    /// (or nothing, if it is disabled).
    fn plan(&self, query: &SearchQuery) -> Result<(Option<IntentAnalysis>, Vec<Arc<dyn Engine>>)> {
        if let Some(source) = &query.preferred_source {
            let engine = self
                .engines
                .iter()
                .find(|engine| engine.matches(source))
                .ok_or_else(|| SearchError::UnknownSource(source.clone()))?;
            let order = if engine.is_enabled() {
                vec![Arc::clone(engine)]
            } else {
                Vec::new()
            };
            return Ok((None, order));
        }

        let analysis = self.classify(query);
        let order = self
            .selector
            .visit_order(&self.engines, analysis.intent, &self.tracker);
        Ok((Some(analysis), order))
    }

    /// Fills site and time scope the caller left unset from the analysis.
    fn scoped_query(&self, query: &SearchQuery, intent: Option<&IntentAnalysis>) -> SearchQuery {
        let mut scoped = query.clone();
        let Some(analysis) = intent else {
            return scoped;
        };
        if scoped.site.is_none() && analysis.intent == SearchIntent::SiteSearch {
            scoped.site = analysis.sites.first().cloned();
        }
        if scoped.time_range.is_none() {
            scoped.time_range = self.classifier.time_range_hint(analysis);
        }
        scoped
    }

    async fn dispatch_sequential(&self, order: &[Arc<dyn Engine>], query: &SearchQuery) -> Dispatch {
        let deadline = self.deadline.map(|d| Instant::now() + d);
        let mut dispatch = Dispatch::default();
        let mut accumulated = 0;

        for (index, engine) in order.iter().enumerate() {
            if accumulated >= query.limit {
                debug!("Collected {} results, skipping remaining engines", accumulated);
                break;
            }

            let Some(outcome) = within(deadline, self.invoke(engine, query)).await else {
                warn!("Search deadline reached while waiting for {}", engine.name());
                dispatch.interrupted = true;
                break;
            };

            dispatch.visited.push(engine.name().to_string());
            if let Some(results) = outcome {
                accumulated += results.len();
                dispatch.batches.push((index, results));
            }
        }

        dispatch
    }

    async fn dispatch_concurrent(&self, order: &[Arc<dyn Engine>], query: &SearchQuery) -> Dispatch {
        let deadline = self.deadline.map(|d| Instant::now() + d);
        let mut pending: FuturesUnordered<_> = order
            .iter()
            .enumerate()
            .map(|(index, engine)| async move { (index, self.invoke(engine, query).await) })
            .collect();

        let mut dispatch = Dispatch::default();
        let mut visited = Vec::new();

        loop {
            let next = within(deadline, pending.next()).await;
            match next {
                Some(Some((index, outcome))) => {
                    visited.push(index);
                    if let Some(results) = outcome {
                        dispatch.batches.push((index, results));
                    }
                }
                Some(None) => break,
                None => {
                    warn!("Search deadline reached with {} engines pending", pending.len());
                    dispatch.interrupted = true;
                    break;
                }
            }
        }

        visited.sort_unstable();
        dispatch.visited = visited
            .into_iter()
            .map(|index| order[index].name().to_string())
            .collect();
        dispatch
    }

    /// Calls one engine under its timeout and records the outcome.
    ///
    /// The record happens in the same poll that observes completion, so a
    /// call dropped by the search deadline is never recorded.
    async fn invoke(&self, engine: &Arc<dyn Engine>, query: &SearchQuery) -> Option<Vec<SearchResult>> {
        let name = engine.name();
        let limit = self
            .timeout_override
            .unwrap_or_else(|| Duration::from_secs(engine.timeout()));

        match timeout(limit, engine.search(query)).await {
            Ok(Ok(results)) => {
                self.tracker.record(name, Outcome::Success);
                debug!("Engine {} returned {} results", name, results.len());
                Some(results)
            }
            Ok(Err(e)) => {
                self.tracker.record(name, Outcome::Failure);
                warn!("Engine {} failed: {}", name, e);
                None
            }
            Err(_) => {
                self.tracker.record(name, Outcome::Failure);
                warn!("Engine {} timed out after {:?}", name, limit);
                None
            }
        }
    }

    async fn cache_get(&self, signature: &str) -> Option<Vec<SearchResult>> {
        let cache = self.cache.as_ref()?;
        match cache.get(signature).await {
            Ok(hit) => hit,
            Err(e) => {
                warn!("Cache read failed: {}", e);
                None
            }
        }
    }

    async fn cache_set(&self, signature: &str, query: &str, results: &[SearchResult]) {
        if let Some(cache) = &self.cache {
            if let Err(e) = cache.set(signature, query, results).await {
                warn!("Cache write failed: {}", e);
            }
        }
    }
}

impl Default for Search {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Default)]
struct Dispatch {
    batches: Vec<(usize, Vec<SearchResult>)>,
    visited: Vec<String>,
    interrupted: bool,
}

/// Awaits `fut`, giving up at `deadline` if one is set.
async fn within<F: Future>(deadline: Option<Instant>, fut: F) -> Option<F::Output> {
    match deadline {
        Some(at) => timeout_at(at, fut).await.ok(),
        None => Some(fut.await),
    }
}
