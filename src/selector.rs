//! Intent-aware, reliability-biased engine ordering.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::Arc;

use crate::reliability::ReliabilityTracker;
use crate::{Engine, SearchIntent};

/// Static mapping from intent to preferred engine names.
#[derive(Debug, Clone)]
pub struct RoutingTable {
    routes: HashMap<SearchIntent, Vec<String>>,
}

impl RoutingTable {
    /// Creates an empty table; every intent has no preference.
    pub fn empty() -> Self {
        Self {
            routes: HashMap::new(),
        }
    }

    /// Sets the preferred engines for an intent.
    pub fn with_route<I, S>(mut self, intent: SearchIntent, engines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.routes
            .insert(intent, engines.into_iter().map(Into::into).collect());
        self
    }

    /// Returns the preferred engine names for an intent (empty if unmapped).
    pub fn preferred(&self, intent: SearchIntent) -> &[String] {
        self.routes.get(&intent).map(Vec::as_slice).unwrap_or(&[])
    }
}

impl Default for RoutingTable {
    fn default() -> Self {
        Self::empty()
            .with_route(SearchIntent::Technical, ["GitHub", "Stack Overflow"])
            .with_route(SearchIntent::News, ["Hacker News", "Reddit"])
            .with_route(SearchIntent::General, ["DuckDuckGo", "Brave", "Reddit"])
            .with_route(SearchIntent::SiteSearch, ["Anspire", "Brave"])
            .with_route(SearchIntent::MultiSite, ["Anspire"])
            .with_route(SearchIntent::TimeRange, ["Brave", "Anspire"])
    }
}

/// Computes the order in which engines are visited for a query.
#[derive(Debug, Clone, Default)]
pub struct SourceSelector {
    routing: RoutingTable,
}

impl SourceSelector {
    /// Creates a selector over the given routing table.
    pub fn new(routing: RoutingTable) -> Self {
        Self { routing }
    }

    /// Returns the routing table.
    pub fn routing(&self) -> &RoutingTable {
        &self.routing
    }

    /// Orders enabled engines for an intent.
    ///
    /// Engines the routing table prefers for `intent` come first, then the
    /// rest. Each group is sorted by descending success rate; ties keep the
    /// registration order.
    pub fn visit_order(
        &self,
        engines: &[Arc<dyn Engine>],
        intent: SearchIntent,
        tracker: &ReliabilityTracker,
    ) -> Vec<Arc<dyn Engine>> {
        let preferred_names = self.routing.preferred(intent);

        let (mut preferred, mut others): (Vec<_>, Vec<_>) = engines
            .iter()
            .filter(|engine| engine.is_enabled())
            .map(|engine| (Arc::clone(engine), tracker.score(engine.name())))
            .partition(|(engine, _)| preferred_names.iter().any(|name| engine.matches(name)));

        sort_by_score(&mut preferred);
        sort_by_score(&mut others);

        preferred
            .into_iter()
            .chain(others)
            .map(|(engine, _)| engine)
            .collect()
    }
}

fn sort_by_score(engines: &mut [(Arc<dyn Engine>, f64)]) {
    engines.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));
}
