//! Search query representation.

use serde::{Deserialize, Serialize};

use crate::SearchIntent;

/// Default number of results requested.
pub const DEFAULT_LIMIT: usize = 10;

/// Time range filter for search results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeRange {
    Day,
    Week,
    Month,
    Year,
}

impl TimeRange {
    /// Returns the freshness code used by the Brave API.
    pub fn freshness(&self) -> &'static str {
        match self {
            TimeRange::Day => "p1d",
            TimeRange::Week => "pw",
            TimeRange::Month => "pm",
            TimeRange::Year => "py",
        }
    }

    /// Returns the length of the range in days.
    pub fn days(&self) -> i64 {
        match self {
            TimeRange::Day => 1,
            TimeRange::Week => 7,
            TimeRange::Month => 30,
            TimeRange::Year => 365,
        }
    }
}

/// A search query with all parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchQuery {
    /// The search terms.
    pub query: String,
    /// Maximum number of results to return.
    pub limit: usize,
    /// Pin the search to one engine (by name or shortcut).
    pub preferred_source: Option<String>,
    /// Restrict results to a site, for engines that support it.
    pub site: Option<String>,
    /// Time range filter.
    pub time_range: Option<TimeRange>,
    /// Forces the intent instead of classifying the text.
    #[serde(default)]
    pub intent: Option<SearchIntent>,
}

impl SearchQuery {
    /// Creates a new search query with the given terms.
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            limit: DEFAULT_LIMIT,
            preferred_source: None,
            site: None,
            time_range: None,
            intent: None,
        }
    }

    /// Sets the result limit.
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    /// Pins the search to a single engine.
    pub fn with_preferred_source(mut self, source: impl Into<String>) -> Self {
        self.preferred_source = Some(source.into());
        self
    }

    /// Restricts the search to a site.
    pub fn with_site(mut self, site: impl Into<String>) -> Self {
        self.site = Some(site.into());
        self
    }

    /// Sets the time range filter.
    pub fn with_time_range(mut self, range: TimeRange) -> Self {
        self.time_range = Some(range);
        self
    }

    /// Forces the intent used for routing.
    pub fn with_intent(mut self, intent: SearchIntent) -> Self {
        self.intent = Some(intent);
        self
    }
}
