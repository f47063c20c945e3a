//! Search result types.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use url::Url;

use crate::IntentAnalysis;

/// Query parameters stripped before comparing URLs.
const TRACKING_PARAMS: &[&str] = &[
    "utm_source",
    "utm_medium",
    "utm_campaign",
    "utm_term",
    "utm_content",
    "fbclid",
    "gclid",
    "ref",
    "rut",
];

/// A single normalized search result.
///
/// Created by an engine for each external item. The `source` field names
/// the engine that produced it, optionally with a sub-label such as
/// `"Reddit/r/rust"`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    /// Result title.
    pub title: String,
    /// Canonical (un-redirected) result URL.
    pub url: String,
    /// Result description/snippet.
    pub snippet: String,
    /// Engine that produced this result.
    pub source: String,
    /// Source-specific structured fields (stars, score, tags, ...).
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub metadata: BTreeMap<String, Value>,
}

impl SearchResult {
    /// Creates a new search result.
    pub fn new(url: impl Into<String>, title: impl Into<String>, snippet: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            url: url.into(),
            snippet: snippet.into(),
            source: String::new(),
            metadata: BTreeMap::new(),
        }
    }

    /// Sets the source label.
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = source.into();
        self
    }

    /// Adds a metadata field.
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Returns true if the result carries a usable URL.
    pub fn has_url(&self) -> bool {
        !self.url.trim().is_empty()
    }

    /// Returns the normalized URL used as the deduplication key.
    pub fn normalized_url(&self) -> String {
        normalize_url(&self.url)
    }
}

/// Normalizes a URL for deduplication.
///
/// Scheme, fragment, default port, trailing slash and tracking parameters
/// are dropped; remaining query parameters are sorted. Only the host is
/// case-folded, paths and query values stay as given. Input that does not
/// parse as an absolute URL falls back to scheme and trailing-slash trimming.
pub fn normalize_url(raw: &str) -> String {
    let raw = raw.trim();
    let Ok(parsed) = Url::parse(raw) else {
        let bare = raw
            .trim_start_matches("https://")
            .trim_start_matches("http://")
            .trim_end_matches('/');
        return match bare.split_once('/') {
            Some((host, rest)) => format!("{}/{}", host.to_lowercase(), rest),
            None => bare.to_lowercase(),
        };
    };

    let mut key = parsed.host_str().unwrap_or_default().to_string();
    if let Some(port) = parsed.port() {
        key.push(':');
        key.push_str(&port.to_string());
    }
    key.push_str(parsed.path().trim_end_matches('/'));

    let mut params: Vec<(String, String)> = parsed
        .query_pairs()
        .filter(|(k, _)| !TRACKING_PARAMS.contains(&k.to_lowercase().as_str()))
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();
    params.sort();

    if !params.is_empty() {
        let query = params
            .iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join("&");
        key.push('?');
        key.push_str(&query);
    }

    key
}

/// Container for aggregated search results.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchResults {
    /// Merged, deduplicated results.
    results: Vec<SearchResult>,
    /// Intent detected for the query (absent for pinned-source searches).
    pub intent: Option<IntentAnalysis>,
    /// Engines invoked, in visit order.
    pub engines_visited: Vec<String>,
    /// Whether the results came from the response cache.
    pub cached: bool,
    /// Number of results.
    pub count: usize,
    /// Search duration in milliseconds.
    pub duration_ms: u64,
}

impl SearchResults {
    /// Creates a new empty result container.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a container from an already merged result list.
    pub fn from_items(results: Vec<SearchResult>) -> Self {
        let count = results.len();
        Self {
            results,
            count,
            ..Default::default()
        }
    }

    /// Adds a result.
    pub fn add_result(&mut self, result: SearchResult) {
        self.results.push(result);
        self.count = self.results.len();
    }

    /// Returns the results.
    pub fn items(&self) -> &[SearchResult] {
        &self.results
    }

    /// Consumes the container, returning the results.
    pub fn into_items(self) -> Vec<SearchResult> {
        self.results
    }

    /// Returns true if there are no results.
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// Sets the search duration.
    pub fn set_duration(&mut self, duration_ms: u64) {
        self.duration_ms = duration_ms;
    }
}
