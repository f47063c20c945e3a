//! Result merging and deduplication.

use std::collections::HashSet;

use tracing::debug;

use crate::SearchResult;

/// Merges per-engine result batches into one deduplicated list.
///
/// Batches are consumed in visit order. The first record seen for a
/// normalized URL wins; later duplicates are dropped whole, including their
/// title, snippet and metadata. Records without a URL are dropped here
/// rather than by the engines.
#[derive(Debug, Default, Clone, Copy)]
pub struct Aggregator;

impl Aggregator {
    /// Creates a new aggregator.
    pub fn new() -> Self {
        Self
    }

    /// Merges batches, keyed by visit-order index, truncating to `limit`.
    ///
    /// Batches are sorted by their index first, so the output does not
    /// depend on the order in which concurrent engines completed.
    pub fn merge(&self, mut batches: Vec<(usize, Vec<SearchResult>)>, limit: usize) -> Vec<SearchResult> {
        if limit == 0 {
            return Vec::new();
        }
        batches.sort_by_key(|(index, _)| *index);

        let mut seen: HashSet<String> = HashSet::new();
        let mut merged = Vec::new();
        let mut dropped_malformed = 0usize;
        let mut dropped_duplicates = 0usize;

        for result in batches.into_iter().flat_map(|(_, results)| results) {
            if !result.has_url() {
                dropped_malformed += 1;
                continue;
            }
            if !seen.insert(result.normalized_url()) {
                dropped_duplicates += 1;
                continue;
            }
            merged.push(result);
            if merged.len() >= limit {
                break;
            }
        }

        debug!(
            kept = merged.len(),
            dropped_malformed, dropped_duplicates, "merged engine results"
        );
        merged
    }
}
