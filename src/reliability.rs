//! Per-engine reliability tracking.
//!
//! Every completed engine call is recorded exactly once as a success or a
//! failure. The derived success rate biases future visit order.
//!
//! Recording policy:
//! - a call that returns `Ok`, even with zero results, is a success;
//! - a call that errors or exceeds its own timeout is a failure;
//! - a call abandoned because the caller's deadline fired or the search
//!   future was dropped is not recorded.

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use serde::{Deserialize, Serialize};

/// Outcome of a completed engine call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Success,
    Failure,
}

/// Point-in-time counters for one engine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReliabilityState {
    /// Completed calls that returned results (possibly none).
    pub success_count: u64,
    /// Calls that failed or timed out.
    pub failure_count: u64,
}

impl ReliabilityState {
    /// Returns the success rate, 1.0 when nothing has been recorded.
    pub fn success_rate(&self) -> f64 {
        let total = self.success_count + self.failure_count;
        if total == 0 {
            1.0
        } else {
            self.success_count as f64 / total as f64
        }
    }

    /// Returns the number of recorded calls.
    pub fn total(&self) -> u64 {
        self.success_count + self.failure_count
    }
}

#[derive(Debug, Default)]
struct Counters {
    success: AtomicU64,
    failure: AtomicU64,
}

impl Counters {
    fn load(&self) -> ReliabilityState {
        ReliabilityState {
            success_count: self.success.load(Ordering::Acquire),
            failure_count: self.failure.load(Ordering::Acquire),
        }
    }
}

/// Thread-safe success/failure counters keyed by engine name.
///
/// Each engine owns its own atomic counters, so records for different
/// engines never touch the same memory, and concurrent records for the same
/// engine are plain atomic increments.
#[derive(Debug, Default)]
pub struct ReliabilityTracker {
    counters: RwLock<HashMap<String, Arc<Counters>>>,
}

impl ReliabilityTracker {
    /// Creates an empty tracker.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the outcome of one engine call.
    pub fn record(&self, engine: &str, outcome: Outcome) {
        let counters = self.counters_for(engine);
        match outcome {
            Outcome::Success => counters.success.fetch_add(1, Ordering::AcqRel),
            Outcome::Failure => counters.failure.fetch_add(1, Ordering::AcqRel),
        };
    }

    /// Returns the current success rate for an engine (1.0 if unrecorded).
    pub fn score(&self, engine: &str) -> f64 {
        self.state(engine).success_rate()
    }

    /// Returns the current counters for an engine.
    pub fn state(&self, engine: &str) -> ReliabilityState {
        self.counters
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(engine)
            .map(|c| c.load())
            .unwrap_or_default()
    }

    /// Returns counters for every engine recorded so far.
    pub fn snapshot(&self) -> BTreeMap<String, ReliabilityState> {
        self.counters
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(name, c)| (name.clone(), c.load()))
            .collect()
    }

    /// Clears an engine's counters. Operator action only; search never calls it.
    pub fn reset(&self, engine: &str) {
        self.counters
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(engine);
    }

    fn counters_for(&self, engine: &str) -> Arc<Counters> {
        if let Some(counters) = self
            .counters
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(engine)
        {
            return Arc::clone(counters);
        }

        let mut map = self.counters.write().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(map.entry(engine.to_string()).or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unrecorded_engine_is_optimistic() {
        let tracker = ReliabilityTracker::new();
        assert_eq!(tracker.score("GitHub"), 1.0);
        assert_eq!(tracker.state("GitHub"), ReliabilityState::default());
    }

    #[test]
    fn test_record_success_and_failure() {
        let tracker = ReliabilityTracker::new();
        tracker.record("GitHub", Outcome::Success);
        tracker.record("GitHub", Outcome::Success);
        tracker.record("GitHub", Outcome::Success);
        tracker.record("GitHub", Outcome::Failure);

        let state = tracker.state("GitHub");
        assert_eq!(state.success_count, 3);
        assert_eq!(state.failure_count, 1);
        assert_eq!(state.total(), 4);
        assert_eq!(tracker.score("GitHub"), 0.75);
    }

    #[test]
    fn test_all_failures_scores_zero() {
        let tracker = ReliabilityTracker::new();
        tracker.record("Reddit", Outcome::Failure);
        assert_eq!(tracker.score("Reddit"), 0.0);
    }

    #[test]
    fn test_engines_are_independent() {
        let tracker = ReliabilityTracker::new();
        tracker.record("GitHub", Outcome::Failure);
        tracker.record("Reddit", Outcome::Success);
        assert_eq!(tracker.score("GitHub"), 0.0);
        assert_eq!(tracker.score("Reddit"), 1.0);
    }

    #[test]
    fn test_snapshot() {
        let tracker = ReliabilityTracker::new();
        tracker.record("b", Outcome::Success);
        tracker.record("a", Outcome::Failure);
        let snapshot = tracker.snapshot();
        let names: Vec<_> = snapshot.keys().cloned().collect();
        assert_eq!(names, vec!["a", "b"]);
        assert_eq!(snapshot["a"].failure_count, 1);
    }

    #[test]
    fn test_reset() {
        let tracker = ReliabilityTracker::new();
        tracker.record("GitHub", Outcome::Failure);
        tracker.reset("GitHub");
        assert_eq!(tracker.state("GitHub").total(), 0);
        assert_eq!(tracker.score("GitHub"), 1.0);
    }

    #[test]
    fn test_concurrent_records_are_not_lost() {
        let tracker = Arc::new(ReliabilityTracker::new());
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let tracker = Arc::clone(&tracker);
                std::thread::spawn(move || {
                    for _ in 0..500 {
                        tracker.record("shared", Outcome::Success);
                        tracker.record(&format!("own-{i}"), Outcome::Failure);
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(tracker.state("shared").success_count, 4000);
        for i in 0..8 {
            assert_eq!(tracker.state(&format!("own-{i}")).failure_count, 500);
        }
    }
}
