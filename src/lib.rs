//! # a3s-unisearch
//!
//! A unified search library that fans one query out to several search
//! backends and returns a single de-duplicated result list.
//!
//! Each search:
//!
//! - classifies the query's intent (technical, news, site-scoped, ...)
//! - orders the backends by intent fit and historical reliability
//! - dispatches sequentially with short-circuit, or concurrently
//! - merges results first-seen-wins by normalized URL
//!
//! Failing backends are logged and counted, never fatal.
//!
//! ## Example
//!
//! ```rust,no_run
//! use a3s_unisearch::{Search, SearchQuery, engines::{DuckDuckGo, GitHub}};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let mut search = Search::new();
//!     search.add_engine(GitHub::new());
//!     search.add_engine(DuckDuckGo::new());
//!
//!     let query = SearchQuery::new("rust async runtime").with_limit(5);
//!     let results = search.search(query).await?;
//!
//!     for result in results.items() {
//!         println!("[{}] {}: {}", result.source, result.title, result.url);
//!     }
//!     Ok(())
//! }
//! ```

mod aggregator;
mod engine;
mod error;
mod intent;
mod query;
mod result;
mod search;

pub mod cache;
pub mod config;
pub mod engines;
pub mod fetcher;
pub mod fetcher_http;
pub mod reliability;
pub mod selector;

pub use aggregator::Aggregator;
pub use cache::{CacheStats, FileCache, ResponseCache};
pub use config::Config;
pub use engine::{Engine, EngineConfig};
pub use error::{Result, SearchError};
pub use intent::{IntentAnalysis, IntentClassifier, IntentTables, SearchIntent};
pub use query::{SearchQuery, TimeRange, DEFAULT_LIMIT};
pub use reliability::{Outcome, ReliabilityState, ReliabilityTracker};
pub use result::{normalize_url, SearchResult, SearchResults};
pub use search::{DispatchMode, EngineStatus, Search};
pub use selector::{RoutingTable, SourceSelector};
