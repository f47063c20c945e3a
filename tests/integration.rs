//! Integration tests for search engines using real HTTP requests.
//!
//! These tests are marked with `#[ignore]` by default because they require
//! network access and may be slow or flaky.
//!
//! Run with: `cargo test --test integration -- --ignored`

use a3s_unisearch::{Engine, SearchQuery, SearchResult};

/// Helper to run an engine test
async fn test_engine<E: Engine>(engine: E, query: &str) -> Vec<SearchResult> {
    let query = SearchQuery::new(query).with_limit(5);
    match engine.search(&query).await {
        Ok(results) => {
            println!(
                "Engine '{}' returned {} results for '{}'",
                engine.name(),
                results.len(),
                query.query
            );
            for (i, result) in results.iter().take(3).enumerate() {
                println!("  {}. {} - {}", i + 1, result.title, result.url);
            }
            results
        }
        Err(e) => {
            println!("Engine '{}' failed: {}", engine.name(), e);
            vec![]
        }
    }
}

mod duckduckgo_tests {
    use super::*;
    use a3s_unisearch::engines::DuckDuckGo;

    #[tokio::test]
    #[ignore]
    async fn test_duckduckgo_search() {
        let results = test_engine(DuckDuckGo::new(), "rust programming").await;
        assert!(!results.is_empty(), "DuckDuckGo should return results");
        assert!(results.iter().all(|r| !r.url.contains("duckduckgo.com/l/")));
    }

    #[tokio::test]
    #[ignore]
    async fn test_duckduckgo_chinese_query() {
        let results = test_engine(DuckDuckGo::new(), "Rust 编程语言").await;
        // May or may not return results for Chinese queries
        println!("Chinese query returned {} results", results.len());
    }
}

mod github_tests {
    use super::*;
    use a3s_unisearch::engines::GitHub;

    #[tokio::test]
    #[ignore]
    async fn test_github_search() {
        let results = test_engine(GitHub::new(), "tokio runtime").await;
        assert!(!results.is_empty(), "GitHub should return results");
        assert!(results.iter().all(|r| r.metadata.contains_key("stars")));
    }
}

mod hackernews_tests {
    use super::*;
    use a3s_unisearch::engines::HackerNews;

    #[tokio::test]
    #[ignore]
    async fn test_hackernews_search() {
        let results = test_engine(HackerNews::new(), "rust").await;
        assert!(!results.is_empty(), "Hacker News should return results");
    }
}

mod reddit_tests {
    use super::*;
    use a3s_unisearch::engines::Reddit;

    #[tokio::test]
    #[ignore]
    async fn test_reddit_search() {
        let results = test_engine(Reddit::new(), "rust async").await;
        // Reddit frequently rate-limits anonymous clients
        for result in &results {
            assert!(result.source.starts_with("Reddit/r/"));
        }
    }
}

mod stackoverflow_tests {
    use super::*;
    use a3s_unisearch::engines::StackOverflow;

    #[tokio::test]
    #[ignore]
    async fn test_stackoverflow_search() {
        let results = test_engine(StackOverflow::new(), "borrow checker").await;
        for result in &results {
            assert!(result.url.starts_with("https://stackoverflow.com/questions/"));
        }
    }
}

mod keyed_tests {
    use super::*;
    use a3s_unisearch::engines::{Anspire, Brave};

    #[tokio::test]
    #[ignore]
    async fn test_brave_search() {
        let Ok(key) = std::env::var("BRAVE_API_KEY") else {
            println!("BRAVE_API_KEY not set, skipping");
            return;
        };
        let results = test_engine(Brave::new(key), "rust programming").await;
        assert!(!results.is_empty(), "Brave should return results");
    }

    #[tokio::test]
    #[ignore]
    async fn test_anspire_search() {
        let Ok(key) = std::env::var("ANSPIRE_API_KEY") else {
            println!("ANSPIRE_API_KEY not set, skipping");
            return;
        };
        let results = test_engine(Anspire::new(key), "rust programming").await;
        assert!(!results.is_empty(), "Anspire should return results");
    }
}

mod unified_search_tests {
    use a3s_unisearch::{
        engines::{DuckDuckGo, GitHub, HackerNews, StackOverflow},
        DispatchMode, Search, SearchQuery,
    };

    #[tokio::test]
    #[ignore]
    async fn test_unified_search_technical_query() {
        let mut search = Search::new();
        search.add_engine(DuckDuckGo::new());
        search.add_engine(HackerNews::new());
        search.add_engine(GitHub::new());
        search.add_engine(StackOverflow::new());

        let query = SearchQuery::new("rust async library");
        let results = search.search(query).await.unwrap();

        println!(
            "Unified search returned {} results in {}ms via {:?}",
            results.count, results.duration_ms, results.engines_visited
        );
        for (i, result) in results.items().iter().take(5).enumerate() {
            println!("  {}. [{}] {}", i + 1, result.source, result.title);
        }

        assert!(!results.items().is_empty(), "Unified search should return results");
        println!("{:#?}", search.status());
    }

    #[tokio::test]
    #[ignore]
    async fn test_unified_search_concurrent() {
        let mut search = Search::new();
        search.set_dispatch_mode(DispatchMode::Concurrent);
        search.add_engine(HackerNews::new());
        search.add_engine(GitHub::new());

        let results = search.search(SearchQuery::new("startup funding news")).await.unwrap();
        println!(
            "Concurrent search returned {} results via {:?}",
            results.count, results.engines_visited
        );
        assert_eq!(results.engines_visited.len(), 2);
    }
}
