//! Search engine trait and configuration.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::{Result, SearchQuery, SearchResult};

/// Configuration for a search engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Display name of the engine. Unique within a [`Search`](crate::Search).
    pub name: String,
    /// Short identifier (e.g., "gh" for GitHub).
    pub shortcut: String,
    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout: u64,
    /// Whether the engine is enabled.
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_timeout() -> u64 {
    10
}

fn default_enabled() -> bool {
    true
}

impl EngineConfig {
    /// Creates a configuration with default timeout, enabled.
    pub fn new(name: impl Into<String>, shortcut: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            shortcut: shortcut.into(),
            ..Default::default()
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            name: String::new(),
            shortcut: String::new(),
            timeout: default_timeout(),
            enabled: true,
        }
    }
}

/// Trait for implementing search backends.
///
/// An engine receives the query text and result limit through
/// [`SearchQuery`] and returns normalized results. It fails only on
/// transport or parse errors; "no results" is an empty `Vec`. Engines know
/// nothing about each other or about the selection policy.
#[async_trait]
pub trait Engine: Send + Sync {
    /// Returns the engine configuration.
    fn config(&self) -> &EngineConfig;

    /// Performs a search and returns at most `query.limit` results.
    async fn search(&self, query: &SearchQuery) -> Result<Vec<SearchResult>>;

    /// Returns the engine name.
    fn name(&self) -> &str {
        &self.config().name
    }

    /// Returns the engine shortcut.
    fn shortcut(&self) -> &str {
        &self.config().shortcut
    }

    /// Returns the request timeout in seconds.
    fn timeout(&self) -> u64 {
        self.config().timeout
    }

    /// Returns whether the engine is enabled.
    fn is_enabled(&self) -> bool {
        self.config().enabled
    }

    /// Returns true if `source` names this engine, by name or shortcut.
    fn matches(&self, source: &str) -> bool {
        let source = source.trim();
        self.name().eq_ignore_ascii_case(source) || self.shortcut().eq_ignore_ascii_case(source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct StaticEngine {
        config: EngineConfig,
    }

    #[async_trait]
    impl Engine for StaticEngine {
        fn config(&self) -> &EngineConfig {
            &self.config
        }

        async fn search(&self, _query: &SearchQuery) -> Result<Vec<SearchResult>> {
            Ok(vec![])
        }
    }

    #[test]
    fn test_engine_config_default() {
        let config = EngineConfig::default();
        assert_eq!(config.name, "");
        assert_eq!(config.shortcut, "");
        assert_eq!(config.timeout, 10);
        assert!(config.enabled);
    }

    #[test]
    fn test_engine_config_new() {
        let config = EngineConfig::new("Stack Overflow", "so");
        assert_eq!(config.name, "Stack Overflow");
        assert_eq!(config.shortcut, "so");
        assert_eq!(config.timeout, 10);
    }

    #[test]
    fn test_engine_config_deserialization() {
        let json = r#"{"name":"Test","shortcut":"t"}"#;
        let config: EngineConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.name, "Test");
        assert_eq!(config.timeout, 10);
        assert!(config.enabled);
    }

    #[test]
    fn test_engine_trait_accessors() {
        let engine = StaticEngine {
            config: EngineConfig {
                timeout: 3,
                enabled: false,
                ..EngineConfig::new("Hacker News", "hn")
            },
        };
        assert_eq!(engine.name(), "Hacker News");
        assert_eq!(engine.shortcut(), "hn");
        assert_eq!(engine.timeout(), 3);
        assert!(!engine.is_enabled());
    }

    #[test]
    fn test_engine_matches_name_or_shortcut() {
        let engine = StaticEngine {
            config: EngineConfig::new("Hacker News", "hn"),
        };
        assert!(engine.matches("Hacker News"));
        assert!(engine.matches("hacker news"));
        assert!(engine.matches("HN"));
        assert!(!engine.matches("Reddit"));
    }
}
