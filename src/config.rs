//! Configuration loading.
//!
//! Configuration is loaded from:
//! 1. The file named by `A3S_UNISEARCH_CONFIG`
//! 2. `~/.a3s/unisearch.toml`
//! 3. Default values
//!
//! `ANSPIRE_API_KEY` and `BRAVE_API_KEY` override the `[credentials]`
//! table. A keyed engine without a key is left out.

use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::cache::{FileCache, DEFAULT_TTL};
use crate::engines::{Anspire, Brave, DuckDuckGo, GitHub, HackerNews, Reddit, StackOverflow};
use crate::search::{DispatchMode, Search};
use crate::{Result, SearchError};

/// Environment variable naming the config file.
pub const CONFIG_PATH_ENV: &str = "A3S_UNISEARCH_CONFIG";
pub const ANSPIRE_KEY_ENV: &str = "ANSPIRE_API_KEY";
pub const BRAVE_KEY_ENV: &str = "BRAVE_API_KEY";

/// Main configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub search: SearchSettings,
    #[serde(default)]
    pub cache: CacheSettings,
    #[serde(default)]
    pub engines: EngineSettings,
    #[serde(default)]
    pub credentials: Credentials,
}

/// General search behaviour.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchSettings {
    /// Default number of results.
    #[serde(default = "default_limit")]
    pub limit: usize,
    /// Per-engine timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
    #[serde(default)]
    pub dispatch: DispatchMode,
    /// Bound on a whole search, in seconds.
    #[serde(default)]
    pub deadline_secs: Option<u64>,
}

/// Response cache settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheSettings {
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Cache directory; the platform cache dir when unset.
    #[serde(default)]
    pub dir: Option<PathBuf>,
    #[serde(default = "default_cache_ttl")]
    pub ttl_secs: u64,
}

/// Which engines to register, in priority order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineSettings {
    #[serde(default = "default_engines")]
    pub enabled: Vec<String>,
    /// Extra request headers for the scraping engines (Reddit, DuckDuckGo).
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
}

/// API keys for the paid engines.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Credentials {
    #[serde(default)]
    pub anspire_api_key: Option<String>,
    #[serde(default)]
    pub brave_api_key: Option<String>,
}

fn default_limit() -> usize {
    crate::query::DEFAULT_LIMIT
}

fn default_timeout() -> u64 {
    10
}

fn default_true() -> bool {
    true
}

fn default_cache_ttl() -> u64 {
    DEFAULT_TTL.as_secs()
}

fn default_engines() -> Vec<String> {
    [
        "duckduckgo",
        "github",
        "stackoverflow",
        "hackernews",
        "reddit",
        "brave",
        "anspire",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            limit: default_limit(),
            timeout_secs: default_timeout(),
            dispatch: DispatchMode::default(),
            deadline_secs: None,
        }
    }
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            dir: None,
            ttl_secs: default_cache_ttl(),
        }
    }
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            enabled: default_engines(),
            headers: BTreeMap::new(),
        }
    }
}

impl Config {
    /// Loads configuration from file or defaults, then applies environment
    /// overrides.
    pub fn load() -> Result<Self> {
        let mut config = Self::load_from(Self::find_config_path().as_deref())?;
        config.apply_env(|name| std::env::var(name).ok());
        Ok(config)
    }

    /// Loads configuration from a specific path, falling back to defaults
    /// when the path is absent or the file does not exist.
    pub fn load_from(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) if path.exists() => {
                info!("Loading config from: {}", path.display());
                let content = std::fs::read_to_string(path).map_err(|e| {
                    SearchError::Config(format!("Failed to read {}: {}", path.display(), e))
                })?;
                Self::from_toml_str(&content)
            }
            Some(path) => {
                info!("Config file {} not found, using defaults", path.display());
                Ok(Self::default())
            }
            None => {
                info!("No config path specified, using defaults");
                Ok(Self::default())
            }
        }
    }

    /// Parses configuration from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| SearchError::Config(e.to_string()))
    }

    /// Overrides credentials from the environment.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(key) = lookup(ANSPIRE_KEY_ENV).filter(|k| !k.trim().is_empty()) {
            self.credentials.anspire_api_key = Some(key);
        }
        if let Some(key) = lookup(BRAVE_KEY_ENV).filter(|k| !k.trim().is_empty()) {
            self.credentials.brave_api_key = Some(key);
        }
    }

    fn find_config_path() -> Option<PathBuf> {
        if let Ok(path) = std::env::var(CONFIG_PATH_ENV) {
            return Some(PathBuf::from(path));
        }
        dirs::home_dir().map(|home| home.join(".a3s").join("unisearch.toml"))
    }

    /// Returns the configured response cache, if enabled and locatable.
    pub fn file_cache(&self) -> Option<FileCache> {
        if !self.cache.enabled {
            return None;
        }
        let dir = self.cache.dir.clone().or_else(FileCache::default_dir)?;
        Some(FileCache::new(dir).with_ttl(Duration::from_secs(self.cache.ttl_secs)))
    }

    /// Builds a [`Search`] with every enabled engine that can run.
    ///
    /// Aliases of one engine (`github` and `gh`) register it once. An
    /// unrecognized engine name is a configuration error.
    pub fn build_search(&self) -> Result<Search> {
        let mut search = Search::new();
        let headers: Vec<(String, String)> = self
            .engines
            .headers
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();

        let mut seen = HashSet::new();
        for name in &self.engines.enabled {
            let engine = canonical_engine(name).ok_or_else(|| {
                SearchError::Config(format!("Unknown engine '{}' in [engines] enabled", name))
            })?;
            if !seen.insert(engine) {
                warn!("Engine '{}' listed more than once in config, skipping", name);
                continue;
            }

            match engine {
                "duckduckgo" => search.add_engine(DuckDuckGo::new().with_headers(&headers)),
                "github" => search.add_engine(GitHub::new()),
                "stackoverflow" => search.add_engine(StackOverflow::new()),
                "hackernews" => search.add_engine(HackerNews::new()),
                "reddit" => search.add_engine(Reddit::new().with_headers(&headers)),
                "brave" => match non_empty(&self.credentials.brave_api_key) {
                    Some(key) => search.add_engine(Brave::new(key)),
                    None => info!("No Brave API key, skipping Brave"),
                },
                _ => match non_empty(&self.credentials.anspire_api_key) {
                    Some(key) => search.add_engine(Anspire::new(key)),
                    None => info!("No Anspire API key, skipping Anspire"),
                },
            }
        }

        search.set_timeout(Duration::from_secs(self.search.timeout_secs));
        search.set_dispatch_mode(self.search.dispatch);
        if let Some(secs) = self.search.deadline_secs {
            search.set_deadline(Duration::from_secs(secs));
        }
        if let Some(cache) = self.file_cache() {
            search.set_cache(Arc::new(cache));
        }

        Ok(search)
    }
}

/// Maps a configured engine name or shortcut to its canonical name.
fn canonical_engine(name: &str) -> Option<&'static str> {
    match name.to_lowercase().replace([' ', '_', '-'], "").as_str() {
        "duckduckgo" | "ddg" => Some("duckduckgo"),
        "github" | "gh" => Some("github"),
        "stackoverflow" | "so" => Some("stackoverflow"),
        "hackernews" | "hn" => Some("hackernews"),
        "reddit" => Some("reddit"),
        "brave" => Some("brave"),
        "anspire" => Some("anspire"),
        _ => None,
    }
}

fn non_empty(key: &Option<String>) -> Option<&str> {
    key.as_deref().map(str::trim).filter(|k| !k.is_empty())
}
