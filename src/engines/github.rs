//! GitHub repository search implementation.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use crate::fetcher_http::{http_client, DEFAULT_USER_AGENT};
use crate::{Engine, EngineConfig, Result, SearchQuery, SearchResult};

const DEFAULT_BASE_URL: &str = "https://api.github.com";

/// GitHub search engine using the public repository search API.
pub struct GitHub {
    config: EngineConfig,
    client: Client,
    base_url: String,
}

impl GitHub {
    /// Creates a new GitHub engine.
    pub fn new() -> Self {
        Self {
            config: EngineConfig::new("GitHub", "gh"),
            client: http_client(DEFAULT_USER_AGENT, &[]),
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    /// Overrides the API origin.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Creates with custom configuration.
    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }
}

impl Default for GitHub {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Deserialize)]
struct GitHubResponse {
    #[serde(default)]
    items: Vec<GitHubRepo>,
}

#[derive(Deserialize)]
struct GitHubRepo {
    name: String,
    html_url: String,
    description: Option<String>,
    #[serde(default)]
    stargazers_count: u64,
    language: Option<String>,
    updated_at: Option<String>,
}

#[async_trait]
impl Engine for GitHub {
    fn config(&self) -> &EngineConfig {
        &self.config
    }

    async fn search(&self, query: &SearchQuery) -> Result<Vec<SearchResult>> {
        let url = format!(
            "{}/search/repositories?q={}&per_page={}",
            self.base_url.trim_end_matches('/'),
            urlencoding::encode(&query.query),
            query.limit
        );

        let response = self
            .client
            .get(&url)
            .header("Accept", "application/vnd.github+json")
            .send()
            .await?
            .error_for_status()?;
        let body: GitHubResponse = response.json().await?;

        Ok(self.parse_results(body, query.limit))
    }
}

impl GitHub {
    fn parse_results(&self, body: GitHubResponse, limit: usize) -> Vec<SearchResult> {
        body.items
            .into_iter()
            .take(limit)
            .map(|repo| {
                let mut result =
                    SearchResult::new(repo.html_url, repo.name, repo.description.unwrap_or_default())
                        .with_source(self.name())
                        .with_metadata("stars", repo.stargazers_count);
                if let Some(language) = repo.language {
                    result = result.with_metadata("language", language);
                }
                if let Some(updated_at) = repo.updated_at {
                    result = result.with_metadata("updated_at", updated_at);
                }
                result
            })
            .collect()
    }
}
