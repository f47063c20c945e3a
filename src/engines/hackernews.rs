//! Hacker News search via the Algolia API.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use super::{truncate_chars, SNIPPET_CHARS};
use crate::fetcher_http::{http_client, DEFAULT_USER_AGENT};
use crate::{Engine, EngineConfig, Result, SearchQuery, SearchResult};

const DEFAULT_BASE_URL: &str = "https://hn.algolia.com";

/// Hacker News search engine.
pub struct HackerNews {
    config: EngineConfig,
    client: Client,
    base_url: String,
}

impl HackerNews {
    /// Creates a new Hacker News engine.
    pub fn new() -> Self {
        Self {
            config: EngineConfig::new("Hacker News", "hn"),
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

impl Default for HackerNews {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Deserialize)]
struct AlgoliaResponse {
    #[serde(default)]
    hits: Vec<AlgoliaHit>,
}

#[derive(Deserialize)]
struct AlgoliaHit {
    title: Option<String>,
    story_title: Option<String>,
    url: Option<String>,
    story_url: Option<String>,
    comment_text: Option<String>,
    points: Option<i64>,
    author: Option<String>,
    created_at: Option<String>,
}

#[async_trait]
impl Engine for HackerNews {
    fn config(&self) -> &EngineConfig {
        &self.config
    }

    async fn search(&self, query: &SearchQuery) -> Result<Vec<SearchResult>> {
        let url = format!(
            "{}/api/v1/search?query={}&hitsPerPage={}",
            self.base_url.trim_end_matches('/'),
            urlencoding::encode(&query.query),
            query.limit
        );

        let response = self.client.get(&url).send().await?.error_for_status()?;
        let body: AlgoliaResponse = response.json().await?;

        Ok(self.parse_results(body, query.limit))
    }
}

impl HackerNews {
    /// Comment hits carry their story's title and URL.
    fn parse_results(&self, body: AlgoliaResponse, limit: usize) -> Vec<SearchResult> {
        body.hits
            .into_iter()
            .take(limit)
            .map(|hit| {
                let title = hit.title.or(hit.story_title).unwrap_or_default();
                let url = hit.url.or(hit.story_url).unwrap_or_default();
                let snippet = hit
                    .comment_text
                    .map(|text| truncate_chars(&text, SNIPPET_CHARS))
                    .unwrap_or_default();

                let mut result = SearchResult::new(url, title, snippet).with_source(self.name());
                if let Some(points) = hit.points {
                    result = result.with_metadata("points", points);
                }
                if let Some(author) = hit.author {
                    result = result.with_metadata("author", author);
                }
                if let Some(created_at) = hit.created_at {
                    result = result.with_metadata("created_at", created_at);
                }
                result
            })
            .collect()
    }
}
