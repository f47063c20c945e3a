//! Stack Overflow search via the Stack Exchange API.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use super::{truncate_chars, SNIPPET_CHARS};
use crate::fetcher_http::{http_client, DEFAULT_USER_AGENT};
use crate::{Engine, EngineConfig, Result, SearchQuery, SearchResult};

const DEFAULT_BASE_URL: &str = "https://api.stackexchange.com";

/// Stack Overflow search engine.
///
/// Searches question titles, restricted to questions with an accepted
/// answer, most recently active first.
pub struct StackOverflow {
    config: EngineConfig,
    client: Client,
    base_url: String,
}

impl StackOverflow {
    /// Creates a new Stack Overflow engine.
    pub fn new() -> Self {
        Self {
            config: EngineConfig::new("Stack Overflow", "so"),
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

impl Default for StackOverflow {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Deserialize)]
struct StackExchangeResponse {
    #[serde(default)]
    items: Vec<Question>,
}

#[derive(Deserialize)]
struct Question {
    question_id: u64,
    #[serde(default)]
    title: String,
    excerpt: Option<String>,
    #[serde(default)]
    score: i64,
    #[serde(default)]
    answer_count: u64,
    #[serde(default)]
    tags: Vec<String>,
}

#[async_trait]
impl Engine for StackOverflow {
    fn config(&self) -> &EngineConfig {
        &self.config
    }

    async fn search(&self, query: &SearchQuery) -> Result<Vec<SearchResult>> {
        let url = format!(
            "{}/2.3/search/advanced?order=desc&sort=activity&accepted=True&answers=1&title={}&site=stackoverflow&pagesize={}",
            self.base_url.trim_end_matches('/'),
            urlencoding::encode(&query.query),
            query.limit
        );

        let response = self.client.get(&url).send().await?.error_for_status()?;
        let body: StackExchangeResponse = response.json().await?;

        Ok(self.parse_results(body, query.limit))
    }
}

impl StackOverflow {
    fn parse_results(&self, body: StackExchangeResponse, limit: usize) -> Vec<SearchResult> {
        body.items
            .into_iter()
            .take(limit)
            .map(|q| {
                let url = format!("https://stackoverflow.com/questions/{}", q.question_id);
                let snippet = q
                    .excerpt
                    .map(|text| truncate_chars(&text, SNIPPET_CHARS))
                    .unwrap_or_default();
                SearchResult::new(url, q.title, snippet)
                    .with_source(self.name())
                    .with_metadata("score", q.score)
                    .with_metadata("answer_count", q.answer_count)
                    .with_metadata("tags", q.tags)
            })
            .collect()
    }
}
