//! Reddit search via the public JSON endpoint.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use super::{truncate_chars, SNIPPET_CHARS};
use crate::fetcher_http::{http_client, BROWSER_USER_AGENT};
use crate::{Engine, EngineConfig, Result, SearchQuery, SearchResult};

const DEFAULT_BASE_URL: &str = "https://www.reddit.com";

/// Reddit search engine.
///
/// Reddit rejects the default library User-Agent, so requests go out with a
/// browser one. Results are labelled `Reddit/r/<subreddit>`.
pub struct Reddit {
    config: EngineConfig,
    client: Client,
    base_url: String,
}

impl Reddit {
    /// Creates a new Reddit engine.
    pub fn new() -> Self {
        Self {
            config: EngineConfig::new("Reddit", "reddit"),
            client: http_client(BROWSER_USER_AGENT, &[]),
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    /// Sends extra headers with every request.
    pub fn with_headers(mut self, headers: &[(String, String)]) -> Self {
        self.client = http_client(BROWSER_USER_AGENT, headers);
        self
    }

    /// Overrides the site origin.
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

impl Default for Reddit {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Deserialize)]
struct Listing {
    data: Option<ListingData>,
}

#[derive(Deserialize)]
struct ListingData {
    #[serde(default)]
    children: Vec<Child>,
}

#[derive(Deserialize)]
struct Child {
    data: Post,
}

#[derive(Deserialize)]
struct Post {
    #[serde(default)]
    title: String,
    #[serde(default)]
    url: String,
    #[serde(default)]
    selftext: String,
    #[serde(default)]
    subreddit: String,
    #[serde(default)]
    score: i64,
    #[serde(default)]
    author: String,
    created_utc: Option<f64>,
}

#[async_trait]
impl Engine for Reddit {
    fn config(&self) -> &EngineConfig {
        &self.config
    }

    async fn search(&self, query: &SearchQuery) -> Result<Vec<SearchResult>> {
        let url = format!(
            "{}/search.json?q={}&limit={}",
            self.base_url.trim_end_matches('/'),
            urlencoding::encode(&query.query),
            query.limit
        );

        let response = self.client.get(&url).send().await?.error_for_status()?;
        let listing: Listing = response.json().await?;

        Ok(self.parse_results(listing, query.limit))
    }
}

impl Reddit {
    fn parse_results(&self, listing: Listing, limit: usize) -> Vec<SearchResult> {
        listing
            .data
            .map(|data| data.children)
            .unwrap_or_default()
            .into_iter()
            .map(|child| child.data)
            .filter(|post| !post.title.is_empty() && !post.url.is_empty())
            .take(limit)
            .map(|post| {
                let mut result = SearchResult::new(
                    post.url,
                    post.title,
                    truncate_chars(&post.selftext, SNIPPET_CHARS),
                )
                .with_source(format!("{}/r/{}", self.name(), post.subreddit))
                .with_metadata("score", post.score)
                .with_metadata("subreddit", post.subreddit)
                .with_metadata("author", post.author);
                if let Some(created) = post.created_utc {
                    result = result.with_metadata("created_utc", created);
                }
                result
            })
            .collect()
    }
}
