//! Anspire semantic search API implementation.

use async_trait::async_trait;
use chrono::Utc;
use reqwest::Client;
use serde::Deserialize;

use crate::fetcher_http::{http_client, DEFAULT_USER_AGENT};
use crate::{Engine, EngineConfig, Result, SearchQuery, SearchResult};

const DEFAULT_BASE_URL: &str = "https://plugin.anspire.cn";

/// The API rejects queries longer than this many characters.
const MAX_QUERY_CHARS: usize = 64;

/// Anspire search engine (paid, keyed).
///
/// Supports site restriction through `Insite` and a time window through
/// `FromTime`.
pub struct Anspire {
    config: EngineConfig,
    client: Client,
    api_key: String,
    base_url: String,
}

impl Anspire {
    /// Creates a new Anspire engine with the given API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            config: EngineConfig::new("Anspire", "anspire"),
            client: http_client(DEFAULT_USER_AGENT, &[]),
            api_key: api_key.into(),
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

    fn build_url(&self, query: &SearchQuery) -> String {
        let text: String = query.query.chars().take(MAX_QUERY_CHARS).collect();
        let mut url = format!(
            "{}/api/ntsearch/search?query={}&top_k={}",
            self.base_url.trim_end_matches('/'),
            urlencoding::encode(&text),
            top_k(query.limit)
        );
        if let Some(site) = &query.site {
            url.push_str(&format!("&Insite={}", urlencoding::encode(site)));
        }
        if let Some(range) = query.time_range {
            let from = Utc::now() - chrono::Duration::days(range.days());
            let from = from.format("%Y-%m-%dT%H:%M:%S").to_string();
            url.push_str(&format!("&FromTime={}", urlencoding::encode(&from)));
        }
        url
    }
}

/// The API accepts `top_k` in steps of ten, from 10 to 50.
fn top_k(limit: usize) -> usize {
    limit.div_ceil(10).clamp(1, 5) * 10
}

#[derive(Deserialize)]
struct AnspireResponse {
    #[serde(default)]
    results: Vec<AnspireItem>,
}

#[derive(Deserialize)]
struct AnspireItem {
    #[serde(default)]
    title: String,
    #[serde(default)]
    url: String,
    #[serde(default)]
    content: String,
    date: Option<String>,
}

#[async_trait]
impl Engine for Anspire {
    fn config(&self) -> &EngineConfig {
        &self.config
    }

    async fn search(&self, query: &SearchQuery) -> Result<Vec<SearchResult>> {
        let response = self
            .client
            .get(self.build_url(query))
            .bearer_auth(&self.api_key)
            .header("Accept", "*/*")
            .send()
            .await?
            .error_for_status()?;
        let body: AnspireResponse = response.json().await?;

        Ok(self.parse_results(body, query.limit))
    }
}

impl Anspire {
    fn parse_results(&self, body: AnspireResponse, limit: usize) -> Vec<SearchResult> {
        body.results
            .into_iter()
            .take(limit)
            .map(|item| {
                let mut result =
                    SearchResult::new(item.url, item.title, item.content).with_source(self.name());
                if let Some(date) = item.date {
                    result = result.with_metadata("date", date);
                }
                result
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::TimeRange;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_anspire_new() {
        let engine = Anspire::new("key");
        assert_eq!(engine.name(), "Anspire");
        assert_eq!(engine.shortcut(), "anspire");
        assert_eq!(engine.timeout(), 10);
        assert_eq!(engine.base_url, DEFAULT_BASE_URL);
    }

    #[test]
    fn test_top_k_steps() {
        assert_eq!(top_k(1), 10);
        assert_eq!(top_k(10), 10);
        assert_eq!(top_k(11), 20);
        assert_eq!(top_k(50), 50);
        assert_eq!(top_k(200), 50);
    }

    #[test]
    fn test_build_url_truncates_query() {
        let engine = Anspire::new("key");
        let long = "a".repeat(100);
        let url = engine.build_url(&SearchQuery::new(long));
        assert!(url.contains(&format!("query={}&", "a".repeat(64))));
    }

    #[test]
    fn test_build_url_with_site_and_time() {
        let engine = Anspire::new("key").with_base_url("http://localhost/");
        let query = SearchQuery::new("rust")
            .with_site("docs.rs")
            .with_time_range(TimeRange::Week);
        let url = engine.build_url(&query);
        assert!(url.starts_with("http://localhost/api/ntsearch/search?query=rust"));
        assert!(url.contains("&Insite=docs.rs"));
        assert!(url.contains("&FromTime="));
    }

    #[tokio::test]
    async fn test_search_against_mock_server() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/ntsearch/search"))
            .and(query_param("query", "rust async"))
            .and(header("authorization", "Bearer secret"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "results": [
                    {"title": "Async Rust", "url": "https://rust-lang.github.io/async-book/", "content": "The async book", "date": "2024-05-01"},
                    {"title": "Tokio", "url": "https://tokio.rs", "content": "Runtime"},
                    {"title": "Extra", "url": "https://extra.example", "content": ""}
                ]
            })))
            .mount(&server)
            .await;

        let engine = Anspire::new("secret").with_base_url(server.uri());
        let results = engine
            .search(&SearchQuery::new("rust async").with_limit(2))
            .await
            .unwrap();

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].title, "Async Rust");
        assert_eq!(results[0].source, "Anspire");
        assert_eq!(results[0].metadata["date"], "2024-05-01");
        assert!(results[1].metadata.is_empty());
    }

    #[tokio::test]
    async fn test_search_unauthorized_is_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let engine = Anspire::new("bad").with_base_url(server.uri());
        assert!(engine.search(&SearchQuery::new("rust")).await.is_err());
    }

    #[tokio::test]
    async fn test_search_missing_results_field() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"code": 0})))
            .mount(&server)
            .await;

        let engine = Anspire::new("key").with_base_url(server.uri());
        let results = engine.search(&SearchQuery::new("rust")).await.unwrap();
        assert!(results.is_empty());
    }
}
