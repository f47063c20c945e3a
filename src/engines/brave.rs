//! Brave Search API implementation.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use crate::fetcher_http::{http_client, DEFAULT_USER_AGENT};
use crate::{Engine, EngineConfig, Result, SearchQuery, SearchResult};

const DEFAULT_BASE_URL: &str = "https://api.search.brave.com";

/// Brave caps `count` at this value.
const MAX_COUNT: usize = 20;

/// Brave search engine (keyed web search API).
pub struct Brave {
    config: EngineConfig,
    client: Client,
    api_key: String,
    base_url: String,
}

impl Brave {
    /// Creates a new Brave engine with the given subscription token.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            config: EngineConfig::new("Brave", "brave"),
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
        let text = match &query.site {
            Some(site) if !query.query.contains("site:") => format!("site:{} {}", site, query.query),
            _ => query.query.clone(),
        };
        let mut url = format!(
            "{}/res/v1/web/search?q={}&count={}",
            self.base_url.trim_end_matches('/'),
            urlencoding::encode(&text),
            query.limit.min(MAX_COUNT)
        );
        if let Some(range) = query.time_range {
            url.push_str(&format!("&freshness={}", range.freshness()));
        }
        url
    }
}

#[derive(Deserialize)]
struct BraveResponse {
    web: Option<BraveSection>,
    news: Option<BraveSection>,
}

#[derive(Deserialize)]
struct BraveSection {
    #[serde(default)]
    results: Vec<BraveItem>,
}

#[derive(Deserialize)]
struct BraveItem {
    #[serde(default)]
    title: String,
    #[serde(default)]
    url: String,
    #[serde(default)]
    description: String,
    age: Option<String>,
}

#[async_trait]
impl Engine for Brave {
    fn config(&self) -> &EngineConfig {
        &self.config
    }

    async fn search(&self, query: &SearchQuery) -> Result<Vec<SearchResult>> {
        let response = self
            .client
            .get(self.build_url(query))
            .header("Accept", "application/json")
            .header("X-Subscription-Token", &self.api_key)
            .send()
            .await?
            .error_for_status()?;
        let body: BraveResponse = response.json().await?;

        Ok(self.parse_results(body, query.limit))
    }
}

impl Brave {
    /// Web results, or news results when the web section is empty.
    fn parse_results(&self, body: BraveResponse, limit: usize) -> Vec<SearchResult> {
        let web = body.web.map(|s| s.results).unwrap_or_default();
        let items = if web.is_empty() {
            body.news.map(|s| s.results).unwrap_or_default()
        } else {
            web
        };

        items
            .into_iter()
            .take(limit)
            .map(|item| {
                let mut result = SearchResult::new(item.url, item.title, item.description)
                    .with_source(self.name());
                if let Some(age) = item.age {
                    result = result.with_metadata("age", age);
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
    fn test_brave_new() {
        let engine = Brave::new("token");
        assert_eq!(engine.name(), "Brave");
        assert_eq!(engine.shortcut(), "brave");
        assert!(engine.is_enabled());
    }

    #[test]
    fn test_brave_with_config() {
        let engine = Brave::new("token").with_config(EngineConfig {
            timeout: 3,
            ..EngineConfig::new("Brave Custom", "bc")
        });
        assert_eq!(engine.name(), "Brave Custom");
        assert_eq!(engine.timeout(), 3);
    }

    #[test]
    fn test_build_url_caps_count() {
        let engine = Brave::new("token");
        let url = engine.build_url(&SearchQuery::new("rust").with_limit(50));
        assert!(url.ends_with("&count=20"));
    }

    #[test]
    fn test_build_url_site_and_freshness() {
        let engine = Brave::new("token");
        let query = SearchQuery::new("tokio")
            .with_site("docs.rs")
            .with_time_range(TimeRange::Day);
        let url = engine.build_url(&query);
        assert!(url.contains("q=site%3Adocs.rs%20tokio"));
        assert!(url.ends_with("&freshness=p1d"));
    }

    #[test]
    fn test_parse_results_falls_back_to_news() {
        let engine = Brave::new("token");
        let body: BraveResponse = serde_json::from_value(serde_json::json!({
            "web": {"results": []},
            "news": {"results": [{"title": "Launch", "url": "https://n.example/1", "description": "d", "age": "2 hours ago"}]}
        }))
        .unwrap();
        let results = engine.parse_results(body, 10);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].metadata["age"], "2 hours ago");
    }

    #[test]
    fn test_parse_results_empty_body() {
        let engine = Brave::new("token");
        let body: BraveResponse = serde_json::from_value(serde_json::json!({})).unwrap();
        assert!(engine.parse_results(body, 10).is_empty());
    }

    #[tokio::test]
    async fn test_search_against_mock_server() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/res/v1/web/search"))
            .and(query_param("q", "rust"))
            .and(header("x-subscription-token", "token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "web": {"results": [
                    {"title": "Rust", "url": "https://www.rust-lang.org/", "description": "A language"},
                    {"title": "Rust Book", "url": "https://doc.rust-lang.org/book/", "description": "The book"}
                ]}
            })))
            .mount(&server)
            .await;

        let engine = Brave::new("token").with_base_url(server.uri());
        let results = engine.search(&SearchQuery::new("rust")).await.unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].url, "https://www.rust-lang.org/");
        assert_eq!(results[1].source, "Brave");
    }
}
