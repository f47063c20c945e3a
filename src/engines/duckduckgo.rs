//! DuckDuckGo search engine implementation.

use std::sync::Arc;

use async_trait::async_trait;
use scraper::{Html, Selector};
use url::Url;

use crate::fetcher::PageFetcher;
use crate::fetcher_http::HttpFetcher;
use crate::{Engine, EngineConfig, Result, SearchError, SearchQuery, SearchResult};

const DEFAULT_BASE_URL: &str = "https://html.duckduckgo.com";

/// DuckDuckGo search engine, scraping the HTML-only result page.
pub struct DuckDuckGo {
    config: EngineConfig,
    fetcher: Arc<dyn PageFetcher>,
    base_url: String,
}

impl DuckDuckGo {
    /// Creates a new DuckDuckGo engine.
    pub fn new() -> Self {
        Self {
            config: EngineConfig::new("DuckDuckGo", "ddg"),
            fetcher: Arc::new(HttpFetcher::new()),
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    /// Sends extra headers with every request.
    pub fn with_headers(mut self, headers: &[(String, String)]) -> Self {
        self.fetcher = Arc::new(HttpFetcher::with_headers(headers));
        self
    }

    /// Uses a custom page fetcher.
    pub fn with_fetcher(mut self, fetcher: Arc<dyn PageFetcher>) -> Self {
        self.fetcher = fetcher;
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

impl Default for DuckDuckGo {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Engine for DuckDuckGo {
    fn config(&self) -> &EngineConfig {
        &self.config
    }

    async fn search(&self, query: &SearchQuery) -> Result<Vec<SearchResult>> {
        let url = format!(
            "{}/html/?q={}",
            self.base_url.trim_end_matches('/'),
            urlencoding::encode(&query.query)
        );

        let html = self.fetcher.fetch(&url).await?;
        let mut results = self.parse_results(&html)?;
        results.truncate(query.limit);
        Ok(results)
    }
}

impl DuckDuckGo {
    fn parse_results(&self, html: &str) -> Result<Vec<SearchResult>> {
        let document = Html::parse_document(html);
        let result_selector = Selector::parse(".result")
            .map_err(|e| SearchError::Parse(format!("Failed to parse selector: {:?}", e)))?;
        let title_selector = Selector::parse(".result__title a")
            .map_err(|e| SearchError::Parse(format!("Failed to parse selector: {:?}", e)))?;
        let snippet_selector = Selector::parse(".result__snippet")
            .map_err(|e| SearchError::Parse(format!("Failed to parse selector: {:?}", e)))?;

        let mut results = Vec::new();

        for element in document.select(&result_selector) {
            if element.value().classes().any(|c| c == "result--ad") {
                continue;
            }
            let Some(title_elem) = element.select(&title_selector).next() else {
                continue;
            };

            let title = title_elem.text().collect::<String>().trim().to_string();
            let href = title_elem.value().attr("href").unwrap_or_default();
            let url = extract_redirect_url(href).unwrap_or_else(|| href.to_string());

            let snippet = element
                .select(&snippet_selector)
                .next()
                .map(|e| e.text().collect::<String>().trim().to_string())
                .unwrap_or_default();

            if !url.is_empty() && !title.is_empty() {
                results.push(SearchResult::new(url, title, snippet).with_source(self.name()));
            }
        }

        Ok(results)
    }
}

/// Unwraps a `duckduckgo.com/l/?uddg=<target>` redirect to its target.
///
/// Returns `None` for links that are not redirects.
fn extract_redirect_url(href: &str) -> Option<String> {
    let absolute = if href.starts_with("//") {
        format!("https:{href}")
    } else {
        href.to_string()
    };
    let parsed = Url::parse(&absolute).ok()?;
    if !parsed.host_str()?.ends_with("duckduckgo.com") || !parsed.path().starts_with("/l/") {
        return None;
    }
    parsed
        .query_pairs()
        .find(|(key, _)| key == "uddg")
        .map(|(_, value)| value.into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    const RESULT_PAGE: &str = r#"
        <html>
        <body>
            <div class="result results_links result--ad">
                <h2 class="result__title"><a class="result__a" href="https://ads.example.com">Sponsored</a></h2>
            </div>
            <div class="result results_links">
                <h2 class="result__title">
                    <a class="result__a" href="//duckduckgo.com/l/?uddg=https%3A%2F%2Fwww.rust-lang.org%2F&amp;rut=abc">Rust Programming Language</a>
                </h2>
                <a class="result__snippet">A language empowering everyone.</a>
            </div>
            <div class="result results_links">
                <h2 class="result__title">
                    <a class="result__a" href="https://doc.rust-lang.org/book/">The Rust Book</a>
                </h2>
            </div>
            <div class="result results_links">
                <h2 class="result__title"><a class="result__a" href="">Empty</a></h2>
            </div>
        </body>
        </html>
    "#;

    struct CannedFetcher(&'static str);

    #[async_trait]
    impl PageFetcher for CannedFetcher {
        async fn fetch(&self, _url: &str) -> Result<String> {
            Ok(self.0.to_string())
        }
    }

    #[test]
    fn test_duckduckgo_new() {
        let engine = DuckDuckGo::new();
        assert_eq!(engine.config.name, "DuckDuckGo");
        assert_eq!(engine.config.shortcut, "ddg");
        assert_eq!(engine.config.timeout, 10);
        assert!(engine.config.enabled);
    }

    #[test]
    fn test_duckduckgo_with_config() {
        let custom_config = EngineConfig {
            name: "Custom DDG".to_string(),
            shortcut: "cddg".to_string(),
            ..Default::default()
        };
        let engine = DuckDuckGo::new().with_config(custom_config);
        assert_eq!(engine.name(), "Custom DDG");
        assert_eq!(engine.shortcut(), "cddg");
    }

    #[test]
    fn test_extract_redirect_url() {
        let url = "//duckduckgo.com/l/?uddg=https%3A%2F%2Fexample.com%2Fpage&rut=abc";
        let result = extract_redirect_url(url);
        assert_eq!(result, Some("https://example.com/page".to_string()));
    }

    #[test]
    fn test_extract_redirect_url_no_params() {
        let url = "https://duckduckgo.com/l/?uddg=https%3A%2F%2Fexample.com";
        let result = extract_redirect_url(url);
        assert_eq!(result, Some("https://example.com".to_string()));
    }

    #[test]
    fn test_extract_redirect_url_plain_link() {
        assert_eq!(extract_redirect_url("https://example.com/l/?uddg=x"), None);
        assert_eq!(extract_redirect_url("not a url"), None);
    }

    #[test]
    fn test_parse_results_empty_html() {
        let engine = DuckDuckGo::new();
        let results = engine.parse_results("<html><body></body></html>").unwrap();
        assert!(results.is_empty());
    }

    #[test]
    fn test_parse_results_with_results() {
        let engine = DuckDuckGo::new();
        let results = engine.parse_results(RESULT_PAGE).unwrap();

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].title, "Rust Programming Language");
        assert_eq!(results[0].url, "https://www.rust-lang.org/");
        assert_eq!(results[0].snippet, "A language empowering everyone.");
        assert_eq!(results[0].source, "DuckDuckGo");
        assert_eq!(results[1].url, "https://doc.rust-lang.org/book/");
        assert_eq!(results[1].snippet, "");
    }

    #[tokio::test]
    async fn test_search_with_fetcher_truncates() {
        let engine = DuckDuckGo::new().with_fetcher(Arc::new(CannedFetcher(RESULT_PAGE)));
        let results = engine
            .search(&SearchQuery::new("rust").with_limit(1))
            .await
            .unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].url, "https://www.rust-lang.org/");
    }

    #[tokio::test]
    async fn test_search_against_mock_server() {
        use wiremock::matchers::{method, path, query_param};
        use wiremock::{Mock, MockServer, ResponseTemplate};

        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/html/"))
            .and(query_param("q", "rust lang"))
            .respond_with(ResponseTemplate::new(200).set_body_string(RESULT_PAGE))
            .mount(&server)
            .await;

        let engine = DuckDuckGo::new().with_base_url(server.uri());
        let results = engine.search(&SearchQuery::new("rust lang")).await.unwrap();
        assert_eq!(results.len(), 2);
    }
}
