//! HTTP-based page fetcher using reqwest.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::Client;
use tracing::warn;

use crate::fetcher::PageFetcher;
use crate::Result;

/// User-Agent sent by API-based engines.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (compatible; a3s-unisearch/0.1)";

/// Browser User-Agent for endpoints that reject non-browser clients.
pub const BROWSER_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Builds a reqwest client with a User-Agent and extra default headers.
///
/// Headers with an invalid name or value are skipped with a warning.
pub fn try_http_client(user_agent: &str, headers: &[(String, String)]) -> Result<Client> {
    let mut map = HeaderMap::new();
    for (name, value) in headers {
        match (
            HeaderName::from_bytes(name.as_bytes()),
            HeaderValue::from_str(value),
        ) {
            (Ok(name), Ok(value)) => {
                map.insert(name, value);
            }
            _ => warn!(header = %name, "skipping invalid request header"),
        }
    }

    Ok(Client::builder()
        .user_agent(user_agent)
        .default_headers(map)
        .build()?)
}

/// Infallible form of [`try_http_client`] for engine constructors.
///
/// On failure the error is logged and a client without the custom
/// User-Agent and headers is built instead.
///
/// # Panics
///
/// Panics if reqwest cannot build even a bare client, i.e. the TLS backend
/// is unusable.
pub fn http_client(user_agent: &str, headers: &[(String, String)]) -> Client {
    try_http_client(user_agent, headers).unwrap_or_else(|e| {
        warn!("Failed to build HTTP client, using a bare one: {}", e);
        Client::builder()
            .build()
            .expect("Failed to create HTTP client")
    })
}

/// A page fetcher that uses plain HTTP requests via reqwest.
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Creates a new `HttpFetcher` with a browser User-Agent.
    pub fn new() -> Self {
        Self {
            client: http_client(BROWSER_USER_AGENT, &[]),
        }
    }

    /// Creates an `HttpFetcher` sending extra headers on every request.
    pub fn with_headers(headers: &[(String, String)]) -> Self {
        Self {
            client: http_client(BROWSER_USER_AGENT, headers),
        }
    }

    /// Creates an `HttpFetcher` with a custom reqwest client.
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

impl Default for HttpFetcher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<String> {
        let response = self.client.get(url).send().await?.error_for_status()?;
        let html = response.text().await?;
        Ok(html)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_http_client_skips_invalid_headers() {
        let headers = vec![
            ("X-Valid".to_string(), "yes".to_string()),
            ("bad header".to_string(), "x".to_string()),
        ];
        assert!(try_http_client(DEFAULT_USER_AGENT, &headers).is_ok());
        let _client = http_client(DEFAULT_USER_AGENT, &headers);
    }

    #[tokio::test]
    async fn test_try_http_client_sends_user_agent() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/ua"))
            .and(header("user-agent", "unisearch-test/1"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let client = try_http_client("unisearch-test/1", &[]).unwrap();
        let response = client.get(format!("{}/ua", server.uri())).send().await.unwrap();
        assert_eq!(response.status(), 200);
    }

    #[tokio::test]
    async fn test_http_fetcher_sends_headers() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/page"))
            .and(header("x-test", "1"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>ok</html>"))
            .mount(&server)
            .await;

        let fetcher = HttpFetcher::with_headers(&[("X-Test".to_string(), "1".to_string())]);
        let body = fetcher.fetch(&format!("{}/page", server.uri())).await.unwrap();
        assert_eq!(body, "<html>ok</html>");
    }

    #[tokio::test]
    async fn test_http_fetcher_error_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let fetcher = HttpFetcher::default();
        assert!(fetcher.fetch(&server.uri()).await.is_err());
    }

    #[test]
    fn test_http_fetcher_with_client() {
        let client = Client::builder().user_agent("test-agent").build().unwrap();
        let _fetcher = HttpFetcher::with_client(client);
    }
}
