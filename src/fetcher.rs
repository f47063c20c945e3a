//! Page fetcher abstraction for retrieving HTML content.

use async_trait::async_trait;

use crate::Result;

/// Trait for fetching the raw body of a URL.
///
/// All configuration (user-agent, extra headers) is set at construction
/// time; `fetch` is a simple URL-in, body-out interface. HTML-scraping
/// engines take one of these so tests can substitute canned pages.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Fetches the body of the given URL.
    async fn fetch(&self, url: &str) -> Result<String>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    struct CannedFetcher(&'static str);

    #[async_trait]
    impl PageFetcher for CannedFetcher {
        async fn fetch(&self, _url: &str) -> Result<String> {
            Ok(self.0.to_string())
        }
    }

    #[tokio::test]
    async fn test_page_fetcher_is_object_safe() {
        let fetcher: Arc<dyn PageFetcher> = Arc::new(CannedFetcher("<html></html>"));
        assert_eq!(fetcher.fetch("https://example.com").await.unwrap(), "<html></html>");
    }
}
