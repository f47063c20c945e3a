//! Error types for the search library.

use thiserror::Error;

/// Result type alias for search operations.
pub type Result<T> = std::result::Result<T, SearchError>;

/// Errors that can occur during search operations.
///
/// Transport and parse failures never leave the dispatch loop; they are
/// recorded against the backend and logged. Only caller or operator
/// mistakes (`NoEngines`, `InvalidQuery`, `UnknownSource`, `Config`) are
/// returned from [`Search::search`](crate::Search::search).
#[derive(Error, Debug)]
pub enum SearchError {
    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Failed to parse response.
    #[error("Failed to parse response: {0}")]
    Parse(String),

    /// Backend call exceeded its timeout.
    #[error("Search timeout exceeded")]
    Timeout,

    /// No engines configured.
    #[error("No search engines configured")]
    NoEngines,

    /// Invalid query.
    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    /// A pinned source does not match any configured engine.
    #[error("Unknown search source '{0}'")]
    UnknownSource(String),

    /// Invalid or missing configuration.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Response cache I/O failed.
    #[error("Cache error: {0}")]
    Cache(#[from] std::io::Error),

    /// URL parsing error.
    #[error("URL parsing error: {0}")]
    UrlParse(#[from] url::ParseError),

    /// Generic error.
    #[error("{0}")]
    Other(String),
}

impl SearchError {
    /// Returns true for errors that indicate a caller or operator mistake
    /// rather than a transient backend problem.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            SearchError::NoEngines
                | SearchError::InvalidQuery(_)
                | SearchError::UnknownSource(_)
                | SearchError::Config(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_parse() {
        let err = SearchError::Parse("invalid JSON".to_string());
        assert_eq!(err.to_string(), "Failed to parse response: invalid JSON");
    }

    #[test]
    fn test_error_display_timeout() {
        let err = SearchError::Timeout;
        assert_eq!(err.to_string(), "Search timeout exceeded");
    }

    #[test]
    fn test_error_display_no_engines() {
        let err = SearchError::NoEngines;
        assert_eq!(err.to_string(), "No search engines configured");
    }

    #[test]
    fn test_error_display_unknown_source() {
        let err = SearchError::UnknownSource("Bing".to_string());
        assert_eq!(err.to_string(), "Unknown search source 'Bing'");
    }

    #[test]
    fn test_error_display_config() {
        let err = SearchError::Config("limit must be greater than 0".to_string());
        assert_eq!(
            err.to_string(),
            "Configuration error: limit must be greater than 0"
        );
    }

    #[test]
    fn test_error_from_io() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: SearchError = io.into();
        assert!(matches!(err, SearchError::Cache(_)));
        assert!(err.to_string().contains("missing"));
    }

    #[test]
    fn test_is_configuration() {
        assert!(SearchError::NoEngines.is_configuration());
        assert!(SearchError::UnknownSource("x".into()).is_configuration());
        assert!(SearchError::InvalidQuery("empty".into()).is_configuration());
        assert!(!SearchError::Timeout.is_configuration());
        assert!(!SearchError::Parse("bad".into()).is_configuration());
    }

    #[test]
    fn test_error_display_other() {
        let err = SearchError::Other("something went wrong".to_string());
        assert_eq!(err.to_string(), "something went wrong");
    }
}
