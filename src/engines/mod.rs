//! Search engine implementations.

// Keyed APIs
mod anspire;
mod brave;

// Public JSON endpoints
mod github;
mod hackernews;
mod reddit;
mod stackoverflow;

// HTML scraping
mod duckduckgo;

pub use anspire::Anspire;
pub use brave::Brave;
pub use duckduckgo::DuckDuckGo;
pub use github::GitHub;
pub use hackernews::HackerNews;
pub use reddit::Reddit;
pub use stackoverflow::StackOverflow;

/// Maximum snippet length for sources that return full text bodies.
const SNIPPET_CHARS: usize = 200;

/// Truncates to at most `max` characters, on a char boundary.
fn truncate_chars(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((idx, _)) => text[..idx].to_string(),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_chars_short() {
        assert_eq!(truncate_chars("abc", 10), "abc");
    }

    #[test]
    fn test_truncate_chars_multibyte() {
        assert_eq!(truncate_chars("机器学习新闻", 2), "机器");
        assert_eq!(truncate_chars("abcdef", 3), "abc");
    }
}
