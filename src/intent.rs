//! Query intent classification.
//!
//! Maps free text to a coarse [`SearchIntent`] used to bias engine order.
//! Structural checks run first and the first match wins:
//!
//! 1. site-scoped (`site:example.com`, "search on example.com", `在...搜索`)
//! 2. multi-site (two or more known sites mentioned)
//! 3. time-scoped (recency keywords or a `YYYY-MM-DD` style date)
//!
//! Otherwise technical and news keyword scores decide, with technical
//! checked first so ties favour it.

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::{SearchError, TimeRange};

static SITE_QUALIFIER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"site:([^\s]+)").expect("Invalid site qualifier regex"));

static SITE_PHRASE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\bsearch\s+(?:in|on|at)\s+([a-z0-9][a-z0-9.-]*\.[a-z]{2,})")
        .expect("Invalid site phrase regex")
});

static SITE_PHRASE_ZH_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"在\s*([^\s]+?)\s*(?:搜索|查找|找)").expect("Invalid site phrase regex")
});

static DATE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\d{4}[-/年]\d{1,2}[-/月]\d{1,2}").expect("Invalid date regex")
});

static CODE_SYNTAX_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(?:function|class|import|from|def)\b").expect("Invalid code syntax regex")
});

static ERROR_MESSAGE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(?:error|exception|failed)\b|错误|失败").expect("Invalid error message regex")
});

/// Coarse intent of a query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchIntent {
    General,
    SiteSearch,
    MultiSite,
    TimeRange,
    Technical,
    News,
    Reference,
}

impl SearchIntent {
    /// Returns the snake_case identifier.
    pub fn as_str(&self) -> &'static str {
        match self {
            SearchIntent::General => "general",
            SearchIntent::SiteSearch => "site_search",
            SearchIntent::MultiSite => "multi_site",
            SearchIntent::TimeRange => "time_range",
            SearchIntent::Technical => "technical",
            SearchIntent::News => "news",
            SearchIntent::Reference => "reference",
        }
    }
}

impl fmt::Display for SearchIntent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SearchIntent {
    type Err = SearchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "general" => Ok(SearchIntent::General),
            "site_search" | "site" => Ok(SearchIntent::SiteSearch),
            "multi_site" => Ok(SearchIntent::MultiSite),
            "time_range" | "time" => Ok(SearchIntent::TimeRange),
            "technical" | "code" => Ok(SearchIntent::Technical),
            "news" => Ok(SearchIntent::News),
            "reference" => Ok(SearchIntent::Reference),
            other => Err(SearchError::InvalidQuery(format!("unknown intent '{other}'"))),
        }
    }
}

/// Result of classifying a query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntentAnalysis {
    /// Detected intent.
    pub intent: SearchIntent,
    /// Confidence in `[0, 1]`.
    pub confidence: f64,
    /// Sites named by the query.
    pub sites: Vec<String>,
    /// Keywords or dates that triggered the decision.
    pub keywords: Vec<String>,
    /// Human-readable explanation.
    pub reasoning: String,
}

impl IntentAnalysis {
    fn new(intent: SearchIntent, confidence: f64, reasoning: impl Into<String>) -> Self {
        Self {
            intent,
            confidence,
            sites: Vec::new(),
            keywords: Vec::new(),
            reasoning: reasoning.into(),
        }
    }

    fn with_sites(mut self, sites: Vec<String>) -> Self {
        self.sites = sites;
        self
    }

    fn with_keywords(mut self, keywords: Vec<String>) -> Self {
        self.keywords = keywords;
        self
    }

    /// Builds an analysis for an intent chosen by the caller.
    pub fn forced(intent: SearchIntent) -> Self {
        Self::new(intent, 1.0, format!("intent set by caller: {intent}"))
    }
}

/// Keyword tables and thresholds used by [`IntentClassifier`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntentTables {
    /// Sites recognized for multi-site detection.
    pub known_sites: Vec<String>,
    /// Recency keywords and the time range each implies.
    pub time_keywords: Vec<(TimeRange, Vec<String>)>,
    /// Technical keywords.
    pub technical_keywords: Vec<String>,
    /// News keywords.
    pub news_keywords: Vec<String>,
    /// Score added per matched technical keyword.
    pub technical_increment: f64,
    /// Score added per matched news keyword.
    pub news_increment: f64,
    /// Bump for code-syntax words.
    pub code_syntax_bonus: f64,
    /// Bump for error-message words.
    pub error_message_bonus: f64,
    /// Minimum technical score for `technical`.
    pub technical_threshold: f64,
    /// Minimum news score for `news`.
    pub news_threshold: f64,
}

fn strings(words: &[&str]) -> Vec<String> {
    words.iter().map(|w| w.to_string()).collect()
}

impl Default for IntentTables {
    fn default() -> Self {
        Self {
            known_sites: strings(&[
                "github.com",
                "stackoverflow.com",
                "news.ycombinator.com",
                "reddit.com",
                "pypi.org",
                "npmjs.com",
                "crates.io",
                "docs.rs",
                "docs.python.org",
                "developer.mozilla.org",
                "open.anspire.cn",
            ]),
            time_keywords: vec![
                (TimeRange::Week, strings(&["最近", "近期", "latest", "recent"])),
                (TimeRange::Day, strings(&["今天", "today"])),
                (TimeRange::Week, strings(&["本周", "this week", "这一周"])),
                (TimeRange::Month, strings(&["本月", "this month", "这个月"])),
                (TimeRange::Year, strings(&["今年", "this year"])),
            ],
            technical_keywords: strings(&[
                "api", "sdk", "library", "框架", "framework", "代码", "code", "github",
                "stack overflow", "python", "javascript", "typescript", "java", "rust",
                "golang", "bug", "error", "exception", "issue", "安装", "install", "配置",
                "config", "文档", "doc", "tutorial", "教程", "package", "module", "npm",
                "cargo", "pip",
            ]),
            news_keywords: strings(&[
                "新闻", "news", "报道", "最新", "发布", "消息", "公告", "动态", "release",
                "launch", "startup", "announced", "breaking", "funding", "acquired",
            ]),
            technical_increment: 0.1,
            news_increment: 0.15,
            code_syntax_bonus: 0.2,
            error_message_bonus: 0.15,
            technical_threshold: 0.4,
            news_threshold: 0.3,
        }
    }
}

/// Keyword and pattern based intent classifier.
///
/// Pure and deterministic for a given set of tables.
#[derive(Debug, Clone, Default)]
pub struct IntentClassifier {
    tables: IntentTables,
}

impl IntentClassifier {
    /// Creates a classifier over the given tables.
    pub fn new(tables: IntentTables) -> Self {
        Self { tables }
    }

    /// Returns the classifier tables.
    pub fn tables(&self) -> &IntentTables {
        &self.tables
    }

    /// Classifies a query.
    pub fn classify(&self, query: &str) -> IntentAnalysis {
        let lower = query.to_lowercase();

        if let Some(analysis) = self.check_site_search(query, &lower) {
            return analysis;
        }
        if let Some(analysis) = self.check_multi_site(&lower) {
            return analysis;
        }
        if let Some(analysis) = self.check_time_range(query, &lower) {
            return analysis;
        }

        let (technical, technical_keywords) = self.score_technical(&lower);
        let (news, news_keywords) = self.score_news(&lower);

        if technical >= self.tables.technical_threshold {
            return IntentAnalysis::new(
                SearchIntent::Technical,
                technical,
                format!("technical query, matched: {}", technical_keywords.join(", ")),
            )
            .with_keywords(technical_keywords);
        }

        if news >= self.tables.news_threshold {
            return IntentAnalysis::new(
                SearchIntent::News,
                news,
                format!("news query, matched: {}", news_keywords.join(", ")),
            )
            .with_keywords(news_keywords);
        }

        IntentAnalysis::new(SearchIntent::General, 0.5, "general query")
    }

    /// Maps a time-scoped analysis to the time range its keywords imply.
    ///
    /// Date-triggered analyses carry no range since an exact date cannot be
    /// expressed as a recency window.
    pub fn time_range_hint(&self, analysis: &IntentAnalysis) -> Option<TimeRange> {
        if analysis.intent != SearchIntent::TimeRange {
            return None;
        }
        analysis.keywords.iter().find_map(|kw| {
            self.tables
                .time_keywords
                .iter()
                .find(|(_, words)| words.iter().any(|w| w == kw))
                .map(|(range, _)| *range)
        })
    }

    fn check_site_search(&self, query: &str, lower: &str) -> Option<IntentAnalysis> {
        if let Some(caps) = SITE_QUALIFIER_RE.captures(lower) {
            let site = clean_site(&caps[1]);
            if !site.is_empty() {
                return Some(
                    IntentAnalysis::new(
                        SearchIntent::SiteSearch,
                        0.95,
                        format!("site: qualifier, searching within {site}"),
                    )
                    .with_sites(vec![site]),
                );
            }
        }

        let caps = SITE_PHRASE_RE
            .captures(lower)
            .or_else(|| SITE_PHRASE_ZH_RE.captures(query))?;
        let site = clean_site(&caps[1]);
        if site.is_empty() {
            return None;
        }
        Some(
            IntentAnalysis::new(
                SearchIntent::SiteSearch,
                0.90,
                format!("natural-language site scope: {site}"),
            )
            .with_sites(vec![site]),
        )
    }

    fn check_multi_site(&self, lower: &str) -> Option<IntentAnalysis> {
        let found: Vec<String> = self
            .tables
            .known_sites
            .iter()
            .filter(|site| lower.contains(site.as_str()))
            .cloned()
            .collect();

        if found.len() < 2 {
            return None;
        }
        Some(
            IntentAnalysis::new(
                SearchIntent::MultiSite,
                0.85,
                format!("multiple known sites: {}", found.join(", ")),
            )
            .with_sites(found.clone())
            .with_keywords(found),
        )
    }

    fn check_time_range(&self, query: &str, lower: &str) -> Option<IntentAnalysis> {
        let matched: Vec<String> = self
            .tables
            .time_keywords
            .iter()
            .flat_map(|(_, words)| words.iter())
            .filter(|kw| lower.contains(kw.as_str()))
            .cloned()
            .collect();

        if !matched.is_empty() {
            return Some(
                IntentAnalysis::new(
                    SearchIntent::TimeRange,
                    0.80,
                    format!("time keywords: {}", matched.join(", ")),
                )
                .with_keywords(matched),
            );
        }

        let dates: Vec<String> = DATE_RE
            .find_iter(query)
            .map(|m| m.as_str().to_string())
            .collect();
        if dates.is_empty() {
            return None;
        }
        Some(
            IntentAnalysis::new(
                SearchIntent::TimeRange,
                0.75,
                format!("dates: {}", dates.join(", ")),
            )
            .with_keywords(dates),
        )
    }

    fn score_technical(&self, lower: &str) -> (f64, Vec<String>) {
        let mut matched: Vec<String> = self
            .tables
            .technical_keywords
            .iter()
            .filter(|kw| lower.contains(kw.as_str()))
            .cloned()
            .collect();
        let mut score = matched.len() as f64 * self.tables.technical_increment;

        if CODE_SYNTAX_RE.is_match(lower) {
            score += self.tables.code_syntax_bonus;
            matched.push("code syntax".to_string());
        }
        if ERROR_MESSAGE_RE.is_match(lower) {
            score += self.tables.error_message_bonus;
            matched.push("error message".to_string());
        }

        (score.min(1.0), matched)
    }

    fn score_news(&self, lower: &str) -> (f64, Vec<String>) {
        let matched: Vec<String> = self
            .tables
            .news_keywords
            .iter()
            .filter(|kw| lower.contains(kw.as_str()))
            .cloned()
            .collect();
        let score = matched.len() as f64 * self.tables.news_increment;
        (score.min(1.0), matched)
    }
}

fn clean_site(raw: &str) -> String {
    raw.trim_matches(|c: char| matches!(c, ',' | ';' | '"' | '\'' | ')' | '(' | '.'))
        .to_lowercase()
}
