//! A3S UniSearch CLI - unified search command line interface.

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

use a3s_unisearch::{
    Config, DispatchMode, IntentClassifier, ResponseCache, SearchIntent, SearchQuery, SearchResult,
};

/// A3S UniSearch - query several search backends at once
#[derive(Parser)]
#[command(name = "a3s-unisearch")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Search across the configured backends
    Search(SearchArgs),

    /// Show the detected intent of a query
    Intent {
        /// Query to classify
        query: String,
    },

    /// List available search engines
    Engines,

    /// Manage the response cache
    Cache {
        #[command(subcommand)]
        action: CacheAction,
    },
}

#[derive(Parser)]
struct SearchArgs {
    /// Search query
    query: String,

    /// Maximum number of results
    #[arg(short, long)]
    limit: Option<usize>,

    /// Use only this engine (name or shortcut: ddg, gh, so, hn, reddit, brave, anspire)
    #[arg(short, long)]
    source: Option<String>,

    /// Force the intent instead of classifying the query
    #[arg(short, long)]
    intent: Option<String>,

    /// Per-engine timeout in seconds
    #[arg(short, long)]
    timeout: Option<u64>,

    /// Output format
    #[arg(short, long, default_value = "text")]
    format: OutputFormat,

    /// Query every engine concurrently
    #[arg(long)]
    concurrent: bool,

    /// Bypass the response cache
    #[arg(long)]
    no_cache: bool,

    /// Print engine reliability after the search
    #[arg(long)]
    status: bool,
}

#[derive(Subcommand)]
enum CacheAction {
    /// Show cache statistics
    Stats,
    /// Remove every cached response
    Clear,
    /// Remove expired responses
    ClearExpired,
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    /// Human-readable text output
    Text,
    /// JSON output
    Json,
    /// Compact single-line output
    Compact,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "a3s_unisearch=debug" } else { "a3s_unisearch=warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = Config::load()?;

    match cli.command {
        Commands::Search(args) => run_search(config, args).await,
        Commands::Intent { query } => show_intent(&config, &query),
        Commands::Engines => list_engines(&config),
        Commands::Cache { action } => run_cache(&config, action).await,
    }
}

fn list_engines(config: &Config) -> Result<()> {
    let search = config.build_search()?;
    let configured: Vec<&str> = search.engines().iter().map(|e| e.name()).collect();
    let mark = |name: &str| if configured.contains(&name) { "*" } else { " " };

    println!("Available search engines (* = configured):\n");
    println!("  Free:");
    println!("  {} ddg      - DuckDuckGo (HTML results)", mark("DuckDuckGo"));
    println!("  {} gh       - GitHub (repositories)", mark("GitHub"));
    println!("  {} so       - Stack Overflow (answered questions)", mark("Stack Overflow"));
    println!("  {} hn       - Hacker News (Algolia)", mark("Hacker News"));
    println!("  {} reddit   - Reddit", mark("Reddit"));
    println!();
    println!("  Keyed:");
    println!("  {} brave    - Brave Search API (BRAVE_API_KEY)", mark("Brave"));
    println!("  {} anspire  - Anspire semantic search (ANSPIRE_API_KEY)", mark("Anspire"));
    println!();
    println!("Usage: a3s-unisearch search \"query\" -s gh");
    Ok(())
}

fn show_intent(config: &Config, query: &str) -> Result<()> {
    let classifier = IntentClassifier::default();
    let analysis = classifier.classify(query);

    println!("Intent:     {}", analysis.intent);
    println!("Confidence: {:.2}", analysis.confidence);
    if !analysis.sites.is_empty() {
        println!("Sites:      {}", analysis.sites.join(", "));
    }
    if !analysis.keywords.is_empty() {
        println!("Keywords:   {}", analysis.keywords.join(", "));
    }
    println!("Reasoning:  {}", analysis.reasoning);

    let search = config.build_search()?;
    if search.engine_count() > 0 {
        let order = search.visit_order(&SearchQuery::new(query))?;
        println!("Visit order: {}", order.join(" -> "));
    }
    Ok(())
}

async fn run_cache(config: &Config, action: CacheAction) -> Result<()> {
    let Some(cache) = config.file_cache() else {
        anyhow::bail!("Response cache is disabled or has no location");
    };

    match action {
        CacheAction::Stats => {
            let stats = cache.stats().await?;
            println!("Cache directory: {}", stats.cache_dir);
            println!("Entries:         {}", stats.total);
            println!("  valid:         {}", stats.valid);
            println!("  expired:       {}", stats.expired);
            println!("Size:            {:.1} KiB", stats.size_bytes as f64 / 1024.0);
            println!("TTL:             {}s", cache.ttl().as_secs());
        }
        CacheAction::Clear => {
            let removed = cache.clear().await?;
            println!("Removed {} cached responses", removed);
        }
        CacheAction::ClearExpired => {
            let removed = cache.clear_expired().await?;
            println!("Removed {} expired responses", removed);
        }
    }
    Ok(())
}

async fn run_search(mut config: Config, args: SearchArgs) -> Result<()> {
    if args.no_cache {
        config.cache.enabled = false;
    }
    if args.concurrent {
        config.search.dispatch = DispatchMode::Concurrent;
    }
    if let Some(timeout) = args.timeout {
        config.search.timeout_secs = timeout;
    }

    let search = config.build_search()?;

    let mut query = SearchQuery::new(&args.query).with_limit(args.limit.unwrap_or(config.search.limit));
    if let Some(source) = &args.source {
        query = query.with_preferred_source(source);
    }
    if let Some(intent) = &args.intent {
        query = query.with_intent(intent.parse::<SearchIntent>()?);
    }

    let results = search.search(query).await?;

    match args.format {
        OutputFormat::Text => {
            println!(
                "\nSearch results for \"{}\" ({} results in {}ms{}):",
                args.query,
                results.count,
                results.duration_ms,
                if results.cached { ", cached" } else { "" }
            );
            if let Some(intent) = &results.intent {
                println!("Intent: {} ({:.2})", intent.intent, intent.confidence);
            }
            if !results.engines_visited.is_empty() {
                println!("Engines: {}", results.engines_visited.join(" -> "));
            }
            println!();

            for (i, result) in results.items().iter().enumerate() {
                println!("{}. {}", i + 1, result.title);
                println!("   URL: {}", result.url);
                if !result.snippet.is_empty() {
                    println!("   {}", preview(&result.snippet, 150));
                }
                println!("   Source: {}{}", result.source, metadata_line(result));
                println!();
            }
        }
        OutputFormat::Json => {
            let mut output = serde_json::to_value(&results)?;
            if args.status {
                output["status"] = serde_json::to_value(search.status())?;
            }
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Compact => {
            for result in results.items() {
                println!("{}\t{}\t{}", result.source, result.title, result.url);
            }
        }
    }

    if args.status && !matches!(args.format, OutputFormat::Json) {
        println!("Engine reliability:");
        for (name, status) in search.status() {
            println!(
                "  {:<16} {:>5.1}%  ({} ok / {} failed)",
                name,
                status.success_rate * 100.0,
                status.success_count,
                status.failure_count
            );
        }
    }

    Ok(())
}

fn preview(text: &str, max_chars: usize) -> String {
    if text.chars().count() > max_chars {
        format!("{}...", text.chars().take(max_chars).collect::<String>())
    } else {
        text.to_string()
    }
}

fn metadata_line(result: &SearchResult) -> String {
    if result.metadata.is_empty() {
        return String::new();
    }
    let fields: Vec<String> = result
        .metadata
        .iter()
        .map(|(key, value)| match value {
            serde_json::Value::String(s) => format!("{key}={s}"),
            other => format!("{key}={other}"),
        })
        .collect();
    format!(" | {}", fields.join(", "))
}
