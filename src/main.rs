//! # Orbital News
//!
//! Aggregates news articles per country from configured RSS/Atom feeds and
//! optionally translates them into English through DeepL.
//!
//! ## Features
//!
//! - Concurrent, bounded fan-out over every feed of a country
//! - Result caching per feed, with stampede prevention on cache misses
//! - Short-lived blacklisting of feeds that fail to fetch or parse
//! - Cached translation of titles and descriptions, skipped for English sources
//! - JSON output to stdout or to a dated output directory
//!
//! ## Usage
//!
//! ```sh
//! orbital_news --feeds data/feeds.json news -c FR -c DE --translate
//! ```
//!
//! ## Architecture
//!
//! 1. **Registry**: resolve a country code to its feed URLs
//! 2. **Aggregation**: fetch feeds concurrently (4 at a time by default), reusing cached results
//! 3. **Translation**: translate up to 5 items per feed when requested
//! 4. **Output**: merge up to 10 articles per country and write them as JSON

use clap::Parser;
use futures::stream::{self, StreamExt};
use std::error::Error;
use std::sync::Arc;
use tracing::{debug, error, info, instrument, warn};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod aggregator;
mod cache;
mod cli;
mod config;
mod error;
mod feeds;
mod languages;
mod locks;
mod models;
mod outputs;
mod registry;
mod translate;
mod utils;

use aggregator::Aggregator;
use cache::TranslationCache;
use cli::{Cli, Command, FeedsCommand};
use config::{AppConfig, load_config};
use error::AggregateError;
use feeds::{FeedParser, HttpFeedParser};
use outputs::json;
use models::Article;
use registry::{FeedConfig, FeedRegistry, JsonFileRegistry};
use translate::{DeepLClient, RetryTranslator, TranslationService};

/// Countries aggregated at the same time by one `news` invocation.
const PARALLEL_COUNTRIES: usize = 4;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_writer(std::io::stderr)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    let args = Cli::parse();
    debug!(?args.config, feeds = %args.feeds, "Parsed CLI arguments");

    let config = load_config(args.config.as_deref())?;

    match args.command {
        Command::News {
            countries,
            translate,
            json_output_dir,
        } => {
            let registry: Arc<dyn FeedRegistry> = Arc::new(JsonFileRegistry::load(&args.feeds)?);
            let parser: Arc<dyn FeedParser> = Arc::new(HttpFeedParser::new(&config.fetch)?);
            let mut aggregator = Aggregator::new(&config, registry, parser);
            if let Some(translator) = build_translator(&config, args.deepl_api_key.as_deref()) {
                aggregator = aggregator.with_translator(translator);
            }
            run_news(&aggregator, countries, translate, json_output_dir.as_deref()).await?;
        }
        Command::TestFeed { url } => {
            let parser = HttpFeedParser::new(&config.fetch)?;
            let probe = feeds::probe(&parser, &url).await?;
            println!("{}", serde_json::to_string_pretty(&probe)?);
        }
        Command::Countries => {
            let registry = JsonFileRegistry::load(&args.feeds)?;
            for (country, count) in registry.countries().await {
                let lang = languages::source_language(&country).unwrap_or("-");
                println!("{country}\t{count} feeds\t{lang}");
            }
        }
        Command::Usage => {
            let client = DeepLClient::new(args.deepl_api_key.as_deref(), &config.translator)?;
            let usage = client.usage().await?;
            println!("{}", serde_json::to_string_pretty(&usage)?);
        }
        Command::Feeds { action } => run_feeds(action, &args.feeds)?,
    }

    let elapsed = start_time.elapsed();
    info!(?elapsed, "Execution complete");
    Ok(())
}

/// Build the translation stack, or `None` when no API key is configured.
fn build_translator(config: &AppConfig, api_key: Option<&str>) -> Option<TranslationService> {
    match DeepLClient::new(api_key, &config.translator) {
        Ok(client) => {
            let client = RetryTranslator::new(
                client,
                config.translator.max_retries,
                config.translator.base_delay(),
            );
            let cache = TranslationCache::new(
                config.cache.translation_ttl(),
                config.cache.max_entries,
            );
            info!(endpoint = %config.translator.endpoint, "Translation enabled");
            Some(TranslationService::new(Arc::new(client), cache))
        }
        Err(e) => {
            warn!(error = %e, "Translation disabled");
            None
        }
    }
}

/// Aggregate every requested country over one shared [`Aggregator`].
#[instrument(level = "info", skip(aggregator, json_output_dir))]
async fn run_news(
    aggregator: &Aggregator,
    countries: Vec<String>,
    translate: bool,
    json_output_dir: Option<&str>,
) -> Result<(), Box<dyn Error>> {
    let results: Vec<(String, Result<Vec<Article>, AggregateError>)> = stream::iter(countries)
        .map(|country| async move {
            let result = aggregator.aggregate(&country, translate).await;
            (country, result)
        })
        .buffer_unordered(PARALLEL_COUNTRIES)
        .collect()
        .await;

    report_results(results, translate, json_output_dir).await
}

/// Print or write each country's articles.
///
/// Countries without feeds or articles are reported as no content. Any other
/// failure is logged, the remaining countries are still emitted, and the
/// first failure is returned at the end.
async fn report_results(
    results: Vec<(String, Result<Vec<Article>, AggregateError>)>,
    translate: bool,
    json_output_dir: Option<&str>,
) -> Result<(), Box<dyn Error>> {
    let mut fatal: Option<Box<dyn Error>> = None;
    for (country, result) in results {
        let articles = match result {
            Ok(articles) if articles.is_empty() => {
                info!(%country, "No articles returned; no content");
                continue;
            }
            Ok(articles) => articles,
            Err(AggregateError::NoFeedsConfigured(_)) => {
                warn!(%country, "No feeds for country; no content");
                continue;
            }
            Err(e) => {
                error!(%country, error = %e, "Failed to fetch news");
                fatal.get_or_insert(e.into());
                continue;
            }
        };

        let news = json::country_news(&country, translate, articles);
        let emitted: Result<(), Box<dyn Error>> = match json_output_dir {
            Some(dir) => json::write_country_news(&news, dir).await.map(|_| ()),
            None => match json::to_pretty_json(&news) {
                Ok(rendered) => {
                    println!("{rendered}");
                    Ok(())
                }
                Err(e) => Err(e.into()),
            },
        };
        if let Err(e) = emitted {
            error!(%country, error = %e, "Failed to emit news");
            fatal.get_or_insert(e);
        }
    }

    match fatal {
        Some(e) => Err(e),
        None => Ok(()),
    }
}

/// Apply a `feeds` subcommand to the registry file at `path`.
#[instrument(level = "info", skip(action))]
fn run_feeds(action: FeedsCommand, path: &str) -> Result<(), Box<dyn Error>> {
    let mut registry = JsonFileRegistry::load(path)?;
    match action {
        FeedsCommand::Set { country, urls } => {
            let stored = registry.set_feeds(&country, urls)?;
            registry.save(path)?;
            println!("{country}\t{} feeds", stored.len());
        }
        FeedsCommand::Remove { country } => {
            if !registry.remove(&country)? {
                warn!(%country, "Country had no feeds configured");
            }
            registry.save(path)?;
        }
        FeedsCommand::Import { file } => {
            let raw = std::fs::read_to_string(&file)?;
            let entries: Vec<FeedConfig> = serde_json::from_str(&raw)?;
            let imported = registry.import(entries);
            registry.save(path)?;
            println!("imported {imported} entries");
        }
        FeedsCommand::Export { output } => match output {
            Some(output) => registry.save(&output)?,
            None => println!("{}", serde_json::to_string_pretty(&registry.entries())?),
        },
    }
    Ok(())
}
