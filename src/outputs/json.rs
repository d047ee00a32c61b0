//! JSON output of aggregated news.
//!
//! A run either prints each country's [`CountryNews`] to stdout or writes it
//! to `{json_output_dir}/{date}/{country}.json`, where the date is the UTC
//! day of the aggregation.

use crate::models::{Article, CountryNews};
use crate::utils::ensure_writable_dir;
use chrono::{SecondsFormat, Utc};
use std::error::Error;
use std::path::PathBuf;
use tokio::fs;
use tracing::{info, instrument};

/// Stamp a country's articles with the current time.
pub fn country_news(country: &str, translated: bool, articles: Vec<Article>) -> CountryNews {
    CountryNews {
        country: country.to_string(),
        fetched_at: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
        translated,
        articles,
    }
}

/// Write a [`CountryNews`] below `json_output_dir`, returning the file path.
#[instrument(level = "info", skip_all, fields(json_output_dir = %json_output_dir, country = %news.country))]
pub async fn write_country_news(
    news: &CountryNews,
    json_output_dir: &str,
) -> Result<PathBuf, Box<dyn Error>> {
    let json = serde_json::to_string_pretty(news)?;

    let date = news
        .fetched_at
        .get(..10)
        .ok_or("fetched_at is not an RFC 3339 timestamp")?;
    let full_json_dir = format!("{}/{}", json_output_dir.trim_end_matches('/'), date);
    ensure_writable_dir(&full_json_dir).await?;

    let path = PathBuf::from(&full_json_dir).join(format!("{}.json", news.country));
    fs::write(&path, json).await?;
    info!(path = %path.display(), articles = news.articles.len(), "Wrote JSON news file");
    Ok(path)
}

/// Render a [`CountryNews`] for stdout.
pub fn to_pretty_json(news: &CountryNews) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(news)
}
