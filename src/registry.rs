//! Country to feed-URL registry.
//!
//! The aggregator only needs [`FeedRegistry::feeds`]. [`JsonFileRegistry`]
//! reads the registry file and is also what the `feeds` subcommands edit
//! and save back:
//!
//! ```json
//! [
//!   { "country": "FR", "feeds": ["https://www.lemonde.fr/rss/une.xml"] }
//! ]
//! ```

use crate::error::RegistryError;
use async_trait::async_trait;
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use tracing::{info, instrument, warn};
use url::Url;

/// Source of configured feed URLs per country.
#[async_trait]
pub trait FeedRegistry: Send + Sync {
    /// Feed URLs for `country`, or [`RegistryError::NoFeeds`] when none are configured.
    async fn feeds(&self, country: &str) -> Result<Vec<String>, RegistryError>;

    /// Configured countries with their feed counts, sorted by country code.
    async fn countries(&self) -> Vec<(String, usize)>;
}

/// One entry of the registry file.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FeedConfig {
    pub country: String,
    pub feeds: Vec<String>,
}

/// Registry loaded once from a JSON file.
#[derive(Debug, Default)]
pub struct JsonFileRegistry {
    by_country: BTreeMap<String, Vec<String>>,
}

impl JsonFileRegistry {
    /// Load the registry at `path`. A missing file yields an empty registry.
    #[instrument(level = "info", skip_all, fields(path = %path.as_ref().display()))]
    pub fn load(path: impl AsRef<Path>) -> Result<Self, RegistryError> {
        let raw = match std::fs::read_to_string(path.as_ref()) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                warn!("Feed registry file not found; starting with no feeds");
                return Ok(Self::default());
            }
            Err(e) => return Err(e.into()),
        };

        let entries: Vec<FeedConfig> = serde_json::from_str(&raw)?;
        let registry = Self::from_entries(entries);
        info!(countries = registry.by_country.len(), "Loaded feed registry");
        Ok(registry)
    }

    /// Build a registry from in-memory entries.
    ///
    /// Country codes are uppercased, duplicate URLs dropped and entries that
    /// are not absolute http(s) URLs skipped. Later entries for the same
    /// country replace earlier ones.
    pub fn from_entries(entries: impl IntoIterator<Item = FeedConfig>) -> Self {
        let mut by_country = BTreeMap::new();
        for entry in entries {
            let country = normalize_country(&entry.country);
            if country.is_empty() {
                warn!(?entry.feeds, "Skipping registry entry without a country");
                continue;
            }
            let feeds = sanitize_feeds(&country, entry.feeds);
            by_country.insert(country, feeds);
        }
        Self { by_country }
    }

    /// Replace the feeds of `country`, returning the list actually stored.
    ///
    /// Rejects a blank country and a list with no valid feed URL, leaving the
    /// registry untouched.
    pub fn set_feeds(
        &mut self,
        country: &str,
        feeds: Vec<String>,
    ) -> Result<Vec<String>, RegistryError> {
        let country = normalize_country(country);
        if country.is_empty() {
            return Err(RegistryError::InvalidEntry("missing country code".to_string()));
        }
        let feeds = sanitize_feeds(&country, feeds);
        if feeds.is_empty() {
            return Err(RegistryError::InvalidEntry(format!("no valid feed URLs for {country}")));
        }

        info!(%country, feeds = feeds.len(), "Set feeds");
        self.by_country.insert(country, feeds.clone());
        Ok(feeds)
    }

    /// Delete every feed of `country`. Returns whether the country was configured.
    pub fn remove(&mut self, country: &str) -> Result<bool, RegistryError> {
        let country = normalize_country(country);
        if country.is_empty() {
            return Err(RegistryError::InvalidEntry("missing country code".to_string()));
        }
        let removed = self.by_country.remove(&country).is_some();
        info!(%country, removed, "Removed feeds");
        Ok(removed)
    }

    /// Apply a batch of entries with [`set_feeds`](Self::set_feeds).
    ///
    /// Invalid entries are skipped with a warning. Returns how many were imported.
    pub fn import(&mut self, entries: impl IntoIterator<Item = FeedConfig>) -> usize {
        let mut imported = 0;
        for entry in entries {
            match self.set_feeds(&entry.country, entry.feeds) {
                Ok(_) => imported += 1,
                Err(e) => warn!(country = %entry.country, error = %e, "Skipped invalid entry"),
            }
        }
        info!(imported, "Imported feed entries");
        imported
    }

    /// Snapshot of the registry in file order, sorted by country code.
    pub fn entries(&self) -> Vec<FeedConfig> {
        self.by_country
            .iter()
            .map(|(country, feeds)| FeedConfig {
                country: country.clone(),
                feeds: feeds.clone(),
            })
            .collect()
    }

    /// Write the registry to `path` as pretty JSON.
    ///
    /// The file is staged next to its destination and renamed into place, so
    /// readers never observe a partial registry.
    #[instrument(level = "info", skip_all, fields(path = %path.as_ref().display()))]
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), RegistryError> {
        let path = path.as_ref();
        if let Some(dir) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir)?;
        }

        let json = serde_json::to_string_pretty(&self.entries())?;
        let staging = staging_path(path);
        std::fs::write(&staging, json)?;
        if let Err(e) = std::fs::rename(&staging, path) {
            let _ = std::fs::remove_file(&staging);
            return Err(e.into());
        }
        info!(countries = self.by_country.len(), "Saved feed registry");
        Ok(())
    }
}

fn normalize_country(country: &str) -> String {
    country.trim().to_ascii_uppercase()
}

fn sanitize_feeds(country: &str, feeds: Vec<String>) -> Vec<String> {
    feeds
        .into_iter()
        .map(|feed| feed.trim().to_string())
        .filter(|feed| {
            let valid = is_feed_url(feed);
            if !valid {
                warn!(%country, %feed, "Skipping invalid feed URL");
            }
            valid
        })
        .unique()
        .collect()
}

fn staging_path(path: &Path) -> PathBuf {
    let mut staged = OsString::from(path.as_os_str());
    staged.push(".tmp");
    PathBuf::from(staged)
}

fn is_feed_url(candidate: &str) -> bool {
    Url::parse(candidate)
        .map(|url| matches!(url.scheme(), "http" | "https") && url.host().is_some())
        .unwrap_or(false)
}

#[async_trait]
impl FeedRegistry for JsonFileRegistry {
    async fn feeds(&self, country: &str) -> Result<Vec<String>, RegistryError> {
        let country = normalize_country(country);
        match self.by_country.get(&country) {
            Some(feeds) if !feeds.is_empty() => Ok(feeds.clone()),
            _ => Err(RegistryError::NoFeeds(country)),
        }
    }

    async fn countries(&self) -> Vec<(String, usize)> {
        self.by_country
            .iter()
            .map(|(country, feeds)| (country.clone(), feeds.len()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(country: &str, feeds: &[&str]) -> FeedConfig {
        FeedConfig {
            country: country.to_string(),
            feeds: feeds.iter().map(|f| f.to_string()).collect(),
        }
    }

    #[tokio::test]
    async fn test_lookup_is_case_insensitive() {
        let registry = JsonFileRegistry::from_entries([entry("fr", &["https://a.example/rss"])]);
        assert_eq!(
            registry.feeds("FR").await.unwrap(),
            vec!["https://a.example/rss"]
        );
        assert_eq!(registry.feeds(" fr ").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_unknown_country_is_no_feeds() {
        let registry = JsonFileRegistry::from_entries([entry("FR", &["https://a.example/rss"])]);
        let err = registry.feeds("DE").await.unwrap_err();
        assert!(matches!(err, RegistryError::NoFeeds(ref c) if c == "DE"));
    }

    #[tokio::test]
    async fn test_empty_feed_list_is_no_feeds() {
        let registry = JsonFileRegistry::from_entries([entry("IT", &[])]);
        assert!(matches!(
            registry.feeds("IT").await,
            Err(RegistryError::NoFeeds(_))
        ));
    }

    #[tokio::test]
    async fn test_duplicates_and_invalid_urls_are_dropped() {
        let registry = JsonFileRegistry::from_entries([entry(
            "US",
            &[
                "https://a.example/rss",
                "https://a.example/rss ",
                "ftp://files.example/rss",
                "not a url",
                "https://b.example/atom",
            ],
        )]);
        assert_eq!(
            registry.feeds("US").await.unwrap(),
            vec!["https://a.example/rss", "https://b.example/atom"]
        );
    }

    #[tokio::test]
    async fn test_countries_are_sorted_with_counts() {
        let registry = JsonFileRegistry::from_entries([
            entry("US", &["https://a.example/rss", "https://b.example/rss"]),
            entry("DE", &["https://c.example/rss"]),
        ]);
        assert_eq!(
            registry.countries().await,
            vec![("DE".to_string(), 1), ("US".to_string(), 2)]
        );
    }

    #[tokio::test]
    async fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("feeds.json");
        std::fs::write(
            &path,
            r#"[{"country": "JP", "feeds": ["https://www3.nhk.or.jp/rss/news/cat0.xml"]}]"#,
        )
        .unwrap();

        let registry = JsonFileRegistry::load(&path).unwrap();
        assert_eq!(registry.feeds("JP").await.unwrap().len(), 1);
    }

    #[test]
    fn test_missing_file_is_empty_registry() {
        let dir = tempfile::tempdir().unwrap();
        let registry = JsonFileRegistry::load(dir.path().join("absent.json")).unwrap();
        assert!(registry.by_country.is_empty());
    }

    #[test]
    fn test_invalid_json_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("feeds.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert!(matches!(
            JsonFileRegistry::load(&path),
            Err(RegistryError::Json(_))
        ));
    }

    fn urls(feeds: &[&str]) -> Vec<String> {
        feeds.iter().map(|f| f.to_string()).collect()
    }

    #[tokio::test]
    async fn test_set_feeds_normalizes_and_replaces() {
        let mut registry = JsonFileRegistry::from_entries([entry("FR", &["https://old.example/rss"])]);

        let stored = registry
            .set_feeds(
                " fr ",
                urls(&["https://a.example/rss", " https://a.example/rss", "not a url"]),
            )
            .unwrap();

        assert_eq!(stored, vec!["https://a.example/rss"]);
        assert_eq!(registry.feeds("FR").await.unwrap(), stored);
    }

    #[tokio::test]
    async fn test_set_feeds_rejects_blank_country_and_empty_lists() {
        let mut registry = JsonFileRegistry::from_entries([entry("DE", &["https://a.example/rss"])]);

        assert!(matches!(
            registry.set_feeds("  ", urls(&["https://b.example/rss"])),
            Err(RegistryError::InvalidEntry(_))
        ));
        assert!(matches!(
            registry.set_feeds("DE", Vec::new()),
            Err(RegistryError::InvalidEntry(_))
        ));
        assert!(matches!(
            registry.set_feeds("DE", urls(&["ftp://files.example/rss"])),
            Err(RegistryError::InvalidEntry(_))
        ));
        assert_eq!(
            registry.feeds("DE").await.unwrap(),
            vec!["https://a.example/rss"]
        );
    }

    #[tokio::test]
    async fn test_remove_country() {
        let mut registry = JsonFileRegistry::from_entries([entry("IT", &["https://a.example/rss"])]);

        assert!(registry.remove("it").unwrap());
        assert!(!registry.remove("IT").unwrap());
        assert!(matches!(registry.remove(""), Err(RegistryError::InvalidEntry(_))));
        assert!(matches!(
            registry.feeds("IT").await,
            Err(RegistryError::NoFeeds(_))
        ));
    }

    #[tokio::test]
    async fn test_import_skips_invalid_entries() {
        let mut registry = JsonFileRegistry::default();

        let imported = registry.import([
            entry("JP", &["https://a.example/rss"]),
            entry("", &["https://b.example/rss"]),
            entry("KR", &[]),
            entry("BR", &["https://c.example/rss", "https://d.example/rss"]),
        ]);

        assert_eq!(imported, 2);
        assert_eq!(
            registry.countries().await,
            vec![("BR".to_string(), 2), ("JP".to_string(), 1)]
        );
    }

    #[tokio::test]
    async fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data/feeds.json");
        let mut registry = JsonFileRegistry::default();
        registry
            .set_feeds("US", urls(&["https://a.example/rss"]))
            .unwrap();
        registry
            .set_feeds("CA", urls(&["https://b.example/rss"]))
            .unwrap();

        registry.save(&path).unwrap();

        let reloaded = JsonFileRegistry::load(&path).unwrap();
        assert_eq!(reloaded.countries().await, registry.countries().await);
        assert_eq!(
            reloaded.feeds("CA").await.unwrap(),
            vec!["https://b.example/rss"]
        );
        assert!(!staging_path(&path).exists());
    }

    #[test]
    fn test_save_overwrites_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("feeds.json");
        std::fs::write(&path, r#"[{"country": "FR", "feeds": ["https://old.example/rss"]}]"#)
            .unwrap();

        let mut registry = JsonFileRegistry::load(&path).unwrap();
        registry.remove("FR").unwrap();
        registry
            .set_feeds("DE", urls(&["https://new.example/rss"]))
            .unwrap();
        registry.save(&path).unwrap();

        let saved: Vec<FeedConfig> =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(saved.len(), 1);
        assert_eq!(saved[0].country, "DE");
        assert_eq!(saved[0].feeds, vec!["https://new.example/rss"]);
    }
}
