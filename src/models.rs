//! Data models for parsed feeds and aggregated articles.
//!
//! This module defines the core data structures used throughout the application:
//! - [`Feed`] / [`FeedItem`]: a parsed RSS/Atom document, as returned by a feed parser
//! - [`Article`]: one aggregated news item, carrying both translated and original text
//! - [`CountryNews`]: the result of one aggregation run, as written by the output layer
//! - [`FeedProbe`]: a short validation summary of a single feed URL
//!
//! Articles serialize with camelCase keys (`originalTitle`, `originalDescription`)
//! to match what the news panel frontend consumes.

use serde::{Deserialize, Serialize};

/// A parsed feed document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Feed {
    /// The feed's channel title, used as the article source.
    pub title: String,
    /// Items in the order the feed publishes them.
    pub items: Vec<FeedItem>,
}

/// One entry of a parsed feed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeedItem {
    pub title: String,
    pub link: String,
    /// Plain-text description; empty when the feed has none.
    pub description: String,
    /// Publication time as supplied by the source; empty when absent.
    pub published: String,
}

/// A news article ready to be served.
///
/// `original_title` and `original_description` always hold the text as the
/// feed published it. `title` and `description` hold the translated text when
/// translation was applied, otherwise they equal the originals.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Article {
    pub title: String,
    pub original_title: String,
    pub link: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub original_description: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub published: String,
    /// Title of the feed the article came from.
    pub source: String,
}

impl Article {
    /// Build an untranslated article from a feed item.
    pub fn from_item(item: &FeedItem, source: &str) -> Self {
        Self {
            title: item.title.clone(),
            original_title: item.title.clone(),
            link: item.link.clone(),
            description: item.description.clone(),
            original_description: item.description.clone(),
            published: item.published.clone(),
            source: source.to_string(),
        }
    }

    /// Build an article whose display text differs from the original.
    pub fn translated(item: &FeedItem, source: &str, title: String, description: String) -> Self {
        Self {
            title,
            description,
            ..Self::from_item(item, source)
        }
    }

    /// Whether the display text differs from what the feed published.
    pub fn is_translated(&self) -> bool {
        self.title != self.original_title || self.description != self.original_description
    }
}

/// The articles aggregated for one country in one run.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CountryNews {
    /// ISO 3166-1 alpha-2 country code.
    pub country: String,
    /// RFC 3339 UTC timestamp of the aggregation.
    pub fetched_at: String,
    /// Whether translation was requested for this run.
    pub translated: bool,
    pub articles: Vec<Article>,
}

/// Summary of a feed URL check.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedProbe {
    pub valid: bool,
    /// The feed's title.
    pub source: String,
    /// Number of items the feed currently publishes.
    pub articles: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_item_title: Option<String>,
}
