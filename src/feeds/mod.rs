//! Feed fetching and parsing.
//!
//! The aggregator talks to feeds only through the [`FeedParser`] trait, so the
//! network can be swapped for a test double. [`http::HttpFeedParser`] is the
//! production implementation: it downloads a URL with `reqwest` and parses
//! RSS, Atom or JSON Feed documents with `feed-rs`.

pub mod http;

use crate::error::FeedError;
use crate::models::{Feed, FeedProbe};
use async_trait::async_trait;
use tracing::{info, instrument};

pub use http::HttpFeedParser;

/// Fetches a feed URL and returns its parsed contents.
#[async_trait]
pub trait FeedParser: Send + Sync {
    async fn parse(&self, url: &str) -> Result<Feed, FeedError>;
}

/// Fetch `url` once and summarize what it publishes.
///
/// Used to check a feed before adding it to the registry. Bypasses every cache.
#[instrument(level = "info", skip(parser))]
pub async fn probe(parser: &dyn FeedParser, url: &str) -> Result<FeedProbe, FeedError> {
    let feed = parser.parse(url).await?;
    info!(source = %feed.title, count = feed.items.len(), "Feed is valid");

    Ok(FeedProbe {
        valid: true,
        source: feed.title,
        articles: feed.items.len(),
        first_item_title: feed.items.first().map(|item| item.title.clone()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::FeedItem;

    struct OneShot(Option<Feed>);

    #[async_trait]
    impl FeedParser for OneShot {
        async fn parse(&self, _url: &str) -> Result<Feed, FeedError> {
            self.0
                .clone()
                .ok_or(FeedError::Status(reqwest::StatusCode::NOT_FOUND))
        }
    }

    #[tokio::test]
    async fn test_probe_reports_first_item() {
        let parser = OneShot(Some(Feed {
            title: "Wire".to_string(),
            items: vec![
                FeedItem {
                    title: "First".to_string(),
                    ..Default::default()
                },
                FeedItem {
                    title: "Second".to_string(),
                    ..Default::default()
                },
            ],
        }));

        let probe = probe(&parser, "https://wire.example/rss").await.unwrap();
        assert!(probe.valid);
        assert_eq!(probe.source, "Wire");
        assert_eq!(probe.articles, 2);
        assert_eq!(probe.first_item_title.as_deref(), Some("First"));
    }

    #[tokio::test]
    async fn test_probe_propagates_failure() {
        let parser = OneShot(None);
        let err = probe(&parser, "https://gone.example/rss").await.unwrap_err();
        assert!(matches!(err, FeedError::Status(_)));
    }
}
