//! HTTP feed parser backed by `reqwest` and `feed-rs`.
//!
//! Every request carries an identifying user agent and is bounded by the
//! configured timeout. Item descriptions are reduced to plain text: feeds
//! routinely embed HTML in `<description>`, and the news panel renders text.

use super::FeedParser;
use crate::config::FetchConfig;
use crate::error::FeedError;
use crate::models::{Feed, FeedItem};
use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::Client;
use scraper::Html;
use tracing::{debug, instrument};

static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

#[derive(Debug, Clone)]
pub struct HttpFeedParser {
    client: Client,
}

impl HttpFeedParser {
    pub fn new(config: &FetchConfig) -> Result<Self, FeedError> {
        let client = Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(config.timeout())
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl FeedParser for HttpFeedParser {
    #[instrument(level = "info", skip(self))]
    async fn parse(&self, url: &str) -> Result<Feed, FeedError> {
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FeedError::Status(status));
        }

        let body = response.bytes().await?;
        debug!(bytes = body.len(), "Downloaded feed");
        let parsed = feed_rs::parser::parse(&body[..])?;
        Ok(convert_feed(parsed))
    }
}

fn convert_feed(parsed: feed_rs::model::Feed) -> Feed {
    let title = parsed
        .title
        .map(|t| clean_text(&t.content))
        .unwrap_or_default();

    let items = parsed
        .entries
        .into_iter()
        .map(|entry| {
            let description = entry
                .summary
                .map(|s| s.content)
                .or_else(|| entry.content.and_then(|c| c.body))
                .map(|raw| clean_text(&raw))
                .unwrap_or_default();

            FeedItem {
                title: entry
                    .title
                    .map(|t| clean_text(&t.content))
                    .unwrap_or_default(),
                link: entry
                    .links
                    .into_iter()
                    .next()
                    .map(|l| l.href)
                    .unwrap_or_default(),
                description,
                published: entry
                    .published
                    .or(entry.updated)
                    .map(|dt| dt.to_rfc2822())
                    .unwrap_or_default(),
            }
        })
        .collect();

    Feed { title, items }
}

/// Strip markup and collapse runs of whitespace.
fn clean_text(raw: &str) -> String {
    let fragment = Html::parse_fragment(raw);
    let text = fragment.root_element().text().collect::<Vec<_>>().join(" ");
    WHITESPACE.replace_all(&text, " ").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    const RSS: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0">
  <channel>
    <title>Le Journal</title>
    <link>https://journal.example.fr</link>
    <description>Actualités</description>
    <item>
      <title>Premier titre</title>
      <link>https://journal.example.fr/1</link>
      <description>&lt;p&gt;Un &lt;b&gt;texte&lt;/b&gt;
        important&lt;/p&gt;</description>
      <pubDate>Tue, 06 May 2025 14:30:00 +0000</pubDate>
    </item>
    <item>
      <title>Second titre</title>
      <link>https://journal.example.fr/2</link>
    </item>
  </channel>
</rss>"#;

    #[test]
    fn test_clean_text_strips_markup() {
        assert_eq!(clean_text("<p>Hello <b>world</b></p>"), "Hello world");
        assert_eq!(clean_text("  plain\n\ttext  "), "plain text");
        assert_eq!(clean_text(""), "");
    }

    #[test]
    fn test_convert_rss_document() {
        let parsed = feed_rs::parser::parse(RSS.as_bytes()).unwrap();
        let feed = convert_feed(parsed);

        assert_eq!(feed.title, "Le Journal");
        assert_eq!(feed.items.len(), 2);

        let first = &feed.items[0];
        assert_eq!(first.title, "Premier titre");
        assert_eq!(first.link, "https://journal.example.fr/1");
        assert_eq!(first.description, "Un texte important");
        assert!(first.published.contains("May 2025 14:30:00"));

        let second = &feed.items[1];
        assert_eq!(second.title, "Second titre");
        assert_eq!(second.description, "");
        assert_eq!(second.published, "");
    }

    #[test]
    fn test_malformed_document_fails() {
        assert!(feed_rs::parser::parse("not a feed".as_bytes()).is_err());
    }

    #[test]
    fn test_parser_builds_from_config() {
        assert!(HttpFeedParser::new(&FetchConfig::default()).is_ok());
    }
}
