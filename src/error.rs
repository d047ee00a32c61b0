//! Error types for every stage of the aggregation pipeline.
//!
//! Only [`AggregateError`] ever reaches the caller of
//! [`Aggregator::aggregate`](crate::aggregator::Aggregator::aggregate).
//! [`FeedError`] and [`TranslateError`] are absorbed inside the pipeline and
//! degrade to partial or untranslated results.

use thiserror::Error;

/// Failures surfaced by an aggregation run.
#[derive(Debug, Error)]
pub enum AggregateError {
    /// The registry has no feeds for this country. Callers map this to "no content".
    #[error("no feeds configured for country {0}")]
    NoFeedsConfigured(String),

    /// Translation was requested for a non-English country but no translator credential is set.
    #[error("translation requested but no translator is configured")]
    TranslatorUnconfigured,

    #[error("feed registry unavailable: {0}")]
    Registry(#[from] RegistryError),
}

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("no feeds found for country {0}")]
    NoFeeds(String),

    /// A registry update without a country code or without any usable feed URL.
    #[error("invalid feed registry entry: {0}")]
    InvalidEntry(String),

    #[error("reading feed registry failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid feed registry JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// A feed that could not be fetched or parsed.
#[derive(Debug, Error)]
pub enum FeedError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected HTTP status {0}")]
    Status(reqwest::StatusCode),

    #[error("malformed feed: {0}")]
    Parse(#[from] feed_rs::parser::ParseFeedError),
}

#[derive(Debug, Error)]
pub enum TranslateError {
    #[error("DEEPL_API_KEY is not set")]
    Unconfigured,

    #[error("translation request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("translation provider returned {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("failed to decode translation response: {0}")]
    Decode(String),

    #[error("no translations returned")]
    Empty,
}

impl TranslateError {
    /// Whether retrying the same request can reasonably succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            TranslateError::Http(_) => true,
            TranslateError::Status { status, .. } => {
                status.is_server_error() || *status == reqwest::StatusCode::TOO_MANY_REQUESTS
            }
            _ => false,
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("reading config file failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid config YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transient_classification() {
        let throttled = TranslateError::Status {
            status: reqwest::StatusCode::TOO_MANY_REQUESTS,
            body: String::new(),
        };
        let unavailable = TranslateError::Status {
            status: reqwest::StatusCode::SERVICE_UNAVAILABLE,
            body: String::new(),
        };
        let forbidden = TranslateError::Status {
            status: reqwest::StatusCode::FORBIDDEN,
            body: "quota exceeded".to_string(),
        };

        assert!(throttled.is_transient());
        assert!(unavailable.is_transient());
        assert!(!forbidden.is_transient());
        assert!(!TranslateError::Empty.is_transient());
        assert!(!TranslateError::Unconfigured.is_transient());
    }

    #[test]
    fn test_no_feeds_message_names_country() {
        let err = AggregateError::NoFeedsConfigured("ZZ".to_string());
        assert_eq!(err.to_string(), "no feeds configured for country ZZ");
    }
}
