//! Machine translation of article text into English.
//!
//! # Architecture
//!
//! - [`Translator`]: one raw call to a translation provider
//! - [`deepl::DeepLClient`]: the DeepL implementation
//! - [`retry::RetryTranslator`]: decorator adding backoff to any [`Translator`]
//! - [`TranslationService`]: decides whether a call is needed and caches results
//!
//! The service never translates English text and serves repeated phrases
//! from its own cache, which outlives the article cache by design of the TTLs.

pub mod deepl;
pub mod retry;

use crate::cache::TranslationCache;
use crate::error::TranslateError;
use crate::languages::normalize_language;
use crate::utils::truncate_for_log;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, instrument};

pub use deepl::DeepLClient;
pub use retry::RetryTranslator;

/// Translates text from `source_lang` into English.
#[async_trait]
pub trait Translator: Send + Sync {
    async fn translate(&self, text: &str, source_lang: &str) -> Result<String, TranslateError>;
}

/// Cached, English-aware front of a [`Translator`].
#[derive(Clone)]
pub struct TranslationService {
    client: Arc<dyn Translator>,
    cache: TranslationCache,
}

impl TranslationService {
    pub fn new(client: Arc<dyn Translator>, cache: TranslationCache) -> Self {
        Self { client, cache }
    }

    /// Translate `text` into English.
    ///
    /// English sources return the trimmed input without contacting the
    /// provider. Provider errors are returned as-is; the caller picks the
    /// fallback.
    #[instrument(level = "debug", skip_all, fields(lang = %source_lang))]
    pub async fn translate(&self, text: &str, source_lang: &str) -> Result<String, TranslateError> {
        let trimmed = text.trim();
        if normalize_language(source_lang) == "EN" {
            return Ok(trimmed.to_string());
        }

        if let Some(cached) = self.cache.get(source_lang, trimmed).await {
            debug!(text = %truncate_for_log(trimmed, 60), "Translation cache hit");
            return Ok(cached);
        }

        debug!(text = %truncate_for_log(trimmed, 60), "Translating");
        let translated = self.client.translate(trimmed, source_lang).await?;
        self.cache
            .insert(source_lang, trimmed, translated.clone())
            .await;
        Ok(translated)
    }
}
