//! TTL caches shared by concurrent aggregation runs.
//!
//! Three separate typed stores, each backed by [`moka::future::Cache`]:
//!
//! | Store | Key | Value |
//! |-------|-----|-------|
//! | [`ResultCache`] | feed URL, plus translation marker | processed articles |
//! | [`Blacklist`] | feed URL | failure marker |
//! | [`TranslationCache`] | (source language, trimmed text) | translated text |
//!
//! Entries are never mutated, only replaced or expired.

use crate::models::Article;
use moka::future::Cache;
use std::sync::Arc;
use std::time::Duration;

/// Processed articles per cache key.
#[derive(Clone)]
pub struct ResultCache {
    inner: Cache<String, Arc<Vec<Article>>>,
}

impl ResultCache {
    pub fn new(ttl: Duration, max_entries: u64) -> Self {
        Self {
            inner: Cache::builder()
                .time_to_live(ttl)
                .max_capacity(max_entries)
                .build(),
        }
    }

    pub async fn get(&self, key: &str) -> Option<Arc<Vec<Article>>> {
        self.inner.get(key).await
    }

    pub async fn insert(&self, key: String, articles: Arc<Vec<Article>>) {
        self.inner.insert(key, articles).await;
    }
}

/// Feed URLs that failed recently and must not be retried until their entry expires.
#[derive(Clone)]
pub struct Blacklist {
    inner: Cache<String, ()>,
}

impl Blacklist {
    pub fn new(ttl: Duration, max_entries: u64) -> Self {
        Self {
            inner: Cache::builder()
                .time_to_live(ttl)
                .max_capacity(max_entries)
                .build(),
        }
    }

    pub async fn contains(&self, url: &str) -> bool {
        self.inner.get(url).await.is_some()
    }

    pub async fn insert(&self, url: &str) {
        self.inner.insert(url.to_string(), ()).await;
    }
}

/// Translated strings, independent of the article cache.
#[derive(Clone)]
pub struct TranslationCache {
    inner: Cache<(String, String), String>,
}

impl TranslationCache {
    pub fn new(ttl: Duration, max_entries: u64) -> Self {
        Self {
            inner: Cache::builder()
                .time_to_live(ttl)
                .max_capacity(max_entries)
                .build(),
        }
    }

    pub async fn get(&self, lang: &str, text: &str) -> Option<String> {
        self.inner.get(&(lang.to_string(), text.to_string())).await
    }

    pub async fn insert(&self, lang: &str, text: &str, translated: String) {
        self.inner
            .insert((lang.to_string(), text.to_string()), translated)
            .await;
    }
}
