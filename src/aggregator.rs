//! Per-country news aggregation.
//!
//! [`Aggregator::aggregate`] looks up a country's feeds and spawns one task
//! per feed URL, bounded by a semaphore scoped to that call. Each task runs
//! the per-feed pipeline:
//!
//! 1. skip the URL if it is blacklisted
//! 2. serve a fresh [`ResultCache`] entry without locking
//! 3. on a miss, take the key's stampede lock and check the cache again
//! 4. fetch and parse; a failure blacklists the URL and contributes nothing
//! 5. keep the first `per_feed_cap` items, translating them when requested
//! 6. cache the articles and merge them into the shared result, up to `global_cap`
//!
//! Feeds contribute in completion order. Within a feed, item order is kept.

use crate::cache::{Blacklist, ResultCache};
use crate::config::{AggregatorConfig, AppConfig};
use crate::error::{AggregateError, RegistryError};
use crate::feeds::FeedParser;
use crate::languages::{is_english, normalize_language, source_language};
use crate::locks::StampedeLocks;
use crate::models::{Article, Feed, FeedItem};
use crate::registry::FeedRegistry;
use crate::translate::TranslationService;
use crate::utils::truncate_for_log;
use futures::future::join_all;
use std::sync::Arc;
use tokio::sync::{Mutex, Semaphore};
use tokio::task::JoinSet;
use tracing::{Instrument, Span, debug, error, info, instrument, warn};

/// Fetches, caches, translates and merges news for a country.
///
/// Cloning is cheap: clones share the caches, the stampede locks and the
/// collaborators, which is what lets concurrent calls for different
/// countries deduplicate work on shared feed URLs.
#[derive(Clone)]
pub struct Aggregator {
    registry: Arc<dyn FeedRegistry>,
    parser: Arc<dyn FeedParser>,
    translator: Option<TranslationService>,
    results: ResultCache,
    blacklist: Blacklist,
    locks: Arc<StampedeLocks>,
    limits: AggregatorConfig,
}

impl Aggregator {
    pub fn new(config: &AppConfig, registry: Arc<dyn FeedRegistry>, parser: Arc<dyn FeedParser>) -> Self {
        let caches = &config.cache;
        let locks = StampedeLocks::new(config.aggregator.lock_shards);
        debug!(shards = locks.shard_count(), limits = ?config.aggregator, "Building aggregator");
        Self {
            registry,
            parser,
            translator: None,
            results: ResultCache::new(caches.result_ttl(), caches.max_entries),
            blacklist: Blacklist::new(caches.blacklist_ttl(), caches.max_entries),
            locks: Arc::new(locks),
            limits: config.aggregator.clone(),
        }
    }

    /// Enable translation of non-English countries.
    pub fn with_translator(mut self, translator: TranslationService) -> Self {
        self.translator = Some(translator);
        self
    }

    fn per_feed_cap(&self) -> usize {
        self.limits.per_feed_cap.max(1)
    }

    fn global_cap(&self) -> usize {
        self.limits.global_cap.max(1)
    }

    /// Aggregate up to `global_cap` articles for `country`.
    ///
    /// Fails only when the country has no feeds, when the registry itself is
    /// unavailable, or when translation is needed but no translator is set.
    /// Broken feeds and failed translations degrade the result instead; an
    /// empty list is a valid outcome.
    #[instrument(level = "info", skip(self), fields(country = %country))]
    pub async fn aggregate(&self, country: &str, translate: bool) -> Result<Vec<Article>, AggregateError> {
        let country = country.trim().to_ascii_uppercase();
        let urls = match self.registry.feeds(&country).await {
            Ok(urls) => urls,
            Err(RegistryError::NoFeeds(_)) => {
                warn!("No feeds configured");
                return Err(AggregateError::NoFeedsConfigured(country));
            }
            Err(e) => return Err(e.into()),
        };
        let lang = self.translation_language(&country, translate)?;
        info!(feeds = urls.len(), lang = lang.unwrap_or("-"), "Fetching news");

        let global_cap = self.global_cap();
        let limiter = Arc::new(Semaphore::new(self.limits.max_concurrency.max(1)));
        let collected = Arc::new(Mutex::new(Vec::with_capacity(global_cap)));

        let mut tasks = JoinSet::new();
        for url in urls {
            let this = self.clone();
            let limiter = Arc::clone(&limiter);
            let collected = Arc::clone(&collected);
            tasks.spawn(
                async move {
                    // The semaphore is never closed
                    let Ok(_permit) = limiter.acquire_owned().await else {
                        return;
                    };
                    if collected.lock().await.len() >= global_cap {
                        debug!(%url, "Result already full; skipping feed");
                        return;
                    }

                    let articles = this.fetch_feed(&url, lang).await;
                    let added = merge_capped(&mut *collected.lock().await, &articles, global_cap);
                    debug!(%url, fetched = articles.len(), added, "Merged feed");
                }
                .instrument(Span::current()),
            );
        }

        while let Some(joined) = tasks.join_next().await {
            if let Err(e) = joined {
                error!(error = %e, "Feed task failed");
            }
        }

        let articles = std::mem::take(&mut *collected.lock().await);
        info!(count = articles.len(), "Aggregated news");
        Ok(articles)
    }

    /// The source language to translate from, or `None` when this run stays untranslated.
    fn translation_language(
        &self,
        country: &str,
        requested: bool,
    ) -> Result<Option<&'static str>, AggregateError> {
        if !requested {
            return Ok(None);
        }
        let Some(lang) = source_language(country) else {
            debug!("No translation language for country");
            return Ok(None);
        };
        if is_english(lang) {
            return Ok(None);
        }
        if self.translator.is_none() {
            error!(lang, "Translation requested without a configured translator");
            return Err(AggregateError::TranslatorUnconfigured);
        }
        Ok(Some(lang))
    }

    /// Run the per-feed pipeline. Never fails: a broken feed yields no articles.
    #[instrument(level = "info", skip(self), fields(url = %url))]
    async fn fetch_feed(&self, url: &str, lang: Option<&'static str>) -> Arc<Vec<Article>> {
        if self.blacklist.contains(url).await {
            debug!("Feed is blacklisted; skipping");
            return Arc::default();
        }

        let key = cache_key(url, lang);
        if let Some(cached) = self.results.get(&key).await {
            debug!(%key, "Result cache hit");
            return cached;
        }

        let _guard = self.locks.lock(&key).await;
        if let Some(cached) = self.results.get(&key).await {
            debug!(%key, "Result cache filled while waiting for lock");
            return cached;
        }
        if self.blacklist.contains(url).await {
            debug!("Feed failed while waiting for lock; skipping");
            return Arc::default();
        }

        let feed = match self.parser.parse(url).await {
            Ok(feed) => feed,
            Err(e) => {
                warn!(error = %e, "Failed to fetch/parse feed; blacklisting");
                self.blacklist.insert(url).await;
                return Arc::default();
            }
        };

        let articles = Arc::new(self.build_articles(&feed, lang).await);
        info!(
            source = %feed.title,
            count = articles.len(),
            translated = articles.iter().filter(|a| a.is_translated()).count(),
            "Fetched feed"
        );
        self.results.insert(key, Arc::clone(&articles)).await;
        articles
    }

    async fn build_articles(&self, feed: &Feed, lang: Option<&str>) -> Vec<Article> {
        let items = feed.items.iter().take(self.per_feed_cap());
        let (Some(lang), Some(translator)) = (lang, &self.translator) else {
            return items.map(|item| Article::from_item(item, &feed.title)).collect();
        };

        join_all(items.map(|item| translate_item(translator, item, &feed.title, lang))).await
    }
}

async fn translate_item(
    translator: &TranslationService,
    item: &FeedItem,
    source: &str,
    lang: &str,
) -> Article {
    let title = translate_or_original(translator, &item.title, lang).await;
    let description = if item.description.is_empty() {
        String::new()
    } else {
        translate_or_original(translator, &item.description, lang).await
    };
    Article::translated(item, source, title, description)
}

async fn translate_or_original(translator: &TranslationService, text: &str, lang: &str) -> String {
    match translator.translate(text, lang).await {
        Ok(translated) => translated,
        Err(e) => {
            warn!(
                lang,
                text = %truncate_for_log(text, 80),
                error = %e,
                "Translation failed; keeping original text"
            );
            text.to_string()
        }
    }
}

/// Translated and untranslated results of one feed are cached separately.
fn cache_key(url: &str, lang: Option<&str>) -> String {
    match lang {
        Some(lang) => format!("{url}|translated:{}", normalize_language(lang)),
        None => url.to_string(),
    }
}

/// Append as much of `batch` as fits under `cap`, returning how many were added.
fn merge_capped(collected: &mut Vec<Article>, batch: &[Article], cap: usize) -> usize {
    let room = cap.saturating_sub(collected.len()).min(batch.len());
    collected.extend_from_slice(&batch[..room]);
    room
}
