//! Parallel translator
//!
//! Translates a UIF tree by extracting its text leaves, answering what it
//! can from the cache, batching the rest and dispatching the batches to a
//! [`TranslationBackend`] under a concurrency limit. Each batch retries on
//! its own with backoff; a batch that runs out of attempts leaves its
//! items in the source language without affecting its siblings.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use futures::stream::{FuturesUnordered, StreamExt};
use thiserror::Error;
use tokio::sync::Semaphore;
use tokio::task::JoinHandle;
use trialdoc_uif::UniversalDocument;

use crate::backend::{BackendRequest, TranslationBackend};
use crate::batch::{create_batches, Batch};
use crate::cache::TranslationCache;
use crate::config::TranslationConfig;
use crate::error::TranslateError;
use crate::extract::{apply, collect};
use crate::path::TextPath;
use crate::prompt::{batch_prompt, language_name, SYSTEM_PROMPT};

/// Counters for one translation run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TranslationStats {
    pub items_total: usize,
    /// Items answered from the cache
    pub items_cached: usize,
    /// Items translated by the backend in this run
    pub items_translated: usize,
    /// Items left in the source language
    pub items_passthrough: usize,
    pub batches_total: usize,
    pub batches_succeeded: usize,
    pub batches_failed: usize,
    /// Percentage of items answered from the cache
    pub cache_hit_rate: f64,
    pub elapsed: Duration,
}

/// Why a batch attempt was not accepted
#[derive(Error, Debug)]
enum BatchError {
    #[error("{0}")]
    Backend(#[from] TranslateError),

    #[error("empty response")]
    Empty,

    #[error("only {non_empty}/{expected} translations")]
    Sparse { non_empty: usize, expected: usize },
}

/// What a finished batch task hands back
#[derive(Debug)]
struct BatchOutcome {
    index: usize,
    translations: Vec<(TextPath, String)>,
    accepted: bool,
}

/// State shared by every batch task of a run
struct BatchContext {
    backend: Arc<dyn TranslationBackend>,
    cache: Arc<TranslationCache>,
    config: TranslationConfig,
    semaphore: Semaphore,
    language: String,
    language_name: String,
    total: usize,
}

/// Concurrent, cached, batch-oriented translator
#[derive(Clone)]
pub struct ParallelTranslator {
    backend: Arc<dyn TranslationBackend>,
    cache: Arc<TranslationCache>,
    config: TranslationConfig,
}

impl ParallelTranslator {
    pub fn new(backend: Arc<dyn TranslationBackend>, config: TranslationConfig) -> Self {
        Self {
            backend,
            cache: Arc::new(TranslationCache::new()),
            config,
        }
    }

    /// Use an existing cache, e.g. one pre-populated with known terms
    pub fn with_cache(mut self, cache: Arc<TranslationCache>) -> Self {
        self.cache = cache;
        self
    }

    pub fn cache(&self) -> &Arc<TranslationCache> {
        &self.cache
    }

    pub fn config(&self) -> &TranslationConfig {
        &self.config
    }

    /// Translate a tree into `language`; the source tree is untouched
    pub async fn translate(&self, doc: &UniversalDocument, language: &str) -> UniversalDocument {
        self.translate_with_stats(doc, language).await.0
    }

    /// Translate a tree and report what happened
    pub async fn translate_with_stats(
        &self,
        doc: &UniversalDocument,
        language: &str,
    ) -> (UniversalDocument, TranslationStats) {
        let started = Instant::now();
        let name = language_name(language);
        tracing::info!("Starting translation to {} via {}", name, self.backend.name());

        let mut translated = doc.clone();
        let items = collect(&translated);
        let mut stats = TranslationStats {
            items_total: items.len(),
            ..TranslationStats::default()
        };

        let mut merged: HashMap<TextPath, String> = HashMap::with_capacity(items.len());
        let mut uncached = Vec::new();
        for item in items {
            match self.cache.get(&item.text, language) {
                Some(hit) => {
                    merged.insert(item.path, hit);
                    stats.items_cached += 1;
                }
                None => uncached.push(item),
            }
        }
        tracing::info!(
            "{} cached, {} to translate",
            stats.items_cached,
            uncached.len()
        );

        let sources: Vec<(TextPath, String)> = uncached
            .iter()
            .map(|item| (item.path.clone(), item.text.clone()))
            .collect();
        let batches = create_batches(
            uncached,
            self.config.max_items_per_batch,
            self.config.max_chars_per_batch,
        );
        stats.batches_total = batches.len();

        let outcomes = self.dispatch(batches, language, &name).await;
        for outcome in outcomes {
            if outcome.accepted {
                stats.batches_succeeded += 1;
            }
            for (path, text) in outcome.translations {
                merged.insert(path, text);
                stats.items_translated += 1;
            }
        }
        stats.batches_failed = stats.batches_total - stats.batches_succeeded;

        for (path, source) in sources {
            if !merged.contains_key(&path) {
                tracing::debug!("Passing through '{}' untranslated", path);
                merged.insert(path, source);
                stats.items_passthrough += 1;
            }
        }

        let report = apply(&mut translated, &merged);
        if !report.is_complete() {
            tracing::warn!(
                "{} translated paths did not resolve in the tree",
                report.unmatched.len()
            );
        }

        stats.cache_hit_rate = if stats.items_total == 0 {
            0.0
        } else {
            let rate = stats.items_cached as f64 / stats.items_total as f64 * 100.0;
            (rate * 10.0).round() / 10.0
        };
        stats.elapsed = started.elapsed();

        self.cache.log_stats();
        tracing::info!(
            items = stats.items_total,
            cached = stats.items_cached,
            translated = stats.items_translated,
            passthrough = stats.items_passthrough,
            batches_ok = stats.batches_succeeded,
            batches_failed = stats.batches_failed,
            "Translation to {} complete in {:.1}s",
            name,
            stats.elapsed.as_secs_f64()
        );

        (translated, stats)
    }

    /// Run every batch and collect the outcomes that finish in time
    async fn dispatch(&self, batches: Vec<Batch>, language: &str, name: &str) -> Vec<BatchOutcome> {
        if batches.is_empty() {
            return Vec::new();
        }

        let context = Arc::new(BatchContext {
            backend: Arc::clone(&self.backend),
            cache: Arc::clone(&self.cache),
            config: self.config.clone(),
            semaphore: Semaphore::new(self.config.max_concurrent.max(1)),
            language: language.to_string(),
            language_name: name.to_string(),
            total: batches.len(),
        });

        let mut pending: FuturesUnordered<JoinHandle<BatchOutcome>> = batches
            .into_iter()
            .enumerate()
            .map(|(index, batch)| tokio::spawn(run_batch(Arc::clone(&context), index, batch)))
            .collect();

        let deadline = self
            .config
            .join_timeout()
            .map(|limit| tokio::time::Instant::now() + limit);

        let mut outcomes = Vec::with_capacity(pending.len());
        loop {
            let waited = match deadline {
                Some(deadline) => tokio::time::timeout_at(deadline, pending.next()).await.ok(),
                None => Some(pending.next().await),
            };
            let Some(next) = waited else {
                let err = TranslateError::Timeout(format!(
                    "{} batch(es) unfinished at the join deadline",
                    pending.len()
                ));
                tracing::warn!("{}; their items pass through", err);
                for handle in pending.iter() {
                    handle.abort();
                }
                break;
            };

            match next {
                Some(Ok(outcome)) => {
                    tracing::debug!("Batch {} finished", outcome.index + 1);
                    outcomes.push(outcome);
                }
                Some(Err(e)) => {
                    let err = TranslateError::Runtime(e.to_string());
                    tracing::error!("Batch task failed: {}", err);
                }
                None => break,
            }
        }
        outcomes
    }
}

impl BatchContext {
    async fn call(&self, request: &BackendRequest) -> Result<String, TranslateError> {
        let limit = Duration::from_secs(self.config.backend.request_timeout_secs);
        match tokio::time::timeout(limit, self.backend.complete(request)).await {
            Ok(result) => result,
            Err(_) => Err(TranslateError::Timeout(format!(
                "backend call exceeded {}s",
                limit.as_secs()
            ))),
        }
    }

    /// One attempt: call, then judge the response
    async fn attempt(
        &self,
        batch: &Batch,
        request: &BackendRequest,
        last: bool,
    ) -> Result<Vec<String>, BatchError> {
        let response = self.call(request).await?;
        if response.trim().is_empty() {
            return Err(BatchError::Empty);
        }

        let slots = batch.parse_response(&response);
        let non_empty = slots.iter().filter(|s| !s.trim().is_empty()).count();
        if non_empty < batch.len() / 2 && !last {
            return Err(BatchError::Sparse {
                non_empty,
                expected: batch.len(),
            });
        }
        Ok(slots)
    }
}

async fn run_batch(context: Arc<BatchContext>, index: usize, batch: Batch) -> BatchOutcome {
    let number = index + 1;
    let rejected = BatchOutcome {
        index,
        translations: Vec::new(),
        accepted: false,
    };

    let _permit = match context.semaphore.acquire().await {
        Ok(permit) => permit,
        Err(e) => {
            tracing::error!("Batch {} could not acquire a slot: {}", number, e);
            return rejected;
        }
    };

    tracing::debug!("Translating batch {}/{} ({})", number, context.total, batch.summary());
    let request = BackendRequest {
        system: SYSTEM_PROMPT.to_string(),
        prompt: batch_prompt(&context.language_name, &batch.to_batched_text()),
    };

    let attempts = context.config.max_attempts.max(1);
    for attempt in 0..attempts {
        tokio::time::sleep(context.config.delay_before(attempt)).await;
        tracing::debug!("Batch {} attempt {}/{}", number, attempt + 1, attempts);

        match context.attempt(&batch, &request, attempt + 1 == attempts).await {
            Ok(slots) => {
                let mut translations = Vec::with_capacity(slots.len());
                for (item, slot) in batch.items.iter().zip(slots) {
                    if slot.trim().is_empty() {
                        continue;
                    }
                    context.cache.set(&item.text, &context.language, slot.as_str());
                    translations.push((item.path.clone(), slot));
                }
                tracing::info!(
                    "Batch {} translated ({}/{} items)",
                    number,
                    translations.len(),
                    batch.len()
                );
                return BatchOutcome {
                    index,
                    translations,
                    accepted: true,
                };
            }
            Err(e) if attempt + 1 < attempts => {
                tracing::warn!(
                    "Batch {} attempt {} rejected: {}; retrying",
                    number,
                    attempt + 1,
                    e
                );
            }
            Err(e) => {
                tracing::error!(
                    "Batch {} failed after {} attempts: {}; passing source text through",
                    number,
                    attempts,
                    e
                );
            }
        }
    }

    rejected
}
