//! Per-run translation cache
//!
//! Keys are `(language, sha256(text))`. The cache is shared by every
//! batch task of a run through an `Arc`. Writes are not coordinated: a
//! translation is a function of `(text, language)`, so two tasks storing
//! the same key store equivalent values and the last write wins.

use std::sync::atomic::{AtomicUsize, Ordering};

use dashmap::DashMap;
use sha2::{Digest, Sha256};

/// Cache key: target language plus a digest of the source text
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    language: String,
    digest: [u8; 32],
}

impl CacheKey {
    pub fn new(text: &str, language: &str) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(text.as_bytes());
        Self {
            language: language.to_ascii_lowercase(),
            digest: hasher.finalize().into(),
        }
    }
}

/// Snapshot of cache counters
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CacheStats {
    pub hits: usize,
    pub misses: usize,
    pub size: usize,
    /// Percentage of lookups that hit, rounded to one decimal
    pub hit_rate: f64,
}

/// In-memory translation cache
#[derive(Debug, Default)]
pub struct TranslationCache {
    entries: DashMap<CacheKey, String>,
    hits: AtomicUsize,
    misses: AtomicUsize,
}

impl TranslationCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a translation, counting the hit or miss
    pub fn get(&self, text: &str, language: &str) -> Option<String> {
        let found = self
            .entries
            .get(&CacheKey::new(text, language))
            .map(|entry| entry.value().clone());
        match &found {
            Some(_) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                tracing::debug!("Cache hit for '{:.30}'", text);
            }
            None => {
                self.misses.fetch_add(1, Ordering::Relaxed);
            }
        }
        found
    }

    /// Store a translation
    pub fn set(&self, text: &str, language: &str, translation: impl Into<String>) {
        self.entries
            .insert(CacheKey::new(text, language), translation.into());
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&self) {
        self.entries.clear();
        self.hits.store(0, Ordering::Relaxed);
        self.misses.store(0, Ordering::Relaxed);
    }

    pub fn stats(&self) -> CacheStats {
        let hits = self.hits.load(Ordering::Relaxed);
        let misses = self.misses.load(Ordering::Relaxed);
        let rate = hits as f64 / (hits + misses).max(1) as f64 * 100.0;
        CacheStats {
            hits,
            misses,
            size: self.entries.len(),
            hit_rate: (rate * 10.0).round() / 10.0,
        }
    }

    pub fn log_stats(&self) {
        let stats = self.stats();
        tracing::info!(
            hits = stats.hits,
            misses = stats.misses,
            size = stats.size,
            hit_rate = stats.hit_rate,
            "Translation cache stats"
        );
    }
}
