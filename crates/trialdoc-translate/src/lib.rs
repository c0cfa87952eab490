//! # trialdoc-translate
//!
//! Translation of UIF document trees through an LLM backend.
//!
//! This crate provides:
//! - Typed text paths and the extract/patch pair built on them
//! - Greedy batching with the `|||N|||` marker protocol
//! - A per-run translation cache
//! - A concurrent translator with per-batch retry and passthrough fallback
//! - An async chat-completions backend
//!
//! ## Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use trialdoc_translate::{ChatCompletionsBackend, ParallelTranslator, TranslationConfig};
//! use trialdoc_uif::UniversalDocument;
//!
//! # async fn example(doc: UniversalDocument) -> trialdoc_translate::Result<()> {
//! let config = TranslationConfig::default();
//! let backend = ChatCompletionsBackend::from_config(config.backend.clone())?;
//! let translator = ParallelTranslator::new(Arc::new(backend), config);
//!
//! let (spanish, stats) = translator.translate_with_stats(&doc, "es").await;
//! println!("{} of {} leaves translated", stats.items_translated, stats.items_total);
//! # let _ = spanish;
//! # Ok(())
//! # }
//! ```

pub mod backend;
pub mod batch;
pub mod cache;
pub mod config;
pub mod error;
pub mod extract;
pub mod path;
pub mod prompt;
pub mod translator;

pub use backend::{BackendRequest, ChatCompletionsBackend, TranslationBackend};
pub use batch::{create_batches, parse_response, Batch};
pub use cache::{CacheStats, TranslationCache};
pub use config::{BackendConfig, TranslationConfig};
pub use error::{Result, TranslateError};
pub use extract::{apply, collect, lookup, ApplyReport, TextItem};
pub use path::{PathSegment, TextPath};
pub use translator::{ParallelTranslator, TranslationStats};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
