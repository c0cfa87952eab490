//! trialdoc-validate - UIF tree validation engine
//!
//! This crate checks a [`UniversalDocument`] for required fields, heading
//! level ranges, subsection nesting and per-block structure before it is
//! rendered. Validation never mutates the tree.
//!
//! # Architecture
//!
//! Individual validators implement the [`Validator`] trait. The
//! [`ValidationEngine`] runs every registered validator and gathers the
//! diagnostics into a [`ValidationReport`]. Only error-level diagnostics
//! make a tree invalid; warnings are advisory.
//!
//! # Example
//!
//! ```
//! use trialdoc_uif::UniversalDocument;
//! use trialdoc_validate::ValidationEngine;
//!
//! let engine = ValidationEngine::with_defaults();
//! let report = engine.validate(&UniversalDocument::new("icf", ""));
//!
//! assert!(!report.is_valid());
//! assert!(report
//!     .error_messages()
//!     .contains(&"Document title is required".to_string()));
//! ```

pub mod diagnostics;
pub mod layout;
pub mod structure;
pub mod tables;

use serde::Serialize;
use trialdoc_uif::UniversalDocument;

pub use diagnostics::{Diagnostic, Severity};
pub use layout::LayoutValidator;
pub use structure::StructureValidator;
pub use tables::TableGeometryValidator;

/// Trait for document validators
///
/// Validators inspect a document and return a list of diagnostics
/// for any issues found. Each validator has a unique code prefix
/// for its diagnostics.
pub trait Validator: Send + Sync {
    /// Get the validator's code prefix (e.g., "UIF1" for tree structure)
    fn code(&self) -> &'static str;

    /// Get a human-readable name for this validator
    fn name(&self) -> &'static str {
        "unnamed"
    }

    /// Validate the document and return any diagnostics
    fn validate(&self, doc: &UniversalDocument) -> Vec<Diagnostic>;
}

/// Outcome of a validation run
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ValidationReport {
    /// All diagnostics in the order validators produced them
    pub diagnostics: Vec<Diagnostic>,
}

impl ValidationReport {
    /// True when no error-level diagnostic was produced
    pub fn is_valid(&self) -> bool {
        !self.diagnostics.iter().any(Diagnostic::is_error)
    }

    /// Error-level diagnostics
    pub fn errors(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter().filter(|d| d.is_error())
    }

    /// Warning-level diagnostics
    pub fn warnings(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter().filter(|d| d.is_warning())
    }

    /// Error messages with their path prefixes
    pub fn error_messages(&self) -> Vec<String> {
        self.errors().map(Diagnostic::render_message).collect()
    }

    /// The `(ok, errors)` pair
    pub fn into_result(self) -> (bool, Vec<String>) {
        (self.is_valid(), self.error_messages())
    }

    /// Attach a source file to every diagnostic
    pub fn with_file(self, file: impl Into<String>) -> Self {
        let file = file.into();
        Self {
            diagnostics: self
                .diagnostics
                .into_iter()
                .map(|d| d.with_file(file.clone()))
                .collect(),
        }
    }
}

/// Validation engine that orchestrates multiple validators
pub struct ValidationEngine {
    /// Registered validators
    validators: Vec<Box<dyn Validator>>,
}

impl Default for ValidationEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl ValidationEngine {
    /// Create a new empty validation engine
    pub fn new() -> Self {
        Self {
            validators: Vec::new(),
        }
    }

    /// Create an engine with the structure, layout and table validators
    pub fn with_defaults() -> Self {
        let mut engine = Self::new();
        engine.add_validator(Box::new(StructureValidator));
        engine.add_validator(Box::new(LayoutValidator));
        engine.add_validator(Box::new(TableGeometryValidator));
        engine
    }

    /// Add a validator to the engine
    pub fn add_validator(&mut self, validator: Box<dyn Validator>) {
        self.validators.push(validator);
    }

    /// Get the number of registered validators
    pub fn validator_count(&self) -> usize {
        self.validators.len()
    }

    /// Get the names of all registered validators
    pub fn validator_names(&self) -> Vec<&'static str> {
        self.validators.iter().map(|v| v.name()).collect()
    }

    /// Validate a document using all registered validators
    pub fn validate(&self, doc: &UniversalDocument) -> ValidationReport {
        let mut diagnostics = Vec::new();

        for validator in &self.validators {
            diagnostics.extend(validator.validate(doc));
        }

        ValidationReport { diagnostics }
    }
}

/// Validate with the default engine
pub fn validate(doc: &UniversalDocument) -> ValidationReport {
    ValidationEngine::with_defaults().validate(doc)
}

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
