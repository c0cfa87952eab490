//! trialdoc CLI - Command-line interface library
//!
//! This library provides the CLI functionality for trialdoc, including:
//! - Render: Convert a UIF tree to DOCX
//! - Validate: Check a UIF tree for structural issues
//! - Extract / Patch: Pull text leaves out and put translations back
//! - Translate: Translate a UIF tree through an LLM backend
//!
//! # Library Usage
//!
//! ```ignore
//! use trialdoc_cli::{render_command, validate_command, OutputFormat};
//!
//! render_command(&input, Some(&output), false, None)?;
//! let report = validate_command(&input, OutputFormat::Json)?;
//! ```
//!
//! # Binary Usage
//!
//! ```bash
//! # Render a consent form
//! trialdoc render consent.json --output consent.docx
//!
//! # Check a tree for issues
//! trialdoc validate consent.json --format json
//!
//! # Translate to Spanish and render the result
//! trialdoc translate consent.json --lang es --render consent.es.docx
//! ```

pub mod app;
pub mod settings;

// Re-export main entry point and types
pub use app::{
    extract_command, load_document, patch_command, render_command, run_cli, save_document,
    translate_command, translate_document, validate_command, OutputFormat,
};
pub use settings::{RenderSettings, Settings, SETTINGS_FILE};
