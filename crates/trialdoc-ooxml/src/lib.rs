//! # trialdoc-ooxml
//!
//! DOCX rendering for UIF document trees.
//!
//! This crate provides:
//! - A style engine producing an immutable style table
//! - Builders for headings, paragraphs, tables, lists and signature blocks
//! - Package assembly with deterministic output
//! - A render orchestrator that validates, renders, writes and verifies
//!
//! ## Example
//!
//! ```
//! use trialdoc_ooxml::DocumentRenderer;
//! use trialdoc_uif::{ContentBlock, Section, UniversalDocument};
//!
//! let doc = UniversalDocument::new("icf", "Informed Consent").with_section(
//!     Section::new("intro", 1, "Introduction")
//!         .with_block(ContentBlock::paragraph("You are invited to take part.")),
//! );
//!
//! let output = DocumentRenderer::new().render_to_bytes(&doc)?;
//! assert!(output.summary.parts.iter().any(|p| p == "word/document.xml"));
//! # Ok::<(), trialdoc_ooxml::RenderError>(())
//! ```

pub mod archive;
pub mod error;
pub mod list;
pub mod package;
pub mod relationships;
pub mod render;
pub mod section;
pub mod styles;
pub mod table;
pub mod verify;
pub mod writer;
pub mod xml;

#[cfg(test)]
mod test_utils;

pub use archive::OoxmlArchive;
pub use error::{ErrorKind, IntegrityError, RenderError, Result, SerializationError};
pub use list::ListBuilder;
pub use relationships::Relationships;
pub use render::{
    render_to_bytes, DocumentRenderer, RenderOptions, RenderOutput, RenderStage, RenderSummary,
};
pub use section::{merge_format_ranges, FormattedRun, SectionBuilder};
pub use styles::{DocumentStyles, Style, StyleEngine, StyleType};
pub use table::{normalize_hex, plan_rows, TableBuilder};
pub use verify::{verify_bytes, verify_file, REQUIRED_PARTS};
pub use writer::DocxWriter;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
