//! trialdoc-uif - Universal Intermediate Format document tree
//!
//! This crate provides the document-agnostic tree that every trialdoc
//! component consumes: sections, content blocks, tables, lists, styling
//! and metadata. The types are plain data; rendering, validation and
//! translation live in their own crates.
//!
//! The tree serializes to a plain nested record (JSON via serde) and
//! deserializes back without loss, which is how stored documents are
//! re-translated and re-rendered.
//!
//! # Example
//!
//! ```
//! use trialdoc_uif::{ContentBlock, Section, UniversalDocument};
//!
//! let mut doc = UniversalDocument::new("icf", "Informed Consent");
//! doc.sections.push(
//!     Section::new("intro", 1, "Introduction")
//!         .with_block(ContentBlock::paragraph("You are invited to take part.")),
//! );
//! assert_eq!(doc.count_sections(), 1);
//! assert_eq!(doc.count_content_blocks(), 1);
//! ```

pub mod block;
pub mod document;
pub mod section;
pub mod styling;
pub mod table;

pub use block::{
    Alignment, BlockKind, ContentBlock, InlineFormat, InlineFormatting, ListItem, ListStyle,
    RunFormatting, SignatureBlock, SignatureLine, StructuredListItem,
};
pub use document::{ComplianceMetadata, DocumentMetadata, DocumentType, UniversalDocument};
pub use section::Section;
pub use styling::{DocumentStyling, HeaderFooter, PageNumberPosition, PageSetup};
pub use table::{TableBlock, TableCell, TableCellValue, VerticalAlignment};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
