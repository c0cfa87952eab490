//! Document root and metadata definitions
//!
//! This module defines the UIF root record together with the protocol
//! metadata and the compliance trail attached to every generated document.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::section::Section;
use crate::styling::{DocumentStyling, HeaderFooter, PageSetup};

/// The kinds of regulated document the pipeline produces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentType {
    /// Informed Consent Form
    Icf,
    /// Data Management Plan
    Dmp,
    /// Statistical Analysis Plan
    Sap,
}

impl DocumentType {
    /// All supported document types
    pub const ALL: [DocumentType; 3] = [DocumentType::Icf, DocumentType::Dmp, DocumentType::Sap];

    /// Parse a document type code (case-insensitive)
    pub fn parse(code: &str) -> Option<Self> {
        match code.trim().to_ascii_lowercase().as_str() {
            "icf" => Some(DocumentType::Icf),
            "dmp" => Some(DocumentType::Dmp),
            "sap" => Some(DocumentType::Sap),
            _ => None,
        }
    }

    /// Lowercase code used in persisted trees
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentType::Icf => "icf",
            DocumentType::Dmp => "dmp",
            DocumentType::Sap => "sap",
        }
    }
}

impl fmt::Display for DocumentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Protocol identifiers carried by a document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DocumentMetadata {
    /// Protocol number (e.g. "ABC-123-301")
    pub protocol_number: Option<String>,
    /// Full protocol title
    pub protocol_title: Option<String>,
    /// Sponsor organization
    pub sponsor: Option<String>,
    /// Version of this document
    pub document_version: String,
    /// Effective date as free text
    pub effective_date: Option<String>,
    /// IRB protocol number
    pub irb_protocol_number: Option<String>,
    /// Investigational site name
    pub site_name: Option<String>,
}

impl Default for DocumentMetadata {
    fn default() -> Self {
        Self {
            protocol_number: None,
            protocol_title: None,
            sponsor: None,
            document_version: "1.0".to_string(),
            effective_date: None,
            irb_protocol_number: None,
            site_name: None,
        }
    }
}

/// Audit trail for regulated output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ComplianceMetadata {
    /// Model or workflow that generated the content
    pub generated_by: String,
    /// Model or reviewer that polished the content
    pub polished_by: Option<String>,
    /// Generation timestamp
    pub generated_at: Option<DateTime<Utc>>,
    /// Applicable regulatory framework (e.g. "ICH E6(R2)")
    pub regulatory_framework: Option<String>,
    /// Compliance record version
    pub version: String,
    /// Review workflow status
    pub review_status: String,
}

impl Default for ComplianceMetadata {
    fn default() -> Self {
        Self {
            generated_by: "gemini".to_string(),
            polished_by: None,
            generated_at: None,
            regulatory_framework: None,
            version: "1.0".to_string(),
            review_status: "draft".to_string(),
        }
    }
}

/// The UIF root record
///
/// `document_type` is kept as the persisted string so that trees with an
/// unknown or missing type still load and are reported by validation rather
/// than rejected at parse time. Use [`UniversalDocument::kind`] for the typed
/// view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UniversalDocument {
    /// Format version of the tree
    #[serde(default = "default_uif_version")]
    pub uif_version: String,
    /// Document type code (icf, dmp, sap)
    #[serde(default)]
    pub document_type: String,
    /// Document title
    #[serde(default)]
    pub title: String,
    /// Protocol metadata
    #[serde(default)]
    pub metadata: DocumentMetadata,
    /// Fonts, sizes and heading appearance
    #[serde(default)]
    pub styling: DocumentStyling,
    /// Page dimensions and margins
    #[serde(default)]
    pub page_setup: PageSetup,
    /// Header, footer and page numbering
    #[serde(default)]
    pub header_footer: HeaderFooter,
    /// Top-level sections in document order
    #[serde(default)]
    pub sections: Vec<Section>,
    /// Compliance trail
    #[serde(default)]
    pub compliance: ComplianceMetadata,
}

fn default_uif_version() -> String {
    "1.0".to_string()
}

impl UniversalDocument {
    /// Create an empty document of the given type
    pub fn new(document_type: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            uif_version: default_uif_version(),
            document_type: document_type.into(),
            title: title.into(),
            metadata: DocumentMetadata::default(),
            styling: DocumentStyling::default(),
            page_setup: PageSetup::default(),
            header_footer: HeaderFooter::default(),
            sections: Vec::new(),
            compliance: ComplianceMetadata::default(),
        }
    }

    /// Add a top-level section
    pub fn with_section(mut self, section: Section) -> Self {
        self.sections.push(section);
        self
    }

    /// Typed document kind, if the stored code is recognized
    pub fn kind(&self) -> Option<DocumentType> {
        DocumentType::parse(&self.document_type)
    }

    /// All sections in pre-order (parent before its subsections)
    pub fn all_sections_flat(&self) -> Vec<&Section> {
        let mut out = Vec::new();
        for section in &self.sections {
            section.collect_flat(&mut out);
        }
        out
    }

    /// Total number of sections, including nested subsections
    pub fn count_sections(&self) -> usize {
        self.sections.iter().map(Section::count_sections).sum()
    }

    /// Total number of content blocks across all sections
    pub fn count_content_blocks(&self) -> usize {
        self.sections.iter().map(Section::count_content_blocks).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::ContentBlock;

    fn nested_document() -> UniversalDocument {
        UniversalDocument::new("icf", "Consent").with_section(
            Section::new("s1", 1, "Purpose")
                .with_block(ContentBlock::paragraph("One"))
                .with_subsection(
                    Section::new("s1.1", 2, "Details")
                        .with_block(ContentBlock::paragraph("Two"))
                        .with_block(ContentBlock::page_break()),
                ),
        )
    }

    #[test]
    fn test_document_type_parse() {
        assert_eq!(DocumentType::parse("ICF"), Some(DocumentType::Icf));
        assert_eq!(DocumentType::parse(" sap "), Some(DocumentType::Sap));
        assert_eq!(DocumentType::parse("protocol"), None);
        assert_eq!(DocumentType::Dmp.to_string(), "dmp");
    }

    #[test]
    fn test_counts() {
        let doc = nested_document();
        assert_eq!(doc.count_sections(), 2);
        assert_eq!(doc.count_content_blocks(), 3);
    }

    #[test]
    fn test_all_sections_flat_is_preorder() {
        let doc = nested_document();
        let ids: Vec<&str> = doc.all_sections_flat().iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["s1", "s1.1"]);
    }

    #[test]
    fn test_defaults() {
        let doc = UniversalDocument::new("dmp", "Plan");
        assert_eq!(doc.uif_version, "1.0");
        assert_eq!(doc.metadata.document_version, "1.0");
        assert_eq!(doc.compliance.review_status, "draft");
        assert_eq!(doc.kind(), Some(DocumentType::Dmp));
    }

    #[test]
    fn test_minimal_json_uses_defaults() {
        let json = r#"{"document_type":"icf","title":"T","sections":[]}"#;
        let doc: UniversalDocument = serde_json::from_str(json).unwrap();
        assert_eq!(doc.styling.default_font, "Arial");
        assert!(doc.header_footer.show_page_numbers);
        assert_eq!(doc.compliance.generated_by, "gemini");
    }

    #[test]
    fn test_json_round_trip() {
        let doc = nested_document();
        let json = serde_json::to_string(&doc).unwrap();
        let back: UniversalDocument = serde_json::from_str(&json).unwrap();
        assert_eq!(doc, back);
    }
}
