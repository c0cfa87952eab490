//! Tree structure validator
//!
//! Checks required fields on the root, sections and blocks, the heading
//! level range, subsection nesting and per-variant block payloads.
//!
//! # Diagnostic Codes
//!
//! - `UIF101`: document title missing
//! - `UIF102`: document type missing
//! - `UIF103`: no sections
//! - `UIF104`: unknown document type
//! - `UIF110`: section id missing
//! - `UIF111`: section heading missing
//! - `UIF112`: section level outside 1-4
//! - `UIF113`: subsection level not deeper than its parent
//! - `UIF114`: duplicate section id (warning)
//! - `UIF120`: heading block level outside 1-4
//! - `UIF121`: table block without table data
//! - `UIF122`: table without headers or rows
//! - `UIF123`: list block without items
//! - `UIF124`: signature block without signature data

use std::collections::HashSet;

use trialdoc_uif::{BlockKind, ContentBlock, DocumentType, Section, UniversalDocument};

use crate::diagnostics::Diagnostic;
use crate::Validator;

/// Validates required fields and tree shape
pub struct StructureValidator;

impl Validator for StructureValidator {
    fn code(&self) -> &'static str {
        "UIF1"
    }

    fn name(&self) -> &'static str {
        "uif-structure"
    }

    fn validate(&self, doc: &UniversalDocument) -> Vec<Diagnostic> {
        let mut diagnostics = Vec::new();

        if doc.title.trim().is_empty() {
            diagnostics.push(Diagnostic::error("Document title is required").with_code("UIF101"));
        }

        if doc.document_type.trim().is_empty() {
            diagnostics.push(Diagnostic::error("Document type is required").with_code("UIF102"));
        } else if doc.kind().is_none() {
            let valid: Vec<&str> = DocumentType::ALL.iter().map(|t| t.as_str()).collect();
            diagnostics.push(
                Diagnostic::error(format!(
                    "Invalid document type '{}'. Must be one of: {}",
                    doc.document_type,
                    valid.join(", ")
                ))
                .with_code("UIF104"),
            );
        }

        if doc.sections.is_empty() {
            diagnostics.push(
                Diagnostic::error("Document must have at least one section").with_code("UIF103"),
            );
        }

        let mut seen_ids = HashSet::new();
        for (i, section) in doc.sections.iter().enumerate() {
            let path = format!("sections[{}]", i);
            validate_section(section, &path, &mut seen_ids, &mut diagnostics);
        }

        diagnostics
    }
}

fn validate_section<'a>(
    section: &'a Section,
    path: &str,
    seen_ids: &mut HashSet<&'a str>,
    diagnostics: &mut Vec<Diagnostic>,
) {
    if section.id.trim().is_empty() {
        diagnostics.push(
            Diagnostic::error("Section ID is required")
                .with_code("UIF110")
                .with_path(path),
        );
    } else if !seen_ids.insert(section.id.as_str()) {
        diagnostics.push(
            Diagnostic::warning(format!("Duplicate section id '{}'", section.id))
                .with_code("UIF114")
                .with_path(path)
                .with_help("Section ids should be unique within a document"),
        );
    }

    if section.heading.trim().is_empty() {
        diagnostics.push(
            Diagnostic::error("Section heading is required")
                .with_code("UIF111")
                .with_path(path),
        );
    }

    if !(1..=4).contains(&section.level) {
        diagnostics.push(
            Diagnostic::error(format!(
                "Section level must be between 1 and 4, got {}",
                section.level
            ))
            .with_code("UIF112")
            .with_path(path),
        );
    }

    for (i, block) in section.content_blocks.iter().enumerate() {
        let block_path = format!("{}.content_blocks[{}]", path, i);
        validate_block(block, &block_path, diagnostics);
    }

    for (i, subsection) in section.subsections.iter().enumerate() {
        let subsection_path = format!("{}.subsections[{}]", path, i);

        if subsection.level <= section.level {
            diagnostics.push(
                Diagnostic::error(format!(
                    "Subsection level ({}) must be greater than parent level ({})",
                    subsection.level, section.level
                ))
                .with_code("UIF113")
                .with_path(&subsection_path),
            );
        }

        validate_section(subsection, &subsection_path, seen_ids, diagnostics);
    }
}

fn validate_block(block: &ContentBlock, path: &str, diagnostics: &mut Vec<Diagnostic>) {
    let finding = match &block.kind {
        BlockKind::Heading { level, .. } => match level {
            Some(level) if (1..=4).contains(level) => None,
            _ => Some(("UIF120", "Heading level must be between 1 and 4")),
        },
        BlockKind::Table { table: None } => Some(("UIF121", "Table block requires table data")),
        BlockKind::Table { table: Some(table) } if table.is_empty() => {
            Some(("UIF122", "Table must have headers or rows"))
        }
        BlockKind::BulletList { items } | BlockKind::NumberedList { items, .. }
            if items.is_empty() =>
        {
            Some(("UIF123", "List block requires items"))
        }
        BlockKind::SignatureBlock { signature: None } => {
            Some(("UIF124", "Signature block requires signature data"))
        }
        BlockKind::Paragraph { .. }
        | BlockKind::PageBreak
        | BlockKind::Table { .. }
        | BlockKind::BulletList { .. }
        | BlockKind::NumberedList { .. }
        | BlockKind::SignatureBlock { .. } => None,
    };

    if let Some((code, message)) = finding {
        diagnostics.push(Diagnostic::error(message).with_code(code).with_path(path));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use trialdoc_uif::{ListItem, TableBlock};

    fn messages(doc: &UniversalDocument) -> Vec<String> {
        StructureValidator
            .validate(doc)
            .iter()
            .filter(|d| d.is_error())
            .map(Diagnostic::render_message)
            .collect()
    }

    fn doc_with(blocks: Vec<ContentBlock>) -> UniversalDocument {
        let mut section = Section::new("s", 1, "S");
        section.content_blocks = blocks;
        UniversalDocument::new("icf", "T").with_section(section)
    }

    #[test]
    fn test_root_required_fields() {
        let errors = messages(&UniversalDocument::new("", ""));
        assert_eq!(
            errors,
            vec![
                "Document title is required",
                "Document type is required",
                "Document must have at least one section",
            ]
        );
    }

    #[test]
    fn test_invalid_document_type() {
        let doc = UniversalDocument::new("protocol", "T").with_section(Section::new("s", 1, "S"));
        let errors = messages(&doc);
        assert_eq!(
            errors,
            vec!["Invalid document type 'protocol'. Must be one of: icf, dmp, sap"]
        );
    }

    #[test]
    fn test_document_type_case_insensitive() {
        let doc = UniversalDocument::new("SAP", "T").with_section(Section::new("s", 1, "S"));
        assert!(messages(&doc).is_empty());
    }

    #[test]
    fn test_section_required_fields() {
        let doc = UniversalDocument::new("icf", "T").with_section(Section::new("", 5, ""));
        let errors = messages(&doc);
        assert!(errors.contains(&"sections[0]: Section ID is required".to_string()));
        assert!(errors.contains(&"sections[0]: Section heading is required".to_string()));
        assert!(errors
            .contains(&"sections[0]: Section level must be between 1 and 4, got 5".to_string()));
    }

    #[test]
    fn test_subsection_level_must_increase() {
        let doc = UniversalDocument::new("icf", "T").with_section(
            Section::new("a", 2, "A").with_subsection(Section::new("b", 2, "B")),
        );
        assert_eq!(
            messages(&doc),
            vec!["sections[0].subsections[0]: Subsection level (2) must be greater than parent level (2)"]
        );
    }

    #[test]
    fn test_nested_paths() {
        let doc = UniversalDocument::new("icf", "T").with_section(
            Section::new("a", 1, "A").with_subsection(
                Section::new("b", 2, "B").with_block(ContentBlock::bullet_list(vec![])),
            ),
        );
        assert_eq!(
            messages(&doc),
            vec!["sections[0].subsections[0].content_blocks[0]: List block requires items"]
        );
    }

    #[test]
    fn test_block_checks() {
        let doc = doc_with(vec![
            ContentBlock::heading("H", 7),
            ContentBlock::new(BlockKind::Table { table: None }),
            ContentBlock::table(TableBlock::new(&[], &[])),
            ContentBlock::numbered_list(vec![], trialdoc_uif::ListStyle::Decimal),
            ContentBlock::new(BlockKind::SignatureBlock { signature: None }),
            ContentBlock::bullet_list(vec![ListItem::from("ok")]),
        ]);
        assert_eq!(
            messages(&doc),
            vec![
                "sections[0].content_blocks[0]: Heading level must be between 1 and 4",
                "sections[0].content_blocks[1]: Table block requires table data",
                "sections[0].content_blocks[2]: Table must have headers or rows",
                "sections[0].content_blocks[3]: List block requires items",
                "sections[0].content_blocks[4]: Signature block requires signature data",
            ]
        );
    }

    #[test]
    fn test_heading_without_level_is_error() {
        let doc = doc_with(vec![ContentBlock::new(BlockKind::Heading {
            content: "H".to_string(),
            level: None,
        })]);
        assert_eq!(messages(&doc).len(), 1);
    }

    #[test]
    fn test_duplicate_id_is_warning() {
        let doc = UniversalDocument::new("icf", "T")
            .with_section(Section::new("a", 1, "A"))
            .with_section(Section::new("a", 1, "B"));
        let diags = StructureValidator.validate(&doc);
        assert_eq!(diags.len(), 1);
        assert!(diags[0].is_warning());
        assert_eq!(diags[0].code.as_deref(), Some("UIF114"));
        assert_eq!(diags[0].path.as_deref(), Some("sections[1]"));
    }
}
