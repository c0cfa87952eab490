//! Text extraction and patching
//!
//! [`collect`] walks a UIF tree in document order and returns every
//! non-blank text leaf with its [`TextPath`]. [`apply`] writes replacement
//! text back through the same addressing, so applying the identity map
//! reproduces the original tree.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use trialdoc_uif::{
    BlockKind, ContentBlock, ListItem, Section, TableCellValue, UniversalDocument,
};

use crate::path::{PathSegment, TextPath};

/// One text leaf and where it lives
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextItem {
    pub path: TextPath,
    pub text: String,
}

impl TextItem {
    pub fn new(path: TextPath, text: impl Into<String>) -> Self {
        Self {
            path,
            text: text.into(),
        }
    }
}

/// Outcome of patching a tree
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApplyReport {
    /// Number of leaves written
    pub applied: usize,
    /// Paths that did not resolve to a leaf of the tree
    pub unmatched: Vec<TextPath>,
}

impl ApplyReport {
    pub fn is_complete(&self) -> bool {
        self.unmatched.is_empty()
    }
}

/// Collect every non-blank text leaf in document order
pub fn collect(doc: &UniversalDocument) -> Vec<TextItem> {
    let mut items = Vec::new();
    push_leaf(&mut items, TextPath::title(), &doc.title);
    for (i, section) in doc.sections.iter().enumerate() {
        collect_section(section, TextPath::section(i), &mut items);
    }
    items
}

fn push_leaf(items: &mut Vec<TextItem>, path: TextPath, text: &str) {
    if !text.trim().is_empty() {
        items.push(TextItem::new(path, text));
    }
}

fn collect_section(section: &Section, base: TextPath, items: &mut Vec<TextItem>) {
    push_leaf(items, base.child(PathSegment::Heading), &section.heading);

    for (j, block) in section.content_blocks.iter().enumerate() {
        collect_block(block, base.child(PathSegment::Block(j)), items);
    }

    for (k, subsection) in section.subsections.iter().enumerate() {
        collect_section(subsection, base.child(PathSegment::Subsection(k)), items);
    }
}

fn collect_block(block: &ContentBlock, base: TextPath, items: &mut Vec<TextItem>) {
    match &block.kind {
        BlockKind::Paragraph { content, .. } | BlockKind::Heading { content, .. } => {
            push_leaf(items, base.child(PathSegment::Content), content);
        }
        BlockKind::BulletList { items: list } | BlockKind::NumberedList { items: list, .. } => {
            for (k, item) in list.iter().enumerate() {
                let path = base.child(PathSegment::Item(k));
                match item {
                    ListItem::Text(text) => push_leaf(items, path, text),
                    ListItem::Structured(s) => {
                        push_leaf(items, path.child(PathSegment::ItemText), &s.text)
                    }
                }
            }
        }
        BlockKind::Table { table: Some(table) } => {
            for (k, header) in table.headers.iter().enumerate() {
                push_leaf(items, base.child(PathSegment::TableHeader(k)), header);
            }
            for (row, cells) in table.rows.iter().enumerate() {
                for (column, cell) in cells.iter().enumerate() {
                    let path = base.child(PathSegment::TableCell { row, column });
                    match cell {
                        TableCellValue::Text(text) => push_leaf(items, path, text),
                        TableCellValue::Cell(cell) => {
                            push_leaf(items, path.child(PathSegment::Content), &cell.content)
                        }
                    }
                }
            }
        }
        BlockKind::SignatureBlock {
            signature: Some(signature),
        } => {
            if let Some(preamble) = &signature.preamble {
                push_leaf(items, base.child(PathSegment::SignaturePreamble), preamble);
            }
            for (l, line) in signature.lines.iter().enumerate() {
                let path = base
                    .child(PathSegment::SignatureLine(l))
                    .child(PathSegment::Label);
                push_leaf(items, path, &line.label);
            }
        }
        BlockKind::Table { table: None }
        | BlockKind::SignatureBlock { signature: None }
        | BlockKind::PageBreak => {}
    }
}

/// Write each mapped text into the leaf its path addresses
///
/// Paths that do not resolve are logged and reported; the rest of the
/// map is still applied.
pub fn apply(doc: &mut UniversalDocument, translations: &HashMap<TextPath, String>) -> ApplyReport {
    let mut report = ApplyReport::default();

    let mut paths: Vec<&TextPath> = translations.keys().collect();
    paths.sort();

    for path in paths {
        match leaf_mut(doc, path) {
            Some(leaf) => {
                leaf.clone_from(&translations[path]);
                report.applied += 1;
            }
            None => {
                tracing::warn!("No text leaf at path '{}'; left untranslated", path);
                report.unmatched.push(path.clone());
            }
        }
    }

    report
}

/// Resolve a path to the text it addresses
pub fn lookup<'a>(doc: &'a UniversalDocument, path: &TextPath) -> Option<&'a str> {
    let segments = path.segments();
    match segments.first()? {
        PathSegment::Title => (segments.len() == 1).then_some(doc.title.as_str()),
        PathSegment::Section(i) => {
            let mut section = doc.sections.get(*i)?;
            let mut rest = &segments[1..];
            loop {
                match rest.first()? {
                    PathSegment::Subsection(k) => {
                        section = section.subsections.get(*k)?;
                        rest = &rest[1..];
                    }
                    PathSegment::Heading => {
                        return (rest.len() == 1).then_some(section.heading.as_str())
                    }
                    PathSegment::Block(j) => {
                        return block_text(section.content_blocks.get(*j)?, &rest[1..])
                    }
                    _ => return None,
                }
            }
        }
        _ => None,
    }
}

fn block_text<'a>(block: &'a ContentBlock, rest: &[PathSegment]) -> Option<&'a str> {
    match (&block.kind, rest) {
        (
            BlockKind::Paragraph { content, .. } | BlockKind::Heading { content, .. },
            [PathSegment::Content],
        ) => Some(content.as_str()),
        (
            BlockKind::BulletList { items } | BlockKind::NumberedList { items, .. },
            [PathSegment::Item(k)] | [PathSegment::Item(k), PathSegment::ItemText],
        ) => items.get(*k).map(ListItem::text),
        (BlockKind::Table { table: Some(table) }, [PathSegment::TableHeader(k)]) => {
            table.headers.get(*k).map(String::as_str)
        }
        (
            BlockKind::Table { table: Some(table) },
            [PathSegment::TableCell { row, column }]
            | [PathSegment::TableCell { row, column }, PathSegment::Content],
        ) => table
            .rows
            .get(*row)?
            .get(*column)
            .map(TableCellValue::content),
        (BlockKind::SignatureBlock { signature: Some(sig) }, [PathSegment::SignaturePreamble]) => {
            sig.preamble.as_deref()
        }
        (
            BlockKind::SignatureBlock { signature: Some(sig) },
            [PathSegment::SignatureLine(l), PathSegment::Label],
        ) => sig.lines.get(*l).map(|line| line.label.as_str()),
        _ => None,
    }
}

fn leaf_mut<'a>(doc: &'a mut UniversalDocument, path: &TextPath) -> Option<&'a mut String> {
    let segments = path.segments();
    match segments.first()? {
        PathSegment::Title => (segments.len() == 1).then_some(&mut doc.title),
        PathSegment::Section(i) => {
            let mut section = doc.sections.get_mut(*i)?;
            let mut rest = &segments[1..];
            loop {
                match rest.first()? {
                    PathSegment::Subsection(k) => {
                        section = section.subsections.get_mut(*k)?;
                        rest = &rest[1..];
                    }
                    PathSegment::Heading => {
                        return (rest.len() == 1).then_some(&mut section.heading)
                    }
                    PathSegment::Block(j) => {
                        let block = section.content_blocks.get_mut(*j)?;
                        return block_text_mut(block, &rest[1..]);
                    }
                    _ => return None,
                }
            }
        }
        _ => None,
    }
}

fn block_text_mut<'a>(block: &'a mut ContentBlock, rest: &[PathSegment]) -> Option<&'a mut String> {
    match (&mut block.kind, rest) {
        (
            BlockKind::Paragraph { content, .. } | BlockKind::Heading { content, .. },
            [PathSegment::Content],
        ) => Some(content),
        (
            BlockKind::BulletList { items } | BlockKind::NumberedList { items, .. },
            [PathSegment::Item(k)] | [PathSegment::Item(k), PathSegment::ItemText],
        ) => match items.get_mut(*k)? {
            ListItem::Text(text) => Some(text),
            ListItem::Structured(item) => Some(&mut item.text),
        },
        (BlockKind::Table { table: Some(table) }, [PathSegment::TableHeader(k)]) => {
            table.headers.get_mut(*k)
        }
        (
            BlockKind::Table { table: Some(table) },
            [PathSegment::TableCell { row, column }]
            | [PathSegment::TableCell { row, column }, PathSegment::Content],
        ) => match table.rows.get_mut(*row)?.get_mut(*column)? {
            TableCellValue::Text(text) => Some(text),
            TableCellValue::Cell(cell) => Some(&mut cell.content),
        },
        (BlockKind::SignatureBlock { signature: Some(sig) }, [PathSegment::SignaturePreamble]) => {
            sig.preamble.as_mut()
        }
        (
            BlockKind::SignatureBlock { signature: Some(sig) },
            [PathSegment::SignatureLine(l), PathSegment::Label],
        ) => sig.lines.get_mut(*l).map(|line| &mut line.label),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use trialdoc_uif::{SignatureBlock, SignatureLine, TableBlock, TableCell};

    fn sample() -> UniversalDocument {
        let mut table = TableBlock::new(&["Visit", "  "], &[&["Screening", "Day 1"]]);
        table
            .rows
            .push(vec![TableCell::new("Follow-up").with_colspan(2).into()]);

        UniversalDocument::new("icf", "Consent Form")
            .with_section(
                Section::new("intro", 1, "Introduction")
                    .with_block(ContentBlock::paragraph("Welcome."))
                    .with_block(ContentBlock::bullet_list(vec![
                        ListItem::Text("One".to_string()),
                        ListItem::nested("Two", 1),
                        ListItem::Text("   ".to_string()),
                    ]))
                    .with_subsection(
                        Section::new("risks", 2, "Risks")
                            .with_block(ContentBlock::heading("Minor risks", 3)),
                    ),
            )
            .with_section(
                Section::new("sched", 1, "Schedule")
                    .with_block(ContentBlock::table(table))
                    .with_block(ContentBlock::page_break())
                    .with_block(ContentBlock::signature(SignatureBlock {
                        preamble: Some("I agree.".to_string()),
                        lines: vec![SignatureLine::new("Signature")],
                    })),
            )
    }

    #[test]
    fn test_collect_paths_in_document_order() {
        let items = collect(&sample());
        let paths: Vec<String> = items.iter().map(|i| i.path.to_string()).collect();
        assert_eq!(
            paths,
            vec![
                "title",
                "sections.0.heading",
                "sections.0.blocks.0.content",
                "sections.0.blocks.1.items.0",
                "sections.0.blocks.1.items.1.text",
                "sections.0.subsections.0.heading",
                "sections.0.subsections.0.blocks.0.content",
                "sections.1.heading",
                "sections.1.blocks.0.table.headers.0",
                "sections.1.blocks.0.table.rows.0.0",
                "sections.1.blocks.0.table.rows.0.1",
                "sections.1.blocks.0.table.rows.1.0.content",
                "sections.1.blocks.2.signature.preamble",
                "sections.1.blocks.2.signature.lines.0.label",
            ]
        );
    }

    #[test]
    fn test_identity_apply_reproduces_tree() {
        let original = sample();
        let map: HashMap<TextPath, String> = collect(&original)
            .into_iter()
            .map(|item| (item.path, item.text))
            .collect();

        let mut patched = original.clone();
        let report = apply(&mut patched, &map);
        assert!(report.is_complete());
        assert_eq!(report.applied, map.len());
        assert_eq!(patched, original);
    }

    #[test]
    fn test_apply_replaces_leaves() {
        let mut doc = sample();
        let mut map = HashMap::new();
        map.insert("title".parse().unwrap(), "Formulario".to_string());
        map.insert(
            "sections.0.blocks.1.items.1.text".parse().unwrap(),
            "Dos".to_string(),
        );
        map.insert(
            "sections.1.blocks.0.table.rows.1.0.content".parse().unwrap(),
            "Seguimiento".to_string(),
        );
        map.insert(
            "sections.1.blocks.2.signature.lines.0.label".parse().unwrap(),
            "Firma".to_string(),
        );

        let report = apply(&mut doc, &map);
        assert_eq!(report.applied, 4);
        assert_eq!(doc.title, "Formulario");
        assert_eq!(
            lookup(&doc, &"sections.0.blocks.1.items.1.text".parse().unwrap()),
            Some("Dos")
        );

        let BlockKind::Table { table: Some(table) } = &doc.sections[1].content_blocks[0].kind
        else {
            panic!("expected table");
        };
        // Structured cells keep their span when patched
        assert_eq!(table.rows[1][0].content(), "Seguimiento");
        assert_eq!(table.rows[1][0].colspan(), 2);
    }

    #[test]
    fn test_unmatched_paths_are_reported() {
        let mut doc = sample();
        let mut map = HashMap::new();
        map.insert("sections.9.heading".parse().unwrap(), "x".to_string());
        map.insert("sections.1.blocks.1.content".parse().unwrap(), "x".to_string());
        map.insert("sections.0.heading".parse().unwrap(), "Intro".to_string());

        let report = apply(&mut doc, &map);
        assert_eq!(report.applied, 1);
        assert_eq!(report.unmatched.len(), 2);
        assert!(!report.is_complete());
        assert_eq!(doc.sections[0].heading, "Intro");
    }

    #[test]
    fn test_lookup_follows_subsections() {
        let doc = sample();
        let path: TextPath = "sections.0.subsections.0.blocks.0.content".parse().unwrap();
        assert_eq!(lookup(&doc, &path), Some("Minor risks"));
        assert_eq!(lookup(&doc, &"sections.0.subsections.1.heading".parse().unwrap()), None);
    }
}
