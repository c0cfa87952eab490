//! Content blocks
//!
//! A [`ContentBlock`] is one node-level unit within a section. The block
//! kind is a closed sum type so every consumer (renderer, validator,
//! extractor) handles each variant through an exhaustive match.
//!
//! On the wire the kind is flattened into the block record and tagged by a
//! `type` field, matching the persisted UIF layout:
//!
//! ```json
//! {"type": "paragraph", "content": "Hello", "alignment": "center"}
//! ```

use serde::{Deserialize, Serialize};

use crate::table::TableBlock;

/// Horizontal paragraph alignment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Alignment {
    #[default]
    Left,
    Center,
    Right,
    Justify,
}

/// One node-level unit within a section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentBlock {
    /// Variant-specific payload, tagged by `type`
    #[serde(flatten)]
    pub kind: BlockKind,
    /// Horizontal alignment
    #[serde(default)]
    pub alignment: Alignment,
    /// Space before the block, in points
    #[serde(default)]
    pub spacing_before: u32,
    /// Space after the block, in points
    #[serde(default)]
    pub spacing_after: u32,
}

/// Block variants
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BlockKind {
    /// Body text with optional inline character formatting
    Paragraph {
        #[serde(default)]
        content: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        formatting: Option<InlineFormatting>,
    },
    /// An in-section heading
    Heading {
        #[serde(default)]
        content: String,
        /// Heading level (1-4); missing levels are reported by validation
        #[serde(default, skip_serializing_if = "Option::is_none")]
        level: Option<u8>,
    },
    /// Hard page break
    PageBreak,
    /// Bulleted list
    BulletList {
        #[serde(default)]
        items: Vec<ListItem>,
    },
    /// Numbered list
    NumberedList {
        #[serde(default)]
        items: Vec<ListItem>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        list_style: Option<ListStyle>,
        /// First number at level 0 (nested levels restart at 1)
        #[serde(default, skip_serializing_if = "Option::is_none")]
        start_number: Option<u32>,
    },
    /// Table
    Table {
        #[serde(default)]
        table: Option<TableBlock>,
    },
    /// Signature lines for consent forms
    SignatureBlock {
        #[serde(default)]
        signature: Option<SignatureBlock>,
    },
}

impl BlockKind {
    /// The persisted `type` tag for this variant
    pub fn type_name(&self) -> &'static str {
        match self {
            BlockKind::Paragraph { .. } => "paragraph",
            BlockKind::Heading { .. } => "heading",
            BlockKind::PageBreak => "page_break",
            BlockKind::BulletList { .. } => "bullet_list",
            BlockKind::NumberedList { .. } => "numbered_list",
            BlockKind::Table { .. } => "table",
            BlockKind::SignatureBlock { .. } => "signature_block",
        }
    }
}

impl ContentBlock {
    /// Wrap a block kind with default alignment and spacing
    pub fn new(kind: BlockKind) -> Self {
        Self {
            kind,
            alignment: Alignment::Left,
            spacing_before: 0,
            spacing_after: 0,
        }
    }

    /// Plain paragraph
    pub fn paragraph(content: impl Into<String>) -> Self {
        Self::new(BlockKind::Paragraph {
            content: content.into(),
            formatting: None,
        })
    }

    /// Paragraph with inline formatting ranges
    pub fn formatted_paragraph(content: impl Into<String>, ranges: Vec<InlineFormat>) -> Self {
        Self::new(BlockKind::Paragraph {
            content: content.into(),
            formatting: Some(InlineFormatting { ranges }),
        })
    }

    /// In-section heading
    pub fn heading(content: impl Into<String>, level: u8) -> Self {
        Self::new(BlockKind::Heading {
            content: content.into(),
            level: Some(level),
        })
    }

    /// Page break
    pub fn page_break() -> Self {
        Self::new(BlockKind::PageBreak)
    }

    /// Bulleted list
    pub fn bullet_list(items: Vec<ListItem>) -> Self {
        Self::new(BlockKind::BulletList { items })
    }

    /// Numbered list with an explicit style
    pub fn numbered_list(items: Vec<ListItem>, list_style: ListStyle) -> Self {
        Self::new(BlockKind::NumberedList {
            items,
            list_style: Some(list_style),
            start_number: None,
        })
    }

    /// Table block
    pub fn table(table: TableBlock) -> Self {
        Self::new(BlockKind::Table { table: Some(table) })
    }

    /// Signature block
    pub fn signature(signature: SignatureBlock) -> Self {
        Self::new(BlockKind::SignatureBlock {
            signature: Some(signature),
        })
    }

    /// Set the alignment
    pub fn aligned(mut self, alignment: Alignment) -> Self {
        self.alignment = alignment;
        self
    }

    /// Set spacing before and after, in points
    pub fn spaced(mut self, before: u32, after: u32) -> Self {
        self.spacing_before = before;
        self.spacing_after = after;
        self
    }
}

/// Character range carrying formatting flags (`start` inclusive, `end` exclusive)
///
/// Indices count Unicode scalar values, not bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InlineFormat {
    pub start: usize,
    pub end: usize,
    #[serde(default)]
    pub bold: bool,
    #[serde(default)]
    pub italic: bool,
    #[serde(default)]
    pub underline: bool,
}

impl InlineFormat {
    /// Bold range
    pub fn bold(start: usize, end: usize) -> Self {
        Self {
            start,
            end,
            bold: true,
            italic: false,
            underline: false,
        }
    }

    /// Italic range
    pub fn italic(start: usize, end: usize) -> Self {
        Self {
            start,
            end,
            bold: false,
            italic: true,
            underline: false,
        }
    }

    /// Underlined range
    pub fn underline(start: usize, end: usize) -> Self {
        Self {
            start,
            end,
            bold: false,
            italic: false,
            underline: true,
        }
    }
}

/// Container for possibly overlapping inline ranges
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct InlineFormatting {
    #[serde(default)]
    pub ranges: Vec<InlineFormat>,
}

/// Numbering scheme for numbered lists
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListStyle {
    Bullet,
    Decimal,
    RomanUpper,
    RomanLower,
    LetterUpper,
    LetterLower,
}

/// A list entry: plain text or a structured item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ListItem {
    Text(String),
    Structured(StructuredListItem),
}

impl ListItem {
    /// Item text
    pub fn text(&self) -> &str {
        match self {
            ListItem::Text(text) => text,
            ListItem::Structured(item) => &item.text,
        }
    }

    /// Requested nesting level (0-based, unclamped)
    pub fn level(&self) -> u8 {
        match self {
            ListItem::Text(_) => 0,
            ListItem::Structured(item) => item.level,
        }
    }

    /// Run formatting applied to the whole item
    pub fn formatting(&self) -> Option<&RunFormatting> {
        match self {
            ListItem::Text(_) => None,
            ListItem::Structured(item) => item.formatting.as_ref(),
        }
    }

    /// Structured item at a nesting level
    pub fn nested(text: impl Into<String>, level: u8) -> Self {
        ListItem::Structured(StructuredListItem {
            text: text.into(),
            level,
            formatting: None,
        })
    }
}

impl From<&str> for ListItem {
    fn from(text: &str) -> Self {
        ListItem::Text(text.to_string())
    }
}

impl From<String> for ListItem {
    fn from(text: String) -> Self {
        ListItem::Text(text)
    }
}

/// List entry with its own level and formatting
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructuredListItem {
    #[serde(default, alias = "content")]
    pub text: String,
    #[serde(default)]
    pub level: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub formatting: Option<RunFormatting>,
}

/// Character formatting for a whole run
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RunFormatting {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bold: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub italic: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub underline: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub strike: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub superscript: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subscript: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_name: Option<String>,
    /// Size in points
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_size: Option<f64>,
}

/// A single labelled signature line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignatureLine {
    #[serde(default)]
    pub label: String,
    #[serde(default = "default_line_width")]
    pub line_width_inches: f64,
}

fn default_line_width() -> f64 {
    3.5
}

impl SignatureLine {
    /// Signature line with the default width
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            line_width_inches: default_line_width(),
        }
    }
}

/// Preamble text followed by signature lines
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SignatureBlock {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preamble: Option<String>,
    #[serde(default)]
    pub lines: Vec<SignatureLine>,
}
