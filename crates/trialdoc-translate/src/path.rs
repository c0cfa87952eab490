//! Typed text paths
//!
//! A [`TextPath`] locates one text-bearing leaf of a UIF tree as a list of
//! [`PathSegment`]s. Its dotted form is stable and is what appears in
//! extracted JSON and in externally supplied translation maps:
//!
//! ```text
//! title
//! sections.0.heading
//! sections.0.subsections.2.blocks.1.content
//! sections.1.blocks.0.items.3
//! sections.1.blocks.0.items.4.text
//! sections.1.blocks.2.table.headers.0
//! sections.1.blocks.2.table.rows.0.2
//! sections.1.blocks.2.table.rows.1.0.content
//! sections.2.blocks.0.signature.preamble
//! sections.2.blocks.0.signature.lines.1.label
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::TranslateError;

/// One step of a text path
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PathSegment {
    /// The document title
    Title,
    /// A top-level section
    Section(usize),
    /// A nested section of the current section
    Subsection(usize),
    /// The current section's heading
    Heading,
    /// A content block of the current section
    Block(usize),
    /// Paragraph, heading or structured cell text
    Content,
    /// A list item
    Item(usize),
    /// Text of a structured list item
    ItemText,
    /// A table header cell
    TableHeader(usize),
    /// A table body cell
    TableCell { row: usize, column: usize },
    /// Preamble of a signature block
    SignaturePreamble,
    /// A signature line
    SignatureLine(usize),
    /// Label of a signature line
    Label,
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathSegment::Title => write!(f, "title"),
            PathSegment::Section(i) => write!(f, "sections.{}", i),
            PathSegment::Subsection(i) => write!(f, "subsections.{}", i),
            PathSegment::Heading => write!(f, "heading"),
            PathSegment::Block(j) => write!(f, "blocks.{}", j),
            PathSegment::Content => write!(f, "content"),
            PathSegment::Item(k) => write!(f, "items.{}", k),
            PathSegment::ItemText => write!(f, "text"),
            PathSegment::TableHeader(k) => write!(f, "table.headers.{}", k),
            PathSegment::TableCell { row, column } => write!(f, "table.rows.{}.{}", row, column),
            PathSegment::SignaturePreamble => write!(f, "signature.preamble"),
            PathSegment::SignatureLine(l) => write!(f, "signature.lines.{}", l),
            PathSegment::Label => write!(f, "label"),
        }
    }
}

/// Address of a single text leaf
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TextPath(Vec<PathSegment>);

impl TextPath {
    pub fn new(segments: Vec<PathSegment>) -> Self {
        Self(segments)
    }

    /// Path of the document title
    pub fn title() -> Self {
        Self(vec![PathSegment::Title])
    }

    /// Path of a top-level section (not itself a leaf)
    pub fn section(index: usize) -> Self {
        Self(vec![PathSegment::Section(index)])
    }

    /// A copy of this path extended by one segment
    pub fn child(&self, segment: PathSegment) -> Self {
        let mut segments = self.0.clone();
        segments.push(segment);
        Self(segments)
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.0
    }
}

impl fmt::Display for TextPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            write!(f, "{}", segment)?;
        }
        Ok(())
    }
}

impl FromStr for TextPath {
    type Err = TranslateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PathParser::new(s).parse()
    }
}

impl Serialize for TextPath {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for TextPath {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Recursive-descent parser over the dot-separated tokens
struct PathParser<'a> {
    source: &'a str,
    tokens: std::str::Split<'a, char>,
    segments: Vec<PathSegment>,
}

impl<'a> PathParser<'a> {
    fn new(source: &'a str) -> Self {
        Self {
            source,
            tokens: source.split('.'),
            segments: Vec::new(),
        }
    }

    fn error(&self, reason: impl Into<String>) -> TranslateError {
        TranslateError::InvalidPath {
            path: self.source.to_string(),
            reason: reason.into(),
        }
    }

    fn next_token(&mut self) -> Result<&'a str, TranslateError> {
        match self.tokens.next() {
            Some("") => Err(self.error("empty segment")),
            Some(token) => Ok(token),
            None => Err(self.error("path ends early")),
        }
    }

    fn keyword(&mut self, expected: &str) -> Result<(), TranslateError> {
        let token = self.next_token()?;
        if token == expected {
            Ok(())
        } else {
            Err(self.error(format!("expected '{}', found '{}'", expected, token)))
        }
    }

    fn index(&mut self) -> Result<usize, TranslateError> {
        let token = self.next_token()?;
        token
            .parse()
            .map_err(|_| self.error(format!("expected an index, found '{}'", token)))
    }

    fn end(mut self) -> Result<TextPath, TranslateError> {
        match self.tokens.next() {
            None => Ok(TextPath(self.segments)),
            Some(token) => Err(self.error(format!("unexpected trailing '{}'", token))),
        }
    }

    fn parse(mut self) -> Result<TextPath, TranslateError> {
        match self.next_token()? {
            "title" => {
                self.segments.push(PathSegment::Title);
                self.end()
            }
            "sections" => {
                let i = self.index()?;
                self.segments.push(PathSegment::Section(i));
                self.parse_section()
            }
            other => Err(self.error(format!("unknown root '{}'", other))),
        }
    }

    fn parse_section(mut self) -> Result<TextPath, TranslateError> {
        loop {
            match self.next_token()? {
                "subsections" => {
                    let i = self.index()?;
                    self.segments.push(PathSegment::Subsection(i));
                }
                "heading" => {
                    self.segments.push(PathSegment::Heading);
                    return self.end();
                }
                "blocks" => {
                    let j = self.index()?;
                    self.segments.push(PathSegment::Block(j));
                    return self.parse_block();
                }
                other => return Err(self.error(format!("unexpected '{}' in section", other))),
            }
        }
    }

    fn parse_block(mut self) -> Result<TextPath, TranslateError> {
        match self.next_token()? {
            "content" => self.segments.push(PathSegment::Content),
            "items" => {
                let k = self.index()?;
                self.segments.push(PathSegment::Item(k));
                if let Some(token) = self.tokens.next() {
                    if token != "text" {
                        return Err(self.error(format!("expected 'text', found '{}'", token)));
                    }
                    self.segments.push(PathSegment::ItemText);
                }
            }
            "table" => match self.next_token()? {
                "headers" => {
                    let k = self.index()?;
                    self.segments.push(PathSegment::TableHeader(k));
                }
                "rows" => {
                    let row = self.index()?;
                    let column = self.index()?;
                    self.segments.push(PathSegment::TableCell { row, column });
                    if let Some(token) = self.tokens.next() {
                        if token != "content" {
                            return Err(
                                self.error(format!("expected 'content', found '{}'", token))
                            );
                        }
                        self.segments.push(PathSegment::Content);
                    }
                }
                other => return Err(self.error(format!("unexpected '{}' in table", other))),
            },
            "signature" => match self.next_token()? {
                "preamble" => self.segments.push(PathSegment::SignaturePreamble),
                "lines" => {
                    let l = self.index()?;
                    self.keyword("label")?;
                    self.segments.push(PathSegment::SignatureLine(l));
                    self.segments.push(PathSegment::Label);
                }
                other => return Err(self.error(format!("unexpected '{}' in signature", other))),
            },
            other => return Err(self.error(format!("unexpected '{}' in block", other))),
        }
        self.end()
    }
}
