//! Recursive document sections

use serde::{Deserialize, Serialize};

use crate::block::ContentBlock;

/// A document section
///
/// Each section exclusively owns its content blocks and subsections.
/// Subsection levels must be strictly greater than the parent level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Section {
    /// Unique section identifier
    #[serde(default)]
    pub id: String,
    /// Heading level (1-4)
    #[serde(default = "default_level")]
    pub level: u8,
    /// Section heading text
    #[serde(default)]
    pub heading: String,
    /// Blocks rendered after the heading, before subsections
    #[serde(default)]
    pub content_blocks: Vec<ContentBlock>,
    /// Nested sections
    #[serde(default)]
    pub subsections: Vec<Section>,
}

fn default_level() -> u8 {
    1
}

impl Section {
    /// Create an empty section
    pub fn new(id: impl Into<String>, level: u8, heading: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            level,
            heading: heading.into(),
            content_blocks: Vec::new(),
            subsections: Vec::new(),
        }
    }

    /// Append a content block
    pub fn with_block(mut self, block: ContentBlock) -> Self {
        self.content_blocks.push(block);
        self
    }

    /// Append a subsection
    pub fn with_subsection(mut self, section: Section) -> Self {
        self.subsections.push(section);
        self
    }

    /// This section plus all nested subsections
    pub fn count_sections(&self) -> usize {
        1 + self
            .subsections
            .iter()
            .map(Section::count_sections)
            .sum::<usize>()
    }

    /// Blocks in this section and all nested subsections
    pub fn count_content_blocks(&self) -> usize {
        self.content_blocks.len()
            + self
                .subsections
                .iter()
                .map(Section::count_content_blocks)
                .sum::<usize>()
    }

    pub(crate) fn collect_flat<'a>(&'a self, out: &mut Vec<&'a Section>) {
        out.push(self);
        for sub in &self.subsections {
            sub.collect_flat(out);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_section_builder() {
        let section = Section::new("a", 1, "A")
            .with_block(ContentBlock::paragraph("x"))
            .with_subsection(Section::new("a.1", 2, "A.1"));
        assert_eq!(section.content_blocks.len(), 1);
        assert_eq!(section.subsections.len(), 1);
        assert_eq!(section.count_sections(), 2);
    }

    #[test]
    fn test_level_defaults_to_one() {
        let section: Section = serde_json::from_str(r#"{"id":"x","heading":"X"}"#).unwrap();
        assert_eq!(section.level, 1);
        assert!(section.subsections.is_empty());
    }
}
