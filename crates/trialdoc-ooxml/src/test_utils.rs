//! Shared test fixtures for trialdoc-ooxml

use trialdoc_uif::{ContentBlock, Section, TableBlock, UniversalDocument};

/// Two level-1 sections: "A" with one paragraph, "B" with a 2x2 table
pub fn scenario_document() -> UniversalDocument {
    UniversalDocument::new("icf", "Scenario")
        .with_section(Section::new("a", 1, "A").with_block(ContentBlock::paragraph("Body of A.")))
        .with_section(Section::new("b", 1, "B").with_block(ContentBlock::table(
            TableBlock::new(&["h1", "h2"], &[&["r1c1", "r1c2"]]),
        )))
}
