//! DOCX Writer
//!
//! Walks a UIF tree in document order and assembles the package.
//!
//! # Example
//!
//! ```
//! use trialdoc_ooxml::{DocxWriter, StyleEngine};
//! use trialdoc_uif::{ContentBlock, Section, UniversalDocument};
//!
//! let doc = UniversalDocument::new("icf", "Consent").with_section(
//!     Section::new("intro", 1, "Introduction")
//!         .with_block(ContentBlock::paragraph("You are invited.")),
//! );
//! let styles = StyleEngine::new().finish();
//! let mut writer = DocxWriter::new(&styles);
//! writer.write_title(&doc.title)?;
//! for section in &doc.sections {
//!     writer.write_section(section)?;
//! }
//! let archive = writer.finish(&doc)?;
//! assert!(archive.contains("word/document.xml"));
//! # Ok::<(), trialdoc_ooxml::RenderError>(())
//! ```

use trialdoc_uif::{Alignment, BlockKind, ContentBlock, Section, UniversalDocument};

use crate::archive::OoxmlArchive;
use crate::error::Result;
use crate::list::ListBuilder;
use crate::package::{
    app_xml, content_types_xml, core_xml, root_relationships, settings_xml, CT_CORE_PROPERTIES,
    CT_DOCUMENT, CT_EXTENDED_PROPERTIES, CT_FOOTER, CT_HEADER, CT_NUMBERING, CT_SETTINGS,
    CT_STYLES,
};
use crate::relationships::Relationships;
use crate::section::SectionBuilder;
use crate::styles::DocumentStyles;
use crate::table::TableBuilder;
use crate::xml::{R_NS, W_NS, XML_DECLARATION};

/// DOCX Writer for generating DOCX packages from a UIF tree
pub struct DocxWriter<'a> {
    /// Body XML buffer
    output: String,
    styles: &'a DocumentStyles,
    lists: ListBuilder<'a>,
}

impl<'a> DocxWriter<'a> {
    /// Create a writer over a frozen style table
    pub fn new(styles: &'a DocumentStyles) -> Self {
        Self {
            output: String::new(),
            styles,
            lists: ListBuilder::new(styles),
        }
    }

    /// Body XML written so far
    pub fn body(&self) -> &str {
        &self.output
    }

    /// Write the document title; nothing for an empty title
    pub fn write_title(&mut self, title: &str) -> Result<()> {
        if title.is_empty() {
            return Ok(());
        }
        SectionBuilder::new(self.styles).write_title(&mut self.output, title)
    }

    /// Write a section: heading, its blocks, then its subsections
    pub fn write_section(&mut self, section: &Section) -> Result<()> {
        log::debug!("rendering section '{}' (level {})", section.id, section.level);
        SectionBuilder::new(self.styles).write_heading(
            &mut self.output,
            &section.heading,
            section.level,
            Alignment::Left,
        )?;
        for block in &section.content_blocks {
            self.write_block(block)?;
        }
        for subsection in &section.subsections {
            self.write_section(subsection)?;
        }
        Ok(())
    }

    /// Write one content block
    pub fn write_block(&mut self, block: &ContentBlock) -> Result<()> {
        let sections = SectionBuilder::new(self.styles);
        match &block.kind {
            BlockKind::Paragraph {
                content,
                formatting,
            } => {
                let ranges = formatting.as_ref().map(|f| f.ranges.as_slice()).unwrap_or(&[]);
                sections.write_paragraph(
                    &mut self.output,
                    content,
                    ranges,
                    block.alignment,
                    block.spacing_before,
                    block.spacing_after,
                );
            }
            BlockKind::Heading { content, level } => {
                sections.write_heading(
                    &mut self.output,
                    content,
                    level.unwrap_or(1),
                    block.alignment,
                )?;
            }
            BlockKind::PageBreak => sections.write_page_break(&mut self.output),
            BlockKind::BulletList { items } => {
                self.lists.write_bullet_list(&mut self.output, items)?;
            }
            BlockKind::NumberedList {
                items,
                list_style,
                start_number,
            } => {
                self.lists
                    .write_numbered_list(&mut self.output, items, *list_style, *start_number)?;
            }
            BlockKind::Table { table } => match table {
                Some(table) => TableBuilder::new(self.styles).write(&mut self.output, table),
                None => log::warn!("Table block has no table data, skipping"),
            },
            BlockKind::SignatureBlock { signature } => match signature {
                Some(signature) if !signature.lines.is_empty() || signature.preamble.is_some() => {
                    sections.write_signature(&mut self.output, signature);
                }
                _ => log::warn!("Signature block has no signature data, skipping"),
            },
        }
        Ok(())
    }

    /// Assemble every part into a package
    pub fn finish(self, doc: &UniversalDocument) -> Result<OoxmlArchive> {
        let mut archive = OoxmlArchive::new();
        let mut rels = Relationships::new();
        let mut overrides: Vec<(&str, &str)> = vec![
            ("word/document.xml", CT_DOCUMENT),
            ("word/styles.xml", CT_STYLES),
            ("word/settings.xml", CT_SETTINGS),
        ];

        rels.add("styles.xml", Relationships::TYPE_STYLES);
        archive.set_string("word/styles.xml", self.styles.styles_xml());

        rels.add("settings.xml", Relationships::TYPE_SETTINGS);
        archive.set_string("word/settings.xml", settings_xml());

        if let Some(numbering) = self.lists.numbering_xml() {
            rels.add("numbering.xml", Relationships::TYPE_NUMBERING);
            archive.set_string("word/numbering.xml", numbering);
            overrides.push(("word/numbering.xml", CT_NUMBERING));
        }

        let header_rel = self.styles.header_xml().map(|header| {
            archive.set_string("word/header1.xml", header);
            overrides.push(("word/header1.xml", CT_HEADER));
            rels.add("header1.xml", Relationships::TYPE_HEADER)
        });
        let footer_rel = self.styles.footer_xml().map(|footer| {
            archive.set_string("word/footer1.xml", footer);
            overrides.push(("word/footer1.xml", CT_FOOTER));
            rels.add("footer1.xml", Relationships::TYPE_FOOTER)
        });

        let mut document = String::with_capacity(self.output.len() + 1024);
        document.push_str(XML_DECLARATION);
        document.push('\n');
        document.push_str(&format!(
            r#"<w:document xmlns:w="{}" xmlns:r="{}"><w:body>"#,
            W_NS, R_NS
        ));
        document.push_str(&self.output);
        self.styles
            .write_sect_pr(&mut document, header_rel.as_deref(), footer_rel.as_deref());
        document.push_str("</w:body></w:document>");

        archive.set_string("word/document.xml", document);
        archive.set_string("word/_rels/document.xml.rels", rels.to_xml());

        overrides.push(("docProps/core.xml", CT_CORE_PROPERTIES));
        overrides.push(("docProps/app.xml", CT_EXTENDED_PROPERTIES));
        archive.set_string("docProps/core.xml", core_xml(doc));
        archive.set_string("docProps/app.xml", app_xml(doc));
        archive.set_string("_rels/.rels", root_relationships().to_xml());
        archive.set_string("[Content_Types].xml", content_types_xml(&overrides));

        Ok(archive)
    }
}
