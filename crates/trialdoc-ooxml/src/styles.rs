//! Style engine (word/styles.xml, section geometry, header and footer)
//!
//! [`StyleEngine`] collects document-wide configuration. Styles are keyed by
//! ID and overwritten on every application, so applying the same
//! configuration twice leaves the registry unchanged. [`StyleEngine::finish`]
//! freezes the registry into an immutable [`DocumentStyles`] value that the
//! builders read from and that is returned with the render output.

use std::collections::BTreeMap;

use trialdoc_uif::{DocumentStyling, HeaderFooter, PageNumberPosition, PageSetup};

use crate::error::{RenderError, Result};
use crate::xml::{
    escape_xml, half_points, inches_to_twips, pt_to_twips, write_run, ParagraphProps, RunProps,
    R_NS, W_NS, XML_DECLARATION,
};

/// Font used for header and footer text
pub const HEADER_FOOTER_FONT: &str = "Arial";

/// Header and footer text size in points
pub const HEADER_FOOTER_SIZE: f64 = 9.0;

/// Distance of header and footer from the page edge, in twips
const HEADER_FOOTER_DISTANCE: i64 = 720;

/// Type of style
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StyleType {
    /// Paragraph style
    Paragraph,
    /// Character (run) style
    Character,
    /// Table style
    Table,
}

impl StyleType {
    fn as_str(&self) -> &'static str {
        match self {
            StyleType::Paragraph => "paragraph",
            StyleType::Character => "character",
            StyleType::Table => "table",
        }
    }
}

/// A Word style definition
#[derive(Debug, Clone, PartialEq)]
pub struct Style {
    /// Style ID (used in document references)
    pub id: String,
    /// Display name
    pub name: String,
    /// Style type
    pub style_type: StyleType,
    /// Base style ID (for inheritance)
    pub based_on: Option<String>,
    /// Next style ID (for following paragraphs)
    pub next: Option<String>,
    /// Default style of its type
    pub is_default: bool,
    /// Paragraph properties
    pub paragraph: ParagraphProps,
    /// Run properties
    pub run: RunProps,
    /// Single-line borders on every edge (table styles)
    pub bordered: bool,
}

impl Style {
    fn paragraph(id: &str, name: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            style_type: StyleType::Paragraph,
            based_on: None,
            next: None,
            is_default: false,
            paragraph: ParagraphProps::default(),
            run: RunProps::default(),
            bordered: false,
        }
    }

    fn table(id: &str, name: &str, bordered: bool) -> Self {
        Self {
            style_type: StyleType::Table,
            based_on: Some("TableNormal".to_string()),
            bordered,
            ..Self::paragraph(id, name)
        }
    }

    fn based_on(mut self, id: &str) -> Self {
        self.based_on = Some(id.to_string());
        self
    }

    fn write(&self, out: &mut String) {
        out.push_str(&format!(
            r#"<w:style w:type="{}""#,
            self.style_type.as_str()
        ));
        if self.is_default {
            out.push_str(r#" w:default="1""#);
        }
        out.push_str(&format!(r#" w:styleId="{}">"#, escape_xml(&self.id)));
        out.push_str(&format!(r#"<w:name w:val="{}"/>"#, escape_xml(&self.name)));
        if let Some(base) = &self.based_on {
            out.push_str(&format!(r#"<w:basedOn w:val="{}"/>"#, escape_xml(base)));
        }
        if let Some(next) = &self.next {
            out.push_str(&format!(r#"<w:next w:val="{}"/>"#, escape_xml(next)));
        }
        out.push_str("<w:qFormat/>");
        self.paragraph.write(out);
        self.run.write(out);
        if self.style_type == StyleType::Table {
            out.push_str(r#"<w:tblPr><w:tblInd w:w="0" w:type="dxa"/>"#);
            if self.bordered {
                out.push_str("<w:tblBorders>");
                for edge in ["top", "left", "bottom", "right", "insideH", "insideV"] {
                    out.push_str(&format!(
                        r#"<w:{} w:val="single" w:sz="4" w:space="0" w:color="auto"/>"#,
                        edge
                    ));
                }
                out.push_str("</w:tblBorders>");
            }
            out.push_str(
                r#"<w:tblCellMar><w:left w:w="108" w:type="dxa"/><w:right w:w="108" w:type="dxa"/></w:tblCellMar></w:tblPr>"#,
            );
        }
        out.push_str("</w:style>");
    }
}

/// Builds the document-wide style registry
#[derive(Debug, Clone)]
pub struct StyleEngine {
    styles: BTreeMap<String, Style>,
    default_font: String,
    default_size: f64,
    page: PageSetup,
    header_footer: HeaderFooter,
}

impl Default for StyleEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl StyleEngine {
    /// Registry seeded with the base styles every render needs
    pub fn new() -> Self {
        let mut engine = Self {
            styles: BTreeMap::new(),
            default_font: String::new(),
            default_size: 0.0,
            page: PageSetup::letter(),
            header_footer: HeaderFooter {
                show_page_numbers: false,
                ..HeaderFooter::default()
            },
        };

        let mut table_normal = Style::table("TableNormal", "Normal Table", false);
        table_normal.based_on = None;
        table_normal.is_default = true;
        engine.insert(table_normal);
        engine.insert(Style::table("TableGrid", "Table Grid", true));
        engine.insert(Style::table("LightGridAccent1", "Light Grid Accent 1", true));
        engine.insert(Style::table("LightListAccent1", "Light List Accent 1", false));

        let mut list = Style::paragraph("ListParagraph", "List Paragraph").based_on("Normal");
        list.paragraph.indent_left = Some(720);
        engine.insert(list);
        engine.insert(Style::paragraph("Header", "header").based_on("Normal"));
        engine.insert(Style::paragraph("Footer", "footer").based_on("Normal"));

        engine.apply_styling(&DocumentStyling::default());
        engine
    }

    fn insert(&mut self, style: Style) {
        self.styles.insert(style.id.clone(), style);
    }

    /// Apply fonts, sizes and heading appearance
    pub fn apply_styling(&mut self, styling: &DocumentStyling) -> &mut Self {
        self.default_font = styling.default_font.clone();
        self.default_size = styling.default_font_size;

        let mut normal = Style::paragraph("Normal", "Normal");
        normal.is_default = true;
        normal.paragraph.line = Some((styling.line_spacing * 240.0).round() as i64);
        normal.run = RunProps::default()
            .font(styling.default_font.clone())
            .sized(styling.default_font_size);
        self.insert(normal);

        let mut title = Style::paragraph("Title", "Title").based_on("Normal");
        title.next = Some("Normal".to_string());
        title.paragraph.spacing_after = Some(pt_to_twips(12.0));
        title.paragraph.justification = Some("center");
        title.run = RunProps::bold()
            .font(styling.heading_font.clone())
            .sized(styling.heading_1_size + 8.0);
        self.insert(title);

        for level in 1..=4u8 {
            let (size, bold, color) = styling.heading(level);
            let mut heading = Style::paragraph(
                &format!("Heading{}", level),
                &format!("heading {}", level),
            )
            .based_on("Normal");
            heading.next = Some("Normal".to_string());
            heading.paragraph.keep_next = true;
            heading.paragraph.spacing_before = Some(pt_to_twips(12.0));
            heading.paragraph.spacing_after = Some(pt_to_twips(6.0));
            heading.paragraph.outline_level = Some(level - 1);
            heading.run = RunProps {
                bold,
                color: color.map(|c| c.trim_start_matches('#').to_uppercase()),
                ..RunProps::default()
            }
            .font(styling.heading_font.clone())
            .sized(size);
            self.insert(heading);
        }

        log::debug!("applied styling: {} {}pt", styling.default_font, styling.default_font_size);
        self
    }

    /// Apply page size and margins
    pub fn setup_page_layout(&mut self, page: &PageSetup) -> &mut Self {
        self.page = page.clone();
        log::debug!(
            "page layout {}x{}in{}",
            page.page_width,
            page.page_height,
            if page.is_landscape() { " (landscape)" } else { "" }
        );
        self
    }

    /// Apply header text, footer text and page numbering
    pub fn apply_header_footer(&mut self, header_footer: &HeaderFooter) -> &mut Self {
        self.header_footer = header_footer.clone();
        self
    }

    /// Drop a style from the registry
    pub fn remove_style(&mut self, id: &str) -> Option<Style> {
        self.styles.remove(id)
    }

    /// Freeze the registry
    pub fn finish(&self) -> DocumentStyles {
        DocumentStyles {
            styles: self.styles.clone(),
            default_font: self.default_font.clone(),
            default_size: self.default_size,
            page: self.page.clone(),
            header_footer: self.header_footer.clone(),
        }
    }
}

/// The immutable style table of a rendered document
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentStyles {
    styles: BTreeMap<String, Style>,
    default_font: String,
    default_size: f64,
    page: PageSetup,
    header_footer: HeaderFooter,
}

impl DocumentStyles {
    /// Get a style by ID
    pub fn get(&self, id: &str) -> Option<&Style> {
        self.styles.get(id)
    }

    /// Check if a style exists
    pub fn contains(&self, id: &str) -> bool {
        self.styles.contains_key(id)
    }

    /// Get a style the builders depend on
    pub fn require(&self, id: &str) -> Result<&Style> {
        self.styles
            .get(id)
            .ok_or_else(|| RenderError::StyleNotFound(id.to_string()))
    }

    /// All style IDs in sorted order
    pub fn style_ids(&self) -> impl Iterator<Item = &str> {
        self.styles.keys().map(|s| s.as_str())
    }

    /// Page geometry
    pub fn page(&self) -> &PageSetup {
        &self.page
    }

    /// Body width in twips
    pub fn content_width_twips(&self) -> i64 {
        inches_to_twips(self.page.content_width())
    }

    /// Serialize word/styles.xml
    pub fn styles_xml(&self) -> String {
        let mut out = String::new();
        out.push_str(XML_DECLARATION);
        out.push('\n');
        out.push_str(&format!(r#"<w:styles xmlns:w="{}">"#, W_NS));

        let font = escape_xml(&self.default_font);
        out.push_str("<w:docDefaults><w:rPrDefault><w:rPr>");
        out.push_str(&format!(
            r#"<w:rFonts w:ascii="{0}" w:hAnsi="{0}" w:eastAsia="{0}" w:cs="{0}"/>"#,
            font
        ));
        out.push_str(&format!(
            r#"<w:sz w:val="{0}"/><w:szCs w:val="{0}"/>"#,
            half_points(self.default_size)
        ));
        out.push_str("</w:rPr></w:rPrDefault><w:pPrDefault/></w:docDefaults>");

        for style in self.styles.values() {
            style.write(&mut out);
        }
        out.push_str("</w:styles>");
        out
    }

    /// Serialize the header part, if the document has one
    pub fn header_xml(&self) -> Option<String> {
        let hf = &self.header_footer;
        let page_in_header =
            hf.show_page_numbers && hf.page_number_position == PageNumberPosition::HeaderRight;
        let text = hf.header_text.as_deref().filter(|t| !t.is_empty());
        if text.is_none() && !page_in_header {
            return None;
        }

        let mut out = part_open("w:hdr");
        if let Some(text) = text {
            let jc = if page_in_header { "left" } else { "right" };
            let props = ParagraphProps {
                justification: Some(jc),
                ..ParagraphProps::styled("Header")
            };
            out.push_str("<w:p>");
            props.write(&mut out);
            write_run(&mut out, text, &header_footer_run());
            out.push_str("</w:p>");
        }
        if page_in_header {
            let props = ParagraphProps {
                justification: Some("right"),
                ..ParagraphProps::styled("Header")
            };
            out.push_str("<w:p>");
            props.write(&mut out);
            self.write_page_number(&mut out);
            out.push_str("</w:p>");
        }
        out.push_str("</w:hdr>");
        Some(out)
    }

    /// Serialize the footer part, if the document has one
    pub fn footer_xml(&self) -> Option<String> {
        let hf = &self.header_footer;
        let page_in_footer = hf.show_page_numbers && hf.page_number_position.in_footer();
        let text = hf.footer_text.as_deref().filter(|t| !t.is_empty());
        if text.is_none() && !page_in_footer {
            return None;
        }

        let jc = match hf.page_number_position {
            PageNumberPosition::FooterCenter => "center",
            _ => "right",
        };
        let props = ParagraphProps {
            justification: Some(jc),
            ..ParagraphProps::styled("Footer")
        };

        let mut out = part_open("w:ftr");
        out.push_str("<w:p>");
        props.write(&mut out);
        if let Some(text) = text {
            write_run(&mut out, text, &header_footer_run());
            if page_in_footer {
                write_run(&mut out, "  |  ", &header_footer_run());
            }
        }
        if page_in_footer {
            self.write_page_number(&mut out);
        }
        out.push_str("</w:p></w:ftr>");
        Some(out)
    }

    fn write_page_number(&self, out: &mut String) {
        let run = header_footer_run();
        write_run(out, "Page ", &run);
        write_field(out, "PAGE", &run);
        if self.header_footer.include_total_pages {
            write_run(out, " of ", &run);
            write_field(out, "NUMPAGES", &run);
        }
    }

    /// Append the body-level `<w:sectPr>`
    pub fn write_sect_pr(&self, out: &mut String, header_rel: Option<&str>, footer_rel: Option<&str>) {
        let page = &self.page;
        out.push_str("<w:sectPr>");
        if let Some(id) = header_rel {
            out.push_str(&format!(
                r#"<w:headerReference w:type="default" r:id="{}"/>"#,
                escape_xml(id)
            ));
        }
        if let Some(id) = footer_rel {
            out.push_str(&format!(
                r#"<w:footerReference w:type="default" r:id="{}"/>"#,
                escape_xml(id)
            ));
        }
        out.push_str(&format!(
            r#"<w:pgSz w:w="{}" w:h="{}""#,
            inches_to_twips(page.page_width),
            inches_to_twips(page.page_height)
        ));
        if page.is_landscape() {
            out.push_str(r#" w:orient="landscape""#);
        }
        out.push_str("/>");
        out.push_str(&format!(
            r#"<w:pgMar w:top="{}" w:right="{}" w:bottom="{}" w:left="{}" w:header="{}" w:footer="{}" w:gutter="0"/>"#,
            inches_to_twips(page.margin_top),
            inches_to_twips(page.margin_right),
            inches_to_twips(page.margin_bottom),
            inches_to_twips(page.margin_left),
            HEADER_FOOTER_DISTANCE,
            HEADER_FOOTER_DISTANCE
        ));
        out.push_str(r#"<w:cols w:space="720"/></w:sectPr>"#);
    }
}

fn header_footer_run() -> RunProps {
    RunProps::default()
        .font(HEADER_FOOTER_FONT)
        .sized(HEADER_FOOTER_SIZE)
}

fn write_field(out: &mut String, instr: &str, run: &RunProps) {
    out.push_str(&format!(r#"<w:fldSimple w:instr=" {} ">"#, instr));
    write_run(out, "1", run);
    out.push_str("</w:fldSimple>");
}

fn part_open(root: &str) -> String {
    let mut out = String::new();
    out.push_str(XML_DECLARATION);
    out.push('\n');
    out.push_str(&format!(
        r#"<{} xmlns:w="{}" xmlns:r="{}">"#,
        root, W_NS, R_NS
    ));
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seeded_styles() {
        let styles = StyleEngine::new().finish();
        for id in [
            "Normal",
            "Title",
            "Heading1",
            "Heading4",
            "TableGrid",
            "ListParagraph",
            "Header",
            "Footer",
        ] {
            assert!(styles.contains(id), "missing {}", id);
        }
    }

    #[test]
    fn test_require_missing_style() {
        let mut engine = StyleEngine::new();
        engine.remove_style("Heading2");
        let styles = engine.finish();
        match styles.require("Heading2") {
            Err(RenderError::StyleNotFound(id)) => assert_eq!(id, "Heading2"),
            other => panic!("expected StyleNotFound, got {:?}", other),
        }
    }

    #[test]
    fn test_apply_styling_is_idempotent() {
        let styling = DocumentStyling {
            default_font: "Calibri".to_string(),
            heading_2_color: Some("#1f3864".to_string()),
            ..DocumentStyling::default()
        };

        let mut once = StyleEngine::new();
        once.apply_styling(&styling);

        let mut twice = StyleEngine::new();
        twice.apply_styling(&styling).apply_styling(&styling);

        assert_eq!(once.finish(), twice.finish());
        assert_eq!(once.finish().styles_xml(), twice.finish().styles_xml());
    }

    #[test]
    fn test_heading_styles_follow_config() {
        let styling = DocumentStyling {
            heading_font: "Georgia".to_string(),
            heading_2_color: Some("#1f3864".to_string()),
            ..DocumentStyling::default()
        };
        let mut engine = StyleEngine::new();
        engine.apply_styling(&styling);
        let styles = engine.finish();

        let h2 = styles.get("Heading2").unwrap();
        assert_eq!(h2.run.size, Some(14.0));
        assert!(h2.run.bold);
        assert_eq!(h2.run.color.as_deref(), Some("1F3864"));
        assert_eq!(h2.run.font.as_deref(), Some("Georgia"));
        assert_eq!(h2.paragraph.outline_level, Some(1));

        let h4 = styles.get("Heading4").unwrap();
        assert!(!h4.run.bold);
    }

    #[test]
    fn test_normal_line_spacing() {
        let styles = StyleEngine::new().finish();
        let xml = styles.styles_xml();
        assert!(xml.contains(r#"w:line="276""#));
        assert!(xml.contains(r#"<w:sz w:val="22"/>"#));
    }

    #[test]
    fn test_sect_pr_letter_portrait() {
        let styles = StyleEngine::new().finish();
        let mut out = String::new();
        styles.write_sect_pr(&mut out, None, None);
        assert!(out.contains(r#"<w:pgSz w:w="12240" w:h="15840"/>"#));
        assert!(out.contains(r#"w:top="1440""#));
        assert!(!out.contains("landscape"));
    }

    #[test]
    fn test_sect_pr_landscape_and_references() {
        let mut engine = StyleEngine::new();
        engine.setup_page_layout(&PageSetup {
            page_width: 11.0,
            page_height: 8.5,
            ..PageSetup::letter()
        });
        let mut out = String::new();
        engine.finish().write_sect_pr(&mut out, Some("rId7"), Some("rId8"));
        assert!(out.contains(r#"w:orient="landscape""#));
        assert!(out.contains(r#"<w:headerReference w:type="default" r:id="rId7"/>"#));
        assert!(out.contains(r#"<w:footerReference w:type="default" r:id="rId8"/>"#));
    }

    #[test]
    fn test_footer_with_text_and_total_pages() {
        let mut engine = StyleEngine::new();
        engine.apply_header_footer(&HeaderFooter {
            footer_text: Some("Confidential".to_string()),
            show_page_numbers: true,
            page_number_position: PageNumberPosition::FooterCenter,
            include_total_pages: true,
            ..HeaderFooter::default()
        });
        let styles = engine.finish();

        let footer = styles.footer_xml().unwrap();
        assert!(footer.contains(r#"<w:jc w:val="center"/>"#));
        assert!(footer.contains("Confidential"));
        assert!(footer.contains("  |  "));
        assert!(footer.contains(r#"w:instr=" PAGE ""#));
        assert!(footer.contains(r#"w:instr=" NUMPAGES ""#));
        assert!(styles.header_xml().is_none());
    }

    #[test]
    fn test_page_number_in_header() {
        let mut engine = StyleEngine::new();
        engine.apply_header_footer(&HeaderFooter {
            header_text: Some("Protocol ABC-123".to_string()),
            show_page_numbers: true,
            page_number_position: PageNumberPosition::HeaderRight,
            ..HeaderFooter::default()
        });
        let styles = engine.finish();

        let header = styles.header_xml().unwrap();
        assert!(header.contains(r#"<w:jc w:val="left"/>"#));
        assert!(header.contains(r#"w:instr=" PAGE ""#));
        assert!(!header.contains("NUMPAGES"));
        assert!(styles.footer_xml().is_none());
    }

    #[test]
    fn test_no_header_or_footer_without_content() {
        let mut engine = StyleEngine::new();
        engine.apply_header_footer(&HeaderFooter {
            show_page_numbers: false,
            ..HeaderFooter::default()
        });
        let styles = engine.finish();
        assert!(styles.header_xml().is_none());
        assert!(styles.footer_xml().is_none());
    }

    #[test]
    fn test_content_width() {
        let mut engine = StyleEngine::new();
        engine.setup_page_layout(&PageSetup::letter());
        assert_eq!(engine.finish().content_width_twips(), 9360);
    }
}
