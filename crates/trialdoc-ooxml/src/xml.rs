//! WordprocessingML fragments shared by the builders
//!
//! Everything here appends to a `String`; the builders assemble parts by
//! pushing fragments in schema order.

use trialdoc_uif::Alignment;

/// WordprocessingML main namespace
pub const W_NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";

/// Office document relationships namespace
pub const R_NS: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";

/// Standard XML declaration used for every generated part
pub const XML_DECLARATION: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#;

/// True for characters XML 1.0 does not allow anywhere in a document
pub fn is_xml_illegal(ch: char) -> bool {
    matches!(
        ch,
        '\u{0}'..='\u{8}' | '\u{B}' | '\u{C}' | '\u{E}'..='\u{1F}' | '\u{FFFE}' | '\u{FFFF}'
    )
}

/// Escape special XML characters, dropping characters XML cannot carry
pub fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            c if is_xml_illegal(c) => {}
            c => out.push(c),
        }
    }
    out
}

/// Points to twentieths of a point
pub fn pt_to_twips(pt: f64) -> i64 {
    (pt * 20.0).round() as i64
}

/// Inches to twentieths of a point
pub fn inches_to_twips(inches: f64) -> i64 {
    (inches * 1440.0).round() as i64
}

/// Points to the half-point unit used by `w:sz`
pub fn half_points(pt: f64) -> i64 {
    (pt * 2.0).round() as i64
}

/// `w:jc` value for a paragraph alignment
pub fn justification(alignment: Alignment) -> &'static str {
    match alignment {
        Alignment::Left => "left",
        Alignment::Center => "center",
        Alignment::Right => "right",
        Alignment::Justify => "both",
    }
}

/// Character formatting for a single run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunProps {
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
    pub strike: bool,
    pub superscript: bool,
    pub subscript: bool,
    pub font: Option<String>,
    /// Size in points
    pub size: Option<f64>,
    /// Six-digit hex color without '#'
    pub color: Option<String>,
}

impl RunProps {
    /// Bold run
    pub fn bold() -> Self {
        Self {
            bold: true,
            ..Self::default()
        }
    }

    /// Set the size in points
    pub fn sized(mut self, pt: f64) -> Self {
        self.size = Some(pt);
        self
    }

    /// Set the font family
    pub fn font(mut self, font: impl Into<String>) -> Self {
        self.font = Some(font.into());
        self
    }

    /// True when no property would be written
    pub fn is_plain(&self) -> bool {
        *self == Self::default()
    }

    /// Append `<w:rPr>` (nothing when plain)
    pub fn write(&self, out: &mut String) {
        if self.is_plain() {
            return;
        }
        out.push_str("<w:rPr>");
        if let Some(font) = &self.font {
            let font = escape_xml(font);
            out.push_str(&format!(
                r#"<w:rFonts w:ascii="{0}" w:hAnsi="{0}" w:eastAsia="{0}" w:cs="{0}"/>"#,
                font
            ));
        }
        if self.bold {
            out.push_str("<w:b/>");
        }
        if self.italic {
            out.push_str("<w:i/>");
        }
        if self.strike {
            out.push_str("<w:strike/>");
        }
        if let Some(color) = &self.color {
            out.push_str(&format!(r#"<w:color w:val="{}"/>"#, escape_xml(color)));
        }
        if let Some(size) = self.size {
            let sz = half_points(size);
            out.push_str(&format!(r#"<w:sz w:val="{0}"/><w:szCs w:val="{0}"/>"#, sz));
        }
        if self.underline {
            out.push_str(r#"<w:u w:val="single"/>"#);
        }
        if self.superscript {
            out.push_str(r#"<w:vertAlign w:val="superscript"/>"#);
        } else if self.subscript {
            out.push_str(r#"<w:vertAlign w:val="subscript"/>"#);
        }
        out.push_str("</w:rPr>");
    }
}

/// Append a run. Tabs become `<w:tab/>` and newlines `<w:br/>`.
pub fn write_run(out: &mut String, text: &str, props: &RunProps) {
    out.push_str("<w:r>");
    props.write(out);
    write_run_text(out, text);
    out.push_str("</w:r>");
}

fn write_run_text(out: &mut String, text: &str) {
    let mut segment = String::new();
    for ch in text.chars() {
        match ch {
            '\t' | '\n' => {
                flush_text(out, &mut segment);
                out.push_str(if ch == '\t' { "<w:tab/>" } else { "<w:br/>" });
            }
            '\r' => {}
            _ => segment.push(ch),
        }
    }
    flush_text(out, &mut segment);
}

fn flush_text(out: &mut String, segment: &mut String) {
    if segment.is_empty() {
        return;
    }
    out.push_str(&format!(
        r#"<w:t xml:space="preserve">{}</w:t>"#,
        escape_xml(segment)
    ));
    segment.clear();
}

/// Paragraph properties, written in schema order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParagraphProps {
    pub style: Option<String>,
    pub keep_next: bool,
    /// `(numId, ilvl)`
    pub numbering: Option<(u32, usize)>,
    /// Left tab stops in twips
    pub tabs: Vec<i64>,
    pub spacing_before: Option<i64>,
    pub spacing_after: Option<i64>,
    /// Line spacing in 240ths of a line (`auto` rule)
    pub line: Option<i64>,
    pub indent_left: Option<i64>,
    pub hanging: Option<i64>,
    /// `w:jc` value
    pub justification: Option<&'static str>,
    /// 0-based outline level (headings)
    pub outline_level: Option<u8>,
}

impl ParagraphProps {
    /// Properties with only a style
    pub fn styled(style: impl Into<String>) -> Self {
        Self {
            style: Some(style.into()),
            ..Self::default()
        }
    }

    /// Set the justification from a block alignment
    pub fn aligned(mut self, alignment: Alignment) -> Self {
        self.justification = Some(justification(alignment));
        self
    }

    /// Append `<w:pPr>` (nothing when empty)
    pub fn write(&self, out: &mut String) {
        if *self == Self::default() {
            return;
        }
        out.push_str("<w:pPr>");
        if let Some(style) = &self.style {
            out.push_str(&format!(r#"<w:pStyle w:val="{}"/>"#, escape_xml(style)));
        }
        if self.keep_next {
            out.push_str("<w:keepNext/>");
        }
        if let Some((num_id, level)) = self.numbering {
            out.push_str(&format!(
                r#"<w:numPr><w:ilvl w:val="{}"/><w:numId w:val="{}"/></w:numPr>"#,
                level, num_id
            ));
        }
        if !self.tabs.is_empty() {
            out.push_str("<w:tabs>");
            for pos in &self.tabs {
                out.push_str(&format!(r#"<w:tab w:val="left" w:pos="{}"/>"#, pos));
            }
            out.push_str("</w:tabs>");
        }
        if self.spacing_before.is_some() || self.spacing_after.is_some() || self.line.is_some() {
            out.push_str("<w:spacing");
            if let Some(before) = self.spacing_before {
                out.push_str(&format!(r#" w:before="{}""#, before));
            }
            if let Some(after) = self.spacing_after {
                out.push_str(&format!(r#" w:after="{}""#, after));
            }
            if let Some(line) = self.line {
                out.push_str(&format!(r#" w:line="{}" w:lineRule="auto""#, line));
            }
            out.push_str("/>");
        }
        if self.indent_left.is_some() || self.hanging.is_some() {
            out.push_str("<w:ind");
            if let Some(left) = self.indent_left {
                out.push_str(&format!(r#" w:left="{}""#, left));
            }
            if let Some(hanging) = self.hanging {
                out.push_str(&format!(r#" w:hanging="{}""#, hanging));
            }
            out.push_str("/>");
        }
        if let Some(jc) = self.justification {
            out.push_str(&format!(r#"<w:jc w:val="{}"/>"#, jc));
        }
        if let Some(level) = self.outline_level {
            out.push_str(&format!(r#"<w:outlineLvl w:val="{}"/>"#, level));
        }
        out.push_str("</w:pPr>");
    }
}

/// Append a paragraph with a single run (no run when `text` is empty)
pub fn write_paragraph(out: &mut String, props: &ParagraphProps, text: &str, run: &RunProps) {
    out.push_str("<w:p>");
    props.write(out);
    if !text.is_empty() {
        write_run(out, text, run);
    }
    out.push_str("</w:p>");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_xml() {
        assert_eq!(escape_xml("Hello & World"), "Hello &amp; World");
        assert_eq!(escape_xml("<tag>"), "&lt;tag&gt;");
        assert_eq!(escape_xml("\"quoted\""), "&quot;quoted&quot;");
        assert_eq!(escape_xml("it's"), "it&apos;s");
    }

    #[test]
    fn test_escape_xml_drops_control_characters() {
        assert_eq!(escape_xml("a\u{0}b\u{B}c\u{1F}d\u{FFFF}"), "abcd");
        assert_eq!(escape_xml("tab\tline\nend\r"), "tab\tline\nend\r");
    }

    #[test]
    fn test_run_text_has_no_control_characters() {
        let mut out = String::new();
        write_run(&mut out, "Line one\u{B}line two\u{1}", &RunProps::default());
        assert_eq!(
            out,
            r#"<w:r><w:t xml:space="preserve">Line oneline two</w:t></w:r>"#
        );
    }

    #[test]
    fn test_unit_conversions() {
        assert_eq!(pt_to_twips(12.0), 240);
        assert_eq!(inches_to_twips(8.5), 12240);
        assert_eq!(inches_to_twips(8.27), 11909);
        assert_eq!(half_points(11.0), 22);
        assert_eq!(half_points(10.5), 21);
    }

    #[test]
    fn test_plain_run_has_no_properties() {
        let mut out = String::new();
        write_run(&mut out, "Hi", &RunProps::default());
        assert_eq!(out, r#"<w:r><w:t xml:space="preserve">Hi</w:t></w:r>"#);
    }

    #[test]
    fn test_run_property_order() {
        let mut out = String::new();
        let props = RunProps {
            bold: true,
            italic: true,
            underline: true,
            ..RunProps::default()
        }
        .sized(11.0)
        .font("Arial");
        write_run(&mut out, "x", &props);
        let b = out.find("<w:b/>").unwrap();
        let fonts = out.find("<w:rFonts").unwrap();
        let sz = out.find("<w:sz ").unwrap();
        let u = out.find("<w:u ").unwrap();
        assert!(fonts < b && b < sz && sz < u);
    }

    #[test]
    fn test_tab_and_newline_in_run() {
        let mut out = String::new();
        write_run(&mut out, "\u{2022}\tItem\nNext", &RunProps::default());
        assert!(out.contains("<w:t xml:space=\"preserve\">\u{2022}</w:t><w:tab/>"));
        assert!(out.contains("Item</w:t><w:br/>"));
    }

    #[test]
    fn test_empty_paragraph_props_emit_nothing() {
        let mut out = String::new();
        write_paragraph(&mut out, &ParagraphProps::default(), "", &RunProps::default());
        assert_eq!(out, "<w:p></w:p>");
    }

    #[test]
    fn test_paragraph_props_order() {
        let mut out = String::new();
        let props = ParagraphProps {
            style: Some("ListParagraph".to_string()),
            numbering: Some((3, 1)),
            spacing_after: Some(60),
            indent_left: Some(720),
            hanging: Some(360),
            justification: Some("left"),
            ..ParagraphProps::default()
        };
        props.write(&mut out);
        assert_eq!(
            out,
            concat!(
                r#"<w:pPr><w:pStyle w:val="ListParagraph"/>"#,
                r#"<w:numPr><w:ilvl w:val="1"/><w:numId w:val="3"/></w:numPr>"#,
                r#"<w:spacing w:after="60"/><w:ind w:left="720" w:hanging="360"/>"#,
                r#"<w:jc w:val="left"/></w:pPr>"#
            )
        );
    }

    #[test]
    fn test_justify_maps_to_both() {
        assert_eq!(justification(Alignment::Justify), "both");
        assert_eq!(justification(Alignment::Center), "center");
    }
}
