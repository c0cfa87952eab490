//! Section and paragraph builder
//!
//! Headings, paragraphs with inline character formatting, page breaks and
//! signature blocks.

use trialdoc_uif::{Alignment, InlineFormat, SignatureBlock};

use crate::error::Result;
use crate::styles::DocumentStyles;
use crate::xml::{pt_to_twips, write_paragraph, write_run, ParagraphProps, RunProps};

/// Space before headings, in points, for levels 1-4
pub const HEADING_SPACING_BEFORE: [f64; 4] = [24.0, 18.0, 12.0, 12.0];

/// Space after headings, in points, for levels 1-4
pub const HEADING_SPACING_AFTER: [f64; 4] = [12.0, 6.0, 6.0, 6.0];

/// Underscores per inch of signature line
const SIGNATURE_CHARS_PER_INCH: f64 = 20.0;

/// A contiguous run of text sharing one set of flags
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormattedRun {
    /// Start character index (inclusive)
    pub start: usize,
    /// End character index (exclusive)
    pub end: usize,
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
}

impl FormattedRun {
    fn flags(&self) -> (bool, bool, bool) {
        (self.bold, self.italic, self.underline)
    }
}

/// Merge possibly overlapping ranges over a text of `len` characters
///
/// Ranges are clamped to the text and empty ones dropped. Each character
/// takes the union of the flags of every range covering it, and equal
/// neighbours are joined, so the result is the minimal run list covering
/// `0..len`.
pub fn merge_format_ranges(len: usize, ranges: &[InlineFormat]) -> Vec<FormattedRun> {
    if len == 0 {
        return Vec::new();
    }

    let mut ranges: Vec<(usize, usize, &InlineFormat)> = ranges
        .iter()
        .map(|r| (r.start.min(len), r.end.min(len), r))
        .filter(|(start, end, _)| start < end)
        .collect();
    ranges.sort_by_key(|(start, end, _)| (*start, *end));

    let mut flags = vec![(false, false, false); len];
    for (start, end, range) in &ranges {
        for slot in &mut flags[*start..*end] {
            slot.0 |= range.bold;
            slot.1 |= range.italic;
            slot.2 |= range.underline;
        }
    }

    let mut runs: Vec<FormattedRun> = Vec::new();
    for (i, (bold, italic, underline)) in flags.into_iter().enumerate() {
        match runs.last_mut() {
            Some(run) if run.flags() == (bold, italic, underline) => run.end = i + 1,
            _ => runs.push(FormattedRun {
                start: i,
                end: i + 1,
                bold,
                italic,
                underline,
            }),
        }
    }
    runs
}

/// Renders headings, paragraphs and the other text-level blocks
pub struct SectionBuilder<'a> {
    styles: &'a DocumentStyles,
}

impl<'a> SectionBuilder<'a> {
    pub fn new(styles: &'a DocumentStyles) -> Self {
        Self { styles }
    }

    /// Document title: centered, in the Title style
    pub fn write_title(&self, out: &mut String, title: &str) -> Result<()> {
        let style = self.styles.require("Title")?;
        let props = ParagraphProps::styled(style.id.clone()).aligned(Alignment::Center);
        write_paragraph(out, &props, title, &RunProps::default());
        Ok(())
    }

    /// Heading paragraph; the level is clamped to 1-4
    ///
    /// Text is trimmed. An empty heading produces an empty paragraph.
    pub fn write_heading(
        &self,
        out: &mut String,
        text: &str,
        level: u8,
        alignment: Alignment,
    ) -> Result<()> {
        let text = text.trim();
        if text.is_empty() {
            out.push_str("<w:p/>");
            return Ok(());
        }

        let level = level.clamp(1, 4);
        let style = self.styles.require(&format!("Heading{}", level))?;
        let index = usize::from(level - 1);
        let mut props = ParagraphProps::styled(style.id.clone());
        props.spacing_before = Some(pt_to_twips(HEADING_SPACING_BEFORE[index]));
        props.spacing_after = Some(pt_to_twips(HEADING_SPACING_AFTER[index]));
        if alignment != Alignment::Left {
            props = props.aligned(alignment);
        }
        write_paragraph(out, &props, text, &RunProps::default());
        Ok(())
    }

    /// Body paragraph with optional inline formatting ranges
    ///
    /// Content is trimmed; range indices count characters of the trimmed
    /// text. Spacing is in points and only written when positive.
    pub fn write_paragraph(
        &self,
        out: &mut String,
        content: &str,
        ranges: &[InlineFormat],
        alignment: Alignment,
        spacing_before: u32,
        spacing_after: u32,
    ) {
        let content = content.trim();
        let mut props = ParagraphProps::default().aligned(alignment);
        if spacing_before > 0 {
            props.spacing_before = Some(pt_to_twips(f64::from(spacing_before)));
        }
        if spacing_after > 0 {
            props.spacing_after = Some(pt_to_twips(f64::from(spacing_after)));
        }

        if ranges.is_empty() {
            write_paragraph(out, &props, content, &RunProps::default());
            return;
        }

        out.push_str("<w:p>");
        props.write(out);
        let chars: Vec<char> = content.chars().collect();
        for run in merge_format_ranges(chars.len(), ranges) {
            let text: String = chars[run.start..run.end].iter().collect();
            let run_props = RunProps {
                bold: run.bold,
                italic: run.italic,
                underline: run.underline,
                ..RunProps::default()
            };
            write_run(out, &text, &run_props);
        }
        out.push_str("</w:p>");
    }

    /// Hard page break
    pub fn write_page_break(&self, out: &mut String) {
        out.push_str(r#"<w:p><w:r><w:br w:type="page"/></w:r></w:p>"#);
    }

    /// Preamble paragraph followed by one "Label: ____" paragraph per line
    ///
    /// Lines never run wider than the page body.
    pub fn write_signature(&self, out: &mut String, signature: &SignatureBlock) {
        let max_inches = self.styles.page().content_width().max(0.0);
        if let Some(preamble) = signature.preamble.as_deref().filter(|p| !p.is_empty()) {
            write_paragraph(out, &ParagraphProps::default(), preamble, &RunProps::default());
        }

        let props = ParagraphProps {
            spacing_after: Some(pt_to_twips(12.0)),
            ..ParagraphProps::default()
        };
        for line in &signature.lines {
            let inches = line.line_width_inches.clamp(0.0, max_inches);
            let width = (inches * SIGNATURE_CHARS_PER_INCH) as usize;
            out.push_str("<w:p>");
            props.write(out);
            write_run(out, &format!("{}: ", line.label), &RunProps::bold());
            write_run(out, &"_".repeat(width), &RunProps::default());
            out.push_str("</w:p>");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::styles::StyleEngine;
    use trialdoc_uif::SignatureLine;

    fn run(start: usize, end: usize, bold: bool, italic: bool) -> FormattedRun {
        FormattedRun {
            start,
            end,
            bold,
            italic,
            underline: false,
        }
    }

    #[test]
    fn test_overlapping_ranges_merge() {
        let ranges = vec![InlineFormat::bold(0, 5), InlineFormat::italic(3, 8)];
        let runs = merge_format_ranges(10, &ranges);
        assert_eq!(
            runs,
            vec![
                run(0, 3, true, false),
                run(3, 5, true, true),
                run(5, 8, false, true),
                run(8, 10, false, false),
            ]
        );
    }

    #[test]
    fn test_ranges_clamped_and_empty_dropped() {
        let ranges = vec![InlineFormat::bold(4, 4), InlineFormat::italic(2, 99)];
        let runs = merge_format_ranges(5, &ranges);
        assert_eq!(runs, vec![run(0, 2, false, false), run(2, 5, false, true)]);
    }

    #[test]
    fn test_adjacent_equal_ranges_join() {
        let ranges = vec![InlineFormat::bold(0, 2), InlineFormat::bold(2, 4)];
        let runs = merge_format_ranges(4, &ranges);
        assert_eq!(runs, vec![run(0, 4, true, false)]);
    }

    #[test]
    fn test_empty_text_has_no_runs() {
        assert!(merge_format_ranges(0, &[InlineFormat::bold(0, 3)]).is_empty());
    }

    #[test]
    fn test_heading_level_clamped() {
        let styles = StyleEngine::new().finish();
        let builder = SectionBuilder::new(&styles);
        let mut out = String::new();
        builder.write_heading(&mut out, "Deep", 7, Alignment::Left).unwrap();
        assert!(out.contains(r#"<w:pStyle w:val="Heading4"/>"#));
        assert!(out.contains(r#"w:before="240" w:after="120""#));
    }

    #[test]
    fn test_heading_spacing_level_one() {
        let styles = StyleEngine::new().finish();
        let mut out = String::new();
        SectionBuilder::new(&styles)
            .write_heading(&mut out, "Intro", 1, Alignment::Left)
            .unwrap();
        assert!(out.contains(r#"w:before="480" w:after="240""#));
    }

    #[test]
    fn test_empty_heading_is_empty_paragraph() {
        let styles = StyleEngine::new().finish();
        let mut out = String::new();
        SectionBuilder::new(&styles)
            .write_heading(&mut out, "", 2, Alignment::Left)
            .unwrap();
        assert_eq!(out, "<w:p/>");
    }

    #[test]
    fn test_missing_heading_style_is_error() {
        let mut engine = StyleEngine::new();
        engine.remove_style("Heading1");
        let styles = engine.finish();
        let mut out = String::new();
        let err = SectionBuilder::new(&styles)
            .write_heading(&mut out, "Intro", 1, Alignment::Left)
            .unwrap_err();
        assert_eq!(err.to_string(), "Style not found: Heading1");
    }

    #[test]
    fn test_paragraph_trimmed_and_spaced() {
        let styles = StyleEngine::new().finish();
        let mut out = String::new();
        SectionBuilder::new(&styles).write_paragraph(
            &mut out,
            "  Study visits  ",
            &[],
            Alignment::Justify,
            6,
            0,
        );
        assert!(out.contains(r#"<w:spacing w:before="120"/>"#));
        assert!(out.contains(r#"<w:jc w:val="both"/>"#));
        assert!(out.contains(">Study visits</w:t>"));
    }

    #[test]
    fn test_formatted_paragraph_runs() {
        let styles = StyleEngine::new().finish();
        let mut out = String::new();
        SectionBuilder::new(&styles).write_paragraph(
            &mut out,
            "Do not eat",
            &[InlineFormat::bold(0, 6)],
            Alignment::Left,
            0,
            0,
        );
        assert_eq!(out.matches("<w:r>").count(), 2);
        assert!(out.contains(r#"<w:b/></w:rPr><w:t xml:space="preserve">Do not</w:t>"#));
    }

    #[test]
    fn test_multibyte_ranges_index_characters() {
        let styles = StyleEngine::new().finish();
        let mut out = String::new();
        SectionBuilder::new(&styles).write_paragraph(
            &mut out,
            "Café ok",
            &[InlineFormat::italic(0, 4)],
            Alignment::Left,
            0,
            0,
        );
        assert!(out.contains(">Café</w:t>"));
    }

    #[test]
    fn test_signature_lines() {
        let styles = StyleEngine::new().finish();
        let signature = SignatureBlock {
            preamble: Some("By signing below:".to_string()),
            lines: vec![SignatureLine {
                label: "Participant".to_string(),
                line_width_inches: 2.0,
            }],
        };
        let mut out = String::new();
        SectionBuilder::new(&styles).write_signature(&mut out, &signature);
        assert!(out.contains("By signing below:"));
        assert!(out.contains(">Participant: </w:t>"));
        assert!(out.contains(&format!(">{}</w:t>", "_".repeat(40))));
        assert!(out.contains(r#"<w:spacing w:after="240"/>"#));
    }

    #[test]
    fn test_signature_line_limited_to_body_width() {
        let styles = StyleEngine::new().finish();
        let signature = SignatureBlock {
            preamble: None,
            lines: vec![
                SignatureLine {
                    label: "Witness".to_string(),
                    line_width_inches: 1.0e12,
                },
                SignatureLine {
                    label: "Date".to_string(),
                    line_width_inches: -3.0,
                },
            ],
        };
        let mut out = String::new();
        SectionBuilder::new(&styles).write_signature(&mut out, &signature);

        // Letter body is 6.5in wide
        assert!(out.contains(&format!(">{}</w:t>", "_".repeat(130))));
        assert!(!out.contains(&"_".repeat(131)));
        assert!(out.contains(">Date: </w:t>"));
    }

    #[test]
    fn test_heading_text_trimmed() {
        let styles = StyleEngine::new().finish();
        let mut out = String::new();
        SectionBuilder::new(&styles)
            .write_heading(&mut out, "  Risks \n", 2, Alignment::Left)
            .unwrap();
        assert!(out.contains(r#"<w:t xml:space="preserve">Risks</w:t>"#));

        let mut blank = String::new();
        SectionBuilder::new(&styles)
            .write_heading(&mut blank, "   ", 1, Alignment::Left)
            .unwrap();
        assert_eq!(blank, "<w:p/>");
    }

    #[test]
    fn test_title_is_centered() {
        let styles = StyleEngine::new().finish();
        let mut out = String::new();
        SectionBuilder::new(&styles)
            .write_title(&mut out, "Consent Form")
            .unwrap();
        assert!(out.contains(r#"<w:pStyle w:val="Title"/>"#));
        assert!(out.contains(r#"<w:jc w:val="center"/>"#));
    }
}
