//! List builder (bullet paragraphs and word/numbering.xml)

use trialdoc_uif::{ListItem, ListStyle, RunFormatting};

use crate::error::Result;
use crate::styles::DocumentStyles;
use crate::xml::{pt_to_twips, write_run, ParagraphProps, RunProps, W_NS, XML_DECLARATION};

/// Deepest nesting level (0-based)
pub const MAX_LEVEL: usize = 8;

/// Indent per nesting level, in twips (0.25in)
pub const INDENT_PER_LEVEL: i64 = 360;

/// Hanging indent, in twips (0.25in)
pub const HANGING_INDENT: i64 = 360;

/// Bullet glyphs, cycling by level
pub const BULLET_GLYPHS: [&str; 3] = ["\u{2022}", "\u{25E6}", "\u{25AA}"];

/// Item text size when no formatting sets one
const ITEM_FONT_SIZE: f64 = 11.0;

/// One numbering instance (`w:abstractNum` plus its `w:num`)
#[derive(Debug, Clone, PartialEq)]
pub struct NumberingDefinition {
    /// `w:numId`, also used as the abstract numbering ID
    pub num_id: u32,
    /// `w:numFmt` value
    pub format: &'static str,
    /// Suffix after the number ("." or ")")
    pub suffix: char,
    /// First number at level 0
    pub start: u32,
}

/// `w:numFmt` value and suffix for a numbered list style
fn numbering_format(style: Option<ListStyle>) -> (&'static str, char) {
    match style {
        None | Some(ListStyle::Decimal) => ("decimal", '.'),
        Some(ListStyle::RomanUpper) => ("upperRoman", '.'),
        Some(ListStyle::RomanLower) => ("lowerRoman", '.'),
        Some(ListStyle::LetterUpper) => ("upperLetter", ')'),
        Some(ListStyle::LetterLower) => ("lowerLetter", ')'),
        Some(other) => {
            log::warn!("Unsupported numbering style {:?}, using decimal", other);
            ("decimal", '.')
        }
    }
}

fn clamp_level(item: &ListItem) -> usize {
    let level = usize::from(item.level());
    if level > MAX_LEVEL {
        log::warn!(
            "List item level {} exceeds maximum {}, clamping",
            level,
            MAX_LEVEL
        );
        return MAX_LEVEL;
    }
    level
}

fn item_props(formatting: Option<&RunFormatting>) -> RunProps {
    let mut props = RunProps::default().sized(ITEM_FONT_SIZE);
    let Some(f) = formatting else {
        return props;
    };
    props.bold = f.bold.unwrap_or(false);
    props.italic = f.italic.unwrap_or(false);
    props.underline = f.underline.unwrap_or(false);
    props.strike = f.strike.unwrap_or(false);
    props.superscript = f.superscript.unwrap_or(false);
    props.subscript = f.subscript.unwrap_or(false);
    props.font = f.font_name.clone();
    if let Some(size) = f.font_size {
        props.size = Some(size);
    }
    props
}

/// Renders bullet and numbered lists and owns the numbering definitions
#[derive(Debug)]
pub struct ListBuilder<'a> {
    styles: &'a DocumentStyles,
    definitions: Vec<NumberingDefinition>,
}

impl<'a> ListBuilder<'a> {
    pub fn new(styles: &'a DocumentStyles) -> Self {
        Self {
            styles,
            definitions: Vec::new(),
        }
    }

    /// Numbering definitions allocated so far
    pub fn definitions(&self) -> &[NumberingDefinition] {
        &self.definitions
    }

    fn item_paragraph(&self, level: usize) -> Result<ParagraphProps> {
        let style = self.styles.require("ListParagraph")?;
        let indent = INDENT_PER_LEVEL * (level as i64 + 1);
        Ok(ParagraphProps {
            spacing_before: Some(0),
            spacing_after: Some(pt_to_twips(3.0)),
            line: Some(240),
            indent_left: Some(indent),
            hanging: Some(HANGING_INDENT),
            ..ParagraphProps::styled(style.id.clone())
        })
    }

    /// Bullet items: glyph, tab, then the item text
    pub fn write_bullet_list(&self, out: &mut String, items: &[ListItem]) -> Result<()> {
        if items.is_empty() {
            log::warn!("Bullet list has no items, skipping");
            return Ok(());
        }
        for item in items {
            let level = clamp_level(item);
            let mut props = self.item_paragraph(level)?;
            props.tabs = vec![INDENT_PER_LEVEL * (level as i64 + 1)];

            out.push_str("<w:p>");
            props.write(out);
            let glyph = BULLET_GLYPHS[level % BULLET_GLYPHS.len()];
            write_run(
                out,
                &format!("{}\t", glyph),
                &RunProps::default().sized(ITEM_FONT_SIZE),
            );
            if !item.text().is_empty() {
                write_run(out, item.text(), &item_props(item.formatting()));
            }
            out.push_str("</w:p>");
        }
        Ok(())
    }

    /// Numbered items, backed by a fresh numbering definition
    pub fn write_numbered_list(
        &mut self,
        out: &mut String,
        items: &[ListItem],
        style: Option<ListStyle>,
        start: Option<u32>,
    ) -> Result<()> {
        if items.is_empty() {
            log::warn!("Numbered list has no items, skipping");
            return Ok(());
        }

        let (format, suffix) = numbering_format(style);
        let num_id = self.definitions.len() as u32 + 1;
        self.definitions.push(NumberingDefinition {
            num_id,
            format,
            suffix,
            start: start.unwrap_or(1),
        });

        for item in items {
            let level = clamp_level(item);
            let mut props = self.item_paragraph(level)?;
            props.numbering = Some((num_id, level));

            out.push_str("<w:p>");
            props.write(out);
            if !item.text().is_empty() {
                write_run(out, item.text(), &item_props(item.formatting()));
            }
            out.push_str("</w:p>");
        }
        Ok(())
    }

    /// Serialize word/numbering.xml, if any numbered list was written
    pub fn numbering_xml(&self) -> Option<String> {
        if self.definitions.is_empty() {
            return None;
        }

        let mut out = String::new();
        out.push_str(XML_DECLARATION);
        out.push('\n');
        out.push_str(&format!(r#"<w:numbering xmlns:w="{}">"#, W_NS));

        for def in &self.definitions {
            out.push_str(&format!(
                r#"<w:abstractNum w:abstractNumId="{}"><w:multiLevelType w:val="hybridMultilevel"/>"#,
                def.num_id
            ));
            for level in 0..=MAX_LEVEL {
                let start = if level == 0 { def.start } else { 1 };
                let indent = INDENT_PER_LEVEL * (level as i64 + 1);
                out.push_str(&format!(
                    concat!(
                        r#"<w:lvl w:ilvl="{level}"><w:start w:val="{start}"/>"#,
                        r#"<w:numFmt w:val="{format}"/><w:lvlText w:val="%{n}{suffix}"/>"#,
                        r#"<w:lvlJc w:val="left"/>"#,
                        r#"<w:pPr><w:ind w:left="{indent}" w:hanging="{hanging}"/></w:pPr></w:lvl>"#
                    ),
                    level = level,
                    start = start,
                    format = def.format,
                    n = level + 1,
                    suffix = def.suffix,
                    indent = indent,
                    hanging = HANGING_INDENT,
                ));
            }
            out.push_str("</w:abstractNum>");
        }

        for def in &self.definitions {
            out.push_str(&format!(
                r#"<w:num w:numId="{0}"><w:abstractNumId w:val="{0}"/></w:num>"#,
                def.num_id
            ));
        }

        out.push_str("</w:numbering>");
        Some(out)
    }
}
