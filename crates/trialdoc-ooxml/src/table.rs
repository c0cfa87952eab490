//! Table builder
//!
//! Rows are first laid out on the column grid by [`plan_rows`], which
//! resolves colspans, rowspans and short rows into positioned cells. The
//! builder then serializes the plan.

use trialdoc_uif::{Alignment, TableBlock, TableCell, TableCellValue, VerticalAlignment};

use crate::styles::{DocumentStyles, StyleType};
use crate::xml::{escape_xml, inches_to_twips, justification, write_run, RunProps};

/// Table style used when the requested one is unknown
pub const FALLBACK_TABLE_STYLE: &str = "TableGrid";

/// Header cell text size in points
pub const HEADER_FONT_SIZE: f64 = 11.0;

/// What occupies a slot in the column grid
#[derive(Debug, Clone, PartialEq)]
pub enum CellKind {
    /// A declared cell
    Content(TableCell),
    /// Padding for a row shorter than the table
    Blank,
    /// Continuation of a vertical merge from the row above
    Continue,
}

/// A cell positioned on the column grid
#[derive(Debug, Clone, PartialEq)]
pub struct PlannedCell {
    /// First grid column
    pub column: usize,
    /// Number of grid columns covered
    pub span: usize,
    pub kind: CellKind,
    /// Starts a vertical merge
    pub merge_down: bool,
}

impl PlannedCell {
    /// Text of the cell (empty for blanks and continuations)
    pub fn text(&self) -> &str {
        match &self.kind {
            CellKind::Content(cell) => &cell.content,
            _ => "",
        }
    }
}

/// Lay out data rows on a `num_cols` grid
///
/// Declared cells fill left to right, each consuming its colspan. Columns
/// covered by a rowspan from above are skipped. Rows shorter than the grid
/// are padded with blanks; cells past the last column are dropped with a
/// warning.
pub fn plan_rows(rows: &[Vec<TableCellValue>], num_cols: usize) -> Vec<Vec<PlannedCell>> {
    // Per column: (rows still covered, span of the covering cell)
    let mut covered: Vec<Option<(usize, usize)>> = vec![None; num_cols];
    let mut planned_rows = Vec::with_capacity(rows.len());

    for (r, row) in rows.iter().enumerate() {
        let mut planned = Vec::new();
        let mut cells = row.iter();
        let mut col = 0;

        while col < num_cols {
            if let Some((remaining, span)) = covered[col] {
                covered[col] = if remaining > 1 {
                    Some((remaining - 1, span))
                } else {
                    None
                };
                planned.push(PlannedCell {
                    column: col,
                    span,
                    kind: CellKind::Continue,
                    merge_down: false,
                });
                col += span;
                continue;
            }

            let Some(value) = cells.next() else {
                planned.push(PlannedCell {
                    column: col,
                    span: 1,
                    kind: CellKind::Blank,
                    merge_down: false,
                });
                col += 1;
                continue;
            };

            let end = (col + value.colspan()).min(num_cols);
            let span = (col + 1..end)
                .find(|c| covered[*c].is_some())
                .unwrap_or(end)
                - col;
            let rowspan = value.rowspan().min(rows.len() - r);
            if rowspan > 1 {
                covered[col] = Some((rowspan - 1, span));
            }

            planned.push(PlannedCell {
                column: col,
                span,
                kind: CellKind::Content(value.to_cell()),
                merge_down: rowspan > 1,
            });
            col += span;
        }

        if cells.next().is_some() {
            log::warn!("Row data exceeds number of columns (row {})", r);
        }
        planned_rows.push(planned);
    }

    planned_rows
}

/// Normalize a hex color to six uppercase digits without '#'
///
/// Accepts `#RGB`, `#RRGGBB` and the same without '#'.
pub fn normalize_hex(color: &str) -> Option<String> {
    let hex = color.trim().trim_start_matches('#');
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    match hex.len() {
        6 => Some(hex.to_uppercase()),
        3 => Some(hex.chars().flat_map(|c| [c, c]).collect::<String>().to_uppercase()),
        _ => None,
    }
}

/// Renders table blocks
pub struct TableBuilder<'a> {
    styles: &'a DocumentStyles,
}

impl<'a> TableBuilder<'a> {
    pub fn new(styles: &'a DocumentStyles) -> Self {
        Self { styles }
    }

    /// Resolve a display name ("Table Grid") to a table style ID
    pub fn resolve_style(&self, name: &str) -> String {
        let id: String = name.chars().filter(|c| !c.is_whitespace()).collect();
        match self.styles.get(&id) {
            Some(style) if style.style_type == StyleType::Table => id,
            _ => {
                log::warn!(
                    "Table style '{}' not found, using '{}'",
                    name,
                    FALLBACK_TABLE_STYLE
                );
                FALLBACK_TABLE_STYLE.to_string()
            }
        }
    }

    /// Grid column widths in twips
    fn grid(&self, table: &TableBlock, num_cols: usize) -> Vec<i64> {
        let even = self.styles.content_width_twips() / num_cols as i64;
        let given = table.column_widths.as_deref().unwrap_or(&[]);
        (0..num_cols)
            .map(|i| match given.get(i) {
                Some(inches) if *inches > 0.0 => inches_to_twips(*inches),
                _ => even,
            })
            .collect()
    }

    /// Append a table and the spacer paragraph that follows it
    pub fn write(&self, out: &mut String, table: &TableBlock) {
        if table.is_empty() {
            log::warn!("Table has no headers and no rows, skipping");
            return;
        }
        let num_cols = table.column_count();
        if num_cols == 0 {
            log::warn!("Table has no columns, skipping");
            return;
        }

        let style = self.resolve_style(&table.style);
        let grid = self.grid(table, num_cols);
        let total: i64 = grid.iter().sum();
        let header_fill = if table.header_background.is_empty() {
            None
        } else {
            shading(&table.header_background)
        };

        out.push_str("<w:tbl><w:tblPr>");
        out.push_str(&format!(r#"<w:tblStyle w:val="{}"/>"#, escape_xml(&style)));
        out.push_str(&format!(r#"<w:tblW w:w="{}" w:type="dxa"/>"#, total));
        out.push_str(r#"<w:jc w:val="center"/>"#);
        if table.column_widths.is_some() {
            out.push_str(r#"<w:tblLayout w:type="fixed"/>"#);
        }
        out.push_str(r#"<w:tblLook w:val="04A0" w:firstRow="1" w:lastRow="0" w:firstColumn="1" w:lastColumn="0" w:noHBand="0" w:noVBand="1"/>"#);
        out.push_str("</w:tblPr><w:tblGrid>");
        for width in &grid {
            out.push_str(&format!(r#"<w:gridCol w:w="{}"/>"#, width));
        }
        out.push_str("</w:tblGrid>");

        if !table.headers.is_empty() {
            out.push_str("<w:tr><w:trPr><w:tblHeader/></w:trPr>");
            for (col, header) in table.headers.iter().enumerate() {
                let spec = CellSpec {
                    width: grid[col],
                    span: 1,
                    merge: None,
                    fill: header_fill.as_deref(),
                    valign: VerticalAlignment::Center,
                    alignment: Alignment::Center,
                };
                write_cell(out, &spec, header, &RunProps::bold().sized(HEADER_FONT_SIZE));
            }
            out.push_str("</w:tr>");
        }

        for row in plan_rows(&table.rows, num_cols) {
            out.push_str("<w:tr>");
            for planned in &row {
                let width = grid[planned.column..planned.column + planned.span].iter().sum();
                let (alignment, valign, fill) = match &planned.kind {
                    CellKind::Content(cell) => (
                        cell.alignment,
                        cell.vertical_alignment,
                        cell.background_color.as_deref().and_then(shading),
                    ),
                    _ => (Alignment::Left, VerticalAlignment::Center, None),
                };
                let merge = match (&planned.kind, planned.merge_down) {
                    (CellKind::Continue, _) => Some(false),
                    (_, true) => Some(true),
                    _ => None,
                };
                let spec = CellSpec {
                    width,
                    span: planned.span,
                    merge,
                    fill: fill.as_deref(),
                    valign,
                    alignment,
                };
                write_cell(out, &spec, planned.text(), &RunProps::default());
            }
            out.push_str("</w:tr>");
        }

        out.push_str("</w:tbl><w:p/>");
    }
}

/// Validate a fill color, warning when it is unusable
fn shading(color: &str) -> Option<String> {
    let normalized = normalize_hex(color);
    if normalized.is_none() {
        log::warn!("Invalid hex color '{}', shading skipped", color);
    }
    normalized
}

struct CellSpec<'s> {
    width: i64,
    span: usize,
    /// `Some(true)` restarts a vertical merge, `Some(false)` continues one
    merge: Option<bool>,
    fill: Option<&'s str>,
    valign: VerticalAlignment,
    alignment: Alignment,
}

fn write_cell(out: &mut String, spec: &CellSpec<'_>, text: &str, run: &RunProps) {
    out.push_str("<w:tc><w:tcPr>");
    out.push_str(&format!(r#"<w:tcW w:w="{}" w:type="dxa"/>"#, spec.width));
    if spec.span > 1 {
        out.push_str(&format!(r#"<w:gridSpan w:val="{}"/>"#, spec.span));
    }
    match spec.merge {
        Some(true) => out.push_str(r#"<w:vMerge w:val="restart"/>"#),
        Some(false) => out.push_str("<w:vMerge/>"),
        None => {}
    }
    if let Some(fill) = spec.fill {
        out.push_str(&format!(
            r#"<w:shd w:val="clear" w:color="auto" w:fill="{}"/>"#,
            fill
        ));
    }
    let valign = match spec.valign {
        VerticalAlignment::Top => "top",
        VerticalAlignment::Center => "center",
        VerticalAlignment::Bottom => "bottom",
    };
    out.push_str(&format!(r#"<w:vAlign w:val="{}"/></w:tcPr>"#, valign));

    out.push_str("<w:p>");
    if spec.alignment != Alignment::Left {
        out.push_str(&format!(
            r#"<w:pPr><w:jc w:val="{}"/></w:pPr>"#,
            justification(spec.alignment)
        ));
    }
    if !text.is_empty() {
        write_run(out, text, run);
    }
    out.push_str("</w:p></w:tc>");
}
