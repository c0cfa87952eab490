//! Table blocks and cells

use serde::{Deserialize, Serialize};

use crate::block::Alignment;

/// Vertical alignment inside a table cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerticalAlignment {
    Top,
    #[default]
    Center,
    Bottom,
}

/// A structured table cell
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableCell {
    #[serde(default)]
    pub content: String,
    /// Columns occupied (at least 1)
    #[serde(default = "one")]
    pub colspan: u32,
    /// Rows occupied (at least 1)
    #[serde(default = "one")]
    pub rowspan: u32,
    #[serde(default)]
    pub alignment: Alignment,
    #[serde(default)]
    pub vertical_alignment: VerticalAlignment,
    /// Hex fill color ("#RGB" or "#RRGGBB", '#' optional)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background_color: Option<String>,
}

fn one() -> u32 {
    1
}

impl TableCell {
    /// Cell with default spans and alignment
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            colspan: 1,
            rowspan: 1,
            alignment: Alignment::Left,
            vertical_alignment: VerticalAlignment::Center,
            background_color: None,
        }
    }

    /// Set the column span
    pub fn with_colspan(mut self, colspan: u32) -> Self {
        self.colspan = colspan;
        self
    }

    /// Set the row span
    pub fn with_rowspan(mut self, rowspan: u32) -> Self {
        self.rowspan = rowspan;
        self
    }

    /// Set the background fill
    pub fn with_background(mut self, color: impl Into<String>) -> Self {
        self.background_color = Some(color.into());
        self
    }
}

impl Default for TableCell {
    fn default() -> Self {
        Self::new("")
    }
}

/// A row entry: plain text or a structured cell
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TableCellValue {
    Text(String),
    Cell(TableCell),
}

impl TableCellValue {
    /// Cell text
    pub fn content(&self) -> &str {
        match self {
            TableCellValue::Text(text) => text,
            TableCellValue::Cell(cell) => &cell.content,
        }
    }

    /// Column span, never less than 1
    pub fn colspan(&self) -> usize {
        match self {
            TableCellValue::Text(_) => 1,
            TableCellValue::Cell(cell) => cell.colspan.max(1) as usize,
        }
    }

    /// Row span, never less than 1
    pub fn rowspan(&self) -> usize {
        match self {
            TableCellValue::Text(_) => 1,
            TableCellValue::Cell(cell) => cell.rowspan.max(1) as usize,
        }
    }

    /// Structured view of this cell
    pub fn to_cell(&self) -> TableCell {
        match self {
            TableCellValue::Text(text) => TableCell::new(text.clone()),
            TableCellValue::Cell(cell) => cell.clone(),
        }
    }
}

impl From<&str> for TableCellValue {
    fn from(text: &str) -> Self {
        TableCellValue::Text(text.to_string())
    }
}

impl From<TableCell> for TableCellValue {
    fn from(cell: TableCell) -> Self {
        TableCellValue::Cell(cell)
    }
}

/// Table payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableBlock {
    #[serde(default)]
    pub headers: Vec<String>,
    #[serde(default)]
    pub rows: Vec<Vec<TableCellValue>>,
    /// Column widths in inches
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column_widths: Option<Vec<f64>>,
    /// Table style name (e.g. "Table Grid")
    #[serde(default = "default_table_style")]
    pub style: String,
    /// Header row fill color
    #[serde(default = "default_header_background")]
    pub header_background: String,
}

fn default_table_style() -> String {
    "Table Grid".to_string()
}

fn default_header_background() -> String {
    "#CCCCCC".to_string()
}

impl TableBlock {
    /// Table from plain header and cell strings
    pub fn new(headers: &[&str], rows: &[&[&str]]) -> Self {
        Self {
            headers: headers.iter().map(|h| h.to_string()).collect(),
            rows: rows
                .iter()
                .map(|row| row.iter().map(|c| TableCellValue::from(*c)).collect())
                .collect(),
            column_widths: None,
            style: default_table_style(),
            header_background: default_header_background(),
        }
    }

    /// Columns occupied by a row, counting colspans
    pub fn effective_width(row: &[TableCellValue]) -> usize {
        row.iter().map(TableCellValue::colspan).sum()
    }

    /// Columns occupied by each row, counting colspans and the columns
    /// covered by rowspans from rows above
    pub fn row_widths(&self) -> Vec<usize> {
        // (rows still covered, columns covered)
        let mut carried: Vec<(usize, usize)> = Vec::new();
        self.rows
            .iter()
            .map(|row| {
                let inherited: usize = carried.iter().map(|(_, cols)| cols).sum();
                carried.retain_mut(|(remaining, _)| {
                    *remaining -= 1;
                    *remaining > 0
                });
                for cell in row {
                    if cell.rowspan() > 1 {
                        carried.push((cell.rowspan() - 1, cell.colspan()));
                    }
                }
                inherited + Self::effective_width(row)
            })
            .collect()
    }

    /// Column count: the header count when headers exist, otherwise the
    /// widest row (span-aware)
    pub fn column_count(&self) -> usize {
        if !self.headers.is_empty() {
            return self.headers.len();
        }
        self.row_widths().into_iter().max().unwrap_or(0)
    }

    /// True when there is nothing to render
    pub fn is_empty(&self) -> bool {
        self.headers.is_empty() && self.rows.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_count_from_headers() {
        let table = TableBlock::new(&["a", "b", "c"], &[&["1"]]);
        assert_eq!(table.column_count(), 3);
    }

    #[test]
    fn test_column_count_colspan_aware() {
        let mut table = TableBlock::new(&[], &[&["x", "y"]]);
        table.rows.push(vec![
            TableCell::new("wide").with_colspan(3).into(),
            "z".into(),
        ]);
        assert_eq!(table.column_count(), 4);
    }

    #[test]
    fn test_cell_value_untagged() {
        let row: Vec<TableCellValue> =
            serde_json::from_str(r#"["plain", {"content": "merged", "colspan": 2}]"#).unwrap();
        assert_eq!(row[0].content(), "plain");
        assert_eq!(row[1].colspan(), 2);
        assert_eq!(row[1].rowspan(), 1);
        assert_eq!(TableBlock::effective_width(&row), 3);
    }

    #[test]
    fn test_row_widths_include_rowspan_coverage() {
        let mut table = TableBlock::new(&["a", "b", "c"], &[]);
        table.rows.push(vec![
            TableCell::new("tall").with_rowspan(2).into(),
            "b1".into(),
            "c1".into(),
        ]);
        table.rows.push(vec!["b2".into(), "c2".into()]);
        table.rows.push(vec!["a3".into(), "b3".into(), "c3".into()]);
        assert_eq!(table.row_widths(), vec![3, 3, 3]);
    }

    #[test]
    fn test_zero_span_treated_as_one() {
        let cell = TableCellValue::Cell(TableCell::new("x").with_colspan(0));
        assert_eq!(cell.colspan(), 1);
    }

    #[test]
    fn test_defaults() {
        let table: TableBlock = serde_json::from_str(r#"{"headers":["h"]}"#).unwrap();
        assert_eq!(table.style, "Table Grid");
        assert_eq!(table.header_background, "#CCCCCC");
        assert!(table.rows.is_empty());
        assert!(!table.is_empty());
    }
}
