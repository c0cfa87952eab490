//! Table geometry validator
//!
//! Reports rows whose width disagrees with the table and spans that run
//! past the table edge. The renderer tolerates both, so every finding here
//! is a warning.
//!
//! # Diagnostic Codes
//!
//! - `UIF301`: row width differs from the column count
//! - `UIF302`: colspan past the last column
//! - `UIF303`: rowspan past the last row
//! - `UIF304`: column widths count differs from the column count

use trialdoc_uif::{BlockKind, Section, TableBlock, UniversalDocument};

use crate::diagnostics::Diagnostic;
use crate::Validator;

/// Validates table row widths and spans
pub struct TableGeometryValidator;

impl Validator for TableGeometryValidator {
    fn code(&self) -> &'static str {
        "UIF3"
    }

    fn name(&self) -> &'static str {
        "table-geometry"
    }

    fn validate(&self, doc: &UniversalDocument) -> Vec<Diagnostic> {
        let mut diagnostics = Vec::new();
        for (i, section) in doc.sections.iter().enumerate() {
            walk_section(section, &format!("sections[{}]", i), &mut diagnostics);
        }
        diagnostics
    }
}

fn walk_section(section: &Section, path: &str, diagnostics: &mut Vec<Diagnostic>) {
    for (j, block) in section.content_blocks.iter().enumerate() {
        if let BlockKind::Table { table: Some(table) } = &block.kind {
            let block_path = format!("{}.content_blocks[{}]", path, j);
            check_table(table, &block_path, diagnostics);
        }
    }
    for (k, subsection) in section.subsections.iter().enumerate() {
        walk_section(subsection, &format!("{}.subsections[{}]", path, k), diagnostics);
    }
}

fn check_table(table: &TableBlock, path: &str, diagnostics: &mut Vec<Diagnostic>) {
    let columns = table.column_count();
    let row_count = table.rows.len();

    if let Some(widths) = &table.column_widths {
        if widths.len() != columns {
            diagnostics.push(
                Diagnostic::warning(format!(
                    "Table has {} column widths for {} columns",
                    widths.len(),
                    columns
                ))
                .with_code("UIF304")
                .with_path(path),
            );
        }
    }

    let widths = table.row_widths();
    for (r, row) in table.rows.iter().enumerate() {
        let row_path = format!("{}.table.rows[{}]", path, r);
        let width = widths[r];
        if width != columns {
            diagnostics.push(
                Diagnostic::warning(format!(
                    "Row spans {} columns but the table has {}",
                    width, columns
                ))
                .with_code("UIF301")
                .with_path(&row_path),
            );
        }

        let mut col = 0;
        for (c, cell) in row.iter().enumerate() {
            let cell_path = format!("{}[{}]", row_path, c);
            if cell.colspan() > 1 && col + cell.colspan() > columns {
                diagnostics.push(
                    Diagnostic::warning(format!(
                        "Colspan {} at column {} exceeds {} columns",
                        cell.colspan(),
                        col,
                        columns
                    ))
                    .with_code("UIF302")
                    .with_path(&cell_path),
                );
            }
            if cell.rowspan() > 1 && r + cell.rowspan() > row_count {
                diagnostics.push(
                    Diagnostic::warning(format!(
                        "Rowspan {} at row {} exceeds {} rows",
                        cell.rowspan(),
                        r,
                        row_count
                    ))
                    .with_code("UIF303")
                    .with_path(&cell_path),
                );
            }
            col += cell.colspan();
        }
    }
}
