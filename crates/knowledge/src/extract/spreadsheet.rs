//! Spreadsheet extraction for `.xlsx` and `.xls` workbooks.

use super::{DocumentFormat, TextExtractor};
use crate::error::{RagError, RagResult};
use calamine::{open_workbook_auto, Data, Reader};
use std::path::Path;

/// Separator between cells of a rendered row.
pub const CELL_DELIMITER: &str = " | ";

#[derive(Debug, Default, Clone, Copy)]
pub struct SpreadsheetExtractor;

impl TextExtractor for SpreadsheetExtractor {
    fn format(&self) -> DocumentFormat {
        DocumentFormat::Spreadsheet
    }

    fn extract(&self, path: &Path) -> RagResult<String> {
        let mut workbook = open_workbook_auto(path).map_err(|e| RagError::extraction(path, e))?;

        let mut sheets = Vec::new();
        for name in workbook.sheet_names() {
            let range = workbook
                .worksheet_range(&name)
                .map_err(|e| RagError::extraction(path, e))?;
            let rows: Vec<Vec<String>> = range
                .rows()
                .map(|row| row.iter().map(cell_text).collect())
                .collect();
            sheets.push((name, rows));
        }

        Ok(render_workbook(&sheets))
    }
}

fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        other => other.to_string(),
    }
}

/// Render sheets as labeled sections of delimiter-joined rows.
///
/// Blank cells render as empty strings. Rows whose cells are all blank are
/// dropped, and a sheet with no remaining rows gets no section at all.
pub fn render_workbook(sheets: &[(String, Vec<Vec<String>>)]) -> String {
    let mut text = String::new();

    for (name, rows) in sheets {
        let mut kept = rows
            .iter()
            .filter(|row| row.iter().any(|cell| !cell.trim().is_empty()))
            .peekable();
        if kept.peek().is_none() {
            continue;
        }

        text.push_str(&format!("\n=== {} ===\n", name));
        for row in kept {
            text.push_str(&row.join(CELL_DELIMITER));
            text.push('\n');
        }
    }

    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn row(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|c| c.to_string()).collect()
    }

    #[test]
    fn test_render_sections_and_rows() {
        let sheets = vec![
            (
                "Q1".to_string(),
                vec![row(&["Region", "Revenue"]), row(&["EU", "120"])],
            ),
            ("Q2".to_string(), vec![row(&["US", "", "note"])]),
        ];

        let text = render_workbook(&sheets);
        assert_eq!(
            text,
            "\n=== Q1 ===\nRegion | Revenue\nEU | 120\n\n=== Q2 ===\nUS |  | note\n"
        );
    }

    #[test]
    fn test_fully_blank_rows_dropped() {
        let sheets = vec![(
            "Data".to_string(),
            vec![row(&["", ""]), row(&["a", "b"]), row(&[" ", ""])],
        )];

        let text = render_workbook(&sheets);
        assert_eq!(text, "\n=== Data ===\na | b\n");
    }

    #[test]
    fn test_blank_sheets_render_nothing() {
        let sheets = vec![
            ("Sheet1".to_string(), vec![row(&["", " "])]),
            ("Sheet2".to_string(), Vec::new()),
        ];
        assert_eq!(render_workbook(&sheets), "");

        let mixed = vec![
            ("Empty".to_string(), vec![row(&[""])]),
            ("Data".to_string(), vec![row(&["a"])]),
        ];
        assert_eq!(render_workbook(&mixed), "\n=== Data ===\na\n");
    }

    #[test]
    fn test_cell_text() {
        assert_eq!(cell_text(&Data::Empty), "");
        assert_eq!(cell_text(&Data::String("EU".to_string())), "EU");
        assert_eq!(cell_text(&Data::Int(0)), "0");
        assert_eq!(cell_text(&Data::Bool(true)), "true");
    }

    #[test]
    fn test_corrupt_workbook_is_extraction_failure() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("sheet.xlsx");
        std::fs::write(&path, b"not a workbook").unwrap();

        assert!(matches!(
            SpreadsheetExtractor.extract(&path),
            Err(RagError::ExtractionFailed { .. })
        ));
    }
}
