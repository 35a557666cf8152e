//! Result transformers
//!
//! Turn a succeeded job's payload into the client-facing shapes: flat text
//! with line provenance, and dense tables rebuilt from sparse cells.

use super::types::{
    Cell, OcrError, RawTable, ReadAnalyzeResult, Table, TableExtraction, TextExtraction, TextLine,
};

/// Upper bound on the cells allocated for a single table grid
pub const MAX_GRID_CELLS: usize = 1_000_000;

/// Flatten read results into text plus per-line records.
///
/// Returns `None` when no non-whitespace text was found.
pub fn transform_text(result: &ReadAnalyzeResult) -> Option<TextExtraction> {
    let mut extracted_text = String::new();
    let mut detailed_data = Vec::new();

    for (page_index, page) in result.read_results.iter().enumerate() {
        for (line_index, line) in page.lines.iter().enumerate() {
            extracted_text.push_str(&line.text);
            extracted_text.push('\n');
            detailed_data.push(TextLine {
                page: page_index + 1,
                line: line_index + 1,
                text: line.text.clone(),
            });
        }
    }

    let extracted_text = extracted_text.trim();
    if extracted_text.is_empty() {
        return None;
    }

    Some(TextExtraction {
        extracted_text: extracted_text.to_string(),
        detailed_data,
    })
}

/// Rebuild every raw table into a header/body table.
///
/// Returns `None` when the document contains no tables. The raw tables are
/// passed through untouched as `extracted_data`.
pub fn transform_tables(
    raw_tables: Vec<serde_json::Value>,
) -> Result<Option<TableExtraction>, OcrError> {
    if raw_tables.is_empty() {
        return Ok(None);
    }

    let tables = raw_tables
        .iter()
        .enumerate()
        .map(|(index, raw)| {
            let table: RawTable = serde_json::from_value(raw.clone()).map_err(|e| {
                OcrError::MalformedResult(format!("table {}: {}", index, e))
            })?;
            build_table(&table.cells)
                .map_err(|e| OcrError::MalformedResult(format!("table {}: {}", index, e)))
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Some(TableExtraction {
        tables,
        extracted_data: raw_tables,
    }))
}

/// Build a dense table from a sparse cell list.
///
/// The grid is `max(row_index) + 1` by `max(column_index) + 1`; positions
/// without a cell hold the empty string.
pub fn build_table(cells: &[Cell]) -> Result<Table, String> {
    let (Some(max_row), Some(max_col)) = (
        cells.iter().map(|c| c.row_index).max(),
        cells.iter().map(|c| c.column_index).max(),
    ) else {
        return Ok(Table {
            header: Vec::new(),
            body: Vec::new(),
        });
    };

    let too_large = || {
        format!(
            "grid of {} rows by {} columns exceeds {} cells",
            max_row as u128 + 1,
            max_col as u128 + 1,
            MAX_GRID_CELLS
        )
    };
    let (Some(rows), Some(cols)) = (max_row.checked_add(1), max_col.checked_add(1)) else {
        return Err(too_large());
    };
    match rows.checked_mul(cols) {
        Some(size) if size <= MAX_GRID_CELLS => {}
        _ => return Err(too_large()),
    }

    let mut grid = vec![vec![String::new(); cols]; rows];
    for cell in cells {
        grid[cell.row_index][cell.column_index] = cell.content.clone().unwrap_or_default();
    }

    let mut rows = grid.into_iter();
    let header = rows.next().unwrap_or_default();
    let body = rows.collect();

    Ok(Table { header, body })
}
