//! Spreadsheet ingestion: raw bytes (or a remote sheet id) into a [`Workbook`]

use calamine::{open_workbook_auto_from_rs, Data, Range, Reader};
use std::io::Cursor;

use crate::error::IngestError;

pub mod remote;
pub mod workbook;

pub use remote::{extract_sheet_id, fetch_google_sheet};
pub use workbook::{CellScalar, Row, Sheet, Workbook};

/// Decode a spreadsheet container from memory.
///
/// Sheets keep file order. The first row of each sheet's used range is the
/// header; columns with an empty header cell are dropped (they cannot be
/// addressed by name), and duplicate header names get a numeric suffix.
/// Sheets that end up with no columns or no data rows are dropped entirely;
/// when nothing survives the whole ingestion fails with
/// [`IngestError::EmptyWorkbook`].
pub fn parse_workbook(bytes: &[u8], display_name: &str) -> Result<Workbook, IngestError> {
    let mut reader = open_workbook_auto_from_rs(Cursor::new(bytes)).map_err(|e| {
        log::warn!("failed to open workbook {:?}: {}", display_name, e);
        IngestError::Parse(e.to_string())
    })?;

    let mut sheets = Vec::new();
    for name in reader.sheet_names() {
        let range = match reader.worksheet_range(&name) {
            Ok(range) => range,
            Err(e) => {
                // A sheet that cannot be ranged in an otherwise valid
                // container is skipped, matching the empty-sheet rule.
                log::warn!("skipping unreadable sheet {:?}: {}", name, e);
                continue;
            }
        };
        if let Some(sheet) = sheet_from_range(&name, &range) {
            sheets.push(sheet);
        }
    }

    if sheets.is_empty() {
        return Err(IngestError::EmptyWorkbook);
    }

    Ok(Workbook {
        file_name: display_name.to_string(),
        sheets,
    })
}

/// Convert one used range into a [`Sheet`], or `None` if it holds no data.
fn sheet_from_range(name: &str, range: &Range<Data>) -> Option<Sheet> {
    let mut rows = range.rows();
    let header = rows.next()?;

    let columns = header_columns(header);
    if columns.is_empty() {
        return None;
    }

    let mut sheet = Sheet::new(
        name,
        columns.iter().map(|(_, name)| name.clone()).collect(),
    );

    for raw in rows {
        let row = Row::new(
            columns
                .iter()
                .map(|(idx, column)| {
                    let value = raw.get(*idx).map(scalar_from_cell).unwrap_or_default();
                    (column.clone(), value)
                })
                .collect(),
        );
        if row.is_blank() {
            continue;
        }
        sheet.rows.push(row);
    }

    if sheet.rows.is_empty() {
        None
    } else {
        Some(sheet)
    }
}

/// Column positions and names from a header row.
///
/// Empty header cells are skipped; repeated names are disambiguated with a
/// `_2`, `_3`, ... suffix so column names stay unique within the sheet.
fn header_columns(header: &[Data]) -> Vec<(usize, String)> {
    let mut columns: Vec<(usize, String)> = Vec::new();
    for (idx, cell) in header.iter().enumerate() {
        let name = scalar_from_cell(cell).render();
        let name = name.trim();
        if name.is_empty() {
            continue;
        }
        let mut unique = name.to_string();
        let mut suffix = 2;
        while columns.iter().any(|(_, existing)| existing == &unique) {
            unique = format!("{}_{}", name, suffix);
            suffix += 1;
        }
        columns.push((idx, unique));
    }
    columns
}

/// Collapse a calamine cell into the scalar union, preferring readable text
/// where the container distinguishes formatted and raw values (dates).
fn scalar_from_cell(cell: &Data) -> CellScalar {
    match cell {
        Data::Empty => CellScalar::Null,
        Data::String(s) => CellScalar::Text(s.clone()),
        Data::Float(f) => CellScalar::Number(*f),
        Data::Int(i) => CellScalar::Number(*i as f64),
        Data::Bool(b) => CellScalar::Bool(*b),
        Data::DateTime(dt) => match dt.as_datetime() {
            Some(naive) => CellScalar::Text(format_datetime(naive)),
            None => CellScalar::Number(dt.as_f64()),
        },
        Data::DateTimeIso(s) => CellScalar::Text(s.clone()),
        Data::DurationIso(s) => CellScalar::Text(s.clone()),
        Data::Error(e) => CellScalar::Text(e.to_string()),
    }
}

fn format_datetime(dt: chrono::NaiveDateTime) -> String {
    if dt.time() == chrono::NaiveTime::MIN {
        dt.format("%Y-%m-%d").to_string()
    } else {
        dt.format("%Y-%m-%d %H:%M:%S").to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn range_from_grid(grid: &[&[Data]]) -> Range<Data> {
        let rows = grid.len() as u32;
        let cols = grid.iter().map(|r| r.len()).max().unwrap_or(0) as u32;
        let mut range = Range::new((0, 0), (rows.saturating_sub(1), cols.saturating_sub(1)));
        for (r, row) in grid.iter().enumerate() {
            for (c, cell) in row.iter().enumerate() {
                range.set_value((r as u32, c as u32), cell.clone());
            }
        }
        range
    }

    fn text(s: &str) -> Data {
        Data::String(s.to_string())
    }

    #[test]
    fn header_row_becomes_columns_and_rows_align() {
        let range = range_from_grid(&[
            &[text("Name"), text("Amount")],
            &[text("Ada"), Data::Float(3.0)],
            &[text("Grace"), Data::Empty],
        ]);
        let sheet = sheet_from_range("People", &range).unwrap();
        assert_eq!(sheet.columns, vec!["Name", "Amount"]);
        assert_eq!(sheet.row_count(), 2);
        assert!(sheet.rows_match_columns());
        assert_eq!(sheet.rows[1].get("Amount"), Some(&CellScalar::Null));
    }

    #[test]
    fn blank_data_rows_are_dropped() {
        let range = range_from_grid(&[
            &[text("A")],
            &[Data::Empty],
            &[text("x")],
        ]);
        let sheet = sheet_from_range("S", &range).unwrap();
        assert_eq!(sheet.row_count(), 1);
    }

    #[test]
    fn sheet_with_only_a_header_is_dropped() {
        let range = range_from_grid(&[&[text("A"), text("B")]]);
        assert!(sheet_from_range("S", &range).is_none());
    }

    #[test]
    fn empty_header_cells_do_not_become_columns() {
        let range = range_from_grid(&[
            &[text("A"), Data::Empty, text("C")],
            &[text("1"), text("ghost"), text("3")],
        ]);
        let sheet = sheet_from_range("S", &range).unwrap();
        assert_eq!(sheet.columns, vec!["A", "C"]);
        assert_eq!(sheet.rows[0].get("C"), Some(&CellScalar::Text("3".to_string())));
    }

    #[test]
    fn duplicate_headers_get_suffixes() {
        let range = range_from_grid(&[
            &[text("Total"), text("Total"), text("Total")],
            &[Data::Int(1), Data::Int(2), Data::Int(3)],
        ]);
        let sheet = sheet_from_range("S", &range).unwrap();
        assert_eq!(sheet.columns, vec!["Total", "Total_2", "Total_3"]);
    }

    #[test]
    fn garbage_bytes_fail_with_parse_error() {
        let err = parse_workbook(b"definitely not a spreadsheet", "junk.xlsx").unwrap_err();
        assert!(matches!(err, IngestError::Parse(_)));
    }
}
