//! Context snapshot: bounded textual serialization of a workbook for prompts

use crate::ingest::{Sheet, Workbook};

/// Upper bound on preview rows sent per sheet. The full sheet is never sent;
/// the stated `Total Rows` line tells the model the preview is not
/// exhaustive.
pub const MAX_PREVIEW_ROWS: usize = 20;

/// Serialize a workbook into the text block embedded in the system prompt.
///
/// Output is deterministic: sheet order, row order and column order all come
/// straight from the workbook. Each sheet contributes its name, column list,
/// true row count and a delimited preview of at most [`MAX_PREVIEW_ROWS`]
/// rows with a header line.
pub fn format_workbook_context(workbook: &Workbook) -> String {
    let mut out = format!(
        "File Name: {}\nTotal Sheets: {}\n\n",
        workbook.file_name,
        workbook.sheets.len()
    );

    for (index, sheet) in workbook.sheets.iter().enumerate() {
        let preview_len = sheet.rows.len().min(MAX_PREVIEW_ROWS);

        out.push_str(&format!("--- SHEET {}: \"{}\" ---\n", index + 1, sheet.name));
        out.push_str(&format!("Columns: {}\n", sheet.columns.join(", ")));
        out.push_str(&format!("Total Rows: {}\n", sheet.rows.len()));
        out.push_str(&format!("Data Preview (First {} rows):\n", preview_len));
        out.push_str(&preview_block(sheet, preview_len));
        out.push('\n');
    }

    out
}

fn preview_block(sheet: &Sheet, preview_len: usize) -> String {
    let mut block = String::new();
    block.push_str(&encode_record(sheet.columns.iter().cloned()));
    block.push('\n');
    for row in &sheet.rows[..preview_len] {
        block.push_str(&encode_record(row.values().map(|v| v.render())));
        block.push('\n');
    }
    block
}

/// Encode one record as a comma-delimited line with standard CSV quoting.
pub fn encode_record(fields: impl Iterator<Item = String>) -> String {
    fields
        .map(|field| encode_field(&field))
        .collect::<Vec<_>>()
        .join(",")
}

/// Quote a field when it contains the delimiter, a quote or a line break;
/// embedded quotes are doubled.
pub fn encode_field(field: &str) -> String {
    if field.contains(',') || field.contains('"') || field.contains('\n') || field.contains('\r') {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

/// Decode one encoded record back into its fields.
///
/// Accepts records whose quoted fields span line breaks; the inverse of
/// [`encode_record`], used by tests to prove the encoding round-trips.
pub fn decode_record(record: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut chars = record.chars().peekable();
    let mut in_quotes = false;

    while let Some(c) = chars.next() {
        if in_quotes {
            if c == '"' {
                if chars.peek() == Some(&'"') {
                    chars.next();
                    current.push('"');
                } else {
                    in_quotes = false;
                }
            } else {
                current.push(c);
            }
        } else {
            match c {
                '"' => in_quotes = true,
                ',' => {
                    fields.push(std::mem::take(&mut current));
                }
                _ => current.push(c),
            }
        }
    }
    fields.push(current);
    fields
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::{CellScalar, Row, Sheet, Workbook};

    fn sample_workbook() -> Workbook {
        let mut sheet = Sheet::new("Sales", vec!["Region".to_string(), "Amount".to_string()]);
        for (region, amount) in [("North", 100.0), ("South", 250.5), ("West", 80.0)] {
            sheet.rows.push(Row::new(vec![
                ("Region".to_string(), CellScalar::Text(region.to_string())),
                ("Amount".to_string(), CellScalar::Number(amount)),
            ]));
        }
        Workbook {
            file_name: "report.xlsx".to_string(),
            sheets: vec![sheet],
        }
    }

    #[test]
    fn formatting_is_deterministic() {
        let workbook = sample_workbook();
        assert_eq!(
            format_workbook_context(&workbook),
            format_workbook_context(&workbook)
        );
    }

    #[test]
    fn snapshot_structure() {
        let text = format_workbook_context(&sample_workbook());
        assert!(text.starts_with("File Name: report.xlsx\nTotal Sheets: 1\n"));
        assert!(text.contains("--- SHEET 1: \"Sales\" ---"));
        assert!(text.contains("Columns: Region, Amount"));
        assert!(text.contains("Total Rows: 3"));
        assert!(text.contains("Data Preview (First 3 rows):"));
        assert!(text.contains("Region,Amount\nNorth,100\nSouth,250.5\nWest,80\n"));
    }

    #[test]
    fn preview_is_capped_but_total_row_count_is_true() {
        let mut sheet = Sheet::new("Big", vec!["N".to_string()]);
        for i in 0..100 {
            sheet
                .rows
                .push(Row::new(vec![("N".to_string(), CellScalar::Number(i as f64))]));
        }
        let workbook = Workbook {
            file_name: "big.xlsx".to_string(),
            sheets: vec![sheet],
        };

        let text = format_workbook_context(&workbook);
        assert!(text.contains("Total Rows: 100"));
        assert!(text.contains(&format!("Data Preview (First {} rows):", MAX_PREVIEW_ROWS)));
        // header line + capped preview rows
        let preview_lines = text
            .lines()
            .skip_while(|l| !l.starts_with("Data Preview"))
            .skip(1)
            .take_while(|l| !l.is_empty())
            .count();
        assert_eq!(preview_lines, MAX_PREVIEW_ROWS + 1);
    }

    #[test]
    fn field_encoding_round_trips_awkward_values() {
        let fields = vec![
            "plain".to_string(),
            "has,comma".to_string(),
            "has \"quote\"".to_string(),
            "has\nnewline".to_string(),
            String::new(),
        ];
        let encoded = encode_record(fields.clone().into_iter());
        assert_eq!(decode_record(&encoded), fields);
    }

    #[test]
    fn plain_fields_are_not_quoted() {
        assert_eq!(encode_field("hello"), "hello");
        assert_eq!(encode_field("with space"), "with space");
    }

    #[test]
    fn quoted_field_shapes() {
        assert_eq!(encode_field("a,b"), "\"a,b\"");
        assert_eq!(encode_field("say \"hi\""), "\"say \"\"hi\"\"\"");
    }
}
