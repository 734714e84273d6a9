//! End-to-end ingestion tests over minimal xlsx containers built in memory.

use std::io::{Cursor, Write};
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

use sheetchat_core::{parse_workbook, CellScalar, IngestError};

/// Assemble a minimal xlsx archive. Each entry is a sheet name plus a grid;
/// empty strings become omitted cells, numeric strings become number cells,
/// everything else is an inline string.
fn build_xlsx(sheets: &[(&str, &[&[&str]])]) -> Vec<u8> {
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default();

    let mut content_types = String::from(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
<Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
<Default Extension="xml" ContentType="application/xml"/>
<Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/>"#,
    );
    for i in 1..=sheets.len() {
        content_types.push_str(&format!(
            r#"<Override PartName="/xl/worksheets/sheet{i}.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/>"#
        ));
    }
    content_types.push_str("</Types>");

    let mut workbook_xml = String::from(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"><sheets>"#,
    );
    let mut workbook_rels = String::from(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
    );
    for (i, (name, _)) in sheets.iter().enumerate() {
        let n = i + 1;
        workbook_xml.push_str(&format!(
            r#"<sheet name="{}" sheetId="{n}" r:id="rId{n}"/>"#,
            xml_escape(name)
        ));
        workbook_rels.push_str(&format!(
            r#"<Relationship Id="rId{n}" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet{n}.xml"/>"#
        ));
    }
    workbook_xml.push_str("</sheets></workbook>");
    workbook_rels.push_str("</Relationships>");

    let root_rels = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/></Relationships>"#;

    zip.start_file("[Content_Types].xml", options).unwrap();
    zip.write_all(content_types.as_bytes()).unwrap();
    zip.start_file("_rels/.rels", options).unwrap();
    zip.write_all(root_rels.as_bytes()).unwrap();
    zip.start_file("xl/workbook.xml", options).unwrap();
    zip.write_all(workbook_xml.as_bytes()).unwrap();
    zip.start_file("xl/_rels/workbook.xml.rels", options).unwrap();
    zip.write_all(workbook_rels.as_bytes()).unwrap();

    for (i, (_, grid)) in sheets.iter().enumerate() {
        zip.start_file(format!("xl/worksheets/sheet{}.xml", i + 1), options)
            .unwrap();
        zip.write_all(sheet_xml(grid).as_bytes()).unwrap();
    }

    zip.finish().unwrap().into_inner()
}

fn sheet_xml(grid: &[&[&str]]) -> String {
    let mut xml = String::from(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><sheetData>"#,
    );
    for (r, row) in grid.iter().enumerate() {
        xml.push_str(&format!("<row r=\"{}\">", r + 1));
        for (c, cell) in row.iter().enumerate() {
            if cell.is_empty() {
                continue;
            }
            let cell_ref = format!("{}{}", col_letter(c), r + 1);
            if cell.parse::<f64>().is_ok() {
                xml.push_str(&format!(r#"<c r="{cell_ref}"><v>{cell}</v></c>"#));
            } else {
                xml.push_str(&format!(
                    r#"<c r="{cell_ref}" t="inlineStr"><is><t>{}</t></is></c>"#,
                    xml_escape(cell)
                ));
            }
        }
        xml.push_str("</row>");
    }
    xml.push_str("</sheetData></worksheet>");
    xml
}

fn col_letter(mut col: usize) -> String {
    let mut letters = String::new();
    loop {
        letters.insert(0, (b'A' + (col % 26) as u8) as char);
        if col < 26 {
            break;
        }
        col = col / 26 - 1;
    }
    letters
}

fn xml_escape(raw: &str) -> String {
    raw.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

#[test]
fn two_sheet_workbook_drops_the_empty_sheet() {
    let bytes = build_xlsx(&[
        (
            "Sheet1",
            &[
                &["A", "B"],
                &["a1", "1"],
                &["a2", "2"],
                &["a3", "3"],
            ],
        ),
        ("Sheet2", &[&["X"]]),
    ]);

    let workbook = parse_workbook(&bytes, "two.xlsx").unwrap();
    assert_eq!(workbook.sheet_names(), vec!["Sheet1"]);
    assert_eq!(workbook.sheets[0].row_count(), 3);
}

#[test]
fn non_empty_sheets_survive_in_source_order() {
    let bytes = build_xlsx(&[
        ("Zeta", &[&["A"], &["1"]]),
        ("Alpha", &[&["B"], &["2"]]),
    ]);

    let workbook = parse_workbook(&bytes, "ordered.xlsx").unwrap();
    assert_eq!(workbook.sheet_names(), vec!["Zeta", "Alpha"]);
}

#[test]
fn every_row_carries_the_full_column_set() {
    let bytes = build_xlsx(&[(
        "Data",
        &[
            &["Name", "Qty", "Note"],
            &["widget", "4", "ok"],
            &["gadget", "", "missing qty"],
            &["gizmo", "7", ""],
        ],
    )]);

    let workbook = parse_workbook(&bytes, "rows.xlsx").unwrap();
    let sheet = &workbook.sheets[0];
    assert_eq!(sheet.columns, vec!["Name", "Qty", "Note"]);
    assert!(sheet.rows_match_columns());
    assert_eq!(sheet.rows[1].get("Qty"), Some(&CellScalar::Null));
    assert_eq!(sheet.rows[2].get("Note"), Some(&CellScalar::Null));
}

#[test]
fn numeric_cells_decode_as_numbers() {
    let bytes = build_xlsx(&[("N", &[&["Value"], &["2.5"], &["3"]])]);

    let workbook = parse_workbook(&bytes, "numbers.xlsx").unwrap();
    let sheet = &workbook.sheets[0];
    assert_eq!(sheet.rows[0].get("Value"), Some(&CellScalar::Number(2.5)));
    assert_eq!(sheet.rows[1].get("Value"), Some(&CellScalar::Number(3.0)));
}

#[test]
fn workbook_with_only_empty_sheets_fails() {
    let bytes = build_xlsx(&[("Empty1", &[&["A"]]), ("Empty2", &[])]);

    let err = parse_workbook(&bytes, "empty.xlsx").unwrap_err();
    assert!(matches!(err, IngestError::EmptyWorkbook));
}

#[test]
fn display_name_is_carried_through() {
    let bytes = build_xlsx(&[("S", &[&["A"], &["x"]])]);
    let workbook = parse_workbook(&bytes, "My Budget.xlsx").unwrap();
    assert_eq!(workbook.file_name, "My Budget.xlsx");
}
