//! Spreadsheet export
//!
//! Turns ordered row records into a single-sheet `.xlsx` workbook built in
//! memory. Column order follows the keys of the first row; keys that only
//! appear in later rows are appended in the order they are first seen.

use std::io::{Cursor, Write};

use axum::{
    http::{header, HeaderValue},
    response::{IntoResponse, Response},
};
use indexmap::{IndexMap, IndexSet};
use serde_json::Value;
use thiserror::Error;
use zip::{write::SimpleFileOptions, CompressionMethod, ZipWriter};

/// One spreadsheet row: column name to cell value
pub type Row = IndexMap<String, Value>;

pub const XLSX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

const MAX_SHEET_NAME_LEN: usize = 31;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("zip archive error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("write error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid sheet name: {0}")]
    InvalidSheetName(String),
}

/// Columns of the sheet, in output order
pub fn columns(rows: &[Row]) -> Vec<&str> {
    let mut seen: IndexSet<&str> = IndexSet::new();
    for row in rows {
        for key in row.keys() {
            seen.insert(key.as_str());
        }
    }
    seen.into_iter().collect()
}

/// Serialize rows into an `.xlsx` document
pub fn export_json_to_xlsx(rows: &[Row], sheet_name: &str) -> Result<Vec<u8>, ExportError> {
    validate_sheet_name(sheet_name)?;

    let sheet = worksheet_xml(rows);

    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    let parts: [(&str, String); 5] = [
        ("[Content_Types].xml", CONTENT_TYPES_XML.to_string()),
        ("_rels/.rels", ROOT_RELS_XML.to_string()),
        ("xl/workbook.xml", workbook_xml(sheet_name)),
        ("xl/_rels/workbook.xml.rels", WORKBOOK_RELS_XML.to_string()),
        ("xl/worksheets/sheet1.xml", sheet),
    ];

    for (name, body) in parts.iter() {
        zip.start_file(*name, options)?;
        zip.write_all(body.as_bytes())?;
    }

    Ok(zip.finish()?.into_inner())
}

/// A finished workbook ready to be sent as a file download
#[derive(Debug, Clone)]
pub struct Spreadsheet {
    pub filename: String,
    pub bytes: Vec<u8>,
}

impl Spreadsheet {
    /// Build a downloadable workbook. `filename` falls back to `default_filename`.
    pub fn download(
        rows: &[Row],
        filename: Option<&str>,
        default_filename: &str,
        sheet_name: &str,
    ) -> Result<Self, ExportError> {
        let bytes = export_json_to_xlsx(rows, sheet_name)?;
        Ok(Self {
            filename: sanitize_filename(filename.unwrap_or(default_filename), default_filename),
            bytes,
        })
    }
}

impl IntoResponse for Spreadsheet {
    fn into_response(self) -> Response {
        let disposition = format!("attachment; filename=\"{}\"", self.filename);
        let mut response = self.bytes.into_response();
        let headers = response.headers_mut();
        headers.insert(header::CONTENT_TYPE, HeaderValue::from_static(XLSX_CONTENT_TYPE));
        if let Ok(value) = HeaderValue::from_str(&disposition) {
            headers.insert(header::CONTENT_DISPOSITION, value);
        }
        response
    }
}

/// Keep a download name header-safe and ending in `.xlsx`
pub fn sanitize_filename(name: &str, default_filename: &str) -> String {
    let cleaned: String = name
        .chars()
        .filter(|c| !c.is_control() && !matches!(c, '"' | '\\' | '/' | ';'))
        .filter(|c| c.is_ascii())
        .collect();
    let cleaned = cleaned.trim();

    if cleaned.is_empty() || cleaned.eq_ignore_ascii_case(".xlsx") {
        return default_filename.to_string();
    }
    if cleaned.to_ascii_lowercase().ends_with(".xlsx") {
        cleaned.to_string()
    } else {
        format!("{}.xlsx", cleaned)
    }
}

fn validate_sheet_name(name: &str) -> Result<(), ExportError> {
    let invalid = name.is_empty()
        || name.chars().count() > MAX_SHEET_NAME_LEN
        || name.chars().any(|c| matches!(c, '[' | ']' | ':' | '*' | '?' | '/' | '\\'));
    if invalid {
        return Err(ExportError::InvalidSheetName(name.to_string()));
    }
    Ok(())
}

/// Spreadsheet column letters: 0 -> A, 25 -> Z, 26 -> AA
fn column_letter(mut index: usize) -> String {
    let mut letters = Vec::new();
    loop {
        letters.push((b'A' + (index % 26) as u8) as char);
        if index < 26 {
            break;
        }
        index = index / 26 - 1;
    }
    letters.iter().rev().collect()
}

fn worksheet_xml(rows: &[Row]) -> String {
    let columns = columns(rows);

    let mut xml = String::from(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">"#,
    );

    if columns.is_empty() {
        xml.push_str("<sheetData/></worksheet>");
        return xml;
    }

    xml.push_str("<sheetData>");

    xml.push_str(r#"<row r="1">"#);
    for (col, name) in columns.iter().enumerate() {
        push_string_cell(&mut xml, &format!("{}1", column_letter(col)), name);
    }
    xml.push_str("</row>");

    for (i, row) in rows.iter().enumerate() {
        let row_number = i + 2;
        xml.push_str(&format!(r#"<row r="{}">"#, row_number));
        for (col, name) in columns.iter().enumerate() {
            let reference = format!("{}{}", column_letter(col), row_number);
            match row.get(*name) {
                None | Some(Value::Null) => {}
                Some(Value::Bool(b)) => {
                    xml.push_str(&format!(
                        r#"<c r="{}" t="b"><v>{}</v></c>"#,
                        reference,
                        u8::from(*b)
                    ));
                }
                Some(Value::Number(n)) => {
                    xml.push_str(&format!(r#"<c r="{}"><v>{}</v></c>"#, reference, n));
                }
                Some(Value::String(s)) => push_string_cell(&mut xml, &reference, s),
                Some(other) => push_string_cell(&mut xml, &reference, &other.to_string()),
            }
        }
        xml.push_str("</row>");
    }

    xml.push_str("</sheetData></worksheet>");
    xml
}

fn push_string_cell(xml: &mut String, reference: &str, text: &str) {
    xml.push_str(&format!(
        r#"<c r="{}" t="inlineStr"><is><t xml:space="preserve">{}</t></is></c>"#,
        reference,
        escape_xml(text)
    ));
}

fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            // XML 1.0 forbids most control characters
            c if c.is_control() && !matches!(c, '\t' | '\n' | '\r') => {}
            c => out.push(c),
        }
    }
    out
}

fn workbook_xml(sheet_name: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"><sheets><sheet name="{}" sheetId="1" r:id="rId1"/></sheets></workbook>"#,
        escape_xml(sheet_name)
    )
}

const CONTENT_TYPES_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/><Override PartName="/xl/worksheets/sheet1.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/></Types>"#;

const ROOT_RELS_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/></Relationships>"#;

const WORKBOOK_RELS_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet1.xml"/></Relationships>"#;

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Read;
    use zip::ZipArchive;

    fn row(pairs: &[(&str, Value)]) -> Row {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    fn read_part(bytes: &[u8], name: &str) -> String {
        let mut archive = ZipArchive::new(Cursor::new(bytes)).unwrap();
        let mut file = archive.by_name(name).unwrap();
        let mut out = String::new();
        file.read_to_string(&mut out).unwrap();
        out
    }

    #[test]
    fn empty_rows_produce_an_empty_single_sheet_workbook() {
        let bytes = export_json_to_xlsx(&[], "Datos").unwrap();

        let archive = ZipArchive::new(Cursor::new(bytes.as_slice())).unwrap();
        assert_eq!(archive.len(), 5);

        let sheet = read_part(&bytes, "xl/worksheets/sheet1.xml");
        assert!(sheet.contains("<sheetData/>"));
        let workbook = read_part(&bytes, "xl/workbook.xml");
        assert_eq!(workbook.matches("<sheet ").count(), 1);
        assert!(workbook.contains(r#"name="Datos""#));
    }

    #[test]
    fn column_order_follows_first_row_even_with_missing_keys() {
        let rows = vec![
            row(&[("nombre", json!("Osciloscopio")), ("id", json!(1)), ("lab", json!("Física"))]),
            row(&[("id", json!(2)), ("nombre", json!("Microscopio"))]),
            row(&[("extra", json!(true)), ("id", json!(3))]),
        ];

        assert_eq!(columns(&rows), vec!["nombre", "id", "lab", "extra"]);

        let bytes = export_json_to_xlsx(&rows, "Datos").unwrap();
        let sheet = read_part(&bytes, "xl/worksheets/sheet1.xml");

        let header_a = sheet.find(r#"<c r="A1""#).unwrap();
        let header_b = sheet.find(r#"<c r="B1""#).unwrap();
        assert!(header_a < header_b);
        assert!(sheet.contains(r#"<c r="A1" t="inlineStr"><is><t xml:space="preserve">nombre</t>"#));
        assert!(sheet.contains(r#"<c r="B3"><v>2</v></c>"#));
        assert!(sheet.contains(r#"<c r="A3" t="inlineStr"><is><t xml:space="preserve">Microscopio</t>"#));
        // Row 3 has no "lab" value
        assert!(!sheet.contains(r#"<c r="C3""#));
        assert!(sheet.contains(r#"<c r="D4" t="b"><v>1</v></c>"#));
    }

    #[test]
    fn text_is_xml_escaped() {
        let rows = vec![row(&[("nota", json!("<a & b>"))])];
        let bytes = export_json_to_xlsx(&rows, "Datos").unwrap();
        let sheet = read_part(&bytes, "xl/worksheets/sheet1.xml");
        assert!(sheet.contains("&lt;a &amp; b&gt;"));
    }

    #[test]
    fn column_letters_roll_over() {
        assert_eq!(column_letter(0), "A");
        assert_eq!(column_letter(25), "Z");
        assert_eq!(column_letter(26), "AA");
        assert_eq!(column_letter(27), "AB");
        assert_eq!(column_letter(701), "ZZ");
        assert_eq!(column_letter(702), "AAA");
    }

    #[test]
    fn bad_sheet_names_are_rejected() {
        assert!(matches!(
            export_json_to_xlsx(&[], "a/b"),
            Err(ExportError::InvalidSheetName(_))
        ));
        assert!(export_json_to_xlsx(&[], &"x".repeat(32)).is_err());
    }

    #[test]
    fn download_names_default_and_gain_extension() {
        let sheet = Spreadsheet::download(&[], None, "export.xlsx", "Datos").unwrap();
        assert_eq!(sheet.filename, "export.xlsx");

        assert_eq!(sanitize_filename("reporte", "export.xlsx"), "reporte.xlsx");
        assert_eq!(sanitize_filename("../\"x\".XLSX", "export.xlsx"), "..x.XLSX");
        assert_eq!(sanitize_filename("  ", "export.xlsx"), "export.xlsx");
    }

    #[test]
    fn download_response_is_an_attachment() {
        let sheet = Spreadsheet::download(&[], Some("solicitudes"), "export.xlsx", "Datos").unwrap();
        let response = sheet.into_response();
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            HeaderValue::from_static(XLSX_CONTENT_TYPE)
        );
        assert_eq!(
            response.headers()[header::CONTENT_DISPOSITION],
            "attachment; filename=\"solicitudes.xlsx\""
        );
    }
}
