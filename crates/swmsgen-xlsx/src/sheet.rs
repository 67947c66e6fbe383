//! SpreadsheetML cell and row emitters
//!
//! The writer is single-pass: strings go out as `inlineStr` cells, so no
//! shared-strings table has to be accumulated and emitted afterwards.

use std::fmt::Write as _;

pub fn xml_escape(text: &str) -> String {
    quick_xml::escape::escape(text).into_owned()
}

/// Column letter for a zero-based index: 0 = A, 25 = Z, 26 = AA.
pub fn col_letter(col: usize) -> String {
    let mut out = String::new();
    let mut n = col + 1;
    while n > 0 {
        let rem = (n - 1) % 26;
        out.insert(0, (b'A' + rem as u8) as char);
        n = (n - 1) / 26;
    }
    out
}

/// A1-style reference for a one-based row and zero-based column.
pub fn cell_ref(row: usize, col: usize) -> String {
    format!("{}{row}", col_letter(col))
}

#[derive(Debug, Clone)]
pub enum CellValue {
    Text(String),
    Number(f64),
}

#[derive(Debug, Clone)]
pub struct Cell {
    pub col: usize,
    pub value: CellValue,
    pub style: u32,
}

impl Cell {
    pub fn text(col: usize, value: impl Into<String>, style: u32) -> Self {
        Self {
            col,
            value: CellValue::Text(value.into()),
            style,
        }
    }

    pub fn number(col: usize, value: f64, style: u32) -> Self {
        Self {
            col,
            value: CellValue::Number(value),
            style,
        }
    }
}

/// One `<row>` with explicit cell references, skipping empty columns.
pub fn row_xml(row: usize, cells: &[Cell], height: Option<f64>) -> String {
    let mut out = format!("<row r=\"{row}\"");
    if let Some(h) = height {
        let _ = write!(out, " ht=\"{h}\" customHeight=\"1\"");
    }
    out.push('>');
    for cell in cells {
        let r = cell_ref(row, cell.col);
        match &cell.value {
            CellValue::Text(text) => {
                let _ = write!(
                    out,
                    "<c r=\"{r}\" s=\"{}\" t=\"inlineStr\"><is><t xml:space=\"preserve\">{}</t></is></c>",
                    cell.style,
                    xml_escape(text)
                );
            }
            CellValue::Number(n) => {
                let _ = write!(out, "<c r=\"{r}\" s=\"{}\"><v>{n}</v></c>", cell.style);
            }
        }
    }
    out.push_str("</row>");
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_col_letters() {
        assert_eq!(col_letter(0), "A");
        assert_eq!(col_letter(9), "J");
        assert_eq!(col_letter(25), "Z");
        assert_eq!(col_letter(26), "AA");
        assert_eq!(cell_ref(7, 6), "G7");
    }

    #[test]
    fn test_row_xml_escapes_and_types() {
        let xml = row_xml(
            3,
            &[
                Cell::text(1, "a < b", 2),
                Cell::number(2, 4.0, 0),
            ],
            Some(80.0),
        );
        assert!(xml.starts_with("<row r=\"3\" ht=\"80\" customHeight=\"1\">"));
        assert!(xml.contains("<c r=\"B3\" s=\"2\" t=\"inlineStr\"><is><t xml:space=\"preserve\">a &lt; b</t></is></c>"));
        assert!(xml.contains("<c r=\"C3\" s=\"0\"><v>4</v></c>"));
    }
}
