//! Table row and cell operations on the main document part
//!
//! The document part stays a single string; tables, rows, and cells are
//! located as byte spans and mutated by splicing owned fragments. Rows
//! pulled out of a table are fully self-contained and can be patched in
//! isolation before being appended back.

use crate::error::{DocxError, Result};
use crate::scan::{self, Span};

/// Extracted text of one table cell with its location, as consumed by
/// the PPE validator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellText {
    pub table: usize,
    pub row: usize,
    pub col: usize,
    pub text: String,
}

/// The main document part (word/document.xml)
#[derive(Debug, Clone)]
pub struct DocumentXml {
    xml: String,
}

impl DocumentXml {
    /// Parse the part. The root element must be `w:document`.
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        let xml = String::from_utf8(bytes.to_vec())?;
        if scan::first_element_start(&xml, b"document")?.is_none() {
            return Err(DocxError::TemplateShape(
                "root element is not w:document".to_string(),
            ));
        }
        Ok(Self { xml })
    }

    pub fn from_string(xml: String) -> Result<Self> {
        Self::parse(xml.as_bytes())
    }

    pub fn as_str(&self) -> &str {
        &self.xml
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.xml.into_bytes()
    }

    /// Replace the whole part text. Used by the document-wide formatting
    /// passes, which rebuild the body with runs re-split.
    pub fn set_text(&mut self, xml: String) {
        self.xml = xml;
    }

    pub fn table_count(&self) -> Result<usize> {
        Ok(scan::outer_spans(&self.xml, b"tbl")?.len())
    }

    fn table_span(&self, index: usize) -> Result<Span> {
        let tables = scan::outer_spans(&self.xml, b"tbl")?;
        let count = tables.len();
        tables.into_iter().nth(index).ok_or_else(|| {
            DocxError::TemplateShape(format!(
                "table {index} not found (document has {count} tables)"
            ))
        })
    }

    /// Owned fragment of the table at `index`.
    pub fn table_fragment(&self, index: usize) -> Result<String> {
        let span = self.table_span(index)?;
        Ok(span.slice(&self.xml).to_string())
    }

    /// Replace the table at `index` with a new fragment.
    pub fn replace_table(&mut self, index: usize, fragment: &str) -> Result<()> {
        let span = self.table_span(index)?;
        self.xml.replace_range(span.start..span.end, fragment);
        Ok(())
    }

    /// Owned row fragments of the table at `index`, header included.
    pub fn table_rows(&self, index: usize) -> Result<Vec<String>> {
        let table = self.table_fragment(index)?;
        let rows = scan::child_spans(&table, b"tr")?;
        Ok(rows
            .into_iter()
            .map(|span| span.slice(&table).to_string())
            .collect())
    }

    /// Replace every data row of the table at `index` (all rows after the
    /// header row) with the given fragments.
    pub fn replace_data_rows(&mut self, index: usize, rows: &[String]) -> Result<()> {
        let table_span = self.table_span(index)?;
        let table = table_span.slice(&self.xml);
        let existing = scan::child_spans(table, b"tr")?;
        let header = existing.first().ok_or_else(|| {
            DocxError::TemplateShape(format!("table {index} has no header row"))
        })?;

        let splice_start = table_span.start + header.end;
        let splice_end = match existing.last() {
            Some(last) => table_span.start + last.end,
            None => splice_start,
        };
        let replacement: String = rows.concat();
        self.xml.replace_range(splice_start..splice_end, &replacement);
        Ok(())
    }

    /// Extract every cell's concatenated text across all tables.
    pub fn table_cell_texts(&self) -> Result<Vec<CellText>> {
        let mut cells = Vec::new();
        for (table_idx, table_span) in scan::outer_spans(&self.xml, b"tbl")?.iter().enumerate() {
            let table = table_span.slice(&self.xml);
            for (row_idx, row_span) in scan::child_spans(table, b"tr")?.iter().enumerate() {
                let row = row_span.slice(table);
                for (col_idx, cell_span) in scan::child_spans(row, b"tc")?.iter().enumerate() {
                    cells.push(CellText {
                        table: table_idx,
                        row: row_idx,
                        col: col_idx,
                        text: scan::concat_text(cell_span.slice(row))?,
                    });
                }
            }
        }
        Ok(cells)
    }
}

/// Owned cell fragments of a row.
pub fn cell_fragments(row: &str) -> Result<Vec<String>> {
    Ok(scan::child_spans(row, b"tc")?
        .into_iter()
        .map(|span| span.slice(row).to_string())
        .collect())
}

/// Rebuild a row around one patched cell.
pub fn with_cell<F>(row: &str, cell_index: usize, patch: F) -> Result<String>
where
    F: FnOnce(&str) -> Result<String>,
{
    let cells = scan::child_spans(row, b"tc")?;
    let count = cells.len();
    let span = cells.into_iter().nth(cell_index).ok_or_else(|| {
        DocxError::TemplateShape(format!(
            "row has {count} cells, no cell {cell_index}"
        ))
    })?;
    let patched = patch(span.slice(row))?;
    Ok(scan::apply_edits(row, vec![(span, patched)]))
}

/// Replace every paragraph in a cell with new paragraph markup, keeping
/// the cell properties untouched.
pub fn cell_set_paragraphs(cell: &str, paragraphs_xml: &str) -> Result<String> {
    let paragraphs = scan::child_spans(cell, b"p")?;
    match (paragraphs.first(), paragraphs.last()) {
        (Some(first), Some(last)) => {
            let span = Span {
                start: first.start,
                end: last.end,
            };
            Ok(scan::apply_edits(
                cell,
                vec![(span, paragraphs_xml.to_string())],
            ))
        }
        _ => {
            let close = cell.rfind("</w:tc>").ok_or_else(|| {
                DocxError::TemplateShape("cell fragment has no close tag".to_string())
            })?;
            let mut out = cell.to_string();
            out.insert_str(close, paragraphs_xml);
            Ok(out)
        }
    }
}

/// Set cell background shading, inserting cell properties if absent.
pub fn cell_set_shading(cell: &str, fill: &str) -> Result<String> {
    let shd = format!("<w:shd w:val=\"clear\" w:color=\"auto\" w:fill=\"{fill}\"/>");
    upsert_in_props(cell, "tc", b"tcPr", b"shd", &shd)
}

/// Strip any background shading from a cell.
pub fn cell_remove_shading(cell: &str) -> Result<String> {
    let props = scan::child_spans(cell, b"tcPr")?;
    let Some(props_span) = props.first() else {
        return Ok(cell.to_string());
    };
    let props_fragment = props_span.slice(cell);
    let Some(shd) = scan::outer_spans(props_fragment, b"shd")?.into_iter().next() else {
        return Ok(cell.to_string());
    };
    let absolute = Span {
        start: props_span.start + shd.start,
        end: props_span.start + shd.end,
    };
    Ok(scan::apply_edits(cell, vec![(absolute, String::new())]))
}

/// Force a font colour on every run in the cell.
pub fn cell_set_text_color(cell: &str, color: &str) -> Result<String> {
    let color_xml = format!("<w:color w:val=\"{color}\"/>");
    let mut edits = Vec::new();
    for run_span in scan::outer_spans(cell, b"r")? {
        let run = run_span.slice(cell);
        let patched = run_upsert_prop(run, b"color", &color_xml)?;
        if patched != run {
            edits.push((run_span, patched));
        }
    }
    Ok(scan::apply_edits(cell, edits))
}

/// Make every run in the cell bold.
pub fn cell_bold_runs(cell: &str) -> Result<String> {
    let mut out = cell.to_string();
    let mut edits = Vec::new();
    for run_span in scan::outer_spans(&out, b"r")? {
        let run = run_span.slice(&out);
        if run_has_prop(run, b"b")? {
            continue;
        }
        edits.push((run_span, run_upsert_prop(run, b"b", "<w:b/>")?));
    }
    out = scan::apply_edits(&out, edits);
    Ok(out)
}

/// Keep the row on one page: ensure `w:cantSplit` in the row properties.
pub fn ensure_cant_split(row: &str) -> Result<String> {
    upsert_in_props(row, "tr", b"trPr", b"cantSplit", "<w:cantSplit/>")
}

/// True if a run fragment carries the given property element in its rPr.
pub fn run_has_prop(run: &str, local: &[u8]) -> Result<bool> {
    let props = scan::child_spans(run, b"rPr")?;
    match props.first() {
        Some(span) => scan::fragment_has(span.slice(run), local),
        None => Ok(false),
    }
}

/// Insert or replace one property element inside a run's rPr, creating
/// the rPr right after the run's open tag when missing.
pub fn run_upsert_prop(run: &str, local: &[u8], prop_xml: &str) -> Result<String> {
    let props = scan::child_spans(run, b"rPr")?;
    match props.first() {
        Some(props_span) => {
            let fragment = props_span.slice(run);
            if let Some(existing) = scan::outer_spans(fragment, local)?.into_iter().next() {
                let absolute = Span {
                    start: props_span.start + existing.start,
                    end: props_span.start + existing.end,
                };
                return Ok(scan::apply_edits(run, vec![(absolute, prop_xml.to_string())]));
            }
            // Append before the properties close tag, or expand an empty
            // element form.
            if let Some(rel) = fragment.rfind("</w:rPr>") {
                let mut out = run.to_string();
                out.insert_str(props_span.start + rel, prop_xml);
                Ok(out)
            } else {
                let expanded = format!("<w:rPr>{prop_xml}</w:rPr>");
                Ok(scan::apply_edits(
                    run,
                    vec![(*props_span, expanded)],
                ))
            }
        }
        None => {
            let at = scan::open_tag_end(run).ok_or_else(|| {
                DocxError::TemplateShape("run fragment has no open tag".to_string())
            })?;
            let mut out = run.to_string();
            out.insert_str(at, &format!("<w:rPr>{prop_xml}</w:rPr>"));
            Ok(out)
        }
    }
}

/// Shared shape of "ensure a property container right after the open
/// tag, then ensure the property inside it": used for trPr/cantSplit and
/// tcPr/shd.
fn upsert_in_props(
    fragment: &str,
    root: &str,
    props_local: &[u8],
    prop_local: &[u8],
    prop_xml: &str,
) -> Result<String> {
    let props = scan::child_spans(fragment, props_local)?;
    match props.first() {
        Some(props_span) => {
            let props_fragment = props_span.slice(fragment);
            if let Some(existing) = scan::outer_spans(props_fragment, prop_local)?
                .into_iter()
                .next()
            {
                let absolute = Span {
                    start: props_span.start + existing.start,
                    end: props_span.start + existing.end,
                };
                return Ok(scan::apply_edits(
                    fragment,
                    vec![(absolute, prop_xml.to_string())],
                ));
            }
            let close = format!("</w:{}>", String::from_utf8_lossy(props_local));
            if let Some(rel) = props_fragment.rfind(&close) {
                let mut out = fragment.to_string();
                out.insert_str(props_span.start + rel, prop_xml);
                Ok(out)
            } else {
                let name = String::from_utf8_lossy(props_local);
                let expanded = format!("<w:{name}>{prop_xml}</w:{name}>");
                Ok(scan::apply_edits(fragment, vec![(*props_span, expanded)]))
            }
        }
        None => {
            let at = scan::open_tag_end(fragment).ok_or_else(|| {
                DocxError::TemplateShape(format!("{root} fragment has no open tag"))
            })?;
            let name = String::from_utf8_lossy(props_local);
            let mut out = fragment.to_string();
            out.insert_str(at, &format!("<w:{name}>{prop_xml}</w:{name}>"));
            Ok(out)
        }
    }
}
