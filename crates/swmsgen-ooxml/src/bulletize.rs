//! Consolidated-table bullet conversion
//!
//! Rewrites the control column of the consolidated summary table from
//! semicolon-joined prose into square-bullet lists. The converter owns a
//! fixed numbering definition (id 99) which it replaces wholesale on
//! every run, so converting an already converted document is a no-op in
//! effect. When the template ships without a numbering part, a minimal
//! one is created and wired into the relationships and content types.

use std::fmt::Write as _;
use std::sync::OnceLock;

use regex::Regex;

use crate::archive::{
    DocxArchive, CONTENT_TYPES_PART, DOCUMENT_PART, DOCUMENT_RELS_PART, NUMBERING_PART,
};
use crate::error::{DocxError, Result};
use crate::numbering::NumberingPart;
use crate::rowbuild::CCVS_MARKER;
use crate::runfmt::{self, Emphasis, PhraseRule};
use crate::scan;
use crate::table::{self, DocumentXml};

/// Numbering ids owned by the converter.
pub const BULLET_ABSTRACT_ID: u32 = 99;
pub const BULLET_NUM_ID: u32 = 99;

/// Table and column the consolidated summary lives in.
pub const SUMMARY_TABLE: usize = 2;
pub const SUMMARY_COLUMN: usize = 3;

const NUMBERING_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.numbering+xml";
const NUMBERING_REL_TYPE: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/numbering";

/// What one conversion run did.
#[derive(Debug, Default, Clone, Copy)]
pub struct BulletizeReport {
    pub cells_converted: usize,
    pub bullets_written: usize,
    pub created_numbering_part: bool,
}

/// Square-bullet level definition at summary size (Calibri, 9pt).
fn marker_abstract_xml() -> String {
    format!(
        concat!(
            "<w:abstractNum w:abstractNumId=\"{id}\">",
            "<w:multiLevelType w:val=\"singleLevel\"/>",
            "<w:lvl w:ilvl=\"0\">",
            "<w:start w:val=\"1\"/>",
            "<w:numFmt w:val=\"bullet\"/>",
            "<w:lvlText w:val=\"\u{25AA}\"/>",
            "<w:lvlJc w:val=\"left\"/>",
            "<w:pPr><w:ind w:left=\"360\" w:hanging=\"180\"/></w:pPr>",
            "<w:rPr>",
            "<w:rFonts w:ascii=\"Calibri\" w:hAnsi=\"Calibri\" w:hint=\"default\"/>",
            "<w:sz w:val=\"18\"/><w:szCs w:val=\"18\"/>",
            "</w:rPr>",
            "</w:lvl>",
            "</w:abstractNum>"
        ),
        id = BULLET_ABSTRACT_ID
    )
}

fn marker_num_xml() -> String {
    format!(
        "<w:num w:numId=\"{BULLET_NUM_ID}\"><w:abstractNumId w:val=\"{BULLET_ABSTRACT_ID}\"/></w:num>"
    )
}

/// One bullet paragraph. The marker phrase, when present, renders as a
/// bold highlighted run; everything else is explicitly non-bold so the
/// paragraph ignores any bold carried by the cell's style.
fn bullet_para_xml(text: &str) -> String {
    let mut out = String::from(concat!(
        "<w:p><w:pPr>",
        "<w:numPr><w:ilvl w:val=\"0\"/><w:numId w:val=\"99\"/></w:numPr>",
        "<w:spacing w:before=\"0\" w:after=\"0\"/>",
        "</w:pPr>"
    ));
    let rules = [PhraseRule::bold_highlight(CCVS_MARKER)];
    for run in runfmt::split_styled(text, &rules) {
        let props = match run.emphasis {
            Emphasis::Plain => "<w:b w:val=\"0\"/>".to_string(),
            _ => "<w:b/><w:highlight w:val=\"yellow\"/>".to_string(),
        };
        let _ = write!(
            out,
            concat!(
                "<w:r><w:rPr>",
                "<w:rFonts w:ascii=\"Calibri\" w:hAnsi=\"Calibri\"/>",
                "<w:sz w:val=\"18\"/><w:szCs w:val=\"18\"/>{props}",
                "</w:rPr><w:t xml:space=\"preserve\">{text}</w:t></w:r>"
            ),
            props = props,
            text = runfmt::xml_escape(&run.text),
        );
    }
    out.push_str("</w:p>");
    out
}

/// Split cell prose into bullet items: semicolons separate items, empty
/// fragments are dropped.
fn split_bullets(text: &str) -> Vec<String> {
    text.split(';')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Ensure the archive has a numbering part carrying the converter's
/// definition, creating and wiring a minimal part when absent.
fn ensure_numbering(archive: &mut DocxArchive) -> Result<bool> {
    let (mut part, created) = match archive.numbering_xml() {
        Some(bytes) => (NumberingPart::parse(bytes)?, false),
        None => {
            let xml = concat!(
                r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
                r#"<w:numbering xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">"#,
                r#"</w:numbering>"#
            );
            wire_numbering_part(archive)?;
            (NumberingPart::parse(xml.as_bytes())?, true)
        }
    };
    part.replace_definition(
        BULLET_ABSTRACT_ID,
        BULLET_NUM_ID,
        &marker_abstract_xml(),
        &marker_num_xml(),
    )?;
    archive.set_part(NUMBERING_PART, part.into_bytes());
    Ok(created)
}

/// Register the numbering part in the document relationships and the
/// content types map.
fn wire_numbering_part(archive: &mut DocxArchive) -> Result<()> {
    let rels = archive
        .part_string(DOCUMENT_RELS_PART)?
        .ok_or_else(|| DocxError::MissingPart(DOCUMENT_RELS_PART.to_string()))?;
    if !rels.contains("Target=\"numbering.xml\"") {
        let rel_id = next_relationship_id(&rels);
        let relationship = format!(
            "<Relationship Id=\"{rel_id}\" Type=\"{NUMBERING_REL_TYPE}\" Target=\"numbering.xml\"/>"
        );
        let close = rels.rfind("</Relationships>").ok_or_else(|| {
            DocxError::TemplateShape("document relationships part has no close tag".to_string())
        })?;
        let mut rels = rels;
        rels.insert_str(close, &relationship);
        archive.set_part_string(DOCUMENT_RELS_PART, rels);
    }

    let types = archive
        .part_string(CONTENT_TYPES_PART)?
        .ok_or_else(|| DocxError::MissingPart(CONTENT_TYPES_PART.to_string()))?;
    if !types.contains("/word/numbering.xml") {
        let over = format!(
            "<Override PartName=\"/word/numbering.xml\" ContentType=\"{NUMBERING_CONTENT_TYPE}\"/>"
        );
        let close = types.rfind("</Types>").ok_or_else(|| {
            DocxError::TemplateShape("content types part has no close tag".to_string())
        })?;
        let mut types = types;
        types.insert_str(close, &over);
        archive.set_part_string(CONTENT_TYPES_PART, types);
    }
    Ok(())
}

fn next_relationship_id(rels: &str) -> String {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| Regex::new(r#"Id="rId(\d+)""#).expect("static regex compiles"));
    let max = re
        .captures_iter(rels)
        .filter_map(|c| c[1].parse::<u32>().ok())
        .max()
        .unwrap_or(0);
    format!("rId{}", max + 1)
}

/// Convert the control column of the consolidated table to bullet lists.
pub fn bulletize(archive: &mut DocxArchive) -> Result<BulletizeReport> {
    bulletize_at(archive, SUMMARY_TABLE, SUMMARY_COLUMN)
}

/// Conversion driver with explicit table and column, for templates that
/// place the summary elsewhere.
pub fn bulletize_at(
    archive: &mut DocxArchive,
    table_index: usize,
    column: usize,
) -> Result<BulletizeReport> {
    let mut report = BulletizeReport {
        created_numbering_part: ensure_numbering(archive)?,
        ..BulletizeReport::default()
    };

    let mut doc = DocumentXml::parse(archive.document_xml()?)?;
    let table = doc.table_fragment(table_index)?;
    let rows = scan::child_spans(&table, b"tr")?;
    let mut edits: Vec<(scan::Span, String)> = Vec::new();

    // Row 0 is the header; data rows follow.
    for row_span in rows.iter().skip(1) {
        let row = row_span.slice(&table);
        let cells = scan::child_spans(row, b"tc")?;
        let Some(cell_span) = cells.get(column) else {
            continue;
        };
        let cell = cell_span.slice(row);

        let mut texts = Vec::new();
        for p_span in scan::child_spans(cell, b"p")? {
            texts.push(scan::concat_text(p_span.slice(cell))?);
        }
        let joined = texts.join(" ");
        let bullets = split_bullets(&joined);
        if bullets.is_empty() {
            continue;
        }

        let mut paragraphs = String::new();
        for bullet in &bullets {
            paragraphs.push_str(&bullet_para_xml(bullet));
        }
        let new_cell = table::cell_set_paragraphs(cell, &paragraphs)?;
        let new_row = {
            let mut out = String::with_capacity(row.len());
            out.push_str(&row[..cell_span.start]);
            out.push_str(&new_cell);
            out.push_str(&row[cell_span.end..]);
            out
        };
        report.cells_converted += 1;
        report.bullets_written += bullets.len();
        edits.push((*row_span, new_row));
    }

    if !edits.is_empty() {
        let rebuilt = scan::apply_edits(&table, edits);
        doc.replace_table(table_index, &rebuilt)?;
    }
    archive.set_part(DOCUMENT_PART, doc.into_bytes());
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn archive_with_table(cell_text: &str) -> DocxArchive {
        let mut archive = DocxArchive::new();
        let row = format!(
            concat!(
                "<w:tr>",
                "<w:tc><w:p><w:r><w:t>Task</w:t></w:r></w:p></w:tc>",
                "<w:tc><w:p><w:r><w:t>Hazard</w:t></w:r></w:p></w:tc>",
                "<w:tc><w:p><w:r><w:t>Risk</w:t></w:r></w:p></w:tc>",
                "<w:tc><w:p><w:r><w:t>{}</w:t></w:r></w:p></w:tc>",
                "</w:tr>"
            ),
            runfmt::xml_escape(cell_text)
        );
        let header = "<w:tr><w:tc><w:p><w:r><w:t>Controls</w:t></w:r></w:p></w:tc></w:tr>";
        let filler = "<w:tbl><w:tr><w:tc><w:p/></w:tc></w:tr></w:tbl>";
        let doc = format!(
            r#"<w:document xmlns:w="http://example/w"><w:body>{filler}{filler}<w:tbl>{header}{row}</w:tbl></w:body></w:document>"#
        );
        archive.set_part_string(DOCUMENT_PART, doc);
        archive.set_part_string(
            DOCUMENT_RELS_PART,
            concat!(
                r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
                r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
                r#"<Relationship Id="rId1" Type="http://example/officeDocument" Target="document.xml"/>"#,
                r#"</Relationships>"#
            ),
        );
        archive.set_part_string(
            CONTENT_TYPES_PART,
            concat!(
                r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
                r#"<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">"#,
                r#"<Override PartName="/word/document.xml" ContentType="application/xml"/>"#,
                r#"</Types>"#
            ),
        );
        archive
    }

    #[test]
    fn test_bulletize_splits_on_semicolons() {
        let mut archive =
            archive_with_table("Vacuum shroud on grinder; P2 respirator; Permit signed;");
        let report = bulletize(&mut archive).unwrap();
        assert_eq!(report.cells_converted, 1);
        assert_eq!(report.bullets_written, 3);
        let doc = archive.part_string(DOCUMENT_PART).unwrap().unwrap();
        assert_eq!(doc.matches("<w:numId w:val=\"99\"/>").count(), 3);
        assert!(doc.contains(">Permit signed<"));
        // Trailing separator produces no empty bullet.
        assert!(!doc.contains("<w:t xml:space=\"preserve\"></w:t>"));
    }

    #[test]
    fn test_bulletize_styles_marker() {
        let mut archive =
            archive_with_table("CCVS HOLD POINTS verify anchors; torque check");
        bulletize(&mut archive).unwrap();
        let doc = archive.part_string(DOCUMENT_PART).unwrap().unwrap();
        assert!(doc.contains(">CCVS HOLD POINTS<"));
        assert!(doc.contains("<w:highlight w:val=\"yellow\"/>"));
        // The remainder of the marker bullet stays non-bold.
        assert!(doc.contains("<w:b w:val=\"0\"/>"));
    }

    #[test]
    fn test_bulletize_creates_numbering_part() {
        let mut archive = archive_with_table("one; two");
        let report = bulletize(&mut archive).unwrap();
        assert!(report.created_numbering_part);
        let numbering = archive.part_string(NUMBERING_PART).unwrap().unwrap();
        assert!(numbering.contains("w:abstractNumId=\"99\""));
        assert!(numbering.contains("\u{25AA}"));
        let rels = archive.part_string(DOCUMENT_RELS_PART).unwrap().unwrap();
        assert!(rels.contains("Target=\"numbering.xml\""));
        assert!(rels.contains("Id=\"rId2\""));
        let types = archive.part_string(CONTENT_TYPES_PART).unwrap().unwrap();
        assert!(types.contains("/word/numbering.xml"));
    }

    #[test]
    fn test_bulletize_is_idempotent_on_numbering() {
        let mut archive = archive_with_table("one; two");
        bulletize(&mut archive).unwrap();
        bulletize(&mut archive).unwrap();
        let numbering = archive.part_string(NUMBERING_PART).unwrap().unwrap();
        assert_eq!(numbering.matches("w:abstractNumId=\"99\"").count(), 1);
        let rels = archive.part_string(DOCUMENT_RELS_PART).unwrap().unwrap();
        assert_eq!(rels.matches("Target=\"numbering.xml\"").count(), 1);
    }

    #[test]
    fn test_bulletize_skips_header_and_empty_cells() {
        let mut archive = archive_with_table("   ");
        let report = bulletize(&mut archive).unwrap();
        assert_eq!(report.cells_converted, 0);
        let doc = archive.part_string(DOCUMENT_PART).unwrap().unwrap();
        // Header row untouched.
        assert!(doc.contains(">Controls<"));
    }
}
