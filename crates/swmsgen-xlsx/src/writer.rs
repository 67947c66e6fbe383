//! Workbook assembly
//!
//! Emits the package parts directly and zips them: content types, the
//! two worksheets, the fixed styles part, and the relationship plumbing.
//! Sheet 1 is the register table with summaries and hold points; sheet 2
//! carries the risk matrix and the reference lists the dropdowns point
//! at.

use std::fmt::Write as _;
use std::fs::File;
use std::io::{Seek, Write};
use std::path::Path;

use zip::write::SimpleFileOptions;
use zip::ZipWriter;

use crate::config::{RegisterConfig, RiskEntry};
use crate::error::Result;
use crate::sheet::{cell_ref, col_letter, row_xml, xml_escape, Cell};
use crate::styles::{self, risk_style, styles_xml};

const HEADER_ROW: usize = 7;
const COLUMNS: usize = 10;
const COLUMN_WIDTHS: [u32; COLUMNS] = [4, 40, 6, 40, 12, 12, 14, 80, 12, 22];
const DATA_ROW_HEIGHT: f64 = 80.0;

const LIKELIHOOD_LABELS: [&str; 5] = [
    "A \u{2014} Almost Certain",
    "B \u{2014} Likely",
    "C \u{2014} Possible",
    "D \u{2014} Unlikely",
    "E \u{2014} Rare",
];
const CONSEQUENCE_LABELS: [&str; 3] =
    ["1 \u{2014} Minor", "2 \u{2014} Moderate", "3 \u{2014} Major"];
const CATEGORY_CODES: [&str; 10] = [
    "WAH", "SIL", "ENV", "STR", "ASB", "LED", "TRF", "CHM", "WAT", "EMR",
];
const RATING_LIST: [&str; 8] = [
    "Critical (6)",
    "Critical (5)",
    "High (4)",
    "High (3)",
    "Medium (3)",
    "Medium (2)",
    "Low (2)",
    "Low (1)",
];

/// Matrix rows are likelihood A..E, columns consequence 1..3.
const RISK_MATRIX: [[(&str, u8); 3]; 5] = [
    [("High", 3), ("Critical", 5), ("Critical", 6)],
    [("Medium", 2), ("High", 4), ("Critical", 5)],
    [("Low", 1), ("Medium", 3), ("High", 4)],
    [("Low", 1), ("Low", 2), ("Medium", 3)],
    [("Low", 1), ("Low", 1), ("Low", 2)],
];

// Fixed rows of the lists sheet; the rating dropdown references these.
const RATING_LIST_FIRST_ROW: usize = 42;
const RATING_LIST_LAST_ROW: usize = 49;

/// Write the workbook to a file.
pub fn write_register_file<P: AsRef<Path>>(config: &RegisterConfig, path: P) -> Result<()> {
    let file = File::create(path)?;
    write_register(config, file)
}

/// Write the workbook to any seekable sink.
pub fn write_register<W: Write + Seek>(config: &RegisterConfig, writer: W) -> Result<()> {
    let mut zip = ZipWriter::new(writer);
    let options = SimpleFileOptions::default()
        .compression_method(zip::CompressionMethod::Deflated);

    let parts: [(&str, String); 7] = [
        ("[Content_Types].xml", content_types_xml()),
        ("_rels/.rels", package_rels_xml()),
        ("xl/workbook.xml", workbook_xml()),
        ("xl/_rels/workbook.xml.rels", workbook_rels_xml()),
        ("xl/styles.xml", styles_xml()),
        ("xl/worksheets/sheet1.xml", register_sheet_xml(config)),
        ("xl/worksheets/sheet2.xml", matrix_sheet_xml()),
    ];
    for (name, contents) in parts {
        zip.start_file(name, options)?;
        zip.write_all(contents.as_bytes())?;
    }
    zip.finish()?;
    Ok(())
}

fn content_types_xml() -> String {
    concat!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
        r#"<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">"#,
        r#"<Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>"#,
        r#"<Default Extension="xml" ContentType="application/xml"/>"#,
        r#"<Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/>"#,
        r#"<Override PartName="/xl/worksheets/sheet1.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/>"#,
        r#"<Override PartName="/xl/worksheets/sheet2.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/>"#,
        r#"<Override PartName="/xl/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.styles+xml"/>"#,
        r#"</Types>"#
    )
    .to_string()
}

fn package_rels_xml() -> String {
    concat!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
        r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
        r#"<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/>"#,
        r#"</Relationships>"#
    )
    .to_string()
}

fn workbook_xml() -> String {
    concat!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
        r#"<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">"#,
        r#"<sheets>"#,
        r#"<sheet name="Risk Register" sheetId="1" r:id="rId1"/>"#,
        r#"<sheet name="Matrix &amp; Lists" sheetId="2" r:id="rId2"/>"#,
        r#"</sheets>"#,
        r#"</workbook>"#
    )
    .to_string()
}

fn workbook_rels_xml() -> String {
    concat!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
        r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
        r#"<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet1.xml"/>"#,
        r#"<Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet2.xml"/>"#,
        r#"<Relationship Id="rId3" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/>"#,
        r#"</Relationships>"#
    )
    .to_string()
}

fn risk_cell(col: usize, text: &str) -> Cell {
    let style = swmsgen_model::RiskLevel::detect(text)
        .map(risk_style)
        .unwrap_or(styles::STYLE_RISK_GREEN);
    Cell::text(col, text, style)
}

fn data_row_cells(entry: &RiskEntry, band: bool) -> Vec<Cell> {
    let body = |s| if band { styles::banded(s) } else { s };
    vec![
        Cell::text(0, &entry.id, body(styles::STYLE_BODY_CENTER)),
        Cell::text(1, &entry.task, body(styles::STYLE_BODY)),
        Cell::text(2, &entry.category, body(styles::STYLE_BODY_BOLD_CENTER)),
        Cell::text(3, &entry.description, body(styles::STYLE_BODY)),
        Cell::text(4, &entry.likelihood, body(styles::STYLE_BODY_CENTER)),
        Cell::text(5, &entry.consequence, body(styles::STYLE_BODY_CENTER)),
        Cell::text(
            6,
            entry.rating_initial.to_string(),
            risk_style(entry.rating_initial.level),
        ),
        Cell::text(7, &entry.controls, body(styles::STYLE_BODY)),
        Cell::text(
            8,
            entry.rating_residual.to_string(),
            risk_style(entry.rating_residual.level),
        ),
        Cell::text(9, &entry.owner, body(styles::STYLE_BODY)),
    ]
}

fn list_validation(
    sqref: &str,
    formula: &str,
    title: &str,
    error: &str,
) -> String {
    format!(
        concat!(
            "<dataValidation type=\"list\" allowBlank=\"1\" showInputMessage=\"1\" ",
            "showErrorMessage=\"1\" errorTitle=\"{title}\" error=\"{error}\" sqref=\"{sqref}\">",
            "<formula1>{formula}</formula1></dataValidation>"
        ),
        title = xml_escape(title),
        error = xml_escape(error),
        sqref = sqref,
        formula = xml_escape(formula),
    )
}

fn rating_conditional_formatting(col: &str, first: usize, last: usize) -> String {
    let range = format!("{col}{first}:{col}{last}");
    let anchor = format!("{col}{first}");
    let rules = [
        ("Critical", styles::DXF_CRITICAL),
        ("High", styles::DXF_HIGH),
        ("Medium", styles::DXF_MEDIUM),
        ("Low", styles::DXF_LOW),
    ];
    let mut out = format!("<conditionalFormatting sqref=\"{range}\">");
    for (priority, (level, dxf)) in rules.iter().enumerate() {
        let _ = write!(
            out,
            concat!(
                "<cfRule type=\"expression\" dxfId=\"{dxf}\" priority=\"{priority}\">",
                "<formula>NOT(ISERROR(SEARCH(&quot;{level}&quot;,{anchor})))</formula></cfRule>"
            ),
            dxf = dxf,
            priority = priority + 1,
            level = level,
            anchor = anchor,
        );
    }
    out.push_str("</conditionalFormatting>");
    out
}

fn register_sheet_xml(config: &RegisterConfig) -> String {
    let data_start = HEADER_ROW + 1;
    let data_end = data_start + config.risks.len().saturating_sub(1);
    let mut rows = String::new();

    // Project header block.
    let details = [
        ("Project:", config.project.as_str()),
        ("PCBU / Principal Contractor:", config.pcbu.as_str()),
        ("Jurisdiction:", config.jurisdiction.as_str()),
        ("Date Prepared:", config.date.as_str()),
        ("Prepared by:", config.prepared_by.as_str()),
    ];
    for (i, (label, value)) in details.iter().enumerate() {
        rows.push_str(&row_xml(
            i + 1,
            &[
                Cell::text(0, *label, styles::STYLE_LABEL),
                Cell::text(1, *value, styles::STYLE_VALUE),
            ],
            None,
        ));
    }

    // Column headers.
    let headers = [
        "#",
        "Task",
        "Code",
        "Hazard",
        "Likelihood\n(Pre)",
        "Consequence\n(Pre)",
        "Risk Rating\n(Pre-Controls)",
        "Controls",
        "Residual\nRisk",
        "Responsible\nPerson",
    ];
    let header_cells: Vec<Cell> = headers
        .iter()
        .enumerate()
        .map(|(col, text)| Cell::text(col, *text, styles::STYLE_HEADER))
        .collect();
    rows.push_str(&row_xml(HEADER_ROW, &header_cells, None));

    // Data rows with alternate banding.
    for (i, entry) in config.risks.iter().enumerate() {
        rows.push_str(&row_xml(
            data_start + i,
            &data_row_cells(entry, i % 2 == 1),
            Some(DATA_ROW_HEIGHT),
        ));
    }

    // Summary blocks.
    let mut merges: Vec<String> = Vec::new();
    let mut next = data_end + 3;
    rows.push_str(&row_xml(
        next,
        &[Cell::text(0, "Risk Profile Summary", styles::STYLE_TITLE)],
        None,
    ));
    next += 2;
    for (title, summary) in [
        ("Pre-Controls", config.summary(|r| &r.rating_initial)),
        (
            "Post-Controls (Residual)",
            config.summary(|r| &r.rating_residual),
        ),
    ] {
        rows.push_str(&row_xml(
            next,
            &[Cell::text(0, title, styles::STYLE_LABEL)],
            None,
        ));
        next += 1;
        rows.push_str(&row_xml(
            next,
            &[
                Cell::text(0, "Risk Rating", styles::STYLE_HEADER),
                Cell::text(1, "Count", styles::STYLE_HEADER),
            ],
            None,
        ));
        next += 1;
        for (rating, count) in summary {
            rows.push_str(&row_xml(
                next,
                &[
                    risk_cell(0, &rating),
                    Cell::number(1, count as f64, styles::STYLE_BODY_CENTER),
                ],
                None,
            ));
            next += 1;
        }
        next += 1;
    }

    // Hold points and references, merged across the first six columns.
    for (title, items, style) in [
        (
            "Critical Hold Points",
            config.all_hold_points(),
            styles::STYLE_BULLET,
        ),
        (
            "References",
            config.references.iter().map(String::as_str).collect(),
            styles::STYLE_BULLET,
        ),
    ] {
        next += 1;
        rows.push_str(&row_xml(
            next,
            &[Cell::text(0, title, styles::STYLE_TITLE)],
            None,
        ));
        next += 1;
        for item in items {
            rows.push_str(&row_xml(
                next,
                &[Cell::text(0, format!("\u{2022} {item}"), style)],
                None,
            ));
            merges.push(format!("{}:{}", cell_ref(next, 0), cell_ref(next, 5)));
            next += 1;
        }
        next += 1;
    }

    let cols: String = COLUMN_WIDTHS
        .iter()
        .enumerate()
        .map(|(i, w)| {
            format!(
                "<col min=\"{n}\" max=\"{n}\" width=\"{w}\" customWidth=\"1\"/>",
                n = i + 1
            )
        })
        .collect();

    let merge_cells = if merges.is_empty() {
        String::new()
    } else {
        format!(
            "<mergeCells count=\"{}\">{}</mergeCells>",
            merges.len(),
            merges
                .iter()
                .map(|m| format!("<mergeCell ref=\"{m}\"/>"))
                .collect::<String>()
        )
    };

    let validations = format!(
        "<dataValidations count=\"4\">{}{}{}{}</dataValidations>",
        list_validation(
            &format!("E{data_start}:E{data_end}"),
            &format!("\"{}\"", LIKELIHOOD_LABELS.join(",")),
            "Invalid Likelihood",
            "Select a valid likelihood (A\u{2013}E)",
        ),
        list_validation(
            &format!("F{data_start}:F{data_end}"),
            &format!("\"{}\"", CONSEQUENCE_LABELS.join(",")),
            "Invalid Consequence",
            "Select a valid consequence (1\u{2013}3)",
        ),
        list_validation(
            &format!("C{data_start}:C{data_end}"),
            &format!("\"{}\"", CATEGORY_CODES.join(",")),
            "Invalid Code",
            "Select a valid Gatekeeper code",
        ),
        list_validation(
            &format!("I{data_start}:I{data_end}"),
            &format!(
                "'Matrix & Lists'!$A${RATING_LIST_FIRST_ROW}:$A${RATING_LIST_LAST_ROW}"
            ),
            "Invalid Residual Risk",
            "Select a valid residual risk rating",
        ),
    );

    let conditional = format!(
        "{}{}",
        rating_conditional_formatting("G", data_start, data_end),
        rating_conditional_formatting("I", data_start, data_end),
    );

    format!(
        concat!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
            r#"<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">"#,
            "<dimension ref=\"A1:{last_col}{last_row}\"/>",
            "<sheetViews><sheetView workbookViewId=\"0\">",
            "<pane ySplit=\"{header_row}\" topLeftCell=\"A{data_start}\" activePane=\"bottomLeft\" state=\"frozen\"/>",
            "</sheetView></sheetViews>",
            "<cols>{cols}</cols>",
            "<sheetData>{rows}</sheetData>",
            "<autoFilter ref=\"A{header_row}:J{data_end}\"/>",
            "{merge_cells}",
            "{conditional}",
            "{validations}",
            "<pageMargins left=\"0.5\" right=\"0.5\" top=\"0.5\" bottom=\"0.5\" header=\"0.3\" footer=\"0.3\"/>",
            "<pageSetup paperSize=\"9\" orientation=\"landscape\" fitToWidth=\"1\" fitToHeight=\"0\"/>",
            "</worksheet>"
        ),
        last_col = col_letter(COLUMNS - 1),
        last_row = next,
        header_row = HEADER_ROW,
        data_start = data_start,
        data_end = data_end,
        cols = cols,
        rows = rows,
        merge_cells = merge_cells,
        conditional = conditional,
        validations = validations,
    )
}

fn matrix_sheet_xml() -> String {
    let mut rows = String::new();

    // Matrix: consequence codes in row 1 for lookup, labels in row 2,
    // likelihood rows beneath.
    let code_cells: Vec<Cell> = (0..3)
        .map(|j| Cell::text(j + 1, (j + 1).to_string(), styles::STYLE_HEADER))
        .collect();
    rows.push_str(&row_xml(1, &code_cells, None));

    let mut label_cells = vec![Cell::text(
        0,
        "Likelihood \\ Consequence",
        styles::STYLE_HEADER,
    )];
    for (j, label) in CONSEQUENCE_LABELS.iter().enumerate() {
        label_cells.push(Cell::text(j + 1, *label, styles::STYLE_HEADER));
    }
    label_cells.push(Cell::text(4, "Likelihood Label", styles::STYLE_HEADER));
    rows.push_str(&row_xml(2, &label_cells, None));

    for (i, label) in LIKELIHOOD_LABELS.iter().enumerate() {
        let code = &label[..1];
        let mut cells = vec![Cell::text(0, code, styles::STYLE_BODY_BOLD_CENTER)];
        for (j, (level, score)) in RISK_MATRIX[i].iter().enumerate() {
            cells.push(risk_cell(j + 1, &format!("{level} ({score})")));
        }
        cells.push(Cell::text(4, *label, styles::STYLE_BODY));
        rows.push_str(&row_xml(3 + i, &cells, None));
    }

    // Reference lists: likelihood and consequence definitions, category
    // codes, and the rating list the residual dropdown points at.
    let likelihood_defs = [
        ("A \u{2014} Almost Certain", "Expected to occur in most circumstances"),
        ("B \u{2014} Likely", "Will probably occur in most circumstances"),
        ("C \u{2014} Possible", "Might occur at some time"),
        ("D \u{2014} Unlikely", "Could occur but not expected"),
        ("E \u{2014} Rare", "May occur only in exceptional circumstances"),
    ];
    let consequence_defs = [
        ("1 \u{2014} Minor", "First aid treatment; minor property damage"),
        ("2 \u{2014} Moderate", "Medical treatment; significant property damage"),
        (
            "3 \u{2014} Major",
            "Fatality, permanent disability, or major structural failure",
        ),
    ];
    let category_defs = [
        ("WAH", "Work at height \u{2014} collective height access (EWP, scaffold, ladder)"),
        ("SIL", "Silica and dust"),
        ("ENV", "Environmental and chemical"),
        ("STR", "Structural"),
        ("ASB", "Asbestos"),
        ("LED", "Lead"),
        ("TRF", "Traffic and public interface"),
        ("CHM", "Chemical hazards"),
        ("WAT", "Water / waterproofing hazards"),
        ("EMR", "Emergency response"),
    ];
    let rating_actions = [
        "Immediate stop work \u{2014} controls must be verified and approved before proceeding",
        "Immediate stop work \u{2014} controls must be verified and approved before proceeding",
        "Senior management attention required \u{2014} additional controls needed",
        "Senior management attention required \u{2014} additional controls needed",
        "Manage with specific procedures and monitoring",
        "Manage with specific procedures and monitoring",
        "Manage by routine procedures",
        "Manage by routine procedures",
    ];

    let mut next = 10;
    for (title, header, items) in [
        (
            "Likelihood Definitions",
            ("Level", "Description"),
            likelihood_defs.as_slice(),
        ),
        (
            "Consequence Definitions",
            ("Level", "Description"),
            consequence_defs.as_slice(),
        ),
        (
            "Gatekeeper Hazard Codes",
            ("Code", "Category"),
            category_defs.as_slice(),
        ),
    ] {
        rows.push_str(&row_xml(
            next,
            &[Cell::text(0, title, styles::STYLE_LABEL)],
            None,
        ));
        rows.push_str(&row_xml(
            next + 1,
            &[
                Cell::text(0, header.0, styles::STYLE_HEADER),
                Cell::text(1, header.1, styles::STYLE_HEADER),
            ],
            None,
        ));
        for (i, (key, desc)) in items.iter().enumerate() {
            rows.push_str(&row_xml(
                next + 2 + i,
                &[
                    Cell::text(0, *key, styles::STYLE_BODY_BOLD),
                    Cell::text(1, *desc, styles::STYLE_BODY),
                ],
                None,
            ));
        }
        next += 2 + items.len() + 2;
    }

    rows.push_str(&row_xml(
        next,
        &[Cell::text(0, "Risk Levels", styles::STYLE_LABEL)],
        None,
    ));
    rows.push_str(&row_xml(
        next + 1,
        &[
            Cell::text(0, "Rating", styles::STYLE_HEADER),
            Cell::text(1, "Action Required", styles::STYLE_HEADER),
        ],
        None,
    ));
    debug_assert_eq!(next + 2, RATING_LIST_FIRST_ROW);
    for (i, (rating, action)) in RATING_LIST.iter().zip(rating_actions).enumerate() {
        rows.push_str(&row_xml(
            next + 2 + i,
            &[risk_cell(0, rating), Cell::text(1, action, styles::STYLE_BODY)],
            None,
        ));
    }
    let last_row = next + 2 + RATING_LIST.len() - 1;

    let widths = [12, 16, 16, 16, 24];
    let cols: String = widths
        .iter()
        .enumerate()
        .map(|(i, w)| {
            format!(
                "<col min=\"{n}\" max=\"{n}\" width=\"{w}\" customWidth=\"1\"/>",
                n = i + 1
            )
        })
        .collect();

    format!(
        concat!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
            r#"<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">"#,
            "<dimension ref=\"A1:E{last_row}\"/>",
            "<cols>{cols}</cols>",
            "<sheetData>{rows}</sheetData>",
            "<pageMargins left=\"0.5\" right=\"0.5\" top=\"0.5\" bottom=\"0.5\" header=\"0.3\" footer=\"0.3\"/>",
            "<pageSetup paperSize=\"9\" orientation=\"landscape\"/>",
            "</worksheet>"
        ),
        last_row = last_row,
        cols = cols,
        rows = rows,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> RegisterConfig {
        toml::from_str(
            r#"
            project = "18 Danks St Waterloo"
            pcbu = "RPD Digital"
            jurisdiction = "NSW"
            date = "2026-08-30"
            prepared_by = "Site Engineer"
            references = ["WHS Regulation 2017 (NSW)"]

            [[risks]]
            id = "1"
            task = "Crack stitching"
            category = "STR"
            description = "Silica dust from slot cutting"
            likelihood = "B — Likely"
            consequence = "3 — Major"
            rating_initial = "Critical (5)"
            rating_residual = "Low (2)"
            controls = "Engineering: vacuum shroud; PPE: P2 respirator"

            [[risks]]
            id = "2"
            task = "Chemical anchors"
            category = "STR"
            description = "Anchor failure under load"
            rating_initial = "Medium (3)"
            rating_residual = "Low (1)"
            controls = "CCVS HOLD POINTS proof load; torque check"
            hold_point = "Proof load test passed"
            "#,
        )
        .unwrap()
    }

    #[test]
    fn test_register_sheet_layout() {
        let xml = register_sheet_xml(&config());
        // Header row at 7, data at 8 and 9, banding on the second row only.
        assert!(xml.contains("<row r=\"7\">"));
        assert!(xml.contains(">Risk Rating\n(Pre-Controls)<"));
        assert!(xml.contains(&format!(
            "<c r=\"G8\" s=\"{}\" t=\"inlineStr\"><is><t xml:space=\"preserve\">Critical (5)</t>",
            styles::STYLE_RISK_RED
        )));
        assert!(xml.contains(&format!(
            "<c r=\"G9\" s=\"{}\"",
            styles::STYLE_RISK_YELLOW
        )));
        assert!(xml.contains(&format!("<c r=\"B9\" s=\"{}\"", styles::STYLE_BODY_ALT)));
        assert!(xml.contains("<autoFilter ref=\"A7:J9\"/>"));
        assert!(xml.contains("state=\"frozen\""));
    }

    #[test]
    fn test_register_sheet_validations_and_rules() {
        let xml = register_sheet_xml(&config());
        assert_eq!(xml.matches("<dataValidation ").count(), 4);
        assert!(xml.contains("sqref=\"E8:E9\""));
        assert!(xml.contains(
            "'Matrix &amp; Lists'!$A$42:$A$49"
        ));
        // Four expression rules per rating column.
        assert_eq!(xml.matches("cfRule type=\"expression\"").count(), 8);
        assert!(xml.contains("SEARCH(&quot;Critical&quot;,G8)"));
        assert!(xml.contains("SEARCH(&quot;Low&quot;,I8)"));
    }

    #[test]
    fn test_register_sheet_summaries_and_hold_points() {
        let xml = register_sheet_xml(&config());
        assert!(xml.contains(">Risk Profile Summary<"));
        assert!(xml.contains(">Pre-Controls<"));
        assert!(xml.contains(">Post-Controls (Residual)<"));
        assert!(xml.contains(">\u{2022} Proof load test passed<"));
        assert!(xml.contains(">\u{2022} WHS Regulation 2017 (NSW)<"));
        assert!(xml.contains("<mergeCell ref=\"A"));
    }

    #[test]
    fn test_matrix_sheet_rating_list_rows() {
        let xml = matrix_sheet_xml();
        // The residual dropdown depends on these exact rows.
        assert!(xml.contains(&format!(
            "<c r=\"A{RATING_LIST_FIRST_ROW}\" s=\"{}\" t=\"inlineStr\"><is><t xml:space=\"preserve\">Critical (6)</t>",
            styles::STYLE_RISK_RED
        )));
        assert!(xml.contains(&format!("<c r=\"A{RATING_LIST_LAST_ROW}\"")));
        assert!(xml.contains(">Low (1)<"));
        // Matrix corner values.
        assert!(xml.contains(">Critical (6)<"));
        assert!(xml.contains(">Low (2)<"));
        assert!(xml.contains(">Likelihood \\ Consequence<"));
    }
}
