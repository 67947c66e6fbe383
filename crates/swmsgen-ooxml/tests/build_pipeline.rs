//! End-to-end build over a real zip package: template in, document out,
//! reopened from disk and checked part by part.

use std::io::Cursor;

use swmsgen_model::{
    ControlSection, Controls, DocumentPlan, RiskLevel, RiskRating, RowSource, TaskLibrary,
    TaskRecord, TemplateLayout,
};
use swmsgen_ooxml::{
    build_document, bulletize_at, DocxArchive, DocumentXml, DOCUMENT_PART, NUMBERING_PART,
};

fn cell(text: &str) -> String {
    format!(
        "<w:tc><w:tcPr><w:shd w:val=\"clear\" w:color=\"auto\" w:fill=\"D9D9D9\"/></w:tcPr><w:p><w:r><w:t>{text}</w:t></w:r></w:p></w:tc>"
    )
}

fn row(texts: &[&str]) -> String {
    let cells: String = texts.iter().map(|t| cell(t)).collect();
    format!("<w:tr>{cells}</w:tr>")
}

fn template_archive() -> DocxArchive {
    let header_rows: String = (0..9)
        .map(|i| {
            if i == 3 {
                "<w:tr><w:tc><w:p><w:r><w:t>[   ] Work in or near a shaft or trench deeper than 1.5 metres</w:t></w:r></w:p></w:tc></w:tr>".to_string()
            } else {
                format!("<w:tr><w:tc><w:p><w:r><w:t>header {i}</w:t></w:r></w:p></w:tc></w:tr>")
            }
        })
        .collect();
    let header_table = format!("<w:tbl>{header_rows}</w:tbl>");

    let mut task_rows = vec![row(&[
        "Task", "Hazard", "Initial", "Controls", "Residual", "Who", "Code",
    ])];
    for i in 1..=10 {
        task_rows.push(row(&[
            &format!("Template task {i}"),
            "Template hazard",
            "Medium (4)",
            "PPE: Safety glasses, gloves",
            "Low (2)",
            "Supervisor",
            "TPL-M4",
        ]));
    }
    let task_table = format!("<w:tbl>{}</w:tbl>", task_rows.concat());

    let summary_rows = format!(
        "{}{}",
        row(&["Task", "Hazard", "Risk", "Controls"]),
        row(&[
            "Anchors",
            "Falling objects",
            "High (6)",
            "CCVS HOLD POINTS verify anchors; torque check; permit signed",
        ]),
    );
    let summary_table = format!("<w:tbl>{summary_rows}</w:tbl>");

    let document = format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>{header_table}{task_table}{summary_table}</w:body></w:document>"#
    );
    let numbering = concat!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
        r#"<w:numbering xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">"#,
        r#"<w:abstractNum w:abstractNumId="2"><w:lvl w:ilvl="0">"#,
        r#"<w:numFmt w:val="decimal"/><w:lvlText w:val="(%1)"/></w:lvl></w:abstractNum>"#,
        r#"<w:num w:numId="4"><w:abstractNumId w:val="2"/></w:num>"#,
        r#"</w:numbering>"#
    );
    let rels = concat!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
        r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
        r#"<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="document.xml"/>"#,
        r#"</Relationships>"#
    );
    let content_types = concat!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
        r#"<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">"#,
        r#"<Default Extension="xml" ContentType="application/xml"/>"#,
        r#"</Types>"#
    );

    let mut archive = DocxArchive::new();
    archive.set_part_string(DOCUMENT_PART, document);
    archive.set_part_string(NUMBERING_PART, numbering);
    archive.set_part_string("word/_rels/document.xml.rels", rels);
    archive.set_part_string("[Content_Types].xml", content_types);
    archive
}

fn standard_task() -> TaskRecord {
    TaskRecord {
        name: "Crack stitching".to_string(),
        description: "Helical bars per engineering detail".to_string(),
        hazard: "Silica dust from slot cutting".to_string(),
        risk_pre: RiskRating::new(RiskLevel::High, 6),
        risk_post: RiskRating::new(RiskLevel::Low, 2),
        code: "STR-H6".to_string(),
        responsibility: "Supervisor".to_string(),
        controls: Controls::Standard {
            sections: vec![
                ControlSection {
                    label: "Engineering:".to_string(),
                    text: "Vacuum shroud \u{2014} depth stop fitted".to_string(),
                },
                ControlSection {
                    label: "STOP WORK if:".to_string(),
                    text: "Services found in cutting path".to_string(),
                },
            ],
        },
    }
}

fn hold_point_task() -> TaskRecord {
    TaskRecord {
        name: "Chemical anchors".to_string(),
        code: "STR-H7".to_string(),
        controls: Controls::HoldPoint {
            hold_points: vec![
                "Engineering detail reviewed".to_string(),
                "Proof load test passed".to_string(),
            ],
            engineering: vec!["Calibrated torque wrench".to_string()],
            admin: vec!["Permit signed".to_string()],
            ppe: vec!["Eye protection, nitrile gloves".to_string()],
            stop_work: vec!["Anchor fails proof load".to_string()],
        },
        ..standard_task()
    }
}

fn plan() -> DocumentPlan {
    DocumentPlan {
        title: "Remedial Works".to_string(),
        output: String::new(),
        rows: vec![
            RowSource::Reuse(1),
            RowSource::Reuse(2),
            RowSource::Reuse(3),
            RowSource::New("stitching".to_string()),
            RowSource::New("anchors".to_string()),
        ],
        hrcw_ticks: vec!["trench_1.5m".to_string()],
        layout: TemplateLayout::default(),
    }
}

fn library() -> TaskLibrary {
    let mut lib = TaskLibrary::default();
    lib.insert("stitching", standard_task());
    lib.insert("anchors", hold_point_task());
    lib
}

#[test]
fn test_full_build_survives_zip_round_trip() {
    let mut archive = template_archive();
    let report = build_document(&mut archive, &plan(), &library()).unwrap();
    assert_eq!(report.rows_reused, 3);
    assert_eq!(report.rows_built, 2);
    assert_eq!(report.pairs_allocated, 1);
    assert_eq!(report.checkboxes_ticked, 1);
    assert_eq!(report.level_texts_fixed, 1);

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("out.docx");
    archive.write_to_file(&path).unwrap();
    let reopened = DocxArchive::open(&path).unwrap();

    let doc = DocumentXml::parse(reopened.document_xml().unwrap()).unwrap();
    let rows = doc.table_rows(1).unwrap();
    assert_eq!(rows.len(), 6);

    // Reused rows: canonical PPE wording, template text otherwise intact.
    assert!(rows[1].contains("Eye protection"));
    assert!(rows[1].contains("cut-resistant gloves"));
    assert!(rows[1].contains("Template task 1"));

    // Synthesized standard row: header, badges, bolded label and dash.
    let texts = doc.table_cell_texts().unwrap();
    let control_text: String = texts
        .iter()
        .filter(|c| c.table == 1 && c.row == 4 && c.col == 3)
        .map(|c| c.text.clone())
        .collect();
    assert!(control_text.starts_with("STR (High-6): Controls in place."));
    assert!(control_text.contains("Engineering: Vacuum shroud \u{2014} Depth stop fitted"));

    // Hold-point row: banner plus numbered verification items.
    let hold_text: String = texts
        .iter()
        .filter(|c| c.table == 1 && c.row == 5 && c.col == 3)
        .map(|c| c.text.clone())
        .collect();
    assert!(hold_text.contains("STR (High-6) CCVS HOLD POINTS:"));
    assert!(hold_text.contains("HOLD POINT \u{2014} Do not commence until:"));
    assert!(hold_text.contains("Proof load test passed"));

    // Checkbox ticked in the header table.
    assert!(doc.as_str().contains('\u{2713}'));

    // Numbering: repaired level text plus one fresh decimal/bullet pair.
    let numbering = reopened.part_string(NUMBERING_PART).unwrap().unwrap();
    assert!(!numbering.contains("(%1)"));
    assert_eq!(numbering.matches("<w:num w:numId=").count(), 3);
}

#[test]
fn test_bulletize_consolidated_table() {
    let mut archive = template_archive();
    let report = bulletize_at(&mut archive, 2, 3).unwrap();
    assert_eq!(report.cells_converted, 1);
    assert_eq!(report.bullets_written, 3);

    let mut buffer = Cursor::new(Vec::new());
    archive.write_to(&mut buffer).unwrap();
    let reopened = DocxArchive::from_reader(Cursor::new(buffer.into_inner())).unwrap();

    let doc = reopened.part_string(DOCUMENT_PART).unwrap().unwrap();
    assert_eq!(doc.matches("<w:numId w:val=\"99\"/>").count(), 3);
    assert!(doc.contains(">CCVS HOLD POINTS<"));
    assert!(doc.contains(">torque check<"));

    let numbering = reopened.part_string(NUMBERING_PART).unwrap().unwrap();
    assert!(numbering.contains("w:abstractNumId=\"99\""));
    assert!(numbering.contains('\u{25AA}'));
}

#[test]
fn test_build_then_bulletize_compose() {
    let mut archive = template_archive();
    build_document(&mut archive, &plan(), &library()).unwrap();
    bulletize_at(&mut archive, 2, 3).unwrap();
    bulletize_at(&mut archive, 2, 3).unwrap();
    // Re-running the converter never stacks numbering definitions.
    let numbering = archive.part_string(NUMBERING_PART).unwrap().unwrap();
    assert_eq!(numbering.matches("w:abstractNumId=\"99\"").count(), 1);
    let doc = archive.part_string(DOCUMENT_PART).unwrap().unwrap();
    assert!(doc.contains(">CCVS HOLD POINTS<"));
}
