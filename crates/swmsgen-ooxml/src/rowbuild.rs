//! Task row synthesis and reuse fix-ups
//!
//! New rows are built by rewriting the cells of a reference row cloned
//! from the template, so borders, widths, and merges survive unchanged.
//! Reused rows keep their content and get the drift fix-ups: risk badge
//! text contrast, code cell styling, PPE terminology, and re-pointing
//! hold-point paragraphs that inherited a bullet list instead of a
//! numbered one.

use std::fmt::Write as _;

use swmsgen_model::{Controls, RiskRating, TaskRecord};

use crate::error::{DocxError, Result};
use crate::format::canonicalize_ppe_text;
use crate::numbering::{NumberingPair, NumberingPart};
use crate::runfmt::{self, ensure_marker, RunProps};
use crate::scan::{self, Span};
use crate::table;

/// Marker phrase that opens a consolidated hold-point summary.
pub const CCVS_MARKER: &str = "CCVS HOLD POINTS";

/// Cell order of a task row.
const CELL_TASK: usize = 0;
const CELL_HAZARD: usize = 1;
const CELL_RISK_PRE: usize = 2;
const CELL_CONTROLS: usize = 3;
const CELL_RISK_POST: usize = 4;
const CELL_RESPONSIBILITY: usize = 5;
const CELL_CODE: usize = 6;

/// Labels that close a hold-point region in a control cell.
const HOLD_POINT_SECTION_LABELS: [&str; 4] = ["Engineering:", "Admin:", "PPE:", "STOP WORK"];

/// Paragraph properties shared by every synthesized paragraph, with an
/// optional list binding.
fn para_props(num_id: Option<u32>) -> String {
    let mut out = String::from("<w:pPr>");
    if let Some(id) = num_id {
        let _ = write!(
            out,
            "<w:numPr><w:ilvl w:val=\"0\"/><w:numId w:val=\"{id}\"/></w:numPr>"
        );
    }
    out.push_str(concat!(
        "<w:spacing w:before=\"20\" w:after=\"20\" w:line=\"276\" w:lineRule=\"auto\"/>",
        "<w:ind w:left=\"227\" w:hanging=\"227\"/>",
        "</w:pPr>"
    ));
    out
}

fn para(num_id: Option<u32>, runs: &str) -> String {
    format!("<w:p>{}{runs}</w:p>", para_props(num_id))
}

/// Plain body paragraph.
pub fn text_para(text: &str) -> String {
    para(None, &runfmt::run_xml(text, &RunProps::default()))
}

/// Bold single-run paragraph, used for headers and cell titles.
pub fn bold_para(text: &str) -> String {
    para(None, &runfmt::run_xml(text, &RunProps::bold()))
}

/// Bold label followed by plain content in the same paragraph.
pub fn label_para(label: &str, content: &str) -> String {
    let runs = format!(
        "{}{}",
        runfmt::run_xml(&format!("{label} "), &RunProps::bold()),
        runfmt::run_xml(content, &RunProps::default()),
    );
    para(None, &runs)
}

/// Numbered list paragraph bound to a decimal definition.
pub fn numbered_para(text: &str, num_id: u32) -> String {
    para(Some(num_id), &runfmt::run_xml(text, &RunProps::default()))
}

/// Bulleted list paragraph bound to a bullet definition.
pub fn bulleted_para(text: &str, num_id: u32) -> String {
    para(Some(num_id), &runfmt::run_xml(text, &RunProps::default()))
}

/// `HOLD POINT — Do not commence until:` paragraph, all bold.
fn hold_point_banner() -> String {
    let runs = format!(
        "{}{}{}",
        runfmt::run_xml("HOLD POINT ", &RunProps::bold()),
        runfmt::run_xml("\u{2014}", &RunProps::bold()),
        runfmt::run_xml(" Do not commence until:", &RunProps::bold()),
    );
    para(None, &runs)
}

/// Control cell paragraphs for a standard task.
pub fn standard_control_paragraphs(task: &TaskRecord) -> Result<String> {
    let Controls::Standard { sections } = &task.controls else {
        return Err(DocxError::TemplateShape(
            "standard paragraphs requested for a hold-point task".to_string(),
        ));
    };
    let mut out = bold_para(&format!(
        "{} ({}): Controls in place.",
        task.code_prefix(),
        task.risk_pre.compact()
    ));
    for section in sections {
        out.push_str(&label_para(&section.label, &section.text));
    }
    Ok(out)
}

/// Control cell paragraphs for a hold-point task. Verification items
/// are numbered with the task's own decimal definition; the supporting
/// lists under each label use its bullet definition.
pub fn hold_point_control_paragraphs(
    task: &TaskRecord,
    pair: &NumberingPair,
) -> Result<String> {
    let Controls::HoldPoint {
        hold_points,
        engineering,
        admin,
        ppe,
        stop_work,
    } = &task.controls
    else {
        return Err(DocxError::TemplateShape(
            "hold-point paragraphs requested for a standard task".to_string(),
        ));
    };

    let mut out = bold_para(&format!(
        "{} ({}) {CCVS_MARKER}:",
        task.code_prefix(),
        task.risk_pre.compact()
    ));
    out.push_str(&hold_point_banner());
    for item in hold_points {
        out.push_str(&numbered_para(item, pair.decimal_num_id));
    }
    for (label, items) in [
        ("Engineering:", engineering),
        ("Admin:", admin),
        ("PPE:", ppe),
        ("STOP WORK if:", stop_work),
    ] {
        if items.is_empty() {
            continue;
        }
        out.push_str(&bold_para(label));
        for item in items {
            out.push_str(&bulleted_para(item, pair.bullet_num_id));
        }
    }
    Ok(out)
}

/// One-line control summary for the consolidated register. Hold-point
/// tasks carry the marker exactly once at the front so the bullet
/// converter can style it.
pub fn control_summary(task: &TaskRecord) -> String {
    match &task.controls {
        Controls::Standard { sections } => sections
            .iter()
            .map(|s| format!("{} {}", s.label, s.text))
            .collect::<Vec<_>>()
            .join("; "),
        Controls::HoldPoint {
            hold_points,
            engineering,
            admin,
            ppe,
            stop_work,
        } => {
            let mut items: Vec<&str> = Vec::new();
            items.extend(hold_points.iter().map(String::as_str));
            items.extend(engineering.iter().map(String::as_str));
            items.extend(admin.iter().map(String::as_str));
            items.extend(ppe.iter().map(String::as_str));
            items.extend(stop_work.iter().map(String::as_str));
            let joined = items.join("; ");
            let (with_marker, _) = ensure_marker(&joined, CCVS_MARKER);
            with_marker
        }
    }
}

/// Risk badge paragraph plus cell shading and text contrast.
fn risk_cell(cell: &str, rating: &RiskRating) -> Result<String> {
    let cell = table::cell_set_paragraphs(cell, &bold_para(&rating.to_string()))?;
    let cell = table::cell_set_shading(&cell, rating.level.fill_hex())?;
    table::cell_set_text_color(&cell, rating.level.text_hex())
}

/// Check the reference row has the layout's cell count before writing
/// anything into it.
pub fn check_reference_row(row: &str, columns: usize, which: &str) -> Result<()> {
    let cells = table::cell_fragments(row)?;
    if cells.len() != columns {
        return Err(DocxError::TemplateShape(format!(
            "{which} reference row has {} cells, layout expects {columns}",
            cells.len()
        )));
    }
    Ok(())
}

/// Synthesize a row for `task` from a cloned reference row.
pub fn build_row(
    reference_row: &str,
    task: &TaskRecord,
    pair: Option<&NumberingPair>,
) -> Result<String> {
    let controls = match (&task.controls, pair) {
        (Controls::Standard { .. }, _) => standard_control_paragraphs(task)?,
        (Controls::HoldPoint { .. }, Some(pair)) => hold_point_control_paragraphs(task, pair)?,
        (Controls::HoldPoint { .. }, None) => {
            return Err(DocxError::TemplateShape(
                "hold-point task built without a numbering pair".to_string(),
            ))
        }
    };

    let mut task_cell = bold_para(&task.name);
    if !task.description.is_empty() {
        task_cell.push_str(&text_para(&task.description));
    }

    let mut row = table::with_cell(reference_row, CELL_TASK, |c| {
        table::cell_set_paragraphs(c, &task_cell)
    })?;
    row = table::with_cell(&row, CELL_HAZARD, |c| {
        table::cell_set_paragraphs(c, &text_para(&task.hazard))
    })?;
    row = table::with_cell(&row, CELL_RISK_PRE, |c| risk_cell(c, &task.risk_pre))?;
    row = table::with_cell(&row, CELL_CONTROLS, |c| {
        table::cell_set_paragraphs(c, &controls)
    })?;
    row = table::with_cell(&row, CELL_RISK_POST, |c| risk_cell(c, &task.risk_post))?;
    row = table::with_cell(&row, CELL_RESPONSIBILITY, |c| {
        table::cell_set_paragraphs(c, &text_para(&task.responsibility))
    })?;
    row = table::with_cell(&row, CELL_CODE, |c| {
        let c = table::cell_set_paragraphs(c, &bold_para(&task.code))?;
        table::cell_remove_shading(&c)
    })?;
    table::ensure_cant_split(&row)
}

/// What the reuse fix-ups changed in one row.
#[derive(Debug, Default, Clone, Copy)]
pub struct ReuseReport {
    pub hold_points_renumbered: usize,
    pub ppe_texts_changed: usize,
}

/// Apply the drift fix-ups to a reused template row.
pub fn refresh_reused_row(
    row: &str,
    numbering: &mut NumberingPart,
) -> Result<(String, ReuseReport)> {
    let mut report = ReuseReport::default();
    let cells = table::cell_fragments(row)?;
    let mut row = row.to_string();

    if cells.len() > CELL_CONTROLS {
        let (patched, renumbered) = renumber_misfiled_hold_points(&row, numbering)?;
        row = patched;
        report.hold_points_renumbered = renumbered;
    }

    if cells.len() > CELL_CODE {
        for cell_index in [CELL_RISK_PRE, CELL_RISK_POST] {
            row = table::with_cell(&row, cell_index, |c| {
                let text = scan::concat_text(c)?;
                if text.trim().is_empty() {
                    return Ok(c.to_string());
                }
                let color = swmsgen_model::RiskLevel::detect(&text)
                    .map(|level| level.text_hex())
                    .unwrap_or("000000");
                table::cell_set_text_color(c, color)
            })?;
        }
        row = table::with_cell(&row, CELL_CODE, |c| {
            let c = table::cell_remove_shading(c)?;
            table::cell_bold_runs(&c)
        })?;
    }

    let (row, changed) = scan::rewrite_text_nodes(&row, canonicalize_ppe_text)?;
    report.ppe_texts_changed = changed;
    let row = table::ensure_cant_split(&row)?;
    Ok((row, report))
}

/// Re-point bullet-formatted paragraphs inside a hold-point region of
/// the control cell to a fresh decimal definition. A region opens at a
/// paragraph whose upper-cased text contains `HOLD POINT` and closes at
/// the next section label.
pub fn renumber_misfiled_hold_points(
    row: &str,
    numbering: &mut NumberingPart,
) -> Result<(String, usize)> {
    let formats = numbering.num_formats()?;
    let mut renumbered = 0usize;

    let row = table::with_cell(row, CELL_CONTROLS, |cell| {
        let paragraphs = scan::child_spans(cell, b"p")?;
        let mut in_hold_region = false;
        let mut misfiled: Vec<Span> = Vec::new();

        for p_span in &paragraphs {
            let p = p_span.slice(cell);
            let text = scan::concat_text(p)?;
            if text.to_uppercase().contains("HOLD POINT") {
                in_hold_region = true;
                continue;
            }
            if in_hold_region
                && HOLD_POINT_SECTION_LABELS
                    .iter()
                    .any(|label| text.contains(label))
            {
                in_hold_region = false;
                continue;
            }
            if !in_hold_region {
                continue;
            }
            if let Some(num_id) = paragraph_num_id(p)? {
                if formats.get(&num_id).map(String::as_str) == Some("bullet") {
                    misfiled.push(*p_span);
                }
            }
        }

        if misfiled.is_empty() {
            return Ok(cell.to_string());
        }

        let (_, num_id) = numbering.allocate_decimal()?;
        let mut edits: Vec<(Span, String)> = Vec::new();
        for p_span in misfiled {
            let p = p_span.slice(cell);
            let patched = set_paragraph_num_id(p, num_id)?;
            edits.push((p_span, patched));
            renumbered += 1;
        }
        Ok(scan::apply_edits(cell, edits))
    })?;

    Ok((row, renumbered))
}

/// List definition a paragraph is bound to, if any.
fn paragraph_num_id(paragraph: &str) -> Result<Option<u32>> {
    let Some(span) = numid_span(paragraph)? else {
        return Ok(None);
    };
    let element = span.slice(paragraph);
    let mut reader = quick_xml::Reader::from_str(element);
    loop {
        match reader.read_event()? {
            quick_xml::events::Event::Empty(e) | quick_xml::events::Event::Start(e) => {
                return Ok(scan::attr_value(&e, b"val")?.and_then(|v| v.parse().ok()));
            }
            quick_xml::events::Event::Eof => return Ok(None),
            _ => {}
        }
    }
}

fn set_paragraph_num_id(paragraph: &str, num_id: u32) -> Result<String> {
    let Some(span) = numid_span(paragraph)? else {
        return Ok(paragraph.to_string());
    };
    let mut out = String::with_capacity(paragraph.len());
    out.push_str(&paragraph[..span.start]);
    let _ = write!(out, "<w:numId w:val=\"{num_id}\"/>");
    out.push_str(&paragraph[span.end..]);
    Ok(out)
}

fn numid_span(paragraph: &str) -> Result<Option<Span>> {
    Ok(scan::outer_spans(paragraph, b"numId")?.into_iter().next())
}
