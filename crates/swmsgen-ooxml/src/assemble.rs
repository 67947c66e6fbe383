//! Document assembly
//!
//! Drives one build: open the template archive, repair the numbering
//! part, produce the task table rows the plan asks for (reused template
//! rows with fix-ups, or rows synthesized from task records), tick the
//! HRCW checkboxes, and run the document-wide formatting passes. List
//! definitions for hold-point rows are allocated in plan order before
//! any row markup is written, so ids never collide however many rows a
//! plan adds.

use std::collections::HashMap;

use swmsgen_model::{DocumentPlan, RowSource, TaskLibrary};

use crate::archive::{DocxArchive, DOCUMENT_PART, NUMBERING_PART};
use crate::error::{DocxError, Result};
use crate::format;
use crate::numbering::{NumberingPair, NumberingPart};
use crate::rowbuild;
use crate::table::DocumentXml;

/// Counters from one build, printed by the CLI.
#[derive(Debug, Default, Clone, Copy)]
pub struct BuildReport {
    pub rows_reused: usize,
    pub rows_built: usize,
    pub pairs_allocated: usize,
    pub hold_points_renumbered: usize,
    pub ppe_texts_changed: usize,
    pub level_texts_fixed: usize,
    pub checkboxes_ticked: usize,
    pub em_dashes_bolded: usize,
    pub labels_bolded: usize,
    pub fonts_standardised: usize,
}

/// Build the document described by `plan` into `archive`, in place.
pub fn build_document(
    archive: &mut DocxArchive,
    plan: &DocumentPlan,
    tasks: &TaskLibrary,
) -> Result<BuildReport> {
    let mut report = BuildReport::default();
    let layout = &plan.layout;

    let numbering_bytes = archive
        .numbering_xml()
        .ok_or_else(|| DocxError::MissingPart(NUMBERING_PART.to_string()))?;
    let mut numbering = NumberingPart::parse(numbering_bytes)?;
    report.level_texts_fixed = numbering.fix_parenthesised_decimals();

    let mut doc = DocumentXml::parse(archive.document_xml()?)?;
    let template_rows = doc.table_rows(layout.task_table)?;

    let standard_reference = template_rows
        .get(layout.standard_reference_row)
        .ok_or_else(|| {
            DocxError::TemplateShape(format!(
                "task table has no row {} to clone standard rows from",
                layout.standard_reference_row
            ))
        })?;
    let hold_point_reference = template_rows
        .get(layout.hold_point_reference_row)
        .ok_or_else(|| {
            DocxError::TemplateShape(format!(
                "task table has no row {} to clone hold-point rows from",
                layout.hold_point_reference_row
            ))
        })?;
    rowbuild::check_reference_row(standard_reference, layout.columns, "standard")?;
    rowbuild::check_reference_row(hold_point_reference, layout.columns, "hold-point")?;

    // Every hold-point row gets its pair before any markup is written.
    let mut pairs: HashMap<usize, NumberingPair> = HashMap::new();
    for (index, source) in plan.rows.iter().enumerate() {
        if let RowSource::New(key) = source {
            if tasks.get(key)?.controls.is_hold_point() {
                pairs.insert(index, numbering.allocate_pair()?);
                report.pairs_allocated += 1;
            }
        }
    }

    let mut rows: Vec<String> = Vec::with_capacity(plan.rows.len());
    for (index, source) in plan.rows.iter().enumerate() {
        match source {
            RowSource::Reuse(row_index) => {
                // Row 0 is the table header, never a data row.
                let template_row = match row_index {
                    0 => None,
                    i => template_rows.get(*i),
                }
                .ok_or(DocxError::MissingReuseRow(*row_index))?;
                let (row, reuse) = rowbuild::refresh_reused_row(template_row, &mut numbering)?;
                report.rows_reused += 1;
                report.hold_points_renumbered += reuse.hold_points_renumbered;
                report.ppe_texts_changed += reuse.ppe_texts_changed;
                rows.push(row);
            }
            RowSource::New(key) => {
                let task = tasks.get(key)?;
                let reference = if task.controls.is_hold_point() {
                    hold_point_reference
                } else {
                    standard_reference
                };
                let row = rowbuild::build_row(reference, task, pairs.get(&index))?;
                report.rows_built += 1;
                rows.push(row);
            }
        }
    }

    doc.replace_data_rows(layout.task_table, &rows)?;

    report.checkboxes_ticked =
        format::tick_hrcw_checkboxes(&mut doc, layout.header_table, &plan.hrcw_ticks)?;
    report.em_dashes_bolded = format::bold_em_dashes(&mut doc)?;
    report.fonts_standardised = format::standardise_fonts(&mut doc, format::BODY_FONT)?;
    report.labels_bolded = format::bold_control_labels(&mut doc)?;

    archive.set_part(DOCUMENT_PART, doc.into_bytes());
    archive.set_part(NUMBERING_PART, numbering.into_bytes());
    Ok(report)
}
