//! swmsgen-validate - PPE compliance gate
//!
//! Post-generation QA gate run on final documents before issue. The
//! engine is pluggable: individual checks implement `CellValidator` and
//! the `ValidationEngine` runs every registered check over the cell
//! texts of the scanned tables, collecting violations with their exact
//! table/row/col location.
//!
//! The gate only ever reports. Wording is corrected by the generator's
//! own pre-pass; a document that reaches the gate with violations goes
//! back through authoring, never through a silent fix.

pub mod ppe;

use serde::Serialize;
use swmsgen_ooxml::{DocumentXml, DocxArchive};

pub use ppe::PpeTermValidator;

/// Tables scanned by default, by index in the document.
pub const TABLES_TO_SCAN: [usize; 2] = [2, 3];

/// Display name for a scanned table index.
pub fn table_name(index: usize) -> &'static str {
    match index {
        2 => "Consolidated Summary",
        3 => "Detail Risk Assessment",
        _ => "Table",
    }
}

/// One table cell's text with its location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellRef {
    pub table: usize,
    pub row: usize,
    pub col: usize,
    pub text: String,
}

/// What kind of rule a violation broke.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ViolationKind {
    ForbiddenTerm,
    BareGloves,
}

/// One rule violation at an exact cell location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Violation {
    pub kind: ViolationKind,
    pub table: usize,
    pub row: usize,
    pub col: usize,
    /// What was matched, e.g. the forbidden term
    pub detail: String,
    /// Surrounding text for the report
    pub snippet: String,
}

/// One pluggable check over cell texts.
pub trait CellValidator: Send + Sync {
    /// Unique code for the check's violations (e.g. "PPE1")
    fn code(&self) -> &'static str;

    fn name(&self) -> &'static str {
        "unnamed"
    }

    fn check(&self, cells: &[CellRef]) -> Vec<Violation>;
}

/// Runs all registered checks and collects their violations.
pub struct ValidationEngine {
    validators: Vec<Box<dyn CellValidator>>,
}

impl Default for ValidationEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl ValidationEngine {
    pub fn new() -> Self {
        Self {
            validators: Vec::new(),
        }
    }

    /// Engine with the standard gate checks registered.
    pub fn with_defaults() -> Self {
        let mut engine = Self::new();
        engine.add_validator(Box::new(PpeTermValidator));
        engine
    }

    pub fn add_validator(&mut self, validator: Box<dyn CellValidator>) {
        self.validators.push(validator);
    }

    pub fn validator_count(&self) -> usize {
        self.validators.len()
    }

    pub fn validator_names(&self) -> Vec<&'static str> {
        self.validators.iter().map(|v| v.name()).collect()
    }

    /// Run every check over the cells.
    pub fn run(&self, cells: &[CellRef]) -> Vec<Violation> {
        let mut violations = Vec::new();
        for validator in &self.validators {
            violations.extend(validator.check(cells));
        }
        violations
    }
}

/// Result of gating one document.
#[derive(Debug, Clone)]
pub struct ValidationOutcome {
    pub violations: Vec<Violation>,
    /// Non-fatal observations, e.g. a scanned table index missing
    pub notes: Vec<String>,
}

impl ValidationOutcome {
    pub fn passed(&self) -> bool {
        self.violations.is_empty()
    }
}

/// Collect the non-empty cell texts of the given tables. Missing table
/// indexes are skipped with a note.
pub fn collect_cells(
    doc: &DocumentXml,
    tables: &[usize],
) -> swmsgen_ooxml::Result<(Vec<CellRef>, Vec<String>)> {
    let available = doc.table_count()?;
    let mut notes = Vec::new();
    for index in tables {
        if *index >= available {
            notes.push(format!(
                "table index {index} not found in document, skipping"
            ));
        }
    }
    let cells = doc
        .table_cell_texts()?
        .into_iter()
        .filter(|cell| tables.contains(&cell.table) && !cell.text.trim().is_empty())
        .map(|cell| CellRef {
            table: cell.table,
            row: cell.row,
            col: cell.col,
            text: cell.text,
        })
        .collect();
    Ok((cells, notes))
}

/// Gate one document archive with the default checks.
pub fn validate_archive(archive: &DocxArchive) -> swmsgen_ooxml::Result<ValidationOutcome> {
    let doc = DocumentXml::parse(archive.document_xml()?)?;
    let (cells, notes) = collect_cells(&doc, &TABLES_TO_SCAN)?;
    let violations = ValidationEngine::with_defaults().run(&cells);
    Ok(ValidationOutcome { violations, notes })
}

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    fn cell(text: &str) -> CellRef {
        CellRef {
            table: 2,
            row: 1,
            col: 3,
            text: text.to_string(),
        }
    }

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }

    #[test]
    fn test_engine_with_defaults() {
        let engine = ValidationEngine::with_defaults();
        assert_eq!(engine.validator_count(), 1);
        assert!(engine.validator_names().contains(&"ppe-terms"));
    }

    #[test]
    fn test_engine_runs_all_validators() {
        let engine = ValidationEngine::with_defaults();
        let violations = engine.run(&[cell("safety boots and bare gloves")]);
        assert_eq!(violations.len(), 2);
    }

    #[test]
    fn test_clean_cells_pass() {
        let engine = ValidationEngine::with_defaults();
        let violations = engine.run(&[cell(
            "Steel-capped footwear, cut-resistant gloves, hi-vis vest",
        )]);
        assert!(violations.is_empty());
    }

    #[test]
    fn test_collect_cells_skips_missing_tables() {
        let doc = DocumentXml::from_string(
            r#"<w:document xmlns:w="http://example/w"><w:body><w:tbl><w:tr><w:tc><w:p><w:r><w:t>only table</w:t></w:r></w:p></w:tc></w:tr></w:tbl></w:body></w:document>"#
                .to_string(),
        )
        .unwrap();
        let (cells, notes) = collect_cells(&doc, &TABLES_TO_SCAN).unwrap();
        assert!(cells.is_empty());
        assert_eq!(notes.len(), 2);
    }
}
