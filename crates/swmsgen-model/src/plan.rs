//! Document plans
//!
//! A plan file names the template, the row sequence (reuse template rows
//! by index, or synthesize from a task definition), HRCW checkboxes to
//! tick, and the template layout contract. Task definitions may be given
//! fully resolved (`[tasks.*]`) or vocabulary-keyed (`[specs.*]`).

use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;

use crate::error::{ModelError, Result};
use crate::task::{TaskRecord, TaskSpec};
use crate::vocab::Vocabulary;

/// Where one output row comes from.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RowSource {
    /// Copy the template's data row at this index (1-based, row 0 is the
    /// header) and apply the reuse fix-ups.
    Reuse(usize),
    /// Synthesize a fresh row from the named task definition.
    New(String),
}

/// The template's structural contract: which table holds the task rows,
/// which rows serve as cloning references, and the fixed cell count.
/// Any template restructure must be mirrored here; the builder rejects
/// reference rows with the wrong cell count rather than writing content
/// into the wrong columns.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct TemplateLayout {
    /// Index of the HRCW checkbox table
    pub header_table: usize,
    /// Index of the detail task table
    pub task_table: usize,
    /// Reference row for standard task cloning
    pub standard_reference_row: usize,
    /// Reference row for hold-point task cloning
    pub hold_point_reference_row: usize,
    /// Cells per task row
    pub columns: usize,
}

impl Default for TemplateLayout {
    fn default() -> Self {
        Self {
            header_table: 0,
            task_table: 1,
            standard_reference_row: 10,
            hold_point_reference_row: 5,
            columns: 7,
        }
    }
}

/// One document build: title, row sequence, extra HRCW ticks, layout.
#[derive(Debug, Clone, Deserialize)]
pub struct DocumentPlan {
    pub title: String,
    /// Output filename; the CLI falls back to the plan file's name with a
    /// .docx extension when empty and no --out is given.
    #[serde(default)]
    pub output: String,
    pub rows: Vec<RowSource>,
    #[serde(default)]
    pub hrcw_ticks: Vec<String>,
    #[serde(default)]
    pub layout: TemplateLayout,
}

/// Task definitions keyed by the names used in `RowSource::New`.
#[derive(Debug, Clone, Default)]
pub struct TaskLibrary {
    tasks: BTreeMap<String, TaskRecord>,
}

impl TaskLibrary {
    pub fn insert(&mut self, key: impl Into<String>, record: TaskRecord) {
        self.tasks.insert(key.into(), record);
    }

    pub fn get(&self, key: &str) -> Result<&TaskRecord> {
        self.tasks
            .get(key)
            .ok_or_else(|| ModelError::UnknownTask(key.to_string()))
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}

/// On-disk plan file: the plan plus its task definitions.
#[derive(Debug, Clone, Deserialize)]
pub struct PlanFile {
    pub plan: DocumentPlan,
    /// Fully resolved task records
    #[serde(default)]
    pub tasks: BTreeMap<String, TaskRecord>,
    /// Vocabulary-keyed task specs, resolved at load time
    #[serde(default)]
    pub specs: BTreeMap<String, TaskSpec>,
}

impl PlanFile {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&text)?)
    }

    /// Build the task library: literal records as-is, specs resolved
    /// against the vocabulary. Returns the raw control phrases that
    /// bypassed the vocabulary so the caller can warn about them.
    pub fn task_library(&self, vocab: &Vocabulary) -> Result<(TaskLibrary, Vec<String>)> {
        let mut library = TaskLibrary::default();
        let mut raw_phrases = Vec::new();
        for (key, record) in &self.tasks {
            library.insert(key.clone(), record.clone());
        }
        for (key, spec) in &self.specs {
            let resolved = spec.resolve(vocab)?;
            raw_phrases.extend(resolved.raw_phrases);
            library.insert(key.clone(), resolved.record);
        }
        Ok((library, raw_phrases))
    }
}
