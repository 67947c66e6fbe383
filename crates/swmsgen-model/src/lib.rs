//! swmsgen-model - Task, risk, and vocabulary model
//!
//! This crate holds the data model shared by the document builders: risk
//! ratings, task records with their control structures, the controlled
//! vocabulary resource, and document plans describing which table rows to
//! reuse from the template and which to synthesize from task data.
//!
//! The vocabulary is an immutable, loaded-once resource. Lookups are pure
//! functions of (resource, key) and fail fast on unregistered keys so that
//! canonical wording cannot drift silently between documents.

pub mod error;
pub mod plan;
pub mod risk;
pub mod task;
pub mod vocab;

pub use error::{ModelError, Result};
pub use plan::{DocumentPlan, PlanFile, RowSource, TaskLibrary, TemplateLayout};
pub use risk::{RiskLevel, RiskRating};
pub use task::{ControlSection, Controls, TaskRecord, TaskSpec};
pub use vocab::Vocabulary;

/// Em dash used to chain control phrases and STOP WORK conditions.
pub const EM_DASH: char = '\u{2014}';

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
