//! Task records and vocabulary-keyed task specs
//!
//! A `TaskRecord` is the fully resolved form consumed by the row builders.
//! A `TaskSpec` is the authoring form: it names vocabulary keys instead of
//! phrases and resolves against a `Vocabulary` at build time.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::risk::RiskRating;
use crate::vocab::Vocabulary;

/// One labelled section of a standard control cell, e.g.
/// `Engineering:` followed by an em dash chain of measures.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControlSection {
    pub label: String,
    pub text: String,
}

/// Control content for a task row. Exactly one shape is ever present:
/// standard rows carry labelled sections, hold-point rows carry the
/// verification lists rendered as numbered and bulleted paragraphs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Controls {
    Standard {
        sections: Vec<ControlSection>,
    },
    HoldPoint {
        hold_points: Vec<String>,
        engineering: Vec<String>,
        admin: Vec<String>,
        ppe: Vec<String>,
        stop_work: Vec<String>,
    },
}

impl Controls {
    pub fn is_hold_point(&self) -> bool {
        matches!(self, Controls::HoldPoint { .. })
    }
}

/// A fully resolved task: one data row of the detail table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskRecord {
    /// Task name, bold in the first cell
    pub name: String,
    /// Scope description under the name (may be empty)
    #[serde(default)]
    pub description: String,
    /// Hazard cell text
    pub hazard: String,
    /// Pre-control risk rating
    pub risk_pre: RiskRating,
    /// Post-control risk rating
    pub risk_post: RiskRating,
    /// Audit code, e.g. "STR-H6"
    pub code: String,
    /// Responsible party
    #[serde(default = "default_responsibility")]
    pub responsibility: String,
    /// Control cell content
    #[serde(flatten)]
    pub controls: Controls,
}

impl TaskRecord {
    /// Leading segment of the audit code, used in control headers:
    /// "STR-H6" gives "STR".
    pub fn code_prefix(&self) -> &str {
        self.code.split('-').next().unwrap_or(&self.code)
    }
}

pub(crate) fn default_responsibility() -> String {
    "Supervisor / Worker / Sub-Contract Worker".to_string()
}

fn default_risk_post() -> RiskRating {
    "Low (2)".parse().unwrap_or(RiskRating {
        level: crate::risk::RiskLevel::Low,
        score: 2,
    })
}

/// Authoring form of a task: vocabulary keys rather than phrases.
///
/// `engineering` and `admin` accept a mix of vocabulary keys and raw
/// strings; raw strings pass through but are reported so they can be
/// promoted into the vocabulary.
#[derive(Debug, Clone, Deserialize)]
pub struct TaskSpec {
    pub name: String,
    #[serde(default)]
    pub scope: String,
    pub hazard_keys: Vec<String>,
    pub risk_pre: RiskRating,
    #[serde(default = "default_risk_post")]
    pub risk_post: RiskRating,
    pub code: String,
    #[serde(default)]
    pub engineering: Vec<String>,
    #[serde(default)]
    pub admin: Vec<String>,
    pub ppe_keys: Vec<String>,
    pub stop_work_keys: Vec<String>,
    #[serde(default = "default_responsibility")]
    pub responsibility: String,
    /// Hold-point task: controls render as CCVS verification lists
    #[serde(default)]
    pub ccvs: bool,
    #[serde(default)]
    pub hold_points: Vec<String>,
}

/// A spec resolved against the vocabulary, plus any raw control phrases
/// that were not registered (surfaced as warnings by the CLI).
#[derive(Debug, Clone)]
pub struct ResolvedTask {
    pub record: TaskRecord,
    pub raw_phrases: Vec<String>,
}

impl TaskSpec {
    /// Resolve every key against the vocabulary. Fails before any document
    /// is touched if a key is unregistered.
    pub fn resolve(&self, vocab: &Vocabulary) -> Result<ResolvedTask> {
        let hazard = vocab.hazard_line(&self.hazard_keys)?;
        let ppe_line = vocab.ppe_line(&self.ppe_keys)?;
        let stop_line = vocab.stop_work_line(&self.stop_work_keys)?;

        let mut raw_phrases = Vec::new();
        let controls = if self.ccvs {
            let eng = vocab.resolve_controls(&self.engineering);
            let adm = vocab.resolve_controls(&self.admin);
            raw_phrases.extend(eng.raw);
            raw_phrases.extend(adm.raw);
            Controls::HoldPoint {
                hold_points: self.hold_points.clone(),
                engineering: eng.items,
                admin: adm.items,
                ppe: vec![ppe_line],
                stop_work: vec![stop_line],
            }
        } else {
            let (eng_chain, eng_raw) = vocab.control_chain(&self.engineering);
            let (adm_chain, adm_raw) = vocab.control_chain(&self.admin);
            raw_phrases.extend(eng_raw);
            raw_phrases.extend(adm_raw);
            Controls::Standard {
                sections: vec![
                    ControlSection {
                        label: "Engineering:".to_string(),
                        text: eng_chain,
                    },
                    ControlSection {
                        label: "Admin:".to_string(),
                        text: adm_chain,
                    },
                    ControlSection {
                        label: "PPE:".to_string(),
                        text: ppe_line,
                    },
                    ControlSection {
                        label: "STOP WORK if:".to_string(),
                        text: stop_line,
                    },
                ],
            }
        };

        Ok(ResolvedTask {
            record: TaskRecord {
                name: self.name.clone(),
                description: self.scope.clone(),
                hazard,
                risk_pre: self.risk_pre,
                risk_post: self.risk_post,
                code: self.code.clone(),
                responsibility: self.responsibility.clone(),
                controls,
            },
            raw_phrases,
        })
    }
}
