//! Register configuration
//!
//! A register config is authored as TOML: the project header block plus
//! one entry per risk. Ratings reuse the shared `RiskRating` parser, so
//! a typo like "Hgih (6)" fails at load time rather than producing an
//! unstyled cell.

use std::path::Path;

use serde::Deserialize;
use swmsgen_model::{RiskLevel, RiskRating};

use crate::error::Result;

/// One row of the register table.
#[derive(Debug, Clone, Deserialize)]
pub struct RiskEntry {
    /// Row number shown in the `#` column
    pub id: String,
    pub task: String,
    /// Gatekeeper category code, e.g. "STR"
    pub category: String,
    pub description: String,
    /// Likelihood label, e.g. "B \u{2014} Likely"
    #[serde(default)]
    pub likelihood: String,
    /// Consequence label, e.g. "3 \u{2014} Major"
    #[serde(default)]
    pub consequence: String,
    pub rating_initial: RiskRating,
    pub rating_residual: RiskRating,
    pub controls: String,
    /// Hold-point condition surfaced in the Critical Hold Points block
    #[serde(default)]
    pub hold_point: Option<String>,
    #[serde(default = "default_owner")]
    pub owner: String,
}

fn default_owner() -> String {
    "Supervisor".to_string()
}

/// The whole workbook: project header fields plus the risk rows.
#[derive(Debug, Clone, Deserialize)]
pub struct RegisterConfig {
    pub project: String,
    #[serde(default)]
    pub pcbu: String,
    #[serde(default)]
    pub jurisdiction: String,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub prepared_by: String,
    pub risks: Vec<RiskEntry>,
    /// Extra hold points beyond the per-risk ones
    #[serde(default)]
    pub hold_points: Vec<String>,
    #[serde(default)]
    pub references: Vec<String>,
}

impl RegisterConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&text)?)
    }

    /// Rating/count pairs for one summary block, severest first.
    pub fn summary<F>(&self, rating: F) -> Vec<(String, usize)>
    where
        F: Fn(&RiskEntry) -> &RiskRating,
    {
        let mut counts: Vec<(RiskRating, usize)> = Vec::new();
        for entry in &self.risks {
            let r = rating(entry);
            match counts.iter_mut().find(|(seen, _)| seen == r) {
                Some((_, n)) => *n += 1,
                None => counts.push((*r, 1)),
            }
        }
        counts.sort_by_key(|(r, _)| (severity_rank(r.level), std::cmp::Reverse(r.score)));
        counts
            .into_iter()
            .map(|(r, n)| (r.to_string(), n))
            .collect()
    }

    /// All hold points: per-risk ones in row order, then the extras.
    pub fn all_hold_points(&self) -> Vec<&str> {
        self.risks
            .iter()
            .filter_map(|r| r.hold_point.as_deref())
            .chain(self.hold_points.iter().map(String::as_str))
            .collect()
    }
}

fn severity_rank(level: RiskLevel) -> usize {
    RiskLevel::ALL
        .iter()
        .position(|l| *l == level)
        .unwrap_or(RiskLevel::ALL.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    const CONFIG: &str = r#"
        project = "18 Danks St Waterloo"
        pcbu = "RPD Digital"
        date = "2026-08-30"
        prepared_by = "Site Engineer"
        hold_points = ["Permit signed before works start"]
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
        description = "Anchor failure"
        rating_initial = "High (6)"
        rating_residual = "Low (2)"
        controls = "CCVS HOLD POINTS proof load test; torque check"
        hold_point = "Proof load test passed before loading"
        owner = "Engineer"
    "#;

    #[test]
    fn test_config_parses() {
        let config: RegisterConfig = toml::from_str(CONFIG).unwrap();
        assert_eq!(config.risks.len(), 2);
        assert_eq!(config.risks[0].rating_initial.to_string(), "Critical (5)");
        assert_eq!(config.risks[0].owner, "Supervisor");
        assert_eq!(config.risks[1].owner, "Engineer");
    }

    #[test]
    fn test_bad_rating_fails_at_load() {
        let broken = CONFIG.replace("Critical (5)", "Hgih (6)");
        assert!(toml::from_str::<RegisterConfig>(&broken).is_err());
    }

    #[test]
    fn test_summary_orders_severest_first() {
        let config: RegisterConfig = toml::from_str(CONFIG).unwrap();
        let pre = config.summary(|r| &r.rating_initial);
        assert_eq!(
            pre,
            vec![
                ("Critical (5)".to_string(), 1),
                ("High (6)".to_string(), 1)
            ]
        );
        let post = config.summary(|r| &r.rating_residual);
        assert_eq!(post, vec![("Low (2)".to_string(), 2)]);
    }

    #[test]
    fn test_all_hold_points_order() {
        let config: RegisterConfig = toml::from_str(CONFIG).unwrap();
        assert_eq!(
            config.all_hold_points(),
            vec![
                "Proof load test passed before loading",
                "Permit signed before works start"
            ]
        );
    }
}
