//! Controlled vocabulary resource
//!
//! Canonical phrases for hazards, controls, PPE items, and STOP WORK
//! conditions, loaded once from TOML and injected into the builders.
//! Resolvers fail fast on unknown keys: the fix is to register the phrase,
//! not to let ad-hoc wording into a document.

use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;

use crate::error::{ModelError, Result};

/// Separator for chained control phrases and STOP WORK conditions.
const CHAIN_SEP: &str = " \u{2014} ";

/// The loaded vocabulary. Immutable after construction.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Vocabulary {
    #[serde(default)]
    hazards: BTreeMap<String, String>,
    #[serde(default)]
    controls: BTreeMap<String, String>,
    #[serde(default)]
    ppe: BTreeMap<String, String>,
    #[serde(default)]
    stop_work: BTreeMap<String, String>,
}

/// Control entries after resolution: canonical phrases in order, plus any
/// raw strings that passed through unregistered (reported as warnings by
/// the caller, never silently dropped).
#[derive(Debug, Clone, Default)]
pub struct ResolvedControls {
    pub items: Vec<String>,
    pub raw: Vec<String>,
}

impl Vocabulary {
    /// The vocabulary shipped with the crate.
    pub fn builtin() -> Self {
        toml::from_str(include_str!("vocabulary.toml"))
            .expect("embedded vocabulary is valid TOML")
    }

    /// Load a vocabulary from a TOML file, for projects that maintain
    /// their own canonical phrasing.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&text)?)
    }

    pub fn hazard(&self, key: &str) -> Result<&str> {
        lookup(&self.hazards, "hazard", key)
    }

    pub fn control(&self, key: &str) -> Result<&str> {
        lookup(&self.controls, "control", key)
    }

    pub fn ppe(&self, key: &str) -> Result<&str> {
        lookup(&self.ppe, "ppe", key)
    }

    pub fn stop_work(&self, key: &str) -> Result<&str> {
        lookup(&self.stop_work, "stop_work", key)
    }

    /// Hazard cell text: canonical phrases joined with ". ".
    pub fn hazard_line(&self, keys: &[String]) -> Result<String> {
        let phrases = keys
            .iter()
            .map(|k| self.hazard(k))
            .collect::<Result<Vec<_>>>()?;
        Ok(phrases.join(". "))
    }

    /// PPE line: comma-joined canonical items.
    pub fn ppe_line(&self, keys: &[String]) -> Result<String> {
        let phrases = keys
            .iter()
            .map(|k| self.ppe(k))
            .collect::<Result<Vec<_>>>()?;
        Ok(phrases.join(", "))
    }

    /// STOP WORK line: em dash chained canonical conditions.
    pub fn stop_work_line(&self, keys: &[String]) -> Result<String> {
        let phrases = keys
            .iter()
            .map(|k| self.stop_work(k))
            .collect::<Result<Vec<_>>>()?;
        Ok(phrases.join(CHAIN_SEP))
    }

    /// Resolve control entries. Registered keys become canonical phrases;
    /// anything else passes through verbatim and is recorded in `raw` for
    /// the caller to warn about.
    pub fn resolve_controls(&self, entries: &[String]) -> ResolvedControls {
        let mut resolved = ResolvedControls::default();
        for entry in entries {
            match self.controls.get(entry) {
                Some(canonical) => resolved.items.push(canonical.clone()),
                None => {
                    resolved.raw.push(entry.clone());
                    resolved.items.push(entry.clone());
                }
            }
        }
        resolved
    }

    /// Control entries joined as an em dash chain, for standard rows.
    pub fn control_chain(&self, entries: &[String]) -> (String, Vec<String>) {
        let resolved = self.resolve_controls(entries);
        (resolved.items.join(CHAIN_SEP), resolved.raw)
    }
}

fn lookup<'a>(
    table: &'a BTreeMap<String, String>,
    name: &'static str,
    key: &str,
) -> Result<&'a str> {
    table
        .get(key)
        .map(String::as_str)
        .ok_or_else(|| ModelError::UnknownKey {
            table: name,
            key: key.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_builtin_loads() {
        let v = Vocabulary::builtin();
        assert_eq!(v.ppe("steel_cap").unwrap(), "Steel-capped footwear");
        assert_eq!(v.hazard("working_at_height").unwrap(), "Working at height");
    }

    #[test]
    fn test_unknown_key_fails_fast() {
        let v = Vocabulary::builtin();
        let err = v.ppe("kevlar_suit").unwrap_err();
        match err {
            ModelError::UnknownKey { table, key } => {
                assert_eq!(table, "ppe");
                assert_eq!(key, "kevlar_suit");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_ppe_line_joins_with_commas() {
        let v = Vocabulary::builtin();
        let line = v
            .ppe_line(&keys(&["steel_cap", "p2_respirator", "eye_protection"]))
            .unwrap();
        assert_eq!(
            line,
            "Steel-capped footwear, P2 respirator (minimum), Eye protection"
        );
    }

    #[test]
    fn test_ppe_line_is_pure() {
        let v = Vocabulary::builtin();
        let k = keys(&["hard_hat", "hi_vis"]);
        assert_eq!(v.ppe_line(&k).unwrap(), v.ppe_line(&k).unwrap());
    }

    #[test]
    fn test_stop_work_line_uses_em_dash() {
        let v = Vocabulary::builtin();
        let line = v
            .stop_work_line(&keys(&["services_in_path", "equipment_fault"]))
            .unwrap();
        assert_eq!(
            line,
            "Services detected in cutting path \u{2014} Equipment fault or safety device failure"
        );
    }

    #[test]
    fn test_control_chain_passes_raw_through() {
        let v = Vocabulary::builtin();
        let (chain, raw) = v.control_chain(&keys(&[
            "services_scan",
            "Hold paint below 40 degrees",
        ]));
        assert!(chain.starts_with("Services scan (CAT/Genny)"));
        assert!(chain.ends_with("Hold paint below 40 degrees"));
        assert_eq!(raw, vec!["Hold paint below 40 degrees".to_string()]);
    }

    #[test]
    fn test_hazard_line_unknown_key_resolves_nothing() {
        let v = Vocabulary::builtin();
        assert!(v
            .hazard_line(&keys(&["working_at_height", "martian_dust"]))
            .is_err());
    }
}
