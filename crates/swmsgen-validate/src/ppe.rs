//! PPE wording check
//!
//! Flags the legacy PPE terms the canonical wording replaced, and bare
//! "gloves" without a descriptor saying which gloves. Matching is
//! case-insensitive on whole words; each rule reports at most once per
//! cell, at the first offending occurrence.

use std::sync::OnceLock;

use regex::Regex;

use crate::{CellRef, CellValidator, Violation, ViolationKind};

/// Glove descriptors accepted directly before "gloves".
pub const GLOVE_DESCRIPTORS: [&str; 9] = [
    "chemical-resistant",
    "insulated",
    "leather",
    "waterproof",
    "nitrile",
    "disposable",
    "cut-resistant",
    "welding",
    "heat-resistant",
];

const FORBIDDEN_PATTERNS: [&str; 3] = [
    r"(?i)\bsafety boots\b",
    r"(?i)\bsafety footwear\b",
    r"(?i)\bhi-viz\b",
];

fn forbidden_terms() -> &'static Vec<Regex> {
    static RES: OnceLock<Vec<Regex>> = OnceLock::new();
    RES.get_or_init(|| {
        FORBIDDEN_PATTERNS
            .iter()
            .map(|p| Regex::new(p).expect("static regex compiles"))
            .collect()
    })
}

fn vis_family() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)\b(?:high-vis|high-viz|hi-vis)\b").expect("static regex compiles")
    })
}

fn gloves() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)\bgloves\b").expect("static regex compiles"))
}

/// A vis-family spelling alone is a violation; followed by "vest" (or
/// "vests") it is the canonical phrase. The regex crate has no
/// lookahead, so the following text is checked by hand.
fn followed_by_vest(text: &str, match_end: usize) -> bool {
    let rest = &text[match_end..];
    let trimmed = rest.trim_start();
    trimmed.len() < rest.len() && trimmed.to_lowercase().starts_with("vest")
}

/// True when the 40 characters before the match end with a descriptor.
fn has_descriptor(text: &str, match_start: usize) -> bool {
    let preceding: String = text[..match_start]
        .chars()
        .rev()
        .take(40)
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .collect();
    let preceding = preceding.to_lowercase();
    let preceding = preceding.trim_end();
    GLOVE_DESCRIPTORS.iter().any(|d| preceding.ends_with(d))
}

/// Char-safe context window around a match, `before`/`after` chars wide.
fn snippet(text: &str, start: usize, end: usize, before: usize, after: usize) -> String {
    let begin = text[..start]
        .char_indices()
        .rev()
        .nth(before - 1)
        .map(|(i, _)| i)
        .unwrap_or(0);
    let stop = text[end..]
        .char_indices()
        .nth(after)
        .map(|(i, _)| end + i)
        .unwrap_or(text.len());
    text[begin..stop].trim().to_string()
}

/// The default PPE wording check.
pub struct PpeTermValidator;

impl PpeTermValidator {
    fn check_cell(&self, cell: &CellRef, out: &mut Vec<Violation>) {
        let text = &cell.text;

        for re in forbidden_terms() {
            if let Some(m) = re.find(text) {
                out.push(Violation {
                    kind: ViolationKind::ForbiddenTerm,
                    table: cell.table,
                    row: cell.row,
                    col: cell.col,
                    detail: format!("forbidden term \"{}\"", m.as_str()),
                    snippet: snippet(text, m.start(), m.start(), 20, 40),
                });
            }
        }

        if let Some(m) = vis_family()
            .find_iter(text)
            .find(|m| !followed_by_vest(text, m.end()))
        {
            out.push(Violation {
                kind: ViolationKind::ForbiddenTerm,
                table: cell.table,
                row: cell.row,
                col: cell.col,
                detail: format!("forbidden term \"{}\"", m.as_str()),
                snippet: snippet(text, m.start(), m.start(), 20, 40),
            });
        }

        if let Some(m) = gloves()
            .find_iter(text)
            .find(|m| !has_descriptor(text, m.start()))
        {
            out.push(Violation {
                kind: ViolationKind::BareGloves,
                table: cell.table,
                row: cell.row,
                col: cell.col,
                detail: "bare \"gloves\" without descriptor (use cut-resistant gloves)"
                    .to_string(),
                snippet: snippet(text, m.start(), m.end(), 20, 20),
            });
        }
    }
}

impl CellValidator for PpeTermValidator {
    fn code(&self) -> &'static str {
        "PPE"
    }

    fn name(&self) -> &'static str {
        "ppe-terms"
    }

    fn check(&self, cells: &[CellRef]) -> Vec<Violation> {
        let mut violations = Vec::new();
        for cell in cells {
            self.check_cell(cell, &mut violations);
        }
        violations
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cell_at(table: usize, row: usize, col: usize, text: &str) -> CellRef {
        CellRef {
            table,
            row,
            col,
            text: text.to_string(),
        }
    }

    fn run(text: &str) -> Vec<Violation> {
        PpeTermValidator.check(&[cell_at(3, 4, 5, text)])
    }

    #[test]
    fn test_safety_boots_flagged_at_location() {
        let violations = run("PPE: safety boots, hard hat");
        assert_eq!(violations.len(), 1);
        let v = &violations[0];
        assert_eq!(v.kind, ViolationKind::ForbiddenTerm);
        assert_eq!((v.table, v.row, v.col), (3, 4, 5));
        assert_eq!(v.detail, "forbidden term \"safety boots\"");
        assert!(v.snippet.contains("safety boots"));
    }

    #[test]
    fn test_descriptored_gloves_pass() {
        assert!(run("chemical-resistant gloves").is_empty());
        assert!(run("Cut-Resistant gloves per AS/NZS 2161").is_empty());
    }

    #[test]
    fn test_bare_gloves_flagged() {
        let violations = run("wear gloves at all times");
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].kind, ViolationKind::BareGloves);
        assert!(violations[0].snippet.contains("gloves"));
    }

    #[test]
    fn test_vis_before_vest_is_canonical() {
        assert!(run("hi-vis vest or shirt").is_empty());
        assert!(run("High-vis vest or shirt").is_empty());
        assert!(run("high-viz  vests on site").is_empty());
    }

    #[test]
    fn test_vis_alone_flagged() {
        let violations = run("wear hi-vis on site");
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].detail, "forbidden term \"hi-vis\"");
        assert_eq!(
            run("high-vis required")[0].detail,
            "forbidden term \"high-vis\""
        );
    }

    #[test]
    fn test_vis_at_end_of_text_flagged() {
        assert_eq!(run("PPE required: hi-vis").len(), 1);
    }

    #[test]
    fn test_hi_viz_flagged_even_before_vest() {
        // The -viz misspelling of the short form has no vest exception.
        let violations = run("hi-viz vest");
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].detail, "forbidden term \"hi-viz\"");
    }

    #[test]
    fn test_high_visibility_not_a_word_match() {
        assert!(run("high-visibility clothing").is_empty());
    }

    #[test]
    fn test_case_insensitive_with_matched_text_reported() {
        let violations = run("SAFETY FOOTWEAR required");
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].detail, "forbidden term \"SAFETY FOOTWEAR\"");
    }

    #[test]
    fn test_one_violation_per_rule_per_cell() {
        let violations = run("safety boots here and safety boots there");
        assert_eq!(violations.len(), 1);
    }

    #[test]
    fn test_multiple_rules_in_one_cell() {
        let violations = run("safety boots, hi-viz and gloves");
        assert_eq!(violations.len(), 3);
    }

    #[test]
    fn test_descriptor_window_is_40_chars() {
        // Descriptor sits just outside the lookback window.
        let text = format!("leather{}gloves", " ".repeat(41));
        assert_eq!(run(&text).len(), 1);
    }

    #[test]
    fn test_second_gloves_occurrence_can_be_bare() {
        let violations = run("nitrile gloves for chemicals, and gloves for the rest");
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].kind, ViolationKind::BareGloves);
    }

    #[test]
    fn test_snippet_is_trimmed_context() {
        let violations = run("a long preamble that runs on before safety boots and then more text after");
        assert!(violations[0].snippet.starts_with("that runs on before"));
    }
}
