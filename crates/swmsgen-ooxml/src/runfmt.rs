//! Inline run formatting
//!
//! Splits plain text into styled runs at literal phrase boundaries and
//! emits `<w:r>` markup. The splitter is a greedy left-to-right matcher,
//! not a pattern engine: at each position the earliest-starting phrase
//! wins, ties go to declaration order, so callers list longer or more
//! specific phrases first.

use std::fmt::Write as _;

/// Emphasis applied to one run of text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Emphasis {
    Plain,
    Bold,
    BoldHighlight,
}

/// A literal phrase and the emphasis its matches receive
#[derive(Debug, Clone)]
pub struct PhraseRule {
    pub phrase: String,
    pub emphasis: Emphasis,
}

impl PhraseRule {
    pub fn bold(phrase: impl Into<String>) -> Self {
        Self {
            phrase: phrase.into(),
            emphasis: Emphasis::Bold,
        }
    }

    pub fn bold_highlight(phrase: impl Into<String>) -> Self {
        Self {
            phrase: phrase.into(),
            emphasis: Emphasis::BoldHighlight,
        }
    }
}

/// One styled run of text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyledRun {
    pub text: String,
    pub emphasis: Emphasis,
}

impl StyledRun {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            emphasis: Emphasis::Plain,
        }
    }
}

/// Split `input` into runs so each phrase match carries its rule's
/// emphasis and everything else stays plain.
///
/// Concatenating the returned texts reproduces `input` exactly. Zero
/// matches give a single plain run; empty input gives no runs.
pub fn split_styled(input: &str, rules: &[PhraseRule]) -> Vec<StyledRun> {
    let mut runs = Vec::new();
    if input.is_empty() {
        return runs;
    }

    let mut cursor = 0usize;
    while cursor < input.len() {
        let rest = &input[cursor..];
        // Earliest match wins; among equal starts, the first declared rule.
        let mut best: Option<(usize, &PhraseRule)> = None;
        for rule in rules {
            if rule.phrase.is_empty() {
                continue;
            }
            if let Some(at) = rest.find(&rule.phrase) {
                match best {
                    Some((best_at, _)) if best_at <= at => {}
                    _ => best = Some((at, rule)),
                }
            }
        }

        match best {
            Some((at, rule)) => {
                if at > 0 {
                    runs.push(StyledRun::plain(&rest[..at]));
                }
                runs.push(StyledRun {
                    text: rule.phrase.clone(),
                    emphasis: rule.emphasis,
                });
                cursor += at + rule.phrase.len();
            }
            None => {
                runs.push(StyledRun::plain(rest));
                break;
            }
        }
    }
    runs
}

/// Prepend `marker` (followed by a space) unless the text already
/// contains it anywhere. Containment is the single rule here, matching
/// how the bullet styler locates the marker. Returns the text and
/// whether a prepend happened.
pub fn ensure_marker(text: &str, marker: &str) -> (String, bool) {
    if text.contains(marker) {
        (text.to_string(), false)
    } else {
        (format!("{marker} {text}"), true)
    }
}

/// Run properties for synthesized `<w:r>` markup
#[derive(Debug, Clone)]
pub struct RunProps {
    pub font: String,
    /// Font size in half points (16 = 8pt body text)
    pub size: u32,
    pub bold: bool,
    pub italic: bool,
    pub color: Option<String>,
    pub highlight: bool,
}

impl Default for RunProps {
    fn default() -> Self {
        Self {
            font: "Aptos".to_string(),
            size: 16,
            bold: false,
            italic: false,
            color: None,
            highlight: false,
        }
    }
}

impl RunProps {
    pub fn bold() -> Self {
        Self {
            bold: true,
            ..Self::default()
        }
    }
}

/// Escape text for XML content or attribute position.
pub fn xml_escape(text: &str) -> String {
    quick_xml::escape::escape(text).into_owned()
}

/// Emit one `<w:r>` with explicit properties and preserved spacing.
pub fn run_xml(text: &str, props: &RunProps) -> String {
    let mut out = String::new();
    out.push_str("<w:r><w:rPr>");
    let _ = write!(
        out,
        "<w:rFonts w:ascii=\"{font}\" w:hAnsi=\"{font}\"/><w:sz w:val=\"{sz}\"/><w:szCs w:val=\"{sz}\"/>",
        font = xml_escape(&props.font),
        sz = props.size,
    );
    if props.bold {
        out.push_str("<w:b/>");
    }
    if props.italic {
        out.push_str("<w:i/>");
    }
    if let Some(color) = &props.color {
        let _ = write!(out, "<w:color w:val=\"{}\"/>", xml_escape(color));
    }
    if props.highlight {
        out.push_str("<w:highlight w:val=\"yellow\"/>");
    }
    let _ = write!(
        out,
        "</w:rPr><w:t xml:space=\"preserve\">{}</w:t></w:r>",
        xml_escape(text)
    );
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn joined(runs: &[StyledRun]) -> String {
        runs.iter().map(|r| r.text.as_str()).collect()
    }

    #[test]
    fn test_split_round_trip() {
        let rules = [
            PhraseRule::bold("Engineering:"),
            PhraseRule::bold("PPE:"),
            PhraseRule::bold_highlight("CCVS HOLD POINTS"),
        ];
        let inputs = [
            "Engineering: dust extraction. PPE: gloves",
            "CCVS HOLD POINTS before anything",
            "nothing to match here",
            "PPE:PPE:PPE:",
        ];
        for input in inputs {
            let runs = split_styled(input, &rules);
            assert_eq!(joined(&runs), input, "lossless split of {input:?}");
        }
    }

    #[test]
    fn test_split_styles_matches() {
        let rules = [PhraseRule::bold("Admin:")];
        let runs = split_styled("see Admin: the chain", &rules);
        assert_eq!(
            runs,
            vec![
                StyledRun::plain("see "),
                StyledRun {
                    text: "Admin:".to_string(),
                    emphasis: Emphasis::Bold
                },
                StyledRun::plain(" the chain"),
            ]
        );
    }

    #[test]
    fn test_split_tie_goes_to_declaration_order() {
        // Both rules match at position 0; the first declared one wins,
        // so longer phrases must be declared first.
        let rules = [
            PhraseRule::bold("STOP WORK if:"),
            PhraseRule::bold("STOP WORK"),
        ];
        let runs = split_styled("STOP WORK if: rain", &rules);
        assert_eq!(runs[0].text, "STOP WORK if:");

        let reversed = [
            PhraseRule::bold("STOP WORK"),
            PhraseRule::bold("STOP WORK if:"),
        ];
        let runs = split_styled("STOP WORK if: rain", &reversed);
        assert_eq!(runs[0].text, "STOP WORK");
    }

    #[test]
    fn test_split_empty_and_no_match() {
        assert!(split_styled("", &[PhraseRule::bold("x")]).is_empty());
        let runs = split_styled("plain text", &[PhraseRule::bold("zzz")]);
        assert_eq!(runs, vec![StyledRun::plain("plain text")]);
    }

    #[test]
    fn test_ensure_marker_no_duplicate() {
        let (text, added) = ensure_marker("CCVS HOLD POINTS plus rest", "CCVS HOLD POINTS");
        assert_eq!(text, "CCVS HOLD POINTS plus rest");
        assert!(!added);

        let (text, added) = ensure_marker("verify anchors", "CCVS HOLD POINTS");
        assert_eq!(text, "CCVS HOLD POINTS verify anchors");
        assert!(added);

        // Containment, not prefix: a mid-string marker also suppresses.
        let (_, added) = ensure_marker("see CCVS HOLD POINTS above", "CCVS HOLD POINTS");
        assert!(!added);
    }

    #[test]
    fn test_run_xml_escapes_and_preserves_space() {
        let xml = run_xml(" a < b ", &RunProps::default());
        assert!(xml.contains("xml:space=\"preserve\""));
        assert!(xml.contains("> a &lt; b <"));
        assert!(xml.contains("w:ascii=\"Aptos\""));
        assert!(!xml.contains("<w:b/>"));
    }

    #[test]
    fn test_run_xml_props() {
        let props = RunProps {
            bold: true,
            color: Some("FFFFFF".to_string()),
            highlight: true,
            ..RunProps::default()
        };
        let xml = run_xml("x", &props);
        assert!(xml.contains("<w:b/>"));
        assert!(xml.contains("<w:color w:val=\"FFFFFF\"/>"));
        assert!(xml.contains("<w:highlight w:val=\"yellow\"/>"));
    }
}
