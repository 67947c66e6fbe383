//! Document-wide formatting passes
//!
//! Post-processing applied to every generated document: em dash bolding
//! with capitalisation, control-label bolding, font standardisation,
//! HRCW checkbox ticking, and PPE terminology canonicalisation. All
//! passes work by re-splitting individual runs; paragraph structure is
//! never touched.

use std::sync::OnceLock;

use quick_xml::events::Event;
use quick_xml::Reader;
use regex::Regex;

use crate::error::Result;
use crate::runfmt::{self, Emphasis, PhraseRule, RunProps};
use crate::scan::{self, Span};
use crate::table::DocumentXml;

/// Body font every run is normalised to.
pub const BODY_FONT: &str = "Aptos";

/// Em dash, always rendered bold.
pub const EM_DASH: char = '\u{2014}';

/// Labels rendered bold wherever they appear. Longer variants first so
/// "STOP WORK if:" wins over "STOP WORK".
pub const BOLD_LABELS: [&str; 8] = [
    "Engineering:",
    "Admin:",
    "PPE:",
    "Supervision:",
    "Hold Point:",
    "STOP WORK if:",
    "STOP WORK:",
    "STOP WORK",
];

/// One replacement piece for a split run
#[derive(Debug, Clone)]
pub enum RunPiece {
    /// Text keeping the original run properties
    Keep(String),
    /// Text with the original properties plus an emphasis
    Styled(String, Emphasis),
    /// A complete pre-rendered `<w:r>` element
    Raw(String),
}

/// Split every simple run in the fragment through `splitter`. A run is
/// simple when its only children are an optional `w:rPr` and exactly one
/// `w:t`; anything else (tabs, breaks, drawings) is left alone. The
/// splitter returns `None` to keep a run unchanged.
pub fn split_runs<F>(fragment: &str, mut splitter: F) -> Result<String>
where
    F: FnMut(&str) -> Option<Vec<RunPiece>>,
{
    let mut edits: Vec<(Span, String)> = Vec::new();
    for run_span in scan::outer_spans(fragment, b"r")? {
        let run = run_span.slice(fragment);
        let Some(text) = simple_run_text(run)? else {
            continue;
        };
        let Some(pieces) = splitter(&text) else {
            continue;
        };
        let props = scan::child_spans(run, b"rPr")?
            .first()
            .map(|span| span.slice(run).to_string());
        let mut replacement = String::new();
        for piece in pieces {
            match piece {
                RunPiece::Keep(text) => {
                    replacement.push_str(&render_run(&text, props.as_deref(), Emphasis::Plain))
                }
                RunPiece::Styled(text, emphasis) => {
                    replacement.push_str(&render_run(&text, props.as_deref(), emphasis))
                }
                RunPiece::Raw(xml) => replacement.push_str(&xml),
            }
        }
        edits.push((run_span, replacement));
    }
    Ok(scan::apply_edits(fragment, edits))
}

/// Text of a run whose direct children are only rPr plus one w:t.
fn simple_run_text(run: &str) -> Result<Option<String>> {
    let mut reader = Reader::from_str(run);
    let mut depth = 0usize;
    let mut text_nodes = 0usize;
    loop {
        match reader.read_event()? {
            Event::Start(e) => {
                depth += 1;
                if depth == 2 {
                    match e.local_name().as_ref() {
                        b"rPr" | b"t" => {
                            if e.local_name().as_ref() == b"t" {
                                text_nodes += 1;
                            }
                        }
                        _ => return Ok(None),
                    }
                }
            }
            Event::Empty(e) => {
                if depth == 1 {
                    match e.local_name().as_ref() {
                        b"rPr" => {}
                        // An empty w:t holds no text; treat as simple.
                        b"t" => text_nodes += 1,
                        _ => return Ok(None),
                    }
                }
            }
            Event::End(_) => depth = depth.saturating_sub(1),
            Event::Eof => break,
            _ => {}
        }
    }
    if text_nodes != 1 {
        return Ok(None);
    }
    scan::concat_text(run).map(Some)
}

/// Emit a run with the original properties and an optional emphasis
/// layered on top.
fn render_run(text: &str, props: Option<&str>, emphasis: Emphasis) -> String {
    let rpr = match emphasis {
        Emphasis::Plain => props.map(str::to_string).unwrap_or_default(),
        Emphasis::Bold => props_with(props, &["<w:b/>"]),
        Emphasis::BoldHighlight => {
            props_with(props, &["<w:b/>", "<w:highlight w:val=\"yellow\"/>"])
        }
    };
    format!(
        "<w:r>{rpr}<w:t xml:space=\"preserve\">{}</w:t></w:r>",
        runfmt::xml_escape(text)
    )
}

/// Copy an rPr fragment and ensure each extra property is present.
fn props_with(props: Option<&str>, extras: &[&str]) -> String {
    let mut rpr = match props {
        Some(p) if p != "<w:rPr/>" => p.to_string(),
        _ => "<w:rPr></w:rPr>".to_string(),
    };
    for extra in extras {
        let local: &[u8] = if extra.starts_with("<w:b") { b"b" } else { b"highlight" };
        let already = scan::fragment_has(&rpr, local).unwrap_or(false);
        if !already {
            if let Some(at) = rpr.rfind("</w:rPr>") {
                rpr.insert_str(at, extra);
            }
        }
    }
    rpr
}

/// Bold every em dash in the document and capitalise the letter that
/// follows it. Returns the number of dash runs emitted.
pub fn bold_em_dashes(doc: &mut DocumentXml) -> Result<usize> {
    let mut count = 0usize;
    let rewritten = split_runs(doc.as_str(), |text| {
        if !text.contains(EM_DASH) {
            return None;
        }
        let corrected = capitalise_after_dashes(text);
        let mut pieces = Vec::new();
        for (i, part) in corrected.split(EM_DASH).enumerate() {
            if i > 0 {
                pieces.push(RunPiece::Styled(EM_DASH.to_string(), Emphasis::Bold));
                count += 1;
            }
            if !part.is_empty() {
                pieces.push(RunPiece::Keep(part.to_string()));
            }
        }
        Some(pieces)
    })?;
    doc.set_text(rewritten);
    Ok(count)
}

fn capitalise_after_dashes(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    let mut after_dash_space = false;
    while let Some(c) = chars.next() {
        if after_dash_space {
            out.extend(c.to_uppercase());
            after_dash_space = false;
            continue;
        }
        if c == EM_DASH && chars.peek() == Some(&' ') {
            out.push(c);
            out.push(' ');
            chars.next();
            after_dash_space = true;
            continue;
        }
        out.push(c);
    }
    out
}

/// Bold the control labels wherever a run contains one. Returns the
/// number of label runs emitted.
pub fn bold_control_labels(doc: &mut DocumentXml) -> Result<usize> {
    let rules: Vec<PhraseRule> = BOLD_LABELS.iter().map(|l| PhraseRule::bold(*l)).collect();
    let mut count = 0usize;
    let rewritten = split_runs(doc.as_str(), |text| {
        if !BOLD_LABELS.iter().any(|l| text.contains(l)) {
            return None;
        }
        let runs = runfmt::split_styled(text, &rules);
        count += runs.iter().filter(|r| r.emphasis == Emphasis::Bold).count();
        Some(
            runs.into_iter()
                .map(|r| match r.emphasis {
                    Emphasis::Plain => RunPiece::Keep(r.text),
                    emphasis => RunPiece::Styled(r.text, emphasis),
                })
                .collect(),
        )
    })?;
    doc.set_text(rewritten);
    Ok(count)
}

/// Font used for the ticked-checkbox glyph; kept out of font
/// standardisation so the checkmark still renders.
const CHECKMARK_FONT: &str = "Segoe UI Symbol";

/// Normalise every `w:rFonts` to the body font: rewrite ascii/hAnsi/cs/
/// eastAsia where set, add ascii/hAnsi where missing, keep any other
/// attributes. Checkmark runs are skipped. Returns the number of
/// elements changed.
pub fn standardise_fonts(doc: &mut DocumentXml, font: &str) -> Result<usize> {
    let xml = doc.as_str();
    let mut reader = Reader::from_str(xml);
    let mut edits: Vec<(Span, String)> = Vec::new();
    loop {
        let pos = reader.buffer_position() as usize;
        match reader.read_event()? {
            Event::Empty(e) | Event::Start(e) if e.local_name().as_ref() == b"rFonts" => {
                let end = reader.buffer_position() as usize;
                let original = &xml[pos..end];
                if !original.ends_with("/>") {
                    continue; // rFonts is an empty element in practice
                }
                let mut attrs: Vec<(String, String)> = Vec::new();
                for attr in e.attributes() {
                    let attr = attr.map_err(quick_xml::Error::from)?;
                    let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
                    let value = attr
                        .unescape_value()
                        .map_err(quick_xml::Error::from)?
                        .into_owned();
                    attrs.push((key, value));
                }
                if attrs
                    .iter()
                    .any(|(k, v)| k == "w:ascii" && v == CHECKMARK_FONT)
                {
                    continue;
                }
                let mut changed = false;
                for (key, value) in attrs.iter_mut() {
                    if matches!(key.as_str(), "w:ascii" | "w:hAnsi" | "w:cs" | "w:eastAsia")
                        && value != font
                    {
                        *value = font.to_string();
                        changed = true;
                    }
                }
                for required in ["w:ascii", "w:hAnsi"] {
                    if !attrs.iter().any(|(k, _)| k == required) {
                        attrs.push((required.to_string(), font.to_string()));
                        changed = true;
                    }
                }
                if changed {
                    let mut tag = String::from("<w:rFonts");
                    for (key, value) in &attrs {
                        tag.push_str(&format!(" {key}=\"{}\"", runfmt::xml_escape(value)));
                    }
                    tag.push_str("/>");
                    edits.push((Span { start: pos, end }, tag));
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }
    let count = edits.len();
    doc.set_text(scan::apply_edits(xml, edits));
    Ok(count)
}

/// HRCW checkbox labels in the header table, keyed by the short names
/// plans use in `hrcw_ticks`.
pub const HRCW_LABELS: [(&str, &str); 18] = [
    ("falling_2m", "falling more than 2 metres"),
    ("asbestos", "disturbing asbestos"),
    ("telecom_tower", "telecommunication tower"),
    ("trench_1.5m", "shaft or trench deeper than 1.5"),
    ("explosives", "Use of explosives"),
    ("pressurised_gas", "pressurised gas mains"),
    ("structural_alterations", "load-bearing support for structural"),
    ("confined_space", "confined space"),
    ("chemical_fuel_lines", "chemical, fuel or refrigerant lines"),
    ("energised_electrical", "energised electrical installations"),
    ("flammable_atmosphere", "contaminated or flammable atmosphere"),
    ("demolition", "Demolition of load-bearing"),
    ("tilt_up_precast", "Tilt-up or precast"),
    ("road_traffic", "road, railway, shipping lane"),
    ("powered_mobile_plant", "movement of powered mobile plant"),
    ("temperature_extremes", "artificial extremes of temperature"),
    ("water_drowning", "risk of drowning"),
    ("diving", "Diving work"),
];

/// Rows of the header table that hold the checkbox grid.
const CHECKBOX_ROWS: std::ops::Range<usize> = 3..9;

/// Unticked checkbox prefix in the template.
const UNTICKED: &str = "[   ]";

/// Tick HRCW checkboxes in the header table. An unticked box is a single
/// run `[   ] Label text`; ticking splits it into `[`, a highlighted
/// checkmark run, and `] Label text`. Unknown keys are skipped.
pub fn tick_hrcw_checkboxes(
    doc: &mut DocumentXml,
    table_index: usize,
    keys: &[String],
) -> Result<usize> {
    if keys.is_empty() {
        return Ok(0);
    }
    let fragments: Vec<&str> = HRCW_LABELS
        .iter()
        .filter(|(key, _)| keys.iter().any(|k| k == key))
        .map(|(_, fragment)| *fragment)
        .collect();
    if fragments.is_empty() {
        return Ok(0);
    }

    let table = doc.table_fragment(table_index)?;
    let rows = scan::child_spans(&table, b"tr")?;
    let mut ticked = 0usize;
    let mut edits: Vec<(Span, String)> = Vec::new();

    for (row_idx, row_span) in rows.iter().enumerate() {
        if !CHECKBOX_ROWS.contains(&row_idx) {
            continue;
        }
        let row = row_span.slice(&table);
        let patched = split_runs(row, |text| {
            if !text.trim_start().starts_with(UNTICKED) {
                return None;
            }
            if !fragments.iter().any(|f| text.contains(f)) {
                return None;
            }
            let rest = text
                .split_once("] ")
                .map(|(_, rest)| rest)
                .unwrap_or_default();
            ticked += 1;
            Some(vec![
                RunPiece::Keep("[".to_string()),
                RunPiece::Raw(runfmt::run_xml(
                    "\u{2713}",
                    &RunProps {
                        font: "Segoe UI Symbol".to_string(),
                        size: 18,
                        bold: true,
                        highlight: true,
                        ..RunProps::default()
                    },
                )),
                RunPiece::Keep(format!("] {rest}")),
            ])
        })?;
        if patched != row {
            edits.push((*row_span, patched));
        }
    }

    if !edits.is_empty() {
        let rebuilt = scan::apply_edits(&table, edits);
        doc.replace_table(table_index, &rebuilt)?;
    }
    Ok(ticked)
}

// PPE terminology canonicalisation. The generator pre-pass auto-corrects
// reused template text; once a document reaches review, only the
// validator gate runs and nothing is corrected silently.

/// Glove descriptors that legitimise a plain "gloves" mention.
const GLOVE_DESCRIPTORS: [&str; 12] = [
    "nitrile",
    "leather",
    "insulating",
    "blast",
    "chemical-resistant",
    "rubber",
    "welding",
    "anti-vibration",
    "impact",
    "disposable",
    "cut-resistant",
    "gauntlet",
];

fn gloves_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)\bgloves\b").expect("static regex compiles"))
}

fn hearing_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[Hh]earing protection").expect("static regex compiles"))
}

/// Canonicalise PPE wording in one text node.
pub fn canonicalize_ppe_text(text: &str) -> String {
    let mut out = text.to_string();

    // Safety glasses family, compound phrases first.
    for (from, to) in [
        ("Safety glasses and face shield", "Eye protection and face shield"),
        ("Safety glasses or goggles", "Eye protection or goggles"),
        ("safety glasses and face shield", "eye protection and face shield"),
        ("safety glasses or goggles", "eye protection or goggles"),
        ("Safety glasses", "Eye protection"),
        ("safety glasses", "eye protection"),
    ] {
        out = out.replace(from, to);
    }

    // High-vis vest gains the shirt alternative unless already present.
    let lower = out.to_lowercase();
    if lower.contains("high-vis vest") && !lower.contains("or shirt") {
        out = out
            .replace("high-vis vest", "high-vis vest or shirt")
            .replace("High-vis vest", "High-vis vest or shirt");
    }

    // Hearing protection gains the dB qualifier unless one follows.
    out = replace_unless_followed_by_paren(&out, hearing_re(), "hearing protection (>85 dB)");

    // Bare gloves become cut-resistant unless a descriptor precedes.
    out = replace_bare_gloves(&out);
    out.replace("cut-resistant cut-resistant", "cut-resistant")
}

fn replace_unless_followed_by_paren(text: &str, re: &Regex, replacement: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut cursor = 0usize;
    for m in re.find_iter(text) {
        out.push_str(&text[cursor..m.start()]);
        let following = text[m.end()..].trim_start();
        if following.starts_with('(') {
            out.push_str(m.as_str());
        } else {
            out.push_str(replacement);
        }
        cursor = m.end();
    }
    out.push_str(&text[cursor..]);
    out
}

fn replace_bare_gloves(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut cursor = 0usize;
    for m in gloves_re().find_iter(text) {
        out.push_str(&text[cursor..m.start()]);
        let preceding = text[..m.start()].to_lowercase();
        let preceding = preceding.trim_end();
        let descriptored = GLOVE_DESCRIPTORS.iter().any(|d| preceding.ends_with(d));
        if descriptored {
            out.push_str(m.as_str());
        } else {
            out.push_str("cut-resistant gloves");
        }
        cursor = m.end();
    }
    out.push_str(&text[cursor..]);
    out
}
