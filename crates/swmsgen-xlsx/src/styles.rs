//! Workbook styles part
//!
//! Fixed style table shared by both sheets. Ids are consts so the sheet
//! builders and the styles part can never drift apart.

use swmsgen_model::RiskLevel;

pub const FONT_NAME: &str = "Arial";
pub const HEADER_BG: &str = "DBE5F1";
pub const ALT_ROW_BG: &str = "F2F2F2";

// cellXfs indexes
pub const STYLE_DEFAULT: u32 = 0;
pub const STYLE_HEADER: u32 = 1;
pub const STYLE_BODY: u32 = 2;
pub const STYLE_BODY_BOLD: u32 = 3;
pub const STYLE_BODY_CENTER: u32 = 4;
pub const STYLE_BODY_BOLD_CENTER: u32 = 5;
pub const STYLE_RISK_RED: u32 = 6;
pub const STYLE_RISK_YELLOW: u32 = 7;
pub const STYLE_RISK_GREEN: u32 = 8;
pub const STYLE_TITLE: u32 = 9;
pub const STYLE_LABEL: u32 = 10;
pub const STYLE_VALUE: u32 = 11;
pub const STYLE_BULLET: u32 = 12;
pub const STYLE_BODY_ALT: u32 = 13;
pub const STYLE_BODY_CENTER_ALT: u32 = 14;
pub const STYLE_BODY_BOLD_CENTER_ALT: u32 = 15;

// dxf indexes for the conditional-formatting rules
pub const DXF_CRITICAL: u32 = 0;
pub const DXF_HIGH: u32 = 1;
pub const DXF_MEDIUM: u32 = 2;
pub const DXF_LOW: u32 = 3;

/// Badge style for a risk level, matching the document colour contract.
pub fn risk_style(level: RiskLevel) -> u32 {
    match level {
        RiskLevel::Critical | RiskLevel::High => STYLE_RISK_RED,
        RiskLevel::Medium => STYLE_RISK_YELLOW,
        RiskLevel::Low => STYLE_RISK_GREEN,
    }
}

/// Banded variant of a body style for odd data rows; risk badges keep
/// their fill.
pub fn banded(style: u32) -> u32 {
    match style {
        STYLE_BODY => STYLE_BODY_ALT,
        STYLE_BODY_CENTER => STYLE_BODY_CENTER_ALT,
        STYLE_BODY_BOLD_CENTER => STYLE_BODY_BOLD_CENTER_ALT,
        other => other,
    }
}

fn font(size: u32, bold: bool, color: &str) -> String {
    format!(
        "<font><sz val=\"{size}\"/>{}<color rgb=\"FF{color}\"/><name val=\"{FONT_NAME}\"/></font>",
        if bold { "<b/>" } else { "" }
    )
}

fn solid_fill(rgb: &str) -> String {
    format!(
        "<fill><patternFill patternType=\"solid\"><fgColor rgb=\"FF{rgb}\"/><bgColor rgb=\"FF{rgb}\"/></patternFill></fill>"
    )
}

fn xf(font_id: u32, fill_id: u32, border_id: u32, align: Option<&str>) -> String {
    let apply_fill = u32::from(fill_id != 0);
    match align {
        Some(a) => format!(
            "<xf numFmtId=\"0\" fontId=\"{font_id}\" fillId=\"{fill_id}\" borderId=\"{border_id}\" applyFont=\"1\" applyFill=\"{apply_fill}\" applyBorder=\"1\" applyAlignment=\"1\"><alignment {a}/></xf>"
        ),
        None => format!(
            "<xf numFmtId=\"0\" fontId=\"{font_id}\" fillId=\"{fill_id}\" borderId=\"{border_id}\" applyFont=\"1\" applyFill=\"{apply_fill}\" applyBorder=\"{}\"/>",
            u32::from(border_id != 0)
        ),
    }
}

fn dxf(fill: &str, font_color: &str) -> String {
    format!(
        "<dxf><font><b/><color rgb=\"FF{font_color}\"/></font><fill><patternFill><bgColor rgb=\"FF{fill}\"/></patternFill></fill></dxf>"
    )
}

/// The complete `xl/styles.xml` part.
pub fn styles_xml() -> String {
    let center_wrap = "horizontal=\"center\" vertical=\"center\" wrapText=\"1\"";
    let top_wrap = "vertical=\"top\" wrapText=\"1\"";
    let center_top_wrap = "horizontal=\"center\" vertical=\"top\" wrapText=\"1\"";

    let fonts = [
        font(8, false, "000000"),  // 0 body
        font(8, true, "000000"),   // 1 bold
        font(8, true, "FFFFFF"),   // 2 bold on red
        font(12, true, "000000"),  // 3 section title
        font(10, true, "000000"),  // 4 header label
        font(10, false, "000000"), // 5 header value
        font(9, false, "000000"),  // 6 hold-point bullets
    ]
    .concat();

    let fills = [
        "<fill><patternFill patternType=\"none\"/></fill>".to_string(),
        "<fill><patternFill patternType=\"gray125\"/></fill>".to_string(),
        solid_fill(HEADER_BG),              // 2
        solid_fill("FF0000"),               // 3
        solid_fill("FFFF00"),               // 4
        solid_fill("00FF00"),               // 5
        solid_fill(ALT_ROW_BG),             // 6
    ]
    .concat();

    let thin = "<border><left style=\"thin\"/><right style=\"thin\"/><top style=\"thin\"/><bottom style=\"thin\"/><diagonal/></border>";
    let borders = format!("<border><left/><right/><top/><bottom/><diagonal/></border>{thin}");

    let xfs = [
        xf(0, 0, 0, None),                           // 0 default
        xf(1, 2, 1, Some(center_wrap)),              // 1 header
        xf(0, 0, 1, Some(top_wrap)),                 // 2 body
        xf(1, 0, 1, Some(top_wrap)),                 // 3 body bold
        xf(0, 0, 1, Some(center_top_wrap)),          // 4 body centred
        xf(1, 0, 1, Some(center_top_wrap)),          // 5 body bold centred
        xf(2, 3, 1, Some(center_top_wrap)),          // 6 risk red
        xf(1, 4, 1, Some(center_top_wrap)),          // 7 risk yellow
        xf(1, 5, 1, Some(center_top_wrap)),          // 8 risk green
        xf(3, 0, 0, None),                           // 9 title
        xf(4, 0, 0, Some("vertical=\"top\"")),       // 10 label
        xf(5, 0, 0, Some("vertical=\"top\"")),       // 11 value
        xf(6, 0, 0, Some("wrapText=\"1\"")),         // 12 bullet
        xf(0, 6, 1, Some(top_wrap)),                 // 13 body banded
        xf(0, 6, 1, Some(center_top_wrap)),          // 14 centred banded
        xf(1, 6, 1, Some(center_top_wrap)),          // 15 bold centred banded
    ]
    .concat();

    let dxfs = [
        dxf("FF0000", "FFFFFF"), // critical
        dxf("FF0000", "FFFFFF"), // high
        dxf("FFFF00", "000000"), // medium
        dxf("00FF00", "000000"), // low
    ]
    .concat();

    format!(
        concat!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
            r#"<styleSheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">"#,
            "<fonts count=\"7\">{fonts}</fonts>",
            "<fills count=\"7\">{fills}</fills>",
            "<borders count=\"2\">{borders}</borders>",
            "<cellStyleXfs count=\"1\"><xf numFmtId=\"0\" fontId=\"0\" fillId=\"0\" borderId=\"0\"/></cellStyleXfs>",
            "<cellXfs count=\"16\">{xfs}</cellXfs>",
            "<cellStyles count=\"1\"><cellStyle name=\"Normal\" xfId=\"0\" builtinId=\"0\"/></cellStyles>",
            "<dxfs count=\"4\">{dxfs}</dxfs>",
            "</styleSheet>"
        ),
        fonts = fonts,
        fills = fills,
        borders = borders,
        xfs = xfs,
        dxfs = dxfs,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_styles_counts_match() {
        let xml = styles_xml();
        assert_eq!(xml.matches("<name val=\"Arial\"/>").count(), 7);
        assert_eq!(xml.matches("<xf numFmtId").count(), 17); // 16 + cellStyleXfs
        assert_eq!(xml.matches("<dxf>").count(), 4);
    }

    #[test]
    fn test_risk_styles_follow_colour_contract() {
        assert_eq!(risk_style(RiskLevel::Critical), STYLE_RISK_RED);
        assert_eq!(risk_style(RiskLevel::High), STYLE_RISK_RED);
        assert_eq!(risk_style(RiskLevel::Medium), STYLE_RISK_YELLOW);
        assert_eq!(risk_style(RiskLevel::Low), STYLE_RISK_GREEN);
    }

    #[test]
    fn test_banding_skips_risk_cells() {
        assert_eq!(banded(STYLE_BODY), STYLE_BODY_ALT);
        assert_eq!(banded(STYLE_RISK_RED), STYLE_RISK_RED);
    }
}
