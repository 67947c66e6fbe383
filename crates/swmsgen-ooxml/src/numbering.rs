//! List-numbering allocation
//!
//! WordprocessingML lists use a two-level indirection: reusable
//! `w:abstractNum` style definitions and `w:num` instances that
//! paragraphs reference by id. Every synthesized hold-point row gets its
//! own fresh decimal + bullet definitions so no two rows share mutable
//! list state.
//!
//! Ids are minted as `max(existing) + 1` scanned from the live part
//! text. Allocations mutate the part, so each scan sees all earlier
//! allocations; the allocator is deliberately not idempotent.

use std::collections::HashMap;

use quick_xml::events::Event;
use quick_xml::Reader;

use crate::error::{DocxError, Result};
use crate::scan;

/// Identifier pairs minted for one hold-point row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NumberingPair {
    pub decimal_abstract_id: u32,
    pub decimal_num_id: u32,
    pub bullet_abstract_id: u32,
    pub bullet_num_id: u32,
}

impl NumberingPair {
    pub fn ids(&self) -> [u32; 4] {
        [
            self.decimal_abstract_id,
            self.decimal_num_id,
            self.bullet_abstract_id,
            self.bullet_num_id,
        ]
    }
}

/// The numbering part (word/numbering.xml), held as text and patched by
/// span splicing.
#[derive(Debug, Clone)]
pub struct NumberingPart {
    xml: String,
}

impl NumberingPart {
    /// Parse the part. The root element must be `w:numbering`.
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        let xml = String::from_utf8(bytes.to_vec())?;
        if scan::first_element_start(&xml, b"numbering")?.is_none() {
            return Err(DocxError::MalformedNumbering(
                "root element is not w:numbering".to_string(),
            ));
        }
        Ok(Self { xml })
    }

    pub fn as_str(&self) -> &str {
        &self.xml
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.xml.into_bytes()
    }

    /// Next free abstract-numbering (style) id: highest existing id + 1.
    /// Must be computed against the current part state; prior allocations
    /// in the same build are part of the scanned set.
    pub fn next_abstract_id(&self) -> Result<u32> {
        self.max_id(b"abstractNum", b"abstractNumId")
            .map(|max| max + 1)
    }

    /// Next free numbering-instance id. A separate id space from the
    /// abstract ids.
    pub fn next_num_id(&self) -> Result<u32> {
        self.max_id(b"num", b"numId").map(|max| max + 1)
    }

    /// Allocate a decimal definition: abstract style inserted before the
    /// first `w:num` (templates are sensitive to definition-before-use
    /// ordering), instance appended. Returns (abstract_id, num_id).
    pub fn allocate_decimal(&mut self) -> Result<(u32, u32)> {
        let abstract_id = self.next_abstract_id()?;
        self.insert_abstract(&decimal_abstract_xml(abstract_id))?;
        let num_id = self.next_num_id()?;
        self.append_num(&num_xml(num_id, abstract_id))?;
        Ok((abstract_id, num_id))
    }

    /// Allocate a bullet definition, same insertion discipline.
    pub fn allocate_bullet(&mut self) -> Result<(u32, u32)> {
        let abstract_id = self.next_abstract_id()?;
        self.insert_abstract(&bullet_abstract_xml(abstract_id))?;
        let num_id = self.next_num_id()?;
        self.append_num(&num_xml(num_id, abstract_id))?;
        Ok((abstract_id, num_id))
    }

    /// Mint a decimal + bullet pair for one hold-point row: four
    /// sequential allocations, each scanning the part as mutated by the
    /// previous one.
    pub fn allocate_pair(&mut self) -> Result<NumberingPair> {
        let (decimal_abstract_id, decimal_num_id) = self.allocate_decimal()?;
        let (bullet_abstract_id, bullet_num_id) = self.allocate_bullet()?;
        Ok(NumberingPair {
            decimal_abstract_id,
            decimal_num_id,
            bullet_abstract_id,
            bullet_num_id,
        })
    }

    /// Map every instance id to the list format ("decimal", "bullet") of
    /// its abstract definition's first level.
    pub fn num_formats(&self) -> Result<HashMap<u32, String>> {
        let mut num_to_abstract: HashMap<u32, u32> = HashMap::new();
        for span in scan::outer_spans(&self.xml, b"num")? {
            let fragment = span.slice(&self.xml);
            let Some(num_id) = element_attr_u32(fragment, b"num", b"numId")? else {
                continue;
            };
            if let Some(abstract_id) = element_attr_u32(fragment, b"abstractNumId", b"val")? {
                num_to_abstract.insert(num_id, abstract_id);
            }
        }

        let mut abstract_to_fmt: HashMap<u32, String> = HashMap::new();
        for span in scan::outer_spans(&self.xml, b"abstractNum")? {
            let fragment = span.slice(&self.xml);
            let Some(abstract_id) = element_attr_u32(fragment, b"abstractNum", b"abstractNumId")?
            else {
                continue;
            };
            if let Some(fmt) = first_attr_string(fragment, b"numFmt", b"val")? {
                abstract_to_fmt.insert(abstract_id, fmt);
            }
        }

        let mut formats = HashMap::new();
        for (num_id, abstract_id) in num_to_abstract {
            if let Some(fmt) = abstract_to_fmt.get(&abstract_id) {
                formats.insert(num_id, fmt.clone());
            }
        }
        Ok(formats)
    }

    /// Repair level texts written as "(%1)" to the plain "%1." decimal
    /// form, for consistent 1. 2. 3. rendering. Returns the count fixed.
    pub fn fix_parenthesised_decimals(&mut self) -> usize {
        let needle = "w:val=\"(%1)\"";
        let mut count = 0;
        let mut out = String::with_capacity(self.xml.len());
        let mut rest = self.xml.as_str();
        while let Some(at) = rest.find("<w:lvlText ") {
            let tag_end = match rest[at..].find('>') {
                Some(i) => at + i + 1,
                None => break,
            };
            out.push_str(&rest[..at]);
            let tag = &rest[at..tag_end];
            if tag.contains(needle) {
                out.push_str(&tag.replace(needle, "w:val=\"%1.\""));
                count += 1;
            } else {
                out.push_str(tag);
            }
            rest = &rest[tag_end..];
        }
        out.push_str(rest);
        self.xml = out;
        count
    }

    /// Remove any existing definition with the given abstract/instance
    /// ids, then insert fresh ones. Used by the bulletizer, which owns a
    /// fixed id and must be idempotent across repeat runs.
    pub fn replace_definition(
        &mut self,
        abstract_id: u32,
        num_id: u32,
        abstract_xml: &str,
        num_elem_xml: &str,
    ) -> Result<()> {
        let abstract_value = abstract_id.to_string();
        if let Some(span) =
            scan::span_with_attr(&self.xml, b"abstractNum", b"abstractNumId", &abstract_value)?
        {
            self.xml.replace_range(span.start..span.end, "");
        }
        let num_value = num_id.to_string();
        if let Some(span) = scan::span_with_attr(&self.xml, b"num", b"numId", &num_value)? {
            self.xml.replace_range(span.start..span.end, "");
        }
        self.insert_abstract(abstract_xml)?;
        self.append_num(num_elem_xml)?;
        Ok(())
    }

    fn max_id(&self, element: &[u8], attr: &[u8]) -> Result<u32> {
        let mut reader = Reader::from_str(&self.xml);
        let mut max: Option<u32> = None;
        loop {
            match reader.read_event()? {
                Event::Start(e) | Event::Empty(e) if e.local_name().as_ref() == element => {
                    if let Some(value) = scan::attr_value(&e, attr)? {
                        if let Ok(id) = value.trim().parse::<u32>() {
                            max = Some(max.map_or(id, |m| m.max(id)));
                        }
                    }
                }
                Event::Eof => break,
                _ => {}
            }
        }
        max.ok_or_else(|| {
            DocxError::MalformedNumbering(format!(
                "no {} elements with ids to scan",
                String::from_utf8_lossy(element)
            ))
        })
    }

    /// Insert an abstract definition before the first `w:num`, or before
    /// the closing root tag when no instances exist yet.
    fn insert_abstract(&mut self, fragment: &str) -> Result<()> {
        let at = match scan::first_element_start(&self.xml, b"num")? {
            Some(at) => at,
            None => self.closing_root_offset()?,
        };
        self.xml.insert_str(at, fragment);
        Ok(())
    }

    fn append_num(&mut self, fragment: &str) -> Result<()> {
        let at = self.closing_root_offset()?;
        self.xml.insert_str(at, fragment);
        Ok(())
    }

    fn closing_root_offset(&self) -> Result<usize> {
        self.xml.rfind("</w:numbering>").ok_or_else(|| {
            DocxError::MalformedNumbering("missing </w:numbering> close tag".to_string())
        })
    }
}

fn element_attr_u32(fragment: &str, element: &[u8], attr: &[u8]) -> Result<Option<u32>> {
    Ok(first_attr_string(fragment, element, attr)?.and_then(|v| v.trim().parse().ok()))
}

fn first_attr_string(fragment: &str, element: &[u8], attr: &[u8]) -> Result<Option<String>> {
    let mut reader = Reader::from_str(fragment);
    loop {
        match reader.read_event()? {
            Event::Start(e) | Event::Empty(e) if e.local_name().as_ref() == element => {
                return scan::attr_value(&e, attr);
            }
            Event::Eof => break,
            _ => {}
        }
    }
    Ok(None)
}

/// Decimal "1. 2. 3." level definition at body size.
pub fn decimal_abstract_xml(id: u32) -> String {
    format!(
        concat!(
            "<w:abstractNum w:abstractNumId=\"{id}\">",
            "<w:multiLevelType w:val=\"singleLevel\"/>",
            "<w:lvl w:ilvl=\"0\">",
            "<w:start w:val=\"1\"/>",
            "<w:numFmt w:val=\"decimal\"/>",
            "<w:lvlText w:val=\"%1.\"/>",
            "<w:lvlJc w:val=\"left\"/>",
            "<w:pPr><w:ind w:left=\"360\" w:hanging=\"360\"/></w:pPr>",
            "<w:rPr>",
            "<w:rFonts w:ascii=\"Aptos\" w:hAnsi=\"Aptos\" w:hint=\"default\"/>",
            "<w:sz w:val=\"16\"/><w:szCs w:val=\"16\"/>",
            "</w:rPr>",
            "</w:lvl>",
            "</w:abstractNum>"
        ),
        id = id
    )
}

/// Open-circle bullet level definition matching the template's bullet
/// lists (Courier New "o").
pub fn bullet_abstract_xml(id: u32) -> String {
    format!(
        concat!(
            "<w:abstractNum w:abstractNumId=\"{id}\">",
            "<w:multiLevelType w:val=\"singleLevel\"/>",
            "<w:lvl w:ilvl=\"0\">",
            "<w:start w:val=\"1\"/>",
            "<w:numFmt w:val=\"bullet\"/>",
            "<w:lvlText w:val=\"o\"/>",
            "<w:lvlJc w:val=\"left\"/>",
            "<w:pPr><w:ind w:left=\"360\" w:hanging=\"360\"/></w:pPr>",
            "<w:rPr>",
            "<w:rFonts w:ascii=\"Courier New\" w:hAnsi=\"Courier New\" w:cs=\"Courier New\" w:hint=\"default\"/>",
            "<w:sz w:val=\"16\"/><w:szCs w:val=\"16\"/>",
            "</w:rPr>",
            "</w:lvl>",
            "</w:abstractNum>"
        ),
        id = id
    )
}

/// Instance element mapping a num id onto an abstract definition.
pub fn num_xml(num_id: u32, abstract_id: u32) -> String {
    format!(
        "<w:num w:numId=\"{num_id}\"><w:abstractNumId w:val=\"{abstract_id}\"/></w:num>"
    )
}
