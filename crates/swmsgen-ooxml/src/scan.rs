//! Byte-span scanning over OOXML part text
//!
//! The builders keep every part as a plain string and mutate it by
//! splicing byte ranges. This module locates those ranges with a
//! streaming `quick_xml` pass: each event's span is the reader position
//! before and after the event is read. Escaped text can never contain a
//! literal `<`, so element spans found this way are exact.

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::error::Result;

/// Byte range of an element (or text node) within a part string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn slice<'a>(&self, xml: &'a str) -> &'a str {
        &xml[self.start..self.end]
    }
}

/// Spans of all outermost elements with the given local name.
/// Nested occurrences (a table inside a table cell) are skipped; they
/// belong to the enclosing span.
pub fn outer_spans(xml: &str, local: &[u8]) -> Result<Vec<Span>> {
    let mut reader = Reader::from_str(xml);
    let mut spans = Vec::new();
    let mut depth = 0usize;
    let mut start = 0usize;

    loop {
        let pos = reader.buffer_position() as usize;
        match reader.read_event()? {
            Event::Start(e) if e.local_name().as_ref() == local => {
                if depth == 0 {
                    start = pos;
                }
                depth += 1;
            }
            Event::End(e) if e.local_name().as_ref() == local => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    spans.push(Span {
                        start,
                        end: reader.buffer_position() as usize,
                    });
                }
            }
            Event::Empty(e) if e.local_name().as_ref() == local && depth == 0 => {
                spans.push(Span {
                    start: pos,
                    end: reader.buffer_position() as usize,
                });
            }
            Event::Eof => break,
            _ => {}
        }
    }
    Ok(spans)
}

/// Spans of the direct children of a fragment's root element that carry
/// the given local name. The fragment must start at its root element.
pub fn child_spans(fragment: &str, local: &[u8]) -> Result<Vec<Span>> {
    let mut reader = Reader::from_str(fragment);
    let mut spans = Vec::new();
    let mut depth = 0usize;
    let mut pending: Option<usize> = None;

    loop {
        let pos = reader.buffer_position() as usize;
        match reader.read_event()? {
            Event::Start(e) => {
                depth += 1;
                if depth == 2 && pending.is_none() && e.local_name().as_ref() == local {
                    pending = Some(pos);
                }
            }
            Event::End(_) => {
                if depth == 2 {
                    if let Some(start) = pending.take() {
                        spans.push(Span {
                            start,
                            end: reader.buffer_position() as usize,
                        });
                    }
                }
                depth = depth.saturating_sub(1);
            }
            Event::Empty(e) => {
                if depth == 1 && e.local_name().as_ref() == local {
                    spans.push(Span {
                        start: pos,
                        end: reader.buffer_position() as usize,
                    });
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }
    Ok(spans)
}

/// Span of the first element (at any depth) whose local name matches and
/// whose attribute `attr_local` equals `value`.
pub fn span_with_attr(
    xml: &str,
    local: &[u8],
    attr_local: &[u8],
    value: &str,
) -> Result<Option<Span>> {
    let mut reader = Reader::from_str(xml);
    let mut depth = 0usize;
    let mut start = 0usize;
    let mut matched = false;

    loop {
        let pos = reader.buffer_position() as usize;
        match reader.read_event()? {
            Event::Start(e) if e.local_name().as_ref() == local => {
                if depth == 0 && attr_value(&e, attr_local)?.as_deref() == Some(value) {
                    matched = true;
                    start = pos;
                }
                if matched {
                    depth += 1;
                }
            }
            Event::End(e) if matched && e.local_name().as_ref() == local => {
                depth -= 1;
                if depth == 0 {
                    return Ok(Some(Span {
                        start,
                        end: reader.buffer_position() as usize,
                    }));
                }
            }
            Event::Empty(e) if e.local_name().as_ref() == local && depth == 0 => {
                if attr_value(&e, attr_local)?.as_deref() == Some(value) {
                    return Ok(Some(Span {
                        start: pos,
                        end: reader.buffer_position() as usize,
                    }));
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }
    Ok(None)
}

/// Byte offset where the first element with the given local name starts,
/// if any.
pub fn first_element_start(xml: &str, local: &[u8]) -> Result<Option<usize>> {
    let mut reader = Reader::from_str(xml);
    loop {
        let pos = reader.buffer_position() as usize;
        match reader.read_event()? {
            Event::Start(e) | Event::Empty(e) if e.local_name().as_ref() == local => {
                return Ok(Some(pos));
            }
            Event::Eof => break,
            _ => {}
        }
    }
    Ok(None)
}

/// True if the fragment contains an element with the given local name.
pub fn fragment_has(fragment: &str, local: &[u8]) -> Result<bool> {
    Ok(first_element_start(fragment, local)?.is_some())
}

/// Value of the attribute with the given local name, unescaped.
pub fn attr_value(element: &BytesStart<'_>, attr_local: &[u8]) -> Result<Option<String>> {
    for attr in element.attributes() {
        let attr = attr.map_err(quick_xml::Error::from)?;
        if attr.key.local_name().as_ref() == attr_local {
            let value = attr
                .unescape_value()
                .map_err(quick_xml::Error::from)?
                .into_owned();
            return Ok(Some(value));
        }
    }
    Ok(None)
}

/// Concatenated, unescaped content of every `w:t` in the fragment.
pub fn concat_text(fragment: &str) -> Result<String> {
    let mut reader = Reader::from_str(fragment);
    let mut out = String::new();
    let mut in_t = 0usize;
    loop {
        match reader.read_event()? {
            Event::Start(e) if e.local_name().as_ref() == b"t" => in_t += 1,
            Event::End(e) if e.local_name().as_ref() == b"t" => in_t = in_t.saturating_sub(1),
            Event::Text(t) if in_t > 0 => out.push_str(&t.unescape()?),
            Event::Eof => break,
            _ => {}
        }
    }
    Ok(out)
}

/// Rewrite the content of every `w:t` text node through `f`, leaving all
/// markup untouched. Returns the new fragment and the number of text
/// nodes whose content changed.
pub fn rewrite_text_nodes<F>(fragment: &str, mut f: F) -> Result<(String, usize)>
where
    F: FnMut(&str) -> String,
{
    let mut reader = Reader::from_str(fragment);
    let mut edits: Vec<(Span, String)> = Vec::new();
    let mut in_t = 0usize;

    loop {
        let pos = reader.buffer_position() as usize;
        match reader.read_event()? {
            Event::Start(e) if e.local_name().as_ref() == b"t" => in_t += 1,
            Event::End(e) if e.local_name().as_ref() == b"t" => in_t = in_t.saturating_sub(1),
            Event::Text(t) if in_t > 0 => {
                let end = reader.buffer_position() as usize;
                let original = t.unescape()?.into_owned();
                let replaced = f(&original);
                if replaced != original {
                    let escaped = quick_xml::escape::escape(replaced.as_str()).into_owned();
                    edits.push((Span { start: pos, end }, escaped));
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    let count = edits.len();
    Ok((apply_edits(fragment, edits), count))
}

/// Splice replacements into the string. Edits must be non-overlapping;
/// they are applied back to front so earlier spans stay valid.
pub fn apply_edits(xml: &str, mut edits: Vec<(Span, String)>) -> String {
    edits.sort_by_key(|(span, _)| span.start);
    let mut out = String::with_capacity(xml.len());
    let mut cursor = 0usize;
    for (span, replacement) in edits {
        out.push_str(&xml[cursor..span.start]);
        out.push_str(&replacement);
        cursor = span.end;
    }
    out.push_str(&xml[cursor..]);
    out
}

/// Byte offset just past the root element's open tag (`<w:tr ...>`).
/// Attribute values are escaped, so the first `>` always closes the tag.
pub fn open_tag_end(fragment: &str) -> Option<usize> {
    fragment.find('>').map(|i| i + 1)
}
