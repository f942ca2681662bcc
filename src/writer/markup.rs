//! Part XML rewriting.
//!
//! Modified fragments are spliced back into the part XML they were parsed
//! from; everything between them is copied byte-for-byte.

use std::ops::Range;

use quick_xml::escape::escape;

use crate::error::{Error, Result};
use crate::model::{Paragraph, ParagraphAnchor, Part};

/// Qualified element name for a namespace prefix.
fn qname(prefix: &str, local: &str) -> String {
    if prefix.is_empty() {
        local.to_string()
    } else {
        format!("{}:{}", prefix, local)
    }
}

/// Check whether a character can appear in an XML 1.0 document.
fn is_xml_char(c: char) -> bool {
    matches!(c,
        '\u{9}' | '\u{A}' | '\u{D}'
        | '\u{20}'..='\u{D7FF}'
        | '\u{E000}'..='\u{FFFD}'
        | '\u{10000}'..='\u{10FFFF}')
}

/// Encode run content for `text`: text elements separated by tab and
/// break elements. Empty text encodes to nothing.
pub(crate) fn encode_text(prefix: &str, text: &str) -> Result<String> {
    let t = qname(prefix, "t");
    let mut out = String::with_capacity(text.len() + 32);
    let mut pending = String::new();

    let flush = |pending: &mut String, out: &mut String| {
        if !pending.is_empty() {
            out.push_str(&format!(
                "<{} xml:space=\"preserve\">{}</{}>",
                t,
                escape(pending.as_str()),
                t
            ));
            pending.clear();
        }
    };

    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\t' => {
                flush(&mut pending, &mut out);
                out.push_str(&format!("<{}/>", qname(prefix, "tab")));
            }
            '\r' | '\n' => {
                if c == '\r' && chars.peek() == Some(&'\n') {
                    chars.next();
                }
                flush(&mut pending, &mut out);
                out.push_str(&format!("<{}/>", qname(prefix, "br")));
            }
            c if is_xml_char(c) => pending.push(c),
            c => {
                return Err(Error::Serialization(format!(
                    "character U+{:04X} cannot be represented in XML",
                    c as u32
                )));
            }
        }
    }
    flush(&mut pending, &mut out);

    Ok(out)
}

/// Markup of a fresh, unformatted run holding `text`.
fn appended_run(prefix: &str, text: &str) -> Result<String> {
    let r = qname(prefix, "r");
    Ok(format!("<{}>{}</{}>", r, encode_text(prefix, text)?, r))
}

/// Collect the replacements a paragraph needs in its part XML.
fn paragraph_splices(paragraph: &Paragraph, out: &mut Vec<(Range<usize>, String)>) -> Result<()> {
    for fragment in paragraph.fragments.iter().filter(|f| f.is_modified()) {
        out.push((
            fragment.span.clone(),
            encode_text(&paragraph.prefix, fragment.text())?,
        ));
    }

    if let Some(ref text) = paragraph.appended {
        let run = appended_run(&paragraph.prefix, text)?;
        match paragraph.anchor {
            ParagraphAnchor::Close(offset) => out.push((offset..offset, run)),
            ParagraphAnchor::SelfClosing(ref span) => out.push((
                span.clone(),
                format!(">{}</{}>", run, qname(&paragraph.prefix, "p")),
            )),
        }
    }

    Ok(())
}

/// Render the current XML of a part.
pub(crate) fn render_part(part: &Part) -> Result<String> {
    let mut splices = Vec::new();
    for paragraph in &part.paragraphs {
        paragraph_splices(paragraph, &mut splices)
            .map_err(|e| Error::Serialization(format!("{}: {}", part.name, e)))?;
    }
    splices.sort_by_key(|(range, _)| (range.start, range.end));

    let xml = part.xml();
    let mut out = String::with_capacity(xml.len() + splices.len() * 16);
    let mut cursor = 0;
    for (range, replacement) in splices {
        if range.start < cursor || range.end > xml.len() {
            return Err(Error::Serialization(format!(
                "{}: overlapping edit at byte {}",
                part.name, range.start
            )));
        }
        out.push_str(&xml[cursor..range.start]);
        out.push_str(&replacement);
        cursor = range.end;
    }
    out.push_str(&xml[cursor..]);

    Ok(out)
}
