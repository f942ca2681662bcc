//! Package relationship (`.rels`) parsing and part name resolution.

use quick_xml::events::Event;
use quick_xml::Reader;

use crate::error::{Error, Result};

/// Relationships of the package itself.
pub(crate) const PACKAGE_RELS: &str = "_rels/.rels";

/// A single `Relationship` element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Relationship {
    pub id: String,
    pub rel_type: String,
    pub target: String,
    pub external: bool,
}

impl Relationship {
    /// Check whether the relationship type ends with the given short name
    /// (e.g. `officeDocument`, `header`).
    pub fn is_type(&self, short: &str) -> bool {
        self.rel_type
            .rsplit('/')
            .next()
            .map(|t| t == short)
            .unwrap_or(false)
    }
}

/// Parse a relationships part.
pub(crate) fn parse_relationships(part: &str, xml: &str) -> Result<Vec<Relationship>> {
    let mut reader = Reader::from_str(xml);
    let mut relationships = Vec::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) | Ok(Event::Empty(e))
                if e.local_name().as_ref() == b"Relationship" =>
            {
                let mut rel = Relationship {
                    id: String::new(),
                    rel_type: String::new(),
                    target: String::new(),
                    external: false,
                };
                for attr in e.attributes() {
                    let attr = attr.map_err(|err| Error::malformed(part, err))?;
                    let value = attr
                        .unescape_value()
                        .map_err(|err| Error::malformed(part, err))?
                        .into_owned();
                    match attr.key.local_name().as_ref() {
                        b"Id" => rel.id = value,
                        b"Type" => rel.rel_type = value,
                        b"Target" => rel.target = value,
                        b"TargetMode" => rel.external = value.eq_ignore_ascii_case("External"),
                        _ => {}
                    }
                }
                relationships.push(rel);
            }
            Ok(Event::Eof) => break,
            Err(err) => return Err(Error::malformed(part, err)),
            _ => {}
        }
    }

    Ok(relationships)
}

/// Name of the relationships part belonging to `part`.
///
/// `word/document.xml` → `word/_rels/document.xml.rels`
pub(crate) fn rels_path(part: &str) -> String {
    match part.rsplit_once('/') {
        Some((dir, file)) => format!("{}/_rels/{}.rels", dir, file),
        None => format!("_rels/{}.rels", part),
    }
}

/// Resolve a relationship target against the part that declares it.
pub(crate) fn resolve_target(source_part: &str, target: &str) -> String {
    if let Some(absolute) = target.strip_prefix('/') {
        return absolute.to_string();
    }

    let mut segments: Vec<&str> = match source_part.rsplit_once('/') {
        Some((dir, _)) => dir.split('/').collect(),
        None => Vec::new(),
    };

    for segment in target.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            s => segments.push(s),
        }
    }

    segments.join("/")
}
