//! Section and header/footer reference types.

use serde::{Deserialize, Serialize};

/// Header or footer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HeaderFooterKind {
    /// `w:headerReference`
    Header,
    /// `w:footerReference`
    Footer,
}

/// Header/footer variant (`w:type` attribute).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HeaderFooterType {
    /// Primary header/footer (`default`)
    #[default]
    Default,
    /// First-page header/footer (`first`)
    First,
    /// Even-page header/footer (`even`)
    Even,
}

impl HeaderFooterType {
    /// Parse the `w:type` attribute value. A missing attribute means `default`.
    pub fn from_attr(value: Option<&str>) -> Option<Self> {
        match value {
            None | Some("default") => Some(Self::Default),
            Some("first") => Some(Self::First),
            Some("even") => Some(Self::Even),
            Some(_) => None,
        }
    }
}

/// Order in which a section's headers and footers are enumerated.
pub const SLOT_ORDER: [(HeaderFooterKind, HeaderFooterType); 6] = [
    (HeaderFooterKind::Header, HeaderFooterType::Default),
    (HeaderFooterKind::Header, HeaderFooterType::First),
    (HeaderFooterKind::Header, HeaderFooterType::Even),
    (HeaderFooterKind::Footer, HeaderFooterType::Default),
    (HeaderFooterKind::Footer, HeaderFooterType::First),
    (HeaderFooterKind::Footer, HeaderFooterType::Even),
];

/// A reference from a section to a header or footer part.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartReference {
    /// Header or footer
    pub kind: HeaderFooterKind,
    /// Variant
    pub variant: HeaderFooterType,
    /// Relationship id (`r:id`)
    pub rel_id: String,
    /// Index into `Document::parts` once resolved
    pub part: Option<usize>,
}

/// A document section (one `w:sectPr`).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Section {
    /// Header/footer references declared by the section
    pub references: Vec<PartReference>,
}

impl Section {
    /// Create a section without references.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the resolved part for a header/footer slot.
    pub fn part_for(&self, kind: HeaderFooterKind, variant: HeaderFooterType) -> Option<usize> {
        self.references
            .iter()
            .find(|r| r.kind == kind && r.variant == variant)
            .and_then(|r| r.part)
    }

    /// Resolved parts in enumeration order (default, first, even headers,
    /// then the same footers).
    pub fn ordered_parts(&self) -> impl Iterator<Item = (HeaderFooterKind, HeaderFooterType, usize)> + '_ {
        SLOT_ORDER
            .iter()
            .filter_map(move |&(kind, variant)| {
                self.part_for(kind, variant).map(|part| (kind, variant, part))
            })
    }
}
