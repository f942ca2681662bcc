//! Document-level types.

use super::{collect_paragraphs, Block, HeaderFooterKind, HeaderFooterType, Paragraph, Section};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;

/// A loaded DOCX document.
///
/// The document keeps the original archive bytes so parts that carry no
/// text can be copied unchanged when it is written back.
#[derive(Debug, Clone)]
pub struct Document {
    /// Original archive bytes
    pub(crate) container: Arc<[u8]>,

    /// Parsed text-bearing parts; index 0 is the main document part
    pub parts: Vec<Part>,

    /// Sections in document order
    pub sections: Vec<Section>,

    /// Region enumeration, fixed at load time
    regions: Vec<Region>,
}

impl Document {
    /// Assemble a document and fix its region order.
    pub(crate) fn new(container: Arc<[u8]>, parts: Vec<Part>, sections: Vec<Section>) -> Self {
        let regions = enumerate_regions(&parts, &sections);
        Self {
            container,
            parts,
            sections,
            regions,
        }
    }

    /// Regions in traversal order: body paragraphs, table-cell paragraphs,
    /// then each section's headers and footers.
    ///
    /// The order never changes for a loaded document, so discovery and
    /// substitution always see the same text surface.
    pub fn regions(&self) -> &[Region] {
        &self.regions
    }

    /// Get the number of regions.
    pub fn region_count(&self) -> usize {
        self.regions.len()
    }

    /// Get the main document part.
    pub fn main_part(&self) -> &Part {
        &self.parts[0]
    }

    /// Get a part by its archive name.
    pub fn part(&self, name: &str) -> Option<&Part> {
        self.parts.iter().find(|p| p.name == name)
    }

    /// Get the paragraph behind a region.
    pub fn paragraph(&self, id: RegionId) -> Option<&Paragraph> {
        self.parts.get(id.part)?.paragraphs.get(id.paragraph)
    }

    /// Get the paragraph behind a region for mutation.
    pub fn paragraph_mut(&mut self, id: RegionId) -> Option<&mut Paragraph> {
        self.parts.get_mut(id.part)?.paragraphs.get_mut(id.paragraph)
    }

    /// Get the flattened text of a region.
    pub fn region_text(&self, id: RegionId) -> Option<String> {
        self.paragraph(id).map(Paragraph::text)
    }

    /// Replace the flattened text of a region.
    ///
    /// Returns `false` when the region is unknown or the text is unchanged.
    pub fn set_region_text(&mut self, id: RegionId, text: &str) -> bool {
        self.paragraph_mut(id)
            .map(|p| p.set_text(text))
            .unwrap_or(false)
    }

    /// Check whether any region has been rewritten.
    pub fn is_modified(&self) -> bool {
        self.parts.iter().any(Part::is_modified)
    }

    /// Count top-level tables in the main part.
    pub fn table_count(&self) -> usize {
        self.main_part()
            .blocks
            .iter()
            .filter(|b| matches!(b, Block::Table(_)))
            .count()
    }

    /// Get plain text of all regions, one region per line.
    pub fn plain_text(&self) -> String {
        self.regions
            .iter()
            .filter_map(|r| self.region_text(r.id))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// A text-bearing XML part of the archive.
#[derive(Debug, Clone)]
pub struct Part {
    /// Archive entry name (e.g. `word/header1.xml`)
    pub name: String,

    /// Role of the part
    pub kind: PartKind,

    /// Part XML as read from the archive
    pub(crate) xml: String,

    /// All paragraphs of the part, including ones nested in text boxes
    pub paragraphs: Vec<Paragraph>,

    /// Block structure (top-level paragraphs and tables)
    pub blocks: Vec<Block>,
}

impl Part {
    pub(crate) fn new(name: impl Into<String>, kind: PartKind, xml: String) -> Self {
        Self {
            name: name.into(),
            kind,
            xml,
            paragraphs: Vec::new(),
            blocks: Vec::new(),
        }
    }

    /// Check whether any paragraph of the part has been rewritten.
    pub fn is_modified(&self) -> bool {
        self.paragraphs.iter().any(Paragraph::is_modified)
    }

    /// Get the original XML of the part.
    pub fn xml(&self) -> &str {
        &self.xml
    }
}

/// Role of a part.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PartKind {
    /// Main document part
    Main,
    /// Header part
    Header,
    /// Footer part
    Footer,
}

impl From<HeaderFooterKind> for PartKind {
    fn from(kind: HeaderFooterKind) -> Self {
        match kind {
            HeaderFooterKind::Header => PartKind::Header,
            HeaderFooterKind::Footer => PartKind::Footer,
        }
    }
}

/// Handle to one region (paragraph) of a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RegionId {
    /// Index into `Document::parts`
    pub part: usize,
    /// Index into `Part::paragraphs`
    pub paragraph: usize,
}

/// Where a region lives in the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "variant", rename_all = "snake_case")]
pub enum RegionKind {
    /// Top-level body paragraph
    Body,
    /// Paragraph inside a body table cell
    TableCell,
    /// Header paragraph
    Header(HeaderFooterType),
    /// Footer paragraph
    Footer(HeaderFooterType),
}

/// A region in enumeration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Region {
    /// Region handle
    pub id: RegionId,
    /// Region location
    pub kind: RegionKind,
}

fn enumerate_regions(parts: &[Part], sections: &[Section]) -> Vec<Region> {
    let mut regions = Vec::new();
    let Some(main) = parts.first() else {
        return regions;
    };

    let region = |part, paragraph, kind| Region {
        id: RegionId { part, paragraph },
        kind,
    };

    for block in &main.blocks {
        if let Block::Paragraph(idx) = block {
            regions.push(region(0, *idx, RegionKind::Body));
        }
    }

    for block in &main.blocks {
        if let Block::Table(table) = block {
            for idx in table.paragraphs() {
                regions.push(region(0, idx, RegionKind::TableCell));
            }
        }
    }

    let mut seen = HashSet::new();
    for section in sections {
        for (kind, variant, part_idx) in section.ordered_parts() {
            if part_idx == 0 || !seen.insert(part_idx) {
                continue;
            }
            let Some(part) = parts.get(part_idx) else {
                continue;
            };
            let region_kind = match kind {
                HeaderFooterKind::Header => RegionKind::Header(variant),
                HeaderFooterKind::Footer => RegionKind::Footer(variant),
            };
            let mut paragraphs = Vec::new();
            collect_paragraphs(&part.blocks, &mut paragraphs);
            for idx in paragraphs {
                regions.push(region(part_idx, idx, region_kind));
            }
        }
    }

    regions
}
