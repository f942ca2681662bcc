//! Document model types for DOCX templates.
//!
//! This module defines the in-memory view the placeholder engine works on:
//! parts made of paragraphs (regions), each paragraph made of fragments of
//! run text. Every fragment keeps the byte span of its XML element so the
//! writer can splice changes back without re-serializing untouched markup.

mod document;
mod paragraph;
mod section;
mod table;

pub use document::{Document, Part, PartKind, Region, RegionId, RegionKind};
pub use paragraph::{EditOutcome, Fragment, FragmentKind, Paragraph, RunStyle, TextEdit};
pub(crate) use paragraph::ParagraphAnchor;
pub use section::{HeaderFooterKind, HeaderFooterType, PartReference, Section, SLOT_ORDER};
pub use table::{collect_paragraphs, Block, Table, TableCell, TableRow};
