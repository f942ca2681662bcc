//! WordprocessingML part reader.
//!
//! Walks a part (`w:document`, `w:hdr` or `w:ftr`) with a namespace-aware
//! pull reader and records paragraphs, their run text and the byte span of
//! every text-bearing element. Only elements bound to the WordprocessingML
//! namespace are interpreted; everything else is carried as opaque markup.

use quick_xml::events::{BytesStart, Event};
use quick_xml::name::{Namespace, ResolveResult};
use quick_xml::NsReader;

use crate::error::{Error, Result};
use crate::model::{
    Block, Fragment, FragmentKind, HeaderFooterKind, HeaderFooterType, Paragraph,
    ParagraphAnchor, Part, PartKind, PartReference, RunStyle, Section, Table, TableCell,
    TableRow,
};

const WORDML_NS: &[u8] = b"http://schemas.openxmlformats.org/wordprocessingml/2006/main";
const WORDML_STRICT_NS: &[u8] = b"http://purl.oclc.org/ooxml/wordprocessingml/main";
const COMPAT_NS: &[u8] = b"http://schemas.openxmlformats.org/markup-compatibility/2006";

/// Namespace family of an element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Markup {
    WordMl,
    Compatibility,
    Foreign,
}

fn classify(ns: &ResolveResult) -> Markup {
    match ns {
        ResolveResult::Bound(Namespace(n)) if *n == WORDML_NS || *n == WORDML_STRICT_NS => {
            Markup::WordMl
        }
        ResolveResult::Bound(Namespace(n)) if *n == COMPAT_NS => Markup::Compatibility,
        _ => Markup::Foreign,
    }
}

/// Expected root element for a part kind.
fn root_name(kind: PartKind) -> &'static [u8] {
    match kind {
        PartKind::Main => b"document",
        PartKind::Header => b"hdr",
        PartKind::Footer => b"ftr",
    }
}

/// Element currently open in the part.
#[derive(Debug, Clone, Copy)]
enum Frame {
    Other,
    Table,
    Row,
    Cell,
    Paragraph(usize),
    Run { paragraph: usize, run: usize },
    RunProperties { paragraph: usize, run: usize, start: usize },
    Leaf { paragraph: usize, fragment: usize },
    SectionProperties,
    /// `mc:Fallback`: an alternative rendering of the preceding `mc:Choice`
    Fallback,
}

/// Parse a part into its paragraphs, block structure and sections.
///
/// Sections are only declared by the main part; for header and footer
/// parts the returned list is empty.
pub(crate) fn parse_part(name: &str, kind: PartKind, xml: String) -> Result<(Part, Vec<Section>)> {
    let xml = match xml.strip_prefix('\u{feff}') {
        Some(stripped) => stripped.to_string(),
        None => xml,
    };

    let mut builder = PartBuilder::new(name);
    builder.read(&xml, kind)?;

    let mut part = Part::new(name, kind, xml);
    part.paragraphs = builder.paragraphs;
    part.blocks = builder.blocks;

    log::debug!(
        "Parsed {}: {} paragraphs, {} sections",
        name,
        part.paragraphs.len(),
        builder.sections.len()
    );

    Ok((part, builder.sections))
}

struct PartBuilder<'n> {
    name: &'n str,
    stack: Vec<Frame>,
    paragraphs: Vec<Paragraph>,
    blocks: Vec<Block>,
    cells: Vec<Vec<Block>>,
    tables: Vec<Table>,
    sections: Vec<Section>,
    open_runs: usize,
    fallbacks: usize,
    seen_root: bool,
}

impl<'n> PartBuilder<'n> {
    fn new(name: &'n str) -> Self {
        Self {
            name,
            stack: Vec::new(),
            paragraphs: Vec::new(),
            blocks: Vec::new(),
            cells: Vec::new(),
            tables: Vec::new(),
            sections: Vec::new(),
            open_runs: 0,
            fallbacks: 0,
            seen_root: false,
        }
    }

    fn error(&self, detail: impl std::fmt::Display) -> Error {
        Error::malformed(self.name, detail)
    }

    fn read(&mut self, xml: &str, kind: PartKind) -> Result<()> {
        let mut reader = NsReader::from_str(xml);

        loop {
            let start = reader.buffer_position() as usize;
            let (markup, event) = match reader.read_resolved_event() {
                Ok((ns, event)) => (classify(&ns), event),
                Err(err) => {
                    return Err(self.error(format!("at byte {}: {}", start, err)));
                }
            };
            let end = reader.buffer_position() as usize;

            match event {
                Event::Start(e) => {
                    if !self.seen_root {
                        self.check_root(markup, &e, kind)?;
                    }
                    let frame = self.open(markup, &e, start..end, false)?;
                    self.stack.push(frame);
                }
                Event::Empty(e) => {
                    if !self.seen_root {
                        self.check_root(markup, &e, kind)?;
                    }
                    self.open(markup, &e, start..end, true)?;
                }
                Event::End(_) => {
                    let frame = self
                        .stack
                        .pop()
                        .ok_or_else(|| self.error("unexpected closing tag"))?;
                    self.close(frame, xml, start, end);
                }
                Event::Text(e) => {
                    if let Some(Frame::Leaf { paragraph, fragment }) = self.stack.last().copied() {
                        let text = e.unescape().map_err(|err| self.error(err))?;
                        self.append_text(paragraph, fragment, &text);
                    }
                }
                Event::CData(e) => {
                    if let Some(Frame::Leaf { paragraph, fragment }) = self.stack.last().copied() {
                        let text = std::str::from_utf8(&e).map_err(|err| self.error(err))?;
                        self.append_text(paragraph, fragment, text);
                    }
                }
                Event::Eof => break,
                _ => {}
            }
        }

        if !self.seen_root {
            return Err(self.error("part has no root element"));
        }
        if !self.stack.is_empty() {
            return Err(self.error("unexpected end of part"));
        }
        Ok(())
    }

    fn check_root(&mut self, markup: Markup, e: &BytesStart, kind: PartKind) -> Result<()> {
        if markup != Markup::WordMl || e.local_name().as_ref() != root_name(kind) {
            return Err(self.error(format!(
                "unexpected root element <{}>",
                String::from_utf8_lossy(e.name().as_ref())
            )));
        }
        self.seen_root = true;
        Ok(())
    }

    /// Nearest enclosing frame that is not opaque markup.
    fn structural_parent(&self) -> Option<Frame> {
        self.stack
            .iter()
            .rev()
            .find(|f| !matches!(f, Frame::Other | Frame::Fallback))
            .copied()
    }

    fn sink(&mut self) -> &mut Vec<Block> {
        match self.cells.last_mut() {
            Some(cell) => cell,
            None => &mut self.blocks,
        }
    }

    /// Handle an opening (or self-closing) tag and return the frame to push.
    fn open(
        &mut self,
        markup: Markup,
        e: &BytesStart,
        span: std::ops::Range<usize>,
        empty: bool,
    ) -> Result<Frame> {
        // Fallback content duplicates its Choice; only the Choice is read.
        if self.fallbacks > 0 {
            return Ok(Frame::Other);
        }
        match markup {
            Markup::WordMl => {}
            Markup::Compatibility if !empty && e.local_name().as_ref() == b"Fallback" => {
                self.fallbacks += 1;
                return Ok(Frame::Fallback);
            }
            Markup::Compatibility | Markup::Foreign => return Ok(Frame::Other),
        }

        let parent = self.structural_parent();
        let top = self.stack.last().copied();

        let frame = match e.local_name().as_ref() {
            b"p" => self.open_paragraph(e, parent, &span, empty),
            b"tbl" if self.open_runs == 0 => {
                if empty {
                    self.sink().push(Block::Table(Table::new()));
                    Frame::Other
                } else {
                    self.tables.push(Table::new());
                    Frame::Table
                }
            }
            b"tr" if matches!(parent, Some(Frame::Table)) => {
                if let Some(table) = self.tables.last_mut() {
                    table.add_row(TableRow::default());
                }
                Frame::Row
            }
            b"tc" if matches!(parent, Some(Frame::Row)) => {
                if empty {
                    self.push_cell(Vec::new());
                    Frame::Other
                } else {
                    self.cells.push(Vec::new());
                    Frame::Cell
                }
            }
            b"r" => match parent {
                Some(Frame::Paragraph(paragraph)) if !empty => {
                    let runs = &mut self.paragraphs[paragraph].runs;
                    runs.push(RunStyle::default());
                    self.open_runs += 1;
                    Frame::Run {
                        paragraph,
                        run: runs.len() - 1,
                    }
                }
                _ => Frame::Other,
            },
            b"rPr" => match top {
                Some(Frame::Run { paragraph, run }) if !empty => Frame::RunProperties {
                    paragraph,
                    run,
                    start: span.start,
                },
                _ => Frame::Other,
            },
            b"t" | b"tab" | b"br" | b"cr" => match top {
                Some(Frame::Run { paragraph, run }) => {
                    match self.leaf_kind(e)? {
                        Some(kind) => {
                            let text = match kind {
                                FragmentKind::Text => String::new(),
                                FragmentKind::Tab => "\t".to_string(),
                                FragmentKind::Break => "\n".to_string(),
                            };
                            let fragments = &mut self.paragraphs[paragraph].fragments;
                            fragments.push(Fragment::new(kind, run, text, span));
                            Frame::Leaf {
                                paragraph,
                                fragment: fragments.len() - 1,
                            }
                        }
                        None => Frame::Other,
                    }
                }
                _ => Frame::Other,
            },
            b"sectPr" => {
                if self
                    .stack
                    .iter()
                    .any(|f| matches!(f, Frame::SectionProperties))
                {
                    // Revision history (`w:sectPrChange`) carries an old sectPr.
                    Frame::Other
                } else {
                    self.sections.push(Section::new());
                    Frame::SectionProperties
                }
            }
            b"headerReference" | b"footerReference"
                if matches!(top, Some(Frame::SectionProperties)) =>
            {
                self.add_reference(e)?;
                Frame::Other
            }
            _ => Frame::Other,
        };

        Ok(frame)
    }

    fn open_paragraph(
        &mut self,
        e: &BytesStart,
        parent: Option<Frame>,
        span: &std::ops::Range<usize>,
        empty: bool,
    ) -> Frame {
        let prefix = e
            .name()
            .prefix()
            .map(|p| String::from_utf8_lossy(p.as_ref()).into_owned())
            .unwrap_or_default();
        let anchor = if empty {
            ParagraphAnchor::SelfClosing(span.end - 2..span.end)
        } else {
            ParagraphAnchor::Close(0)
        };

        let idx = self.paragraphs.len();
        self.paragraphs.push(Paragraph::new(prefix, anchor));

        // Text-box content lives inside a run of another paragraph.
        let nested = self.open_runs > 0
            || matches!(parent, Some(Frame::Paragraph(_)) | Some(Frame::Run { .. }));
        if !nested {
            self.sink().push(Block::Paragraph(idx));
        }

        if empty {
            Frame::Other
        } else {
            Frame::Paragraph(idx)
        }
    }

    /// Fragment kind for a run child, or `None` for page/column breaks.
    fn leaf_kind(&self, e: &BytesStart) -> Result<Option<FragmentKind>> {
        let kind = match e.local_name().as_ref() {
            b"t" => FragmentKind::Text,
            b"tab" => FragmentKind::Tab,
            b"cr" => FragmentKind::Break,
            _ => match self.attribute(e, b"type")?.as_deref() {
                None | Some("textWrapping") => FragmentKind::Break,
                Some(_) => return Ok(None),
            },
        };
        Ok(Some(kind))
    }

    fn attribute(&self, e: &BytesStart, local: &[u8]) -> Result<Option<String>> {
        for attr in e.attributes() {
            let attr = attr.map_err(|err| self.error(err))?;
            if attr.key.local_name().as_ref() == local {
                let value = attr.unescape_value().map_err(|err| self.error(err))?;
                return Ok(Some(value.into_owned()));
            }
        }
        Ok(None)
    }

    fn add_reference(&mut self, e: &BytesStart) -> Result<()> {
        let kind = if e.local_name().as_ref() == b"headerReference" {
            HeaderFooterKind::Header
        } else {
            HeaderFooterKind::Footer
        };
        let variant_attr = self.attribute(e, b"type")?;
        let Some(variant) = HeaderFooterType::from_attr(variant_attr.as_deref()) else {
            log::debug!(
                "{}: ignoring {:?} reference with type {:?}",
                self.name,
                kind,
                variant_attr
            );
            return Ok(());
        };
        let rel_id = self
            .attribute(e, b"id")?
            .ok_or_else(|| self.error("header/footer reference without r:id"))?;

        if let Some(section) = self.sections.last_mut() {
            section.references.push(PartReference {
                kind,
                variant,
                rel_id,
                part: None,
            });
        }
        Ok(())
    }

    fn append_text(&mut self, paragraph: usize, fragment: usize, text: &str) {
        let fragment = &mut self.paragraphs[paragraph].fragments[fragment];
        if fragment.kind == FragmentKind::Text {
            fragment.text.push_str(text);
            fragment.original.push_str(text);
        }
    }

    fn push_cell(&mut self, blocks: Vec<Block>) {
        if let Some(row) = self.tables.last_mut().and_then(|t| t.rows.last_mut()) {
            row.cells.push(TableCell::with_blocks(blocks));
        }
    }

    /// Handle a closing tag. `start` is the offset of the tag, `end` the
    /// offset just past it.
    fn close(&mut self, frame: Frame, xml: &str, start: usize, end: usize) {
        match frame {
            Frame::Paragraph(idx) => {
                self.paragraphs[idx].anchor = ParagraphAnchor::Close(start);
            }
            Frame::Run { .. } => {
                self.open_runs -= 1;
            }
            Frame::RunProperties {
                paragraph,
                run,
                start: open,
            } => {
                self.paragraphs[paragraph].runs[run].properties = Some(xml[open..end].to_string());
            }
            Frame::Leaf {
                paragraph,
                fragment,
            } => {
                self.paragraphs[paragraph].fragments[fragment].span.end = end;
            }
            Frame::Cell => {
                let blocks = self.cells.pop().unwrap_or_default();
                self.push_cell(blocks);
            }
            Frame::Table => {
                if let Some(table) = self.tables.pop() {
                    self.sink().push(Block::Table(table));
                }
            }
            Frame::Fallback => {
                self.fallbacks -= 1;
            }
            Frame::Row | Frame::SectionProperties | Frame::Other => {}
        }
    }
}
