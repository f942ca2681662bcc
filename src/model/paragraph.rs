//! Paragraph and fragment-level types.

use std::collections::BTreeSet;
use std::ops::Range;

/// A paragraph of a DOCX part: the unit placeholders are matched against.
///
/// The paragraph's flattened text is the concatenation of its fragments in
/// order. Fragments are the pieces of text living in runs (`w:r`); every
/// fragment remembers which run it belongs to so formatting decisions can
/// be made per run.
#[derive(Debug, Clone, Default)]
pub struct Paragraph {
    /// Text-bearing fragments in document order
    pub fragments: Vec<Fragment>,

    /// Runs of the paragraph, indexed by `Fragment::run`
    pub runs: Vec<RunStyle>,

    /// Where new content can be inserted into the paragraph element
    pub(crate) anchor: ParagraphAnchor,

    /// Namespace prefix of the paragraph element (usually `w`)
    pub(crate) prefix: String,

    /// Text for a run appended to a paragraph that had no text fragment
    pub(crate) appended: Option<String>,
}

impl Paragraph {
    /// Create an empty paragraph using the given namespace prefix.
    pub(crate) fn new(prefix: impl Into<String>, anchor: ParagraphAnchor) -> Self {
        Self {
            fragments: Vec::new(),
            runs: Vec::new(),
            anchor,
            prefix: prefix.into(),
            appended: None,
        }
    }

    /// Get the flattened text of the paragraph.
    pub fn text(&self) -> String {
        let mut text: String = self.fragments.iter().map(|f| f.text.as_str()).collect();
        if let Some(ref appended) = self.appended {
            text.push_str(appended);
        }
        text
    }

    /// Check whether any fragment differs from what was parsed.
    pub fn is_modified(&self) -> bool {
        self.appended.is_some() || self.fragments.iter().any(Fragment::is_modified)
    }

    /// Replace the whole paragraph text.
    ///
    /// The new text moves into the first `Text` fragment and every other
    /// fragment is emptied. Returns `false` when the text is unchanged.
    pub fn set_text(&mut self, text: &str) -> bool {
        if self.text() == text {
            return false;
        }

        let host = self
            .fragments
            .iter()
            .position(|f| f.kind == FragmentKind::Text);

        for (i, fragment) in self.fragments.iter_mut().enumerate() {
            fragment.text = if Some(i) == host {
                text.to_string()
            } else {
                String::new()
            };
        }

        self.appended = match host {
            Some(_) => None,
            None if text.is_empty() => None,
            None => Some(text.to_string()),
        };
        true
    }

    /// Apply byte-range edits made against [`Paragraph::text`] while keeping
    /// the run boundaries of untouched text.
    ///
    /// Each replacement is written into the fragment holding the first byte
    /// of the edited range; the remainder of the range is removed from the
    /// fragments that follow. When an edited range covers text from runs
    /// with different formatting the paragraph is collapsed instead.
    pub fn apply_edits(&mut self, edits: &[TextEdit]) -> EditOutcome {
        if edits.is_empty() {
            return EditOutcome::Unchanged;
        }

        let original = self.text();
        if self.appended.is_some() || self.is_ambiguous(edits) {
            let collapsed = TextEdit::apply_all(&original, edits);
            return if self.set_text(&collapsed) {
                EditOutcome::Collapsed
            } else {
                EditOutcome::Unchanged
            };
        }

        let bounds = self.fragment_bounds();
        let mut changed = false;
        for (fragment, range) in self.fragments.iter_mut().zip(bounds) {
            let mut out = String::new();
            let mut cursor = range.start;

            for edit in edits {
                let starts_here = edit.range.start >= range.start && edit.range.start < range.end;
                let covers_start = edit.range.start < range.start && edit.range.end > range.start;
                if starts_here {
                    out.push_str(&original[cursor..edit.range.start]);
                    out.push_str(&edit.replacement);
                } else if !covers_start {
                    continue;
                }
                cursor = cursor.max(edit.range.end.min(range.end));
            }
            out.push_str(&original[cursor..range.end]);

            if out != fragment.text {
                fragment.text = out;
                changed = true;
            }
        }

        if changed {
            EditOutcome::Preserved
        } else {
            EditOutcome::Unchanged
        }
    }

    /// Byte range each fragment occupies in the flattened text.
    fn fragment_bounds(&self) -> Vec<Range<usize>> {
        let mut offset = 0;
        self.fragments
            .iter()
            .map(|f| {
                let range = offset..offset + f.text.len();
                offset = range.end;
                range
            })
            .collect()
    }

    /// An edit is ambiguous when it spans text fragments of runs whose
    /// properties differ.
    fn is_ambiguous(&self, edits: &[TextEdit]) -> bool {
        let bounds = self.fragment_bounds();
        edits.iter().any(|edit| {
            let styles: BTreeSet<Option<&str>> = self
                .fragments
                .iter()
                .zip(&bounds)
                .filter(|(f, r)| {
                    f.kind == FragmentKind::Text
                        && r.start < r.end
                        && r.start < edit.range.end
                        && edit.range.start < r.end
                })
                .map(|(f, _)| {
                    self.runs
                        .get(f.run)
                        .and_then(|run| run.properties.as_deref())
                })
                .collect();
            styles.len() > 1
        })
    }
}

/// How a paragraph was rewritten by [`Paragraph::apply_edits`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditOutcome {
    /// Nothing changed
    Unchanged,
    /// Edits were mapped onto the existing fragments
    Preserved,
    /// The paragraph was collapsed into its first text fragment
    Collapsed,
}

/// A replacement of a byte range of a paragraph's flattened text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextEdit {
    /// Byte range in the original flattened text
    pub range: Range<usize>,
    /// Replacement text
    pub replacement: String,
}

impl TextEdit {
    /// Create a new edit.
    pub fn new(range: Range<usize>, replacement: impl Into<String>) -> Self {
        Self {
            range,
            replacement: replacement.into(),
        }
    }

    /// Apply sorted, non-overlapping edits to `text`.
    pub fn apply_all(text: &str, edits: &[TextEdit]) -> String {
        let mut out = String::with_capacity(text.len());
        let mut cursor = 0;
        for edit in edits {
            out.push_str(&text[cursor..edit.range.start]);
            out.push_str(&edit.replacement);
            cursor = edit.range.end;
        }
        out.push_str(&text[cursor..]);
        out
    }
}

/// A contiguous piece of paragraph text inside a single run.
#[derive(Debug, Clone)]
pub struct Fragment {
    /// What kind of run content this fragment came from
    pub kind: FragmentKind,

    /// Index of the owning run in `Paragraph::runs`
    pub run: usize,

    /// Current text
    pub(crate) text: String,

    /// Text as parsed
    pub(crate) original: String,

    /// Byte span of the element in the part XML
    pub(crate) span: Range<usize>,
}

impl Fragment {
    pub(crate) fn new(kind: FragmentKind, run: usize, text: String, span: Range<usize>) -> Self {
        Self {
            kind,
            run,
            original: text.clone(),
            text,
            span,
        }
    }

    /// Get the current text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Check whether the text differs from what was parsed.
    pub fn is_modified(&self) -> bool {
        self.text != self.original
    }
}

/// Source element of a fragment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FragmentKind {
    /// `w:t` text element
    Text,
    /// `w:tab` (reads as `\t`)
    Tab,
    /// Text-wrapping `w:br` or `w:cr` (reads as `\n`)
    Break,
}

/// Formatting carried by a run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunStyle {
    /// Raw `w:rPr` markup, if the run has properties
    pub properties: Option<String>,
}

/// Insertion point for content appended to a paragraph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum ParagraphAnchor {
    /// Byte offset of the closing `</w:p>` tag
    Close(usize),
    /// Byte span of the `/>` ending a self-closing `<w:p/>`
    SelfClosing(Range<usize>),
}

impl Default for ParagraphAnchor {
    fn default() -> Self {
        ParagraphAnchor::Close(0)
    }
}
