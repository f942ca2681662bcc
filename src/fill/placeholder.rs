//! Placeholder token grammar, discovery and substitution on plain text.

use std::collections::BTreeSet;
use std::ops::Range;
use std::sync::OnceLock;

use regex::Regex;

use super::fields::FieldMap;
use crate::model::TextEdit;

/// Token grammar: `{{`, any characters except braces, `}}`.
pub const TOKEN_PATTERN: &str = r"\{\{([^{}]*)\}\}";

fn token_regex() -> &'static Regex {
    static TOKEN: OnceLock<Regex> = OnceLock::new();
    TOKEN.get_or_init(|| Regex::new(TOKEN_PATTERN).expect("token pattern is valid"))
}

/// A placeholder occurrence in a text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// Byte range of the whole token, delimiters included
    pub range: Range<usize>,
    /// Field name (inner text, trimmed)
    pub name: String,
}

/// Find all non-overlapping tokens in `text`, left to right.
pub fn tokens(text: &str) -> impl Iterator<Item = Token> + '_ {
    token_regex().captures_iter(text).filter_map(|caps| {
        let whole = caps.get(0)?;
        let inner = caps.get(1)?;
        Some(Token {
            range: whole.range(),
            name: inner.as_str().trim().to_string(),
        })
    })
}

/// Collect the distinct field names referenced by `text`.
pub fn discover(text: &str) -> BTreeSet<String> {
    tokens(text).map(|t| t.name).collect()
}

/// Result of substituting fields into one text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Substitution {
    /// Text after substitution
    pub text: String,
    /// Number of tokens replaced
    pub count: usize,
    /// Edits against the original text, in order
    pub edits: Vec<TextEdit>,
    /// Field name of each edit (parallel to `edits`)
    pub names: Vec<String>,
}

impl Substitution {
    /// Check whether any token was replaced.
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }
}

/// Replace every token whose name is a key of `fields` with its value.
///
/// Tokens with unknown names are left verbatim. Values are inserted as-is
/// and never scanned for further tokens.
pub fn substitute(text: &str, fields: &FieldMap) -> Substitution {
    let mut edits = Vec::new();
    let mut names = Vec::new();

    for token in tokens(text) {
        if let Some(value) = fields.get(&token.name) {
            edits.push(TextEdit::new(token.range, value));
            names.push(token.name);
        }
    }

    Substitution {
        text: TextEdit::apply_all(text, &edits),
        count: edits.len(),
        edits,
        names,
    }
}
