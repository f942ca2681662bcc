//! Placeholder discovery and substitution over a document.
//!
//! The engine works on the flattened text of each region (paragraph) in the
//! document's fixed region order. Tokens are `{{name}}`; a token never spans
//! two regions, but may span any number of runs inside one.

pub mod fields;
pub mod observer;
pub mod options;
pub mod placeholder;
pub mod result;

use std::collections::BTreeSet;

pub use fields::{value_to_text, FieldMap};
pub use observer::{
    BodyOnlyObserver, CompositeObserver, FillAction, FillObserver, LoggingObserver,
    NoopObserver, RecordingObserver, ReplacementRecord,
};
pub use options::{FillOptions, RewritePolicy};
pub use placeholder::{discover, substitute, tokens, Substitution, Token, TOKEN_PATTERN};
pub use result::{FieldStatus, FillStats, Generated, Preview};

use crate::model::{Document, EditOutcome};

/// Collect the distinct field names of a document, sorted.
pub fn discover_fields(document: &Document) -> Vec<String> {
    let mut names = BTreeSet::new();
    for region in document.regions() {
        if let Some(text) = document.region_text(region.id) {
            names.extend(discover(&text));
        }
    }
    names.into_iter().collect()
}

/// Compare the document's fields with supplied data.
pub fn preview_fields(document: &Document, fields: &FieldMap) -> Preview {
    let names = discover_fields(document);

    let unknown_keys = fields
        .keys()
        .filter(|k| names.binary_search_by(|n| n.as_str().cmp(k)).is_err())
        .map(str::to_string)
        .collect();

    let fields = names
        .into_iter()
        .map(|name| FieldStatus {
            value: fields.get(&name).map(str::to_string),
            name,
        })
        .collect();

    Preview {
        fields,
        unknown_keys,
    }
}

/// Substitute fields into every region of a document.
pub fn substitute_document(
    document: &mut Document,
    fields: &FieldMap,
    options: &FillOptions,
) -> FillStats {
    substitute_document_with(document, fields, options, &mut LoggingObserver)
}

/// Substitute fields into every region of a document, reporting to an
/// observer.
pub fn substitute_document_with(
    document: &mut Document,
    fields: &FieldMap,
    options: &FillOptions,
    observer: &mut dyn FillObserver,
) -> FillStats {
    let mut stats = FillStats::new();
    let regions = document.regions().to_vec();

    for region in &regions {
        let Some(paragraph) = document.paragraph_mut(region.id) else {
            continue;
        };
        let text = paragraph.text();
        if observer.visit_region(region, &text).should_skip() {
            continue;
        }
        stats.regions_scanned += 1;

        let substitution = substitute(&text, fields);
        if substitution.is_empty() {
            continue;
        }

        for (name, edit) in substitution.names.iter().zip(&substitution.edits) {
            observer.on_replacement(region, name, &edit.replacement);
            stats.add_field(name);
        }
        stats.replacements += substitution.count;

        let outcome = match options.policy {
            RewritePolicy::PreserveRuns => paragraph.apply_edits(&substitution.edits),
            RewritePolicy::Collapse => {
                if paragraph.set_text(&substitution.text) {
                    EditOutcome::Collapsed
                } else {
                    EditOutcome::Unchanged
                }
            }
        };

        match outcome {
            EditOutcome::Unchanged => {}
            EditOutcome::Preserved => stats.regions_rewritten += 1,
            EditOutcome::Collapsed => {
                stats.regions_rewritten += 1;
                stats.regions_collapsed += 1;
            }
        }
        observer.on_region_rewritten(region, substitution.count, outcome);
    }

    stats
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::DocxParser;
    use std::io::{Cursor, Write};
    use zip::write::SimpleFileOptions;

    const W: &str = r#"xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main""#;

    fn document(body: &str) -> Document {
        let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
        writer
            .start_file("word/document.xml", SimpleFileOptions::default())
            .unwrap();
        write!(writer, "<w:document {}><w:body>{}</w:body></w:document>", W, body).unwrap();
        let data = writer.finish().unwrap().into_inner();
        DocxParser::from_bytes(&data).unwrap().parse().unwrap()
    }

    fn run(text: &str) -> String {
        format!("<w:r><w:t>{}</w:t></w:r>", text)
    }

    fn bold_run(text: &str) -> String {
        format!("<w:r><w:rPr><w:b/></w:rPr><w:t>{}</w:t></w:r>", text)
    }

    fn fragment_texts(doc: &Document) -> Vec<String> {
        doc.parts[0].paragraphs[0]
            .fragments
            .iter()
            .map(|f| f.text().to_string())
            .collect()
    }

    #[test]
    fn test_discover_fields_sorted_union() {
        let doc = document(&format!(
            "<w:p>{}{}</w:p><w:p>{}</w:p>",
            run("{{zip"),
            run("}} {{ city }}"),
            run("{{zip}}")
        ));
        assert_eq!(discover_fields(&doc), vec!["city", "zip"]);
    }

    #[test]
    fn test_preview_fields() {
        let doc = document(&format!("<w:p>{}</w:p>", run("{{a}} {{b}}")));
        let fields = FieldMap::new().with("a", "1").with("extra", "x");
        let preview = preview_fields(&doc, &fields);
        assert_eq!(preview.matched_count(), 1);
        assert_eq!(preview.fields[1].name, "b");
        assert_eq!(preview.fields[1].value, None);
        assert_eq!(preview.unknown_keys, vec!["extra"]);
    }

    #[test]
    fn test_substitute_preserves_runs() {
        let mut doc = document(&format!(
            "<w:p>{}{}{}</w:p>",
            bold_run("Dear "),
            run("{{na"),
            run("me}}, welcome")
        ));
        let fields = FieldMap::new().with("name", "Ada");
        let stats = substitute_document(&mut doc, &fields, &FillOptions::default());

        assert_eq!(stats.replacements, 1);
        assert_eq!(stats.regions_rewritten, 1);
        assert_eq!(stats.regions_collapsed, 0);
        assert_eq!(fragment_texts(&doc), vec!["Dear ", "Ada", ", welcome"]);
    }

    #[test]
    fn test_substitute_ambiguous_formatting_collapses() {
        let mut doc = document(&format!(
            "<w:p>{}{}</w:p>",
            run("Hi {{na"),
            bold_run("me}}!")
        ));
        let fields = FieldMap::new().with("name", "Ada");
        let stats = substitute_document(&mut doc, &fields, &FillOptions::default());

        assert_eq!(stats.regions_collapsed, 1);
        assert_eq!(fragment_texts(&doc), vec!["Hi Ada!", ""]);
    }

    #[test]
    fn test_substitute_collapse_policy() {
        let mut doc = document(&format!("<w:p>{}{}</w:p>", bold_run("A "), run("{{x}}")));
        let fields = FieldMap::new().with("x", "1");
        let stats = substitute_document(&mut doc, &fields, &FillOptions::new().collapse());

        assert_eq!(stats.replacements, 1);
        assert_eq!(fragment_texts(&doc), vec!["A 1", ""]);
    }

    #[test]
    fn test_substitute_counts_and_unknown_tokens() {
        let mut doc = document(&format!(
            "<w:p>{}</w:p><w:p>{}</w:p>",
            run("{{a}} {{a}} {{missing}}"),
            run("none here")
        ));
        let fields = FieldMap::new().with("a", "1");
        let stats = substitute_document(&mut doc, &fields, &FillOptions::default());

        assert_eq!(stats.replacements, 2);
        assert_eq!(stats.regions_scanned, 2);
        assert_eq!(stats.replaced_fields, vec!["a"]);
        assert_eq!(doc.plain_text(), "1 1 {{missing}}\nnone here");
    }

    #[test]
    fn test_observer_skip_and_record() {
        let mut doc = document(&format!("<w:p>{}</w:p>", run("{{a}}")));
        let fields = FieldMap::new().with("a", "1");
        let mut recorder = RecordingObserver::new();
        let stats =
            substitute_document_with(&mut doc, &fields, &FillOptions::default(), &mut recorder);
        assert_eq!(stats.replacements, 1);
        assert_eq!(recorder.replacements[0].value, "1");

        struct SkipAll;
        impl FillObserver for SkipAll {
            fn visit_region(&mut self, _: &crate::model::Region, _: &str) -> FillAction {
                FillAction::Skip
            }
        }
        let mut doc = document(&format!("<w:p>{}</w:p>", run("{{a}}")));
        let stats = substitute_document_with(&mut doc, &fields, &FillOptions::default(), &mut SkipAll);
        assert_eq!(stats.replacements, 0);
        assert!(!doc.is_modified());
    }
}
