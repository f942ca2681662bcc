//! Integration tests for field discovery, preview and generation.

mod common;

use common::{entry_names, para, read_entry, read_xml, run, styled, table, DocxBuilder};
use docxfill::{
    generate, list_fields, parse_bytes, preview, Docxfill, Error, FieldMap, RegionKind,
    RewritePolicy,
};

fn fields(pairs: &[(&str, &str)]) -> FieldMap {
    pairs.iter().map(|(k, v)| (*k, *v)).collect()
}

// ==================== Discovery ====================

#[test]
fn test_list_fields_all_regions() {
    let docx = DocxBuilder::new()
        .text("Dear {{ client }},")
        .body(table(&[&[para(&[run("{{item}}")]), para(&[run("{{price}}")])]]))
        .header("default", "{{company}}")
        .footer("default", "Page of {{company}}")
        .build();

    assert_eq!(
        list_fields(&docx).unwrap(),
        vec!["client", "company", "item", "price"]
    );
}

#[test]
fn test_list_fields_split_runs() {
    let docx = DocxBuilder::new()
        .body(para(&[
            run("Total: {"),
            styled("<w:b/>", "{amo"),
            styled("<w:b/>", "unt}"),
            run("} EUR"),
        ]))
        .build();

    assert_eq!(list_fields(&docx).unwrap(), vec!["amount"]);
}

#[test]
fn test_list_fields_empty_document() {
    let docx = DocxBuilder::new().text("no fields here").build();
    assert!(list_fields(&docx).unwrap().is_empty());
}

#[test]
fn test_list_fields_malformed_tokens() {
    let docx = DocxBuilder::new()
        .text("{{unterminated")
        .text("{{a{{b}}")
        .text("{{}}")
        .build();
    assert_eq!(list_fields(&docx).unwrap(), vec!["", "b"]);
}

#[test]
fn test_region_order() {
    let docx = DocxBuilder::new()
        .text("body 1")
        .body(table(&[&[para(&[run("cell")])]]))
        .text("body 2")
        .footer("default", "footer")
        .header("first", "first header")
        .build();

    let doc = parse_bytes(&docx).unwrap();
    let kinds: Vec<RegionKind> = doc.regions().iter().map(|r| r.kind).collect();
    let texts: Vec<String> = doc
        .regions()
        .iter()
        .map(|r| doc.region_text(r.id).unwrap())
        .collect();

    assert_eq!(texts, vec!["body 1", "body 2", "cell", "first header", "footer"]);
    assert!(matches!(kinds[2], RegionKind::TableCell));
    assert!(matches!(kinds[3], RegionKind::Header(_)));
    assert!(matches!(kinds[4], RegionKind::Footer(_)));
}

// ==================== Preview ====================

#[test]
fn test_preview_report() {
    let docx = DocxBuilder::new().text("{{name}} {{date}}").build();
    let report = preview(&docx, &fields(&[("name", "Ada"), ("unused", "x")])).unwrap();

    assert_eq!(report.total_fields(), 2);
    assert_eq!(report.matched_count(), 1);
    assert_eq!(report.fields[0].name, "date");
    assert!(report.fields[0].value.is_none());
    assert_eq!(report.fields[1].value.as_deref(), Some("Ada"));
    assert_eq!(report.unknown_keys, vec!["unused"]);
}

// ==================== Generation ====================

#[test]
fn test_generate_everywhere() {
    let docx = DocxBuilder::new()
        .text("Dear {{client}},")
        .body(table(&[&[para(&[run("{{item}}")]), para(&[run("{{price}}")])]]))
        .header("default", "{{company}} confidential")
        .footer("even", "{{company}}")
        .build();

    let data = fields(&[
        ("client", "Ada"),
        ("item", "Engine"),
        ("price", "42"),
        ("company", "ACME"),
    ]);
    let generated = generate(&docx, &data).unwrap();

    assert_eq!(generated.replacements, 5);
    assert_eq!(
        generated.replaced_fields,
        vec!["client", "company", "item", "price"]
    );
    assert!(list_fields(&generated.bytes).unwrap().is_empty());

    let doc = parse_bytes(&generated.bytes).unwrap();
    assert_eq!(
        doc.plain_text(),
        "Dear Ada,\nEngine\n42\nACME confidential\nACME"
    );
}

#[test]
fn test_generate_keeps_unrelated_runs() {
    let docx = DocxBuilder::new()
        .body(para(&[
            styled("<w:b/>", "Invoice "),
            run("{{num"),
            run("ber}}"),
            styled("<w:i/>", " (draft)"),
        ]))
        .build();

    let generated = generate(&docx, &fields(&[("number", "INV-7")])).unwrap();
    let xml = read_xml(&generated.bytes, "word/document.xml");

    assert!(xml.contains(r#"<w:r><w:rPr><w:b/></w:rPr><w:t xml:space="preserve">Invoice </w:t></w:r>"#));
    assert!(xml.contains(r#"<w:r><w:rPr><w:i/></w:rPr><w:t xml:space="preserve"> (draft)</w:t></w:r>"#));
    assert!(xml.contains(">INV-7<"));
    assert_eq!(
        parse_bytes(&generated.bytes).unwrap().plain_text(),
        "Invoice INV-7 (draft)"
    );
}

#[test]
fn test_generate_ambiguous_formatting_collapses() {
    let docx = DocxBuilder::new()
        .body(para(&[run("Hi {{na"), styled("<w:b/>", "me}}!")]))
        .build();

    let generated = generate(&docx, &fields(&[("name", "Ada")])).unwrap();
    assert_eq!(generated.stats.regions_collapsed, 1);
    assert_eq!(
        parse_bytes(&generated.bytes).unwrap().plain_text(),
        "Hi Ada!"
    );
}

#[test]
fn test_generate_collapse_policy() {
    let docx = DocxBuilder::new()
        .body(para(&[styled("<w:b/>", "Name: "), run("{{name}}")]))
        .build();

    let template = Docxfill::new()
        .with_policy(RewritePolicy::Collapse)
        .load_bytes(&docx)
        .unwrap();
    let generated = template.generate(&fields(&[("name", "Ada")])).unwrap();

    let xml = read_xml(&generated.bytes, "word/document.xml");
    assert!(xml.contains(r#"<w:rPr><w:b/></w:rPr><w:t xml:space="preserve">Name: Ada</w:t>"#));
}

#[test]
fn test_generate_unknown_tokens_left_verbatim() {
    let docx = DocxBuilder::new().text("{{known}} and {{unknown}}").build();
    let generated = generate(&docx, &fields(&[("known", "yes")])).unwrap();

    assert_eq!(generated.replacements, 1);
    assert_eq!(list_fields(&generated.bytes).unwrap(), vec!["unknown"]);
}

#[test]
fn test_generate_special_characters() {
    let docx = DocxBuilder::new().text("[{{value}}]").build();
    let generated = generate(
        &docx,
        &fields(&[("value", "a < b & \"c\"\tnext\nline")]),
    )
    .unwrap();

    let xml = read_xml(&generated.bytes, "word/document.xml");
    assert!(xml.contains("a &lt; b &amp;"));
    assert!(xml.contains("<w:tab/>"));
    assert!(xml.contains("<w:br/>"));

    let doc = parse_bytes(&generated.bytes).unwrap();
    assert_eq!(doc.plain_text(), "[a < b & \"c\"\tnext\nline]");
}

#[test]
fn test_generate_values_are_not_rescanned() {
    let docx = DocxBuilder::new().text("{{a}}").build();
    let generated = generate(&docx, &fields(&[("a", "{{b}}"), ("b", "x")])).unwrap();
    assert_eq!(generated.replacements, 1);
    assert_eq!(list_fields(&generated.bytes).unwrap(), vec!["b"]);
}

#[test]
fn test_generate_rejects_unencodable_value() {
    let docx = DocxBuilder::new().text("{{a}}").build();
    let result = generate(&docx, &fields(&[("a", "nul\u{0}")]));
    assert!(matches!(result, Err(Error::Serialization(_))));
}

#[test]
fn test_generate_without_replacements_is_identity() {
    let docx = DocxBuilder::new().text("{{a}}").build();
    let generated = generate(&docx, &fields(&[("other", "x")])).unwrap();
    assert_eq!(generated.replacements, 0);
    assert_eq!(generated.bytes, docx);
}

#[test]
fn test_generate_copies_untouched_entries() {
    let image = [0x89u8, b'P', b'N', b'G', 0, 1, 2, 3];
    let docx = DocxBuilder::new()
        .text("{{a}}")
        .header("default", "static header")
        .entry("word/media/image1.png", &image)
        .build();

    let generated = generate(&docx, &fields(&[("a", "1")])).unwrap();

    assert_eq!(entry_names(&generated.bytes), entry_names(&docx));
    for name in ["word/media/image1.png", "word/styles.xml", "word/header1.xml"] {
        assert_eq!(read_entry(&generated.bytes, name), read_entry(&docx, name), "{}", name);
    }
}

#[test]
fn test_shared_header_processed_once() {
    let docx = DocxBuilder::new()
        .text("first section")
        .header("default", "{{title}}")
        .section_break()
        .text("second section")
        .reuse(0, "default")
        .build();

    let doc = parse_bytes(&docx).unwrap();
    let header_regions = doc
        .regions()
        .iter()
        .filter(|r| matches!(r.kind, RegionKind::Header(_)))
        .count();
    assert_eq!(header_regions, 1);

    let generated = generate(&docx, &fields(&[("title", "Report")])).unwrap();
    assert_eq!(generated.replacements, 1);
    assert!(read_xml(&generated.bytes, "word/header1.xml").contains(">Report<"));
}

#[test]
fn test_alternate_content_counted_once() {
    let docx = DocxBuilder::new()
        .body(concat!(
            r#"<w:p xmlns:mc="http://schemas.openxmlformats.org/markup-compatibility/2006">"#,
            "<mc:AlternateContent>",
            r#"<mc:Choice Requires="w14"><w:r><w:t>{{x}}</w:t></w:r></mc:Choice>"#,
            "<mc:Fallback><w:r><w:t>{{x}}</w:t></w:r></mc:Fallback>",
            "</mc:AlternateContent></w:p>",
        ))
        .build();

    assert_eq!(list_fields(&docx).unwrap(), vec!["x"]);
    let generated = generate(&docx, &fields(&[("x", "done")])).unwrap();
    assert_eq!(generated.replacements, 1);
    assert_eq!(parse_bytes(&generated.bytes).unwrap().plain_text(), "done");
}

#[test]
fn test_generate_empty_paragraph_value_append() {
    let docx = DocxBuilder::new()
        .body(para(&[run("{{x}}")]))
        .build();
    let generated = generate(&docx, &fields(&[("x", "")])).unwrap();
    assert_eq!(generated.replacements, 1);
    assert_eq!(parse_bytes(&generated.bytes).unwrap().plain_text(), "");
}

// ==================== Errors and modes ====================

#[test]
fn test_not_a_docx() {
    for input in [&b""[..], b"plain text", b"PK\x03\x04broken"] {
        assert!(matches!(
            list_fields(input),
            Err(Error::MalformedDocument(_))
        ));
    }
}

#[test]
fn test_lenient_mode_skips_broken_header() {
    let docx = DocxBuilder::new()
        .text("{{body}}")
        .header("default", "{{head}}")
        .build();
    // Break the header part by dropping its closing tag.
    let broken = rewrite_entry(&docx, "word/header1.xml", |xml| xml.replace("</w:hdr>", ""));

    assert!(matches!(
        list_fields(&broken),
        Err(Error::MalformedDocument(_))
    ));

    let template = Docxfill::new().lenient().load_bytes(&broken).unwrap();
    assert_eq!(template.fields(), &["body"]);
}

fn rewrite_entry(docx: &[u8], target: &str, f: impl Fn(String) -> String) -> Vec<u8> {
    use std::io::{Cursor, Write};
    use zip::write::SimpleFileOptions;

    let mut archive = zip::ZipArchive::new(Cursor::new(docx)).unwrap();
    let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
    for i in 0..archive.len() {
        let name = archive.by_index(i).unwrap().name().to_string();
        let mut data = read_entry(docx, &name);
        if name == target {
            data = f(String::from_utf8(data).unwrap()).into_bytes();
        }
        writer.start_file(name, SimpleFileOptions::default()).unwrap();
        writer.write_all(&data).unwrap();
    }
    writer.finish().unwrap().into_inner()
}

// ==================== Batch ====================

#[test]
fn test_generate_batch() {
    let docx = DocxBuilder::new().text("Hello {{name}}").build();
    let template = Docxfill::new().load_bytes(&docx).unwrap();

    let records: Vec<FieldMap> = ["Ada", "Grace", "Barbara"]
        .iter()
        .map(|n| fields(&[("name", *n)]))
        .collect();
    let results = template.generate_batch(&records);

    let texts: Vec<String> = results
        .into_iter()
        .map(|r| parse_bytes(&r.unwrap().bytes).unwrap().plain_text())
        .collect();
    assert_eq!(texts, vec!["Hello Ada", "Hello Grace", "Hello Barbara"]);
}
