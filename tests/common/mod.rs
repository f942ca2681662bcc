//! In-memory DOCX fixtures for integration tests.

#![allow(dead_code)]

use std::io::{Cursor, Read, Write};

use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

pub const W_NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";
pub const R_NS: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";

/// Plain run.
pub fn run(text: &str) -> String {
    format!(r#"<w:r><w:t xml:space="preserve">{}</w:t></w:r>"#, text)
}

/// Run with properties, e.g. `styled("<w:b/>", "bold")`.
pub fn styled(props: &str, text: &str) -> String {
    format!(
        r#"<w:r><w:rPr>{}</w:rPr><w:t xml:space="preserve">{}</w:t></w:r>"#,
        props, text
    )
}

/// Paragraph made of the given runs.
pub fn para(runs: &[String]) -> String {
    format!("<w:p>{}</w:p>", runs.concat())
}

/// Single-cell-per-entry table; each row is a list of cell paragraphs.
pub fn table(rows: &[&[String]]) -> String {
    let rows: String = rows
        .iter()
        .map(|cells| {
            let cells: String = cells
                .iter()
                .map(|content| format!("<w:tc><w:tcPr/>{}</w:tc>", content))
                .collect();
            format!("<w:tr>{}</w:tr>", cells)
        })
        .collect();
    format!("<w:tbl><w:tblPr/>{}</w:tbl>", rows)
}

struct HeaderFooter {
    rel_id: String,
    file: String,
    kind: &'static str,
    body: String,
}

/// Builder for a small but complete DOCX package.
pub struct DocxBuilder {
    body: Vec<String>,
    parts: Vec<HeaderFooter>,
    section_refs: Vec<String>,
    extra: Vec<(String, Vec<u8>)>,
    next_rel: usize,
}

impl DocxBuilder {
    pub fn new() -> Self {
        Self {
            body: Vec::new(),
            parts: Vec::new(),
            section_refs: Vec::new(),
            extra: Vec::new(),
            next_rel: 10,
        }
    }

    /// Append raw body markup (paragraphs, tables).
    pub fn body(mut self, xml: impl Into<String>) -> Self {
        self.body.push(xml.into());
        self
    }

    /// Append a paragraph holding one plain run.
    pub fn text(self, text: &str) -> Self {
        self.body(para(&[run(text)]))
    }

    fn add_part(mut self, kind: &'static str, variant: &'static str, body: String) -> Self {
        let rel_id = format!("rId{}", self.next_rel);
        self.next_rel += 1;
        let file = format!("{}{}.xml", kind, self.parts.len() + 1);
        self.section_refs.push(format!(
            r#"<w:{}Reference w:type="{}" r:id="{}"/>"#,
            kind, variant, rel_id
        ));
        self.parts.push(HeaderFooter {
            rel_id,
            file,
            kind,
            body,
        });
        self
    }

    /// Add a header part referenced by the current section.
    pub fn header(self, variant: &'static str, text: &str) -> Self {
        self.add_part("header", variant, para(&[run(text)]))
    }

    /// Add a footer part referenced by the current section.
    pub fn footer(self, variant: &'static str, text: &str) -> Self {
        self.add_part("footer", variant, para(&[run(text)]))
    }

    /// Reference an already added header/footer part again from the
    /// current section.
    pub fn reuse(mut self, index: usize, variant: &'static str) -> Self {
        let part = &self.parts[index];
        self.section_refs.push(format!(
            r#"<w:{}Reference w:type="{}" r:id="{}"/>"#,
            part.kind, variant, part.rel_id
        ));
        self
    }

    /// End the current section with a section-break paragraph.
    pub fn section_break(mut self) -> Self {
        let refs = std::mem::take(&mut self.section_refs).concat();
        self.body
            .push(format!("<w:p><w:pPr><w:sectPr>{}</w:sectPr></w:pPr></w:p>", refs));
        self
    }

    /// Add an arbitrary archive entry.
    pub fn entry(mut self, name: &str, data: &[u8]) -> Self {
        self.extra.push((name.to_string(), data.to_vec()));
        self
    }

    pub fn build(self) -> Vec<u8> {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        let deflated = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

        let mut overrides = String::from(
            r#"<Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/>"#,
        );
        for part in &self.parts {
            overrides.push_str(&format!(
                r#"<Override PartName="/word/{}" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.{}+xml"/>"#,
                part.file, part.kind
            ));
        }
        let content_types = format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/>{}</Types>"#,
            overrides
        );
        put(&mut writer, "[Content_Types].xml", content_types.as_bytes(), deflated);

        let package_rels = format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="{}/officeDocument" Target="word/document.xml"/></Relationships>"#,
            R_NS
        );
        put(&mut writer, "_rels/.rels", package_rels.as_bytes(), deflated);

        let document = format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><w:document xmlns:w="{}" xmlns:r="{}"><w:body>{}<w:sectPr>{}<w:pgSz w:w="11906" w:h="16838"/></w:sectPr></w:body></w:document>"#,
            W_NS,
            R_NS,
            self.body.concat(),
            self.section_refs.concat()
        );
        put(&mut writer, "word/document.xml", document.as_bytes(), deflated);

        let mut rels = format!(
            r#"<Relationship Id="rId1" Type="{}/styles" Target="styles.xml"/>"#,
            R_NS
        );
        for part in &self.parts {
            rels.push_str(&format!(
                r#"<Relationship Id="{}" Type="{}/{}" Target="{}"/>"#,
                part.rel_id, R_NS, part.kind, part.file
            ));
        }
        let document_rels = format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">{}</Relationships>"#,
            rels
        );
        put(&mut writer, "word/_rels/document.xml.rels", document_rels.as_bytes(), deflated);

        let styles = format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><w:styles xmlns:w="{}"><w:style w:type="paragraph" w:default="1" w:styleId="Normal"><w:name w:val="Normal"/></w:style></w:styles>"#,
            W_NS
        );
        put(&mut writer, "word/styles.xml", styles.as_bytes(), deflated);

        for part in &self.parts {
            let root = if part.kind == "header" { "hdr" } else { "ftr" };
            let xml = format!(
                r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><w:{} xmlns:w="{}" xmlns:r="{}">{}</w:{}>"#,
                root, W_NS, R_NS, part.body, root
            );
            put(&mut writer, &format!("word/{}", part.file), xml.as_bytes(), deflated);
        }

        for (name, data) in &self.extra {
            let stored = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);
            put(&mut writer, name, data, stored);
        }

        writer.finish().unwrap().into_inner()
    }
}

impl Default for DocxBuilder {
    fn default() -> Self {
        Self::new()
    }
}

fn put(writer: &mut ZipWriter<Cursor<Vec<u8>>>, name: &str, data: &[u8], options: SimpleFileOptions) {
    writer.start_file(name, options).unwrap();
    writer.write_all(data).unwrap();
}

/// Read an archive entry (decompressed).
pub fn read_entry(docx: &[u8], name: &str) -> Vec<u8> {
    let mut archive = ZipArchive::new(Cursor::new(docx)).unwrap();
    let mut file = archive.by_name(name).unwrap();
    let mut out = Vec::new();
    file.read_to_end(&mut out).unwrap();
    out
}

/// Read an archive entry as text.
pub fn read_xml(docx: &[u8], name: &str) -> String {
    String::from_utf8(read_entry(docx, name)).unwrap()
}

/// Names of all archive entries in order.
pub fn entry_names(docx: &[u8]) -> Vec<String> {
    ZipArchive::new(Cursor::new(docx))
        .unwrap()
        .file_names()
        .map(str::to_string)
        .collect()
}
