//! # docxfill
//!
//! Placeholder filling for DOCX templates.
//!
//! Templates contain fields written as `{{field_name}}` anywhere in body
//! text, tables, headers or footers. This library lists those fields,
//! previews a substitution, and generates filled documents that keep the
//! template's formatting, even when Word has split a placeholder across
//! several differently-formatted runs.
//!
//! ## Quick Start
//!
//! ```no_run
//! use docxfill::{generate, list_fields, FieldMap};
//!
//! fn main() -> docxfill::Result<()> {
//!     let template = std::fs::read("contract.docx")?;
//!
//!     println!("Fields: {:?}", list_fields(&template)?);
//!
//!     let fields = FieldMap::from_json(r#"{"name": "Ada", "date": "2024-03-09"}"#)?;
//!     let generated = generate(&template, &fields)?;
//!     std::fs::write("contract_ada.docx", &generated.bytes)?;
//!     println!("{} replacements", generated.replacements);
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **Run-aware matching**: placeholders split across runs are found and replaced
//! - **Formatting preservation**: untouched runs and archive entries are kept byte-for-byte
//! - **Headers and footers**: default, first-page and even-page variants of every section
//! - **Batch generation**: many records from one template, in parallel with Rayon

pub mod config;
pub mod detect;
pub mod error;
pub mod fill;
pub mod model;
pub mod output;
pub mod parser;
pub mod writer;

// Re-export commonly used types
pub use config::{OutputSink, TemplateConfig, TemplateSource};
pub use detect::{detect_format_from_bytes, detect_format_from_path, is_docx, DocxFormat};
pub use error::{Error, Result};
pub use fill::{
    FieldMap, FieldStatus, FillObserver, FillOptions, FillStats, Generated, Preview,
    RewritePolicy,
};
pub use model::{Document, Region, RegionId, RegionKind};
pub use output::{GeneratedFile, OutputDir};
pub use parser::{DocxParser, ErrorMode, ParseOptions};

use std::path::Path;

use rayon::prelude::*;

/// Parse a DOCX file.
///
/// # Example
///
/// ```no_run
/// use docxfill::parse_file;
///
/// let doc = parse_file("template.docx").unwrap();
/// println!("Regions: {}", doc.region_count());
/// ```
pub fn parse_file<P: AsRef<Path>>(path: P) -> Result<Document> {
    DocxParser::open(path)?.parse()
}

/// Parse a DOCX from bytes.
pub fn parse_bytes(data: &[u8]) -> Result<Document> {
    DocxParser::from_bytes(data)?.parse()
}

/// List the distinct placeholder names of a template, sorted.
///
/// # Example
///
/// ```no_run
/// use docxfill::list_fields;
///
/// let data = std::fs::read("template.docx").unwrap();
/// for name in list_fields(&data).unwrap() {
///     println!("{{{{{}}}}}", name);
/// }
/// ```
pub fn list_fields(data: &[u8]) -> Result<Vec<String>> {
    Ok(fill::discover_fields(&parse_bytes(data)?))
}

/// Report which template fields the supplied data covers, without
/// generating anything.
pub fn preview(data: &[u8], fields: &FieldMap) -> Result<Preview> {
    Ok(fill::preview_fields(&parse_bytes(data)?, fields))
}

/// Fill a template and return the new document.
///
/// Either the whole document is produced or an error is returned.
pub fn generate(data: &[u8], fields: &FieldMap) -> Result<Generated> {
    Docxfill::new().load_bytes(data)?.generate(fields)
}

/// Builder for loading templates.
///
/// # Example
///
/// ```no_run
/// use docxfill::{Docxfill, FieldMap, RewritePolicy};
///
/// let template = Docxfill::new()
///     .lenient()
///     .with_policy(RewritePolicy::Collapse)
///     .load("template.docx")?;
///
/// let generated = template.generate(&FieldMap::new().with("name", "Ada"))?;
/// # Ok::<(), docxfill::Error>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct Docxfill {
    parse_options: ParseOptions,
    fill_options: FillOptions,
}

impl Docxfill {
    /// Create a new builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Skip broken header/footer parts instead of failing.
    pub fn lenient(mut self) -> Self {
        self.parse_options = self.parse_options.lenient();
        self
    }

    /// Set the error mode.
    pub fn with_error_mode(mut self, mode: ErrorMode) -> Self {
        self.parse_options = self.parse_options.with_error_mode(mode);
        self
    }

    /// Set the region rewrite policy.
    pub fn with_policy(mut self, policy: RewritePolicy) -> Self {
        self.fill_options = self.fill_options.with_policy(policy);
        self
    }

    /// Load a template file.
    pub fn load<P: AsRef<Path>>(self, path: P) -> Result<Template> {
        let document = DocxParser::open_with_options(path, self.parse_options)?.parse()?;
        Ok(Template::new(document, self.fill_options))
    }

    /// Load a template from bytes.
    pub fn load_bytes(self, data: &[u8]) -> Result<Template> {
        let document = DocxParser::from_bytes_with_options(data, self.parse_options)?.parse()?;
        Ok(Template::new(document, self.fill_options))
    }

    /// Load the template named by a configuration.
    pub fn from_config(self, config: &TemplateConfig) -> Result<Template> {
        let data = config.template.read()?;
        self.load_bytes(&data)
    }
}

/// A loaded template, reusable for any number of generations.
#[derive(Debug, Clone)]
pub struct Template {
    document: Document,
    fields: Vec<String>,
    options: FillOptions,
}

impl Template {
    fn new(document: Document, options: FillOptions) -> Self {
        let fields = fill::discover_fields(&document);
        log::debug!(
            "Template loaded: {} regions, {} fields",
            document.region_count(),
            fields.len()
        );
        Self {
            document,
            fields,
            options,
        }
    }

    /// Distinct placeholder names, sorted.
    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    /// Get the parsed template document.
    pub fn document(&self) -> &Document {
        &self.document
    }

    /// Get the fill options.
    pub fn options(&self) -> &FillOptions {
        &self.options
    }

    /// Compare the template's fields with supplied data.
    pub fn preview(&self, fields: &FieldMap) -> Preview {
        fill::preview_fields(&self.document, fields)
    }

    /// Fill the template.
    pub fn generate(&self, fields: &FieldMap) -> Result<Generated> {
        self.generate_with(fields, &mut fill::LoggingObserver)
    }

    /// Fill the template, reporting regions and replacements to an observer.
    pub fn generate_with(
        &self,
        fields: &FieldMap,
        observer: &mut dyn FillObserver,
    ) -> Result<Generated> {
        let mut document = self.document.clone();
        let stats = fill::substitute_document_with(&mut document, fields, &self.options, observer);
        let bytes = writer::serialize(&document)?;
        Ok(Generated::new(bytes, stats))
    }

    /// Fill the template once per record, in parallel.
    ///
    /// Results are returned in input order; a failing record does not
    /// affect the others.
    pub fn generate_batch(&self, records: &[FieldMap]) -> Vec<Result<Generated>> {
        records
            .par_iter()
            .map(|fields| self.generate(fields))
            .collect()
    }
}
