//! DOCX container detection and validation.

use crate::error::{Error, Result};
use crate::parser::main_part_name;
use std::fs::File;
use std::io::{BufReader, Cursor, Read};
use std::path::Path;

/// DOCX container information.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocxFormat {
    /// Name of the main document part (usually `word/document.xml`)
    pub main_part: String,
    /// Number of entries in the archive
    pub entry_count: usize,
}

impl std::fmt::Display for DocxFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "DOCX ({} entries, main part {})", self.entry_count, self.main_part)
    }
}

/// ZIP local file header magic: PK\x03\x04
const ZIP_MAGIC: &[u8] = b"PK\x03\x04";

/// Main part location used when `_rels/.rels` does not name one.
pub(crate) const DEFAULT_MAIN_PART: &str = "word/document.xml";

/// Check whether the data starts with a ZIP local file header.
pub fn has_zip_magic(data: &[u8]) -> bool {
    data.starts_with(ZIP_MAGIC)
}

/// Detect a DOCX container from a file path.
///
/// # Example
/// ```no_run
/// use docxfill::detect::detect_format_from_path;
///
/// let format = detect_format_from_path("template.docx").unwrap();
/// println!("Main part: {}", format.main_part);
/// ```
pub fn detect_format_from_path<P: AsRef<Path>>(path: P) -> Result<DocxFormat> {
    let file = File::open(path)?;
    let mut reader = BufReader::new(file);
    let mut data = Vec::new();
    reader.read_to_end(&mut data)?;
    detect_format_from_bytes(&data)
}

/// Detect a DOCX container from bytes.
///
/// # Returns
/// * `Ok(DocxFormat)` if the data is a ZIP archive holding a main document part
/// * `Err(Error::MalformedDocument)` otherwise
pub fn detect_format_from_bytes(data: &[u8]) -> Result<DocxFormat> {
    if !has_zip_magic(data) {
        return Err(Error::MalformedDocument("not a ZIP container".to_string()));
    }

    let mut archive = zip::ZipArchive::new(Cursor::new(data))
        .map_err(|e| Error::MalformedDocument(e.to_string()))?;

    let main_part = main_part_name(&mut archive)?;
    if archive.index_for_name(&main_part).is_none() {
        return Err(Error::MalformedDocument(format!(
            "missing main document part {}",
            main_part
        )));
    }

    Ok(DocxFormat {
        main_part,
        entry_count: archive.len(),
    })
}

/// Check if a file is a DOCX container.
pub fn is_docx<P: AsRef<Path>>(path: P) -> bool {
    detect_format_from_path(path).is_ok()
}

/// Check if bytes represent a DOCX container.
pub fn is_docx_bytes(data: &[u8]) -> bool {
    detect_format_from_bytes(data).is_ok()
}
