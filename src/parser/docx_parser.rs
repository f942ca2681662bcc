//! DOCX container parser.

use std::collections::HashMap;
use std::io::{Cursor, Read};
use std::path::Path;
use std::sync::Arc;

use zip::result::ZipError;
use zip::ZipArchive;

use crate::detect::{has_zip_magic, DEFAULT_MAIN_PART};
use crate::error::{Error, Result};
use crate::model::{Document, Part, PartKind, PartReference};

use super::options::ParseOptions;
use super::part::parse_part;
use super::rels::{parse_relationships, rels_path, resolve_target, Relationship, PACKAGE_RELS};

pub(crate) type Archive<'a> = ZipArchive<Cursor<&'a [u8]>>;

/// Upper bound on the buffer reserved from an entry's declared size.
const SIZE_HINT_LIMIT: u64 = 16 * 1024 * 1024;

/// DOCX template parser.
///
/// Loads the main document part and every header and footer part referenced
/// by the document's sections.
pub struct DocxParser {
    data: Arc<[u8]>,
    options: ParseOptions,
}

impl DocxParser {
    /// Open a DOCX file.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::open_with_options(path, ParseOptions::default())
    }

    /// Open a DOCX file with custom options.
    pub fn open_with_options<P: AsRef<Path>>(path: P, options: ParseOptions) -> Result<Self> {
        let data = std::fs::read(path)?;
        Self::from_vec(data, options)
    }

    /// Parse a DOCX from bytes.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        Self::from_bytes_with_options(data, ParseOptions::default())
    }

    /// Parse a DOCX from bytes with custom options.
    pub fn from_bytes_with_options(data: &[u8], options: ParseOptions) -> Result<Self> {
        Self::from_vec(data.to_vec(), options)
    }

    /// Parse a DOCX from a reader.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        Self::from_reader_with_options(reader, ParseOptions::default())
    }

    /// Parse a DOCX from a reader with custom options.
    pub fn from_reader_with_options<R: Read>(mut reader: R, options: ParseOptions) -> Result<Self> {
        let mut data = Vec::new();
        reader.read_to_end(&mut data)?;
        Self::from_vec(data, options)
    }

    fn from_vec(data: Vec<u8>, options: ParseOptions) -> Result<Self> {
        if !has_zip_magic(&data) {
            return Err(Error::MalformedDocument("not a ZIP container".to_string()));
        }
        Ok(Self {
            data: Arc::from(data),
            options,
        })
    }

    /// Parse the container and return a Document.
    pub fn parse(&self) -> Result<Document> {
        let mut archive = ZipArchive::new(Cursor::new(&self.data[..]))
            .map_err(|e| Error::malformed("package", e))?;

        let main_name = main_part_name(&mut archive)?;
        let main_xml = read_part(&mut archive, &main_name)?
            .ok_or_else(|| Error::malformed(&main_name, "missing main document part"))?;
        let (main, mut sections) = parse_part(&main_name, PartKind::Main, main_xml)?;

        let relationships: HashMap<String, Relationship> =
            match read_part(&mut archive, &rels_path(&main_name))? {
                Some(xml) => parse_relationships(&rels_path(&main_name), &xml)?
                    .into_iter()
                    .map(|rel| (rel.id.clone(), rel))
                    .collect(),
                None => HashMap::new(),
            };

        let mut parts = vec![main];
        let mut loaded: HashMap<String, Option<usize>> = HashMap::new();

        for section in &mut sections {
            for reference in &mut section.references {
                reference.part = self.load_reference(
                    &mut archive,
                    &main_name,
                    &relationships,
                    reference,
                    &mut parts,
                    &mut loaded,
                )?;
            }
        }

        log::debug!(
            "Loaded {}: {} parts, {} sections",
            main_name,
            parts.len(),
            sections.len()
        );

        Ok(Document::new(self.data.clone(), parts, sections))
    }

    /// Resolve a header/footer reference to a part index, loading the part
    /// on first use.
    fn load_reference(
        &self,
        archive: &mut Archive<'_>,
        main_name: &str,
        relationships: &HashMap<String, Relationship>,
        reference: &PartReference,
        parts: &mut Vec<Part>,
        loaded: &mut HashMap<String, Option<usize>>,
    ) -> Result<Option<usize>> {
        let Some(rel) = relationships.get(&reference.rel_id) else {
            return self.skip(Error::malformed(
                main_name,
                format!("unknown relationship {}", reference.rel_id),
            ));
        };
        let name = resolve_target(main_name, &rel.target);

        if let Some(index) = loaded.get(&name) {
            return Ok(*index);
        }

        let result = read_part(archive, &name).and_then(|xml| match xml {
            Some(xml) => parse_part(&name, reference.kind.into(), xml).map(|(part, _)| part),
            None => Err(Error::malformed(&name, "referenced part is missing")),
        });

        let index = match result {
            Ok(part) => {
                parts.push(part);
                Some(parts.len() - 1)
            }
            Err(err) => self.skip(err)?,
        };
        loaded.insert(name, index);
        Ok(index)
    }

    /// In lenient mode, log and drop a broken header/footer part.
    fn skip(&self, err: Error) -> Result<Option<usize>> {
        if self.options.is_lenient() {
            log::warn!("Skipping header/footer part: {}", err);
            Ok(None)
        } else {
            Err(err)
        }
    }
}

/// Locate the main document part through the package relationships,
/// falling back to `word/document.xml`.
pub(crate) fn main_part_name(archive: &mut Archive<'_>) -> Result<String> {
    let Some(xml) = read_part(archive, PACKAGE_RELS)? else {
        return Ok(DEFAULT_MAIN_PART.to_string());
    };

    let target = parse_relationships(PACKAGE_RELS, &xml)?
        .into_iter()
        .find(|rel| rel.is_type("officeDocument") && !rel.external)
        .map(|rel| resolve_target("", &rel.target));

    Ok(target.unwrap_or_else(|| DEFAULT_MAIN_PART.to_string()))
}

/// Buffer size to reserve for an entry. The declared size comes from the
/// archive and is not trusted beyond [`SIZE_HINT_LIMIT`].
fn size_hint(declared: u64) -> usize {
    usize::try_from(declared.min(SIZE_HINT_LIMIT)).unwrap_or(0)
}

/// Read an archive entry as UTF-8 text. Returns `None` if the entry does
/// not exist.
fn read_part(archive: &mut Archive<'_>, name: &str) -> Result<Option<String>> {
    let mut file = match archive.by_name(name) {
        Ok(file) => file,
        Err(ZipError::FileNotFound) => return Ok(None),
        Err(err) => return Err(Error::malformed(name, err)),
    };

    let mut data = Vec::with_capacity(size_hint(file.size()));
    file.read_to_end(&mut data)
        .map_err(|err| Error::malformed(name, err))?;

    String::from_utf8(data)
        .map(Some)
        .map_err(|_| Error::malformed(name, "part is not valid UTF-8"))
}
