//! DOCX container writer.
//!
//! Rebuilds the archive of a [`Document`]: parts whose text changed are
//! rendered and re-deflated, every other entry is copied raw (without
//! decompressing it).

mod markup;

use std::collections::HashMap;
use std::io::{Cursor, Write};
use std::path::Path;

use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use crate::error::{Error, Result};
use crate::model::Document;

fn serialization(err: impl std::fmt::Display) -> Error {
    Error::Serialization(err.to_string())
}

/// Serialize a document back into DOCX bytes.
///
/// An unmodified document yields its original bytes.
pub fn serialize(document: &Document) -> Result<Vec<u8>> {
    if !document.is_modified() {
        return Ok(document.container.to_vec());
    }

    let mut rendered: HashMap<&str, String> = HashMap::new();
    for part in document.parts.iter().filter(|p| p.is_modified()) {
        rendered.insert(part.name.as_str(), markup::render_part(part)?);
    }

    let mut archive =
        ZipArchive::new(Cursor::new(&document.container[..])).map_err(serialization)?;
    let mut writer = ZipWriter::new(Cursor::new(Vec::with_capacity(document.container.len())));

    for index in 0..archive.len() {
        let entry = archive.by_index_raw(index).map_err(serialization)?;

        match rendered.get(entry.name()) {
            Some(xml) => {
                let mut options =
                    SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
                if let Some(modified) = entry.last_modified() {
                    options = options.last_modified_time(modified);
                }
                writer
                    .start_file(entry.name(), options)
                    .map_err(serialization)?;
                writer.write_all(xml.as_bytes()).map_err(serialization)?;
                log::debug!("Rewrote part {} ({} bytes)", entry.name(), xml.len());
            }
            None => writer.raw_copy_file(entry).map_err(serialization)?,
        }
    }

    let cursor = writer.finish().map_err(serialization)?;
    Ok(cursor.into_inner())
}

/// Serialize a document and write it to a file.
pub fn write_to_file<P: AsRef<Path>>(document: &Document, path: P) -> Result<()> {
    let bytes = serialize(document)?;
    std::fs::write(path, bytes)?;
    Ok(())
}
