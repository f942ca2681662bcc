//! Output file naming and generated-file listing.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use chrono::{DateTime, Local};
use regex::Regex;
use serde::Serialize;

use crate::error::Result;

/// Prefix used when no usable prefix is given.
pub const DEFAULT_PREFIX: &str = "document";

/// Timestamp format of generated file names.
pub const TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

const EXTENSION: &str = "docx";

fn strip_regex() -> &'static Regex {
    static STRIP: OnceLock<Regex> = OnceLock::new();
    STRIP.get_or_init(|| Regex::new(r"[^\w\s-]").expect("strip pattern is valid"))
}

fn separator_regex() -> &'static Regex {
    static SEPARATOR: OnceLock<Regex> = OnceLock::new();
    SEPARATOR.get_or_init(|| Regex::new(r"[-\s]+").expect("separator pattern is valid"))
}

/// Make a string safe for use as a file name prefix.
///
/// Keeps word characters, whitespace and `-`, then collapses runs of
/// whitespace and `-` into `_`. Returns [`DEFAULT_PREFIX`] when nothing
/// is left.
///
/// # Example
///
/// ```
/// use docxfill::output::sanitize_prefix;
///
/// assert_eq!(sanitize_prefix("Ada Lovelace / Contract"), "Ada_Lovelace_Contract");
/// ```
pub fn sanitize_prefix(raw: &str) -> String {
    let stripped = strip_regex().replace_all(raw, "");
    let collapsed = separator_regex().replace_all(stripped.trim(), "_");
    if collapsed.is_empty() {
        DEFAULT_PREFIX.to_string()
    } else {
        collapsed.into_owned()
    }
}

/// File name for a generated document: `<prefix>_<YYYYmmdd_HHMMSS>.docx`.
pub fn output_file_name(prefix: &str, at: DateTime<Local>) -> String {
    format!(
        "{}_{}.{}",
        sanitize_prefix(prefix),
        at.format(TIMESTAMP_FORMAT),
        EXTENSION
    )
}

/// A previously generated file.
#[derive(Debug, Clone, Serialize)]
pub struct GeneratedFile {
    /// File name
    pub name: String,
    /// Full path
    pub path: PathBuf,
    /// Size in bytes
    pub size: u64,
    /// Last modification time
    pub modified: DateTime<Local>,
}

/// Directory receiving generated documents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputDir {
    root: PathBuf,
}

impl OutputDir {
    /// Create a handle for the given directory. Nothing is created yet.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Get the directory path.
    pub fn path(&self) -> &Path {
        &self.root
    }

    /// Write a document under a fresh timestamped name.
    ///
    /// If the name is taken (two documents within the same second) a
    /// numeric suffix is added. The bytes go to a hidden temporary file
    /// first, which is then linked under the first free name; claiming a
    /// name never replaces an existing file, so concurrent writers each get
    /// their own.
    pub fn write(&self, prefix: &str, bytes: &[u8]) -> Result<PathBuf> {
        fs::create_dir_all(&self.root)?;

        let mut temp = tempfile::Builder::new()
            .prefix(".")
            .suffix(".part")
            .tempfile_in(&self.root)?;
        temp.write_all(bytes)?;
        temp.flush()?;

        let name = output_file_name(prefix, Local::now());
        let stem = name.trim_end_matches(&format!(".{}", EXTENSION)).to_string();
        let mut attempt = 1;
        loop {
            let candidate = if attempt == 1 {
                self.root.join(&name)
            } else {
                self.root.join(format!("{}_{}.{}", stem, attempt, EXTENSION))
            };

            match temp.persist_noclobber(&candidate) {
                Ok(_) => {
                    log::info!("Wrote {} ({} bytes)", candidate.display(), bytes.len());
                    return Ok(candidate);
                }
                Err(err) if err.error.kind() == io::ErrorKind::AlreadyExists => {
                    temp = err.file;
                    attempt += 1;
                }
                Err(err) => return Err(err.error.into()),
            }
        }
    }

    /// List generated documents, newest first.
    ///
    /// A missing directory lists as empty.
    pub fn list(&self) -> Result<Vec<GeneratedFile>> {
        if !self.root.is_dir() {
            return Ok(Vec::new());
        }

        let mut files = Vec::new();
        for entry in fs::read_dir(&self.root)? {
            let entry = entry?;
            let path = entry.path();
            let is_docx = path
                .extension()
                .map(|e| e.eq_ignore_ascii_case(EXTENSION))
                .unwrap_or(false);
            let name = entry.file_name().to_string_lossy().into_owned();
            if !is_docx || name.starts_with('.') {
                continue;
            }

            let metadata = entry.metadata()?;
            if !metadata.is_file() {
                continue;
            }
            files.push(GeneratedFile {
                name,
                path,
                size: metadata.len(),
                modified: DateTime::<Local>::from(metadata.modified()?),
            });
        }

        files.sort_by(|a, b| b.modified.cmp(&a.modified).then_with(|| b.name.cmp(&a.name)));
        Ok(files)
    }
}
