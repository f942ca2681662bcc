//! Template and output configuration.

use std::borrow::Cow;
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::output::OutputDir;

/// Where a template is read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateSource {
    /// A DOCX file on disk
    Path(PathBuf),
    /// DOCX bytes already in memory
    Bytes(Vec<u8>),
}

impl TemplateSource {
    /// Read the template bytes.
    pub fn read(&self) -> Result<Cow<'_, [u8]>> {
        match self {
            TemplateSource::Path(path) => Ok(Cow::Owned(std::fs::read(path)?)),
            TemplateSource::Bytes(bytes) => Ok(Cow::Borrowed(bytes)),
        }
    }
}

/// Where generated documents go.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum OutputSink {
    /// Keep generated bytes in memory only
    #[default]
    Memory,
    /// Write generated documents into a directory
    Directory(PathBuf),
}

impl OutputSink {
    /// Store generated bytes. Returns the written path for a directory sink.
    pub fn store(&self, prefix: &str, bytes: &[u8]) -> Result<Option<PathBuf>> {
        match self {
            OutputSink::Memory => Ok(None),
            OutputSink::Directory(dir) => OutputDir::new(dir).write(prefix, bytes).map(Some),
        }
    }

    /// Get the output directory, if any.
    pub fn directory(&self) -> Option<OutputDir> {
        match self {
            OutputSink::Memory => None,
            OutputSink::Directory(dir) => Some(OutputDir::new(dir)),
        }
    }
}

/// Explicit configuration of a template run.
///
/// # Example
///
/// ```no_run
/// use docxfill::{Docxfill, FieldMap, TemplateConfig};
///
/// let config = TemplateConfig::from_path("contract.docx").with_output_dir("generated");
/// let template = Docxfill::new().from_config(&config)?;
/// let fields = FieldMap::new().with("name", "Ada");
/// let generated = template.generate(&fields)?;
/// let path = config.output.store("Ada", &generated.bytes)?;
/// # Ok::<(), docxfill::Error>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateConfig {
    /// Template to load
    pub template: TemplateSource,
    /// Destination of generated documents
    pub output: OutputSink,
}

impl TemplateConfig {
    /// Create a configuration with in-memory output.
    pub fn new(template: TemplateSource) -> Self {
        Self {
            template,
            output: OutputSink::default(),
        }
    }

    /// Configuration for a template file.
    pub fn from_path(path: impl AsRef<Path>) -> Self {
        Self::new(TemplateSource::Path(path.as_ref().to_path_buf()))
    }

    /// Configuration for template bytes.
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self::new(TemplateSource::Bytes(bytes.into()))
    }

    /// Write generated documents into a directory.
    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output = OutputSink::Directory(dir.into());
        self
    }
}
