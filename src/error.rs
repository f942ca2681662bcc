//! Error types for docxfill library.

use std::io;
use thiserror::Error;

/// Result type alias for docxfill operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while loading, filling, or writing a template.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error when reading a template or writing an output file.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The input bytes are not a loadable, well-structured DOCX container.
    #[error("Malformed document: {0}")]
    MalformedDocument(String),

    /// The mutated document could not be re-encoded.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// The caller-supplied field data could not be read as name/value pairs.
    #[error("Invalid field data: {0}")]
    InvalidFieldData(String),
}

impl Error {
    pub(crate) fn malformed(part: &str, detail: impl std::fmt::Display) -> Self {
        Error::MalformedDocument(format!("{}: {}", part, detail))
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::InvalidFieldData(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::MalformedDocument("not a ZIP container".to_string());
        assert_eq!(err.to_string(), "Malformed document: not a ZIP container");

        let err = Error::malformed("word/document.xml", "unexpected end of part");
        assert_eq!(
            err.to_string(),
            "Malformed document: word/document.xml: unexpected end of part"
        );
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
    }

    #[test]
    fn test_json_error_conversion() {
        let json_err = serde_json::from_str::<serde_json::Value>("{oops").unwrap_err();
        let err: Error = json_err.into();
        assert!(matches!(err, Error::InvalidFieldData(_)));
    }
}
