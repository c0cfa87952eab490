//! Error types for rendering and verification

use thiserror::Error;

/// Coarse classification of a render failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The tree failed validation
    Validation,
    /// Styling or building could not proceed
    Render,
    /// The container could not be written
    Serialization,
    /// The written container failed verification
    Integrity,
}

/// Errors that can occur while rendering a UIF tree
#[derive(Error, Debug)]
pub enum RenderError {
    /// Aggregate of all validator messages
    #[error("Document validation failed:\n{}", bulleted(.errors))]
    Validation { errors: Vec<String> },

    /// A style the builders depend on is missing from the style table
    #[error("Style not found: {0}")]
    StyleNotFound(String),

    /// Error writing the archive
    #[error("Serialization error: {0}")]
    Serialization(#[from] SerializationError),

    /// The output failed archive verification
    #[error("Integrity check failed: {0}")]
    Integrity(#[from] IntegrityError),

    /// Error parsing XML content
    #[error("XML parsing error: {0}")]
    Xml(#[from] quick_xml::Error),
}

/// Write-side failures
#[derive(Error, Debug)]
pub enum SerializationError {
    /// Error from the ZIP writer
    #[error("archive error: {0}")]
    Archive(#[from] zip::result::ZipError),

    /// Error writing bytes
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Reasons a written container is rejected
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IntegrityError {
    /// Not a readable ZIP archive
    #[error("output is not a readable archive: {0}")]
    Unreadable(String),

    /// An entry failed to decompress or its CRC did not match
    #[error("corrupted entry '{name}': {reason}")]
    CorruptEntry { name: String, reason: String },

    /// Mandatory parts are absent
    #[error("missing required parts: {}", .0.join(", "))]
    MissingParts(Vec<String>),

    /// An XML part is not well-formed
    #[error("part '{part}' is not well-formed XML: {reason}")]
    MalformedXml { part: String, reason: String },

    /// A relationship points at a part that is not in the archive
    #[error("relationship {id} in '{source_part}' targets missing part '{target}'")]
    DanglingRelationship {
        source_part: String,
        id: String,
        target: String,
    },
}

impl RenderError {
    /// Classify this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            RenderError::Validation { .. } => ErrorKind::Validation,
            RenderError::StyleNotFound(_) | RenderError::Xml(_) => ErrorKind::Render,
            RenderError::Serialization(_) => ErrorKind::Serialization,
            RenderError::Integrity(_) => ErrorKind::Integrity,
        }
    }
}

impl From<zip::result::ZipError> for RenderError {
    fn from(err: zip::result::ZipError) -> Self {
        RenderError::Serialization(err.into())
    }
}

impl From<std::io::Error> for RenderError {
    fn from(err: std::io::Error) -> Self {
        RenderError::Serialization(err.into())
    }
}

fn bulleted(errors: &[String]) -> String {
    errors
        .iter()
        .map(|e| format!("  - {}", e))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Result type for rendering operations
pub type Result<T> = std::result::Result<T, RenderError>;
