//! Error types for DOCX operations

use thiserror::Error;

/// Errors that can occur while reading, rewriting, or writing a document
#[derive(Error, Debug)]
pub enum DocxError {
    /// Error reading or writing the ZIP archive
    #[error("Archive error: {0}")]
    Archive(#[from] zip::result::ZipError),

    /// Error reading or writing files
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Error parsing XML content
    #[error("XML parsing error: {0}")]
    Xml(#[from] quick_xml::Error),

    /// Part content that is not valid UTF-8
    #[error("Part is not valid UTF-8: {0}")]
    Encoding(#[from] std::string::FromUtf8Error),

    /// Required part not found in archive
    #[error("Required part not found: {0}")]
    MissingPart(String),

    /// Numbering part absent or with no identifier elements to scan.
    /// Fresh ids cannot be allocated against such a part.
    #[error("Malformed numbering part: {0}")]
    MalformedNumbering(String),

    /// Template table layout does not match the expected contract
    #[error("Template shape mismatch: {0}")]
    TemplateShape(String),

    /// A plan referenced a reuse row that the template does not have
    #[error("Template has no data row {0} to reuse")]
    MissingReuseRow(usize),

    /// Error resolving plan or vocabulary data
    #[error(transparent)]
    Model(#[from] swmsgen_model::ModelError),
}

/// Result type for DOCX operations
pub type Result<T> = std::result::Result<T, DocxError>;
