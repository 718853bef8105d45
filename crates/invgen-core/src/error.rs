//! Error types for the invgen-core library.

use thiserror::Error;

/// Main error type for the invgen library.
#[derive(Error, Debug)]
pub enum InvgenError {
    /// Logo ingestion error.
    #[error("logo error: {0}")]
    Logo(#[from] LogoError),

    /// Document export error.
    #[error("export error: {0}")]
    Export(#[from] ExportError),

    /// A field value could not be applied to the invoice.
    #[error("invalid value for {field}: {reason}")]
    InvalidField { field: String, reason: String },

    /// A stored invoice does not satisfy the model invariants.
    #[error("invalid invoice: {0}")]
    InvalidInvoice(String),

    /// JSON (de)serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// Preview template rendering error.
    #[error("render error: {0}")]
    Render(#[from] askama::Error),
}

/// Errors related to company logo ingestion.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LogoError {
    /// The declared media type is not an image type.
    #[error("invalid file type: {0}")]
    InvalidType(String),

    /// The file is at or above the size limit.
    #[error("file too large: {size} bytes (limit {limit})")]
    TooLarge { size: u64, limit: u64 },

    /// Reading the file contents failed.
    #[error("failed to read file: {0}")]
    Read(String),
}

/// Errors related to printing and PDF export.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExportError {
    /// The preview could not be rasterized.
    #[error("rasterization failed: {0}")]
    Rasterize(String),

    /// The PDF document could not be assembled.
    #[error("PDF assembly failed: {0}")]
    Assemble(String),

    /// The finished document could not be saved.
    #[error("failed to save document: {0}")]
    Save(String),

    /// The print dialog could not be opened.
    #[error("print failed: {0}")]
    Print(String),
}

impl From<lopdf::Error> for ExportError {
    fn from(err: lopdf::Error) -> Self {
        ExportError::Assemble(err.to_string())
    }
}

impl From<image::ImageError> for ExportError {
    fn from(err: image::ImageError) -> Self {
        ExportError::Rasterize(err.to_string())
    }
}

/// Result type for the invgen library.
pub type Result<T> = std::result::Result<T, InvgenError>;
