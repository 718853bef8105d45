//! Company logo ingestion.
//!
//! A logo upload is checked against its declared media type and size before
//! anything is read. Accepted files are encoded into a self-contained data
//! URI that the invoice stores in place of a file reference.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use tracing::debug;

use crate::error::LogoError;

/// Uploads of this many bytes or more are rejected (2 MiB).
pub const MAX_LOGO_BYTES: u64 = 2 * 1024 * 1024;

/// A user-selected file offered as a logo.
#[allow(async_fn_in_trait)]
pub trait LogoUpload {
    /// Declared media type, e.g. `image/png`.
    fn media_type(&self) -> String;

    /// Declared size in bytes.
    fn size(&self) -> u64;

    /// Read the file contents.
    async fn read(&self) -> Result<Vec<u8>, LogoError>;
}

/// An upload whose contents are already in memory.
#[derive(Debug, Clone)]
pub struct InMemoryUpload {
    media_type: String,
    bytes: Vec<u8>,
}

impl InMemoryUpload {
    pub fn new(media_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            media_type: media_type.into(),
            bytes,
        }
    }
}

impl LogoUpload for InMemoryUpload {
    fn media_type(&self) -> String {
        self.media_type.clone()
    }

    fn size(&self) -> u64 {
        self.bytes.len() as u64
    }

    async fn read(&self) -> Result<Vec<u8>, LogoError> {
        Ok(self.bytes.clone())
    }
}

/// Validates logo uploads and encodes them as data URIs.
#[derive(Debug, Clone, Copy)]
pub struct LogoIngestor {
    max_bytes: u64,
}

impl LogoIngestor {
    pub fn new(max_bytes: u64) -> Self {
        Self { max_bytes }
    }

    /// Check media type, then size. Nothing is read.
    pub fn validate(&self, upload: &impl LogoUpload) -> Result<(), LogoError> {
        let media_type = upload.media_type();
        if !media_type.starts_with("image/") {
            return Err(LogoError::InvalidType(media_type));
        }
        let size = upload.size();
        if size >= self.max_bytes {
            return Err(LogoError::TooLarge {
                size,
                limit: self.max_bytes,
            });
        }
        Ok(())
    }

    /// Validate and read the upload, returning its data URI.
    ///
    /// The caller stores the result on the invoice once this resolves, so the
    /// current logo stays untouched while the file is being read.
    pub async fn ingest(&self, upload: &impl LogoUpload) -> Result<String, LogoError> {
        self.validate(upload)?;
        let bytes = upload.read().await?;
        debug!("Read {} byte logo ({})", bytes.len(), upload.media_type());
        Ok(encode_data_uri(&upload.media_type(), &bytes))
    }
}

impl Default for LogoIngestor {
    fn default() -> Self {
        Self::new(MAX_LOGO_BYTES)
    }
}

/// Build a base64 data URI.
pub fn encode_data_uri(media_type: &str, bytes: &[u8]) -> String {
    format!("data:{};base64,{}", media_type, STANDARD.encode(bytes))
}
