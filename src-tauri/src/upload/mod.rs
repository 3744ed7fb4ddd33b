//! Upload domain — candidate files, validation and preview.
//!
//! A candidate is whatever the user picked or dropped: a file on disk or a
//! `data:` URI handed over by the webview. Validation only looks at the
//! declared MIME type and size; bytes are read after the checks pass.

pub mod data_uri;
mod preview;

pub use preview::{load_preview, to_jpeg, Preview};

use crate::error::{OcrError, ValidationError};
use std::path::Path;
use std::sync::Arc;

/// Largest file accepted for analysis (10 MB).
pub const MAX_UPLOAD_BYTES: u64 = 10 * 1024 * 1024;

/// A user-supplied image waiting to be previewed and analyzed.
///
/// Cloning is cheap: the byte buffer is shared.
#[derive(Debug, Clone)]
pub struct UploadCandidate {
    pub name: String,
    pub mime_type: String,
    pub size: u64,
    bytes: Arc<[u8]>,
}

impl UploadCandidate {
    /// Build a candidate from an in-memory buffer. The declared size is the
    /// buffer length.
    pub fn from_bytes(
        name: impl Into<String>,
        mime_type: impl Into<String>,
        bytes: impl Into<Arc<[u8]>>,
    ) -> Self {
        let bytes = bytes.into();
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
            size: bytes.len() as u64,
            bytes,
        }
    }

    /// Build a candidate from a `data:<mime>;base64,<payload>` URI.
    pub fn from_data_uri(name: impl Into<String>, uri: &str) -> Result<Self, OcrError> {
        let (mime_type, bytes) = data_uri::decode(uri)?;
        Ok(Self::from_bytes(name, mime_type, bytes))
    }

    /// Open a file from disk.
    ///
    /// The MIME type is guessed from the extension and the size comes from
    /// file metadata, so the validator runs before any bytes are read.
    pub async fn open(path: &Path, validator: &FileValidator) -> Result<Self, OcrError> {
        let metadata = tokio::fs::metadata(path).await?;
        let mime_type = mime_guess::from_path(path)
            .first()
            .map(|m| m.essence_str().to_string())
            .unwrap_or_else(|| "application/octet-stream".to_string());
        validator.check(&mime_type, metadata.len())?;

        let bytes = tokio::fs::read(path).await?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "image".to_string());
        log::info!(
            "[UPLOAD] Opened {} ({}, {} bytes)",
            name,
            mime_type,
            bytes.len()
        );
        Ok(Self::from_bytes(name, mime_type, bytes))
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Standard base64 of the raw bytes, without any `data:` prefix.
    pub fn to_base64(&self) -> String {
        base64::Engine::encode(&base64::engine::general_purpose::STANDARD, &self.bytes)
    }

    /// Replace the payload (e.g. after JPEG normalization), keeping the name.
    pub fn with_bytes(&self, mime_type: &str, bytes: Vec<u8>) -> Self {
        Self::from_bytes(self.name.clone(), mime_type, bytes)
    }
}

/// Accepts image files up to a size cap.
#[derive(Debug, Clone, Copy)]
pub struct FileValidator {
    pub max_bytes: u64,
}

impl Default for FileValidator {
    fn default() -> Self {
        Self {
            max_bytes: MAX_UPLOAD_BYTES,
        }
    }
}

impl FileValidator {
    pub fn validate(&self, candidate: &UploadCandidate) -> Result<(), ValidationError> {
        self.check(&candidate.mime_type, candidate.size)
    }

    /// Metadata-only check. The type check wins over the size check.
    pub fn check(&self, mime_type: &str, size: u64) -> Result<(), ValidationError> {
        if !is_image_type(mime_type) {
            return Err(ValidationError::NotAnImage);
        }
        if size > self.max_bytes {
            return Err(ValidationError::TooLarge {
                size,
                limit: self.max_bytes,
            });
        }
        Ok(())
    }
}

fn is_image_type(mime_type: &str) -> bool {
    mime_type
        .trim()
        .get(..6)
        .map(|prefix| prefix.eq_ignore_ascii_case("image/"))
        .unwrap_or(false)
}
