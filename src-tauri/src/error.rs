//! Error types shared by every domain.
//!
//! Anything that ends up in the error panel is an `OcrError`; its `Display`
//! text is the message the user sees.

/// Why a candidate file was refused before any network call.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("not an image")]
    NotAnImage,

    #[error("too large")]
    TooLarge { size: u64, limit: u64 },
}

#[derive(Debug, thiserror::Error)]
pub enum OcrError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("no image selected")]
    NoImageSelected,

    #[error("upload failed: {status} {reason}")]
    Upload { status: u16, reason: String },

    #[error("API error: {status} {reason}")]
    Api { status: u16, reason: String },

    #[error("{0}")]
    Format(String),

    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("failed to read image: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to decode image: {0}")]
    Image(#[from] image::ImageError),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("clipboard unavailable: {0}")]
    Clipboard(String),

    #[error("no result to copy")]
    NoResult,
}

impl OcrError {
    /// Shorthand for the "reply had no usable content" case.
    pub fn no_content() -> Self {
        OcrError::Format("no response content".to_string())
    }
}
