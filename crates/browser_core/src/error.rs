//! Browser error types

use thiserror::Error;

/// Main browser error type
#[derive(Error, Debug)]
pub enum BrowserError {
    // ===== Recoverable Errors (visual only, presentation continues) =====
    #[error("Image load failed for {url}: {reason}")]
    LoadFailed { url: String, reason: String },

    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image decode error: {0}")]
    ImageDecode(String),

    #[error("Unsupported image URL: {0}")]
    UnsupportedUrl(String),

    #[error("Load cancelled")]
    Cancelled,

    // ===== Programming errors (caller supplied a bad argument) =====
    #[error("Group index {index} out of range ({count} groups)")]
    InvalidGroup { index: usize, count: usize },

    #[error("Browser is busy ({0})")]
    Busy(String),

    // ===== Fatal Errors =====
    #[error("Image loader channel closed")]
    LoaderClosed,

    #[error("Configuration error: {0}")]
    Config(String),
}

impl BrowserError {
    /// Is this error recoverable?
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            BrowserError::LoadFailed { .. }
                | BrowserError::Io(_)
                | BrowserError::ImageDecode(_)
                | BrowserError::UnsupportedUrl(_)
                | BrowserError::Cancelled
                | BrowserError::InvalidGroup { .. }
                | BrowserError::Busy(_)
        )
    }

    /// Is this a fatal error?
    pub fn is_fatal(&self) -> bool {
        !self.is_recoverable()
    }
}

impl From<image::ImageError> for BrowserError {
    fn from(e: image::ImageError) -> Self {
        BrowserError::ImageDecode(e.to_string())
    }
}

impl From<toml::de::Error> for BrowserError {
    fn from(e: toml::de::Error) -> Self {
        BrowserError::Config(e.to_string())
    }
}

impl From<toml::ser::Error> for BrowserError {
    fn from(e: toml::ser::Error) -> Self {
        BrowserError::Config(e.to_string())
    }
}
