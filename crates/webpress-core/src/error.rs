//! Error types for the transcoding pipeline.

use thiserror::Error;

/// Errors that can occur while turning an uploaded image into WebP.
#[derive(Debug, Error)]
pub enum CompressError {
    /// The input is empty or cannot be decoded as an image.
    #[error("invalid image input: {0}")]
    InvalidInput(String),

    /// Normalization or WebP encoding failed unexpectedly.
    #[error("encoding failed: {0}")]
    Encoding(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = CompressError::InvalidInput("empty upload".to_string());
        assert_eq!(err.to_string(), "invalid image input: empty upload");

        let err = CompressError::Encoding("config rejected".to_string());
        assert_eq!(err.to_string(), "encoding failed: config rejected");
    }
}
