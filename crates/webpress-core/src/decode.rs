//! Image decoding with format detection.

use std::io::Cursor;

use image::{DynamicImage, ImageFormat, ImageReader};

use crate::error::CompressError;

/// The container format an upload was decoded from, as reported by the
/// decoder's format sniffing. `None` when the format could not be determined.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceFormat(Option<ImageFormat>);

impl SourceFormat {
    /// Uppercase label for the detected format, e.g. "JPEG" or "PNG".
    /// Returns "UNKNOWN" when detection failed.
    pub fn label(&self) -> &'static str {
        match self.0 {
            Some(ImageFormat::Jpeg) => "JPEG",
            Some(ImageFormat::Png) => "PNG",
            Some(ImageFormat::Gif) => "GIF",
            Some(ImageFormat::Bmp) => "BMP",
            Some(ImageFormat::Tiff) => "TIFF",
            Some(ImageFormat::WebP) => "WEBP",
            _ => "UNKNOWN",
        }
    }
}

impl From<Option<ImageFormat>> for SourceFormat {
    fn from(format: Option<ImageFormat>) -> Self {
        Self(format)
    }
}

/// Decode an uploaded image from raw bytes, sniffing the format from the
/// file's magic bytes rather than trusting any client-supplied name.
///
/// # Errors
///
/// Returns `CompressError::InvalidInput` if the bytes are empty or cannot
/// be decoded as any supported image format.
pub fn decode_image(bytes: &[u8]) -> Result<(DynamicImage, SourceFormat), CompressError> {
    if bytes.is_empty() {
        return Err(CompressError::InvalidInput("empty upload".to_string()));
    }

    let reader = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| CompressError::InvalidInput(e.to_string()))?;

    let format = SourceFormat::from(reader.format());

    let image = reader
        .decode()
        .map_err(|e| CompressError::InvalidInput(e.to_string()))?;

    Ok((image, format))
}
