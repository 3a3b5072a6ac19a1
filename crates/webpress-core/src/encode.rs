//! WebP encoding at a fixed quality.
//!
//! The `image` crate's built-in WebP encoder is lossless-only, so lossy
//! encoding goes through the `webp` crate (libwebp bindings).

use image::RgbImage;
use webp::{Encoder, WebPConfig};

use crate::error::CompressError;

/// Fixed encoder quality on libwebp's 0-100 scale.
pub const WEBP_QUALITY: f32 = 95.0;

/// libwebp compression method 6: best compression, slowest.
const WEBP_METHOD: i32 = 6;

/// Encode normalized RGB pixel data to lossy WebP bytes.
///
/// Deterministic for identical input and libwebp version.
///
/// # Errors
///
/// Returns `CompressError::Encoding` if the image has a zero dimension or
/// libwebp rejects the encode.
pub fn encode_webp(image: &RgbImage) -> Result<Vec<u8>, CompressError> {
    let (width, height) = image.dimensions();
    if width == 0 || height == 0 {
        return Err(CompressError::Encoding(format!(
            "invalid dimensions {width}x{height}"
        )));
    }

    let mut config = WebPConfig::new()
        .map_err(|()| CompressError::Encoding("encoder configuration rejected".to_string()))?;
    config.quality = WEBP_QUALITY;
    config.method = WEBP_METHOD;

    let encoder = Encoder::from_rgb(image.as_raw(), width, height);
    let encoded = encoder
        .encode_advanced(&config)
        .map_err(|e| CompressError::Encoding(format!("{e:?}")))?;

    Ok(encoded.to_vec())
}
