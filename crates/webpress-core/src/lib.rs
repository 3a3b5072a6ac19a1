//! WebPress Core - Image transcoding library
//!
//! This crate provides the pixel pipeline for the WebPress service:
//! decoding uploads, normalizing color modes for lossy encoding, and
//! encoding to WebP at a fixed quality. It is pure and synchronous; the
//! HTTP and persistence layers live in `webpress-server`.

pub mod decode;
pub mod encode;
pub mod error;
pub mod normalize;
pub mod stats;

pub use decode::{decode_image, SourceFormat};
pub use encode::{encode_webp, WEBP_QUALITY};
pub use error::CompressError;
pub use normalize::normalize;
pub use stats::compression_ratio;

/// Result of running an upload through the full pixel pipeline.
#[derive(Debug, Clone)]
pub struct TranscodedImage {
    /// Encoded WebP bytes.
    pub webp: Vec<u8>,
    /// Uppercase label of the detected source format, or "UNKNOWN".
    pub original_format: &'static str,
    /// Output width in pixels (same as input).
    pub width: u32,
    /// Output height in pixels (same as input).
    pub height: u32,
}

/// Decode, normalize, and encode an uploaded image to WebP.
///
/// # Errors
///
/// Returns `CompressError::InvalidInput` for empty or undecodable uploads
/// and `CompressError::Encoding` if the WebP encode fails.
pub fn transcode_to_webp(bytes: &[u8]) -> Result<TranscodedImage, CompressError> {
    let (image, format) = decode::decode_image(bytes)?;
    let rgb = normalize::normalize(image);
    let (width, height) = rgb.dimensions();
    let webp = encode::encode_webp(&rgb)?;

    Ok(TranscodedImage {
        webp,
        original_format: format.label(),
        width,
        height,
    })
}
