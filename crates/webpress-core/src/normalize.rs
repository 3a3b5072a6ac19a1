//! Color-mode normalization for lossy encoding.
//!
//! WebP's lossy path encodes opaque RGB. Uploads arrive in whatever mode
//! their source format used: RGBA and grayscale-alpha carry transparency,
//! 16-bit and grayscale images carry no alpha but are not 8-bit RGB either.
//! This module flattens all of them to `Rgb8`:
//!
//! - anything with an alpha channel is composited onto an opaque white
//!   canvas of identical dimensions, using the alpha channel as the mask
//!   (palette-indexed sources are expanded to RGBA by the decoder, so they
//!   take this path too);
//! - alpha-free images in other modes are converted to `Rgb8` directly;
//! - images already in `Rgb8` pass through untouched.

use image::{DynamicImage, Rgb, RgbImage, RgbaImage};

/// Flatten a decoded image to 8-bit RGB, compositing transparency onto white.
///
/// Output dimensions always equal input dimensions. Infallible: every mode
/// the decoder produces has a defined conversion.
pub fn normalize(image: DynamicImage) -> RgbImage {
    match image {
        DynamicImage::ImageRgb8(rgb) => rgb,
        img if img.color().has_alpha() => composite_on_white(img.into_rgba8()),
        img => img.into_rgb8(),
    }
}

/// Alpha-blend an RGBA image over an opaque white canvas.
fn composite_on_white(rgba: RgbaImage) -> RgbImage {
    let (width, height) = rgba.dimensions();
    let mut canvas = RgbImage::from_pixel(width, height, Rgb([255, 255, 255]));

    for (x, y, pixel) in rgba.enumerate_pixels() {
        let alpha = u32::from(pixel[3]);
        let out = canvas.get_pixel_mut(x, y);
        for channel in 0..3 {
            let src = u32::from(pixel[channel]);
            // Integer alpha blend against white: src * a + 255 * (255 - a), scaled back.
            out[channel] = ((src * alpha + 255 * (255 - alpha)) / 255) as u8;
        }
    }

    canvas
}
