//! Compression ratio arithmetic.

/// Percentage reduction in byte size achieved by transcoding, rounded to
/// two decimal places. Negative when the output is larger than the input.
/// Defined as zero when the original size is zero (no division).
pub fn compression_ratio(original_size: u64, compressed_size: u64) -> f64 {
    if original_size == 0 {
        return 0.0;
    }
    let ratio = (1.0 - compressed_size as f64 / original_size as f64) * 100.0;
    (ratio * 100.0).round() / 100.0
}
