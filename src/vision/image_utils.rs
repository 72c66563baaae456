// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Image format sniffing for uploaded screenshots

use image::ImageFormat;
use thiserror::Error;

/// Maximum upload size (10MB)
pub const MAX_UPLOAD_SIZE: usize = 10 * 1024 * 1024;

/// Custom error types for upload sniffing
#[derive(Debug, Error)]
pub enum ImageError {
    #[error("image data is too large: {0} bytes (max: {1} bytes)")]
    TooLarge(usize, usize),

    #[error("unsupported or unrecognized image format")]
    UnsupportedFormat,

    #[error("image data is empty")]
    EmptyData,
}

/// Detect the format of raw uploaded bytes
///
/// Sniffs the content rather than trusting the filename extension; an
/// upload renamed to `.png` that is really a PDF is rejected here.
pub fn detect_format(bytes: &[u8]) -> Result<ImageFormat, ImageError> {
    if bytes.is_empty() {
        return Err(ImageError::EmptyData);
    }

    if bytes.len() > MAX_UPLOAD_SIZE {
        return Err(ImageError::TooLarge(bytes.len(), MAX_UPLOAD_SIZE));
    }

    image::guess_format(bytes).map_err(|_| ImageError::UnsupportedFormat)
}

/// Get the format extension as a string
pub fn format_to_extension(format: ImageFormat) -> &'static str {
    match format {
        ImageFormat::Png => "png",
        ImageFormat::Jpeg => "jpg",
        ImageFormat::WebP => "webp",
        ImageFormat::Gif => "gif",
        ImageFormat::Bmp => "bmp",
        _ => "unknown",
    }
}
