// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Analyze-UI upload validation

use image::ImageFormat;

use crate::api::errors::ApiError;
use crate::vision::image_utils::{detect_format, ImageError};

/// Raster formats accepted for screenshot uploads
const SUPPORTED_FORMATS: &[ImageFormat] = &[
    ImageFormat::Png,
    ImageFormat::Jpeg,
    ImageFormat::WebP,
    ImageFormat::Gif,
    ImageFormat::Bmp,
];

/// An uploaded screenshot pulled out of the multipart body
#[derive(Debug, Clone)]
pub struct UploadedImage {
    /// Client-supplied filename (used for the stored stem and extension)
    pub file_name: String,
    /// Raw file bytes
    pub data: Vec<u8>,
}

impl UploadedImage {
    /// Validate the uploaded file
    ///
    /// The content is sniffed, not the filename: the bytes must identify a
    /// supported raster format and fit the size limit.
    pub fn validate(&self) -> Result<(), ApiError> {
        let format = detect_format(&self.data).map_err(|e| {
            let message = match e {
                ImageError::EmptyData => "The submitted file is empty.".to_string(),
                other => other.to_string(),
            };
            ApiError::ValidationError {
                field: "image".to_string(),
                message,
            }
        })?;

        if !SUPPORTED_FORMATS.contains(&format) {
            return Err(ApiError::ValidationError {
                field: "image".to_string(),
                message: format!(
                    "unsupported image format '{:?}', supported: {:?}",
                    format, SUPPORTED_FORMATS
                ),
            });
        }

        Ok(())
    }
}
