// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Image preprocessing for the UI element detector

use image::{DynamicImage, GenericImageView, Rgb, RgbImage};
use ndarray::Array4;

/// Square input size expected by the detector
pub const DETECTOR_INPUT_SIZE: u32 = 640;

/// Gray value used for letterbox padding
const PAD_VALUE: u8 = 114;

/// Geometry of a letterboxed image, for mapping boxes back
#[derive(Debug, Clone, Copy)]
pub struct Letterbox {
    /// Uniform scale applied to the original image
    pub scale: f32,
    /// Horizontal padding added on the left
    pub pad_x: f32,
    /// Vertical padding added on the top
    pub pad_y: f32,
    /// Original image width in pixels
    pub orig_width: u32,
    /// Original image height in pixels
    pub orig_height: u32,
}

impl Letterbox {
    /// Map an x coordinate from model input space back to original pixels
    pub fn unmap_x(&self, x: f32) -> f32 {
        ((x - self.pad_x) / self.scale).clamp(0.0, self.orig_width as f32)
    }

    /// Map a y coordinate from model input space back to original pixels
    pub fn unmap_y(&self, y: f32) -> f32 {
        ((y - self.pad_y) / self.scale).clamp(0.0, self.orig_height as f32)
    }
}

/// Preprocess an image for detection
///
/// Steps:
/// 1. Resize with aspect ratio preservation to DETECTOR_INPUT_SIZE
/// 2. Center on a gray canvas (letterbox)
/// 3. Scale pixels to [0, 1]
/// 4. Convert to NCHW tensor format [1, 3, H, W]
pub fn preprocess_for_detection(image: &DynamicImage) -> (Array4<f32>, Letterbox) {
    let (canvas, letterbox) = letterbox_image(image, DETECTOR_INPUT_SIZE);
    let size = DETECTOR_INPUT_SIZE as usize;

    let mut tensor = Array4::zeros((1, 3, size, size));
    for y in 0..size {
        for x in 0..size {
            let pixel = canvas.get_pixel(x as u32, y as u32);
            for c in 0..3 {
                tensor[[0, c, y, x]] = pixel[c] as f32 / 255.0;
            }
        }
    }

    (tensor, letterbox)
}

/// Resize with aspect ratio preservation and center on a gray canvas
fn letterbox_image(image: &DynamicImage, target_size: u32) -> (RgbImage, Letterbox) {
    let (orig_w, orig_h) = image.dimensions();

    let mut canvas = RgbImage::from_pixel(
        target_size,
        target_size,
        Rgb([PAD_VALUE, PAD_VALUE, PAD_VALUE]),
    );

    if orig_w == 0 || orig_h == 0 {
        let letterbox = Letterbox {
            scale: 1.0,
            pad_x: 0.0,
            pad_y: 0.0,
            orig_width: orig_w,
            orig_height: orig_h,
        };
        return (canvas, letterbox);
    }

    let scale = (target_size as f32 / orig_w as f32).min(target_size as f32 / orig_h as f32);
    let new_w = ((orig_w as f32 * scale).round() as u32).max(1);
    let new_h = ((orig_h as f32 * scale).round() as u32).max(1);
    let pad_x = (target_size - new_w) / 2;
    let pad_y = (target_size - new_h) / 2;

    let resized = image
        .resize_exact(new_w, new_h, image::imageops::FilterType::Triangle)
        .to_rgb8();
    image::imageops::replace(&mut canvas, &resized, pad_x as i64, pad_y as i64);

    let letterbox = Letterbox {
        scale,
        pad_x: pad_x as f32,
        pad_y: pad_y as f32,
        orig_width: orig_w,
        orig_height: orig_h,
    };

    (canvas, letterbox)
}
