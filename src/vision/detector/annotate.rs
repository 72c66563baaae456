// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Annotated-preview rendering for detection results

use image::{DynamicImage, Rgb, RgbImage};

use super::model::RawDetection;

/// Outline thickness in pixels
const BOX_THICKNESS: u32 = 3;

/// Colors cycled per class id
const CLASS_PALETTE: [[u8; 3]; 8] = [
    [230, 57, 70],   // red
    [29, 53, 87],    // navy
    [42, 157, 143],  // teal
    [233, 196, 106], // sand
    [244, 162, 97],  // orange
    [131, 56, 236],  // violet
    [6, 214, 160],   // green
    [239, 71, 111],  // pink
];

/// Render detections onto a copy of the screenshot
///
/// Each box gets a class-colored outline; the input image is untouched.
pub fn annotate_detections(image: &DynamicImage, boxes: &[RawDetection]) -> RgbImage {
    let mut canvas = image.to_rgb8();
    for detection in boxes {
        draw_box_outline(&mut canvas, detection, class_color(detection.class_id));
    }
    canvas
}

/// Color assigned to a class id
fn class_color(class_id: usize) -> Rgb<u8> {
    Rgb(CLASS_PALETTE[class_id % CLASS_PALETTE.len()])
}

fn draw_box_outline(canvas: &mut RgbImage, detection: &RawDetection, color: Rgb<u8>) {
    let (width, height) = canvas.dimensions();
    if width == 0 || height == 0 {
        return;
    }

    let x1 = detection.x1.round().clamp(0.0, (width - 1) as f32) as u32;
    let y1 = detection.y1.round().clamp(0.0, (height - 1) as f32) as u32;
    let x2 = detection.x2.round().clamp(0.0, (width - 1) as f32) as u32;
    let y2 = detection.y2.round().clamp(0.0, (height - 1) as f32) as u32;
    if x2 <= x1 || y2 <= y1 {
        return;
    }

    for t in 0..BOX_THICKNESS {
        // Horizontal edges
        for x in x1..=x2 {
            if y1 + t <= y2 {
                canvas.put_pixel(x, y1 + t, color);
            }
            if y2 >= t && y2 - t >= y1 {
                canvas.put_pixel(x, y2 - t, color);
            }
        }
        // Vertical edges
        for y in y1..=y2 {
            if x1 + t <= x2 {
                canvas.put_pixel(x1 + t, y, color);
            }
            if x2 >= t && x2 - t >= x1 {
                canvas.put_pixel(x2 - t, y, color);
            }
        }
    }
}
