// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Flattening of raw detector output into response detections

use crate::api::analyze_ui::response::Detection;
use crate::vision::detector::UiDetectionResult;

/// Flatten per-image detector results into response detections
///
/// Order is preserved: image order, then box order within each image.
/// Nothing is filtered or deduplicated - every box the detector returned
/// passes through. Class ids outside the result's own name table resolve
/// to `"unknown"`.
pub fn normalize_detections(results: &[UiDetectionResult]) -> Vec<Detection> {
    let mut detections = Vec::new();
    for result in results {
        for raw in &result.boxes {
            let class_name = result
                .class_names
                .get(raw.class_id)
                .cloned()
                .unwrap_or_else(|| "unknown".to_string());

            detections.push(Detection {
                bbox: [raw.x1, raw.y1, raw.x2, raw.y2],
                confidence: raw.confidence,
                class_id: raw.class_id as u32,
                class_name,
            });
        }
    }
    detections
}
