// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! UI element detection for uploaded screenshots
//!
//! Components:
//! - `model` - ONNX detection model and output decoding
//! - `preprocessing` - letterbox resize and tensor conversion
//! - `annotate` - annotated-preview rendering

pub mod annotate;
pub mod model;
pub mod preprocessing;

pub use annotate::annotate_detections;
pub use model::{RawDetection, UiDetectionResult, UiElementDetector};
pub use preprocessing::{preprocess_for_detection, Letterbox, DETECTOR_INPUT_SIZE};
