// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Screenshot analysis pipeline
//!
//! Components:
//! - `extraction` - JSON extraction from free-form model output
//! - `normalize` - flattening of raw detector output
//! - `orchestrator` - the per-request critique + detection pipeline

pub mod extraction;
pub mod normalize;
pub mod orchestrator;

pub use extraction::extract_json;
pub use normalize::normalize_detections;
pub use orchestrator::{CritiqueModel, UiAnalyzer, CRITIQUE_PROMPT};
