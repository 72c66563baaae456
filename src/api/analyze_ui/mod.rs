// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Analyze-UI endpoint: upload a screenshot, get a critique report

pub mod handler;
pub mod request;
pub mod response;

pub use handler::analyze_ui_handler;
pub use request::UploadedImage;
pub use response::{AnalysisReport, Critique, Detection, MetricScores};
