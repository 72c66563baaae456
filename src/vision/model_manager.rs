// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Vision model manager for loading the UI element detector

use std::path::PathBuf;
use std::sync::Arc;

use crate::vision::detector::UiElementDetector;

/// Configuration for loading vision models
#[derive(Debug, Clone, Default)]
pub struct VisionModelConfig {
    /// Path to the detector ONNX weights (optional)
    pub detector_model_path: Option<PathBuf>,
}

/// Manager for the optional detection model
///
/// Missing or unloadable weights are handled gracefully: the node runs in
/// the critique-only variant and reports detection as unavailable.
pub struct VisionModelManager {
    detector: Option<Arc<UiElementDetector>>,
}

impl VisionModelManager {
    /// Create a new VisionModelManager with the given configuration
    pub async fn new(config: VisionModelConfig) -> anyhow::Result<Self> {
        let detector = if let Some(ref path) = config.detector_model_path {
            match UiElementDetector::new(path).await {
                Ok(model) => Some(Arc::new(model)),
                Err(e) => {
                    tracing::warn!(
                        "⚠️ Failed to load UI detector from {}: {}",
                        path.display(),
                        e
                    );
                    None
                }
            }
        } else {
            None
        };

        Ok(Self { detector })
    }

    /// Get the detector if available
    pub fn detector(&self) -> Option<Arc<UiElementDetector>> {
        self.detector.clone()
    }

    /// Check if detection is available
    pub fn has_detector(&self) -> bool {
        self.detector.is_some()
    }
}
