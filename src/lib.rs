// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod analysis;
pub mod api;
pub mod config;
pub mod storage;
pub mod version;
pub mod vision;

// Re-export main types
pub use analysis::{extract_json, normalize_detections, CritiqueModel, UiAnalyzer};
pub use api::{build_router, start_server, AnalysisReport, ApiError, AppState};
pub use config::AppConfig;
pub use storage::{StoredUpload, UploadStore};
pub use vision::{FileRef, GeminiClient, UiElementDetector, VisionModelConfig, VisionModelManager};
