// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Node configuration read once at startup and injected into constructors

use anyhow::{Context, Result};
use std::env;
use std::path::PathBuf;

/// Default HTTP port for the API server
pub const DEFAULT_API_PORT: u16 = 8000;

/// Default media root for uploads and annotated images
pub const DEFAULT_MEDIA_ROOT: &str = "./media";

/// Default public base URL under which the media root is served
pub const DEFAULT_MEDIA_BASE_URL: &str = "http://localhost:8000/media";

/// Default path to the UI element detector weights
pub const DEFAULT_DETECTOR_MODEL_PATH: &str = "./models/ui-detector.onnx";

/// Node configuration
///
/// All values come from the process environment (plus `.env` via dotenv in
/// main). Nothing on the request path reads the environment - the resolved
/// config is passed into the client, store, and analyzer constructors.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// API key for the multimodal critique service
    pub gemini_api_key: String,
    /// Directory under which `ui_uploads/` lives
    pub media_root: PathBuf,
    /// Public URL prefix mapping to `media_root`
    pub media_base_url: String,
    /// ONNX weights for the UI element detector; a missing file disables detection
    pub detector_model_path: PathBuf,
    /// Port the API server binds to
    pub api_port: u16,
}

impl AppConfig {
    /// Load the configuration from the process environment
    pub fn from_env() -> Result<Self> {
        let gemini_api_key = env::var("GEMINI_API_KEY")
            .context("GEMINI_API_KEY environment variable is required")?;

        let media_root = PathBuf::from(
            env::var("MEDIA_ROOT").unwrap_or_else(|_| DEFAULT_MEDIA_ROOT.to_string()),
        );

        let media_base_url =
            env::var("MEDIA_BASE_URL").unwrap_or_else(|_| DEFAULT_MEDIA_BASE_URL.to_string());

        let detector_model_path = PathBuf::from(
            env::var("UI_DETECTOR_MODEL_PATH")
                .unwrap_or_else(|_| DEFAULT_DETECTOR_MODEL_PATH.to_string()),
        );

        let api_port = env::var("API_PORT")
            .unwrap_or_else(|_| DEFAULT_API_PORT.to_string())
            .parse::<u16>()
            .unwrap_or(DEFAULT_API_PORT);

        Ok(Self {
            gemini_api_key,
            media_root,
            media_base_url,
            detector_model_path,
            api_port,
        })
    }
}
