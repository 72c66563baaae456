// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use anyhow::Result;
use std::{env, sync::Arc};
use ui_critique_node::{
    api::{start_server, AppState},
    config::AppConfig,
    storage::UploadStore,
    version,
    vision::{GeminiClient, VisionModelConfig, VisionModelManager},
    UiAnalyzer,
};

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    // Initialize tracing subscriber for logging
    if env::var("RUST_LOG").is_err() {
        env::set_var("RUST_LOG", "info");
    }
    tracing_subscriber::fmt::init();

    println!("🚀 Starting UI Critique Node...\n");
    println!("📦 BUILD VERSION: {}", version::VERSION);
    println!("📅 Build Date: {}", version::BUILD_DATE);
    println!();

    let config = AppConfig::from_env()?;

    println!("🧠 Configuring critique model client...");
    let gemini = GeminiClient::new(&config.gemini_api_key)?;

    println!("👁️  Loading UI element detector...");
    let vision = VisionModelManager::new(VisionModelConfig {
        detector_model_path: Some(config.detector_model_path.clone()),
    })
    .await?;
    if vision.has_detector() {
        println!("✅ Detector ready");
    } else {
        println!("⚠️  Detector unavailable - running critique-only");
    }

    let uploads = Arc::new(UploadStore::new(&config.media_root));
    let analyzer = Arc::new(UiAnalyzer::new(
        Arc::new(gemini),
        vision.detector(),
        &config.media_base_url,
        &config.media_root,
    ));

    let state = AppState::new(analyzer, uploads);
    start_server(state, config.api_port).await?;

    Ok(())
}
