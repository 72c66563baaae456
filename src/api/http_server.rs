// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use axum::extract::{DefaultBodyLimit, State};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::Router;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::analysis::UiAnalyzer;
use crate::api::analyze_ui::analyze_ui_handler;
use crate::storage::UploadStore;
use crate::vision::image_utils::MAX_UPLOAD_SIZE;

/// Headroom for multipart boundaries and headers on top of the file limit
const MULTIPART_OVERHEAD: usize = 64 * 1024;

#[derive(Clone)]
pub struct AppState {
    pub analyzer: Arc<UiAnalyzer>,
    pub uploads: Arc<UploadStore>,
}

impl AppState {
    pub fn new(analyzer: Arc<UiAnalyzer>, uploads: Arc<UploadStore>) -> Self {
        Self { analyzer, uploads }
    }
}

/// Build the API router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(health_handler))
        // UI critique endpoint; GET is routed too and fails validation
        .route(
            "/api/analyze-ui/",
            post(analyze_ui_handler).get(analyze_ui_handler),
        )
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_SIZE + MULTIPART_OVERHEAD))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn start_server(state: AppState, port: u16) -> anyhow::Result<()> {
    let app = build_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr).await?;

    tracing::info!("API server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    tracing::info!("Shutdown signal received");
}

async fn health_handler(State(state): State<AppState>) -> impl IntoResponse {
    let mut health = crate::version::get_version_info();
    health["status"] = serde_json::Value::String("ok".to_string());
    health["detection_enabled"] =
        serde_json::Value::Bool(state.analyzer.detection_enabled());
    axum::response::Json(health)
}
