// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Analyze-UI endpoint handler

use axum::extract::State;
use axum::Json;
use axum_extra::extract::Multipart;
use tracing::{debug, error, info, warn};

use super::request::UploadedImage;
use super::response::AnalysisReport;
use crate::api::errors::ApiError;
use crate::api::http_server::AppState;

/// POST /api/analyze-ui/ - Critique an uploaded UI screenshot
///
/// Accepts a multipart form with an `image` file field, persists it under
/// a timestamped name, and returns the merged analysis report. GET (or any
/// request without a file) yields the same validation error a missing
/// field does.
///
/// # Errors
/// - 400 Bad Request: missing/empty/oversized/non-image upload
/// - 500 Internal Server Error: storage failure or analysis fault
pub async fn analyze_ui_handler(
    State(state): State<AppState>,
    multipart: Option<Multipart>,
) -> Result<Json<AnalysisReport>, ApiError> {
    let Some(mut multipart) = multipart else {
        warn!("Analyze request carried no multipart body");
        return Err(missing_image());
    };

    let mut upload: Option<UploadedImage> = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::InvalidRequest(format!("malformed multipart body: {}", e)))?
    {
        if field.name() != Some("image") {
            continue;
        }
        let file_name = field.file_name().unwrap_or("upload").to_string();
        let data = field
            .bytes()
            .await
            .map_err(|e| ApiError::InvalidRequest(format!("failed to read image field: {}", e)))?;
        upload = Some(UploadedImage {
            file_name,
            data: data.to_vec(),
        });
        break;
    }

    let upload = upload.ok_or_else(missing_image)?;
    upload.validate()?;
    debug!(
        "Received upload '{}' ({} bytes)",
        upload.file_name,
        upload.data.len()
    );

    let stored = state
        .uploads
        .store(&upload.file_name, &upload.data)
        .map_err(|e| {
            error!("Failed to persist upload: {}", e);
            ApiError::InternalError("failed to store upload".to_string())
        })?;
    info!("Stored upload as {}", stored.file_name);

    let report = state.analyzer.analyze(&stored.path).await.map_err(|e| {
        error!("UI analysis failed: {:#}", e);
        ApiError::InternalError("UI analysis failed".to_string())
    })?;

    Ok(Json(report))
}

fn missing_image() -> ApiError {
    ApiError::ValidationError {
        field: "image".to_string(),
        message: "No file was submitted.".to_string(),
    }
}
