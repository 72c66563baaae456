// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Gemini client for multimodal UI critique via the REST API

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info};

use crate::analysis::CritiqueModel;

/// Production endpoint for the Gemini REST API
const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Model used for screenshot critique
const GEMINI_MODEL: &str = "gemini-2.0-flash";

// --- REST serde structs ---

#[derive(serde::Serialize)]
struct GenerateContentRequest {
    contents: Vec<Content>,
}

#[derive(serde::Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(serde::Serialize)]
struct Part {
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    file_data: Option<FileData>,
}

#[derive(serde::Serialize)]
struct FileData {
    mime_type: String,
    file_uri: String,
}

#[derive(serde::Deserialize)]
struct UploadResponse {
    file: UploadedFileInfo,
}

#[derive(serde::Deserialize)]
struct UploadedFileInfo {
    uri: String,
    #[serde(rename = "mimeType")]
    mime_type: Option<String>,
}

#[derive(serde::Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(serde::Deserialize)]
struct Candidate {
    content: CandidateContent,
}

#[derive(serde::Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(serde::Deserialize)]
struct ResponsePart {
    #[serde(default)]
    text: Option<String>,
}

// --- Result types ---

/// Opaque reference to a file uploaded to the service
#[derive(Debug, Clone)]
pub struct FileRef {
    pub uri: String,
    pub mime_type: String,
}

/// Client for the Gemini file-upload and generate-content calls
pub struct GeminiClient {
    client: Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl GeminiClient {
    /// Create a client against the production endpoint
    pub fn new(api_key: &str) -> Result<Self> {
        Self::with_base_url(api_key, GEMINI_BASE_URL)
    }

    /// Create a client against a custom endpoint (tests, proxies)
    pub fn with_base_url(api_key: &str, base_url: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(120))
            .build()?;

        let base_url = base_url.trim_end_matches('/').to_string();
        info!("Gemini client configured: model={}", GEMINI_MODEL);

        Ok(Self {
            client,
            base_url,
            api_key: api_key.to_string(),
            model: GEMINI_MODEL.to_string(),
        })
    }

    /// Get the model name
    pub fn model(&self) -> &str {
        &self.model
    }

    async fn upload(&self, path: &Path) -> Result<FileRef> {
        let bytes = tokio::fs::read(path)
            .await
            .with_context(|| format!("failed to read {}", path.display()))?;
        let mime_type = mime_for_path(path);

        debug!(
            "Uploading {} ({} bytes, {})",
            path.display(),
            bytes.len(),
            mime_type
        );

        let response = self
            .client
            .post(format!(
                "{}/upload/v1beta/files?key={}",
                self.base_url, self.api_key
            ))
            .header("X-Goog-Upload-Protocol", "raw")
            .header(CONTENT_TYPE, &mime_type)
            .body(bytes)
            .send()
            .await
            .context("file upload request failed")?;

        let status = response.status();
        if !status.is_success() {
            return Err(anyhow!("file upload failed: HTTP {}", status));
        }

        let upload: UploadResponse = response
            .json()
            .await
            .context("file upload returned an unexpected body")?;

        Ok(FileRef {
            uri: upload.file.uri,
            mime_type: upload.file.mime_type.unwrap_or(mime_type),
        })
    }

    async fn generate(&self, prompt: &str, file: &FileRef) -> Result<String> {
        let request = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![
                    Part {
                        text: Some(prompt.to_string()),
                        file_data: None,
                    },
                    Part {
                        text: None,
                        file_data: Some(FileData {
                            mime_type: file.mime_type.clone(),
                            file_uri: file.uri.clone(),
                        }),
                    },
                ],
            }],
        };

        let response = self
            .client
            .post(format!(
                "{}/v1beta/models/{}:generateContent?key={}",
                self.base_url, self.model, self.api_key
            ))
            .json(&request)
            .send()
            .await
            .context("generate-content request failed")?;

        let status = response.status();
        if !status.is_success() {
            return Err(anyhow!("generate-content failed: HTTP {}", status));
        }

        let body: GenerateContentResponse = response
            .json()
            .await
            .context("generate-content returned an unexpected body")?;

        let text = body
            .candidates
            .first()
            .map(|c| {
                c.content
                    .parts
                    .iter()
                    .filter_map(|p| p.text.as_deref())
                    .collect::<Vec<_>>()
                    .join("")
            })
            .ok_or_else(|| anyhow!("generate-content returned no candidates"))?;

        debug!("Received {} chars of critique text", text.len());

        Ok(text)
    }
}

#[async_trait]
impl CritiqueModel for GeminiClient {
    async fn upload_file(&self, path: &Path) -> Result<FileRef> {
        self.upload(path).await
    }

    async fn generate_content(&self, prompt: &str, file: &FileRef) -> Result<String> {
        self.generate(prompt, file).await
    }
}

/// Mime type for an image path, from its extension
fn mime_for_path(path: &Path) -> String {
    let mime = match path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .as_deref()
    {
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("webp") => "image/webp",
        Some("gif") => "image/gif",
        Some("bmp") => "image/bmp",
        _ => "application/octet-stream",
    };
    mime.to_string()
}
