// SPDX-FileCopyrightText: 2026 Makula Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! External photo hosting client for Makula.
//!
//! Implements [`MediaStore`] over HTTP: photo bytes are posted as a
//! multipart form to the configured upload endpoint and the hosted URL from
//! the response is returned to the caller.

use async_trait::async_trait;
use makula_config::model::MediaConfig;
use makula_core::{MakulaError, MediaStore};
use serde::Deserialize;
use tracing::{debug, warn};

/// HTTP media store talking to an external upload service.
pub struct HttpMediaStore {
    client: reqwest::Client,
    upload_url: String,
    api_key: Option<String>,
    folder: String,
}

/// The upload endpoint's response body.
#[derive(Debug, Deserialize)]
struct UploadResponse {
    secure_url: String,
}

impl HttpMediaStore {
    /// Builds the store from config.
    ///
    /// Returns `None` when no upload endpoint is configured; the intake flow
    /// then runs without photo support.
    pub fn from_config(config: &MediaConfig) -> Option<Self> {
        let upload_url = config.upload_url.clone()?;
        if config.api_key.is_none() {
            warn!("media.upload_url set without media.api_key; uploads will be unauthenticated");
        }
        Some(Self {
            client: reqwest::Client::new(),
            upload_url,
            api_key: config.api_key.clone(),
            folder: config.folder.clone(),
        })
    }
}

#[async_trait]
impl MediaStore for HttpMediaStore {
    async fn upload_photo(&self, data: Vec<u8>, filename: &str) -> Result<String, MakulaError> {
        let size = data.len();
        let part = reqwest::multipart::Part::bytes(data)
            .file_name(filename.to_string())
            .mime_str("image/jpeg")
            .map_err(|e| MakulaError::Media {
                message: format!("invalid upload part: {e}"),
                source: Some(Box::new(e)),
            })?;
        let form = reqwest::multipart::Form::new()
            .part("file", part)
            .text("folder", self.folder.clone());

        let mut request = self.client.post(&self.upload_url).multipart(form);
        if let Some(ref api_key) = self.api_key {
            request = request.header("x-api-key", api_key);
        }

        let response = request.send().await.map_err(|e| MakulaError::Media {
            message: format!("upload request failed: {e}"),
            source: Some(Box::new(e)),
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(MakulaError::Media {
                message: format!("upload rejected with status {status}"),
                source: None,
            });
        }

        let body: UploadResponse = response.json().await.map_err(|e| MakulaError::Media {
            message: format!("invalid upload response: {e}"),
            source: Some(Box::new(e)),
        })?;

        debug!(filename, size, url = %body.secure_url, "photo uploaded");
        Ok(body.secure_url)
    }
}
