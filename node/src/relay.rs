// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Forwards uploaded images to the external image host.

use std::time::{Duration, Instant};

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use reqwest::multipart::Form;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::NodeConfig;

#[derive(Error, Debug)]
pub enum UploadError {
    #[error("Empty image payload")]
    EmptyPayload,
    #[error("Image host request failed: {0}")]
    Network(#[from] reqwest::Error),
    #[error("Image host returned status {0}")]
    Status(StatusCode),
    #[error("Image host reported failure")]
    Rejected,
    #[error("Malformed image host response: {0}")]
    Malformed(String),
}

/// Public locations of an uploaded image.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct UploadedImage {
    pub url: String,
    pub display_url: String,
}

#[derive(Deserialize)]
struct HostResponse {
    #[serde(default)]
    success: bool,
    data: Option<UploadedImage>,
}

#[derive(Debug, Clone)]
pub struct UploadRelay {
    endpoint: String,
    api_key: String,
    client: Client,
}

impl UploadRelay {
    pub fn new(cfg: &NodeConfig) -> Result<Self, UploadError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(cfg.upload_timeout_secs))
            .build()?;

        Ok(Self {
            endpoint: cfg.upload_endpoint.clone(),
            api_key: cfg.imgbb_api_key.clone(),
            client,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Uploads `bytes` and returns where the host published them.
    ///
    /// The image is public as soon as this succeeds. Nothing here undoes that
    /// if the caller's next step fails.
    pub async fn upload(&self, bytes: &[u8], filename: &str) -> Result<UploadedImage, UploadError> {
        if bytes.is_empty() {
            return Err(UploadError::EmptyPayload);
        }

        let started = Instant::now();
        let result = self.send(bytes, filename).await;
        metrics::histogram!("badge_upload_duration_seconds", started.elapsed().as_secs_f64());

        match &result {
            Ok(image) => {
                metrics::increment_counter!("badge_uploads_total");
                tracing::info!("Uploaded {} ({} bytes) to {}", filename, bytes.len(), image.url);
            }
            Err(e) => {
                metrics::increment_counter!("badge_upload_failures_total");
                tracing::error!("Upload of {} failed: {}", filename, e);
            }
        }
        result
    }

    async fn send(&self, bytes: &[u8], filename: &str) -> Result<UploadedImage, UploadError> {
        let mut form = Form::new()
            .text("key", self.api_key.clone())
            .text("image", STANDARD.encode(bytes));
        if let Some(name) = image_name(filename) {
            form = form.text("name", name);
        }

        let resp = self.client.post(&self.endpoint).multipart(form).send().await?;
        let status = resp.status();

        // The host answers errors with a JSON body too, so decode before
        // looking at the status.
        let body: HostResponse = resp.json().await.map_err(|e| {
            if status.is_success() {
                UploadError::Malformed(e.to_string())
            } else {
                UploadError::Status(status)
            }
        })?;

        if !body.success {
            return Err(UploadError::Rejected);
        }
        body.data
            .ok_or_else(|| UploadError::Malformed("missing data".to_string()))
    }
}

/// File stem used as the hosted image's title.
fn image_name(filename: &str) -> Option<String> {
    let stem = std::path::Path::new(filename).file_stem()?.to_str()?.trim();
    if stem.is_empty() {
        None
    } else {
        Some(stem.to_string())
    }
}
