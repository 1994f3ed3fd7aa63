// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

pub const MISSING_FIELDS: &str = "Missing required fields: userId, tooltip, badge";
pub const NO_IMAGE: &str = "No image file provided";
pub const UPLOAD_FAILED: &str = "Failed to upload image";
pub const HOST_REJECTED: &str = "Failed to upload image to ImgBB";

/// Request-level failures. Every variant renders as `{"error": "..."}`.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),
    #[error("Badge not found")]
    NotFound,
    #[error("Badge list changed, reload and try again")]
    Stale,
    #[error("Image is larger than the upload limit")]
    TooLarge,
    #[error("{0}")]
    Persistence(String),
    #[error("{0}")]
    Upload(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::Stale => StatusCode::PRECONDITION_FAILED,
            ApiError::TooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::Persistence(_) | ApiError::Upload(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = Json(json!({
            "error": self.to_string()
        }));

        (status, body).into_response()
    }
}
