// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
use axum::{
    extract::{
        multipart::{MultipartError, MultipartRejection},
        rejection::JsonRejection,
        DefaultBodyLimit, Multipart, Path, State,
    },
    http::{header, Method, StatusCode},
    routing::{delete, get, post},
    Json, Router,
};
use axum_extra::TypedHeader;
use badge_kernel::verify::{collection_fingerprint, to_hex, Fingerprint};
use badge_kernel::{BadgeCollection, NewBadge};
use headers::{ETag, IfMatch};
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::api::*;
use crate::errors::{ApiError, HOST_REJECTED, MISSING_FIELDS, NO_IMAGE, UPLOAD_FAILED};
use crate::relay::{UploadError, UploadRelay};
use crate::store::{BadgeStore, StoreError};

/// Everything a handler needs. Cheap to clone.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<BadgeStore>,
    pub relay: Arc<UploadRelay>,
}

impl AppState {
    pub fn new(store: BadgeStore, relay: UploadRelay) -> Self {
        Self {
            store: Arc::new(store),
            relay: Arc::new(relay),
        }
    }
}

pub fn build_router(state: AppState, max_upload_bytes: usize) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::IF_MATCH])
        .expose_headers([header::ETAG])
        .max_age(Duration::from_secs(60 * 60));

    Router::new()
        .route("/api/badges", get(list_badges).post(add_badge))
        .route("/api/badges/:user_id/:index", delete(delete_badge))
        .route(
            "/api/upload",
            post(upload_image).layer(DefaultBodyLimit::max(max_upload_bytes)),
        )
        // Raw document, read by the bot that displays the badges
        .route("/badges.json", get(list_badges))
        // Observability
        .route("/health", get(health))
        .route("/metrics", get(metrics_handler))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

fn etag_for(fingerprint: &Fingerprint) -> Option<ETag> {
    format!("\"{}\"", to_hex(fingerprint)).parse().ok()
}

async fn list_badges(
    State(state): State<AppState>,
) -> (Option<TypedHeader<ETag>>, Json<BadgeCollection>) {
    let collection = state.store.read_all().await;
    let etag = etag_for(&collection_fingerprint(&collection)).map(TypedHeader);
    (etag, Json(collection))
}

async fn add_badge(
    State(state): State<AppState>,
    payload: Result<Json<AddBadgeRequest>, JsonRejection>,
) -> Result<Json<MessageResponse>, ApiError> {
    let Json(req) = payload.map_err(|e| {
        tracing::debug!("Rejected badge payload: {}", e);
        ApiError::Validation(MISSING_FIELDS.to_string())
    })?;

    let new = NewBadge::parse(
        req.user_id.as_deref(),
        req.tooltip.as_deref(),
        req.badge.as_deref(),
    )
    .map_err(|_| ApiError::Validation(MISSING_FIELDS.to_string()))?;
    let user_id = new.user_id.clone();

    state.store.add_badge(new).await.map_err(|e| {
        tracing::error!("Failed to save badge for {}: {}", user_id, e);
        ApiError::Persistence("Failed to save badge".to_string())
    })?;

    metrics::increment_counter!("badges_added_total");
    tracing::info!("Badge added for user {}", user_id);
    Ok(Json(MessageResponse::ok("Badge added successfully")))
}

async fn delete_badge(
    State(state): State<AppState>,
    Path((user_id, index)): Path<(String, String)>,
    if_match: Option<TypedHeader<IfMatch>>,
) -> Result<Json<MessageResponse>, ApiError> {
    // A non-numeric or negative position can never name a badge. Only plain
    // integers are accepted: "1.5" or "1abc" is not found rather than
    // truncated to 1.
    let index: usize = index.trim().parse().map_err(|_| ApiError::NotFound)?;

    let precondition = |fingerprint: &Fingerprint| match &if_match {
        Some(TypedHeader(expected)) => {
            etag_for(fingerprint).is_some_and(|current| expected.precondition_passes(&current))
        }
        None => true,
    };

    let removed = state
        .store
        .delete_badge_if(&user_id, index, precondition)
        .await
        .map_err(|e| match e {
            StoreError::NotFound => ApiError::NotFound,
            StoreError::Stale => ApiError::Stale,
            other => {
                tracing::error!("Failed to delete badge {} of {}: {}", index, user_id, other);
                ApiError::Persistence("Failed to delete badge".to_string())
            }
        })?;

    metrics::increment_counter!("badges_deleted_total");
    tracing::info!("Badge {:?} deleted for user {}", removed.tooltip, user_id);
    Ok(Json(MessageResponse::ok("Badge deleted successfully")))
}

async fn upload_image(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<UploadResponse>, ApiError> {
    let mut multipart = multipart.map_err(|e| {
        tracing::debug!("Rejected upload body: {}", e);
        ApiError::Validation(NO_IMAGE.to_string())
    })?;

    let mut image = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(multipart_error)?
    {
        if field.name() != Some("image") {
            continue;
        }
        let filename = field.file_name().unwrap_or("image").to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(multipart_error)?;
        image = Some((filename, bytes));
        break;
    }

    let (filename, bytes) = image
        .filter(|(_, bytes)| !bytes.is_empty())
        .ok_or_else(|| ApiError::Validation(NO_IMAGE.to_string()))?;

    let uploaded = state
        .relay
        .upload(&bytes, &filename)
        .await
        .map_err(|e| match e {
            UploadError::Rejected => ApiError::Upload(HOST_REJECTED.to_string()),
            _ => ApiError::Upload(UPLOAD_FAILED.to_string()),
        })?;

    Ok(Json(UploadResponse {
        success: true,
        url: uploaded.url,
        display_url: uploaded.display_url,
    }))
}

/// Keeps the framework's 413 for bodies over the limit; any other read
/// failure means no usable image arrived.
fn multipart_error(e: MultipartError) -> ApiError {
    tracing::debug!("Failed to read upload body: {}", e);
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ApiError::TooLarge
    } else {
        ApiError::Validation(NO_IMAGE.to_string())
    }
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}

async fn metrics_handler() -> String {
    crate::telemetry::get_metrics()
}
