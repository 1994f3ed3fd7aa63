// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
#![allow(dead_code)]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;

use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::post;
use axum::{Json, Router};
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use badge_node::config::NodeConfig;
use badge_node::relay::UploadRelay;
use badge_node::server::{build_router, AppState};
use badge_node::store::BadgeStore;
use serde_json::json;
use tokio::net::TcpListener;

pub const TEST_KEY: &str = "test-key";

/// How the stub image host answers.
#[derive(Clone, Copy)]
pub enum HostMode {
    Accept,
    Reject,
    Garbage,
    Slow(Duration),
}

async fn stub_upload(State(mode): State<HostMode>, mut multipart: Multipart) -> axum::response::Response {
    let mut fields = HashMap::new();
    while let Ok(Some(field)) = multipart.next_field().await {
        let name = field.name().unwrap_or_default().to_string();
        let value = field.text().await.unwrap_or_default();
        fields.insert(name, value);
    }

    match mode {
        HostMode::Accept => {}
        HostMode::Reject => {
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({"success": false, "status_code": 400, "error": {"message": "Invalid API v1 key."}})),
            )
                .into_response()
        }
        HostMode::Garbage => return (StatusCode::BAD_GATEWAY, "<html>oops</html>").into_response(),
        HostMode::Slow(delay) => tokio::time::sleep(delay).await,
    }

    let image_ok = fields
        .get("image")
        .is_some_and(|image| !image.is_empty() && STANDARD.decode(image).is_ok());
    if fields.get("key").map(String::as_str) != Some(TEST_KEY) || !image_ok {
        return (StatusCode::BAD_REQUEST, Json(json!({"success": false}))).into_response();
    }

    let name = fields.get("name").cloned().unwrap_or_else(|| "image".to_string());
    Json(json!({
        "success": true,
        "status": 200,
        "data": {
            "url": format!("https://i.example/abc/{}.png", name),
            "display_url": format!("https://i.example/abc/{}-display.png", name),
        }
    }))
    .into_response()
}

/// Serves a stand-in for the image host on an ephemeral port.
pub async fn spawn_image_host(mode: HostMode) -> SocketAddr {
    let app = Router::new()
        .route("/1/upload", post(stub_upload))
        .with_state(mode);
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

pub fn test_config(badges_path: &Path, host: Option<SocketAddr>) -> NodeConfig {
    let mut cfg = NodeConfig::default();
    cfg.badges_path = badges_path.to_path_buf();
    cfg.imgbb_api_key = TEST_KEY.to_string();
    cfg.upload_timeout_secs = 1;
    cfg.upload_endpoint = match host {
        Some(addr) => format!("http://{}/1/upload", addr),
        // Nothing listens on port 9 locally; uploads fail fast.
        None => "http://127.0.0.1:9/1/upload".to_string(),
    };
    cfg
}

pub fn test_app(cfg: &NodeConfig) -> Router {
    let store = BadgeStore::new(&cfg.badges_path);
    let relay = UploadRelay::new(cfg).unwrap();
    build_router(AppState::new(store, relay), cfg.max_upload_bytes)
}

pub fn multipart_body(field: &str, filename: &str, bytes: &[u8]) -> (String, Vec<u8>) {
    let boundary = "XBADGEBOUNDARYX";
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{}\r\n", boundary).as_bytes());
    body.extend_from_slice(
        format!(
            "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: image/png\r\n\r\n",
            field, filename
        )
        .as_bytes(),
    );
    body.extend_from_slice(bytes);
    body.extend_from_slice(format!("\r\n--{}--\r\n", boundary).as_bytes());
    (format!("multipart/form-data; boundary={}", boundary), body)
}
