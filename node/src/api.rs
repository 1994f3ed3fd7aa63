// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
use serde::{Deserialize, Deserializer, Serialize};

/// Body of `POST /api/badges`. Fields are optional here so that a missing
/// field is reported as a validation error rather than a decode failure.
#[derive(Deserialize, Serialize, Debug, Default)]
pub struct AddBadgeRequest {
    /// Numeric ids are accepted and stored in their decimal form.
    #[serde(rename = "userId", default, deserialize_with = "string_or_number")]
    pub user_id: Option<String>,
    pub tooltip: Option<String>,
    pub badge: Option<String>,
}

fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum UserId {
        Text(String),
        Number(serde_json::Number),
    }

    Ok(Option::<UserId>::deserialize(deserializer)?.map(|id| match id {
        UserId::Text(text) => text,
        UserId::Number(number) => number.to_string(),
    }))
}

#[derive(Serialize, Deserialize, Debug)]
pub struct MessageResponse {
    pub success: bool,
    pub message: String,
}

impl MessageResponse {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }
}

#[derive(Serialize, Deserialize, Debug)]
pub struct UploadResponse {
    pub success: bool,
    pub url: String,
    pub display_url: String,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct HealthResponse {
    pub status: String,
}
