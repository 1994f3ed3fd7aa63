// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
use badge_kernel::BadgeCollection;
use reqwest::header::{ETAG, IF_MATCH};
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Response, Url};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClientError {
    /// Message the server put in its `error` field.
    #[error("{0}")]
    Server(String),
    #[error("Request failed: {0}")]
    Network(#[from] reqwest::Error),
    #[error("Invalid server url: {0}")]
    InvalidUrl(String),
}

/// A fetched collection and the version tag the server attached to it.
#[derive(Debug, Clone, Default)]
pub struct Listing {
    pub badges: BadgeCollection,
    pub etag: Option<String>,
}

/// The REST surface the controller talks to.
#[allow(async_fn_in_trait)]
pub trait BadgeApi {
    async fn list(&self) -> Result<Listing, ClientError>;
    async fn add(&self, user_id: &str, tooltip: &str, badge: &str) -> Result<(), ClientError>;
    /// `etag` is sent as `If-Match` so a delete against a stale list is refused.
    async fn delete(&self, user_id: &str, index: usize, etag: Option<&str>) -> Result<(), ClientError>;
    /// Returns the public URL of the uploaded image.
    async fn upload(&self, bytes: Vec<u8>, filename: &str) -> Result<String, ClientError>;
}

#[derive(Serialize)]
struct AddBadgeBody<'a> {
    #[serde(rename = "userId")]
    user_id: &'a str,
    tooltip: &'a str,
    badge: &'a str,
}

#[derive(Deserialize)]
struct ErrorBody {
    error: String,
}

#[derive(Deserialize)]
struct UploadBody {
    url: String,
}

#[derive(Debug, Clone)]
pub struct HttpBadgeApi {
    base_url: Url,
    client: Client,
}

impl HttpBadgeApi {
    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        let base_url = Url::parse(base_url).map_err(|e| ClientError::InvalidUrl(format!("{}: {}", base_url, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(ClientError::InvalidUrl(base_url.to_string()));
        }
        Ok(Self {
            base_url,
            client: Client::new(),
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Appends path segments, percent-encoding each one.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, ClientError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ClientError::InvalidUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn check(resp: Response) -> Result<Response, ClientError> {
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }
        match resp.json::<ErrorBody>().await {
            Ok(body) => Err(ClientError::Server(body.error)),
            Err(_) => Err(ClientError::Server(format!("Request failed with status {}", status))),
        }
    }
}

impl BadgeApi for HttpBadgeApi {
    async fn list(&self) -> Result<Listing, ClientError> {
        let url = self.endpoint(&["api", "badges"])?;
        let resp = Self::check(self.client.get(url).send().await?).await?;

        let etag = resp
            .headers()
            .get(ETAG)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let badges = resp.json().await?;
        Ok(Listing { badges, etag })
    }

    async fn add(&self, user_id: &str, tooltip: &str, badge: &str) -> Result<(), ClientError> {
        let url = self.endpoint(&["api", "badges"])?;
        let body = AddBadgeBody { user_id, tooltip, badge };
        Self::check(self.client.post(url).json(&body).send().await?).await?;
        Ok(())
    }

    async fn delete(&self, user_id: &str, index: usize, etag: Option<&str>) -> Result<(), ClientError> {
        let index = index.to_string();
        let url = self.endpoint(&["api", "badges", user_id, &index])?;

        let mut req = self.client.delete(url);
        if let Some(etag) = etag {
            req = req.header(IF_MATCH, etag);
        }
        Self::check(req.send().await?).await?;
        Ok(())
    }

    async fn upload(&self, bytes: Vec<u8>, filename: &str) -> Result<String, ClientError> {
        let url = self.endpoint(&["api", "upload"])?;
        let part = Part::bytes(bytes).file_name(filename.to_string());
        let form = Form::new().part("image", part);

        let resp = Self::check(self.client.post(url).multipart(form).send().await?).await?;
        let body: UploadBody = resp.json().await?;
        Ok(body.url)
    }
}
