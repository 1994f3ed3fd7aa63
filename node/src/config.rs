// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
use std::env;
use std::fmt::{self, Display};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;

use tracing::{info, warn};

pub const DEFAULT_PORT: u16 = 4000;
pub const DEFAULT_UPLOAD_ENDPOINT: &str = "https://api.imgbb.com/1/upload";
/// ImgBB rejects anything above 32 MiB.
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 32 * 1024 * 1024;

#[derive(Clone)]
pub struct NodeConfig {
    pub bind_addr: SocketAddr,
    pub badges_path: PathBuf,
    pub imgbb_api_key: String,
    pub upload_endpoint: String,
    pub upload_timeout_secs: u64,
    pub max_upload_bytes: usize,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], DEFAULT_PORT)),
            badges_path: PathBuf::from("badges.json"),
            imgbb_api_key: String::new(),
            upload_endpoint: DEFAULT_UPLOAD_ENDPOINT.to_string(),
            upload_timeout_secs: 30,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }
}

impl NodeConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Applies overrides from `lookup` on top of the defaults. Invalid values
    /// are logged and ignored.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut cfg = Self::default();

        let port = parse_or(&lookup, "PORT", DEFAULT_PORT);
        cfg.bind_addr.set_port(port);
        cfg.bind_addr = parse_or(&lookup, "BIND_ADDR", cfg.bind_addr);

        if let Some(path) = lookup("BADGES_FILE").filter(|p| !p.trim().is_empty()) {
            cfg.badges_path = PathBuf::from(path);
        }

        match lookup("IMGBB_API_KEY") {
            Some(key) if !key.trim().is_empty() => cfg.imgbb_api_key = key.trim().to_string(),
            _ => warn!("IMGBB_API_KEY not set, image uploads will be rejected by the host"),
        }

        if let Some(endpoint) = lookup("IMGBB_ENDPOINT").filter(|e| !e.trim().is_empty()) {
            cfg.upload_endpoint = endpoint.trim().to_string();
        }

        cfg.upload_timeout_secs = parse_or(&lookup, "UPLOAD_TIMEOUT_SECS", cfg.upload_timeout_secs);
        cfg.max_upload_bytes = parse_or(&lookup, "MAX_UPLOAD_BYTES", cfg.max_upload_bytes);

        cfg
    }
}

fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> T
where
    T: FromStr + Display,
    T::Err: Display,
{
    let Some(raw) = lookup(key) else {
        info!("{key} not set, using default: {default}");
        return default;
    };

    raw.trim().parse().unwrap_or_else(|e| {
        warn!("Invalid {key} value {raw:?}: {e}, using default: {default}");
        default
    })
}

// Hand-written so the API key never reaches the logs.
impl fmt::Debug for NodeConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeConfig")
            .field("bind_addr", &self.bind_addr)
            .field("badges_path", &self.badges_path)
            .field("imgbb_api_key", &if self.imgbb_api_key.is_empty() { "<unset>" } else { "<redacted>" })
            .field("upload_endpoint", &self.upload_endpoint)
            .field("upload_timeout_secs", &self.upload_timeout_secs)
            .field("max_upload_bytes", &self.max_upload_bytes)
            .finish()
    }
}
