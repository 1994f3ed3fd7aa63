// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! JSON-file persistence for the badge collection.
//!
//! The whole collection is the unit of read and write. Reads go straight to
//! disk every time; writes replace the file through a temporary sibling and a
//! rename, so a reader only ever sees a complete document.

use std::ffi::OsString;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use badge_kernel::verify::{collection_fingerprint, Fingerprint};
use badge_kernel::{Badge, BadgeCollection, NewBadge};
use thiserror::Error;
use tokio::sync::Mutex;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Badge not found")]
    NotFound,
    #[error("Badge list changed since it was read")]
    Stale,
    #[error("Badge file is not valid JSON: {0}")]
    Corrupt(#[source] serde_json::Error),
    #[error("Failed to encode badges: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub struct BadgeStore {
    path: PathBuf,
    tmp_path: PathBuf,
    // Held across every read-modify-write so concurrent mutations cannot
    // overwrite each other.
    write_lock: Mutex<()>,
}

impl BadgeStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let mut tmp_name = path
            .file_name()
            .map(|name| name.to_os_string())
            .unwrap_or_else(|| OsString::from("badges.json"));
        tmp_name.push(".tmp");
        let tmp_path = path.with_file_name(tmp_name);

        Self {
            path,
            tmp_path,
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Writes an empty document if none exists. Returns whether one was created.
    pub async fn ensure_exists(&self) -> Result<bool, StoreError> {
        let _guard = self.write_lock.lock().await;
        if tokio::fs::try_exists(&self.path).await? {
            return Ok(false);
        }
        self.persist(&BadgeCollection::new()).await?;
        Ok(true)
    }

    /// Loads the persisted collection. A missing or unreadable document reads
    /// as empty; the failure is logged and counted, never returned.
    pub async fn read_all(&self) -> BadgeCollection {
        match self.load().await {
            Ok(collection) => collection,
            Err(e) => {
                tracing::error!("Failed to read badges from {:?}: {}", self.path, e);
                metrics::increment_counter!("badge_store_read_failures_total");
                BadgeCollection::new()
            }
        }
    }

    async fn load(&self) -> Result<BadgeCollection, StoreError> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) => serde_json::from_slice(&bytes).map_err(StoreError::Corrupt),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(BadgeCollection::new()),
            Err(e) => Err(e.into()),
        }
    }

    /// Appends the badge to its user's sequence and rewrites the document.
    ///
    /// Unlike reads, mutations refuse to start from an unreadable document so
    /// its contents are never overwritten with an empty collection.
    pub async fn add_badge(&self, new: NewBadge) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock().await;

        let mut collection = self.load().await?;
        tracing::debug!("Adding badge {:?} for user {}", new.badge.tooltip, new.user_id);
        collection.insert(new);

        self.persist(&collection).await
    }

    pub async fn delete_badge(&self, user_id: &str, index: usize) -> Result<Badge, StoreError> {
        self.delete_badge_if(user_id, index, |_| true).await
    }

    /// Removes the badge at `index` if `precondition` accepts the fingerprint
    /// of the collection as currently persisted.
    pub async fn delete_badge_if<F>(
        &self,
        user_id: &str,
        index: usize,
        precondition: F,
    ) -> Result<Badge, StoreError>
    where
        F: FnOnce(&Fingerprint) -> bool,
    {
        let _guard = self.write_lock.lock().await;

        let mut collection = self.load().await?;
        if !precondition(&collection_fingerprint(&collection)) {
            return Err(StoreError::Stale);
        }

        let removed = collection
            .remove(user_id, index)
            .map_err(|_| StoreError::NotFound)?;
        tracing::debug!("Removing badge {} of user {}", index, user_id);

        self.persist(&collection).await?;
        Ok(removed)
    }

    async fn persist(&self, collection: &BadgeCollection) -> Result<(), StoreError> {
        let data = serde_json::to_vec_pretty(collection)?;

        let result = async {
            tokio::fs::write(&self.tmp_path, &data).await?;
            tokio::fs::rename(&self.tmp_path, &self.path).await
        }
        .await;

        if let Err(e) = result {
            tracing::error!("Failed to write badges to {:?}: {}", self.path, e);
            metrics::increment_counter!("badge_store_write_failures_total");
            let _ = tokio::fs::remove_file(&self.tmp_path).await;
            return Err(e.into());
        }
        Ok(())
    }
}
