// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
use std::time::Instant;

use crate::client::{BadgeApi, ClientError};
use crate::session::{AddForm, BadgeSource, Session, Submission, SubmitStage, ToastKind};

/// Operator input. Overlay clicks and close buttons map to the same
/// `Close*`/`Cancel*` commands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Reload,
    Search(String),
    ClearSearch,
    SetUserId(String),
    SetTooltip(String),
    SetUrl(String),
    AttachFile { name: String, bytes: Vec<u8> },
    DetachFile,
    /// Starts an add. Follow with `Advance` until the session is no longer busy.
    Submit,
    Advance,
    OpenPreview(String),
    ClosePreview,
    RequestDelete { user_id: String, index: usize },
    ConfirmDelete,
    CancelDelete,
    Escape,
    Tick,
}

pub struct Controller<A> {
    api: A,
    session: Session,
}

impl<A: BadgeApi> Controller<A> {
    pub fn new(api: A) -> Self {
        Self {
            api,
            session: Session::new(),
        }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub async fn handle(&mut self, command: Command, now: Instant) {
        match command {
            Command::Reload => self.reload(now).await,
            Command::Search(term) => self.session.set_search(term),
            Command::ClearSearch => self.session.clear_search(),
            Command::SetUserId(user_id) => self.session.form.user_id = user_id,
            Command::SetTooltip(tooltip) => self.session.form.tooltip = tooltip,
            Command::SetUrl(url) => self.session.form.set_url(url),
            Command::AttachFile { name, bytes } => self.session.form.attach_file(name, bytes),
            Command::DetachFile => self.session.form.detach_file(),
            Command::Submit => self.submit(now),
            Command::Advance => self.advance(now).await,
            Command::OpenPreview(url) => self.session.open_preview(url),
            Command::ClosePreview => self.session.close_preview(),
            Command::RequestDelete { user_id, index } => {
                if !self.session.request_delete(&user_id, index) {
                    self.session.notify("Badge not found", ToastKind::Error, now);
                }
            }
            Command::ConfirmDelete => self.confirm_delete(now).await,
            Command::CancelDelete => self.session.cancel_delete(),
            Command::Escape => self.session.escape(),
            Command::Tick => self.session.tick(now),
        }
    }

    async fn reload(&mut self, now: Instant) {
        match self.api.list().await {
            Ok(listing) => self.session.set_listing(listing.badges, listing.etag),
            Err(e) => {
                tracing::error!("Error loading badges: {}", e);
                self.session.notify("Failed to load badges", ToastKind::Error, now);
            }
        }
    }

    /// Validates the form and starts an add. The network work happens in
    /// later `Advance` commands.
    fn submit(&mut self, now: Instant) {
        if self.session.is_busy() {
            return;
        }

        let form = &self.session.form;
        let user_id = form.user_id.trim().to_string();
        let tooltip = form.tooltip.trim().to_string();
        let stage = match &form.source {
            BadgeSource::Url(url) if !url.trim().is_empty() => Some(SubmitStage::Save {
                badge_url: url.trim().to_string(),
            }),
            BadgeSource::File { name, bytes } if !bytes.is_empty() => Some(SubmitStage::Upload {
                name: name.clone(),
                bytes: bytes.clone(),
            }),
            _ => None,
        };

        if user_id.is_empty() || tooltip.is_empty() {
            self.session.notify("Please fill in all required fields", ToastKind::Error, now);
            return;
        }
        let Some(stage) = stage else {
            self.session.notify(
                "Please provide either a badge URL or upload an image",
                ToastKind::Error,
                now,
            );
            return;
        };

        self.session.submission = Some(Submission { user_id, tooltip, stage });
    }

    /// Runs the next stage of the add in flight, if any.
    async fn advance(&mut self, now: Instant) {
        let Some(submission) = self.session.submission.take() else {
            return;
        };
        let Submission { user_id, tooltip, stage } = submission;

        let next = match stage {
            // A failed add after a successful upload leaves the image hosted.
            SubmitStage::Upload { name, bytes } => match self.api.upload(bytes, &name).await {
                Ok(badge_url) => Some(SubmitStage::Save { badge_url }),
                Err(e) => {
                    tracing::error!("Error uploading image: {}", e);
                    self.session.notify(format!("Failed to add badge: {}", e), ToastKind::Error, now);
                    None
                }
            },
            SubmitStage::Save { badge_url } => {
                match self.api.add(&user_id, &tooltip, &badge_url).await {
                    Ok(()) => {
                        self.session.notify("Badge added successfully!", ToastKind::Success, now);
                        self.session.form = AddForm::default();
                        Some(SubmitStage::Refresh)
                    }
                    Err(ClientError::Server(message)) => {
                        self.session.notify(message, ToastKind::Error, now);
                        None
                    }
                    Err(e) => {
                        tracing::error!("Network error adding badge: {}", e);
                        self.session.notify(format!("Failed to add badge: {}", e), ToastKind::Error, now);
                        None
                    }
                }
            }
            SubmitStage::Refresh => {
                self.refresh_after_change(now).await;
                None
            }
        };

        self.session.submission = next.map(|stage| Submission { user_id, tooltip, stage });
    }

    /// Reload following a saved change. A failure here does not undo the
    /// change, so it is only a warning.
    async fn refresh_after_change(&mut self, now: Instant) {
        match self.api.list().await {
            Ok(listing) => self.session.set_listing(listing.badges, listing.etag),
            Err(e) => {
                tracing::warn!("Error reloading badges: {}", e);
                self.session.notify("Failed to load badges", ToastKind::Warning, now);
            }
        }
    }

    async fn confirm_delete(&mut self, now: Instant) {
        let Some(pending) = self.session.pending_delete.clone() else {
            return;
        };

        let etag = self.session.etag.clone();
        match self.api.delete(&pending.user_id, pending.index, etag.as_deref()).await {
            Ok(()) => {
                self.session.notify("Badge deleted successfully!", ToastKind::Success, now);
                self.session.cancel_delete();
                // Positions shift after a delete; never reuse the old list.
                self.refresh_after_change(now).await;
            }
            Err(ClientError::Server(message)) => {
                self.session.notify(message, ToastKind::Error, now);
            }
            Err(e) => {
                tracing::error!("Error deleting badge: {}", e);
                self.session.notify("Failed to delete badge", ToastKind::Error, now);
            }
        }
    }
}
