// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Dashboard view-model. Everything here is synchronous and side-effect free;
//! network work lives in the controller.

use std::time::{Duration, Instant};

use badge_kernel::BadgeCollection;

/// How long a toast stays up.
pub const TOAST_DURATION: Duration = Duration::from_secs(3);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastKind {
    Success,
    /// Something went wrong after the operator's change was saved.
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub message: String,
    pub kind: ToastKind,
    pub shown_at: Instant,
}

/// Where the badge image comes from. URL and file are mutually exclusive.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum BadgeSource {
    #[default]
    None,
    Url(String),
    File { name: String, bytes: Vec<u8> },
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AddForm {
    pub user_id: String,
    pub tooltip: String,
    pub source: BadgeSource,
}

impl AddForm {
    pub fn url_enabled(&self) -> bool {
        !matches!(self.source, BadgeSource::File { .. })
    }

    pub fn file_enabled(&self) -> bool {
        !matches!(self.source, BadgeSource::Url(_))
    }

    /// Ignored while a file is attached. A blank URL re-enables the file input.
    pub fn set_url(&mut self, url: String) {
        if !self.url_enabled() {
            return;
        }
        self.source = if url.trim().is_empty() {
            BadgeSource::None
        } else {
            BadgeSource::Url(url)
        };
    }

    /// Replaces any typed URL. Ignored while a URL is entered.
    pub fn attach_file(&mut self, name: String, bytes: Vec<u8>) {
        if !self.file_enabled() {
            return;
        }
        self.source = BadgeSource::File { name, bytes };
    }

    pub fn detach_file(&mut self) {
        if matches!(self.source, BadgeSource::File { .. }) {
            self.source = BadgeSource::None;
        }
    }
}

/// Next network step of an add. Each stage is one round-trip, so the view
/// can be rendered between them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitStage {
    Upload { name: String, bytes: Vec<u8> },
    Save { badge_url: String },
    Refresh,
}

/// An add in flight, with the form values it was started from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    pub user_id: String,
    pub tooltip: String,
    pub stage: SubmitStage,
}

/// The badge awaiting delete confirmation, with what the modal shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingDelete {
    pub user_id: String,
    pub index: usize,
    pub tooltip: String,
    pub badge_url: String,
}

#[derive(Debug, Clone, Default)]
pub struct Session {
    /// Last collection fetched from the server, unfiltered.
    pub badges: BadgeCollection,
    /// Version tag of `badges`, echoed back on delete.
    pub etag: Option<String>,
    pub search: String,
    pub form: AddForm,
    pub pending_delete: Option<PendingDelete>,
    /// Image URL shown enlarged, if the preview is open.
    pub preview: Option<String>,
    pub toast: Option<Toast>,
    pub submission: Option<Submission>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_listing(&mut self, badges: BadgeCollection, etag: Option<String>) {
        self.badges = badges;
        self.etag = etag;
    }

    /// True from `Submit` until the add has finished, successfully or not.
    pub fn is_busy(&self) -> bool {
        self.submission.is_some()
    }

    pub fn is_uploading(&self) -> bool {
        matches!(
            self.submission,
            Some(Submission { stage: SubmitStage::Upload { .. }, .. })
        )
    }

    /// Shows `message`, replacing whatever toast is up.
    pub fn notify(&mut self, message: impl Into<String>, kind: ToastKind, now: Instant) {
        self.toast = Some(Toast {
            message: message.into(),
            kind,
            shown_at: now,
        });
    }

    /// Drops the toast once it has been visible for [`TOAST_DURATION`].
    pub fn tick(&mut self, now: Instant) {
        let expired = self
            .toast
            .as_ref()
            .is_some_and(|t| now.saturating_duration_since(t.shown_at) >= TOAST_DURATION);
        if expired {
            self.toast = None;
        }
    }

    pub fn search_term(&self) -> Option<&str> {
        let term = self.search.trim();
        (!term.is_empty()).then_some(term)
    }

    pub fn set_search(&mut self, term: String) {
        self.search = term;
    }

    pub fn clear_search(&mut self) {
        self.search.clear();
    }

    /// The collection as currently displayed.
    pub fn visible_badges(&self) -> BadgeCollection {
        match self.search_term() {
            Some(term) => self.badges.filter_by_user(term),
            None => self.badges.clone(),
        }
    }

    pub fn open_preview(&mut self, url: String) {
        self.preview = Some(url);
    }

    /// Overlay click and the close control both end up here.
    pub fn close_preview(&mut self) {
        self.preview = None;
    }

    /// Opens the confirmation modal for a badge in the displayed list.
    /// Returns false if no such badge is known.
    pub fn request_delete(&mut self, user_id: &str, index: usize) -> bool {
        let Some(badge) = self.badges.get(user_id, index) else {
            return false;
        };
        self.pending_delete = Some(PendingDelete {
            user_id: user_id.to_string(),
            index,
            tooltip: badge.tooltip.clone(),
            badge_url: badge.badge.clone(),
        });
        true
    }

    pub fn cancel_delete(&mut self) {
        self.pending_delete = None;
    }

    /// Escape closes both dialogs.
    pub fn escape(&mut self) {
        self.close_preview();
        self.cancel_delete();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use badge_kernel::Badge;

    fn session_with(users: &[(&str, &str)]) -> Session {
        let mut s = Session::new();
        let mut c = BadgeCollection::new();
        for (user, tooltip) in users {
            c.push(*user, Badge::new(*tooltip, format!("http://x/{}.png", tooltip)));
        }
        s.set_listing(c, Some("\"v1\"".to_string()));
        s
    }

    #[test]
    fn test_url_and_file_are_exclusive() {
        let mut form = AddForm::default();
        form.set_url("http://x/a.png".to_string());
        assert!(!form.file_enabled());
        form.attach_file("a.png".to_string(), vec![1]);
        assert_eq!(form.source, BadgeSource::Url("http://x/a.png".to_string()));

        form.set_url("  ".to_string());
        assert!(form.file_enabled());
        form.attach_file("a.png".to_string(), vec![1]);
        assert!(!form.url_enabled());
        form.set_url("http://ignored".to_string());
        assert!(matches!(form.source, BadgeSource::File { .. }));

        form.detach_file();
        assert!(form.url_enabled() && form.file_enabled());
    }

    #[test]
    fn test_toast_replaced_not_queued() {
        let mut s = Session::new();
        let t0 = Instant::now();
        s.notify("first", ToastKind::Success, t0);
        s.notify("second", ToastKind::Error, t0);
        assert_eq!(s.toast.as_ref().unwrap().message, "second");
    }

    #[test]
    fn test_toast_expires_after_duration() {
        let mut s = Session::new();
        let t0 = Instant::now();
        s.notify("hello", ToastKind::Success, t0);

        s.tick(t0 + Duration::from_millis(2999));
        assert!(s.toast.is_some());
        s.tick(t0 + TOAST_DURATION);
        assert!(s.toast.is_none());
    }

    #[test]
    fn test_replacement_restarts_timer() {
        let mut s = Session::new();
        let t0 = Instant::now();
        s.notify("first", ToastKind::Success, t0);
        s.notify("second", ToastKind::Success, t0 + Duration::from_secs(2));

        s.tick(t0 + Duration::from_secs(4));
        assert_eq!(s.toast.as_ref().unwrap().message, "second");
    }

    #[test]
    fn test_search_filters_user_ids() {
        let mut s = session_with(&[("100", "a"), ("200", "b")]);
        s.set_search("10".to_string());
        let visible = s.visible_badges();
        assert!(visible.contains_user("100"));
        assert!(!visible.contains_user("200"));

        s.set_search("   ".to_string());
        assert_eq!(s.visible_badges().user_count(), 2);
        s.set_search("zzz".to_string());
        assert!(s.visible_badges().is_empty());
        s.clear_search();
        assert_eq!(s.visible_badges().user_count(), 2);
    }

    #[test]
    fn test_request_delete_captures_badge() {
        let mut s = session_with(&[("42", "a"), ("42", "b")]);
        assert!(s.request_delete("42", 1));
        let pending = s.pending_delete.clone().unwrap();
        assert_eq!(pending.tooltip, "b");
        assert_eq!(pending.badge_url, "http://x/b.png");

        assert!(!s.request_delete("42", 5));
        assert_eq!(s.pending_delete, Some(pending));
    }

    #[test]
    fn test_escape_closes_both_modals() {
        let mut s = session_with(&[("42", "a")]);
        s.open_preview("http://x/a.png".to_string());
        s.request_delete("42", 0);

        s.escape();
        assert!(s.preview.is_none());
        assert!(s.pending_delete.is_none());
    }

    #[test]
    fn test_busy_follows_submission_stage() {
        let mut s = Session::new();
        assert!(!s.is_busy());

        s.submission = Some(Submission {
            user_id: "42".to_string(),
            tooltip: "VIP".to_string(),
            stage: SubmitStage::Upload { name: "a.png".to_string(), bytes: vec![1] },
        });
        assert!(s.is_busy() && s.is_uploading());

        if let Some(sub) = s.submission.as_mut() {
            sub.stage = SubmitStage::Save { badge_url: "http://x/a.png".to_string() };
        }
        assert!(s.is_busy());
        assert!(!s.is_uploading());
    }

    #[test]
    fn test_modals_are_independent() {
        let mut s = session_with(&[("42", "a")]);
        s.open_preview("http://x/a.png".to_string());
        s.request_delete("42", 0);

        s.close_preview();
        assert!(s.pending_delete.is_some());
        s.open_preview("http://x/a.png".to_string());
        s.cancel_delete();
        assert!(s.preview.is_some());
    }
}
