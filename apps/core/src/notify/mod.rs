//! Notification sink boundary. The stores report successes, failures, and
//! confirmation requests here; the UI decides how to render them (toasts,
//! dialogs). Carried as `Arc<dyn NotificationSink>`.

use async_trait::async_trait;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeKind {
    Success,
    Error,
    Warning,
    Info,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
    pub title: Option<String>,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Success,
            message: message.into(),
            title: None,
        }
    }

    pub fn error(message: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Error,
            message: message.into(),
            title: Some(title.into()),
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Info,
            message: message.into(),
            title: None,
        }
    }
}

/// Yes/no gate shown before destructive actions.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfirmRequest {
    pub message: String,
    pub title: String,
    pub confirm_text: String,
    pub cancel_text: String,
    pub is_dangerous: bool,
}

impl ConfirmRequest {
    pub fn dangerous(message: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            title: title.into(),
            confirm_text: "Delete".to_string(),
            cancel_text: "Cancel".to_string(),
            is_dangerous: true,
        }
    }
}

#[async_trait]
pub trait NotificationSink: Send + Sync {
    fn notify(&self, notice: Notice);

    /// Resolves `true` when the user confirms. Destructive store actions
    /// must not reach the gateway unless this returned `true`.
    async fn confirm(&self, request: ConfirmRequest) -> bool;
}

/// Sink for headless use: logs notices and auto-confirms.
pub struct NullSink;

#[async_trait]
impl NotificationSink for NullSink {
    fn notify(&self, notice: Notice) {
        debug!(kind = ?notice.kind, "{}", notice.message);
    }

    async fn confirm(&self, _request: ConfirmRequest) -> bool {
        true
    }
}

/// Records every notice and answers confirms with a scripted response.
/// Used by the store tests; also handy for diagnosing a misbehaving UI.
pub struct RecordingSink {
    notices: Mutex<Vec<Notice>>,
    confirms: Mutex<Vec<ConfirmRequest>>,
    confirm_answer: AtomicBool,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::answering(true)
    }

    pub fn answering(confirm_answer: bool) -> Self {
        Self {
            notices: Mutex::new(Vec::new()),
            confirms: Mutex::new(Vec::new()),
            confirm_answer: AtomicBool::new(confirm_answer),
        }
    }

    pub fn set_confirm_answer(&self, answer: bool) {
        self.confirm_answer.store(answer, Ordering::SeqCst);
    }

    pub fn notices(&self) -> Vec<Notice> {
        self.notices.lock().clone()
    }

    pub fn confirms(&self) -> Vec<ConfirmRequest> {
        self.confirms.lock().clone()
    }

    pub fn count_of(&self, kind: NoticeKind) -> usize {
        self.notices.lock().iter().filter(|n| n.kind == kind).count()
    }
}

impl Default for RecordingSink {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl NotificationSink for RecordingSink {
    fn notify(&self, notice: Notice) {
        self.notices.lock().push(notice);
    }

    async fn confirm(&self, request: ConfirmRequest) -> bool {
        self.confirms.lock().push(request);
        self.confirm_answer.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_recording_sink_counts_by_kind() {
        let sink = RecordingSink::new();
        sink.notify(Notice::success("saved"));
        sink.notify(Notice::error("boom", "Update failed"));
        sink.notify(Notice::error("boom again", "Update failed"));
        assert_eq!(sink.count_of(NoticeKind::Success), 1);
        assert_eq!(sink.count_of(NoticeKind::Error), 2);
    }

    #[tokio::test]
    async fn test_recording_sink_scripts_confirm() {
        let sink = RecordingSink::answering(false);
        let req = ConfirmRequest::dangerous("Really?", "Delete");
        assert!(!sink.confirm(req.clone()).await);
        sink.set_confirm_answer(true);
        assert!(sink.confirm(req).await);
        assert_eq!(sink.confirms().len(), 2);
    }
}
