//! Notices
//!
//! 操作结果的用户提示。控制器只负责发布，由前端决定如何展示
//! (CLI 打印到 stderr)。

use std::sync::Arc;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use shared::{AppError, ErrorKind};

/// Notice severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Info,
    Success,
    Warning,
    Error,
}

impl NoticeLevel {
    /// Severity used to report an error of `kind`
    pub fn for_kind(kind: ErrorKind) -> Self {
        match kind {
            ErrorKind::Validation | ErrorKind::Busy => Self::Warning,
            ErrorKind::Superseded => Self::Info,
            _ => Self::Error,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Success => "ok",
            Self::Warning => "warning",
            Self::Error => "error",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            message: message.into(),
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            message: message.into(),
        }
    }

    pub fn from_error(err: &AppError) -> Self {
        Self {
            level: NoticeLevel::for_kind(err.kind),
            message: err.message.clone(),
        }
    }
}

impl std::fmt::Display for Notice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.level.label(), self.message)
    }
}

/// Shared queue of notices, drained by the front end
#[derive(Debug, Clone, Default)]
pub struct NoticeBoard {
    inner: Arc<Mutex<Vec<Notice>>>,
}

impl NoticeBoard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn publish(&self, notice: Notice) {
        tracing::debug!(level = notice.level.label(), message = %notice.message, "notice");
        self.inner.lock().push(notice);
    }

    pub fn success(&self, message: impl Into<String>) {
        self.publish(Notice::success(message));
    }

    pub fn error(&self, err: &AppError) {
        self.publish(Notice::from_error(err));
    }

    /// Take every pending notice
    pub fn drain(&self) -> Vec<Notice> {
        std::mem::take(&mut *self.inner.lock())
    }

    pub fn last(&self) -> Option<Notice> {
        self.inner.lock().last().cloned()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }
}
