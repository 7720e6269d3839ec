//! User-facing notices.
//!
//! DESIGN
//! ======
//! Controllers never touch a shared global message list. They receive a
//! `Notifier` and call `notify`; the `NoticeBoard` implementation keeps at most
//! one notice, so each new notice replaces the previous one.

#[cfg(test)]
#[path = "notice_test.rs"]
mod notice_test;

use std::sync::{Mutex, PoisonError};

/// Severity of a notice.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum NoticeLevel {
    #[default]
    Info,
    Warning,
    Alarm,
}

impl NoticeLevel {
    /// Bootstrap background class used by the web templates.
    #[must_use]
    pub fn css_class(self) -> &'static str {
        match self {
            Self::Info => "bg-success",
            Self::Warning => "bg-warning",
            Self::Alarm => "bg-danger",
        }
    }
}

/// A transient, dismissable message.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notice {
    pub message: String,
    pub level: NoticeLevel,
}

/// Notification port injected into controllers and the session gate.
pub trait Notifier: Send + Sync {
    fn notify(&self, message: &str, level: NoticeLevel);
}

/// Single-slot notice holder.
#[derive(Debug, Default)]
pub struct NoticeBoard {
    current: Mutex<Option<Notice>>,
}

impl NoticeBoard {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The notice currently shown, if any.
    #[must_use]
    pub fn current(&self) -> Option<Notice> {
        self.current.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn dismiss(&self) {
        *self.current.lock().unwrap_or_else(PoisonError::into_inner) = None;
    }
}

impl Notifier for NoticeBoard {
    fn notify(&self, message: &str, level: NoticeLevel) {
        match level {
            NoticeLevel::Alarm => tracing::warn!(message, "notice"),
            NoticeLevel::Info | NoticeLevel::Warning => tracing::info!(message, ?level, "notice"),
        }
        *self.current.lock().unwrap_or_else(PoisonError::into_inner) =
            Some(Notice { message: message.to_owned(), level });
    }
}
