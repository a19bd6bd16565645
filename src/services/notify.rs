//! User-facing notification surface.
//!
//! Fire-and-forget transient messages with a severity; purely
//! presentational and never part of a correctness decision. Timer-driven
//! code (the offer simulator) notifies through this port since it has no
//! request to respond to.

use std::sync::Mutex;

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Success,
    Error,
    Info,
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct Notification {
    pub severity: Severity,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Notification {
    pub fn success(title: &str, description: Option<&str>) -> Self {
        Self {
            severity: Severity::Success,
            title: title.to_string(),
            description: description.map(str::to_string),
        }
    }

    pub fn error(title: &str, description: Option<&str>) -> Self {
        Self {
            severity: Severity::Error,
            title: title.to_string(),
            description: description.map(str::to_string),
        }
    }

    pub fn info(title: &str, description: Option<&str>) -> Self {
        Self {
            severity: Severity::Info,
            title: title.to_string(),
            description: description.map(str::to_string),
        }
    }
}

pub trait Notifier: Send + Sync {
    fn notify(&self, notification: Notification);
}

/// Production notifier: structured log lines.
#[derive(Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, notification: Notification) {
        match notification.severity {
            Severity::Error => tracing::warn!(
                title = %notification.title,
                description = notification.description.as_deref().unwrap_or(""),
                "notification"
            ),
            _ => tracing::info!(
                title = %notification.title,
                description = notification.description.as_deref().unwrap_or(""),
                "notification"
            ),
        }
    }
}

/// Test notifier that records everything it is handed.
#[derive(Default)]
pub struct RecordingNotifier {
    notifications: Mutex<Vec<Notification>>,
}

impl RecordingNotifier {
    pub fn taken(&self) -> Vec<Notification> {
        self.notifications
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Notifications with the given title.
    pub fn count_titled(&self, title: &str) -> usize {
        self.taken().iter().filter(|n| n.title == title).count()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notification: Notification) {
        self.notifications
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(notification);
    }
}
