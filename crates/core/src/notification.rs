use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationLevel {
    Success,
    Error,
}

/// Transient message surfaced to the user after an action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub level: NotificationLevel,
    pub message: String,
}

impl Notification {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Error,
            message: message.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.level == NotificationLevel::Error
    }
}

/// Generic failure text, extended with the backend's `message` when it sent one.
///
/// A generic text that already ends a sentence gets the message as a new
/// sentence instead of after a colon.
pub fn failure_message(generic: &str, backend_message: Option<&str>) -> String {
    match backend_message.map(str::trim).filter(|m| !m.is_empty()) {
        Some(message) if generic.ends_with(|c: char| matches!(c, '.' | '!' | '?')) => {
            format!("{generic} {message}")
        }
        Some(message) => format!("{generic}: {message}"),
        None => generic.to_string(),
    }
}
