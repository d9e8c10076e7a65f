use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::config;
use crate::shared::error::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Success,
    Error,
}

/// Transient, auto-dismissing message shown on the page after an action
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub message: String,
    pub kind: NotificationKind,
    #[serde(with = "millis")]
    pub dismiss_after: Duration,
}

impl Notification {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            kind: NotificationKind::Success,
            dismiss_after: config::NOTIFICATION_DISMISS_AFTER,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            kind: NotificationKind::Error,
            dismiss_after: config::NOTIFICATION_DISMISS_AFTER,
        }
    }

    pub fn is_error(&self) -> bool {
        self.kind == NotificationKind::Error
    }
}

impl From<&AppError> for Notification {
    fn from(err: &AppError) -> Self {
        Notification::error(err.to_string())
    }
}

mod millis {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        Ok(Duration::from_millis(u64::deserialize(deserializer)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_notification_from_app_error() {
        let n = Notification::from(&AppError::NoSelection);
        assert!(n.is_error());
        assert_eq!(n.message, "Select some text to translate.");
        assert_eq!(n.dismiss_after, Duration::from_secs(3));
    }

    #[test]
    fn test_serializes_dismiss_in_millis() {
        let json = serde_json::to_value(Notification::success("done")).unwrap();
        assert_eq!(json["kind"], "success");
        assert_eq!(json["dismiss_after"], 3000);
    }
}
