use std::sync::{Arc, Mutex};
use tracing::{info, warn};

use super::events::Notification;

/// Surface for notifications raised by the page session
pub trait Notifier: Send + Sync {
    fn notify(&self, notification: &Notification);
}

/// Writes notifications to the log
#[derive(Debug, Clone, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, notification: &Notification) {
        if notification.is_error() {
            warn!(message = %notification.message, "notification");
        } else {
            info!(message = %notification.message, "notification");
        }
    }
}

/// Keeps every notification, for hosts that render them later
#[derive(Debug, Clone, Default)]
pub struct RecordingNotifier {
    seen: Arc<Mutex<Vec<Notification>>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notifications(&self) -> Vec<Notification> {
        match self.seen.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn last(&self) -> Option<Notification> {
        self.notifications().pop()
    }

    pub fn clone_arc(&self) -> Self {
        Self {
            seen: Arc::clone(&self.seen),
        }
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notification: &Notification) {
        let mut seen = match self.seen.lock() {
            Ok(guard) => guard,
            Err(poisoned) => {
                warn!("notification mutex poisoned, recovering");
                poisoned.into_inner()
            }
        };
        seen.push(notification.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_notifier_shares_buffer() {
        let notifier = RecordingNotifier::new();
        let handle = notifier.clone_arc();

        notifier.notify(&Notification::success("one"));
        notifier.notify(&Notification::error("two"));

        let seen = handle.notifications();
        assert_eq!(seen.len(), 2);
        assert!(handle.last().is_some_and(|n| n.is_error()));
    }
}
