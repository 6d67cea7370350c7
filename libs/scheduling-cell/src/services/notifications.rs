use chrono::{DateTime, Utc};
use tokio::sync::broadcast;
use tracing::debug;

use crate::models::SessionEvent;

pub type SessionEventSender = broadcast::Sender<SessionEvent>;
pub type SessionEventReceiver = broadcast::Receiver<SessionEvent>;

/// Fan-out channel for booking outcome notifications. The navigation
/// collaborator subscribes and reacts; sending with no live subscribers is
/// not an error.
pub struct SessionNotifier {
    sender: SessionEventSender,
}

impl SessionNotifier {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(16);
        Self { sender }
    }

    pub fn subscribe(&self) -> SessionEventReceiver {
        self.sender.subscribe()
    }

    pub fn notify_confirmed(&self, scheduled_for: DateTime<Utc>) {
        self.send(SessionEvent::BookingConfirmed { scheduled_for });
    }

    pub fn notify_failed(&self, message: impl Into<String>) {
        self.send(SessionEvent::BookingFailed {
            message: message.into(),
        });
    }

    fn send(&self, event: SessionEvent) {
        if let Err(e) = self.sender.send(event) {
            debug!("No subscribers for session event: {}", e);
        }
    }
}

impl Default for SessionNotifier {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for SessionNotifier {
    fn clone(&self) -> Self {
        Self {
            sender: self.sender.clone(),
        }
    }
}
