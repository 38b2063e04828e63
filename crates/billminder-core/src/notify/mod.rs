//! Push notification plumbing.
//!
//! The platform scheduler and permission prompt are external collaborators
//! behind [`NotificationScheduler`] and [`NotificationPermission`]. The
//! [`NotificationReconciler`] keeps one scheduled notification per reminder
//! that needs one; its mapping is rebuilt from the scheduler at startup by
//! reading the `reminderId` embedded in each payload.

pub mod local;
mod reconciler;

pub use local::{KvNotificationScheduler, StoredNotification};
pub use reconciler::{NotificationReconciler, SyncAction};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::fmt;

use crate::error::NotificationError;

/// Payload field carrying the owning reminder's id.
pub const PAYLOAD_REMINDER_ID: &str = "reminderId";

/// Identifier handed out by the external scheduler.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NotificationId(pub String);

impl NotificationId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NotificationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// What to show and when.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationRequest {
    pub title: String,
    pub body: String,
    /// `None` fires immediately.
    pub fire_at: Option<DateTime<Utc>>,
    pub payload: Value,
}

/// Entry returned by [`NotificationScheduler::list_scheduled`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduledNotification {
    pub id: NotificationId,
    pub payload: Value,
}

impl ScheduledNotification {
    pub fn reminder_id(&self) -> Option<&str> {
        payload_reminder_id(&self.payload)
    }
}

/// Platform notification scheduler.
pub trait NotificationScheduler: Send {
    /// Schedule a notification. A past `fire_at` may fire at once or be
    /// rejected, at the platform's discretion.
    fn schedule(&self, request: &NotificationRequest) -> Result<NotificationId, NotificationError>;

    fn cancel(&self, id: &NotificationId) -> Result<(), NotificationError>;

    /// Everything currently scheduled, with payloads.
    fn list_scheduled(&self) -> Result<Vec<ScheduledNotification>, NotificationError>;
}

/// Platform permission prompt.
pub trait NotificationPermission: Send {
    fn has_permission(&self) -> bool;

    /// Ask the user. Returns whether permission is now granted.
    fn request_permission(&self) -> bool;
}

/// Permission provider with a fixed answer.
#[derive(Debug, Clone, Copy)]
pub struct StaticPermission {
    pub granted: bool,
}

impl StaticPermission {
    pub fn granted() -> Self {
        Self { granted: true }
    }

    pub fn denied() -> Self {
        Self { granted: false }
    }
}

impl NotificationPermission for StaticPermission {
    fn has_permission(&self) -> bool {
        self.granted
    }

    fn request_permission(&self) -> bool {
        self.granted
    }
}

pub fn reminder_payload(reminder_id: &str) -> Value {
    json!({ "reminderId": reminder_id, "kind": "reminder" })
}

pub fn payload_reminder_id(payload: &Value) -> Option<&str> {
    payload
        .get(PAYLOAD_REMINDER_ID)
        .and_then(Value::as_str)
        .filter(|id| !id.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payload_round_trip() {
        let payload = reminder_payload("abc");
        assert_eq!(payload_reminder_id(&payload), Some("abc"));
        assert_eq!(payload_reminder_id(&json!({"other": 1})), None);
        assert_eq!(payload_reminder_id(&json!({"reminderId": ""})), None);
        assert_eq!(payload_reminder_id(&json!({"reminderId": 7})), None);
    }
}
