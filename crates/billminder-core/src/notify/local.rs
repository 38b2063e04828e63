//! Notification scheduler backed by the key-value store.
//!
//! Used where no platform scheduler exists (the CLI). Scheduled entries are
//! kept under one key; [`KvNotificationScheduler::take_due`] marks entries as
//! delivered so a polling loop shows each one once. Delivered entries stay
//! listed until cancelled, like notifications sitting in a platform tray.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use super::{NotificationId, NotificationRequest, NotificationScheduler, ScheduledNotification};
use crate::error::NotificationError;
use crate::storage::KeyValueStore;

/// Default key holding the local schedule.
pub const DEFAULT_NOTIFICATIONS_KEY: &str = "scheduled_notifications";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredNotification {
    pub id: NotificationId,
    pub title: String,
    pub body: String,
    #[serde(default)]
    pub fire_at: Option<DateTime<Utc>>,
    pub payload: Value,
    #[serde(default)]
    pub delivered: bool,
}

impl StoredNotification {
    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        self.fire_at.map_or(true, |at| at <= now)
    }
}

pub struct KvNotificationScheduler {
    kv: Box<dyn KeyValueStore>,
    key: String,
}

impl KvNotificationScheduler {
    pub fn new(kv: Box<dyn KeyValueStore>) -> Self {
        Self::with_key(kv, DEFAULT_NOTIFICATIONS_KEY)
    }

    pub fn with_key(kv: Box<dyn KeyValueStore>, key: impl Into<String>) -> Self {
        Self {
            kv,
            key: key.into(),
        }
    }

    /// All stored entries, delivered or not.
    pub fn entries(&self) -> Result<Vec<StoredNotification>, NotificationError> {
        let raw = self.kv.get(&self.key).map_err(unavailable)?;
        match raw {
            Some(raw) => serde_json::from_str(&raw).map_err(unavailable),
            None => Ok(Vec::new()),
        }
    }

    fn save(&self, entries: &[StoredNotification]) -> Result<(), NotificationError> {
        let raw = serde_json::to_string(entries).map_err(unavailable)?;
        self.kv.set(&self.key, &raw).map_err(unavailable)
    }

    /// Mark every undelivered entry whose fire time has passed as delivered
    /// and return them, earliest first.
    pub fn take_due(&self, now: DateTime<Utc>) -> Result<Vec<StoredNotification>, NotificationError> {
        let mut entries = self.entries()?;
        let mut due = Vec::new();
        for entry in entries.iter_mut() {
            if !entry.delivered && entry.is_due(now) {
                entry.delivered = true;
                due.push(entry.clone());
            }
        }
        if !due.is_empty() {
            self.save(&entries)?;
        }
        due.sort_by_key(|n| n.fire_at);
        Ok(due)
    }
}

impl NotificationScheduler for KvNotificationScheduler {
    fn schedule(&self, request: &NotificationRequest) -> Result<NotificationId, NotificationError> {
        let mut entries = self.entries()?;
        let id = NotificationId(Uuid::new_v4().to_string());
        entries.push(StoredNotification {
            id: id.clone(),
            title: request.title.clone(),
            body: request.body.clone(),
            fire_at: request.fire_at,
            payload: request.payload.clone(),
            delivered: false,
        });
        self.save(&entries)?;
        Ok(id)
    }

    fn cancel(&self, id: &NotificationId) -> Result<(), NotificationError> {
        let mut entries = self.entries()?;
        let before = entries.len();
        entries.retain(|n| &n.id != id);
        if entries.len() == before {
            return Err(NotificationError::UnknownId(id.to_string()));
        }
        self.save(&entries)
    }

    fn list_scheduled(&self) -> Result<Vec<ScheduledNotification>, NotificationError> {
        Ok(self
            .entries()?
            .into_iter()
            .map(|n| ScheduledNotification {
                id: n.id,
                payload: n.payload,
            })
            .collect())
    }
}

fn unavailable(e: impl std::fmt::Display) -> NotificationError {
    NotificationError::Unavailable(e.to_string())
}
