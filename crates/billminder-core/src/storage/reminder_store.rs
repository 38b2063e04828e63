//! Reminder snapshot persistence.
//!
//! The whole collection lives under one key as a JSON array. Loading is
//! lenient: a missing key or a non-array root yields an empty collection and
//! individual malformed records are dropped. Persisting always overwrites the
//! full snapshot.

use std::collections::HashSet;

use serde_json::Value;
use tracing::{debug, warn};

use super::KeyValueStore;
use crate::error::StorageError;
use crate::recurrence::next_due_date_with;
use crate::reminder::{Reminder, ReminderStatus};

/// Default key holding the snapshot.
pub const DEFAULT_REMINDERS_KEY: &str = "reminders";

/// Owns the canonical serialized reminder collection.
pub struct ReminderStore {
    kv: Box<dyn KeyValueStore>,
    key: String,
}

impl ReminderStore {
    pub fn new(kv: Box<dyn KeyValueStore>) -> Self {
        Self::with_key(kv, DEFAULT_REMINDERS_KEY)
    }

    pub fn with_key(kv: Box<dyn KeyValueStore>, key: impl Into<String>) -> Self {
        Self {
            kv,
            key: key.into(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Read the snapshot, sorted ascending by due date.
    ///
    /// # Errors
    /// Only a failing key-value read is an error; bad data is dropped.
    pub fn load(&self) -> Result<Vec<Reminder>, StorageError> {
        match self.kv.get(&self.key)? {
            Some(raw) => Ok(decode_snapshot(&raw)),
            None => {
                debug!(key = %self.key, "no reminder snapshot yet");
                Ok(Vec::new())
            }
        }
    }

    /// Overwrite the stored snapshot with `reminders`.
    pub fn persist(&self, reminders: &[Reminder]) -> Result<(), StorageError> {
        let raw = serde_json::to_string(reminders)?;
        self.kv.set(&self.key, &raw)?;
        debug!(key = %self.key, count = reminders.len(), "persisted reminder snapshot");
        Ok(())
    }
}

/// Decode a stored snapshot, skipping anything that is not a valid reminder.
///
/// Duplicate ids keep their first occurrence. A recurring record stored as
/// COMPLETED is reopened as PENDING on its next occurrence.
pub fn decode_snapshot(raw: &str) -> Vec<Reminder> {
    let root: Value = match serde_json::from_str(raw) {
        Ok(v) => v,
        Err(e) => {
            warn!(error = %e, "reminder snapshot is not valid JSON; treating as empty");
            return Vec::new();
        }
    };

    let Value::Array(items) = root else {
        warn!("reminder snapshot root is not an array; treating as empty");
        return Vec::new();
    };

    let mut seen = HashSet::new();
    let mut reminders = Vec::with_capacity(items.len());
    for (index, item) in items.into_iter().enumerate() {
        match serde_json::from_value::<Reminder>(item) {
            Ok(r) if r.id.is_empty() => {
                warn!(index, "dropping reminder record without id");
            }
            Ok(mut r) => {
                if seen.insert(r.id.clone()) {
                    if r.status == ReminderStatus::Completed && r.is_recurring {
                        warn!(index, id = %r.id, "reopening recurring reminder stored as completed");
                        reopen(&mut r);
                    }
                    reminders.push(r);
                } else {
                    warn!(index, id = %r.id, "dropping duplicate reminder record");
                }
            }
            Err(e) => {
                warn!(index, error = %e, "dropping malformed reminder record");
            }
        }
    }

    reminders.sort_by_key(|r| r.due_date);
    reminders
}

fn reopen(r: &mut Reminder) {
    r.status = ReminderStatus::Pending;
    r.due_date = next_due_date_with(r.due_date, r.frequency, r.custom_interval);
    r.next_due = Some(next_due_date_with(r.due_date, r.frequency, r.custom_interval));
}
