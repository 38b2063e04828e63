//! Keeps the external scheduler in step with reminder state.
//!
//! Invariant maintained for every reminder `r` the reconciler is told about:
//! a mapping entry exists iff `r.wants_notification()`, except when
//! permission is denied or the scheduler fails (both reported to the caller).
//! The mapping itself is never persisted; [`NotificationReconciler::rebuild`]
//! recovers it from [`NotificationScheduler::list_scheduled`].

use std::collections::{HashMap, HashSet};

use tracing::{debug, info, warn};

use super::{
    reminder_payload, NotificationId, NotificationPermission, NotificationRequest,
    NotificationScheduler,
};
use crate::error::NotificationError;
use crate::outcome::Warning;
use crate::reminder::Reminder;

/// What [`NotificationReconciler::sync`] did for one reminder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncAction {
    Scheduled(NotificationId),
    AlreadyScheduled,
    PermissionDenied,
    Cancelled,
    Unchanged,
}

pub struct NotificationReconciler {
    scheduler: Box<dyn NotificationScheduler>,
    permission: Box<dyn NotificationPermission>,
    /// Prompt for permission when it is not granted yet.
    request_permission: bool,
    mapping: HashMap<String, NotificationId>,
}

impl NotificationReconciler {
    pub fn new(
        scheduler: Box<dyn NotificationScheduler>,
        permission: Box<dyn NotificationPermission>,
    ) -> Self {
        Self {
            scheduler,
            permission,
            request_permission: true,
            mapping: HashMap::new(),
        }
    }

    pub fn with_permission_prompt(mut self, prompt: bool) -> Self {
        self.request_permission = prompt;
        self
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn notification_id(&self, reminder_id: &str) -> Option<&NotificationId> {
        self.mapping.get(reminder_id)
    }

    pub fn is_scheduled(&self, reminder_id: &str) -> bool {
        self.mapping.contains_key(reminder_id)
    }

    pub fn len(&self) -> usize {
        self.mapping.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mapping.is_empty()
    }

    /// Reminder ids that currently hold a notification.
    pub fn scheduled_reminders(&self) -> impl Iterator<Item = &str> {
        self.mapping.keys().map(String::as_str)
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Replace the mapping with what the scheduler reports.
    ///
    /// Entries without a reminder id are left alone. When one reminder owns
    /// several notifications, the first is kept and the rest are cancelled.
    /// Returns the number of mapped reminders.
    pub fn rebuild(&mut self) -> Result<usize, NotificationError> {
        let scheduled = self.scheduler.list_scheduled()?;
        self.mapping.clear();

        for entry in scheduled {
            let Some(reminder_id) = entry.reminder_id().map(str::to_string) else {
                continue;
            };
            if self.mapping.contains_key(&reminder_id) {
                warn!(reminder_id = %reminder_id, notification_id = %entry.id, "cancelling duplicate notification");
                if let Err(e) = self.scheduler.cancel(&entry.id) {
                    warn!(notification_id = %entry.id, error = %e, "failed to cancel duplicate notification");
                }
                continue;
            }
            self.mapping.insert(reminder_id, entry.id);
        }

        info!(count = self.mapping.len(), "rebuilt notification mapping");
        Ok(self.mapping.len())
    }

    /// Schedule the notification for `reminder`, replacing any existing one.
    ///
    /// Returns `Ok(None)` when permission is not granted. The caller decides
    /// whether the reminder should have a notification at all.
    pub fn schedule_for(
        &mut self,
        reminder: &Reminder,
    ) -> Result<Option<NotificationId>, NotificationError> {
        if let Err(e) = self.cancel_for(&reminder.id) {
            warn!(reminder_id = %reminder.id, error = %e, "stale notification could not be cancelled");
        }

        if !self.permission_granted() {
            debug!(reminder_id = %reminder.id, "notification permission not granted");
            return Ok(None);
        }

        if reminder.enable_email_notification {
            debug!(reminder_id = %reminder.id, "email channel is handled outside this crate");
        }

        let request = build_request(reminder);
        let id = self.scheduler.schedule(&request)?;
        debug!(reminder_id = %reminder.id, notification_id = %id, fire_at = ?request.fire_at, "scheduled notification");
        self.mapping.insert(reminder.id.clone(), id.clone());
        Ok(Some(id))
    }

    /// Cancel the notification held for `reminder_id`, if any.
    ///
    /// The mapping entry is removed even when the scheduler's cancel fails.
    /// Returns whether an entry existed.
    pub fn cancel_for(&mut self, reminder_id: &str) -> Result<bool, NotificationError> {
        let Some(id) = self.mapping.remove(reminder_id) else {
            return Ok(false);
        };
        self.scheduler.cancel(&id)?;
        debug!(reminder_id = %reminder_id, notification_id = %id, "cancelled notification");
        Ok(true)
    }

    /// Bring one reminder's notification in line with its state.
    pub fn sync(&mut self, reminder: &Reminder) -> Result<SyncAction, NotificationError> {
        if reminder.wants_notification() {
            if self.is_scheduled(&reminder.id) {
                return Ok(SyncAction::AlreadyScheduled);
            }
            return Ok(match self.schedule_for(reminder)? {
                Some(id) => SyncAction::Scheduled(id),
                None => SyncAction::PermissionDenied,
            });
        }
        Ok(if self.cancel_for(&reminder.id)? {
            SyncAction::Cancelled
        } else {
            SyncAction::Unchanged
        })
    }

    /// Repair pass over the whole collection: drop notifications for unknown
    /// reminders, then sync every reminder.
    pub fn reconcile_all(&mut self, reminders: &[Reminder]) -> Vec<Warning> {
        let known: HashSet<&str> = reminders.iter().map(|r| r.id.as_str()).collect();
        let orphans: Vec<String> = self
            .mapping
            .keys()
            .filter(|id| !known.contains(id.as_str()))
            .cloned()
            .collect();

        let mut warnings = Vec::new();
        for reminder_id in orphans {
            info!(reminder_id = %reminder_id, "cancelling notification for unknown reminder");
            if let Err(e) = self.cancel_for(&reminder_id) {
                warnings.push(Warning::NotificationFailed {
                    reminder_id,
                    message: e.to_string(),
                });
            }
        }

        for reminder in reminders {
            match self.sync(reminder) {
                Ok(SyncAction::PermissionDenied) => warnings.push(Warning::PermissionDenied {
                    reminder_id: reminder.id.clone(),
                }),
                Ok(_) => {}
                Err(e) => warnings.push(Warning::NotificationFailed {
                    reminder_id: reminder.id.clone(),
                    message: e.to_string(),
                }),
            }
        }
        warnings
    }

    fn permission_granted(&self) -> bool {
        self.permission.has_permission()
            || (self.request_permission && self.permission.request_permission())
    }
}

fn build_request(reminder: &Reminder) -> NotificationRequest {
    let due = reminder.due_date.format("%Y-%m-%d %H:%M");
    let body = match (reminder.amount, &reminder.description) {
        (Some(amount), _) => format!("{amount:.2} due {due}"),
        (None, Some(description)) if !description.is_empty() => {
            format!("{description} (due {due})")
        }
        _ => format!("Due {due}"),
    };
    NotificationRequest {
        title: reminder.title.clone(),
        body,
        fire_at: Some(reminder.fire_time()),
        payload: reminder_payload(&reminder.id),
    }
}
