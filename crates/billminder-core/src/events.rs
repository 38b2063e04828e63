use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::reminder::{ReminderStatus, TransactionType};

/// Every lifecycle change produces an Event.
/// The UI shows them as transient notices; `ReminderOverdue` is emitted once
/// per reminder per PENDING -> OVERDUE transition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    ReminderCreated {
        reminder_id: String,
        title: String,
        due_date: DateTime<Utc>,
        at: DateTime<Utc>,
    },
    ReminderUpdated {
        reminder_id: String,
        status: ReminderStatus,
        due_date: DateTime<Utc>,
        at: DateTime<Utc>,
    },
    ReminderCompleted {
        reminder_id: String,
        completed_count: u32,
        /// Next due date for recurring reminders.
        next_due: Option<DateTime<Utc>>,
        at: DateTime<Utc>,
    },
    ReminderSnoozed {
        reminder_id: String,
        until: DateTime<Utc>,
        at: DateTime<Utc>,
    },
    ReminderCancelled {
        reminder_id: String,
        at: DateTime<Utc>,
    },
    ReminderDeleted {
        reminder_id: String,
        at: DateTime<Utc>,
    },
    ReminderOverdue {
        reminder_id: String,
        title: String,
        due_date: DateTime<Utc>,
        at: DateTime<Utc>,
    },
    /// Auto-created transaction handed to the ledger.
    TransactionRequested {
        reminder_id: String,
        amount: f64,
        transaction_type: TransactionType,
        wallet_id: String,
        at: DateTime<Utc>,
    },
}

impl Event {
    pub fn reminder_id(&self) -> &str {
        match self {
            Event::ReminderCreated { reminder_id, .. }
            | Event::ReminderUpdated { reminder_id, .. }
            | Event::ReminderCompleted { reminder_id, .. }
            | Event::ReminderSnoozed { reminder_id, .. }
            | Event::ReminderCancelled { reminder_id, .. }
            | Event::ReminderDeleted { reminder_id, .. }
            | Event::ReminderOverdue { reminder_id, .. }
            | Event::TransactionRequested { reminder_id, .. } => reminder_id,
        }
    }

    pub fn is_overdue_notice(&self) -> bool {
        matches!(self, Event::ReminderOverdue { .. })
    }
}
