//! Reminder data model.
//!
//! A [`Reminder`] is the only entity this crate manages. It is stored as a
//! camelCase JSON record inside one key-value snapshot; timestamps are RFC 3339
//! UTC strings.
//!
//! ## Status transitions
//!
//! ```text
//! Pending -> Overdue            (sweep)
//! Pending | Overdue -> Pending  (complete, recurring)
//! Pending | Overdue -> Completed (complete, one-shot)
//! any -> Cancelled              (cancel)
//! ```

mod draft;

pub use draft::{ReminderDraft, ReminderPatch};

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::ValidationError;

/// How often a recurring reminder repeats.
///
/// Stored as an upper-case string. Unknown strings read back as `Monthly`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Frequency {
    Daily,
    Weekly,
    #[default]
    Monthly,
    Quarterly,
    Yearly,
    Custom,
}

impl Frequency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Frequency::Daily => "DAILY",
            Frequency::Weekly => "WEEKLY",
            Frequency::Monthly => "MONTHLY",
            Frequency::Quarterly => "QUARTERLY",
            Frequency::Yearly => "YEARLY",
            Frequency::Custom => "CUSTOM",
        }
    }

    /// Parse leniently; anything unrecognised is `Monthly`.
    pub fn parse_lenient(s: &str) -> Self {
        match s.trim().to_ascii_uppercase().as_str() {
            "DAILY" => Frequency::Daily,
            "WEEKLY" => Frequency::Weekly,
            "MONTHLY" => Frequency::Monthly,
            "QUARTERLY" => Frequency::Quarterly,
            "YEARLY" | "ANNUALLY" => Frequency::Yearly,
            "CUSTOM" => Frequency::Custom,
            _ => Frequency::Monthly,
        }
    }
}

impl From<String> for Frequency {
    fn from(s: String) -> Self {
        Frequency::parse_lenient(&s)
    }
}

impl From<Frequency> for String {
    fn from(f: Frequency) -> Self {
        f.as_str().to_string()
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unit for a [`CustomInterval`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IntervalUnit {
    Days,
    Weeks,
}

/// Step used by [`Frequency::Custom`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CustomInterval {
    pub unit: IntervalUnit,
    pub count: u32,
}

impl CustomInterval {
    pub fn days(count: u32) -> Self {
        Self {
            unit: IntervalUnit::Days,
            count,
        }
    }

    pub fn weeks(count: u32) -> Self {
        Self {
            unit: IntervalUnit::Weeks,
            count,
        }
    }

    /// Length of one step. A zero count counts as one.
    pub fn step(&self) -> Duration {
        let count = i64::from(self.count.max(1));
        match self.unit {
            IntervalUnit::Days => Duration::days(count),
            IntervalUnit::Weeks => Duration::weeks(count),
        }
    }
}

impl Default for CustomInterval {
    fn default() -> Self {
        Self::days(1)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReminderStatus {
    #[default]
    Pending,
    Overdue,
    Completed,
    Cancelled,
}

impl fmt::Display for ReminderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ReminderStatus::Pending => "PENDING",
            ReminderStatus::Overdue => "OVERDUE",
            ReminderStatus::Completed => "COMPLETED",
            ReminderStatus::Cancelled => "CANCELLED",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionType {
    Income,
    Expense,
}

/// A scheduled financial obligation (bill, subscription, salary day...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reminder {
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transaction_type: Option<TransactionType>,
    /// Opaque foreign keys owned by the category and wallet services.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wallet_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wallet: Option<String>,
    /// Next occurrence this reminder fires at.
    pub due_date: DateTime<Utc>,
    #[serde(default)]
    pub frequency: Frequency,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_interval: Option<CustomInterval>,
    #[serde(default)]
    pub is_recurring: bool,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub status: ReminderStatus,
    #[serde(default)]
    pub auto_create_transaction: bool,
    /// Lead time in minutes before `due_date`.
    #[serde(default)]
    pub notify_before: u32,
    #[serde(default = "default_true")]
    pub enable_push_notification: bool,
    #[serde(default)]
    pub enable_email_notification: bool,
    #[serde(default)]
    pub completed_count: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_completed: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_due: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snooze_until: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

fn default_true() -> bool {
    true
}

impl Reminder {
    /// Build a fresh PENDING reminder from a draft.
    pub fn from_draft(id: String, draft: ReminderDraft, now: DateTime<Utc>) -> Self {
        Self {
            id,
            title: draft.title,
            description: draft.description,
            amount: draft.amount,
            transaction_type: draft.transaction_type,
            category_id: draft.category_id,
            category: draft.category,
            wallet_id: draft.wallet_id,
            wallet: draft.wallet,
            due_date: draft.due_date,
            frequency: draft.frequency,
            custom_interval: draft.custom_interval,
            is_recurring: draft.is_recurring,
            is_active: draft.is_active,
            status: ReminderStatus::Pending,
            auto_create_transaction: draft.auto_create_transaction,
            notify_before: draft.notify_before,
            enable_push_notification: draft.enable_push_notification,
            enable_email_notification: draft.enable_email_notification,
            completed_count: 0,
            last_completed: None,
            next_due: None,
            snooze_until: None,
            created_at: Some(now),
            updated_at: Some(now),
        }
    }

    /// Instant the push notification should fire at.
    pub fn fire_time(&self) -> DateTime<Utc> {
        self.due_date - Duration::minutes(i64::from(self.notify_before))
    }

    /// Whether the reconciliation invariant requires a scheduled notification.
    pub fn wants_notification(&self) -> bool {
        self.status == ReminderStatus::Pending && self.is_active && self.enable_push_notification
    }

    pub fn is_snoozed_at(&self, now: DateTime<Utc>) -> bool {
        self.snooze_until.is_some_and(|until| now <= until)
    }

    /// Terminal states: nothing will ever fire for these again.
    pub fn is_finished(&self) -> bool {
        match self.status {
            ReminderStatus::Cancelled => true,
            ReminderStatus::Completed => !self.is_recurring,
            _ => false,
        }
    }

    /// Whether completion should hand a transaction to the ledger.
    pub fn creates_transaction(&self) -> bool {
        self.auto_create_transaction
            && self.amount.is_some()
            && self.transaction_type.is_some()
            && self.wallet_id.is_some()
    }

    /// Check the fields a caller can set.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.title.trim().is_empty() {
            return Err(ValidationError::Empty("title".into()));
        }
        if let Some(amount) = self.amount {
            if !amount.is_finite() || amount < 0.0 {
                return Err(ValidationError::InvalidValue {
                    field: "amount".into(),
                    message: format!("{amount} is not a non-negative amount"),
                });
            }
        }
        if self.frequency == Frequency::Custom && self.custom_interval.is_some_and(|c| c.count == 0)
        {
            return Err(ValidationError::InvalidValue {
                field: "customInterval.count".into(),
                message: "must be at least 1".into(),
            });
        }
        Ok(())
    }
}
