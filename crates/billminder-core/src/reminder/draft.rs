//! Caller-supplied data for `create` and `edit`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{CustomInterval, Frequency, Reminder, TransactionType};

/// Everything needed to create a reminder. `id`, `status` and counters are
/// assigned by the lifecycle layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReminderDraft {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub amount: Option<f64>,
    #[serde(default)]
    pub transaction_type: Option<TransactionType>,
    #[serde(default)]
    pub category_id: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub wallet_id: Option<String>,
    #[serde(default)]
    pub wallet: Option<String>,
    pub due_date: DateTime<Utc>,
    #[serde(default)]
    pub frequency: Frequency,
    #[serde(default)]
    pub custom_interval: Option<CustomInterval>,
    #[serde(default)]
    pub is_recurring: bool,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub auto_create_transaction: bool,
    #[serde(default)]
    pub notify_before: u32,
    #[serde(default = "default_true")]
    pub enable_push_notification: bool,
    #[serde(default)]
    pub enable_email_notification: bool,
}

fn default_true() -> bool {
    true
}

impl ReminderDraft {
    /// One-shot, active, push-enabled reminder.
    pub fn new(title: impl Into<String>, due_date: DateTime<Utc>) -> Self {
        Self {
            title: title.into(),
            description: None,
            amount: None,
            transaction_type: None,
            category_id: None,
            category: None,
            wallet_id: None,
            wallet: None,
            due_date,
            frequency: Frequency::default(),
            custom_interval: None,
            is_recurring: false,
            is_active: true,
            auto_create_transaction: false,
            notify_before: 0,
            enable_push_notification: true,
            enable_email_notification: false,
        }
    }

    pub fn recurring(mut self, frequency: Frequency) -> Self {
        self.frequency = frequency;
        self.is_recurring = true;
        self
    }

    pub fn every(mut self, interval: CustomInterval) -> Self {
        self.frequency = Frequency::Custom;
        self.custom_interval = Some(interval);
        self.is_recurring = true;
        self
    }

    pub fn notify_before(mut self, minutes: u32) -> Self {
        self.notify_before = minutes;
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Attach the fields needed for automatic transaction creation.
    pub fn with_transaction(
        mut self,
        amount: f64,
        transaction_type: TransactionType,
        wallet_id: impl Into<String>,
    ) -> Self {
        self.amount = Some(amount);
        self.transaction_type = Some(transaction_type);
        self.wallet_id = Some(wallet_id.into());
        self
    }

    pub fn auto_create(mut self, enabled: bool) -> Self {
        self.auto_create_transaction = enabled;
        self
    }

    pub fn push(mut self, enabled: bool) -> Self {
        self.enable_push_notification = enabled;
        self
    }

    pub fn active(mut self, active: bool) -> Self {
        self.is_active = active;
        self
    }
}

/// Partial update for `edit`. `None` leaves a field untouched; for nullable
/// fields `Some(None)` clears it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReminderPatch {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<Option<String>>,
    #[serde(default)]
    pub amount: Option<Option<f64>>,
    #[serde(default)]
    pub transaction_type: Option<Option<TransactionType>>,
    #[serde(default)]
    pub category_id: Option<Option<String>>,
    #[serde(default)]
    pub category: Option<Option<String>>,
    #[serde(default)]
    pub wallet_id: Option<Option<String>>,
    #[serde(default)]
    pub wallet: Option<Option<String>>,
    #[serde(default)]
    pub due_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub frequency: Option<Frequency>,
    #[serde(default)]
    pub custom_interval: Option<Option<CustomInterval>>,
    #[serde(default)]
    pub is_recurring: Option<bool>,
    #[serde(default)]
    pub is_active: Option<bool>,
    #[serde(default)]
    pub auto_create_transaction: Option<bool>,
    #[serde(default)]
    pub notify_before: Option<u32>,
    #[serde(default)]
    pub enable_push_notification: Option<bool>,
    #[serde(default)]
    pub enable_email_notification: Option<bool>,
}

impl ReminderPatch {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Apply onto `reminder`. Identity, status and counters are not patchable.
    pub fn apply(&self, reminder: &mut Reminder) {
        if let Some(title) = &self.title {
            reminder.title = title.clone();
        }
        if let Some(description) = &self.description {
            reminder.description = description.clone();
        }
        if let Some(amount) = self.amount {
            reminder.amount = amount;
        }
        if let Some(transaction_type) = self.transaction_type {
            reminder.transaction_type = transaction_type;
        }
        if let Some(category_id) = &self.category_id {
            reminder.category_id = category_id.clone();
        }
        if let Some(category) = &self.category {
            reminder.category = category.clone();
        }
        if let Some(wallet_id) = &self.wallet_id {
            reminder.wallet_id = wallet_id.clone();
        }
        if let Some(wallet) = &self.wallet {
            reminder.wallet = wallet.clone();
        }
        if let Some(due_date) = self.due_date {
            reminder.due_date = due_date;
        }
        if let Some(frequency) = self.frequency {
            reminder.frequency = frequency;
        }
        if let Some(custom_interval) = self.custom_interval {
            reminder.custom_interval = custom_interval;
        }
        if let Some(is_recurring) = self.is_recurring {
            reminder.is_recurring = is_recurring;
        }
        if let Some(is_active) = self.is_active {
            reminder.is_active = is_active;
        }
        if let Some(auto) = self.auto_create_transaction {
            reminder.auto_create_transaction = auto;
        }
        if let Some(minutes) = self.notify_before {
            reminder.notify_before = minutes;
        }
        if let Some(push) = self.enable_push_notification {
            reminder.enable_push_notification = push;
        }
        if let Some(email) = self.enable_email_notification {
            reminder.enable_email_notification = email;
        }
    }
}
