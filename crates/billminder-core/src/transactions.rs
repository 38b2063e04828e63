//! Hand-off to the external transaction service.
//!
//! Completing a reminder with `autoCreateTransaction` set asks the ledger to
//! book the amount. The call is fire-and-forget from the lifecycle's point of
//! view: a failure becomes a warning and never reverts the completion.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::TransactionError;
use crate::reminder::{Reminder, TransactionType};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionRequest {
    pub reminder_id: String,
    pub amount: f64,
    pub transaction_type: TransactionType,
    pub wallet_id: String,
    pub category_id: Option<String>,
    pub note: String,
    pub occurred_at: DateTime<Utc>,
}

impl TransactionRequest {
    /// Build the request for a completed reminder, or `None` when the
    /// reminder is not set up to create transactions.
    pub fn from_reminder(reminder: &Reminder, occurred_at: DateTime<Utc>) -> Option<Self> {
        if !reminder.auto_create_transaction {
            return None;
        }
        Some(Self {
            reminder_id: reminder.id.clone(),
            amount: reminder.amount?,
            transaction_type: reminder.transaction_type?,
            wallet_id: reminder.wallet_id.clone()?,
            category_id: reminder.category_id.clone(),
            note: reminder.title.clone(),
            occurred_at,
        })
    }
}

/// External transaction-creation service.
pub trait TransactionSink: Send {
    fn create_transaction(&self, request: &TransactionRequest) -> Result<(), TransactionError>;
}

/// Sink that drops every request. Used when no ledger is wired up.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopTransactionSink;

impl TransactionSink for NoopTransactionSink {
    fn create_transaction(&self, request: &TransactionRequest) -> Result<(), TransactionError> {
        tracing::debug!(reminder_id = %request.reminder_id, "no transaction sink configured");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reminder::ReminderDraft;
    use chrono::TimeZone;

    #[test]
    fn request_requires_all_fields() {
        let due = Utc.with_ymd_and_hms(2025, 2, 1, 0, 0, 0).unwrap();
        let draft = ReminderDraft::new("Netflix", due)
            .with_transaction(15.5, TransactionType::Expense, "card")
            .auto_create(true);
        let mut r = Reminder::from_draft("n".into(), draft, due);

        let req = TransactionRequest::from_reminder(&r, due).unwrap();
        assert_eq!(req.amount, 15.5);
        assert_eq!(req.wallet_id, "card");
        assert_eq!(req.note, "Netflix");

        r.transaction_type = None;
        assert!(TransactionRequest::from_reminder(&r, due).is_none());
        r.transaction_type = Some(TransactionType::Income);
        r.auto_create_transaction = false;
        assert!(TransactionRequest::from_reminder(&r, due).is_none());
    }
}
