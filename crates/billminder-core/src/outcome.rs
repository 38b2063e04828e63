//! Structured results handed back to the UI layer.

use serde::Serialize;
use std::fmt;

use crate::events::Event;

/// Non-fatal problem attached to an otherwise committed operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Warning {
    /// Notification permission was not granted; nothing was scheduled.
    PermissionDenied { reminder_id: String },
    /// The scheduler failed to schedule or cancel.
    NotificationFailed { reminder_id: String, message: String },
    /// The transaction collaborator failed.
    TransactionFailed { reminder_id: String, message: String },
}

impl Warning {
    pub fn reminder_id(&self) -> &str {
        match self {
            Warning::PermissionDenied { reminder_id }
            | Warning::NotificationFailed { reminder_id, .. }
            | Warning::TransactionFailed { reminder_id, .. } => reminder_id,
        }
    }
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Warning::PermissionDenied { reminder_id } => {
                write!(f, "notification permission denied; reminder {reminder_id} will not alert")
            }
            Warning::NotificationFailed {
                reminder_id,
                message,
            } => write!(f, "notification for reminder {reminder_id} failed: {message}"),
            Warning::TransactionFailed {
                reminder_id,
                message,
            } => write!(f, "transaction for reminder {reminder_id} failed: {message}"),
        }
    }
}

/// Result of one lifecycle operation: success flag, optional message,
/// warnings, emitted events and an optional value.
#[derive(Debug, Clone, Serialize)]
pub struct OperationOutcome<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<Warning>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub events: Vec<Event>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<T>,
}

impl<T> OperationOutcome<T> {
    pub fn ok(value: T) -> Self {
        Self {
            success: true,
            message: None,
            warnings: Vec::new(),
            events: Vec::new(),
            value: Some(value),
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: Some(message.into()),
            warnings: Vec::new(),
            events: Vec::new(),
            value: None,
        }
    }

    pub fn with_warnings(mut self, warnings: Vec<Warning>) -> Self {
        self.warnings.extend(warnings);
        self
    }

    pub fn with_events(mut self, events: Vec<Event>) -> Self {
        self.events.extend(events);
        self
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    /// Convert into a `Result`, dropping warnings and events.
    pub fn into_result(self) -> Result<T, String> {
        match (self.success, self.value) {
            (true, Some(value)) => Ok(value),
            _ => Err(self.message.unwrap_or_else(|| "operation failed".into())),
        }
    }
}
