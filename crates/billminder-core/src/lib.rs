//! # Billminder Core Library
//!
//! Reminder lifecycle management for a personal finance app: bills,
//! subscriptions and paydays that recur, go overdue, get snoozed and get paid.
//! The CLI and any GUI are thin layers over this crate.
//!
//! ## Architecture
//!
//! - **Recurrence**: pure next-due-date arithmetic with month-end clamping
//! - **Storage**: one JSON snapshot in a key-value store (SQLite by default)
//!   and TOML configuration
//! - **Notifications**: a reconciler that keeps exactly one scheduled push
//!   notification per active pending reminder
//! - **Sweeper**: wall-clock PENDING -> OVERDUE transitions, on demand or on
//!   a tokio interval
//! - **Lifecycle**: create / edit / complete / snooze / delete composed over
//!   the pieces above
//!
//! ## Key Components
//!
//! - [`ReminderService`]: the lifecycle orchestrator
//! - [`ReminderStore`]: snapshot persistence
//! - [`NotificationReconciler`]: reminder -> notification mapping
//! - [`OverdueSweeper`]: overdue transitions
//! - [`next_due_date`]: recurrence engine

pub mod clock;
pub mod error;
pub mod events;
pub mod lifecycle;
pub mod notify;
pub mod outcome;
pub mod recurrence;
pub mod reminder;
pub mod storage;
pub mod sweeper;
pub mod transactions;

pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{
    ConfigError, CoreError, NotificationError, StorageError, TransactionError, ValidationError,
};
pub use events::Event;
pub use lifecycle::{ReminderService, ReminderSummary, SharedReminderService};
pub use notify::{
    KvNotificationScheduler, NotificationId, NotificationPermission, NotificationReconciler,
    NotificationRequest, NotificationScheduler, ScheduledNotification, StaticPermission,
};
pub use outcome::{OperationOutcome, Warning};
pub use recurrence::{next_due_date, next_due_date_with};
pub use reminder::{
    CustomInterval, Frequency, IntervalUnit, Reminder, ReminderDraft, ReminderPatch,
    ReminderStatus, TransactionType,
};
pub use storage::{Config, Database, KeyValueStore, MemoryStore, ReminderStore};
pub use sweeper::{OverdueSweeper, SweepReport};
pub use transactions::{NoopTransactionSink, TransactionRequest, TransactionSink};
