//! Lifecycle orchestrator.
//!
//! [`ReminderService`] is the only writer of the reminder collection. Each
//! public operation is one unit of work over the store and the notification
//! reconciler and reports an [`OperationOutcome`]:
//!
//! - storage failures fail the operation; the in-memory snapshot stays at the
//!   last persisted state and notifications for the touched reminders are
//!   re-synced to it
//! - notification and transaction failures are warnings and never block the
//!   data change
//!
//! ## Sequencing
//!
//! Operations take `&mut self` and run to completion, so one service value
//! never interleaves two operations. Code that shares the service with the
//! periodic sweeper goes through [`SharedReminderService`], which serialises
//! every operation behind one async mutex.
//!
//! ```ignore
//! let mut service = ReminderService::new(store, reconciler);
//! service.startup();
//! let created = service.create(ReminderDraft::new("Rent", due).recurring(Frequency::Monthly));
//! service.complete(&created.value.unwrap().id);
//! ```

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::clock::{Clock, SystemClock};
use crate::error::CoreError;
use crate::events::Event;
use crate::notify::NotificationReconciler;
use crate::outcome::{OperationOutcome, Warning};
use crate::recurrence::next_due_date_with;
use crate::reminder::{
    CustomInterval, Reminder, ReminderDraft, ReminderPatch, ReminderStatus, TransactionType,
};
use crate::storage::{Config, ReminderStore};
use crate::sweeper::OverdueSweeper;
use crate::transactions::{NoopTransactionSink, TransactionRequest, TransactionSink};

/// Service shared between UI handlers and the periodic sweeper.
pub type SharedReminderService = Arc<tokio::sync::Mutex<ReminderService>>;

/// Counts and open amounts across the collection.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ReminderSummary {
    pub total: usize,
    pub pending: usize,
    pub overdue: usize,
    pub completed: usize,
    pub cancelled: usize,
    pub inactive: usize,
    /// Sum of amounts on active PENDING/OVERDUE expense reminders.
    pub open_expense: f64,
    /// Sum of amounts on active PENDING/OVERDUE income reminders.
    pub open_income: f64,
    pub scheduled_notifications: usize,
}

pub struct ReminderService {
    store: ReminderStore,
    reconciler: NotificationReconciler,
    transactions: Box<dyn TransactionSink>,
    clock: Box<dyn Clock>,
    /// Step for CUSTOM reminders without their own interval.
    default_custom_interval: CustomInterval,
    sweep_on_refresh: bool,
    /// Last persisted snapshot, sorted by due date.
    reminders: Vec<Reminder>,
}

impl ReminderService {
    pub fn new(store: ReminderStore, reconciler: NotificationReconciler) -> Self {
        Self {
            store,
            reconciler,
            transactions: Box::new(NoopTransactionSink),
            clock: Box::new(SystemClock),
            default_custom_interval: CustomInterval::default(),
            sweep_on_refresh: true,
            reminders: Vec::new(),
        }
    }

    pub fn with_transactions(mut self, sink: Box<dyn TransactionSink>) -> Self {
        self.transactions = sink;
        self
    }

    pub fn with_clock(mut self, clock: Box<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_config(mut self, config: &Config) -> Self {
        self.default_custom_interval = config.recurrence.custom_interval();
        self.sweep_on_refresh = config.sweeper.sweep_on_refresh;
        self
    }

    pub fn into_shared(self) -> SharedReminderService {
        Arc::new(tokio::sync::Mutex::new(self))
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn reminders(&self) -> &[Reminder] {
        &self.reminders
    }

    pub fn get(&self, id: &str) -> Option<&Reminder> {
        self.reminders.iter().find(|r| r.id == id)
    }

    pub fn reconciler(&self) -> &NotificationReconciler {
        &self.reconciler
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// Active PENDING reminders due within `within` from now, soonest first.
    pub fn upcoming(&self, within: Duration) -> Vec<&Reminder> {
        let now = self.clock.now();
        let horizon = now.checked_add_signed(within).unwrap_or(if within < Duration::zero() {
            DateTime::<Utc>::MIN_UTC
        } else {
            DateTime::<Utc>::MAX_UTC
        });
        self.reminders
            .iter()
            .filter(|r| r.is_active && r.status == ReminderStatus::Pending)
            .filter(|r| r.due_date >= now && r.due_date <= horizon)
            .collect()
    }

    pub fn overdue(&self) -> Vec<&Reminder> {
        self.reminders
            .iter()
            .filter(|r| r.status == ReminderStatus::Overdue)
            .collect()
    }

    pub fn summary(&self) -> ReminderSummary {
        let mut summary = ReminderSummary {
            total: self.reminders.len(),
            scheduled_notifications: self.reconciler.len(),
            ..Default::default()
        };
        for r in &self.reminders {
            match r.status {
                ReminderStatus::Pending => summary.pending += 1,
                ReminderStatus::Overdue => summary.overdue += 1,
                ReminderStatus::Completed => summary.completed += 1,
                ReminderStatus::Cancelled => summary.cancelled += 1,
            }
            if !r.is_active {
                summary.inactive += 1;
                continue;
            }
            let open = matches!(r.status, ReminderStatus::Pending | ReminderStatus::Overdue);
            if let (true, Some(amount)) = (open, r.amount) {
                match r.transaction_type {
                    Some(TransactionType::Expense) => summary.open_expense += amount,
                    Some(TransactionType::Income) => summary.open_income += amount,
                    None => {}
                }
            }
        }
        summary
    }

    // ── Loading ──────────────────────────────────────────────────────

    /// Process start: rebuild the notification mapping from the scheduler,
    /// load and sweep, then repair any reminder whose notification state
    /// drifted while the process was down.
    pub fn startup(&mut self) -> OperationOutcome<usize> {
        let mut notes = Vec::new();
        if let Err(e) = self.reconciler.rebuild() {
            warn!(error = %e, "could not rebuild notification mapping");
            notes.push(format!("notification mapping not rebuilt: {e}"));
        }

        let refreshed = self.refresh();
        if !refreshed.success {
            return refreshed;
        }

        let repairs = self.reconciler.reconcile_all(&self.reminders);
        let mut outcome = refreshed.with_warnings(repairs);
        if !notes.is_empty() {
            outcome = outcome.with_message(notes.join("; "));
        }
        outcome
    }

    /// Reload the collection from the store, discarding the in-memory copy,
    /// then sweep eagerly if configured. The value is the number of reminders.
    pub fn refresh(&mut self) -> OperationOutcome<usize> {
        match self.store.load() {
            Ok(reminders) => self.reminders = reminders,
            Err(e) => {
                error!(error = %e, "failed to load reminders");
                return OperationOutcome::failed(format!("failed to load reminders: {e}"));
            }
        }
        info!(count = self.reminders.len(), "loaded reminders");

        let count = self.reminders.len();
        if !self.sweep_on_refresh {
            return OperationOutcome::ok(count);
        }
        let swept = self.sweep();
        if !swept.success {
            let message = swept.message.unwrap_or_default();
            return OperationOutcome::failed(message).with_warnings(swept.warnings);
        }
        OperationOutcome::ok(count)
            .with_warnings(swept.warnings)
            .with_events(swept.events)
    }

    /// Move due reminders to OVERDUE, drop their notifications and persist.
    /// The value is the number of newly overdue reminders; one
    /// `ReminderOverdue` event is emitted for each.
    pub fn sweep(&mut self) -> OperationOutcome<usize> {
        let now = self.clock.now();
        let mut next = self.reminders.clone();
        let report = OverdueSweeper::sweep(&mut next, now);
        if report.is_empty() {
            return OperationOutcome::ok(0);
        }

        let mut warnings = Vec::new();
        let touched: Vec<String> = report
            .newly_overdue
            .iter()
            .map(|t| t.reminder_id.clone())
            .collect();
        for id in &touched {
            self.cancel_notification(id, &mut warnings);
        }

        if let Err(e) = self.commit(next, &touched, &mut warnings) {
            return OperationOutcome::failed(format!("failed to save overdue reminders: {e}"))
                .with_warnings(warnings);
        }

        for t in &report.newly_overdue {
            info!(reminder_id = %t.reminder_id, due_date = %t.due_date, "reminder overdue");
        }
        OperationOutcome::ok(report.newly_overdue.len())
            .with_warnings(warnings)
            .with_events(report.events())
    }

    // ── Lifecycle operations ─────────────────────────────────────────

    pub fn create(&mut self, draft: ReminderDraft) -> OperationOutcome<Reminder> {
        let now = self.clock.now();
        let mut id = Uuid::new_v4().to_string();
        while self.position(&id).is_some() {
            id = Uuid::new_v4().to_string();
        }

        let mut reminder = Reminder::from_draft(id, draft, now);
        if let Err(e) = reminder.validate() {
            return OperationOutcome::failed(CoreError::from(e).to_string());
        }
        reminder.next_due = self.following_due(&reminder);

        let mut warnings = Vec::new();
        self.schedule_if_wanted(&reminder, &mut warnings);

        let mut next = self.reminders.clone();
        next.push(reminder.clone());
        if let Err(e) = self.commit(next, &[reminder.id.clone()], &mut warnings) {
            return OperationOutcome::failed(format!("failed to save reminder: {e}"))
                .with_warnings(warnings);
        }

        info!(reminder_id = %reminder.id, due_date = %reminder.due_date, "reminder created");
        let event = Event::ReminderCreated {
            reminder_id: reminder.id.clone(),
            title: reminder.title.clone(),
            due_date: reminder.due_date,
            at: now,
        };
        OperationOutcome::ok(reminder)
            .with_warnings(warnings)
            .with_events(vec![event])
    }

    /// Apply `patch`. The old notification is cancelled first and a new one is
    /// scheduled from the updated fields if the reminder still needs one.
    ///
    /// Moving an OVERDUE reminder's due date into the future makes it PENDING
    /// again; changing the due date clears any snooze. A COMPLETED reminder
    /// patched to recur becomes PENDING, since a recurring reminder is never
    /// left COMPLETED.
    pub fn edit(&mut self, id: &str, patch: ReminderPatch) -> OperationOutcome<Reminder> {
        let Some(index) = self.position(id) else {
            return not_found(id);
        };
        let now = self.clock.now();

        let mut updated = self.reminders[index].clone();
        patch.apply(&mut updated);
        if let Err(e) = updated.validate() {
            return OperationOutcome::failed(CoreError::from(e).to_string());
        }
        // Turning a finished one-shot into a recurring reminder reopens it on
        // the next occurrence unless the patch picks the date itself.
        if updated.status == ReminderStatus::Completed && updated.is_recurring {
            updated.status = ReminderStatus::Pending;
            if patch.due_date.is_none() {
                updated.due_date = next_due_date_with(
                    updated.due_date,
                    updated.frequency,
                    Some(self.custom_interval_for(&updated)),
                );
            }
        }
        if patch.due_date.is_some() {
            updated.snooze_until = None;
            if updated.status == ReminderStatus::Overdue && updated.due_date > now {
                updated.status = ReminderStatus::Pending;
            }
        }
        updated.next_due = self.following_due(&updated);
        updated.updated_at = Some(now);

        let mut warnings = Vec::new();
        self.cancel_notification(id, &mut warnings);
        self.schedule_if_wanted(&updated, &mut warnings);

        let mut next = self.reminders.clone();
        next[index] = updated.clone();
        if let Err(e) = self.commit(next, &[id.to_string()], &mut warnings) {
            return OperationOutcome::failed(format!("failed to save reminder: {e}"))
                .with_warnings(warnings);
        }

        info!(reminder_id = %id, "reminder updated");
        let event = Event::ReminderUpdated {
            reminder_id: updated.id.clone(),
            status: updated.status,
            due_date: updated.due_date,
            at: now,
        };
        OperationOutcome::ok(updated)
            .with_warnings(warnings)
            .with_events(vec![event])
    }

    /// Mark one occurrence done.
    ///
    /// Recurring reminders move to the next due date and stay PENDING;
    /// one-shot reminders become COMPLETED. When the reminder auto-creates
    /// transactions, the ledger is called after the completion is saved.
    pub fn complete(&mut self, id: &str) -> OperationOutcome<Reminder> {
        let Some(index) = self.position(id) else {
            return not_found(id);
        };
        let now = self.clock.now();

        let mut r = self.reminders[index].clone();
        if r.is_finished() {
            return OperationOutcome::failed(format!(
                "reminder '{id}' is {} and cannot be completed",
                r.status
            ));
        }

        let mut warnings = Vec::new();
        self.cancel_notification(id, &mut warnings);

        r.completed_count = r.completed_count.saturating_add(1);
        r.last_completed = Some(now);
        r.snooze_until = None;
        r.updated_at = Some(now);
        if r.is_recurring {
            r.due_date = next_due_date_with(r.due_date, r.frequency, Some(self.custom_interval_for(&r)));
            r.status = ReminderStatus::Pending;
            r.next_due = self.following_due(&r);
        } else {
            r.status = ReminderStatus::Completed;
            r.next_due = None;
        }
        self.schedule_if_wanted(&r, &mut warnings);

        let mut next = self.reminders.clone();
        next[index] = r.clone();
        if let Err(e) = self.commit(next, &[id.to_string()], &mut warnings) {
            return OperationOutcome::failed(format!("failed to save completion: {e}"))
                .with_warnings(warnings);
        }

        info!(reminder_id = %id, completed_count = r.completed_count, "reminder completed");
        let mut events = vec![Event::ReminderCompleted {
            reminder_id: r.id.clone(),
            completed_count: r.completed_count,
            next_due: r.is_recurring.then_some(r.due_date),
            at: now,
        }];

        if let Some(request) = TransactionRequest::from_reminder(&r, now) {
            match self.transactions.create_transaction(&request) {
                Ok(()) => events.push(Event::TransactionRequested {
                    reminder_id: request.reminder_id,
                    amount: request.amount,
                    transaction_type: request.transaction_type,
                    wallet_id: request.wallet_id,
                    at: now,
                }),
                Err(e) => {
                    warn!(reminder_id = %id, error = %e, "auto-created transaction failed");
                    warnings.push(Warning::TransactionFailed {
                        reminder_id: id.to_string(),
                        message: e.to_string(),
                    });
                }
            }
        }

        OperationOutcome::ok(r)
            .with_warnings(warnings)
            .with_events(events)
    }

    /// Hold off the overdue transition for `minutes`. Status, due date and
    /// the scheduled notification are untouched.
    pub fn snooze(&mut self, id: &str, minutes: u32) -> OperationOutcome<Reminder> {
        let Some(index) = self.position(id) else {
            return not_found(id);
        };
        let now = self.clock.now();

        let mut r = self.reminders[index].clone();
        if r.is_finished() {
            return OperationOutcome::failed(format!(
                "reminder '{id}' is {} and cannot be snoozed",
                r.status
            ));
        }
        let until = now + Duration::minutes(i64::from(minutes));
        r.snooze_until = Some(until);
        r.updated_at = Some(now);

        let mut warnings = Vec::new();
        let mut next = self.reminders.clone();
        next[index] = r.clone();
        if let Err(e) = self.commit(next, &[], &mut warnings) {
            return OperationOutcome::failed(format!("failed to save snooze: {e}"))
                .with_warnings(warnings);
        }

        info!(reminder_id = %id, until = %until, "reminder snoozed");
        let event = Event::ReminderSnoozed {
            reminder_id: r.id.clone(),
            until,
            at: now,
        };
        OperationOutcome::ok(r).with_events(vec![event])
    }

    /// Remove the reminder and its notification. The value is the removed
    /// reminder.
    pub fn delete(&mut self, id: &str) -> OperationOutcome<Reminder> {
        let Some(index) = self.position(id) else {
            return not_found(id);
        };
        let now = self.clock.now();

        let mut warnings = Vec::new();
        self.cancel_notification(id, &mut warnings);

        let mut next = self.reminders.clone();
        let removed = next.remove(index);
        if let Err(e) = self.commit(next, &[id.to_string()], &mut warnings) {
            return OperationOutcome::failed(format!("failed to delete reminder: {e}"))
                .with_warnings(warnings);
        }

        info!(reminder_id = %id, "reminder deleted");
        let event = Event::ReminderDeleted {
            reminder_id: removed.id.clone(),
            at: now,
        };
        OperationOutcome::ok(removed)
            .with_warnings(warnings)
            .with_events(vec![event])
    }

    /// Stop the reminder for good without deleting it.
    pub fn cancel(&mut self, id: &str) -> OperationOutcome<Reminder> {
        let Some(index) = self.position(id) else {
            return not_found(id);
        };
        let now = self.clock.now();

        let mut warnings = Vec::new();
        self.cancel_notification(id, &mut warnings);

        let mut r = self.reminders[index].clone();
        r.status = ReminderStatus::Cancelled;
        r.snooze_until = None;
        r.next_due = None;
        r.updated_at = Some(now);

        let mut next = self.reminders.clone();
        next[index] = r.clone();
        if let Err(e) = self.commit(next, &[id.to_string()], &mut warnings) {
            return OperationOutcome::failed(format!("failed to save reminder: {e}"))
                .with_warnings(warnings);
        }

        info!(reminder_id = %id, "reminder cancelled");
        let event = Event::ReminderCancelled {
            reminder_id: r.id.clone(),
            at: now,
        };
        OperationOutcome::ok(r)
            .with_warnings(warnings)
            .with_events(vec![event])
    }

    /// Suppress or re-enable a reminder's notifications.
    pub fn set_active(&mut self, id: &str, active: bool) -> OperationOutcome<Reminder> {
        self.edit(
            id,
            ReminderPatch {
                is_active: Some(active),
                ..Default::default()
            },
        )
    }

    // ── Internals ────────────────────────────────────────────────────

    fn position(&self, id: &str) -> Option<usize> {
        self.reminders.iter().position(|r| r.id == id)
    }

    fn custom_interval_for(&self, reminder: &Reminder) -> CustomInterval {
        reminder
            .custom_interval
            .unwrap_or(self.default_custom_interval)
    }

    /// Occurrence after `reminder.due_date`, for recurring reminders.
    fn following_due(&self, reminder: &Reminder) -> Option<DateTime<Utc>> {
        reminder.is_recurring.then(|| {
            next_due_date_with(
                reminder.due_date,
                reminder.frequency,
                Some(self.custom_interval_for(reminder)),
            )
        })
    }

    fn schedule_if_wanted(&mut self, reminder: &Reminder, warnings: &mut Vec<Warning>) {
        if !reminder.wants_notification() {
            return;
        }
        match self.reconciler.schedule_for(reminder) {
            Ok(Some(_)) => {}
            Ok(None) => warnings.push(Warning::PermissionDenied {
                reminder_id: reminder.id.clone(),
            }),
            Err(e) => {
                warn!(reminder_id = %reminder.id, error = %e, "failed to schedule notification");
                warnings.push(Warning::NotificationFailed {
                    reminder_id: reminder.id.clone(),
                    message: e.to_string(),
                });
            }
        }
    }

    fn cancel_notification(&mut self, id: &str, warnings: &mut Vec<Warning>) {
        if let Err(e) = self.reconciler.cancel_for(id) {
            warn!(reminder_id = %id, error = %e, "failed to cancel notification");
            warnings.push(Warning::NotificationFailed {
                reminder_id: id.to_string(),
                message: e.to_string(),
            });
        }
    }

    /// Persist `next` as the new snapshot. On failure the in-memory snapshot
    /// is kept and notifications for `touched` are put back in line with it.
    fn commit(
        &mut self,
        mut next: Vec<Reminder>,
        touched: &[String],
        warnings: &mut Vec<Warning>,
    ) -> Result<(), CoreError> {
        next.sort_by_key(|r| r.due_date);
        if let Err(e) = self.store.persist(&next) {
            error!(error = %e, "failed to persist reminders");
            for id in touched {
                self.restore_notification(id, warnings);
            }
            return Err(e.into());
        }
        self.reminders = next;
        Ok(())
    }

    fn restore_notification(&mut self, id: &str, warnings: &mut Vec<Warning>) {
        match self.get(id).cloned() {
            Some(previous) if previous.wants_notification() => {
                self.schedule_if_wanted(&previous, warnings);
            }
            _ => self.cancel_notification(id, warnings),
        }
    }
}

fn not_found<T>(id: &str) -> OperationOutcome<T> {
    OperationOutcome::failed(CoreError::NotFound(id.to_string()).to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::notify::StaticPermission;
    use crate::notify::KvNotificationScheduler;
    use crate::reminder::Frequency;
    use crate::storage::MemoryStore;
    use chrono::TimeZone;

    fn start() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 10, 8, 0, 0).unwrap()
    }

    fn service() -> (ReminderService, Arc<MemoryStore>, ManualClock) {
        let kv = Arc::new(MemoryStore::new());
        let clock = ManualClock::new(start());
        let reconciler = NotificationReconciler::new(
            Box::new(KvNotificationScheduler::new(Box::new(Arc::new(MemoryStore::new())))),
            Box::new(StaticPermission::granted()),
        );
        let service = ReminderService::new(ReminderStore::new(Box::new(kv.clone())), reconciler)
            .with_clock(Box::new(clock.clone()));
        (service, kv, clock)
    }

    #[test]
    fn create_rejects_blank_title() {
        let (mut svc, _, _) = service();
        let outcome = svc.create(ReminderDraft::new(" ", start()));
        assert!(!outcome.success);
        assert!(svc.reminders().is_empty());
        assert!(svc.reconciler().is_empty());
    }

    #[test]
    fn create_sets_next_due_for_recurring() {
        let (mut svc, _, _) = service();
        let r = svc
            .create(ReminderDraft::new("Rent", start()).recurring(Frequency::Weekly))
            .into_result()
            .unwrap();
        assert_eq!(r.next_due, Some(start() + Duration::weeks(1)));
        assert_eq!(r.created_at, Some(start()));
    }

    #[test]
    fn unknown_id_fails_every_operation() {
        let (mut svc, _, _) = service();
        assert!(!svc.edit("nope", ReminderPatch::default()).success);
        assert!(!svc.complete("nope").success);
        assert!(!svc.snooze("nope", 5).success);
        assert!(!svc.delete("nope").success);
        assert!(!svc.cancel("nope").success);
        assert_eq!(
            svc.delete("nope").message.as_deref(),
            Some("Reminder 'nope' not found")
        );
    }

    #[test]
    fn completed_one_shot_cannot_complete_again() {
        let (mut svc, _, _) = service();
        let id = svc.create(ReminderDraft::new("Tax", start())).value.unwrap().id;
        assert!(svc.complete(&id).success);
        let again = svc.complete(&id);
        assert!(!again.success);
        assert_eq!(svc.get(&id).unwrap().completed_count, 1);
    }

    #[test]
    fn edit_moving_overdue_into_future_makes_pending() {
        let (mut svc, _, clock) = service();
        let id = svc.create(ReminderDraft::new("Card", start())).value.unwrap().id;
        clock.advance(Duration::hours(1));
        assert_eq!(svc.sweep().value, Some(1));
        assert!(!svc.reconciler().is_scheduled(&id));

        let outcome = svc.edit(
            &id,
            ReminderPatch {
                due_date: Some(start() + Duration::days(2)),
                ..Default::default()
            },
        );
        let r = outcome.value.unwrap();
        assert_eq!(r.status, ReminderStatus::Pending);
        assert!(svc.reconciler().is_scheduled(&id));
    }

    #[test]
    fn set_active_toggles_notification() {
        let (mut svc, _, _) = service();
        let id = svc
            .create(ReminderDraft::new("Loan", start() + Duration::days(3)))
            .value
            .unwrap()
            .id;
        assert!(svc.reconciler().is_scheduled(&id));
        assert!(svc.set_active(&id, false).success);
        assert!(!svc.reconciler().is_scheduled(&id));
        assert!(svc.set_active(&id, true).success);
        assert!(svc.reconciler().is_scheduled(&id));
    }

    #[test]
    fn cancel_clears_notification_and_blocks_completion() {
        let (mut svc, _, _) = service();
        let id = svc
            .create(ReminderDraft::new("Gym", start() + Duration::days(1)).recurring(Frequency::Monthly))
            .value
            .unwrap()
            .id;
        let r = svc.cancel(&id).value.unwrap();
        assert_eq!(r.status, ReminderStatus::Cancelled);
        assert!(!svc.reconciler().is_scheduled(&id));
        assert!(!svc.complete(&id).success);
        assert!(!svc.snooze(&id, 10).success);
    }

    #[test]
    fn summary_counts_open_amounts() {
        let (mut svc, _, _) = service();
        let later = start() + Duration::days(5);
        svc.create(ReminderDraft::new("Rent", later).with_transaction(900.0, TransactionType::Expense, "w"));
        svc.create(ReminderDraft::new("Salary", later).with_transaction(3000.0, TransactionType::Income, "w"));
        let paused = svc
            .create(ReminderDraft::new("Paused", later).with_transaction(50.0, TransactionType::Expense, "w"))
            .value
            .unwrap()
            .id;
        svc.set_active(&paused, false);

        let summary = svc.summary();
        assert_eq!(summary.total, 3);
        assert_eq!(summary.pending, 3);
        assert_eq!(summary.inactive, 1);
        assert_eq!(summary.open_expense, 900.0);
        assert_eq!(summary.open_income, 3000.0);
        assert_eq!(summary.scheduled_notifications, 2);
    }

    #[test]
    fn upcoming_filters_by_horizon() {
        let (mut svc, _, _) = service();
        svc.create(ReminderDraft::new("Soon", start() + Duration::days(1)));
        svc.create(ReminderDraft::new("Later", start() + Duration::days(40)));
        let soon: Vec<_> = svc
            .upcoming(Duration::days(7))
            .into_iter()
            .map(|r| r.title.clone())
            .collect();
        assert_eq!(soon, vec!["Soon".to_string()]);
    }

    #[test]
    fn failed_persist_keeps_previous_state_and_notification() {
        let (mut svc, kv, _) = service();
        let id = svc
            .create(ReminderDraft::new("Water", start() + Duration::days(1)))
            .value
            .unwrap()
            .id;
        let before = svc.reconciler().notification_id(&id).cloned();

        kv.set_fail_writes(true);
        let outcome = svc.edit(
            &id,
            ReminderPatch {
                due_date: Some(start() + Duration::days(9)),
                ..Default::default()
            },
        );
        assert!(!outcome.success);
        assert!(outcome.message.unwrap().contains("failed to save"));
        assert_eq!(svc.get(&id).unwrap().due_date, start() + Duration::days(1));
        assert!(svc.reconciler().is_scheduled(&id));
        assert_ne!(svc.reconciler().notification_id(&id).cloned(), before);

        let failed_create = svc.create(ReminderDraft::new("Ghost", start() + Duration::days(2)));
        assert!(!failed_create.success);
        assert_eq!(svc.reminders().len(), 1);
        assert_eq!(svc.reconciler().len(), 1);
    }

    #[test]
    fn upcoming_with_huge_window_saturates() {
        let (mut svc, _, _) = service();
        svc.create(ReminderDraft::new("Far", start() + Duration::days(3650)));
        svc.create(ReminderDraft::new("Past", start() - Duration::days(1)));
        let all = svc.upcoming(Duration::MAX);
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].title, "Far");
        assert!(svc.upcoming(Duration::MIN).is_empty());
    }

    #[test]
    fn edit_to_recurring_reopens_completed_reminder() {
        let (mut svc, _, _) = service();
        let id = svc.create(ReminderDraft::new("Tax", start())).value.unwrap().id;
        assert!(svc.complete(&id).success);

        let r = svc
            .edit(
                &id,
                ReminderPatch {
                    is_recurring: Some(true),
                    frequency: Some(Frequency::Monthly),
                    ..Default::default()
                },
            )
            .into_result()
            .unwrap();
        assert_eq!(r.status, ReminderStatus::Pending);
        assert_eq!(r.due_date, start() + chrono::Months::new(1));
        assert_eq!(r.completed_count, 1);
        assert!(svc.reconciler().is_scheduled(&id));
    }
}
