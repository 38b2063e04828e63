//! Overdue sweeper.
//!
//! One transition only: PENDING -> OVERDUE, once wall-clock time has passed
//! the due date and any snooze. [`OverdueSweeper::sweep`] mutates a snapshot in
//! place and reports what changed; it never persists. The lifecycle layer
//! persists the result and turns the report into notices. Sweeping an already
//! swept snapshot changes nothing, so back-to-back sweeps notify at most once.

use chrono::{DateTime, Utc};
use tokio::sync::{mpsc, oneshot};
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::events::Event;
use crate::lifecycle::SharedReminderService;
use crate::reminder::{Reminder, ReminderStatus};

/// Whether `reminder` should become OVERDUE at `now`.
pub fn should_mark_overdue(reminder: &Reminder, now: DateTime<Utc>) -> bool {
    reminder.status == ReminderStatus::Pending
        && reminder.is_active
        && now > reminder.due_date
        && reminder.snooze_until.map_or(true, |until| now > until)
}

/// One reminder that went overdue during a sweep.
#[derive(Debug, Clone, PartialEq)]
pub struct OverdueTransition {
    pub reminder_id: String,
    pub title: String,
    pub due_date: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SweepReport {
    pub at: DateTime<Utc>,
    pub newly_overdue: Vec<OverdueTransition>,
}

impl SweepReport {
    pub fn is_empty(&self) -> bool {
        self.newly_overdue.is_empty()
    }

    /// One `ReminderOverdue` notice per transition.
    pub fn events(&self) -> Vec<Event> {
        self.newly_overdue
            .iter()
            .map(|t| Event::ReminderOverdue {
                reminder_id: t.reminder_id.clone(),
                title: t.title.clone(),
                due_date: t.due_date,
                at: self.at,
            })
            .collect()
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct OverdueSweeper;

impl OverdueSweeper {
    /// Apply the overdue transition to every matching reminder.
    pub fn sweep(reminders: &mut [Reminder], now: DateTime<Utc>) -> SweepReport {
        let mut newly_overdue = Vec::new();
        for reminder in reminders.iter_mut() {
            if should_mark_overdue(reminder, now) {
                reminder.status = ReminderStatus::Overdue;
                reminder.updated_at = Some(now);
                newly_overdue.push(OverdueTransition {
                    reminder_id: reminder.id.clone(),
                    title: reminder.title.clone(),
                    due_date: reminder.due_date,
                });
            }
        }
        if !newly_overdue.is_empty() {
            debug!(count = newly_overdue.len(), "reminders went overdue");
        }
        SweepReport { at: now, newly_overdue }
    }
}

/// Sweep `service` every `period` until `shutdown` fires or the notice
/// receiver is dropped. The first sweep runs immediately.
///
/// Each sweep holds the service lock for its whole duration, so it never
/// interleaves with a lifecycle operation.
pub async fn run_periodic(
    service: SharedReminderService,
    period: std::time::Duration,
    notices: mpsc::UnboundedSender<Event>,
    mut shutdown: oneshot::Receiver<()>,
) {
    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    info!(period_secs = period.as_secs(), "overdue sweeper started");

    loop {
        tokio::select! {
            _ = &mut shutdown => {
                info!("overdue sweeper stopping");
                return;
            }
            _ = ticker.tick() => {
                let outcome = service.lock().await.sweep();
                if !outcome.success {
                    warn!(message = ?outcome.message, "periodic sweep failed");
                }
                for event in outcome.events {
                    if notices.send(event).is_err() {
                        info!("notice receiver dropped; overdue sweeper stopping");
                        return;
                    }
                }
            }
        }
    }
}
