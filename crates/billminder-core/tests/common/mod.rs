//! Shared fakes for the external collaborators.
#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use billminder_core::{
    Clock, ManualClock, MemoryStore, NotificationError, NotificationId, NotificationPermission,
    NotificationReconciler, NotificationRequest, NotificationScheduler, ReminderService,
    ReminderStore, ScheduledNotification, TransactionError, TransactionRequest, TransactionSink,
};
use chrono::{DateTime, TimeZone, Utc};

// ============================================================================
// Notification scheduler
// ============================================================================

#[derive(Default)]
pub struct SchedulerLog {
    next: u32,
    pub live: Vec<(NotificationId, NotificationRequest)>,
    pub schedule_calls: Vec<NotificationRequest>,
    pub cancel_calls: Vec<NotificationId>,
    pub fail_schedule: bool,
    pub fail_cancel: bool,
}

#[derive(Clone, Default)]
pub struct FakeScheduler(pub Arc<Mutex<SchedulerLog>>);

impl FakeScheduler {
    pub fn live_count(&self) -> usize {
        self.0.lock().unwrap().live.len()
    }

    pub fn live_request(&self, id: &NotificationId) -> Option<NotificationRequest> {
        self.0
            .lock()
            .unwrap()
            .live
            .iter()
            .find(|(live, _)| live == id)
            .map(|(_, req)| req.clone())
    }

    pub fn cancel_calls(&self) -> Vec<NotificationId> {
        self.0.lock().unwrap().cancel_calls.clone()
    }

    pub fn schedule_call_count(&self) -> usize {
        self.0.lock().unwrap().schedule_calls.len()
    }

    pub fn set_fail_schedule(&self, fail: bool) {
        self.0.lock().unwrap().fail_schedule = fail;
    }

    pub fn set_fail_cancel(&self, fail: bool) {
        self.0.lock().unwrap().fail_cancel = fail;
    }
}

impl NotificationScheduler for FakeScheduler {
    fn schedule(&self, request: &NotificationRequest) -> Result<NotificationId, NotificationError> {
        let mut log = self.0.lock().unwrap();
        log.schedule_calls.push(request.clone());
        if log.fail_schedule {
            return Err(NotificationError::Unavailable("scheduler offline".into()));
        }
        log.next += 1;
        let id = NotificationId(format!("notif-{}", log.next));
        log.live.push((id.clone(), request.clone()));
        Ok(id)
    }

    fn cancel(&self, id: &NotificationId) -> Result<(), NotificationError> {
        let mut log = self.0.lock().unwrap();
        log.cancel_calls.push(id.clone());
        if log.fail_cancel {
            return Err(NotificationError::Unavailable("scheduler offline".into()));
        }
        log.live.retain(|(live, _)| live != id);
        Ok(())
    }

    fn list_scheduled(&self) -> Result<Vec<ScheduledNotification>, NotificationError> {
        Ok(self
            .0
            .lock()
            .unwrap()
            .live
            .iter()
            .map(|(id, req)| ScheduledNotification {
                id: id.clone(),
                payload: req.payload.clone(),
            })
            .collect())
    }
}

// ============================================================================
// Permission
// ============================================================================

#[derive(Clone)]
pub struct SwitchPermission(pub Arc<AtomicBool>);

impl SwitchPermission {
    pub fn new(granted: bool) -> Self {
        Self(Arc::new(AtomicBool::new(granted)))
    }

    pub fn set(&self, granted: bool) {
        self.0.store(granted, Ordering::SeqCst);
    }
}

impl NotificationPermission for SwitchPermission {
    fn has_permission(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    fn request_permission(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

// ============================================================================
// Transaction sink
// ============================================================================

#[derive(Clone, Default)]
pub struct RecordingSink {
    pub calls: Arc<Mutex<Vec<TransactionRequest>>>,
    pub fail: Arc<AtomicBool>,
}

impl RecordingSink {
    pub fn calls(&self) -> Vec<TransactionRequest> {
        self.calls.lock().unwrap().clone()
    }
}

impl TransactionSink for RecordingSink {
    fn create_transaction(&self, request: &TransactionRequest) -> Result<(), TransactionError> {
        self.calls.lock().unwrap().push(request.clone());
        if self.fail.load(Ordering::SeqCst) {
            return Err(TransactionError::Unavailable("ledger down".into()));
        }
        Ok(())
    }
}

// ============================================================================
// Harness
// ============================================================================

pub struct Harness {
    pub kv: Arc<MemoryStore>,
    pub scheduler: FakeScheduler,
    pub permission: SwitchPermission,
    pub sink: RecordingSink,
    pub clock: ManualClock,
}

impl Harness {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            kv: Arc::new(MemoryStore::new()),
            scheduler: FakeScheduler::default(),
            permission: SwitchPermission::new(true),
            sink: RecordingSink::default(),
            clock: ManualClock::new(now),
        }
    }

    /// A service over this harness's collaborators. Several services built
    /// from one harness share store, scheduler and clock, like process restarts.
    pub fn service(&self) -> ReminderService {
        let reconciler = NotificationReconciler::new(
            Box::new(self.scheduler.clone()),
            Box::new(self.permission.clone()),
        );
        ReminderService::new(ReminderStore::new(Box::new(self.kv.clone())), reconciler)
            .with_transactions(Box::new(self.sink.clone()))
            .with_clock(Box::new(self.clock.clone()))
    }

    pub fn store(&self) -> ReminderStore {
        ReminderStore::new(Box::new(self.kv.clone()))
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }
}

pub fn utc(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
}

/// Mapping entry exists iff the reminder wants a notification, no entry
/// points at a missing reminder, and the scheduler holds exactly the mapped
/// notifications.
pub fn assert_reconciled(service: &ReminderService, scheduler: &FakeScheduler) {
    for r in service.reminders() {
        assert_eq!(
            service.reconciler().is_scheduled(&r.id),
            r.wants_notification(),
            "reconciliation invariant broken for {} ({:?})",
            r.title,
            r.status
        );
    }
    for id in service.reconciler().scheduled_reminders() {
        assert!(service.get(id).is_some(), "orphan mapping entry {id}");
    }
    assert_eq!(scheduler.live_count(), service.reconciler().len());
}
