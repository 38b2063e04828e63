//! Periodic sweeper tests on a paused tokio clock.

mod common;

use std::time::Duration as StdDuration;

use billminder_core::sweeper::run_periodic;
use billminder_core::{Event, ReminderDraft, ReminderStatus};
use chrono::Duration;
use common::{utc, Harness};
use tokio::sync::{mpsc, oneshot};

#[tokio::test(start_paused = true)]
async fn test_periodic_sweep_emits_each_overdue_notice_once() {
    let h = Harness::new(utc(2025, 8, 1, 9, 0));
    let service = h.service().into_shared();
    let id = {
        let mut svc = service.lock().await;
        svc.create(ReminderDraft::new("Internet", utc(2025, 8, 1, 9, 2)))
            .value
            .unwrap()
            .id
    };

    let (tx, mut rx) = mpsc::unbounded_channel();
    let (stop_tx, stop_rx) = oneshot::channel();
    let handle = tokio::spawn(run_periodic(
        service.clone(),
        StdDuration::from_secs(60),
        tx,
        stop_rx,
    ));

    tokio::time::sleep(StdDuration::from_secs(1)).await;
    assert!(rx.try_recv().is_err());

    h.clock.advance(Duration::minutes(3));
    tokio::time::sleep(StdDuration::from_secs(60)).await;
    match rx.try_recv() {
        Ok(Event::ReminderOverdue { reminder_id, .. }) => assert_eq!(reminder_id, id),
        other => panic!("expected overdue notice, got {other:?}"),
    }

    tokio::time::sleep(StdDuration::from_secs(180)).await;
    assert!(rx.try_recv().is_err());

    {
        let svc = service.lock().await;
        assert_eq!(svc.get(&id).unwrap().status, ReminderStatus::Overdue);
        assert!(!svc.reconciler().is_scheduled(&id));
    }

    stop_tx.send(()).unwrap();
    handle.await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_periodic_sweep_stops_when_receiver_dropped() {
    let h = Harness::new(utc(2025, 8, 1, 9, 0));
    let service = h.service().into_shared();
    service
        .lock()
        .await
        .create(ReminderDraft::new("Old", utc(2025, 7, 1, 9, 0)));

    let (tx, rx) = mpsc::unbounded_channel();
    let (_stop_tx, stop_rx) = oneshot::channel();
    drop(rx);

    let handle = tokio::spawn(run_periodic(
        service.clone(),
        StdDuration::from_secs(60),
        tx,
        stop_rx,
    ));
    handle.await.unwrap();

    let svc = service.lock().await;
    assert_eq!(svc.overdue().len(), 1);
}
