//! Overdue sweeping: one-shot and long-running.

use billminder_core::sweeper::run_periodic;
use billminder_core::{Clock, Config, KvNotificationScheduler, SystemClock};
use clap::Subcommand;
use tokio::sync::{mpsc, oneshot};
use tracing::{info, warn};

use super::{notification_scheduler, open_service, print_notice, settle, CliResult};

#[derive(Subcommand)]
pub enum SweepAction {
    /// Mark due reminders overdue once and exit
    Once,
    /// Keep sweeping and delivering notifications until Ctrl-C
    Watch {
        /// Seconds between sweeps (defaults to sweeper.interval_secs)
        #[arg(long)]
        interval: Option<u64>,
    },
}

pub fn run(action: SweepAction) -> CliResult {
    let config = Config::load()?;
    match action {
        SweepAction::Once => {
            // Startup already sweeps when sweep_on_refresh is set.
            let mut service = open_service(&config)?;
            let count = settle(service.sweep())?;
            println!("{} reminder(s) overdue", service.overdue().len());
            if count > 0 {
                println!("{count} newly overdue");
            }
            Ok(())
        }
        SweepAction::Watch { interval } => {
            let period = interval
                .map(std::time::Duration::from_secs)
                .unwrap_or_else(|| config.sweep_interval());
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()?;
            runtime.block_on(watch(config, period))
        }
    }
}

async fn watch(config: Config, period: std::time::Duration) -> CliResult {
    let service = open_service(&config)?.into_shared();
    let delivery = notification_scheduler(&config)?;

    let (notice_tx, mut notice_rx) = mpsc::unbounded_channel();
    let (stop_tx, stop_rx) = oneshot::channel();
    let sweeper = tokio::spawn(run_periodic(service.clone(), period, notice_tx, stop_rx));
    println!("Watching reminders every {}s. Press Ctrl-C to stop.", period.as_secs());

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);
    let mut ticker = tokio::time::interval(period);
    loop {
        tokio::select! {
            _ = &mut ctrl_c => break,
            Some(event) = notice_rx.recv() => print_notice(&event),
            _ = ticker.tick() => {
                // Delivery shares the schedule key with the reconciler.
                let _guard = service.lock().await;
                deliver_due(&delivery);
            }
        }
    }

    info!("shutting down");
    let _ = stop_tx.send(());
    if let Err(e) = sweeper.await {
        warn!(error = %e, "sweeper task ended abnormally");
    }
    Ok(())
}

fn deliver_due(delivery: &KvNotificationScheduler) {
    match delivery.take_due(SystemClock.now()) {
        Ok(due) => {
            for n in due {
                println!("reminder: {}: {}", n.title, n.body);
            }
        }
        Err(e) => warn!(error = %e, "could not read notification schedule"),
    }
}
