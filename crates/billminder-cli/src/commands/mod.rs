//! Subcommand implementations and the wiring they share.

pub mod config;
pub mod reminder;
pub mod sweep;

use billminder_core::{
    Config, Database, Event, KvNotificationScheduler, NotificationReconciler, OperationOutcome,
    ReminderService, ReminderStore, StaticPermission, StorageError,
};

pub type CliResult = Result<(), Box<dyn std::error::Error>>;

/// Local notification schedule in the CLI's database.
pub fn notification_scheduler(config: &Config) -> Result<KvNotificationScheduler, StorageError> {
    Ok(KvNotificationScheduler::with_key(
        Box::new(Database::open()?),
        config.storage.notifications_key.clone(),
    ))
}

/// Build the service over the on-disk database and run startup
/// reconciliation, so every command sees swept, reconciled state.
pub fn open_service(config: &Config) -> Result<ReminderService, Box<dyn std::error::Error>> {
    let store = ReminderStore::with_key(
        Box::new(Database::open()?),
        config.storage.reminders_key.clone(),
    );
    let permission = if config.notifications.permission_granted {
        StaticPermission::granted()
    } else {
        StaticPermission::denied()
    };
    let reconciler = NotificationReconciler::new(
        Box::new(notification_scheduler(config)?),
        Box::new(permission),
    )
    .with_permission_prompt(config.notifications.request_permission);

    let mut service = ReminderService::new(store, reconciler).with_config(config);
    settle(service.startup())?;
    Ok(service)
}

/// Print warnings and notices, then turn the outcome into a `Result`.
pub fn settle<T>(outcome: OperationOutcome<T>) -> Result<T, Box<dyn std::error::Error>> {
    for warning in &outcome.warnings {
        eprintln!("warning: {warning}");
    }
    for event in &outcome.events {
        print_notice(event);
    }
    outcome.into_result().map_err(Into::into)
}

/// Transient notice for events the user should see outside the main output.
pub fn print_notice(event: &Event) {
    match event {
        Event::ReminderOverdue {
            title, due_date, ..
        } => eprintln!("overdue: {title} (was due {})", due_date.format("%Y-%m-%d %H:%M")),
        Event::TransactionRequested {
            amount,
            transaction_type,
            wallet_id,
            ..
        } => eprintln!("transaction requested: {transaction_type:?} {amount:.2} on wallet {wallet_id}"),
        _ => {}
    }
}
