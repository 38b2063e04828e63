//! Reminder lifecycle commands for CLI.

use billminder_core::recurrence::occurrences;
use billminder_core::{
    Config, CustomInterval, Frequency, IntervalUnit, Reminder, ReminderDraft, ReminderPatch,
    ReminderStatus, TransactionType,
};
use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, Utc};
use clap::Subcommand;

use super::{open_service, settle, CliResult};

#[derive(Subcommand)]
pub enum ReminderAction {
    /// Create a reminder
    Add {
        /// Reminder title
        title: String,
        /// Due date: RFC 3339, "YYYY-MM-DD HH:MM" or "YYYY-MM-DD" (UTC)
        #[arg(long, value_parser = parse_due)]
        due: DateTime<Utc>,
        /// Free-text description
        #[arg(long)]
        description: Option<String>,
        /// Amount of money involved
        #[arg(long)]
        amount: Option<f64>,
        /// Transaction type: expense or income
        #[arg(long = "type", value_parser = parse_transaction_type)]
        transaction_type: Option<TransactionType>,
        /// Wallet the money moves through
        #[arg(long)]
        wallet: Option<String>,
        /// Category identifier
        #[arg(long)]
        category: Option<String>,
        /// Repeat: daily, weekly, monthly, quarterly, yearly or custom
        #[arg(long, value_parser = parse_frequency)]
        repeat: Option<Frequency>,
        /// Step count for custom repeats
        #[arg(long)]
        every: Option<u32>,
        /// Step unit for custom repeats: days or weeks
        #[arg(long, value_parser = parse_unit, default_value = "days")]
        unit: IntervalUnit,
        /// Minutes before the due date to notify
        #[arg(long, default_value = "0")]
        notify_before: u32,
        /// Create a transaction when completed
        #[arg(long)]
        auto_transaction: bool,
        /// Disable the push notification
        #[arg(long)]
        no_push: bool,
        /// Create the reminder inactive
        #[arg(long)]
        inactive: bool,
    },
    /// List reminders
    List {
        /// Filter by status (pending, overdue, completed, cancelled)
        #[arg(long)]
        status: Option<String>,
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show one reminder as JSON
    Show {
        /// Reminder ID
        id: String,
    },
    /// Update a reminder
    Edit {
        /// Reminder ID
        id: String,
        /// New title
        #[arg(long)]
        title: Option<String>,
        /// New due date
        #[arg(long, value_parser = parse_due)]
        due: Option<DateTime<Utc>>,
        /// New description
        #[arg(long)]
        description: Option<String>,
        /// New amount
        #[arg(long)]
        amount: Option<f64>,
        /// New repeat frequency
        #[arg(long, value_parser = parse_frequency)]
        repeat: Option<Frequency>,
        /// Stop repeating
        #[arg(long, conflicts_with = "repeat")]
        once: bool,
        /// New notification lead time in minutes
        #[arg(long)]
        notify_before: Option<u32>,
        /// Enable or disable the push notification
        #[arg(long)]
        push: Option<bool>,
    },
    /// Mark the current occurrence as done
    Complete {
        /// Reminder ID
        id: String,
    },
    /// Postpone the overdue transition
    Snooze {
        /// Reminder ID
        id: String,
        /// Minutes to snooze for
        #[arg(long, default_value = "15")]
        minutes: u32,
    },
    /// Delete a reminder
    Delete {
        /// Reminder ID
        id: String,
    },
    /// Cancel a reminder without deleting it
    Cancel {
        /// Reminder ID
        id: String,
    },
    /// Re-enable a reminder
    Activate {
        /// Reminder ID
        id: String,
    },
    /// Suppress a reminder's notifications
    Deactivate {
        /// Reminder ID
        id: String,
    },
    /// Pending reminders due soon
    Upcoming {
        /// Look-ahead window in days
        #[arg(long, default_value = "7")]
        days: i64,
    },
    /// Counts and open amounts
    Summary,
    /// Preview the next due dates of a reminder
    Preview {
        /// Reminder ID
        id: String,
        /// Number of occurrences to show
        #[arg(long, default_value = "5")]
        count: usize,
    },
}

pub fn run(action: ReminderAction) -> CliResult {
    let config = Config::load()?;
    let mut service = open_service(&config)?;

    match action {
        ReminderAction::Add {
            title,
            due,
            description,
            amount,
            transaction_type,
            wallet,
            category,
            repeat,
            every,
            unit,
            notify_before,
            auto_transaction,
            no_push,
            inactive,
        } => {
            let mut draft = ReminderDraft::new(title, due)
                .notify_before(notify_before)
                .auto_create(auto_transaction)
                .push(!no_push)
                .active(!inactive);
            if let Some(description) = description {
                draft = draft.with_description(description);
            }
            if let Some(frequency) = repeat {
                draft = draft.recurring(frequency);
            }
            if let Some(count) = every {
                draft = draft.every(CustomInterval { unit, count });
            }
            draft.amount = amount;
            draft.transaction_type = transaction_type;
            draft.wallet_id = wallet;
            draft.category_id = category;

            let reminder = settle(service.create(draft))?;
            println!("Reminder created: {}", reminder.id);
            println!("{}", serde_json::to_string_pretty(&reminder)?);
        }
        ReminderAction::List { status, json } => {
            let wanted = status.map(|s| s.to_ascii_uppercase());
            let reminders: Vec<&Reminder> = service
                .reminders()
                .iter()
                .filter(|r| wanted.as_deref().map_or(true, |s| r.status.to_string() == s))
                .collect();
            if json {
                println!("{}", serde_json::to_string_pretty(&reminders)?);
            } else if reminders.is_empty() {
                println!("No reminders.");
            } else {
                for r in reminders {
                    println!("{}", line(r));
                }
            }
        }
        ReminderAction::Show { id } => match service.get(&id) {
            Some(r) => println!("{}", serde_json::to_string_pretty(r)?),
            None => return Err(format!("Reminder '{id}' not found").into()),
        },
        ReminderAction::Edit {
            id,
            title,
            due,
            description,
            amount,
            repeat,
            once,
            notify_before,
            push,
        } => {
            let mut patch = ReminderPatch {
                title,
                due_date: due,
                description: description.map(Some),
                amount: amount.map(Some),
                notify_before,
                enable_push_notification: push,
                ..Default::default()
            };
            if let Some(frequency) = repeat {
                patch.frequency = Some(frequency);
                patch.is_recurring = Some(true);
            }
            if once {
                patch.is_recurring = Some(false);
            }
            if patch.is_empty() {
                return Err("nothing to update".into());
            }
            let reminder = settle(service.edit(&id, patch))?;
            println!("Reminder updated: {}", reminder.id);
            println!("{}", serde_json::to_string_pretty(&reminder)?);
        }
        ReminderAction::Complete { id } => {
            let reminder = settle(service.complete(&id))?;
            match reminder.status {
                ReminderStatus::Completed => println!("Reminder completed: {}", reminder.title),
                _ => println!(
                    "Reminder completed: {} (next due {})",
                    reminder.title,
                    fmt_date(reminder.due_date)
                ),
            }
        }
        ReminderAction::Snooze { id, minutes } => {
            let reminder = settle(service.snooze(&id, minutes))?;
            if let Some(until) = reminder.snooze_until {
                println!("Reminder snoozed until {}", fmt_date(until));
            }
        }
        ReminderAction::Delete { id } => {
            let reminder = settle(service.delete(&id))?;
            println!("Reminder deleted: {}", reminder.title);
        }
        ReminderAction::Cancel { id } => {
            let reminder = settle(service.cancel(&id))?;
            println!("Reminder cancelled: {}", reminder.title);
        }
        ReminderAction::Activate { id } => {
            let reminder = settle(service.set_active(&id, true))?;
            println!("Reminder activated: {}", reminder.title);
        }
        ReminderAction::Deactivate { id } => {
            let reminder = settle(service.set_active(&id, false))?;
            println!("Reminder deactivated: {}", reminder.title);
        }
        ReminderAction::Upcoming { days } => {
            let upcoming = service.upcoming(window_days(days));
            if upcoming.is_empty() {
                println!("Nothing due in the next {days} days.");
            }
            for r in upcoming {
                println!("{}", line(r));
            }
        }
        ReminderAction::Summary => {
            println!("{}", serde_json::to_string_pretty(&service.summary())?);
        }
        ReminderAction::Preview { id, count } => {
            let r = service
                .get(&id)
                .ok_or_else(|| format!("Reminder '{id}' not found"))?;
            if !r.is_recurring {
                println!("{} does not repeat; due {}", r.title, fmt_date(r.due_date));
                return Ok(());
            }
            let custom = r.custom_interval.or(Some(config.recurrence.custom_interval()));
            println!("{}", fmt_date(r.due_date));
            for at in occurrences(r.due_date, r.frequency, custom, count.saturating_sub(1)) {
                println!("{}", fmt_date(at));
            }
        }
    }
    Ok(())
}

fn line(r: &Reminder) -> String {
    let amount = match (r.amount, r.transaction_type) {
        (Some(a), Some(TransactionType::Income)) => format!(" +{a:.2}"),
        (Some(a), _) => format!(" {a:.2}"),
        (None, _) => String::new(),
    };
    let repeat = if r.is_recurring {
        format!(" [{}]", r.frequency)
    } else {
        String::new()
    };
    let inactive = if r.is_active { "" } else { " (inactive)" };
    format!(
        "{}  {:<9}  {}  {}{}{}{}",
        r.id,
        r.status,
        fmt_date(r.due_date),
        r.title,
        amount,
        repeat,
        inactive
    )
}

/// Look-ahead window; negative counts are empty, huge ones saturate.
fn window_days(days: i64) -> Duration {
    Duration::try_days(days.max(0)).unwrap_or(Duration::MAX)
}

fn fmt_date(at: DateTime<Utc>) -> String {
    at.format("%Y-%m-%d %H:%M").to_string()
}

fn parse_due(s: &str) -> Result<DateTime<Utc>, String> {
    if let Ok(at) = DateTime::parse_from_rfc3339(s) {
        return Ok(at.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M") {
        return Ok(naive.and_utc());
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map(|d| d.and_time(chrono::NaiveTime::MIN).and_utc())
        .map_err(|_| format!("invalid date '{s}'"))
}

fn parse_frequency(s: &str) -> Result<Frequency, String> {
    match s.to_ascii_lowercase().as_str() {
        "daily" | "weekly" | "monthly" | "quarterly" | "yearly" | "custom" => {
            Ok(Frequency::parse_lenient(s))
        }
        _ => Err(format!(
            "unknown frequency '{s}' (daily, weekly, monthly, quarterly, yearly, custom)"
        )),
    }
}

fn parse_transaction_type(s: &str) -> Result<TransactionType, String> {
    match s.to_ascii_lowercase().as_str() {
        "expense" => Ok(TransactionType::Expense),
        "income" => Ok(TransactionType::Income),
        _ => Err(format!("unknown transaction type '{s}' (expense, income)")),
    }
}

fn parse_unit(s: &str) -> Result<IntervalUnit, String> {
    match s.to_ascii_lowercase().as_str() {
        "days" | "day" => Ok(IntervalUnit::Days),
        "weeks" | "week" => Ok(IntervalUnit::Weeks),
        _ => Err(format!("unknown unit '{s}' (days, weeks)")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_parse_due_formats() {
        let expected = Utc.with_ymd_and_hms(2025, 3, 1, 9, 30, 0).unwrap();
        assert_eq!(parse_due("2025-03-01T09:30:00Z").unwrap(), expected);
        assert_eq!(parse_due("2025-03-01T10:30:00+01:00").unwrap(), expected);
        assert_eq!(parse_due("2025-03-01 09:30").unwrap(), expected);
        assert_eq!(
            parse_due("2025-03-01").unwrap(),
            Utc.with_ymd_and_hms(2025, 3, 1, 0, 0, 0).unwrap()
        );
        assert!(parse_due("next tuesday").is_err());
    }

    #[test]
    fn test_window_days_saturates() {
        assert_eq!(window_days(7), Duration::days(7));
        assert_eq!(window_days(-3), Duration::zero());
        assert_eq!(window_days(i64::MAX), Duration::MAX);
    }

    #[test]
    fn test_parse_frequency_is_strict() {
        assert_eq!(parse_frequency("Quarterly").unwrap(), Frequency::Quarterly);
        assert!(parse_frequency("fortnightly").is_err());
    }

    #[test]
    fn test_parse_transaction_type() {
        assert_eq!(parse_transaction_type("INCOME").unwrap(), TransactionType::Income);
        assert!(parse_transaction_type("transfer").is_err());
    }
}
