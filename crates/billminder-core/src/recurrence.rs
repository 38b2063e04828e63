//! Recurrence engine: next due date for a frequency.
//!
//! Calendar-month steps clamp to the last day of the target month, so
//! `2025-01-31 + MONTHLY = 2025-02-28`. Each step clamps from the date it is
//! given; a reminder that was clamped to the 28th stays on the 28th afterwards.
//! Time of day is preserved.

use chrono::{DateTime, Duration, Months, Utc};

use crate::reminder::{CustomInterval, Frequency};

/// Next due date after `current` using the default custom interval (1 day).
pub fn next_due_date(current: DateTime<Utc>, frequency: Frequency) -> DateTime<Utc> {
    next_due_date_with(current, frequency, None)
}

/// Next due date after `current`. `custom` is only consulted for
/// [`Frequency::Custom`].
pub fn next_due_date_with(
    current: DateTime<Utc>,
    frequency: Frequency,
    custom: Option<CustomInterval>,
) -> DateTime<Utc> {
    match frequency {
        Frequency::Daily => add_duration(current, Duration::days(1)),
        Frequency::Weekly => add_duration(current, Duration::weeks(1)),
        Frequency::Monthly => add_months(current, 1),
        Frequency::Quarterly => add_months(current, 3),
        Frequency::Yearly => add_months(current, 12),
        Frequency::Custom => add_duration(current, custom.unwrap_or_default().step()),
    }
}

/// The next `n` due dates after `start`.
pub fn occurrences(
    start: DateTime<Utc>,
    frequency: Frequency,
    custom: Option<CustomInterval>,
    n: usize,
) -> Vec<DateTime<Utc>> {
    let mut out = Vec::with_capacity(n);
    let mut current = start;
    for _ in 0..n {
        current = next_due_date_with(current, frequency, custom);
        out.push(current);
    }
    out
}

fn add_months(current: DateTime<Utc>, months: u32) -> DateTime<Utc> {
    current
        .checked_add_months(Months::new(months))
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}

fn add_duration(current: DateTime<Utc>, step: Duration) -> DateTime<Utc> {
    current
        .checked_add_signed(step)
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, TimeZone, Timelike};
    use proptest::prelude::*;

    fn at(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 9, 30, 0).unwrap()
    }

    #[test]
    fn fixed_steps() {
        let d = at(2025, 3, 10);
        assert_eq!(next_due_date(d, Frequency::Daily), at(2025, 3, 11));
        assert_eq!(next_due_date(d, Frequency::Weekly), at(2025, 3, 17));
        assert_eq!(next_due_date(d, Frequency::Monthly), at(2025, 4, 10));
        assert_eq!(next_due_date(d, Frequency::Quarterly), at(2025, 6, 10));
        assert_eq!(next_due_date(d, Frequency::Yearly), at(2026, 3, 10));
    }

    #[test]
    fn month_end_clamps() {
        assert_eq!(next_due_date(at(2025, 1, 31), Frequency::Monthly), at(2025, 2, 28));
        assert_eq!(next_due_date(at(2024, 1, 31), Frequency::Monthly), at(2024, 2, 29));
        assert_eq!(next_due_date(at(2025, 3, 31), Frequency::Monthly), at(2025, 4, 30));
        assert_eq!(next_due_date(at(2025, 11, 30), Frequency::Quarterly), at(2026, 2, 28));
        assert_eq!(next_due_date(at(2024, 2, 29), Frequency::Yearly), at(2025, 2, 28));
    }

    #[test]
    fn clamped_day_is_not_restored() {
        let steps = occurrences(at(2025, 1, 31), Frequency::Monthly, None, 2);
        assert_eq!(steps, vec![at(2025, 2, 28), at(2025, 3, 28)]);
    }

    #[test]
    fn custom_interval_units() {
        let d = at(2025, 3, 10);
        assert_eq!(next_due_date(d, Frequency::Custom), at(2025, 3, 11));
        assert_eq!(
            next_due_date_with(d, Frequency::Custom, Some(CustomInterval::days(10))),
            at(2025, 3, 20)
        );
        assert_eq!(
            next_due_date_with(d, Frequency::Custom, Some(CustomInterval::weeks(2))),
            at(2025, 3, 24)
        );
        assert_eq!(
            next_due_date_with(d, Frequency::Custom, Some(CustomInterval::days(0))),
            at(2025, 3, 11)
        );
    }

    #[test]
    fn custom_interval_ignored_for_calendar_frequencies() {
        let d = at(2025, 3, 10);
        assert_eq!(
            next_due_date_with(d, Frequency::Monthly, Some(CustomInterval::days(3))),
            at(2025, 4, 10)
        );
    }

    fn any_date() -> impl Strategy<Value = DateTime<Utc>> {
        // 1970-01-01 .. 2200-01-01
        (0i64..7_258_118_400i64).prop_map(|s| Utc.timestamp_opt(s, 0).unwrap())
    }

    fn any_frequency() -> impl Strategy<Value = Frequency> {
        prop_oneof![
            Just(Frequency::Daily),
            Just(Frequency::Weekly),
            Just(Frequency::Monthly),
            Just(Frequency::Quarterly),
            Just(Frequency::Yearly),
            Just(Frequency::Custom),
        ]
    }

    proptest! {
        #[test]
        fn next_is_always_later(d in any_date(), f in any_frequency(), count in 0u32..60) {
            let custom = Some(CustomInterval::days(count));
            prop_assert!(next_due_date_with(d, f, custom) > d);
        }

        #[test]
        fn twelve_monthly_steps_land_next_year(d in any_date()) {
            let last = *occurrences(d, Frequency::Monthly, None, 12).last().unwrap();
            prop_assert_eq!(last.year(), d.year() + 1);
            prop_assert_eq!(last.month(), d.month());
            prop_assert!(last.day() <= d.day());
            if d.day() <= 28 {
                prop_assert_eq!(last.day(), d.day());
            }
            prop_assert_eq!(last.time(), d.time());
        }

        #[test]
        fn daily_steps_are_exact(d in any_date(), n in 1usize..400) {
            let last = *occurrences(d, Frequency::Daily, None, n).last().unwrap();
            prop_assert_eq!(last - d, Duration::days(n as i64));
            prop_assert_eq!(last.hour(), d.hour());
        }

        #[test]
        fn four_quarters_match_month_of_one_year(d in any_date()) {
            let quarters = *occurrences(d, Frequency::Quarterly, None, 4).last().unwrap();
            let year = next_due_date(d, Frequency::Yearly);
            prop_assert_eq!(quarters.month(), year.month());
            prop_assert_eq!(quarters.year(), year.year());
        }
    }
}
