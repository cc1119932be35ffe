//! Due date derivation for recurring transactions.

use chrono::{Datelike, NaiveDate};

use crate::recurring::recurring_model::Frequency;

fn days_in_month(year: i32, month: u32) -> u32 {
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .and_then(|first| first.pred_opt())
        .map(|last| last.day())
        .unwrap_or(28)
}

/// Builds a date in the given month, clamping the day to the month's length
/// so day 31 lands on Feb 28/29 instead of overflowing into March.
fn clamped_date(year: i32, month: u32, day: u32) -> NaiveDate {
    let day = day.min(days_in_month(year, month));
    NaiveDate::from_ymd_opt(year, month, day)
        .unwrap_or_else(|| NaiveDate::from_ymd_opt(year, month, 1).unwrap_or(NaiveDate::MIN))
}

/// Computes the next occurrence of a recurring transaction on or after
/// `today`.
///
/// Monthly templates fire on `day_of_month` of every month. Yearly templates
/// fire once per year in the start date's month, on `day_of_month`. Either
/// way the day is clamped to the target month's length.
pub fn next_due_date(
    frequency: Frequency,
    day_of_month: u32,
    start_date: NaiveDate,
    today: NaiveDate,
) -> NaiveDate {
    match frequency {
        Frequency::Monthly => {
            let candidate = clamped_date(today.year(), today.month(), day_of_month);
            if candidate >= today {
                candidate
            } else {
                let (year, month) = if today.month() == 12 {
                    (today.year() + 1, 1)
                } else {
                    (today.year(), today.month() + 1)
                };
                clamped_date(year, month, day_of_month)
            }
        }
        Frequency::Yearly => {
            let candidate = clamped_date(today.year(), start_date.month(), day_of_month);
            if candidate >= today {
                candidate
            } else {
                clamped_date(today.year() + 1, start_date.month(), day_of_month)
            }
        }
    }
}
