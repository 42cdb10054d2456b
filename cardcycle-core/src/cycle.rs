//! Billing cycle arithmetic: days until the next bill, the next due date, and
//! the interest-free credit window for a purchase made at the reference time.
//!
//! All functions take the reference timestamp explicitly. Day values are
//! resolved against the reference month by offsetting from the first of the
//! month, so a day past the end of a short month spills into the next one
//! (31 April resolves to 1 May).

use chrono::{Datelike, Days, Duration, Months, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::card::BillingProfile;

const MILLIS_PER_DAY: f64 = 86_400_000.0;

/// The three countdowns shown for a card
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CycleSnapshot {
    pub days_to_bill: i64,
    pub days_to_due: i64,
    pub credit_period_days: i64,
}

impl BillingProfile {
    pub fn snapshot(&self, reference: NaiveDateTime) -> CycleSnapshot {
        CycleSnapshot {
            days_to_bill: days_remaining(self.bill_generation_day, reference),
            days_to_due: days_remaining(self.due_day, reference),
            credit_period_days: credit_period_days(
                self.bill_generation_day,
                self.due_day,
                reference,
            ),
        }
    }
}

fn first_of_month(date: NaiveDate) -> NaiveDate {
    date - Days::new(u64::from(date.day0()))
}

/// Midnight on `day` of the month `months_ahead` after `month_start`.
fn day_in_month(month_start: NaiveDate, months_ahead: u32, day: u32) -> NaiveDateTime {
    let date = month_start + Months::new(months_ahead) + Duration::days(i64::from(day) - 1);
    date.and_time(NaiveTime::MIN)
}

fn fractional_days(from: NaiveDateTime, to: NaiveDateTime) -> f64 {
    (to - from).num_milliseconds() as f64 / MILLIS_PER_DAY
}

/// Days until the next occurrence of `target_day`, rounded up.
///
/// A target strictly earlier than `reference` in the current month moves to
/// the following month. A target at exactly `reference` yields 0.
pub fn days_remaining(target_day: u32, reference: NaiveDateTime) -> i64 {
    let month_start = first_of_month(reference.date());

    let mut candidate = day_in_month(month_start, 0, target_day);
    if candidate < reference {
        candidate = day_in_month(month_start, 1, target_day);
    }

    fractional_days(reference, candidate).ceil() as i64
}

/// Days from `reference` to the due date that follows the next bill,
/// rounded to the nearest day.
///
/// This rounds while [`days_remaining`] takes the ceiling; both are kept as
/// observed in the card app.
pub fn credit_period_days(bill_day: u32, due_day: u32, reference: NaiveDateTime) -> i64 {
    let month_start = first_of_month(reference.date());

    let next_bill = if bill_day <= reference.day() {
        day_in_month(month_start, 1, bill_day)
    } else {
        day_in_month(month_start, 0, bill_day)
    };

    let bill_month = first_of_month(next_bill.date());
    let due = if due_day > bill_day {
        day_in_month(bill_month, 0, due_day)
    } else {
        day_in_month(bill_month, 1, due_day)
    };

    fractional_days(reference, due).round() as i64
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, 0)
            .unwrap()
    }

    #[test]
    fn test_upcoming_day_this_month() {
        assert_eq!(days_remaining(20, at(2024, 1, 15, 0, 0)), 5);
        // Partial day left over rounds up
        assert_eq!(days_remaining(20, at(2024, 1, 15, 10, 30)), 5);
    }

    #[test]
    fn test_passed_day_rolls_to_next_month() {
        assert_eq!(days_remaining(10, at(2024, 1, 15, 0, 0)), 26);
        // Leap February
        assert_eq!(days_remaining(1, at(2024, 2, 20, 0, 0)), 10);
    }

    #[test]
    fn test_december_rolls_into_january() {
        assert_eq!(days_remaining(5, at(2024, 12, 20, 0, 0)), 16);
    }

    #[test]
    fn test_same_day() {
        assert_eq!(days_remaining(15, at(2024, 1, 15, 0, 0)), 0);
        // Midnight already passed, so the next occurrence is a month out
        assert_eq!(days_remaining(15, at(2024, 1, 15, 10, 0)), 31);
    }

    #[test]
    fn test_day_past_month_end_spills_over() {
        // 31 April is 1 May
        assert_eq!(days_remaining(31, at(2024, 4, 20, 0, 0)), 11);
    }

    #[test]
    fn test_credit_period_due_after_bill_same_month() {
        assert_eq!(credit_period_days(1, 20, at(2024, 1, 15, 0, 0)), 36);
    }

    #[test]
    fn test_credit_period_due_in_following_month() {
        assert_eq!(credit_period_days(20, 5, at(2024, 1, 10, 0, 0)), 26);
    }

    #[test]
    fn test_credit_period_bill_today_counts_as_passed() {
        // A bill day equal to today rolls to next month: Feb 15 bill, Mar 5 due
        assert_eq!(credit_period_days(15, 5, at(2024, 1, 15, 0, 0)), 50);
    }

    #[test]
    fn test_credit_period_equal_days_due_next_month() {
        // Bill Dec 10, due equal to bill day falls in the next month: Jan 10
        assert_eq!(credit_period_days(10, 10, at(2024, 12, 5, 0, 0)), 36);
    }

    #[test]
    fn test_credit_period_crosses_year() {
        // Bill Jan 20 2025, due Feb 5 2025
        assert_eq!(credit_period_days(20, 5, at(2024, 12, 25, 0, 0)), 42);
    }

    #[test]
    fn test_credit_period_rounds_to_nearest() {
        // 36 days minus 13 hours = 35.46 -> 35 (ceiling would give 36)
        assert_eq!(credit_period_days(1, 20, at(2024, 1, 15, 13, 0)), 35);
        // 36 days minus 11 hours = 35.54 -> 36
        assert_eq!(credit_period_days(1, 20, at(2024, 1, 15, 11, 0)), 36);
    }

    #[test]
    fn test_snapshot() {
        let profile = BillingProfile::new(20, 5);
        let snap = profile.snapshot(at(2024, 1, 10, 0, 0));
        assert_eq!(
            snap,
            CycleSnapshot {
                days_to_bill: 10,
                days_to_due: 26,
                credit_period_days: 26,
            }
        );
    }
}
