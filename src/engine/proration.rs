use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

use super::round2;

/// How a leave policy scales its annual entitlement for mid-year hires.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ProrationMethod {
    Full,
    ProratedDay,
    ProratedMonth,
}

fn days_in_year(year: i32) -> u32 {
    if NaiveDate::from_ymd_opt(year, 2, 29).is_some() {
        366
    } else {
        365
    }
}

/// Entitlement earned for `year` given the hire date.
///
/// Hired after year end earns nothing; hired on or before year start earns
/// the full amount regardless of method. In between, the day method scales
/// by inclusive remaining calendar days and the month method by inclusive
/// remaining months over 12.
pub fn prorated_entitlement(
    method: ProrationMethod,
    annual_entitlement: f64,
    hire_date: NaiveDate,
    year: i32,
) -> f64 {
    let year_start = NaiveDate::from_ymd_opt(year, 1, 1).unwrap();
    let year_end = NaiveDate::from_ymd_opt(year, 12, 31).unwrap();

    if hire_date > year_end {
        return 0.0;
    }
    if hire_date <= year_start {
        return round2(annual_entitlement);
    }

    match method {
        ProrationMethod::Full => round2(annual_entitlement),
        ProrationMethod::ProratedDay => {
            let total = days_in_year(year);
            let remaining = total - hire_date.ordinal() + 1;
            round2(annual_entitlement * remaining as f64 / total as f64)
        }
        ProrationMethod::ProratedMonth => {
            let remaining = 12 - hire_date.month() + 1;
            round2(annual_entitlement * remaining as f64 / 12.0)
        }
    }
}

/// Opening balance rolled over from the previous year: the previous
/// available balance floored at zero, optionally capped by the leave
/// type's maximum carry-over days.
pub fn carry_over_credit(previous_available: f64, max_carry_over: Option<f64>) -> f64 {
    let credit = previous_available.max(0.0);
    round2(match max_carry_over {
        Some(cap) => credit.min(cap),
        None => credit,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn hired_before_year_start_earns_full_under_every_method() {
        for method in [
            ProrationMethod::Full,
            ProrationMethod::ProratedDay,
            ProrationMethod::ProratedMonth,
        ] {
            assert_eq!(
                prorated_entitlement(method, 15.0, d(2024, 6, 15), 2026),
                15.0,
                "{method}"
            );
        }
    }

    #[test]
    fn hired_after_year_end_earns_nothing() {
        assert_eq!(
            prorated_entitlement(ProrationMethod::Full, 15.0, d(2027, 1, 1), 2026),
            0.0
        );
    }

    #[test]
    fn full_method_ignores_the_hire_month() {
        assert_eq!(
            prorated_entitlement(ProrationMethod::Full, 12.0, d(2026, 10, 20), 2026),
            12.0
        );
    }

    #[test]
    fn month_proration_counts_inclusive_remaining_months() {
        // 12 days, hired July 1 => 6 inclusive remaining months => 6.00
        assert_eq!(
            prorated_entitlement(ProrationMethod::ProratedMonth, 12.0, d(2026, 7, 1), 2026),
            6.0
        );
        // Hired December => one month's worth
        assert_eq!(
            prorated_entitlement(ProrationMethod::ProratedMonth, 12.0, d(2026, 12, 10), 2026),
            1.0
        );
    }

    #[test]
    fn day_proration_counts_inclusive_remaining_days() {
        // Dec 31 hire leaves exactly one day of the year
        assert_eq!(
            prorated_entitlement(ProrationMethod::ProratedDay, 365.0, d(2026, 12, 31), 2026),
            1.0
        );
        // 2028 is a leap year: hired Jan 2 leaves 365 of 366 days
        assert_eq!(
            prorated_entitlement(ProrationMethod::ProratedDay, 366.0, d(2028, 1, 2), 2028),
            365.0
        );
    }

    #[test]
    fn carry_over_floors_negatives_and_honors_the_cap() {
        assert_eq!(carry_over_credit(-2.5, None), 0.0);
        assert_eq!(carry_over_credit(7.5, None), 7.5);
        assert_eq!(carry_over_credit(7.5, Some(5.0)), 5.0);
        assert_eq!(carry_over_credit(3.0, Some(5.0)), 3.0);
    }

    #[test]
    fn method_strings_round_trip() {
        assert_eq!(ProrationMethod::ProratedMonth.to_string(), "prorated_month");
        assert_eq!(
            "prorated_day".parse::<ProrationMethod>().unwrap(),
            ProrationMethod::ProratedDay
        );
    }
}
