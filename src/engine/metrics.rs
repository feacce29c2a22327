use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};

use super::round2;
use super::schedule::ResolvedSchedule;

/// Nightly premium window: 22:00 through 06:00 of the following day.
fn night_window(day: NaiveDate) -> (NaiveDateTime, NaiveDateTime) {
    let start = NaiveTime::from_hms_opt(22, 0, 0).unwrap();
    let end = NaiveTime::from_hms_opt(6, 0, 0).unwrap();
    (day.and_time(start), (day + Duration::days(1)).and_time(end))
}

/// Derived attendance figures for a single daily time record.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DayMetrics {
    pub tardiness_minutes: i64,
    pub undertime_minutes: i64,
    pub overtime_hours: f64,
    pub hours_worked: f64,
    pub night_diff_hours: f64,
}

impl DayMetrics {
    pub fn zero() -> Self {
        Self {
            tardiness_minutes: 0,
            undertime_minutes: 0,
            overtime_hours: 0.0,
            hours_worked: 0.0,
            night_diff_hours: 0.0,
        }
    }
}

/// Everything the calculator needs for one record. `previous` carries the
/// stored metric values and is what survives when the schedule cannot be
/// resolved, preserving earlier manual corrections.
#[derive(Debug, Clone, Copy)]
pub struct MetricInput {
    pub actual_in: Option<NaiveDateTime>,
    pub actual_out: Option<NaiveDateTime>,
    pub schedule: ResolvedSchedule,
    pub grace_minutes: i64,
    pub break_minutes: i64,
    pub previous: DayMetrics,
}

/// An "out" instant must land after its paired "in" instant; a stored out
/// at or before the in belongs to the next calendar day (overnight span).
fn normalize_out(paired_in: Option<NaiveDateTime>, out: NaiveDateTime) -> NaiveDateTime {
    match paired_in {
        Some(start) if out <= start => out + Duration::days(1),
        _ => out,
    }
}

fn minutes_between(from: NaiveDateTime, to: NaiveDateTime) -> f64 {
    (to - from).num_seconds() as f64 / 60.0
}

/// Compute all derived metrics for a daily time record.
///
/// Pure in its inputs: identical inputs always yield identical outputs, so a
/// correction may recompute as often as it likes.
pub fn compute(input: &MetricInput) -> DayMetrics {
    if input.actual_in.is_none() && input.actual_out.is_none() {
        return DayMetrics::zero();
    }

    // Actual punches but no resolvable schedule: keep whatever was stored,
    // including prior manual corrections.
    if !input.schedule.is_resolved() {
        return input.previous;
    }

    let scheduled_out = input
        .schedule
        .scheduled_out
        .map(|out| normalize_out(input.schedule.scheduled_in, out));
    let actual_out = input
        .actual_out
        .map(|out| normalize_out(input.actual_in, out));

    let tardiness_minutes = match (input.schedule.scheduled_in, input.actual_in) {
        (Some(scheduled_in), Some(actual_in)) => {
            let late = minutes_between(scheduled_in, actual_in) - input.grace_minutes as f64;
            (late.round() as i64).max(0)
        }
        _ => input.previous.tardiness_minutes,
    };

    let undertime_minutes = match (scheduled_out, actual_out) {
        (Some(scheduled_out), Some(actual_out)) => {
            let short = minutes_between(actual_out, scheduled_out);
            (short.round() as i64).max(0)
        }
        _ => input.previous.undertime_minutes,
    };

    let overtime_hours = match (scheduled_out, actual_out) {
        (Some(scheduled_out), Some(actual_out)) => {
            let excess = (actual_out - scheduled_out).num_seconds() as f64 / 3600.0;
            round2(excess.max(0.0))
        }
        _ => input.previous.overtime_hours,
    };

    let (hours_worked, night_diff_hours) = match (input.actual_in, actual_out) {
        (Some(actual_in), Some(actual_out)) => {
            let worked_minutes =
                minutes_between(actual_in, actual_out) - input.break_minutes as f64;
            (
                round2(worked_minutes.max(0.0) / 60.0),
                round2(night_diff(actual_in, actual_out)),
            )
        }
        _ => (input.previous.hours_worked, input.previous.night_diff_hours),
    };

    DayMetrics {
        tardiness_minutes,
        undertime_minutes,
        overtime_hours,
        hours_worked,
        night_diff_hours,
    }
}

/// Hours of [start, end) falling inside the 22:00-06:00 nightly window,
/// summed over every window the interval touches. Consecutive windows are
/// disjoint, so chunking the interval at any point and summing the chunks
/// gives the same total as a single whole-interval pass. Unrounded; callers
/// round when they store.
pub fn night_diff(start: NaiveDateTime, end: NaiveDateTime) -> f64 {
    if end <= start {
        return 0.0;
    }

    let mut total_seconds = 0i64;
    // The window anchored on the previous day can still reach into this
    // interval (a 01:00 punch-in sits in yesterday's 22:00-06:00 window).
    let mut day = start.date() - Duration::days(1);
    while day <= end.date() {
        let (window_start, window_end) = night_window(day);
        let overlap_start = start.max(window_start);
        let overlap_end = end.min(window_end);
        if overlap_end > overlap_start {
            total_seconds += (overlap_end - overlap_start).num_seconds();
        }
        day += Duration::days(1);
    }

    total_seconds as f64 / 3600.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dt(day: u32, h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 3, day)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    fn resolved(day: u32, in_h: u32, in_m: u32, out_h: u32, out_m: u32) -> ResolvedSchedule {
        ResolvedSchedule::from_cached(Some(dt(day, in_h, in_m)), Some(dt(day, out_h, out_m)))
    }

    fn base_input(day: u32) -> MetricInput {
        MetricInput {
            actual_in: None,
            actual_out: None,
            schedule: resolved(day, 8, 0, 17, 0),
            grace_minutes: 10,
            break_minutes: 60,
            previous: DayMetrics::zero(),
        }
    }

    #[test]
    fn no_actual_times_zeroes_everything() {
        let metrics = compute(&base_input(4));
        assert_eq!(metrics, DayMetrics::zero());
    }

    #[test]
    fn unresolved_schedule_keeps_stored_metrics() {
        let previous = DayMetrics {
            tardiness_minutes: 12,
            undertime_minutes: 3,
            overtime_hours: 1.5,
            hours_worked: 8.0,
            night_diff_hours: 0.0,
        };
        let input = MetricInput {
            actual_in: Some(dt(4, 8, 30)),
            actual_out: Some(dt(4, 17, 0)),
            schedule: ResolvedSchedule::unscheduled(),
            grace_minutes: 10,
            break_minutes: 60,
            previous,
        };
        assert_eq!(compute(&input), previous);
    }

    #[test]
    fn arrival_within_grace_is_not_tardy() {
        let mut input = base_input(4);
        input.actual_in = Some(dt(4, 8, 10));
        input.actual_out = Some(dt(4, 17, 0));
        assert_eq!(compute(&input).tardiness_minutes, 0);
    }

    #[test]
    fn tardiness_counts_minutes_past_the_grace_period() {
        // Schedule 08:00-17:00, grace 10, actual in 08:25 => 15 minutes
        let mut input = base_input(4);
        input.actual_in = Some(dt(4, 8, 25));
        input.actual_out = Some(dt(4, 17, 0));
        assert_eq!(compute(&input).tardiness_minutes, 15);
    }

    #[test]
    fn undertime_counts_early_departure() {
        let mut input = base_input(4);
        input.actual_in = Some(dt(4, 8, 0));
        input.actual_out = Some(dt(4, 16, 30));
        let metrics = compute(&input);
        assert_eq!(metrics.undertime_minutes, 30);
        assert_eq!(metrics.overtime_hours, 0.0);
    }

    #[test]
    fn overtime_is_the_positive_excess_in_hours() {
        let mut input = base_input(4);
        input.actual_in = Some(dt(4, 8, 0));
        input.actual_out = Some(dt(4, 19, 15));
        let metrics = compute(&input);
        assert_eq!(metrics.overtime_hours, 2.25);
        assert_eq!(metrics.undertime_minutes, 0);
    }

    #[test]
    fn hours_worked_subtracts_the_break() {
        let mut input = base_input(4);
        input.actual_in = Some(dt(4, 8, 0));
        input.actual_out = Some(dt(4, 17, 0));
        assert_eq!(compute(&input).hours_worked, 8.0);
    }

    #[test]
    fn overnight_actuals_are_normalized_before_undertime() {
        // 22:00-06:00 shift; the out punch is stored on the shift date.
        let mut input = base_input(4);
        input.schedule =
            ResolvedSchedule::from_cached(Some(dt(4, 22, 0)), Some(dt(5, 6, 0)));
        input.actual_in = Some(dt(4, 22, 0));
        input.actual_out = Some(dt(4, 5, 0)); // same-date raw value
        let metrics = compute(&input);
        assert_eq!(metrics.undertime_minutes, 60);
        assert_eq!(metrics.overtime_hours, 0.0);
    }

    #[test]
    fn night_diff_covers_the_full_window() {
        // 22:00 to 07:00 next day: the 22:00-06:00 window counts, 06:00-07:00
        // does not.
        assert_eq!(night_diff(dt(4, 22, 0), dt(5, 7, 0)), 8.0);
    }

    #[test]
    fn night_diff_catches_early_morning_work() {
        // 01:00-05:00 sits inside the window anchored on the previous day.
        assert_eq!(night_diff(dt(5, 1, 0), dt(5, 5, 0)), 4.0);
    }

    #[test]
    fn night_diff_is_zero_for_daytime_work() {
        assert_eq!(night_diff(dt(4, 8, 0), dt(4, 17, 0)), 0.0);
    }

    #[test]
    fn night_diff_is_additive_under_chunking() {
        let start = dt(4, 20, 30);
        let end = dt(6, 9, 45);
        let whole = night_diff(start, end);

        let cuts = [dt(4, 23, 59), dt(5, 3, 15), dt(5, 22, 1), dt(6, 6, 0)];
        let mut chunked = 0.0;
        let mut cursor = start;
        for cut in cuts {
            chunked += night_diff(cursor, cut);
            cursor = cut;
        }
        chunked += night_diff(cursor, end);

        assert!((whole - chunked).abs() < 1e-9, "{whole} != {chunked}");
    }

    #[test]
    fn recomputation_is_idempotent() {
        let mut input = base_input(4);
        input.actual_in = Some(dt(4, 8, 25));
        input.actual_out = Some(dt(4, 19, 15));
        let first = compute(&input);
        input.previous = first;
        assert_eq!(compute(&input), first);
    }
}
