use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime, Weekday};

/// Per-weekday entry of a work schedule. A non-working slot marks a rest
/// day; a working slot may carry explicit start/end times that replace the
/// schedule's weekly defaults for that weekday.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DayPlan {
    pub working: bool,
    pub start: Option<NaiveTime>,
    pub end: Option<NaiveTime>,
}

impl DayPlan {
    pub fn working_default() -> Self {
        Self {
            working: true,
            start: None,
            end: None,
        }
    }

    pub fn rest_day() -> Self {
        Self {
            working: false,
            start: None,
            end: None,
        }
    }
}

/// Fixed 7-slot override table keyed by weekday, Monday first. Using a fixed
/// array instead of a keyed map removes runtime key-validity checks.
#[derive(Debug, Clone, PartialEq)]
pub struct WeekPlan([DayPlan; 7]);

impl Default for WeekPlan {
    fn default() -> Self {
        Self([DayPlan::working_default(); 7])
    }
}

impl WeekPlan {
    pub fn get(&self, weekday: Weekday) -> &DayPlan {
        &self.0[weekday.num_days_from_monday() as usize]
    }

    pub fn set(&mut self, weekday: Weekday, plan: DayPlan) {
        self.0[weekday.num_days_from_monday() as usize] = plan;
    }
}

/// A weekly work schedule: default start/end time-of-day plus the per-weekday
/// plan, break duration and tardiness grace period in minutes.
#[derive(Debug, Clone, PartialEq)]
pub struct WorkSchedule {
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub break_minutes: i64,
    pub grace_minutes: i64,
    pub week: WeekPlan,
}

/// Effective scheduled-in/scheduled-out instants for one calendar date.
/// Both are `None` on rest days and when no schedule applies at all; the
/// metrics calculator treats that as "fall back to stored values".
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedSchedule {
    pub scheduled_in: Option<NaiveDateTime>,
    pub scheduled_out: Option<NaiveDateTime>,
}

impl ResolvedSchedule {
    pub fn unscheduled() -> Self {
        Self {
            scheduled_in: None,
            scheduled_out: None,
        }
    }

    pub fn from_cached(
        scheduled_in: Option<NaiveDateTime>,
        scheduled_out: Option<NaiveDateTime>,
    ) -> Self {
        Self {
            scheduled_in,
            scheduled_out,
        }
    }

    pub fn is_resolved(&self) -> bool {
        self.scheduled_in.is_some() || self.scheduled_out.is_some()
    }
}

/// Resolve a calendar date against a work schedule.
///
/// The weekday slot wins over the weekly defaults: a non-working slot yields
/// no schedule, an explicit start/end pair is anchored to the date as-is.
/// Whenever the naively anchored end does not land strictly after the start,
/// the end rolls forward one day, which is what makes overnight shifts such
/// as 22:00-06:00 come out right.
pub fn resolve(date: NaiveDate, schedule: Option<&WorkSchedule>) -> ResolvedSchedule {
    let Some(schedule) = schedule else {
        return ResolvedSchedule::unscheduled();
    };

    let plan = schedule.week.get(date.weekday());
    if !plan.working {
        return ResolvedSchedule::unscheduled();
    }

    let (start, end) = match (plan.start, plan.end) {
        (Some(start), Some(end)) => (start, end),
        _ => (schedule.start_time, schedule.end_time),
    };

    let scheduled_in = date.and_time(start);
    let mut scheduled_out = date.and_time(end);
    if scheduled_out <= scheduled_in {
        scheduled_out += Duration::days(1);
    }

    ResolvedSchedule {
        scheduled_in: Some(scheduled_in),
        scheduled_out: Some(scheduled_out),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn day_shift() -> WorkSchedule {
        WorkSchedule {
            start_time: t(8, 0),
            end_time: t(17, 0),
            break_minutes: 60,
            grace_minutes: 10,
            week: WeekPlan::default(),
        }
    }

    #[test]
    fn resolves_weekly_defaults() {
        // 2026-03-04 is a Wednesday
        let resolved = resolve(d(2026, 3, 4), Some(&day_shift()));
        assert_eq!(resolved.scheduled_in, Some(d(2026, 3, 4).and_time(t(8, 0))));
        assert_eq!(
            resolved.scheduled_out,
            Some(d(2026, 3, 4).and_time(t(17, 0)))
        );
    }

    #[test]
    fn no_schedule_yields_unscheduled() {
        let resolved = resolve(d(2026, 3, 4), None);
        assert!(!resolved.is_resolved());
    }

    #[test]
    fn rest_day_yields_unscheduled() {
        let mut schedule = day_shift();
        schedule.week.set(Weekday::Sun, DayPlan::rest_day());
        // 2026-03-08 is a Sunday
        let resolved = resolve(d(2026, 3, 8), Some(&schedule));
        assert_eq!(resolved, ResolvedSchedule::unscheduled());
    }

    #[test]
    fn explicit_weekday_times_win_over_defaults() {
        let mut schedule = day_shift();
        schedule.week.set(
            Weekday::Fri,
            DayPlan {
                working: true,
                start: Some(t(7, 0)),
                end: Some(t(12, 0)),
            },
        );
        // 2026-03-06 is a Friday
        let resolved = resolve(d(2026, 3, 6), Some(&schedule));
        assert_eq!(resolved.scheduled_in, Some(d(2026, 3, 6).and_time(t(7, 0))));
        assert_eq!(
            resolved.scheduled_out,
            Some(d(2026, 3, 6).and_time(t(12, 0)))
        );
    }

    #[test]
    fn overnight_shift_rolls_end_to_next_day() {
        let mut schedule = day_shift();
        schedule.start_time = t(22, 0);
        schedule.end_time = t(6, 0);
        let resolved = resolve(d(2026, 3, 4), Some(&schedule));
        assert_eq!(
            resolved.scheduled_in,
            Some(d(2026, 3, 4).and_time(t(22, 0)))
        );
        assert_eq!(resolved.scheduled_out, Some(d(2026, 3, 5).and_time(t(6, 0))));
    }

    #[test]
    fn equal_start_and_end_rolls_forward() {
        let mut schedule = day_shift();
        schedule.start_time = t(9, 0);
        schedule.end_time = t(9, 0);
        let resolved = resolve(d(2026, 3, 4), Some(&schedule));
        assert_eq!(resolved.scheduled_out, Some(d(2026, 3, 5).and_time(t(9, 0))));
    }

    #[test]
    fn partial_override_falls_back_to_defaults() {
        let mut schedule = day_shift();
        schedule.week.set(
            Weekday::Wed,
            DayPlan {
                working: true,
                start: Some(t(10, 0)),
                end: None,
            },
        );
        let resolved = resolve(d(2026, 3, 4), Some(&schedule));
        // An incomplete pair is not an explicit override
        assert_eq!(resolved.scheduled_in, Some(d(2026, 3, 4).and_time(t(8, 0))));
    }
}
