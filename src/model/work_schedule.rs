use chrono::{NaiveTime, Weekday};
use sqlx::FromRow;

use crate::engine::schedule::{DayPlan, WeekPlan, WorkSchedule};

#[derive(Debug, Clone, FromRow)]
pub struct WorkScheduleRow {
    pub id: u64,
    pub company_id: u64,
    pub name: String,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub break_minutes: u32,
    pub grace_minutes: u32,
}

/// One weekday slot of a schedule; `weekday` is 0 = Monday .. 6 = Sunday.
#[derive(Debug, Clone, FromRow)]
pub struct ScheduleDayRow {
    pub weekday: u8,
    pub is_working: bool,
    pub start_time: Option<NaiveTime>,
    pub end_time: Option<NaiveTime>,
}

const WEEKDAYS: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

impl WorkScheduleRow {
    /// Assemble the engine-side schedule from this row plus its weekday
    /// slots. Missing slot rows default to a working day on weekly times;
    /// out-of-range weekday values are ignored.
    pub fn into_engine(self, days: &[ScheduleDayRow]) -> WorkSchedule {
        let mut week = WeekPlan::default();
        for day in days {
            let Some(&weekday) = WEEKDAYS.get(day.weekday as usize) else {
                continue;
            };
            week.set(
                weekday,
                DayPlan {
                    working: day.is_working,
                    start: day.start_time,
                    end: day.end_time,
                },
            );
        }
        WorkSchedule {
            start_time: self.start_time,
            end_time: self.end_time,
            break_minutes: self.break_minutes as i64,
            grace_minutes: self.grace_minutes as i64,
            week,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn slots_land_on_the_right_weekday() {
        let row = WorkScheduleRow {
            id: 1,
            company_id: 1,
            name: "day shift".to_string(),
            start_time: t(8, 0),
            end_time: t(17, 0),
            break_minutes: 60,
            grace_minutes: 10,
        };
        let days = vec![
            ScheduleDayRow {
                weekday: 5,
                is_working: false,
                start_time: None,
                end_time: None,
            },
            ScheduleDayRow {
                weekday: 6,
                is_working: false,
                start_time: None,
                end_time: None,
            },
            ScheduleDayRow {
                weekday: 2,
                is_working: true,
                start_time: Some(t(10, 0)),
                end_time: Some(t(19, 0)),
            },
            // garbage index is skipped
            ScheduleDayRow {
                weekday: 9,
                is_working: false,
                start_time: None,
                end_time: None,
            },
        ];
        let schedule = row.into_engine(&days);
        assert!(!schedule.week.get(Weekday::Sat).working);
        assert!(!schedule.week.get(Weekday::Sun).working);
        assert_eq!(schedule.week.get(Weekday::Wed).start, Some(t(10, 0)));
        assert!(schedule.week.get(Weekday::Mon).working);
        assert_eq!(schedule.grace_minutes, 10);
    }
}
