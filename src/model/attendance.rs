use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

use crate::engine::metrics::DayMetrics;

/// One employee's daily time record. Created by the clock endpoints or by
/// HR manual entry, recomputed only through the correction operation,
/// never deleted.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct AttendanceRow {
    pub id: u64,
    pub employee_id: u64,
    pub date: NaiveDate,
    pub time_in: Option<NaiveDateTime>,
    pub time_out: Option<NaiveDateTime>,
    pub scheduled_in: Option<NaiveDateTime>,
    pub scheduled_out: Option<NaiveDateTime>,
    pub tardiness_minutes: i64,
    pub undertime_minutes: i64,
    pub overtime_hours: f64,
    pub hours_worked: f64,
    pub night_diff_hours: f64,
    pub status: String,
    pub approval_status: String,
    pub remarks: Option<String>,
    pub time_in_source: Option<String>,
    pub time_out_source: Option<String>,
    pub created_at: NaiveDateTime,
}

pub const ATTENDANCE_COLUMNS: &str = "id, employee_id, date, time_in, time_out, scheduled_in, \
scheduled_out, tardiness_minutes, undertime_minutes, overtime_hours, hours_worked, \
night_diff_hours, status, approval_status, remarks, time_in_source, time_out_source, created_at";

impl AttendanceRow {
    /// Stored metric values, fed back to the calculator as the fallback.
    pub fn metrics(&self) -> DayMetrics {
        DayMetrics {
            tardiness_minutes: self.tardiness_minutes,
            undertime_minutes: self.undertime_minutes,
            overtime_hours: self.overtime_hours,
            hours_worked: self.hours_worked,
            night_diff_hours: self.night_diff_hours,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum AttendanceStatus {
    Present,
    Late,
    Absent,
}

/// Status tag derived from the computed metrics.
pub fn derive_status(metrics: &DayMetrics, has_punch: bool) -> AttendanceStatus {
    if !has_punch {
        AttendanceStatus::Absent
    } else if metrics.tardiness_minutes > 0 {
        AttendanceStatus::Late
    } else {
        AttendanceStatus::Present
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ApprovalTag {
    Pending,
    Approved,
}

/// Whether a time field came from the clock sync or was keyed in by HR.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum TimeSource {
    Automated,
    Manual,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_follows_tardiness() {
        let mut metrics = DayMetrics::zero();
        assert_eq!(derive_status(&metrics, false), AttendanceStatus::Absent);
        assert_eq!(derive_status(&metrics, true), AttendanceStatus::Present);
        metrics.tardiness_minutes = 1;
        assert_eq!(derive_status(&metrics, true), AttendanceStatus::Late);
    }

    #[test]
    fn source_strings_round_trip() {
        assert_eq!(TimeSource::Automated.to_string(), "automated");
        assert_eq!("manual".parse::<TimeSource>().unwrap(), TimeSource::Manual);
    }
}
