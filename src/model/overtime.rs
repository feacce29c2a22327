use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;
use sqlx::FromRow;

use crate::engine::saga::SupervisorSnapshot;
use crate::engine::status::RequestStatus;
use crate::error::ApiError;

/// Overtime request: same lifecycle as leave, hours instead of day
/// credits, no ledger involvement. `manager_id` is the approving manager
/// designated at filing time.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct OvertimeRequestRow {
    pub id: u64,
    pub request_no: String,
    pub company_id: u64,
    pub employee_id: u64,
    pub date: NaiveDate,
    pub start_at: NaiveDateTime,
    pub end_at: NaiveDateTime,
    pub hours: f64,
    pub reason: Option<String>,
    pub status: String,
    pub manager_id: Option<u64>,
    pub supervisor_id: Option<u64>,
    pub supervisor_approved_at: Option<NaiveDateTime>,
    pub supervisor_remarks: Option<String>,
    pub hr_id: Option<u64>,
    pub hr_approved_at: Option<NaiveDateTime>,
    pub hr_remarks: Option<String>,
    pub cancelled_at: Option<NaiveDateTime>,
    pub cancellation_reason: Option<String>,
    pub created_at: NaiveDateTime,
}

pub const OVERTIME_REQUEST_COLUMNS: &str = "id, request_no, company_id, employee_id, date, \
start_at, end_at, hours, reason, status, manager_id, supervisor_id, supervisor_approved_at, \
supervisor_remarks, hr_id, hr_approved_at, hr_remarks, cancelled_at, cancellation_reason, \
created_at";

impl OvertimeRequestRow {
    pub fn status(&self) -> Result<RequestStatus, ApiError> {
        self.status.parse().map_err(|_| {
            ApiError::Internal(format!(
                "overtime request {} has unknown status {:?}",
                self.id, self.status
            ))
        })
    }

    pub fn supervisor_snapshot(&self, status: RequestStatus) -> SupervisorSnapshot {
        SupervisorSnapshot {
            status,
            approver_id: self.supervisor_id,
            approved_at: self.supervisor_approved_at,
            remarks: self.supervisor_remarks.clone(),
        }
    }
}
