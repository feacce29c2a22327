use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;
use sqlx::FromRow;

use crate::engine::ledger::BalanceCounters;
use crate::engine::proration::ProrationMethod;
use crate::engine::saga::SupervisorSnapshot;
use crate::engine::status::RequestStatus;
use crate::error::ApiError;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct LeaveTypeRow {
    pub id: u64,
    pub company_id: u64,
    pub name: String,
    pub code: String,
    pub is_paid: bool,
    pub allows_carry_over: bool,
    pub max_carry_over_days: Option<f64>,
    pub is_active: bool,
    pub effective_from: Option<NaiveDate>,
    pub effective_to: Option<NaiveDate>,
}

pub const LEAVE_TYPE_COLUMNS: &str = "id, company_id, name, code, is_paid, allows_carry_over, \
max_carry_over_days, is_active, effective_from, effective_to";

/// Entitlement policy keyed by (leave type, employment status); the most
/// recently effective active policy wins.
#[derive(Debug, Clone, FromRow)]
pub struct LeavePolicyRow {
    pub id: u64,
    pub leave_type_id: u64,
    pub employment_status: String,
    pub annual_entitlement: f64,
    pub proration_method: String,
    pub effective_date: NaiveDate,
    pub is_active: bool,
}

impl LeavePolicyRow {
    pub fn proration(&self) -> Result<ProrationMethod, ApiError> {
        self.proration_method.parse().map_err(|_| {
            ApiError::Internal(format!(
                "leave policy {} has unknown proration method {:?}",
                self.id, self.proration_method
            ))
        })
    }
}

/// Stored ledger account for one (employee, leave type, year).
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct LeaveBalanceRow {
    pub id: u64,
    pub employee_id: u64,
    pub leave_type_id: u64,
    pub year: i32,
    pub opening_balance: f64,
    pub credits_earned: f64,
    pub credits_used: f64,
    pub credits_forfeited: f64,
    pub credits_converted: f64,
    pub credits_carried_over: f64,
    pub pending_requests: f64,
    pub current_balance: f64,
    pub available_balance: f64,
}

pub const LEAVE_BALANCE_COLUMNS: &str = "id, employee_id, leave_type_id, year, opening_balance, \
credits_earned, credits_used, credits_forfeited, credits_converted, credits_carried_over, \
pending_requests, current_balance, available_balance";

impl LeaveBalanceRow {
    /// Rebuild the counters value type from the base fields; the derived
    /// balances are recomputed rather than trusted from storage.
    pub fn counters(&self) -> BalanceCounters {
        BalanceCounters::from_parts(
            self.opening_balance,
            self.credits_earned,
            self.credits_used,
            self.credits_forfeited,
            self.credits_converted,
            self.credits_carried_over,
            self.pending_requests,
        )
    }
}

/// Append-only ledger log entry; one row per balance mutation.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct LeaveBalanceTransactionRow {
    pub id: u64,
    pub balance_id: u64,
    pub kind: String,
    pub amount: f64,
    pub running_balance: f64,
    pub reference: Option<String>,
    pub actor_id: u64,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct LeaveRequestRow {
    pub id: u64,
    pub request_no: String,
    pub company_id: u64,
    pub employee_id: u64,
    pub leave_type_id: u64,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub days: f64,
    pub reason: Option<String>,
    pub status: String,
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

pub const LEAVE_REQUEST_COLUMNS: &str = "id, request_no, company_id, employee_id, leave_type_id, \
start_date, end_date, days, reason, status, supervisor_id, supervisor_approved_at, \
supervisor_remarks, hr_id, hr_approved_at, hr_remarks, cancelled_at, cancellation_reason, \
created_at";

impl LeaveRequestRow {
    pub fn status(&self) -> Result<RequestStatus, ApiError> {
        self.status.parse().map_err(|_| {
            ApiError::Internal(format!(
                "leave request {} has unknown status {:?}",
                self.id, self.status
            ))
        })
    }

    /// Supervisor-step fields as they stand, for override compensation.
    pub fn supervisor_snapshot(&self, status: RequestStatus) -> SupervisorSnapshot {
        SupervisorSnapshot {
            status,
            approver_id: self.supervisor_id,
            approved_at: self.supervisor_approved_at,
            remarks: self.supervisor_remarks.clone(),
        }
    }
}
