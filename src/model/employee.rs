use chrono::NaiveDate;
use serde::Serialize;
use sqlx::FromRow;

/// Employee columns the engine reads: scheduling, supervision chain,
/// employment window and overtime eligibility. Employee CRUD itself lives
/// outside this service.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct EmployeeRow {
    pub id: u64,
    pub company_id: u64,
    pub employee_code: String,
    pub first_name: String,
    pub last_name: String,
    pub employment_status: String,
    pub hire_date: NaiveDate,
    pub separation_date: Option<NaiveDate>,
    pub work_schedule_id: Option<u64>,
    pub supervisor_id: Option<u64>,
    pub is_overtime_eligible: bool,
    pub status: String,
}

pub const EMPLOYEE_COLUMNS: &str = "id, company_id, employee_code, first_name, last_name, \
employment_status, hire_date, separation_date, work_schedule_id, supervisor_id, \
is_overtime_eligible, status";
