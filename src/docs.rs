use crate::api::approvals::ApprovalQueueItem;
use crate::api::attendance::{AttendanceFilter, Correction, ManualEntry};
use crate::api::leave_balance::BalanceFilter;
use crate::api::leave_request::{
    CancelBody, CreateLeave, DecisionBody, LeaveFilter, OverrideBody,
};
use crate::api::overtime_request::{CreateOvertime, OvertimeFilter};
use crate::api::year_init::{InitializationSummary, InitializeYear};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Time & Leave Accounting API",
        version = "1.0.0",
        description = r#"
## Time & Leave Accounting Engine

Back-office core for a multi-tenant payroll/HR system.

### Key Features
- **Attendance**
  - Clock-in/clock-out with schedule-aware metrics (tardiness, undertime,
    overtime, night differential), manual entry and corrections
- **Leave**
  - Requests with transactional balance reservation, two-stage approval,
    cancellation, administrative override
- **Overtime**
  - Requests sharing the same approval lifecycle, with a compensatory
    time-off conversion preview flag
- **Balances**
  - Per-year leave balance accounts, append-only transaction log, annual
    initialization batch with proration and carry-over

### Security
All business endpoints are protected with **JWT Bearer authentication**;
administrative overrides and the initialization batch require elevated roles.

---
Built with **Rust**, **Actix Web**, **SQLx**, and **Utoipa**.
"#,
    ),
    paths(
        crate::api::attendance::clock_in,
        crate::api::attendance::clock_out,
        crate::api::attendance::manual_entry,
        crate::api::attendance::correct_attendance,
        crate::api::attendance::attendance_list,

        crate::api::leave_request::create_leave,
        crate::api::leave_request::cancel_leave,
        crate::api::leave_request::supervisor_approve_leave,
        crate::api::leave_request::supervisor_reject_leave,
        crate::api::leave_request::approve_leave,
        crate::api::leave_request::reject_leave,
        crate::api::leave_request::override_leave,
        crate::api::leave_request::get_leave,
        crate::api::leave_request::leave_list,

        crate::api::overtime_request::create_overtime,
        crate::api::overtime_request::cancel_overtime,
        crate::api::overtime_request::supervisor_approve_overtime,
        crate::api::overtime_request::supervisor_reject_overtime,
        crate::api::overtime_request::approve_overtime,
        crate::api::overtime_request::reject_overtime,
        crate::api::overtime_request::override_overtime,
        crate::api::overtime_request::get_overtime,
        crate::api::overtime_request::overtime_list,

        crate::api::approvals::approval_queue,

        crate::api::leave_balance::balance_list,
        crate::api::leave_balance::balance_transactions,
        crate::api::year_init::initialize_year
    ),
    components(
        schemas(
            CreateLeave,
            DecisionBody,
            CancelBody,
            OverrideBody,
            LeaveFilter,
            CreateOvertime,
            OvertimeFilter,
            ManualEntry,
            Correction,
            AttendanceFilter,
            ApprovalQueueItem,
            BalanceFilter,
            InitializeYear,
            InitializationSummary
        )
    ),
    tags(
        (name = "Attendance", description = "Daily time records and metrics"),
        (name = "Leave", description = "Leave requests and approvals"),
        (name = "Overtime", description = "Overtime requests and approvals"),
        (name = "Approvals", description = "Combined HR approval queue"),
        (name = "Balances", description = "Leave balance ledger"),
    )
)]
pub struct ApiDoc;
