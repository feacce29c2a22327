pub mod approvals;
pub mod attendance;
pub mod leave_balance;
pub mod leave_request;
pub mod overtime_request;
pub mod year_init;
