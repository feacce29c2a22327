pub mod attendance;
pub mod employee;
pub mod leave;
pub mod overtime;
pub mod role;
pub mod work_schedule;
