#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Role {
    SuperAdmin = 1,
    CompanyAdmin = 2,
    HrAdmin = 3,
    PayrollAdmin = 4,
    Supervisor = 5,
    Employee = 6,
}

impl Role {
    pub fn from_id(id: u8) -> Option<Self> {
        match id {
            1 => Some(Role::SuperAdmin),
            2 => Some(Role::CompanyAdmin),
            3 => Some(Role::HrAdmin),
            4 => Some(Role::PayrollAdmin),
            5 => Some(Role::Supervisor),
            6 => Some(Role::Employee),
            _ => None,
        }
    }

    /// Roles allowed to run the administrative override and the year
    /// initialization batch.
    pub fn is_elevated(self) -> bool {
        matches!(
            self,
            Role::SuperAdmin | Role::CompanyAdmin | Role::HrAdmin | Role::PayrollAdmin
        )
    }

    /// Roles allowed to finalize requests at the HR stage.
    pub fn can_finalize(self) -> bool {
        matches!(self, Role::SuperAdmin | Role::CompanyAdmin | Role::HrAdmin)
    }

    /// Roles allowed to act on the supervisor stage.
    pub fn can_supervise(self) -> bool {
        self != Role::Employee
    }

    /// Roles allowed to file manual attendance entries and corrections.
    pub fn can_manage_attendance(self) -> bool {
        matches!(self, Role::SuperAdmin | Role::CompanyAdmin | Role::HrAdmin)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn id_round_trip() {
        for id in 1..=6u8 {
            let role = Role::from_id(id).unwrap();
            assert_eq!(role as u8, id);
        }
        assert!(Role::from_id(0).is_none());
        assert!(Role::from_id(7).is_none());
    }

    #[test]
    fn only_admin_roles_are_elevated() {
        assert!(Role::PayrollAdmin.is_elevated());
        assert!(Role::HrAdmin.is_elevated());
        assert!(!Role::Supervisor.is_elevated());
        assert!(!Role::Employee.is_elevated());
    }

    #[test]
    fn supervisors_cannot_finalize() {
        assert!(!Role::Supervisor.can_finalize());
        assert!(Role::Supervisor.can_supervise());
        assert!(!Role::Employee.can_supervise());
    }
}
