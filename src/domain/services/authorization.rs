//! Role gate for privileged operations.

use crate::domain::{error::DomainError, models::user::Role};

const ACTIVITY_MANAGERS: &[Role] = &[Role::Admin, Role::ActivityAdmin];
const ADMINS: &[Role] = &[Role::Admin];

/// Operations that are not open to every caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    CreateActivity,
    UpdateActivity,
    DeleteActivity,
    /// Creating an account with any role above STUDENT.
    GrantElevatedRole,
}

impl Operation {
    pub fn allowed_roles(self) -> &'static [Role] {
        match self {
            Operation::CreateActivity | Operation::UpdateActivity | Operation::DeleteActivity => {
                ACTIVITY_MANAGERS
            }
            Operation::GrantElevatedRole => ADMINS,
        }
    }

    pub fn gate(self) -> RoleGate {
        require_role(self.allowed_roles())
    }
}

#[derive(Debug, Clone, Copy)]
pub struct RoleGate {
    allowed: &'static [Role],
}

impl RoleGate {
    pub fn check(&self, role: Role) -> Result<(), DomainError> {
        if self.allowed.contains(&role) {
            Ok(())
        } else {
            Err(DomainError::Forbidden)
        }
    }
}

pub fn require_role(allowed: &'static [Role]) -> RoleGate {
    RoleGate { allowed }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ADMIN_OPERATIONS: [Operation; 3] = [
        Operation::CreateActivity,
        Operation::UpdateActivity,
        Operation::DeleteActivity,
    ];

    #[test]
    fn students_are_turned_away_from_admin_operations() {
        for op in ADMIN_OPERATIONS {
            assert!(matches!(op.gate().check(Role::Student), Err(DomainError::Forbidden)));
        }
    }

    #[test]
    fn admins_and_activity_admins_pass() {
        for op in ADMIN_OPERATIONS {
            assert!(op.gate().check(Role::Admin).is_ok());
            assert!(op.gate().check(Role::ActivityAdmin).is_ok());
        }
    }

    #[test]
    fn only_admins_grant_elevated_roles() {
        let gate = Operation::GrantElevatedRole.gate();
        assert!(gate.check(Role::Admin).is_ok());
        assert!(gate.check(Role::ActivityAdmin).is_err());
        assert!(gate.check(Role::Student).is_err());
    }

    #[test]
    fn empty_gate_rejects_everyone() {
        let gate = require_role(&[]);
        assert!(gate.check(Role::Admin).is_err());
    }
}
