//! Static operation -> allowed roles table.
//!
//! Every core operation consults this table with the caller's role before it
//! reads tenant data or writes anything.

use strum_macros::{AsRefStr, EnumIter};

use crate::error::AppError;
use crate::model::role::Role;

use Role::{Administrator, Hr, Leader, Staff};

#[derive(Debug, Clone, Copy, PartialEq, Eq, AsRefStr, EnumIter)]
#[strum(serialize_all = "camelCase")]
pub enum Operation {
    CheckIn,
    RequestOffDay,
    AddStaff,
    CreateOffice,
    EditOffice,
    AddShift,
    AssignShift,
    ApproveCheckins,
    ViewUserCheckins,
    ViewOffDays,
    DecideOffDay,
    OverrideOffDayDecision,
}

impl Operation {
    pub fn allowed_roles(self) -> &'static [Role] {
        match self {
            Operation::CheckIn | Operation::RequestOffDay => &[Administrator, Hr, Leader, Staff],
            Operation::AddStaff => &[Administrator, Hr],
            Operation::CreateOffice | Operation::EditOffice | Operation::AddShift => {
                &[Administrator]
            }
            Operation::AssignShift => &[Administrator, Hr],
            Operation::ApproveCheckins | Operation::ViewUserCheckins => &[Hr, Administrator],
            Operation::ViewOffDays => &[Hr, Administrator, Leader],
            Operation::DecideOffDay => &[Hr, Administrator],
            Operation::OverrideOffDayDecision => &[Administrator],
        }
    }

    pub fn permits(self, role: Role) -> bool {
        self.allowed_roles().contains(&role)
    }
}

pub fn authorize(role: Role, op: Operation) -> Result<(), AppError> {
    if op.permits(role) {
        Ok(())
    } else {
        tracing::debug!(role = %role, operation = op.as_ref(), "Operation denied by role policy");
        Err(AppError::Forbidden(format!(
            "Role '{}' may not perform '{}'",
            role,
            op.as_ref()
        )))
    }
}
