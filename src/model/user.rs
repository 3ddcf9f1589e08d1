use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::model::role::Role;

/// One weekday -> shift mapping in a user's schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AssignedShift {
    /// 0 = Sunday .. 6 = Saturday
    #[schema(example = 1)]
    pub day_of_week: u8,
    #[schema(example = 7)]
    pub shift_id: u64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: u64,
    pub company_id: u64,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password: String,
    pub role: Role,
    pub office_id: Option<u64>,
    pub department_id: Option<u64>,
    pub assigned_shifts: Vec<AssignedShift>,
    pub active: bool,
}

impl User {
    pub fn is_assigned_to(&self, shift_id: u64) -> bool {
        self.assigned_shifts.iter().any(|s| s.shift_id == shift_id)
    }
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub company_id: u64,
    pub username: String,
    pub email: String,
    /// argon2 PHC string
    pub password_hash: String,
    pub role: Role,
    pub office_id: Option<u64>,
    pub department_id: Option<u64>,
}
