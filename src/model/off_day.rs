use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, EnumString};
use utoipa::ToSchema;

/// Who approved or denied a permission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Verifier {
    pub user_id: u64,
    pub username: String,
    pub email: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumString, AsRefStr, ToSchema)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum OffDayStatus {
    Pending,
    Approved,
    Denied,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OffDayPermission {
    pub id: u64,
    pub company_id: u64,
    pub user_id: u64,
    #[schema(example = "2026-04-01", value_type = String, format = "date")]
    pub from_date: NaiveDate,
    #[schema(example = "2026-04-02", value_type = String, format = "date")]
    pub to_date: NaiveDate,
    #[schema(example = "2 days")]
    pub duration: String,
    #[schema(example = "family")]
    pub reason: String,
    pub description: String,
    /// `None` while pending.
    pub accepted: Option<bool>,
    pub verifying_user: Option<Verifier>,
    pub denied_reason: Option<String>,
    #[schema(value_type = String, format = "date-time")]
    pub created_at: DateTime<Utc>,
}

impl OffDayPermission {
    pub fn status(&self) -> OffDayStatus {
        match self.accepted {
            None => OffDayStatus::Pending,
            Some(true) => OffDayStatus::Approved,
            Some(false) => OffDayStatus::Denied,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewOffDayPermission {
    pub company_id: u64,
    pub user_id: u64,
    pub from_date: NaiveDate,
    pub to_date: NaiveDate,
    pub duration: String,
    pub reason: String,
    pub description: String,
}
