use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::utils::geo::GeoPoint;

/// A single punch: the instant, the office-local wall clock and where it happened.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PunchEvent {
    #[schema(example = "2026-03-02T02:15:00Z", value_type = String, format = "date-time")]
    pub timestamp: DateTime<Utc>,
    /// Wall clock in the resolved time zone.
    #[schema(example = "2026-03-02T09:15:00", value_type = String)]
    pub local_time: NaiveDateTime,
    pub location: GeoPoint,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceRecord {
    #[schema(example = 42)]
    pub id: u64,
    pub company_id: u64,
    pub office_id: u64,
    #[schema(example = "Hanoi HQ")]
    pub office_name: String,
    pub user_id: u64,
    pub username: String,
    pub check_in: PunchEvent,
    /// `None` while the record is open.
    pub check_out: Option<PunchEvent>,
    /// Set on punch-out, clamped to the shift length.
    #[schema(example = 465)]
    pub worked_minutes: Option<i64>,
    #[schema(example = 15)]
    pub late_minutes: i64,
    pub approved: bool,
    pub shift_id: u64,
    pub shift_name: String,
    /// `None` when the zone could not be resolved and server time was used.
    #[schema(example = "Asia/Ho_Chi_Minh")]
    pub time_zone_name: Option<String>,
    #[schema(value_type = String, format = "date-time")]
    pub created_at: DateTime<Utc>,
    #[schema(value_type = String, format = "date-time")]
    pub updated_at: DateTime<Utc>,
}

impl AttendanceRecord {
    pub fn is_open(&self) -> bool {
        self.check_out.is_none()
    }
}

/// Everything needed to persist an open record.
#[derive(Debug, Clone, PartialEq)]
pub struct NewAttendanceRecord {
    pub company_id: u64,
    pub office_id: u64,
    pub office_name: String,
    pub user_id: u64,
    pub username: String,
    pub check_in: PunchEvent,
    pub late_minutes: i64,
    pub shift_id: u64,
    pub shift_name: String,
    pub time_zone_name: Option<String>,
}

/// Punch-out patch applied to an open record.
#[derive(Debug, Clone, PartialEq)]
pub struct CloseAttendance {
    pub check_out: PunchEvent,
    pub worked_minutes: i64,
    pub updated_at: DateTime<Utc>,
}
