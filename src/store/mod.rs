//! Persistence seams consumed by the core.
//!
//! Each aggregate gets its own trait; [`Store`] bundles them so handlers can
//! take a single `web::Data<dyn Store>`.

#[cfg(test)]
pub mod memory;
pub mod mysql;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::AppResult;
use crate::model::{
    attendance::{AttendanceRecord, CloseAttendance, NewAttendanceRecord},
    off_day::{NewOffDayPermission, OffDayPermission, OffDayStatus, Verifier},
    office::{NewOffice, NewShift, Office, OfficePatch, Shift},
    revoked_token::RevokedToken,
    user::{AssignedShift, NewUser, User},
};
use crate::utils::geo::GeoPoint;

/// 1-based page with a fixed size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub number: u32,
    pub size: u32,
}

impl Page {
    pub const DEFAULT_SIZE: u32 = 10;

    pub fn new(number: Option<u32>) -> Self {
        Self {
            number: number.unwrap_or(1).max(1),
            size: Self::DEFAULT_SIZE,
        }
    }

    pub fn offset(&self) -> u64 {
        u64::from(self.number - 1) * u64::from(self.size)
    }
}

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_user(&self, user_id: u64) -> AppResult<Option<User>>;

    async fn find_user_by_username(&self, username: &str) -> AppResult<Option<User>>;

    /// Fails with `Conflict` when the username is taken.
    async fn insert_user(&self, user: NewUser) -> AppResult<User>;

    /// Replaces the schedules of the given users that belong to `company_id`
    /// and work at `office_id`. Returns how many users were updated.
    async fn assign_shifts(
        &self,
        company_id: u64,
        office_id: u64,
        user_ids: &[u64],
        shifts: &[AssignedShift],
    ) -> AppResult<u64>;
}

#[async_trait]
pub trait RevocationStore: Send + Sync {
    async fn revoke_token(&self, token: RevokedToken) -> AppResult<()>;

    async fn is_token_revoked(&self, jti: &str) -> AppResult<bool>;

    /// Deletes revocations whose credential has expired by `now`.
    async fn purge_expired_revocations(&self, now: DateTime<Utc>) -> AppResult<u64>;
}

#[async_trait]
pub trait OfficeStore: Send + Sync {
    async fn insert_office(&self, office: NewOffice) -> AppResult<Office>;

    async fn find_office(&self, office_id: u64) -> AppResult<Option<Office>>;

    async fn list_offices(&self, company_id: u64) -> AppResult<Vec<Office>>;

    async fn update_office(&self, office_id: u64, patch: OfficePatch) -> AppResult<()>;

    async fn insert_shift(&self, office_id: u64, shift: NewShift) -> AppResult<Shift>;

    /// Offices of `company_id` within `max_distance_m` meters of `point`.
    async fn find_offices_near(
        &self,
        company_id: u64,
        point: GeoPoint,
        max_distance_m: f64,
    ) -> AppResult<Vec<Office>>;
}

#[async_trait]
pub trait AttendanceStore: Send + Sync {
    /// Most recent record of the user that has no punch-out.
    async fn find_open_record(&self, user_id: u64) -> AppResult<Option<AttendanceRecord>>;

    /// Fails with `Conflict` if the user already has an open record.
    async fn insert_record(&self, record: NewAttendanceRecord) -> AppResult<AttendanceRecord>;

    /// Fails with `Conflict` if the record is no longer open.
    async fn close_record(&self, record_id: u64, close: CloseAttendance)
    -> AppResult<AttendanceRecord>;

    async fn find_record(&self, record_id: u64) -> AppResult<Option<AttendanceRecord>>;

    async fn list_user_records(
        &self,
        company_id: u64,
        user_id: u64,
        page: Page,
    ) -> AppResult<Vec<AttendanceRecord>>;

    /// Sets `approved` on the matching records of the company; returns matches.
    async fn set_records_approved(
        &self,
        company_id: u64,
        ids: &[u64],
        approved: bool,
    ) -> AppResult<u64>;
}

#[async_trait]
pub trait OffDayStore: Send + Sync {
    async fn insert_off_day(&self, permission: NewOffDayPermission) -> AppResult<OffDayPermission>;

    async fn find_off_day(&self, company_id: u64, id: u64) -> AppResult<Option<OffDayPermission>>;

    async fn list_off_days(
        &self,
        company_id: u64,
        status: Option<OffDayStatus>,
        page: Page,
    ) -> AppResult<Vec<OffDayPermission>>;

    /// Accepts the listed permissions. With `pending_only` decided records
    /// are left alone. Returns how many were updated.
    async fn approve_off_days(
        &self,
        company_id: u64,
        ids: &[u64],
        verifier: &Verifier,
        pending_only: bool,
    ) -> AppResult<u64>;

    async fn deny_off_day(
        &self,
        company_id: u64,
        id: u64,
        verifier: &Verifier,
        reason: &str,
        pending_only: bool,
    ) -> AppResult<u64>;
}

pub trait Store: UserStore + RevocationStore + OfficeStore + AttendanceStore + OffDayStore {}

impl<T> Store for T where T: UserStore + RevocationStore + OfficeStore + AttendanceStore + OffDayStore
{}

#[cfg(test)]
mod tests {
    use super::Page;

    #[test]
    fn page_defaults_and_offset() {
        assert_eq!(Page::new(None).number, 1);
        assert_eq!(Page::new(Some(0)).number, 1);
        assert_eq!(Page::new(Some(3)).offset(), 20);
    }
}
