//! In-process store backing the unit tests.

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::{AttendanceStore, OffDayStore, OfficeStore, Page, RevocationStore, UserStore};
use crate::error::{AppError, AppResult};
use crate::model::{
    attendance::{AttendanceRecord, CloseAttendance, NewAttendanceRecord},
    off_day::{NewOffDayPermission, OffDayPermission, OffDayStatus, Verifier},
    office::{NewOffice, NewShift, Office, OfficePatch, Shift},
    revoked_token::RevokedToken,
    user::{AssignedShift, NewUser, User},
};
use crate::utils::geo::GeoPoint;

#[derive(Default)]
struct Tables {
    next_id: u64,
    users: BTreeMap<u64, User>,
    offices: BTreeMap<u64, Office>,
    records: BTreeMap<u64, AttendanceRecord>,
    off_days: BTreeMap<u64, OffDayPermission>,
    revoked: BTreeMap<String, RevokedToken>,
}

impl Tables {
    fn next_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }
}

#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Tables> {
        self.tables.lock().expect("memory store poisoned")
    }

    pub fn records(&self) -> Vec<AttendanceRecord> {
        self.lock().records.values().cloned().collect()
    }

    pub fn put_user(&self, user: User) {
        let mut t = self.lock();
        t.next_id = t.next_id.max(user.id);
        t.users.insert(user.id, user);
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn find_user(&self, user_id: u64) -> AppResult<Option<User>> {
        Ok(self.lock().users.get(&user_id).cloned())
    }

    async fn find_user_by_username(&self, username: &str) -> AppResult<Option<User>> {
        Ok(self
            .lock()
            .users
            .values()
            .find(|u| u.username == username)
            .cloned())
    }

    async fn insert_user(&self, user: NewUser) -> AppResult<User> {
        let mut t = self.lock();
        if t.users.values().any(|u| u.username == user.username) {
            return Err(AppError::conflict("Username already exists"));
        }

        let created = User {
            id: t.next_id(),
            company_id: user.company_id,
            username: user.username,
            email: user.email,
            password: user.password_hash,
            role: user.role,
            office_id: user.office_id,
            department_id: user.department_id,
            assigned_shifts: Vec::new(),
            active: true,
        };
        t.users.insert(created.id, created.clone());
        Ok(created)
    }

    async fn assign_shifts(
        &self,
        company_id: u64,
        office_id: u64,
        user_ids: &[u64],
        shifts: &[AssignedShift],
    ) -> AppResult<u64> {
        let mut t = self.lock();
        let mut updated = 0;
        for user in t.users.values_mut() {
            if user.company_id == company_id
                && user.office_id == Some(office_id)
                && user_ids.contains(&user.id)
            {
                user.assigned_shifts = shifts.to_vec();
                updated += 1;
            }
        }
        Ok(updated)
    }
}

#[async_trait]
impl RevocationStore for MemoryStore {
    async fn revoke_token(&self, token: RevokedToken) -> AppResult<()> {
        self.lock().revoked.entry(token.jti.clone()).or_insert(token);
        Ok(())
    }

    async fn is_token_revoked(&self, jti: &str) -> AppResult<bool> {
        Ok(self.lock().revoked.contains_key(jti))
    }

    async fn purge_expired_revocations(&self, now: DateTime<Utc>) -> AppResult<u64> {
        let mut t = self.lock();
        let before = t.revoked.len();
        t.revoked.retain(|_, r| r.expires_at > now);
        Ok((before - t.revoked.len()) as u64)
    }
}

#[async_trait]
impl OfficeStore for MemoryStore {
    async fn insert_office(&self, office: NewOffice) -> AppResult<Office> {
        let mut t = self.lock();
        let id = t.next_id();
        let shifts = office
            .shifts
            .into_iter()
            .map(|s| Shift {
                id: t.next_id(),
                office_id: id,
                name: s.name,
                start_time: s.start_time,
                end_time: s.end_time,
            })
            .collect();

        let created = Office {
            id,
            company_id: office.company_id,
            name: office.name,
            address: office.address,
            city: office.city,
            shift_window_start: office.shift_window_start,
            shift_window_end: office.shift_window_end,
            location: office.location,
            time_zone_name: office.time_zone_name,
            shifts,
        };
        t.offices.insert(id, created.clone());
        Ok(created)
    }

    async fn find_office(&self, office_id: u64) -> AppResult<Option<Office>> {
        Ok(self.lock().offices.get(&office_id).cloned())
    }

    async fn list_offices(&self, company_id: u64) -> AppResult<Vec<Office>> {
        Ok(self
            .lock()
            .offices
            .values()
            .filter(|o| o.company_id == company_id)
            .cloned()
            .collect())
    }

    async fn update_office(&self, office_id: u64, patch: OfficePatch) -> AppResult<()> {
        let mut t = self.lock();
        let office = t
            .offices
            .get_mut(&office_id)
            .ok_or_else(|| AppError::not_found("Office not found"))?;

        if let Some(v) = patch.name {
            office.name = v;
        }
        if let Some(v) = patch.address {
            office.address = Some(v);
        }
        if let Some(v) = patch.city {
            office.city = Some(v);
        }
        if let Some(v) = patch.shift_window_start {
            office.shift_window_start = Some(v);
        }
        if let Some(v) = patch.shift_window_end {
            office.shift_window_end = Some(v);
        }
        if let Some(v) = patch.location {
            office.location = v;
        }
        if let Some(v) = patch.time_zone_name {
            office.time_zone_name = Some(v);
        }
        Ok(())
    }

    async fn insert_shift(&self, office_id: u64, shift: NewShift) -> AppResult<Shift> {
        let mut t = self.lock();
        let id = t.next_id();
        let office = t
            .offices
            .get_mut(&office_id)
            .ok_or_else(|| AppError::not_found("Office not found"))?;

        let created = Shift {
            id,
            office_id,
            name: shift.name,
            start_time: shift.start_time,
            end_time: shift.end_time,
        };
        office.shifts.push(created.clone());
        Ok(created)
    }

    async fn find_offices_near(
        &self,
        company_id: u64,
        point: GeoPoint,
        max_distance_m: f64,
    ) -> AppResult<Vec<Office>> {
        Ok(self
            .lock()
            .offices
            .values()
            .filter(|o| o.company_id == company_id && o.location.distance_to(&point) <= max_distance_m)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl AttendanceStore for MemoryStore {
    async fn find_open_record(&self, user_id: u64) -> AppResult<Option<AttendanceRecord>> {
        Ok(self
            .lock()
            .records
            .values()
            .filter(|r| r.user_id == user_id && r.is_open())
            .max_by_key(|r| r.check_in.timestamp)
            .cloned())
    }

    async fn insert_record(&self, record: NewAttendanceRecord) -> AppResult<AttendanceRecord> {
        let mut t = self.lock();
        if t.records.values().any(|r| r.user_id == record.user_id && r.is_open()) {
            return Err(AppError::conflict("An open check-in already exists for this user"));
        }

        let now = record.check_in.timestamp;
        let created = AttendanceRecord {
            id: t.next_id(),
            company_id: record.company_id,
            office_id: record.office_id,
            office_name: record.office_name,
            user_id: record.user_id,
            username: record.username,
            check_in: record.check_in,
            check_out: None,
            worked_minutes: None,
            late_minutes: record.late_minutes,
            approved: false,
            shift_id: record.shift_id,
            shift_name: record.shift_name,
            time_zone_name: record.time_zone_name,
            created_at: now,
            updated_at: now,
        };
        t.records.insert(created.id, created.clone());
        Ok(created)
    }

    async fn close_record(
        &self,
        record_id: u64,
        close: CloseAttendance,
    ) -> AppResult<AttendanceRecord> {
        let mut t = self.lock();
        let record = t
            .records
            .get_mut(&record_id)
            .ok_or_else(|| AppError::not_found("Check-in not found"))?;
        if !record.is_open() {
            return Err(AppError::conflict("Check-in was already closed"));
        }

        record.check_out = Some(close.check_out);
        record.worked_minutes = Some(close.worked_minutes);
        record.updated_at = close.updated_at;
        Ok(record.clone())
    }

    async fn find_record(&self, record_id: u64) -> AppResult<Option<AttendanceRecord>> {
        Ok(self.lock().records.get(&record_id).cloned())
    }

    async fn list_user_records(
        &self,
        company_id: u64,
        user_id: u64,
        page: Page,
    ) -> AppResult<Vec<AttendanceRecord>> {
        let mut rows: Vec<_> = self
            .lock()
            .records
            .values()
            .filter(|r| r.company_id == company_id && r.user_id == user_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.check_in.timestamp.cmp(&a.check_in.timestamp));

        Ok(rows
            .into_iter()
            .skip(page.offset() as usize)
            .take(page.size as usize)
            .collect())
    }

    async fn set_records_approved(
        &self,
        company_id: u64,
        ids: &[u64],
        approved: bool,
    ) -> AppResult<u64> {
        let mut t = self.lock();
        let mut matched = 0;
        for record in t.records.values_mut() {
            if record.company_id == company_id && ids.contains(&record.id) {
                record.approved = approved;
                matched += 1;
            }
        }
        Ok(matched)
    }
}

#[async_trait]
impl OffDayStore for MemoryStore {
    async fn insert_off_day(&self, permission: NewOffDayPermission) -> AppResult<OffDayPermission> {
        let mut t = self.lock();
        let created = OffDayPermission {
            id: t.next_id(),
            company_id: permission.company_id,
            user_id: permission.user_id,
            from_date: permission.from_date,
            to_date: permission.to_date,
            duration: permission.duration,
            reason: permission.reason,
            description: permission.description,
            accepted: None,
            verifying_user: None,
            denied_reason: None,
            created_at: Utc::now(),
        };
        t.off_days.insert(created.id, created.clone());
        Ok(created)
    }

    async fn find_off_day(&self, company_id: u64, id: u64) -> AppResult<Option<OffDayPermission>> {
        Ok(self
            .lock()
            .off_days
            .get(&id)
            .filter(|p| p.company_id == company_id)
            .cloned())
    }

    async fn list_off_days(
        &self,
        company_id: u64,
        status: Option<OffDayStatus>,
        page: Page,
    ) -> AppResult<Vec<OffDayPermission>> {
        Ok(self
            .lock()
            .off_days
            .values()
            .rev()
            .filter(|p| p.company_id == company_id && status.is_none_or(|s| p.status() == s))
            .skip(page.offset() as usize)
            .take(page.size as usize)
            .cloned()
            .collect())
    }

    async fn approve_off_days(
        &self,
        company_id: u64,
        ids: &[u64],
        verifier: &Verifier,
        pending_only: bool,
    ) -> AppResult<u64> {
        let mut t = self.lock();
        let mut updated = 0;
        for p in t.off_days.values_mut() {
            if p.company_id == company_id
                && ids.contains(&p.id)
                && (!pending_only || p.accepted.is_none())
            {
                p.accepted = Some(true);
                p.verifying_user = Some(verifier.clone());
                p.denied_reason = None;
                updated += 1;
            }
        }
        Ok(updated)
    }

    async fn deny_off_day(
        &self,
        company_id: u64,
        id: u64,
        verifier: &Verifier,
        reason: &str,
        pending_only: bool,
    ) -> AppResult<u64> {
        let mut t = self.lock();
        match t.off_days.get_mut(&id) {
            Some(p) if p.company_id == company_id && (!pending_only || p.accepted.is_none()) => {
                p.accepted = Some(false);
                p.verifying_user = Some(verifier.clone());
                p.denied_reason = Some(reason.to_string());
                Ok(1)
            }
            _ => Ok(0),
        }
    }
}
