//! Punch-in / punch-out state machine and the attendance reads.
//!
//! A user has at most one open record. A punch with no open record opens one,
//! a punch with an open record closes that record, whatever shift id the
//! second punch carries.

use chrono::{DateTime, NaiveDateTime, NaiveTime, Utc};
use serde::Deserialize;
use tracing::info;
use utoipa::ToSchema;

use crate::auth::auth::AuthUser;
use crate::auth::policy::Operation;
use crate::config::{Config, PunchOutShift};
use crate::error::{AppError, AppResult};
use crate::model::attendance::{AttendanceRecord, CloseAttendance, NewAttendanceRecord, PunchEvent};
use crate::model::office::Shift;
use crate::service::geofence::resolve_shift;
use crate::service::timezone::TimeZoneLookup;
use crate::store::{Page, Store};
use crate::utils::geo::GeoPoint;

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PunchCommand {
    #[schema(example = 3)]
    pub office_id: u64,
    #[schema(example = 7)]
    pub shift_id: u64,
    #[schema(example = 105.8342)]
    pub longitude: f64,
    #[schema(example = 21.0278)]
    pub latitude: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PunchOutcome {
    CheckedIn(AttendanceRecord),
    CheckedOut(AttendanceRecord),
}

impl PunchOutcome {
    pub fn record(&self) -> &AttendanceRecord {
        match self {
            PunchOutcome::CheckedIn(r) | PunchOutcome::CheckedOut(r) => r,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct PunchSettings {
    pub radius_meters: f64,
    pub punch_out_shift: PunchOutShift,
}

impl From<&Config> for PunchSettings {
    fn from(config: &Config) -> Self {
        Self {
            radius_meters: config.geofence_radius_meters,
            punch_out_shift: config.punch_out_shift,
        }
    }
}

/// Minutes after the shift start, zero when on time or early.
pub fn late_minutes(shift: &Shift, check_in: NaiveTime) -> i64 {
    shift.minutes_since_start(check_in).max(0)
}

/// Minutes from the start of the shift occurrence punched into, less the
/// recorded lateness, within `0..=shift length`.
pub fn worked_minutes(
    shift: &Shift,
    check_in: NaiveDateTime,
    check_out: NaiveDateTime,
    late: i64,
) -> i64 {
    (shift.minutes_elapsed(check_in, check_out) - late).clamp(0, shift.length_minutes())
}

pub async fn punch(
    store: &dyn Store,
    zones: &dyn TimeZoneLookup,
    auth: &AuthUser,
    cmd: PunchCommand,
    settings: &PunchSettings,
    now: DateTime<Utc>,
) -> AppResult<PunchOutcome> {
    auth.require(Operation::CheckIn)?;

    let position = GeoPoint::new(cmd.longitude, cmd.latitude)?;
    let resolved = resolve_shift(
        store,
        zones,
        auth,
        cmd.office_id,
        cmd.shift_id,
        position,
        settings.radius_meters,
    )
    .await?;

    let local_time = resolved.zone.local_time(now);
    let event = PunchEvent {
        timestamp: now,
        local_time,
        location: position,
    };

    match store.find_open_record(auth.user_id).await? {
        Some(open) => {
            let shift = match settings.punch_out_shift {
                PunchOutShift::Requested => resolved.shift,
                PunchOutShift::Recorded => recorded_shift(store, &open).await?,
            };
            let worked =
                worked_minutes(&shift, open.check_in.local_time, local_time, open.late_minutes);

            let closed = store
                .close_record(
                    open.id,
                    CloseAttendance {
                        check_out: event,
                        worked_minutes: worked,
                        updated_at: now,
                    },
                )
                .await?;

            info!(
                record_id = closed.id,
                user_id = auth.user_id,
                shift_id = shift.id,
                worked_minutes = worked,
                "Punch-out recorded"
            );
            Ok(PunchOutcome::CheckedOut(closed))
        }
        None => {
            let late = late_minutes(&resolved.shift, local_time.time());

            let opened = store
                .insert_record(NewAttendanceRecord {
                    company_id: auth.company_id,
                    office_id: resolved.office.id,
                    office_name: resolved.office.name,
                    user_id: auth.user_id,
                    username: resolved.user.username,
                    check_in: event,
                    late_minutes: late,
                    shift_id: resolved.shift.id,
                    shift_name: resolved.shift.name,
                    time_zone_name: resolved.zone.name(),
                })
                .await?;

            info!(
                record_id = opened.id,
                user_id = auth.user_id,
                late_minutes = late,
                "Punch-in recorded"
            );
            Ok(PunchOutcome::CheckedIn(opened))
        }
    }
}

/// Re-reads the shift the open record was punched in against.
async fn recorded_shift(store: &dyn Store, open: &AttendanceRecord) -> AppResult<Shift> {
    store
        .find_office(open.office_id)
        .await?
        .and_then(|office| office.shift(open.shift_id).cloned())
        .ok_or_else(|| AppError::InvalidShift("Recorded shift no longer exists".into()))
}

pub async fn list_own_checkins(
    store: &dyn Store,
    auth: &AuthUser,
    page: Page,
) -> AppResult<Vec<AttendanceRecord>> {
    store
        .list_user_records(auth.company_id, auth.user_id, page)
        .await
}

pub async fn list_user_checkins(
    store: &dyn Store,
    auth: &AuthUser,
    user_id: u64,
    page: Page,
) -> AppResult<Vec<AttendanceRecord>> {
    auth.require(Operation::ViewUserCheckins)?;
    store.list_user_records(auth.company_id, user_id, page).await
}
