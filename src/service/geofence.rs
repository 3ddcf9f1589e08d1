//! Maps a reported position and shift id onto the caller's office and shift.

use tracing::debug;

use crate::auth::auth::AuthUser;
use crate::error::{AppError, AppResult};
use crate::model::office::{Office, Shift};
use crate::model::user::User;
use crate::service::timezone::{TimeZoneLookup, Zone, resolve_zone};
use crate::store::Store;
use crate::utils::geo::GeoPoint;

#[derive(Debug, Clone)]
pub struct ResolvedShift {
    pub user: User,
    pub office: Office,
    pub shift: Shift,
    pub zone: Zone,
}

pub async fn resolve_shift(
    store: &dyn Store,
    zones: &dyn TimeZoneLookup,
    auth: &AuthUser,
    office_id: u64,
    shift_id: u64,
    position: GeoPoint,
    radius_meters: f64,
) -> AppResult<ResolvedShift> {
    let user = store
        .find_user(auth.user_id)
        .await?
        .filter(|u| u.company_id == auth.company_id)
        .ok_or_else(|| AppError::not_found("User not found"))?;

    if user.office_id != Some(office_id) {
        return Err(AppError::LocationMismatch(
            "Office is not the user's workplace".into(),
        ));
    }

    let nearby = store
        .find_offices_near(auth.company_id, position, radius_meters)
        .await?;
    debug!(
        user_id = user.id,
        candidates = nearby.len(),
        "Offices within geofence"
    );

    let office = nearby
        .into_iter()
        .find(|o| o.id == office_id)
        .ok_or_else(|| AppError::LocationMismatch("Invalid location checkin".into()))?;

    let shift = office
        .shift(shift_id)
        .cloned()
        .ok_or_else(|| AppError::InvalidShift("Shift does not belong to the office".into()))?;

    if !user.is_assigned_to(shift_id) {
        return Err(AppError::InvalidShift("Shift is not assigned to the user".into()));
    }

    let zone = resolve_zone(&office, zones).await;

    Ok(ResolvedShift {
        user,
        office,
        shift,
        zone,
    })
}
