use std::collections::BTreeSet;

use serde::Deserialize;
use tracing::info;
use utoipa::ToSchema;

use crate::auth::auth::AuthUser;
use crate::auth::policy::Operation;
use crate::error::{AppError, AppResult};
use crate::model::office::{NewOffice, NewShift, Office, OfficePatch, Shift};
use crate::model::user::AssignedShift;
use crate::service::timezone::parse_zone;
use crate::store::Store;
use crate::utils::geo::GeoPoint;
use crate::utils::hhmm;

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ShiftRequest {
    #[schema(example = "Day shift")]
    pub name: String,
    #[schema(example = "09:00")]
    pub start_time: String,
    #[schema(example = "18:00")]
    pub end_time: String,
}

impl ShiftRequest {
    fn validate(&self) -> AppResult<NewShift> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(AppError::validation("shift name is required"));
        }
        Ok(NewShift {
            name: name.to_string(),
            start_time: hhmm::parse("startTime", &self.start_time)?,
            end_time: hhmm::parse("endTime", &self.end_time)?,
        })
    }
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateOfficeRequest {
    #[schema(example = "Hanoi HQ")]
    pub name: String,
    pub address: Option<String>,
    pub city: Option<String>,
    #[schema(example = "08:00")]
    pub shift_window_start: Option<String>,
    #[schema(example = "22:00")]
    pub shift_window_end: Option<String>,
    #[schema(example = 105.8342)]
    pub longitude: f64,
    #[schema(example = 21.0278)]
    pub latitude: f64,
    #[schema(example = "Asia/Ho_Chi_Minh")]
    pub time_zone_name: Option<String>,
    #[serde(default)]
    pub shifts: Vec<ShiftRequest>,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EditOfficeRequest {
    pub name: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub shift_window_start: Option<String>,
    pub shift_window_end: Option<String>,
    pub longitude: Option<f64>,
    pub latitude: Option<f64>,
    pub time_zone_name: Option<String>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ShiftDays {
    /// 0 = Sunday .. 6 = Saturday
    #[schema(example = json!([1, 2, 3, 4, 5]))]
    pub days: Vec<u8>,
    #[schema(example = 7)]
    pub shift_id: u64,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AssignShiftRequest {
    pub office_id: u64,
    pub user_ids: Vec<u64>,
    pub shifts: Vec<ShiftDays>,
}

fn office_name(name: &str) -> AppResult<String> {
    let name = name.trim();
    if name.chars().count() < 2 {
        return Err(AppError::validation("name must be at least 2 characters"));
    }
    Ok(name.to_string())
}

fn zone_name(name: Option<String>) -> AppResult<Option<String>> {
    match name.map(|n| n.trim().to_string()).filter(|n| !n.is_empty()) {
        Some(n) => parse_zone(&n)
            .map(|tz| Some(tz.name().to_string()))
            .map_err(|e| AppError::validation(e.to_string())),
        None => Ok(None),
    }
}

fn optional_time(field: &str, value: Option<String>) -> AppResult<Option<chrono::NaiveTime>> {
    value.map(|v| hhmm::parse(field, &v)).transpose()
}

/// Loads an office of the caller's company; other tenants' offices are absent.
async fn own_office(store: &dyn Store, auth: &AuthUser, office_id: u64) -> AppResult<Office> {
    store
        .find_office(office_id)
        .await?
        .filter(|o| o.company_id == auth.company_id)
        .ok_or_else(|| AppError::not_found("Office not found"))
}

pub async fn create_office(
    store: &dyn Store,
    auth: &AuthUser,
    req: CreateOfficeRequest,
) -> AppResult<Office> {
    auth.require(Operation::CreateOffice)?;

    let shifts = req
        .shifts
        .iter()
        .map(ShiftRequest::validate)
        .collect::<AppResult<Vec<_>>>()?;

    let office = store
        .insert_office(NewOffice {
            company_id: auth.company_id,
            name: office_name(&req.name)?,
            address: req.address,
            city: req.city,
            shift_window_start: optional_time("shiftWindowStart", req.shift_window_start)?,
            shift_window_end: optional_time("shiftWindowEnd", req.shift_window_end)?,
            location: GeoPoint::new(req.longitude, req.latitude)?,
            time_zone_name: zone_name(req.time_zone_name)?,
            shifts,
        })
        .await?;

    info!(office_id = office.id, company_id = office.company_id, "Office created");
    Ok(office)
}

pub async fn add_shift(
    store: &dyn Store,
    auth: &AuthUser,
    office_id: u64,
    req: ShiftRequest,
) -> AppResult<Shift> {
    auth.require(Operation::AddShift)?;
    let new_shift = req.validate()?;
    own_office(store, auth, office_id).await?;

    let shift = store.insert_shift(office_id, new_shift).await?;
    info!(office_id, shift_id = shift.id, "Shift added");
    Ok(shift)
}

pub async fn edit_office(
    store: &dyn Store,
    auth: &AuthUser,
    office_id: u64,
    req: EditOfficeRequest,
) -> AppResult<Office> {
    auth.require(Operation::EditOffice)?;

    let location = match (req.longitude, req.latitude) {
        (Some(lng), Some(lat)) => Some(GeoPoint::new(lng, lat)?),
        (None, None) => None,
        _ => {
            return Err(AppError::validation(
                "longitude and latitude must be given together",
            ));
        }
    };

    let patch = OfficePatch {
        name: req.name.as_deref().map(office_name).transpose()?,
        address: req.address,
        city: req.city,
        shift_window_start: optional_time("shiftWindowStart", req.shift_window_start)?,
        shift_window_end: optional_time("shiftWindowEnd", req.shift_window_end)?,
        location,
        time_zone_name: zone_name(req.time_zone_name)?,
    };
    if patch.is_empty() {
        return Err(AppError::validation("No fields provided for update"));
    }

    own_office(store, auth, office_id).await?;
    store.update_office(office_id, patch).await?;
    info!(office_id, "Office updated");

    own_office(store, auth, office_id).await
}

pub async fn list_offices(store: &dyn Store, auth: &AuthUser) -> AppResult<Vec<Office>> {
    store.list_offices(auth.company_id).await
}

/// Replaces the weekly schedule of office members; returns users updated.
pub async fn assign_shifts(
    store: &dyn Store,
    auth: &AuthUser,
    req: AssignShiftRequest,
) -> AppResult<u64> {
    auth.require(Operation::AssignShift)?;

    let user_ids: Vec<u64> = req.user_ids.iter().copied().collect::<BTreeSet<_>>().into_iter().collect();
    if user_ids.is_empty() {
        return Err(AppError::validation("userIds must contain at least one id"));
    }

    let office = own_office(store, auth, req.office_id).await?;

    let mut schedule = BTreeSet::new();
    for entry in &req.shifts {
        if office.shift(entry.shift_id).is_none() {
            return Err(AppError::InvalidShift(format!(
                "Shift {} does not belong to the office",
                entry.shift_id
            )));
        }
        for &day in &entry.days {
            if day > 6 {
                return Err(AppError::validation("days must be between 0 and 6"));
            }
            schedule.insert((day, entry.shift_id));
        }
    }

    let schedule: Vec<AssignedShift> = schedule
        .into_iter()
        .map(|(day_of_week, shift_id)| AssignedShift {
            day_of_week,
            shift_id,
        })
        .collect();

    let updated = store
        .assign_shifts(auth.company_id, office.id, &user_ids, &schedule)
        .await?;

    info!(
        office_id = office.id,
        requested = user_ids.len(),
        updated,
        "Shifts assigned"
    );
    Ok(updated)
}
