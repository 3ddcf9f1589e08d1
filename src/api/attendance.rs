use actix_web::{HttpResponse, web};
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;
use utoipa::{IntoParams, ToSchema};

use crate::auth::auth::AuthUser;
use crate::config::Config;
use crate::error::AppError;
use crate::service::approval::set_checkin_approval;
use crate::service::attendance::{self, PunchCommand, PunchOutcome, PunchSettings};
use crate::service::timezone::TimeZoneLookup;
use crate::store::{Page, Store};

#[derive(Debug, Deserialize, IntoParams)]
pub struct PageQuery {
    /// 1-based page, 10 records per page
    pub page: Option<u32>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct IdsRequest {
    #[schema(example = json!([41, 42]))]
    pub ids: Vec<u64>,
}

/// Punch in, or punch out of the open check-in
#[utoipa::path(
    post,
    path = "/api/attendance",
    request_body = PunchCommand,
    responses(
        (status = 201, description = "Punch recorded", body = Object, example = json!({
            "message": "Checkin success",
            "timeCheckin": {"id": 42, "lateMinutes": 15, "checkOut": null}
        })),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "User not found"),
        (status = 409, description = "Concurrent punch for the same user"),
        (status = 422, description = "Location mismatch, invalid shift or bad coordinates")
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
pub async fn punch(
    auth: AuthUser,
    cmd: web::Json<PunchCommand>,
    store: web::Data<dyn Store>,
    zones: web::Data<dyn TimeZoneLookup>,
    config: web::Data<Config>,
) -> Result<HttpResponse, AppError> {
    let settings = PunchSettings::from(config.get_ref());
    let outcome = attendance::punch(
        store.get_ref(),
        zones.get_ref(),
        &auth,
        cmd.into_inner(),
        &settings,
        Utc::now(),
    )
    .await?;

    let message = match &outcome {
        PunchOutcome::CheckedIn(_) => "Checkin success",
        PunchOutcome::CheckedOut(_) => "Checkout Success",
    };

    Ok(HttpResponse::Created().json(json!({
        "message": message,
        "timeCheckin": outcome.record(),
    })))
}

/// The caller's own check-ins, newest first
#[utoipa::path(
    get,
    path = "/api/attendance",
    params(PageQuery),
    responses(
        (status = 200, description = "Check-ins", body = Object),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
pub async fn list_own(
    auth: AuthUser,
    query: web::Query<PageQuery>,
    store: web::Data<dyn Store>,
) -> Result<HttpResponse, AppError> {
    let checkins = attendance::list_own_checkins(store.get_ref(), &auth, Page::new(query.page)).await?;

    Ok(HttpResponse::Ok().json(json!({
        "message": "Get Self Checkins Success",
        "checkins": checkins,
    })))
}

/// Check-ins of a user in the caller's company
#[utoipa::path(
    get,
    path = "/api/attendance/user/{id}",
    params(("id" = u64, Path, description = "User id"), PageQuery),
    responses(
        (status = 200, description = "Check-ins", body = Object),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
pub async fn list_for_user(
    auth: AuthUser,
    path: web::Path<u64>,
    query: web::Query<PageQuery>,
    store: web::Data<dyn Store>,
) -> Result<HttpResponse, AppError> {
    let checkins = attendance::list_user_checkins(
        store.get_ref(),
        &auth,
        path.into_inner(),
        Page::new(query.page),
    )
    .await?;

    Ok(HttpResponse::Ok().json(json!({
        "message": "Get User Checkins Success",
        "checkins": checkins,
    })))
}

/// Approve check-ins in bulk
#[utoipa::path(
    put,
    path = "/api/attendance/approve",
    request_body = IdsRequest,
    responses(
        (status = 200, description = "Approved", body = Object, example = json!({
            "message": "Checkins approved", "count": 2
        })),
        (status = 403, description = "Forbidden"),
        (status = 422, description = "Empty id list")
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
pub async fn approve(
    auth: AuthUser,
    body: web::Json<IdsRequest>,
    store: web::Data<dyn Store>,
) -> Result<HttpResponse, AppError> {
    let count = set_checkin_approval(store.get_ref(), &auth, &body.ids, true).await?;
    Ok(HttpResponse::Ok().json(json!({ "message": "Checkins approved", "count": count })))
}

/// Cancel approval of check-ins in bulk
#[utoipa::path(
    put,
    path = "/api/attendance/unapprove",
    request_body = IdsRequest,
    responses(
        (status = 200, description = "Approval cancelled", body = Object),
        (status = 403, description = "Forbidden"),
        (status = 422, description = "Empty id list")
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
pub async fn unapprove(
    auth: AuthUser,
    body: web::Json<IdsRequest>,
    store: web::Data<dyn Store>,
) -> Result<HttpResponse, AppError> {
    let count = set_checkin_approval(store.get_ref(), &auth, &body.ids, false).await?;
    Ok(HttpResponse::Ok().json(json!({ "message": "Checkin approvals cancelled", "count": count })))
}
