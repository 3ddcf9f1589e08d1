use actix_web::{HttpResponse, web};
use serde::Deserialize;
use serde_json::json;
use utoipa::{IntoParams, ToSchema};

use crate::auth::auth::AuthUser;
use crate::error::AppError;
use crate::model::off_day::OffDayStatus;
use crate::service::off_day::{self, OffDayRequest};
use crate::store::{Page, Store};

#[derive(Debug, Deserialize, IntoParams)]
pub struct OffDayFilter {
    /// pending | approved | denied
    pub status: Option<OffDayStatus>,
    pub page: Option<u32>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ApproveOffDaysRequest {
    #[schema(example = json!([5, 6]))]
    pub ids: Vec<u64>,
    /// Re-decide already decided permissions (administrator only)
    #[serde(default, rename = "override")]
    pub override_decision: bool,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct DenyOffDayRequest {
    #[schema(example = "No cover available")]
    pub reason: String,
    #[serde(default, rename = "override")]
    pub override_decision: bool,
}

/// Request an off-day permission
#[utoipa::path(
    post,
    path = "/api/off-days",
    request_body = OffDayRequest,
    responses(
        (status = 201, description = "Permission requested", body = Object),
        (status = 401, description = "Unauthorized"),
        (status = 422, description = "Validation error")
    ),
    security(("bearer_auth" = [])),
    tag = "OffDay"
)]
pub async fn create(
    auth: AuthUser,
    body: web::Json<OffDayRequest>,
    store: web::Data<dyn Store>,
) -> Result<HttpResponse, AppError> {
    let permission = off_day::request_off_day(store.get_ref(), &auth, body.into_inner()).await?;
    Ok(HttpResponse::Created().json(json!({
        "message": "Off-day permission created",
        "permission": permission,
    })))
}

/// List off-day permissions of the company
#[utoipa::path(
    get,
    path = "/api/off-days",
    params(OffDayFilter),
    responses(
        (status = 200, description = "Permissions", body = Object),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "OffDay"
)]
pub async fn list(
    auth: AuthUser,
    query: web::Query<OffDayFilter>,
    store: web::Data<dyn Store>,
) -> Result<HttpResponse, AppError> {
    let permissions =
        off_day::list_off_days(store.get_ref(), &auth, query.status, Page::new(query.page)).await?;
    Ok(HttpResponse::Ok().json(json!({ "permissions": permissions })))
}

/// Get one off-day permission
#[utoipa::path(
    get,
    path = "/api/off-days/{id}",
    params(("id" = u64, Path, description = "Permission id")),
    responses(
        (status = 200, description = "Permission", body = crate::model::off_day::OffDayPermission),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Not found")
    ),
    security(("bearer_auth" = [])),
    tag = "OffDay"
)]
pub async fn get(
    auth: AuthUser,
    path: web::Path<u64>,
    store: web::Data<dyn Store>,
) -> Result<HttpResponse, AppError> {
    let permission = off_day::get_off_day(store.get_ref(), &auth, path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(permission))
}

/// Approve pending off-day permissions
#[utoipa::path(
    put,
    path = "/api/off-days/approve",
    request_body = ApproveOffDaysRequest,
    responses(
        (status = 200, description = "Approved", body = Object, example = json!({
            "message": "Off-day permissions approved", "count": 1
        })),
        (status = 403, description = "Forbidden"),
        (status = 422, description = "Empty id list")
    ),
    security(("bearer_auth" = [])),
    tag = "OffDay"
)]
pub async fn approve(
    auth: AuthUser,
    body: web::Json<ApproveOffDaysRequest>,
    store: web::Data<dyn Store>,
) -> Result<HttpResponse, AppError> {
    let count =
        off_day::approve_off_days(store.get_ref(), &auth, &body.ids, body.override_decision)
            .await?;
    Ok(HttpResponse::Ok().json(json!({
        "message": "Off-day permissions approved",
        "count": count,
    })))
}

/// Deny a pending off-day permission
#[utoipa::path(
    put,
    path = "/api/off-days/{id}/deny",
    params(("id" = u64, Path, description = "Permission id")),
    request_body = DenyOffDayRequest,
    responses(
        (status = 200, description = "Denied", body = crate::model::off_day::OffDayPermission),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Not found"),
        (status = 409, description = "Already decided"),
        (status = 422, description = "Reason missing")
    ),
    security(("bearer_auth" = [])),
    tag = "OffDay"
)]
pub async fn deny(
    auth: AuthUser,
    path: web::Path<u64>,
    body: web::Json<DenyOffDayRequest>,
    store: web::Data<dyn Store>,
) -> Result<HttpResponse, AppError> {
    let permission = off_day::deny_off_day(
        store.get_ref(),
        &auth,
        path.into_inner(),
        &body.reason,
        body.override_decision,
    )
    .await?;
    Ok(HttpResponse::Ok().json(permission))
}
