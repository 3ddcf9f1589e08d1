use actix_web::{HttpResponse, web};
use serde_json::json;

use crate::auth::auth::AuthUser;
use crate::error::AppError;
use crate::service::office::{
    self, AssignShiftRequest, CreateOfficeRequest, EditOfficeRequest, ShiftRequest,
};
use crate::store::Store;

/// Create an office with its shifts
#[utoipa::path(
    post,
    path = "/api/offices",
    request_body = CreateOfficeRequest,
    responses(
        (status = 201, description = "Office created", body = crate::model::office::Office),
        (status = 403, description = "Forbidden"),
        (status = 422, description = "Validation error")
    ),
    security(("bearer_auth" = [])),
    tag = "Office"
)]
pub async fn create(
    auth: AuthUser,
    body: web::Json<CreateOfficeRequest>,
    store: web::Data<dyn Store>,
) -> Result<HttpResponse, AppError> {
    let office = office::create_office(store.get_ref(), &auth, body.into_inner()).await?;
    Ok(HttpResponse::Created().json(office))
}

/// Offices of the caller's company
#[utoipa::path(
    get,
    path = "/api/offices",
    responses(
        (status = 200, description = "Offices", body = [crate::model::office::Office]),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "Office"
)]
pub async fn list(auth: AuthUser, store: web::Data<dyn Store>) -> Result<HttpResponse, AppError> {
    let offices = office::list_offices(store.get_ref(), &auth).await?;
    Ok(HttpResponse::Ok().json(offices))
}

/// Partially update an office
#[utoipa::path(
    put,
    path = "/api/offices/{id}",
    params(("id" = u64, Path, description = "Office id")),
    request_body = EditOfficeRequest,
    responses(
        (status = 200, description = "Office updated", body = crate::model::office::Office),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Office not found"),
        (status = 422, description = "Validation error")
    ),
    security(("bearer_auth" = [])),
    tag = "Office"
)]
pub async fn edit(
    auth: AuthUser,
    path: web::Path<u64>,
    body: web::Json<EditOfficeRequest>,
    store: web::Data<dyn Store>,
) -> Result<HttpResponse, AppError> {
    let office =
        office::edit_office(store.get_ref(), &auth, path.into_inner(), body.into_inner()).await?;
    Ok(HttpResponse::Ok().json(office))
}

/// Add a shift to an office
#[utoipa::path(
    post,
    path = "/api/offices/{id}/shifts",
    params(("id" = u64, Path, description = "Office id")),
    request_body = ShiftRequest,
    responses(
        (status = 201, description = "Shift added", body = crate::model::office::Shift),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Office not found"),
        (status = 422, description = "Validation error")
    ),
    security(("bearer_auth" = [])),
    tag = "Office"
)]
pub async fn add_shift(
    auth: AuthUser,
    path: web::Path<u64>,
    body: web::Json<ShiftRequest>,
    store: web::Data<dyn Store>,
) -> Result<HttpResponse, AppError> {
    let shift =
        office::add_shift(store.get_ref(), &auth, path.into_inner(), body.into_inner()).await?;
    Ok(HttpResponse::Created().json(shift))
}

/// Replace the weekly shifts of office members
#[utoipa::path(
    put,
    path = "/api/offices/assign-shifts",
    request_body = AssignShiftRequest,
    responses(
        (status = 200, description = "Shifts assigned", body = Object, example = json!({
            "message": "Shifts assigned", "count": 3
        })),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Office not found"),
        (status = 422, description = "Shift not on office or bad weekday")
    ),
    security(("bearer_auth" = [])),
    tag = "Office"
)]
pub async fn assign_shifts(
    auth: AuthUser,
    body: web::Json<AssignShiftRequest>,
    store: web::Data<dyn Store>,
) -> Result<HttpResponse, AppError> {
    let count = office::assign_shifts(store.get_ref(), &auth, body.into_inner()).await?;
    Ok(HttpResponse::Ok().json(json!({ "message": "Shifts assigned", "count": count })))
}
