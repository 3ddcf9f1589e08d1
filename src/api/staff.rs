use actix_web::{HttpResponse, web};
use serde_json::json;

use crate::auth::auth::AuthUser;
use crate::error::AppError;
use crate::service::staff::{AddStaffRequest, add_staff};
use crate::store::Store;

/// Create a user in the caller's company
#[utoipa::path(
    post,
    path = "/api/staff",
    request_body = AddStaffRequest,
    responses(
        (status = 201, description = "Staff created", body = Object, example = json!({
            "message": "Staff created", "user": {"id": 12, "username": "jdoe", "role": "staff"}
        })),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Office not found"),
        (status = 409, description = "Username already exists"),
        (status = 422, description = "Validation error")
    ),
    security(("bearer_auth" = [])),
    tag = "Staff"
)]
pub async fn create(
    auth: AuthUser,
    body: web::Json<AddStaffRequest>,
    store: web::Data<dyn Store>,
) -> Result<HttpResponse, AppError> {
    let user = add_staff(store.get_ref(), &auth, body.into_inner()).await?;
    Ok(HttpResponse::Created().json(json!({ "message": "Staff created", "user": user })))
}
