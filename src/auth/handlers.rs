use actix_web::{HttpResponse, web};
use chrono::Utc;
use tracing::{debug, error, info, instrument};

use crate::{
    auth::{
        auth::AuthUser,
        jwt::generate_access_token,
        password::verify_password,
    },
    config::Config,
    error::AppError,
    model::revoked_token::RevokedToken,
    models::{LoginReqDto, LoginResponse},
    store::Store,
};

/// Exchange username and password for an access token
#[utoipa::path(
    post,
    path = "/auth/login",
    request_body = LoginReqDto,
    responses(
        (status = 200, description = "Authenticated", body = LoginResponse),
        (status = 401, description = "Invalid credentials"),
        (status = 403, description = "Account disabled"),
        (status = 422, description = "Username or password missing")
    ),
    tag = "Auth"
)]
#[instrument(
    name = "auth_login",
    skip(store, config, user),
    fields(username = %user.username)
)]
pub async fn login(
    user: web::Json<LoginReqDto>,
    store: web::Data<dyn Store>,
    config: web::Data<Config>,
) -> Result<HttpResponse, AppError> {
    info!("Login request received");

    let username = user.username.trim().to_lowercase();
    if username.is_empty() || user.password.is_empty() {
        debug!("Validation failed: empty username or password");
        return Err(AppError::validation("Username or password required"));
    }

    let invalid = || AppError::Unauthenticated("Invalid credentials".into());

    let db_user = match store.find_user_by_username(&username).await? {
        Some(u) => u,
        None => {
            info!("Invalid credentials: user not found");
            return Err(invalid());
        }
    };

    if let Err(e) = verify_password(&user.password, &db_user.password) {
        info!(error = %e, "Invalid credentials: password mismatch");
        return Err(invalid());
    }

    if !db_user.active {
        info!(user_id = db_user.id, "Login refused: account disabled");
        return Err(AppError::Forbidden("Account is disabled".into()));
    }

    let (access_token, _) =
        generate_access_token(&db_user, &config.jwt_secret, config.access_token_ttl).map_err(
            |e| {
                error!(error = %e, "Failed to sign access token");
                AppError::Internal(e.to_string())
            },
        )?;

    info!(user_id = db_user.id, "Login successful");

    Ok(HttpResponse::Ok().json(LoginResponse {
        access_token,
        expires_in: config.access_token_ttl,
    }))
}

/// Revoke the presented access token
#[utoipa::path(
    post,
    path = "/api/logout",
    responses(
        (status = 204, description = "Token revoked"),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "Auth"
)]
pub async fn logout(auth: AuthUser, store: web::Data<dyn Store>) -> Result<HttpResponse, AppError> {
    store
        .revoke_token(RevokedToken {
            jti: auth.jti.clone(),
            user_id: auth.user_id,
            revoked_at: Utc::now(),
            expires_at: auth.expires_at,
        })
        .await?;

    info!(user_id = auth.user_id, jti = %auth.jti, "Token revoked");
    Ok(HttpResponse::NoContent().finish())
}

/// Identity resolved from the bearer token
#[utoipa::path(
    get,
    path = "/api/me",
    responses(
        (status = 200, description = "Current identity", body = AuthUser),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "Auth"
)]
pub async fn me(auth: AuthUser) -> HttpResponse {
    HttpResponse::Ok().json(auth)
}
