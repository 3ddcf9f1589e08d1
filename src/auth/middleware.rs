use actix_web::body::BoxBody;
use actix_web::dev::{ServiceRequest, ServiceResponse};
use actix_web::http::header::{AUTHORIZATION, HeaderMap};
use actix_web::middleware::Next;
use actix_web::web::Data;
use actix_web::{Error, HttpMessage, ResponseError};
use tracing::debug;

use crate::auth::auth::AuthUser;
use crate::auth::jwt::verify_token;
use crate::config::Config;
use crate::error::AppError;
use crate::store::Store;

/// Resolves the identity context for a request's `Authorization` header.
pub async fn authenticate(
    headers: &HeaderMap,
    secret: &str,
    store: &dyn Store,
) -> Result<AuthUser, AppError> {
    let header_value = match headers.get(AUTHORIZATION) {
        Some(h) => h
            .to_str()
            .map_err(|_| AppError::InvalidToken("Invalid Authorization header encoding".into()))?,
        None => return Err(AppError::Unauthenticated("Missing Authorization header".into())),
    };

    let token = match header_value.strip_prefix("Bearer ") {
        Some(t) if !t.trim().is_empty() => t.trim(),
        _ => {
            return Err(AppError::Unauthenticated(
                "Authorization header must carry a Bearer token".into(),
            ));
        }
    };

    let claims = verify_token(token, secret).map_err(|e| {
        debug!(error = %e, "Token verification failed");
        AppError::InvalidToken("Invalid or expired token".into())
    })?;

    if store.is_token_revoked(&claims.jti).await? {
        debug!(user_id = claims.user_id, jti = %claims.jti, "Rejected revoked token");
        return Err(AppError::InvalidToken("Token has been revoked".into()));
    }

    Ok(AuthUser::from(claims))
}

pub async fn auth_middleware(
    req: ServiceRequest,
    next: Next<BoxBody>,
) -> Result<ServiceResponse<BoxBody>, Error> {
    let config = req
        .app_data::<Data<Config>>()
        .cloned()
        .ok_or_else(|| AppError::Internal("App config missing".into()))?;
    let store = req
        .app_data::<Data<dyn Store>>()
        .cloned()
        .ok_or_else(|| AppError::Internal("Store missing".into()))?;

    let resolved = authenticate(req.headers(), &config.jwt_secret, store.get_ref()).await;
    match resolved {
        Ok(auth_user) => {
            req.extensions_mut().insert(auth_user);
            next.call(req).await
        }
        Err(e) => {
            debug!(path = %req.path(), kind = e.kind(), "Request rejected by authentication");
            Ok(req.into_response(e.error_response()))
        }
    }
}
