use actix_web::{FromRequest, HttpMessage, HttpRequest, dev::Payload};
use chrono::{DateTime, Utc};
use futures::future::{Ready, ready};
use serde::Serialize;
use utoipa::ToSchema;

use crate::auth::policy::{Operation, authorize};
use crate::error::AppError;
use crate::model::off_day::Verifier;
use crate::model::role::Role;
use crate::models::Claims;

/// Identity context resolved from a verified, unrevoked bearer token.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AuthUser {
    pub company_id: u64,
    pub user_id: u64,
    pub role: Role,
    pub username: String,
    pub email: String,
    #[serde(skip)]
    pub jti: String,
    #[schema(value_type = String, format = "date-time")]
    pub expires_at: DateTime<Utc>,
}

impl From<Claims> for AuthUser {
    fn from(claims: Claims) -> Self {
        Self {
            company_id: claims.company_id,
            user_id: claims.user_id,
            role: claims.role,
            username: claims.sub,
            email: claims.email,
            expires_at: DateTime::<Utc>::from_timestamp(claims.exp as i64, 0).unwrap_or_default(),
            jti: claims.jti,
        }
    }
}

impl FromRequest for AuthUser {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        // populated by auth_middleware
        ready(
            req.extensions()
                .get::<AuthUser>()
                .cloned()
                .ok_or_else(|| AppError::Unauthenticated("Missing token".into())),
        )
    }
}

impl AuthUser {
    pub fn require(&self, op: Operation) -> Result<(), AppError> {
        authorize(self.role, op)
    }

    pub fn verifier(&self) -> Verifier {
        Verifier {
            user_id: self.user_id,
            username: self.username.clone(),
            email: self.email.clone(),
        }
    }
}
