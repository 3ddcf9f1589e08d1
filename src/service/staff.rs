use serde::Deserialize;
use tracing::info;
use utoipa::ToSchema;

use crate::auth::auth::AuthUser;
use crate::auth::password::hash_password;
use crate::auth::policy::Operation;
use crate::error::{AppError, AppResult};
use crate::model::role::Role;
use crate::model::user::{NewUser, User};
use crate::store::Store;

pub const MIN_PASSWORD_LEN: usize = 6;

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AddStaffRequest {
    #[schema(example = "jdoe")]
    pub username: String,
    #[schema(example = "jdoe@example.com")]
    pub email: String,
    #[schema(example = "secret1")]
    pub password: String,
    pub role: Role,
    pub office_id: Option<u64>,
    pub department_id: Option<u64>,
}

pub async fn add_staff(store: &dyn Store, auth: &AuthUser, req: AddStaffRequest) -> AppResult<User> {
    auth.require(Operation::AddStaff)?;

    if req.role == Role::Administrator && auth.role != Role::Administrator {
        return Err(AppError::Forbidden(
            "Only an administrator may create an administrator".into(),
        ));
    }

    let username = req.username.trim().to_lowercase();
    if username.is_empty() {
        return Err(AppError::validation("username is required"));
    }
    let email = req.email.trim().to_string();
    if !email.contains('@') {
        return Err(AppError::validation("email is not valid"));
    }
    if req.password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AppError::validation(format!(
            "password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }

    if let Some(office_id) = req.office_id {
        store
            .find_office(office_id)
            .await?
            .filter(|o| o.company_id == auth.company_id)
            .ok_or_else(|| AppError::not_found("Office not found"))?;
    }

    let password_hash =
        hash_password(&req.password).map_err(|e| AppError::Internal(e.to_string()))?;

    let user = store
        .insert_user(NewUser {
            company_id: auth.company_id,
            username,
            email,
            password_hash,
            role: req.role,
            office_id: req.office_id,
            department_id: req.department_id,
        })
        .await?;

    info!(user_id = user.id, role = %user.role, by = auth.user_id, "Staff added");
    Ok(user)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::password::verify_password;
    use crate::testing::{auth_for, seed_hanoi, user};

    fn request(role: Role) -> AddStaffRequest {
        AddStaffRequest {
            username: " NewHire ".into(),
            email: "new@example.com".into(),
            password: "secret1".into(),
            role,
            office_id: None,
            department_id: None,
        }
    }

    #[actix_web::test]
    async fn hr_adds_staff_in_own_company() {
        let store = crate::store::memory::MemoryStore::new();
        let fx = seed_hanoi(&store, None).await;
        let hr = auth_for(&user(2, fx.office.company_id, Role::Hr));

        let mut req = request(Role::Staff);
        req.office_id = Some(fx.office.id);
        let created = add_staff(&store, &hr, req).await.unwrap();

        assert_eq!(created.username, "newhire");
        assert_eq!(created.company_id, fx.office.company_id);
        assert_eq!(created.office_id, Some(fx.office.id));
        assert!(verify_password("secret1", &created.password).is_ok());
    }

    #[actix_web::test]
    async fn duplicate_username_conflicts() {
        let store = crate::store::memory::MemoryStore::new();
        let admin = auth_for(&user(1, 1, Role::Administrator));

        add_staff(&store, &admin, request(Role::Staff)).await.unwrap();
        let err = add_staff(&store, &admin, request(Role::Leader)).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[actix_web::test]
    async fn hr_cannot_create_administrators_and_staff_cannot_add() {
        let store = crate::store::memory::MemoryStore::new();
        let hr = auth_for(&user(2, 1, Role::Hr));
        let staff = auth_for(&user(3, 1, Role::Staff));

        assert!(matches!(
            add_staff(&store, &hr, request(Role::Administrator)).await,
            Err(AppError::Forbidden(_))
        ));
        assert!(matches!(
            add_staff(&store, &staff, request(Role::Staff)).await,
            Err(AppError::Forbidden(_))
        ));
    }

    #[actix_web::test]
    async fn short_password_and_foreign_office_are_rejected() {
        let store = crate::store::memory::MemoryStore::new();
        let fx = seed_hanoi(&store, None).await;
        let admin = auth_for(&user(1, fx.office.company_id + 1, Role::Administrator));

        let mut short = request(Role::Staff);
        short.password = "12345".into();
        assert!(matches!(
            add_staff(&store, &admin, short).await,
            Err(AppError::Validation(_))
        ));

        let mut foreign = request(Role::Staff);
        foreign.office_id = Some(fx.office.id);
        assert!(matches!(
            add_staff(&store, &admin, foreign).await,
            Err(AppError::NotFound(_))
        ));
    }
}
