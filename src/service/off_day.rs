//! Off-day permission requests and their one-way decision.
//!
//! `Pending -> Approved | Denied`. A second decision is refused unless an
//! administrator explicitly overrides it.

use chrono::NaiveDate;
use serde::Deserialize;
use tracing::info;
use utoipa::ToSchema;

use crate::auth::auth::AuthUser;
use crate::auth::policy::Operation;
use crate::error::{AppError, AppResult};
use crate::model::off_day::{NewOffDayPermission, OffDayPermission, OffDayStatus};
use crate::service::approval::distinct_ids;
use crate::store::{Page, Store};

pub const DATE_FORMAT: &str = "%d-%m-%Y";

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OffDayRequest {
    #[schema(example = "01-04-2026")]
    pub from_date: String,
    #[schema(example = "02-04-2026")]
    pub to_date: String,
    #[schema(example = "2 days")]
    pub duration: String,
    #[schema(example = "family")]
    pub reason: String,
    #[schema(example = "Sister's wedding")]
    pub description: String,
}

fn parse_date(field: &str, value: &str) -> AppResult<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT)
        .map_err(|_| AppError::validation(format!("{field} must be a DD-MM-YYYY date")))
}

fn required(field: &str, value: &str) -> AppResult<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(AppError::validation(format!("{field} is required")));
    }
    Ok(value.to_string())
}

pub async fn request_off_day(
    store: &dyn Store,
    auth: &AuthUser,
    req: OffDayRequest,
) -> AppResult<OffDayPermission> {
    auth.require(Operation::RequestOffDay)?;

    let from_date = parse_date("fromDate", &req.from_date)?;
    let to_date = parse_date("toDate", &req.to_date)?;
    if from_date > to_date {
        return Err(AppError::validation("fromDate must not be after toDate"));
    }

    let created = store
        .insert_off_day(NewOffDayPermission {
            company_id: auth.company_id,
            user_id: auth.user_id,
            from_date,
            to_date,
            duration: required("duration", &req.duration)?,
            reason: required("reason", &req.reason)?,
            description: required("description", &req.description)?,
        })
        .await?;

    info!(id = created.id, user_id = auth.user_id, "Off-day permission requested");
    Ok(created)
}

/// The owner can always read their own request.
pub async fn get_off_day(
    store: &dyn Store,
    auth: &AuthUser,
    id: u64,
) -> AppResult<OffDayPermission> {
    let permission = store
        .find_off_day(auth.company_id, id)
        .await?
        .ok_or_else(|| AppError::not_found("Off-day permission not found"))?;

    if permission.user_id != auth.user_id {
        auth.require(Operation::ViewOffDays)?;
    }
    Ok(permission)
}

pub async fn list_off_days(
    store: &dyn Store,
    auth: &AuthUser,
    status: Option<OffDayStatus>,
    page: Page,
) -> AppResult<Vec<OffDayPermission>> {
    auth.require(Operation::ViewOffDays)?;
    store.list_off_days(auth.company_id, status, page).await
}

fn require_decision(auth: &AuthUser, override_decision: bool) -> AppResult<()> {
    auth.require(Operation::DecideOffDay)?;
    if override_decision {
        auth.require(Operation::OverrideOffDayDecision)?;
    }
    Ok(())
}

/// Approves pending permissions; returns how many were decided.
pub async fn approve_off_days(
    store: &dyn Store,
    auth: &AuthUser,
    ids: &[u64],
    override_decision: bool,
) -> AppResult<u64> {
    require_decision(auth, override_decision)?;
    let ids = distinct_ids(ids)?;

    let approved = store
        .approve_off_days(auth.company_id, &ids, &auth.verifier(), !override_decision)
        .await?;

    info!(
        by = auth.user_id,
        requested = ids.len(),
        approved,
        override_decision,
        "Off-day permissions approved"
    );
    Ok(approved)
}

pub async fn deny_off_day(
    store: &dyn Store,
    auth: &AuthUser,
    id: u64,
    reason: &str,
    override_decision: bool,
) -> AppResult<OffDayPermission> {
    require_decision(auth, override_decision)?;
    let reason = required("reason", reason)?;

    store
        .find_off_day(auth.company_id, id)
        .await?
        .ok_or_else(|| AppError::not_found("Off-day permission not found"))?;

    let denied = store
        .deny_off_day(auth.company_id, id, &auth.verifier(), &reason, !override_decision)
        .await?;
    if denied == 0 {
        return Err(AppError::conflict("Off-day permission was already decided"));
    }

    info!(id, by = auth.user_id, override_decision, "Off-day permission denied");

    store
        .find_off_day(auth.company_id, id)
        .await?
        .ok_or_else(|| AppError::not_found("Off-day permission not found"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::role::Role;
    use crate::store::memory::MemoryStore;
    use crate::testing::{auth_for, user};

    fn request() -> OffDayRequest {
        OffDayRequest {
            from_date: "01-04-2026".into(),
            to_date: "02-04-2026".into(),
            duration: "2 days".into(),
            reason: "family".into(),
            description: "wedding".into(),
        }
    }

    async fn pending(store: &MemoryStore) -> (AuthUser, OffDayPermission) {
        let staff = auth_for(&user(10, 1, Role::Staff));
        let created = request_off_day(store, &staff, request()).await.unwrap();
        (staff, created)
    }

    #[actix_web::test]
    async fn request_starts_pending() {
        let store = MemoryStore::new();
        let (staff, created) = pending(&store).await;

        assert_eq!(created.status(), OffDayStatus::Pending);
        assert_eq!(created.user_id, staff.user_id);
        assert_eq!(created.from_date, NaiveDate::from_ymd_opt(2026, 4, 1).unwrap());
        assert!(created.verifying_user.is_none());
    }

    #[actix_web::test]
    async fn malformed_requests_are_rejected() {
        let store = MemoryStore::new();
        let staff = auth_for(&user(10, 1, Role::Staff));

        let mut iso = request();
        iso.from_date = "2026-04-01".into();
        let mut reversed = request();
        reversed.from_date = "05-04-2026".into();
        let mut blank = request();
        blank.reason = "  ".into();

        for bad in [iso, reversed, blank] {
            let err = request_off_day(&store, &staff, bad).await.unwrap_err();
            assert!(matches!(err, AppError::Validation(_)));
        }
    }

    #[actix_web::test]
    async fn approve_records_verifier_and_is_terminal() {
        let store = MemoryStore::new();
        let (_, created) = pending(&store).await;
        let hr = auth_for(&user(2, 1, Role::Hr));

        assert_eq!(approve_off_days(&store, &hr, &[created.id], false).await.unwrap(), 1);
        let decided = get_off_day(&store, &hr, created.id).await.unwrap();
        assert_eq!(decided.status(), OffDayStatus::Approved);
        assert_eq!(decided.verifying_user.unwrap().user_id, 2);

        // already decided: nothing left to approve, and denial conflicts
        assert_eq!(approve_off_days(&store, &hr, &[created.id], false).await.unwrap(), 0);
        let err = deny_off_day(&store, &hr, created.id, "no cover", false)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[actix_web::test]
    async fn deny_requires_reason_and_sets_it() {
        let store = MemoryStore::new();
        let (_, created) = pending(&store).await;
        let hr = auth_for(&user(2, 1, Role::Hr));

        let err = deny_off_day(&store, &hr, created.id, " ", false).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));

        let denied = deny_off_day(&store, &hr, created.id, "no cover", false).await.unwrap();
        assert_eq!(denied.status(), OffDayStatus::Denied);
        assert_eq!(denied.denied_reason.as_deref(), Some("no cover"));
    }

    #[actix_web::test]
    async fn administrator_override_rewrites_a_decision() {
        let store = MemoryStore::new();
        let (_, created) = pending(&store).await;
        let hr = auth_for(&user(2, 1, Role::Hr));
        let admin = auth_for(&user(1, 1, Role::Administrator));

        deny_off_day(&store, &hr, created.id, "no cover", false).await.unwrap();

        let err = approve_off_days(&store, &hr, &[created.id], true).await.unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));

        assert_eq!(approve_off_days(&store, &admin, &[created.id], true).await.unwrap(), 1);
        let flipped = get_off_day(&store, &admin, created.id).await.unwrap();
        assert_eq!(flipped.status(), OffDayStatus::Approved);
        assert_eq!(flipped.denied_reason, None);
    }

    #[actix_web::test]
    async fn staff_cannot_decide() {
        let store = MemoryStore::new();
        let (staff, created) = pending(&store).await;

        let err = approve_off_days(&store, &staff, &[created.id], false).await.unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));
        assert_eq!(
            get_off_day(&store, &staff, created.id).await.unwrap().status(),
            OffDayStatus::Pending
        );
    }

    #[actix_web::test]
    async fn reads_are_scoped_by_owner_role_and_company() {
        let store = MemoryStore::new();
        let (_, created) = pending(&store).await;
        let peer = auth_for(&user(11, 1, Role::Staff));
        let leader = auth_for(&user(12, 1, Role::Leader));
        let outsider = auth_for(&user(13, 2, Role::Hr));

        assert!(matches!(
            get_off_day(&store, &peer, created.id).await,
            Err(AppError::Forbidden(_))
        ));
        assert!(get_off_day(&store, &leader, created.id).await.is_ok());
        assert!(matches!(
            get_off_day(&store, &outsider, created.id).await,
            Err(AppError::NotFound(_))
        ));

        let listed = list_off_days(&store, &leader, Some(OffDayStatus::Pending), Page::new(None))
            .await
            .unwrap();
        assert_eq!(listed.len(), 1);
        let none = list_off_days(&store, &leader, Some(OffDayStatus::Denied), Page::new(None))
            .await
            .unwrap();
        assert!(none.is_empty());
    }
}
