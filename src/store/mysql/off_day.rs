use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::FromRow;

use super::MySqlStore;
use crate::error::AppResult;
use crate::model::off_day::{NewOffDayPermission, OffDayPermission, OffDayStatus, Verifier};
use crate::store::{OffDayStore, Page};
use crate::utils::db_utils::placeholders;

#[derive(FromRow)]
struct OffDaySql {
    id: u64,
    company_id: u64,
    user_id: u64,
    from_date: NaiveDate,
    to_date: NaiveDate,
    duration: String,
    reason: String,
    description: String,
    accepted: Option<bool>,
    verified_by_user_id: Option<u64>,
    verified_by_username: Option<String>,
    verified_by_email: Option<String>,
    denied_reason: Option<String>,
    created_at: DateTime<Utc>,
}

impl From<OffDaySql> for OffDayPermission {
    fn from(row: OffDaySql) -> Self {
        let verifying_user = match (
            row.verified_by_user_id,
            row.verified_by_username,
            row.verified_by_email,
        ) {
            (Some(user_id), Some(username), Some(email)) => Some(Verifier {
                user_id,
                username,
                email,
            }),
            _ => None,
        };

        OffDayPermission {
            id: row.id,
            company_id: row.company_id,
            user_id: row.user_id,
            from_date: row.from_date,
            to_date: row.to_date,
            duration: row.duration,
            reason: row.reason,
            description: row.description,
            accepted: row.accepted,
            verifying_user,
            denied_reason: row.denied_reason,
            created_at: row.created_at,
        }
    }
}

const OFF_DAY_COLUMNS: &str = "id, company_id, user_id, from_date, to_date, duration, reason, \
     description, accepted, verified_by_user_id, verified_by_username, verified_by_email, \
     denied_reason, created_at";

#[async_trait]
impl OffDayStore for MySqlStore {
    async fn insert_off_day(&self, permission: NewOffDayPermission) -> AppResult<OffDayPermission> {
        let created_at = Utc::now();

        let result = sqlx::query(
            r#"
            INSERT INTO off_day_permissions
                (company_id, user_id, from_date, to_date, duration, reason, description, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(permission.company_id)
        .bind(permission.user_id)
        .bind(permission.from_date)
        .bind(permission.to_date)
        .bind(&permission.duration)
        .bind(&permission.reason)
        .bind(&permission.description)
        .bind(created_at)
        .execute(self.pool())
        .await?;

        Ok(OffDayPermission {
            id: result.last_insert_id(),
            company_id: permission.company_id,
            user_id: permission.user_id,
            from_date: permission.from_date,
            to_date: permission.to_date,
            duration: permission.duration,
            reason: permission.reason,
            description: permission.description,
            accepted: None,
            verifying_user: None,
            denied_reason: None,
            created_at,
        })
    }

    async fn find_off_day(&self, company_id: u64, id: u64) -> AppResult<Option<OffDayPermission>> {
        let row = sqlx::query_as::<_, OffDaySql>(&format!(
            "SELECT {OFF_DAY_COLUMNS} FROM off_day_permissions WHERE company_id = ? AND id = ?"
        ))
        .bind(company_id)
        .bind(id)
        .fetch_optional(self.pool())
        .await?;

        Ok(row.map(OffDayPermission::from))
    }

    async fn list_off_days(
        &self,
        company_id: u64,
        status: Option<OffDayStatus>,
        page: Page,
    ) -> AppResult<Vec<OffDayPermission>> {
        let status_sql = match status {
            None => "",
            Some(OffDayStatus::Pending) => " AND accepted IS NULL",
            Some(OffDayStatus::Approved) => " AND accepted = TRUE",
            Some(OffDayStatus::Denied) => " AND accepted = FALSE",
        };

        let rows = sqlx::query_as::<_, OffDaySql>(&format!(
            r#"
            SELECT {OFF_DAY_COLUMNS}
            FROM off_day_permissions
            WHERE company_id = ?{status_sql}
            ORDER BY created_at DESC
            LIMIT ? OFFSET ?
            "#
        ))
        .bind(company_id)
        .bind(page.size)
        .bind(page.offset())
        .fetch_all(self.pool())
        .await?;

        Ok(rows.into_iter().map(OffDayPermission::from).collect())
    }

    async fn approve_off_days(
        &self,
        company_id: u64,
        ids: &[u64],
        verifier: &Verifier,
        pending_only: bool,
    ) -> AppResult<u64> {
        if ids.is_empty() {
            return Ok(0);
        }

        let sql = format!(
            r#"
            UPDATE off_day_permissions
            SET accepted = TRUE,
                verified_by_user_id = ?,
                verified_by_username = ?,
                verified_by_email = ?,
                denied_reason = NULL
            WHERE company_id = ? AND id IN ({}){}
            "#,
            placeholders(ids.len()),
            if pending_only { " AND accepted IS NULL" } else { "" }
        );

        let mut q = sqlx::query(&sql)
            .bind(verifier.user_id)
            .bind(&verifier.username)
            .bind(&verifier.email)
            .bind(company_id);
        for id in ids {
            q = q.bind(*id);
        }

        Ok(q.execute(self.pool()).await?.rows_affected())
    }

    async fn deny_off_day(
        &self,
        company_id: u64,
        id: u64,
        verifier: &Verifier,
        reason: &str,
        pending_only: bool,
    ) -> AppResult<u64> {
        let sql = format!(
            r#"
            UPDATE off_day_permissions
            SET accepted = FALSE,
                verified_by_user_id = ?,
                verified_by_username = ?,
                verified_by_email = ?,
                denied_reason = ?
            WHERE company_id = ? AND id = ?{}
            "#,
            if pending_only { " AND accepted IS NULL" } else { "" }
        );

        let result = sqlx::query(&sql)
            .bind(verifier.user_id)
            .bind(&verifier.username)
            .bind(&verifier.email)
            .bind(reason)
            .bind(company_id)
            .bind(id)
            .execute(self.pool())
            .await?;

        Ok(result.rows_affected())
    }
}
