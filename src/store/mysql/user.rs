use std::str::FromStr;

use async_trait::async_trait;
use sqlx::FromRow;

use super::{MySqlStore, conflict_or_db};
use crate::error::{AppError, AppResult};
use crate::model::{
    role::Role,
    user::{AssignedShift, NewUser, User},
};
use crate::store::UserStore;
use crate::utils::db_utils::placeholders;

#[derive(FromRow)]
struct UserSql {
    id: u64,
    company_id: u64,
    username: String,
    email: String,
    password: String,
    role: String,
    office_id: Option<u64>,
    department_id: Option<u64>,
    active: bool,
}

impl UserSql {
    fn into_user(self, assigned_shifts: Vec<AssignedShift>) -> AppResult<User> {
        let role = Role::from_str(&self.role)
            .map_err(|_| AppError::Internal(format!("user {} has unknown role {}", self.id, self.role)))?;

        Ok(User {
            id: self.id,
            company_id: self.company_id,
            username: self.username,
            email: self.email,
            password: self.password,
            role,
            office_id: self.office_id,
            department_id: self.department_id,
            assigned_shifts,
            active: self.active,
        })
    }
}

const USER_COLUMNS: &str =
    "id, company_id, username, email, password, role, office_id, department_id, active";

impl MySqlStore {
    async fn assigned_shifts(&self, user_id: u64) -> AppResult<Vec<AssignedShift>> {
        let rows = sqlx::query_as::<_, AssignedShift>(
            r#"
            SELECT day_of_week, shift_id
            FROM user_shifts
            WHERE user_id = ?
            ORDER BY day_of_week, shift_id
            "#,
        )
        .bind(user_id)
        .fetch_all(self.pool())
        .await?;

        Ok(rows)
    }

    async fn hydrate_user(&self, row: Option<UserSql>) -> AppResult<Option<User>> {
        match row {
            Some(row) => {
                let shifts = self.assigned_shifts(row.id).await?;
                Ok(Some(row.into_user(shifts)?))
            }
            None => Ok(None),
        }
    }
}

#[async_trait]
impl UserStore for MySqlStore {
    async fn find_user(&self, user_id: u64) -> AppResult<Option<User>> {
        let row = sqlx::query_as::<_, UserSql>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = ?"
        ))
        .bind(user_id)
        .fetch_optional(self.pool())
        .await?;

        self.hydrate_user(row).await
    }

    async fn find_user_by_username(&self, username: &str) -> AppResult<Option<User>> {
        let row = sqlx::query_as::<_, UserSql>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE username = ?"
        ))
        .bind(username)
        .fetch_optional(self.pool())
        .await?;

        self.hydrate_user(row).await
    }

    async fn insert_user(&self, user: NewUser) -> AppResult<User> {
        let result = sqlx::query(
            r#"
            INSERT INTO users
                (company_id, username, email, password, role, office_id, department_id, active)
            VALUES (?, ?, ?, ?, ?, ?, ?, TRUE)
            "#,
        )
        .bind(user.company_id)
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.role.as_str())
        .bind(user.office_id)
        .bind(user.department_id)
        .execute(self.pool())
        .await
        .map_err(|e| conflict_or_db(e, "Username already exists"))?;

        Ok(User {
            id: result.last_insert_id(),
            company_id: user.company_id,
            username: user.username,
            email: user.email,
            password: user.password_hash,
            role: user.role,
            office_id: user.office_id,
            department_id: user.department_id,
            assigned_shifts: Vec::new(),
            active: true,
        })
    }

    async fn assign_shifts(
        &self,
        company_id: u64,
        office_id: u64,
        user_ids: &[u64],
        shifts: &[AssignedShift],
    ) -> AppResult<u64> {
        if user_ids.is_empty() {
            return Ok(0);
        }

        let mut tx = self.pool().begin().await?;

        let sql = format!(
            "SELECT id FROM users WHERE company_id = ? AND office_id = ? AND id IN ({}) FOR UPDATE",
            placeholders(user_ids.len())
        );
        let mut q = sqlx::query_scalar::<_, u64>(&sql).bind(company_id).bind(office_id);
        for id in user_ids {
            q = q.bind(*id);
        }
        let members = q.fetch_all(&mut *tx).await?;

        for user_id in &members {
            sqlx::query("DELETE FROM user_shifts WHERE user_id = ?")
                .bind(*user_id)
                .execute(&mut *tx)
                .await?;

            for shift in shifts {
                sqlx::query(
                    "INSERT INTO user_shifts (user_id, day_of_week, shift_id) VALUES (?, ?, ?)",
                )
                .bind(*user_id)
                .bind(shift.day_of_week)
                .bind(shift.shift_id)
                .execute(&mut *tx)
                .await?;
            }
        }

        tx.commit().await?;

        Ok(members.len() as u64)
    }
}
