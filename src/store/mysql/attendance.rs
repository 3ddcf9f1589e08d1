use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use sqlx::FromRow;

use super::{MySqlStore, conflict_or_db};
use crate::error::{AppError, AppResult};
use crate::model::attendance::{AttendanceRecord, CloseAttendance, NewAttendanceRecord, PunchEvent};
use crate::store::{AttendanceStore, Page};
use crate::utils::db_utils::placeholders;
use crate::utils::geo::GeoPoint;

#[derive(FromRow)]
struct AttendanceSql {
    id: u64,
    company_id: u64,
    office_id: u64,
    office_name: String,
    user_id: u64,
    username: String,
    shift_id: u64,
    shift_name: String,
    time_zone_name: Option<String>,
    check_in_at: DateTime<Utc>,
    check_in_local: NaiveDateTime,
    check_in_longitude: f64,
    check_in_latitude: f64,
    check_out_at: Option<DateTime<Utc>>,
    check_out_local: Option<NaiveDateTime>,
    check_out_longitude: Option<f64>,
    check_out_latitude: Option<f64>,
    worked_minutes: Option<i64>,
    late_minutes: i64,
    approved: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<AttendanceSql> for AttendanceRecord {
    fn from(row: AttendanceSql) -> Self {
        let check_out = match (
            row.check_out_at,
            row.check_out_local,
            row.check_out_longitude,
            row.check_out_latitude,
        ) {
            (Some(timestamp), Some(local_time), Some(longitude), Some(latitude)) => Some(PunchEvent {
                timestamp,
                local_time,
                location: GeoPoint {
                    longitude,
                    latitude,
                },
            }),
            _ => None,
        };

        AttendanceRecord {
            id: row.id,
            company_id: row.company_id,
            office_id: row.office_id,
            office_name: row.office_name,
            user_id: row.user_id,
            username: row.username,
            check_in: PunchEvent {
                timestamp: row.check_in_at,
                local_time: row.check_in_local,
                location: GeoPoint {
                    longitude: row.check_in_longitude,
                    latitude: row.check_in_latitude,
                },
            },
            check_out,
            worked_minutes: row.worked_minutes,
            late_minutes: row.late_minutes,
            approved: row.approved,
            shift_id: row.shift_id,
            shift_name: row.shift_name,
            time_zone_name: row.time_zone_name,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

const RECORD_COLUMNS: &str = "id, company_id, office_id, office_name, user_id, username, \
     shift_id, shift_name, time_zone_name, check_in_at, check_in_local, check_in_longitude, \
     check_in_latitude, check_out_at, check_out_local, check_out_longitude, check_out_latitude, \
     worked_minutes, late_minutes, approved, created_at, updated_at";

#[async_trait]
impl AttendanceStore for MySqlStore {
    async fn find_open_record(&self, user_id: u64) -> AppResult<Option<AttendanceRecord>> {
        let row = sqlx::query_as::<_, AttendanceSql>(&format!(
            r#"
            SELECT {RECORD_COLUMNS}
            FROM attendance_records
            WHERE user_id = ? AND check_out_at IS NULL
            ORDER BY check_in_at DESC
            LIMIT 1
            "#
        ))
        .bind(user_id)
        .fetch_optional(self.pool())
        .await?;

        Ok(row.map(AttendanceRecord::from))
    }

    async fn insert_record(&self, record: NewAttendanceRecord) -> AppResult<AttendanceRecord> {
        let now = record.check_in.timestamp;

        let result = sqlx::query(
            r#"
            INSERT INTO attendance_records
                (company_id, office_id, office_name, user_id, username, shift_id, shift_name,
                 time_zone_name, check_in_at, check_in_local, check_in_longitude,
                 check_in_latitude, late_minutes, approved, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, FALSE, ?, ?)
            "#,
        )
        .bind(record.company_id)
        .bind(record.office_id)
        .bind(&record.office_name)
        .bind(record.user_id)
        .bind(&record.username)
        .bind(record.shift_id)
        .bind(&record.shift_name)
        .bind(&record.time_zone_name)
        .bind(record.check_in.timestamp)
        .bind(record.check_in.local_time)
        .bind(record.check_in.location.longitude)
        .bind(record.check_in.location.latitude)
        .bind(record.late_minutes)
        .bind(now)
        .bind(now)
        .execute(self.pool())
        .await
        .map_err(|e| conflict_or_db(e, "An open check-in already exists for this user"))?;

        Ok(AttendanceRecord {
            id: result.last_insert_id(),
            company_id: record.company_id,
            office_id: record.office_id,
            office_name: record.office_name,
            user_id: record.user_id,
            username: record.username,
            check_in: record.check_in,
            check_out: None,
            worked_minutes: None,
            late_minutes: record.late_minutes,
            approved: false,
            shift_id: record.shift_id,
            shift_name: record.shift_name,
            time_zone_name: record.time_zone_name,
            created_at: now,
            updated_at: now,
        })
    }

    async fn close_record(
        &self,
        record_id: u64,
        close: CloseAttendance,
    ) -> AppResult<AttendanceRecord> {
        let result = sqlx::query(
            r#"
            UPDATE attendance_records
            SET check_out_at = ?,
                check_out_local = ?,
                check_out_longitude = ?,
                check_out_latitude = ?,
                worked_minutes = ?,
                updated_at = ?
            WHERE id = ?
              AND check_out_at IS NULL
            "#,
        )
        .bind(close.check_out.timestamp)
        .bind(close.check_out.local_time)
        .bind(close.check_out.location.longitude)
        .bind(close.check_out.location.latitude)
        .bind(close.worked_minutes)
        .bind(close.updated_at)
        .bind(record_id)
        .execute(self.pool())
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::conflict("Check-in was already closed"));
        }

        self.find_record(record_id)
            .await?
            .ok_or_else(|| AppError::not_found("Check-in not found"))
    }

    async fn find_record(&self, record_id: u64) -> AppResult<Option<AttendanceRecord>> {
        let row = sqlx::query_as::<_, AttendanceSql>(&format!(
            "SELECT {RECORD_COLUMNS} FROM attendance_records WHERE id = ?"
        ))
        .bind(record_id)
        .fetch_optional(self.pool())
        .await?;

        Ok(row.map(AttendanceRecord::from))
    }

    async fn list_user_records(
        &self,
        company_id: u64,
        user_id: u64,
        page: Page,
    ) -> AppResult<Vec<AttendanceRecord>> {
        let rows = sqlx::query_as::<_, AttendanceSql>(&format!(
            r#"
            SELECT {RECORD_COLUMNS}
            FROM attendance_records
            WHERE company_id = ? AND user_id = ?
            ORDER BY check_in_at DESC
            LIMIT ? OFFSET ?
            "#
        ))
        .bind(company_id)
        .bind(user_id)
        .bind(page.size)
        .bind(page.offset())
        .fetch_all(self.pool())
        .await?;

        Ok(rows.into_iter().map(AttendanceRecord::from).collect())
    }

    async fn set_records_approved(
        &self,
        company_id: u64,
        ids: &[u64],
        approved: bool,
    ) -> AppResult<u64> {
        if ids.is_empty() {
            return Ok(0);
        }

        let sql = format!(
            "UPDATE attendance_records SET approved = ? WHERE company_id = ? AND id IN ({})",
            placeholders(ids.len())
        );
        let mut q = sqlx::query(&sql).bind(approved).bind(company_id);
        for id in ids {
            q = q.bind(*id);
        }

        // the driver negotiates CLIENT_FOUND_ROWS, so this is the matched count
        let result = q.execute(self.pool()).await?;
        Ok(result.rows_affected())
    }
}
