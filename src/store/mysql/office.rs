use std::collections::HashMap;

use async_trait::async_trait;
use chrono::NaiveTime;
use sqlx::FromRow;

use super::MySqlStore;
use crate::error::{AppError, AppResult};
use crate::model::office::{NewOffice, NewShift, Office, OfficePatch, Shift};
use crate::store::OfficeStore;
use crate::utils::db_utils::{SqlUpdate, SqlValue, placeholders};
use crate::utils::geo::GeoPoint;

#[derive(FromRow)]
struct OfficeSql {
    id: u64,
    company_id: u64,
    name: String,
    address: Option<String>,
    city: Option<String>,
    shift_window_start: Option<NaiveTime>,
    shift_window_end: Option<NaiveTime>,
    longitude: f64,
    latitude: f64,
    time_zone_name: Option<String>,
}

impl OfficeSql {
    fn into_office(self, shifts: Vec<Shift>) -> Office {
        Office {
            id: self.id,
            company_id: self.company_id,
            name: self.name,
            address: self.address,
            city: self.city,
            shift_window_start: self.shift_window_start,
            shift_window_end: self.shift_window_end,
            location: GeoPoint {
                longitude: self.longitude,
                latitude: self.latitude,
            },
            time_zone_name: self.time_zone_name,
            shifts,
        }
    }
}

const OFFICE_COLUMNS: &str = "id, company_id, name, address, city, shift_window_start, \
     shift_window_end, longitude, latitude, time_zone_name";

impl MySqlStore {
    /// Loads shifts for all given offices in one round trip.
    async fn shifts_by_office(&self, office_ids: &[u64]) -> AppResult<HashMap<u64, Vec<Shift>>> {
        let mut grouped: HashMap<u64, Vec<Shift>> = HashMap::new();
        if office_ids.is_empty() {
            return Ok(grouped);
        }

        let sql = format!(
            "SELECT id, office_id, name, start_time, end_time FROM office_shifts \
             WHERE office_id IN ({}) ORDER BY id",
            placeholders(office_ids.len())
        );
        let mut q = sqlx::query_as::<_, Shift>(&sql);
        for id in office_ids {
            q = q.bind(*id);
        }

        for shift in q.fetch_all(self.pool()).await? {
            grouped.entry(shift.office_id).or_default().push(shift);
        }

        Ok(grouped)
    }

    async fn hydrate_offices(&self, rows: Vec<OfficeSql>) -> AppResult<Vec<Office>> {
        let ids: Vec<u64> = rows.iter().map(|r| r.id).collect();
        let mut shifts = self.shifts_by_office(&ids).await?;

        Ok(rows
            .into_iter()
            .map(|row| {
                let office_shifts = shifts.remove(&row.id).unwrap_or_default();
                row.into_office(office_shifts)
            })
            .collect())
    }
}

#[async_trait]
impl OfficeStore for MySqlStore {
    async fn insert_office(&self, office: NewOffice) -> AppResult<Office> {
        let mut tx = self.pool().begin().await?;

        let result = sqlx::query(
            r#"
            INSERT INTO offices
                (company_id, name, address, city, shift_window_start, shift_window_end,
                 longitude, latitude, time_zone_name)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(office.company_id)
        .bind(&office.name)
        .bind(&office.address)
        .bind(&office.city)
        .bind(office.shift_window_start)
        .bind(office.shift_window_end)
        .bind(office.location.longitude)
        .bind(office.location.latitude)
        .bind(&office.time_zone_name)
        .execute(&mut *tx)
        .await?;

        let office_id = result.last_insert_id();
        let mut shifts = Vec::with_capacity(office.shifts.len());

        for shift in office.shifts {
            let inserted = sqlx::query(
                "INSERT INTO office_shifts (office_id, name, start_time, end_time) VALUES (?, ?, ?, ?)",
            )
            .bind(office_id)
            .bind(&shift.name)
            .bind(shift.start_time)
            .bind(shift.end_time)
            .execute(&mut *tx)
            .await?;

            shifts.push(Shift {
                id: inserted.last_insert_id(),
                office_id,
                name: shift.name,
                start_time: shift.start_time,
                end_time: shift.end_time,
            });
        }

        tx.commit().await?;

        Ok(Office {
            id: office_id,
            company_id: office.company_id,
            name: office.name,
            address: office.address,
            city: office.city,
            shift_window_start: office.shift_window_start,
            shift_window_end: office.shift_window_end,
            location: office.location,
            time_zone_name: office.time_zone_name,
            shifts,
        })
    }

    async fn find_office(&self, office_id: u64) -> AppResult<Option<Office>> {
        let row = sqlx::query_as::<_, OfficeSql>(&format!(
            "SELECT {OFFICE_COLUMNS} FROM offices WHERE id = ?"
        ))
        .bind(office_id)
        .fetch_optional(self.pool())
        .await?;

        match row {
            Some(row) => Ok(self.hydrate_offices(vec![row]).await?.pop()),
            None => Ok(None),
        }
    }

    async fn list_offices(&self, company_id: u64) -> AppResult<Vec<Office>> {
        let rows = sqlx::query_as::<_, OfficeSql>(&format!(
            "SELECT {OFFICE_COLUMNS} FROM offices WHERE company_id = ? ORDER BY id"
        ))
        .bind(company_id)
        .fetch_all(self.pool())
        .await?;

        self.hydrate_offices(rows).await
    }

    async fn update_office(&self, office_id: u64, patch: OfficePatch) -> AppResult<()> {
        let mut update = SqlUpdate::new("offices");
        update
            .set_opt("name", patch.name)
            .set_opt("address", patch.address)
            .set_opt("city", patch.city)
            .set_opt("shift_window_start", patch.shift_window_start)
            .set_opt("shift_window_end", patch.shift_window_end)
            .set_opt("time_zone_name", patch.time_zone_name);
        if let Some(location) = patch.location {
            update
                .set("longitude", SqlValue::F64(location.longitude))
                .set("latitude", SqlValue::F64(location.latitude));
        }

        if update.is_empty() {
            return Err(AppError::validation("No fields provided for update"));
        }

        update.execute(self.pool(), "id", office_id).await?;
        Ok(())
    }

    async fn insert_shift(&self, office_id: u64, shift: NewShift) -> AppResult<Shift> {
        let result = sqlx::query(
            "INSERT INTO office_shifts (office_id, name, start_time, end_time) VALUES (?, ?, ?, ?)",
        )
        .bind(office_id)
        .bind(&shift.name)
        .bind(shift.start_time)
        .bind(shift.end_time)
        .execute(self.pool())
        .await?;

        Ok(Shift {
            id: result.last_insert_id(),
            office_id,
            name: shift.name,
            start_time: shift.start_time,
            end_time: shift.end_time,
        })
    }

    async fn find_offices_near(
        &self,
        company_id: u64,
        point: GeoPoint,
        max_distance_m: f64,
    ) -> AppResult<Vec<Office>> {
        let rows = sqlx::query_as::<_, OfficeSql>(&format!(
            r#"
            SELECT {OFFICE_COLUMNS}
            FROM offices
            WHERE company_id = ?
              AND ST_Distance_Sphere(POINT(longitude, latitude), POINT(?, ?)) <= ?
            ORDER BY ST_Distance_Sphere(POINT(longitude, latitude), POINT(?, ?))
            "#
        ))
        .bind(company_id)
        .bind(point.longitude)
        .bind(point.latitude)
        .bind(max_distance_m)
        .bind(point.longitude)
        .bind(point.latitude)
        .fetch_all(self.pool())
        .await?;

        self.hydrate_offices(rows).await
    }
}
