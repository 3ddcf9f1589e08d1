//! sqlx/MySQL implementation of the store traits.

mod attendance;
mod off_day;
mod office;
mod revocation;
mod user;

use sqlx::MySqlPool;

use crate::error::AppError;

/// MySQL error code for duplicate-key/constraint violations.
const INTEGRITY_VIOLATION: &str = "23000";

#[derive(Clone)]
pub struct MySqlStore {
    pool: MySqlPool,
}

impl MySqlStore {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &MySqlPool {
        &self.pool
    }
}

/// Maps a duplicate-key failure to `Conflict`, everything else to `Database`.
fn conflict_or_db(e: sqlx::Error, conflict_message: &str) -> AppError {
    if let sqlx::Error::Database(db_err) = &e {
        if db_err.code().as_deref() == Some(INTEGRITY_VIOLATION) {
            return AppError::conflict(conflict_message);
        }
    }
    AppError::Database(e)
}
