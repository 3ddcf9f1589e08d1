use chrono::NaiveTime;
use sqlx::MySqlPool;

/// ===============================
/// SQL bindable value enum
/// ===============================
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    String(String),
    F64(f64),
    Time(NaiveTime),
}

/// ===============================
/// SQL update container
/// ===============================
#[derive(Debug)]
pub struct SqlUpdate {
    table: &'static str,
    assignments: Vec<(&'static str, SqlValue)>,
}

impl SqlUpdate {
    pub fn new(table: &'static str) -> Self {
        Self {
            table,
            assignments: Vec::new(),
        }
    }

    /// Column names are compile-time constants; only values are bound.
    pub fn set(&mut self, column: &'static str, value: SqlValue) -> &mut Self {
        self.assignments.push((column, value));
        self
    }

    pub fn set_opt<T: Into<SqlValue>>(&mut self, column: &'static str, value: Option<T>) -> &mut Self {
        if let Some(v) = value {
            self.assignments.push((column, v.into()));
        }
        self
    }

    pub fn is_empty(&self) -> bool {
        self.assignments.is_empty()
    }

    pub fn sql(&self, id_column: &str) -> String {
        let set_clause = self
            .assignments
            .iter()
            .map(|(k, _)| format!("{} = ?", k))
            .collect::<Vec<_>>()
            .join(", ");

        format!("UPDATE {} SET {} WHERE {} = ?", self.table, set_clause, id_column)
    }

    /// ===============================
    /// Execute the update
    /// ===============================
    pub async fn execute(
        self,
        pool: &MySqlPool,
        id_column: &str,
        id_value: u64,
    ) -> Result<u64, sqlx::Error> {
        let sql = self.sql(id_column);
        let mut query = sqlx::query(&sql);

        for (_, value) in self.assignments {
            query = match value {
                SqlValue::String(v) => query.bind(v),
                SqlValue::F64(v) => query.bind(v),
                SqlValue::Time(v) => query.bind(v),
            };
        }

        let result = query.bind(id_value).execute(pool).await?;
        Ok(result.rows_affected())
    }
}

impl From<String> for SqlValue {
    fn from(v: String) -> Self {
        SqlValue::String(v)
    }
}

impl From<f64> for SqlValue {
    fn from(v: f64) -> Self {
        SqlValue::F64(v)
    }
}

impl From<NaiveTime> for SqlValue {
    fn from(v: NaiveTime) -> Self {
        SqlValue::Time(v)
    }
}

/// `?, ?, ?` for an `IN (...)` list of `n` bound values.
pub fn placeholders(n: usize) -> String {
    vec!["?"; n].join(", ")
}
