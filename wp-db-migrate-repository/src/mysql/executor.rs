//! MySQL implementation of the `SqlExecutor` trait.
//!
//! Statements without bound values go through the text protocol, since
//! MySQL refuses to prepare some DDL. Statements with values are prepared so
//! the values are never spliced into the SQL text.
use async_trait::async_trait;
use sqlx::mysql::{MySqlArguments, MySqlPoolOptions, MySqlRow};
use sqlx::query::Query;
use sqlx::{Executor, MySql, MySqlPool, Row as _};
use tracing::debug;
use wp_db_migrate_shared::{Row, SqlValue, Statement};

use crate::errors::ExecutorError;
use crate::interfaces::SqlExecutor;

/// `sqlx` backed executor running against a MySQL / MariaDB pool.
pub struct MySqlExecutor {
    pool: MySqlPool,
}

impl MySqlExecutor {
    /// Wraps an existing pool.
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    /// Connects to `database_url` with a pool of `max_connections`.
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self, ExecutorError> {
        let pool = MySqlPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;

        Ok(Self::new(pool))
    }
}

fn bind_params<'q>(
    mut query: Query<'q, MySql, MySqlArguments>,
    params: &'q [SqlValue],
) -> Query<'q, MySql, MySqlArguments> {
    for param in params {
        query = match param {
            SqlValue::Null => query.bind(Option::<String>::None),
            SqlValue::Int(value) => query.bind(*value),
            SqlValue::UInt(value) => query.bind(*value),
            SqlValue::Text(text) => query.bind(text.as_str()),
        };
    }
    query
}

/// Converts a column to a `SqlValue`, trying the representations the
/// engines read back: text, signed and unsigned integers, then raw bytes
/// (`information_schema` reports names as binary on some servers).
fn decode_column(row: &MySqlRow, index: usize) -> Result<SqlValue, ExecutorError> {
    if let Ok(value) = row.try_get::<Option<String>, _>(index) {
        return Ok(value.map_or(SqlValue::Null, SqlValue::Text));
    }
    if let Ok(value) = row.try_get::<Option<i64>, _>(index) {
        return Ok(value.map_or(SqlValue::Null, SqlValue::Int));
    }
    if let Ok(value) = row.try_get::<Option<u64>, _>(index) {
        return Ok(value.map_or(SqlValue::Null, SqlValue::UInt));
    }
    match row.try_get::<Option<Vec<u8>>, _>(index) {
        Ok(value) => Ok(value.map_or(SqlValue::Null, |bytes| {
            SqlValue::Text(String::from_utf8_lossy(&bytes).into_owned())
        })),
        Err(e) => Err(ExecutorError::Decode {
            column: index,
            message: e.to_string(),
        }),
    }
}

fn decode_row(row: &MySqlRow) -> Result<Row, ExecutorError> {
    let values = (0..row.len())
        .map(|index| decode_column(row, index))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Row::new(values))
}

#[async_trait]
impl SqlExecutor for MySqlExecutor {
    async fn query(&self, statement: &Statement) -> Result<Vec<Row>, ExecutorError> {
        debug!(sql = %statement, "Running query");

        let rows = if statement.params().is_empty() {
            (&self.pool).fetch_all(statement.sql()).await?
        } else {
            bind_params(sqlx::query(statement.sql()), statement.params())
                .fetch_all(&self.pool)
                .await?
        };

        rows.iter().map(decode_row).collect()
    }

    async fn execute(&self, statement: &Statement) -> Result<u64, ExecutorError> {
        debug!(sql = %statement, "Executing statement");

        let result = if statement.params().is_empty() {
            (&self.pool).execute(statement.sql()).await?
        } else {
            bind_params(sqlx::query(statement.sql()), statement.params())
                .execute(&self.pool)
                .await?
        };

        Ok(result.rows_affected())
    }
}
