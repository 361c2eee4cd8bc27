//! This module defines the `SqlExecutor` trait, the only way the engines
//! talk to the database.
use wp_db_migrate_shared::{Row, Statement};

use crate::errors::ExecutorError;

/// A trait for running SQL statements against the target database.
///
/// Implementors run each statement to completion before returning; the
/// engines rely on statements being applied strictly in call order.
#[async_trait::async_trait]
pub trait SqlExecutor: Send + Sync {
    /// Runs a statement that returns rows.
    ///
    /// # Arguments
    ///
    /// * `statement` - SQL text with `?` placeholders and its bound values.
    ///
    /// # Returns
    ///
    /// The returned rows, or an `ExecutorError` carrying the driver message.
    async fn query(&self, statement: &Statement) -> Result<Vec<Row>, ExecutorError>;

    /// Runs a statement that modifies data or schema.
    ///
    /// # Returns
    ///
    /// The number of affected rows, or an `ExecutorError` carrying the driver
    /// message.
    async fn execute(&self, statement: &Statement) -> Result<u64, ExecutorError>;
}
