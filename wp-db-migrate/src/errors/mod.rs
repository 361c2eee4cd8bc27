//! Error types for the migration engines and the command line.

use std::path::PathBuf;

use thiserror::Error;
use wp_db_migrate_repository::{ConfigFileError, ExecutorError, SiteRegistryError};
use wp_db_migrate_shared::{IdentifierError, MigrationReport, SiteId};

/// Fatal errors that abort the remaining steps of a migration.
#[derive(Debug, Error)]
pub enum MigrationError {
    /// The database rejected a statement. Displays the driver message as is.
    #[error(transparent)]
    Executor(#[from] ExecutorError),

    #[error(transparent)]
    SiteRegistry(#[from] SiteRegistryError),

    #[error(transparent)]
    ConfigFile(#[from] ConfigFileError),

    #[error("Invalid identifier: {0}")]
    Identifier(#[from] IdentifierError),

    #[error("MySQL error: No tables found with prefix `{0}` to rename")]
    NoTablesFound(String),

    #[error("Failed to replace the table prefix in `{0}`: no `$table_prefix` assignment found")]
    PrefixDeclarationNotFound(PathBuf),

    #[error("No sites found to update user role options")]
    NoRoleOptionSites,

    #[error("No sites found to remap post and comment authors on")]
    NoSitesToRemap,

    #[error("Sorry, there is no site id/table found for site id {0}")]
    SiteNotFound(SiteId),

    #[error("A site id or `all` must be selected to merge users on a multisite network")]
    SiteSelectionRequired,

    #[error(
        "Column `{column}` already exists on {table}; a previous merge did not finish. \
         Restore from backup, or drop the column once its users are accounted for"
    )]
    ReferenceColumnExists { table: String, column: String },

    #[error("Unexpected result from `{0}`")]
    UnexpectedResult(String),
}

/// A migration that stopped on a fatal error.
///
/// Carries the partial report so the operator can see which steps completed,
/// and the warning to show after the error itself.
#[derive(Debug, Error)]
#[error("{error}")]
pub struct MigrationFailure {
    pub error: MigrationError,
    pub report: MigrationReport,
    pub warning: &'static str,
}

impl MigrationFailure {
    pub fn new(error: MigrationError, report: MigrationReport, warning: &'static str) -> Self {
        Self {
            error,
            report,
            warning,
        }
    }
}

/// Errors surfaced by the `wp-db-migrate` binary.
#[derive(Debug, Error)]
pub enum CliError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to connect to the database: {0}")]
    Connection(#[source] ExecutorError),

    #[error(transparent)]
    ConfigFile(#[from] ConfigFileError),

    #[error(transparent)]
    SiteRegistry(#[from] SiteRegistryError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Migration(#[from] MigrationError),

    #[error("Failed to serialize the report: {0}")]
    Report(#[from] serde_json::Error),

    #[error(transparent)]
    Failed(Box<MigrationFailure>),
}

impl CliError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}

impl From<MigrationFailure> for CliError {
    fn from(failure: MigrationFailure) -> Self {
        Self::Failed(Box::new(failure))
    }
}
