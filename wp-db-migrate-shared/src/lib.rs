//! # WP DB Migrate Shared
//! This crate defines the data structures shared by the migration engines and
//! the collaborators they drive: validated table identifiers, site ids,
//! SQL statements with bound values, execution modes and step reports.
pub mod types;

pub use types::{
    ExecutionMode, IdentifierError, InvalidSite, MigrationReport, Row, SiteId, SiteSelection,
    SqlValue, Statement, StepOutcome, StepRecord, TableName, TablePrefix,
};
