//! Execute-or-describe primitive shared by both migrations.
//!
//! Every statement that changes the database goes through
//! [`StepRunner::mutate`] (or [`StepRunner::try_mutate`] for best-effort
//! steps), so a dry run cannot leak a write through a forgotten branch.
//! Read-only discovery goes through [`StepRunner::query`] and always runs.

use std::sync::Arc;

use tracing::{debug, error, info, warn};
use wp_db_migrate_repository::{ConfigFile, SqlExecutor};
use wp_db_migrate_shared::{ExecutionMode, MigrationReport, Row, Statement, StepOutcome, StepRecord};

use crate::errors::{MigrationError, MigrationFailure};

/// A statement that changes data or schema, with the line shown to the
/// operator when it runs or is previewed.
#[derive(Debug, Clone)]
pub struct Mutation {
    pub description: String,
    pub statement: Statement,
}

impl Mutation {
    pub fn new(description: impl Into<String>, statement: Statement) -> Self {
        Self {
            description: description.into(),
            statement,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationResult {
    Executed { rows_affected: u64 },
    Previewed,
}

impl MutationResult {
    /// Rows affected by an executed statement. `None` for previews.
    pub fn rows_affected(self) -> Option<u64> {
        match self {
            Self::Executed { rows_affected } => Some(rows_affected),
            Self::Previewed => None,
        }
    }
}

/// Runs the steps of one migration and records each in a [`MigrationReport`].
pub struct StepRunner {
    executor: Arc<dyn SqlExecutor>,
    mode: ExecutionMode,
    report: MigrationReport,
}

impl StepRunner {
    pub fn new(migration: &str, executor: Arc<dyn SqlExecutor>, mode: ExecutionMode) -> Self {
        Self {
            executor,
            mode,
            report: MigrationReport::new(migration, mode),
        }
    }

    pub fn mode(&self) -> ExecutionMode {
        self.mode
    }

    pub fn is_dry_run(&self) -> bool {
        self.mode.is_dry_run()
    }

    /// Runs a read-only statement in every mode.
    pub async fn query(&self, statement: &Statement) -> Result<Vec<Row>, MigrationError> {
        debug!(sql = %statement, "Query");
        Ok(self.executor.query(statement).await?)
    }

    /// Runs a `SELECT COUNT(*) ...` and returns the number in its first column.
    pub async fn count(&self, statement: &Statement) -> Result<u64, MigrationError> {
        self.query(statement)
            .await?
            .first()
            .and_then(|row| row.get_u64(0))
            .ok_or_else(|| MigrationError::UnexpectedResult(statement.sql().to_string()))
    }

    /// Applies `mutation`, or only describes it in dry-run mode.
    ///
    /// A failure is recorded in the report and returned; callers propagate it
    /// to abort the remaining steps.
    pub async fn mutate(&mut self, mutation: Mutation) -> Result<MutationResult, MigrationError> {
        let Mutation {
            description,
            statement,
        } = mutation;

        if self.is_dry_run() {
            info!(sql = %statement, "Dry run: {description}");
            self.record(description, Some(&statement), StepOutcome::Previewed);
            return Ok(MutationResult::Previewed);
        }

        debug!(sql = %statement, "Execute");
        match self.executor.execute(&statement).await {
            Ok(rows_affected) => {
                info!(rows_affected, "Success: {description}");
                self.record(
                    description,
                    Some(&statement),
                    StepOutcome::Applied { rows_affected },
                );
                Ok(MutationResult::Executed { rows_affected })
            }
            Err(e) => {
                error!(error = %e, "Failed: {description}");
                self.record(
                    description,
                    Some(&statement),
                    StepOutcome::Failed {
                        message: e.to_string(),
                    },
                );
                Err(e.into())
            }
        }
    }

    /// Like [`mutate`](Self::mutate), but a failure is logged, recorded and
    /// swallowed. Returns `None` when the statement failed.
    pub async fn try_mutate(&mut self, mutation: Mutation) -> Option<MutationResult> {
        let description = mutation.description.clone();
        match self.mutate(mutation).await {
            Ok(result) => Some(result),
            Err(e) => {
                warn!(error = %e, "Skipped: {description}");
                None
            }
        }
    }

    /// Writes `contents` to `file`, or only describes the write in dry-run mode.
    ///
    /// `replacements` is recorded as the affected count of the step.
    pub async fn write_file(
        &mut self,
        description: impl Into<String>,
        file: &dyn ConfigFile,
        contents: &str,
        replacements: u64,
    ) -> Result<MutationResult, MigrationError> {
        let description = description.into();
        let path = file.location().display().to_string();

        if self.is_dry_run() {
            info!(path = %path, "Dry run: {description}");
            self.record(description, None, StepOutcome::Previewed);
            return Ok(MutationResult::Previewed);
        }

        match file.write(contents).await {
            Ok(()) => {
                info!(path = %path, "Success: {description}");
                self.record(
                    description,
                    None,
                    StepOutcome::Applied {
                        rows_affected: replacements,
                    },
                );
                Ok(MutationResult::Executed {
                    rows_affected: replacements,
                })
            }
            Err(e) => {
                error!(path = %path, error = %e, "Failed: {description}");
                self.record(
                    description,
                    None,
                    StepOutcome::Failed {
                        message: e.to_string(),
                    },
                );
                Err(e.into())
            }
        }
    }

    /// Records a step that had nothing to do.
    pub fn note(&mut self, description: impl Into<String>, reason: impl Into<String>) {
        let description = description.into();
        let reason = reason.into();
        info!("{reason}");
        self.record(description, None, StepOutcome::Skipped { reason });
    }

    pub fn set_count(&mut self, key: &str, value: u64) {
        self.report.set_count(key, value);
    }

    pub fn report(&self) -> &MigrationReport {
        &self.report
    }

    pub fn finish(self) -> MigrationReport {
        self.report
    }

    /// Wraps a fatal error together with the steps completed so far.
    pub fn fail(self, error: MigrationError, warning: &'static str) -> MigrationFailure {
        MigrationFailure::new(error, self.report, warning)
    }

    fn record(&mut self, description: String, statement: Option<&Statement>, outcome: StepOutcome) {
        self.report.push(StepRecord {
            description,
            sql: statement.map(ToString::to_string),
            outcome,
        });
    }
}
