//! Step-by-step record of a migration run.
//!
//! Every engine appends one [`StepRecord`] per step it reached, so a failed
//! run still tells the operator exactly how far it got.
use std::collections::BTreeMap;

use serde::Serialize;

use crate::types::ExecutionMode;

/// What happened to a single step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum StepOutcome {
    /// The statement ran against the database.
    Applied { rows_affected: u64 },
    /// Dry-run: the statement was described but not executed.
    Previewed,
    /// Nothing to do, or an informational line.
    Skipped { reason: String },
    /// The statement failed. Fatal unless the step is best-effort.
    Failed { message: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepRecord {
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sql: Option<String>,
    #[serde(flatten)]
    pub outcome: StepOutcome,
}

/// Aggregated log of a migration run plus the counts it reported.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MigrationReport {
    pub migration: String,
    pub mode: ExecutionMode,
    pub steps: Vec<StepRecord>,
    pub counts: BTreeMap<String, u64>,
}

impl MigrationReport {
    pub fn new(migration: impl Into<String>, mode: ExecutionMode) -> Self {
        Self {
            migration: migration.into(),
            mode,
            steps: Vec::new(),
            counts: BTreeMap::new(),
        }
    }

    pub fn push(&mut self, record: StepRecord) {
        self.steps.push(record);
    }

    pub fn set_count(&mut self, key: impl Into<String>, value: u64) {
        self.counts.insert(key.into(), value);
    }

    pub fn count(&self, key: &str) -> Option<u64> {
        self.counts.get(key).copied()
    }

    pub fn applied(&self) -> usize {
        self.steps
            .iter()
            .filter(|step| matches!(step.outcome, StepOutcome::Applied { .. }))
            .count()
    }

    pub fn previewed(&self) -> usize {
        self.steps
            .iter()
            .filter(|step| step.outcome == StepOutcome::Previewed)
            .count()
    }

    pub fn failed(&self) -> usize {
        self.steps
            .iter()
            .filter(|step| matches!(step.outcome, StepOutcome::Failed { .. }))
            .count()
    }

    /// The last step that ran, if any.
    pub fn last_step(&self) -> Option<&StepRecord> {
        self.steps.last()
    }
}
