use serde::Serialize;

/// Whether mutating steps are applied or only described.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionMode {
    #[default]
    Live,
    DryRun,
}

impl ExecutionMode {
    pub fn is_dry_run(self) -> bool {
        self == Self::DryRun
    }
}

impl From<bool> for ExecutionMode {
    fn from(dry_run: bool) -> Self {
        if dry_run { Self::DryRun } else { Self::Live }
    }
}
