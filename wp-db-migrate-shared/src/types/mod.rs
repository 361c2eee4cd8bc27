mod identifier;
mod mode;
mod report;
mod site;
mod statement;

pub use identifier::{IdentifierError, TableName, TablePrefix};
pub use mode::ExecutionMode;
pub use report::{MigrationReport, StepOutcome, StepRecord};
pub use site::{InvalidSite, SiteId, SiteSelection};
pub use statement::{Row, SqlValue, Statement};
