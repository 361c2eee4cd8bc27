use thiserror::Error;
use wp_db_migrate_shared::IdentifierError;

use crate::errors::ExecutorError;

/// Errors raised while listing or resolving sites.
#[derive(Debug, Error)]
pub enum SiteRegistryError {
    #[error(transparent)]
    Executor(#[from] ExecutorError),

    #[error("Invalid sites table: {0}")]
    Identifier(#[from] IdentifierError),

    #[error("Sites table returned an invalid blog id: {0}")]
    InvalidBlogId(String),
}
