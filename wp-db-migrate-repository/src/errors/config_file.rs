use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while locating, reading or writing `wp-config.php`.
#[derive(Debug, Error)]
pub enum ConfigFileError {
    #[error("Could not find wp-config.php in {0} or any parent directory")]
    NotFound(PathBuf),

    #[error("Failed to read `{path}`: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write `{path}`: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
