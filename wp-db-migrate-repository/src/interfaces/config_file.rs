use std::path::Path;

use crate::errors::ConfigFileError;

/// Read/write access to the file holding the table prefix declaration.
#[async_trait::async_trait]
pub trait ConfigFile: Send + Sync {
    /// Where the file lives, for progress output.
    fn location(&self) -> &Path;

    async fn read(&self) -> Result<String, ConfigFileError>;

    /// Replaces the whole file with `contents`.
    async fn write(&self, contents: &str) -> Result<(), ConfigFileError>;
}
