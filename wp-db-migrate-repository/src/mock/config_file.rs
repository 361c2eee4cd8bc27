use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;

use crate::errors::ConfigFileError;
use crate::interfaces::ConfigFile;

/// Config file kept in memory. Counts writes and can be told to fail them.
#[derive(Debug)]
pub struct MemoryConfigFile {
    path: PathBuf,
    contents: Mutex<String>,
    writes: Mutex<usize>,
    fail_writes: bool,
}

impl MemoryConfigFile {
    pub fn new(contents: &str) -> Self {
        Self {
            path: PathBuf::from("wp-config.php"),
            contents: Mutex::new(contents.to_string()),
            writes: Mutex::new(0),
            fail_writes: false,
        }
    }

    /// Every write fails with a permission error.
    pub fn read_only(contents: &str) -> Self {
        Self {
            fail_writes: true,
            ..Self::new(contents)
        }
    }

    pub fn contents(&self) -> String {
        self.contents
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn writes(&self) -> usize {
        *self.writes.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl ConfigFile for MemoryConfigFile {
    fn location(&self) -> &Path {
        &self.path
    }

    async fn read(&self) -> Result<String, ConfigFileError> {
        Ok(self.contents())
    }

    async fn write(&self, contents: &str) -> Result<(), ConfigFileError> {
        if self.fail_writes {
            return Err(ConfigFileError::Write {
                path: self.path.clone(),
                source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only"),
            });
        }
        *self.contents.lock().unwrap_or_else(PoisonError::into_inner) = contents.to_string();
        *self.writes.lock().unwrap_or_else(PoisonError::into_inner) += 1;
        Ok(())
    }
}
