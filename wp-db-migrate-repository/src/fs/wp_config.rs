use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use async_trait::async_trait;
use regex::{Captures, Regex};
use tracing::debug;
use wp_db_migrate_shared::TablePrefix;

use crate::errors::ConfigFileError;
use crate::interfaces::ConfigFile;

pub const CONFIG_FILE_NAME: &str = "wp-config.php";

/// Matches `$table_prefix = '...';` with either quote style.
static TABLE_PREFIX_ASSIGNMENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(\$table_prefix\s*=\s*)(?:'[^'\r\n]+'|"[^"\r\n]+")(\s*;)"#)
        .unwrap_or_else(|e| panic!("invalid table prefix pattern: {e}"))
});

/// Result of rewriting the prefix declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrefixRewrite {
    pub contents: String,
    pub replacements: usize,
}

/// Replaces the value of every `$table_prefix` assignment in `contents`.
///
/// The new value is always written single-quoted; the surrounding spacing
/// and the terminating semicolon are preserved.
pub fn rewrite_table_prefix(contents: &str, new_prefix: &TablePrefix) -> PrefixRewrite {
    let replacements = TABLE_PREFIX_ASSIGNMENT.find_iter(contents).count();
    let contents = TABLE_PREFIX_ASSIGNMENT
        .replace_all(contents, |caps: &Captures| {
            format!("{}'{}'{}", &caps[1], new_prefix, &caps[2])
        })
        .into_owned();

    PrefixRewrite {
        contents,
        replacements,
    }
}

/// `wp-config.php` on the local filesystem.
#[derive(Debug, Clone)]
pub struct WpConfigFile {
    path: PathBuf,
}

impl WpConfigFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Looks for `wp-config.php` in `start` and then each parent directory.
    pub fn locate(start: &Path) -> Result<Self, ConfigFileError> {
        start
            .ancestors()
            .map(|dir| dir.join(CONFIG_FILE_NAME))
            .find(|candidate| candidate.is_file())
            .map(|path| {
                debug!(path = %path.display(), "Located wp-config.php");
                Self::new(path)
            })
            .ok_or_else(|| ConfigFileError::NotFound(start.to_path_buf()))
    }
}

#[async_trait]
impl ConfigFile for WpConfigFile {
    fn location(&self) -> &Path {
        &self.path
    }

    async fn read(&self) -> Result<String, ConfigFileError> {
        tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|source| ConfigFileError::Read {
                path: self.path.clone(),
                source,
            })
    }

    async fn write(&self, contents: &str) -> Result<(), ConfigFileError> {
        tokio::fs::write(&self.path, contents)
            .await
            .map_err(|source| ConfigFileError::Write {
                path: self.path.clone(),
                source,
            })
    }
}
