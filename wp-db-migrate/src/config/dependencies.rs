//! Dependency initialization and wiring for the migration commands.

use std::env;
use std::sync::Arc;

use tracing::info;
use wp_db_migrate_repository::{
    ConfigFile, MySqlExecutor, SiteRegistry, SqlExecutor, SqlSiteRegistry, WpConfigFile,
};

use crate::config::Settings;
use crate::errors::CliError;

/// Container for the collaborators every migration needs.
pub struct Dependencies {
    pub executor: Arc<dyn SqlExecutor>,
    pub sites: Arc<dyn SiteRegistry>,
}

impl Dependencies {
    /// Connects to the database described by `settings`.
    pub async fn new(settings: &Settings) -> Result<Self, CliError> {
        info!(max_connections = settings.max_connections, "Connecting to database");

        let executor: Arc<dyn SqlExecutor> = Arc::new(
            MySqlExecutor::connect(&settings.database_url, settings.max_connections)
                .await
                .map_err(CliError::Connection)?,
        );
        info!("Database connection established");

        let sites = Arc::new(SqlSiteRegistry::new(executor.clone()));
        Ok(Self { executor, sites })
    }
}

/// The `wp-config.php` to rewrite: the configured path, or the first one
/// found walking up from the working directory.
pub fn config_file(settings: &Settings) -> Result<Arc<dyn ConfigFile>, CliError> {
    let file = match &settings.wp_config {
        Some(path) => WpConfigFile::new(path),
        None => WpConfigFile::locate(&env::current_dir()?)?,
    };
    info!(path = %file.location().display(), "Using wp-config.php");
    Ok(Arc::new(file))
}
