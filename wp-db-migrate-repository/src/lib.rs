//! # WP DB Migrate Repository
//! This crate provides the collaborators the migration engines drive: a SQL
//! executor, a site registry and access to the `wp-config.php` prefix
//! declaration. Each is a trait with a production implementation (MySQL via
//! `sqlx`, the filesystem) and an in-memory mock for tests.
pub mod errors;
pub mod fs;
pub mod interfaces;
pub mod mock;
pub mod mysql;
pub mod registry;

pub use errors::{ConfigFileError, ExecutorError, SiteRegistryError};
pub use fs::{PrefixRewrite, WpConfigFile, rewrite_table_prefix};
pub use interfaces::{ConfigFile, SiteRegistry, SqlExecutor};
pub use mock::{MemoryConfigFile, MockExecutor, MockSiteRegistry};
pub use mysql::MySqlExecutor;
pub use registry::SqlSiteRegistry;
