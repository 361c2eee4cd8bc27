//! In-memory collaborators for testing and local previews.
//!
//! The mocks record what they were asked to do, so tests can assert on the
//! exact statement sequence an engine produced without a database.
//!
//! # Example
//!
//! ```ignore
//! use wp_db_migrate_repository::{MockExecutor, SqlExecutor};
//! use wp_db_migrate_shared::{Row, SqlValue, Statement};
//!
//! let executor = MockExecutor::new();
//! executor.on_query("information_schema.tables", vec![Row::new(vec!["wp_users".into()])]);
//! executor.fail_on("RENAME TABLE `wp_users`", "Table 'new_users' already exists");
//!
//! let rows = executor.query(&Statement::new("SELECT ... information_schema.tables")).await?;
//! ```
mod config_file;
mod executor;
mod site_registry;

pub use config_file::MemoryConfigFile;
pub use executor::MockExecutor;
pub use site_registry::MockSiteRegistry;
