//! # WP DB Migrate
//!
//! Structural migrations for WordPress databases, run from the command line.
//!
//! ## Migrations
//!
//! 1. **Rename prefix**: renames every table under an old prefix, rewrites
//!    `$table_prefix` in `wp-config.php` and repairs the prefix-dependent
//!    user meta keys and `user_roles` options.
//! 2. **Merge user table**: copies the users and user meta of one
//!    installation into another, then remaps post and comment authors on
//!    every selected site.
//!
//! Both run in dry-run mode first if asked to: discovery queries still run,
//! so the preview reports real counts, but nothing is modified.
//!
//! ## Modules
//!
//! - [`runner`]: the execute-or-describe primitive every mutating step uses
//! - [`fan_out`]: per-site prefix derivation and site selection
//! - [`rename_prefix`]: the prefix rename engine
//! - [`merge_users`]: the users table merge engine
//! - [`config`]: settings and dependency wiring
//! - [`cli`]: command line definition and command dispatch
//! - [`errors`]: error types
//!
//! Only one migration may run against a database at a time. Nothing locks
//! the database; concurrent runs will race.

pub mod cli;
pub mod config;
pub mod confirm;
pub mod errors;
pub mod fan_out;
pub mod merge_users;
pub mod rename_prefix;
pub mod runner;

pub use config::{Dependencies, Settings};
pub use errors::{CliError, MigrationError, MigrationFailure};
pub use merge_users::{MergeUserTable, ProvenanceSource};
pub use rename_prefix::RenamePrefix;
pub use runner::{Mutation, MutationResult, StepRunner};
