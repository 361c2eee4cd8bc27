//! Renames the table prefix of a WordPress database.
//!
//! The steps run in order and the first fatal error stops the rest:
//!
//! 1. discover every table under the old prefix
//! 2. rename each table
//! 3. rewrite `$table_prefix` in `wp-config.php`
//! 4. rename user meta keys carrying the old prefix (best effort, per row)
//! 5. rename the `<prefix>user_roles` option of every site
//!
//! Nothing is rolled back. A failed run reports how far it got.

mod sql;

use std::sync::Arc;

use tracing::{error, info, instrument, warn};
use wp_db_migrate_repository::{ConfigFile, SiteRegistry, SqlExecutor, rewrite_table_prefix};
use wp_db_migrate_shared::{ExecutionMode, MigrationReport, TableName, TablePrefix};

use crate::errors::{MigrationError, MigrationFailure};
use crate::fan_out::secondary_sites;
use crate::runner::{Mutation, StepRunner};

pub const MIGRATION_NAME: &str = "rename-prefix";

/// Shown after any fatal error of this migration.
pub const RESTORE_WARNING: &str = "You should check your site to see if it's broken. If it is, \
you can fix it by restoring your `wp-config.php` file and your database from backups.";

/// Report count keys.
pub mod counts {
    pub const TABLES_RENAMED: &str = "tables_renamed";
    pub const USERMETA_KEYS: &str = "usermeta_keys";
    pub const USERMETA_KEYS_FAILED: &str = "usermeta_keys_failed";
    pub const ROLE_OPTIONS: &str = "role_options";
}

/// Option holding the role definitions, stored under a prefixed name.
const USER_ROLES_OPTION: &str = "user_roles";

/// A table to rename.
#[derive(Debug, Clone, PartialEq, Eq)]
struct TableRename {
    from: TableName,
    to: TableName,
}

pub struct RenamePrefix {
    old_prefix: TablePrefix,
    new_prefix: TablePrefix,
    mode: ExecutionMode,
    executor: Arc<dyn SqlExecutor>,
    sites: Arc<dyn SiteRegistry>,
    config_file: Arc<dyn ConfigFile>,
}

impl RenamePrefix {
    /// Fails if the prefixes overlap, before anything touches the database.
    pub fn new(
        old_prefix: TablePrefix,
        new_prefix: TablePrefix,
        mode: ExecutionMode,
        executor: Arc<dyn SqlExecutor>,
        sites: Arc<dyn SiteRegistry>,
        config_file: Arc<dyn ConfigFile>,
    ) -> Result<Self, MigrationError> {
        old_prefix.ensure_disjoint(&new_prefix)?;
        Ok(Self {
            old_prefix,
            new_prefix,
            mode,
            executor,
            sites,
            config_file,
        })
    }

    #[instrument(skip(self), fields(old_prefix = %self.old_prefix, new_prefix = %self.new_prefix, mode = ?self.mode))]
    pub async fn run(self) -> Result<MigrationReport, MigrationFailure> {
        let mut runner = StepRunner::new(MIGRATION_NAME, self.executor.clone(), self.mode);

        match self.steps(&mut runner).await {
            Ok(()) => {
                info!("Prefix rename completed");
                Ok(runner.finish())
            }
            Err(e) => {
                error!(error = %e, "Prefix rename failed");
                Err(runner.fail(e, RESTORE_WARNING))
            }
        }
    }

    async fn steps(&self, runner: &mut StepRunner) -> Result<(), MigrationError> {
        let tables = self.discover_tables(runner).await?;
        let multisite = self.sites.is_multisite(&self.old_prefix).await?;

        self.rename_tables(runner, &tables).await?;
        self.rewrite_config(runner).await?;
        self.rename_meta_keys(runner).await?;
        self.rename_role_options(runner, multisite).await?;
        Ok(())
    }

    /// The prefix the tables live under right now: the new one once the
    /// renames ran, the old one in a dry run.
    fn current_prefix(&self, runner: &StepRunner) -> &TablePrefix {
        if runner.is_dry_run() {
            &self.old_prefix
        } else {
            &self.new_prefix
        }
    }

    async fn discover_tables(
        &self,
        runner: &StepRunner,
    ) -> Result<Vec<TableRename>, MigrationError> {
        let statement = sql::discover_tables(&self.old_prefix);
        let rows = runner.query(&statement).await?;

        let mut tables = Vec::with_capacity(rows.len());
        for row in &rows {
            let name = row
                .get_str(0)
                .ok_or_else(|| MigrationError::UnexpectedResult(statement.sql().to_string()))?;

            // LIKE ignores case under the default collations.
            let Some(suffix) = self.old_prefix.strip(name) else {
                warn!(table = name, "Skipping table that does not start with the exact prefix");
                continue;
            };

            tables.push(TableRename {
                from: TableName::new(name)?,
                to: self.new_prefix.table(suffix)?,
            });
        }

        if tables.is_empty() {
            return Err(MigrationError::NoTablesFound(self.old_prefix.to_string()));
        }

        info!(count = tables.len(), "Found tables to rename");
        Ok(tables)
    }

    async fn rename_tables(
        &self,
        runner: &mut StepRunner,
        tables: &[TableRename],
    ) -> Result<(), MigrationError> {
        let mut renamed = 0;
        for table in tables {
            runner
                .mutate(Mutation::new(
                    format!("Rename table {} to {}", table.from, table.to),
                    sql::rename_table(&table.from, &table.to),
                ))
                .await?;
            renamed += 1;
            runner.set_count(counts::TABLES_RENAMED, renamed);
        }

        if runner.is_dry_run() {
            info!("{renamed} tables would be renamed");
        } else {
            info!("{renamed} tables renamed");
        }
        Ok(())
    }

    async fn rewrite_config(&self, runner: &mut StepRunner) -> Result<(), MigrationError> {
        let location = self.config_file.location().to_path_buf();
        let contents = self.config_file.read().await?;
        let rewrite = rewrite_table_prefix(&contents, &self.new_prefix);

        if rewrite.replacements == 0 {
            return Err(MigrationError::PrefixDeclarationNotFound(location));
        }

        runner
            .write_file(
                format!(
                    "Update $table_prefix to '{}' in {}",
                    self.new_prefix,
                    location.display()
                ),
                self.config_file.as_ref(),
                &rewrite.contents,
                rewrite.replacements as u64,
            )
            .await?;
        Ok(())
    }

    async fn rename_meta_keys(&self, runner: &mut StepRunner) -> Result<(), MigrationError> {
        let target = self.new_prefix.table("usermeta")?;
        let current = self.current_prefix(runner).table("usermeta")?;
        let statement = sql::prefixed_meta_keys(&current, &self.old_prefix);
        let rows = runner.query(&statement).await?;

        if rows.is_empty() {
            runner.set_count(counts::USERMETA_KEYS, 0);
            runner.note(
                "Update user meta keys",
                format!("No user meta keys start with `{}`", self.old_prefix),
            );
            return Ok(());
        }

        let (mut updated, mut failed) = (0, 0);
        for row in &rows {
            let key = row
                .get_str(0)
                .ok_or_else(|| MigrationError::UnexpectedResult(statement.sql().to_string()))?;
            let Some(suffix) = self.old_prefix.strip(key) else {
                continue;
            };
            let new_key = format!("{}{}", self.new_prefix, suffix);

            let mutation = Mutation::new(
                format!("Update meta key {key} to {new_key}"),
                sql::rename_meta_key(&target, key, &new_key),
            );
            match runner.try_mutate(mutation).await {
                Some(_) => updated += 1,
                None => failed += 1,
            }
        }

        runner.set_count(counts::USERMETA_KEYS, updated);
        runner.set_count(counts::USERMETA_KEYS_FAILED, failed);
        if failed > 0 {
            warn!(updated, failed, "Some user meta keys were not updated");
        }
        Ok(())
    }

    async fn rename_role_options(
        &self,
        runner: &mut StepRunner,
        multisite: bool,
    ) -> Result<(), MigrationError> {
        self.rename_role_option(runner, &self.old_prefix, &self.new_prefix).await?;
        let mut renamed = 1;

        if multisite {
            let sites = secondary_sites(self.sites.as_ref(), self.current_prefix(runner)).await?;
            for site in sites {
                self.rename_role_option(
                    runner,
                    &self.old_prefix.for_site(site),
                    &self.new_prefix.for_site(site),
                )
                .await?;
                renamed += 1;
            }
        }

        runner.set_count(counts::ROLE_OPTIONS, renamed);
        Ok(())
    }

    /// Renames `<old>user_roles` in the options table of the site under `new`.
    async fn rename_role_option(
        &self,
        runner: &mut StepRunner,
        old: &TablePrefix,
        new: &TablePrefix,
    ) -> Result<(), MigrationError> {
        let options = new.table("options")?;
        let from = format!("{old}{USER_ROLES_OPTION}");
        let to = format!("{new}{USER_ROLES_OPTION}");

        runner
            .mutate(Mutation::new(
                format!("Update option {from} to {to} in {options}"),
                sql::rename_option(&options, &from, &to),
            ))
            .await?;
        Ok(())
    }
}
