//! Merges the users table of one installation into another sharing the
//! same database.
//!
//! Case 1 reconciles users present on both sides: source meta whose
//! `(user_id, meta_key)` is missing from the destination is copied over.
//! Existing destination values are never overwritten.
//!
//! Case 2 imports the remaining source users. Their original ids are kept
//! in a temporary `old_user_id` column while their meta is copied and post
//! and comment authors are remapped, recorded permanently under the
//! `old_site_user_id` meta key, and the column is dropped at the end.

mod sql;

use std::sync::Arc;

use tracing::{error, info, instrument};
use wp_db_migrate_repository::{SiteRegistry, SqlExecutor};
use wp_db_migrate_shared::{
    ExecutionMode, IdentifierError, MigrationReport, SiteId, SiteSelection, TableName, TablePrefix,
};

use crate::errors::{MigrationError, MigrationFailure};
use crate::fan_out::{SitePrefixScheme, resolve_sites};
use crate::runner::{Mutation, StepRunner};

pub const MIGRATION_NAME: &str = "merge-user-table";

/// Temporary column on the destination users table holding source ids.
pub const REFERENCE_COLUMN: &str = "old_user_id";

/// Meta key recording the source id of every imported user.
pub const PROVENANCE_META_KEY: &str = "old_site_user_id";

/// Shown after any fatal error of this migration.
pub const RESTORE_WARNING: &str = "You should check your site to see if it's broken. If it is, \
you can fix it by restoring your database from backups.";

/// Report count keys.
pub mod counts {
    pub const COMMON_USER_META: &str = "common_user_meta";
    pub const NEW_USERS: &str = "new_users";
    pub const NEW_USER_META: &str = "new_user_meta";
    pub const SITES_REMAPPED: &str = "sites_remapped";
}

/// Where the provenance rows read the imported users' ids from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ProvenanceSource {
    /// `ID` and `old_user_id` of the destination users table.
    #[default]
    UsersTable,
    /// `ID` and `old_user_id` read off the destination *meta* table. That
    /// table has neither column, so this fails on a stock schema; kept for
    /// databases that were patched to match it.
    MetaTableLiteral,
}

/// The users and usermeta tables under one prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserTables {
    pub users: TableName,
    pub usermeta: TableName,
}

impl UserTables {
    pub fn new(prefix: &TablePrefix) -> Result<Self, IdentifierError> {
        Ok(Self {
            users: prefix.table("users")?,
            usermeta: prefix.table("usermeta")?,
        })
    }
}

pub struct MergeUserTable {
    from: UserTables,
    to: UserTables,
    to_prefix: TablePrefix,
    mode: ExecutionMode,
    executor: Arc<dyn SqlExecutor>,
    sites: Arc<dyn SiteRegistry>,
    site_selection: Option<SiteSelection>,
    provenance: ProvenanceSource,
    site_prefix_scheme: SitePrefixScheme,
}

impl MergeUserTable {
    /// Fails if both prefixes are the same.
    pub fn new(
        from_prefix: TablePrefix,
        to_prefix: TablePrefix,
        mode: ExecutionMode,
        executor: Arc<dyn SqlExecutor>,
        sites: Arc<dyn SiteRegistry>,
    ) -> Result<Self, MigrationError> {
        if from_prefix == to_prefix {
            return Err(IdentifierError::Overlapping(
                from_prefix.to_string(),
                to_prefix.to_string(),
            )
            .into());
        }

        Ok(Self {
            from: UserTables::new(&from_prefix)?,
            to: UserTables::new(&to_prefix)?,
            to_prefix,
            mode,
            executor,
            sites,
            site_selection: None,
            provenance: ProvenanceSource::default(),
            site_prefix_scheme: SitePrefixScheme::default(),
        })
    }

    /// Sites whose posts and comments are remapped on a multisite network.
    /// Required there; ignored on a single site.
    pub fn with_site_selection(mut self, selection: SiteSelection) -> Self {
        self.site_selection = Some(selection);
        self
    }

    pub fn with_provenance_source(mut self, source: ProvenanceSource) -> Self {
        self.provenance = source;
        self
    }

    pub fn with_site_prefix_scheme(mut self, scheme: SitePrefixScheme) -> Self {
        self.site_prefix_scheme = scheme;
        self
    }

    #[instrument(skip(self), fields(from = %self.from.users, to = %self.to.users, mode = ?self.mode))]
    pub async fn run(self) -> Result<MigrationReport, MigrationFailure> {
        let mut runner = StepRunner::new(MIGRATION_NAME, self.executor.clone(), self.mode);

        match self.steps(&mut runner).await {
            Ok(()) => {
                info!("User table merge completed");
                Ok(runner.finish())
            }
            Err(e) => {
                error!(error = %e, "User table merge failed");
                Err(runner.fail(e, RESTORE_WARNING))
            }
        }
    }

    async fn steps(&self, runner: &mut StepRunner) -> Result<(), MigrationError> {
        // Resolved up front so a bad site id fails before anything changes.
        let sites = self.remap_targets().await?;

        self.migrate_common_users(runner).await?;
        self.migrate_new_users(runner, &sites).await?;
        Ok(())
    }

    /// Prefixes of the sites to remap. Empty on a single site.
    async fn remap_targets(&self) -> Result<Vec<(SiteId, TablePrefix)>, MigrationError> {
        if !self.sites.is_multisite(&self.to_prefix).await? {
            return Ok(Vec::new());
        }

        let selection = self
            .site_selection
            .ok_or(MigrationError::SiteSelectionRequired)?;

        resolve_sites(self.sites.as_ref(), &self.to_prefix, selection)
            .await?
            .into_iter()
            .map(|site| -> Result<_, MigrationError> {
                let prefix = self.site_prefix_scheme.site_prefix(&self.to_prefix, site)?;
                Ok((site, prefix))
            })
            .collect()
    }

    /// Case 1: copy missing meta of users present on both sides.
    async fn migrate_common_users(&self, runner: &mut StepRunner) -> Result<(), MigrationError> {
        let count = runner
            .count(&sql::count_common_meta(&self.from, &self.to))
            .await?;
        runner.set_count(counts::COMMON_USER_META, count);
        info!("Total common user's meta to migrate: {count}");

        if count == 0 {
            runner.note(
                "Copy missing meta of common users",
                "There is no missing meta for common users",
            );
            return Ok(());
        }

        runner
            .mutate(Mutation::new(
                format!("Copy {count} missing meta rows of common users"),
                sql::insert_common_meta(&self.from, &self.to),
            ))
            .await?;
        Ok(())
    }

    /// Case 2: import users missing from the destination.
    async fn migrate_new_users(
        &self,
        runner: &mut StepRunner,
        sites: &[(SiteId, TablePrefix)],
    ) -> Result<(), MigrationError> {
        let new_users = runner
            .count(&sql::count_new_users(&self.from, &self.to))
            .await?;
        runner.set_count(counts::NEW_USERS, new_users);

        if new_users == 0 {
            runner.note("Import new users", "There are no new users to migrate");
            return Ok(());
        }
        info!("Total new users found: {new_users}");

        self.ensure_no_reference_column(runner).await?;
        let meta_count = runner
            .count(&sql::count_new_user_meta(&self.from, &self.to))
            .await?;
        runner.set_count(counts::NEW_USER_META, meta_count);

        runner
            .mutate(Mutation::new(
                format!("Add column {REFERENCE_COLUMN} to {}", self.to.users),
                sql::add_reference_column(&self.to.users),
            ))
            .await?;

        runner
            .mutate(Mutation::new(
                format!("Add {new_users} new users to {}", self.to.users),
                sql::insert_new_users(&self.from, &self.to),
            ))
            .await?;

        if meta_count == 0 {
            runner.note(
                "Copy meta of new users",
                "There is no new user's meta found to migrate",
            );
        } else {
            runner
                .mutate(Mutation::new(
                    format!("Copy {meta_count} meta rows of new users"),
                    sql::insert_new_user_meta(&self.from, &self.to),
                ))
                .await?;
        }

        runner
            .mutate(Mutation::new(
                format!("Record source user ids under meta key {PROVENANCE_META_KEY}"),
                sql::insert_provenance(&self.to, self.provenance, PROVENANCE_META_KEY),
            ))
            .await?;

        for (site, prefix) in sites {
            self.remap_site(runner, *site, prefix).await?;
        }
        runner.set_count(counts::SITES_REMAPPED, sites.len() as u64);

        runner
            .mutate(Mutation::new(
                format!("Drop column {REFERENCE_COLUMN} from {}", self.to.users),
                sql::drop_reference_column(&self.to.users),
            ))
            .await?;
        Ok(())
    }

    /// A leftover column means an earlier run stopped halfway; its values
    /// would be mixed up with this run's.
    async fn ensure_no_reference_column(&self, runner: &StepRunner) -> Result<(), MigrationError> {
        let existing = runner
            .count(&sql::reference_column_exists(&self.to.users))
            .await?;
        if existing > 0 {
            return Err(MigrationError::ReferenceColumnExists {
                table: self.to.users.to_string(),
                column: REFERENCE_COLUMN.to_string(),
            });
        }
        Ok(())
    }

    /// Points posts and comments of one site at the new user ids.
    async fn remap_site(
        &self,
        runner: &mut StepRunner,
        site: SiteId,
        prefix: &TablePrefix,
    ) -> Result<(), MigrationError> {
        info!(site = %site, prefix = %prefix, "Migrating new users for site");

        let posts = prefix.table("posts")?;
        runner
            .mutate(Mutation::new(
                format!("Update post authors in {posts} for site {site}"),
                sql::remap_post_authors(&posts, &self.to.users),
            ))
            .await?;

        let comments = prefix.table("comments")?;
        runner
            .mutate(Mutation::new(
                format!("Update comment authors in {comments} for site {site}"),
                sql::remap_comment_users(&comments, &self.to.users),
            ))
            .await?;
        Ok(())
    }
}
