use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;
use wp_db_migrate_shared::{Row, SiteId, Statement, TablePrefix};

use crate::errors::SiteRegistryError;
use crate::interfaces::{SiteRegistry, SqlExecutor};

/// Maximum number of sites returned by [`SiteRegistry::list_sites`].
pub const SITE_LIST_LIMIT: u64 = 100;

/// Reads sites from `<prefix>blogs` through any `SqlExecutor`.
///
/// An installation counts as a multisite network when that table exists.
pub struct SqlSiteRegistry {
    executor: Arc<dyn SqlExecutor>,
}

impl SqlSiteRegistry {
    pub fn new(executor: Arc<dyn SqlExecutor>) -> Self {
        Self { executor }
    }
}

fn site_from_row(row: &Row) -> Result<SiteId, SiteRegistryError> {
    row.get_u64(0)
        .and_then(SiteId::new)
        .ok_or_else(|| SiteRegistryError::InvalidBlogId(format!("{:?}", row.get(0))))
}

#[async_trait]
impl SiteRegistry for SqlSiteRegistry {
    async fn is_multisite(&self, prefix: &TablePrefix) -> Result<bool, SiteRegistryError> {
        let blogs = prefix.table("blogs")?;
        let statement = Statement::new(
            "SELECT COUNT(*) AS blogs_tables FROM information_schema.tables \
             WHERE table_schema = DATABASE() AND table_name = ?",
        )
        .bind(blogs.as_str());

        let rows = self.executor.query(&statement).await?;
        let found = rows.first().and_then(|row| row.get_u64(0)).unwrap_or(0) > 0;
        debug!(table = blogs.as_str(), multisite = found, "Checked for sites table");
        Ok(found)
    }

    async fn list_sites(&self, prefix: &TablePrefix) -> Result<Vec<SiteId>, SiteRegistryError> {
        let blogs = prefix.table("blogs")?;
        let statement = Statement::new(format!(
            "SELECT blog_id FROM {blogs} ORDER BY blog_id ASC LIMIT {SITE_LIST_LIMIT}"
        ));

        self.executor
            .query(&statement)
            .await?
            .iter()
            .map(site_from_row)
            .collect()
    }

    async fn find_site(
        &self,
        prefix: &TablePrefix,
        site: SiteId,
    ) -> Result<Option<SiteId>, SiteRegistryError> {
        let blogs = prefix.table("blogs")?;
        let statement =
            Statement::new(format!("SELECT blog_id FROM {blogs} WHERE blog_id = ? LIMIT 1"))
                .bind(site.get());

        match self.executor.query(&statement).await?.first() {
            Some(row) => site_from_row(row).map(Some),
            None => Ok(None),
        }
    }
}
