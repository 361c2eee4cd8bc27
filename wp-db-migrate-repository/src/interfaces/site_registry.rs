use wp_db_migrate_shared::{SiteId, TablePrefix};

use crate::errors::SiteRegistryError;

/// Trait for discovering the sites of a (possibly multisite) installation.
///
/// Every method takes the table prefix to look under, because the prefix
/// changes halfway through a prefix rename.
#[async_trait::async_trait]
pub trait SiteRegistry: Send + Sync {
    /// True when the installation under `prefix` is a multisite network.
    async fn is_multisite(&self, prefix: &TablePrefix) -> Result<bool, SiteRegistryError>;

    /// Known site ids in ascending order, capped at the first 100.
    async fn list_sites(&self, prefix: &TablePrefix) -> Result<Vec<SiteId>, SiteRegistryError>;

    /// Resolves `site` if it exists.
    async fn find_site(
        &self,
        prefix: &TablePrefix,
        site: SiteId,
    ) -> Result<Option<SiteId>, SiteRegistryError>;
}
