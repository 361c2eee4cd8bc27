use async_trait::async_trait;
use wp_db_migrate_shared::{SiteId, TablePrefix};

use crate::errors::SiteRegistryError;
use crate::interfaces::SiteRegistry;

/// Site registry answering from a fixed list of sites.
#[derive(Debug, Clone, Default)]
pub struct MockSiteRegistry {
    multisite: bool,
    sites: Vec<SiteId>,
}

impl MockSiteRegistry {
    /// A plain single-site installation.
    pub fn single_site() -> Self {
        Self::default()
    }

    /// A multisite network with the given blog ids.
    pub fn multisite(ids: &[u64]) -> Self {
        let mut sites: Vec<SiteId> = ids.iter().copied().filter_map(SiteId::new).collect();
        sites.sort();
        Self {
            multisite: true,
            sites,
        }
    }
}

#[async_trait]
impl SiteRegistry for MockSiteRegistry {
    async fn is_multisite(&self, _prefix: &TablePrefix) -> Result<bool, SiteRegistryError> {
        Ok(self.multisite)
    }

    async fn list_sites(&self, _prefix: &TablePrefix) -> Result<Vec<SiteId>, SiteRegistryError> {
        Ok(self.sites.clone())
    }

    async fn find_site(
        &self,
        _prefix: &TablePrefix,
        site: SiteId,
    ) -> Result<Option<SiteId>, SiteRegistryError> {
        Ok(self.sites.iter().copied().find(|known| *known == site))
    }
}
