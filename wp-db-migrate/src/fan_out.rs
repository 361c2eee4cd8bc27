//! Per-site table prefixes and site selection for multisite networks.

use tracing::info;
use wp_db_migrate_repository::SiteRegistry;
use wp_db_migrate_shared::{IdentifierError, SiteId, SiteSelection, TablePrefix};

use crate::errors::MigrationError;

/// How a site's content table prefix is derived when remapping authors.
///
/// Role options are always addressed through [`TablePrefix::for_site`];
/// this only governs the posts and comments tables of the merge.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SitePrefixScheme {
    /// `wp_` for the main site, `2_` for site 2, whatever the base prefix.
    #[default]
    Bare,
    /// `wp_` for the main site, `wp_2_` for site 2.
    Nested,
}

impl SitePrefixScheme {
    pub fn site_prefix(
        self,
        base: &TablePrefix,
        site: SiteId,
    ) -> Result<TablePrefix, IdentifierError> {
        match self {
            Self::Nested => Ok(base.for_site(site)),
            Self::Bare if site.is_main() => Ok(base.clone()),
            Self::Bare => TablePrefix::new(site.bare_prefix()),
        }
    }
}

/// Resolves `selection` against the sites of the network under `prefix`.
///
/// `All` yields every listed site including the main one; a single id must
/// exist in the registry.
pub async fn resolve_sites(
    registry: &dyn SiteRegistry,
    prefix: &TablePrefix,
    selection: SiteSelection,
) -> Result<Vec<SiteId>, MigrationError> {
    match selection {
        SiteSelection::All => {
            let sites = registry.list_sites(prefix).await?;
            if sites.is_empty() {
                return Err(MigrationError::NoSitesToRemap);
            }
            info!(count = sites.len(), "Selected all sites");
            Ok(sites)
        }
        SiteSelection::Single(site) => match registry.find_site(prefix, site).await? {
            Some(site) => Ok(vec![site]),
            None => Err(MigrationError::SiteNotFound(site)),
        },
    }
}

/// Every listed site except the main one.
///
/// An empty listing is an error: a multisite network always has at least
/// its main site.
pub async fn secondary_sites(
    registry: &dyn SiteRegistry,
    prefix: &TablePrefix,
) -> Result<Vec<SiteId>, MigrationError> {
    let sites = registry.list_sites(prefix).await?;
    if sites.is_empty() {
        return Err(MigrationError::NoRoleOptionSites);
    }
    Ok(sites.into_iter().filter(|site| !site.is_main()).collect())
}
