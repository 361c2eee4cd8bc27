//! This module defines and re-exports the collaborator interfaces used by the
//! migration engines.
mod config_file;
mod executor;
mod site_registry;

pub use config_file::ConfigFile;
pub use executor::SqlExecutor;
pub use site_registry::SiteRegistry;
