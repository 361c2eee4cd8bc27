//! Error types for the repository collaborators.
mod config_file;
mod executor;
mod site_registry;

pub use config_file::ConfigFileError;
pub use executor::ExecutorError;
pub use site_registry::SiteRegistryError;
