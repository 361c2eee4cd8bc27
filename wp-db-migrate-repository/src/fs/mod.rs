//! Filesystem access to `wp-config.php`.
mod wp_config;

pub use wp_config::{CONFIG_FILE_NAME, PrefixRewrite, WpConfigFile, rewrite_table_prefix};
