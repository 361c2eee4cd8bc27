//! Site registry backed by the installation's own `blogs` table.
mod sql;

pub use sql::{SqlSiteRegistry, SITE_LIST_LIMIT};
