//! Statements issued by the prefix rename.

use wp_db_migrate_shared::{Statement, TableName, TablePrefix};

/// Tables in the current schema whose name starts with `prefix`.
pub(crate) fn discover_tables(prefix: &TablePrefix) -> Statement {
    Statement::new(
        "SELECT table_name FROM information_schema.tables \
         WHERE table_schema = DATABASE() AND table_name LIKE ? \
         ORDER BY table_name",
    )
    .bind(prefix.like_pattern())
}

pub(crate) fn rename_table(from: &TableName, to: &TableName) -> Statement {
    Statement::new(format!("RENAME TABLE {from} TO {to}"))
}

/// User meta keys that start with `prefix`, such as `wp_capabilities`.
pub(crate) fn prefixed_meta_keys(usermeta: &TableName, prefix: &TablePrefix) -> Statement {
    Statement::new(format!("SELECT meta_key FROM {usermeta} WHERE meta_key LIKE ?"))
        .bind(prefix.like_pattern())
}

pub(crate) fn rename_meta_key(usermeta: &TableName, from: &str, to: &str) -> Statement {
    Statement::new(format!("UPDATE {usermeta} SET meta_key = ? WHERE meta_key = ? LIMIT 1"))
        .bind(to)
        .bind(from)
}

pub(crate) fn rename_option(options: &TableName, from: &str, to: &str) -> Statement {
    Statement::new(format!("UPDATE {options} SET option_name = ? WHERE option_name = ? LIMIT 1"))
        .bind(to)
        .bind(from)
}
