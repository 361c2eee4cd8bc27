//! Statements issued by the users table merge.
//!
//! Two users are the same when `ID`, `user_login` and `user_email` all
//! match. Every other source user is new and gets a fresh destination id.

use wp_db_migrate_shared::{Statement, TableName};

use super::{ProvenanceSource, REFERENCE_COLUMN, UserTables};

/// Columns copied for a new user, in insert order. `ID` is assigned by the
/// destination table.
const USER_COLUMNS: &str = "user_login, user_pass, user_nicename, user_email, user_url, \
user_registered, user_activation_key, user_status, display_name";

/// Matches a source row `src` against a destination row `dst`.
const SAME_USER: &str =
    "dst.ID = src.ID AND dst.user_login = src.user_login AND dst.user_email = src.user_email";

/// Source users that also exist in the destination.
fn common_user_ids(from: &UserTables, to: &UserTables) -> String {
    format!(
        "SELECT src.ID FROM {} AS src INNER JOIN {} AS dst ON {SAME_USER}",
        from.users, to.users
    )
}

/// Source users missing from the destination.
fn new_users(from: &UserTables, to: &UserTables) -> String {
    format!(
        "FROM {} AS src LEFT JOIN {} AS dst ON {SAME_USER} WHERE dst.ID IS NULL",
        from.users, to.users
    )
}

/// Source meta of common users whose (user_id, meta_key) is absent in the
/// destination.
fn missing_common_meta(from: &UserTables, to: &UserTables) -> String {
    format!(
        "FROM {} AS src_meta LEFT JOIN {} AS dst_meta \
         ON dst_meta.user_id = src_meta.user_id AND dst_meta.meta_key = src_meta.meta_key \
         WHERE dst_meta.meta_key IS NULL AND src_meta.user_id IN ({})",
        from.usermeta,
        to.usermeta,
        common_user_ids(from, to)
    )
}

pub(crate) fn count_common_meta(from: &UserTables, to: &UserTables) -> Statement {
    Statement::new(format!(
        "SELECT COUNT(*) AS common_meta_count {}",
        missing_common_meta(from, to)
    ))
}

pub(crate) fn insert_common_meta(from: &UserTables, to: &UserTables) -> Statement {
    Statement::new(format!(
        "INSERT INTO {} (user_id, meta_key, meta_value) \
         SELECT src_meta.user_id, src_meta.meta_key, src_meta.meta_value {} \
         ORDER BY src_meta.user_id",
        to.usermeta,
        missing_common_meta(from, to)
    ))
}

pub(crate) fn count_new_users(from: &UserTables, to: &UserTables) -> Statement {
    Statement::new(format!("SELECT COUNT(*) AS new_user_count {}", new_users(from, to)))
}

/// Counted on the source side so the number does not depend on whether the
/// users were imported yet.
pub(crate) fn count_new_user_meta(from: &UserTables, to: &UserTables) -> Statement {
    Statement::new(format!(
        "SELECT COUNT(*) AS new_user_meta_count FROM {} AS src_meta \
         WHERE src_meta.user_id IN (SELECT src.ID {})",
        from.usermeta,
        new_users(from, to)
    ))
}

pub(crate) fn reference_column_exists(users: &TableName) -> Statement {
    Statement::new(
        "SELECT COUNT(*) AS reference_columns FROM information_schema.columns \
         WHERE table_schema = DATABASE() AND table_name = ? AND column_name = ?",
    )
    .bind(users.as_str())
    .bind(REFERENCE_COLUMN)
}

pub(crate) fn add_reference_column(users: &TableName) -> Statement {
    Statement::new(format!("ALTER TABLE {users} ADD COLUMN {REFERENCE_COLUMN} BIGINT(20) UNSIGNED"))
}

pub(crate) fn drop_reference_column(users: &TableName) -> Statement {
    Statement::new(format!("ALTER TABLE {users} DROP COLUMN {REFERENCE_COLUMN}"))
}

pub(crate) fn insert_new_users(from: &UserTables, to: &UserTables) -> Statement {
    let selected = USER_COLUMNS
        .split(", ")
        .map(|column| format!("src.{column}"))
        .collect::<Vec<_>>()
        .join(", ");

    Statement::new(format!(
        "INSERT INTO {} ({USER_COLUMNS}, {REFERENCE_COLUMN}) SELECT {selected}, src.ID {} \
         ORDER BY src.ID",
        to.users,
        new_users(from, to)
    ))
}

/// Copies the meta of imported users, keyed by their new destination id.
pub(crate) fn insert_new_user_meta(from: &UserTables, to: &UserTables) -> Statement {
    Statement::new(format!(
        "INSERT INTO {} (user_id, meta_key, meta_value) \
         SELECT u.ID, src_meta.meta_key, src_meta.meta_value FROM {} AS src_meta \
         INNER JOIN {} AS u ON src_meta.user_id = u.{REFERENCE_COLUMN}",
        to.usermeta, from.usermeta, to.users
    ))
}

pub(crate) fn insert_provenance(
    to: &UserTables,
    source: ProvenanceSource,
    meta_key: &str,
) -> Statement {
    let sql = match source {
        ProvenanceSource::UsersTable => format!(
            "INSERT INTO {} (user_id, meta_key, meta_value) \
             SELECT u.ID, ?, u.{REFERENCE_COLUMN} FROM {} AS u \
             WHERE u.{REFERENCE_COLUMN} IS NOT NULL",
            to.usermeta, to.users
        ),
        ProvenanceSource::MetaTableLiteral => format!(
            "INSERT INTO {} (user_id, meta_key, meta_value) \
             SELECT m.ID, ?, m.{REFERENCE_COLUMN} FROM {} AS m",
            to.usermeta, to.usermeta
        ),
    };
    Statement::new(sql).bind(meta_key)
}

pub(crate) fn remap_post_authors(posts: &TableName, users: &TableName) -> Statement {
    Statement::new(format!(
        "UPDATE {posts} AS post INNER JOIN {users} AS u \
         ON post.post_author = u.{REFERENCE_COLUMN} SET post.post_author = u.ID"
    ))
}

pub(crate) fn remap_comment_users(comments: &TableName, users: &TableName) -> Statement {
    Statement::new(format!(
        "UPDATE {comments} AS comment INNER JOIN {users} AS u \
         ON comment.user_id = u.{REFERENCE_COLUMN} SET comment.user_id = u.ID"
    ))
}
