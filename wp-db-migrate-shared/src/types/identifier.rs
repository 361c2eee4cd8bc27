//! Validated SQL identifiers.
//!
//! Table names are the only pieces of SQL text built from operator input, so
//! they go through an allow-list instead of being escaped. Anything that is a
//! value (meta keys, option names) is bound as a parameter instead.
use std::fmt;

use serde::Serialize;
use thiserror::Error;

use crate::types::SiteId;

/// MySQL's limit on identifier length.
const MAX_IDENTIFIER_LEN: usize = 64;

/// Errors raised when a prefix or table name fails validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdentifierError {
    #[error("Identifier is empty")]
    Empty,

    #[error("Identifier `{0}` is longer than 64 characters")]
    TooLong(String),

    #[error("Identifier `{0}` contains characters outside the allowed set")]
    InvalidCharacter(String),

    #[error("Prefixes `{0}` and `{1}` overlap; one must not start with the other")]
    Overlapping(String, String),
}

fn validate(value: &str, allowed: impl Fn(char) -> bool) -> Result<(), IdentifierError> {
    if value.is_empty() {
        return Err(IdentifierError::Empty);
    }
    if value.len() > MAX_IDENTIFIER_LEN {
        return Err(IdentifierError::TooLong(value.to_string()));
    }
    if !value.chars().all(allowed) {
        return Err(IdentifierError::InvalidCharacter(value.to_string()));
    }
    Ok(())
}

/// A table name prefix such as `wp_`.
///
/// Restricted to ASCII letters, digits and underscores.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct TablePrefix(String);

impl TablePrefix {
    pub fn new(value: impl Into<String>) -> Result<Self, IdentifierError> {
        let value = value.into();
        validate(&value, |c| c.is_ascii_alphanumeric() || c == '_')?;
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Builds the name of the table `suffix` under this prefix.
    pub fn table(&self, suffix: &str) -> Result<TableName, IdentifierError> {
        TableName::new(format!("{}{}", self.0, suffix))
    }

    /// Returns the suffix of `name` if it starts with this prefix.
    pub fn strip<'a>(&self, name: &'a str) -> Option<&'a str> {
        name.strip_prefix(self.0.as_str())
    }

    /// Prefix used by the tables of `site`.
    ///
    /// The main site shares the base prefix; every other site appends its id,
    /// so site 3 of `wp_` lives under `wp_3_`.
    pub fn for_site(&self, site: SiteId) -> TablePrefix {
        if site.is_main() {
            self.clone()
        } else {
            TablePrefix(format!("{}{}_", self.0, site))
        }
    }

    /// `LIKE` pattern matching every name that starts with this prefix.
    ///
    /// `_` is a single-character wildcard in `LIKE`, so it is escaped along
    /// with `%` and the escape character itself.
    pub fn like_pattern(&self) -> String {
        let mut pattern = String::with_capacity(self.0.len() * 2 + 1);
        for c in self.0.chars() {
            if matches!(c, '\\' | '%' | '_') {
                pattern.push('\\');
            }
            pattern.push(c);
        }
        pattern.push('%');
        pattern
    }

    /// True when either prefix is a leading substring of the other.
    pub fn overlaps(&self, other: &TablePrefix) -> bool {
        self.0.starts_with(other.as_str()) || other.0.starts_with(self.as_str())
    }

    /// Rejects prefix pairs that cannot be migrated between safely.
    pub fn ensure_disjoint(&self, other: &TablePrefix) -> Result<(), IdentifierError> {
        if self.overlaps(other) {
            return Err(IdentifierError::Overlapping(
                self.0.clone(),
                other.0.clone(),
            ));
        }
        Ok(())
    }
}

impl fmt::Display for TablePrefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for TablePrefix {
    type Err = IdentifierError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

/// A validated table name. `Display` renders it back-quoted for use in SQL.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct TableName(String);

impl TableName {
    pub fn new(value: impl Into<String>) -> Result<Self, IdentifierError> {
        let value = value.into();
        validate(&value, |c| c.is_ascii_alphanumeric() || c == '_' || c == '$')?;
        Ok(Self(value))
    }

    /// The bare name, without quoting.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TableName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "`{}`", self.0)
    }
}
