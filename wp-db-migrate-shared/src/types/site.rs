//! Site (tenant) identifiers of a multisite installation.
use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use thiserror::Error;

/// Raised when a site id or selection cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid site `{0}`: expected a positive site id or `all`")]
pub struct InvalidSite(pub String);

/// A positive blog id. Site 1 is the main site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct SiteId(u64);

impl SiteId {
    pub const MAIN: SiteId = SiteId(1);

    pub fn new(id: u64) -> Option<Self> {
        (id > 0).then_some(Self(id))
    }

    pub fn get(self) -> u64 {
        self.0
    }

    pub fn is_main(self) -> bool {
        self == Self::MAIN
    }

    /// Prefix made of the site id alone, e.g. `2_`.
    pub fn bare_prefix(self) -> String {
        format!("{}_", self.0)
    }
}

impl fmt::Display for SiteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for SiteId {
    type Err = InvalidSite;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<u64>()
            .ok()
            .and_then(Self::new)
            .ok_or_else(|| InvalidSite(s.to_string()))
    }
}

/// Which sites a multisite operation should touch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SiteSelection {
    All,
    Single(SiteId),
}

impl fmt::Display for SiteSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => f.write_str("all"),
            Self::Single(site) => write!(f, "{site}"),
        }
    }
}

impl FromStr for SiteSelection {
    type Err = InvalidSite;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.eq_ignore_ascii_case("all") {
            return Ok(Self::All);
        }
        trimmed.parse().map(Self::Single)
    }
}
