//! Normalized usernames.

use std::fmt;

use crate::error::{Error, Result};

/// Prefix applied to every profile cache key.
const CACHE_KEY_PREFIX: &str = "p:";

/// Base URL of public profile pages, used for the upstream referer.
const PROFILE_PAGE_BASE: &str = "https://www.instagram.com";

/// A username that has been trimmed, stripped of one leading `@`, and
/// lower-cased. Never empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Username(String);

impl Username {
    /// Normalize raw user input.
    ///
    /// `@Foo`, `foo` and `FOO ` all produce `foo`.
    pub fn parse(raw: &str) -> Result<Self> {
        let trimmed = raw.trim();
        let bare = trimmed.strip_prefix('@').unwrap_or(trimmed);
        let normalized = bare.to_lowercase();

        if normalized.is_empty() {
            return Err(Error::EmptyUsername);
        }

        Ok(Self(normalized))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Key under which this user's normalized profile is cached.
    pub fn cache_key(&self) -> String {
        format!("{CACHE_KEY_PREFIX}{}", self.0)
    }

    /// Public profile page URL for this user.
    pub fn profile_url(&self) -> String {
        format!("{PROFILE_PAGE_BASE}/{}/", self.0)
    }
}

impl fmt::Display for Username {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Username {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
