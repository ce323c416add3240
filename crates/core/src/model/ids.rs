use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier used when no user has been stored yet.
pub const GUEST_USER_ID: &str = "guest";

/// Identifier of the user whose progress is tracked.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    /// Creates a `UserId`, falling back to the guest id for blank input.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        let id = id.into();
        let trimmed = id.trim();
        if trimmed.is_empty() {
            return Self::guest();
        }
        if trimmed.len() == id.len() {
            Self(id)
        } else {
            Self(trimmed.to_owned())
        }
    }

    #[must_use]
    pub fn guest() -> Self {
        Self(GUEST_USER_ID.to_owned())
    }

    #[must_use]
    pub fn is_guest(&self) -> bool {
        self.0 == GUEST_USER_ID
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for UserId {
    fn default() -> Self {
        Self::guest()
    }
}

impl fmt::Debug for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "UserId({})", self.0)
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ─── Tests ─────────────────────────────────────────────────────────────────────
