use serde::{Deserialize, Serialize};
use std::fmt;

const SYNTHETIC_PREFIX: &str = "name:";

/// Stable identity for one advertising group across its lifetime. Backed by
/// the platform ad-set id when one is known, otherwise by a synthetic key
/// derived from the canonical label (best effort across renames).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GroupKey(String);

impl GroupKey {
    pub fn ad_set(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn synthetic(canonical_name: &str) -> Self {
        Self(format!("{SYNTHETIC_PREFIX}{canonical_name}"))
    }

    pub fn is_synthetic(&self) -> bool {
        self.0.starts_with(SYNTHETIC_PREFIX)
    }

    /// The underlying ad-set id, if this key is backed by one.
    pub fn ad_set_id(&self) -> Option<&str> {
        if self.is_synthetic() {
            None
        } else {
            Some(&self.0)
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for GroupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
