//! Stat identifier module.
//!
//! Provides the `StatId` type, the name a stat is registered under.
//! Names are interned as `Arc<str>` so entries, modifiers and snapshots
//! can share them without reallocating.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::borrow::Borrow;
use std::sync::Arc;

/// Interned stat name.
///
/// Cloning is a reference-count bump. `StatId` borrows as `str`, so maps
/// keyed by `StatId` can be queried with a plain `&str`.
///
/// # Examples
///
/// ```rust
/// use statmod::StatId;
///
/// let hp = StatId::new("Health");
/// let hp2: StatId = "Health".into();
///
/// assert_eq!(hp, hp2);
/// assert_eq!(hp.as_str(), "Health");
/// ```
#[derive(Debug, Clone, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct StatId(Arc<str>);

impl StatId {
    /// Intern a stat name.
    pub fn new(name: impl AsRef<str>) -> Self {
        Self(Arc::from(name.as_ref()))
    }

    /// The stat name.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

// Serialized as the bare name, so config files write `stat = "Health"`.
impl Serialize for StatId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for StatId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Box::<str>::deserialize(deserializer).map(|name| StatId(Arc::from(name)))
    }
}

impl Borrow<str> for StatId {
    fn borrow(&self) -> &str {
        self.as_str()
    }
}

impl AsRef<str> for StatId {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl From<&str> for StatId {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for StatId {
    fn from(name: String) -> Self {
        Self(name.into())
    }
}

impl From<&StatId> for StatId {
    fn from(id: &StatId) -> Self {
        id.clone()
    }
}

impl std::fmt::Display for StatId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.as_str())
    }
}
