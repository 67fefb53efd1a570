//! Error types for stat queries and modifier activation.
//!
//! Every condition here is recoverable. A missing stat must never bring
//! down gameplay code, so operations report a `StatError` instead of
//! panicking and leave the registry untouched.

use crate::stat_id::StatId;
use thiserror::Error;

/// Errors reported by the registry and by modifiers.
///
/// # Examples
///
/// ```rust
/// use statmod::{StatError, StatId};
///
/// let err = StatError::UnknownStat(StatId::new("Health"));
/// assert_eq!(err.to_string(), "Unknown stat: Health");
/// ```
#[derive(Debug, Error, Clone, PartialEq)]
pub enum StatError {
    /// The stat name is not present in the registry.
    ///
    /// Gameplay code may probe for optional stats, so this is reported
    /// rather than treated as a fault.
    #[error("Unknown stat: {0}")]
    UnknownStat(StatId),

    /// A modifier could not reach its target stat.
    ///
    /// Raised when the bound registry has no stat with the modifier's
    /// target name at apply time, or when the registry no longer exists.
    #[error("Invalid modifier target {stat}: {reason}")]
    InvalidTarget { stat: StatId, reason: TargetFailure },

    /// A stat with this name already exists; the original entry was kept.
    #[error("Duplicate stat: {0}")]
    DuplicateStat(StatId),

    /// The registry was already borrowed when a write to this stat was
    /// attempted, e.g. from inside [`StatComponent::with_registry`].
    /// Nothing was changed.
    ///
    /// [`StatComponent::with_registry`]: crate::StatComponent::with_registry
    #[error("Stat registry is busy, cannot write {0}")]
    RegistryBusy(StatId),
}

/// Why a modifier target was rejected.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum TargetFailure {
    /// The registry is alive but has no stat with this name.
    #[error("stat not present on target registry")]
    MissingStat,

    /// The registry the modifier was bound to has been dropped.
    #[error("target registry was dropped")]
    RegistryDropped,
}

impl StatError {
    /// The stat name the error refers to.
    pub fn stat(&self) -> &StatId {
        match self {
            StatError::UnknownStat(stat)
            | StatError::DuplicateStat(stat)
            | StatError::RegistryBusy(stat) => stat,
            StatError::InvalidTarget { stat, .. } => stat,
        }
    }

    pub(crate) fn missing_target(stat: &StatId) -> Self {
        StatError::InvalidTarget {
            stat: stat.clone(),
            reason: TargetFailure::MissingStat,
        }
    }

    pub(crate) fn dropped_target(stat: &StatId) -> Self {
        StatError::InvalidTarget {
            stat: stat.clone(),
            reason: TargetFailure::RegistryDropped,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = StatError::DuplicateStat(StatId::new("Armor"));
        assert!(err.to_string().contains("Armor"));
    }

    #[test]
    fn test_invalid_target_display() {
        let err = StatError::dropped_target(&StatId::new("Speed"));
        let display = err.to_string();
        assert!(display.contains("Speed"));
        assert!(display.contains("dropped"));
        assert_eq!(err.stat().as_str(), "Speed");
    }

    #[test]
    fn test_registry_busy_display() {
        let err = StatError::RegistryBusy(StatId::new("Mana"));
        assert_eq!(err.to_string(), "Stat registry is busy, cannot write Mana");
        assert_eq!(err.stat().as_str(), "Mana");
    }
}
