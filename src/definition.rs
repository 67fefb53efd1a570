//! Stat definitions.
//!
//! A `StatDefinition` is the immutable description of one stat: its name,
//! a description, and the default and bounds every entity's value is held
//! to. Definitions are supplied by configuration and shared behind an
//! `Arc`; registries reference them and never mutate them.

use crate::stat_id::StatId;
use serde::{Deserialize, Serialize};

/// Numeric type of every stat value.
pub type StatValue = f64;

/// Immutable description of a stat.
///
/// The bounds are expected to satisfy `min <= default <= max`. The registry
/// does not enforce this; [`StatDefinition::is_well_formed`] and the catalog
/// validation in [`crate::config`] can check it up front.
///
/// # Examples
///
/// ```rust
/// use statmod::StatDefinition;
///
/// let hp = StatDefinition::new("Health", 100.0, 0.0, 200.0)
///     .with_description("Hit points");
///
/// assert_eq!(hp.clamp(250.0), 200.0);
/// assert_eq!(hp.clamp(-5.0), 0.0);
/// assert!(hp.is_well_formed());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatDefinition {
    /// Unique name within a registry.
    pub name: StatId,
    /// Informational only.
    #[serde(default)]
    pub description: String,
    /// Base value used when no override is supplied.
    #[serde(rename = "default")]
    pub default_value: StatValue,
    /// Lower bound of the effective value.
    #[serde(rename = "min")]
    pub min_value: StatValue,
    /// Upper bound of the effective value.
    #[serde(rename = "max")]
    pub max_value: StatValue,
}

impl StatDefinition {
    /// Create a definition with an empty description.
    pub fn new(
        name: impl Into<StatId>,
        default_value: StatValue,
        min_value: StatValue,
        max_value: StatValue,
    ) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            default_value,
            min_value,
            max_value,
        }
    }

    /// Set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Clamp `value` into `[min_value, max_value]`.
    ///
    /// Never panics: with inverted bounds the upper bound wins, and a NaN
    /// input collapses onto the bounds.
    pub fn clamp(&self, value: StatValue) -> StatValue {
        value.max(self.min_value).min(self.max_value)
    }

    /// Whether `min <= default <= max` holds.
    pub fn is_well_formed(&self) -> bool {
        self.min_value <= self.default_value && self.default_value <= self.max_value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp_within_bounds() {
        let def = StatDefinition::new("Speed", 5.0, 1.0, 10.0);
        assert_eq!(def.clamp(7.5), 7.5);
        assert_eq!(def.clamp(1.0), 1.0);
        assert_eq!(def.clamp(10.0), 10.0);
    }

    #[test]
    fn test_clamp_inverted_bounds_does_not_panic() {
        let def = StatDefinition::new("Broken", 0.0, 10.0, 5.0);
        assert!(!def.is_well_formed());
        assert_eq!(def.clamp(7.0), 5.0);
    }

    #[test]
    fn test_clamp_nan() {
        let def = StatDefinition::new("Speed", 5.0, 1.0, 10.0);
        assert_eq!(def.clamp(f64::NAN), 1.0);
    }

    #[test]
    fn test_deserialize_short_field_names() {
        let def: StatDefinition = serde_json::from_str(
            r#"{ "name": "Armor", "default": 10, "min": 0, "max": 500 }"#,
        )
        .unwrap();
        assert_eq!(def.name.as_str(), "Armor");
        assert_eq!(def.description, "");
        assert_eq!(def.default_value, 10.0);
        assert_eq!(def.max_value, 500.0);
    }
}
