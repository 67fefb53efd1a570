//! Resolved stat results module.
//!
//! Contains the `ResolvedStat` type: one evaluation of a stat with the
//! intermediate value after each group of the fold, for debug overlays
//! and logging.

use crate::definition::{StatDefinition, StatValue};
use crate::modifier::ModifierKind;
use crate::stack::{ModifierStack, StackTotals};
use crate::stat_id::StatId;
use serde::{Deserialize, Serialize};

/// A stat value with a full breakdown of how it was computed.
///
/// `value` is bit-identical to what [`crate::StatRegistry::get_value`]
/// returns for the same state.
///
/// # Examples
///
/// ```rust
/// use statmod::{Modifier, StatComponent, StatDefinition};
///
/// let unit = StatComponent::new("unit");
/// unit.add_stat(StatDefinition::new("Damage", 10.0, 0.0, 100.0)).unwrap();
/// Modifier::flat(&unit, "Damage", 5.0).apply().unwrap();
///
/// let resolved = unit.resolve("Damage").unwrap();
/// assert_eq!(resolved.base_value, 10.0);
/// assert_eq!(resolved.value, 15.0);
/// assert_eq!(resolved.steps.len(), 3); // base, flat, clamp
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedStat {
    pub stat_id: StatId,
    /// Stored base value, before any modifier.
    pub base_value: StatValue,
    /// Sum of active flat modifiers.
    pub flat: StatValue,
    /// Sum of active additive percentages.
    pub percent_add: StatValue,
    /// Product of active multiplicative factors.
    pub percent_mult: StatValue,
    /// Number of modifiers that contributed.
    pub modifier_count: usize,
    /// Folded value before clamping.
    pub unclamped: StatValue,
    /// Final, clamped value.
    pub value: StatValue,

    /// Each entry is `(step_description, value_after_step)`, in fold order.
    pub steps: Vec<(String, StatValue)>,
}

impl ResolvedStat {
    /// Evaluate `stack` over `base_value` and clamp with `definition`.
    pub fn compute(definition: &StatDefinition, base_value: StatValue, stack: &ModifierStack) -> Self {
        let totals = stack.totals();
        let unclamped = totals.apply(base_value);
        let value = definition.clamp(unclamped);

        Self {
            stat_id: definition.name.clone(),
            base_value,
            flat: totals.flat,
            percent_add: totals.percent_add,
            percent_mult: totals.percent_mult,
            modifier_count: stack.len(),
            unclamped,
            value,
            steps: Self::steps(definition, base_value, &totals, value),
        }
    }

    fn steps(
        definition: &StatDefinition,
        base_value: StatValue,
        totals: &StackTotals,
        value: StatValue,
    ) -> Vec<(String, StatValue)> {
        let mut steps = vec![("base".to_string(), base_value)];
        let mut current = base_value;

        if totals.flat_count > 0 {
            current += totals.flat;
            steps.push((
                format!("{} flat ({})", ModifierKind::Flat.describe(totals.flat), totals.flat_count),
                current,
            ));
        }
        if totals.percent_add_count > 0 {
            current *= 1.0 + totals.percent_add;
            steps.push((
                format!(
                    "{} ({})",
                    ModifierKind::PercentAdd.describe(totals.percent_add),
                    totals.percent_add_count
                ),
                current,
            ));
        }
        if totals.percent_mult_count > 0 {
            current *= totals.percent_mult;
            steps.push((
                format!(
                    "{} ({})",
                    ModifierKind::PercentMult.describe(totals.percent_mult),
                    totals.percent_mult_count
                ),
                current,
            ));
        }

        steps.push((
            format!("clamp [{}, {}]", definition.min_value, definition.max_value),
            value,
        ));
        steps
    }

    /// Whether clamping changed the folded value.
    pub fn was_clamped(&self) -> bool {
        self.unclamped.to_bits() != self.value.to_bits()
    }
}
