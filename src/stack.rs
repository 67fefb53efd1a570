//! Per-stat modifier stacks.
//!
//! A `ModifierStack` is the ordered set of modifiers currently active on
//! one stat. The effective value is never stored; it is recomputed from
//! the base value and the stack as a pure fold:
//!
//! ```text
//! (base + Σ flat) × (1 + Σ percent_add) × Π percent_mult
//! ```
//!
//! Within each kind the magnitudes are combined in a canonical order
//! (sorted by `f64::total_cmp`), so the result depends only on the set of
//! active modifiers and never on the order they were applied or removed.
//! Removing a modifier is a deletion from the set; there is no algebraic
//! undo and nothing accumulates across apply/remove cycles.

use crate::definition::StatValue;
use crate::modifier::{ModifierId, ModifierKind};
use serde::{Deserialize, Serialize};

/// One active modifier as recorded on a stat.
///
/// The registry stores this value copy keyed by [`ModifierId`]; it never
/// owns the caller's [`crate::Modifier`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StackedModifier {
    pub id: ModifierId,
    pub kind: ModifierKind,
    pub magnitude: StatValue,
}

/// Combined contribution of a stack, grouped by kind.
///
/// # Examples
///
/// ```rust
/// use statmod::{ModifierId, ModifierKind, ModifierStack, StackedModifier};
///
/// let mut stack = ModifierStack::new();
/// stack.push(StackedModifier { id: ModifierId::next(), kind: ModifierKind::Flat, magnitude: 20.0 });
/// stack.push(StackedModifier { id: ModifierId::next(), kind: ModifierKind::PercentAdd, magnitude: 0.5 });
///
/// let totals = stack.totals();
/// assert_eq!(totals.flat, 20.0);
/// assert_eq!(totals.apply(100.0), 180.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StackTotals {
    /// Sum of all flat magnitudes.
    pub flat: StatValue,
    /// Sum of all additive-percentage magnitudes.
    pub percent_add: StatValue,
    /// Product of all multiplicative magnitudes.
    pub percent_mult: StatValue,
    pub flat_count: usize,
    pub percent_add_count: usize,
    pub percent_mult_count: usize,
}

impl StackTotals {
    /// Fold the totals onto a base value. The result is not clamped.
    ///
    /// Empty groups are skipped, so an empty stack returns `base` exactly.
    pub fn apply(&self, base: StatValue) -> StatValue {
        let mut value = base;
        if self.flat_count > 0 {
            value += self.flat;
        }
        if self.percent_add_count > 0 {
            value *= 1.0 + self.percent_add;
        }
        if self.percent_mult_count > 0 {
            value *= self.percent_mult;
        }
        value
    }
}

/// Ordered collection of the modifiers active on one stat.
///
/// Registration order is preserved for inspection; it does not influence
/// the computed value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModifierStack {
    entries: Vec<StackedModifier>,
}

impl ModifierStack {
    /// Empty stack.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a modifier. Returns `false` (and changes nothing) if a modifier
    /// with the same id is already present.
    pub fn push(&mut self, modifier: StackedModifier) -> bool {
        if self.contains(modifier.id) {
            return false;
        }
        self.entries.push(modifier);
        true
    }

    /// Remove the modifier with `id`, keeping the order of the rest.
    pub fn remove(&mut self, id: ModifierId) -> Option<StackedModifier> {
        let pos = self.entries.iter().position(|m| m.id == id)?;
        Some(self.entries.remove(pos))
    }

    /// Whether a modifier with `id` is active.
    pub fn contains(&self, id: ModifierId) -> bool {
        self.entries.iter().any(|m| m.id == id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Active modifiers in registration order.
    pub fn as_slice(&self) -> &[StackedModifier] {
        &self.entries
    }

    pub fn iter(&self) -> impl Iterator<Item = &StackedModifier> {
        self.entries.iter()
    }

    /// Drop every modifier, returning them in registration order.
    pub fn drain(&mut self) -> Vec<StackedModifier> {
        std::mem::take(&mut self.entries)
    }

    /// Combine the stack by kind.
    pub fn totals(&self) -> StackTotals {
        let mut flat = Vec::new();
        let mut percent_add = Vec::new();
        let mut percent_mult = Vec::new();

        for modifier in &self.entries {
            match modifier.kind {
                ModifierKind::Flat => flat.push(modifier.magnitude),
                ModifierKind::PercentAdd => percent_add.push(modifier.magnitude),
                ModifierKind::PercentMult => percent_mult.push(modifier.magnitude),
            }
        }

        StackTotals {
            flat_count: flat.len(),
            percent_add_count: percent_add.len(),
            percent_mult_count: percent_mult.len(),
            flat: canonical_sum(flat),
            percent_add: canonical_sum(percent_add),
            percent_mult: canonical_product(percent_mult),
        }
    }

    /// Unclamped effective value for `base`.
    pub fn evaluate(&self, base: StatValue) -> StatValue {
        self.totals().apply(base)
    }
}

// Floating-point addition and multiplication are commutative but not
// associative; a fixed operand order makes the fold bit-reproducible for
// any permutation of the same multiset.
fn canonical_sum(mut values: Vec<StatValue>) -> StatValue {
    values.sort_by(|a, b| a.total_cmp(b));
    values.into_iter().fold(0.0, |acc, v| acc + v)
}

fn canonical_product(mut values: Vec<StatValue>) -> StatValue {
    values.sort_by(|a, b| a.total_cmp(b));
    values.into_iter().fold(1.0, |acc, v| acc * v)
}
