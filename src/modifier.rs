//! Stat modifiers.
//!
//! A [`Modifier`] is a caller-owned value describing one transformation of
//! one stat, plus an `Inactive -> Active -> Inactive` state machine. It is
//! bound to a [`StatComponent`] through a weak back-reference: the
//! component's lifetime is independent of every modifier pointing at it,
//! and a modifier whose component is gone fails softly.

use crate::component::{StatComponent, WeakStatComponent};
use crate::definition::StatValue;
use crate::error::StatError;
use crate::stack::StackedModifier;
use crate::stat_id::StatId;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, warn};

/// How a modifier combines with the base value.
///
/// Kinds are folded in a fixed group order: all `Flat` first, then the
/// summed `PercentAdd`, then the chained `PercentMult`.
///
/// # Examples
///
/// ```rust
/// use statmod::ModifierKind;
///
/// assert_eq!(ModifierKind::Flat.describe(-5.0), "-5.00");
/// assert_eq!(ModifierKind::PercentMult.describe(1.3), "×1.30");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ModifierKind {
    /// Additive constant, e.g. `+10`.
    Flat,
    /// Additive percentage; instances sum before applying (`+10% + 20% = +30%`).
    PercentAdd,
    /// Multiplicative factor; instances compound (`1.1 × 1.2 = 1.32`).
    PercentMult,
}

impl ModifierKind {
    /// Human-readable description of a magnitude of this kind.
    pub fn describe(self, magnitude: StatValue) -> String {
        match self {
            ModifierKind::Flat => format!("{:+.2}", magnitude),
            ModifierKind::PercentAdd => format!("{:+.1}% (additive)", magnitude * 100.0),
            ModifierKind::PercentMult => format!("×{:.2}", magnitude),
        }
    }
}

/// Stable identifier of a modifier.
///
/// Registries key their active sets by id rather than by reference, so a
/// modifier can be moved or dropped without invalidating anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ModifierId(u64);

static NEXT_MODIFIER_ID: AtomicU64 = AtomicU64::new(1);

impl ModifierId {
    /// Allocate a fresh, process-unique id.
    pub fn next() -> Self {
        Self(NEXT_MODIFIER_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl std::fmt::Display for ModifierId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Activation state of a modifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ModifierState {
    #[default]
    Inactive,
    Active,
}

/// A reversible transformation of one stat on one component.
///
/// `apply` registers the modifier in the target stat's active set and
/// `remove` deregisters it. Both are idempotent. The stat's value is
/// recomputed from scratch on the next read, so removal restores exactly
/// the value the stat would have had without this modifier, whatever order
/// other modifiers were applied or removed in.
///
/// # Examples
///
/// ```rust
/// use statmod::{Modifier, StatComponent, StatDefinition};
///
/// let player = StatComponent::new("player");
/// player.add_stat(StatDefinition::new("Health", 100.0, 0.0, 200.0)).unwrap();
///
/// let mut potion = Modifier::flat(&player, "Health", 20.0);
/// potion.apply().unwrap();
/// assert_eq!(player.get_value("Health"), 120.0);
///
/// potion.remove().unwrap();
/// assert_eq!(player.get_value("Health"), 100.0);
/// ```
#[derive(Debug)]
pub struct Modifier {
    id: ModifierId,
    target_stat: StatId,
    kind: ModifierKind,
    magnitude: StatValue,
    target: WeakStatComponent,
    state: ModifierState,
}

impl Modifier {
    /// Create an inactive modifier bound to `target`.
    pub fn new(
        target: &StatComponent,
        stat: impl Into<StatId>,
        kind: ModifierKind,
        magnitude: StatValue,
    ) -> Self {
        Self {
            id: ModifierId::next(),
            target_stat: stat.into(),
            kind,
            magnitude,
            target: target.downgrade(),
            state: ModifierState::Inactive,
        }
    }

    /// Flat modifier: adds `amount` before any percentage applies.
    pub fn flat(target: &StatComponent, stat: impl Into<StatId>, amount: StatValue) -> Self {
        Self::new(target, stat, ModifierKind::Flat, amount)
    }

    /// `percent` is a fraction: `0.1` adds 10% of the flat-adjusted value.
    pub fn percent_add(target: &StatComponent, stat: impl Into<StatId>, percent: StatValue) -> Self {
        Self::new(target, stat, ModifierKind::PercentAdd, percent)
    }

    /// `factor` multiplies directly: `1.2` is +20%, `0.8` is -20%.
    pub fn percent_mult(target: &StatComponent, stat: impl Into<StatId>, factor: StatValue) -> Self {
        Self::new(target, stat, ModifierKind::PercentMult, factor)
    }

    /// Id under which the registry records this modifier.
    pub fn id(&self) -> ModifierId {
        self.id
    }

    /// Name of the stat this modifier acts on.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use statmod::{Modifier, ModifierKind, StatComponent};
    ///
    /// let wolf = StatComponent::new("wolf");
    /// let howl = Modifier::percent_add(&wolf, "Damage", 0.25);
    ///
    /// assert_eq!(howl.target_stat().as_str(), "Damage");
    /// assert_eq!(howl.kind(), ModifierKind::PercentAdd);
    /// assert_eq!(howl.magnitude(), 0.25);
    /// assert!(!howl.is_active());
    /// ```
    pub fn target_stat(&self) -> &StatId {
        &self.target_stat
    }

    pub fn kind(&self) -> ModifierKind {
        self.kind
    }

    pub fn magnitude(&self) -> StatValue {
        self.magnitude
    }

    /// The component this modifier is bound to, if it still exists.
    pub fn target(&self) -> Option<StatComponent> {
        self.target.upgrade()
    }

    /// Whether this modifier's effect is currently part of its stat.
    ///
    /// This checks the registry as well as the local state. A modifier
    /// reports `false` even if `remove` was never called when its stat was
    /// removed or cleared, or its component was dropped.
    pub fn is_active(&self) -> bool {
        self.state == ModifierState::Active
            && self.target.upgrade().is_some_and(|component| {
                component.is_registered(self.target_stat.as_str(), self.id)
            })
    }

    /// Observable state; see [`Modifier::is_active`].
    pub fn state(&self) -> ModifierState {
        if self.is_active() {
            ModifierState::Active
        } else {
            ModifierState::Inactive
        }
    }

    /// The value copy the registry records for this modifier.
    pub fn stacked(&self) -> StackedModifier {
        StackedModifier {
            id: self.id,
            kind: self.kind,
            magnitude: self.magnitude,
        }
    }

    /// Activate the modifier.
    ///
    /// No-op if already active. Fails with `InvalidTarget` if the bound
    /// component has no stat named [`Modifier::target_stat`] or no longer
    /// exists, and with `RegistryBusy` if called from inside
    /// [`StatComponent::with_registry`]. The modifier stays inactive on
    /// failure.
    pub fn apply(&mut self) -> Result<(), StatError> {
        if self.is_active() {
            return Ok(());
        }

        let Some(component) = self.target.upgrade() else {
            self.state = ModifierState::Inactive;
            warn!(modifier = %self.id, stat = %self.target_stat, "apply on modifier whose registry was dropped");
            return Err(StatError::dropped_target(&self.target_stat));
        };

        match component.register(self.target_stat.as_str(), self.stacked()) {
            Ok(_) => {
                self.state = ModifierState::Active;
                debug!(
                    owner = %component.owner(),
                    modifier = %self.id,
                    stat = %self.target_stat,
                    change = %self.kind.describe(self.magnitude),
                    "modifier applied"
                );
                Ok(())
            }
            Err(StatError::UnknownStat(_)) => {
                self.state = ModifierState::Inactive;
                warn!(
                    owner = %component.owner(),
                    modifier = %self.id,
                    stat = %self.target_stat,
                    "modifier target stat not found"
                );
                Err(StatError::missing_target(&self.target_stat))
            }
            Err(err) => {
                self.state = ModifierState::Inactive;
                Err(err)
            }
        }
    }

    /// Deactivate the modifier.
    ///
    /// No-op if the modifier was never applied or was already removed.
    /// If its stat was removed in the meantime this reports `UnknownStat`,
    /// and if its component was dropped it reports `InvalidTarget`; the
    /// modifier is inactive afterwards in both cases. Called from inside
    /// [`StatComponent::with_registry`] it reports `RegistryBusy` and
    /// stays active.
    pub fn remove(&mut self) -> Result<(), StatError> {
        if self.state == ModifierState::Inactive {
            return Ok(());
        }

        let Some(component) = self.target.upgrade() else {
            self.state = ModifierState::Inactive;
            warn!(modifier = %self.id, stat = %self.target_stat, "remove on modifier whose registry was dropped");
            return Err(StatError::dropped_target(&self.target_stat));
        };

        match component.deregister(self.target_stat.as_str(), self.id) {
            Err(err @ StatError::RegistryBusy(_)) => Err(err),
            Ok(removed) => {
                self.state = ModifierState::Inactive;
                debug!(
                    owner = %component.owner(),
                    modifier = %self.id,
                    stat = %self.target_stat,
                    was_registered = removed.is_some(),
                    "modifier removed"
                );
                Ok(())
            }
            Err(err) => {
                self.state = ModifierState::Inactive;
                warn!(
                    owner = %component.owner(),
                    modifier = %self.id,
                    stat = %self.target_stat,
                    "remove on orphaned modifier"
                );
                Err(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definition::StatDefinition;

    fn component() -> StatComponent {
        let component = StatComponent::new("test");
        component
            .add_stat(StatDefinition::new("Health", 100.0, 0.0, 200.0))
            .unwrap();
        component
    }

    #[test]
    fn test_ids_are_unique() {
        let a = ModifierId::next();
        let b = ModifierId::next();
        assert_ne!(a, b);
        assert!(b > a);
    }

    #[test]
    fn test_starts_inactive() {
        let c = component();
        let m = Modifier::flat(&c, "Health", 10.0);
        assert_eq!(m.state(), ModifierState::Inactive);
        assert_eq!(c.get_value("Health"), 100.0);
    }

    #[test]
    fn test_apply_twice_is_idempotent() {
        let c = component();
        let mut m = Modifier::flat(&c, "Health", 10.0);
        m.apply().unwrap();
        m.apply().unwrap();
        assert_eq!(c.get_value("Health"), 110.0);
        assert_eq!(c.modifiers("Health").unwrap().len(), 1);
    }

    #[test]
    fn test_remove_inactive_is_noop() {
        let c = component();
        let mut m = Modifier::percent_add(&c, "Health", 0.5);
        assert!(m.remove().is_ok());
        assert_eq!(c.get_value("Health"), 100.0);
    }

    #[test]
    fn test_apply_unknown_target() {
        let c = component();
        let mut m = Modifier::flat(&c, "Mana", 10.0);
        let err = m.apply().unwrap_err();
        assert_eq!(err, StatError::missing_target(&StatId::new("Mana")));
        assert!(!m.is_active());
    }

    #[test]
    fn test_dropped_component() {
        let c = component();
        let mut m = Modifier::percent_mult(&c, "Health", 1.5);
        m.apply().unwrap();
        drop(c);

        assert!(!m.is_active());
        assert!(m.target().is_none());
        assert_eq!(
            m.remove().unwrap_err(),
            StatError::dropped_target(&StatId::new("Health"))
        );
        assert_eq!(
            m.apply().unwrap_err(),
            StatError::dropped_target(&StatId::new("Health"))
        );
    }

    #[test]
    fn test_describe() {
        assert_eq!(ModifierKind::Flat.describe(20.0), "+20.00");
        assert_eq!(ModifierKind::Flat.describe(-5.0), "-5.00");
        assert_eq!(ModifierKind::PercentAdd.describe(0.5), "+50.0% (additive)");
    }
}
