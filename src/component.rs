//! Shared stat component handle.
//!
//! `StatComponent` wraps one entity's [`StatRegistry`] so that gameplay
//! code and the modifiers it creates can both reach it. Modifiers hold a
//! [`WeakStatComponent`]; dropping the last component handle destroys the
//! registry, and modifiers bound to it fail softly from then on.
//!
//! The handle is single-threaded (`Rc<RefCell<_>>`): all operations for an
//! entity are expected to run on its update thread. Hosts that need
//! cross-thread access must put their own lock or queue in front of it.

use crate::definition::{StatDefinition, StatValue};
use crate::error::StatError;
use crate::modifier::{Modifier, ModifierId, ModifierKind};
use crate::registry::{StatEntry, StatRegistry};
use crate::resolved::ResolvedStat;
use crate::stack::StackedModifier;
use crate::stat_id::StatId;
use std::cell::{RefCell, RefMut};
use std::collections::{BTreeMap, HashMap};
use std::rc::{Rc, Weak};
use std::sync::Arc;
use tracing::{debug, warn};

/// Cloneable handle to one entity's stats.
///
/// # Examples
///
/// ```rust
/// use statmod::{Modifier, StatComponent, StatDefinition, StatId};
/// use std::collections::HashMap;
/// use std::sync::Arc;
///
/// let definitions = vec![
///     Arc::new(StatDefinition::new("Health", 100.0, 0.0, 200.0)),
///     Arc::new(StatDefinition::new("Speed", 5.0, 0.0, 10.0)),
/// ];
/// let mut overrides = HashMap::new();
/// overrides.insert(StatId::new("Speed"), 7.0);
///
/// let player = StatComponent::new("player");
/// player.initialize(definitions, &overrides);
///
/// let mut slow = Modifier::percent_mult(&player, "Speed", 0.5);
/// player.apply_damage(&mut slow).unwrap();
/// assert_eq!(player.get_value("Speed"), 3.5);
/// ```
#[derive(Debug, Clone, Default)]
pub struct StatComponent {
    inner: Rc<RefCell<StatRegistry>>,
}

/// Non-owning reference to a [`StatComponent`].
#[derive(Debug, Clone, Default)]
pub struct WeakStatComponent(Weak<RefCell<StatRegistry>>);

impl WeakStatComponent {
    /// The component, if it has not been dropped.
    pub fn upgrade(&self) -> Option<StatComponent> {
        self.0.upgrade().map(|inner| StatComponent { inner })
    }
}

impl StatComponent {
    /// Create a component with an empty registry.
    pub fn new(owner: impl AsRef<str>) -> Self {
        Self::from_registry(StatRegistry::new(owner))
    }

    /// Wrap an already populated registry.
    pub fn from_registry(registry: StatRegistry) -> Self {
        Self {
            inner: Rc::new(RefCell::new(registry)),
        }
    }

    /// Non-owning handle, as held by modifiers.
    pub fn downgrade(&self) -> WeakStatComponent {
        WeakStatComponent(Rc::downgrade(&self.inner))
    }

    /// Whether both handles point to the same registry.
    pub fn ptr_eq(&self, other: &StatComponent) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    /// Label of the owning entity.
    pub fn owner(&self) -> Arc<str> {
        self.inner.borrow().owner().clone()
    }

    /// Run `f` with read-only access to the registry.
    ///
    /// Reads through the component work inside `f`. Writes, including
    /// applying or removing a modifier, report `RegistryBusy` and change
    /// nothing.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use statmod::{Modifier, StatComponent, StatDefinition, StatError, StatId};
    ///
    /// let hero = StatComponent::new("hero");
    /// hero.add_stat(StatDefinition::new("Armor", 10.0, 0.0, 100.0)).unwrap();
    ///
    /// let names = hero.with_registry(|registry| registry.stat_names());
    /// assert_eq!(names, vec![StatId::new("Armor")]);
    ///
    /// let mut plating = Modifier::flat(&hero, "Armor", 5.0);
    /// let result = hero.with_registry(|_| plating.apply());
    /// assert_eq!(result, Err(StatError::RegistryBusy(StatId::new("Armor"))));
    /// assert!(!plating.is_active());
    /// ```
    pub fn with_registry<R>(&self, f: impl FnOnce(&StatRegistry) -> R) -> R {
        f(&*self.inner.borrow())
    }

    /// Host entry point: materialize the entity's stats from definitions.
    ///
    /// See [`StatRegistry::initialize`]. Adds nothing and returns `0` if
    /// called from inside [`StatComponent::with_registry`].
    pub fn initialize<I>(&self, definitions: I, overrides: &HashMap<StatId, StatValue>) -> usize
    where
        I: IntoIterator<Item = Arc<StatDefinition>>,
    {
        match self.inner.try_borrow_mut() {
            Ok(mut registry) => registry.initialize(definitions, overrides),
            Err(_) => {
                warn!("initialize while the stat registry is borrowed");
                0
            }
        }
    }

    /// Check whether a stat exists.
    pub fn has_stat(&self, name: &str) -> bool {
        self.inner.borrow().has_stat(name)
    }

    /// See [`StatRegistry::get_value`].
    pub fn get_value(&self, name: &str) -> StatValue {
        self.inner.borrow().get_value(name)
    }

    /// See [`StatRegistry::try_get_value`].
    pub fn try_get_value(&self, name: &str) -> Result<StatValue, StatError> {
        self.inner.borrow().try_get_value(name)
    }

    /// See [`StatRegistry::resolve`].
    pub fn resolve(&self, name: &str) -> Result<ResolvedStat, StatError> {
        self.inner.borrow().resolve(name)
    }

    /// See [`StatRegistry::base_value`].
    pub fn base_value(&self, name: &str) -> Result<StatValue, StatError> {
        self.inner.borrow().base_value(name)
    }

    /// See [`StatRegistry::set_base_value`].
    pub fn set_base_value(&self, name: &str, value: StatValue) -> Result<(), StatError> {
        self.write(name)?.set_base_value(name, value)
    }

    /// Shared definition of a stat.
    pub fn definition(&self, name: &str) -> Option<Arc<StatDefinition>> {
        self.inner.borrow().definition(name).cloned()
    }

    /// See [`StatRegistry::snapshot`].
    pub fn snapshot(&self) -> BTreeMap<StatId, StatValue> {
        self.inner.borrow().snapshot()
    }

    /// See [`StatRegistry::add_stat`].
    pub fn add_stat(&self, definition: impl Into<Arc<StatDefinition>>) -> Result<(), StatError> {
        let definition = definition.into();
        self.write(definition.name.as_str())?.add_stat(definition)
    }

    /// See [`StatRegistry::add_stat_with_value`].
    pub fn add_stat_with_value(
        &self,
        definition: impl Into<Arc<StatDefinition>>,
        initial: StatValue,
    ) -> Result<(), StatError> {
        let definition = definition.into();
        self.write(definition.name.as_str())?
            .add_stat_with_value(definition, initial)
    }

    /// See [`StatRegistry::remove_stat`].
    pub fn remove_stat(&self, name: &str) -> Result<StatEntry, StatError> {
        self.write(name)?.remove_stat(name)
    }

    /// Copy of a stat's active modifiers, in registration order.
    pub fn modifiers(&self, name: &str) -> Result<Vec<StackedModifier>, StatError> {
        self.inner.borrow().modifiers(name).map(<[_]>::to_vec)
    }

    /// See [`StatRegistry::clear_modifiers`].
    pub fn clear_modifiers(&self, name: &str) -> Result<Vec<StackedModifier>, StatError> {
        self.write(name)?.clear_modifiers(name)
    }

    /// Create an inactive modifier bound to this component.
    pub fn modifier(
        &self,
        stat: impl Into<StatId>,
        kind: ModifierKind,
        magnitude: StatValue,
    ) -> Modifier {
        Modifier::new(self, stat, kind, magnitude)
    }

    /// Same as [`Modifier::apply`].
    ///
    /// The modifier acts on the component it was created for.
    pub fn apply(&self, modifier: &mut Modifier) -> Result<(), StatError> {
        modifier.apply()
    }

    /// Same as [`Modifier::remove`].
    pub fn remove(&self, modifier: &mut Modifier) -> Result<(), StatError> {
        modifier.remove()
    }

    /// Combat-facing entry point: apply a hit, debuff or heal.
    pub fn apply_damage(&self, modifier: &mut Modifier) -> Result<(), StatError> {
        modifier.apply()?;
        debug!(
            owner = %self.owner(),
            stat = %modifier.target_stat(),
            "damage modifier applied"
        );
        Ok(())
    }

    pub(crate) fn register(
        &self,
        name: &str,
        modifier: StackedModifier,
    ) -> Result<bool, StatError> {
        self.write(name)?.register_modifier(name, modifier)
    }

    pub(crate) fn deregister(
        &self,
        name: &str,
        id: ModifierId,
    ) -> Result<Option<StackedModifier>, StatError> {
        self.write(name)?.deregister_modifier(name, id)
    }

    /// Mutable borrows never outlive a single call on this type, and only
    /// shared borrows escape through `with_registry`, so this read cannot
    /// conflict.
    pub(crate) fn is_registered(&self, name: &str, id: ModifierId) -> bool {
        self.inner.borrow().is_registered(name, id)
    }

    fn write(&self, name: &str) -> Result<RefMut<'_, StatRegistry>, StatError> {
        self.inner.try_borrow_mut().map_err(|_| {
            warn!(stat = name, "stat registry is borrowed, write rejected");
            StatError::RegistryBusy(StatId::new(name))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_weak_handle_does_not_keep_registry_alive() {
        let component = StatComponent::new("ghost");
        let weak = component.downgrade();
        assert!(weak.upgrade().unwrap().ptr_eq(&component));

        drop(component);
        assert!(weak.upgrade().is_none());
    }

    #[test]
    fn test_clones_share_registry() {
        let a = StatComponent::new("hero");
        let b = a.clone();
        a.add_stat(StatDefinition::new("Mana", 50.0, 0.0, 100.0))
            .unwrap();
        assert!(b.has_stat("Mana"));
        b.set_base_value("Mana", 70.0).unwrap();
        assert_eq!(a.get_value("Mana"), 70.0);
        assert_eq!(&*a.owner(), "hero");
    }

    #[test]
    fn test_apply_and_remove_through_component() {
        let c = StatComponent::new("hero");
        c.add_stat(StatDefinition::new("Armor", 10.0, 0.0, 100.0))
            .unwrap();

        let mut m = c.modifier("Armor", ModifierKind::Flat, 15.0);
        c.apply(&mut m).unwrap();
        assert_eq!(c.get_value("Armor"), 25.0);
        assert_eq!(c.modifiers("Armor").unwrap(), vec![m.stacked()]);

        c.remove(&mut m).unwrap();
        assert_eq!(c.get_value("Armor"), 10.0);
        assert!(c.modifiers("Armor").unwrap().is_empty());
    }

    #[test]
    fn test_apply_damage_reports_invalid_target() {
        let c = StatComponent::new("dummy");
        let mut hit = Modifier::flat(&c, "Health", -30.0);
        assert!(matches!(
            c.apply_damage(&mut hit),
            Err(StatError::InvalidTarget { .. })
        ));
    }

    #[test]
    fn test_definition_is_shared() {
        let def = Arc::new(StatDefinition::new("Crit", 0.05, 0.0, 1.0));
        let c = StatComponent::new("hero");
        c.add_stat(def.clone()).unwrap();
        assert!(Arc::ptr_eq(&c.definition("Crit").unwrap(), &def));
    }

    #[test]
    fn test_modifier_calls_inside_with_registry_do_not_panic() {
        let c = StatComponent::new("hero");
        c.add_stat(StatDefinition::new("Armor", 10.0, 0.0, 100.0))
            .unwrap();
        let mut m = c.modifier("Armor", ModifierKind::Flat, 15.0);

        let busy = StatError::RegistryBusy(StatId::new("Armor"));
        let applied = c.with_registry(|registry| {
            assert_eq!(registry.get_value("Armor"), 10.0);
            m.apply()
        });
        assert_eq!(applied, Err(busy.clone()));
        assert!(!m.is_active());
        assert_eq!(c.get_value("Armor"), 10.0);

        m.apply().unwrap();
        let removed = c.with_registry(|_| m.remove());
        assert_eq!(removed, Err(busy));
        assert!(m.is_active());
        assert_eq!(c.get_value("Armor"), 25.0);

        m.remove().unwrap();
        assert_eq!(c.get_value("Armor"), 10.0);
    }

    #[test]
    fn test_writes_inside_with_registry_are_rejected() {
        let c = StatComponent::new("hero");
        c.add_stat(StatDefinition::new("Mana", 50.0, 0.0, 100.0))
            .unwrap();

        c.with_registry(|_| {
            assert_eq!(
                c.set_base_value("Mana", 80.0),
                Err(StatError::RegistryBusy(StatId::new("Mana")))
            );
            assert!(c
                .add_stat(StatDefinition::new("Rage", 0.0, 0.0, 10.0))
                .is_err());
            assert!(c.clear_modifiers("Mana").is_err());
            assert_eq!(c.initialize(Vec::new(), &HashMap::new()), 0);
            assert_eq!(c.get_value("Mana"), 50.0);
        });
        assert!(!c.has_stat("Rage"));
        assert_eq!(c.get_value("Mana"), 50.0);
    }
}
