//! Stat registry module.
//!
//! Provides the `StatRegistry` type, which owns every stat of one entity.
//! It answers value queries, writes base values and keeps the per-stat
//! modifier stacks. Effective values are folded from the base value and
//! the stack on read and cached until something invalidates them.

use crate::definition::{StatDefinition, StatValue};
use crate::error::StatError;
use crate::modifier::ModifierId;
use crate::resolved::ResolvedStat;
use crate::stack::{ModifierStack, StackedModifier};
use crate::stat_id::StatId;
use std::cell::Cell;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Value returned by [`StatRegistry::get_value`] for a stat that does not exist.
pub const UNKNOWN_STAT_VALUE: StatValue = 0.0;

/// One stat of one entity.
#[derive(Debug, Clone)]
pub struct StatEntry {
    definition: Arc<StatDefinition>,
    base_value: StatValue,
    modifiers: ModifierStack,
    /// Clamped effective value, if still valid.
    cached: Cell<Option<StatValue>>,
}

impl StatEntry {
    fn new(definition: Arc<StatDefinition>, base_value: StatValue) -> Self {
        Self {
            definition,
            base_value,
            modifiers: ModifierStack::new(),
            cached: Cell::new(None),
        }
    }

    /// The shared definition this entry was created from.
    pub fn definition(&self) -> &Arc<StatDefinition> {
        &self.definition
    }

    /// Unmodified, unclamped base value.
    pub fn base_value(&self) -> StatValue {
        self.base_value
    }

    /// Active modifiers, in registration order.
    pub fn modifiers(&self) -> &ModifierStack {
        &self.modifiers
    }

    /// Clamped effective value.
    pub fn value(&self) -> StatValue {
        if let Some(value) = self.cached.get() {
            return value;
        }
        let value = self
            .definition
            .clamp(self.modifiers.evaluate(self.base_value));
        self.cached.set(Some(value));
        value
    }

    /// Step-by-step breakdown of [`StatEntry::value`].
    pub fn resolve(&self) -> ResolvedStat {
        ResolvedStat::compute(&self.definition, self.base_value, &self.modifiers)
    }

    fn invalidate(&self) {
        self.cached.set(None);
    }
}

/// All stats of one entity.
///
/// The registry owns its entries exclusively. It records active modifiers
/// by [`ModifierId`] and never owns a [`crate::Modifier`]; most callers go
/// through the shared [`crate::StatComponent`] handle, which modifiers
/// bind to.
///
/// # Examples
///
/// ```rust
/// use statmod::{ModifierId, ModifierKind, StackedModifier, StatDefinition, StatRegistry};
///
/// let mut registry = StatRegistry::new("goblin");
/// registry.add_stat(StatDefinition::new("Health", 100.0, 0.0, 200.0)).unwrap();
///
/// let haste = StackedModifier { id: ModifierId::next(), kind: ModifierKind::PercentMult, magnitude: 3.0 };
/// registry.register_modifier("Health", haste).unwrap();
/// assert_eq!(registry.get_value("Health"), 200.0); // clamped
///
/// registry.deregister_modifier("Health", haste.id).unwrap();
/// assert_eq!(registry.get_value("Health"), 100.0);
/// ```
#[derive(Debug, Clone)]
pub struct StatRegistry {
    owner: Arc<str>,
    entries: HashMap<StatId, StatEntry>,
}

impl StatRegistry {
    /// Create an empty registry. `owner` labels log records.
    pub fn new(owner: impl AsRef<str>) -> Self {
        Self {
            owner: Arc::from(owner.as_ref()),
            entries: HashMap::new(),
        }
    }

    /// Label of the entity that owns these stats.
    pub fn owner(&self) -> &Arc<str> {
        &self.owner
    }

    /// Materialize one entry per definition.
    ///
    /// `overrides` supplies initial base values by stat name; stats without
    /// an override start at their definition default. A repeated definition
    /// name keeps the first entry. Returns the number of stats added.
    pub fn initialize<I>(&mut self, definitions: I, overrides: &HashMap<StatId, StatValue>) -> usize
    where
        I: IntoIterator<Item = Arc<StatDefinition>>,
    {
        let mut added = 0;
        for definition in definitions {
            let initial = overrides
                .get(&definition.name)
                .copied()
                .unwrap_or(definition.default_value);
            if self.add_stat_with_value(definition, initial).is_ok() {
                added += 1;
            }
        }

        for name in overrides.keys() {
            if !self.entries.contains_key(name) {
                warn!(owner = %self.owner, stat = %name, "override for a stat that has no definition");
            }
        }

        info!(owner = %self.owner, stats = added, "stats initialized");
        added
    }

    /// Check whether a stat exists.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use statmod::{StatDefinition, StatRegistry};
    ///
    /// let mut registry = StatRegistry::new("slime");
    /// registry.add_stat(StatDefinition::new("Health", 20.0, 0.0, 40.0)).unwrap();
    ///
    /// assert!(registry.has_stat("Health"));
    /// assert!(!registry.has_stat("Mana"));
    /// ```
    pub fn has_stat(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// The entry for a stat, without logging when it is missing.
    pub fn entry(&self, name: &str) -> Option<&StatEntry> {
        self.entries.get(name)
    }

    /// Clamped effective value, or [`UNKNOWN_STAT_VALUE`] with a logged
    /// warning if the stat does not exist. Use [`StatRegistry::try_get_value`]
    /// or check [`StatRegistry::has_stat`] first for strict semantics.
    pub fn get_value(&self, name: &str) -> StatValue {
        match self.try_get_value(name) {
            Ok(value) => value,
            Err(_) => {
                warn!(
                    owner = %self.owner,
                    stat = name,
                    available = %self.available_names(),
                    "stat not found"
                );
                UNKNOWN_STAT_VALUE
            }
        }
    }

    /// Clamped effective value, or `UnknownStat`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use statmod::{StatDefinition, StatError, StatId, StatRegistry};
    ///
    /// let mut registry = StatRegistry::new("slime");
    /// registry.add_stat_with_value(StatDefinition::new("Health", 20.0, 0.0, 40.0), 55.0).unwrap();
    ///
    /// assert_eq!(registry.try_get_value("Health"), Ok(40.0));
    /// assert_eq!(
    ///     registry.try_get_value("Mana"),
    ///     Err(StatError::UnknownStat(StatId::new("Mana")))
    /// );
    /// ```
    pub fn try_get_value(&self, name: &str) -> Result<StatValue, StatError> {
        self.entries
            .get(name)
            .map(StatEntry::value)
            .ok_or_else(|| StatError::UnknownStat(StatId::new(name)))
    }

    /// Evaluate a stat with a full breakdown.
    pub fn resolve(&self, name: &str) -> Result<ResolvedStat, StatError> {
        self.entries
            .get(name)
            .map(StatEntry::resolve)
            .ok_or_else(|| StatError::UnknownStat(StatId::new(name)))
    }

    /// Base value of a stat as last written, before modifiers and clamping.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use statmod::{StatDefinition, StatRegistry};
    ///
    /// let mut registry = StatRegistry::new("slime");
    /// registry.add_stat(StatDefinition::new("Health", 20.0, 0.0, 40.0)).unwrap();
    /// registry.set_base_value("Health", -5.0).unwrap();
    ///
    /// assert_eq!(registry.base_value("Health"), Ok(-5.0));
    /// assert_eq!(registry.get_value("Health"), 0.0);
    /// ```
    pub fn base_value(&self, name: &str) -> Result<StatValue, StatError> {
        self.entries
            .get(name)
            .map(StatEntry::base_value)
            .ok_or_else(|| StatError::UnknownStat(StatId::new(name)))
    }

    /// Overwrite the base value, bypassing modifiers.
    ///
    /// Not clamped here; clamping only happens when the value is read.
    pub fn set_base_value(&mut self, name: &str, value: StatValue) -> Result<(), StatError> {
        let Some(entry) = self.entries.get_mut(name) else {
            warn!(owner = %self.owner, stat = name, "set_base_value on unknown stat");
            return Err(StatError::UnknownStat(StatId::new(name)));
        };
        entry.base_value = value;
        entry.invalidate();
        debug!(owner = %self.owner, stat = name, value, "base value set");
        Ok(())
    }

    /// Definition of a stat. Logs a warning when the stat is missing.
    pub fn definition(&self, name: &str) -> Option<&Arc<StatDefinition>> {
        let definition = self.entries.get(name).map(StatEntry::definition);
        if definition.is_none() {
            warn!(owner = %self.owner, stat = name, "definition not found");
        }
        definition
    }

    /// Clamped value of every stat, keyed by name.
    pub fn snapshot(&self) -> BTreeMap<StatId, StatValue> {
        self.entries
            .iter()
            .map(|(name, entry)| (name.clone(), entry.value()))
            .collect()
    }

    /// Add a stat at its definition default.
    pub fn add_stat(&mut self, definition: impl Into<Arc<StatDefinition>>) -> Result<(), StatError> {
        let definition = definition.into();
        let initial = definition.default_value;
        self.add_stat_with_value(definition, initial)
    }

    /// Add a stat with an explicit initial base value.
    ///
    /// If a stat with the same name exists it is left untouched and
    /// `DuplicateStat` is reported.
    pub fn add_stat_with_value(
        &mut self,
        definition: impl Into<Arc<StatDefinition>>,
        initial: StatValue,
    ) -> Result<(), StatError> {
        let definition = definition.into();
        let name = definition.name.clone();
        if self.entries.contains_key(&name) {
            warn!(owner = %self.owner, stat = %name, "stat already exists, keeping original");
            return Err(StatError::DuplicateStat(name));
        }
        debug!(owner = %self.owner, stat = %name, value = initial, "stat added");
        self.entries.insert(name, StatEntry::new(definition, initial));
        Ok(())
    }

    /// Detach a stat and return its entry.
    ///
    /// Modifiers still bound to it become orphans: they read as inactive
    /// and their `apply`/`remove` fail softly.
    pub fn remove_stat(&mut self, name: &str) -> Result<StatEntry, StatError> {
        match self.entries.remove(name) {
            Some(entry) => {
                debug!(
                    owner = %self.owner,
                    stat = name,
                    orphaned = entry.modifiers.len(),
                    "stat removed"
                );
                Ok(entry)
            }
            None => {
                warn!(owner = %self.owner, stat = name, "remove_stat on unknown stat");
                Err(StatError::UnknownStat(StatId::new(name)))
            }
        }
    }

    /// Add `modifier` to a stat's active set.
    ///
    /// Returns `Ok(false)` if a modifier with the same id is already there.
    pub fn register_modifier(
        &mut self,
        name: &str,
        modifier: StackedModifier,
    ) -> Result<bool, StatError> {
        let entry = self
            .entries
            .get_mut(name)
            .ok_or_else(|| StatError::UnknownStat(StatId::new(name)))?;
        let added = entry.modifiers.push(modifier);
        if added {
            entry.invalidate();
        }
        Ok(added)
    }

    /// Remove a modifier from a stat's active set.
    ///
    /// Returns `Ok(None)` if the stat exists but the modifier is not active on it.
    pub fn deregister_modifier(
        &mut self,
        name: &str,
        id: ModifierId,
    ) -> Result<Option<StackedModifier>, StatError> {
        let entry = self
            .entries
            .get_mut(name)
            .ok_or_else(|| StatError::UnknownStat(StatId::new(name)))?;
        let removed = entry.modifiers.remove(id);
        if removed.is_some() {
            entry.invalidate();
        }
        Ok(removed)
    }

    /// Whether modifier `id` is in the active set of stat `name`.
    pub fn is_registered(&self, name: &str, id: ModifierId) -> bool {
        self.entries
            .get(name)
            .is_some_and(|entry| entry.modifiers.contains(id))
    }

    /// Active modifiers of a stat, in registration order.
    pub fn modifiers(&self, name: &str) -> Result<&[StackedModifier], StatError> {
        self.entries
            .get(name)
            .map(|entry| entry.modifiers.as_slice())
            .ok_or_else(|| StatError::UnknownStat(StatId::new(name)))
    }

    /// Detach every active modifier of a stat.
    pub fn clear_modifiers(&mut self, name: &str) -> Result<Vec<StackedModifier>, StatError> {
        let entry = self
            .entries
            .get_mut(name)
            .ok_or_else(|| StatError::UnknownStat(StatId::new(name)))?;
        let cleared = entry.modifiers.drain();
        entry.invalidate();
        debug!(owner = %self.owner, stat = name, cleared = cleared.len(), "modifiers cleared");
        Ok(cleared)
    }

    /// Stat names in sorted order.
    pub fn stat_names(&self) -> Vec<StatId> {
        let mut names: Vec<_> = self.entries.keys().cloned().collect();
        names.sort();
        names
    }

    /// Number of stats.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn available_names(&self) -> String {
        self.stat_names()
            .iter()
            .map(StatId::as_str)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl Default for StatRegistry {
    fn default() -> Self {
        Self::new("entity")
    }
}
