//! # statmod - Bounded Entity Stats With Reversible Modifiers
//!
//! A stat layer for game entities that provides:
//! - **Bounded** stats (every read is clamped to the stat's `[min, max]`)
//! - **Reversible** modifiers (removing one restores the value exactly)
//! - **Order-independent** stacking (the same set of modifiers always
//!   produces the same bits, whatever order they arrived in)
//! - **Soft failure** (missing stats are reported, never fatal)
//!
//! ## Core Concepts
//!
//! ### Value Pipeline
//!
//! A stat's effective value is never stored. It is folded on read from the
//! base value and the set of active modifiers:
//!
//! ```text
//! base → + Σ Flat → × (1 + Σ PercentAdd) → × Π PercentMult → clamp [min, max]
//! ```
//!
//! 1. **Definitions** describe a stat's name and bounds (from configuration)
//! 2. **Registries** hold each entity's base values and modifier stacks
//! 3. **Modifiers** register into and out of a stat's stack
//!
//! Because nothing is folded into the base value, there is no algebraic
//! undo on removal and no drift across repeated apply/remove cycles.
//!
//! ## Example
//!
//! ```rust
//! use statmod::*;
//!
//! let player = StatComponent::new("player");
//! player.add_stat(StatDefinition::new("Health", 100.0, 0.0, 200.0)).unwrap();
//!
//! let mut ring = Modifier::flat(&player, "Health", 20.0);
//! let mut blessing = Modifier::percent_add(&player, "Health", 0.5);
//! ring.apply().unwrap();
//! blessing.apply().unwrap();
//! assert_eq!(player.get_value("Health"), 180.0); // (100 + 20) * 1.5
//!
//! ring.remove().unwrap();
//! assert_eq!(player.get_value("Health"), 150.0); // 100 * 1.5
//! ```
//!
//! ## Modules
//!
//! - [`stat_id`] - Stat name type
//! - [`definition`] - Immutable stat definitions
//! - [`modifier`] - Modifiers and their activation state machine
//! - [`stack`] - Per-stat active modifier sets and the value fold
//! - [`registry`] - Per-entity stat storage and queries
//! - [`component`] - Shared handle modifiers bind to
//! - [`resolved`] - Value breakdowns for debugging
//! - [`config`] - Loading definitions and entity stat lists
//! - [`error`] - Error types

pub mod component;
pub mod config;
pub mod definition;
pub mod error;
pub mod modifier;
pub mod registry;
pub mod resolved;
pub mod stack;
pub mod stat_id;

// Re-export main types for convenience
pub use component::{StatComponent, WeakStatComponent};
pub use definition::{StatDefinition, StatValue};
pub use error::{StatError, TargetFailure};
pub use modifier::{Modifier, ModifierId, ModifierKind, ModifierState};
pub use registry::{StatEntry, StatRegistry, UNKNOWN_STAT_VALUE};
pub use resolved::ResolvedStat;
pub use stack::{ModifierStack, StackTotals, StackedModifier};
pub use stat_id::StatId;

pub use config::{ConfigError, EntityStatsConfig, StatCatalog};
