//! Stat configuration.
//!
//! The configuration side supplies stat definitions and each entity's
//! initial stat list. Both can be read from JSON or TOML:
//!
//! ```toml
//! [[stats]]
//! name = "Health"
//! description = "Hit points"
//! default = 100.0
//! min = 0.0
//! max = 200.0
//! ```
//!
//! ```toml
//! owner = "goblin"
//!
//! [[stats]]
//! stat = "Health"
//! base = 60.0
//!
//! [[stats]]
//! stat = "Speed"
//! ```

use crate::component::StatComponent;
use crate::definition::{StatDefinition, StatValue};
use crate::stat_id::StatId;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;

/// Error loading stat configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error reading '{}': {error}", .path.display())]
    Io {
        error: std::io::Error,
        path: PathBuf,
    },
    #[error("JSON parse error in '{}': {error}", display_path(.path))]
    ParseJson {
        error: serde_json::Error,
        path: Option<PathBuf>,
    },
    #[error("TOML parse error in '{}': {error}", display_path(.path))]
    ParseToml {
        error: toml::de::Error,
        path: Option<PathBuf>,
    },
    #[error("Unsupported config format: '{}' (expected .json or .toml)", .0.display())]
    UnsupportedFormat(PathBuf),
    #[error("Invalid definition for stat {stat}: {message}")]
    Validation { stat: StatId, message: String },
    #[error("No definition for stat: {0}")]
    UnknownDefinition(StatId),
}

fn display_path(path: &Option<PathBuf>) -> String {
    path.as_ref()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| String::from("<inline>"))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Format {
    Json,
    Toml,
}

impl Format {
    fn of(path: &Path) -> Result<Self, ConfigError> {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Ok(Format::Json),
            Some("toml") => Ok(Format::Toml),
            _ => Err(ConfigError::UnsupportedFormat(path.to_path_buf())),
        }
    }
}

fn parse<T>(content: &str, format: Format, path: Option<&Path>) -> Result<T, ConfigError>
where
    T: for<'de> Deserialize<'de>,
{
    match format {
        Format::Json => serde_json::from_str(content).map_err(|error| ConfigError::ParseJson {
            error,
            path: path.map(Path::to_path_buf),
        }),
        Format::Toml => toml::from_str(content).map_err(|error| ConfigError::ParseToml {
            error,
            path: path.map(Path::to_path_buf),
        }),
    }
}

fn read_file<T>(path: &Path) -> Result<T, ConfigError>
where
    T: for<'de> Deserialize<'de>,
{
    let format = Format::of(path)?;
    let content = std::fs::read_to_string(path).map_err(|error| ConfigError::Io {
        error,
        path: path.to_path_buf(),
    })?;
    parse(&content, format, Some(path))
}

#[derive(Debug, Deserialize)]
struct CatalogFile {
    #[serde(default)]
    stats: Vec<StatDefinition>,
}

/// The set of stat definitions available to entities.
///
/// Definitions are held behind `Arc` and handed to registries by
/// reference-count, never copied.
///
/// # Examples
///
/// ```rust
/// use statmod::config::StatCatalog;
///
/// let catalog = StatCatalog::from_json_str(r#"{
///     "stats": [
///         { "name": "Health", "default": 100, "min": 0, "max": 200 },
///         { "name": "Speed", "default": 5, "min": 0, "max": 10 }
///     ]
/// }"#).unwrap();
///
/// assert_eq!(catalog.len(), 2);
/// assert_eq!(catalog.get("Speed").unwrap().max_value, 10.0);
/// ```
#[derive(Debug, Clone, Default)]
pub struct StatCatalog {
    definitions: Vec<Arc<StatDefinition>>,
    index: HashMap<StatId, usize>,
}

impl StatCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a catalog, rejecting duplicate names.
    pub fn from_definitions<I>(definitions: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = StatDefinition>,
    {
        let mut catalog = Self::new();
        for definition in definitions {
            catalog.insert(definition)?;
        }
        Ok(catalog)
    }

    pub fn from_json_str(content: &str) -> Result<Self, ConfigError> {
        let file: CatalogFile = parse(content, Format::Json, None)?;
        Self::from_definitions(file.stats)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let file: CatalogFile = parse(content, Format::Toml, None)?;
        Self::from_definitions(file.stats)
    }

    /// Load a `.json` or `.toml` catalog file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let file: CatalogFile = read_file(path)?;
        Self::from_definitions(file.stats)
    }

    /// Add a definition. Fails if the name is already present.
    pub fn insert(&mut self, definition: StatDefinition) -> Result<(), ConfigError> {
        if self.index.contains_key(&definition.name) {
            return Err(ConfigError::Validation {
                stat: definition.name,
                message: String::from("defined more than once"),
            });
        }
        self.index
            .insert(definition.name.clone(), self.definitions.len());
        self.definitions.push(Arc::new(definition));
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&Arc<StatDefinition>> {
        self.index.get(name).map(|&i| &self.definitions[i])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Definitions in file order.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<StatDefinition>> {
        self.definitions.iter()
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    /// Check `min <= default <= max` for every definition.
    ///
    /// Registries accept ill-formed definitions as-is; this is for tooling
    /// that wants to reject them at load time.
    pub fn validate(&self) -> Result<(), ConfigError> {
        match self.definitions.iter().find(|d| !d.is_well_formed()) {
            Some(d) => Err(ConfigError::Validation {
                stat: d.name.clone(),
                message: format!(
                    "expected min <= default <= max, got min={} default={} max={}",
                    d.min_value, d.default_value, d.max_value
                ),
            }),
            None => Ok(()),
        }
    }

    /// A registry handle holding every stat of the catalog at its default.
    pub fn instantiate(&self, owner: impl AsRef<str>) -> StatComponent {
        let component = StatComponent::new(owner);
        component.initialize(self.definitions.iter().cloned(), &HashMap::new());
        component
    }
}

/// One row of an entity's initial stat list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InitialStat {
    pub stat: StatId,
    /// Starting base value; the definition default when absent.
    #[serde(default)]
    pub base: Option<StatValue>,
}

/// The stats one entity starts with.
///
/// # Examples
///
/// ```rust
/// use statmod::config::{EntityStatsConfig, StatCatalog};
///
/// let catalog = StatCatalog::from_toml_str(r#"
///     [[stats]]
///     name = "Health"
///     default = 100.0
///     min = 0.0
///     max = 200.0
/// "#).unwrap();
///
/// let goblin = EntityStatsConfig::from_toml_str(r#"
///     owner = "goblin"
///     [[stats]]
///     stat = "Health"
///     base = 60.0
/// "#).unwrap();
///
/// let component = goblin.build(&catalog).unwrap();
/// assert_eq!(component.get_value("Health"), 60.0);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EntityStatsConfig {
    #[serde(default)]
    pub owner: Option<String>,
    #[serde(default)]
    pub stats: Vec<InitialStat>,
}

impl EntityStatsConfig {
    pub fn from_json_str(content: &str) -> Result<Self, ConfigError> {
        parse(content, Format::Json, None)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        parse(content, Format::Toml, None)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        read_file(path)
    }

    /// Definitions and base-value overrides for `initialize`, in list order.
    pub fn resolve(
        &self,
        catalog: &StatCatalog,
    ) -> Result<(Vec<Arc<StatDefinition>>, HashMap<StatId, StatValue>), ConfigError> {
        let mut definitions = Vec::with_capacity(self.stats.len());
        let mut overrides = HashMap::new();

        for initial in &self.stats {
            let definition = catalog
                .get(initial.stat.as_str())
                .ok_or_else(|| ConfigError::UnknownDefinition(initial.stat.clone()))?;
            definitions.push(Arc::clone(definition));
            if let Some(base) = initial.base {
                overrides.entry(initial.stat.clone()).or_insert(base);
            }
        }

        Ok((definitions, overrides))
    }

    /// Create and initialize the entity's component.
    pub fn build(&self, catalog: &StatCatalog) -> Result<StatComponent, ConfigError> {
        let (definitions, overrides) = self.resolve(catalog)?;
        let owner = self.owner.as_deref().unwrap_or("entity");
        let component = StatComponent::new(owner);
        component.initialize(definitions, &overrides);
        Ok(component)
    }
}
