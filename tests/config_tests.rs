use statmod::config::{ConfigError, EntityStatsConfig, StatCatalog};
use statmod::*;
use std::io::Write;
use std::path::Path;
use tempfile::TempDir;

fn write_file(dir: &Path, name: &str, content: &str) -> std::path::PathBuf {
    let path = dir.join(name);
    let mut file = std::fs::File::create(&path).unwrap();
    file.write_all(content.as_bytes()).unwrap();
    path
}

const CATALOG_JSON: &str = r#"{
    "stats": [
        { "name": "Health", "description": "Hit points", "default": 100, "min": 0, "max": 200 },
        { "name": "Speed", "description": "Tiles per turn", "default": 5, "min": 1, "max": 10 },
        { "name": "Damage", "default": 12, "min": 0, "max": 999 }
    ]
}"#;

const GOBLIN_TOML: &str = r#"
owner = "goblin"

[[stats]]
stat = "Health"
base = 60.0

[[stats]]
stat = "Speed"
"#;

#[test]
fn test_load_catalog_and_entity_from_files() {
    let dir = TempDir::new().unwrap();
    let catalog_path = write_file(dir.path(), "stats.json", CATALOG_JSON);
    let goblin_path = write_file(dir.path(), "goblin.toml", GOBLIN_TOML);

    let catalog = StatCatalog::load(&catalog_path).unwrap();
    assert_eq!(catalog.len(), 3);
    catalog.validate().unwrap();

    let goblin = EntityStatsConfig::load(&goblin_path).unwrap();
    let component = goblin.build(&catalog).unwrap();

    assert_eq!(&*component.owner(), "goblin");
    assert_eq!(component.get_value("Health"), 60.0);
    assert_eq!(component.get_value("Speed"), 5.0);
    assert!(!component.has_stat("Damage"));

    // Definitions are shared with the catalog, not copied.
    let health = component.definition("Health").unwrap();
    assert!(std::sync::Arc::ptr_eq(&health, catalog.get("Health").unwrap()));
}

#[test]
fn test_built_component_accepts_modifiers() {
    let catalog = StatCatalog::from_json_str(CATALOG_JSON).unwrap();
    let goblin = EntityStatsConfig::from_toml_str(GOBLIN_TOML)
        .unwrap()
        .build(&catalog)
        .unwrap();

    let mut slow = Modifier::percent_mult(&goblin, "Speed", 0.5);
    slow.apply().unwrap();
    assert_eq!(goblin.get_value("Speed"), 2.5);
    slow.remove().unwrap();
    assert_eq!(goblin.get_value("Speed"), 5.0);
}

#[test]
fn test_missing_file() {
    let dir = TempDir::new().unwrap();
    let err = StatCatalog::load(&dir.path().join("missing.toml")).unwrap_err();
    assert!(matches!(err, ConfigError::Io { .. }));
    assert!(err.to_string().contains("missing.toml"));
}

#[test]
fn test_parse_error_names_file() {
    let dir = TempDir::new().unwrap();
    let path = write_file(dir.path(), "broken.toml", "[[stats]]\nname = ");
    let err = StatCatalog::load(&path).unwrap_err();
    assert!(matches!(err, ConfigError::ParseToml { path: Some(_), .. }));
    assert!(err.to_string().contains("broken.toml"));
}

#[test]
fn test_duplicate_definition_in_file() {
    let dir = TempDir::new().unwrap();
    let path = write_file(
        dir.path(),
        "dupes.toml",
        r#"
[[stats]]
name = "Health"
default = 1.0
min = 0.0
max = 2.0

[[stats]]
name = "Health"
default = 5.0
min = 0.0
max = 9.0
"#,
    );
    let err = StatCatalog::load(&path).unwrap_err();
    match err {
        ConfigError::Validation { stat, .. } => assert_eq!(stat, StatId::new("Health")),
        other => panic!("expected Validation, got {other:?}"),
    }
}

#[test]
fn test_entity_with_unknown_stat() {
    let catalog = StatCatalog::from_json_str(CATALOG_JSON).unwrap();
    let err = EntityStatsConfig::from_json_str(r#"{ "stats": [ { "stat": "Mana" } ] }"#)
        .unwrap()
        .build(&catalog)
        .unwrap_err();
    assert!(matches!(err, ConfigError::UnknownDefinition(ref s) if s.as_str() == "Mana"));
}
