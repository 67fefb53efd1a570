//! Buffs example: stacking and removing modifiers on one entity
//!
//! This example demonstrates:
//! - Loading stat definitions from a catalog
//! - Applying flat, additive-percent and multiplicative modifiers
//! - Clamping to the stat's bounds
//! - Removing modifiers in any order
//!
//! Run with `RUST_LOG=statmod=debug cargo run --example buffs` to see the
//! registry's log records.

use statmod::config::{ConfigError, EntityStatsConfig, StatCatalog};
use statmod::*;
use tracing_subscriber::EnvFilter;

const CATALOG: &str = r#"
[[stats]]
name = "Health"
description = "Hit points"
default = 100.0
min = 0.0
max = 200.0

[[stats]]
name = "Speed"
description = "Tiles per turn"
default = 5.0
min = 1.0
max = 10.0
"#;

const KNIGHT: &str = r#"
owner = "knight"

[[stats]]
stat = "Health"

[[stats]]
stat = "Speed"
base = 4.0
"#;

fn print_breakdown(component: &StatComponent, stat: &str) {
    match component.resolve(stat) {
        Ok(resolved) => {
            for (step, value) in &resolved.steps {
                println!("    {:<28} {:>8.2}", step, value);
            }
        }
        Err(err) => println!("    {err}"),
    }
}

fn main() -> Result<(), ConfigError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let catalog = StatCatalog::from_toml_str(CATALOG)?;
    catalog.validate()?;
    let knight = EntityStatsConfig::from_toml_str(KNIGHT)?.build(&catalog)?;

    println!("Initial stats: {:?}", knight.snapshot());

    let mut ring = Modifier::flat(&knight, "Health", 20.0);
    let mut blessing = Modifier::percent_add(&knight, "Health", 0.5);
    let mut giant_potion = Modifier::percent_mult(&knight, "Health", 1.3);

    println!("\nApplying ring (+20), blessing (+50%), giant potion (x1.3):");
    for m in [&mut ring, &mut blessing, &mut giant_potion] {
        if let Err(err) = m.apply() {
            println!("  failed: {err}");
        }
        println!("  Health = {:.2}", knight.get_value("Health"));
    }
    print_breakdown(&knight, "Health");

    println!("\nRemoving in a different order:");
    for m in [&mut giant_potion, &mut ring, &mut blessing] {
        if let Err(err) = m.remove() {
            println!("  failed: {err}");
        }
        println!("  Health = {:.2}", knight.get_value("Health"));
    }

    println!("\nCombat hit on a stat the knight does not have:");
    let mut mana_burn = Modifier::flat(&knight, "Mana", -10.0);
    if let Err(err) = knight.apply_damage(&mut mana_burn) {
        println!("  {err}");
    }

    println!("\nFinal stats: {:?}", knight.snapshot());
    Ok(())
}
