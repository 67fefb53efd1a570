//! Property tests for the modifier fold.
//!
//! These check that the effective value depends only on the base value and
//! the set of active modifiers: application order, removal order and
//! apply/remove history must not show up in the result.

use proptest::prelude::*;
use statmod::*;

const MIN: StatValue = -1_000.0;
const MAX: StatValue = 1_000.0;

fn arb_modifier() -> impl Strategy<Value = (ModifierKind, StatValue)> {
    prop_oneof![
        (-50.0..50.0f64).prop_map(|m| (ModifierKind::Flat, m)),
        (-0.9..2.0f64).prop_map(|m| (ModifierKind::PercentAdd, m)),
        (0.1..3.0f64).prop_map(|m| (ModifierKind::PercentMult, m)),
    ]
}

fn arb_modifier_set() -> impl Strategy<Value = Vec<(ModifierKind, StatValue)>> {
    prop::collection::vec(arb_modifier(), 0..10)
}

fn component(base: StatValue) -> StatComponent {
    let component = StatComponent::new("prop");
    component
        .add_stat_with_value(StatDefinition::new("Power", 0.0, MIN, MAX), base)
        .unwrap();
    component
}

fn build(component: &StatComponent, specs: &[(ModifierKind, StatValue)]) -> Vec<Modifier> {
    specs
        .iter()
        .map(|&(kind, magnitude)| component.modifier("Power", kind, magnitude))
        .collect()
}

proptest! {
    #[test]
    fn value_always_within_bounds(base in -5_000.0..5_000.0f64, specs in arb_modifier_set()) {
        let c = component(base);
        for mut m in build(&c, &specs) {
            m.apply().unwrap();
        }
        let value = c.get_value("Power");
        prop_assert!((MIN..=MAX).contains(&value));
    }

    #[test]
    fn application_order_is_irrelevant(
        base in -500.0..500.0f64,
        pair in arb_modifier_set()
            .prop_flat_map(|specs| (Just(specs.clone()), Just(specs).prop_shuffle())),
    ) {
        let (specs, shuffled) = pair;
        let a = component(base);
        let b = component(base);
        for mut m in build(&a, &specs) {
            m.apply().unwrap();
        }
        for mut m in build(&b, &shuffled) {
            m.apply().unwrap();
        }
        prop_assert_eq!(a.get_value("Power").to_bits(), b.get_value("Power").to_bits());
    }

    #[test]
    fn removing_everything_restores_base(
        base in -500.0..500.0f64,
        specs in arb_modifier_set(),
        seed in any::<u64>(),
    ) {
        let c = component(base);
        let mut mods = build(&c, &specs);
        for m in mods.iter_mut() {
            m.apply().unwrap();
        }

        // Deterministic pseudo-random removal order.
        let mut order: Vec<usize> = (0..mods.len()).collect();
        order.sort_by_key(|&i| (i as u64).wrapping_mul(seed | 1).rotate_left(17));
        for i in order {
            mods[i].remove().unwrap();
        }

        let expected = StatDefinition::new("Power", 0.0, MIN, MAX).clamp(base);
        prop_assert_eq!(c.get_value("Power").to_bits(), expected.to_bits());
        prop_assert!(c.modifiers("Power").unwrap().is_empty());
    }

    #[test]
    fn partial_removal_matches_fresh_application(
        base in -500.0..500.0f64,
        specs in arb_modifier_set(),
        keep in prop::collection::vec(any::<bool>(), 10),
    ) {
        let c = component(base);
        let mut mods = build(&c, &specs);
        for m in mods.iter_mut() {
            m.apply().unwrap();
        }
        for (m, &kept) in mods.iter_mut().zip(&keep) {
            if !kept {
                m.remove().unwrap();
            }
        }

        let survivors: Vec<_> = specs
            .iter()
            .zip(&keep)
            .filter(|(_, kept)| **kept)
            .map(|(spec, _)| *spec)
            .collect();
        let fresh = component(base);
        for mut m in build(&fresh, &survivors) {
            m.apply().unwrap();
        }

        prop_assert_eq!(c.get_value("Power").to_bits(), fresh.get_value("Power").to_bits());
    }

    #[test]
    fn double_apply_equals_single_apply(base in -500.0..500.0f64, specs in arb_modifier_set()) {
        let once = component(base);
        let twice = component(base);
        for mut m in build(&once, &specs) {
            m.apply().unwrap();
        }
        for mut m in build(&twice, &specs) {
            m.apply().unwrap();
            m.apply().unwrap();
        }
        prop_assert_eq!(once.get_value("Power").to_bits(), twice.get_value("Power").to_bits());
        prop_assert_eq!(once.modifiers("Power").unwrap().len(), specs.len());
        prop_assert_eq!(twice.modifiers("Power").unwrap().len(), specs.len());
    }

    #[test]
    fn repeated_reads_are_bit_identical(base in -500.0..500.0f64, specs in arb_modifier_set()) {
        let c = component(base);
        for mut m in build(&c, &specs) {
            m.apply().unwrap();
        }
        let first = c.get_value("Power");
        let resolved = c.resolve("Power").unwrap();
        prop_assert_eq!(first.to_bits(), c.get_value("Power").to_bits());
        prop_assert_eq!(first.to_bits(), resolved.value.to_bits());
        prop_assert_eq!(c.snapshot()["Power"].to_bits(), first.to_bits());
    }
}

#[test]
fn fixed_cross_kind_set_is_reproducible() {
    let reference = {
        let c = component(50.0);
        for mut m in build(
            &c,
            &[
                (ModifierKind::Flat, 5.0),
                (ModifierKind::PercentAdd, 0.1),
                (ModifierKind::PercentMult, 1.2),
            ],
        ) {
            m.apply().unwrap();
        }
        c.get_value("Power")
    };

    for _ in 0..100 {
        let c = component(50.0);
        for mut m in build(
            &c,
            &[
                (ModifierKind::PercentMult, 1.2),
                (ModifierKind::Flat, 5.0),
                (ModifierKind::PercentAdd, 0.1),
            ],
        ) {
            m.apply().unwrap();
        }
        assert_eq!(c.get_value("Power").to_bits(), reference.to_bits());
    }
    assert!((reference - 72.6).abs() < 1e-9);
}
