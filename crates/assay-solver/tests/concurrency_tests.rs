//! Concurrent read-only queries.
//!
//! Declarations are collected by a single writer; afterwards the interner and
//! the registry's resolution cache are shared across rayon workers.

use super::*;
use rayon::prelude::*;

fn prop(interner: &TypeInterner, name: &str, type_id: TypeId) -> PropertyInfo {
    PropertyInfo::new(interner.intern_string(name), type_id)
}

/// `Level0 { field0 }`, `Level1 extends Level0 { field1 }`, ...
fn declare_chain<'a>(interner: &'a TypeInterner, depth: usize) -> InterfaceRegistry<'a> {
    let mut registry = InterfaceRegistry::new(interner);
    for level in 0..depth {
        let members = vec![prop(interner, &format!("field{level}"), TypeId::NUMBER)];
        let name = format!("Level{level}");
        if level == 0 {
            registry.declare(&name, members, &[]);
        } else {
            let base = format!("Level{}", level - 1);
            registry.declare(&name, members, &[base.as_str()]);
        }
    }
    registry
}

#[test]
fn test_concurrent_interning_deduplicates() {
    let interner = TypeInterner::new();
    let ids: Vec<TypeId> = (0..1000)
        .into_par_iter()
        .map(|i| match i % 4 {
            0 => interner.literal_number((i % 10) as f64),
            1 => interner.union(vec![TypeId::STRING, TypeId::NUMBER]),
            2 => interner.tuple(vec![TypeId::NUMBER, TypeId::STRING]),
            _ => interner.object(vec![prop(&interner, "pages", TypeId::NUMBER)]),
        })
        .collect();

    for (i, &id) in ids.iter().enumerate() {
        let expected = match i % 4 {
            0 => interner.literal_number((i % 10) as f64),
            1 => interner.union(vec![TypeId::NUMBER, TypeId::STRING]),
            2 => interner.tuple(vec![TypeId::NUMBER, TypeId::STRING]),
            _ => interner.object(vec![prop(&interner, "pages", TypeId::NUMBER)]),
        };
        assert_eq!(id, expected);
    }
}

#[test]
fn test_concurrent_resolution_matches_sequential() {
    let interner = TypeInterner::new();
    let depth = 24;
    let parallel = declare_chain(&interner, depth);
    let sequential = declare_chain(&interner, depth);

    let names: Vec<String> = (0..depth).rev().map(|level| format!("Level{level}")).collect();
    let resolved: Vec<(String, TypeId)> = names
        .par_iter()
        .map(|name| (name.clone(), parallel.resolve(name).expect("resolves")))
        .collect();

    for (name, id) in resolved {
        assert_eq!(sequential.resolve(&name), Ok(id), "{name}");
    }
    let deepest = parallel.resolve(&format!("Level{}", depth - 1)).expect("resolves");
    let members = interner.object_members_in_order(deepest).expect("object");
    assert_eq!(members.len(), depth);
}

#[test]
fn test_concurrent_assignability_queries_share_the_registry() {
    let interner = TypeInterner::new();
    let depth = 12;
    let registry = declare_chain(&interner, depth);

    let pairs: Vec<(usize, usize)> = (0..depth)
        .flat_map(|a| (0..depth).map(move |b| (a, b)))
        .collect();
    let answers: Vec<((usize, usize), bool)> = pairs
        .par_iter()
        .map(|&(a, b)| {
            let mut checker = SubtypeChecker::new(&interner).with_resolver(&registry);
            let source = interner.reference(&format!("Level{a}"));
            let target = interner.reference(&format!("Level{b}"));
            ((a, b), checker.is_assignable(source, target))
        })
        .collect();

    // A deeper level carries every field of the shallower ones.
    for ((a, b), related) in answers {
        assert_eq!(related, a >= b, "Level{a} to Level{b}");
    }
}

#[test]
fn test_concurrent_resolution_of_failing_interfaces() {
    let interner = TypeInterner::new();
    let mut registry = InterfaceRegistry::new(&interner);
    registry.declare("Ping", Vec::new(), &["Pong"]);
    registry.declare("Pong", Vec::new(), &["Ping"]);
    registry.declare("Orphan", Vec::new(), &["Missing"]);
    registry.declare("Solid", vec![prop(&interner, "ok", TypeId::BOOLEAN)], &[]);

    let outcomes: Vec<(&str, Result<TypeId, RegistryError>)> = ["Ping", "Pong", "Orphan", "Solid"]
        .into_par_iter()
        .map(|name| (name, registry.resolve(name)))
        .collect();

    for (name, outcome) in outcomes {
        match name {
            "Ping" | "Pong" => assert!(matches!(
                outcome,
                Err(RegistryError::CyclicInheritance { .. })
            )),
            "Orphan" => assert_eq!(
                outcome,
                Err(RegistryError::UnknownInterface {
                    name: "Missing".to_string()
                })
            ),
            _ => assert!(outcome.is_ok()),
        }
    }
}
