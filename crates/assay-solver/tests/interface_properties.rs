//! Interface declaration merging, `extends` resolution and override rules.

use super::*;

fn prop(interner: &TypeInterner, name: &str, type_id: TypeId) -> PropertyInfo {
    PropertyInfo::new(interner.intern_string(name), type_id)
}

// =============================================================================
// Declaration merging
// =============================================================================

#[test]
fn test_merged_declarations_expose_every_member() {
    let interner = TypeInterner::new();
    let mut registry = InterfaceRegistry::new(&interner);
    registry.declare("Merged", vec![prop(&interner, "fromFirst", TypeId::STRING)], &[]);
    registry.declare("Merged", vec![prop(&interner, "fromSecond", TypeId::NUMBER)], &[]);
    assert_eq!(registry.declaration_count(), 1);

    let resolved = registry.resolve("Merged").expect("merges");
    assert_eq!(
        interner.display(resolved),
        "{ fromFirst: string; fromSecond: number; }"
    );

    let value = interner.object(vec![
        prop(&interner, "fromFirst", interner.literal_string("")),
        prop(&interner, "fromSecond", interner.literal_number(0.0)),
    ]);
    assert!(is_assignable(&interner, value, resolved));

    let mut checker = SubtypeChecker::new(&interner).with_resolver(&registry);
    assert!(checker.is_assignable(value, interner.reference("Merged")));

    let only_first = interner.object(vec![prop(&interner, "fromFirst", TypeId::STRING)]);
    assert!(!checker.is_assignable(only_first, interner.reference("Merged")));
}

#[test]
fn test_merged_literal_is_not_excess() {
    let interner = TypeInterner::new();
    let mut registry = InterfaceRegistry::new(&interner);
    registry.declare("Merged", vec![prop(&interner, "fromFirst", TypeId::STRING)], &[]);
    let merged = registry
        .register("Merged", vec![prop(&interner, "fromSecond", TypeId::NUMBER)], &[])
        .expect("merges");

    let literal = interner.fresh_object(vec![
        prop(&interner, "fromFirst", interner.literal_string("")),
        prop(&interner, "fromSecond", interner.literal_number(0.0)),
    ]);
    let mut compat = CompatChecker::new(&interner).with_resolver(&registry);
    assert_eq!(compat.check_assignment(literal, merged), Ok(()));
}

#[test]
fn test_merge_conflict_does_not_block_other_interfaces() {
    let interner = TypeInterner::new();
    let mut registry = InterfaceRegistry::new(&interner);
    registry.declare("Broken", vec![prop(&interner, "id", TypeId::STRING)], &[]);
    registry.declare("Broken", vec![prop(&interner, "id", TypeId::NUMBER)], &[]);
    registry.declare("Fine", vec![prop(&interner, "id", TypeId::NUMBER)], &[]);

    let outcomes = registry.resolve_all();
    assert!(matches!(
        outcomes[0].1,
        Err(RegistryError::ConflictingMember { .. })
    ));
    assert!(outcomes[1].1.is_ok());
}

// =============================================================================
// Override legality
// =============================================================================

#[test]
fn test_override_may_narrow_member_type() {
    let interner = TypeInterner::new();
    let mut registry = InterfaceRegistry::new(&interner);
    let nullable = interner.union(vec![TypeId::STRING, TypeId::NULL]);
    registry.declare("Named", vec![prop(&interner, "name", nullable)], &[]);
    registry.declare("Person", vec![prop(&interner, "name", TypeId::STRING)], &["Named"]);

    let person = registry.resolve("Person").expect("narrowing override is legal");
    assert_eq!(interner.display(person), "{ name: string; }");

    let mut checker = SubtypeChecker::new(&interner).with_resolver(&registry);
    assert!(checker.is_assignable(interner.reference("Person"), interner.reference("Named")));
    assert!(!checker.is_assignable(interner.reference("Named"), interner.reference("Person")));
}

#[test]
fn test_override_may_not_widen_member_type() {
    let interner = TypeInterner::new();
    let mut registry = InterfaceRegistry::new(&interner);
    let nullable = interner.union(vec![TypeId::STRING, TypeId::NULL]);
    let wide = interner.union(vec![TypeId::STRING, TypeId::NUMBER]);
    registry.declare("Named", vec![prop(&interner, "name", nullable)], &[]);
    registry.declare("Labelled", vec![prop(&interner, "name", wide)], &["Named"]);

    let err = registry.resolve("Labelled").unwrap_err();
    assert_eq!(
        err,
        RegistryError::IncompatibleOverride {
            interface: "Labelled".to_string(),
            base: "Named".to_string(),
            member: "name".to_string(),
            derived_type: "string | number".to_string(),
            base_type: "string | null".to_string(),
        }
    );
    assert_eq!(err.code(), 2430);
    assert!(registry.resolve("Named").is_ok());
}

// =============================================================================
// Cycles
// =============================================================================

#[test]
fn test_inheritance_cycle_is_reported_with_its_path() {
    let interner = TypeInterner::new();
    let mut registry = InterfaceRegistry::new(&interner);
    registry.declare("A", Vec::new(), &["B"]);
    registry.declare("B", Vec::new(), &["C"]);
    registry.declare("C", Vec::new(), &["A"]);
    registry.declare("D", vec![prop(&interner, "ok", TypeId::BOOLEAN)], &[]);

    assert_eq!(
        registry.resolve("A"),
        Err(RegistryError::CyclicInheritance {
            cycle: vec!["A".into(), "B".into(), "C".into(), "A".into()],
        })
    );
    for name in ["B", "C"] {
        assert!(matches!(
            registry.resolve(name),
            Err(RegistryError::CyclicInheritance { .. })
        ));
    }
    assert!(registry.resolve("D").is_ok());
}

#[test]
fn test_member_reference_cycle_is_not_an_inheritance_cycle() {
    let interner = TypeInterner::new();
    let mut registry = InterfaceRegistry::new(&interner);
    registry.declare(
        "Author",
        vec![
            prop(&interner, "name", TypeId::STRING),
            prop(&interner, "books", interner.array(interner.reference("Book"))),
        ],
        &[],
    );
    registry.declare(
        "Book",
        vec![
            prop(&interner, "title", TypeId::STRING),
            prop(&interner, "author", interner.reference("Author")),
        ],
        &[],
    );
    assert!(registry.resolve_all().iter().all(|(_, outcome)| outcome.is_ok()));

    let mut checker = SubtypeChecker::new(&interner).with_resolver(&registry);
    assert!(checker.is_assignable(interner.reference("Book"), interner.reference("Book")));
    assert!(!checker.is_assignable(interner.reference("Author"), interner.reference("Book")));
}

/// `Base { child: Base | null }`, `X extends Base { child: <x_child> }`,
/// `Y extends X {}`. X's override refers to Y, which inherits from X.
fn declare_subtype_reference(interner: &TypeInterner, x_child: TypeId) -> InterfaceRegistry<'_> {
    let mut registry = InterfaceRegistry::new(interner);
    registry.declare(
        "Base",
        vec![prop(
            interner,
            "child",
            interner.union(vec![interner.reference("Base"), TypeId::NULL]),
        )],
        &[],
    );
    registry.declare("X", vec![prop(interner, "child", x_child)], &["Base"]);
    registry.declare("Y", Vec::new(), &["X"]);
    registry
}

#[test]
fn test_override_referring_to_a_subtype_resolves_in_any_order() {
    let interner = TypeInterner::new();
    let child = interner.union(vec![interner.reference("Y"), TypeId::NULL]);

    let x_first = declare_subtype_reference(&interner, child);
    let x = x_first.resolve("X").expect("X resolves");
    assert_eq!(x_first.resolve("Y"), Ok(x));

    let y_first = declare_subtype_reference(&interner, child);
    let y = y_first.resolve("Y").expect("Y resolves");
    assert_eq!(y_first.resolve("X"), Ok(y));
    assert_eq!(x, y);
    assert_eq!(interner.display(x), "{ child: Y | null; }");
}

#[test]
fn test_override_referring_to_a_subtype_in_declaration_order() {
    let interner = TypeInterner::new();
    let child = interner.union(vec![interner.reference("Y"), TypeId::NULL]);
    let registry = declare_subtype_reference(&interner, child);
    let outcomes = registry.resolve_all();
    let names: Vec<String> = outcomes
        .iter()
        .map(|(name, _)| interner.resolve_atom(*name))
        .collect();
    assert_eq!(names, ["Base", "X", "Y"]);
    for (name, outcome) in &outcomes {
        assert!(outcome.is_ok(), "{}: {:?}", interner.resolve_atom(*name), outcome);
    }

    let mut session = CheckSession::new(&interner, assay_common::CheckerOptions::default())
        .with_registry(&registry);
    assert_eq!(session.resolve_interfaces(), 0);
    assert!(session.diagnostics().is_empty());
}

#[test]
fn test_bad_override_next_to_a_subtype_reference_fails_in_any_order() {
    let interner = TypeInterner::new();
    let child = interner.union(vec![interner.reference("Y"), TypeId::NUMBER]);
    let expected = RegistryError::IncompatibleOverride {
        interface: "X".into(),
        base: "Base".into(),
        member: "child".into(),
        derived_type: "Y | number".into(),
        base_type: "Base | null".into(),
    };

    let x_first = declare_subtype_reference(&interner, child);
    assert_eq!(x_first.resolve("X"), Err(expected.clone()));
    assert_eq!(x_first.resolve("Y"), Err(expected.clone()));

    let y_first = declare_subtype_reference(&interner, child);
    assert_eq!(y_first.resolve("Y"), Err(expected.clone()));
    assert_eq!(y_first.resolve("X"), Err(expected));
}
