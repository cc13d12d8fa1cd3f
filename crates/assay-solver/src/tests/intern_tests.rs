use super::*;

fn prop(interner: &TypeInterner, name: &str, type_id: TypeId) -> PropertyInfo {
    PropertyInfo::new(interner.intern_string(name), type_id)
}

// =============================================================================
// Interning
// =============================================================================

#[test]
fn test_intrinsics_are_preinterned() {
    let interner = TypeInterner::new();
    assert!(interner.is_empty());
    assert_eq!(interner.intrinsic(IntrinsicKind::String), TypeId::STRING);
    assert_eq!(
        interner.lookup(TypeId::NUMBER),
        Some(TypeData::Intrinsic(IntrinsicKind::Number))
    );
    assert_eq!(interner.literal_boolean(true), TypeId::BOOLEAN_TRUE);
    assert_eq!(
        interner.intern(TypeData::Literal(LiteralValue::Boolean(false))),
        TypeId::BOOLEAN_FALSE
    );
}

#[test]
fn test_structurally_equal_types_share_an_id() {
    let interner = TypeInterner::new();
    let a = interner.literal_string("Lovelace");
    let b = interner.literal_string("Lovelace");
    assert_eq!(a, b);
    assert!(interner.structurally_equal(a, b));

    let arr1 = interner.array(TypeId::STRING);
    let arr2 = interner.array(TypeId::STRING);
    assert_eq!(arr1, arr2);
    assert_ne!(arr1, interner.array(TypeId::NUMBER));
}

#[test]
fn test_lookup_of_foreign_id_is_none() {
    let interner = TypeInterner::new();
    assert_eq!(interner.lookup(TypeId(99_999)), None);
    assert_eq!(interner.lookup(TypeId(12)), None);
}

#[test]
fn test_readonly_flag_distinguishes_tuples() {
    let interner = TypeInterner::new();
    let mutable = interner.tuple(vec![TypeId::NUMBER, TypeId::STRING]);
    let readonly = interner.readonly_tuple(vec![TypeId::NUMBER, TypeId::STRING]);
    assert_ne!(mutable, readonly);
    assert_eq!(interner.tuple_elements(readonly).map(|(_, r)| r), Some(true));
    assert_eq!(interner.tuple_elements(mutable).map(|(e, _)| e.len()), Some(2));
}

#[test]
fn test_zero_and_negative_zero_literals_are_the_same_type() {
    let interner = TypeInterner::new();
    assert_eq!(interner.literal_number(0.0), interner.literal_number(-0.0));
}

// =============================================================================
// Union normalization
// =============================================================================

#[test]
fn test_union_is_order_independent() {
    let interner = TypeInterner::new();
    let a = interner.union(vec![TypeId::STRING, TypeId::NUMBER]);
    let b = interner.union(vec![TypeId::NUMBER, TypeId::STRING]);
    assert_eq!(a, b);
}

#[test]
fn test_union_keeps_first_written_order_for_display() {
    let interner = TypeInterner::new();
    let union = interner.union(vec![TypeId::STRING, TypeId::NUMBER]);
    let members = interner.union_members(union).expect("union");
    assert_eq!(&*members, &[TypeId::STRING, TypeId::NUMBER]);
}

#[test]
fn test_union_flattens_and_deduplicates() {
    let interner = TypeInterner::new();
    let inner = interner.union(vec![TypeId::STRING, TypeId::NUMBER]);
    let outer = interner.union(vec![inner, TypeId::STRING, TypeId::NULL]);
    assert_eq!(
        interner.union_or_single(outer),
        vec![TypeId::STRING, TypeId::NUMBER, TypeId::NULL]
    );
}

#[test]
fn test_union_single_member_collapses() {
    let interner = TypeInterner::new();
    assert_eq!(interner.union(vec![TypeId::STRING, TypeId::STRING]), TypeId::STRING);
    assert_eq!(interner.union(vec![TypeId::NEVER, TypeId::NUMBER]), TypeId::NUMBER);
}

#[test]
fn test_empty_union_is_never_or_an_error() {
    let interner = TypeInterner::new();
    assert_eq!(interner.union(Vec::new()), TypeId::NEVER);
    assert_eq!(interner.try_union(Vec::new()), Err(InvalidType::EmptyUnion));
    assert_eq!(interner.try_union(vec![TypeId::NUMBER]), Ok(TypeId::NUMBER));
}

#[test]
fn test_unknown_absorbs_unions_but_any_is_kept_as_a_member() {
    let interner = TypeInterner::new();
    assert_eq!(interner.union(vec![TypeId::UNKNOWN, TypeId::NUMBER]), TypeId::UNKNOWN);
    assert_eq!(interner.union(vec![TypeId::ANY, TypeId::UNKNOWN]), TypeId::UNKNOWN);

    let loose = interner.union(vec![TypeId::ANY, TypeId::STRING]);
    assert_ne!(loose, TypeId::ANY);
    assert_eq!(interner.union_or_single(loose), vec![TypeId::ANY, TypeId::STRING]);
    assert_eq!(interner.display(loose), "any | string");
    assert_eq!(interner.union(vec![TypeId::ANY, TypeId::NEVER]), TypeId::ANY);
}

#[test]
fn test_literals_absorbed_by_base_primitive() {
    let interner = TypeInterner::new();
    let hedy = interner.literal_string("Hedy");
    assert_eq!(interner.union(vec![hedy, TypeId::STRING]), TypeId::STRING);

    let one = interner.literal_number(1.0);
    let union = interner.union(vec![one, hedy, TypeId::NUMBER]);
    assert_eq!(interner.union_or_single(union), vec![hedy, TypeId::NUMBER]);
}

#[test]
fn test_true_or_false_collapses_to_boolean() {
    let interner = TypeInterner::new();
    assert_eq!(
        interner.union(vec![TypeId::BOOLEAN_TRUE, TypeId::BOOLEAN_FALSE]),
        TypeId::BOOLEAN
    );
    let union = interner.union(vec![TypeId::STRING, TypeId::BOOLEAN_FALSE, TypeId::BOOLEAN_TRUE]);
    assert_eq!(interner.union_or_single(union), vec![TypeId::STRING, TypeId::BOOLEAN]);
}

#[test]
fn test_with_undefined_adds_a_member() {
    let interner = TypeInterner::new();
    let optional = interner.with_undefined(TypeId::NUMBER);
    assert_eq!(
        interner.union_or_single(optional),
        vec![TypeId::NUMBER, TypeId::UNDEFINED]
    );
    assert_eq!(interner.with_undefined(optional), optional);
}

// =============================================================================
// Objects and functions
// =============================================================================

#[test]
fn test_object_member_order_does_not_matter() {
    let interner = TypeInterner::new();
    let pages = prop(&interner, "pages", TypeId::NUMBER);
    let author = prop(&interner, "author", TypeId::STRING);
    let a = interner.object(vec![pages.clone(), author.clone()]);
    let b = interner.object(vec![author, pages]);
    assert_eq!(a, b);
}

#[test]
fn test_freshness_is_part_of_identity_and_can_be_dropped() {
    let interner = TypeInterner::new();
    let pages = prop(&interner, "pages", TypeId::NUMBER);
    let fresh = interner.fresh_object(vec![pages.clone()]);
    let regular = interner.object(vec![pages]);
    assert_ne!(fresh, regular);
    assert!(interner.is_fresh_object(fresh));
    assert!(!interner.is_fresh_object(regular));
    assert_eq!(interner.widen_freshness(fresh), regular);
}

#[test]
fn test_widen_freshness_reaches_nested_literals() {
    let interner = TypeInterner::new();
    let inner = interner.fresh_object(vec![prop(&interner, "x", TypeId::NUMBER)]);
    let outer = interner.fresh_object(vec![prop(&interner, "point", inner)]);
    let widened = interner.widen_freshness(outer);
    let shape = interner.object_shape_of(widened).expect("object");
    let point = shape.find(interner.intern_string("point")).expect("point");
    assert!(!interner.is_fresh_object(point.type_id));
}

#[test]
fn test_widen_literal_through_unions() {
    let interner = TypeInterner::new();
    let union = interner.union(vec![interner.literal_number(1.0), interner.literal_string("a")]);
    let widened = interner.widen_literal(union);
    assert_eq!(interner.union_or_single(widened), vec![TypeId::NUMBER, TypeId::STRING]);
    assert_eq!(interner.widen_literal(TypeId::BOOLEAN_TRUE), TypeId::BOOLEAN);
}

#[test]
fn test_try_function_validates_parameter_list() {
    let interner = TypeInterner::new();
    let name = |s: &str| interner.intern_string(s);

    let ok = interner.try_function(
        vec![
            ParamInfo::required(name("values"), interner.array(TypeId::STRING)),
            ParamInfo::optional(name("count"), TypeId::NUMBER),
            ParamInfo::rest(name("rest"), interner.array(TypeId::NUMBER)),
        ],
        TypeId::NUMBER,
    );
    assert!(ok.is_ok());

    let rest_not_last = interner.try_function(
        vec![
            ParamInfo::rest(name("rest"), interner.array(TypeId::NUMBER)),
            ParamInfo::required(name("x"), TypeId::NUMBER),
        ],
        TypeId::VOID,
    );
    assert_eq!(
        rest_not_last,
        Err(InvalidType::RestParameterNotLast {
            name: "rest".to_string()
        })
    );

    let rest_not_array =
        interner.try_function(vec![ParamInfo::rest(name("rest"), TypeId::NUMBER)], TypeId::VOID);
    assert!(matches!(rest_not_array, Err(InvalidType::RestParameterNotArray { .. })));

    let required_after_optional = interner.try_function(
        vec![
            ParamInfo::optional(name("a"), TypeId::NUMBER),
            ParamInfo::required(name("b"), TypeId::NUMBER),
        ],
        TypeId::VOID,
    );
    assert!(matches!(
        required_after_optional,
        Err(InvalidType::RequiredAfterOptional { .. })
    ));
}

#[test]
fn test_function_shape_counts() {
    let shape = FunctionShape::new(
        vec![
            ParamInfo::unnamed(TypeId::STRING),
            ParamInfo {
                optional: true,
                ..ParamInfo::unnamed(TypeId::NUMBER)
            },
            ParamInfo {
                rest: true,
                ..ParamInfo::unnamed(TypeId::ANY)
            },
        ],
        TypeId::VOID,
    );
    assert_eq!(shape.required_count(), 1);
    assert_eq!(shape.positional_count(), 2);
    assert!(shape.has_rest());
}

#[test]
fn test_concurrent_interning_agrees() {
    use std::sync::Arc;
    use std::thread;

    let interner = Arc::new(TypeInterner::new());
    let handles: Vec<_> = (0..4)
        .map(|_| {
            let interner = Arc::clone(&interner);
            thread::spawn(move || {
                (0..64)
                    .map(|i| interner.literal_number(f64::from(i)))
                    .collect::<Vec<_>>()
            })
        })
        .collect();
    let results: Vec<Vec<TypeId>> = handles
        .into_iter()
        .map(|h| h.join().expect("interning thread panicked"))
        .collect();
    for result in &results[1..] {
        assert_eq!(result, &results[0]);
    }
}
