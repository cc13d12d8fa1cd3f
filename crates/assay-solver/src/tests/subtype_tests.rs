use super::*;
use crate::diagnostics::SubtypeFailureReason;
use assay_common::CheckerOptions;
use rustc_hash::FxHashMap;

/// Resolves references from a fixed table.
struct MapResolver(FxHashMap<Atom, TypeId>);

impl TypeResolver for MapResolver {
    fn resolve_ref(&self, name: Atom) -> RefResolution {
        self.0
            .get(&name)
            .copied()
            .map_or(RefResolution::Unresolved, RefResolution::Resolved)
    }
}

fn func(interner: &TypeInterner, params: Vec<ParamInfo>, ret: TypeId) -> TypeId {
    interner.function(FunctionShape::new(params, ret))
}

fn param(interner: &TypeInterner, name: &str, type_id: TypeId) -> ParamInfo {
    ParamInfo::required(interner.intern_string(name), type_id)
}

fn prop(interner: &TypeInterner, name: &str, type_id: TypeId) -> PropertyInfo {
    PropertyInfo::new(interner.intern_string(name), type_id)
}

// =============================================================================
// Top, bottom and primitives
// =============================================================================

#[test]
fn test_any_relates_both_ways() {
    let interner = TypeInterner::new();
    let mut checker = SubtypeChecker::new(&interner);
    let arr = interner.array(TypeId::STRING);
    assert!(checker.is_assignable(TypeId::ANY, arr));
    assert!(checker.is_assignable(arr, TypeId::ANY));
    assert!(checker.is_assignable(TypeId::ANY, TypeId::NEVER));
}

#[test]
fn test_unknown_accepts_everything_but_flows_nowhere() {
    let interner = TypeInterner::new();
    let mut checker = SubtypeChecker::new(&interner);
    assert!(checker.is_assignable(TypeId::NUMBER, TypeId::UNKNOWN));
    assert!(checker.is_assignable(TypeId::NULL, TypeId::UNKNOWN));
    assert!(!checker.is_assignable(TypeId::UNKNOWN, TypeId::STRING));
    assert!(checker.is_assignable(TypeId::UNKNOWN, TypeId::ANY));
}

#[test]
fn test_never_is_bottom() {
    let interner = TypeInterner::new();
    let mut checker = SubtypeChecker::new(&interner);
    assert!(checker.is_assignable(TypeId::NEVER, TypeId::STRING));
    assert!(!checker.is_assignable(TypeId::STRING, TypeId::NEVER));
    assert!(!checker.is_assignable(TypeId::UNDEFINED, TypeId::NEVER));
}

#[test]
fn test_literal_relates_to_its_primitive_only() {
    let interner = TypeInterner::new();
    let mut checker = SubtypeChecker::new(&interner);
    let hedy = interner.literal_string("Hedy");
    assert!(checker.is_assignable(hedy, TypeId::STRING));
    assert!(!checker.is_assignable(TypeId::STRING, hedy));
    assert!(!checker.is_assignable(hedy, TypeId::NUMBER));
    assert!(checker.is_assignable(TypeId::BOOLEAN_TRUE, TypeId::BOOLEAN));
}

#[test]
fn test_undefined_is_assignable_to_void() {
    let interner = TypeInterner::new();
    let mut checker = SubtypeChecker::new(&interner);
    assert!(checker.is_assignable(TypeId::UNDEFINED, TypeId::VOID));
    assert!(!checker.is_assignable(TypeId::NULL, TypeId::VOID));
}

#[test]
fn test_null_is_rejected_under_strict_null_checks() {
    let interner = TypeInterner::new();
    let mut checker = SubtypeChecker::new(&interner);
    assert!(!checker.is_assignable(TypeId::NULL, TypeId::STRING));
    assert!(!checker.is_assignable(TypeId::UNDEFINED, TypeId::NUMBER));
}

#[test]
fn test_null_is_accepted_without_strict_null_checks() {
    let interner = TypeInterner::new();
    let mut checker = SubtypeChecker::new(&interner).with_options(&CheckerOptions::loose());
    assert!(checker.is_assignable(TypeId::NULL, TypeId::STRING));
    assert!(checker.is_assignable(TypeId::UNDEFINED, interner.array(TypeId::NUMBER)));
    assert!(!checker.is_assignable(TypeId::NULL, TypeId::NEVER));
}

// =============================================================================
// Unions
// =============================================================================

#[test]
fn test_source_union_needs_every_member() {
    let interner = TypeInterner::new();
    let mut checker = SubtypeChecker::new(&interner);
    let string_or_number = interner.union(vec![TypeId::STRING, TypeId::NUMBER]);
    let wide = interner.union(vec![TypeId::STRING, TypeId::NUMBER, TypeId::BOOLEAN]);
    assert!(checker.is_assignable(string_or_number, wide));
    assert!(!checker.is_assignable(string_or_number, TypeId::STRING));

    let reason = checker.explain_failure(string_or_number, TypeId::STRING);
    assert!(matches!(
        reason,
        Some(SubtypeFailureReason::UnionMemberMismatch { member, .. }) if member == TypeId::NUMBER
    ));
}

#[test]
fn test_target_union_needs_some_member() {
    let interner = TypeInterner::new();
    let mut checker = SubtypeChecker::new(&interner);
    let target = interner.union(vec![TypeId::STRING, TypeId::UNDEFINED]);
    assert!(checker.is_assignable(interner.literal_string("x"), target));
    assert!(checker.is_assignable(TypeId::UNDEFINED, target));
    assert_eq!(
        checker.explain_failure(TypeId::NUMBER, target),
        Some(SubtypeFailureReason::NoUnionMemberMatches {
            source: TypeId::NUMBER,
            target,
        })
    );
}

#[test]
fn test_boolean_is_true_or_false() {
    let interner = TypeInterner::new();
    let mut checker = SubtypeChecker::new(&interner);
    assert!(!checker.is_assignable(TypeId::BOOLEAN, TypeId::BOOLEAN_TRUE));
    let either = interner.union(vec![TypeId::BOOLEAN_TRUE, TypeId::BOOLEAN_FALSE]);
    assert!(checker.is_assignable(TypeId::BOOLEAN, either));
}

// =============================================================================
// Arrays and tuples
// =============================================================================

#[test]
fn test_arrays_are_covariant() {
    let interner = TypeInterner::new();
    let mut checker = SubtypeChecker::new(&interner);
    let strings = interner.array(TypeId::STRING);
    let mixed = interner.array(interner.union(vec![TypeId::STRING, TypeId::NUMBER]));
    assert!(checker.is_assignable(strings, mixed));
    assert!(!checker.is_assignable(mixed, strings));
    assert!(matches!(
        checker.explain_failure(mixed, strings),
        Some(SubtypeFailureReason::ArrayElementMismatch { .. })
    ));
}

#[test]
fn test_tuples_relate_elementwise() {
    let interner = TypeInterner::new();
    let mut checker = SubtypeChecker::new(&interner);
    let literal_pair = interner.tuple(vec![interner.literal_number(1.0), TypeId::STRING]);
    let pair = interner.tuple(vec![TypeId::NUMBER, TypeId::STRING]);
    assert!(checker.is_assignable(literal_pair, pair));
    assert!(!checker.is_assignable(pair, literal_pair));

    let swapped = interner.tuple(vec![TypeId::STRING, TypeId::NUMBER]);
    assert!(matches!(
        checker.explain_failure(swapped, pair),
        Some(SubtypeFailureReason::TupleElementMismatch { index: 0, .. })
    ));
}

#[test]
fn test_tuple_arity_must_match() {
    let interner = TypeInterner::new();
    let mut checker = SubtypeChecker::new(&interner);
    let three = interner.tuple(vec![TypeId::BOOLEAN, TypeId::NUMBER, TypeId::STRING]);
    let two = interner.tuple(vec![TypeId::BOOLEAN, TypeId::NUMBER]);
    assert_eq!(
        checker.explain_failure(three, two),
        Some(SubtypeFailureReason::TupleArityMismatch {
            source_count: 3,
            target_count: 2,
        })
    );
    assert!(!checker.is_assignable(two, three));
}

#[test]
fn test_readonly_tuple_does_not_flow_into_mutable() {
    let interner = TypeInterner::new();
    let mut checker = SubtypeChecker::new(&interner);
    let readonly = interner.readonly_tuple(vec![TypeId::NUMBER, TypeId::STRING]);
    let mutable = interner.tuple(vec![TypeId::NUMBER, TypeId::STRING]);
    assert!(checker.is_assignable(mutable, readonly));
    assert_eq!(
        checker.explain_failure(readonly, mutable),
        Some(SubtypeFailureReason::ReadonlyToMutable {
            source: readonly,
            target: mutable,
        })
    );
}

#[test]
fn test_tuple_to_array_and_not_back() {
    let interner = TypeInterner::new();
    let mut checker = SubtypeChecker::new(&interner);
    let tuple = interner.tuple(vec![TypeId::NUMBER, TypeId::STRING]);
    let mixed = interner.array(interner.union(vec![TypeId::NUMBER, TypeId::STRING]));
    assert!(checker.is_assignable(tuple, mixed));
    assert!(!checker.is_assignable(tuple, interner.array(TypeId::NUMBER)));
    assert!(matches!(
        checker.explain_failure(mixed, tuple),
        Some(SubtypeFailureReason::ArrayToTuple { target_count: 2, .. })
    ));
}

#[test]
fn test_empty_tuple_relates_to_any_array() {
    let interner = TypeInterner::new();
    let mut checker = SubtypeChecker::new(&interner);
    let empty = interner.tuple(Vec::new());
    assert!(checker.is_assignable(empty, interner.array(TypeId::STRING)));
}

// =============================================================================
// Functions
// =============================================================================

#[test]
fn test_function_may_ignore_parameters() {
    let interner = TypeInterner::new();
    let mut checker = SubtypeChecker::new(&interner);
    let one = func(&interner, vec![param(&interner, "a", TypeId::NUMBER)], TypeId::VOID);
    let two = func(
        &interner,
        vec![
            param(&interner, "a", TypeId::NUMBER),
            param(&interner, "b", TypeId::STRING),
        ],
        TypeId::VOID,
    );
    assert!(checker.is_assignable(one, two));
    assert_eq!(
        checker.explain_failure(two, one),
        Some(SubtypeFailureReason::TooManyParameters {
            source_required: 2,
            target_count: 1,
        })
    );
}

#[test]
fn test_optional_parameter_is_not_required() {
    let interner = TypeInterner::new();
    let mut checker = SubtypeChecker::new(&interner);
    let with_optional = func(
        &interner,
        vec![
            param(&interner, "a", TypeId::NUMBER),
            ParamInfo::optional(interner.intern_string("b"), TypeId::STRING),
        ],
        TypeId::VOID,
    );
    let one = func(&interner, vec![param(&interner, "a", TypeId::NUMBER)], TypeId::VOID);
    assert!(checker.is_assignable(with_optional, one));
}

#[test]
fn test_parameters_are_contravariant() {
    let interner = TypeInterner::new();
    let mut checker = SubtypeChecker::new(&interner);
    let wide = func(
        &interner,
        vec![param(&interner, "x", interner.union(vec![TypeId::STRING, TypeId::NUMBER]))],
        TypeId::VOID,
    );
    let narrow = func(&interner, vec![param(&interner, "x", TypeId::STRING)], TypeId::VOID);
    assert!(checker.is_assignable(wide, narrow));
    assert!(matches!(
        checker.explain_failure(narrow, wide),
        Some(SubtypeFailureReason::ParameterTypeMismatch { ref source_param, .. }) if source_param == "x"
    ));
}

#[test]
fn test_return_types_are_covariant() {
    let interner = TypeInterner::new();
    let mut checker = SubtypeChecker::new(&interner);
    let returns_literal = func(&interner, Vec::new(), interner.literal_string("ok"));
    let returns_string = func(&interner, Vec::new(), TypeId::STRING);
    assert!(checker.is_assignable(returns_literal, returns_string));
    assert!(matches!(
        checker.explain_failure(returns_string, returns_literal),
        Some(SubtypeFailureReason::ReturnTypeMismatch { .. })
    ));
}

#[test]
fn test_void_return_target_accepts_any_return() {
    let interner = TypeInterner::new();
    let mut checker = SubtypeChecker::new(&interner);
    let returns_number = func(&interner, Vec::new(), TypeId::NUMBER);
    let returns_void = func(&interner, Vec::new(), TypeId::VOID);
    assert!(checker.is_assignable(returns_number, returns_void));
    assert!(!checker.is_assignable(returns_void, returns_number));
}

#[test]
fn test_rest_parameter_covers_positional_target() {
    let interner = TypeInterner::new();
    let mut checker = SubtypeChecker::new(&interner);
    let variadic = func(
        &interner,
        vec![ParamInfo::rest(interner.intern_string("xs"), interner.array(TypeId::NUMBER))],
        TypeId::VOID,
    );
    let two_numbers = func(
        &interner,
        vec![
            param(&interner, "a", TypeId::NUMBER),
            param(&interner, "b", TypeId::NUMBER),
        ],
        TypeId::VOID,
    );
    let one_string = func(&interner, vec![param(&interner, "a", TypeId::STRING)], TypeId::VOID);
    assert!(checker.is_assignable(variadic, two_numbers));
    assert!(!checker.is_assignable(variadic, one_string));
}

#[test]
fn test_required_parameters_do_not_fit_rest_target_of_other_type() {
    let interner = TypeInterner::new();
    let mut checker = SubtypeChecker::new(&interner);
    let target = func(
        &interner,
        vec![ParamInfo::rest(interner.intern_string("xs"), interner.array(TypeId::STRING))],
        TypeId::VOID,
    );
    let takes_string = func(&interner, vec![param(&interner, "s", TypeId::STRING)], TypeId::VOID);
    let takes_number = func(&interner, vec![param(&interner, "n", TypeId::NUMBER)], TypeId::VOID);
    assert!(checker.is_assignable(takes_string, target));
    assert!(!checker.is_assignable(takes_number, target));
}

// =============================================================================
// Objects
// =============================================================================

#[test]
fn test_object_width_subtyping() {
    let interner = TypeInterner::new();
    let mut checker = SubtypeChecker::new(&interner);
    let book = interner.object(vec![
        prop(&interner, "pages", TypeId::NUMBER),
        prop(&interner, "author", TypeId::STRING),
    ]);
    let pages_only = interner.object(vec![prop(&interner, "pages", TypeId::NUMBER)]);
    assert!(checker.is_assignable(book, pages_only));
    assert!(matches!(
        checker.explain_failure(pages_only, book),
        Some(SubtypeFailureReason::MissingProperty { .. })
    ));
}

#[test]
fn test_structural_check_ignores_freshness() {
    let interner = TypeInterner::new();
    let mut checker = SubtypeChecker::new(&interner);
    let fresh = interner.fresh_object(vec![
        prop(&interner, "pages", TypeId::NUMBER),
        prop(&interner, "extra", TypeId::STRING),
    ]);
    let pages_only = interner.object(vec![prop(&interner, "pages", TypeId::NUMBER)]);
    assert!(checker.is_assignable(fresh, pages_only));
}

#[test]
fn test_optional_members() {
    let interner = TypeInterner::new();
    let mut checker = SubtypeChecker::new(&interner);
    let author = interner.intern_string("author");
    let optional = interner.object(vec![PropertyInfo::opt(author, TypeId::STRING)]);
    let required = interner.object(vec![PropertyInfo::new(author, TypeId::STRING)]);
    let empty = interner.object(Vec::new());

    assert!(checker.is_assignable(empty, optional));
    assert!(checker.is_assignable(required, optional));
    assert_eq!(
        checker.explain_failure(optional, required),
        Some(SubtypeFailureReason::OptionalProperty {
            property: author,
            source: optional,
            target: required,
        })
    );
}

#[test]
fn test_member_type_mismatch() {
    let interner = TypeInterner::new();
    let mut checker = SubtypeChecker::new(&interner);
    let as_string = interner.object(vec![prop(&interner, "pages", TypeId::STRING)]);
    let as_number = interner.object(vec![prop(&interner, "pages", TypeId::NUMBER)]);
    assert!(matches!(
        checker.explain_failure(as_string, as_number),
        Some(SubtypeFailureReason::PropertyTypeMismatch { .. })
    ));
}

#[test]
fn test_unrelated_kinds_do_not_relate() {
    let interner = TypeInterner::new();
    let mut checker = SubtypeChecker::new(&interner);
    let obj = interner.object(Vec::new());
    let arr = interner.array(TypeId::NUMBER);
    assert!(!checker.is_assignable(arr, obj));
    assert!(!checker.is_assignable(TypeId::STRING, obj));
    assert_eq!(
        checker.explain_failure(TypeId::NUMBER, TypeId::STRING),
        Some(SubtypeFailureReason::TypeMismatch {
            source: TypeId::NUMBER,
            target: TypeId::STRING,
        })
    );
}

// =============================================================================
// Named references
// =============================================================================

#[test]
fn test_same_reference_relates_without_resolver() {
    let interner = TypeInterner::new();
    let mut checker = SubtypeChecker::new(&interner);
    let writer = interner.reference("Writer");
    assert!(checker.is_assignable(writer, writer));
    assert!(matches!(
        checker.explain_failure(writer, interner.object(Vec::new())),
        Some(SubtypeFailureReason::UnresolvedReference { .. })
    ));
}

#[test]
fn test_references_expand_through_resolver() {
    let interner = TypeInterner::new();
    let pages = prop(&interner, "pages", TypeId::NUMBER);
    let novel = interner.object(vec![pages.clone(), prop(&interner, "author", TypeId::STRING)]);
    let book = interner.object(vec![pages]);
    let mut table = FxHashMap::default();
    table.insert(interner.intern_string("Novel"), novel);
    table.insert(interner.intern_string("Book"), book);
    let resolver = MapResolver(table);

    let mut checker = SubtypeChecker::new(&interner).with_resolver(&resolver);
    let novel_ref = interner.reference("Novel");
    let book_ref = interner.reference("Book");
    assert!(checker.is_assignable(novel_ref, book_ref));
    assert!(!checker.is_assignable(book_ref, novel_ref));
    assert!(checker.is_assignable(novel, book_ref));
}

#[test]
fn test_self_referential_interfaces_terminate() {
    let interner = TypeInterner::new();
    let node_ref = interner.reference("Node");
    let link_ref = interner.reference("Link");
    let node = interner.object(vec![
        prop(&interner, "value", TypeId::NUMBER),
        PropertyInfo::opt(interner.intern_string("next"), node_ref),
    ]);
    let link = interner.object(vec![
        prop(&interner, "value", TypeId::NUMBER),
        PropertyInfo::opt(interner.intern_string("next"), link_ref),
    ]);
    let mut table = FxHashMap::default();
    table.insert(interner.intern_string("Node"), node);
    table.insert(interner.intern_string("Link"), link);
    let resolver = MapResolver(table);

    let mut checker = SubtypeChecker::new(&interner).with_resolver(&resolver);
    assert!(checker.is_assignable(node_ref, link_ref));
    assert!(checker.is_assignable(link_ref, node_ref));
}

#[test]
fn test_free_function_matches_checker() {
    let interner = TypeInterner::new();
    let tuple = interner.tuple(vec![TypeId::NUMBER]);
    assert!(is_assignable(&interner, tuple, interner.array(TypeId::NUMBER)));
    assert!(!is_assignable(&interner, interner.array(TypeId::NUMBER), tuple));
}
