//! Narrowing guards and per-branch binding environments.

use super::*;

fn string_or_number(interner: &TypeInterner) -> TypeId {
    interner.union(vec![TypeId::STRING, TypeId::NUMBER])
}

// =============================================================================
// Round trip
// =============================================================================

#[test]
fn test_typeof_round_trip_on_string_or_number() {
    let interner = TypeInterner::new();
    let ctx = NarrowingContext::new(&interner);
    let binding = string_or_number(&interner);
    let guard = TypeGuard::Typeof(TypeofKind::String);
    assert_eq!(ctx.narrow(binding, guard, true), TypeId::STRING);
    assert_eq!(ctx.narrow(binding, guard, false), TypeId::NUMBER);
}

#[test]
fn test_branches_partition_a_union() {
    let interner = TypeInterner::new();
    let ctx = NarrowingContext::new(&interner);
    let source = interner.union(vec![
        TypeId::STRING,
        TypeId::NUMBER,
        TypeId::BOOLEAN,
        TypeId::UNDEFINED,
        interner.array(TypeId::STRING),
    ]);
    let kinds = [
        TypeofKind::String,
        TypeofKind::Number,
        TypeofKind::Boolean,
        TypeofKind::Undefined,
        TypeofKind::Object,
        TypeofKind::Function,
    ];
    for kind in kinds {
        let guard = TypeGuard::Typeof(kind);
        let then_type = ctx.narrow(source, guard, true);
        let else_type = ctx.narrow(source, guard, false);
        assert_eq!(
            interner.union(vec![then_type, else_type]),
            source,
            "typeof {}",
            kind.as_str()
        );
        assert!(is_assignable(&interner, then_type, source));
        assert!(is_assignable(&interner, else_type, source));
    }
}

#[test]
fn test_truthiness_partitions_a_nullable_union() {
    let interner = TypeInterner::new();
    let ctx = NarrowingContext::new(&interner);
    let book = interner.object(vec![PropertyInfo::new(
        interner.intern_string("pages"),
        TypeId::NUMBER,
    )]);
    let source = interner.union(vec![book, TypeId::NULL, TypeId::UNDEFINED]);
    assert_eq!(ctx.narrow(source, TypeGuard::Truthy, true), book);
    assert_eq!(
        ctx.narrow(source, TypeGuard::Truthy, false),
        interner.union(vec![TypeId::NULL, TypeId::UNDEFINED])
    );
}

// =============================================================================
// Branch environments
// =============================================================================

#[test]
fn test_sibling_branches_do_not_see_each_other() {
    let interner = TypeInterner::new();
    let mut flow = FlowAnalyzer::new(&interner);
    let mut pre = FlowEnv::new();
    let declared = string_or_number(&interner);
    flow.declare(&mut pre, "value", declared, Some(declared))
        .expect("declares");

    let guard = TypeGuard::Typeof(TypeofKind::String);
    let mut then_env = flow.narrowed(&pre, "value", guard, true).expect("narrows");
    let else_env = flow.narrowed(&pre, "value", guard, false).expect("narrows");
    flow.assign(&mut then_env, "value", interner.literal_number(7.0))
        .expect("assigns");

    assert_eq!(flow.read(&then_env, "value"), Ok(TypeId::NUMBER));
    assert_eq!(flow.read(&else_env, "value"), Ok(TypeId::NUMBER));
    assert_eq!(flow.read(&pre, "value"), Ok(declared));
}

#[test]
fn test_narrowing_is_undone_at_the_join() {
    let interner = TypeInterner::new();
    let mut flow = FlowAnalyzer::new(&interner);
    let mut pre = FlowEnv::new();
    let declared = string_or_number(&interner);
    flow.declare(&mut pre, "value", declared, Some(declared))
        .expect("declares");

    let guard = TypeGuard::Typeof(TypeofKind::String);
    let then_env = flow.narrowed(&pre, "value", guard, true).expect("narrows");
    assert_eq!(flow.read(&then_env, "value"), Ok(TypeId::STRING));

    // An `if` without `else`: the fall-through path is the pre-branch env.
    let merged = flow.merge(&pre, &[then_env, pre.clone()]);
    assert_eq!(flow.read(&merged, "value"), Ok(declared));
}

#[test]
fn test_assignment_inside_branch_survives_the_join() {
    let interner = TypeInterner::new();
    let mut flow = FlowAnalyzer::new(&interner);
    let mut pre = FlowEnv::new();
    let declared = interner.union(vec![TypeId::STRING, TypeId::NUMBER, TypeId::NULL]);
    flow.declare(&mut pre, "label", declared, Some(TypeId::NULL))
        .expect("declares");
    assert_eq!(flow.read(&pre, "label"), Ok(TypeId::NULL));

    let mut then_env = pre.clone();
    let mut else_env = pre.clone();
    flow.assign(&mut then_env, "label", interner.literal_string("draft"))
        .expect("assigns");
    flow.assign(&mut else_env, "label", interner.literal_number(0.0))
        .expect("assigns");

    let merged = flow.merge(&pre, &[then_env, else_env]);
    assert_eq!(flow.read(&merged, "label"), Ok(string_or_number(&interner)));
}
