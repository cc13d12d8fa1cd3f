use super::*;

fn bounded(max_depth: u32, max_iterations: u32) -> RecursionGuard<u32> {
    RecursionGuard::new(RecursionLimits {
        max_depth,
        max_iterations,
    })
}

#[test]
fn test_enter_and_leave_track_depth() {
    let mut guard = bounded(4, 100);
    assert!(guard.enter(1).is_entered());
    assert!(guard.enter(2).is_entered());
    assert_eq!(guard.depth(), 2);
    assert!(guard.is_visiting(&1));
    guard.leave(2);
    guard.leave(1);
    assert_eq!(guard.depth(), 0);
    assert!(!guard.is_visiting(&1));
}

#[test]
fn test_revisit_is_a_cycle() {
    let mut guard: RecursionGuard<(u32, u32)> = RecursionGuard::default();
    assert!(guard.enter((1, 2)).is_entered());
    assert!(guard.enter((2, 1)).is_entered());
    let again = guard.enter((1, 2));
    assert!(again.is_cycle());
    assert!(!again.is_exceeded());
    assert!(!guard.is_exceeded());
    guard.leave((2, 1));
    guard.leave((1, 2));
}

#[test]
fn test_depth_limit() {
    let mut guard = bounded(2, 100);
    assert!(guard.enter(1).is_entered());
    assert!(guard.enter(2).is_entered());
    assert_eq!(guard.enter(3), RecursionResult::DepthExceeded);
    assert!(guard.is_exceeded());
    guard.leave(2);
    guard.leave(1);
}

#[test]
fn test_iteration_limit_counts_every_step() {
    let mut guard = bounded(10, 3);
    for key in 0..3 {
        assert!(guard.enter(key).is_entered());
        guard.leave(key);
    }
    assert_eq!(guard.enter(99), RecursionResult::IterationExceeded);
    assert!(guard.is_exceeded());
}

#[test]
fn test_reset_clears_limits() {
    let mut guard = bounded(10, 1);
    assert!(guard.enter(1).is_entered());
    guard.leave(1);
    assert!(guard.enter(2).is_exceeded());
    guard.reset();
    assert!(!guard.is_exceeded());
    assert!(guard.enter(2).is_entered());
    guard.leave(2);
}

#[test]
fn test_within_pairs_enter_and_leave() {
    let mut guard = bounded(10, 100);
    assert_eq!(guard.within(7, || 42), Ok(42));
    assert_eq!(guard.depth(), 0);

    assert!(guard.enter(7).is_entered());
    assert_eq!(guard.within(7, || 0), Err(RecursionResult::Cycle));
    guard.leave(7);
}

#[test]
fn test_default_limits_are_the_subtype_bounds() {
    let guard: RecursionGuard<u32> = RecursionGuard::default();
    assert_eq!(guard.limits().max_depth, assay_common::limits::MAX_SUBTYPE_DEPTH);
    assert_eq!(
        guard.limits().max_iterations,
        assay_common::limits::MAX_SUBTYPE_ITERATIONS
    );
}
