//! Bookkeeping for one top-level relation query.
//!
//! Assignability recurses through members, elements and parameters. Named
//! interface references are the only way a query can revisit itself; the
//! guard keeps the pairs currently in progress so a revisit is reported as a
//! [`RecursionResult::Cycle`] instead of recursing forever. Depth and total
//! step counts are bounded so pathological inputs fail instead of overflowing
//! the stack.

use assay_common::limits;
use smallvec::SmallVec;

/// Depth and step bounds for a guard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecursionLimits {
    pub max_depth: u32,
    pub max_iterations: u32,
}

impl RecursionLimits {
    /// Bounds for assignability between two types.
    pub const SUBTYPE: RecursionLimits = RecursionLimits {
        max_depth: limits::MAX_SUBTYPE_DEPTH,
        max_iterations: limits::MAX_SUBTYPE_ITERATIONS,
    };
}

impl Default for RecursionLimits {
    fn default() -> Self {
        Self::SUBTYPE
    }
}

/// Outcome of [`RecursionGuard::enter`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecursionResult {
    Entered,
    /// The key is already in progress further up.
    Cycle,
    DepthExceeded,
    IterationExceeded,
}

impl RecursionResult {
    #[inline]
    pub fn is_entered(self) -> bool {
        self == Self::Entered
    }

    #[inline]
    pub fn is_cycle(self) -> bool {
        self == Self::Cycle
    }

    #[inline]
    pub fn is_exceeded(self) -> bool {
        matches!(self, Self::DepthExceeded | Self::IterationExceeded)
    }
}

/// Stack of in-progress keys plus a step counter.
///
/// Depth is the stack height. Stacks stay shallow in practice, so membership
/// is a linear scan over inline storage.
pub struct RecursionGuard<K: PartialEq + Copy> {
    limits: RecursionLimits,
    active: SmallVec<[K; 16]>,
    steps: u32,
    tripped: bool,
}

impl<K: PartialEq + Copy> RecursionGuard<K> {
    pub fn new(limits: RecursionLimits) -> Self {
        Self {
            limits,
            active: SmallVec::new(),
            steps: 0,
            tripped: false,
        }
    }

    pub fn limits(&self) -> RecursionLimits {
        self.limits
    }

    /// Push `key` unless it is already active or a bound is hit.
    ///
    /// Every `Entered` must be matched by a [`leave`](Self::leave).
    pub fn enter(&mut self, key: K) -> RecursionResult {
        self.steps = self.steps.saturating_add(1);
        let outcome = if self.steps > self.limits.max_iterations {
            RecursionResult::IterationExceeded
        } else if self.depth() >= self.limits.max_depth {
            RecursionResult::DepthExceeded
        } else if self.active.contains(&key) {
            RecursionResult::Cycle
        } else {
            self.active.push(key);
            RecursionResult::Entered
        };
        self.tripped |= outcome.is_exceeded();
        outcome
    }

    /// Pop `key`. Keys leave in the reverse order they entered.
    pub fn leave(&mut self, key: K) {
        let popped = self.active.pop();
        debug_assert!(popped == Some(key), "recursion guard left out of order");
    }

    /// Run `body` with `key` active; a refused entry is returned as the error.
    pub fn within<T>(&mut self, key: K, body: impl FnOnce() -> T) -> Result<T, RecursionResult> {
        match self.enter(key) {
            RecursionResult::Entered => {
                let value = body();
                self.leave(key);
                Ok(value)
            }
            refused => Err(refused),
        }
    }

    #[inline]
    pub fn is_visiting(&self, key: &K) -> bool {
        self.active.contains(key)
    }

    #[inline]
    pub fn depth(&self) -> u32 {
        self.active.len() as u32
    }

    /// Whether a bound was hit since the last [`reset`](Self::reset).
    #[inline]
    pub fn is_exceeded(&self) -> bool {
        self.tripped
    }

    pub fn reset(&mut self) {
        self.active.clear();
        self.steps = 0;
        self.tripped = false;
    }
}

impl<K: PartialEq + Copy> Default for RecursionGuard<K> {
    fn default() -> Self {
        Self::new(RecursionLimits::default())
    }
}

#[cfg(test)]
#[path = "tests/recursion_tests.rs"]
mod tests;
