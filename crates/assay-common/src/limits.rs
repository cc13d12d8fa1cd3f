//! Centralized limits and thresholds for the checker.
//!
//! The solver's recursion guards, the interface registry and the type printer
//! all read their bounds from here.

/// Maximum nesting depth of a single assignability check.
///
/// Structural types are finite trees, and named interface references are
/// compared by name before they are expanded, so legitimate checks stay far
/// below this. Hitting it means a pathological structure; the check answers
/// "not assignable" and logs a warning.
pub const MAX_SUBTYPE_DEPTH: u32 = 100;

/// Total number of relation steps a single top-level check may take.
pub const MAX_SUBTYPE_ITERATIONS: u32 = 100_000;

/// Maximum length of an `extends` chain followed while resolving one interface.
///
/// Cycles are detected separately and reported as `CyclicInheritance`;
/// this only bounds very long acyclic chains.
pub const MAX_INHERITANCE_DEPTH: u32 = 256;

/// Maximum nesting depth while printing a type.
///
/// Deeper structure is elided as `...`.
pub const MAX_FORMAT_DEPTH: u32 = 32;

/// Number of union members printed before the rest are summarized.
pub const MAX_FORMAT_UNION_MEMBERS: usize = 25;
