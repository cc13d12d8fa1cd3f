//! Structural type solver.
//!
//! Decides whether one type is assignable to another and computes the
//! narrowest type of a binding at a program point:
//!
//! - **Interning**: every structurally distinct type is stored once, so type
//!   equality is `TypeId` equality
//! - **Interfaces**: declaration merging, `extends` resolution and override
//!   checks, memoized for concurrent read-only queries
//! - **Relations**: the assignability rules, with literal-site excess property
//!   checks and call-site arity checks layered on top
//! - **Narrowing**: `typeof`, equality and truthiness guards over persistent
//!   per-branch environments
//!
//! Findings are values ([`CheckError`], [`RegistryError`]); a
//! [`CheckSession`] collects them all as diagnostics.

mod apparent;
pub mod call;
pub mod compat;
mod diagnostics;
pub mod flow;
mod format;
pub mod infer;
mod intern;
pub mod narrowing;
pub mod operations;
pub mod recursion;
pub mod registry;
pub mod session;
mod subtype;
pub mod types;

pub use intern::TypeInterner;

pub use apparent::{
    ApparentMember, ApparentMemberKind, ApparentParam, apparent_array_member,
    apparent_primitive_kind, apparent_primitive_member, apparent_primitive_members,
};
pub use call::{Argument, CallEvaluator, CallResult, arg_count_bounds, check_arity, check_call};
pub use compat::CompatChecker;
pub use diagnostics::{
    CheckError, DiagnosticTracer, FastTracer, SubtypeFailureReason, SubtypeTracer,
    mismatch_message,
};
pub use flow::{Binding, FlowAnalyzer, FlowEnv};
pub use format::TypeFormatter;
pub use infer::{
    ArrayElement, BindingKind, Expr, FunctionExpr, Inference, Inferencer, ParamExpr,
};
pub use narrowing::{NarrowingAdvisory, NarrowingContext, TypeGuard, TypeofKind};
pub use operations::{MemberType, PropertyAccessEvaluator, PropertyAccessResult};
pub use recursion::{RecursionGuard, RecursionLimits, RecursionResult};
pub use registry::{InterfaceDeclaration, InterfaceRegistry, RegistryError};
pub use session::CheckSession;
pub use subtype::{NoopResolver, RefResolution, SubtypeChecker, TypeResolver, is_assignable};
pub use types::{
    FunctionShape, FunctionShapeId, IntrinsicKind, InvalidType, LiteralValue, ObjectFlags,
    ObjectShape, ObjectShapeId, OrderedFloat, ParamInfo, PropertyInfo, TypeData, TypeId,
    TypeListId,
};

// Unit tests are loaded by their source files via #[path = "tests/..."].
// The files below exercise several modules together.
#[cfg(test)]
#[path = "../tests/assignability_properties.rs"]
mod assignability_properties;
#[cfg(test)]
#[path = "../tests/interface_properties.rs"]
mod interface_properties;
#[cfg(test)]
#[path = "../tests/narrowing_properties.rs"]
mod narrowing_properties;
#[cfg(test)]
#[path = "../tests/call_site_tests.rs"]
mod call_site_tests;
#[cfg(test)]
#[path = "../tests/concurrency_tests.rs"]
mod concurrency_tests;
#[cfg(test)]
#[path = "../tests/session_integration_tests.rs"]
mod session_integration_tests;
