//! Type narrowing by runtime guards.
//!
//! ```text
//! typeof x === "string"     -> TypeGuard::Typeof(TypeofKind::String)
//! x === "Lovelace"          -> TypeGuard::Equality(literal)
//! x                         -> TypeGuard::Truthy
//! ```
//!
//! Narrowing is a pure function of (type, guard, branch). It never changes
//! the binding it was given; per-branch environments live in `flow`.
//!
//! Narrowing to `never` is a legitimate answer (the branch cannot run), not
//! an error. [`NarrowingContext::narrow_with_advisory`] surfaces such results
//! as advisory diagnostics.

use crate::types::*;
use crate::TypeInterner;
use assay_common::{Diagnostic, diagnostic_codes, diagnostic_messages, format_message};
use tracing::{Level, span, trace};

/// Result strings of the `typeof` operator that narrowing understands.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TypeofKind {
    String,
    Number,
    Boolean,
    Undefined,
    Object,
    Function,
}

impl TypeofKind {
    pub fn parse(tag: &str) -> Option<Self> {
        Some(match tag {
            "string" => Self::String,
            "number" => Self::Number,
            "boolean" => Self::Boolean,
            "undefined" => Self::Undefined,
            "object" => Self::Object,
            "function" => Self::Function,
            _ => return None,
        })
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Number => "number",
            Self::Boolean => "boolean",
            Self::Undefined => "undefined",
            Self::Object => "object",
            Self::Function => "function",
        }
    }

    /// What `unknown` narrows to when this tag matches.
    fn primitive(self) -> Option<TypeId> {
        match self {
            Self::String => Some(TypeId::STRING),
            Self::Number => Some(TypeId::NUMBER),
            Self::Boolean => Some(TypeId::BOOLEAN),
            Self::Undefined => Some(TypeId::UNDEFINED),
            Self::Object | Self::Function => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TypeGuard {
    /// `typeof x === "tag"`
    Typeof(TypeofKind),
    /// `x === value` where `value` is a literal, `null` or `undefined` type.
    Equality(TypeId),
    /// `if (x)`
    Truthy,
}

/// A legitimate but noteworthy narrowing outcome.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NarrowingAdvisory {
    /// The branch narrows a non-`never` binding to `never`.
    UnreachableBranch { binding: TypeId },
    /// An equality guard compares against a value the binding can never hold.
    NoOverlap { binding: TypeId, value: TypeId },
}

impl NarrowingAdvisory {
    pub fn code(&self) -> u32 {
        match self {
            Self::UnreachableBranch { .. } => diagnostic_codes::UNREACHABLE_CODE_DETECTED,
            Self::NoOverlap { .. } => diagnostic_codes::THIS_COMPARISON_APPEARS_TO_BE_UNINTENTIONAL,
        }
    }

    /// Render as a suggestion-level diagnostic.
    pub fn to_diagnostic(&self, interner: &TypeInterner) -> Diagnostic {
        match self {
            Self::UnreachableBranch { .. } => {
                Diagnostic::suggestion(diagnostic_messages::UNREACHABLE_CODE_DETECTED, self.code())
            }
            Self::NoOverlap { binding, value } => Diagnostic::suggestion(
                format_message(
                    diagnostic_messages::THIS_COMPARISON_APPEARS_TO_BE_UNINTENTIONAL,
                    &[&interner.display(*binding), &interner.display(*value)],
                ),
                self.code(),
            ),
        }
    }
}

pub struct NarrowingContext<'a> {
    interner: &'a TypeInterner,
}

impl<'a> NarrowingContext<'a> {
    pub fn new(interner: &'a TypeInterner) -> Self {
        NarrowingContext { interner }
    }

    /// The type of a binding of type `source` inside the `branch` arm of `guard`.
    pub fn narrow(&self, source: TypeId, guard: TypeGuard, branch: bool) -> TypeId {
        let _span = span!(Level::TRACE, "narrow", source = source.0, branch).entered();
        let result = match guard {
            TypeGuard::Typeof(kind) if branch => self.narrow_by_typeof(source, kind),
            TypeGuard::Typeof(kind) => self.narrow_by_typeof_negation(source, kind),
            TypeGuard::Equality(value) if branch => self.narrow_to_value(source, value),
            TypeGuard::Equality(value) => self.narrow_excluding_value(source, value),
            TypeGuard::Truthy if branch => self.narrow_by_truthiness(source),
            TypeGuard::Truthy => self.narrow_to_falsy(source),
        };
        trace!(result = result.0, "narrowed");
        result
    }

    /// [`narrow`](Self::narrow), plus an advisory when the outcome is degenerate.
    pub fn narrow_with_advisory(
        &self,
        source: TypeId,
        guard: TypeGuard,
        branch: bool,
    ) -> (TypeId, Option<NarrowingAdvisory>) {
        let result = self.narrow(source, guard, branch);
        let advisory = match guard {
            TypeGuard::Equality(value)
                if branch && result == TypeId::NEVER && !self.admits_value(source, value) =>
            {
                Some(NarrowingAdvisory::NoOverlap {
                    binding: source,
                    value,
                })
            }
            _ if result == TypeId::NEVER && source != TypeId::NEVER => {
                Some(NarrowingAdvisory::UnreachableBranch { binding: source })
            }
            _ => None,
        };
        (result, advisory)
    }

    /// Union members, with `boolean` split into `true | false`.
    fn members(&self, type_id: TypeId) -> Vec<TypeId> {
        let mut members = Vec::new();
        for member in self.interner.union_or_single(type_id) {
            if member == TypeId::BOOLEAN {
                members.push(TypeId::BOOLEAN_TRUE);
                members.push(TypeId::BOOLEAN_FALSE);
            } else {
                members.push(member);
            }
        }
        members
    }

    fn rebuild(&self, members: Vec<TypeId>) -> TypeId {
        self.interner.union(members)
    }

    /// The `typeof` result of values of `type_id`, when it has exactly one.
    fn typeof_of(&self, type_id: TypeId) -> Option<TypeofKind> {
        match self.interner.lookup(type_id)? {
            TypeData::Intrinsic(kind) => kind.typeof_tag().and_then(TypeofKind::parse),
            TypeData::Literal(LiteralValue::String(_)) => Some(TypeofKind::String),
            TypeData::Literal(LiteralValue::Number(_)) => Some(TypeofKind::Number),
            TypeData::Literal(LiteralValue::Boolean(_)) => Some(TypeofKind::Boolean),
            TypeData::Function(_) => Some(TypeofKind::Function),
            TypeData::Array(_)
            | TypeData::Tuple { .. }
            | TypeData::Object(_)
            | TypeData::Ref(_) => Some(TypeofKind::Object),
            TypeData::Union(_) => None,
        }
    }

    pub fn narrow_by_typeof(&self, source: TypeId, kind: TypeofKind) -> TypeId {
        if source == TypeId::ANY {
            return TypeId::ANY;
        }
        if source == TypeId::UNKNOWN {
            return kind.primitive().unwrap_or(TypeId::UNKNOWN);
        }
        let kept = self
            .members(source)
            .into_iter()
            .filter_map(|m| match m {
                TypeId::ANY => Some(kind.primitive().unwrap_or(TypeId::ANY)),
                _ if self.typeof_of(m) == Some(kind) => Some(m),
                _ => None,
            })
            .collect();
        self.rebuild(kept)
    }

    fn narrow_by_typeof_negation(&self, source: TypeId, kind: TypeofKind) -> TypeId {
        if source == TypeId::ANY || source == TypeId::UNKNOWN {
            return source;
        }
        let kept = self
            .members(source)
            .into_iter()
            .filter(|&m| self.typeof_of(m) != Some(kind))
            .collect();
        self.rebuild(kept)
    }

    /// Could a value of `source` be equal to the unit type `value`?
    fn admits_value(&self, source: TypeId, value: TypeId) -> bool {
        if source == TypeId::ANY || source == TypeId::UNKNOWN {
            return true;
        }
        let base = self
            .interner
            .literal_value(value)
            .map(|literal| literal.base_type());
        self.members(source).into_iter().any(|m| {
            m == value
                || m == TypeId::ANY
                || base == Some(m)
                || (value == TypeId::UNDEFINED && m == TypeId::VOID)
        })
    }

    fn narrow_to_value(&self, source: TypeId, value: TypeId) -> TypeId {
        if self.admits_value(source, value) {
            value
        } else {
            TypeId::NEVER
        }
    }

    fn narrow_excluding_value(&self, source: TypeId, value: TypeId) -> TypeId {
        if source == TypeId::ANY || source == TypeId::UNKNOWN {
            return source;
        }
        let kept = self
            .members(source)
            .into_iter()
            .filter(|&m| m != value)
            .collect();
        self.rebuild(kept)
    }

    fn is_definitely_falsy(&self, type_id: TypeId) -> bool {
        type_id.is_nullish()
            || self
                .interner
                .literal_value(type_id)
                .is_some_and(|literal| literal.is_falsy())
    }

    fn narrow_by_truthiness(&self, source: TypeId) -> TypeId {
        if source == TypeId::ANY || source == TypeId::UNKNOWN {
            return source;
        }
        let kept = self
            .members(source)
            .into_iter()
            .filter(|&m| !self.is_definitely_falsy(m))
            .collect();
        self.rebuild(kept)
    }

    /// The falsy part of `source`: `string` becomes `""`, `number` becomes
    /// `0`, `boolean` becomes `false`; nullish members and falsy literals stay.
    pub fn narrow_to_falsy(&self, source: TypeId) -> TypeId {
        if source == TypeId::ANY || source == TypeId::UNKNOWN {
            return source;
        }
        let kept = self
            .members(source)
            .into_iter()
            .filter_map(|m| self.falsy_component(m))
            .collect();
        self.rebuild(kept)
    }

    fn falsy_component(&self, type_id: TypeId) -> Option<TypeId> {
        if self.is_definitely_falsy(type_id) {
            return Some(type_id);
        }
        match type_id {
            TypeId::ANY => Some(TypeId::ANY),
            TypeId::STRING => Some(self.interner.literal_string("")),
            TypeId::NUMBER => Some(self.interner.literal_number(0.0)),
            _ => None,
        }
    }
}

#[cfg(test)]
#[path = "tests/narrowing_tests.rs"]
mod tests;
