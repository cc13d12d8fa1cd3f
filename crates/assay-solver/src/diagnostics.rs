//! Failure reasons and checker findings.
//!
//! The relation checker is written once and parameterized by a tracer:
//! [`FastTracer`] answers yes/no and never builds a reason, while
//! [`DiagnosticTracer`] records the first [`SubtypeFailureReason`] for error
//! messages. Findings reported to callers are [`CheckError`] values, which
//! render to [`assay_common::Diagnostic`]s with TypeScript's codes.

use crate::registry::RegistryError;
use crate::types::{InvalidType, TypeId};
use crate::TypeInterner;
use assay_common::diagnostics::lookup_message;
use assay_common::{Atom, Diagnostic, diagnostic_codes, diagnostic_messages, format_message};

// =============================================================================
// Tracers
// =============================================================================

pub trait SubtypeTracer {
    /// Called when a mismatch is detected.
    ///
    /// `reason` is only invoked by tracers that keep it. Returns whether
    /// checking should continue.
    fn on_mismatch(&mut self, reason: impl FnOnce() -> SubtypeFailureReason) -> bool;
}

/// Boolean-only tracer. Never constructs a reason.
pub struct FastTracer;

impl SubtypeTracer for FastTracer {
    #[inline(always)]
    fn on_mismatch(&mut self, _reason: impl FnOnce() -> SubtypeFailureReason) -> bool {
        false
    }
}

/// Keeps the first failure reason reported.
#[derive(Default)]
pub struct DiagnosticTracer {
    failure: Option<SubtypeFailureReason>,
}

impl DiagnosticTracer {
    pub fn new() -> Self {
        Self { failure: None }
    }

    pub fn take_failure(&mut self) -> Option<SubtypeFailureReason> {
        self.failure.take()
    }

    pub fn has_failure(&self) -> bool {
        self.failure.is_some()
    }
}

impl SubtypeTracer for DiagnosticTracer {
    #[inline]
    fn on_mismatch(&mut self, reason: impl FnOnce() -> SubtypeFailureReason) -> bool {
        if self.failure.is_none() {
            self.failure = Some(reason());
        }
        false
    }
}

// =============================================================================
// Failure reasons
// =============================================================================

/// Why a source type is not assignable to a target type.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SubtypeFailureReason {
    TypeMismatch {
        source: TypeId,
        target: TypeId,
    },
    /// A readonly tuple flowing into a mutable tuple.
    ReadonlyToMutable {
        source: TypeId,
        target: TypeId,
    },
    TupleArityMismatch {
        source_count: usize,
        target_count: usize,
    },
    /// An array has no fixed length, so it never satisfies a tuple.
    ArrayToTuple {
        source: TypeId,
        target_count: usize,
    },
    TupleElementMismatch {
        index: usize,
        source_element: TypeId,
        target_element: TypeId,
        nested: Option<Box<SubtypeFailureReason>>,
    },
    ArrayElementMismatch {
        source_element: TypeId,
        target_element: TypeId,
        nested: Option<Box<SubtypeFailureReason>>,
    },
    MissingProperty {
        property: Atom,
        source: TypeId,
        target: TypeId,
    },
    OptionalProperty {
        property: Atom,
        source: TypeId,
        target: TypeId,
    },
    PropertyTypeMismatch {
        property: Atom,
        source_property: TypeId,
        target_property: TypeId,
        nested: Option<Box<SubtypeFailureReason>>,
    },
    /// A branch of a source union is not assignable to the target.
    UnionMemberMismatch {
        member: TypeId,
        target: TypeId,
        nested: Option<Box<SubtypeFailureReason>>,
    },
    NoUnionMemberMatches {
        source: TypeId,
        target: TypeId,
    },
    /// The source function requires more arguments than the target supplies.
    TooManyParameters {
        source_required: usize,
        target_count: usize,
    },
    ParameterTypeMismatch {
        source_param: String,
        target_param: String,
        source_type: TypeId,
        target_type: TypeId,
    },
    ReturnTypeMismatch {
        source_return: TypeId,
        target_return: TypeId,
        nested: Option<Box<SubtypeFailureReason>>,
    },
    ExcessProperty {
        property: Atom,
        target: TypeId,
    },
    UnresolvedReference {
        name: Atom,
    },
    RecursionLimit,
}

impl SubtypeFailureReason {
    /// Render this reason as a chain of message lines, outermost first.
    pub fn message_chain(&self, interner: &TypeInterner) -> Vec<(u32, String)> {
        let mut chain = Vec::new();
        self.push_messages(interner, &mut chain);
        chain
    }

    fn push_messages(&self, interner: &TypeInterner, chain: &mut Vec<(u32, String)>) {
        let ty = |id: TypeId| interner.display(id);
        let name = |atom: Atom| interner.resolve_atom(atom);
        match self {
            Self::TypeMismatch { source, target } => push_line(
                chain,
                diagnostic_codes::TYPE_IS_NOT_ASSIGNABLE_TO_TYPE,
                &[&ty(*source), &ty(*target)],
            ),
            Self::ReadonlyToMutable { source, target } => push_line(
                chain,
                diagnostic_codes::THE_TYPE_IS_READONLY_AND_CANNOT_BE_ASSIGNED_TO_THE_MUTABLE_TYPE,
                &[&ty(*source), &ty(*target)],
            ),
            Self::TupleArityMismatch {
                source_count,
                target_count,
            } => {
                let code = if source_count < target_count {
                    diagnostic_codes::SOURCE_HAS_ELEMENTS_BUT_TARGET_REQUIRES
                } else {
                    diagnostic_codes::SOURCE_HAS_ELEMENTS_BUT_TARGET_ALLOWS_ONLY
                };
                push_line(chain, code, &[&source_count.to_string(), &target_count.to_string()]);
            }
            Self::ArrayToTuple { target_count, .. } => push_line(
                chain,
                diagnostic_codes::TARGET_REQUIRES_ELEMENTS_BUT_SOURCE_MAY_HAVE_FEWER,
                &[&target_count.to_string()],
            ),
            Self::TupleElementMismatch {
                source_element,
                target_element,
                nested,
                ..
            }
            | Self::ArrayElementMismatch {
                source_element,
                target_element,
                nested,
            } => {
                push_line(
                    chain,
                    diagnostic_codes::TYPE_IS_NOT_ASSIGNABLE_TO_TYPE,
                    &[&ty(*source_element), &ty(*target_element)],
                );
                if let Some(nested) = nested {
                    nested.push_messages(interner, chain);
                }
            }
            Self::MissingProperty {
                property,
                source,
                target,
            } => push_line(
                chain,
                diagnostic_codes::PROPERTY_IS_MISSING_IN_TYPE_BUT_REQUIRED_IN_TYPE,
                &[&name(*property), &ty(*source), &ty(*target)],
            ),
            Self::OptionalProperty {
                property,
                source,
                target,
            } => push_line(
                chain,
                diagnostic_codes::PROPERTY_IS_OPTIONAL_IN_TYPE_BUT_REQUIRED_IN_TYPE,
                &[&name(*property), &ty(*source), &ty(*target)],
            ),
            Self::PropertyTypeMismatch {
                property,
                source_property,
                target_property,
                nested,
            } => {
                push_line(
                    chain,
                    diagnostic_codes::TYPES_OF_PROPERTY_ARE_INCOMPATIBLE,
                    &[&name(*property)],
                );
                match nested {
                    Some(nested) => nested.push_messages(interner, chain),
                    None => push_line(
                        chain,
                        diagnostic_codes::TYPE_IS_NOT_ASSIGNABLE_TO_TYPE,
                        &[&ty(*source_property), &ty(*target_property)],
                    ),
                }
            }
            Self::UnionMemberMismatch {
                member,
                target,
                nested,
            } => {
                push_line(
                    chain,
                    diagnostic_codes::TYPE_IS_NOT_ASSIGNABLE_TO_TYPE,
                    &[&ty(*member), &ty(*target)],
                );
                if let Some(nested) = nested {
                    nested.push_messages(interner, chain);
                }
            }
            Self::NoUnionMemberMatches { source, target } => push_line(
                chain,
                diagnostic_codes::TYPE_IS_NOT_ASSIGNABLE_TO_TYPE,
                &[&ty(*source), &ty(*target)],
            ),
            Self::TooManyParameters {
                source_required,
                target_count,
            } => push_line(
                chain,
                diagnostic_codes::TARGET_SIGNATURE_PROVIDES_TOO_FEW_ARGUMENTS,
                &[&source_required.to_string(), &target_count.to_string()],
            ),
            Self::ParameterTypeMismatch {
                source_param,
                target_param,
                source_type,
                target_type,
            } => {
                push_line(
                    chain,
                    diagnostic_codes::TYPES_OF_PARAMETERS_ARE_INCOMPATIBLE,
                    &[source_param.as_str(), target_param.as_str()],
                );
                push_line(
                    chain,
                    diagnostic_codes::TYPE_IS_NOT_ASSIGNABLE_TO_TYPE,
                    &[&ty(*target_type), &ty(*source_type)],
                );
            }
            Self::ReturnTypeMismatch {
                source_return,
                target_return,
                nested,
            } => {
                push_line(
                    chain,
                    diagnostic_codes::TYPE_IS_NOT_ASSIGNABLE_TO_TYPE,
                    &[&ty(*source_return), &ty(*target_return)],
                );
                if let Some(nested) = nested {
                    nested.push_messages(interner, chain);
                }
            }
            Self::ExcessProperty { property, target } => push_line(
                chain,
                diagnostic_codes::OBJECT_LITERAL_MAY_ONLY_SPECIFY_KNOWN_PROPERTIES,
                &[&name(*property), &ty(*target)],
            ),
            Self::UnresolvedReference { name: reference } => {
                push_line(chain, diagnostic_codes::CANNOT_FIND_NAME, &[&name(*reference)])
            }
            Self::RecursionLimit => chain.push((
                0,
                "Type comparison is excessively deep and was not completed.".to_string(),
            )),
        }
    }
}

fn push_line(chain: &mut Vec<(u32, String)>, code: u32, args: &[&str]) {
    let template = lookup_message(code).map_or("", |m| m.message);
    chain.push((code, format_message(template, args)));
}

// =============================================================================
// Findings
// =============================================================================

/// A finding reported by a check.
///
/// Findings are values, not panics: a batch of checks collects all of them.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CheckError {
    /// The source type is not assignable to the target.
    TypeMismatch {
        source: TypeId,
        target: TypeId,
        reason: Option<SubtypeFailureReason>,
    },
    /// An argument is not assignable to its parameter.
    ArgumentMismatch {
        index: usize,
        source: TypeId,
        target: TypeId,
        reason: Option<SubtypeFailureReason>,
    },
    /// A readonly tuple used where a mutable one is required.
    ReadonlyMismatch { source: TypeId, target: TypeId },
    /// An object literal names a property the target does not declare.
    ExcessProperty { property: Atom, target: TypeId },
    /// Wrong number of call arguments. `expected` is the required count when
    /// too few were given, the declared count when too many were given.
    ArityMismatch {
        expected: usize,
        actual: usize,
        /// The callee has a rest parameter, so `expected` is a minimum.
        at_least: bool,
    },
    PropertyNotFound { property: Atom, on: TypeId },
    /// Member access on a value that may be `null` or `undefined`.
    PossiblyUndefined { on: TypeId },
    ReadonlyAssignment { property: String },
    UsedBeforeAssigned { name: Atom },
    UnknownName { name: Atom },
    ImplicitAny { parameter: String },
    /// A non-tuple spread argument that does not land in a rest parameter.
    SpreadArgument,
    NotCallable { callee: TypeId },
    /// Element write through a readonly tuple.
    IndexSignatureReadonly { on: TypeId },
    NotIndexable { on: TypeId },
    TupleIndexOutOfBounds {
        tuple: TypeId,
        length: usize,
        index: usize,
    },
    InvalidType(InvalidType),
    Registry(RegistryError),
}

impl CheckError {
    pub fn code(&self) -> u32 {
        match self {
            Self::TypeMismatch { reason, .. } => match reason {
                Some(SubtypeFailureReason::MissingProperty { .. }) => {
                    diagnostic_codes::PROPERTY_IS_MISSING_IN_TYPE_BUT_REQUIRED_IN_TYPE
                }
                Some(SubtypeFailureReason::ReadonlyToMutable { .. }) => {
                    diagnostic_codes::THE_TYPE_IS_READONLY_AND_CANNOT_BE_ASSIGNED_TO_THE_MUTABLE_TYPE
                }
                _ => diagnostic_codes::TYPE_IS_NOT_ASSIGNABLE_TO_TYPE,
            },
            Self::ArgumentMismatch { .. } => {
                diagnostic_codes::ARGUMENT_TYPE_IS_NOT_ASSIGNABLE_TO_PARAMETER_TYPE
            }
            Self::ReadonlyMismatch { .. } => {
                diagnostic_codes::THE_TYPE_IS_READONLY_AND_CANNOT_BE_ASSIGNED_TO_THE_MUTABLE_TYPE
            }
            Self::ExcessProperty { .. } => {
                diagnostic_codes::OBJECT_LITERAL_MAY_ONLY_SPECIFY_KNOWN_PROPERTIES
            }
            Self::ArityMismatch { at_least, .. } => {
                if *at_least {
                    diagnostic_codes::EXPECTED_AT_LEAST_ARGUMENTS_BUT_GOT
                } else {
                    diagnostic_codes::EXPECTED_ARGUMENTS_BUT_GOT
                }
            }
            Self::PropertyNotFound { .. } => diagnostic_codes::PROPERTY_DOES_NOT_EXIST_ON_TYPE,
            Self::PossiblyUndefined { .. } => diagnostic_codes::OBJECT_IS_POSSIBLY_UNDEFINED,
            Self::ReadonlyAssignment { .. } => {
                diagnostic_codes::CANNOT_ASSIGN_TO_BECAUSE_IT_IS_A_READ_ONLY_PROPERTY
            }
            Self::UsedBeforeAssigned { .. } => {
                diagnostic_codes::VARIABLE_IS_USED_BEFORE_BEING_ASSIGNED
            }
            Self::UnknownName { .. } => diagnostic_codes::CANNOT_FIND_NAME,
            Self::ImplicitAny { .. } => diagnostic_codes::PARAMETER_IMPLICITLY_HAS_AN_ANY_TYPE,
            Self::SpreadArgument => {
                diagnostic_codes::A_SPREAD_ARGUMENT_MUST_EITHER_HAVE_A_TUPLE_TYPE_OR_BE_PASSED_TO_A_REST_PARAMETER
            }
            Self::TupleIndexOutOfBounds { .. } => {
                diagnostic_codes::TUPLE_TYPE_OF_LENGTH_HAS_NO_ELEMENT_AT_INDEX
            }
            Self::NotCallable { .. } => diagnostic_codes::THIS_EXPRESSION_IS_NOT_CALLABLE,
            Self::IndexSignatureReadonly { .. } => {
                diagnostic_codes::INDEX_SIGNATURE_IN_TYPE_ONLY_PERMITS_READING
            }
            Self::NotIndexable { .. } => {
                diagnostic_codes::ELEMENT_IMPLICITLY_HAS_AN_ANY_TYPE_BECAUSE_TYPE_HAS_NO_INDEX_SIGNATURE
            }
            Self::InvalidType(invalid) => invalid_type_code(invalid),
            Self::Registry(err) => err.code(),
        }
    }

    /// Render this finding with TypeScript's message text.
    pub fn to_diagnostic(&self, interner: &TypeInterner) -> Diagnostic {
        let ty = |id: TypeId| interner.display(id);
        let name = |atom: Atom| interner.resolve_atom(atom);
        let build = |code: u32, args: &[&str]| match lookup_message(code) {
            Some(message) => Diagnostic::from_message(message, args),
            None => Diagnostic::error(args.join(" "), code),
        };

        match self {
            Self::TypeMismatch {
                source,
                target,
                reason,
            } => {
                let diagnostic = match reason {
                    Some(SubtypeFailureReason::MissingProperty {
                        property,
                        source,
                        target,
                    }) => build(self.code(), &[&name(*property), &ty(*source), &ty(*target)]),
                    _ => build(self.code(), &[&ty(*source), &ty(*target)]),
                };
                with_reason_chain(diagnostic, reason.as_ref(), interner)
            }
            Self::ArgumentMismatch {
                source,
                target,
                reason,
                ..
            } => {
                let diagnostic = build(self.code(), &[&ty(*source), &ty(*target)]);
                with_reason_chain(diagnostic, reason.as_ref(), interner)
            }
            Self::ReadonlyMismatch { source, target } => {
                build(self.code(), &[&ty(*source), &ty(*target)])
            }
            Self::ExcessProperty { property, target } => {
                build(self.code(), &[&name(*property), &ty(*target)])
            }
            Self::ArityMismatch {
                expected, actual, ..
            } => build(self.code(), &[&expected.to_string(), &actual.to_string()]),
            Self::PropertyNotFound { property, on } => {
                build(self.code(), &[&name(*property), &ty(*on)])
            }
            Self::PossiblyUndefined { .. } => build(self.code(), &[]),
            Self::ReadonlyAssignment { property } => build(self.code(), &[property.as_str()]),
            Self::UsedBeforeAssigned { name: binding } | Self::UnknownName { name: binding } => {
                build(self.code(), &[&name(*binding)])
            }
            Self::ImplicitAny { parameter } => build(self.code(), &[parameter.as_str(), "any"]),
            Self::SpreadArgument => build(self.code(), &[]),
            Self::NotCallable { callee: on }
            | Self::IndexSignatureReadonly { on }
            | Self::NotIndexable { on } => build(self.code(), &[&ty(*on)]),
            Self::TupleIndexOutOfBounds {
                tuple,
                length,
                index,
            } => build(
                self.code(),
                &[&ty(*tuple), &length.to_string(), &index.to_string()],
            ),
            Self::InvalidType(invalid) => {
                let code = invalid_type_code(invalid);
                match lookup_message(code) {
                    Some(message) => Diagnostic::from_message(message, &[])
                        .with_related(invalid.to_string(), 0),
                    None => Diagnostic::error(invalid.to_string(), code),
                }
            }
            Self::Registry(err) => err.to_diagnostic(),
        }
    }
}

impl From<InvalidType> for CheckError {
    fn from(err: InvalidType) -> Self {
        Self::InvalidType(err)
    }
}

impl From<RegistryError> for CheckError {
    fn from(err: RegistryError) -> Self {
        Self::Registry(err)
    }
}

fn invalid_type_code(invalid: &InvalidType) -> u32 {
    match invalid {
        InvalidType::EmptyUnion => diagnostic_codes::UNION_TYPE_MUST_HAVE_AT_LEAST_ONE_MEMBER,
        InvalidType::RestParameterNotLast { .. } => {
            diagnostic_codes::A_REST_PARAMETER_MUST_BE_LAST_IN_A_PARAMETER_LIST
        }
        InvalidType::RestParameterNotArray { .. } => {
            diagnostic_codes::A_REST_PARAMETER_MUST_BE_OF_AN_ARRAY_TYPE
        }
        InvalidType::RequiredAfterOptional { .. } => {
            diagnostic_codes::A_REQUIRED_PARAMETER_CANNOT_FOLLOW_AN_OPTIONAL_PARAMETER
        }
    }
}

/// Attach the elaboration chain, dropping lines that repeat the headline.
fn with_reason_chain(
    mut diagnostic: Diagnostic,
    reason: Option<&SubtypeFailureReason>,
    interner: &TypeInterner,
) -> Diagnostic {
    let Some(reason) = reason else {
        return diagnostic;
    };
    for (code, text) in reason.message_chain(interner) {
        if text != diagnostic.message_text {
            diagnostic = diagnostic.with_related(text, code);
        }
    }
    diagnostic
}

/// Message used when a caller wants a plain headline for a mismatch.
pub fn mismatch_message(interner: &TypeInterner, source: TypeId, target: TypeId) -> String {
    format_message(
        diagnostic_messages::TYPE_IS_NOT_ASSIGNABLE_TO_TYPE,
        &[&interner.display(source), &interner.display(target)],
    )
}
