//! Call-site checking: argument count, then each argument against its
//! parameter.
//!
//! Arity is a separate check from argument types. A required parameter is one
//! that is neither optional nor rest; a call fails with
//! [`CheckError::ArityMismatch`] when it passes fewer arguments than that, or
//! more arguments than declared parameters when there is no rest parameter.

use crate::compat::CompatChecker;
use crate::diagnostics::CheckError;
use crate::subtype::RefResolution;
use crate::types::*;
use tracing::{debug, trace};

/// One argument as written at the call site.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Argument {
    Value(TypeId),
    /// `...expr`
    Spread(TypeId),
}

/// Result of checking a call: the type of the call expression plus every
/// finding (the call is still typed when arguments are wrong).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CallResult {
    pub return_type: TypeId,
    pub errors: Vec<CheckError>,
}

impl CallResult {
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Minimum and (absent a rest parameter) maximum argument counts.
pub fn arg_count_bounds(shape: &FunctionShape) -> (usize, Option<usize>) {
    let max = if shape.has_rest() {
        None
    } else {
        Some(shape.params.len())
    };
    (shape.required_count(), max)
}

/// The call-site arity check.
pub fn check_arity(shape: &FunctionShape, actual: usize) -> Result<(), CheckError> {
    let (min, max) = arg_count_bounds(shape);
    if actual < min {
        return Err(CheckError::ArityMismatch {
            expected: min,
            actual,
            at_least: shape.has_rest(),
        });
    }
    if let Some(max) = max
        && actual > max
    {
        return Err(CheckError::ArityMismatch {
            expected: max,
            actual,
            at_least: false,
        });
    }
    Ok(())
}

/// An argument after spreads have been expanded.
#[derive(Clone, Copy)]
enum Expanded {
    /// Occupies exactly one parameter position.
    Fixed(TypeId),
    /// An array spread: zero or more values of the element type.
    Open(TypeId),
}

pub struct CallEvaluator<'a, 'c> {
    compat: &'c mut CompatChecker<'a>,
}

impl<'a, 'c> CallEvaluator<'a, 'c> {
    pub fn new(compat: &'c mut CompatChecker<'a>) -> Self {
        CallEvaluator { compat }
    }

    /// Check a call of `callee` with `args`.
    pub fn check_call(&mut self, callee: TypeId, args: &[Argument]) -> CallResult {
        let interner = self.compat.interner();
        let callee_structure = match self.compat.subtype().resolve_structure(callee) {
            RefResolution::Resolved(id) => id,
            RefResolution::Pending | RefResolution::Unresolved => callee,
        };
        if callee_structure == TypeId::ANY {
            return CallResult {
                return_type: TypeId::ANY,
                errors: Vec::new(),
            };
        }
        let Some(shape) = interner.function_shape_of(callee_structure) else {
            debug!(callee = callee.0, "call of a non-function type");
            return CallResult {
                return_type: TypeId::ANY,
                errors: vec![CheckError::NotCallable { callee }],
            };
        };

        let mut errors = Vec::new();
        let expanded = self.expand_arguments(args);
        let fixed_count = expanded
            .iter()
            .filter(|arg| matches!(arg, Expanded::Fixed(_)))
            .count();
        let has_open = expanded.iter().any(|arg| matches!(arg, Expanded::Open(_)));

        // An array spread supplies an unknown number of arguments; whether it
        // lands in a rest parameter is checked per argument below.
        if !has_open && let Err(err) = check_arity(&shape, fixed_count) {
            trace!(error = ?err, "arity mismatch");
            errors.push(err);
        }

        let positional = shape.positional_count();
        let mut position = 0usize;
        for arg in expanded {
            match arg {
                Expanded::Fixed(arg_type) => {
                    if let Some(param_type) = self.compat.subtype().param_type_at(&shape, position)
                        && let Err(err) = self.compat.check_argument(position, arg_type, param_type)
                    {
                        errors.push(err);
                    }
                    position += 1;
                }
                Expanded::Open(element) => {
                    let rest_element = shape.rest_param().and_then(|rest| {
                        self.compat.subtype().rest_element(rest.type_id, 0)
                    });
                    match rest_element {
                        Some(rest_element) if position >= positional => {
                            if let Err(err) =
                                self.compat.check_argument(position, element, rest_element)
                            {
                                errors.push(err);
                            }
                        }
                        _ => {
                            if !errors.contains(&CheckError::SpreadArgument) {
                                errors.push(CheckError::SpreadArgument);
                            }
                        }
                    }
                }
            }
        }

        CallResult {
            return_type: shape.return_type,
            errors,
        }
    }

    fn expand_arguments(&self, args: &[Argument]) -> Vec<Expanded> {
        let interner = self.compat.interner();
        let mut expanded = Vec::with_capacity(args.len());
        for arg in args {
            match *arg {
                Argument::Value(type_id) => expanded.push(Expanded::Fixed(type_id)),
                Argument::Spread(type_id) => {
                    if let Some((elements, _)) = interner.tuple_elements(type_id) {
                        expanded.extend(elements.iter().map(|e| Expanded::Fixed(*e)));
                    } else if let Some(element) = interner.array_element(type_id) {
                        expanded.push(Expanded::Open(element));
                    } else {
                        expanded.push(Expanded::Open(TypeId::ANY));
                    }
                }
            }
        }
        expanded
    }
}

/// Check one call without keeping an evaluator around.
pub fn check_call(compat: &mut CompatChecker<'_>, callee: TypeId, args: &[Argument]) -> CallResult {
    CallEvaluator::new(compat).check_call(callee, args)
}

#[cfg(test)]
#[path = "tests/call_tests.rs"]
mod tests;
