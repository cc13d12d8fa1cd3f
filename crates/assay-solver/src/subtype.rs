//! Structural assignability.
//!
//! `SubtypeChecker` decides whether a value of the source type may be used
//! where the target type is expected. The rules are applied in priority
//! order:
//!
//! 1. `any` on either side relates; `unknown` accepts everything and flows
//!    only into `unknown`/`any`.
//! 2. `never` flows into everything; only `never`/`any` flow into `never`.
//! 3. Identical types relate (interning makes this an id comparison).
//! 4. A literal relates to its base primitive.
//! 5. A source union relates when every member does.
//! 6. A target union accepts a source related to at least one member.
//! 7. Arrays are covariant in their element type.
//! 8. Tuples relate element-wise at equal arity; a readonly tuple never
//!    flows into a mutable one.
//! 9. A tuple relates to an array when every element relates to the array
//!    element type; an array never relates to a tuple.
//! 10. Functions are contravariant in parameters and covariant in return.
//! 11. Objects relate when every target member is present (or optional) in
//!     the source with a related type.
//! 12. Nothing else relates.
//!
//! Named interfaces (`Ref`) are compared by name first and expanded through a
//! [`TypeResolver`] only when the names differ. Revisiting a pair that is
//! still being compared answers `true` (coinductive semantics), which is what
//! makes self-referential interfaces terminate.

use crate::diagnostics::{DiagnosticTracer, FastTracer, SubtypeFailureReason, SubtypeTracer};
use crate::recursion::{RecursionGuard, RecursionLimits, RecursionResult};
use crate::types::*;
use crate::TypeInterner;
use assay_common::{Atom, CheckerOptions};
use tracing::{Level, span, trace, warn};

/// Outcome of looking up a named interface.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RefResolution {
    /// The interface's flattened object type.
    Resolved(TypeId),
    /// The interface is being resolved further up the stack.
    Pending,
    /// No such interface, or its resolution failed.
    Unresolved,
}

/// Resolves named interface references to their structure.
pub trait TypeResolver {
    fn resolve_ref(&self, name: Atom) -> RefResolution;
}

/// Resolver for callers that never use named interfaces.
pub struct NoopResolver;

impl TypeResolver for NoopResolver {
    fn resolve_ref(&self, _name: Atom) -> RefResolution {
        RefResolution::Unresolved
    }
}

pub struct SubtypeChecker<'a> {
    interner: &'a TypeInterner,
    resolver: &'a dyn TypeResolver,
    guard: RecursionGuard<(TypeId, TypeId)>,
    strict_null_checks: bool,
}

impl<'a> SubtypeChecker<'a> {
    pub fn new(interner: &'a TypeInterner) -> Self {
        SubtypeChecker {
            interner,
            resolver: &NoopResolver,
            guard: RecursionGuard::new(RecursionLimits::SUBTYPE),
            strict_null_checks: true,
        }
    }

    pub fn with_resolver(mut self, resolver: &'a dyn TypeResolver) -> Self {
        self.resolver = resolver;
        self
    }

    pub fn with_options(mut self, options: &CheckerOptions) -> Self {
        self.strict_null_checks = options.strict_null_checks;
        self
    }

    pub fn interner(&self) -> &'a TypeInterner {
        self.interner
    }

    pub fn resolver(&self) -> &'a dyn TypeResolver {
        self.resolver
    }

    /// Is `source` assignable to `target`?
    pub fn is_assignable(&mut self, source: TypeId, target: TypeId) -> bool {
        let _span = span!(Level::TRACE, "is_assignable", source = source.0, target = target.0)
            .entered();
        self.start_top_level();
        let result = self.check(source, target, &mut FastTracer);
        trace!(result, "assignability decided");
        result
    }

    /// The reason `source` is not assignable to `target`, or `None` if it is.
    pub fn explain_failure(
        &mut self,
        source: TypeId,
        target: TypeId,
    ) -> Option<SubtypeFailureReason> {
        self.start_top_level();
        let mut tracer = DiagnosticTracer::new();
        if self.check(source, target, &mut tracer) {
            return None;
        }
        Some(tracer.take_failure().unwrap_or(SubtypeFailureReason::TypeMismatch {
            source,
            target,
        }))
    }

    /// Run the relation with a caller-supplied tracer.
    pub fn check_with_tracer<T: SubtypeTracer>(
        &mut self,
        source: TypeId,
        target: TypeId,
        tracer: &mut T,
    ) -> bool {
        self.start_top_level();
        self.check(source, target, tracer)
    }

    fn start_top_level(&mut self) {
        if self.guard.depth() == 0 {
            self.guard.reset();
        }
    }

    /// Expand a named reference to its structure; other types pass through.
    pub fn resolve_structure(&self, type_id: TypeId) -> RefResolution {
        match self.interner.ref_name(type_id) {
            Some(name) => self.resolver.resolve_ref(name),
            None => RefResolution::Resolved(type_id),
        }
    }

    /// Nested check used to build an explanation for a failed child relation.
    fn explain_nested(&mut self, source: TypeId, target: TypeId) -> Option<Box<SubtypeFailureReason>> {
        let mut tracer = DiagnosticTracer::new();
        if self.check(source, target, &mut tracer) {
            return None;
        }
        tracer.take_failure().map(Box::new)
    }

    pub(crate) fn check<T: SubtypeTracer>(
        &mut self,
        source: TypeId,
        target: TypeId,
        tracer: &mut T,
    ) -> bool {
        // Rule 3: identity.
        if source == target {
            return true;
        }
        // Rule 1: any / unknown.
        if source == TypeId::ANY || target == TypeId::ANY || target == TypeId::UNKNOWN {
            return true;
        }
        // Rule 2: never.
        if source == TypeId::NEVER {
            return true;
        }
        if source == TypeId::UNKNOWN || target == TypeId::NEVER {
            return tracer.on_mismatch(|| SubtypeFailureReason::TypeMismatch { source, target });
        }
        if source == TypeId::UNDEFINED && target == TypeId::VOID {
            return true;
        }
        if !self.strict_null_checks && (source == TypeId::NULL || source == TypeId::UNDEFINED) {
            return true;
        }

        match self.guard.enter((source, target)) {
            RecursionResult::Entered => {
                let result = self.check_structural(source, target, tracer);
                self.guard.leave((source, target));
                result
            }
            RecursionResult::Cycle => {
                trace!(source = source.0, target = target.0, "assuming related on cycle");
                true
            }
            RecursionResult::DepthExceeded | RecursionResult::IterationExceeded => {
                warn!(
                    source = source.0,
                    target = target.0,
                    "assignability check exceeded recursion limits"
                );
                tracer.on_mismatch(|| SubtypeFailureReason::RecursionLimit)
            }
        }
    }

    fn check_structural<T: SubtypeTracer>(
        &mut self,
        source: TypeId,
        target: TypeId,
        tracer: &mut T,
    ) -> bool {
        // Named interfaces: expand whichever side is a reference.
        let source_ref = self.interner.ref_name(source);
        let target_ref = self.interner.ref_name(target);
        if source_ref.is_some() || target_ref.is_some() {
            let resolved_source = match self.expand_ref(source, tracer) {
                Ok(id) => id,
                Err(outcome) => return outcome,
            };
            let resolved_target = match self.expand_ref(target, tracer) {
                Ok(id) => id,
                Err(outcome) => return outcome,
            };
            return self.check_resolved(source, target, resolved_source, resolved_target, tracer);
        }
        self.check_resolved(source, target, source, target, tracer)
    }

    /// `Ok(structure)` to keep comparing, `Err(outcome)` to stop with an answer.
    fn expand_ref<T: SubtypeTracer>(&mut self, type_id: TypeId, tracer: &mut T) -> Result<TypeId, bool> {
        let Some(name) = self.interner.ref_name(type_id) else {
            return Ok(type_id);
        };
        match self.resolver.resolve_ref(name) {
            RefResolution::Resolved(structure) => Ok(structure),
            RefResolution::Pending => {
                trace!(name = name.0, "reference still resolving; assuming related");
                Err(true)
            }
            RefResolution::Unresolved => {
                Err(tracer.on_mismatch(|| SubtypeFailureReason::UnresolvedReference { name }))
            }
        }
    }

    /// `source`/`target` are the types as written (for messages);
    /// `s`/`t` are their expanded structures.
    fn check_resolved<T: SubtypeTracer>(
        &mut self,
        source: TypeId,
        target: TypeId,
        s: TypeId,
        t: TypeId,
        tracer: &mut T,
    ) -> bool {
        if s == t {
            return true;
        }
        if s != source || t != target {
            // A reference expanded to a builtin (or to the other side).
            if s == TypeId::ANY || t == TypeId::ANY || t == TypeId::UNKNOWN || s == TypeId::NEVER {
                return true;
            }
        }

        // Rule 5: every member of a source union must relate.
        if let Some(members) = self.interner.union_members(s) {
            for &member in members.iter() {
                if !self.check(member, target, &mut FastTracer) {
                    return tracer.on_mismatch(|| SubtypeFailureReason::UnionMemberMismatch {
                        member,
                        target,
                        nested: self.explain_nested(member, target),
                    });
                }
            }
            return true;
        }

        // Rule 6: some member of a target union must accept the source.
        if let Some(members) = self.interner.union_members(t) {
            if members.iter().any(|&member| self.check(source, member, &mut FastTracer)) {
                return true;
            }
            return tracer.on_mismatch(|| SubtypeFailureReason::NoUnionMemberMatches { source, target });
        }

        let s_data = self.interner.lookup(s);
        let t_data = self.interner.lookup(t);

        // Rule 4: literal to its base primitive.
        if let Some(TypeData::Literal(literal)) = &s_data
            && literal.base_type() == t
        {
            return true;
        }

        match (s_data, t_data) {
            // Rule 7
            (Some(TypeData::Array(se)), Some(TypeData::Array(te))) => {
                if self.check(se, te, &mut FastTracer) {
                    return true;
                }
                tracer.on_mismatch(|| SubtypeFailureReason::ArrayElementMismatch {
                    source_element: se,
                    target_element: te,
                    nested: self.explain_nested(se, te),
                })
            }
            // Rule 8
            (
                Some(TypeData::Tuple {
                    elements: s_elems,
                    readonly: s_readonly,
                }),
                Some(TypeData::Tuple {
                    elements: t_elems,
                    readonly: t_readonly,
                }),
            ) => {
                if s_readonly && !t_readonly {
                    return tracer
                        .on_mismatch(|| SubtypeFailureReason::ReadonlyToMutable { source, target });
                }
                let s_elems = self.interner.type_list(s_elems);
                let t_elems = self.interner.type_list(t_elems);
                if s_elems.len() != t_elems.len() {
                    return tracer.on_mismatch(|| SubtypeFailureReason::TupleArityMismatch {
                        source_count: s_elems.len(),
                        target_count: t_elems.len(),
                    });
                }
                for (index, (&se, &te)) in s_elems.iter().zip(t_elems.iter()).enumerate() {
                    if !self.check(se, te, &mut FastTracer) {
                        return tracer.on_mismatch(|| SubtypeFailureReason::TupleElementMismatch {
                            index,
                            source_element: se,
                            target_element: te,
                            nested: self.explain_nested(se, te),
                        });
                    }
                }
                true
            }
            // Rule 9: tuple to array.
            (Some(TypeData::Tuple { elements, .. }), Some(TypeData::Array(te))) => {
                let elements = self.interner.type_list(elements);
                for (index, &se) in elements.iter().enumerate() {
                    if !self.check(se, te, &mut FastTracer) {
                        return tracer.on_mismatch(|| SubtypeFailureReason::TupleElementMismatch {
                            index,
                            source_element: se,
                            target_element: te,
                            nested: self.explain_nested(se, te),
                        });
                    }
                }
                true
            }
            // Rule 9: array to tuple never relates.
            (Some(TypeData::Array(_)), Some(TypeData::Tuple { elements, .. })) => {
                let target_count = self.interner.type_list(elements).len();
                tracer.on_mismatch(|| SubtypeFailureReason::ArrayToTuple {
                    source,
                    target_count,
                })
            }
            // Rule 10
            (Some(TypeData::Function(s_fn)), Some(TypeData::Function(t_fn))) => {
                let s_shape = self.interner.function_shape(s_fn);
                let t_shape = self.interner.function_shape(t_fn);
                self.check_function(&s_shape, &t_shape, tracer)
            }
            // Rule 11
            (Some(TypeData::Object(s_obj)), Some(TypeData::Object(t_obj))) => {
                let s_shape = self.interner.object_shape(s_obj);
                let t_shape = self.interner.object_shape(t_obj);
                self.check_object(source, target, &s_shape, &t_shape, tracer)
            }
            // Rule 12
            _ => tracer.on_mismatch(|| SubtypeFailureReason::TypeMismatch { source, target }),
        }
    }

    fn check_function<T: SubtypeTracer>(
        &mut self,
        source: &FunctionShape,
        target: &FunctionShape,
        tracer: &mut T,
    ) -> bool {
        // The source may not demand more arguments than a caller of the
        // target is obliged to pass.
        let target_supplies = if target.has_rest() {
            usize::MAX
        } else {
            target.positional_count()
        };
        let source_required = source.required_count();
        if source_required > target_supplies {
            return tracer.on_mismatch(|| SubtypeFailureReason::TooManyParameters {
                source_required,
                target_count: target_supplies,
            });
        }

        // Parameters are contravariant: each source parameter must accept
        // whatever the target parameter may be given.
        let positions = source.positional_count().max(target.positional_count());
        for index in 0..positions {
            let Some(target_param) = self.param_type_at(target, index) else {
                break;
            };
            let Some(source_param) = self.param_type_at(source, index) else {
                continue;
            };
            if !self.check(target_param, source_param, &mut FastTracer) {
                return tracer.on_mismatch(|| SubtypeFailureReason::ParameterTypeMismatch {
                    source_param: self.param_label(source, index),
                    target_param: self.param_label(target, index),
                    source_type: source_param,
                    target_type: target_param,
                });
            }
        }
        if let (Some(s_rest), Some(t_rest)) = (source.rest_param(), target.rest_param()) {
            let s_elem = self.rest_element(s_rest.type_id, 0);
            let t_elem = self.rest_element(t_rest.type_id, 0);
            if let (Some(s_elem), Some(t_elem)) = (s_elem, t_elem)
                && !self.check(t_elem, s_elem, &mut FastTracer)
            {
                let index = source.params.len() - 1;
                return tracer.on_mismatch(|| SubtypeFailureReason::ParameterTypeMismatch {
                    source_param: self.param_label(source, index),
                    target_param: self.param_label(target, target.params.len() - 1),
                    source_type: s_elem,
                    target_type: t_elem,
                });
            }
        }

        // Returns are covariant; a `void` target ignores the returned value.
        if target.return_type != TypeId::VOID
            && !self.check(source.return_type, target.return_type, &mut FastTracer)
        {
            return tracer.on_mismatch(|| SubtypeFailureReason::ReturnTypeMismatch {
                source_return: source.return_type,
                target_return: target.return_type,
                nested: self.explain_nested(source.return_type, target.return_type),
            });
        }
        true
    }

    /// The type an argument at `index` is checked against, optional
    /// parameters contributing `T | undefined`.
    pub(crate) fn param_type_at(&self, shape: &FunctionShape, index: usize) -> Option<TypeId> {
        let positional = shape.positional_count();
        if index < positional {
            let param = &shape.params[index];
            return Some(if param.optional {
                self.interner.with_undefined(param.type_id)
            } else {
                param.type_id
            });
        }
        let rest = shape.rest_param()?;
        self.rest_element(rest.type_id, index - positional)
    }

    /// Element type of a rest parameter at `offset` into the rest list.
    pub(crate) fn rest_element(&self, rest_type: TypeId, offset: usize) -> Option<TypeId> {
        if rest_type == TypeId::ANY {
            return Some(TypeId::ANY);
        }
        match self.interner.lookup(rest_type)? {
            TypeData::Array(element) => Some(element),
            TypeData::Tuple { elements, .. } => self.interner.type_list(elements).get(offset).copied(),
            _ => None,
        }
    }

    fn param_label(&self, shape: &FunctionShape, index: usize) -> String {
        let index = index.min(shape.params.len().saturating_sub(1));
        shape
            .params
            .get(index)
            .map(|param| self.interner.param_name(param, index))
            .unwrap_or_default()
    }

    fn check_object<T: SubtypeTracer>(
        &mut self,
        source: TypeId,
        target: TypeId,
        s_shape: &ObjectShape,
        t_shape: &ObjectShape,
        tracer: &mut T,
    ) -> bool {
        for t_prop in &t_shape.properties {
            let Some(s_prop) = s_shape.find(t_prop.name) else {
                if t_prop.optional {
                    continue;
                }
                return tracer.on_mismatch(|| SubtypeFailureReason::MissingProperty {
                    property: t_prop.name,
                    source,
                    target,
                });
            };
            if s_prop.optional && !t_prop.optional {
                return tracer.on_mismatch(|| SubtypeFailureReason::OptionalProperty {
                    property: t_prop.name,
                    source,
                    target,
                });
            }
            let s_type = self.member_read_type(s_prop);
            let t_type = self.member_read_type(t_prop);
            if !self.check(s_type, t_type, &mut FastTracer) {
                return tracer.on_mismatch(|| SubtypeFailureReason::PropertyTypeMismatch {
                    property: t_prop.name,
                    source_property: s_type,
                    target_property: t_type,
                    nested: self.explain_nested(s_type, t_type),
                });
            }
        }
        true
    }

    /// The type observed when reading a member: `T | undefined` if optional.
    pub(crate) fn member_read_type(&self, prop: &PropertyInfo) -> TypeId {
        if prop.optional {
            self.interner.with_undefined(prop.type_id)
        } else {
            prop.type_id
        }
    }
}

/// One-shot assignability without named interfaces.
pub fn is_assignable(interner: &TypeInterner, source: TypeId, target: TypeId) -> bool {
    SubtypeChecker::new(interner).is_assignable(source, target)
}

#[cfg(test)]
#[path = "tests/subtype_tests.rs"]
mod tests;
