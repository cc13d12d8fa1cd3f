//! Assignment compatibility.
//!
//! `CompatChecker` is what callers use at an assignment, initializer or
//! argument site. It runs the structural relation from `subtype` and layers
//! the one check that depends on *how* a value was produced: a fresh object
//! literal may not name properties its target does not declare.
//!
//! ```text
//! const p: Point = { x: 1, y: 2, z: 3 };   // excess property 'z'
//! const obj = { x: 1, y: 2, z: 3 };
//! const q: Point = obj;                    // fine, `obj` is no longer fresh
//! ```

use crate::diagnostics::{CheckError, SubtypeFailureReason};
use crate::subtype::{RefResolution, SubtypeChecker, TypeResolver};
use crate::types::*;
use crate::TypeInterner;
use assay_common::{Atom, CheckerOptions};
use tracing::trace;

pub struct CompatChecker<'a> {
    interner: &'a TypeInterner,
    subtype: SubtypeChecker<'a>,
}

impl<'a> CompatChecker<'a> {
    pub fn new(interner: &'a TypeInterner) -> Self {
        CompatChecker {
            interner,
            subtype: SubtypeChecker::new(interner),
        }
    }

    pub fn with_resolver(mut self, resolver: &'a dyn TypeResolver) -> Self {
        self.subtype = self.subtype.with_resolver(resolver);
        self
    }

    pub fn with_options(mut self, options: &CheckerOptions) -> Self {
        self.subtype = self.subtype.with_options(options);
        self
    }

    pub fn interner(&self) -> &'a TypeInterner {
        self.interner
    }

    pub fn subtype(&mut self) -> &mut SubtypeChecker<'a> {
        &mut self.subtype
    }

    /// Assignability including the literal-site excess property check.
    pub fn is_assignable(&mut self, source: TypeId, target: TypeId) -> bool {
        self.check_assignment(source, target).is_ok()
    }

    /// Check `source` flowing into a binding or member of type `target`.
    pub fn check_assignment(&mut self, source: TypeId, target: TypeId) -> Result<(), CheckError> {
        if let Some(property) = self.find_excess_property(source, target) {
            trace!(property = property.0, "excess property in object literal");
            return Err(CheckError::ExcessProperty { property, target });
        }
        if self.subtype.is_assignable(source, target) {
            return Ok(());
        }
        let reason = self.subtype.explain_failure(source, target);
        match reason {
            Some(SubtypeFailureReason::ReadonlyToMutable { source, target }) => {
                Err(CheckError::ReadonlyMismatch { source, target })
            }
            reason => Err(CheckError::TypeMismatch {
                source,
                target,
                reason,
            }),
        }
    }

    /// Check the argument at `index` against its parameter type.
    pub fn check_argument(
        &mut self,
        index: usize,
        source: TypeId,
        target: TypeId,
    ) -> Result<(), CheckError> {
        match self.check_assignment(source, target) {
            Err(CheckError::TypeMismatch { reason, .. }) => Err(CheckError::ArgumentMismatch {
                index,
                source,
                target,
                reason,
            }),
            other => other,
        }
    }

    /// The first property of a fresh object literal `source` that `target`
    /// does not declare, searching nested fresh literals as well.
    pub fn find_excess_property(&mut self, source: TypeId, target: TypeId) -> Option<Atom> {
        if !self.interner.is_fresh_object(source) {
            return None;
        }
        let source_members = self.interner.object_members_in_order(source)?;
        let target = self.structure_of(target)?;

        let mut target_shapes = Vec::new();
        for member in self.interner.union_or_single(target) {
            let Some(member) = self.structure_of(member) else {
                continue;
            };
            if member == TypeId::ANY || member == TypeId::UNKNOWN {
                return None;
            }
            let Some(shape) = self.interner.object_shape_of(member) else {
                continue;
            };
            // `{}` accepts any properties.
            if shape.properties.is_empty() {
                return None;
            }
            target_shapes.push(shape);
        }
        if target_shapes.is_empty() {
            return None;
        }

        for prop in &source_members {
            let declared: Vec<TypeId> = target_shapes
                .iter()
                .filter_map(|shape| shape.find(prop.name).map(|p| p.type_id))
                .collect();
            if declared.is_empty() {
                return Some(prop.name);
            }
            if self.interner.is_fresh_object(prop.type_id) {
                let nested_target = self.interner.union(declared);
                if let Some(nested) = self.find_excess_property(prop.type_id, nested_target) {
                    return Some(nested);
                }
            }
        }
        None
    }

    /// Expand a named reference; `None` if it cannot be resolved.
    fn structure_of(&self, type_id: TypeId) -> Option<TypeId> {
        match self.subtype.resolve_structure(type_id) {
            RefResolution::Resolved(id) => Some(id),
            RefResolution::Pending | RefResolution::Unresolved => None,
        }
    }
}

#[cfg(test)]
#[path = "tests/compat_tests.rs"]
mod tests;
