//! Per-branch binding environments.
//!
//! A [`FlowEnv`] maps variable names to what is known about them at one
//! program point. Environments are persistent: cloning is an `Arc` bump and
//! the map is copied only when a branch first changes it, so sibling branches
//! never observe each other's narrowing.
//!
//! ```text
//! let inventor: number | string = "Hedy";   // current: string
//! if (typeof inventor === "string") { .. }  // branch env: string
//! inventor = 1843;                          // current: number
//! ```

use crate::compat::CompatChecker;
use crate::diagnostics::CheckError;
use crate::narrowing::{NarrowingContext, TypeGuard};
use crate::operations::PropertyAccessEvaluator;
use crate::subtype::TypeResolver;
use crate::types::TypeId;
use crate::TypeInterner;
use assay_common::{Atom, CheckerOptions};
use rustc_hash::FxHashMap;
use std::sync::Arc;
use tracing::{debug, trace};

/// What is known about one variable at a program point.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Binding {
    /// The annotated (or inferred) type; assignments are checked against it.
    pub declared: TypeId,
    /// The narrowest type the variable has here.
    pub current: TypeId,
    /// Definitely assigned on every path to this point.
    pub assigned: bool,
    /// Bumped on every assignment; lets `merge` tell reassigned branches apart.
    pub generation: u32,
}

#[derive(Clone, Debug, Default)]
pub struct FlowEnv {
    bindings: Arc<FxHashMap<Atom, Binding>>,
}

impl FlowEnv {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: Atom) -> Option<&Binding> {
        self.bindings.get(&name)
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    fn set(&mut self, name: Atom, binding: Binding) {
        Arc::make_mut(&mut self.bindings).insert(name, binding);
    }

    /// Whether two environments still share storage.
    pub fn shares_storage_with(&self, other: &FlowEnv) -> bool {
        Arc::ptr_eq(&self.bindings, &other.bindings)
    }
}

/// Drives declarations, assignments, reads and guards over [`FlowEnv`]s.
pub struct FlowAnalyzer<'a> {
    interner: &'a TypeInterner,
    compat: CompatChecker<'a>,
    access: PropertyAccessEvaluator<'a>,
    narrowing: NarrowingContext<'a>,
}

impl<'a> FlowAnalyzer<'a> {
    pub fn new(interner: &'a TypeInterner) -> Self {
        FlowAnalyzer {
            interner,
            compat: CompatChecker::new(interner),
            access: PropertyAccessEvaluator::new(interner),
            narrowing: NarrowingContext::new(interner),
        }
    }

    pub fn with_resolver(mut self, resolver: &'a dyn TypeResolver) -> Self {
        self.compat = self.compat.with_resolver(resolver);
        self.access = self.access.with_resolver(resolver);
        self
    }

    pub fn with_options(mut self, options: &CheckerOptions) -> Self {
        self.compat = self.compat.with_options(options);
        self.access = self.access.with_options(options);
        self
    }

    fn lookup(&self, env: &FlowEnv, name: &str) -> Result<(Atom, Binding), CheckError> {
        let atom = self.interner.intern_string(name);
        env.get(atom)
            .map(|binding| (atom, *binding))
            .ok_or(CheckError::UnknownName { name: atom })
    }

    /// `let name: declared = initializer;`
    ///
    /// The binding is introduced even when the initializer is rejected.
    pub fn declare(
        &mut self,
        env: &mut FlowEnv,
        name: &str,
        declared: TypeId,
        initializer: Option<TypeId>,
    ) -> Result<(), CheckError> {
        let atom = self.interner.intern_string(name);
        let (current, assigned, result) = match initializer {
            Some(value) => match self.compat.check_assignment(value, declared) {
                Ok(()) => (self.narrow_by_assignment(declared, value), true, Ok(())),
                Err(err) => (declared, true, Err(err)),
            },
            None if self.admits_undefined(declared) => (TypeId::UNDEFINED, false, Ok(())),
            None => (declared, false, Ok(())),
        };
        trace!(name, declared = declared.0, current = current.0, "binding declared");
        env.set(
            atom,
            Binding {
                declared,
                current,
                assigned,
                generation: 0,
            },
        );
        result
    }

    /// `name = value;` A rejected assignment leaves the binding unchanged.
    pub fn assign(&mut self, env: &mut FlowEnv, name: &str, value: TypeId) -> Result<(), CheckError> {
        let (atom, binding) = self.lookup(env, name)?;
        self.compat.check_assignment(value, binding.declared)?;
        let current = self.narrow_by_assignment(binding.declared, value);
        trace!(name, current = current.0, "assignment narrowed binding");
        env.set(
            atom,
            Binding {
                current,
                assigned: true,
                generation: binding.generation + 1,
                ..binding
            },
        );
        Ok(())
    }

    /// The type of a read of `name` at this point.
    pub fn read(&self, env: &FlowEnv, name: &str) -> Result<TypeId, CheckError> {
        let (atom, binding) = self.lookup(env, name)?;
        if !binding.assigned && !self.admits_undefined(binding.declared) {
            return Err(CheckError::UsedBeforeAssigned { name: atom });
        }
        Ok(binding.current)
    }

    /// A branch-local copy of `env` with `name` narrowed by `guard`.
    pub fn narrowed(
        &self,
        env: &FlowEnv,
        name: &str,
        guard: TypeGuard,
        branch: bool,
    ) -> Result<FlowEnv, CheckError> {
        let (atom, binding) = self.lookup(env, name)?;
        let current = self.narrowing.narrow(binding.current, guard, branch);
        let mut branch_env = env.clone();
        branch_env.set(atom, Binding { current, ..binding });
        Ok(branch_env)
    }

    /// Join the environments at the end of a conditional.
    ///
    /// `branches` must cover every path (pass the implicit `else` environment
    /// for an `if` without one). A binding no branch reassigned reverts to its
    /// type in `pre`; otherwise it becomes the union over the branches.
    pub fn merge(&self, pre: &FlowEnv, branches: &[FlowEnv]) -> FlowEnv {
        let mut merged = pre.clone();
        for (&name, before) in pre.bindings.iter() {
            let after: Vec<Binding> = branches
                .iter()
                .map(|env| env.get(name).copied().unwrap_or(*before))
                .collect();
            let reassigned = after.iter().any(|b| b.generation != before.generation);
            if !reassigned {
                continue;
            }
            let current = self
                .interner
                .union(after.iter().map(|b| b.current).collect());
            let generation = after.iter().map(|b| b.generation).max().unwrap_or(before.generation);
            let assigned = after.iter().all(|b| b.assigned);
            debug!(name = name.0, current = current.0, "binding re-joined after branches");
            merged.set(
                name,
                Binding {
                    current,
                    assigned,
                    generation,
                    ..*before
                },
            );
        }
        merged
    }

    /// `name.member = ...`: returns the type a written value must satisfy.
    pub fn write_property(&self, env: &FlowEnv, name: &str, member: &str) -> Result<TypeId, CheckError> {
        let receiver = self.read(env, name)?;
        let member = self.interner.intern_string(member);
        self.access.check_property_write(receiver, member)
    }

    /// `name[index] = ...`: returns the type a written value must satisfy.
    pub fn write_element(
        &self,
        env: &FlowEnv,
        name: &str,
        index: Option<usize>,
    ) -> Result<TypeId, CheckError> {
        let receiver = self.read(env, name)?;
        self.access.check_element_write(receiver, index)
    }

    fn admits_undefined(&self, declared: TypeId) -> bool {
        declared == TypeId::ANY
            || declared == TypeId::UNKNOWN
            || self
                .interner
                .union_or_single(declared)
                .iter()
                .any(|m| *m == TypeId::UNDEFINED || *m == TypeId::VOID)
    }

    /// The declared type filtered to the members the assigned value can
    /// inhabit: `number | string` assigned `"Hedy"` is `string`.
    pub fn narrow_by_assignment(&mut self, declared: TypeId, value: TypeId) -> TypeId {
        let value = self.interner.widen_freshness(value);
        let Some(members) = self.interner.union_members(declared) else {
            return declared;
        };
        let value_members = self.interner.union_or_single(value);
        let subtype = self.compat.subtype();
        let kept: Vec<TypeId> = members
            .iter()
            .copied()
            .filter(|&m| value_members.iter().any(|&v| subtype.is_assignable(v, m)))
            .collect();
        if kept.is_empty() {
            declared
        } else {
            self.interner.union(kept)
        }
    }
}

#[cfg(test)]
#[path = "tests/flow_tests.rs"]
mod tests;
