//! Named interface declarations.
//!
//! Declarations are collected first (`declare`, single writer), then resolved
//! on demand into flattened object types. Resolution:
//!
//! 1. merges the own members of every declaration of the name, in order;
//! 2. resolves each `extends` base in declaration order and folds its members
//!    in, checking that own members override base members covariantly and
//!    that two bases never contribute irreconcilable members.
//!
//! Results are memoized in a concurrent map, so after the declaration phase
//! the registry can answer `resolve` from many threads at once.
//!
//! Only `extends` edges can form an inheritance cycle. Override checks may
//! follow member references into other interfaces; such a lookup that runs
//! into an interface still being resolved further out is answered as pending
//! and nothing it computed is memoized.

use crate::subtype::{RefResolution, SubtypeChecker, TypeResolver};
use crate::types::*;
use crate::TypeInterner;
use assay_common::limits::MAX_INHERITANCE_DEPTH;
use assay_common::{Atom, Diagnostic, diagnostic_codes, diagnostic_messages, format_message};
use dashmap::DashMap;
use indexmap::IndexMap;
use rustc_hash::FxBuildHasher;
use std::cell::{Cell, RefCell};
use thiserror::Error;
use tracing::{debug, trace};

/// One `interface Name extends ... { ... }` declaration site.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InterfaceDeclaration {
    pub members: Vec<PropertyInfo>,
    pub extends: Vec<Atom>,
}

/// Why an interface failed to resolve.
///
/// Names and types are carried pre-rendered so the error can be displayed
/// without the interner that produced it.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("unknown interface '{name}'")]
    UnknownInterface { name: String },

    #[error("interface inheritance cycle: {}", cycle.join(" -> "))]
    CyclicInheritance { cycle: Vec<String> },

    #[error(
        "member '{member}' of interface '{interface}' is declared as '{first}' and as '{second}'"
    )]
    ConflictingMember {
        interface: String,
        member: String,
        first: String,
        second: String,
    },

    #[error(
        "member '{member}' of interface '{interface}' does not validly override '{base}': '{derived_type}' is not assignable to '{base_type}'"
    )]
    IncompatibleOverride {
        interface: String,
        base: String,
        member: String,
        derived_type: String,
        base_type: String,
    },

    #[error(
        "interface '{interface}' inherits incompatible '{member}' members from '{first_base}' and '{second_base}'"
    )]
    ConflictingInheritance {
        interface: String,
        member: String,
        first_base: String,
        second_base: String,
    },
}

impl RegistryError {
    pub fn code(&self) -> u32 {
        match self {
            Self::UnknownInterface { .. } => diagnostic_codes::CANNOT_FIND_NAME,
            Self::CyclicInheritance { .. } => {
                diagnostic_codes::TYPE_RECURSIVELY_REFERENCES_ITSELF_AS_A_BASE_TYPE
            }
            Self::ConflictingMember { .. } => {
                diagnostic_codes::SUBSEQUENT_PROPERTY_DECLARATIONS_MUST_HAVE_THE_SAME_TYPE
            }
            Self::IncompatibleOverride { .. } => {
                diagnostic_codes::INTERFACE_INCORRECTLY_EXTENDS_INTERFACE
            }
            Self::ConflictingInheritance { .. } => {
                diagnostic_codes::INTERFACE_CANNOT_SIMULTANEOUSLY_EXTEND_TYPES
            }
        }
    }

    pub fn to_diagnostic(&self) -> Diagnostic {
        let code = self.code();
        match self {
            Self::UnknownInterface { name } => Diagnostic::error(
                format_message(diagnostic_messages::CANNOT_FIND_NAME, &[name.as_str()]),
                code,
            ),
            Self::CyclicInheritance { cycle } => {
                let head = cycle.first().map(String::as_str).unwrap_or_default();
                Diagnostic::error(
                    format_message(
                        diagnostic_messages::TYPE_RECURSIVELY_REFERENCES_ITSELF_AS_A_BASE_TYPE,
                        &[head],
                    ),
                    code,
                )
                .with_related(cycle.join(" -> "), 0)
            }
            Self::ConflictingMember {
                member,
                first,
                second,
                ..
            } => Diagnostic::error(
                format_message(
                    diagnostic_messages::SUBSEQUENT_PROPERTY_DECLARATIONS_MUST_HAVE_THE_SAME_TYPE,
                    &[member.as_str(), first.as_str(), second.as_str()],
                ),
                code,
            ),
            Self::IncompatibleOverride {
                interface,
                base,
                member,
                derived_type,
                base_type,
            } => Diagnostic::error(
                format_message(
                    diagnostic_messages::INTERFACE_INCORRECTLY_EXTENDS_INTERFACE,
                    &[interface.as_str(), base.as_str()],
                ),
                code,
            )
            .with_related(
                format_message(
                    diagnostic_messages::TYPES_OF_PROPERTY_ARE_INCOMPATIBLE,
                    &[member.as_str()],
                ),
                diagnostic_codes::TYPES_OF_PROPERTY_ARE_INCOMPATIBLE,
            )
            .with_related(
                format_message(
                    diagnostic_messages::TYPE_IS_NOT_ASSIGNABLE_TO_TYPE,
                    &[derived_type.as_str(), base_type.as_str()],
                ),
                diagnostic_codes::TYPE_IS_NOT_ASSIGNABLE_TO_TYPE,
            ),
            Self::ConflictingInheritance {
                interface,
                member,
                first_base,
                second_base,
            } => Diagnostic::error(
                format_message(
                    diagnostic_messages::INTERFACE_CANNOT_SIMULTANEOUSLY_EXTEND_TYPES,
                    &[
                        interface.as_str(),
                        first_base.as_str(),
                        second_base.as_str(),
                    ],
                ),
                code,
            )
            .with_related(
                format_message(
                    diagnostic_messages::NAMED_PROPERTY_OF_TYPES_ARE_NOT_IDENTICAL,
                    &[
                        member.as_str(),
                        first_base.as_str(),
                        second_base.as_str(),
                    ],
                ),
                diagnostic_codes::NAMED_PROPERTY_OF_TYPES_ARE_NOT_IDENTICAL,
            ),
        }
    }
}

/// Why a resolution stopped early.
enum Halt {
    Failed(RegistryError),
    /// A member lookup reached an interface that an outer resolution is
    /// still working on.
    Blocked,
}

impl From<RegistryError> for Halt {
    fn from(err: RegistryError) -> Self {
        Halt::Failed(err)
    }
}

/// Per-call resolution state.
#[derive(Default)]
struct Walk {
    /// Interfaces being resolved, outermost first.
    stack: RefCell<Vec<Atom>>,
    /// Stack height where the innermost member lookup began; 0 outside lookups.
    floor: Cell<usize>,
}

impl Walk {
    fn in_lookup(&self) -> bool {
        self.floor.get() > 0
    }
}

/// A member inherited from a base, remembering which base supplied it.
struct Inherited {
    prop: PropertyInfo,
    base: Atom,
}

pub struct InterfaceRegistry<'a> {
    interner: &'a TypeInterner,
    declarations: IndexMap<Atom, Vec<InterfaceDeclaration>, FxBuildHasher>,
    resolved: DashMap<Atom, Result<TypeId, RegistryError>, FxBuildHasher>,
}

impl<'a> InterfaceRegistry<'a> {
    pub fn new(interner: &'a TypeInterner) -> Self {
        InterfaceRegistry {
            interner,
            declarations: IndexMap::default(),
            resolved: DashMap::default(),
        }
    }

    pub fn interner(&self) -> &'a TypeInterner {
        self.interner
    }

    /// Append a declaration of `name`. Nothing is validated until resolution.
    pub fn declare(&mut self, name: &str, members: Vec<PropertyInfo>, extends: &[&str]) -> Atom {
        let atom = self.interner.intern_string(name);
        let extends = extends.iter().map(|base| self.interner.intern_string(base)).collect();
        self.declarations
            .entry(atom)
            .or_default()
            .push(InterfaceDeclaration { members, extends });
        self.resolved.clear();
        trace!(name, "interface declared");
        atom
    }

    /// Declare and immediately resolve, returning the `Ref` type for `name`.
    pub fn register(
        &mut self,
        name: &str,
        members: Vec<PropertyInfo>,
        extends: &[&str],
    ) -> Result<TypeId, RegistryError> {
        let atom = self.declare(name, members, extends);
        self.resolve_atom(atom)?;
        Ok(self.interner.intern(TypeData::Ref(atom)))
    }

    pub fn is_declared(&self, name: &str) -> bool {
        self.declarations.contains_key(&self.interner.intern_string(name))
    }

    pub fn declaration_count(&self) -> usize {
        self.declarations.len()
    }

    /// The flattened object type of `name`.
    pub fn resolve(&self, name: &str) -> Result<TypeId, RegistryError> {
        self.resolve_atom(self.interner.intern_string(name))
    }

    pub fn resolve_atom(&self, name: Atom) -> Result<TypeId, RegistryError> {
        match self.resolve_in(name, &Walk::default()) {
            Ok(id) => Ok(id),
            Err(Halt::Failed(err)) => Err(err),
            // Blocking needs an enclosing member lookup, which a fresh walk lacks.
            Err(Halt::Blocked) => Err(RegistryError::CyclicInheritance {
                cycle: vec![self.name(name), self.name(name)],
            }),
        }
    }

    /// Resolve every declared interface, in declaration order.
    pub fn resolve_all(&self) -> Vec<(Atom, Result<TypeId, RegistryError>)> {
        self.declarations
            .keys()
            .map(|&name| (name, self.resolve_atom(name)))
            .collect()
    }

    fn name(&self, atom: Atom) -> String {
        self.interner.resolve_atom(atom)
    }

    fn resolve_in(&self, name: Atom, walk: &Walk) -> Result<TypeId, Halt> {
        if let Some(cached) = self.resolved.get(&name) {
            return cached.value().clone().map_err(Halt::Failed);
        }
        let position = walk.stack.borrow().iter().position(|&n| n == name);
        if let Some(pos) = position {
            if pos < walk.floor.get() {
                trace!(name = %self.name(name), "member lookup blocked on outer resolution");
                return Err(Halt::Blocked);
            }
            let cycle = walk.stack.borrow()[pos..]
                .iter()
                .chain(std::iter::once(&name))
                .map(|&n| self.name(n))
                .collect();
            return Err(RegistryError::CyclicInheritance { cycle }.into());
        }
        let Some(declarations) = self.declarations.get(&name) else {
            return Err(RegistryError::UnknownInterface {
                name: self.name(name),
            }
            .into());
        };
        if walk.stack.borrow().len() >= MAX_INHERITANCE_DEPTH as usize {
            let cycle = walk.stack.borrow().iter().map(|&n| self.name(n)).collect();
            return Err(RegistryError::CyclicInheritance { cycle }.into());
        }

        walk.stack.borrow_mut().push(name);
        let result = self.resolve_declarations(name, declarations, walk);
        walk.stack.borrow_mut().pop();

        let settled = match result {
            Ok(id) => Ok(id),
            Err(Halt::Failed(err)) => Err(err),
            Err(Halt::Blocked) => return Err(Halt::Blocked),
        };
        match &settled {
            Ok(id) => debug!(name = %self.name(name), type_id = id.0, "interface resolved"),
            Err(err) => debug!(name = %self.name(name), error = %err, "interface failed to resolve"),
        }
        if !walk.in_lookup() {
            self.resolved.insert(name, settled.clone());
        }
        settled.map_err(Halt::Failed)
    }

    fn resolve_declarations(
        &self,
        name: Atom,
        declarations: &[InterfaceDeclaration],
        walk: &Walk,
    ) -> Result<TypeId, Halt> {
        let own = self.merge_own_members(name, declarations)?;

        // Bases in declaration order, each listed once.
        let mut bases: Vec<Atom> = Vec::new();
        for base in declarations.iter().flat_map(|decl| decl.extends.iter()) {
            if !bases.contains(base) {
                bases.push(*base);
            }
        }

        let resolver = StackResolver {
            registry: self,
            walk,
        };
        let mut checker = SubtypeChecker::new(self.interner).with_resolver(&resolver);

        let mut inherited: IndexMap<Atom, Inherited, FxBuildHasher> = IndexMap::default();
        for base in bases {
            let base_type = self.resolve_in(base, walk)?;
            let Some(base_members) = self.interner.object_members_in_order(base_type) else {
                continue;
            };
            for base_prop in &base_members {
                if let Some(own_prop) = own.get(&base_prop.name) {
                    self.check_override(&mut checker, name, base, own_prop, base_prop)?;
                    continue;
                }
                match inherited.get_mut(&base_prop.name) {
                    None => {
                        inherited.insert(
                            base_prop.name,
                            Inherited {
                                prop: base_prop.clone(),
                                base,
                            },
                        );
                    }
                    Some(previous) => {
                        let prev_type = checker.member_read_type(&previous.prop);
                        let next_type = checker.member_read_type(base_prop);
                        if checker.is_assignable(next_type, prev_type) {
                            // The later base is at least as specific.
                            *previous = Inherited {
                                prop: base_prop.clone(),
                                base,
                            };
                        } else if !checker.is_assignable(prev_type, next_type) {
                            return Err(RegistryError::ConflictingInheritance {
                                interface: self.name(name),
                                member: self.name(base_prop.name),
                                first_base: self.name(previous.base),
                                second_base: self.name(base),
                            }
                            .into());
                        }
                    }
                }
            }
        }

        let mut properties: Vec<PropertyInfo> =
            inherited.into_values().map(|entry| entry.prop).collect();
        properties.extend(own.into_values());
        Ok(self.interner.object(properties))
    }

    /// Fold the own members of every declaration of `name`.
    fn merge_own_members(
        &self,
        name: Atom,
        declarations: &[InterfaceDeclaration],
    ) -> Result<IndexMap<Atom, PropertyInfo, FxBuildHasher>, RegistryError> {
        let mut own: IndexMap<Atom, PropertyInfo, FxBuildHasher> = IndexMap::default();
        for member in declarations.iter().flat_map(|decl| decl.members.iter()) {
            match own.get(&member.name) {
                None => {
                    own.insert(member.name, member.clone());
                }
                Some(existing)
                    if existing.type_id == member.type_id
                        && existing.optional == member.optional => {}
                Some(existing) => {
                    return Err(RegistryError::ConflictingMember {
                        interface: self.name(name),
                        member: self.name(member.name),
                        first: self.interner.display(existing.type_id),
                        second: self.interner.display(member.type_id),
                    });
                }
            }
        }
        Ok(own)
    }

    fn check_override(
        &self,
        checker: &mut SubtypeChecker<'_>,
        name: Atom,
        base: Atom,
        own_prop: &PropertyInfo,
        base_prop: &PropertyInfo,
    ) -> Result<(), RegistryError> {
        let derived_type = checker.member_read_type(own_prop);
        let base_type = checker.member_read_type(base_prop);
        let optional_widens = own_prop.optional && !base_prop.optional;
        if optional_widens || !checker.is_assignable(derived_type, base_type) {
            return Err(RegistryError::IncompatibleOverride {
                interface: self.name(name),
                base: self.name(base),
                member: self.name(own_prop.name),
                derived_type: self.interner.display(derived_type),
                base_type: self.interner.display(base_type),
            });
        }
        Ok(())
    }
}

impl TypeResolver for InterfaceRegistry<'_> {
    fn resolve_ref(&self, name: Atom) -> RefResolution {
        match self.resolve_atom(name) {
            Ok(id) => RefResolution::Resolved(id),
            Err(_) => RefResolution::Unresolved,
        }
    }
}

/// Resolver used while an interface is being resolved.
///
/// Each reference starts a member lookup. Names on the current stack, and
/// names whose `extends` chain reaches one, are reported as pending.
struct StackResolver<'r, 'a> {
    registry: &'r InterfaceRegistry<'a>,
    walk: &'r Walk,
}

impl TypeResolver for StackResolver<'_, '_> {
    fn resolve_ref(&self, name: Atom) -> RefResolution {
        if self.walk.stack.borrow().contains(&name) {
            return RefResolution::Pending;
        }
        let outer = self.walk.floor.replace(self.walk.stack.borrow().len());
        let result = self.registry.resolve_in(name, self.walk);
        self.walk.floor.set(outer);
        match result {
            Ok(id) => RefResolution::Resolved(id),
            Err(Halt::Blocked) => RefResolution::Pending,
            Err(Halt::Failed(_)) => RefResolution::Unresolved,
        }
    }
}

#[cfg(test)]
#[path = "tests/registry_tests.rs"]
mod tests;
