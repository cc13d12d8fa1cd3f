//! Member and element access.
//!
//! `PropertyAccessEvaluator` answers "what is the type of `obj.name`" (and
//! `obj?.name`, `obj[i]`), reporting missing members, possibly-undefined
//! receivers, and writes to readonly members and tuples.

use crate::apparent::{apparent_array_member, apparent_primitive_member};
use crate::diagnostics::CheckError;
use crate::subtype::{NoopResolver, RefResolution, TypeResolver};
use crate::types::*;
use crate::TypeInterner;
use assay_common::{Atom, CheckerOptions};
use tracing::trace;

/// Result of attempting to access a member on a type.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PropertyAccessResult {
    Success {
        type_id: TypeId,
        /// Some constituent declares the member readonly.
        readonly: bool,
    },
    PropertyNotFound {
        type_id: TypeId,
        property: Atom,
    },
    /// The receiver may be `null`/`undefined`. `property_type` is the member
    /// type on the remaining constituents, if any.
    PossiblyUndefined {
        property_type: Option<TypeId>,
        cause: TypeId,
    },
}

/// A member as declared on an object type.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MemberType {
    pub type_id: TypeId,
    pub optional: bool,
    pub readonly: bool,
}

impl MemberType {
    /// The type observed when reading the member.
    pub fn read_type(&self, interner: &TypeInterner) -> TypeId {
        if self.optional {
            interner.with_undefined(self.type_id)
        } else {
            self.type_id
        }
    }
}

pub struct PropertyAccessEvaluator<'a> {
    interner: &'a TypeInterner,
    resolver: &'a dyn TypeResolver,
    strict_null_checks: bool,
}

impl<'a> PropertyAccessEvaluator<'a> {
    pub fn new(interner: &'a TypeInterner) -> Self {
        PropertyAccessEvaluator {
            interner,
            resolver: &NoopResolver,
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

    fn structure_of(&self, type_id: TypeId) -> TypeId {
        match self.interner.ref_name(type_id) {
            Some(name) => match self.resolver.resolve_ref(name) {
                RefResolution::Resolved(id) => id,
                RefResolution::Pending | RefResolution::Unresolved => type_id,
            },
            None => type_id,
        }
    }

    /// The declared member `name` of an object (or named interface) type.
    pub fn member_type(&self, obj: TypeId, name: Atom) -> Option<MemberType> {
        let shape = self.interner.object_shape_of(self.structure_of(obj))?;
        let prop = shape.find(name)?;
        Some(MemberType {
            type_id: prop.type_id,
            optional: prop.optional,
            readonly: prop.readonly,
        })
    }

    /// Like [`member_type`](Self::member_type), reporting a missing member.
    pub fn member_type_strict(&self, obj: TypeId, name: Atom) -> Result<MemberType, CheckError> {
        self.member_type(obj, name)
            .ok_or(CheckError::PropertyNotFound { property: name, on: obj })
    }

    pub fn resolve_property_access(&self, obj: TypeId, name: Atom) -> PropertyAccessResult {
        let _span = tracing::span!(tracing::Level::TRACE, "property_access", obj = obj.0).entered();
        let structure = self.structure_of(obj);
        if structure == TypeId::ANY {
            return PropertyAccessResult::Success {
                type_id: TypeId::ANY,
                readonly: false,
            };
        }
        if structure.is_nullish() {
            return PropertyAccessResult::PossiblyUndefined {
                property_type: None,
                cause: structure,
            };
        }

        let Some(members) = self.interner.union_members(structure) else {
            return self.access_single(obj, structure, name);
        };

        let mut types = Vec::with_capacity(members.len());
        let mut nullish = Vec::new();
        let mut readonly = false;
        for &member in members.iter() {
            if member.is_nullish() {
                nullish.push(member);
                continue;
            }
            match self.access_single(member, self.structure_of(member), name) {
                PropertyAccessResult::Success {
                    type_id,
                    readonly: member_readonly,
                } => {
                    types.push(type_id);
                    readonly |= member_readonly;
                }
                PropertyAccessResult::PropertyNotFound { .. } => {
                    trace!(member = member.0, "member missing on union constituent");
                    return PropertyAccessResult::PropertyNotFound {
                        type_id: obj,
                        property: name,
                    };
                }
                other @ PropertyAccessResult::PossiblyUndefined { .. } => return other,
            }
        }

        let property_type = (!types.is_empty()).then(|| self.interner.union(types));
        if nullish.is_empty() || !self.strict_null_checks {
            return match property_type {
                Some(type_id) => PropertyAccessResult::Success { type_id, readonly },
                None => PropertyAccessResult::PropertyNotFound {
                    type_id: obj,
                    property: name,
                },
            };
        }
        PropertyAccessResult::PossiblyUndefined {
            property_type,
            cause: self.interner.union(nullish),
        }
    }

    /// Access on a non-union. `written` is the type as the caller wrote it,
    /// `structure` its expansion.
    fn access_single(&self, written: TypeId, structure: TypeId, name: Atom) -> PropertyAccessResult {
        let not_found = PropertyAccessResult::PropertyNotFound {
            type_id: written,
            property: name,
        };
        let text = self.interner.resolve_atom_ref(name);
        let prop = match self.interner.lookup(structure) {
            Some(TypeData::Object(shape_id)) => {
                let shape = self.interner.object_shape(shape_id);
                match shape.find(name) {
                    Some(prop) => prop.clone(),
                    None => return not_found,
                }
            }
            Some(TypeData::Array(element)) => {
                match apparent_array_member(self.interner, element, false, &text) {
                    Some(prop) => prop,
                    None => return not_found,
                }
            }
            Some(TypeData::Tuple { elements, readonly }) => {
                let elements = self.interner.type_list(elements);
                let element = self.interner.union(elements.to_vec());
                match apparent_array_member(self.interner, element, readonly, &text) {
                    Some(prop) => prop,
                    None => return not_found,
                }
            }
            _ => match apparent_primitive_member(self.interner, structure, &text) {
                Some(prop) => prop,
                None => return not_found,
            },
        };
        let type_id = if prop.optional {
            self.interner.with_undefined(prop.type_id)
        } else {
            prop.type_id
        };
        PropertyAccessResult::Success {
            type_id,
            readonly: prop.readonly,
        }
    }

    /// `obj.name`
    pub fn property_of(&self, obj: TypeId, name: Atom) -> Result<TypeId, CheckError> {
        match self.resolve_property_access(obj, name) {
            PropertyAccessResult::Success { type_id, .. } => Ok(type_id),
            PropertyAccessResult::PropertyNotFound { type_id, property } => {
                Err(CheckError::PropertyNotFound { property, on: type_id })
            }
            PropertyAccessResult::PossiblyUndefined { .. } => {
                Err(CheckError::PossiblyUndefined { on: obj })
            }
        }
    }

    /// `obj?.name`: nullish receivers short-circuit to `undefined`.
    pub fn optional_property_of(&self, obj: TypeId, name: Atom) -> Result<TypeId, CheckError> {
        match self.resolve_property_access(obj, name) {
            PropertyAccessResult::Success { type_id, .. } => Ok(type_id),
            PropertyAccessResult::PropertyNotFound { type_id, property } => {
                Err(CheckError::PropertyNotFound { property, on: type_id })
            }
            PropertyAccessResult::PossiblyUndefined { property_type, .. } => {
                Ok(match property_type {
                    Some(type_id) => self.interner.with_undefined(type_id),
                    None => TypeId::UNDEFINED,
                })
            }
        }
    }

    /// `obj[index]` with a constant index when one is known.
    pub fn element_of(&self, obj: TypeId, index: Option<usize>) -> Result<TypeId, CheckError> {
        let structure = self.structure_of(obj);
        if structure == TypeId::ANY {
            return Ok(TypeId::ANY);
        }
        match self.interner.lookup(structure) {
            Some(TypeData::Array(element)) => Ok(element),
            Some(TypeData::Tuple { elements, .. }) => {
                let elements = self.interner.type_list(elements);
                match index {
                    Some(index) => elements.get(index).copied().ok_or(
                        CheckError::TupleIndexOutOfBounds {
                            tuple: obj,
                            length: elements.len(),
                            index,
                        },
                    ),
                    None => Ok(self.interner.union(elements.to_vec())),
                }
            }
            _ if structure.is_nullish() => Err(CheckError::PossiblyUndefined { on: obj }),
            _ if self.interner.union_members(structure).is_some() => {
                let members = self.interner.union_or_single(structure);
                let mut types = Vec::with_capacity(members.len());
                for member in members {
                    types.push(self.element_of(member, index)?);
                }
                Ok(self.interner.union(types))
            }
            _ if structure == TypeId::STRING
                || matches!(
                    self.interner.literal_value(structure),
                    Some(LiteralValue::String(_))
                ) =>
            {
                Ok(TypeId::STRING)
            }
            _ => Err(CheckError::NotIndexable { on: obj }),
        }
    }

    /// `obj.name = value`: the member must exist and not be readonly.
    /// Returns the type a written value must be assignable to.
    pub fn check_property_write(&self, obj: TypeId, name: Atom) -> Result<TypeId, CheckError> {
        match self.resolve_property_access(obj, name) {
            PropertyAccessResult::Success { readonly: true, .. } => {
                Err(CheckError::ReadonlyAssignment {
                    property: self.interner.resolve_atom(name),
                })
            }
            PropertyAccessResult::Success { type_id, .. } => {
                Ok(self.declared_write_type(obj, name).unwrap_or(type_id))
            }
            PropertyAccessResult::PropertyNotFound { type_id, property } => {
                Err(CheckError::PropertyNotFound { property, on: type_id })
            }
            PropertyAccessResult::PossiblyUndefined { .. } => {
                Err(CheckError::PossiblyUndefined { on: obj })
            }
        }
    }

    /// The declared type of `name` without the optional `undefined`, taken
    /// from each union constituent in turn. `None` when some constituent has
    /// no declared member (an apparent member of a primitive, say).
    fn declared_write_type(&self, obj: TypeId, name: Atom) -> Option<TypeId> {
        let Some(members) = self.interner.union_members(self.structure_of(obj)) else {
            return self.member_type(obj, name).map(|member| member.type_id);
        };
        let declared = members
            .iter()
            .filter(|member| !member.is_nullish())
            .map(|&member| self.member_type(member, name).map(|m| m.type_id))
            .collect::<Option<Vec<_>>>()?;
        Some(self.interner.union(declared))
    }

    /// `obj[index] = value`: readonly tuples reject element writes.
    pub fn check_element_write(&self, obj: TypeId, index: Option<usize>) -> Result<TypeId, CheckError> {
        let structure = self.structure_of(obj);
        if let Some((_, true)) = self.interner.tuple_elements(structure) {
            return Err(CheckError::IndexSignatureReadonly { on: obj });
        }
        self.element_of(obj, index)
    }
}

#[cfg(test)]
#[path = "tests/operations_tests.rs"]
mod tests;
