//! Core type representation.
//!
//! Types are interned: every structurally distinct type is stored once in the
//! [`TypeInterner`](crate::TypeInterner) and handled through a copyable
//! [`TypeId`]. Structural equality is therefore `TypeId` equality.

use assay_common::Atom;
use bitflags::bitflags;
use std::hash::{Hash, Hasher};
use thiserror::Error;

/// Handle to an interned type.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeId(pub u32);

impl TypeId {
    pub const ANY: TypeId = TypeId(0);
    pub const UNKNOWN: TypeId = TypeId(1);
    pub const NEVER: TypeId = TypeId(2);
    pub const VOID: TypeId = TypeId(3);
    pub const UNDEFINED: TypeId = TypeId(4);
    pub const NULL: TypeId = TypeId(5);
    pub const BOOLEAN: TypeId = TypeId(6);
    pub const NUMBER: TypeId = TypeId(7);
    pub const STRING: TypeId = TypeId(8);
    /// The literal type `true`.
    pub const BOOLEAN_TRUE: TypeId = TypeId(9);
    /// The literal type `false`.
    pub const BOOLEAN_FALSE: TypeId = TypeId(10);

    /// First id handed out for interned (non-builtin) types.
    pub const FIRST_USER: u32 = 16;

    /// True for the builtin ids above, including the boolean literals.
    #[inline]
    pub const fn is_intrinsic(self) -> bool {
        self.0 < Self::FIRST_USER
    }

    #[inline]
    pub const fn is_nullish(self) -> bool {
        self.0 == Self::NULL.0 || self.0 == Self::UNDEFINED.0 || self.0 == Self::VOID.0
    }
}

/// Builtin primitive and top/bottom types.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum IntrinsicKind {
    Any,
    Unknown,
    Never,
    Void,
    Undefined,
    Null,
    Boolean,
    Number,
    String,
}

impl IntrinsicKind {
    pub const fn to_type_id(self) -> TypeId {
        match self {
            Self::Any => TypeId::ANY,
            Self::Unknown => TypeId::UNKNOWN,
            Self::Never => TypeId::NEVER,
            Self::Void => TypeId::VOID,
            Self::Undefined => TypeId::UNDEFINED,
            Self::Null => TypeId::NULL,
            Self::Boolean => TypeId::BOOLEAN,
            Self::Number => TypeId::NUMBER,
            Self::String => TypeId::STRING,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::Any => "any",
            Self::Unknown => "unknown",
            Self::Never => "never",
            Self::Void => "void",
            Self::Undefined => "undefined",
            Self::Null => "null",
            Self::Boolean => "boolean",
            Self::Number => "number",
            Self::String => "string",
        }
    }

    /// The runtime `typeof` tag of values of this type, if there is exactly one.
    ///
    /// `null` reports `"object"`; `void` values are `undefined` at runtime.
    pub const fn typeof_tag(self) -> Option<&'static str> {
        match self {
            Self::Void | Self::Undefined => Some("undefined"),
            Self::Null => Some("object"),
            Self::Boolean => Some("boolean"),
            Self::Number => Some("number"),
            Self::String => Some("string"),
            Self::Any | Self::Unknown | Self::Never => None,
        }
    }
}

/// An `f64` with total equality and hashing, for use as a literal key.
///
/// `-0.0` and `0.0` compare equal and hash alike.
#[derive(Clone, Copy, Debug)]
pub struct OrderedFloat(pub f64);

impl OrderedFloat {
    fn canonical_bits(self) -> u64 {
        if self.0 == 0.0 { 0 } else { self.0.to_bits() }
    }
}

impl PartialEq for OrderedFloat {
    fn eq(&self, other: &Self) -> bool {
        self.canonical_bits() == other.canonical_bits()
    }
}

impl Eq for OrderedFloat {}

impl Hash for OrderedFloat {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.canonical_bits().hash(state);
    }
}

/// The value of a literal type.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LiteralValue {
    String(Atom),
    Number(OrderedFloat),
    Boolean(bool),
}

impl LiteralValue {
    /// The primitive this literal widens to.
    pub const fn base_type(&self) -> TypeId {
        match self {
            Self::String(_) => TypeId::STRING,
            Self::Number(_) => TypeId::NUMBER,
            Self::Boolean(_) => TypeId::BOOLEAN,
        }
    }

    /// `""`, `0`, `NaN` and `false`.
    pub fn is_falsy(&self) -> bool {
        match self {
            Self::String(atom) => atom.is_none(),
            Self::Number(n) => n.0 == 0.0 || n.0.is_nan(),
            Self::Boolean(b) => !*b,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TypeListId(pub u32);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct FunctionShapeId(pub u32);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ObjectShapeId(pub u32);

/// The structure behind a [`TypeId`].
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum TypeData {
    Intrinsic(IntrinsicKind),
    Literal(LiteralValue),
    /// Members are stored sorted by id; at least two, none of them unions.
    Union(TypeListId),
    Array(TypeId),
    Tuple { elements: TypeListId, readonly: bool },
    Function(FunctionShapeId),
    Object(ObjectShapeId),
    /// A named interface, resolved through a [`TypeResolver`](crate::TypeResolver)
    /// when its structure is needed.
    Ref(Atom),
}

/// A function parameter.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ParamInfo {
    pub name: Option<Atom>,
    pub type_id: TypeId,
    pub optional: bool,
    /// A rest parameter; `type_id` is its array (or tuple) type.
    pub rest: bool,
}

impl ParamInfo {
    pub fn required(name: Atom, type_id: TypeId) -> Self {
        Self {
            name: Some(name),
            type_id,
            optional: false,
            rest: false,
        }
    }

    pub fn optional(name: Atom, type_id: TypeId) -> Self {
        Self {
            optional: true,
            ..Self::required(name, type_id)
        }
    }

    pub fn rest(name: Atom, type_id: TypeId) -> Self {
        Self {
            rest: true,
            ..Self::required(name, type_id)
        }
    }

    pub fn unnamed(type_id: TypeId) -> Self {
        Self {
            name: None,
            type_id,
            optional: false,
            rest: false,
        }
    }

    /// Counts toward the call-site minimum argument count.
    #[inline]
    pub const fn is_required(&self) -> bool {
        !self.optional && !self.rest
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct FunctionShape {
    pub params: Vec<ParamInfo>,
    pub return_type: TypeId,
}

impl FunctionShape {
    pub fn new(params: Vec<ParamInfo>, return_type: TypeId) -> Self {
        Self {
            params,
            return_type,
        }
    }

    /// Number of parameters a caller must supply.
    pub fn required_count(&self) -> usize {
        self.params.iter().filter(|p| p.is_required()).count()
    }

    /// Number of non-rest parameters.
    pub fn positional_count(&self) -> usize {
        self.params.iter().filter(|p| !p.rest).count()
    }

    pub fn rest_param(&self) -> Option<&ParamInfo> {
        self.params.last().filter(|p| p.rest)
    }

    #[inline]
    pub fn has_rest(&self) -> bool {
        self.rest_param().is_some()
    }
}

bitflags! {
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    pub struct ObjectFlags: u8 {
        /// Produced directly by an object literal expression and not yet bound
        /// to a variable. Only fresh types are subject to excess-property checks.
        const FRESH_LITERAL = 1 << 0;
    }
}

/// A member of an object type or interface.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct PropertyInfo {
    pub name: Atom,
    pub type_id: TypeId,
    pub optional: bool,
    pub readonly: bool,
    /// Declared with method syntax (`name(): T`).
    pub is_method: bool,
}

impl PropertyInfo {
    pub fn new(name: Atom, type_id: TypeId) -> Self {
        Self {
            name,
            type_id,
            optional: false,
            readonly: false,
            is_method: false,
        }
    }

    pub fn opt(name: Atom, type_id: TypeId) -> Self {
        Self {
            optional: true,
            ..Self::new(name, type_id)
        }
    }

    pub fn readonly(name: Atom, type_id: TypeId) -> Self {
        Self {
            readonly: true,
            ..Self::new(name, type_id)
        }
    }

    pub fn method(name: Atom, type_id: TypeId) -> Self {
        Self {
            is_method: true,
            ..Self::new(name, type_id)
        }
    }
}

/// Members sorted by name atom.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Default)]
pub struct ObjectShape {
    pub flags: ObjectFlags,
    pub properties: Vec<PropertyInfo>,
}

impl ObjectShape {
    pub fn find(&self, name: Atom) -> Option<&PropertyInfo> {
        self.properties
            .binary_search_by(|p| p.name.cmp(&name))
            .ok()
            .map(|idx| &self.properties[idx])
    }

    #[inline]
    pub fn is_fresh(&self) -> bool {
        self.flags.contains(ObjectFlags::FRESH_LITERAL)
    }
}

/// Malformed type construction.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidType {
    #[error("a union type must have at least one member")]
    EmptyUnion,
    #[error("a rest parameter must be last in a parameter list (parameter '{name}')")]
    RestParameterNotLast { name: String },
    #[error("a rest parameter must be of an array type (parameter '{name}')")]
    RestParameterNotArray { name: String },
    #[error("a required parameter cannot follow an optional parameter (parameter '{name}')")]
    RequiredAfterOptional { name: String },
}
