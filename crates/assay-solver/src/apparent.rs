//! Apparent members of primitives and arrays.
//!
//! `"Lovelace".length` and `[1, 2].push(3)` need member types even though
//! strings and arrays are not object types in the model. These tables give
//! the handful of built-in members the checker knows about.

use crate::TypeInterner;
use crate::types::*;

/// How an apparent member is typed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ApparentMemberKind {
    /// A readonly value of this type.
    Value(TypeId),
    /// A method with the given parameters and return type.
    Method(&'static [ApparentParam], TypeId),
}

/// Parameter of an apparent method.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ApparentParam {
    pub name: &'static str,
    pub type_id: TypeId,
    pub optional: bool,
}

const fn param(name: &'static str, type_id: TypeId) -> ApparentParam {
    ApparentParam {
        name,
        type_id,
        optional: false,
    }
}

const fn optional(name: &'static str, type_id: TypeId) -> ApparentParam {
    ApparentParam {
        name,
        type_id,
        optional: true,
    }
}

pub struct ApparentMember {
    pub name: &'static str,
    pub kind: ApparentMemberKind,
}

const STRING_MEMBERS: &[ApparentMember] = &[
    ApparentMember {
        name: "length",
        kind: ApparentMemberKind::Value(TypeId::NUMBER),
    },
    ApparentMember {
        name: "charAt",
        kind: ApparentMemberKind::Method(&[param("pos", TypeId::NUMBER)], TypeId::STRING),
    },
    ApparentMember {
        name: "includes",
        kind: ApparentMemberKind::Method(
            &[
                param("searchString", TypeId::STRING),
                optional("position", TypeId::NUMBER),
            ],
            TypeId::BOOLEAN,
        ),
    },
    ApparentMember {
        name: "indexOf",
        kind: ApparentMemberKind::Method(
            &[
                param("searchString", TypeId::STRING),
                optional("position", TypeId::NUMBER),
            ],
            TypeId::NUMBER,
        ),
    },
    ApparentMember {
        name: "toLowerCase",
        kind: ApparentMemberKind::Method(&[], TypeId::STRING),
    },
    ApparentMember {
        name: "toUpperCase",
        kind: ApparentMemberKind::Method(&[], TypeId::STRING),
    },
    ApparentMember {
        name: "toString",
        kind: ApparentMemberKind::Method(&[], TypeId::STRING),
    },
    ApparentMember {
        name: "trim",
        kind: ApparentMemberKind::Method(&[], TypeId::STRING),
    },
    ApparentMember {
        name: "valueOf",
        kind: ApparentMemberKind::Method(&[], TypeId::STRING),
    },
];

const NUMBER_MEMBERS: &[ApparentMember] = &[
    ApparentMember {
        name: "toFixed",
        kind: ApparentMemberKind::Method(
            &[optional("fractionDigits", TypeId::NUMBER)],
            TypeId::STRING,
        ),
    },
    ApparentMember {
        name: "toString",
        kind: ApparentMemberKind::Method(&[optional("radix", TypeId::NUMBER)], TypeId::STRING),
    },
    ApparentMember {
        name: "valueOf",
        kind: ApparentMemberKind::Method(&[], TypeId::NUMBER),
    },
];

const BOOLEAN_MEMBERS: &[ApparentMember] = &[
    ApparentMember {
        name: "toString",
        kind: ApparentMemberKind::Method(&[], TypeId::STRING),
    },
    ApparentMember {
        name: "valueOf",
        kind: ApparentMemberKind::Method(&[], TypeId::BOOLEAN),
    },
];

/// The apparent members of a primitive, or an empty table.
pub fn apparent_primitive_members(kind: IntrinsicKind) -> &'static [ApparentMember] {
    match kind {
        IntrinsicKind::String => STRING_MEMBERS,
        IntrinsicKind::Number => NUMBER_MEMBERS,
        IntrinsicKind::Boolean => BOOLEAN_MEMBERS,
        _ => &[],
    }
}

/// The primitive whose members `type_id` has, seeing through literals.
pub fn apparent_primitive_kind(interner: &TypeInterner, type_id: TypeId) -> Option<IntrinsicKind> {
    match interner.lookup(type_id)? {
        TypeData::Intrinsic(
            kind @ (IntrinsicKind::String | IntrinsicKind::Number | IntrinsicKind::Boolean),
        ) => Some(kind),
        TypeData::Literal(LiteralValue::String(_)) => Some(IntrinsicKind::String),
        TypeData::Literal(LiteralValue::Number(_)) => Some(IntrinsicKind::Number),
        TypeData::Literal(LiteralValue::Boolean(_)) => Some(IntrinsicKind::Boolean),
        _ => None,
    }
}

/// Member `name` of a primitive (or primitive literal) type.
pub fn apparent_primitive_member(
    interner: &TypeInterner,
    type_id: TypeId,
    name: &str,
) -> Option<PropertyInfo> {
    let kind = apparent_primitive_kind(interner, type_id)?;
    let member = apparent_primitive_members(kind)
        .iter()
        .find(|member| member.name == name)?;
    Some(materialize(interner, member.name, member.kind))
}

/// Member `name` of an array with element type `element`, or of a tuple
/// (`readonly` tuples have no mutating members).
pub fn apparent_array_member(
    interner: &TypeInterner,
    element: TypeId,
    readonly: bool,
    name: &str,
) -> Option<PropertyInfo> {
    let atom = interner.intern_string(name);
    let method = |params: Vec<ParamInfo>, ret: TypeId| {
        PropertyInfo::method(atom, interner.function(FunctionShape::new(params, ret)))
    };
    let named = |n: &str| interner.intern_string(n);
    let prop = match name {
        "length" => PropertyInfo::readonly(atom, TypeId::NUMBER),
        "includes" => method(
            vec![ParamInfo::required(named("searchElement"), element)],
            TypeId::BOOLEAN,
        ),
        "indexOf" => method(
            vec![ParamInfo::required(named("searchElement"), element)],
            TypeId::NUMBER,
        ),
        "join" => method(
            vec![ParamInfo::optional(named("separator"), TypeId::STRING)],
            TypeId::STRING,
        ),
        "push" if !readonly => method(
            vec![ParamInfo::rest(named("items"), interner.array(element))],
            TypeId::NUMBER,
        ),
        "pop" if !readonly => method(Vec::new(), interner.with_undefined(element)),
        _ => return None,
    };
    Some(prop)
}

fn materialize(interner: &TypeInterner, name: &str, kind: ApparentMemberKind) -> PropertyInfo {
    let atom = interner.intern_string(name);
    match kind {
        ApparentMemberKind::Value(type_id) => PropertyInfo::readonly(atom, type_id),
        ApparentMemberKind::Method(params, return_type) => {
            let params = params
                .iter()
                .map(|p| {
                    let name = interner.intern_string(p.name);
                    if p.optional {
                        ParamInfo::optional(name, p.type_id)
                    } else {
                        ParamInfo::required(name, p.type_id)
                    }
                })
                .collect();
            PropertyInfo::method(
                atom,
                interner.function(FunctionShape::new(params, return_type)),
            )
        }
    }
}
