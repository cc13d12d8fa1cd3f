//! Type formatting for diagnostics.
//!
//! Prints types the way they are written in source:
//! `(string | number)[]`, `readonly [1157, "Tomas"]`,
//! `(values: string[], count?: number) => number`, `{ pages: number; author?: string; }`.

use crate::TypeInterner;
use crate::types::*;
use assay_common::limits::{MAX_FORMAT_DEPTH, MAX_FORMAT_UNION_MEMBERS};

pub struct TypeFormatter<'a> {
    interner: &'a TypeInterner,
    depth: u32,
}

impl<'a> TypeFormatter<'a> {
    pub fn new(interner: &'a TypeInterner) -> Self {
        TypeFormatter { interner, depth: 0 }
    }

    pub fn format(&mut self, type_id: TypeId) -> String {
        if self.depth > MAX_FORMAT_DEPTH {
            return "...".to_string();
        }
        self.depth += 1;
        let result = self.format_inner(type_id);
        self.depth -= 1;
        result
    }

    fn format_inner(&mut self, type_id: TypeId) -> String {
        let Some(data) = self.interner.lookup(type_id) else {
            return format!("<unknown type {}>", type_id.0);
        };
        match data {
            TypeData::Intrinsic(kind) => kind.name().to_string(),
            TypeData::Literal(value) => self.format_literal(&value),
            TypeData::Union(_) => self.format_union(type_id),
            TypeData::Array(element) => {
                let inner = self.format(element);
                if self.needs_parens_in_array(element) {
                    format!("({inner})[]")
                } else {
                    format!("{inner}[]")
                }
            }
            TypeData::Tuple { elements, readonly } => {
                let elements = self.interner.type_list(elements);
                let parts: Vec<String> = elements.iter().map(|e| self.format(*e)).collect();
                let prefix = if readonly { "readonly " } else { "" };
                format!("{prefix}[{}]", parts.join(", "))
            }
            TypeData::Function(shape_id) => {
                let shape = self.interner.function_shape(shape_id);
                self.format_function(&shape)
            }
            TypeData::Object(_) => {
                let members = self.interner.object_members_in_order(type_id).unwrap_or_default();
                self.format_object(&members)
            }
            TypeData::Ref(name) => self.interner.resolve_atom(name),
        }
    }

    fn format_literal(&self, value: &LiteralValue) -> String {
        match value {
            LiteralValue::String(atom) => {
                let raw = self.interner.resolve_atom_ref(*atom);
                format!("\"{}\"", raw.replace('\\', "\\\\").replace('"', "\\\""))
            }
            LiteralValue::Number(n) => format_number(n.0),
            LiteralValue::Boolean(b) => b.to_string(),
        }
    }

    fn format_union(&mut self, type_id: TypeId) -> String {
        let members = self.interner.union_or_single(type_id);
        let mut parts: Vec<String> = members
            .iter()
            .take(MAX_FORMAT_UNION_MEMBERS)
            .map(|m| {
                let text = self.format(*m);
                if self.is_function(*m) {
                    format!("({text})")
                } else {
                    text
                }
            })
            .collect();
        if members.len() > MAX_FORMAT_UNION_MEMBERS {
            parts.push(format!("... {} more ...", members.len() - MAX_FORMAT_UNION_MEMBERS));
        }
        parts.join(" | ")
    }

    fn format_function(&mut self, shape: &FunctionShape) -> String {
        let params = self.format_params(shape);
        let ret = self.format(shape.return_type);
        format!("({params}) => {ret}")
    }

    fn format_params(&mut self, shape: &FunctionShape) -> String {
        let params: Vec<String> = shape
            .params
            .iter()
            .enumerate()
            .map(|(idx, param)| {
                let name = self.interner.param_name(param, idx);
                let ty = self.format(param.type_id);
                if param.rest {
                    format!("...{name}: {ty}")
                } else if param.optional {
                    format!("{name}?: {ty}")
                } else {
                    format!("{name}: {ty}")
                }
            })
            .collect();
        params.join(", ")
    }

    fn format_object(&mut self, properties: &[PropertyInfo]) -> String {
        if properties.is_empty() {
            return "{}".to_string();
        }
        let members: Vec<String> = properties
            .iter()
            .map(|prop| {
                let name = self.interner.resolve_atom(prop.name);
                let readonly = if prop.readonly { "readonly " } else { "" };
                let optional = if prop.optional { "?" } else { "" };
                if prop.is_method
                    && let Some(method) = self.interner.function_shape_of(prop.type_id)
                {
                    let params = self.format_params(&method);
                    let ret = self.format(method.return_type);
                    return format!("{readonly}{name}{optional}({params}): {ret};");
                }
                let ty = self.format(prop.type_id);
                format!("{readonly}{name}{optional}: {ty};")
            })
            .collect();
        format!("{{ {} }}", members.join(" "))
    }

    fn needs_parens_in_array(&self, element: TypeId) -> bool {
        matches!(
            self.interner.lookup(element),
            Some(TypeData::Union(_) | TypeData::Function(_))
        )
    }

    fn is_function(&self, id: TypeId) -> bool {
        matches!(self.interner.lookup(id), Some(TypeData::Function(_)))
    }
}

/// Numbers print as integers when they are integral, as in `1157` not `1157.0`.
fn format_number(value: f64) -> String {
    if value.is_nan() {
        "NaN".to_string()
    } else if value == f64::INFINITY {
        "Infinity".to_string()
    } else if value == f64::NEG_INFINITY {
        "-Infinity".to_string()
    } else {
        format!("{value}")
    }
}

impl TypeInterner {
    /// Convenience wrapper around [`TypeFormatter`].
    pub fn display(&self, type_id: TypeId) -> String {
        TypeFormatter::new(self).format(type_id)
    }
}

#[cfg(test)]
#[path = "tests/format_tests.rs"]
mod tests;
