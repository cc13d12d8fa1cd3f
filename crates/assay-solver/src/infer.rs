//! Inference of expression types from literal shape.
//!
//! `Expr` is AST-agnostic: callers describe literals, array/object/function
//! literals and conditionals, and use [`Expr::Typed`] for any sub-expression
//! whose type is already known.
//!
//! ```text
//! const pioneer = "Lovelace";        // "Lovelace"
//! let designer = "Hopper";           // string
//! let values = [1, "a"];             // (number | string)[]
//! let pair = [1157, "Tomas"] as const;  // readonly [1157, "Tomas"]
//! ```

use crate::compat::CompatChecker;
use crate::diagnostics::CheckError;
use crate::subtype::{RefResolution, TypeResolver};
use crate::types::*;
use crate::TypeInterner;
use assay_common::CheckerOptions;
use indexmap::IndexMap;
use rustc_hash::FxBuildHasher;
use std::sync::Arc;
use tracing::{Level, span, trace};

#[derive(Clone, Debug, PartialEq)]
pub enum Expr {
    String(String),
    Number(f64),
    Boolean(bool),
    Null,
    Undefined,
    Array(Vec<ArrayElement>),
    /// Properties in source order; a repeated name keeps the last value.
    Object(Vec<(String, Expr)>),
    Function(FunctionExpr),
    /// `condition ? when_true : when_false`
    Conditional {
        condition: Box<Expr>,
        when_true: Box<Expr>,
        when_false: Box<Expr>,
    },
    /// `expr as const`
    AsConst(Box<Expr>),
    /// A sub-expression of known type.
    Typed(TypeId),
}

impl Expr {
    pub fn string(value: &str) -> Self {
        Expr::String(value.to_string())
    }

    pub fn array(elements: impl IntoIterator<Item = ArrayElement>) -> Self {
        Expr::Array(elements.into_iter().collect())
    }

    pub fn object<'n>(properties: impl IntoIterator<Item = (&'n str, Expr)>) -> Self {
        Expr::Object(
            properties
                .into_iter()
                .map(|(name, value)| (name.to_string(), value))
                .collect(),
        )
    }

    pub fn conditional(condition: Expr, when_true: Expr, when_false: Expr) -> Self {
        Expr::Conditional {
            condition: Box::new(condition),
            when_true: Box::new(when_true),
            when_false: Box::new(when_false),
        }
    }

    pub fn as_const(self) -> Self {
        Expr::AsConst(Box::new(self))
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum ArrayElement {
    Expr(Expr),
    /// `...expr`
    Spread(Expr),
}

impl From<Expr> for ArrayElement {
    fn from(expr: Expr) -> Self {
        ArrayElement::Expr(expr)
    }
}

/// A function or arrow expression.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FunctionExpr {
    pub params: Vec<ParamExpr>,
    pub return_type: Option<TypeId>,
    /// The expressions of every `return` statement in the body.
    pub returns: Vec<Expr>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ParamExpr {
    pub name: String,
    pub annotation: Option<TypeId>,
    pub optional: bool,
    pub rest: bool,
}

impl ParamExpr {
    pub fn new(name: &str) -> Self {
        ParamExpr {
            name: name.to_string(),
            annotation: None,
            optional: false,
            rest: false,
        }
    }

    pub fn annotated(mut self, type_id: TypeId) -> Self {
        self.annotation = Some(type_id);
        self
    }

    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    pub fn rest(mut self) -> Self {
        self.rest = true;
        self
    }
}

/// `const` bindings keep literal types; `let` bindings widen them.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BindingKind {
    Const,
    Let,
}

/// An inferred type together with the findings produced while inferring it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Inference {
    pub type_id: TypeId,
    pub errors: Vec<CheckError>,
}

#[derive(Clone, Copy, Debug, Default)]
struct Context {
    contextual: Option<TypeId>,
    const_assertion: bool,
}

impl Context {
    fn expecting(contextual: Option<TypeId>) -> Self {
        Context {
            contextual,
            const_assertion: false,
        }
    }
}

pub struct Inferencer<'a> {
    interner: &'a TypeInterner,
    compat: CompatChecker<'a>,
    no_implicit_any: bool,
}

impl<'a> Inferencer<'a> {
    pub fn new(interner: &'a TypeInterner) -> Self {
        Inferencer {
            interner,
            compat: CompatChecker::new(interner),
            no_implicit_any: true,
        }
    }

    pub fn with_resolver(mut self, resolver: &'a dyn TypeResolver) -> Self {
        self.compat = self.compat.with_resolver(resolver);
        self
    }

    pub fn with_options(mut self, options: &CheckerOptions) -> Self {
        self.compat = self.compat.with_options(options);
        self.no_implicit_any = options.no_implicit_any;
        self
    }

    /// The narrowest type of `expr` as an expression (literal types kept,
    /// object literals fresh).
    pub fn infer_type(&mut self, expr: &Expr) -> Inference {
        self.infer_contextual(expr, None)
    }

    /// Like [`infer_type`](Self::infer_type) with an expected type guiding
    /// tuple inference, literal preservation and parameter types.
    pub fn infer_contextual(&mut self, expr: &Expr, contextual: Option<TypeId>) -> Inference {
        let _span = span!(Level::TRACE, "infer_type").entered();
        let mut errors = Vec::new();
        let type_id = self.expr_type(expr, Context::expecting(contextual), &mut errors);
        trace!(type_id = type_id.0, errors = errors.len(), "inferred");
        Inference { type_id, errors }
    }

    /// The type of an unannotated `const`/`let` binding initialized by `expr`.
    pub fn infer_binding(&mut self, kind: BindingKind, expr: &Expr) -> Inference {
        let Inference { type_id, errors } = self.infer_type(expr);
        let type_id = self.interner.widen_freshness(type_id);
        let type_id = match (kind, expr) {
            (BindingKind::Let, expr) if !matches!(expr, Expr::AsConst(_)) => {
                self.interner.widen_literal(type_id)
            }
            _ => type_id,
        };
        Inference { type_id, errors }
    }

    /// `kind name: annotation = expr`. With an annotation the initializer is
    /// checked against it and the binding has the annotated type.
    pub fn infer_declaration(
        &mut self,
        kind: BindingKind,
        annotation: Option<TypeId>,
        expr: &Expr,
    ) -> Inference {
        let Some(declared) = annotation else {
            return self.infer_binding(kind, expr);
        };
        let Inference { type_id, mut errors } = self.infer_contextual(expr, Some(declared));
        if let Err(err) = self.compat.check_assignment(type_id, declared) {
            errors.push(err);
        }
        Inference {
            type_id: declared,
            errors,
        }
    }

    fn expr_type(&mut self, expr: &Expr, ctx: Context, errors: &mut Vec<CheckError>) -> TypeId {
        match expr {
            Expr::String(value) => self.interner.literal_string(value),
            Expr::Number(value) => self.interner.literal_number(*value),
            Expr::Boolean(value) => self.interner.literal_boolean(*value),
            Expr::Null => TypeId::NULL,
            Expr::Undefined => TypeId::UNDEFINED,
            Expr::Typed(type_id) => *type_id,
            Expr::AsConst(inner) => self.expr_type(
                inner,
                Context {
                    const_assertion: true,
                    ..ctx
                },
                errors,
            ),
            Expr::Array(elements) => self.array_type(elements, ctx, errors),
            Expr::Object(properties) => self.object_type(properties, ctx, errors),
            Expr::Function(func) => self.function_type(func, ctx, errors),
            Expr::Conditional {
                condition,
                when_true,
                when_false,
            } => {
                let condition = self.expr_type(condition, Context::default(), errors);
                let when_true = self.expr_type(when_true, ctx, errors);
                let when_false = self.expr_type(when_false, ctx, errors);
                match self.truthiness(condition) {
                    Some(true) => when_true,
                    Some(false) => when_false,
                    None => self.interner.union2(when_true, when_false),
                }
            }
        }
    }

    fn array_type(
        &mut self,
        elements: &[ArrayElement],
        ctx: Context,
        errors: &mut Vec<CheckError>,
    ) -> TypeId {
        let tuple_context = ctx.contextual.and_then(|c| self.tuple_context(c));
        if (ctx.const_assertion || tuple_context.is_some())
            && let Some(types) = self.tuple_element_types(elements, ctx, tuple_context, errors)
        {
            return self.interner.tuple_with(types, ctx.const_assertion);
        }
        if elements.is_empty() {
            // Evolving `any[]`.
            return self.interner.array(TypeId::ANY);
        }

        let element_context = ctx.contextual.and_then(|c| self.array_context(c));
        let mut types = Vec::with_capacity(elements.len());
        for element in elements {
            match element {
                ArrayElement::Expr(expr) => {
                    let type_id = self.expr_type(expr, Context::expecting(element_context), errors);
                    types.push(self.widen_for_mutable(type_id, element_context));
                }
                ArrayElement::Spread(expr) => {
                    let spread = self.expr_type(expr, Context::default(), errors);
                    for type_id in self.spread_elements(spread) {
                        types.push(self.widen_for_mutable(type_id, element_context));
                    }
                }
            }
        }
        self.interner.array(self.interner.union(types))
    }

    /// Element types for a tuple-shaped array literal, or `None` when an array
    /// spread makes the length unknown.
    fn tuple_element_types(
        &mut self,
        elements: &[ArrayElement],
        ctx: Context,
        tuple_context: Option<Arc<[TypeId]>>,
        errors: &mut Vec<CheckError>,
    ) -> Option<Vec<TypeId>> {
        let mut types = Vec::with_capacity(elements.len());
        for element in elements {
            match element {
                ArrayElement::Expr(expr) => {
                    let slot = tuple_context
                        .as_ref()
                        .and_then(|slots| slots.get(types.len()).copied());
                    let type_id = self.expr_type(
                        expr,
                        Context {
                            contextual: slot,
                            const_assertion: ctx.const_assertion,
                        },
                        errors,
                    );
                    types.push(if ctx.const_assertion {
                        type_id
                    } else {
                        self.widen_for_mutable(type_id, slot)
                    });
                }
                ArrayElement::Spread(expr) => {
                    let spread = self.expr_type(expr, Context::default(), errors);
                    let (spread_elements, _) = self.interner.tuple_elements(spread)?;
                    types.extend(spread_elements.iter().copied());
                }
            }
        }
        Some(types)
    }

    fn object_type(
        &mut self,
        properties: &[(String, Expr)],
        ctx: Context,
        errors: &mut Vec<CheckError>,
    ) -> TypeId {
        let mut members: IndexMap<_, PropertyInfo, FxBuildHasher> = IndexMap::default();
        for (name, value) in properties {
            let atom = self.interner.intern_string(name);
            let member_context = ctx.contextual.and_then(|c| self.member_context(c, atom));
            let type_id = self.expr_type(
                value,
                Context {
                    contextual: member_context,
                    const_assertion: ctx.const_assertion,
                },
                errors,
            );
            let prop = if ctx.const_assertion {
                PropertyInfo::readonly(atom, type_id)
            } else {
                PropertyInfo::new(atom, self.widen_for_mutable(type_id, member_context))
            };
            members.insert(atom, prop);
        }
        self.interner.fresh_object(members.into_values().collect())
    }

    fn function_type(
        &mut self,
        func: &FunctionExpr,
        ctx: Context,
        errors: &mut Vec<CheckError>,
    ) -> TypeId {
        let contextual_shape = ctx.contextual.and_then(|c| self.function_context(c));
        let mut params = Vec::with_capacity(func.params.len());
        for (index, param) in func.params.iter().enumerate() {
            let from_context = contextual_shape
                .as_ref()
                .and_then(|shape| self.contextual_param(shape, index, param.rest));
            let type_id = match param.annotation.or(from_context) {
                Some(type_id) => type_id,
                None => {
                    if self.no_implicit_any {
                        errors.push(CheckError::ImplicitAny {
                            parameter: param.name.clone(),
                        });
                    }
                    if param.rest {
                        self.interner.array(TypeId::ANY)
                    } else {
                        TypeId::ANY
                    }
                }
            };
            params.push(ParamInfo {
                name: Some(self.interner.intern_string(&param.name)),
                type_id,
                optional: param.optional,
                rest: param.rest,
            });
        }

        let return_type = match func.return_type {
            Some(declared) => {
                for returned in &func.returns {
                    let type_id =
                        self.expr_type(returned, Context::expecting(Some(declared)), errors);
                    if let Err(err) = self.compat.check_assignment(type_id, declared) {
                        errors.push(err);
                    }
                }
                declared
            }
            None if func.returns.is_empty() => TypeId::VOID,
            None => {
                let return_context = contextual_shape.as_ref().map(|shape| shape.return_type);
                let mut types = Vec::with_capacity(func.returns.len());
                for returned in &func.returns {
                    let type_id = self.expr_type(returned, Context::expecting(return_context), errors);
                    let type_id = self.interner.widen_freshness(type_id);
                    types.push(self.widen_for_mutable(type_id, return_context));
                }
                self.interner.union(types)
            }
        };

        match self.interner.try_function(params, return_type) {
            Ok(type_id) => type_id,
            Err(err) => {
                errors.push(err.into());
                TypeId::ANY
            }
        }
    }

    /// Literal types survive in mutable positions only when the contextual
    /// type itself mentions literals.
    fn widen_for_mutable(&mut self, type_id: TypeId, contextual: Option<TypeId>) -> TypeId {
        let keeps_literals = contextual.is_some_and(|c| {
            self.contextual_members(c)
                .into_iter()
                .any(|m| self.interner.literal_value(m).is_some())
        });
        if keeps_literals {
            type_id
        } else {
            self.interner.widen_literal(type_id)
        }
    }

    fn spread_elements(&self, spread: TypeId) -> Vec<TypeId> {
        if let Some((elements, _)) = self.interner.tuple_elements(spread) {
            return elements.to_vec();
        }
        vec![self.interner.array_element(spread).unwrap_or(TypeId::ANY)]
    }

    fn truthiness(&self, condition: TypeId) -> Option<bool> {
        if condition.is_nullish() {
            return Some(false);
        }
        if let Some(literal) = self.interner.literal_value(condition) {
            return Some(!literal.is_falsy());
        }
        match self.interner.lookup(condition)? {
            TypeData::Array(_)
            | TypeData::Tuple { .. }
            | TypeData::Object(_)
            | TypeData::Function(_) => Some(true),
            _ => None,
        }
    }

    fn structure_of(&mut self, type_id: TypeId) -> TypeId {
        match self.compat.subtype().resolve_structure(type_id) {
            RefResolution::Resolved(id) => id,
            RefResolution::Pending | RefResolution::Unresolved => type_id,
        }
    }

    /// Non-nullish constituents of a contextual type, with references expanded.
    fn contextual_members(&mut self, contextual: TypeId) -> Vec<TypeId> {
        let structure = self.structure_of(contextual);
        self.interner
            .union_or_single(structure)
            .into_iter()
            .filter(|m| !m.is_nullish())
            .map(|m| self.structure_of(m))
            .collect()
    }

    fn tuple_context(&mut self, contextual: TypeId) -> Option<Arc<[TypeId]>> {
        self.contextual_members(contextual)
            .into_iter()
            .find_map(|m| self.interner.tuple_elements(m).map(|(elements, _)| elements))
    }

    fn array_context(&mut self, contextual: TypeId) -> Option<TypeId> {
        let elements: Vec<TypeId> = self
            .contextual_members(contextual)
            .into_iter()
            .filter_map(|m| self.interner.array_element(m))
            .collect();
        (!elements.is_empty()).then(|| self.interner.union(elements))
    }

    fn member_context(&mut self, contextual: TypeId, name: assay_common::Atom) -> Option<TypeId> {
        let types: Vec<TypeId> = self
            .contextual_members(contextual)
            .into_iter()
            .filter_map(|m| {
                let shape = self.interner.object_shape_of(m)?;
                shape.find(name).map(|prop| prop.type_id)
            })
            .collect();
        (!types.is_empty()).then(|| self.interner.union(types))
    }

    fn function_context(&mut self, contextual: TypeId) -> Option<Arc<FunctionShape>> {
        self.contextual_members(contextual)
            .into_iter()
            .find_map(|m| self.interner.function_shape_of(m))
    }

    fn contextual_param(&mut self, shape: &FunctionShape, index: usize, rest: bool) -> Option<TypeId> {
        if rest {
            return shape.rest_param().map(|param| param.type_id);
        }
        self.compat.subtype().param_type_at(shape, index)
    }
}

#[cfg(test)]
#[path = "tests/infer_tests.rs"]
mod tests;
