//! Batch checking.
//!
//! A `CheckSession` runs any number of checks and keeps going after a
//! failure: every finding becomes a [`Diagnostic`], labelled with the subject
//! the caller gave (usually the binding or expression being checked).

use crate::call::{Argument, check_call};
use crate::compat::CompatChecker;
use crate::diagnostics::CheckError;
use crate::flow::FlowAnalyzer;
use crate::infer::{BindingKind, Expr, Inference, Inferencer};
use crate::narrowing::{NarrowingContext, TypeGuard};
use crate::registry::InterfaceRegistry;
use crate::subtype::TypeResolver;
use crate::types::TypeId;
use crate::TypeInterner;
use assay_common::{CheckerOptions, Diagnostic};
use tracing::{debug, info};

pub struct CheckSession<'a> {
    interner: &'a TypeInterner,
    registry: Option<&'a InterfaceRegistry<'a>>,
    options: CheckerOptions,
    compat: CompatChecker<'a>,
    diagnostics: Vec<Diagnostic>,
}

impl<'a> CheckSession<'a> {
    pub fn new(interner: &'a TypeInterner, options: CheckerOptions) -> Self {
        CheckSession {
            interner,
            registry: None,
            options,
            compat: CompatChecker::new(interner).with_options(&options),
            diagnostics: Vec::new(),
        }
    }

    /// Follow named interface references through `registry`.
    pub fn with_registry(mut self, registry: &'a InterfaceRegistry<'a>) -> Self {
        self.registry = Some(registry);
        self.compat = CompatChecker::new(self.interner)
            .with_resolver(registry)
            .with_options(&self.options);
        self
    }

    pub fn options(&self) -> &CheckerOptions {
        &self.options
    }

    fn resolver(&self) -> Option<&'a dyn TypeResolver> {
        self.registry.map(|registry| registry as &dyn TypeResolver)
    }

    /// A flow analyzer configured like this session.
    pub fn flow(&self) -> FlowAnalyzer<'a> {
        let analyzer = FlowAnalyzer::new(self.interner).with_options(&self.options);
        match self.resolver() {
            Some(resolver) => analyzer.with_resolver(resolver),
            None => analyzer,
        }
    }

    fn inferencer(&self) -> Inferencer<'a> {
        let inferencer = Inferencer::new(self.interner).with_options(&self.options);
        match self.resolver() {
            Some(resolver) => inferencer.with_resolver(resolver),
            None => inferencer,
        }
    }

    /// Resolve every declared interface, recording each failure. Returns the
    /// number of interfaces that failed.
    pub fn resolve_interfaces(&mut self) -> usize {
        let Some(registry) = self.registry else {
            return 0;
        };
        let mut failed = 0;
        for (name, outcome) in registry.resolve_all() {
            if let Err(err) = outcome {
                failed += 1;
                let subject = self.interner.resolve_atom(name);
                self.record(&subject, &CheckError::Registry(err));
            }
        }
        failed
    }

    /// `target = source`
    pub fn check_assignment(&mut self, subject: &str, source: TypeId, target: TypeId) -> bool {
        match self.compat.check_assignment(source, target) {
            Ok(()) => true,
            Err(err) => {
                self.record(subject, &err);
                false
            }
        }
    }

    /// `kind subject: annotation = expr`; returns the binding's type.
    pub fn check_declaration(
        &mut self,
        subject: &str,
        kind: BindingKind,
        annotation: Option<TypeId>,
        expr: &Expr,
    ) -> TypeId {
        let Inference { type_id, errors } =
            self.inferencer().infer_declaration(kind, annotation, expr);
        self.record_all(subject, &errors);
        type_id
    }

    /// The type of `expr`, recording findings such as implicit-any parameters
    /// and bad returns.
    pub fn infer(&mut self, subject: &str, expr: &Expr) -> TypeId {
        let Inference { type_id, errors } = self.inferencer().infer_type(expr);
        self.record_all(subject, &errors);
        type_id
    }

    /// A call expression; returns its type even when the call is wrong.
    pub fn check_call(&mut self, subject: &str, callee: TypeId, args: &[Argument]) -> TypeId {
        let result = check_call(&mut self.compat, callee, args);
        self.record_all(subject, &result.errors);
        result.return_type
    }

    /// Narrow `source` by `guard`, recording an advisory for degenerate
    /// outcomes.
    pub fn narrow(&mut self, subject: &str, source: TypeId, guard: TypeGuard, branch: bool) -> TypeId {
        let (narrowed, advisory) =
            NarrowingContext::new(self.interner).narrow_with_advisory(source, guard, branch);
        if let Some(advisory) = advisory {
            debug!(subject, code = advisory.code(), "narrowing advisory");
            self.diagnostics
                .push(advisory.to_diagnostic(self.interner).with_subject(subject));
        }
        narrowed
    }

    /// Record the error of `result`, if any, and pass its value through.
    pub fn record_result<T>(&mut self, subject: &str, result: Result<T, CheckError>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(err) => {
                self.record(subject, &err);
                None
            }
        }
    }

    pub fn record(&mut self, subject: &str, err: &CheckError) {
        debug!(subject, code = err.code(), "finding");
        self.diagnostics
            .push(err.to_diagnostic(self.interner).with_subject(subject));
    }

    fn record_all(&mut self, subject: &str, errors: &[CheckError]) {
        for err in errors {
            self.record(subject, err);
        }
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn error_count(&self) -> usize {
        self.diagnostics.iter().filter(|d| d.is_error()).count()
    }

    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(Diagnostic::is_error)
    }

    pub fn into_diagnostics(self) -> Vec<Diagnostic> {
        info!(
            total = self.diagnostics.len(),
            errors = self.error_count(),
            "check session finished"
        );
        self.diagnostics
    }
}

#[cfg(test)]
#[path = "tests/session_tests.rs"]
mod tests;
