//! Common types and utilities for the assay type checker.
//!
//! This crate provides foundational types shared by the solver:
//! - String interning (`Atom`, `ShardedInterner`)
//! - Checker limits and thresholds
//! - Diagnostic categories, codes, and message templates
//! - Checker configuration (`CheckerConfig`, `CheckerOptions`)
//! - Tracing subscriber setup

// String interning for member and interface names
pub mod interner;
pub use interner::{Atom, ShardedInterner};

// Centralized limits and thresholds
pub mod limits;

// Diagnostic types and message lookup
pub mod diagnostics;
pub use diagnostics::{
    Diagnostic, DiagnosticCategory, DiagnosticMessage, DiagnosticRelatedInformation,
    diagnostic_codes, diagnostic_messages, format_message, get_message_template,
};

// tsconfig-shaped checker configuration
pub mod config;
pub use config::{CheckerConfig, CheckerOptions};

// Opt-in tracing output
pub mod tracing_config;

#[cfg(test)]
#[path = "../tests/interner_tests.rs"]
mod interner_tests;

#[cfg(test)]
#[path = "../tests/config_tests.rs"]
mod config_tests;

#[cfg(test)]
#[path = "../tests/diagnostics_tests.rs"]
mod diagnostics_tests;
