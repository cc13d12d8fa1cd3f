//! Diagnostic types and message lookup for the checker.
//!
//! Message data lives in `data.rs`. A diagnostic here has no source span:
//! callers attach a free-form `subject` (for example the binding or call being
//! checked) when they drive a batch of checks.

use serde::Serialize;

mod data;
pub use data::{DIAGNOSTIC_MESSAGES, diagnostic_codes, diagnostic_messages};

// =============================================================================
// Diagnostic Types
// =============================================================================

/// Diagnostic category.
///
/// `Suggestion` marks advisory outcomes: results that are legitimate at the
/// type level (a branch narrowed to `never`, a comparison that can never be
/// true) but worth surfacing to the user.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum DiagnosticCategory {
    Warning = 0,
    Error = 1,
    Suggestion = 2,
    Message = 3,
}

/// A message template with its code and default category.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DiagnosticMessage {
    pub code: u32,
    pub category: DiagnosticCategory,
    pub message: &'static str,
}

/// Chained detail for a diagnostic (e.g. which property failed inside an
/// object comparison).
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct DiagnosticRelatedInformation {
    pub message_text: String,
    pub category: DiagnosticCategory,
    pub code: u32,
}

/// A checker diagnostic with optional related information.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    /// What was being checked, if the caller supplied a label.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    pub message_text: String,
    pub category: DiagnosticCategory,
    pub code: u32,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub related_information: Vec<DiagnosticRelatedInformation>,
}

impl Diagnostic {
    /// Create a new error diagnostic.
    #[must_use]
    pub fn error(message: impl Into<String>, code: u32) -> Self {
        Self {
            subject: None,
            message_text: message.into(),
            category: DiagnosticCategory::Error,
            code,
            related_information: Vec::new(),
        }
    }

    /// Create an advisory diagnostic.
    #[must_use]
    pub fn suggestion(message: impl Into<String>, code: u32) -> Self {
        Self {
            category: DiagnosticCategory::Suggestion,
            ..Self::error(message, code)
        }
    }

    /// Build a diagnostic from a table entry, filling its placeholders.
    #[must_use]
    pub fn from_message(message: &DiagnosticMessage, args: &[&str]) -> Self {
        Self {
            category: message.category,
            ..Self::error(format_message(message.message, args), message.code)
        }
    }

    #[must_use]
    pub fn with_subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = Some(subject.into());
        self
    }

    /// Append a chained detail message.
    #[must_use]
    pub fn with_related(mut self, message: impl Into<String>, code: u32) -> Self {
        self.related_information.push(DiagnosticRelatedInformation {
            message_text: message.into(),
            category: DiagnosticCategory::Message,
            code,
        });
        self
    }

    #[inline]
    pub fn is_error(&self) -> bool {
        self.category == DiagnosticCategory::Error
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let category = match self.category {
            DiagnosticCategory::Warning => "warning",
            DiagnosticCategory::Error => "error",
            DiagnosticCategory::Suggestion => "suggestion",
            DiagnosticCategory::Message => "message",
        };
        if let Some(subject) = &self.subject {
            write!(f, "{subject}: ")?;
        }
        write!(f, "{category} TS{}: {}", self.code, self.message_text)?;
        for related in &self.related_information {
            write!(f, "\n  {}", related.message_text)?;
        }
        Ok(())
    }
}

// =============================================================================
// Message lookup
// =============================================================================

/// Look up a message entry by its code.
pub fn lookup_message(code: u32) -> Option<&'static DiagnosticMessage> {
    DIAGNOSTIC_MESSAGES.iter().find(|m| m.code == code)
}

pub fn get_message_template(code: u32) -> Option<&'static str> {
    lookup_message(code).map(|m| m.message)
}

/// Replace `{0}`, `{1}`, ... in `message` with `args`.
pub fn format_message(message: &str, args: &[&str]) -> String {
    let mut result = message.to_string();
    for (i, arg) in args.iter().enumerate() {
        result = result.replace(&format!("{{{i}}}"), arg);
    }
    result
}
