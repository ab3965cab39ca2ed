//! Error types for the build session.

use thiserror::Error;

use crate::typeparser::SyntaxError;

/// Errors raised while resolving declarations against the directive database.
///
/// Per-entity failures (`UnresolvedType`, `AmbiguousType`,
/// `TemplateArityMismatch`) reject only the owning declaration and are
/// recorded in the rejection log; the build continues. `CyclicInheritance`
/// and `DirectiveSyntax` abort the affected class and its dependents, but
/// never the whole session.
#[derive(Debug, Error)]
pub enum BuildError {
    /// A type name could not be matched to any known entity or primitive.
    #[error("unresolved type '{name}' in scope '{scope}'")]
    UnresolvedType { name: String, scope: String },

    /// More than one equally valid resolution at the same scope level.
    #[error("ambiguous type '{name}': candidates {candidates:?}")]
    AmbiguousType {
        name: String,
        candidates: Vec<String>,
    },

    /// The topological sort detected an inheritance cycle.
    #[error("cyclic inheritance involving '{class}'")]
    CyclicInheritance { class: String },

    /// A malformed injected signature or default-value expression.
    #[error("directive syntax error: {0}")]
    DirectiveSyntax(#[from] SyntaxError),

    /// Wrong number of template arguments supplied.
    #[error("'{name}' expects {expected} template argument(s), got {actual}")]
    TemplateArityMismatch {
        name: String,
        expected: usize,
        actual: usize,
    },
}

impl BuildError {
    /// Create an unresolved-type error.
    pub fn unresolved(name: impl Into<String>, scope: impl Into<String>) -> Self {
        Self::UnresolvedType {
            name: name.into(),
            scope: scope.into(),
        }
    }

    /// Create an ambiguous-type error.
    pub fn ambiguous(name: impl Into<String>, candidates: Vec<String>) -> Self {
        Self::AmbiguousType {
            name: name.into(),
            candidates,
        }
    }

    /// The display name of the type the error is about, for rejection records.
    pub fn type_name(&self) -> String {
        match self {
            Self::UnresolvedType { name, .. } => name.clone(),
            Self::AmbiguousType { name, .. } => name.clone(),
            Self::CyclicInheritance { class } => class.clone(),
            Self::DirectiveSyntax(err) => err.message.clone(),
            Self::TemplateArityMismatch { name, .. } => name.clone(),
        }
    }
}
