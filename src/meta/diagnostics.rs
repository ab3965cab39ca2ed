//! Rejection records — the diagnostic trail of a build.
//!
//! Every class, function, field or enum dropped during a build is recorded
//! here with a reason, so downstream tooling can report precisely what could
//! not be bound and why. The log is append-only and ordered.

use crate::base::QName;

/// Why a declaration was dropped from the metamodel.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RejectReason {
    /// No directive entry exists for the type.
    NotInTypeSystem,
    /// A directive excludes the declaration from generation.
    GenerationDisabled,
    /// The return type did not resolve.
    UnresolvedReturnType(String),
    /// An argument type did not resolve.
    UnresolvedArgumentType(String),
    /// A field type did not resolve.
    UnresolvedFieldType(String),
    /// A named base class did not resolve.
    UnresolvedBaseClass(String),
    /// More than one equally valid resolution existed.
    AmbiguousType(String),
    /// The class takes part in (or depends on) an inheritance cycle.
    CyclicInheritance,
    /// Wrong number of template arguments.
    TemplateArityMismatch { expected: usize, actual: usize },
    /// A malformed directive (added function, typedef, default value).
    DirectiveError(String),
    /// The declaration is deprecated and the build skips deprecated items.
    Deprecated,
    /// A directive signature pattern matched no function.
    UnmatchedModification(String),
}

impl RejectReason {
    /// Short stable code for logs and tooling.
    pub fn code(&self) -> &'static str {
        match self {
            Self::NotInTypeSystem => "not-in-type-system",
            Self::GenerationDisabled => "generation-disabled",
            Self::UnresolvedReturnType(_) => "unresolved-return-type",
            Self::UnresolvedArgumentType(_) => "unresolved-argument-type",
            Self::UnresolvedFieldType(_) => "unresolved-field-type",
            Self::UnresolvedBaseClass(_) => "unresolved-base-class",
            Self::AmbiguousType(_) => "ambiguous-type",
            Self::CyclicInheritance => "cyclic-inheritance",
            Self::TemplateArityMismatch { .. } => "template-arity-mismatch",
            Self::DirectiveError(_) => "directive-error",
            Self::Deprecated => "deprecated",
            Self::UnmatchedModification(_) => "unmatched-modification",
        }
    }
}

impl std::fmt::Display for RejectReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotInTypeSystem => write!(f, "no type entry"),
            Self::GenerationDisabled => write!(f, "generation disabled by directive"),
            Self::UnresolvedReturnType(t) => write!(f, "unresolved return type '{t}'"),
            Self::UnresolvedArgumentType(t) => write!(f, "unresolved argument type '{t}'"),
            Self::UnresolvedFieldType(t) => write!(f, "unresolved field type '{t}'"),
            Self::UnresolvedBaseClass(t) => write!(f, "unresolved base class '{t}'"),
            Self::AmbiguousType(t) => write!(f, "ambiguous type '{t}'"),
            Self::CyclicInheritance => write!(f, "cyclic inheritance"),
            Self::TemplateArityMismatch { expected, actual } => {
                write!(f, "expected {expected} template argument(s), got {actual}")
            }
            Self::DirectiveError(msg) => write!(f, "directive error: {msg}"),
            Self::Deprecated => write!(f, "deprecated"),
            Self::UnmatchedModification(sig) => {
                write!(f, "modification matched no function: '{sig}'")
            }
        }
    }
}

/// One entry of the rejection log.
#[derive(Clone, Debug)]
pub struct RejectionRecord {
    /// Qualified name of the dropped declaration.
    pub qualified_name: QName,
    /// The scope the declaration originated in.
    pub scope: QName,
    pub reason: RejectReason,
}

impl RejectionRecord {
    pub fn new(qualified_name: &str, scope: &str, reason: RejectReason) -> Self {
        Self {
            qualified_name: QName::from(qualified_name),
            scope: QName::from(scope),
            reason,
        }
    }
}

impl std::fmt::Display for RejectionRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.qualified_name, self.reason)
    }
}
