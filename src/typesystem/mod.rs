//! Type system — the externally authored binding directive database.
//!
//! Directives customize how declarations are bound: renames, exclusions,
//! ownership hints, injected functions, extra dependency edges, forced
//! template instantiations. The builder reads this database; it never
//! writes to it.
//!
//! ## Key Types
//!
//! - [`TypeDatabase`] — all directives for one build, indexed for lookup
//! - [`TypeEntry`] / [`TypeEntryKind`] — per-type binding rules
//! - [`FunctionModification`], [`FieldModification`], [`AddedFunction`] —
//!   per-member rules
//! - [`ExtraDependency`], [`DirectiveTypedef`] — build-ordering directives

mod database;
mod entries;
mod modifications;

pub use database::TypeDatabase;
pub use entries::{Ownership, TypeEntry, TypeEntryKind, VersionRange};
pub use modifications::{
    AddedFunction, DirectiveTypedef, ExtraDependency, FieldModification, FunctionModification,
    SignaturePattern,
};
