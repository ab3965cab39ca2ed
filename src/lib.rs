//! # metabind-base
//!
//! Core library for building a language-agnostic API metamodel from parsed
//! declarations and binding directives.
//!
//! ## Module Structure (dependency order)
//!
//! ```text
//! builder     → build session: traversal, type translation, template
//!               instantiation, inheritance resolution, post-pass fixers
//!   ↓
//! meta        → metamodel entities (MetaClass, MetaFunction, MetaType,
//!               MetaEnum), registry + query surface, rejection log
//!   ↓
//! typeparser  → Logos lexer + recursive-descent parser for the compact
//!               directive grammar (type expressions, added signatures)
//!   ↓
//! typesystem  → directive database: type entries, modifications, added
//!               functions, extra dependencies (read-only collaborator)
//!   ↓
//! codemodel   → syntax tree model: namespaces, classes, functions, fields,
//!               enums, typedefs (read-only input)
//!   ↓
//! base        → primitives (qualified-name utilities, name aliases)
//! ```

/// Foundation types: qualified-name utilities, name aliases
pub mod base;

/// Code model: the read-only, already-parsed declaration tree
pub mod codemodel;

/// Type system: the read-only binding directive database
pub mod typesystem;

/// Type parser: compact grammar for type expressions and added signatures
pub mod typeparser;

/// Metamodel: language-agnostic entities and the finished registry
pub mod meta;

/// Builder: turns a code model plus directives into a finished metamodel
pub mod builder;

// Re-export the build entry points and the most commonly consumed types
pub use builder::{BuildOptions, BuildError, MetaBuilder};
pub use meta::{MetaClass, MetaEnum, MetaFunction, MetaModel, MetaType, RejectReason};
