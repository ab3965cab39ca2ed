//! Metamodel — language-agnostic entities produced by the builder.
//!
//! These entities are the single source of truth the downstream generator
//! consumes. They are created during traversal, refined by instantiation and
//! the post-pass fixers, and frozen once topological sorting completes.
//!
//! ## Key Types
//!
//! - [`MetaClass`] — a class, namespace or instantiated template
//! - [`MetaFunction`] / [`MetaArgument`] — callables and their parameters
//! - [`MetaType`] — a resolved type occurrence
//! - [`MetaEnum`] / [`MetaEnumValue`] — enums
//! - [`MetaModel`] — the finished registry plus query surface
//! - [`RejectionRecord`] / [`RejectReason`] — the diagnostic trail

mod class;
mod diagnostics;
mod function;
mod registry;
mod ty;

pub use class::{ClassKind, InstantiationInfo, MetaClass, MetaEnum, MetaEnumValue, MetaField};
pub use diagnostics::{RejectReason, RejectionRecord};
pub use function::{FunctionKind, MetaArgument, MetaFunction, OperatorKind};
pub use registry::MetaModel;
pub use ty::{BUILTIN_PRIMITIVES, MetaType, TypeKind, is_builtin_primitive};
