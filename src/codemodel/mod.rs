//! Code model — the read-only, already-parsed declaration tree.
//!
//! An external front end produces this model; the builder only walks it.
//! Items appear in declaration order, which the builder preserves everywhere
//! order matters (members, enumerators, base lists).
//!
//! ## Key Types
//!
//! - [`FileModel`] — a translation unit rooted at the global namespace
//! - [`ClassItem`], [`FunctionItem`], [`VariableItem`], [`EnumItem`] — declarations
//! - [`TypedefItem`], [`UsingItem`], [`TemplateParameterItem`] — scope machinery
//! - [`TypeInfo`] — structural, unresolved type references

mod items;
mod type_info;

pub use items::{
    Access, ArgumentItem, BaseSpecifier, ClassItem, EnumItem, EnumeratorItem, FileModel,
    FunctionItem, NamespaceItem, TemplateParameterItem, TypedefItem, UsingItem, VariableItem,
};
pub use type_info::{ReferenceKind, TypeInfo};
