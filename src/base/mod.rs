//! Foundation types for the metabind toolchain.
//!
//! This module provides fundamental types used throughout the crate:
//! - [`QName`] - Qualified names (`Arc<str>`)
//! - Qualified-name path utilities (`join`, `simple_name`, `scope_chain`)
//!
//! This module has NO dependencies on other metabind modules.

mod qname;

pub use qname::{
    QName, SEPARATOR, enclosing_scope, ident, is_qualified, join, qname, scope_chain, segments,
    simple_name,
};
