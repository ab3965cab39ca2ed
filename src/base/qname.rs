//! Qualified-name utilities.
//!
//! Qualified names use `::` as the scope separator throughout the crate.
//! They are stored as `Arc<str>` so registry keys and cross-references are
//! cheap to clone; simple identifiers use `SmolStr`.

use std::sync::Arc;

use smol_str::SmolStr;

/// A fully qualified name, e.g. `ns::Outer::Inner`.
pub type QName = Arc<str>;

/// The scope separator used in qualified names.
pub const SEPARATOR: &str = "::";

/// Join a scope prefix and a simple name into a qualified name.
///
/// An empty scope yields the name unchanged (global scope).
pub fn join(scope: &str, name: &str) -> String {
    if scope.is_empty() {
        name.to_string()
    } else {
        format!("{scope}{SEPARATOR}{name}")
    }
}

/// The last segment of a qualified name.
pub fn simple_name(qualified: &str) -> &str {
    qualified.rsplit(SEPARATOR).next().unwrap_or(qualified)
}

/// The enclosing scope of a qualified name, or `""` for top-level names.
pub fn enclosing_scope(qualified: &str) -> &str {
    match qualified.rfind(SEPARATOR) {
        Some(idx) => &qualified[..idx],
        None => "",
    }
}

/// Split a qualified name into its segments.
pub fn segments(qualified: &str) -> impl Iterator<Item = &str> {
    qualified.split(SEPARATOR)
}

/// Whether the name contains at least one scope separator.
pub fn is_qualified(name: &str) -> bool {
    name.contains(SEPARATOR)
}

/// Walk a scope chain outward: `a::b::c` yields `a::b::c`, `a::b`, `a`, `""`.
///
/// Used by the type translator for unqualified lookup, which tries the
/// innermost scope first.
pub fn scope_chain(scope: &str) -> Vec<&str> {
    let mut chain = Vec::new();
    let mut current = scope;
    loop {
        chain.push(current);
        if current.is_empty() {
            break;
        }
        current = enclosing_scope(current);
        if current.is_empty() {
            chain.push("");
            break;
        }
    }
    chain
}

/// Intern a string slice as a `QName`.
pub fn qname(s: &str) -> QName {
    Arc::from(s)
}

/// Intern a `SmolStr` identifier.
pub fn ident(s: &str) -> SmolStr {
    SmolStr::new(s)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_with_empty_scope() {
        assert_eq!(join("", "Foo"), "Foo");
        assert_eq!(join("ns", "Foo"), "ns::Foo");
        assert_eq!(join("a::b", "Foo"), "a::b::Foo");
    }

    #[test]
    fn test_simple_name() {
        assert_eq!(simple_name("a::b::Foo"), "Foo");
        assert_eq!(simple_name("Foo"), "Foo");
    }

    #[test]
    fn test_enclosing_scope() {
        assert_eq!(enclosing_scope("a::b::Foo"), "a::b");
        assert_eq!(enclosing_scope("Foo"), "");
    }

    #[test]
    fn test_scope_chain_walks_outward() {
        assert_eq!(scope_chain("a::b::c"), vec!["a::b::c", "a::b", "a", ""]);
        assert_eq!(scope_chain("a"), vec!["a", ""]);
        assert_eq!(scope_chain(""), vec![""]);
    }
}
