//! Modifications — directive-driven changes to individual declarations.
//!
//! A modification targets a class (or the global scope) and changes how one of
//! its members is bound: renames, removals, access changes, argument-name
//! fixes, injected functions. Modifications are matched against functions by
//! signature pattern; patterns that match nothing are reported after traversal.

use smol_str::SmolStr;

use crate::base::QName;
use crate::codemodel::Access;

/// Matches a function by name, optionally narrowed by an exact signature.
///
/// The signature form is the canonical rendering produced by
/// `MetaFunction::signature()`, e.g. `value(int, const Foo &)`. A bare name
/// matches every overload of that name.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SignaturePattern {
    pub name: SmolStr,
    pub signature: Option<String>,
}

impl SignaturePattern {
    /// Match every overload with this name.
    pub fn name(name: &str) -> Self {
        Self {
            name: SmolStr::new(name),
            signature: None,
        }
    }

    /// Match one exact signature, e.g. `value(int)`.
    pub fn signature(signature: &str) -> Self {
        let name = signature.split('(').next().unwrap_or(signature).trim();
        Self {
            name: SmolStr::new(name),
            signature: Some(signature.to_string()),
        }
    }

    pub fn matches(&self, name: &str, signature: &str) -> bool {
        match &self.signature {
            Some(pattern) => pattern == signature,
            None => self.name == name,
        }
    }
}

/// A directive-driven change to a function.
#[derive(Clone, Debug)]
pub struct FunctionModification {
    pub pattern: SignaturePattern,
    pub rename: Option<SmolStr>,
    pub remove: bool,
    pub access: Option<Access>,
    /// Argument renames as (1-based position, new name).
    pub argument_names: Vec<(usize, SmolStr)>,
}

impl FunctionModification {
    pub fn new(pattern: SignaturePattern) -> Self {
        Self {
            pattern,
            rename: None,
            remove: false,
            access: None,
            argument_names: Vec::new(),
        }
    }

    pub fn renamed(mut self, name: &str) -> Self {
        self.rename = Some(SmolStr::new(name));
        self
    }

    pub fn removed(mut self) -> Self {
        self.remove = true;
        self
    }

    pub fn with_access(mut self, access: Access) -> Self {
        self.access = Some(access);
        self
    }

    pub fn with_argument_name(mut self, position: usize, name: &str) -> Self {
        self.argument_names.push((position, SmolStr::new(name)));
        self
    }
}

/// A directive-driven change to a field.
#[derive(Clone, Debug)]
pub struct FieldModification {
    pub name: SmolStr,
    /// The field is modeled but not bound (no accessible getter/setter).
    pub remove: bool,
    /// Only a getter is generated.
    pub read_only: bool,
    pub rename: Option<SmolStr>,
}

impl FieldModification {
    pub fn new(name: &str) -> Self {
        Self {
            name: SmolStr::new(name),
            remove: false,
            read_only: false,
            rename: None,
        }
    }

    pub fn removed(mut self) -> Self {
        self.remove = true;
        self
    }

    pub fn as_read_only(mut self) -> Self {
        self.read_only = true;
        self
    }

    pub fn renamed(mut self, name: &str) -> Self {
        self.rename = Some(SmolStr::new(name));
        self
    }
}

/// A synthetic function injected by directive, absent from the parsed tree.
///
/// The declaration is a compact textual signature, e.g.
/// `int clamp(int value, int lo = 0, int hi = 100)`, parsed by the
/// `typeparser` module. Malformed declarations are configuration errors and
/// are reported distinctly from parse-time rejections.
#[derive(Clone, Debug)]
pub struct AddedFunction {
    pub declaration: String,
    pub is_static: bool,
    pub access: Access,
}

impl AddedFunction {
    pub fn new(declaration: &str) -> Self {
        Self {
            declaration: declaration.to_string(),
            is_static: false,
            access: Access::Public,
        }
    }

    pub fn as_static(mut self) -> Self {
        self.is_static = true;
        self
    }

    pub fn with_access(mut self, access: Access) -> Self {
        self.access = access;
        self
    }
}

/// An ordering edge without an inheritance relation: `class` must be emitted
/// after `required`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExtraDependency {
    pub class: QName,
    pub required: QName,
}

impl ExtraDependency {
    pub fn new(class: &str, required: &str) -> Self {
        Self {
            class: QName::from(class),
            required: QName::from(required),
        }
    }
}

/// A directive typedef: registers a concrete instantiation of a class
/// template under an alias, e.g. `IntBox = Box<int>`.
#[derive(Clone, Debug)]
pub struct DirectiveTypedef {
    /// The alias the concrete class is registered under.
    pub alias: QName,
    /// The instantiation source, e.g. `Box<int>`; parsed by `typeparser`.
    pub source: String,
}

impl DirectiveTypedef {
    pub fn new(alias: &str, source: &str) -> Self {
        Self {
            alias: QName::from(alias),
            source: source.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_pattern_matches_all_overloads() {
        let p = SignaturePattern::name("value");
        assert!(p.matches("value", "value()"));
        assert!(p.matches("value", "value(int)"));
        assert!(!p.matches("other", "other()"));
    }

    #[test]
    fn test_signature_pattern_is_exact() {
        let p = SignaturePattern::signature("value(int)");
        assert_eq!(p.name, "value");
        assert!(p.matches("value", "value(int)"));
        assert!(!p.matches("value", "value()"));
    }
}
