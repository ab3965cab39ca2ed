//! Resolved type occurrences.
//!
//! A [`MetaType`] is the semantic counterpart of a raw `TypeInfo`: its base
//! name has been matched to a primitive, a registered class or enum, a
//! template parameter, or a directive-declared external type. Every
//! `MetaType` reachable from a finished metamodel resolves to an entity
//! present in the registry; unresolved types reject their owning declaration
//! during the build instead.

use smol_str::SmolStr;

use crate::base::QName;
use crate::codemodel::{ReferenceKind, TypeInfo};

/// Builtin primitive names recognized without a directive entry.
pub const BUILTIN_PRIMITIVES: &[&str] = &[
    "void",
    "bool",
    "char",
    "signed char",
    "unsigned char",
    "short",
    "unsigned short",
    "int",
    "unsigned int",
    "long",
    "unsigned long",
    "long long",
    "unsigned long long",
    "float",
    "double",
    "long double",
];

/// Whether a name is a builtin primitive.
pub fn is_builtin_primitive(name: &str) -> bool {
    BUILTIN_PRIMITIVES.contains(&name)
}

/// What a resolved type's base name refers to.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum TypeKind {
    /// A primitive, builtin or directive-declared.
    Primitive(SmolStr),
    /// A value-type class in the registry.
    Value(QName),
    /// An object-type class in the registry.
    Object(QName),
    /// An enum in the registry.
    Enum(QName),
    /// An unsubstituted template parameter of the enclosing generic.
    TemplateParameter(SmolStr),
    /// A directive-declared external target-runtime type.
    Custom(QName),
}

/// A resolved type occurrence with its qualifiers.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct MetaType {
    pub kind: TypeKind,
    pub is_const: bool,
    pub indirections: u8,
    pub reference: ReferenceKind,
    /// Template arguments, resolved recursively.
    pub instantiations: Vec<MetaType>,
    pub array_dims: Vec<Option<usize>>,
}

impl MetaType {
    pub fn new(kind: TypeKind) -> Self {
        Self {
            kind,
            is_const: false,
            indirections: 0,
            reference: ReferenceKind::None,
            instantiations: Vec::new(),
            array_dims: Vec::new(),
        }
    }

    /// A plain primitive type.
    pub fn primitive(name: &str) -> Self {
        Self::new(TypeKind::Primitive(SmolStr::new(name)))
    }

    /// The `void` type.
    pub fn void() -> Self {
        Self::primitive("void")
    }

    /// Copy constness, indirections, reference kind and array dimensions
    /// from a raw type reference.
    pub fn with_qualifiers_of(mut self, info: &TypeInfo) -> Self {
        self.is_const = info.is_const;
        self.indirections = info.indirections;
        self.reference = info.reference;
        self.array_dims = info.array_dims.clone();
        self
    }

    pub fn with_instantiations(mut self, instantiations: Vec<MetaType>) -> Self {
        self.instantiations = instantiations;
        self
    }

    /// The base name: qualified for registry entities, plain for primitives
    /// and template parameters.
    pub fn name(&self) -> &str {
        match &self.kind {
            TypeKind::Primitive(name) | TypeKind::TemplateParameter(name) => name,
            TypeKind::Value(qname)
            | TypeKind::Object(qname)
            | TypeKind::Enum(qname)
            | TypeKind::Custom(qname) => qname,
        }
    }

    pub fn is_void(&self) -> bool {
        matches!(&self.kind, TypeKind::Primitive(name) if name == "void")
            && self.indirections == 0
    }

    pub fn is_primitive(&self) -> bool {
        matches!(self.kind, TypeKind::Primitive(_))
    }

    pub fn is_template_parameter(&self) -> bool {
        matches!(self.kind, TypeKind::TemplateParameter(_))
    }

    /// The registry class this type refers to, if any.
    pub fn type_class(&self) -> Option<&QName> {
        match &self.kind {
            TypeKind::Value(qname) | TypeKind::Object(qname) => Some(qname),
            _ => None,
        }
    }

    /// Whether this occurrence mentions a template parameter anywhere,
    /// including inside nested instantiations.
    pub fn uses_template_parameters(&self) -> bool {
        self.is_template_parameter()
            || self
                .instantiations
                .iter()
                .any(MetaType::uses_template_parameters)
    }

    /// Canonical display rendering; equal to the input for round-trips of
    /// already-qualified, unambiguous names. Also the deterministic key the
    /// instantiation cache uses.
    pub fn display_name(&self) -> String {
        let mut out = String::new();
        if self.is_const {
            out.push_str("const ");
        }
        out.push_str(self.name());
        if !self.instantiations.is_empty() {
            out.push('<');
            for (i, inst) in self.instantiations.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                out.push_str(&inst.display_name());
            }
            out.push('>');
        }
        if self.indirections > 0 {
            out.push(' ');
            for _ in 0..self.indirections {
                out.push('*');
            }
        }
        match self.reference {
            ReferenceKind::None => {}
            ReferenceKind::LValue => {
                if self.indirections == 0 {
                    out.push(' ');
                }
                out.push('&');
            }
            ReferenceKind::RValue => {
                if self.indirections == 0 {
                    out.push(' ');
                }
                out.push_str("&&");
            }
        }
        for dim in &self.array_dims {
            match dim {
                Some(n) => out.push_str(&format!("[{n}]")),
                None => out.push_str("[]"),
            }
        }
        out
    }

    /// Convert back to a raw reference. Used when instantiation substitutes
    /// arguments into declared base lists, which are raw `TypeInfo`s.
    pub fn to_type_info(&self) -> TypeInfo {
        let mut info = TypeInfo::new(self.name());
        info.is_const = self.is_const;
        info.indirections = self.indirections;
        info.reference = self.reference;
        info.array_dims = self.array_dims.clone();
        info.arguments = self
            .instantiations
            .iter()
            .map(MetaType::to_type_info)
            .collect();
        info
    }
}

impl std::fmt::Display for MetaType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.display_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_primitive_display_round_trips() {
        assert_eq!(MetaType::primitive("int").display_name(), "int");
        assert_eq!(
            MetaType::primitive("unsigned long").display_name(),
            "unsigned long"
        );
    }

    #[test]
    fn test_class_type_display() {
        let ty = MetaType::new(TypeKind::Value(QName::from("ns::Vec")))
            .with_instantiations(vec![MetaType::primitive("int")]);
        assert_eq!(ty.display_name(), "ns::Vec<int>");
    }

    #[test]
    fn test_qualifier_copy() {
        let info = TypeInfo::new("Foo").with_const().with_indirections(1);
        let ty = MetaType::new(TypeKind::Object(QName::from("Foo"))).with_qualifiers_of(&info);
        assert_eq!(ty.display_name(), "const Foo *");
    }

    #[test]
    fn test_uses_template_parameters_recurses() {
        let t = MetaType::new(TypeKind::Value(QName::from("Vec"))).with_instantiations(vec![
            MetaType::new(TypeKind::TemplateParameter(SmolStr::new("T"))),
        ]);
        assert!(t.uses_template_parameters());
        assert!(!MetaType::primitive("int").uses_template_parameters());
    }
}
