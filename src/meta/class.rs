//! Class, field and enum entities of the metamodel.

use smol_str::SmolStr;

use crate::base::QName;
use crate::codemodel::{Access, TypeInfo};

use super::function::MetaFunction;
use super::ty::MetaType;

/// Ownership role of a class in the target runtime.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ClassKind {
    /// Copied across the binding boundary.
    Value,
    /// Reference semantics across the boundary.
    Object,
    /// A namespace scope modeled as a class without instances.
    Namespace,
}

/// Provenance of a class produced by template instantiation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InstantiationInfo {
    /// Qualified name of the generic this class was instantiated from.
    pub generic: QName,
    /// The concrete arguments, in parameter order.
    pub arguments: Vec<MetaType>,
}

/// A field of the metamodel.
///
/// Fields without accessible getters/setters per the directive database are
/// still modeled, flagged non-bindable.
#[derive(Clone, Debug)]
pub struct MetaField {
    pub name: SmolStr,
    pub original_name: SmolStr,
    pub ty: MetaType,
    pub access: Access,
    pub is_static: bool,
    pub is_bindable: bool,
    pub read_only: bool,
}

impl MetaField {
    pub fn new(name: &str, ty: MetaType) -> Self {
        Self {
            name: SmolStr::new(name),
            original_name: SmolStr::new(name),
            ty,
            access: Access::Public,
            is_static: false,
            is_bindable: true,
            read_only: false,
        }
    }
}

/// One enumerator of a [`MetaEnum`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MetaEnumValue {
    pub name: SmolStr,
    pub value: i64,
}

/// An enum of the metamodel.
#[derive(Clone, Debug)]
pub struct MetaEnum {
    pub name: SmolStr,
    pub qualified_name: QName,
    /// Enclosing class, by name (back-reference, non-owning).
    pub enclosing_class: Option<QName>,
    pub values: Vec<MetaEnumValue>,
    pub is_scoped: bool,
}

impl MetaEnum {
    pub fn new(name: &str, qualified_name: &str) -> Self {
        Self {
            name: SmolStr::new(name),
            qualified_name: QName::from(qualified_name),
            enclosing_class: None,
            values: Vec::new(),
            is_scoped: false,
        }
    }

    /// Look up an enumerator by name.
    pub fn value_of(&self, name: &str) -> Option<i64> {
        self.values
            .iter()
            .find(|v| v.name == name)
            .map(|v| v.value)
    }
}

/// A class of the metamodel.
///
/// Base classes are held as an ordered list of qualified names resolved
/// against the global registry — weak references, never embedded copies.
/// Once inheritance resolution completes, every name in `base_class_names`
/// is present in the registry.
#[derive(Clone, Debug)]
pub struct MetaClass {
    /// Effective simple name after renames.
    pub name: SmolStr,
    /// Native qualified name; the registry key.
    pub qualified_name: QName,
    pub kind: ClassKind,
    /// Raw base specifiers as declared; consumed by inheritance resolution.
    pub declared_bases: Vec<TypeInfo>,
    /// Resolved base classes, in declaration order.
    pub base_class_names: Vec<QName>,
    /// Template parameter names, in declaration order. Non-empty only for
    /// generics kept aside for instantiation.
    pub template_parameters: Vec<SmolStr>,
    /// Default arguments parallel to `template_parameters`.
    pub template_defaults: Vec<Option<TypeInfo>>,
    pub functions: Vec<MetaFunction>,
    pub fields: Vec<MetaField>,
    pub enums: Vec<MetaEnum>,
    /// Nested classes, by qualified name (owned entities live in the
    /// registry; this preserves declaration order).
    pub nested_classes: Vec<QName>,
    /// Set when this class was produced by the template instantiator.
    pub instantiated_from: Option<InstantiationInfo>,
    pub is_abstract: bool,
    pub is_template: bool,
    pub is_smart_pointer: bool,
    /// The pointee of a smart-pointer class, set by the post-pass.
    pub pointee_type: Option<MetaType>,
    /// Synthesized equality contract (member or free `operator==`).
    pub has_equality: bool,
    /// Synthesized ordering contract (relational operators).
    pub has_comparison: bool,
    /// Instances emit native event callbacks for the signal/slot bridge.
    pub is_event_source: bool,
    /// Classes whose conversion operators produce this class.
    pub external_conversions: Vec<QName>,
}

impl MetaClass {
    pub fn new(name: &str, qualified_name: &str, kind: ClassKind) -> Self {
        Self {
            name: SmolStr::new(name),
            qualified_name: QName::from(qualified_name),
            kind,
            declared_bases: Vec::new(),
            base_class_names: Vec::new(),
            template_parameters: Vec::new(),
            template_defaults: Vec::new(),
            functions: Vec::new(),
            fields: Vec::new(),
            enums: Vec::new(),
            nested_classes: Vec::new(),
            instantiated_from: None,
            is_abstract: false,
            is_template: false,
            is_smart_pointer: false,
            pointee_type: None,
            has_equality: false,
            has_comparison: false,
            is_event_source: false,
            external_conversions: Vec::new(),
        }
    }

    pub fn is_namespace(&self) -> bool {
        self.kind == ClassKind::Namespace
    }

    /// Find an enum owned by this class.
    pub fn find_enum(&self, name: &str) -> Option<&MetaEnum> {
        self.enums.iter().find(|e| e.name == name)
    }

    /// Functions declared directly on this class with a given original name.
    pub fn functions_named(&self, name: &str) -> impl Iterator<Item = &MetaFunction> {
        self.functions
            .iter()
            .filter(move |f| f.original_name == name)
    }

    /// Whether this class declares an equality operator over its own type.
    pub fn declares_equality_operator(&self) -> bool {
        use super::function::{FunctionKind, OperatorKind};
        self.functions.iter().any(|f| {
            matches!(f.kind, FunctionKind::Operator(op) if op == OperatorKind::Equal)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enum_value_lookup() {
        let mut e = MetaEnum::new("Color", "ns::Color");
        e.values.push(MetaEnumValue {
            name: SmolStr::new("Red"),
            value: 0,
        });
        assert_eq!(e.value_of("Red"), Some(0));
        assert_eq!(e.value_of("Blue"), None);
    }

    #[test]
    fn test_class_enum_lookup() {
        let mut c = MetaClass::new("Widget", "ns::Widget", ClassKind::Object);
        c.enums.push(MetaEnum::new("State", "ns::Widget::State"));
        assert!(c.find_enum("State").is_some());
        assert!(c.find_enum("Missing").is_none());
    }
}
