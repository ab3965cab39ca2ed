//! Declaration items of the code model.
//!
//! These are the immutable, already-parsed declarations the builder walks:
//! namespaces, classes, functions, fields, enums, typedefs and
//! using-declarations, each in declaration order. The model is produced by an
//! external front end; this crate only reads it.

use smol_str::SmolStr;

use super::type_info::TypeInfo;

/// Member access level.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Access {
    Private,
    Protected,
    #[default]
    Public,
}

impl Access {
    pub fn is_public(&self) -> bool {
        matches!(self, Access::Public)
    }
}

/// A parsed translation unit: the global namespace and everything under it.
#[derive(Clone, Debug, Default)]
pub struct FileModel {
    /// The global namespace; its name is empty.
    pub global: NamespaceItem,
}

impl FileModel {
    pub fn new(global: NamespaceItem) -> Self {
        Self { global }
    }
}

/// A namespace scope with its declarations in declaration order.
#[derive(Clone, Debug, Default)]
pub struct NamespaceItem {
    pub name: SmolStr,
    pub namespaces: Vec<NamespaceItem>,
    pub classes: Vec<ClassItem>,
    pub enums: Vec<EnumItem>,
    pub functions: Vec<FunctionItem>,
    pub typedefs: Vec<TypedefItem>,
    pub usings: Vec<UsingItem>,
}

impl NamespaceItem {
    pub fn new(name: &str) -> Self {
        Self {
            name: SmolStr::new(name),
            ..Self::default()
        }
    }

    pub fn with_namespace(mut self, ns: NamespaceItem) -> Self {
        self.namespaces.push(ns);
        self
    }

    pub fn with_class(mut self, class: ClassItem) -> Self {
        self.classes.push(class);
        self
    }

    pub fn with_enum(mut self, item: EnumItem) -> Self {
        self.enums.push(item);
        self
    }

    pub fn with_function(mut self, function: FunctionItem) -> Self {
        self.functions.push(function);
        self
    }

    pub fn with_typedef(mut self, typedef: TypedefItem) -> Self {
        self.typedefs.push(typedef);
        self
    }

    pub fn with_using(mut self, using: UsingItem) -> Self {
        self.usings.push(using);
        self
    }
}

/// A base-class specifier: the base type (possibly templated) and access.
#[derive(Clone, Debug)]
pub struct BaseSpecifier {
    pub ty: TypeInfo,
    pub access: Access,
}

impl BaseSpecifier {
    pub fn public(ty: TypeInfo) -> Self {
        Self {
            ty,
            access: Access::Public,
        }
    }
}

/// A template parameter declaration, with an optional default argument.
#[derive(Clone, Debug)]
pub struct TemplateParameterItem {
    pub name: SmolStr,
    pub default_type: Option<TypeInfo>,
}

impl TemplateParameterItem {
    pub fn new(name: &str) -> Self {
        Self {
            name: SmolStr::new(name),
            default_type: None,
        }
    }

    pub fn with_default(mut self, default: TypeInfo) -> Self {
        self.default_type = Some(default);
        self
    }
}

/// A class or struct declaration.
#[derive(Clone, Debug, Default)]
pub struct ClassItem {
    pub name: SmolStr,
    pub is_struct: bool,
    pub bases: Vec<BaseSpecifier>,
    pub template_parameters: Vec<TemplateParameterItem>,
    pub functions: Vec<FunctionItem>,
    pub fields: Vec<VariableItem>,
    pub enums: Vec<EnumItem>,
    pub typedefs: Vec<TypedefItem>,
    pub classes: Vec<ClassItem>,
    pub usings: Vec<UsingItem>,
    pub is_deprecated: bool,
}

impl ClassItem {
    pub fn new(name: &str) -> Self {
        Self {
            name: SmolStr::new(name),
            ..Self::default()
        }
    }

    pub fn with_base(mut self, base: BaseSpecifier) -> Self {
        self.bases.push(base);
        self
    }

    pub fn with_template_parameter(mut self, param: TemplateParameterItem) -> Self {
        self.template_parameters.push(param);
        self
    }

    pub fn with_function(mut self, function: FunctionItem) -> Self {
        self.functions.push(function);
        self
    }

    pub fn with_field(mut self, field: VariableItem) -> Self {
        self.fields.push(field);
        self
    }

    pub fn with_enum(mut self, item: EnumItem) -> Self {
        self.enums.push(item);
        self
    }

    pub fn with_typedef(mut self, typedef: TypedefItem) -> Self {
        self.typedefs.push(typedef);
        self
    }

    pub fn with_nested_class(mut self, class: ClassItem) -> Self {
        self.classes.push(class);
        self
    }

    pub fn with_using(mut self, using: UsingItem) -> Self {
        self.usings.push(using);
        self
    }

    pub fn as_deprecated(mut self) -> Self {
        self.is_deprecated = true;
        self
    }

    /// Whether this declaration is a class template.
    pub fn is_template(&self) -> bool {
        !self.template_parameters.is_empty()
    }

    /// Whether any member function is pure virtual.
    pub fn has_pure_virtuals(&self) -> bool {
        self.functions.iter().any(|f| f.is_pure_virtual)
    }
}

/// A function declaration (member or free).
#[derive(Clone, Debug)]
pub struct FunctionItem {
    pub name: SmolStr,
    /// The declared return type. Front ends record the owning class here for
    /// conversion operators; the builder's post-pass corrects that quirk.
    pub return_type: TypeInfo,
    pub arguments: Vec<ArgumentItem>,
    pub access: Access,
    pub is_static: bool,
    pub is_virtual: bool,
    pub is_pure_virtual: bool,
    pub is_const: bool,
    pub is_deleted: bool,
    pub is_deprecated: bool,
}

impl FunctionItem {
    pub fn new(name: &str, return_type: TypeInfo) -> Self {
        Self {
            name: SmolStr::new(name),
            return_type,
            arguments: Vec::new(),
            access: Access::Public,
            is_static: false,
            is_virtual: false,
            is_pure_virtual: false,
            is_const: false,
            is_deleted: false,
            is_deprecated: false,
        }
    }

    pub fn with_argument(mut self, argument: ArgumentItem) -> Self {
        self.arguments.push(argument);
        self
    }

    pub fn with_access(mut self, access: Access) -> Self {
        self.access = access;
        self
    }

    pub fn as_static(mut self) -> Self {
        self.is_static = true;
        self
    }

    pub fn as_virtual(mut self) -> Self {
        self.is_virtual = true;
        self
    }

    pub fn as_pure_virtual(mut self) -> Self {
        self.is_virtual = true;
        self.is_pure_virtual = true;
        self
    }

    pub fn as_const(mut self) -> Self {
        self.is_const = true;
        self
    }

    pub fn as_deprecated(mut self) -> Self {
        self.is_deprecated = true;
        self
    }

    /// Whether the declared name is an operator (including conversion
    /// operators such as `operator TargetType`).
    pub fn is_operator(&self) -> bool {
        self.name.starts_with("operator")
    }
}

/// A function argument: name, type and the textual default-value expression.
#[derive(Clone, Debug)]
pub struct ArgumentItem {
    pub name: SmolStr,
    pub ty: TypeInfo,
    pub default_value: Option<String>,
}

impl ArgumentItem {
    pub fn new(name: &str, ty: TypeInfo) -> Self {
        Self {
            name: SmolStr::new(name),
            ty,
            default_value: None,
        }
    }

    pub fn with_default(mut self, expr: &str) -> Self {
        self.default_value = Some(expr.to_string());
        self
    }
}

/// A field (member variable) declaration.
#[derive(Clone, Debug)]
pub struct VariableItem {
    pub name: SmolStr,
    pub ty: TypeInfo,
    pub access: Access,
    pub is_static: bool,
}

impl VariableItem {
    pub fn new(name: &str, ty: TypeInfo) -> Self {
        Self {
            name: SmolStr::new(name),
            ty,
            access: Access::Public,
            is_static: false,
        }
    }

    pub fn with_access(mut self, access: Access) -> Self {
        self.access = access;
        self
    }

    pub fn as_static(mut self) -> Self {
        self.is_static = true;
        self
    }
}

/// An enum declaration.
#[derive(Clone, Debug)]
pub struct EnumItem {
    pub name: SmolStr,
    pub is_scoped: bool,
    pub enumerators: Vec<EnumeratorItem>,
    pub access: Access,
}

impl EnumItem {
    pub fn new(name: &str) -> Self {
        Self {
            name: SmolStr::new(name),
            is_scoped: false,
            enumerators: Vec::new(),
            access: Access::Public,
        }
    }

    pub fn scoped(mut self) -> Self {
        self.is_scoped = true;
        self
    }

    pub fn with_enumerator(mut self, name: &str, value: Option<i64>) -> Self {
        self.enumerators.push(EnumeratorItem {
            name: SmolStr::new(name),
            value,
        });
        self
    }
}

/// One enumerator; `value` is `None` when the source left it implicit.
#[derive(Clone, Debug)]
pub struct EnumeratorItem {
    pub name: SmolStr,
    pub value: Option<i64>,
}

/// A typedef (or alias declaration): `typedef Target Alias;`.
#[derive(Clone, Debug)]
pub struct TypedefItem {
    pub name: SmolStr,
    pub target: TypeInfo,
}

impl TypedefItem {
    pub fn new(name: &str, target: TypeInfo) -> Self {
        Self {
            name: SmolStr::new(name),
            target,
        }
    }
}

/// A using-declaration.
///
/// In a namespace, `using ns::Name;` injects `Name` into the scope for
/// unqualified lookup. In a class body, `using Base::method;` re-exposes the
/// base class overloads on the derived class.
#[derive(Clone, Debug)]
pub struct UsingItem {
    /// The scope the name is taken from, e.g. `ns` or a base-class name.
    pub source_scope: SmolStr,
    /// The imported name.
    pub name: SmolStr,
    pub access: Access,
}

impl UsingItem {
    pub fn new(source_scope: &str, name: &str) -> Self {
        Self {
            source_scope: SmolStr::new(source_scope),
            name: SmolStr::new(name),
            access: Access::Public,
        }
    }
}
