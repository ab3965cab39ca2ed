//! Function entities of the metamodel.

use smol_str::SmolStr;

use crate::base::QName;
use crate::codemodel::Access;

use super::ty::MetaType;

/// Operator classification, by signature shape rather than name matching.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OperatorKind {
    Equal,
    NotEqual,
    Less,
    LessEqual,
    Greater,
    GreaterEqual,
    Plus,
    Minus,
    Multiply,
    Divide,
    Modulo,
    Assign,
    PlusAssign,
    MinusAssign,
    Index,
    Call,
}

impl OperatorKind {
    /// Classify the symbol part of an operator name, e.g. `==` of
    /// `operator==`. Unknown symbols are not operators we model.
    pub fn from_symbol(symbol: &str) -> Option<Self> {
        Some(match symbol {
            "==" => Self::Equal,
            "!=" => Self::NotEqual,
            "<" => Self::Less,
            "<=" => Self::LessEqual,
            ">" => Self::Greater,
            ">=" => Self::GreaterEqual,
            "+" => Self::Plus,
            "-" => Self::Minus,
            "*" => Self::Multiply,
            "/" => Self::Divide,
            "%" => Self::Modulo,
            "=" => Self::Assign,
            "+=" => Self::PlusAssign,
            "-=" => Self::MinusAssign,
            "[]" => Self::Index,
            "()" => Self::Call,
            _ => return None,
        })
    }

    /// Whether this operator takes part in the equality contract.
    pub fn is_equality(&self) -> bool {
        matches!(self, Self::Equal | Self::NotEqual)
    }

    /// Whether this operator takes part in the ordering contract.
    pub fn is_comparison(&self) -> bool {
        matches!(
            self,
            Self::Less | Self::LessEqual | Self::Greater | Self::GreaterEqual
        )
    }
}

/// What kind of callable a function entity is.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FunctionKind {
    Constructor,
    Destructor,
    Normal,
    Operator(OperatorKind),
    /// A conversion operator, `operator TargetType()`.
    Conversion,
}

/// One function argument.
#[derive(Clone, Debug)]
pub struct MetaArgument {
    pub name: SmolStr,
    pub ty: MetaType,
    /// Default-value expression after normalization (fully qualified form).
    pub default_value: Option<String>,
    /// The expression exactly as parsed, kept for diagnostics.
    pub original_default_value: Option<String>,
}

impl MetaArgument {
    pub fn new(name: &str, ty: MetaType) -> Self {
        Self {
            name: SmolStr::new(name),
            ty,
            default_value: None,
            original_default_value: None,
        }
    }

    pub fn with_default(mut self, expr: &str) -> Self {
        self.default_value = Some(expr.to_string());
        self.original_default_value = Some(expr.to_string());
        self
    }

    pub fn has_default(&self) -> bool {
        self.default_value.is_some()
    }
}

/// A function of the metamodel: member, global, operator or injected.
#[derive(Clone, Debug)]
pub struct MetaFunction {
    /// Effective name after renames.
    pub name: SmolStr,
    /// The name as declared in the source model.
    pub original_name: SmolStr,
    pub kind: FunctionKind,
    pub access: Access,
    /// `None` for constructors and destructors.
    pub return_type: Option<MetaType>,
    pub arguments: Vec<MetaArgument>,
    /// The declaring class; `None` for global functions.
    pub owner: Option<QName>,
    /// Conversion target, set by the conversion-operator fix pass.
    pub conversion_target: Option<MetaType>,
    pub is_static: bool,
    pub is_virtual: bool,
    /// Pure virtual in the source model.
    pub is_abstract: bool,
    pub is_const: bool,
    /// Injected by directive rather than parsed.
    pub is_added: bool,
    /// Renamed by directive.
    pub is_renamed: bool,
}

impl MetaFunction {
    pub fn new(name: &str, kind: FunctionKind) -> Self {
        Self {
            name: SmolStr::new(name),
            original_name: SmolStr::new(name),
            kind,
            access: Access::Public,
            return_type: None,
            arguments: Vec::new(),
            owner: None,
            conversion_target: None,
            is_static: false,
            is_virtual: false,
            is_abstract: false,
            is_const: false,
            is_added: false,
            is_renamed: false,
        }
    }

    /// Canonical signature over the original name, e.g. `value(int, Foo *)`.
    ///
    /// This is the form directive signature patterns match against.
    pub fn signature(&self) -> String {
        let mut out = String::from(self.original_name.as_str());
        out.push('(');
        for (i, arg) in self.arguments.iter().enumerate() {
            if i > 0 {
                out.push_str(", ");
            }
            out.push_str(&arg.ty.display_name());
        }
        out.push(')');
        out
    }

    /// Signature key used for override matching across an inheritance chain:
    /// name plus argument types, ignoring the return type.
    pub fn override_key(&self) -> String {
        self.signature()
    }

    pub fn is_constructor(&self) -> bool {
        self.kind == FunctionKind::Constructor
    }

    pub fn is_destructor(&self) -> bool {
        self.kind == FunctionKind::Destructor
    }

    pub fn is_operator(&self) -> bool {
        matches!(self.kind, FunctionKind::Operator(_) | FunctionKind::Conversion)
    }

    pub fn is_conversion(&self) -> bool {
        self.kind == FunctionKind::Conversion
    }

    /// Whether the signal/slot bridge can bind this function: a public,
    /// non-static instance method.
    pub fn is_bindable(&self) -> bool {
        self.access.is_public() && !self.is_static && self.kind == FunctionKind::Normal
    }
}
