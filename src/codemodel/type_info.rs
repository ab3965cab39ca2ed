//! Structural type references as they appear in parsed declarations.
//!
//! A [`TypeInfo`] is the raw, unresolved description of a type occurrence:
//! name segments, constness, indirections, reference kind, template arguments
//! and array dimensions. The builder's type translator turns these into
//! resolved `MetaType`s; nothing here consults any registry.

use smol_str::SmolStr;

use crate::base::SEPARATOR;

/// Reference qualifier of a type occurrence.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ReferenceKind {
    #[default]
    None,
    /// `T &`
    LValue,
    /// `T &&`
    RValue,
}

/// A raw, structural type reference.
///
/// Renders back to a canonical display string via [`TypeInfo::display_name`],
/// which is also the deterministic key used by the instantiation cache.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct TypeInfo {
    /// Name segments, e.g. `["ns", "Vec"]` for `ns::Vec`.
    segments: Vec<SmolStr>,
    /// `const` qualifier.
    pub is_const: bool,
    /// Number of `*` indirections.
    pub indirections: u8,
    /// Reference qualifier.
    pub reference: ReferenceKind,
    /// Template arguments, recursive.
    pub arguments: Vec<TypeInfo>,
    /// Array dimensions; `None` for an unsized dimension (`[]`).
    pub array_dims: Vec<Option<usize>>,
}

impl TypeInfo {
    /// Create a type reference from a possibly qualified name.
    pub fn new(name: &str) -> Self {
        Self {
            segments: name.split(SEPARATOR).map(SmolStr::new).collect(),
            ..Self::default()
        }
    }

    /// Create a type reference from pre-split segments.
    pub fn from_segments(segments: Vec<SmolStr>) -> Self {
        Self {
            segments,
            ..Self::default()
        }
    }

    /// The `void` type.
    pub fn void() -> Self {
        Self::new("void")
    }

    pub fn with_const(mut self) -> Self {
        self.is_const = true;
        self
    }

    pub fn with_indirections(mut self, count: u8) -> Self {
        self.indirections = count;
        self
    }

    pub fn with_reference(mut self, kind: ReferenceKind) -> Self {
        self.reference = kind;
        self
    }

    pub fn with_arguments(mut self, arguments: Vec<TypeInfo>) -> Self {
        self.arguments = arguments;
        self
    }

    pub fn with_array_dim(mut self, dim: Option<usize>) -> Self {
        self.array_dims.push(dim);
        self
    }

    /// The joined qualified name, without qualifiers or arguments.
    pub fn name(&self) -> String {
        self.segments.join(SEPARATOR)
    }

    /// The name segments.
    pub fn segments(&self) -> &[SmolStr] {
        &self.segments
    }

    /// Replace the name segments, keeping all qualifiers.
    pub fn set_name(&mut self, name: &str) {
        self.segments = name.split(SEPARATOR).map(SmolStr::new).collect();
    }

    /// The last name segment.
    pub fn simple_name(&self) -> &str {
        self.segments.last().map(SmolStr::as_str).unwrap_or("")
    }

    /// Whether the name is scope-qualified.
    pub fn is_qualified(&self) -> bool {
        self.segments.len() > 1
    }

    /// Whether this is plain `void` with no qualifiers.
    pub fn is_void(&self) -> bool {
        self.segments.len() == 1
            && self.segments[0] == "void"
            && self.indirections == 0
            && self.arguments.is_empty()
    }

    /// Whether this reference carries no qualifiers, arguments or arrays.
    pub fn is_plain(&self) -> bool {
        !self.is_const
            && self.indirections == 0
            && self.reference == ReferenceKind::None
            && self.arguments.is_empty()
            && self.array_dims.is_empty()
    }

    /// Canonical display rendering, e.g. `const ns::Vec<int> *&`.
    pub fn display_name(&self) -> String {
        let mut out = String::new();
        if self.is_const {
            out.push_str("const ");
        }
        out.push_str(&self.name());
        if !self.arguments.is_empty() {
            out.push('<');
            for (i, arg) in self.arguments.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                out.push_str(&arg.display_name());
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
}

impl std::fmt::Display for TypeInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.display_name())
    }
}
