//! Type entries — the per-type binding rules of the directive database.

use smol_str::SmolStr;

use crate::base::{QName, simple_name};

/// Ownership hint for instances crossing the binding boundary.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Ownership {
    /// Decided per call site by the generator.
    #[default]
    Default,
    /// The target runtime owns the instance.
    Target,
    /// The native side owns the instance.
    Native,
}

/// An inclusive version range a type entry applies to.
///
/// `None` bounds are open. An entry outside the active version is treated as
/// absent during lookup.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct VersionRange {
    pub since: Option<u32>,
    pub until: Option<u32>,
}

impl VersionRange {
    pub fn contains(&self, version: u32) -> bool {
        self.since.is_none_or(|s| version >= s) && self.until.is_none_or(|u| version <= u)
    }
}

/// The kind of entity a type entry declares.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TypeEntryKind {
    /// A primitive of the target language, e.g. `int`, or a directive-declared
    /// alias of one (`target` names the primitive it maps onto).
    Primitive { target: Option<SmolStr> },
    /// A value type: copied across the boundary.
    Value,
    /// An object type: reference semantics across the boundary.
    Object,
    /// A namespace scope.
    Namespace,
    /// An enum.
    Enum,
    /// A smart-pointer class template; the pointee is the template argument
    /// at `pointee_arg_index`.
    SmartPointer { pointee_arg_index: usize },
    /// A container class template mapped onto a target-runtime container.
    Container,
    /// An externally defined target-runtime type; resolves without a class.
    Custom,
}

/// A single directive entry: qualified native name plus binding rules.
#[derive(Clone, Debug)]
pub struct TypeEntry {
    pub qualified_name: QName,
    pub kind: TypeEntryKind,
    /// Rename in the target runtime; `None` keeps the native name.
    pub target_name: Option<SmolStr>,
    /// Whether the generator should emit bindings for this type at all.
    /// `false` still registers the type for resolution purposes.
    pub generate: bool,
    pub ownership: Ownership,
    /// Whether instances of this class emit native event callbacks that the
    /// signal/slot bridge forwards into the scripting runtime.
    pub is_event_source: bool,
    pub version: VersionRange,
}

impl TypeEntry {
    pub fn new(qualified_name: &str, kind: TypeEntryKind) -> Self {
        Self {
            qualified_name: QName::from(qualified_name),
            kind,
            target_name: None,
            generate: true,
            ownership: Ownership::Default,
            is_event_source: false,
            version: VersionRange::default(),
        }
    }

    /// Shorthand for a value-type entry.
    pub fn value(qualified_name: &str) -> Self {
        Self::new(qualified_name, TypeEntryKind::Value)
    }

    /// Shorthand for an object-type entry.
    pub fn object(qualified_name: &str) -> Self {
        Self::new(qualified_name, TypeEntryKind::Object)
    }

    /// Shorthand for a namespace entry.
    pub fn namespace(qualified_name: &str) -> Self {
        Self::new(qualified_name, TypeEntryKind::Namespace)
    }

    /// Shorthand for an enum entry.
    pub fn enum_entry(qualified_name: &str) -> Self {
        Self::new(qualified_name, TypeEntryKind::Enum)
    }

    /// Shorthand for a primitive entry mapping onto itself.
    pub fn primitive(qualified_name: &str) -> Self {
        Self::new(qualified_name, TypeEntryKind::Primitive { target: None })
    }

    /// Shorthand for a smart-pointer entry with the pointee in argument 0.
    pub fn smart_pointer(qualified_name: &str) -> Self {
        Self::new(
            qualified_name,
            TypeEntryKind::SmartPointer {
                pointee_arg_index: 0,
            },
        )
    }

    pub fn with_target_name(mut self, name: &str) -> Self {
        self.target_name = Some(SmolStr::new(name));
        self
    }

    pub fn without_generation(mut self) -> Self {
        self.generate = false;
        self
    }

    pub fn with_ownership(mut self, ownership: Ownership) -> Self {
        self.ownership = ownership;
        self
    }

    pub fn as_event_source(mut self) -> Self {
        self.is_event_source = true;
        self
    }

    pub fn with_version(mut self, since: Option<u32>, until: Option<u32>) -> Self {
        self.version = VersionRange { since, until };
        self
    }

    /// The unqualified native name.
    pub fn simple_name(&self) -> &str {
        simple_name(&self.qualified_name)
    }

    /// The name the generator should use: rename if present, native otherwise.
    pub fn effective_name(&self) -> &str {
        self.target_name
            .as_deref()
            .unwrap_or_else(|| self.simple_name())
    }

    pub fn is_class_like(&self) -> bool {
        matches!(
            self.kind,
            TypeEntryKind::Value
                | TypeEntryKind::Object
                | TypeEntryKind::SmartPointer { .. }
                | TypeEntryKind::Container
        )
    }
}
