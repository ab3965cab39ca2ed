//! The directive database: every binding rule, indexed for resolution.
//!
//! Entries are kept in insertion order (the order the directives were
//! authored); a secondary simple-name index serves unqualified lookups and
//! surfaces ambiguity candidates. Read-only from the builder's perspective.

use indexmap::IndexMap;
use rustc_hash::FxHashMap;

use crate::base::{QName, simple_name};

use super::entries::TypeEntry;
use super::modifications::{
    AddedFunction, DirectiveTypedef, ExtraDependency, FieldModification, FunctionModification,
};

/// The full set of binding directives for one build.
#[derive(Debug, Default)]
pub struct TypeDatabase {
    /// Qualified name → entry, in authoring order.
    entries: IndexMap<QName, TypeEntry>,
    /// Simple name → qualified names carrying it (ambiguity candidates).
    by_simple_name: FxHashMap<Box<str>, Vec<QName>>,
    /// Function modifications per class (empty key = global functions).
    function_modifications: FxHashMap<QName, Vec<FunctionModification>>,
    /// Field modifications per class.
    field_modifications: FxHashMap<QName, Vec<FieldModification>>,
    /// Added functions per class (empty key = global scope).
    added_functions: FxHashMap<QName, Vec<AddedFunction>>,
    /// Extra ordering edges for the topological sort.
    extra_dependencies: Vec<ExtraDependency>,
    /// Directive typedefs forcing template instantiations.
    typedefs: Vec<DirectiveTypedef>,
    /// The active API version for `VersionRange` filtering.
    api_version: u32,
}

impl TypeDatabase {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_api_version(mut self, version: u32) -> Self {
        self.api_version = version;
        self
    }

    /// Register a type entry. Later entries with the same qualified name
    /// replace earlier ones (directive files are applied in order).
    pub fn add_entry(&mut self, entry: TypeEntry) {
        let qname = entry.qualified_name.clone();
        let simple = simple_name(&qname).to_string().into_boxed_str();
        let names = self.by_simple_name.entry(simple).or_default();
        if !names.contains(&qname) {
            names.push(qname.clone());
        }
        self.entries.insert(qname, entry);
    }

    /// Exact lookup by qualified name, honoring the active version range.
    pub fn find(&self, qualified_name: &str) -> Option<&TypeEntry> {
        self.entries
            .get(qualified_name)
            .filter(|e| e.version.contains(self.api_version))
    }

    /// All entries carrying a simple name, honoring the version range.
    ///
    /// More than one result at resolution time is an ambiguity, never a guess.
    pub fn candidates(&self, simple: &str) -> Vec<&TypeEntry> {
        self.by_simple_name
            .get(simple)
            .into_iter()
            .flatten()
            .filter_map(|qname| self.entries.get(qname.as_ref()))
            .filter(|e| e.version.contains(self.api_version))
            .collect()
    }

    /// Iterate all entries in authoring order.
    pub fn entries(&self) -> impl Iterator<Item = &TypeEntry> {
        self.entries.values()
    }

    pub fn add_function_modification(&mut self, class: &str, modification: FunctionModification) {
        self.function_modifications
            .entry(QName::from(class))
            .or_default()
            .push(modification);
    }

    /// Function modifications for a class; `""` addresses global functions.
    pub fn function_modifications(&self, class: &str) -> &[FunctionModification] {
        self.function_modifications
            .get(class)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn add_field_modification(&mut self, class: &str, modification: FieldModification) {
        self.field_modifications
            .entry(QName::from(class))
            .or_default()
            .push(modification);
    }

    pub fn field_modifications(&self, class: &str) -> &[FieldModification] {
        self.field_modifications
            .get(class)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn add_added_function(&mut self, class: &str, function: AddedFunction) {
        self.added_functions
            .entry(QName::from(class))
            .or_default()
            .push(function);
    }

    /// Added functions for a class; `""` addresses the global scope.
    pub fn added_functions(&self, class: &str) -> &[AddedFunction] {
        self.added_functions
            .get(class)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn add_extra_dependency(&mut self, dependency: ExtraDependency) {
        self.extra_dependencies.push(dependency);
    }

    pub fn extra_dependencies(&self) -> &[ExtraDependency] {
        &self.extra_dependencies
    }

    pub fn add_typedef(&mut self, typedef: DirectiveTypedef) {
        self.typedefs.push(typedef);
    }

    pub fn typedefs(&self) -> &[DirectiveTypedef] {
        &self.typedefs
    }

    /// All classes the function-modification map addresses. Used by the
    /// post-traversal check for modifications that matched nothing.
    pub fn modified_classes(&self) -> impl Iterator<Item = &QName> {
        self.function_modifications.keys()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::typesystem::entries::TypeEntry;

    #[test]
    fn test_find_is_exact() {
        let mut db = TypeDatabase::new();
        db.add_entry(TypeEntry::value("ns::Foo"));
        assert!(db.find("ns::Foo").is_some());
        assert!(db.find("Foo").is_none());
    }

    #[test]
    fn test_candidates_collects_same_simple_name() {
        let mut db = TypeDatabase::new();
        db.add_entry(TypeEntry::value("a::Point"));
        db.add_entry(TypeEntry::value("b::Point"));
        let candidates = db.candidates("Point");
        assert_eq!(candidates.len(), 2);
    }

    #[test]
    fn test_version_filtering_hides_entries() {
        let mut db = TypeDatabase::new().with_api_version(1);
        db.add_entry(TypeEntry::value("New").with_version(Some(2), None));
        db.add_entry(TypeEntry::value("Old").with_version(None, Some(3)));
        assert!(db.find("New").is_none());
        assert!(db.find("Old").is_some());
        assert!(db.candidates("New").is_empty());
    }

    #[test]
    fn test_later_entry_replaces_earlier() {
        let mut db = TypeDatabase::new();
        db.add_entry(TypeEntry::value("Foo"));
        db.add_entry(TypeEntry::object("Foo"));
        let entry = db.find("Foo").unwrap();
        assert!(matches!(
            entry.kind,
            crate::typesystem::TypeEntryKind::Object
        ));
    }
}
