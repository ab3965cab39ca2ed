//! The finished metamodel registry and its query surface.
//!
//! The registry is the single source of truth handed to the generator:
//! classes in a topologically sorted order, global functions and enums, and
//! the full rejection log. It is immutable once the build session finishes.

use indexmap::IndexMap;

use crate::base::QName;

use super::class::{MetaClass, MetaEnum};
use super::diagnostics::RejectionRecord;
use super::function::MetaFunction;

/// The finished, immutable metamodel.
#[derive(Debug, Default)]
pub struct MetaModel {
    /// All classes, keyed by qualified name, in registration order.
    classes: IndexMap<QName, MetaClass>,
    /// Topological order: every class appears after all of its bases and
    /// declared dependencies.
    sorted: Vec<QName>,
    global_functions: Vec<MetaFunction>,
    global_enums: Vec<MetaEnum>,
    rejections: Vec<RejectionRecord>,
}

impl MetaModel {
    pub(crate) fn new(
        classes: IndexMap<QName, MetaClass>,
        sorted: Vec<QName>,
        global_functions: Vec<MetaFunction>,
        global_enums: Vec<MetaEnum>,
        rejections: Vec<RejectionRecord>,
    ) -> Self {
        Self {
            classes,
            sorted,
            global_functions,
            global_enums,
            rejections,
        }
    }

    /// Look up a class by qualified name.
    pub fn find_class(&self, qualified_name: &str) -> Option<&MetaClass> {
        self.classes.get(qualified_name)
    }

    /// All classes in registration order.
    pub fn classes(&self) -> impl Iterator<Item = &MetaClass> {
        self.classes.values()
    }

    /// All classes in topological order (bases before derived).
    pub fn sorted_classes(&self) -> impl Iterator<Item = &MetaClass> {
        self.sorted
            .iter()
            .filter_map(|qname| self.classes.get(qname))
    }

    /// The topological order as qualified names.
    pub fn sorted_class_names(&self) -> &[QName] {
        &self.sorted
    }

    pub fn global_functions(&self) -> &[MetaFunction] {
        &self.global_functions
    }

    pub fn global_enums(&self) -> &[MetaEnum] {
        &self.global_enums
    }

    /// The ordered rejection log.
    pub fn rejections(&self) -> &[RejectionRecord] {
        &self.rejections
    }

    pub fn class_count(&self) -> usize {
        self.classes.len()
    }

    /// Find an enum anywhere in the model by qualified name.
    pub fn find_enum(&self, qualified_name: &str) -> Option<&MetaEnum> {
        if let Some(e) = self
            .global_enums
            .iter()
            .find(|e| e.qualified_name.as_ref() == qualified_name)
        {
            return Some(e);
        }
        self.classes.values().find_map(|c| {
            c.enums
                .iter()
                .find(|e| e.qualified_name.as_ref() == qualified_name)
        })
    }

    /// The effective function set of a class: its own functions plus those
    /// inherited through its base references, nearest override winning.
    ///
    /// Inherited functions are reached through the base list, never copied
    /// onto the derived class; constructors and destructors do not inherit.
    pub fn effective_functions(&self, qualified_name: &str) -> Vec<&MetaFunction> {
        let mut seen = rustc_hash::FxHashSet::default();
        let mut out = Vec::new();
        let mut visited = rustc_hash::FxHashSet::default();
        self.collect_effective(qualified_name, true, &mut seen, &mut visited, &mut out);
        out
    }

    fn collect_effective<'a>(
        &'a self,
        qualified_name: &str,
        own_level: bool,
        seen: &mut rustc_hash::FxHashSet<String>,
        visited: &mut rustc_hash::FxHashSet<QName>,
        out: &mut Vec<&'a MetaFunction>,
    ) {
        let Some(class) = self.classes.get(qualified_name) else {
            return;
        };
        if !visited.insert(class.qualified_name.clone()) {
            return;
        }
        for function in &class.functions {
            if !own_level && (function.is_constructor() || function.is_destructor()) {
                continue;
            }
            if seen.insert(function.override_key()) {
                out.push(function);
            }
        }
        for base in &class.base_class_names {
            self.collect_effective(base, false, seen, visited, out);
        }
    }

    /// The ordered bindable method signatures of an event-source class —
    /// the read projection the signal/slot bridge consumes.
    pub fn bindable_signatures(&self, qualified_name: &str) -> Vec<String> {
        self.effective_functions(qualified_name)
            .into_iter()
            .filter(|f| f.is_bindable())
            .map(|f| f.signature())
            .collect()
    }
}
