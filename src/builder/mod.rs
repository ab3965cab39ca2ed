//! Builder — turns a code model plus directives into a finished metamodel.
//!
//! A build session runs strictly sequential phases over one in-memory
//! registry; no phase suspends or blocks, and nothing outside the session
//! can observe the registry until it is finished:
//!
//! ```text
//! register scopes        ← class shells, typedefs, usings, enum names
//!     │
//!     ▼
//! populate members       ← functions, fields, enums; directive modifications
//!     │
//!     ▼
//! instantiate templates  ← directive typedefs + queued concrete uses
//!     │
//!     ▼
//! resolve inheritance    ← base lookup, dependent rejection, topological sort
//!     │
//!     ▼
//! post-pass fixers       ← smart pointers, defaults, equality, conversions
//! ```
//!
//! Per-entity failures reject only the affected declaration and are recorded;
//! the session always runs to completion and returns the best-effort model
//! together with the full rejection log.

mod error;
mod fixes;
mod inheritance;
mod instantiate;
mod translate;
mod traverse;

#[cfg(test)]
mod tests;

pub use error::BuildError;

use indexmap::IndexMap;
use rustc_hash::{FxHashMap, FxHashSet};
use smol_str::SmolStr;

use crate::base::QName;
use crate::codemodel::{FileModel, TypeInfo};
use crate::meta::{
    MetaClass, MetaEnum, MetaFunction, MetaModel, MetaType, RejectReason, RejectionRecord,
};
use crate::typesystem::TypeDatabase;

/// Session-level options, supplied by the embedding tool.
#[derive(Clone, Copy, Debug, Default)]
pub struct BuildOptions {
    /// Reject deprecated classes and functions with reason `Deprecated`.
    pub skip_deprecated: bool,
}

/// The metamodel builder.
///
/// Both inputs must be fully materialized before [`MetaBuilder::build`] is
/// called; the builder never touches I/O and never mutates its inputs.
pub struct MetaBuilder<'a> {
    dom: &'a FileModel,
    db: &'a TypeDatabase,
    options: BuildOptions,
}

impl<'a> MetaBuilder<'a> {
    pub fn new(dom: &'a FileModel, db: &'a TypeDatabase) -> Self {
        Self {
            dom,
            db,
            options: BuildOptions::default(),
        }
    }

    pub fn with_options(mut self, options: BuildOptions) -> Self {
        self.options = options;
        self
    }

    /// Run the build session to completion.
    ///
    /// Always returns a model: entities that could not be resolved are absent
    /// from it and present in the rejection log instead.
    pub fn build(self) -> MetaModel {
        let dom = self.dom;
        let mut session = Session {
            db: self.db,
            options: self.options,
            state: BuilderState::default(),
        };

        tracing::debug!("build: registering scopes");
        session.register_namespace(&dom.global, "");

        tracing::debug!("build: populating members");
        session.populate_namespace(&dom.global, "");
        session.apply_class_usings();
        session.process_typedef_classes();
        session.check_modifications();

        tracing::debug!("build: instantiating templates");
        session.process_directive_typedefs();
        session.process_pending_instantiations();

        tracing::debug!("build: resolving inheritance");
        session.resolve_inheritance();
        session.sort_classes();

        tracing::debug!("build: running post-pass fixers");
        session.fix_smart_pointers();
        session.fix_default_values();
        session.fix_equality_contracts();
        session.fix_external_conversions();

        let state = session.state;
        tracing::debug!(
            classes = state.classes.len(),
            rejections = state.rejections.len(),
            "build: finished"
        );
        MetaModel::new(
            state.classes,
            state.sorted,
            state.global_functions,
            state.global_enums,
            state.rejections,
        )
    }
}

/// One running build session.
pub(crate) struct Session<'a> {
    pub(crate) db: &'a TypeDatabase,
    pub(crate) options: BuildOptions,
    pub(crate) state: BuilderState,
}

/// Mutable working state of a session. Exclusively owned by the session;
/// handed wholesale to the finished model at the end.
#[derive(Default)]
pub(crate) struct BuilderState {
    /// Registered classes (shells first, populated in place).
    pub(crate) classes: IndexMap<QName, MetaClass>,
    /// Generic class definitions, kept aside for instantiation.
    pub(crate) templates: IndexMap<QName, MetaClass>,
    /// Qualified names known to be enums, for type resolution.
    pub(crate) enum_names: FxHashSet<QName>,
    /// Scope-qualified typedef alias → target.
    pub(crate) typedefs: FxHashMap<QName, TypeInfo>,
    /// Namespace-scope using-declarations: scope → (name, source scope).
    pub(crate) scope_usings: FxHashMap<QName, Vec<(SmolStr, SmolStr)>>,
    /// Class-body using-declarations, applied once all classes are populated:
    /// (class, base text, function name).
    pub(crate) pending_class_usings: Vec<(QName, SmolStr, SmolStr)>,
    /// Instantiation requests discovered during traversal.
    pub(crate) pending_instantiations: Vec<(QName, Vec<MetaType>)>,
    /// (generic, rendered argument list) → concrete class name.
    pub(crate) instantiation_cache: FxHashMap<(QName, String), QName>,
    /// Function modifications that matched at least one function,
    /// as (class, modification index).
    pub(crate) matched_modifications: FxHashSet<(QName, usize)>,
    pub(crate) global_functions: Vec<MetaFunction>,
    pub(crate) global_enums: Vec<MetaEnum>,
    pub(crate) rejections: Vec<RejectionRecord>,
    /// Topological class order, filled by the sort phase.
    pub(crate) sorted: Vec<QName>,
}

impl BuilderState {
    /// Record a rejection. Every dropped declaration goes through here.
    pub(crate) fn reject(&mut self, qualified_name: &str, scope: &str, reason: RejectReason) {
        tracing::debug!(entity = qualified_name, reason = %reason, "rejected");
        self.rejections
            .push(RejectionRecord::new(qualified_name, scope, reason));
    }

    /// Remove a class and record why. Used by the fatal per-class paths
    /// (directive errors, unresolved bases, cycles).
    pub(crate) fn drop_class(&mut self, qualified_name: &str, scope: &str, reason: RejectReason) {
        self.classes.shift_remove(qualified_name);
        self.reject(qualified_name, scope, reason);
    }

    /// Record a typedef alias visible at a scope.
    pub(crate) fn add_typedef(&mut self, alias_qname: &str, target: TypeInfo) {
        self.typedefs.insert(QName::from(alias_qname), target);
    }
}
