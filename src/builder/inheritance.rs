//! Inheritance resolution and topological sorting.
//!
//! Every declared base is resolved to a registry entry; a class with any
//! unresolved base is dropped, and classes depending on a dropped class are
//! dropped in turn. The sort is a depth-first visit with three-color marking;
//! an in-progress node hit during descent signals a cycle, which fails the
//! whole cycle and everything depending on it — cycles are reported, never
//! silently broken. Multiple inheritance keeps declaration order; no merge
//! linearization is attempted.

use rustc_hash::{FxHashMap, FxHashSet};

use crate::base::{QName, enclosing_scope};
use crate::codemodel::TypeInfo;
use crate::meta::{MetaType, RejectReason, TypeKind};

use super::Session;
use super::translate::{TranslateCtx, translate_type};

#[derive(Clone, Copy, PartialEq, Eq)]
enum Color {
    White,
    Gray,
    Black,
}

impl Session<'_> {
    /// Resolve every class's declared bases to registry entries.
    ///
    /// Resolving a generic base can instantiate new classes mid-pass, so the
    /// walk repeats until no unprocessed class remains.
    pub(crate) fn resolve_inheritance(&mut self) {
        let mut processed: FxHashSet<QName> = FxHashSet::default();
        loop {
            let pending: Vec<QName> = self
                .state
                .classes
                .keys()
                .filter(|qname| !processed.contains(*qname))
                .cloned()
                .collect();
            if pending.is_empty() {
                break;
            }
            for qname in &pending {
                processed.insert(qname.clone());
                self.resolve_class_bases(qname);
            }
        }
        self.drop_dependents_of_missing_bases();
    }

    fn resolve_class_bases(&mut self, qname: &QName) {
        let declared: Vec<TypeInfo> = match self.state.classes.get(qname) {
            Some(class) => class.declared_bases.clone(),
            None => return, // dropped meanwhile
        };
        let mut resolved = Vec::with_capacity(declared.len());
        let mut failure: Option<RejectReason> = None;
        for base in &declared {
            match self.resolve_base(qname, base) {
                Ok(base_qname) => resolved.push(base_qname),
                Err(reason) => {
                    failure = Some(reason);
                    break;
                }
            }
        }
        match failure {
            Some(reason) => {
                self.state
                    .drop_class(qname, enclosing_scope(qname), reason);
            }
            None => {
                if let Some(class) = self.state.classes.get_mut(qname) {
                    class.base_class_names = resolved;
                }
            }
        }
    }

    /// Resolve one declared base, instantiating a generic base if needed.
    fn resolve_base(&mut self, class: &QName, base: &TypeInfo) -> Result<QName, RejectReason> {
        let scope = enclosing_scope(class).to_string();
        let resolved = {
            let ctx = TranslateCtx {
                state: &self.state,
                db: self.db,
                scope: &scope,
                template_params: &[],
            };
            translate_type(&ctx, base)
        };
        let ty: MetaType = resolved.map_err(|_| {
            RejectReason::UnresolvedBaseClass(base.display_name())
        })?;
        match &ty.kind {
            TypeKind::Value(qname) | TypeKind::Object(qname) => {
                if !ty.instantiations.is_empty() && self.state.templates.contains_key(qname) {
                    // A generic base requires instantiation for this class.
                    return self.instantiate_class(&qname.clone(), &ty.instantiations);
                }
                if self.state.classes.contains_key(qname) {
                    Ok(qname.clone())
                } else {
                    Err(RejectReason::UnresolvedBaseClass(base.display_name()))
                }
            }
            // Bases must be classes present in the registry; externally
            // defined or non-class types cannot be linked.
            _ => Err(RejectReason::UnresolvedBaseClass(base.display_name())),
        }
    }

    /// Classes whose resolved bases were dropped later are unresolvable too;
    /// iterate to a fixpoint so the cascade is complete.
    fn drop_dependents_of_missing_bases(&mut self) {
        loop {
            let mut to_drop: Vec<(QName, String)> = Vec::new();
            for (qname, class) in &self.state.classes {
                for base in &class.base_class_names {
                    if !self.state.classes.contains_key(base) {
                        to_drop.push((qname.clone(), base.to_string()));
                        break;
                    }
                }
            }
            if to_drop.is_empty() {
                break;
            }
            for (qname, base) in to_drop {
                self.state.drop_class(
                    &qname,
                    enclosing_scope(&qname),
                    RejectReason::UnresolvedBaseClass(base),
                );
            }
        }
    }

    /// Order all classes so every class appears after its bases and declared
    /// extra dependencies. Detects cycles and fails their members and
    /// dependents.
    pub(crate) fn sort_classes(&mut self) {
        // Extra dependency edges from directives, restricted to classes that
        // actually exist; a directive pointing at an unbound class only warns.
        let mut extra: FxHashMap<QName, Vec<QName>> = FxHashMap::default();
        for dependency in self.db.extra_dependencies() {
            if !self.state.classes.contains_key(&dependency.class) {
                continue;
            }
            if !self.state.classes.contains_key(&dependency.required) {
                tracing::warn!(
                    class = %dependency.class,
                    required = %dependency.required,
                    "extra dependency targets an unbound class"
                );
                continue;
            }
            extra
                .entry(dependency.class.clone())
                .or_default()
                .push(dependency.required.clone());
        }

        let names: Vec<QName> = self.state.classes.keys().cloned().collect();
        let mut sorter = Sorter {
            colors: names.iter().map(|n| (n.clone(), Color::White)).collect(),
            stack: Vec::new(),
            order: Vec::new(),
            failed: FxHashSet::default(),
        };
        for qname in &names {
            sorter.visit(qname, &self.state.classes, &extra);
        }

        let failed = sorter.failed;
        for qname in &failed {
            self.state.drop_class(
                qname,
                enclosing_scope(qname),
                RejectReason::CyclicInheritance,
            );
        }
        self.state.sorted = sorter
            .order
            .into_iter()
            .filter(|qname| !failed.contains(qname))
            .collect();
        tracing::debug!(classes = self.state.sorted.len(), "topological sort done");
    }
}

struct Sorter {
    colors: FxHashMap<QName, Color>,
    stack: Vec<QName>,
    order: Vec<QName>,
    failed: FxHashSet<QName>,
}

impl Sorter {
    /// Returns `true` when the node is sound (no cycle below it).
    fn visit(
        &mut self,
        qname: &QName,
        classes: &indexmap::IndexMap<QName, crate::meta::MetaClass>,
        extra: &FxHashMap<QName, Vec<QName>>,
    ) -> bool {
        match self.colors.get(qname) {
            Some(Color::Black) | None => return !self.failed.contains(qname),
            Some(Color::Gray) => {
                // Back edge: everything from the first occurrence of this
                // node on the stack is part of the cycle.
                if let Some(pos) = self.stack.iter().position(|n| n == qname) {
                    for member in &self.stack[pos..] {
                        self.failed.insert(member.clone());
                    }
                }
                return false;
            }
            Some(Color::White) => {}
        }

        self.colors.insert(qname.clone(), Color::Gray);
        self.stack.push(qname.clone());

        let mut ok = true;
        let mut dependencies: Vec<QName> = Vec::new();
        if let Some(class) = classes.get(qname) {
            dependencies.extend(class.base_class_names.iter().cloned());
        }
        if let Some(required) = extra.get(qname) {
            dependencies.extend(required.iter().cloned());
        }
        for dependency in &dependencies {
            if !classes.contains_key(dependency) {
                continue;
            }
            if !self.visit(dependency, classes, extra) {
                ok = false;
            }
        }

        self.stack.pop();
        self.colors.insert(qname.clone(), Color::Black);
        if ok && self.failed.contains(qname) {
            // Marked as a cycle member while on the stack.
            ok = false;
        }
        if ok {
            self.order.push(qname.clone());
        } else {
            self.failed.insert(qname.clone());
        }
        ok
    }
}
