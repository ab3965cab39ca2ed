//! Traversal — walking the code model scope by scope.
//!
//! Each scope is walked exactly once, in declaration order. Classes are
//! registered as shells first so self- and mutually-referential types within
//! the same scope resolve; members are populated afterwards. Constructors,
//! destructors and operators are classified by signature shape. A function
//! whose type translation fails for any parameter or the return type is
//! rejected wholesale; the class continues to build.

use smol_str::SmolStr;

use crate::base::{QName, join, scope_chain};
use crate::codemodel::{ClassItem, EnumItem, FunctionItem, NamespaceItem};
use crate::meta::{
    ClassKind, FunctionKind, MetaArgument, MetaClass, MetaEnum, MetaEnumValue, MetaFunction,
    OperatorKind, RejectReason,
};
use crate::typeparser::{ParsedSignature, parse_signature};
use crate::typesystem::{AddedFunction, TypeEntryKind};

use super::Session;
use super::error::BuildError;
use super::instantiate::instantiation_requests_in;
use super::translate::{TranslateCtx, translate_type};

/// How a declared function name classifies.
enum Classification {
    Kind(FunctionKind),
    /// An operator shape the metamodel does not bind (stream operators and
    /// other exotic symbols).
    Unsupported,
}

fn classify(name: &str, class_simple: Option<&str>) -> Classification {
    if let Some(class_name) = class_simple {
        if name == class_name {
            return Classification::Kind(FunctionKind::Constructor);
        }
        if let Some(stripped) = name.strip_prefix('~') {
            if stripped == class_name {
                return Classification::Kind(FunctionKind::Destructor);
            }
        }
    }
    if let Some(rest) = name.strip_prefix("operator") {
        let rest = rest.trim();
        if rest.is_empty() {
            return Classification::Unsupported;
        }
        if let Some(op) = OperatorKind::from_symbol(rest) {
            return Classification::Kind(FunctionKind::Operator(op));
        }
        if rest.starts_with(|c: char| c.is_alphabetic() || c == '_') {
            return Classification::Kind(FunctionKind::Conversion);
        }
        return Classification::Unsupported;
    }
    Classification::Kind(FunctionKind::Normal)
}

fn return_reason(error: BuildError) -> RejectReason {
    match error {
        BuildError::AmbiguousType { name, .. } => RejectReason::AmbiguousType(name),
        BuildError::TemplateArityMismatch {
            expected, actual, ..
        } => RejectReason::TemplateArityMismatch { expected, actual },
        BuildError::DirectiveSyntax(err) => RejectReason::DirectiveError(err.to_string()),
        other => RejectReason::UnresolvedReturnType(other.type_name()),
    }
}

fn argument_reason(error: BuildError) -> RejectReason {
    match error {
        BuildError::AmbiguousType { name, .. } => RejectReason::AmbiguousType(name),
        BuildError::TemplateArityMismatch {
            expected, actual, ..
        } => RejectReason::TemplateArityMismatch { expected, actual },
        BuildError::DirectiveSyntax(err) => RejectReason::DirectiveError(err.to_string()),
        other => RejectReason::UnresolvedArgumentType(other.type_name()),
    }
}

/// Build a metamodel enum; implicit enumerator values auto-increment.
fn build_meta_enum(item: &EnumItem, scope: &str, enclosing: Option<&QName>) -> MetaEnum {
    let qualified = join(scope, &item.name);
    let mut meta_enum = MetaEnum::new(&item.name, &qualified);
    meta_enum.is_scoped = item.is_scoped;
    meta_enum.enclosing_class = enclosing.cloned();
    let mut next = 0i64;
    for enumerator in &item.enumerators {
        let value = enumerator.value.unwrap_or(next);
        next = value.wrapping_add(1);
        meta_enum.values.push(MetaEnumValue {
            name: enumerator.name.clone(),
            value,
        });
    }
    meta_enum
}

impl Session<'_> {
    // =========================================================================
    // Phase 1: shell registration
    // =========================================================================

    /// Register everything a namespace scope declares: class shells,
    /// typedefs, using-declarations and enum names.
    pub(crate) fn register_namespace(&mut self, ns: &NamespaceItem, scope: &str) {
        for typedef in &ns.typedefs {
            self.state
                .add_typedef(&join(scope, &typedef.name), typedef.target.clone());
        }
        for using in &ns.usings {
            self.state
                .scope_usings
                .entry(QName::from(scope))
                .or_default()
                .push((using.name.clone(), using.source_scope.clone()));
        }
        for item in &ns.enums {
            self.state
                .enum_names
                .insert(QName::from(join(scope, &item.name).as_str()));
        }
        for class in &ns.classes {
            self.register_class(class, scope);
        }
        for sub in &ns.namespaces {
            let qname = join(scope, &sub.name);
            let Some(entry) = self.db.find(&qname) else {
                self.state
                    .reject(&qname, scope, RejectReason::NotInTypeSystem);
                continue;
            };
            if entry.kind != TypeEntryKind::Namespace {
                tracing::warn!(namespace = %qname, "entry kind is not namespace");
            }
            let class = MetaClass::new(entry.effective_name(), &qname, ClassKind::Namespace);
            self.state
                .classes
                .insert(class.qualified_name.clone(), class);
            self.register_namespace(sub, &qname);
        }
    }

    /// Register a class shell (and, recursively, its nested classes).
    fn register_class(&mut self, item: &ClassItem, scope: &str) {
        let qname = join(scope, &item.name);
        if self.options.skip_deprecated && item.is_deprecated {
            self.state.reject(&qname, scope, RejectReason::Deprecated);
            return;
        }
        let Some(entry) = self.db.find(&qname) else {
            self.state
                .reject(&qname, scope, RejectReason::NotInTypeSystem);
            return;
        };
        if !entry.generate {
            self.state
                .reject(&qname, scope, RejectReason::GenerationDisabled);
            return;
        }
        let kind = match entry.kind {
            TypeEntryKind::Object => ClassKind::Object,
            TypeEntryKind::Value
            | TypeEntryKind::SmartPointer { .. }
            | TypeEntryKind::Container => ClassKind::Value,
            _ => {
                tracing::warn!(class = %qname, "class-incompatible entry kind, assuming value");
                ClassKind::Value
            }
        };

        let mut class = MetaClass::new(entry.effective_name(), &qname, kind);
        class.is_event_source = entry.is_event_source;
        class.is_abstract = item.has_pure_virtuals();
        class.declared_bases = item
            .bases
            .iter()
            .filter(|base| base.access.is_public())
            .map(|base| base.ty.clone())
            .collect();
        if item.is_template() {
            class.is_template = true;
            class.template_parameters = item
                .template_parameters
                .iter()
                .map(|p| p.name.clone())
                .collect();
            class.template_defaults = item
                .template_parameters
                .iter()
                .map(|p| p.default_type.clone())
                .collect();
        }

        // Scope machinery declared inside the class body.
        for typedef in &item.typedefs {
            self.state
                .add_typedef(&join(&qname, &typedef.name), typedef.target.clone());
        }
        for using in &item.usings {
            self.state.pending_class_usings.push((
                QName::from(qname.as_str()),
                using.source_scope.clone(),
                using.name.clone(),
            ));
        }
        for item_enum in &item.enums {
            if item_enum.access == crate::codemodel::Access::Private {
                continue;
            }
            self.state
                .enum_names
                .insert(QName::from(join(&qname, &item_enum.name).as_str()));
        }

        let registered = QName::from(qname.as_str());
        if class.is_template {
            self.state.templates.insert(registered.clone(), class);
        } else {
            self.state.classes.insert(registered.clone(), class);
        }

        // Nested classes register under this class's scope.
        let mut nested_names = Vec::new();
        for nested in &item.classes {
            self.register_class(nested, &qname);
            let nested_qname = join(&qname, &nested.name);
            if self.state.classes.contains_key(nested_qname.as_str()) {
                nested_names.push(QName::from(nested_qname.as_str()));
            }
        }
        if !nested_names.is_empty() {
            if let Some(class) = self.state.classes.get_mut(&registered) {
                class.nested_classes = nested_names;
            } else if let Some(class) = self.state.templates.get_mut(&registered) {
                class.nested_classes = nested_names;
            }
        }
    }

    // =========================================================================
    // Phase 2: member population
    // =========================================================================

    /// Populate a namespace scope: global enums and functions, classes,
    /// nested namespaces, directive-added globals.
    pub(crate) fn populate_namespace(&mut self, ns: &NamespaceItem, scope: &str) {
        for item in &ns.enums {
            let meta_enum = build_meta_enum(item, scope, None);
            self.state.global_enums.push(meta_enum);
        }
        for item in &ns.functions {
            self.populate_global_function(item, scope);
        }
        self.populate_added_global_functions(scope);
        for class in &ns.classes {
            self.populate_class(class, scope);
        }
        for sub in &ns.namespaces {
            let qname = join(scope, &sub.name);
            if self.state.classes.contains_key(qname.as_str()) {
                self.populate_namespace(sub, &qname);
            }
        }
    }

    fn populate_global_function(&mut self, item: &FunctionItem, scope: &str) {
        let qname = join(scope, &item.name);
        match self.build_function(item, scope, None, None, &[]) {
            Ok(Some(mut function)) => {
                if !self.apply_function_modifications("", &mut function) {
                    self.state
                        .reject(&qname, scope, RejectReason::GenerationDisabled);
                    return;
                }
                self.queue_instantiations_for(&function);
                self.state.global_functions.push(function);
            }
            Ok(None) => {}
            Err(reason) => self.state.reject(&qname, scope, reason),
        }
    }

    fn populate_added_global_functions(&mut self, scope: &str) {
        let added = self.db.added_functions(scope).to_vec();
        for function in added {
            match self.build_added_function(&function, scope, None, None, &[]) {
                Ok(built) => self.state.global_functions.push(built),
                Err(error) => {
                    let label = join(scope, "<added function>");
                    self.state.reject(
                        &label,
                        scope,
                        RejectReason::DirectiveError(error.to_string()),
                    );
                }
            }
        }
    }

    /// Populate one class: enums first (so member signatures can use them),
    /// then functions, fields, directive-added functions and nested classes.
    fn populate_class(&mut self, item: &ClassItem, scope: &str) {
        let qname = join(scope, &item.name);
        let is_template = self.state.templates.contains_key(qname.as_str());
        if !is_template && !self.state.classes.contains_key(qname.as_str()) {
            return; // rejected at registration
        }
        let owner = QName::from(qname.as_str());
        let template_params: Vec<SmolStr> = if is_template {
            self.state.templates[qname.as_str()]
                .template_parameters
                .clone()
        } else {
            Vec::new()
        };

        // Enums.
        let mut enums = Vec::new();
        for item_enum in &item.enums {
            if item_enum.access == crate::codemodel::Access::Private {
                tracing::trace!(class = %qname, name = %item_enum.name, "skipping private enum");
                continue;
            }
            enums.push(build_meta_enum(item_enum, &qname, Some(&owner)));
        }
        self.with_class_mut(&owner, is_template, |class| class.enums.extend(enums));

        // Functions.
        for function_item in &item.functions {
            let function_qname = join(&qname, &function_item.name);
            match self.build_function(
                function_item,
                &qname,
                Some(&owner),
                Some(item.name.as_str()),
                &template_params,
            ) {
                Ok(Some(mut function)) => {
                    if !self.apply_function_modifications(&qname, &mut function) {
                        self.state.reject(
                            &function_qname,
                            &qname,
                            RejectReason::GenerationDisabled,
                        );
                        continue;
                    }
                    self.queue_instantiations_for(&function);
                    self.with_class_mut(&owner, is_template, |class| {
                        class.functions.push(function)
                    });
                }
                Ok(None) => {}
                Err(reason) => self.state.reject(&function_qname, &qname, reason),
            }
        }

        // Fields.
        for field_item in &item.fields {
            let field_qname = join(&qname, &field_item.name);
            let translated = {
                let ctx = TranslateCtx {
                    state: &self.state,
                    db: self.db,
                    scope: &qname,
                    template_params: &template_params,
                };
                translate_type(&ctx, &field_item.ty)
            };
            let ty = match translated {
                Ok(ty) => ty,
                Err(error) => {
                    self.state.reject(
                        &field_qname,
                        &qname,
                        RejectReason::UnresolvedFieldType(error.type_name()),
                    );
                    continue;
                }
            };
            let mut field = crate::meta::MetaField::new(&field_item.name, ty);
            field.access = field_item.access;
            field.is_static = field_item.is_static;
            field.is_bindable = field_item.access.is_public();
            for modification in self.db.field_modifications(&qname) {
                if modification.name != field.original_name {
                    continue;
                }
                if modification.remove {
                    field.is_bindable = false;
                }
                if modification.read_only {
                    field.read_only = true;
                }
                if let Some(rename) = &modification.rename {
                    field.name = rename.clone();
                }
            }
            self.with_class_mut(&owner, is_template, |class| class.fields.push(field));
        }

        // Directive-added functions. A malformed declaration is a
        // configuration error: it fails the whole class, not just the
        // injected member.
        let added = self.db.added_functions(&qname).to_vec();
        for function in added {
            match self.build_added_function(
                &function,
                &qname,
                Some(&owner),
                Some(item.name.as_str()),
                &template_params,
            ) {
                Ok(built) => {
                    self.with_class_mut(&owner, is_template, |class| {
                        class.functions.push(built)
                    });
                }
                Err(error) => {
                    let reason = RejectReason::DirectiveError(error.to_string());
                    if is_template {
                        self.state.templates.shift_remove(qname.as_str());
                        self.state.reject(&qname, scope, reason);
                    } else {
                        self.state.drop_class(&qname, scope, reason);
                    }
                    return;
                }
            }
        }

        // Nested classes.
        for nested in &item.classes {
            self.populate_class(nested, &qname);
        }
    }

    fn with_class_mut(
        &mut self,
        qname: &QName,
        is_template: bool,
        apply: impl FnOnce(&mut MetaClass),
    ) {
        let target = if is_template {
            self.state.templates.get_mut(qname)
        } else {
            self.state.classes.get_mut(qname)
        };
        if let Some(class) = target {
            apply(class);
        }
    }

    // =========================================================================
    // Function building
    // =========================================================================

    /// Build one function entity. `Ok(None)` means the declaration is not
    /// modeled at all (deleted, or an unsupported operator shape).
    fn build_function(
        &self,
        item: &FunctionItem,
        scope: &str,
        owner: Option<&QName>,
        class_simple: Option<&str>,
        template_params: &[SmolStr],
    ) -> Result<Option<MetaFunction>, RejectReason> {
        if item.is_deleted {
            tracing::trace!(name = %item.name, "skipping deleted function");
            return Ok(None);
        }
        if self.options.skip_deprecated && item.is_deprecated {
            return Err(RejectReason::Deprecated);
        }
        let kind = match classify(&item.name, class_simple) {
            Classification::Kind(kind) => kind,
            Classification::Unsupported => {
                tracing::trace!(name = %item.name, "skipping unsupported operator shape");
                return Ok(None);
            }
        };

        let ctx = TranslateCtx {
            state: &self.state,
            db: self.db,
            scope,
            template_params,
        };

        let return_type = match kind {
            FunctionKind::Constructor | FunctionKind::Destructor => None,
            _ => Some(translate_type(&ctx, &item.return_type).map_err(return_reason)?),
        };

        let mut function = MetaFunction::new(&item.name, kind);
        function.return_type = return_type;
        function.owner = owner.cloned();
        function.access = item.access;
        function.is_static = item.is_static;
        function.is_virtual = item.is_virtual;
        function.is_abstract = item.is_pure_virtual;
        function.is_const = item.is_const;

        for (index, argument) in item.arguments.iter().enumerate() {
            let ty = translate_type(&ctx, &argument.ty).map_err(argument_reason)?;
            let name = if argument.name.is_empty() {
                format!("arg{}", index + 1)
            } else {
                argument.name.to_string()
            };
            let mut built = MetaArgument::new(&name, ty);
            if let Some(default) = &argument.default_value {
                built = built.with_default(default);
            }
            function.arguments.push(built);
        }
        Ok(Some(function))
    }

    /// Build a directive-injected function from its compact signature.
    fn build_added_function(
        &self,
        added: &AddedFunction,
        scope: &str,
        owner: Option<&QName>,
        class_simple: Option<&str>,
        template_params: &[SmolStr],
    ) -> Result<MetaFunction, BuildError> {
        let signature: ParsedSignature = parse_signature(&added.declaration)?;
        let ctx = TranslateCtx {
            state: &self.state,
            db: self.db,
            scope,
            template_params,
        };

        let kind = match class_simple {
            Some(class_name) if signature.name == class_name => FunctionKind::Constructor,
            _ => FunctionKind::Normal,
        };
        let mut function = MetaFunction::new(&signature.name, kind);
        function.owner = owner.cloned();
        function.access = added.access;
        function.is_static = added.is_static;
        function.is_const = signature.is_const;
        function.is_added = true;
        if kind != FunctionKind::Constructor {
            function.return_type = Some(translate_type(&ctx, &signature.return_type)?);
        }
        for (index, parameter) in signature.parameters.iter().enumerate() {
            let ty = translate_type(&ctx, &parameter.ty)?;
            let name = parameter
                .name
                .as_ref()
                .map(|n| n.to_string())
                .unwrap_or_else(|| format!("arg{}", index + 1));
            let mut built = MetaArgument::new(&name, ty);
            if let Some(default) = &parameter.default_value {
                built = built.with_default(default);
            }
            function.arguments.push(built);
        }
        tracing::debug!(name = %function.name, "added directive function");
        Ok(function)
    }

    /// Apply directive modifications to a freshly built function.
    /// Returns `false` when a modification removes it.
    fn apply_function_modifications(&mut self, class_key: &str, function: &mut MetaFunction) -> bool {
        let mut removed = false;
        let signature = function.signature();
        for (index, modification) in self.db.function_modifications(class_key).iter().enumerate() {
            if !modification
                .pattern
                .matches(&function.original_name, &signature)
            {
                continue;
            }
            self.state
                .matched_modifications
                .insert((QName::from(class_key), index));
            if modification.remove {
                removed = true;
            }
            if let Some(rename) = &modification.rename {
                function.name = rename.clone();
                function.is_renamed = true;
            }
            if let Some(access) = modification.access {
                function.access = access;
            }
            for (position, name) in &modification.argument_names {
                if *position >= 1 {
                    if let Some(argument) = function.arguments.get_mut(position - 1) {
                        argument.name = name.clone();
                    }
                }
            }
        }
        !removed
    }

    /// Queue template instantiations for every concrete generic reference in
    /// a function signature.
    fn queue_instantiations_for(&mut self, function: &MetaFunction) {
        let mut requests = Vec::new();
        if let Some(ret) = &function.return_type {
            instantiation_requests_in(ret, |q| self.state.templates.contains_key(q), &mut requests);
        }
        for argument in &function.arguments {
            instantiation_requests_in(
                &argument.ty,
                |q| self.state.templates.contains_key(q),
                &mut requests,
            );
        }
        self.state.pending_instantiations.extend(requests);
    }

    // =========================================================================
    // Post-traversal checks
    // =========================================================================

    /// `using Base::name;` inside a class re-exposes the base overloads on
    /// the class itself. Applied once every class is populated, since the
    /// base may be declared later in the file.
    pub(crate) fn apply_class_usings(&mut self) {
        let pending = std::mem::take(&mut self.state.pending_class_usings);
        for (class_qname, base_text, function_name) in pending {
            let base_qname = self.find_class_by_name(&class_qname, &base_text);
            let Some(base_qname) = base_qname else {
                self.state.reject(
                    &join(&class_qname, &function_name),
                    &class_qname,
                    RejectReason::UnresolvedBaseClass(base_text.to_string()),
                );
                continue;
            };
            let exposed: Vec<MetaFunction> = {
                let Some(base) = self.state.classes.get(&base_qname) else {
                    continue;
                };
                base.functions
                    .iter()
                    .filter(|f| f.original_name == function_name && !f.is_constructor())
                    .cloned()
                    .collect()
            };
            if exposed.is_empty() {
                tracing::warn!(
                    class = %class_qname,
                    base = %base_qname,
                    name = %function_name,
                    "using-declaration matched no base function"
                );
                continue;
            }
            if let Some(class) = self.state.classes.get_mut(&class_qname) {
                for mut function in exposed {
                    function.owner = Some(class_qname.clone());
                    class.functions.push(function);
                }
            }
        }
    }

    /// A typedef whose target is a class and which carries its own value or
    /// object entry becomes an independent class under the alias name.
    /// Typedefs without an entry only participate in type resolution.
    pub(crate) fn process_typedef_classes(&mut self) {
        let typedefs: Vec<(QName, crate::codemodel::TypeInfo)> = self
            .state
            .typedefs
            .iter()
            .map(|(alias, target)| (alias.clone(), target.clone()))
            .collect();
        for (alias, target) in typedefs {
            let Some(entry) = self.db.find(&alias) else {
                continue;
            };
            if !matches!(entry.kind, TypeEntryKind::Value | TypeEntryKind::Object) {
                continue;
            }
            if self.state.classes.contains_key(&alias) {
                continue;
            }
            let scope = crate::base::enclosing_scope(&alias).to_string();
            let resolved = {
                let ctx = TranslateCtx {
                    state: &self.state,
                    db: self.db,
                    scope: &scope,
                    template_params: &[],
                };
                translate_type(&ctx, &target)
            };
            let source = match resolved {
                Ok(ty) => match ty.type_class() {
                    Some(qname) if self.state.classes.contains_key(qname) => qname.clone(),
                    // Aliases of primitives or external types synthesize
                    // nothing; uses keep resolving through expansion.
                    _ => continue,
                },
                Err(_) => {
                    tracing::warn!(alias = %alias, "typedef target did not resolve");
                    continue;
                }
            };

            let Some(source_class) = self.state.classes.get(&source).cloned() else {
                continue;
            };
            let mut class = source_class;
            class.qualified_name = alias.clone();
            class.name = SmolStr::new(entry.effective_name());
            class.kind = match entry.kind {
                TypeEntryKind::Object => ClassKind::Object,
                _ => ClassKind::Value,
            };
            class.nested_classes.clear();
            for function in &mut class.functions {
                function.owner = Some(alias.clone());
            }
            for meta_enum in &mut class.enums {
                let renamed = join(&alias, &meta_enum.name);
                meta_enum.qualified_name = QName::from(renamed.as_str());
                meta_enum.enclosing_class = Some(alias.clone());
                self.state.enum_names.insert(meta_enum.qualified_name.clone());
            }
            tracing::debug!(alias = %alias, source = %source, "typedef synthesized class");
            // The class replaces the alias for resolution purposes.
            self.state.typedefs.remove(alias.as_ref());
            self.state.classes.insert(alias.clone(), class);
        }
    }

    /// Resolve a class name lexically from a class's enclosing scope.
    fn find_class_by_name(&self, from_class: &QName, name: &str) -> Option<QName> {
        let scope = crate::base::enclosing_scope(from_class).to_string();
        for level in scope_chain(&scope) {
            let candidate = join(level, name);
            if self.state.classes.contains_key(candidate.as_str()) {
                return Some(QName::from(candidate.as_str()));
            }
        }
        None
    }

    /// Report every directive signature pattern that matched no function.
    pub(crate) fn check_modifications(&mut self) {
        let mut unmatched = Vec::new();
        for class in self.db.modified_classes() {
            for (index, modification) in
                self.db.function_modifications(class).iter().enumerate()
            {
                if !self
                    .state
                    .matched_modifications
                    .contains(&(class.clone(), index))
                {
                    let description = modification
                        .pattern
                        .signature
                        .clone()
                        .unwrap_or_else(|| modification.pattern.name.to_string());
                    unmatched.push((class.clone(), description));
                }
            }
        }
        for (class, description) in unmatched {
            tracing::warn!(class = %class, pattern = %description, "modification matched nothing");
            self.state.reject(
                &join(&class, &description),
                &class,
                RejectReason::UnmatchedModification(description.clone()),
            );
        }
    }
}
