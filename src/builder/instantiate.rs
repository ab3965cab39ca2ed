//! Template instantiation — specializing generics against concrete arguments.
//!
//! Instantiation clones the generic entity and substitutes every parameter
//! occurrence recursively: member signatures, defaults, nested types and the
//! declared base list. Results are cached by (generic identity, rendered
//! argument list) so instantiating the same generic with the same arguments
//! twice yields one registry entry, and repeated builds are reproducible.

use smol_str::SmolStr;

use crate::base::{QName, enclosing_scope, join};
use crate::codemodel::{ReferenceKind, TypeInfo};
use crate::meta::{InstantiationInfo, MetaFunction, MetaType, RejectReason, TypeKind};
use crate::typeparser::parse_type;

use super::Session;
use super::translate::{TranslateCtx, translate_type};

/// The registry name of a concrete instantiation, e.g. `ns::Box<int>`.
pub(crate) fn concrete_name(generic: &str, arguments: &[MetaType]) -> String {
    let rendered: Vec<String> = arguments.iter().map(MetaType::display_name).collect();
    format!("{}<{}>", generic, rendered.join(", "))
}

/// Deterministic cache key for an argument list.
fn arguments_key(arguments: &[MetaType]) -> String {
    arguments
        .iter()
        .map(MetaType::display_name)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Substitute template parameters in a resolved type, by position.
///
/// Qualifiers of the parameter occurrence are merged onto the substituted
/// argument: `const T &` with `T = Foo *` becomes `const Foo *&`.
pub(crate) fn substitute_parameters(
    ty: &MetaType,
    parameters: &[SmolStr],
    arguments: &[MetaType],
) -> MetaType {
    if let TypeKind::TemplateParameter(name) = &ty.kind {
        if let Some(index) = parameters.iter().position(|p| p == name) {
            if let Some(argument) = arguments.get(index) {
                let mut merged = argument.clone();
                merged.is_const |= ty.is_const;
                merged.indirections = merged.indirections.saturating_add(ty.indirections);
                if ty.reference != ReferenceKind::None {
                    merged.reference = ty.reference;
                }
                merged.array_dims.extend(ty.array_dims.iter().cloned());
                return merged;
            }
        }
        return ty.clone();
    }
    let mut out = ty.clone();
    out.instantiations = ty
        .instantiations
        .iter()
        .map(|inst| substitute_parameters(inst, parameters, arguments))
        .collect();
    out
}

/// Substitute template parameters textually in a raw type reference.
///
/// Declared base lists are raw `TypeInfo`s, so base substitution happens at
/// that level: `Base<T>` with `T = int` becomes `Base<int>`.
pub(crate) fn substitute_in_type_info(
    info: &TypeInfo,
    parameters: &[SmolStr],
    arguments: &[MetaType],
) -> TypeInfo {
    if info.segments().len() == 1 {
        if let Some(index) = parameters.iter().position(|p| p == info.simple_name()) {
            if let Some(argument) = arguments.get(index) {
                let substituted = argument.to_type_info();
                let mut merged = substituted;
                merged.is_const |= info.is_const;
                merged.indirections = merged.indirections.saturating_add(info.indirections);
                if info.reference != ReferenceKind::None {
                    merged.reference = info.reference;
                }
                merged
                    .array_dims
                    .extend(info.array_dims.iter().cloned());
                return merged;
            }
        }
    }
    let mut out = info.clone();
    out.arguments = info
        .arguments
        .iter()
        .map(|a| substitute_in_type_info(a, parameters, arguments))
        .collect();
    out
}

/// Walk a resolved type and collect instantiation requests for every fully
/// concrete reference to a known generic.
pub(crate) fn instantiation_requests_in(
    ty: &MetaType,
    is_template: impl Fn(&str) -> bool + Copy,
    out: &mut Vec<(QName, Vec<MetaType>)>,
) {
    if let Some(qname) = match &ty.kind {
        TypeKind::Value(q) | TypeKind::Object(q) => Some(q),
        _ => None,
    } {
        if !ty.instantiations.is_empty()
            && is_template(qname)
            && !ty.uses_template_parameters()
        {
            out.push((qname.clone(), ty.instantiations.clone()));
        }
    }
    for inst in &ty.instantiations {
        instantiation_requests_in(inst, is_template, out);
    }
}

impl Session<'_> {
    /// Directive typedefs force instantiations and name the result:
    /// `IntBox = Box<int>` registers `Box<int>` and exposes it as `IntBox`.
    pub(crate) fn process_directive_typedefs(&mut self) {
        let typedefs = self.db.typedefs().to_vec();
        for typedef in typedefs {
            let info = match parse_type(&typedef.source) {
                Ok(info) => info,
                Err(err) => {
                    self.state.reject(
                        &typedef.alias,
                        enclosing_scope(&typedef.alias),
                        RejectReason::DirectiveError(err.to_string()),
                    );
                    continue;
                }
            };
            let resolved = {
                let ctx = TranslateCtx {
                    state: &self.state,
                    db: self.db,
                    scope: "",
                    template_params: &[],
                };
                translate_type(&ctx, &info)
            };
            let resolved = match resolved {
                Ok(ty) => ty,
                Err(err) => {
                    self.state.reject(
                        &typedef.alias,
                        enclosing_scope(&typedef.alias),
                        RejectReason::DirectiveError(err.to_string()),
                    );
                    continue;
                }
            };
            // Make the alias resolvable as a type name either way.
            self.state.add_typedef(&typedef.alias, info);

            let generic = match resolved.type_class() {
                Some(q) if !resolved.instantiations.is_empty() => q.clone(),
                _ => continue, // plain alias, nothing to instantiate
            };
            match self.instantiate_class(&generic, &resolved.instantiations) {
                Ok(concrete) => {
                    // The typedef names the instantiation; first name wins.
                    if let Some(class) = self.state.classes.get_mut(&concrete) {
                        if class.instantiated_from.is_some() && class.name.contains('<') {
                            class.name = SmolStr::new(crate::base::simple_name(&typedef.alias));
                        }
                    }
                }
                Err(reason) => {
                    self.state
                        .reject(&typedef.alias, enclosing_scope(&typedef.alias), reason);
                }
            }
        }
    }

    /// Drain the queue of instantiation requests discovered during traversal.
    /// Instantiations may queue further requests; the cache bounds the loop.
    pub(crate) fn process_pending_instantiations(&mut self) {
        while let Some((generic, arguments)) = self.state.pending_instantiations.pop() {
            if let Err(reason) = self.instantiate_class(&generic, &arguments) {
                let name = concrete_name(&generic, &arguments);
                self.state
                    .reject(&name, enclosing_scope(&generic), reason);
            }
        }
    }

    /// Instantiate a generic class against concrete arguments.
    ///
    /// Idempotent: repeated requests return the cached entity.
    pub(crate) fn instantiate_class(
        &mut self,
        generic: &QName,
        arguments: &[MetaType],
    ) -> Result<QName, RejectReason> {
        let key = (generic.clone(), arguments_key(arguments));
        if let Some(existing) = self.state.instantiation_cache.get(&key) {
            return Ok(existing.clone());
        }

        let template = self
            .state
            .templates
            .get(generic.as_ref())
            .cloned()
            .ok_or_else(|| {
                RejectReason::DirectiveError(format!("'{generic}' is not a known template"))
            })?;
        let expected = template.template_parameters.len();
        if arguments.len() != expected {
            return Err(RejectReason::TemplateArityMismatch {
                expected,
                actual: arguments.len(),
            });
        }

        let concrete_qname = QName::from(concrete_name(generic, arguments).as_str());
        if self.state.classes.contains_key(&concrete_qname) {
            self.state
                .instantiation_cache
                .insert(key, concrete_qname.clone());
            return Ok(concrete_qname);
        }
        tracing::debug!(generic = %generic, concrete = %concrete_qname, "instantiating");

        let parameters = template.template_parameters.clone();
        let mut class = template;
        class.qualified_name = concrete_qname.clone();
        class.name = SmolStr::new(concrete_name(&class.name, arguments));
        class.is_template = false;
        class.template_parameters.clear();
        class.template_defaults.clear();
        class.nested_classes.clear();
        class.instantiated_from = Some(InstantiationInfo {
            generic: generic.clone(),
            arguments: arguments.to_vec(),
        });

        for function in &mut class.functions {
            substitute_in_function(function, &parameters, arguments, &concrete_qname);
        }
        for field in &mut class.fields {
            field.ty = substitute_parameters(&field.ty, &parameters, arguments);
        }
        for meta_enum in &mut class.enums {
            let renamed = join(&concrete_qname, &meta_enum.name);
            meta_enum.qualified_name = QName::from(renamed.as_str());
            meta_enum.enclosing_class = Some(concrete_qname.clone());
            self.state.enum_names.insert(meta_enum.qualified_name.clone());
        }
        class.declared_bases = class
            .declared_bases
            .iter()
            .map(|base| substitute_in_type_info(base, &parameters, arguments))
            .collect();

        // Substituted member types may reference further generics.
        let mut requests = Vec::new();
        for function in &class.functions {
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
        }
        for field in &class.fields {
            instantiation_requests_in(
                &field.ty,
                |q| self.state.templates.contains_key(q),
                &mut requests,
            );
        }
        self.state.pending_instantiations.extend(requests);

        self.state.classes.insert(concrete_qname.clone(), class);
        self.state
            .instantiation_cache
            .insert(key, concrete_qname.clone());
        Ok(concrete_qname)
    }
}

fn substitute_in_function(
    function: &mut MetaFunction,
    parameters: &[SmolStr],
    arguments: &[MetaType],
    owner: &QName,
) {
    function.owner = Some(owner.clone());
    if let Some(ret) = &function.return_type {
        function.return_type = Some(substitute_parameters(ret, parameters, arguments));
    }
    if let Some(target) = &function.conversion_target {
        function.conversion_target = Some(substitute_parameters(target, parameters, arguments));
    }
    for argument in &mut function.arguments {
        argument.ty = substitute_parameters(&argument.ty, parameters, arguments);
    }
}
