//! Type translation — resolving raw type references into `MetaType`s.
//!
//! Resolution order, per contract:
//!
//! 1. template parameter substitution inside a template body
//! 2. exact qualified-name lookup (the global step of the outward walk)
//! 3. unqualified lookup walking enclosing scopes outward
//! 4. typedef/using expansion followed by re-resolution
//! 5. directive-database injected mappings (renamed/external types)
//!
//! Template arguments resolve recursively with the same algorithm before the
//! enclosing type is finalized. More than one candidate at the same scope
//! level is a hard failure for the owning declaration, never a guess.

use smol_str::SmolStr;

use crate::base::{QName, join, scope_chain};
use crate::codemodel::{ReferenceKind, TypeInfo};
use crate::meta::{ClassKind, MetaType, TypeKind, is_builtin_primitive};
use crate::typesystem::{TypeDatabase, TypeEntry, TypeEntryKind};

use super::BuilderState;
use super::error::BuildError;
use super::instantiate::substitute_parameters;

/// Maximum typedef expansion depth before the chain is declared unresolvable.
const MAX_TYPEDEF_DEPTH: u32 = 16;

/// The lexical context a type reference is resolved in.
pub(crate) struct TranslateCtx<'s> {
    pub(crate) state: &'s BuilderState,
    pub(crate) db: &'s TypeDatabase,
    /// Qualified name of the enclosing scope (`""` for global).
    pub(crate) scope: &'s str,
    /// Template parameters of the enclosing generic, if any.
    pub(crate) template_params: &'s [SmolStr],
}

/// What one scope level offered for a name.
#[derive(Debug)]
enum Candidate {
    Class(QName, ClassKind),
    Template(QName),
    Enum(QName),
    Typedef(QName),
    Entry(QName),
    /// A using-declaration redirecting to a qualified target.
    Using(String),
}

impl Candidate {
    fn describe(&self) -> String {
        match self {
            Candidate::Class(q, _) => format!("class {q}"),
            Candidate::Template(q) => format!("template {q}"),
            Candidate::Enum(q) => format!("enum {q}"),
            Candidate::Typedef(q) => format!("typedef {q}"),
            Candidate::Entry(q) => format!("type entry {q}"),
            Candidate::Using(t) => format!("using {t}"),
        }
    }
}

/// Resolve a raw type reference against the session state.
pub(crate) fn translate_type(ctx: &TranslateCtx, info: &TypeInfo) -> Result<MetaType, BuildError> {
    translate_inner(ctx, info, 0)
}

fn translate_inner(ctx: &TranslateCtx, info: &TypeInfo, depth: u32) -> Result<MetaType, BuildError> {
    if depth > MAX_TYPEDEF_DEPTH {
        return Err(BuildError::unresolved(info.display_name(), ctx.scope));
    }

    let name = info.name();

    // (1) Template parameter of the enclosing generic.
    if !info.is_qualified()
        && ctx.template_params.iter().any(|p| p == name.as_str())
    {
        if !info.arguments.is_empty() {
            return Err(BuildError::unresolved(info.display_name(), ctx.scope));
        }
        return Ok(
            MetaType::new(TypeKind::TemplateParameter(SmolStr::new(&name)))
                .with_qualifiers_of(info),
        );
    }

    // Builtin primitives resolve without any directive entry.
    if !info.is_qualified() && is_builtin_primitive(&name) && info.arguments.is_empty() {
        return Ok(MetaType::primitive(&name).with_qualifiers_of(info));
    }

    // Template arguments are resolved before the enclosing type (recursively,
    // same algorithm).
    let mut arguments = Vec::with_capacity(info.arguments.len());
    for argument in &info.arguments {
        arguments.push(translate_inner(ctx, argument, depth)?);
    }

    // (2)+(3) Walk the enclosing scopes outward; the outermost level is the
    // exact qualified lookup for already-qualified names.
    for level in scope_chain(ctx.scope) {
        let mut candidates = candidates_at(ctx, level, &name);
        match candidates.len() {
            0 => continue,
            1 => {
                return build_from_candidate(
                    ctx,
                    info,
                    arguments,
                    level,
                    candidates.remove(0),
                    depth,
                );
            }
            _ => {
                tracing::trace!(name = %name, level, "ambiguous resolution");
                return Err(BuildError::ambiguous(
                    info.display_name(),
                    candidates.iter().map(Candidate::describe).collect(),
                ));
            }
        }
    }

    // (5) Unqualified fallback: directive entries matched by simple name
    // (renamed or externally defined types that no lexical scope declares).
    if !info.is_qualified() {
        let entries: Vec<_> = ctx
            .db
            .candidates(&name)
            .into_iter()
            .filter(|e| e.kind != TypeEntryKind::Namespace)
            .collect();
        match entries.len() {
            0 => {}
            1 => return resolve_entry(ctx, info, arguments, entries[0], depth),
            _ => {
                return Err(BuildError::ambiguous(
                    info.display_name(),
                    entries
                        .iter()
                        .map(|e| format!("type entry {}", e.qualified_name))
                        .collect(),
                ));
            }
        }
    }

    Err(BuildError::unresolved(info.display_name(), ctx.scope))
}

/// Collect everything one scope level offers for a name.
fn candidates_at(ctx: &TranslateCtx, level: &str, name: &str) -> Vec<Candidate> {
    let qname = join(level, name);
    let mut candidates = Vec::new();

    if let Some(class) = ctx.state.classes.get(qname.as_str()) {
        candidates.push(Candidate::Class(class.qualified_name.clone(), class.kind));
    }
    if let Some(template) = ctx.state.templates.get(qname.as_str()) {
        candidates.push(Candidate::Template(template.qualified_name.clone()));
    }
    if let Some(enum_name) = ctx.state.enum_names.get(qname.as_str()) {
        candidates.push(Candidate::Enum(enum_name.clone()));
    }
    if ctx.state.typedefs.contains_key(qname.as_str()) {
        candidates.push(Candidate::Typedef(QName::from(qname.as_str())));
    }
    // Using-declarations only redirect unqualified names.
    if !name.contains("::") {
        if let Some(usings) = ctx.state.scope_usings.get(level) {
            for (imported, source_scope) in usings {
                if imported == name {
                    candidates.push(Candidate::Using(join(source_scope, name)));
                }
            }
        }
    }
    // (5) The directive database is consulted last; an entry describing a
    // class/template/enum found above is the same resolution, not a second
    // candidate.
    if candidates.is_empty() {
        if let Some(entry) = ctx.db.find(&qname) {
            candidates.push(Candidate::Entry(entry.qualified_name.clone()));
        }
    }

    candidates
}

fn build_from_candidate(
    ctx: &TranslateCtx,
    info: &TypeInfo,
    arguments: Vec<MetaType>,
    level: &str,
    candidate: Candidate,
    depth: u32,
) -> Result<MetaType, BuildError> {
    match candidate {
        Candidate::Class(qname, kind) => {
            if !arguments.is_empty() {
                // A concrete class never takes template arguments.
                return Err(BuildError::unresolved(info.display_name(), ctx.scope));
            }
            let type_kind = match kind {
                ClassKind::Value => TypeKind::Value(qname),
                ClassKind::Object => TypeKind::Object(qname),
                // A namespace is not a type.
                ClassKind::Namespace => {
                    return Err(BuildError::unresolved(info.display_name(), ctx.scope));
                }
            };
            Ok(MetaType::new(type_kind).with_qualifiers_of(info))
        }
        Candidate::Template(qname) => {
            build_template_reference(ctx, info, arguments, qname, depth)
        }
        Candidate::Enum(qname) => {
            if !arguments.is_empty() {
                return Err(BuildError::unresolved(info.display_name(), ctx.scope));
            }
            Ok(MetaType::new(TypeKind::Enum(qname)).with_qualifiers_of(info))
        }
        Candidate::Typedef(alias_qname) => {
            let target = ctx
                .state
                .typedefs
                .get(alias_qname.as_ref())
                .cloned()
                .ok_or_else(|| BuildError::unresolved(info.display_name(), ctx.scope))?;
            let merged = merge_typedef(&target, info);
            // Re-resolve in the scope the typedef was declared in.
            let alias_ctx = TranslateCtx {
                state: ctx.state,
                db: ctx.db,
                scope: level,
                template_params: ctx.template_params,
            };
            translate_inner(&alias_ctx, &merged, depth + 1)
        }
        Candidate::Entry(qname) => {
            let entry = ctx
                .db
                .find(&qname)
                .ok_or_else(|| BuildError::unresolved(info.display_name(), ctx.scope))?;
            resolve_entry(ctx, info, arguments, entry, depth)
        }
        Candidate::Using(target) => {
            let mut redirected = info.clone();
            redirected.set_name(&target);
            // The target is fully qualified; resolve it from the global scope.
            let global_ctx = TranslateCtx {
                state: ctx.state,
                db: ctx.db,
                scope: "",
                template_params: ctx.template_params,
            };
            translate_inner(&global_ctx, &redirected, depth + 1)
        }
    }
}

/// A reference to a generic class: check arity, fill defaults, and produce a
/// type carrying the instantiation arguments. The traverser queues the
/// concrete instantiation after traversal.
fn build_template_reference(
    ctx: &TranslateCtx,
    info: &TypeInfo,
    arguments: Vec<MetaType>,
    generic: QName,
    depth: u32,
) -> Result<MetaType, BuildError> {
    let template = ctx
        .state
        .templates
        .get(generic.as_ref())
        .ok_or_else(|| BuildError::unresolved(info.display_name(), ctx.scope))?;
    let expected = template.template_parameters.len();
    let actual = arguments.len();

    // Inside the generic's own body, a bare mention of the generic refers to
    // the current instantiation.
    if actual == 0
        && ctx.template_params == template.template_parameters.as_slice()
    {
        let self_args: Vec<MetaType> = template
            .template_parameters
            .iter()
            .map(|p| MetaType::new(TypeKind::TemplateParameter(p.clone())))
            .collect();
        return Ok(MetaType::new(template_type_kind(ctx.db, &generic))
            .with_instantiations(self_args)
            .with_qualifiers_of(info));
    }

    if actual > expected {
        return Err(BuildError::TemplateArityMismatch {
            name: template.qualified_name.to_string(),
            expected,
            actual,
        });
    }

    // Partial specialization: fill missing arguments from parameter defaults
    // before substitution begins.
    let mut final_args = arguments;
    for index in final_args.len()..expected {
        let Some(default) = template.template_defaults.get(index).cloned().flatten() else {
            return Err(BuildError::TemplateArityMismatch {
                name: template.qualified_name.to_string(),
                expected,
                actual,
            });
        };
        // Defaults resolve in the generic's own scope and may name earlier
        // parameters.
        let default_ctx = TranslateCtx {
            state: ctx.state,
            db: ctx.db,
            scope: crate::base::enclosing_scope(&generic),
            template_params: &template.template_parameters,
        };
        let resolved = translate_inner(&default_ctx, &default, depth + 1)?;
        let bound = substitute_parameters(
            &resolved,
            &template.template_parameters[..final_args.len()],
            &final_args,
        );
        final_args.push(bound);
    }

    Ok(MetaType::new(template_type_kind(ctx.db, &generic))
        .with_instantiations(final_args)
        .with_qualifiers_of(info))
}

/// The ownership kind an instantiation of a generic gets, per its entry.
fn template_type_kind(db: &TypeDatabase, generic: &QName) -> TypeKind {
    match db.find(generic).map(|e| &e.kind) {
        Some(TypeEntryKind::Object) => TypeKind::Object(generic.clone()),
        _ => TypeKind::Value(generic.clone()),
    }
}

/// Resolve through a directive entry, preferring the registry entity the
/// entry describes when one was traversed.
fn resolve_entry(
    ctx: &TranslateCtx,
    info: &TypeInfo,
    arguments: Vec<MetaType>,
    entry: &TypeEntry,
    depth: u32,
) -> Result<MetaType, BuildError> {
    let qname = &entry.qualified_name;
    if let Some(class) = ctx.state.classes.get(qname) {
        if !arguments.is_empty() {
            return Err(BuildError::unresolved(info.display_name(), ctx.scope));
        }
        let kind = match class.kind {
            ClassKind::Value => TypeKind::Value(qname.clone()),
            ClassKind::Object => TypeKind::Object(qname.clone()),
            ClassKind::Namespace => {
                return Err(BuildError::unresolved(info.display_name(), ctx.scope));
            }
        };
        return Ok(MetaType::new(kind).with_qualifiers_of(info));
    }
    if ctx.state.templates.contains_key(qname) {
        return build_template_reference(ctx, info, arguments, qname.clone(), depth);
    }
    if ctx.state.enum_names.contains(qname) {
        if !arguments.is_empty() {
            return Err(BuildError::unresolved(info.display_name(), ctx.scope));
        }
        return Ok(MetaType::new(TypeKind::Enum(qname.clone())).with_qualifiers_of(info));
    }
    build_from_entry(ctx, info, arguments, entry)
}

/// Resolve via a directive entry with no traversed declaration behind it.
fn build_from_entry(
    ctx: &TranslateCtx,
    info: &TypeInfo,
    arguments: Vec<MetaType>,
    entry: &TypeEntry,
) -> Result<MetaType, BuildError> {
    let ty = match &entry.kind {
        TypeEntryKind::Primitive { target } => {
            let name = target
                .as_deref()
                .unwrap_or_else(|| entry.simple_name());
            MetaType::primitive(name)
        }
        TypeEntryKind::Enum => MetaType::new(TypeKind::Enum(entry.qualified_name.clone())),
        // Externally defined class-like or custom types resolve without a
        // registry class; the generator links them by name.
        _ => MetaType::new(TypeKind::Custom(entry.qualified_name.clone())),
    };
    if !arguments.is_empty() && !matches!(entry.kind, TypeEntryKind::Container) {
        return Err(BuildError::unresolved(info.display_name(), ctx.scope));
    }
    Ok(ty.with_instantiations(arguments).with_qualifiers_of(info))
}

/// Merge an alias occurrence's qualifiers onto the typedef target.
fn merge_typedef(target: &TypeInfo, occurrence: &TypeInfo) -> TypeInfo {
    let mut merged = target.clone();
    merged.is_const |= occurrence.is_const;
    merged.indirections = merged.indirections.saturating_add(occurrence.indirections);
    if occurrence.reference != ReferenceKind::None {
        merged.reference = occurrence.reference;
    }
    merged
        .array_dims
        .extend(occurrence.array_dims.iter().cloned());
    // An aliased template may receive arguments through the alias.
    if merged.arguments.is_empty() {
        merged.arguments = occurrence.arguments.clone();
    }
    merged
}
