//! Post-pass fixers, run once the primary metamodel is stable.
//!
//! Fixed order: smart-pointer detection, default-value normalization,
//! equality/comparison synthesis, external-conversion registration. Each pass
//! may read the whole registry but only refines entities in place; none
//! re-triggers resolution.

use rustc_hash::FxHashSet;

use crate::base::{QName, enclosing_scope, join, simple_name};
use crate::meta::{FunctionKind, MetaEnum, MetaType, RejectReason, TypeKind};
use crate::typeparser::parse_type;
use crate::typesystem::TypeEntryKind;

use super::{BuilderState, Session};
use super::translate::{TranslateCtx, translate_type};

impl Session<'_> {
    /// Pass 1: tag directive-declared smart pointers and resolve the pointee.
    pub(crate) fn fix_smart_pointers(&mut self) {
        let names: Vec<QName> = self.state.classes.keys().cloned().collect();
        for qname in names {
            let (entry_name, pointee) = {
                let Some(class) = self.state.classes.get(&qname) else {
                    continue;
                };
                match &class.instantiated_from {
                    Some(info) => (info.generic.clone(), Some(info.arguments.clone())),
                    None => (qname.clone(), None),
                }
            };
            let Some(entry) = self.db.find(&entry_name) else {
                continue;
            };
            let TypeEntryKind::SmartPointer { pointee_arg_index } = entry.kind else {
                continue;
            };
            let pointee_type = pointee
                .as_ref()
                .and_then(|args| args.get(pointee_arg_index))
                .cloned();
            if pointee_type.is_none() {
                tracing::warn!(class = %qname, "smart pointer without a resolvable pointee");
            }
            if let Some(class) = self.state.classes.get_mut(&qname) {
                class.is_smart_pointer = true;
                class.pointee_type = pointee_type;
                tracing::debug!(class = %qname, "tagged smart pointer");
            }
        }
    }

    /// Pass 2: rewrite parameter defaults into fully qualified form so the
    /// generator can reproduce them verbatim.
    pub(crate) fn fix_default_values(&mut self) {
        // Member functions.
        let mut member_updates: Vec<(QName, usize, usize, String)> = Vec::new();
        for (qname, class) in &self.state.classes {
            for (fi, function) in class.functions.iter().enumerate() {
                for (ai, argument) in function.arguments.iter().enumerate() {
                    let Some(expr) = &argument.default_value else {
                        continue;
                    };
                    if let Some(fixed) = normalize_default(&self.state, &argument.ty, expr) {
                        member_updates.push((qname.clone(), fi, ai, fixed));
                    }
                }
            }
        }
        for (qname, fi, ai, fixed) in member_updates {
            if let Some(class) = self.state.classes.get_mut(&qname) {
                if let Some(argument) = class
                    .functions
                    .get_mut(fi)
                    .and_then(|f| f.arguments.get_mut(ai))
                {
                    tracing::trace!(class = %qname, value = %fixed, "normalized default");
                    argument.default_value = Some(fixed);
                }
            }
        }

        // Global functions.
        let mut global_updates: Vec<(usize, usize, String)> = Vec::new();
        for (fi, function) in self.state.global_functions.iter().enumerate() {
            for (ai, argument) in function.arguments.iter().enumerate() {
                let Some(expr) = &argument.default_value else {
                    continue;
                };
                if let Some(fixed) = normalize_default(&self.state, &argument.ty, expr) {
                    global_updates.push((fi, ai, fixed));
                }
            }
        }
        for (fi, ai, fixed) in global_updates {
            if let Some(argument) = self
                .state
                .global_functions
                .get_mut(fi)
                .and_then(|f| f.arguments.get_mut(ai))
            {
                argument.default_value = Some(fixed);
            }
        }
    }

    /// Pass 3: synthesize equality/comparison contracts from operator shapes,
    /// member or free.
    pub(crate) fn fix_equality_contracts(&mut self) {
        let mut equality: FxHashSet<QName> = FxHashSet::default();
        let mut comparison: FxHashSet<QName> = FxHashSet::default();

        for (qname, class) in &self.state.classes {
            for function in &class.functions {
                let FunctionKind::Operator(op) = function.kind else {
                    continue;
                };
                // A member operator's single operand must be the class itself.
                let operand_matches = function
                    .arguments
                    .first()
                    .map(|a| type_refers_to(&a.ty, qname))
                    .unwrap_or(false);
                if !operand_matches {
                    continue;
                }
                if op.is_equality() {
                    equality.insert(qname.clone());
                }
                if op.is_comparison() {
                    comparison.insert(qname.clone());
                }
            }
        }

        // Free operators: `operator==(C, C)` declared at namespace level.
        for function in &self.state.global_functions {
            let FunctionKind::Operator(op) = function.kind else {
                continue;
            };
            if function.arguments.len() != 2 {
                continue;
            }
            let (Some(left), Some(right)) = (
                class_of(&function.arguments[0].ty),
                class_of(&function.arguments[1].ty),
            ) else {
                continue;
            };
            if left != right {
                continue;
            }
            if op.is_equality() {
                equality.insert(left.clone());
            }
            if op.is_comparison() {
                comparison.insert(left.clone());
            }
        }

        for qname in equality {
            if let Some(class) = self.state.classes.get_mut(&qname) {
                class.has_equality = true;
                tracing::debug!(class = %qname, "synthesized equality contract");
            }
        }
        for qname in comparison {
            if let Some(class) = self.state.classes.get_mut(&qname) {
                class.has_comparison = true;
            }
        }
    }

    /// Pass 4: fix conversion-operator return types and register external
    /// conversions on the target class.
    ///
    /// A conversion operator is parsed with its owner class as the declared
    /// return type; the real return type is the conversion target named in
    /// the operator itself.
    pub(crate) fn fix_external_conversions(&mut self) {
        struct Fix {
            class: QName,
            function_index: usize,
            target: MetaType,
            target_class: Option<QName>,
        }
        let mut fixes: Vec<Fix> = Vec::new();
        let mut drops: Vec<(QName, usize, String)> = Vec::new();

        for (qname, class) in &self.state.classes {
            for (fi, function) in class.functions.iter().enumerate() {
                if function.kind != FunctionKind::Conversion {
                    continue;
                }
                let target_text = function
                    .original_name
                    .strip_prefix("operator")
                    .unwrap_or("")
                    .trim()
                    .to_string();
                let parsed = match parse_type(&target_text) {
                    Ok(info) => info,
                    Err(_) => {
                        drops.push((qname.clone(), fi, target_text));
                        continue;
                    }
                };
                let resolved = {
                    let ctx = TranslateCtx {
                        state: &self.state,
                        db: self.db,
                        scope: qname,
                        template_params: &[],
                    };
                    translate_type(&ctx, &parsed)
                };
                match resolved {
                    Ok(target) => {
                        let target_class = class_of(&target)
                            .filter(|t| self.state.classes.contains_key(t.as_ref()))
                            .cloned();
                        fixes.push(Fix {
                            class: qname.clone(),
                            function_index: fi,
                            target,
                            target_class,
                        });
                    }
                    Err(_) => drops.push((qname.clone(), fi, target_text)),
                }
            }
        }

        for fix in fixes {
            if let Some(class) = self.state.classes.get_mut(&fix.class) {
                if let Some(function) = class.functions.get_mut(fix.function_index) {
                    function.return_type = Some(fix.target.clone());
                    function.conversion_target = Some(fix.target);
                }
            }
            if let Some(target_class) = fix.target_class {
                if let Some(target) = self.state.classes.get_mut(&target_class) {
                    if !target.external_conversions.contains(&fix.class) {
                        tracing::debug!(
                            from = %fix.class,
                            to = %target_class,
                            "registered external conversion"
                        );
                        target.external_conversions.push(fix.class.clone());
                    }
                }
            }
        }

        // Conversion operators whose target cannot be resolved are dropped,
        // highest index first so earlier removals do not shift later ones.
        drops.sort_by(|a, b| b.1.cmp(&a.1));
        for (qname, fi, target_text) in drops {
            let function_name = {
                let Some(class) = self.state.classes.get_mut(&qname) else {
                    continue;
                };
                if fi >= class.functions.len() {
                    continue;
                }
                let function = class.functions.remove(fi);
                function.original_name.clone()
            };
            self.state.reject(
                &join(&qname, &function_name),
                &qname,
                RejectReason::UnresolvedReturnType(target_text),
            );
        }
    }
}

/// The registry class a type refers to, if any.
fn class_of(ty: &MetaType) -> Option<&QName> {
    match &ty.kind {
        TypeKind::Value(q) | TypeKind::Object(q) => Some(q),
        _ => None,
    }
}

/// Whether a type occurrence refers to a class, through any qualifiers.
fn type_refers_to(ty: &MetaType, class: &QName) -> bool {
    class_of(ty).is_some_and(|q| q == class)
}

/// Find an enum by qualified name in the working state.
fn find_enum<'s>(state: &'s BuilderState, qname: &str) -> Option<&'s MetaEnum> {
    let enclosing = enclosing_scope(qname);
    if let Some(class) = state.classes.get(enclosing) {
        if let Some(found) = class.find_enum(simple_name(qname)) {
            return Some(found);
        }
    }
    state
        .global_enums
        .iter()
        .find(|e| e.qualified_name.as_ref() == qname)
}

/// Rewrite one default-value expression into fully qualified form.
/// Returns `None` when the expression is already reproducible as-is.
fn normalize_default(state: &BuilderState, ty: &MetaType, expr: &str) -> Option<String> {
    let expr = expr.trim();
    if expr.is_empty() {
        return None;
    }
    // Literals need no qualification.
    if expr == "true"
        || expr == "false"
        || expr == "nullptr"
        || expr.starts_with(|c: char| c.is_ascii_digit() || c == '-' || c == '"' || c == '\'')
    {
        return None;
    }

    match &ty.kind {
        // Enumerator defaults are qualified by their enclosing scope.
        TypeKind::Enum(enum_qname) => {
            let meta_enum = find_enum(state, enum_qname)?;
            let last = expr.rsplit("::").next().unwrap_or(expr);
            meta_enum.value_of(last)?;
            let qualified = if meta_enum.is_scoped {
                join(&meta_enum.qualified_name, last)
            } else {
                join(enclosing_scope(&meta_enum.qualified_name), last)
            };
            (qualified != expr).then_some(qualified)
        }
        TypeKind::Value(class_qname) | TypeKind::Object(class_qname) => {
            let class = state.classes.get(class_qname.as_ref())?;
            let simple = simple_name(class_qname);
            // A bare constructor call is qualified with the class scope.
            if let Some(rest) = expr.strip_prefix(simple) {
                if rest.starts_with('(') && class_qname.as_ref() != simple {
                    return Some(format!("{class_qname}{rest}"));
                }
            }
            // A bare static field reference is qualified with its class.
            if crate::typeparser::is_identifier(expr) {
                let is_static_field = class
                    .fields
                    .iter()
                    .any(|f| f.is_static && f.original_name == expr);
                if is_static_field {
                    return Some(join(class_qname, expr));
                }
            }
            None
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::meta::{ClassKind, MetaClass, MetaEnumValue, MetaField};
    use smol_str::SmolStr;

    fn state_with_enum(scoped: bool) -> BuilderState {
        let mut state = BuilderState::default();
        let mut class = MetaClass::new("Widget", "ns::Widget", ClassKind::Object);
        let mut meta_enum = MetaEnum::new("State", "ns::Widget::State");
        meta_enum.is_scoped = scoped;
        meta_enum.enclosing_class = Some(QName::from("ns::Widget"));
        meta_enum.values.push(MetaEnumValue {
            name: SmolStr::new("Idle"),
            value: 0,
        });
        class.enums.push(meta_enum);
        state.classes.insert(QName::from("ns::Widget"), class);
        state
    }

    #[test]
    fn test_unscoped_enumerator_qualified_by_class() {
        let state = state_with_enum(false);
        let ty = MetaType::new(TypeKind::Enum(QName::from("ns::Widget::State")));
        assert_eq!(
            normalize_default(&state, &ty, "Idle").as_deref(),
            Some("ns::Widget::Idle")
        );
    }

    #[test]
    fn test_scoped_enumerator_qualified_by_enum() {
        let state = state_with_enum(true);
        let ty = MetaType::new(TypeKind::Enum(QName::from("ns::Widget::State")));
        assert_eq!(
            normalize_default(&state, &ty, "Idle").as_deref(),
            Some("ns::Widget::State::Idle")
        );
    }

    #[test]
    fn test_already_qualified_enumerator_untouched() {
        let state = state_with_enum(false);
        let ty = MetaType::new(TypeKind::Enum(QName::from("ns::Widget::State")));
        assert_eq!(normalize_default(&state, &ty, "ns::Widget::Idle"), None);
    }

    #[test]
    fn test_constructor_call_qualified() {
        let mut state = BuilderState::default();
        state.classes.insert(
            QName::from("ns::Color"),
            MetaClass::new("Color", "ns::Color", ClassKind::Value),
        );
        let ty = MetaType::new(TypeKind::Value(QName::from("ns::Color")));
        assert_eq!(
            normalize_default(&state, &ty, "Color(0, 0)").as_deref(),
            Some("ns::Color(0, 0)")
        );
    }

    #[test]
    fn test_static_field_qualified() {
        let mut state = BuilderState::default();
        let mut class = MetaClass::new("Limits", "ns::Limits", ClassKind::Value);
        let mut field = MetaField::new("MAX", MetaType::primitive("int"));
        field.is_static = true;
        class.fields.push(field);
        state.classes.insert(QName::from("ns::Limits"), class);
        let ty = MetaType::new(TypeKind::Value(QName::from("ns::Limits")));
        assert_eq!(
            normalize_default(&state, &ty, "MAX").as_deref(),
            Some("ns::Limits::MAX")
        );
    }

    #[test]
    fn test_literals_untouched() {
        let state = BuilderState::default();
        let ty = MetaType::primitive("int");
        assert_eq!(normalize_default(&state, &ty, "0"), None);
        assert_eq!(normalize_default(&state, &ty, "-1"), None);
        assert_eq!(normalize_default(&state, &ty, "true"), None);
        assert_eq!(normalize_default(&state, &ty, "nullptr"), None);
    }
}
