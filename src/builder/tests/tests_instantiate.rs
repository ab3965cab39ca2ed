//! Tests for template instantiation: substitution rules, cache idempotence,
//! and derived-request queuing.

use smol_str::SmolStr;

use crate::base::QName;
use crate::builder::{BuildOptions, BuilderState, Session};
use crate::builder::instantiate::{substitute_in_type_info, substitute_parameters};
use crate::codemodel::TypeInfo;
use crate::meta::{
    ClassKind, FunctionKind, MetaArgument, MetaClass, MetaFunction, MetaType, TypeKind,
};
use crate::typesystem::TypeDatabase;

fn param(name: &str) -> MetaType {
    MetaType::new(TypeKind::TemplateParameter(SmolStr::new(name)))
}

#[test]
fn test_substitute_replaces_parameter() {
    let params = [SmolStr::new("T")];
    let args = [MetaType::primitive("int")];
    let out = substitute_parameters(&param("T"), &params, &args);
    assert_eq!(out.display_name(), "int");
}

#[test]
fn test_substitute_merges_qualifiers() {
    let params = [SmolStr::new("T")];
    let args = [MetaType::primitive("int")];
    let mut occurrence = param("T");
    occurrence.is_const = true;
    occurrence.reference = crate::codemodel::ReferenceKind::LValue;
    let out = substitute_parameters(&occurrence, &params, &args);
    assert_eq!(out.display_name(), "const int &");
}

#[test]
fn test_substitute_recurses_into_instantiations() {
    let params = [SmolStr::new("T")];
    let args = [MetaType::primitive("int")];
    let vec_of_t = MetaType::new(TypeKind::Value(QName::from("Vec")))
        .with_instantiations(vec![param("T")]);
    let out = substitute_parameters(&vec_of_t, &params, &args);
    assert_eq!(out.display_name(), "Vec<int>");
}

#[test]
fn test_substitute_in_type_info_rewrites_bases() {
    let params = [SmolStr::new("T")];
    let args = [MetaType::primitive("int")];
    let base = TypeInfo::new("Base").with_arguments(vec![TypeInfo::new("T")]);
    let out = substitute_in_type_info(&base, &params, &args);
    assert_eq!(out.display_name(), "Base<int>");
}

fn generic_box() -> MetaClass {
    let mut generic = MetaClass::new("Box", "Box", ClassKind::Value);
    generic.is_template = true;
    generic.template_parameters = vec![SmolStr::new("T")];
    generic.template_defaults = vec![None];
    let mut get = MetaFunction::new("get", FunctionKind::Normal);
    get.return_type = Some(param("T"));
    get.owner = Some(QName::from("Box"));
    generic.functions.push(get);
    let mut set = MetaFunction::new("set", FunctionKind::Normal);
    set.return_type = Some(MetaType::void());
    set.arguments.push(MetaArgument::new("value", {
        let mut t = param("T");
        t.is_const = true;
        t.reference = crate::codemodel::ReferenceKind::LValue;
        t
    }));
    set.owner = Some(QName::from("Box"));
    generic.functions.push(set);
    generic
}

fn session(db: &TypeDatabase) -> Session<'_> {
    let mut state = BuilderState::default();
    state.templates.insert(QName::from("Box"), generic_box());
    Session {
        db,
        options: BuildOptions::default(),
        state,
    }
}

#[test]
fn test_instantiation_substitutes_members() {
    let db = TypeDatabase::new();
    let mut session = session(&db);
    let concrete = session
        .instantiate_class(&QName::from("Box"), &[MetaType::primitive("int")])
        .unwrap();
    assert_eq!(concrete.as_ref(), "Box<int>");

    let class = session.state.classes.get("Box<int>").unwrap();
    assert!(!class.is_template);
    assert!(class.instantiated_from.is_some());
    let get = &class.functions[0];
    assert_eq!(get.return_type.as_ref().unwrap().display_name(), "int");
    let set = &class.functions[1];
    assert_eq!(
        set.arguments[0].ty.display_name(),
        "const int &"
    );
    assert_eq!(set.owner.as_deref(), Some("Box<int>"));
}

#[test]
fn test_instantiation_is_idempotent() {
    let db = TypeDatabase::new();
    let mut session = session(&db);
    let first = session
        .instantiate_class(&QName::from("Box"), &[MetaType::primitive("int")])
        .unwrap();
    let second = session
        .instantiate_class(&QName::from("Box"), &[MetaType::primitive("int")])
        .unwrap();
    assert_eq!(first, second);
    let count = session
        .state
        .classes
        .keys()
        .filter(|k| k.starts_with("Box<"))
        .count();
    assert_eq!(count, 1);
}

#[test]
fn test_distinct_arguments_make_distinct_entities() {
    let db = TypeDatabase::new();
    let mut session = session(&db);
    session
        .instantiate_class(&QName::from("Box"), &[MetaType::primitive("int")])
        .unwrap();
    session
        .instantiate_class(&QName::from("Box"), &[MetaType::primitive("double")])
        .unwrap();
    assert!(session.state.classes.contains_key("Box<int>"));
    assert!(session.state.classes.contains_key("Box<double>"));
}

#[test]
fn test_arity_mismatch_is_rejected() {
    let db = TypeDatabase::new();
    let mut session = session(&db);
    let err = session
        .instantiate_class(
            &QName::from("Box"),
            &[MetaType::primitive("int"), MetaType::primitive("double")],
        )
        .unwrap_err();
    assert!(matches!(
        err,
        crate::meta::RejectReason::TemplateArityMismatch {
            expected: 1,
            actual: 2
        }
    ));
}
