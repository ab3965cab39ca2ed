//! Template instantiation end to end: caching across requests, directive
//! typedefs, generic bases and arity failures.

use once_cell::sync::Lazy;

use metabind::builder::MetaBuilder;
use metabind::codemodel::{
    ArgumentItem, BaseSpecifier, ClassItem, FileModel, FunctionItem, NamespaceItem,
    TemplateParameterItem, TypeInfo,
};
use metabind::meta::RejectReason;
use metabind::typesystem::{DirectiveTypedef, TypeDatabase, TypeEntry};

fn void() -> TypeInfo {
    TypeInfo::void()
}

/// Directive entries shared by the Box-based scenarios.
static BOX_DB: Lazy<TypeDatabase> = Lazy::new(|| {
    let mut db = TypeDatabase::new();
    db.add_entry(TypeEntry::value("Box"));
    db.add_entry(TypeEntry::object("User"));
    db
});

/// `template<class T> class Box { T get(); void set(const T &); };`
fn generic_box() -> ClassItem {
    ClassItem::new("Box")
        .with_template_parameter(TemplateParameterItem::new("T"))
        .with_function(FunctionItem::new("get", TypeInfo::new("T")))
        .with_function(FunctionItem::new("set", void()).with_argument(ArgumentItem::new(
            "value",
            TypeInfo::new("T")
                .with_const()
                .with_reference(metabind::codemodel::ReferenceKind::LValue),
        )))
}

#[test]
fn test_same_arguments_instantiate_once() {
    // Box<int> requested twice through two member signatures.
    let user = ClassItem::new("User")
        .with_function(FunctionItem::new(
            "first",
            TypeInfo::new("Box").with_arguments(vec![TypeInfo::new("int")]),
        ))
        .with_function(FunctionItem::new(
            "second",
            TypeInfo::new("Box").with_arguments(vec![TypeInfo::new("int")]),
        ));
    let model = FileModel::new(
        NamespaceItem::new("").with_class(generic_box()).with_class(user),
    );
    let result = MetaBuilder::new(&model, &BOX_DB).build();

    let boxes: Vec<_> = result
        .classes()
        .filter(|c| c.qualified_name.starts_with("Box<"))
        .collect();
    assert_eq!(boxes.len(), 1, "exactly one concrete Box<int> entity");
    assert_eq!(boxes[0].qualified_name.as_ref(), "Box<int>");

    let concrete = result.find_class("Box<int>").unwrap();
    assert_eq!(
        concrete.functions[0].return_type.as_ref().unwrap().display_name(),
        "int"
    );
    assert_eq!(
        concrete.functions[1].arguments[0].ty.display_name(),
        "const int &"
    );
    let provenance = concrete.instantiated_from.as_ref().unwrap();
    assert_eq!(provenance.generic.as_ref(), "Box");
    assert_eq!(provenance.arguments[0].display_name(), "int");
}

#[test]
fn test_distinct_arguments_instantiate_separately() {
    let user = ClassItem::new("User")
        .with_function(FunctionItem::new(
            "ints",
            TypeInfo::new("Box").with_arguments(vec![TypeInfo::new("int")]),
        ))
        .with_function(FunctionItem::new(
            "reals",
            TypeInfo::new("Box").with_arguments(vec![TypeInfo::new("double")]),
        ));
    let model = FileModel::new(
        NamespaceItem::new("").with_class(generic_box()).with_class(user),
    );
    let result = MetaBuilder::new(&model, &BOX_DB).build();

    assert!(result.find_class("Box<int>").is_some());
    assert!(result.find_class("Box<double>").is_some());
}

#[test]
fn test_directive_typedef_shares_the_concrete_entity() {
    let user = ClassItem::new("User").with_function(FunctionItem::new(
        "direct",
        TypeInfo::new("Box").with_arguments(vec![TypeInfo::new("int")]),
    ));
    let model = FileModel::new(
        NamespaceItem::new("").with_class(generic_box()).with_class(user),
    );
    let mut db = TypeDatabase::new();
    db.add_entry(TypeEntry::value("Box"));
    db.add_entry(TypeEntry::object("User"));
    db.add_typedef(DirectiveTypedef::new("IntBox", "Box<int>"));
    let result = MetaBuilder::new(&model, &db).build();

    let boxes: Vec<_> = result
        .classes()
        .filter(|c| c.qualified_name.starts_with("Box<"))
        .collect();
    assert_eq!(boxes.len(), 1, "typedef and direct use share one entity");
    // The typedef names the instantiation.
    assert_eq!(result.find_class("Box<int>").unwrap().name, "IntBox");
}

#[test]
fn test_generic_base_is_instantiated_for_derived_class() {
    let derived = ClassItem::new("IntHolder").with_base(BaseSpecifier::public(
        TypeInfo::new("Box").with_arguments(vec![TypeInfo::new("int")]),
    ));
    let model = FileModel::new(
        NamespaceItem::new("").with_class(generic_box()).with_class(derived),
    );
    let mut db = TypeDatabase::new();
    db.add_entry(TypeEntry::value("Box"));
    db.add_entry(TypeEntry::object("IntHolder"));
    let result = MetaBuilder::new(&model, &db).build();

    let holder = result.find_class("IntHolder").unwrap();
    assert_eq!(holder.base_class_names[0].as_ref(), "Box<int>");
    // The instantiated base sorts before the derived class.
    let names = result.sorted_class_names();
    let base_pos = names.iter().position(|n| n.as_ref() == "Box<int>").unwrap();
    let derived_pos = names.iter().position(|n| n.as_ref() == "IntHolder").unwrap();
    assert!(base_pos < derived_pos);
    // get() is reachable through the base reference.
    assert!(result
        .effective_functions("IntHolder")
        .iter()
        .any(|f| f.name == "get"));
}

#[test]
fn test_generic_base_of_generic_is_reinstantiated() {
    // template<class T> class Slot : public Box<T> {};  Slot<int> must pull
    // in Box<int> as a base.
    let slot = ClassItem::new("Slot")
        .with_template_parameter(TemplateParameterItem::new("T"))
        .with_base(BaseSpecifier::public(
            TypeInfo::new("Box").with_arguments(vec![TypeInfo::new("T")]),
        ));
    let user = ClassItem::new("User").with_function(FunctionItem::new(
        "slot",
        TypeInfo::new("Slot").with_arguments(vec![TypeInfo::new("int")]),
    ));
    let model = FileModel::new(
        NamespaceItem::new("")
            .with_class(generic_box())
            .with_class(slot)
            .with_class(user),
    );
    let mut db = TypeDatabase::new();
    db.add_entry(TypeEntry::value("Box"));
    db.add_entry(TypeEntry::value("Slot"));
    db.add_entry(TypeEntry::object("User"));
    let result = MetaBuilder::new(&model, &db).build();

    let concrete = result.find_class("Slot<int>").expect("Slot<int> built");
    assert_eq!(concrete.base_class_names[0].as_ref(), "Box<int>");
    assert!(result.find_class("Box<int>").is_some());
}

#[test]
fn test_template_default_allows_partial_arguments() {
    // template<class A, class B = int> class Pair { A first(); B second(); };
    let pair = ClassItem::new("Pair")
        .with_template_parameter(TemplateParameterItem::new("A"))
        .with_template_parameter(
            TemplateParameterItem::new("B").with_default(TypeInfo::new("int")),
        )
        .with_function(FunctionItem::new("first", TypeInfo::new("A")))
        .with_function(FunctionItem::new("second", TypeInfo::new("B")));
    let user = ClassItem::new("User").with_function(FunctionItem::new(
        "pair",
        TypeInfo::new("Pair").with_arguments(vec![TypeInfo::new("double")]),
    ));
    let model = FileModel::new(
        NamespaceItem::new("").with_class(pair).with_class(user),
    );
    let mut db = TypeDatabase::new();
    db.add_entry(TypeEntry::value("Pair"));
    db.add_entry(TypeEntry::object("User"));
    let result = MetaBuilder::new(&model, &db).build();

    let concrete = result.find_class("Pair<double, int>").expect("filled default");
    assert_eq!(
        concrete.functions[1].return_type.as_ref().unwrap().display_name(),
        "int"
    );
}

#[test]
fn test_arity_mismatch_rejects_the_member() {
    let user = ClassItem::new("User").with_function(FunctionItem::new(
        "bad",
        TypeInfo::new("Box").with_arguments(vec![TypeInfo::new("int"), TypeInfo::new("int")]),
    ));
    let model = FileModel::new(
        NamespaceItem::new("").with_class(generic_box()).with_class(user),
    );
    let result = MetaBuilder::new(&model, &BOX_DB).build();

    assert!(result.find_class("User").unwrap().functions.is_empty());
    assert!(result.rejections().iter().any(|r| {
        r.qualified_name.as_ref() == "User::bad"
            && matches!(
                r.reason,
                RejectReason::TemplateArityMismatch {
                    expected: 1,
                    actual: 2
                }
            )
    }));
}

#[test]
fn test_generic_itself_is_not_in_the_final_registry() {
    let model = FileModel::new(NamespaceItem::new("").with_class(generic_box()));
    let mut db = TypeDatabase::new();
    db.add_entry(TypeEntry::value("Box"));
    let result = MetaBuilder::new(&model, &db).build();

    // The uninstantiated generic is a definition, not a bindable entity.
    assert!(result.find_class("Box").is_none());
    assert_eq!(result.class_count(), 0);
}
