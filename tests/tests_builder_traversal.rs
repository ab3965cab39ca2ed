//! End-to-end traversal tests: shell registration, member population,
//! per-entity rejection, directive modifications and added functions.

use metabind::builder::{BuildOptions, MetaBuilder};
use metabind::codemodel::{
    Access, ArgumentItem, ClassItem, EnumItem, FileModel, FunctionItem, NamespaceItem, TypeInfo,
    UsingItem, VariableItem,
};
use metabind::meta::RejectReason;
use metabind::typesystem::{
    AddedFunction, FieldModification, FunctionModification, SignaturePattern, TypeDatabase,
    TypeEntry,
};

fn int() -> TypeInfo {
    TypeInfo::new("int")
}

fn void() -> TypeInfo {
    TypeInfo::void()
}

#[test]
fn test_class_without_entry_is_rejected() {
    let model = FileModel::new(NamespaceItem::new("").with_class(ClassItem::new("Unknown")));
    let db = TypeDatabase::new();
    let result = MetaBuilder::new(&model, &db).build();

    assert!(result.find_class("Unknown").is_none());
    assert!(result.rejections().iter().any(|r| {
        r.qualified_name.as_ref() == "Unknown" && r.reason == RejectReason::NotInTypeSystem
    }));
}

#[test]
fn test_generation_disabled_entry_is_rejected_but_recorded() {
    let model = FileModel::new(NamespaceItem::new("").with_class(ClassItem::new("Hidden")));
    let mut db = TypeDatabase::new();
    db.add_entry(TypeEntry::value("Hidden").without_generation());
    let result = MetaBuilder::new(&model, &db).build();

    assert!(result.find_class("Hidden").is_none());
    assert!(result.rejections().iter().any(|r| {
        r.qualified_name.as_ref() == "Hidden" && r.reason == RejectReason::GenerationDisabled
    }));
}

#[test]
fn test_function_with_unresolved_return_is_rejected_per_entity() {
    let class = ClassItem::new("Widget")
        .with_function(FunctionItem::new("ok", int()))
        .with_function(FunctionItem::new("bad", TypeInfo::new("Mystery")))
        .with_function(FunctionItem::new("alsoOk", void()));
    let model = FileModel::new(NamespaceItem::new("").with_class(class));
    let mut db = TypeDatabase::new();
    db.add_entry(TypeEntry::object("Widget"));
    let result = MetaBuilder::new(&model, &db).build();

    let widget = result.find_class("Widget").expect("Widget should build");
    let names: Vec<&str> = widget.functions.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(names, vec!["ok", "alsoOk"]);
    assert!(result.rejections().iter().any(|r| {
        r.qualified_name.as_ref() == "Widget::bad"
            && matches!(r.reason, RejectReason::UnresolvedReturnType(_))
    }));
}

#[test]
fn test_function_with_unresolved_argument_is_rejected() {
    let class = ClassItem::new("Widget").with_function(
        FunctionItem::new("take", void())
            .with_argument(ArgumentItem::new("value", TypeInfo::new("Nope"))),
    );
    let model = FileModel::new(NamespaceItem::new("").with_class(class));
    let mut db = TypeDatabase::new();
    db.add_entry(TypeEntry::object("Widget"));
    let result = MetaBuilder::new(&model, &db).build();

    assert!(result.find_class("Widget").unwrap().functions.is_empty());
    assert!(result.rejections().iter().any(|r| {
        matches!(r.reason, RejectReason::UnresolvedArgumentType(_))
    }));
}

#[test]
fn test_mutually_referential_classes_resolve() {
    // Node mentions Edge and vice versa; shell-first registration makes both
    // resolvable within the same scope.
    let node = ClassItem::new("Node").with_function(
        FunctionItem::new("edge", TypeInfo::new("Edge").with_indirections(1)),
    );
    let edge = ClassItem::new("Edge").with_function(
        FunctionItem::new("node", TypeInfo::new("Node").with_indirections(1)),
    );
    let model = FileModel::new(
        NamespaceItem::new("").with_class(node).with_class(edge),
    );
    let mut db = TypeDatabase::new();
    db.add_entry(TypeEntry::object("Node"));
    db.add_entry(TypeEntry::object("Edge"));
    let result = MetaBuilder::new(&model, &db).build();

    assert_eq!(result.find_class("Node").unwrap().functions.len(), 1);
    assert_eq!(result.find_class("Edge").unwrap().functions.len(), 1);
}

#[test]
fn test_constructor_and_destructor_classified_by_shape() {
    let class = ClassItem::new("Res")
        .with_function(FunctionItem::new("Res", void()))
        .with_function(FunctionItem::new("~Res", void()))
        .with_function(FunctionItem::new("reset", void()));
    let model = FileModel::new(NamespaceItem::new("").with_class(class));
    let mut db = TypeDatabase::new();
    db.add_entry(TypeEntry::object("Res"));
    let result = MetaBuilder::new(&model, &db).build();

    let res = result.find_class("Res").unwrap();
    assert!(res.functions[0].is_constructor());
    assert!(res.functions[0].return_type.is_none());
    assert!(res.functions[1].is_destructor());
    assert_eq!(res.functions[2].name, "reset");
}

#[test]
fn test_private_field_modeled_but_not_bindable() {
    let class = ClassItem::new("Data")
        .with_field(VariableItem::new("visible", int()))
        .with_field(VariableItem::new("hidden", int()).with_access(Access::Private));
    let model = FileModel::new(NamespaceItem::new("").with_class(class));
    let mut db = TypeDatabase::new();
    db.add_entry(TypeEntry::value("Data"));
    let result = MetaBuilder::new(&model, &db).build();

    let data = result.find_class("Data").unwrap();
    assert_eq!(data.fields.len(), 2);
    assert!(data.fields[0].is_bindable);
    assert!(!data.fields[1].is_bindable);
}

#[test]
fn test_field_modification_flags_non_bindable() {
    let class = ClassItem::new("Data").with_field(VariableItem::new("raw", int()));
    let model = FileModel::new(NamespaceItem::new("").with_class(class));
    let mut db = TypeDatabase::new();
    db.add_entry(TypeEntry::value("Data"));
    db.add_field_modification("Data", FieldModification::new("raw").removed());
    let result = MetaBuilder::new(&model, &db).build();

    let data = result.find_class("Data").unwrap();
    assert!(!data.fields[0].is_bindable);
}

#[test]
fn test_function_rename_keeps_original_signature() {
    let class = ClassItem::new("Api").with_function(FunctionItem::new("cName", int()));
    let model = FileModel::new(NamespaceItem::new("").with_class(class));
    let mut db = TypeDatabase::new();
    db.add_entry(TypeEntry::object("Api"));
    db.add_function_modification(
        "Api",
        FunctionModification::new(SignaturePattern::name("cName")).renamed("betterName"),
    );
    let result = MetaBuilder::new(&model, &db).build();

    let api = result.find_class("Api").unwrap();
    let f = &api.functions[0];
    assert_eq!(f.name, "betterName");
    assert_eq!(f.original_name, "cName");
    assert!(f.is_renamed);
}

#[test]
fn test_function_removal_is_recorded() {
    let class = ClassItem::new("Api")
        .with_function(FunctionItem::new("keep", void()))
        .with_function(FunctionItem::new("drop", void()));
    let model = FileModel::new(NamespaceItem::new("").with_class(class));
    let mut db = TypeDatabase::new();
    db.add_entry(TypeEntry::object("Api"));
    db.add_function_modification(
        "Api",
        FunctionModification::new(SignaturePattern::signature("drop()")).removed(),
    );
    let result = MetaBuilder::new(&model, &db).build();

    let api = result.find_class("Api").unwrap();
    assert_eq!(api.functions.len(), 1);
    assert_eq!(api.functions[0].name, "keep");
    assert!(result.rejections().iter().any(|r| {
        r.qualified_name.as_ref() == "Api::drop" && r.reason == RejectReason::GenerationDisabled
    }));
}

#[test]
fn test_added_function_inserted_like_parsed_one() {
    let class = ClassItem::new("Api").with_function(FunctionItem::new("native", void()));
    let model = FileModel::new(NamespaceItem::new("").with_class(class));
    let mut db = TypeDatabase::new();
    db.add_entry(TypeEntry::object("Api"));
    db.add_added_function("Api", AddedFunction::new("int clamp(int value, int lo = 0)"));
    let result = MetaBuilder::new(&model, &db).build();

    let api = result.find_class("Api").unwrap();
    let clamp = api
        .functions
        .iter()
        .find(|f| f.name == "clamp")
        .expect("added function present");
    assert!(clamp.is_added);
    assert_eq!(clamp.arguments.len(), 2);
    assert_eq!(clamp.arguments[1].default_value.as_deref(), Some("0"));
    assert_eq!(clamp.return_type.as_ref().unwrap().display_name(), "int");
}

#[test]
fn test_malformed_added_function_fails_the_class() {
    let class = ClassItem::new("Api").with_function(FunctionItem::new("native", void()));
    let model = FileModel::new(NamespaceItem::new("").with_class(class));
    let mut db = TypeDatabase::new();
    db.add_entry(TypeEntry::object("Api"));
    db.add_added_function("Api", AddedFunction::new("int (broken"));
    let result = MetaBuilder::new(&model, &db).build();

    // A malformed directive is a configuration error: the class is dropped,
    // reported distinctly from parse-time rejections.
    assert!(result.find_class("Api").is_none());
    assert!(result.rejections().iter().any(|r| {
        r.qualified_name.as_ref() == "Api" && matches!(r.reason, RejectReason::DirectiveError(_))
    }));
}

#[test]
fn test_unmatched_modification_is_reported() {
    let class = ClassItem::new("Api").with_function(FunctionItem::new("real", void()));
    let model = FileModel::new(NamespaceItem::new("").with_class(class));
    let mut db = TypeDatabase::new();
    db.add_entry(TypeEntry::object("Api"));
    db.add_function_modification(
        "Api",
        FunctionModification::new(SignaturePattern::name("ghost")).renamed("spirit"),
    );
    let result = MetaBuilder::new(&model, &db).build();

    assert!(result.rejections().iter().any(|r| {
        matches!(r.reason, RejectReason::UnmatchedModification(ref p) if p == "ghost")
    }));
}

#[test]
fn test_skip_deprecated_rejects_function_but_keeps_siblings() {
    let class = ClassItem::new("Api")
        .with_function(FunctionItem::new("old", void()).as_deprecated())
        .with_function(FunctionItem::new("new_", void()));
    let model = FileModel::new(NamespaceItem::new("").with_class(class));
    let mut db = TypeDatabase::new();
    db.add_entry(TypeEntry::object("Api"));
    let result = MetaBuilder::new(&model, &db)
        .with_options(BuildOptions {
            skip_deprecated: true,
        })
        .build();

    let api = result.find_class("Api").unwrap();
    assert_eq!(api.functions.len(), 1);
    assert_eq!(api.functions[0].name, "new_");
    assert!(result.rejections().iter().any(|r| {
        r.qualified_name.as_ref() == "Api::old" && r.reason == RejectReason::Deprecated
    }));
}

#[test]
fn test_namespace_members_are_qualified() {
    let ns = NamespaceItem::new("gfx")
        .with_class(ClassItem::new("Canvas").with_function(FunctionItem::new("clear", void())))
        .with_enum(EnumItem::new("Mode").with_enumerator("Fast", None).with_enumerator("Exact", None))
        .with_function(FunctionItem::new("version", int()));
    let model = FileModel::new(NamespaceItem::new("").with_namespace(ns));
    let mut db = TypeDatabase::new();
    db.add_entry(TypeEntry::namespace("gfx"));
    db.add_entry(TypeEntry::object("gfx::Canvas"));
    let result = MetaBuilder::new(&model, &db).build();

    assert!(result.find_class("gfx::Canvas").is_some());
    assert!(result.find_class("gfx").unwrap().is_namespace());
    let version = result
        .global_functions()
        .iter()
        .find(|f| f.name == "version")
        .expect("global function present");
    assert!(version.owner.is_none());
    let mode = result.find_enum("gfx::Mode").expect("global enum present");
    assert_eq!(mode.value_of("Fast"), Some(0));
    assert_eq!(mode.value_of("Exact"), Some(1));
}

#[test]
fn test_class_enum_values_auto_increment() {
    let class = ClassItem::new("State").with_enum(
        EnumItem::new("Phase")
            .with_enumerator("Init", None)
            .with_enumerator("Run", Some(10))
            .with_enumerator("Done", None),
    );
    let model = FileModel::new(NamespaceItem::new("").with_class(class));
    let mut db = TypeDatabase::new();
    db.add_entry(TypeEntry::object("State"));
    let result = MetaBuilder::new(&model, &db).build();

    let phase = result.find_enum("State::Phase").unwrap();
    assert_eq!(phase.value_of("Init"), Some(0));
    assert_eq!(phase.value_of("Run"), Some(10));
    assert_eq!(phase.value_of("Done"), Some(11));
    assert_eq!(phase.enclosing_class.as_deref(), Some("State"));
}

#[test]
fn test_using_declaration_re_exposes_base_overloads() {
    let base = ClassItem::new("Base")
        .with_function(FunctionItem::new("f", void()))
        .with_function(
            FunctionItem::new("f", void()).with_argument(ArgumentItem::new("x", int())),
        );
    let derived = ClassItem::new("Derived")
        .with_base(metabind::codemodel::BaseSpecifier::public(TypeInfo::new("Base")))
        .with_using(UsingItem::new("Base", "f"));
    let model = FileModel::new(
        NamespaceItem::new("").with_class(base).with_class(derived),
    );
    let mut db = TypeDatabase::new();
    db.add_entry(TypeEntry::object("Base"));
    db.add_entry(TypeEntry::object("Derived"));
    let result = MetaBuilder::new(&model, &db).build();

    let derived = result.find_class("Derived").unwrap();
    let exposed: Vec<_> = derived.functions.iter().filter(|f| f.name == "f").collect();
    assert_eq!(exposed.len(), 2);
    assert!(exposed.iter().all(|f| f.owner.as_deref() == Some("Derived")));
}

#[test]
fn test_event_source_projection_lists_bindable_signatures() {
    let class = ClassItem::new("Emitter")
        .with_function(FunctionItem::new("Emitter", void()))
        .with_function(
            FunctionItem::new("changed", void())
                .with_argument(ArgumentItem::new("value", int())),
        )
        .with_function(FunctionItem::new("helper", void()).with_access(Access::Private))
        .with_function(FunctionItem::new("statics", void()).as_static());
    let model = FileModel::new(NamespaceItem::new("").with_class(class));
    let mut db = TypeDatabase::new();
    db.add_entry(TypeEntry::object("Emitter").as_event_source());
    let result = MetaBuilder::new(&model, &db).build();

    assert!(result.find_class("Emitter").unwrap().is_event_source);
    let signatures = result.bindable_signatures("Emitter");
    assert_eq!(signatures, vec!["changed(int)".to_string()]);
}
