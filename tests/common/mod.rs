//! Shared model fixtures for integration tests

#![allow(dead_code)]

use xmlelem::{
    AttributeField, ChildField, ContentField, IntType, ModelDecl, ModelSpec, Registry, StringType,
    Value,
};

/// Initialize tracing once per test binary (respects RUST_LOG env var)
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Scalar attributes, content children, a flag and element text
pub fn foo() -> ModelDecl {
    ModelDecl::new("Foo")
        .attribute("field1", AttributeField::scalar(IntType::new()))
        .attribute(
            "field2",
            AttributeField::scalar(StringType::new().with_choices(["A", "B"])),
        )
        .child("bar", ChildField::content(StringType::new()))
        .child("baz", ChildField::content_list(StringType::new()))
        .content("content", ContentField::new(StringType::new()))
        .child("check", ChildField::flag())
        .child(
            "bar_null1",
            ChildField::content(StringType::new())
                .null_value(0)
                .default_value(Value::Null),
        )
        .child(
            "bar_null2",
            ChildField::content(StringType::new())
                .null_value(0)
                .default_value(Value::Null),
        )
}

/// An element with an optional attribute and text
pub fn bar() -> ModelDecl {
    ModelDecl::new("Bar")
        .attribute("field1", AttributeField::scalar(IntType::new()).default_value(Value::Null))
        .content("content", ContentField::new(StringType::new()))
}

/// Bars wrapped in a `<Bars>` element
pub fn foo2() -> ModelDecl {
    ModelDecl::new("Foo2").child("bars", ChildField::nested_list(ModelSpec::of("Bar")))
}

/// A base model with two derived variants, and a holder accepting any of them
pub fn hierarchy() -> Vec<ModelDecl> {
    vec![
        ModelDecl::new("Parent"),
        ModelDecl::new("Child1")
            .extends("Parent")
            .attribute("field1", AttributeField::scalar(IntType::new()).default_value(Value::Null)),
        ModelDecl::new("Child2")
            .extends("Parent")
            .attribute("field2", AttributeField::scalar(StringType::new()).default_value(Value::Null)),
        ModelDecl::new("Foo3")
            .child("children", ChildField::models(ModelSpec::of("Parent").with_variants())),
    ]
}

/// Registry holding every fixture model
pub fn registry() -> Registry {
    init_tracing();
    let mut builder = Registry::builder();
    for decl in [foo(), bar(), foo2()].into_iter().chain(hierarchy()) {
        builder.declare(decl).expect("fixture declaration");
    }
    builder.build().expect("fixture registry")
}
