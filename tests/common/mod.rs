// Shared fixtures for completion integration tests
//
// Builds resolvers over a prelude scope extended with a few user types,
// the way a configured console session would look.

use mee::{RegistryScope, Resolver, TypeDef, Value};

/// Scope with the prelude plus `Foo` (constants `Bar`, `Baz`, `Qux`),
/// the nested class `Foo::Bar`, and a few bindings
pub fn session_scope() -> RegistryScope {
    let mut scope = RegistryScope::new();
    scope.define_type(
        TypeDef::class("Foo")
            .with_constants(&["Baz", "Qux"])
            .with_instance_methods(&["frobnicate"])
            .with_singleton_methods(&["bake", "build"]),
    );
    scope.define_type(TypeDef::class("Foo::Bar").with_instance_methods(&["barrel"]));
    scope.define_type(TypeDef::module("Widgets").with_instance_methods(&["widgetize"]));

    scope.set_global("$name", Value::Str("mee".into()));
    scope.set_global("$my_name", Value::Nil);
    scope.set_instance_variable("@x", Value::Integer(1));
    scope
}

pub fn resolver() -> Resolver<RegistryScope> {
    match Resolver::new(session_scope()) {
        Ok(resolver) => resolver,
        Err(e) => panic!("resolver construction failed: {}", e),
    }
}

/// Assert every completion starts with `prefix`
pub fn assert_all_start_with(completions: &[String], prefix: &str) {
    for completion in completions {
        assert!(
            completion.starts_with(prefix),
            "{:?} does not start with {:?}",
            completion,
            prefix
        );
    }
}
