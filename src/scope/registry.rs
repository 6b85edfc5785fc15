//! Explicit type registry backing the [`Scope`] capability
//!
//! There is no runtime to reflect on, so everything the resolver may ask
//! about lives here:
//! - loaded types (classes and modules) with their own member names
//! - constant values keyed by full path
//! - the binding: locals, instance variables of `main`, globals
//! - the symbol table
//!
//! Types are registered at start-up (prelude, configuration). Bindings and
//! interned symbols live behind `RefCell`s so evaluation can update them
//! through a shared reference.

use std::cell::RefCell;
use std::collections::{BTreeSet, HashMap, HashSet};
use std::ops::ControlFlow;

use itertools::Itertools;
use serde::Deserialize;
use tracing::debug;

use super::value::Value;
use super::{eval, prelude, BuiltinType, EvalError, Scope};

/// Whether a type is a class or a module
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TypeKind {
    Class,
    Module,
}

/// A loaded class or module
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TypeDef {
    /// Full constant path, e.g. `Math::DomainError`
    pub name: String,

    #[serde(default = "default_kind")]
    pub kind: TypeKind,

    /// Superclass path; `None` for modules and for `BasicObject`
    #[serde(default)]
    pub superclass: Option<String>,

    /// Included modules, in inclusion order
    #[serde(default)]
    pub includes: Vec<String>,

    /// Own public instance methods
    #[serde(default)]
    pub instance_methods: Vec<String>,

    /// Own private instance methods
    #[serde(default)]
    pub private_instance_methods: Vec<String>,

    /// Own class-level (singleton) methods
    #[serde(default)]
    pub singleton_methods: Vec<String>,

    /// Own constant names (nested types are added on registration)
    #[serde(default)]
    pub constants: Vec<String>,

    /// Hidden from the loaded-type walk
    #[serde(default)]
    pub internal: bool,
}

fn default_kind() -> TypeKind {
    TypeKind::Class
}

fn to_names(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}

impl TypeDef {
    /// New class deriving from `Object`
    pub fn class(name: &str) -> Self {
        Self {
            name: name.to_string(),
            kind: TypeKind::Class,
            superclass: Some("Object".to_string()),
            includes: Vec::new(),
            instance_methods: Vec::new(),
            private_instance_methods: Vec::new(),
            singleton_methods: Vec::new(),
            constants: Vec::new(),
            internal: false,
        }
    }

    /// New module
    pub fn module(name: &str) -> Self {
        Self {
            kind: TypeKind::Module,
            superclass: None,
            ..Self::class(name)
        }
    }

    pub fn with_superclass(mut self, superclass: Option<&str>) -> Self {
        self.superclass = superclass.map(str::to_string);
        self
    }

    pub fn with_includes(mut self, modules: &[&str]) -> Self {
        self.includes.extend(to_names(modules));
        self
    }

    pub fn with_instance_methods(mut self, methods: &[&str]) -> Self {
        self.instance_methods.extend(to_names(methods));
        self
    }

    pub fn with_private_methods(mut self, methods: &[&str]) -> Self {
        self.private_instance_methods.extend(to_names(methods));
        self
    }

    pub fn with_singleton_methods(mut self, methods: &[&str]) -> Self {
        self.singleton_methods.extend(to_names(methods));
        self
    }

    pub fn with_constants(mut self, constants: &[&str]) -> Self {
        self.constants.extend(to_names(constants));
        self
    }

    pub fn internal(mut self) -> Self {
        self.internal = true;
        self
    }

    /// Last path segment (`DomainError` for `Math::DomainError`)
    pub fn short_name(&self) -> &str {
        self.name.rsplit("::").next().unwrap_or(&self.name)
    }

    /// Enclosing namespace path, `None` for top-level types
    pub fn namespace(&self) -> Option<&str> {
        self.name.rsplit_once("::").map(|(ns, _)| ns)
    }

    fn merge(&mut self, other: TypeDef) {
        fn extend_unique(into: &mut Vec<String>, from: Vec<String>) {
            for name in from {
                if !into.contains(&name) {
                    into.push(name);
                }
            }
        }

        if self.superclass.is_none() && self.kind == TypeKind::Class {
            self.superclass = other.superclass;
        }
        extend_unique(&mut self.includes, other.includes);
        extend_unique(&mut self.instance_methods, other.instance_methods);
        extend_unique(&mut self.private_instance_methods, other.private_instance_methods);
        extend_unique(&mut self.singleton_methods, other.singleton_methods);
        extend_unique(&mut self.constants, other.constants);
        self.internal |= other.internal;
    }
}

/// Insertion-ordered name → value table
#[derive(Debug, Default)]
struct Bindings {
    entries: Vec<(String, Value)>,
}

impl Bindings {
    fn get(&self, name: &str) -> Option<&Value> {
        self.entries.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    fn set(&mut self, name: &str, value: Value) {
        match self.entries.iter_mut().find(|(n, _)| n == name) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((name.to_string(), value)),
        }
    }

    fn names(&self) -> Vec<String> {
        self.entries.iter().map(|(n, _)| n.clone()).collect()
    }
}

/// Registry-backed execution scope
pub struct RegistryScope {
    /// All loaded types in registration order
    types: Vec<TypeDef>,

    /// Full path → index into `types`
    index: HashMap<String, usize>,

    /// Constant values (non-type constants) by full path
    constant_values: HashMap<String, Value>,

    /// Constants of the top-level namespace, in definition order
    top_level: Vec<String>,

    globals: RefCell<Bindings>,
    locals: RefCell<Bindings>,
    instance_variables: RefCell<Bindings>,

    /// Symbols seen by the evaluator on top of the registry's own names
    interned: RefCell<BTreeSet<String>>,
}

impl RegistryScope {
    /// Create an empty scope with no types at all
    pub fn empty() -> Self {
        Self {
            types: Vec::new(),
            index: HashMap::new(),
            constant_values: HashMap::new(),
            top_level: Vec::new(),
            globals: RefCell::new(Bindings::default()),
            locals: RefCell::new(Bindings::default()),
            instance_variables: RefCell::new(Bindings::default()),
            interned: RefCell::new(BTreeSet::new()),
        }
    }

    /// Create a scope with the built-in prelude loaded
    pub fn new() -> Self {
        let mut scope = Self::empty();
        prelude::install(&mut scope);
        scope
    }

    /// Register a type, or reopen it when it already exists
    pub fn define_type(&mut self, def: TypeDef) {
        if let Some(&idx) = self.index.get(&def.name) {
            debug!(target: "mee::scope::registry", name = %def.name, "Reopening type");
            self.types[idx].merge(def);
            return;
        }

        let short = def.short_name().to_string();
        match def.namespace() {
            Some(ns) => {
                if let Some(&parent) = self.index.get(ns) {
                    let constants = &mut self.types[parent].constants;
                    if !constants.contains(&short) {
                        constants.push(short);
                    }
                }
            }
            None => {
                if !self.top_level.contains(&short) {
                    self.top_level.push(short);
                }
            }
        }

        self.index.insert(def.name.clone(), self.types.len());
        self.types.push(def);
    }

    /// Define a non-type constant; `path` may be nested (`Math::PI`)
    pub fn define_constant(&mut self, path: &str, value: Value) {
        let short = path.rsplit("::").next().unwrap_or(path).to_string();
        match path.rsplit_once("::") {
            Some((ns, _)) => {
                if let Some(&parent) = self.index.get(ns) {
                    let constants = &mut self.types[parent].constants;
                    if !constants.contains(&short) {
                        constants.push(short);
                    }
                }
            }
            None => {
                if !self.top_level.contains(&short) {
                    self.top_level.push(short);
                }
            }
        }
        self.constant_values.insert(path.to_string(), value);
    }

    /// Define a private method on `Object`, like a top-level `def`
    pub fn define_private_method(&mut self, name: &str) {
        self.define_type(TypeDef::class("Object").with_private_methods(&[name]));
    }

    /// Set a global variable; `name` includes the leading `$`
    pub fn set_global(&self, name: &str, value: Value) {
        self.globals.borrow_mut().set(name, value);
    }

    /// Set a local variable of the binding
    pub fn set_local(&self, name: &str, value: Value) {
        self.locals.borrow_mut().set(name, value);
    }

    /// Set an instance variable of `main`; `name` includes the leading `@`
    pub fn set_instance_variable(&self, name: &str, value: Value) {
        self.instance_variables.borrow_mut().set(name, value);
    }

    /// Add a name to the symbol table
    pub fn intern_symbol(&self, name: &str) {
        self.interned.borrow_mut().insert(name.to_string());
    }

    pub fn global(&self, name: &str) -> Option<Value> {
        self.globals.borrow().get(name).cloned()
    }

    pub fn local(&self, name: &str) -> Option<Value> {
        self.locals.borrow().get(name).cloned()
    }

    pub fn instance_variable(&self, name: &str) -> Option<Value> {
        self.instance_variables.borrow().get(name).cloned()
    }

    /// Look up a type by full path
    pub fn lookup_type(&self, path: &str) -> Option<&TypeDef> {
        self.index.get(path).map(|&idx| &self.types[idx])
    }

    /// Number of registered types
    pub fn type_count(&self) -> usize {
        self.types.len()
    }

    /// Resolve `name` inside namespace `namespace` (empty for top level)
    pub fn resolve_constant(&self, namespace: &str, name: &str) -> Result<Value, EvalError> {
        let path = if namespace.is_empty() || namespace == "Object" {
            name.to_string()
        } else {
            format!("{}::{}", namespace, name)
        };

        if let Some(ty) = self.lookup_type(&path) {
            return Ok(Value::Type {
                path,
                kind: ty.kind,
            });
        }
        if let Some(value) = self.constant_values.get(&path) {
            return Ok(value.clone());
        }
        Err(EvalError::UninitializedConstant(namespace.to_string(), name.to_string()))
    }

    /// Ancestor chain of a type: itself, its included modules (last included
    /// first, recursively), then the same for each superclass.
    pub fn ancestors(&self, path: &str) -> Vec<&TypeDef> {
        let mut out = Vec::new();
        let mut seen = HashSet::new();
        let mut current = Some(path);

        while let Some(name) = current {
            let Some(ty) = self.lookup_type(name) else {
                break;
            };
            if !seen.insert(ty.name.as_str()) {
                break;
            }
            out.push(ty);
            self.push_included(ty, &mut seen, &mut out);
            current = ty.superclass.as_deref();
        }

        out
    }

    fn push_included<'a>(
        &'a self,
        ty: &'a TypeDef,
        seen: &mut HashSet<&'a str>,
        out: &mut Vec<&'a TypeDef>,
    ) {
        for module in ty.includes.iter().rev() {
            if !seen.insert(module.as_str()) {
                continue;
            }
            if let Some(m) = self.lookup_type(module) {
                out.push(m);
                self.push_included(m, seen, out);
            }
        }
    }

    /// Public instance methods of a type, inherited ones included
    pub fn instance_methods_of_type(&self, path: &str) -> Vec<String> {
        self.ancestors(path)
            .into_iter()
            .flat_map(|ty| ty.instance_methods.iter().cloned())
            .unique()
            .collect()
    }

    fn singleton_methods_of_type(&self, path: &str) -> Vec<String> {
        let mut chain = Vec::new();
        let mut seen = HashSet::new();
        let mut current = Some(path);
        while let Some(name) = current {
            let Some(ty) = self.lookup_type(name) else {
                break;
            };
            if !seen.insert(ty.name.as_str()) {
                break;
            }
            chain.push(ty);
            current = ty.superclass.as_deref();
        }
        chain
            .into_iter()
            .flat_map(|ty| ty.singleton_methods.iter().cloned())
            .unique()
            .collect()
    }
}

impl Default for RegistryScope {
    fn default() -> Self {
        Self::new()
    }
}

impl Scope for RegistryScope {
    type Value = Value;

    fn evaluate(&self, expr: &str) -> Result<Value, EvalError> {
        eval::evaluate(self, expr)
    }

    fn inspect(&self, value: &Value) -> String {
        value.to_string()
    }

    fn to_s(&self, value: &Value) -> String {
        value.to_s()
    }

    fn class_name(&self, value: &Value) -> String {
        value.class_name().to_string()
    }

    fn global_variables(&self) -> Vec<String> {
        self.globals.borrow().names()
    }

    fn local_variables(&self) -> Vec<String> {
        self.locals.borrow().names()
    }

    fn instance_variables(&self) -> Vec<String> {
        self.instance_variables.borrow().names()
    }

    fn methods(&self) -> Vec<String> {
        self.instance_methods_of_type("Object")
    }

    fn private_methods(&self) -> Vec<String> {
        self.ancestors("Object")
            .into_iter()
            .flat_map(|ty| ty.private_instance_methods.iter().cloned())
            .unique()
            .collect()
    }

    fn constants(&self) -> Vec<String> {
        self.top_level.clone()
    }

    fn symbols(&self) -> Vec<String> {
        let mut symbols: BTreeSet<String> = self.interned.borrow().clone();
        for ty in &self.types {
            symbols.insert(ty.short_name().to_string());
            symbols.extend(ty.instance_methods.iter().cloned());
            symbols.extend(ty.private_instance_methods.iter().cloned());
            symbols.extend(ty.singleton_methods.iter().cloned());
            symbols.extend(ty.constants.iter().cloned());
        }
        symbols.extend(self.top_level.iter().cloned());
        symbols.into_iter().collect()
    }

    fn instance_methods(&self, ty: BuiltinType) -> Vec<String> {
        self.instance_methods_of_type(ty.type_name())
    }

    fn methods_of(&self, value: &Value) -> Vec<String> {
        match value {
            Value::Type { path, kind } => {
                let meta = match kind {
                    TypeKind::Class => "Class",
                    TypeKind::Module => "Module",
                };
                self.singleton_methods_of_type(path)
                    .into_iter()
                    .chain(self.instance_methods_of_type(meta))
                    .unique()
                    .collect()
            }
            other => self.instance_methods_of_type(other.class_name()),
        }
    }

    fn constants_of(&self, value: &Value) -> Option<Vec<String>> {
        match value {
            Value::Type { path, .. } if path == "Object" => Some(self.top_level.clone()),
            Value::Type { path, .. } => {
                Some(self.lookup_type(path).map(|ty| ty.constants.clone()).unwrap_or_default())
            }
            _ => None,
        }
    }

    fn visit_loaded_types(&self, visitor: &mut dyn FnMut(&str, &[String]) -> ControlFlow<()>) {
        for ty in self.types.iter().filter(|ty| !ty.internal) {
            if visitor(&ty.name, &ty.instance_methods).is_break() {
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tiny_scope() -> RegistryScope {
        let mut scope = RegistryScope::empty();
        scope.define_type(
            TypeDef::class("BasicObject")
                .with_superclass(None)
                .with_instance_methods(&["__id__", "=="]),
        );
        scope.define_type(TypeDef::module("Kernel").with_instance_methods(&["class", "tap"]));
        scope.define_type(
            TypeDef::class("Object")
                .with_superclass(Some("BasicObject"))
                .with_includes(&["Kernel"]),
        );
        scope.define_type(TypeDef::module("Comparable").with_instance_methods(&["between?"]));
        scope.define_type(
            TypeDef::class("Widget")
                .with_includes(&["Comparable"])
                .with_instance_methods(&["spin"]),
        );
        scope
    }

    #[test]
    fn test_ancestor_order() {
        let scope = tiny_scope();
        let names: Vec<&str> = scope.ancestors("Widget").iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["Widget", "Comparable", "Object", "Kernel", "BasicObject"]);
    }

    #[test]
    fn test_instance_methods_inherited() {
        let scope = tiny_scope();
        let methods = scope.instance_methods_of_type("Widget");
        assert_eq!(methods, vec!["spin", "between?", "class", "tap", "__id__", "=="]);
    }

    #[test]
    fn test_reopen_merges_methods() {
        let mut scope = tiny_scope();
        scope.define_type(TypeDef::class("Widget").with_instance_methods(&["spin", "stop"]));
        let widget = scope.lookup_type("Widget").unwrap();
        assert_eq!(widget.instance_methods, vec!["spin", "stop"]);
        assert_eq!(scope.type_count(), 5);
    }

    #[test]
    fn test_nested_type_registers_constant() {
        let mut scope = tiny_scope();
        scope.define_type(TypeDef::module("Outer"));
        scope.define_type(TypeDef::class("Outer::Inner"));
        scope.define_constant("Outer::LIMIT", Value::Integer(3));

        let outer = scope.resolve_constant("", "Outer").unwrap();
        assert_eq!(
            scope.constants_of(&outer),
            Some(vec!["Inner".to_string(), "LIMIT".to_string()])
        );
        assert_eq!(scope.resolve_constant("Outer", "LIMIT"), Ok(Value::Integer(3)));
        assert!(!scope.constants().contains(&"Inner".to_string()));
    }

    #[test]
    fn test_constants_of_non_namespace() {
        let scope = tiny_scope();
        assert_eq!(scope.constants_of(&Value::Integer(1)), None);
    }

    #[test]
    fn test_bindings_keep_insertion_order() {
        let scope = tiny_scope();
        scope.set_local("b", Value::Integer(1));
        scope.set_local("a", Value::Integer(2));
        scope.set_local("b", Value::Integer(3));
        assert_eq!(scope.local_variables(), vec!["b", "a"]);
        assert_eq!(scope.local("b"), Some(Value::Integer(3)));
    }

    #[test]
    fn test_internal_types_skipped_in_walk() {
        let mut scope = tiny_scope();
        scope.define_type(TypeDef::class("Secret").with_instance_methods(&["hidden"]).internal());

        let mut visited = Vec::new();
        scope.visit_loaded_types(&mut |name, _| {
            visited.push(name.to_string());
            ControlFlow::Continue(())
        });
        assert!(!visited.contains(&"Secret".to_string()));
        assert!(visited.contains(&"Widget".to_string()));
    }

    #[test]
    fn test_visit_stops_on_break() {
        let scope = tiny_scope();
        let mut count = 0;
        scope.visit_loaded_types(&mut |_, _| {
            count += 1;
            ControlFlow::Break(())
        });
        assert_eq!(count, 1);
    }

    #[test]
    fn test_class_value_methods() {
        let mut scope = tiny_scope();
        scope.define_type(TypeDef::class("Module").with_instance_methods(&["constants"]));
        scope.define_type(
            TypeDef::class("Class")
                .with_superclass(Some("Module"))
                .with_instance_methods(&["new"]),
        );
        scope.define_type(TypeDef::class("Gadget").with_singleton_methods(&["build"]));

        let gadget = scope.resolve_constant("", "Gadget").unwrap();
        let methods = scope.methods_of(&gadget);
        assert_eq!(&methods[..3], &["build", "new", "constants"]);
    }
}
