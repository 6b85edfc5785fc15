//! Execution scope capability
//!
//! The completion resolver never evaluates or reflects on anything by itself.
//! Everything it knows about the live session comes through the [`Scope`]
//! trait:
//! - evaluating short expressions (receivers, numeric literals)
//! - enumerating globals, locals and instance variables of the binding
//! - enumerating callable members and constants of values and namespaces
//! - walking every loaded type for the best-effort fallback
//!
//! [`RegistryScope`] is the concrete implementation shipped with the crate.
//! It backs reflection with an explicit type registry populated at start-up.

pub mod eval;
pub mod prelude;
pub mod registry;
pub mod value;

use std::fmt;
use std::ops::ControlFlow;

pub use registry::{RegistryScope, TypeDef, TypeKind};
pub use value::Value;

/// Built-in types whose member sets are used for literal receivers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BuiltinType {
    String,
    Regexp,
    Array,
    Hash,
    Proc,
    Symbol,
}

impl BuiltinType {
    /// Name of the type as it appears in the scope
    pub fn type_name(self) -> &'static str {
        match self {
            BuiltinType::String => "String",
            BuiltinType::Regexp => "Regexp",
            BuiltinType::Array => "Array",
            BuiltinType::Hash => "Hash",
            BuiltinType::Proc => "Proc",
            BuiltinType::Symbol => "Symbol",
        }
    }
}

impl fmt::Display for BuiltinType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_name())
    }
}

/// Errors raised while evaluating an expression in a scope
#[derive(Debug, Clone, PartialEq)]
pub enum EvalError {
    /// Name is not a local, instance variable, global or method
    UndefinedName(String),
    /// Constant lookup failed (namespace path, constant name)
    UninitializedConstant(String, String),
    /// Expression could not be read
    Syntax(String),
    /// Receiver does not respond to the message (receiver class, message)
    NoMethod(String, String),
    /// `::` applied to something that cannot hold constants
    NotANamespace(String),
    /// Well-formed expression the scope cannot evaluate
    Unsupported(String),
}

impl fmt::Display for EvalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EvalError::UndefinedName(name) => {
                write!(f, "undefined local variable or method '{}'", name)
            }
            EvalError::UninitializedConstant(namespace, name) if namespace.is_empty() => {
                write!(f, "uninitialized constant {}", name)
            }
            EvalError::UninitializedConstant(namespace, name) => {
                write!(f, "uninitialized constant {}::{}", namespace, name)
            }
            EvalError::Syntax(msg) => write!(f, "syntax error: {}", msg),
            EvalError::NoMethod(class, message) => {
                write!(f, "undefined method '{}' for an instance of {}", message, class)
            }
            EvalError::NotANamespace(expr) => write!(f, "{} is not a class/module", expr),
            EvalError::Unsupported(expr) => write!(f, "cannot evaluate '{}'", expr),
        }
    }
}

impl std::error::Error for EvalError {}

/// Introspection and evaluation surface of a live execution context.
///
/// All methods take `&self`: completion only reads from the scope. The one
/// mutating path is [`Scope::evaluate`], and only because the evaluated
/// expression itself may have side effects (an assignment, for instance).
pub trait Scope {
    /// Runtime value produced by evaluation
    type Value;

    /// Evaluate `expr` in the scope's binding
    fn evaluate(&self, expr: &str) -> Result<Self::Value, EvalError>;

    /// Debug-style representation, as shown after `=> ` in a console
    fn inspect(&self, value: &Self::Value) -> String;

    /// Plain textual representation of the value
    fn to_s(&self, value: &Self::Value) -> String;

    /// Name of the value's class
    fn class_name(&self, value: &Self::Value) -> String;

    /// Currently defined global variable names
    fn global_variables(&self) -> Vec<String>;

    /// Local variable names visible at the binding
    fn local_variables(&self) -> Vec<String>;

    /// Instance variable names of the binding's `self`
    fn instance_variables(&self) -> Vec<String>;

    /// Public methods callable on the binding's `self`
    fn methods(&self) -> Vec<String>;

    /// Private methods callable on the binding's `self`
    fn private_methods(&self) -> Vec<String>;

    /// Constant names visible from the binding (the top-level namespace)
    fn constants(&self) -> Vec<String>;

    /// Every interned symbol name
    fn symbols(&self) -> Vec<String>;

    /// Public instance methods of a built-in type, inherited ones included
    fn instance_methods(&self, ty: BuiltinType) -> Vec<String>;

    /// Callable member names of a value, inherited ones included
    fn methods_of(&self, value: &Self::Value) -> Vec<String>;

    /// Constant names held by a namespace value, `None` when it is not one
    fn constants_of(&self, value: &Self::Value) -> Option<Vec<String>>;

    /// Visit every loaded, non-internal type with its own public instance
    /// methods. The visitor may stop the walk by returning `Break`.
    fn visit_loaded_types(&self, visitor: &mut dyn FnMut(&str, &[String]) -> ControlFlow<()>);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_type_names() {
        assert_eq!(BuiltinType::String.type_name(), "String");
        assert_eq!(BuiltinType::Proc.to_string(), "Proc");
    }

    #[test]
    fn test_eval_error_display() {
        let err = EvalError::UninitializedConstant(String::new(), "Foo".to_string());
        assert_eq!(err.to_string(), "uninitialized constant Foo");

        let err = EvalError::UninitializedConstant("Math".to_string(), "TAU".to_string());
        assert_eq!(err.to_string(), "uninitialized constant Math::TAU");

        let err = EvalError::NoMethod("Integer".to_string(), "frob".to_string());
        assert_eq!(err.to_string(), "undefined method 'frob' for an instance of Integer");
    }
}
