//! Raw candidate names for a classified fragment
//!
//! One rule per [`Shape`]. Every rule reads from the [`Scope`]; the ones that
//! need a receiver's value evaluate it there, and an evaluation failure is
//! reported as [`Unresolvable`] rather than an empty list so the caller can
//! decide what to do with it.

use std::collections::BTreeSet;
use std::fmt;
use std::ops::ControlFlow;
use std::time::{Duration, Instant};

use itertools::Itertools;
use tracing::{debug, trace, warn};

use super::formatter::RESERVED_WORDS;
use super::shape::{ResolvedQuery, Separator, Shape};
use crate::scope::{BuiltinType, EvalError, Scope};

/// Default wall-clock budget of the registry-wide fallback
pub const DEFAULT_FALLBACK_BUDGET: Duration = Duration::from_millis(50);

/// Tuning knobs of the candidate provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionOptions {
    /// Upper bound on the time spent walking every loaded type;
    /// `None` walks the whole registry
    pub fallback_budget: Option<Duration>,

    /// Sort formatted completions instead of keeping source order
    pub sort: bool,
}

impl Default for CompletionOptions {
    fn default() -> Self {
        Self {
            fallback_budget: Some(DEFAULT_FALLBACK_BUDGET),
            sort: false,
        }
    }
}

/// A receiver the scope could not resolve
#[derive(Debug, Clone, PartialEq)]
pub enum Unresolvable {
    Evaluation { receiver: String, source: EvalError },
}

impl fmt::Display for Unresolvable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Unresolvable::Evaluation { receiver, source } => {
                write!(f, "cannot resolve receiver '{}': {}", receiver, source)
            }
        }
    }
}

impl std::error::Error for Unresolvable {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Unresolvable::Evaluation { source, .. } => Some(source),
        }
    }
}

/// Produce raw candidate names for `query`, unfiltered by its prefix
pub fn candidates_for<S: Scope>(
    query: &ResolvedQuery,
    scope: &S,
    options: &CompletionOptions,
) -> Result<Vec<String>, Unresolvable> {
    let candidates = match query.shape {
        Shape::StringLiteralReceiver => scope.instance_methods(BuiltinType::String),
        Shape::RegexLiteralReceiver => scope.instance_methods(BuiltinType::Regexp),
        Shape::ArrayLiteralReceiver => scope.instance_methods(BuiltinType::Array),
        Shape::HashOrBlockReceiver => scope
            .instance_methods(BuiltinType::Proc)
            .into_iter()
            .chain(scope.instance_methods(BuiltinType::Hash))
            .unique()
            .collect(),
        Shape::BareSymbol => scope.symbols(),
        Shape::AbsoluteConstantPath => scope.constants(),
        Shape::QualifiedConstantPath => {
            let value = evaluate_receiver(scope, &query.receiver)?;
            scope
                .constants_of(&value)
                .unwrap_or_default()
                .into_iter()
                .chain(scope.methods_of(&value))
                .unique()
                .collect()
        }
        Shape::SymbolReceiver => scope.instance_methods(BuiltinType::Symbol),
        Shape::NumericReceiverDecimal | Shape::NumericReceiverHex => {
            let value = evaluate_receiver(scope, &query.receiver)?;
            scope.methods_of(&value)
        }
        Shape::GlobalVariable => scope.global_variables(),
        Shape::GenericReceiver => generic_receiver(query, scope, options)?,
        Shape::UnknownDotCompletion => scope.instance_methods(BuiltinType::String),
        Shape::NoStructuredReceiver => scope
            .methods()
            .into_iter()
            .chain(scope.private_methods())
            .chain(scope.local_variables())
            .chain(scope.instance_variables())
            .chain(scope.constants())
            .chain(RESERVED_WORDS.iter().map(|w| w.to_string()))
            .unique()
            .collect(),
    };

    trace!(
        target: "mee::completion::provider",
        shape = ?query.shape,
        count = candidates.len(),
        "Candidates gathered"
    );
    Ok(candidates)
}

fn evaluate_receiver<S: Scope>(scope: &S, receiver: &str) -> Result<S::Value, Unresolvable> {
    scope.evaluate(receiver).map_err(|source| Unresolvable::Evaluation {
        receiver: receiver.to_string(),
        source,
    })
}

/// Whether the receiver text names something the scope can evaluate
/// without running arbitrary code
fn is_known_receiver<S: Scope>(receiver: &str, scope: &S) -> bool {
    if matches!(receiver, "true" | "false" | "nil") {
        return true;
    }
    let named = |names: Vec<String>| names.iter().any(|n| n == receiver);
    if named(scope.global_variables())
        || named(scope.local_variables())
        || named(scope.instance_variables())
        || named(scope.constants())
    {
        return true;
    }
    receiver.starts_with(|c: char| c.is_ascii_uppercase()) && !receiver.contains('.')
}

fn generic_receiver<S: Scope>(
    query: &ResolvedQuery,
    scope: &S,
    options: &CompletionOptions,
) -> Result<Vec<String>, Unresolvable> {
    if !is_known_receiver(&query.receiver, scope) {
        debug!(
            target: "mee::completion::provider",
            receiver = %query.receiver,
            "Unknown receiver, falling back to every loaded type"
        );
        return Ok(loaded_type_methods(scope, options.fallback_budget));
    }

    let value = evaluate_receiver(scope, &query.receiver)?;
    let constants = match query.separator {
        Separator::DoubleColon => scope.constants_of(&value).unwrap_or_default(),
        _ => Vec::new(),
    };
    Ok(constants
        .into_iter()
        .chain(scope.methods_of(&value))
        .unique()
        .collect())
}

/// Sorted union of every loaded type's own public instance methods.
///
/// Stops after `budget` and returns what has been gathered so far.
pub fn loaded_type_methods<S: Scope>(scope: &S, budget: Option<Duration>) -> Vec<String> {
    let started = Instant::now();
    let mut names = BTreeSet::new();
    let mut visited = 0usize;
    let mut truncated = false;

    scope.visit_loaded_types(&mut |_, methods| {
        names.extend(methods.iter().cloned());
        visited += 1;
        match budget {
            Some(limit) if started.elapsed() >= limit => {
                truncated = true;
                ControlFlow::Break(())
            }
            _ => ControlFlow::Continue(()),
        }
    });

    if truncated {
        warn!(
            target: "mee::completion::provider",
            visited,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Fallback budget exhausted, returning partial candidates"
        );
    }
    names.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scope::{RegistryScope, TypeDef, Value};

    fn query(shape: Shape, receiver: &str, sep: Separator, prefix: &str) -> ResolvedQuery {
        ResolvedQuery::new(shape, receiver, sep, prefix)
    }

    fn provide(scope: &RegistryScope, q: &ResolvedQuery) -> Result<Vec<String>, Unresolvable> {
        candidates_for(q, scope, &CompletionOptions::default())
    }

    #[test]
    fn test_literal_receivers_use_builtin_members() {
        let scope = RegistryScope::new();
        let q = query(Shape::StringLiteralReceiver, "\"abc\"", Separator::Dot, "up");
        assert_eq!(
            provide(&scope, &q).unwrap(),
            scope.instance_methods(BuiltinType::String)
        );
        let q = query(Shape::ArrayLiteralReceiver, "[1]", Separator::Dot, "");
        assert!(provide(&scope, &q).unwrap().contains(&"first".to_string()));
        let q = query(Shape::RegexLiteralReceiver, "/a/", Separator::Dot, "");
        assert!(provide(&scope, &q).unwrap().contains(&"match".to_string()));
    }

    #[test]
    fn test_hash_or_block_puts_proc_first() {
        let scope = RegistryScope::new();
        let q = query(Shape::HashOrBlockReceiver, "{}", Separator::Dot, "");
        let names = provide(&scope, &q).unwrap();
        let proc_methods = scope.instance_methods(BuiltinType::Proc);
        assert_eq!(&names[..proc_methods.len()], &proc_methods[..]);
        assert!(names.contains(&"keys".to_string()));
        assert_eq!(names.iter().unique().count(), names.len());
    }

    #[test]
    fn test_qualified_constant_path() {
        let scope = RegistryScope::new();
        let q = query(Shape::QualifiedConstantPath, "Math", Separator::DoubleColon, "");
        let names = provide(&scope, &q).unwrap();
        let pi = names.iter().position(|n| n == "PI").unwrap();
        let sqrt = names.iter().position(|n| n == "sqrt").unwrap();
        assert!(pi < sqrt, "constants come before members");
    }

    #[test]
    fn test_unknown_constant_is_unresolvable() {
        let scope = RegistryScope::new();
        let q = query(Shape::QualifiedConstantPath, "Nope", Separator::DoubleColon, "");
        let err = provide(&scope, &q).unwrap_err();
        assert!(matches!(
            err,
            Unresolvable::Evaluation { ref receiver, source: EvalError::UninitializedConstant(..) }
                if receiver == "Nope"
        ));
        assert!(err.to_string().contains("Nope"));
    }

    #[test]
    fn test_numeric_receivers_evaluate_literal() {
        let scope = RegistryScope::new();
        let int = provide(&scope, &query(Shape::NumericReceiverDecimal, "1", Separator::Dot, "")).unwrap();
        assert!(int.contains(&"times".to_string()));
        let float =
            provide(&scope, &query(Shape::NumericReceiverDecimal, "1.5", Separator::Dot, "")).unwrap();
        assert!(float.contains(&"floor".to_string()));
        assert!(!float.contains(&"times".to_string()));
        let hex = provide(&scope, &query(Shape::NumericReceiverHex, "0xff", Separator::Dot, "")).unwrap();
        assert_eq!(hex, int);
    }

    #[test]
    fn test_known_local_receiver() {
        let scope = RegistryScope::new();
        scope.set_local("arr", Value::Array(vec![Value::Integer(1)]));
        let names =
            provide(&scope, &query(Shape::GenericReceiver, "arr", Separator::Dot, "fir")).unwrap();
        assert_eq!(names, scope.instance_methods(BuiltinType::Array));
    }

    #[test]
    fn test_uppercase_receiver_with_double_colon() {
        let mut scope = RegistryScope::new();
        scope.define_type(
            TypeDef::class("Foo")
                .with_constants(&["Bar", "Baz"])
                .with_singleton_methods(&["build"]),
        );
        let names =
            provide(&scope, &query(Shape::GenericReceiver, "Foo", Separator::DoubleColon, "")).unwrap();
        assert_eq!(&names[..2], &["Bar".to_string(), "Baz".to_string()]);
        assert!(names.contains(&"build".to_string()));

        let dotted =
            provide(&scope, &query(Shape::GenericReceiver, "Foo", Separator::Dot, "")).unwrap();
        assert!(!dotted.contains(&"Bar".to_string()));
    }

    #[test]
    fn test_unknown_receiver_falls_back_to_all_types() {
        let scope = RegistryScope::new();
        let q = query(Shape::GenericReceiver, "foo.bar", Separator::Dot, "");
        let names = candidates_for(&q, &scope, &CompletionOptions {
            fallback_budget: None,
            sort: false,
        })
        .unwrap();
        assert!(names.contains(&"upcase".to_string()));
        assert!(names.contains(&"first".to_string()));
        let mut sorted = names.clone();
        sorted.sort();
        sorted.dedup();
        assert_eq!(names, sorted);
    }

    #[test]
    fn test_known_but_failing_receiver_is_unresolvable() {
        let scope = RegistryScope::new();
        let q = query(Shape::GenericReceiver, "Missing", Separator::Dot, "");
        assert!(provide(&scope, &q).is_err());
    }

    #[test]
    fn test_fallback_budget_stops_early() {
        let scope = RegistryScope::new();
        let partial = loaded_type_methods(&scope, Some(Duration::ZERO));
        let full = loaded_type_methods(&scope, None);
        assert!(!partial.is_empty());
        assert!(partial.len() < full.len());
    }

    #[test]
    fn test_unstructured_union_ends_with_reserved_words() {
        let scope = RegistryScope::new();
        scope.set_local("counter", Value::Integer(0));
        scope.set_instance_variable("@x", Value::Nil);
        let names = provide(&scope, &ResolvedQuery::unstructured("")).unwrap();
        for expected in ["puts", "counter", "@x", "String", "yield"] {
            assert!(names.contains(&expected.to_string()), "missing {}", expected);
        }
        let counter = names.iter().position(|n| n == "counter").unwrap();
        let ivar = names.iter().position(|n| n == "@x").unwrap();
        assert!(counter < ivar);
    }

    #[test]
    fn test_symbols_and_globals() {
        let scope = RegistryScope::new();
        scope.intern_symbol("sync_all");
        let symbols = provide(&scope, &query(Shape::BareSymbol, "", Separator::None, "sy")).unwrap();
        assert!(symbols.contains(&"sync_all".to_string()));
        let globals =
            provide(&scope, &query(Shape::GlobalVariable, "", Separator::None, "$std")).unwrap();
        assert!(globals.contains(&"$stdout".to_string()));
    }
}
