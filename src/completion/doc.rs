//! Documentation lookup: the single fully-qualified name a fragment denotes

use super::provider::{candidates_for, CompletionOptions};
use super::shape::{ResolvedQuery, Separator, Shape};
use crate::scope::{BuiltinType, Scope};

/// Name to look documentation up for
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocTarget {
    Single(String),
    /// The fragment is ambiguous; every alternative is listed
    Ambiguous(Vec<String>),
}

impl DocTarget {
    /// Every name the target refers to
    pub fn names(&self) -> &[String] {
        match self {
            DocTarget::Single(name) => std::slice::from_ref(name),
            DocTarget::Ambiguous(names) => names,
        }
    }
}

/// Resolve `query` to a documentation target
pub fn doc_target<S: Scope>(
    query: &ResolvedQuery,
    scope: &S,
    options: &CompletionOptions,
) -> Option<DocTarget> {
    let member = query.prefix.as_str();
    let on_type = |ty: BuiltinType| (!member.is_empty()).then(|| format!("{}.{}", ty, member));

    match query.shape {
        Shape::StringLiteralReceiver => on_type(BuiltinType::String).map(DocTarget::Single),
        Shape::RegexLiteralReceiver => on_type(BuiltinType::Regexp).map(DocTarget::Single),
        Shape::ArrayLiteralReceiver => on_type(BuiltinType::Array).map(DocTarget::Single),
        Shape::SymbolReceiver => on_type(BuiltinType::Symbol).map(DocTarget::Single),
        Shape::HashOrBlockReceiver => {
            let proc = on_type(BuiltinType::Proc)?;
            let hash = on_type(BuiltinType::Hash)?;
            Some(DocTarget::Ambiguous(vec![proc, hash]))
        }
        Shape::BareSymbol => None,
        Shape::AbsoluteConstantPath => scope
            .constants()
            .into_iter()
            .find(|name| name == member)
            .map(DocTarget::Single),
        Shape::QualifiedConstantPath => (!member.is_empty())
            .then(|| DocTarget::Single(format!("{}::{}", query.receiver, member))),
        Shape::NumericReceiverDecimal | Shape::NumericReceiverHex => {
            if member.is_empty() {
                return None;
            }
            let value = scope.evaluate(&query.receiver).ok()?;
            Some(DocTarget::Single(format!("{}.{}", scope.class_name(&value), member)))
        }
        Shape::GlobalVariable => scope
            .global_variables()
            .into_iter()
            .find(|name| name == member)
            .map(DocTarget::Single),
        Shape::GenericReceiver => generic_target(query, scope),
        Shape::UnknownDotCompletion => scope
            .instance_methods(BuiltinType::String)
            .iter()
            .any(|name| name == member)
            .then(|| DocTarget::Single(format!("String.{}", member))),
        Shape::NoStructuredReceiver => candidates_for(query, scope, options)
            .ok()?
            .into_iter()
            .find(|name| name == member)
            .map(DocTarget::Single),
    }
}

fn generic_target<S: Scope>(query: &ResolvedQuery, scope: &S) -> Option<DocTarget> {
    let member = query.prefix.as_str();
    if member.is_empty() {
        return None;
    }
    let value = scope.evaluate(&query.receiver).ok()?;

    // Namespaces are documented under their own name, other values under
    // their class
    let constants = scope.constants_of(&value);
    let owner = match constants {
        Some(_) => scope.inspect(&value),
        None => scope.class_name(&value),
    };

    let is_constant = query.separator == Separator::DoubleColon
        && constants.is_some_and(|names| names.iter().any(|n| n == member));
    let is_method = scope.methods_of(&value).iter().any(|n| n == member);

    (is_constant || is_method)
        .then(|| DocTarget::Single(format!("{}{}{}", owner, query.separator, member)))
}
