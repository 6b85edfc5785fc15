/// mee - context-sensitive completion for an interactive Ruby-style console
///
/// Given the text typed up to the cursor, the resolver classifies what kind
/// of thing is being completed, asks a live execution scope for candidate
/// names, and renders completions ready for insertion.
///
/// # Architecture
///
/// 1. **Classification** (`completion::classifier`)
///    - Ordered pattern table, first match wins
///    - Splits the fragment into receiver, separator and prefix
///
/// 2. **Candidates** (`completion::provider`)
///    - Literal receivers use built-in member tables
///    - Named receivers are evaluated in the scope
///    - Unknown receivers fall back to every loaded type, within a time budget
///
/// 3. **Formatting** (`completion::formatter`)
///    - Literal prefix filter
///    - `receiver + separator + name` for member completion
///    - Operators and numeric names never inserted
///
/// The scope is a capability (`scope::Scope`). `scope::RegistryScope` is the
/// bundled implementation: an explicit type registry, bindings and a small
/// expression evaluator.
///
/// # Example
///
/// ```rust
/// use mee::{RegistryScope, Resolver};
///
/// let resolver = Resolver::new(RegistryScope::new()).unwrap();
/// resolver.evaluate("arr = [1, 2, 3]").unwrap();
///
/// let completions = resolver.complete("arr.fir");
/// assert!(completions.contains(&"arr.first".to_string()));
/// ```

pub mod completion;
pub mod logging;
pub mod repl;
pub mod scope;

pub use completion::{
    Classifier, CompletionOptions, DocTarget, ResolvedQuery, Resolver, Separator, Shape,
    SuggestionCatalog, SuggestionCategory, Unresolvable,
};
pub use scope::{BuiltinType, EvalError, RegistryScope, Scope, TypeDef, TypeKind, Value};
