//! Prefix filtering and formatting of raw candidate names

use super::shape::{ResolvedQuery, Shape};

/// Reserved words offered for bare identifier completion
pub const RESERVED_WORDS: &[&str] = &[
    "__ENCODING__", "__LINE__", "__FILE__",
    "BEGIN", "END",
    "alias", "and",
    "begin", "break",
    "case", "class",
    "def", "defined?", "do",
    "else", "elsif", "end", "ensure",
    "false", "for",
    "if", "in",
    "module",
    "next", "nil", "not",
    "or",
    "redo", "rescue", "retry", "return",
    "self", "super",
    "then", "true",
    "undef", "unless", "until",
    "when", "while",
    "yield",
];

/// Operator method names; never inserted as completions
pub const OPERATORS: &[&str] = &[
    "%", "&", "*", "**", "+", "-", "/", "<", "<<", "<=", "<=>", "==", "===", "=~", ">", ">=",
    ">>", "[]", "[]=", "^", "!", "!=", "!~", "|", "~", "+@", "-@",
];

pub fn is_operator(name: &str) -> bool {
    OPERATORS.contains(&name)
}

/// Operators and purely numeric names never reach any output list.
fn is_insertable(name: &str) -> bool {
    let numeric = !name.is_empty() && name.bytes().all(|b| b.is_ascii_digit());
    !numeric && !is_operator(name)
}

/// Turn raw candidates into insertable completion strings, keeping the
/// candidate order.
pub fn format(query: &ResolvedQuery, candidates: &[String]) -> Vec<String> {
    let candidates = candidates.iter().filter(|name| is_insertable(name));
    match query.shape {
        Shape::BareSymbol => candidates
            .filter(|name| name.starts_with(&query.prefix))
            .map(|name| format!(":{}", name))
            .collect(),
        Shape::AbsoluteConstantPath => candidates
            .filter(|name| name.starts_with(&query.prefix))
            .map(|name| format!("::{}", name))
            .collect(),
        Shape::GlobalVariable => candidates
            .filter(|name| name.contains(query.prefix.as_str()))
            .cloned()
            .collect(),
        Shape::NoStructuredReceiver => candidates
            .filter(|name| name.starts_with(&query.prefix))
            .cloned()
            .collect(),
        _ => select_message(query, candidates),
    }
}

/// Member completion: `receiver + separator + name` for identifier-shaped
/// names. Numeric names and operators are dropped.
fn select_message<'a>(
    query: &ResolvedQuery,
    candidates: impl Iterator<Item = &'a String>,
) -> Vec<String> {
    candidates
        .filter(|name| name.starts_with(&query.prefix))
        .filter_map(|name| {
            let first = name.chars().next()?;
            (first.is_ascii_alphabetic() || first == '_')
                .then(|| format!("{}{}{}", query.receiver, query.separator, name))
        })
        .collect()
}
