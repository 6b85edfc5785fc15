//! Ordered shape recognizers
//!
//! Each pattern anchors on a distinguishing delimiter at the end of the
//! fragment (quote + dot, bracket + dot, brace + dot, leading colon, `::`,
//! numeric literal, leading `$`, generic receiver + separator). The first
//! pattern that matches wins; nothing matching means bare identifier
//! completion over the whole scope.

use regex::{Captures, Regex};
use tracing::trace;

use super::shape::{ResolvedQuery, Separator, Shape};

/// How a pattern's capture groups map onto a [`ResolvedQuery`]
#[derive(Debug, Clone, Copy)]
enum Groups {
    /// `(receiver)(message)` with an implicit `.`
    ReceiverDotMessage,
    /// `(receiver)(separator)(message)`
    ReceiverSepMessage,
    /// `(receiver)(message)` with an implicit `::`
    ReceiverColonMessage,
    /// `(message)` only, no receiver
    Message,
    /// `(name)`: the typed constant is both receiver and message
    RootConstant,
    /// `(message)` after an implicit leading `.`
    DotMessage,
}

const PATTERN_TABLE: &[(Shape, &str, Groups)] = &[
    (
        Shape::StringLiteralReceiver,
        r#"^(".*"|'.*'|`.*`)\.([^.]*)$"#,
        Groups::ReceiverDotMessage,
    ),
    (
        Shape::RegexLiteralReceiver,
        r"^(/[^/]*/)\.([^.]*)$",
        Groups::ReceiverDotMessage,
    ),
    (
        Shape::ArrayLiteralReceiver,
        r"^([^\]]*\])\.([^.]*)$",
        Groups::ReceiverDotMessage,
    ),
    (
        Shape::HashOrBlockReceiver,
        r"^([^}]*\})\.([^.]*)$",
        Groups::ReceiverDotMessage,
    ),
    (Shape::BareSymbol, r"^:([^:.]*)$", Groups::Message),
    (
        Shape::AbsoluteConstantPath,
        r"^::([A-Z][^:.(]*)$",
        Groups::RootConstant,
    ),
    (
        Shape::QualifiedConstantPath,
        r"^([A-Z].*)::([^:.]*)$",
        Groups::ReceiverColonMessage,
    ),
    (
        Shape::SymbolReceiver,
        r"^(:[^:.]+)(\.|::)([^.]*)$",
        Groups::ReceiverSepMessage,
    ),
    (
        Shape::NumericReceiverDecimal,
        r"^(-?(?:0[dbo])?[0-9_]+(?:\.[0-9_]+)?(?:(?:[eE][+-]?[0-9]+)?i?|r)?)(\.|::)([^.]*)$",
        Groups::ReceiverSepMessage,
    ),
    (
        Shape::NumericReceiverHex,
        r"^(-?0x[0-9a-fA-F_]+)(\.|::)([^.]*)$",
        Groups::ReceiverSepMessage,
    ),
    (Shape::GlobalVariable, r"^(\$[^.]*)$", Groups::Message),
    (
        Shape::GenericReceiver,
        r#"^([^."].*)(\.|::)([^.]*)$"#,
        Groups::ReceiverSepMessage,
    ),
    (Shape::UnknownDotCompletion, r"^\.([^.]*)$", Groups::DotMessage),
];

/// Compiled, priority-ordered pattern table
pub struct Classifier {
    patterns: Vec<(Shape, Regex, Groups)>,
}

impl Classifier {
    /// Compile the pattern table
    pub fn new() -> Result<Self, String> {
        let patterns = PATTERN_TABLE
            .iter()
            .map(|&(shape, pattern, groups)| {
                Regex::new(pattern)
                    .map(|re| (shape, re, groups))
                    .map_err(|e| format!("Invalid pattern for {:?}: {}", shape, e))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { patterns })
    }

    /// Classify `fragment` into the first matching shape
    pub fn classify(&self, fragment: &str) -> ResolvedQuery {
        for (shape, regex, groups) in &self.patterns {
            if let Some(caps) = regex.captures(fragment) {
                let query = decompose(*shape, *groups, &caps);
                trace!(target: "mee::completion::classifier", fragment, ?query, "Classified");
                return query;
            }
        }
        trace!(target: "mee::completion::classifier", fragment, "No structured receiver");
        ResolvedQuery::unstructured(fragment)
    }

    /// Shapes in the order they are tried
    pub fn shapes(&self) -> impl Iterator<Item = Shape> + '_ {
        self.patterns.iter().map(|(shape, _, _)| *shape)
    }
}

fn decompose(shape: Shape, groups: Groups, caps: &Captures<'_>) -> ResolvedQuery {
    let group = |i: usize| caps.get(i).map_or("", |m| m.as_str());

    match groups {
        Groups::ReceiverDotMessage => ResolvedQuery::new(shape, group(1), Separator::Dot, group(2)),
        Groups::ReceiverColonMessage => {
            ResolvedQuery::new(shape, group(1), Separator::DoubleColon, group(2))
        }
        Groups::ReceiverSepMessage => ResolvedQuery::new(
            shape,
            group(1),
            Separator::from_token(group(2)),
            group(3),
        ),
        Groups::Message => ResolvedQuery::new(shape, "", Separator::None, group(1)),
        Groups::RootConstant => {
            ResolvedQuery::new(shape, group(1), Separator::DoubleColon, group(1))
        }
        Groups::DotMessage => ResolvedQuery::new(shape, "", Separator::Dot, group(1)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classify(fragment: &str) -> ResolvedQuery {
        Classifier::new().unwrap().classify(fragment)
    }

    fn assert_query(fragment: &str, shape: Shape, receiver: &str, sep: Separator, prefix: &str) {
        let query = classify(fragment);
        assert_eq!(
            query,
            ResolvedQuery::new(shape, receiver, sep, prefix),
            "fragment {:?}",
            fragment
        );
    }

    #[test]
    fn test_pattern_table_compiles_in_order() {
        let classifier = Classifier::new().unwrap();
        let shapes: Vec<Shape> = classifier.shapes().collect();
        assert_eq!(shapes.len(), 13);
        assert_eq!(shapes[0], Shape::StringLiteralReceiver);
        assert_eq!(shapes[12], Shape::UnknownDotCompletion);
    }

    #[test]
    fn test_string_literals() {
        assert_query(r#""abc".up"#, Shape::StringLiteralReceiver, r#""abc""#, Separator::Dot, "up");
        assert_query(r#""".up"#, Shape::StringLiteralReceiver, r#""""#, Separator::Dot, "up");
        assert_query("'x'.", Shape::StringLiteralReceiver, "'x'", Separator::Dot, "");
        assert_query("`ls`.sp", Shape::StringLiteralReceiver, "`ls`", Separator::Dot, "sp");
    }

    #[test]
    fn test_string_literal_requires_matching_quotes() {
        // Opening and closing quotes differ: not a string literal receiver
        let query = classify(r#""abc'.up"#);
        assert_ne!(query.shape, Shape::StringLiteralReceiver);
    }

    #[test]
    fn test_string_literal_greedy_receiver() {
        assert_query(
            r#""a" + "b".len"#,
            Shape::StringLiteralReceiver,
            r#""a" + "b""#,
            Separator::Dot,
            "len",
        );
    }

    #[test]
    fn test_regexp_array_hash_literals() {
        assert_query("/ab+/.ma", Shape::RegexLiteralReceiver, "/ab+/", Separator::Dot, "ma");
        assert_query("[1, 2].fi", Shape::ArrayLiteralReceiver, "[1, 2]", Separator::Dot, "fi");
        assert_query("{a: 1}.ke", Shape::HashOrBlockReceiver, "{a: 1}", Separator::Dot, "ke");
        assert_query("{}.", Shape::HashOrBlockReceiver, "{}", Separator::Dot, "");
    }

    #[test]
    fn test_symbols() {
        assert_query(":sy", Shape::BareSymbol, "", Separator::None, "sy");
        assert_query(":", Shape::BareSymbol, "", Separator::None, "");
        assert_query(":sym.to", Shape::SymbolReceiver, ":sym", Separator::Dot, "to");
        assert_query(":sym::to", Shape::SymbolReceiver, ":sym", Separator::DoubleColon, "to");
    }

    #[test]
    fn test_constant_paths() {
        assert_query("::Str", Shape::AbsoluteConstantPath, "Str", Separator::DoubleColon, "Str");
        assert_query("Math::P", Shape::QualifiedConstantPath, "Math", Separator::DoubleColon, "P");
        assert_query("A::B::", Shape::QualifiedConstantPath, "A::B", Separator::DoubleColon, "");
    }

    #[test]
    fn test_numeric_receivers() {
        assert_query("1.ti", Shape::NumericReceiverDecimal, "1", Separator::Dot, "ti");
        assert_query("1.5.fl", Shape::NumericReceiverDecimal, "1.5", Separator::Dot, "fl");
        assert_query("-2r.nu", Shape::NumericReceiverDecimal, "-2r", Separator::Dot, "nu");
        assert_query("3i.re", Shape::NumericReceiverDecimal, "3i", Separator::Dot, "re");
        assert_query("1e5.to", Shape::NumericReceiverDecimal, "1e5", Separator::Dot, "to");
        assert_query("0b101.to", Shape::NumericReceiverDecimal, "0b101", Separator::Dot, "to");
        assert_query("1_000::ab", Shape::NumericReceiverDecimal, "1_000", Separator::DoubleColon, "ab");
        assert_query("0xff.to", Shape::NumericReceiverHex, "0xff", Separator::Dot, "to");
        assert_query("-0x1F.ab", Shape::NumericReceiverHex, "-0x1F", Separator::Dot, "ab");
    }

    #[test]
    fn test_numeric_trailing_digits_are_the_message() {
        // `1.5` alone: the fraction is read as the message being typed
        assert_query("1.5", Shape::NumericReceiverDecimal, "1", Separator::Dot, "5");
    }

    #[test]
    fn test_global_variables() {
        assert_query("$std", Shape::GlobalVariable, "", Separator::None, "$std");
        assert_query("$", Shape::GlobalVariable, "", Separator::None, "$");
    }

    #[test]
    fn test_generic_receivers() {
        assert_query("arr.fir", Shape::GenericReceiver, "arr", Separator::Dot, "fir");
        assert_query("foo.bar.ba", Shape::GenericReceiver, "foo.bar", Separator::Dot, "ba");
        assert_query("@x.to", Shape::GenericReceiver, "@x", Separator::Dot, "to");
        assert_query("$stdout.pu", Shape::GenericReceiver, "$stdout", Separator::Dot, "pu");
        assert_query("obj::meth", Shape::GenericReceiver, "obj", Separator::DoubleColon, "meth");
    }

    #[test]
    fn test_array_pattern_wins_over_generic() {
        // Anything ending in `].` is taken for an array literal
        assert_query("arr[0].fo", Shape::ArrayLiteralReceiver, "arr[0]", Separator::Dot, "fo");
    }

    #[test]
    fn test_unknown_dot_and_fallthrough() {
        assert_query(".up", Shape::UnknownDotCompletion, "", Separator::Dot, "up");
        assert_query("", Shape::NoStructuredReceiver, "", Separator::None, "");
        assert_query("pu", Shape::NoStructuredReceiver, "", Separator::None, "pu");
        assert_query("::", Shape::NoStructuredReceiver, "", Separator::None, "::");
    }

    #[test]
    fn test_receiver_invariant() {
        for fragment in [
            r#""s".x"#, "/r/.x", "[].x", "{}.x", ":s", "::S", "A::x", ":s.x", "1.x",
            "0x1.x", "$g", "a.x", ".x", "x",
        ] {
            let query = classify(fragment);
            assert_eq!(
                !query.receiver.is_empty(),
                query.shape.has_receiver(),
                "fragment {:?} -> {:?}",
                fragment,
                query
            );
        }
    }
}
