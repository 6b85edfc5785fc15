//! Classified shapes of an input fragment

use std::fmt;

/// Syntactic shape of a fragment, in classification priority order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Shape {
    /// `"abc".up`
    StringLiteralReceiver,
    /// `/ab/.ma`
    RegexLiteralReceiver,
    /// `[1, 2].fi`
    ArrayLiteralReceiver,
    /// `{ a: 1 }.ke` (hash or block, the literal is ambiguous)
    HashOrBlockReceiver,
    /// `:sy`
    BareSymbol,
    /// `::Str`
    AbsoluteConstantPath,
    /// `Math::P`
    QualifiedConstantPath,
    /// `:sym.to`
    SymbolReceiver,
    /// `1.5.fl`, `-2r.nu`, `0b101.to`
    NumericReceiverDecimal,
    /// `0xff.to`
    NumericReceiverHex,
    /// `$std`
    GlobalVariable,
    /// `arr.fir`, `foo.bar.ba`, `Foo::bar`
    GenericReceiver,
    /// `.up`
    UnknownDotCompletion,
    /// Anything else: bare identifier completion
    NoStructuredReceiver,
}

impl Shape {
    /// Whether a fragment of this shape has an empty receiver
    pub fn has_receiver(self) -> bool {
        !matches!(
            self,
            Shape::BareSymbol
                | Shape::GlobalVariable
                | Shape::UnknownDotCompletion
                | Shape::NoStructuredReceiver
        )
    }
}

/// Token between receiver and message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Separator {
    Dot,
    DoubleColon,
    None,
}

impl Separator {
    pub fn as_str(self) -> &'static str {
        match self {
            Separator::Dot => ".",
            Separator::DoubleColon => "::",
            Separator::None => "",
        }
    }

    /// Parse a matched separator token
    pub fn from_token(token: &str) -> Self {
        match token {
            "." => Separator::Dot,
            "::" => Separator::DoubleColon,
            _ => Separator::None,
        }
    }
}

impl fmt::Display for Separator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of classifying a fragment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedQuery {
    pub shape: Shape,
    /// Text the completion is requested on (`arr` in `arr.fir`)
    pub receiver: String,
    pub separator: Separator,
    /// Text candidates are filtered by
    pub prefix: String,
}

impl ResolvedQuery {
    pub fn new(shape: Shape, receiver: &str, separator: Separator, prefix: &str) -> Self {
        Self {
            shape,
            receiver: receiver.to_string(),
            separator,
            prefix: prefix.to_string(),
        }
    }

    /// Catch-all query completing `fragment` against the whole scope
    pub fn unstructured(fragment: &str) -> Self {
        Self::new(Shape::NoStructuredReceiver, "", Separator::None, fragment)
    }
}
