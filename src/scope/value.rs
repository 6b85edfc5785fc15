//! Runtime values of the registry scope

use std::fmt;

use super::registry::TypeKind;

/// A value produced by evaluating an expression in a [`super::RegistryScope`]
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Nil,
    Bool(bool),
    Integer(i64),
    Float(f64),
    Str(String),
    Symbol(String),
    Array(Vec<Value>),
    Hash(Vec<(Value, Value)>),
    /// Regexp source without the delimiting slashes
    Regexp(String),
    /// A class or module, by full constant path
    Type { path: String, kind: TypeKind },
    /// Any other object: its class name and display form
    Object { class: String, repr: String },
}

impl Value {
    /// Name of the class this value is an instance of
    pub fn class_name(&self) -> &str {
        match self {
            Value::Nil => "NilClass",
            Value::Bool(true) => "TrueClass",
            Value::Bool(false) => "FalseClass",
            Value::Integer(_) => "Integer",
            Value::Float(_) => "Float",
            Value::Str(_) => "String",
            Value::Symbol(_) => "Symbol",
            Value::Array(_) => "Array",
            Value::Hash(_) => "Hash",
            Value::Regexp(_) => "Regexp",
            Value::Type { kind: TypeKind::Class, .. } => "Class",
            Value::Type { kind: TypeKind::Module, .. } => "Module",
            Value::Object { class, .. } => class,
        }
    }

    /// Whether this value can hold constants
    pub fn is_namespace(&self) -> bool {
        matches!(self, Value::Type { .. })
    }

    /// Ruby-style `to_s` rendering. Strings and symbols lose their quoting
    /// and `nil` renders empty; containers render like `inspect`.
    pub fn to_s(&self) -> String {
        match self {
            Value::Nil => String::new(),
            Value::Str(s) => s.clone(),
            Value::Symbol(name) => name.clone(),
            Value::Regexp(source) => format!("(?-mix:{})", source),
            other => other.to_string(),
        }
    }
}

fn write_seq<'a, I>(f: &mut fmt::Formatter<'_>, items: I) -> fmt::Result
where
    I: IntoIterator<Item = &'a Value>,
{
    for (i, item) in items.into_iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{}", item)?;
    }
    Ok(())
}

fn is_plain_symbol(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Ruby-style `inspect` rendering
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Nil => f.write_str("nil"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Integer(n) => write!(f, "{}", n),
            Value::Float(x) if x.is_infinite() => {
                f.write_str(if *x > 0.0 { "Infinity" } else { "-Infinity" })
            }
            Value::Float(x) if x.is_nan() => f.write_str("NaN"),
            Value::Float(x) => write!(f, "{:?}", x),
            Value::Str(s) => write!(f, "{:?}", s),
            Value::Symbol(name) if is_plain_symbol(name) => write!(f, ":{}", name),
            Value::Symbol(name) => write!(f, ":{:?}", name),
            Value::Array(items) => {
                f.write_str("[")?;
                write_seq(f, items)?;
                f.write_str("]")
            }
            Value::Hash(pairs) => {
                f.write_str("{")?;
                for (i, (key, value)) in pairs.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    match key {
                        Value::Symbol(name) if is_plain_symbol(name) => {
                            write!(f, "{}: {}", name, value)?
                        }
                        _ => write!(f, "{} => {}", key, value)?,
                    }
                }
                f.write_str("}")
            }
            Value::Regexp(source) => write!(f, "/{}/", source),
            Value::Type { path, .. } => f.write_str(path),
            Value::Object { repr, .. } => f.write_str(repr),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_class_names() {
        assert_eq!(Value::Nil.class_name(), "NilClass");
        assert_eq!(Value::Bool(true).class_name(), "TrueClass");
        assert_eq!(Value::Array(vec![]).class_name(), "Array");
        let module = Value::Type {
            path: "Math".to_string(),
            kind: TypeKind::Module,
        };
        assert_eq!(module.class_name(), "Module");
        assert!(module.is_namespace());
        assert!(!Value::Integer(1).is_namespace());
    }

    #[test]
    fn test_to_s_drops_quoting() {
        assert_eq!(Value::Str("abc".to_string()).to_s(), "abc");
        assert_eq!(Value::Symbol("sym".to_string()).to_s(), "sym");
        assert_eq!(Value::Nil.to_s(), "");
        assert_eq!(Value::Integer(7).to_s(), "7");
        assert_eq!(Value::Regexp("a+".to_string()).to_s(), "(?-mix:a+)");
        let array = Value::Array(vec![Value::Str("x".to_string()), Value::Nil]);
        assert_eq!(array.to_s(), "[\"x\", nil]");
    }

    #[test]
    fn test_inspect_nested() {
        let value = Value::Array(vec![
            Value::Integer(1),
            Value::Str("two".to_string()),
            Value::Symbol("three".to_string()),
            Value::Float(4.0),
        ]);
        assert_eq!(value.to_string(), r#"[1, "two", :three, 4.0]"#);
    }

    #[test]
    fn test_inspect_hash() {
        let value = Value::Hash(vec![
            (Value::Symbol("a".to_string()), Value::Integer(1)),
            (Value::Str("b".to_string()), Value::Nil),
        ]);
        assert_eq!(value.to_string(), r#"{a: 1, "b" => nil}"#);
    }

    #[test]
    fn test_inspect_odd_symbol() {
        assert_eq!(Value::Symbol("foo bar".to_string()).to_string(), r#":"foo bar""#);
        assert_eq!(Value::Regexp("a.b".to_string()).to_string(), "/a.b/");
    }
}
