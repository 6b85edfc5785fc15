//! Expression evaluator for the registry scope
//!
//! Understands just enough of the console language to resolve completion
//! receivers and to make the console usable:
//! - literals: numbers (`0x`/`0b`/`0o`/`0d`, `_`, exponents, `r`/`i`
//!   suffixes), strings, symbols, regexps, arrays, hashes
//! - `nil`, `true`, `false`, `self`
//! - locals, `@ivars`, `$globals`, constants and `A::B` paths
//! - assignment to locals, ivars and globals
//! - `Type.new` and `expr.class`
//!
//! Anything else evaluates to [`EvalError::Unsupported`].

use tracing::trace;

use super::registry::{RegistryScope, TypeKind};
use super::value::Value;
use super::{EvalError, Scope};

/// Evaluate `input` against `scope`
pub(crate) fn evaluate(scope: &RegistryScope, input: &str) -> Result<Value, EvalError> {
    let expr = input.trim();
    trace!(target: "mee::scope::eval", expr, "Evaluating");

    if expr.is_empty() {
        return Ok(Value::Nil);
    }

    if let Some((target, rhs)) = split_assignment(expr) {
        let value = evaluate(scope, rhs)?;
        assign(scope, target, value.clone())?;
        return Ok(value);
    }

    eval_expr(scope, expr)
}

fn assign(scope: &RegistryScope, target: &str, value: Value) -> Result<(), EvalError> {
    if let Some(name) = target.strip_prefix('$') {
        if is_identifier(name) {
            scope.set_global(target, value);
            return Ok(());
        }
    } else if let Some(name) = target.strip_prefix('@') {
        if is_identifier(name) {
            scope.set_instance_variable(target, value);
            return Ok(());
        }
    } else if is_local_name(target) {
        scope.set_local(target, value);
        return Ok(());
    }
    Err(EvalError::Unsupported(format!("{} = ...", target)))
}

fn eval_expr(scope: &RegistryScope, expr: &str) -> Result<Value, EvalError> {
    let expr = expr.trim();

    if let Some(value) = parse_number(expr) {
        return Ok(value);
    }

    // Message send: split on the last top-level `.` that starts a name
    if let Some(pos) = last_message_dot(expr) {
        let receiver = &expr[..pos];
        let message = &expr[pos + 1..];
        let value = eval_expr(scope, receiver)?;
        return send(scope, value, message);
    }

    // Constant path: `A::B`, `::A`
    if let Some(pos) = last_top_level(expr, "::") {
        let namespace = &expr[..pos];
        let name = &expr[pos + 2..];
        if namespace.trim().is_empty() {
            return scope.resolve_constant("", name.trim());
        }
        let value = eval_expr(scope, namespace)?;
        return match value {
            Value::Type { path, .. } if starts_uppercase(name) => {
                scope.resolve_constant(&path, name.trim())
            }
            Value::Type { .. } => send(scope, value, name),
            _ => Err(EvalError::NotANamespace(namespace.trim().to_string())),
        };
    }

    eval_atom(scope, expr)
}

fn send(scope: &RegistryScope, receiver: Value, message: &str) -> Result<Value, EvalError> {
    let name = message.split('(').next().unwrap_or(message).trim();

    match (&receiver, name) {
        (Value::Type { path, kind: TypeKind::Class }, "new") => Ok(Value::Object {
            class: path.clone(),
            repr: format!("#<{}>", path),
        }),
        (_, "class") => {
            let class = receiver.class_name().to_string();
            let kind = scope
                .lookup_type(&class)
                .map(|ty| ty.kind)
                .unwrap_or(TypeKind::Class);
            Ok(Value::Type { path: class, kind })
        }
        _ if scope.methods_of(&receiver).iter().any(|m| m == name) => Err(
            EvalError::Unsupported(format!("{}.{}", scope.inspect(&receiver), message.trim())),
        ),
        _ => Err(EvalError::NoMethod(
            receiver.class_name().to_string(),
            name.to_string(),
        )),
    }
}

fn eval_atom(scope: &RegistryScope, expr: &str) -> Result<Value, EvalError> {
    match expr {
        "nil" => return Ok(Value::Nil),
        "true" => return Ok(Value::Bool(true)),
        "false" => return Ok(Value::Bool(false)),
        "self" => {
            return Ok(Value::Object {
                class: "Object".to_string(),
                repr: "main".to_string(),
            })
        }
        _ => {}
    }

    if let Some(inner) = delimited(expr, '(', ')') {
        return evaluate(scope, inner);
    }
    if let Some(inner) = delimited(expr, '"', '"') {
        return Ok(Value::Str(unescape(inner)));
    }
    if let Some(inner) = delimited(expr, '\'', '\'') {
        return Ok(Value::Str(inner.to_string()));
    }
    if expr.starts_with('`') {
        return Err(EvalError::Unsupported(expr.to_string()));
    }
    if let Some(inner) = delimited(expr, '[', ']') {
        let items = split_top_level(inner, ',')
            .into_iter()
            .filter(|item| !item.trim().is_empty())
            .map(|item| evaluate(scope, item))
            .collect::<Result<Vec<_>, _>>()?;
        return Ok(Value::Array(items));
    }
    if let Some(inner) = delimited(expr, '{', '}') {
        return eval_hash(scope, inner);
    }
    if let Some(rest) = expr.strip_prefix('/') {
        if let Some(end) = rest.rfind('/') {
            let flags = &rest[end + 1..];
            if flags.chars().all(|c| matches!(c, 'i' | 'm' | 'x' | 'o')) {
                return Ok(Value::Regexp(rest[..end].to_string()));
            }
        }
        return Err(EvalError::Syntax(format!("unterminated regexp: {}", expr)));
    }
    if let Some(name) = expr.strip_prefix(':') {
        let name = delimited(name, '"', '"').unwrap_or(name);
        if name.is_empty() {
            return Err(EvalError::Syntax("empty symbol".to_string()));
        }
        scope.intern_symbol(name);
        return Ok(Value::Symbol(name.to_string()));
    }
    if let Some(name) = expr.strip_prefix('$') {
        if !name.is_empty() {
            return Ok(scope.global(expr).unwrap_or(Value::Nil));
        }
    }
    if let Some(name) = expr.strip_prefix('@') {
        if is_identifier(name) {
            return Ok(scope.instance_variable(expr).unwrap_or(Value::Nil));
        }
    }
    if starts_uppercase(expr) && is_identifier(expr) {
        return scope.resolve_constant("", expr);
    }
    if is_local_name(expr) {
        if let Some(value) = scope.local(expr) {
            return Ok(value);
        }
        let callable = scope.methods().iter().any(|m| m == expr)
            || scope.private_methods().iter().any(|m| m == expr);
        return Err(if callable {
            EvalError::Unsupported(expr.to_string())
        } else {
            EvalError::UndefinedName(expr.to_string())
        });
    }

    Err(EvalError::Syntax(format!("unexpected '{}'", expr)))
}

fn eval_hash(scope: &RegistryScope, inner: &str) -> Result<Value, EvalError> {
    let mut pairs = Vec::new();
    for entry in split_top_level(inner, ',') {
        let entry = entry.trim();
        if entry.is_empty() {
            continue;
        }
        if let Some(pos) = first_top_level(entry, "=>") {
            let key = evaluate(scope, &entry[..pos])?;
            let value = evaluate(scope, &entry[pos + 2..])?;
            pairs.push((key, value));
            continue;
        }
        match entry.split_once(':') {
            Some((key, value)) if is_identifier(key.trim()) => {
                let key = key.trim();
                scope.intern_symbol(key);
                pairs.push((Value::Symbol(key.to_string()), evaluate(scope, value)?));
            }
            // Not a hash entry, most likely a block body
            _ => return Err(EvalError::Unsupported(format!("{{{}}}", inner))),
        }
    }
    Ok(Value::Hash(pairs))
}

/// Parse a numeric literal, `None` when `text` is not one
pub(crate) fn parse_number(text: &str) -> Option<Value> {
    let (negative, body) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text),
    };
    if !body.starts_with(|c: char| c.is_ascii_digit()) {
        return None;
    }

    if let Some(rest) = body.strip_suffix('r') {
        let value = parse_number(rest)?;
        let repr = match value {
            Value::Integer(n) if negative => format!("(-{}/1)", n),
            Value::Integer(n) => format!("({}/1)", n),
            Value::Float(x) => format!("({}/1)", if negative { -x } else { x }),
            _ => return None,
        };
        return Some(Value::Object {
            class: "Rational".to_string(),
            repr,
        });
    }
    if let Some(rest) = body.strip_suffix('i') {
        let value = parse_number(rest)?;
        let sign = if negative { "-" } else { "+" };
        return Some(Value::Object {
            class: "Complex".to_string(),
            repr: format!("(0{}{}i)", sign, value),
        });
    }

    let digits: String = body.chars().filter(|&c| c != '_').collect();
    let radix_digits = [("0x", 16), ("0b", 2), ("0o", 8), ("0d", 10)]
        .into_iter()
        .find_map(|(prefix, radix)| digits.strip_prefix(prefix).map(|d| (d, radix)));

    let magnitude = match radix_digits {
        Some((d, radix)) => Value::Integer(i64::from_str_radix(d, radix).ok()?),
        None if digits.contains(['.', 'e', 'E']) => Value::Float(digits.parse().ok()?),
        None => Value::Integer(digits.parse().ok()?),
    };

    Some(match magnitude {
        Value::Integer(n) if negative => Value::Integer(-n),
        Value::Float(x) if negative => Value::Float(-x),
        other => other,
    })
}

fn unescape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('0') => out.push('\0'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}

fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_alphanumeric() || c == '_')
}

fn is_local_name(s: &str) -> bool {
    is_identifier(s) && !starts_uppercase(s)
}

fn starts_uppercase(s: &str) -> bool {
    s.trim_start().starts_with(|c: char| c.is_uppercase())
}

/// Inner text of `expr` when it is wrapped in `open`/`close` as a whole
fn delimited(expr: &str, open: char, close: char) -> Option<&str> {
    if expr.len() < 2 || !expr.starts_with(open) || !expr.ends_with(close) {
        return None;
    }
    // `(a) + (b)` starts and ends with parens without being one group
    let closing = scan(expr).find(|&(i, c, depth)| i > 0 && depth == 0 && c == close)?;
    (closing.0 == expr.len() - close.len_utf8()).then(|| &expr[1..expr.len() - 1])
}

/// Walk `expr` yielding `(byte offset, char, depth after the char)` for every
/// character outside string and regexp literals.
fn scan(expr: &str) -> impl Iterator<Item = (usize, char, usize)> + '_ {
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut escaped = false;
    let mut prev_significant: Option<char> = None;

    expr.char_indices().filter_map(move |(i, c)| {
        if let Some(q) = quote {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == q {
                quote = None;
                prev_significant = Some(c);
                // Closing delimiter of a literal counts as a top-level char
                return Some((i, c, depth));
            }
            return None;
        }

        let opens_regexp = c == '/'
            && prev_significant.map_or(true, |p| "([{,=|&!;".contains(p));
        match c {
            '"' | '\'' | '`' => quote = Some(c),
            '/' if opens_regexp => quote = Some('/'),
            '(' | '[' | '{' => depth += 1,
            ')' | ']' | '}' => depth = depth.saturating_sub(1),
            _ => {}
        }
        if !c.is_whitespace() {
            prev_significant = Some(c);
        }
        let reported = match c {
            '(' | '[' | '{' => depth - 1,
            _ => depth,
        };
        Some((i, c, reported))
    })
}

fn split_top_level(expr: &str, sep: char) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut start = 0;
    for (i, c, depth) in scan(expr) {
        if c == sep && depth == 0 {
            parts.push(&expr[start..i]);
            start = i + sep.len_utf8();
        }
    }
    parts.push(&expr[start..]);
    parts
}

fn top_level_positions<'a>(expr: &'a str, pat: &'a str) -> impl Iterator<Item = usize> + 'a {
    scan(expr)
        .filter(|&(_, _, depth)| depth == 0)
        .map(|(i, _, _)| i)
        .filter(move |&i| expr[i..].starts_with(pat))
}

fn first_top_level(expr: &str, pat: &str) -> Option<usize> {
    top_level_positions(expr, pat).next()
}

fn last_top_level(expr: &str, pat: &str) -> Option<usize> {
    top_level_positions(expr, pat).last()
}

/// Position of the last top-level `.` followed by a message name
fn last_message_dot(expr: &str) -> Option<usize> {
    top_level_positions(expr, ".").filter(|&i| {
        i > 0
            && !expr[..i].ends_with('.')
            && expr[i + 1..].starts_with(|c: char| c.is_alphabetic() || c == '_')
    })
    .last()
}

/// Split `target = value`, ignoring `==`, `=~`, `=>`, `<=`, `>=` and `!=`
fn split_assignment(expr: &str) -> Option<(&str, &str)> {
    let bytes = expr.as_bytes();
    let pos = top_level_positions(expr, "=").find(|&i| {
        let prev = i.checked_sub(1).map(|p| bytes[p]);
        let next = bytes.get(i + 1).copied();
        !matches!(prev, Some(b'=' | b'!' | b'<' | b'>'))
            && !matches!(next, Some(b'=' | b'~' | b'>'))
    })?;

    let target = expr[..pos].trim();
    let valid = match target.as_bytes().first() {
        Some(b'$') | Some(b'@') => is_identifier(&target[1..]),
        _ => is_local_name(target),
    };
    valid.then(|| (target, &expr[pos + 1..]))
}
