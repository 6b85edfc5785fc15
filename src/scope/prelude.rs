//! Built-in types, globals and constants loaded into every registry scope

use super::registry::{RegistryScope, TypeDef};
use super::value::Value;

const BASIC_OBJECT_METHODS: &[&str] = &[
    "!", "!=", "==", "__id__", "__send__", "equal?", "instance_eval", "instance_exec",
];

const KERNEL_METHODS: &[&str] = &[
    "!~", "<=>", "===", "class", "clone", "define_singleton_method", "display", "dup",
    "enum_for", "eql?", "extend", "freeze", "frozen?", "hash", "inspect", "instance_of?",
    "instance_variable_defined?", "instance_variable_get", "instance_variable_set",
    "instance_variables", "is_a?", "itself", "kind_of?", "method", "methods", "nil?",
    "object_id", "private_methods", "protected_methods", "public_method", "public_methods",
    "public_send", "remove_instance_variable", "respond_to?", "send", "singleton_class",
    "singleton_method", "singleton_methods", "tap", "then", "to_enum", "to_s", "yield_self",
];

const KERNEL_PRIVATE_METHODS: &[&str] = &[
    "Array", "Complex", "Float", "Hash", "Integer", "Rational", "String", "__dir__",
    "__method__", "abort", "at_exit", "autoload", "binding", "block_given?", "caller",
    "catch", "eval", "exit", "exit!", "fail", "format", "gets", "global_variables",
    "lambda", "load", "local_variables", "loop", "p", "pp", "print", "printf", "proc",
    "putc", "puts", "raise", "rand", "readline", "readlines", "require", "require_relative",
    "select", "sleep", "spawn", "sprintf", "srand", "system", "throw", "trap", "warn",
];

const COMPARABLE_METHODS: &[&str] = &["<", "<=", "==", ">", ">=", "between?", "clamp"];

const ENUMERABLE_METHODS: &[&str] = &[
    "all?", "any?", "chain", "chunk", "chunk_while", "collect", "collect_concat", "compact",
    "count", "cycle", "detect", "drop", "drop_while", "each_cons", "each_entry",
    "each_slice", "each_with_index", "each_with_object", "entries", "filter", "filter_map",
    "find", "find_all", "find_index", "first", "flat_map", "grep", "grep_v", "group_by",
    "include?", "inject", "lazy", "map", "max", "max_by", "member?", "min", "min_by",
    "minmax", "minmax_by", "none?", "one?", "partition", "reduce", "reject",
    "reverse_each", "select", "slice_after", "slice_before", "slice_when", "sort",
    "sort_by", "sum", "take", "take_while", "tally", "to_a", "to_h", "to_set", "uniq",
    "zip",
];

const MODULE_METHODS: &[&str] = &[
    "<", "<=", "<=>", "==", "===", ">", ">=", "alias_method", "ancestors", "attr",
    "attr_accessor", "attr_reader", "attr_writer", "autoload", "class_eval", "class_exec",
    "class_variable_defined?", "class_variable_get", "class_variable_set",
    "class_variables", "const_defined?", "const_get", "const_missing", "const_set",
    "const_source_location", "constants", "define_method", "freeze", "include",
    "include?", "included_modules", "inspect", "instance_method", "instance_methods",
    "method_defined?", "module_eval", "module_exec", "name", "prepend",
    "private_class_method", "private_constant", "private_instance_methods",
    "private_method_defined?", "protected_instance_methods", "protected_method_defined?",
    "public_class_method", "public_instance_method", "public_instance_methods",
    "public_method_defined?", "remove_class_variable", "remove_method", "to_s",
    "undef_method",
];

const CLASS_METHODS: &[&str] = &["allocate", "attached_object", "new", "subclasses", "superclass"];

const NIL_METHODS: &[&str] = &[
    "&", "===", "=~", "^", "inspect", "nil?", "rationalize", "to_a", "to_c", "to_f", "to_h",
    "to_i", "to_r", "to_s", "|",
];

const BOOL_METHODS: &[&str] = &["&", "===", "^", "inspect", "to_s", "|"];

const NUMERIC_METHODS: &[&str] = &[
    "%", "+@", "-@", "<=>", "abs", "abs2", "angle", "arg", "ceil", "coerce", "conj",
    "conjugate", "denominator", "div", "divmod", "eql?", "fdiv", "finite?", "floor", "i",
    "imag", "imaginary", "infinite?", "integer?", "magnitude", "modulo", "negative?",
    "nonzero?", "numerator", "phase", "polar", "positive?", "quo", "real", "real?",
    "rect", "rectangular", "remainder", "round", "step", "to_c", "to_int", "truncate",
    "zero?",
];

const INTEGER_METHODS: &[&str] = &[
    "%", "&", "*", "**", "+", "-", "/", "<", "<<", "<=", "<=>", "==", "===", ">", ">=",
    ">>", "[]", "^", "abs", "allbits?", "anybits?", "bit_length", "ceil", "ceildiv", "chr",
    "digits", "div", "divmod", "downto", "even?", "fdiv", "floor", "gcd", "gcdlcm",
    "inspect", "integer?", "lcm", "magnitude", "modulo", "next", "nobits?", "odd?", "ord",
    "pow", "pred", "rationalize", "remainder", "round", "size", "succ", "times", "to_f",
    "to_i", "to_int", "to_r", "to_s", "truncate", "upto", "zero?", "|", "~",
];

const FLOAT_METHODS: &[&str] = &[
    "%", "*", "**", "+", "-", "/", "<", "<=", "<=>", "==", "===", ">", ">=", "abs", "ceil",
    "coerce", "divmod", "eql?", "fdiv", "finite?", "floor", "infinite?", "inspect",
    "magnitude", "modulo", "nan?", "next_float", "prev_float", "quo", "rationalize",
    "round", "to_f", "to_i", "to_int", "to_r", "to_s", "truncate", "zero?",
];

const FLOAT_CONSTANTS: &[&str] = &[
    "DIG", "EPSILON", "INFINITY", "MANT_DIG", "MAX", "MAX_10_EXP", "MAX_EXP", "MIN",
    "MIN_10_EXP", "MIN_EXP", "NAN", "RADIX",
];

const RATIONAL_METHODS: &[&str] = &[
    "*", "**", "+", "-", "/", "<=>", "==", "abs", "ceil", "denominator", "fdiv", "floor",
    "inspect", "magnitude", "negative?", "numerator", "positive?", "quo", "rationalize",
    "round", "to_f", "to_i", "to_r", "to_s", "truncate", "zero?",
];

const COMPLEX_METHODS: &[&str] = &[
    "*", "**", "+", "-", "/", "<=>", "==", "abs", "abs2", "angle", "arg", "conj",
    "conjugate", "fdiv", "finite?", "imag", "imaginary", "infinite?", "inspect",
    "magnitude", "phase", "polar", "quo", "rationalize", "real", "real?", "rect",
    "rectangular", "to_c", "to_f", "to_i", "to_r", "to_s",
];

const STRING_METHODS: &[&str] = &[
    "%", "*", "+", "+@", "-@", "<<", "<=>", "==", "===", "=~", "[]", "[]=", "ascii_only?",
    "b", "between?", "bytes", "bytesize", "byteslice", "capitalize", "capitalize!",
    "casecmp", "casecmp?", "center", "chars", "chomp", "chomp!", "chop", "chop!", "chr",
    "codepoints", "concat", "count", "crypt", "delete", "delete!", "delete_prefix",
    "delete_prefix!", "delete_suffix", "delete_suffix!", "downcase", "downcase!", "dump",
    "each_byte", "each_char", "each_grapheme_cluster", "each_line", "empty?", "encode",
    "encoding", "end_with?", "eql?", "force_encoding", "freeze", "getbyte",
    "grapheme_clusters", "gsub", "gsub!", "hash", "hex", "include?", "index", "insert",
    "inspect", "intern", "length", "lines", "ljust", "lstrip", "lstrip!", "match",
    "match?", "next", "next!", "oct", "ord", "partition", "prepend", "replace", "reverse",
    "reverse!", "rindex", "rjust", "rpartition", "rstrip", "rstrip!", "scan", "scrub",
    "setbyte", "size", "slice", "slice!", "split", "squeeze", "squeeze!", "start_with?",
    "strip", "strip!", "sub", "sub!", "succ", "succ!", "sum", "swapcase", "swapcase!",
    "to_c", "to_f", "to_i", "to_r", "to_s", "to_str", "to_sym", "tr", "tr!", "tr_s",
    "unicode_normalize", "unpack", "unpack1", "upcase", "upcase!", "upto",
    "valid_encoding?",
];

const SYMBOL_METHODS: &[&str] = &[
    "<=>", "==", "===", "=~", "[]", "capitalize", "downcase", "empty?", "encoding",
    "end_with?", "id2name", "inspect", "length", "match", "match?", "name", "next",
    "size", "slice", "start_with?", "succ", "swapcase", "to_proc", "to_s", "to_sym",
    "upcase",
];

const ARRAY_METHODS: &[&str] = &[
    "&", "*", "+", "-", "<<", "<=>", "==", "[]", "[]=", "all?", "any?", "append", "assoc",
    "at", "bsearch", "bsearch_index", "clear", "collect", "collect!", "combination",
    "compact", "compact!", "concat", "count", "cycle", "delete", "delete_at", "delete_if",
    "difference", "dig", "drop", "drop_while", "each", "each_index", "each_slice",
    "empty?", "eql?", "fetch", "fill", "filter", "filter!", "filter_map", "find_index",
    "first", "flatten", "flatten!", "freeze", "hash", "include?", "index", "insert",
    "inspect", "intersect?", "intersection", "join", "keep_if", "last", "length", "map",
    "map!", "max", "min", "minmax", "none?", "one?", "pack", "permutation", "pop",
    "prepend", "product", "push", "rassoc", "reject", "reject!", "repeated_combination",
    "repeated_permutation", "replace", "reverse", "reverse!", "reverse_each", "rindex",
    "rotate", "rotate!", "sample", "select", "select!", "shift", "shuffle", "shuffle!",
    "size", "slice", "slice!", "sort", "sort!", "sort_by!", "sum", "take", "take_while",
    "to_a", "to_ary", "to_h", "transpose", "union", "uniq", "uniq!", "unshift",
    "values_at", "zip", "|",
];

const HASH_METHODS: &[&str] = &[
    "<", "<=", "==", ">", ">=", "[]", "[]=", "any?", "assoc", "clear", "compact",
    "compact!", "compare_by_identity", "count", "default", "default=", "default_proc",
    "delete", "delete_if", "dig", "each", "each_key", "each_pair", "each_value", "empty?",
    "eql?", "except", "fetch", "fetch_values", "filter", "filter!", "filter_map",
    "find", "flatten", "group_by", "has_key?", "has_value?", "hash", "include?", "inspect",
    "invert", "keep_if", "key", "key?", "keys", "length", "map", "member?", "merge",
    "merge!", "min_by", "rassoc", "rehash", "reject", "reject!", "replace", "select",
    "select!", "shift", "size", "slice", "sort_by", "store", "sum", "to_a", "to_h",
    "to_proc", "transform_keys", "transform_keys!", "transform_values",
    "transform_values!", "update", "value?", "values", "values_at",
];

const RANGE_METHODS: &[&str] = &[
    "%", "==", "===", "begin", "bsearch", "count", "cover?", "each", "end", "entries",
    "eql?", "exclude_end?", "first", "frozen?", "hash", "include?", "inspect", "last",
    "max", "member?", "min", "minmax", "overlap?", "size", "step", "sum", "to_a", "to_s",
];

const PROC_METHODS: &[&str] = &[
    "<<", "==", "===", ">>", "[]", "arity", "binding", "call", "curry", "eql?", "hash",
    "inspect", "lambda?", "parameters", "ruby2_keywords", "source_location", "to_proc",
    "yield",
];

const REGEXP_METHODS: &[&str] = &[
    "==", "===", "=~", "casefold?", "encoding", "eql?", "fixed_encoding?", "hash",
    "inspect", "match", "match?", "named_captures", "names", "options", "source",
    "timeout", "to_s", "~",
];

const REGEXP_SINGLETON_METHODS: &[&str] = &["compile", "escape", "last_match", "quote", "union"];

const IO_METHODS: &[&str] = &[
    "<<", "binmode", "close", "closed?", "each_line", "eof?", "fileno", "flush", "fsync",
    "getc", "gets", "print", "printf", "putc", "puts", "read", "readline", "readlines",
    "rewind", "seek", "sync", "sync=", "tell", "tty?", "write",
];

const MATH_FUNCTIONS: &[&str] = &[
    "acos", "acosh", "asin", "asinh", "atan", "atan2", "atanh", "cbrt", "cos", "cosh",
    "erf", "erfc", "exp", "frexp", "gamma", "hypot", "ldexp", "lgamma", "log", "log10",
    "log2", "sin", "sinh", "sqrt", "tan", "tanh",
];

const PROCESS_FUNCTIONS: &[&str] = &[
    "abort", "clock_gettime", "daemon", "detach", "exit", "fork", "getpgid", "kill", "pid",
    "ppid", "spawn", "wait", "wait2", "waitpid",
];

/// Globals defined at start-up, with the source of their initial value
const GLOBALS: &[(&str, &str)] = &[
    ("$stdout", "STDOUT"),
    ("$stderr", "STDERR"),
    ("$stdin", "STDIN"),
    ("$0", "\"mee\""),
    ("$PROGRAM_NAME", "\"mee\""),
    ("$LOAD_PATH", "[]"),
    ("$LOADED_FEATURES", "[]"),
    ("$DEBUG", "false"),
    ("$VERBOSE", "false"),
    ("$FILENAME", "\"-\""),
    ("$!", "nil"),
    ("$@", "nil"),
    ("$~", "nil"),
    ("$_", "nil"),
    ("$,", "nil"),
    ("$/", "\"\\n\""),
    ("$;", "nil"),
];

fn io_object(name: &str) -> Value {
    Value::Object {
        class: "IO".to_string(),
        repr: format!("#<IO:<{}>>", name),
    }
}

/// Load the built-in types, constants and globals into `scope`
pub fn install(scope: &mut RegistryScope) {
    scope.define_type(
        TypeDef::class("BasicObject")
            .with_superclass(None)
            .with_instance_methods(BASIC_OBJECT_METHODS),
    );
    scope.define_type(
        TypeDef::module("Kernel")
            .with_instance_methods(KERNEL_METHODS)
            .with_private_methods(KERNEL_PRIVATE_METHODS),
    );
    scope.define_type(
        TypeDef::class("Object")
            .with_superclass(Some("BasicObject"))
            .with_includes(&["Kernel"]),
    );
    scope.define_type(TypeDef::module("Comparable").with_instance_methods(COMPARABLE_METHODS));
    scope.define_type(TypeDef::module("Enumerable").with_instance_methods(ENUMERABLE_METHODS));
    scope.define_type(TypeDef::class("Module").with_instance_methods(MODULE_METHODS));
    scope.define_type(
        TypeDef::class("Class")
            .with_superclass(Some("Module"))
            .with_instance_methods(CLASS_METHODS),
    );
    scope.define_type(TypeDef::class("NilClass").with_instance_methods(NIL_METHODS));
    scope.define_type(TypeDef::class("TrueClass").with_instance_methods(BOOL_METHODS));
    scope.define_type(TypeDef::class("FalseClass").with_instance_methods(BOOL_METHODS));
    scope.define_type(
        TypeDef::class("Numeric")
            .with_includes(&["Comparable"])
            .with_instance_methods(NUMERIC_METHODS),
    );
    scope.define_type(
        TypeDef::class("Integer")
            .with_superclass(Some("Numeric"))
            .with_instance_methods(INTEGER_METHODS)
            .with_singleton_methods(&["sqrt", "try_convert"]),
    );
    scope.define_type(
        TypeDef::class("Float")
            .with_superclass(Some("Numeric"))
            .with_instance_methods(FLOAT_METHODS),
    );
    scope.define_type(
        TypeDef::class("Rational")
            .with_superclass(Some("Numeric"))
            .with_instance_methods(RATIONAL_METHODS),
    );
    scope.define_type(
        TypeDef::class("Complex")
            .with_superclass(Some("Numeric"))
            .with_instance_methods(COMPLEX_METHODS)
            .with_singleton_methods(&["polar", "rect", "rectangular"]),
    );
    scope.define_type(
        TypeDef::class("String")
            .with_includes(&["Comparable"])
            .with_instance_methods(STRING_METHODS)
            .with_singleton_methods(&["try_convert"]),
    );
    scope.define_type(
        TypeDef::class("Symbol")
            .with_includes(&["Comparable"])
            .with_instance_methods(SYMBOL_METHODS)
            .with_singleton_methods(&["all_symbols"]),
    );
    scope.define_type(
        TypeDef::class("Array")
            .with_includes(&["Enumerable"])
            .with_instance_methods(ARRAY_METHODS)
            .with_singleton_methods(&["try_convert"]),
    );
    scope.define_type(
        TypeDef::class("Hash")
            .with_includes(&["Enumerable"])
            .with_instance_methods(HASH_METHODS)
            .with_singleton_methods(&["ruby2_keywords_hash?", "try_convert"]),
    );
    scope.define_type(
        TypeDef::class("Range")
            .with_includes(&["Enumerable"])
            .with_instance_methods(RANGE_METHODS),
    );
    scope.define_type(TypeDef::class("Proc").with_instance_methods(PROC_METHODS));
    scope.define_type(
        TypeDef::class("Regexp")
            .with_instance_methods(REGEXP_METHODS)
            .with_singleton_methods(REGEXP_SINGLETON_METHODS)
            .with_constants(&["EXTENDED", "IGNORECASE", "MULTILINE"]),
    );
    scope.define_type(
        TypeDef::class("IO")
            .with_includes(&["Enumerable"])
            .with_instance_methods(IO_METHODS)
            .with_singleton_methods(&["binread", "foreach", "open", "pipe", "popen", "read", "readlines", "select", "write"]),
    );
    scope.define_type(TypeDef::module("Math").with_singleton_methods(MATH_FUNCTIONS));
    scope.define_type(TypeDef::class("StandardError"));
    scope.define_type(TypeDef::class("Math::DomainError").with_superclass(Some("StandardError")));
    scope.define_type(
        TypeDef::module("Process")
            .with_singleton_methods(PROCESS_FUNCTIONS)
            .with_constants(&["CLOCK_MONOTONIC", "CLOCK_REALTIME"]),
    );

    scope.define_constant("Math::PI", Value::Float(std::f64::consts::PI));
    scope.define_constant("Math::E", Value::Float(std::f64::consts::E));
    scope.define_constant("Float::INFINITY", Value::Float(f64::INFINITY));
    scope.define_constant("Float::NAN", Value::Float(f64::NAN));
    scope.define_constant("Float::EPSILON", Value::Float(f64::EPSILON));
    scope.define_constant("Float::MAX", Value::Float(f64::MAX));
    scope.define_constant("Float::MIN", Value::Float(f64::MIN_POSITIVE));
    scope.define_constant("Float::DIG", Value::Integer(f64::DIGITS as i64));
    scope.define_constant("Float::MANT_DIG", Value::Integer(f64::MANTISSA_DIGITS as i64));
    scope.define_constant("Float::RADIX", Value::Integer(f64::RADIX as i64));
    scope.define_constant("Process::CLOCK_MONOTONIC", Value::Integer(1));
    scope.define_constant("Process::CLOCK_REALTIME", Value::Integer(0));
    scope.define_constant("Regexp::IGNORECASE", Value::Integer(1));
    scope.define_constant("Regexp::EXTENDED", Value::Integer(2));
    scope.define_constant("Regexp::MULTILINE", Value::Integer(4));
    scope.define_type(TypeDef::class("Float").with_constants(FLOAT_CONSTANTS));

    scope.define_constant("RUBY_VERSION", Value::Str("3.3.0".to_string()));
    scope.define_constant(
        "RUBY_PLATFORM",
        Value::Str(format!("{}-{}", std::env::consts::ARCH, std::env::consts::OS)),
    );
    scope.define_constant("ARGV", Value::Array(Vec::new()));
    scope.define_constant(
        "ENV",
        Value::Object {
            class: "Object".to_string(),
            repr: "ENV".to_string(),
        },
    );
    scope.define_constant("STDOUT", io_object("STDOUT"));
    scope.define_constant("STDERR", io_object("STDERR"));
    scope.define_constant("STDIN", io_object("STDIN"));

    for (name, source) in GLOBALS {
        // Sources are literals or prelude constants; fall back to nil regardless
        let value = super::eval::evaluate(scope, source).unwrap_or(Value::Nil);
        scope.set_global(name, value);
    }
    scope.set_global("$$", Value::Integer(i64::from(std::process::id())));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scope::{BuiltinType, Scope};

    #[test]
    fn test_prelude_builtin_types_present() {
        let scope = RegistryScope::new();
        for ty in [
            BuiltinType::String,
            BuiltinType::Regexp,
            BuiltinType::Array,
            BuiltinType::Hash,
            BuiltinType::Proc,
            BuiltinType::Symbol,
        ] {
            assert!(scope.lookup_type(ty.type_name()).is_some(), "missing {}", ty);
            assert!(!scope.instance_methods(ty).is_empty());
        }
    }

    #[test]
    fn test_string_inherits_kernel() {
        let scope = RegistryScope::new();
        let methods = scope.instance_methods(BuiltinType::String);
        assert!(methods.contains(&"upcase".to_string()));
        assert!(methods.contains(&"between?".to_string()));
        assert!(methods.contains(&"object_id".to_string()));
        assert!(methods.contains(&"__send__".to_string()));
    }

    #[test]
    fn test_prelude_globals() {
        let scope = RegistryScope::new();
        let globals = scope.global_variables();
        assert_eq!(globals[0], "$stdout");
        assert!(globals.contains(&"$PROGRAM_NAME".to_string()));
        assert_eq!(scope.global("$stdout").unwrap().class_name(), "IO");
        assert_eq!(scope.global("$/"), Some(Value::Str("\n".to_string())));
    }

    #[test]
    fn test_prelude_constants() {
        let scope = RegistryScope::new();
        let constants = scope.constants();
        for name in ["Object", "String", "Math", "RUBY_VERSION", "STDOUT"] {
            assert!(constants.contains(&name.to_string()), "missing {}", name);
        }
        let float = scope.resolve_constant("", "Float").unwrap();
        let float_constants = scope.constants_of(&float).unwrap();
        assert!(float_constants.contains(&"INFINITY".to_string()));
        assert_eq!(
            float_constants.iter().filter(|c| c.as_str() == "INFINITY").count(),
            1
        );
    }

    #[test]
    fn test_private_methods_from_kernel() {
        let scope = RegistryScope::new();
        assert!(scope.private_methods().contains(&"puts".to_string()));
        assert!(!scope.methods().contains(&"puts".to_string()));
    }
}
