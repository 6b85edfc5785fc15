//! Multi-line input detection by bracket and quote balance

/// Whether the buffered input can be evaluated yet
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompletenessStatus {
    Complete,
    /// More lines are needed
    Incomplete {
        open_brackets: usize,
        unclosed_quote: Option<char>,
    },
    /// A closing bracket does not match
    Invalid { reason: String },
}

fn closing(open: char) -> char {
    match open {
        '(' => ')',
        '[' => ']',
        _ => '}',
    }
}

/// Check bracket and quote balance of `input`. `#` starts a line comment
/// outside quotes.
pub fn check_completeness(input: &str) -> CompletenessStatus {
    let mut stack: Vec<char> = Vec::new();
    let mut quote: Option<char> = None;
    let mut in_comment = false;
    let mut escape_next = false;

    for ch in input.chars() {
        if escape_next {
            escape_next = false;
            continue;
        }

        if in_comment {
            if ch == '\n' {
                in_comment = false;
            }
            continue;
        }

        if let Some(q) = quote {
            if ch == '\\' {
                escape_next = true;
            } else if ch == q {
                quote = None;
            }
            continue;
        }

        match ch {
            '"' | '\'' | '`' => quote = Some(ch),
            '#' => in_comment = true,
            '(' | '[' | '{' => stack.push(ch),
            ')' | ']' | '}' => match stack.pop() {
                Some(open) if closing(open) == ch => {}
                Some(open) => {
                    return CompletenessStatus::Invalid {
                        reason: format!("Expected '{}' but found '{}'", closing(open), ch),
                    }
                }
                None => {
                    return CompletenessStatus::Invalid {
                        reason: format!("Unexpected closing '{}'", ch),
                    }
                }
            },
            _ => {}
        }
    }

    if stack.is_empty() && quote.is_none() {
        CompletenessStatus::Complete
    } else {
        CompletenessStatus::Incomplete {
            open_brackets: stack.len(),
            unclosed_quote: quote,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_complete_inputs() {
        for input in ["", "1 + 2", "[1, [2]]", "{a: (1)}", "\"(\"", "x # (", "'it\\'s'"] {
            assert_eq!(check_completeness(input), CompletenessStatus::Complete, "{:?}", input);
        }
    }

    #[test]
    fn test_incomplete_inputs() {
        assert_eq!(
            check_completeness("[1, (2"),
            CompletenessStatus::Incomplete {
                open_brackets: 2,
                unclosed_quote: None
            }
        );
        assert_eq!(
            check_completeness("\"abc\\\""),
            CompletenessStatus::Incomplete {
                open_brackets: 0,
                unclosed_quote: Some('"')
            }
        );
    }

    #[test]
    fn test_mismatched_brackets() {
        assert!(matches!(
            check_completeness("[1)"),
            CompletenessStatus::Invalid { reason } if reason.contains("']'")
        ));
        assert!(matches!(check_completeness("1)"), CompletenessStatus::Invalid { .. }));
    }
}
