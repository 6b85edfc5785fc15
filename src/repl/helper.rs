//! Rustyline helper integration
//!
//! Wires the completion resolver into rustyline's Helper traits

use std::borrow::Cow;

use rustyline::completion::{Completer, Pair};
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::validate::{ValidationContext, ValidationResult, Validator};
use rustyline::{Context, Helper};

use super::completeness::{check_completeness, CompletenessStatus};
use crate::completion::{CompletionOptions, Resolver};
use crate::scope::RegistryScope;

/// Number of submitted lines kept for hints
const HINT_HISTORY_LIMIT: usize = 100;

/// Console helper: completion, history hints and multi-line validation
pub struct ConsoleHelper {
    resolver: Resolver<RegistryScope>,
    command_history: Vec<String>,
}

impl ConsoleHelper {
    pub fn new(scope: RegistryScope, options: CompletionOptions) -> Result<Self, String> {
        Ok(Self {
            resolver: Resolver::with_options(scope, options)?,
            command_history: Vec::new(),
        })
    }

    pub fn resolver(&self) -> &Resolver<RegistryScope> {
        &self.resolver
    }

    /// Remember a submitted line for hints
    pub fn add_to_history(&mut self, line: String) {
        if self.command_history.len() >= HINT_HISTORY_LIMIT {
            self.command_history.remove(0);
        }
        self.command_history.push(line);
    }
}

impl Completer for ConsoleHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let before_cursor = &line[..pos];
        let word_start = before_cursor
            .rfind(char::is_whitespace)
            .map(|i| i + 1)
            .unwrap_or(0);

        let matches = self
            .resolver
            .complete(&before_cursor[word_start..])
            .into_iter()
            .map(|completion| Pair {
                display: completion.clone(),
                replacement: completion,
            })
            .collect();

        Ok((word_start, matches))
    }
}

impl Hinter for ConsoleHelper {
    type Hint = String;

    fn hint(&self, line: &str, pos: usize, _ctx: &Context<'_>) -> Option<String> {
        if pos < line.len() || line.is_empty() {
            return None;
        }

        self.command_history
            .iter()
            .rev()
            .find(|cmd| cmd.starts_with(line) && cmd.len() > line.len())
            .map(|cmd| cmd[line.len()..].to_string())
    }
}

impl Highlighter for ConsoleHelper {
    fn highlight_hint<'h>(&self, hint: &'h str) -> Cow<'h, str> {
        Cow::Owned(format!("\x1b[90m{}\x1b[0m", hint))
    }
}

impl Validator for ConsoleHelper {
    fn validate(&self, ctx: &mut ValidationContext) -> rustyline::Result<ValidationResult> {
        match check_completeness(ctx.input()) {
            CompletenessStatus::Complete => Ok(ValidationResult::Valid(None)),
            CompletenessStatus::Incomplete { .. } => Ok(ValidationResult::Incomplete),
            CompletenessStatus::Invalid { reason } => Ok(ValidationResult::Invalid(Some(reason))),
        }
    }
}

impl Helper for ConsoleHelper {}
