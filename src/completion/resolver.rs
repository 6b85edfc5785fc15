//! Completion facade used by console hosts

use tracing::{debug, trace};

use super::catalog::SuggestionCatalog;
use super::classifier::Classifier;
use super::doc::{self, DocTarget};
use super::formatter;
use super::provider::{self, CompletionOptions};
use super::shape::ResolvedQuery;
use crate::scope::{EvalError, Scope};

/// Context-sensitive completion over a [`Scope`]
pub struct Resolver<S: Scope> {
    scope: S,
    classifier: Classifier,
    options: CompletionOptions,
}

impl<S: Scope> Resolver<S> {
    pub fn new(scope: S) -> Result<Self, String> {
        Self::with_options(scope, CompletionOptions::default())
    }

    pub fn with_options(scope: S, options: CompletionOptions) -> Result<Self, String> {
        Ok(Self {
            scope,
            classifier: Classifier::new()?,
            options,
        })
    }

    pub fn scope(&self) -> &S {
        &self.scope
    }

    pub fn options(&self) -> &CompletionOptions {
        &self.options
    }

    pub fn classify(&self, fragment: &str) -> ResolvedQuery {
        self.classifier.classify(fragment)
    }

    /// Completions for `fragment`, the input up to the cursor.
    ///
    /// A receiver the scope cannot resolve yields no completions.
    pub fn complete(&self, fragment: &str) -> Vec<String> {
        let query = self.classify(fragment);
        let candidates = match provider::candidates_for(&query, &self.scope, &self.options) {
            Ok(candidates) => candidates,
            Err(err) => {
                debug!(target: "mee::completion::resolver", fragment, %err, "No completions");
                return Vec::new();
            }
        };

        let mut completions = formatter::format(&query, &candidates);
        if self.options.sort {
            completions.sort();
        }
        trace!(
            target: "mee::completion::resolver",
            fragment,
            count = completions.len(),
            "Completed"
        );
        completions
    }

    /// Evaluate `expression` and render the result with `to_s`
    pub fn evaluate(&self, expression: &str) -> Result<String, EvalError> {
        let value = self.scope.evaluate(expression)?;
        Ok(self.scope.to_s(&value))
    }

    /// Evaluate `expression` and render the result with `inspect`
    pub fn evaluate_inspect(&self, expression: &str) -> Result<String, EvalError> {
        let value = self.scope.evaluate(expression)?;
        Ok(self.scope.inspect(&value))
    }

    /// Every name visible in the scope, tagged by category
    pub fn initial_suggestions(&self) -> SuggestionCatalog {
        SuggestionCatalog::build(&self.scope)
    }

    /// Name to show documentation for, if the fragment denotes one
    pub fn doc_target(&self, fragment: &str) -> Option<DocTarget> {
        let query = self.classify(fragment);
        doc::doc_target(&query, &self.scope, &self.options)
    }
}
