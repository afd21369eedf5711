//! A single condition rule of a language context or language case.

use std::sync::OnceLock;

use bon::Builder;
use serde::Deserialize;

use crate::interpreter::{Bindings, Evaluator};
use crate::parser::{Expr, parse};

/// Variable bound to the value being transformed by [`LanguageContextRule::apply`].
pub const VALUE_VARIABLE: &str = "@value";

/// One rule of a language context (e.g. the `one` plural category) or of a
/// language case (e.g. the genitive ending for words ending in `a`).
///
/// The condition and operation sources are parsed on first use and cached.
/// Parsing is a pure function of the source, so concurrent first uses are
/// harmless.
///
/// # Example
///
/// ```
/// use tml::interpreter::Bindings;
/// use tml::language::LanguageContextRule;
///
/// let one = LanguageContextRule::builder()
///     .keyword("one")
///     .conditions("(&& (= 1 (mod @n 10)) (!= 11 (mod @n 100)))")
///     .build();
///
/// assert!(one.evaluate(&Bindings::new().with("@n", 21)));
/// assert!(!one.evaluate(&Bindings::new().with("@n", 11)));
/// ```
#[derive(Debug, Clone, Default, Builder, Deserialize)]
#[builder(on(String, into))]
pub struct LanguageContextRule {
    /// The category this rule selects (`one`, `few`, `male`, ...).
    pub keyword: String,

    /// Human readable description for translators.
    #[builder(default)]
    #[serde(default)]
    pub description: String,

    /// Example values that match this rule.
    #[builder(default)]
    #[serde(default)]
    pub examples: String,

    /// Condition expression source.
    #[builder(default)]
    #[serde(default)]
    pub conditions: String,

    /// Optional transform expression source, applied by [`apply`](Self::apply).
    pub operations: Option<String>,

    #[builder(skip)]
    #[serde(skip)]
    conditions_expression: OnceLock<Expr>,

    #[builder(skip)]
    #[serde(skip)]
    operations_expression: OnceLock<Option<Expr>>,
}

impl LanguageContextRule {
    /// The parsed condition expression.
    pub fn conditions_expression(&self) -> &Expr {
        self.conditions_expression
            .get_or_init(|| parse(&self.conditions))
    }

    /// The parsed operations expression, if the rule has one.
    pub fn operations_expression(&self) -> Option<&Expr> {
        self.operations_expression
            .get_or_init(|| {
                self.operations
                    .as_deref()
                    .filter(|source| !source.trim().is_empty())
                    .map(parse)
            })
            .as_ref()
    }

    /// Whether the condition holds for the given variables.
    ///
    /// Evaluates against a private copy of `bindings` with the shared
    /// evaluator. The result is taken by truthiness: conditions are expected
    /// to produce booleans, and a condition that evaluates to `Null` (for
    /// example through a failed operation) does not match.
    pub fn evaluate(&self, bindings: &Bindings) -> bool {
        self.evaluate_with(Evaluator::shared(), bindings)
    }

    /// [`evaluate`](Self::evaluate) with a caller-supplied evaluator.
    pub fn evaluate_with(&self, evaluator: &Evaluator, bindings: &Bindings) -> bool {
        let mut scope = bindings.clone();
        evaluator
            .evaluate(self.conditions_expression(), &mut scope)
            .is_truthy()
    }

    /// Transform `value` with the rule's operations.
    ///
    /// `value` is bound as `@value` on top of `bindings`. Without operations,
    /// or when the operations evaluate to `Null`, `value` is returned as-is.
    pub fn apply(&self, value: &str, bindings: &Bindings) -> String {
        self.apply_with(Evaluator::shared(), value, bindings)
    }

    /// [`apply`](Self::apply) with a caller-supplied evaluator.
    pub fn apply_with(&self, evaluator: &Evaluator, value: &str, bindings: &Bindings) -> String {
        let Some(operations) = self.operations_expression() else {
            return value.to_string();
        };
        let mut scope = bindings.clone();
        scope.set(VALUE_VARIABLE, value);
        match evaluator.evaluate(operations, &mut scope) {
            result if result.is_null() => value.to_string(),
            result => result.to_string(),
        }
    }
}
