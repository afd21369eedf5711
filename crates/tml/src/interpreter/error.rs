//! Error types for the rule interpreter.

use thiserror::Error;

/// An operation failure during rule evaluation.
///
/// [`Evaluator::evaluate`](super::Evaluator::evaluate) never surfaces these:
/// it logs them and degrades to [`Value::Null`](crate::Value::Null). They are
/// returned by [`Evaluator::apply`](super::Evaluator::apply) for callers that
/// want to see why an operation produced nothing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EvalError {
    /// No operation registered under this name.
    #[error("unknown operator '{name}'")]
    UnknownOperator { name: String },

    /// A special form was applied to already-evaluated arguments.
    #[error("'{name}' is a special form and needs unevaluated arguments")]
    SpecialForm { name: String },

    /// The list head is not an operator name.
    #[error("list head is not an operator: {head}")]
    InvalidOperator { head: String },

    /// Wrong number of arguments for an operation.
    #[error("'{operator}' expects {expected} arguments, got {got}")]
    ArgumentCount {
        operator: String,
        expected: usize,
        got: usize,
    },

    /// An argument had a type the operation cannot use.
    #[error("'{operator}' cannot operate on {found}")]
    TypeMismatch { operator: String, found: String },

    /// Integer overflow or division by zero.
    #[error("'{operator}' is undefined for these operands")]
    Arithmetic { operator: String },

    /// A `/pattern/` literal that does not compile.
    #[error("invalid regular expression '{pattern}': {message}")]
    InvalidRegex { pattern: String, message: String },

    /// A `date`/`time` literal that does not match its format.
    #[error("invalid {kind} literal '{text}'")]
    InvalidDate { kind: &'static str, text: String },
}

/// Compute "did you mean" suggestions for an unknown name.
///
/// Returns up to three known names, closest first. Names of three characters
/// or fewer allow an edit distance of 1, longer names 2.
pub fn compute_suggestions<'a>(
    name: &str,
    known: impl IntoIterator<Item = &'a str>,
) -> Vec<String> {
    let max_distance = if name.chars().count() <= 3 { 1 } else { 2 };
    let mut scored: Vec<(usize, &str)> = known
        .into_iter()
        .map(|candidate| (strsim::levenshtein(name, candidate), candidate))
        .filter(|&(distance, _)| distance > 0 && distance <= max_distance)
        .collect();
    scored.sort();
    scored
        .into_iter()
        .take(3)
        .map(|(_, candidate)| candidate.to_string())
        .collect()
}
