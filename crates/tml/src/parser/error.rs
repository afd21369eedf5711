//! Parse error types for rule expressions.

use thiserror::Error;

/// An error reported by strict parsing.
///
/// The lenient [`parse`](super::parse) never fails; these errors are only
/// produced by [`try_parse`](super::try_parse), which the rule lint uses.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// A list was opened but never closed.
    #[error("unclosed '(' opened at {line}:{column}")]
    Unclosed { line: usize, column: usize },

    /// A `)` appeared without a matching `(`.
    #[error("unexpected ')' at {line}:{column}")]
    UnexpectedClose { line: usize, column: usize },

    /// Input continued after the first complete expression.
    #[error("unexpected input after expression at {line}:{column}")]
    TrailingInput { line: usize, column: usize },

    /// The rule text contained no expression.
    #[error("empty expression")]
    Empty,
}
