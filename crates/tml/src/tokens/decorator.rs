//! Presentation hook for substituted values.

use crate::tokens::Token;

/// Wraps substituted values for presentation (HTML, terminal styling, ...).
///
/// Every method defaults to returning the value unchanged.
pub trait Decorator: Send + Sync {
    /// Called with the rendered value of a data, method or piped token.
    fn decorate_token(&self, _token: &Token, value: String) -> String {
        value
    }

    /// Called for a decoration element that has neither caller-supplied data
    /// nor a configured default.
    fn decorate_element(&self, _name: &str, content: String) -> String {
        content
    }

    /// Called with each element a language case transformed.
    fn decorate_language_case(&self, _case: &str, _original: &str, transformed: String) -> String {
        transformed
    }
}

/// A decorator that leaves everything unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopDecorator;

impl Decorator for NoopDecorator {}
