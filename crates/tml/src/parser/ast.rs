//! Public AST type for rule expressions.
//!
//! Rules are written in prefix notation, e.g.
//! `(&& (= 1 (mod @n 10)) (!= 11 (mod @n 100)))`.

use std::fmt::{Display, Formatter, Result as FmtResult};

/// A parsed rule expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expr {
    /// An integer literal: `10`
    Int(i64),
    /// A quoted string literal, quotes stripped: `"1,2,3..5"`
    Str(String),
    /// A bareword, operator or variable reference: `mod`, `&&`, `@n`.
    /// Resolved against the bindings at evaluation time; unbound symbols
    /// evaluate to their own name.
    Symbol(String),
    /// A list whose head names an operator: `(mod @n 10)`
    List(Vec<Expr>),
}

impl Expr {
    /// Shorthand for building a symbol.
    pub fn symbol(name: impl Into<String>) -> Self {
        Expr::Symbol(name.into())
    }

    /// Shorthand for building a string literal.
    pub fn string(text: impl Into<String>) -> Self {
        Expr::Str(text.into())
    }

    /// The operator name, if this is a list headed by a symbol.
    pub fn operator(&self) -> Option<&str> {
        match self {
            Expr::List(items) => match items.first() {
                Some(Expr::Symbol(name) | Expr::Str(name)) => Some(name),
                _ => None,
            },
            _ => None,
        }
    }
}

impl Display for Expr {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Expr::Int(n) => write!(f, "{n}"),
            Expr::Str(s) if s.contains('"') => write!(f, "'{s}'"),
            Expr::Str(s) => write!(f, "\"{s}\""),
            Expr::Symbol(s) => write!(f, "{s}"),
            Expr::List(items) => {
                write!(f, "(")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, " ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, ")")
            }
        }
    }
}
