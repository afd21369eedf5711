//! Rule expression parser.
//!
//! This module parses the prefix-notation rule language used by language
//! context and language case rules. The parser produces an [`Expr`] tree that
//! the [`Evaluator`](crate::interpreter::Evaluator) walks.

pub mod ast;
pub mod error;
mod expression;

pub use ast::*;
pub use error::ParseError;
pub use expression::{VARIABLE_SIGIL, parse, try_parse};
