//! Rule language interpreter.
//!
//! This module provides the evaluation engine for parsed rule expressions:
//! the operation table, the built-in operations and the per-evaluation
//! variable bindings.

mod bindings;
mod casing;
mod error;
mod evaluator;
mod operations;

pub use bindings::Bindings;
pub use error::{EvalError, compute_suggestions};
pub use evaluator::Evaluator;
pub use operations::{Builtin, Operation, OperationFn, SpecialFormFn, regex_from_literal};
