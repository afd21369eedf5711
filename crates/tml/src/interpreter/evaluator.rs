//! Rule expression evaluator.
//!
//! Walks an [`Expr`] tree against a set of [`Bindings`], dispatching list
//! heads through an operation table. Special forms receive their arguments
//! unevaluated; every other operation receives evaluated arguments, left to
//! right. Failures never propagate: they are logged and the result is
//! [`Value::Null`].

use std::collections::HashMap;
use std::fmt::{Debug, Formatter, Result as FmtResult};
use std::sync::{Arc, LazyLock};

use crate::interpreter::error::compute_suggestions;
use crate::interpreter::operations::{Builtin, Operation, compare, mismatch};
use crate::interpreter::{Bindings, EvalError};
use crate::parser::{Expr, parse};
use crate::types::Value;

static DEFAULT_EVALUATOR: LazyLock<Evaluator> = LazyLock::new(Evaluator::new);

/// Evaluates rule expressions.
///
/// The evaluator holds only the operation table; all evaluation state lives
/// in the [`Bindings`] passed to [`evaluate`](Self::evaluate), so one
/// evaluator can be shared across threads.
///
/// # Example
///
/// ```
/// use tml::interpreter::{Bindings, Evaluator};
/// use tml::parser::parse;
/// use tml::Value;
///
/// let rule = parse("(&& (= 1 (mod @n 10)) (!= 11 (mod @n 100)))");
/// let evaluator = Evaluator::shared();
///
/// let mut bindings = Bindings::new().with("@n", 21);
/// assert_eq!(evaluator.evaluate(&rule, &mut bindings), Value::Bool(true));
///
/// let mut bindings = Bindings::new().with("@n", 11);
/// assert_eq!(evaluator.evaluate(&rule, &mut bindings), Value::Bool(false));
/// ```
#[derive(Clone)]
pub struct Evaluator {
    operations: HashMap<String, Operation>,
}

impl Default for Evaluator {
    fn default() -> Self {
        Self::new()
    }
}

impl Debug for Evaluator {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        let mut names: Vec<&str> = self.operation_names().collect();
        names.sort_unstable();
        f.debug_struct("Evaluator")
            .field("operations", &names)
            .finish()
    }
}

impl Evaluator {
    /// Create an evaluator with all built-in operations.
    pub fn new() -> Self {
        Self {
            operations: Builtin::NAMES
                .iter()
                .map(|&(name, builtin)| (name.to_string(), Operation::Builtin(builtin)))
                .collect(),
        }
    }

    /// Create an evaluator with no operations at all.
    pub fn empty() -> Self {
        Self {
            operations: HashMap::new(),
        }
    }

    /// The process-wide default evaluator (built-ins only).
    ///
    /// Built on first use and never modified afterwards.
    pub fn shared() -> &'static Evaluator {
        &DEFAULT_EVALUATOR
    }

    /// Register an operation that receives evaluated arguments.
    ///
    /// Replaces any existing operation with the same name.
    pub fn add_operation(
        &mut self,
        name: impl Into<String>,
        handler: impl Fn(&[Value]) -> Value + Send + Sync + 'static,
    ) {
        self.operations
            .insert(name.into(), Operation::Applicative(Arc::new(handler)));
    }

    /// Register a special form that receives unevaluated arguments.
    ///
    /// Replaces any existing operation with the same name.
    pub fn add_special_form(
        &mut self,
        name: impl Into<String>,
        handler: impl Fn(&Evaluator, &mut Bindings, &[Expr]) -> Value + Send + Sync + 'static,
    ) {
        self.operations
            .insert(name.into(), Operation::SpecialForm(Arc::new(handler)));
    }

    /// Remove an operation. Returns whether it existed.
    pub fn remove_operation(&mut self, name: &str) -> bool {
        self.operations.remove(name).is_some()
    }

    /// Check if an operation exists.
    pub fn has_operation(&self, name: &str) -> bool {
        self.operations.contains_key(name)
    }

    /// Check if an operation receives its arguments unevaluated.
    pub fn is_special_form(&self, name: &str) -> bool {
        self.operations
            .get(name)
            .is_some_and(Operation::is_special_form)
    }

    /// Names of all registered operations, in no particular order.
    pub fn operation_names(&self) -> impl Iterator<Item = &str> {
        self.operations.keys().map(String::as_str)
    }

    /// Evaluate an expression.
    ///
    /// - Symbols resolve to their bound value, or to their own name if
    ///   unbound.
    /// - String and integer literals evaluate to themselves.
    /// - Lists apply the operator named by their head. An unknown operator,
    ///   wrong arity or type mismatch yields `Null`.
    pub fn evaluate(&self, expr: &Expr, bindings: &mut Bindings) -> Value {
        match expr {
            Expr::Int(n) => Value::Int(*n),
            Expr::Str(s) => Value::Str(s.clone()),
            Expr::Symbol(name) => bindings
                .get(name)
                .cloned()
                .unwrap_or_else(|| Value::Str(name.clone())),
            Expr::List(items) => match self.evaluate_list(items, bindings) {
                Ok(value) => value,
                Err(error) => {
                    self.log_degraded(expr, &error);
                    Value::Null
                }
            },
        }
    }

    /// Parse and evaluate a rule string.
    pub fn evaluate_str(&self, rule: &str, bindings: &mut Bindings) -> Value {
        self.evaluate(&parse(rule), bindings)
    }

    /// Apply a non-special operation to already-evaluated arguments.
    pub fn apply(&self, name: &str, args: &[Value]) -> Result<Value, EvalError> {
        match self.operations.get(name) {
            Some(Operation::Builtin(builtin)) => builtin.apply(name, args),
            Some(Operation::Applicative(handler)) => Ok(handler(args)),
            Some(Operation::SpecialForm(_)) => Err(EvalError::SpecialForm {
                name: name.to_string(),
            }),
            None => Err(EvalError::UnknownOperator {
                name: name.to_string(),
            }),
        }
    }

    fn evaluate_list(&self, items: &[Expr], bindings: &mut Bindings) -> Result<Value, EvalError> {
        let Some((head, args)) = items.split_first() else {
            return Ok(Value::Null);
        };
        let name = match head {
            Expr::Symbol(name) | Expr::Str(name) => name.as_str(),
            other => {
                return Err(EvalError::InvalidOperator {
                    head: other.to_string(),
                });
            }
        };
        let operation = self
            .operations
            .get(name)
            .ok_or_else(|| EvalError::UnknownOperator {
                name: name.to_string(),
            })?;

        match operation {
            Operation::Builtin(builtin) if builtin.is_special_form() => {
                self.special_form(*builtin, name, args, bindings)
            }
            Operation::SpecialForm(handler) => Ok(handler(self, bindings, args)),
            Operation::Builtin(_) | Operation::Applicative(_) => {
                let values: Vec<Value> = args
                    .iter()
                    .map(|arg| self.evaluate(arg, bindings))
                    .collect();
                self.apply(name, &values)
            }
        }
    }

    fn special_form(
        &self,
        builtin: Builtin,
        name: &str,
        args: &[Expr],
        bindings: &mut Bindings,
    ) -> Result<Value, EvalError> {
        match builtin {
            Builtin::Quote => {
                let [expr] = arity::<1>(name, args)?;
                Ok(quote(expr))
            }
            Builtin::Car => {
                let [expr] = arity::<1>(name, args)?;
                match self.evaluate(expr, bindings) {
                    Value::List(items) => Ok(items.into_iter().next().unwrap_or_default()),
                    other => Err(mismatch(name, &other)),
                }
            }
            Builtin::Cdr => {
                let [expr] = arity::<1>(name, args)?;
                match self.evaluate(expr, bindings) {
                    Value::List(items) => Ok(Value::List(items.into_iter().skip(1).collect())),
                    other => Err(mismatch(name, &other)),
                }
            }
            Builtin::If => {
                let (condition, then, otherwise) = match args {
                    [condition, then] => (condition, then, None),
                    [condition, then, otherwise] => (condition, then, Some(otherwise)),
                    _ => {
                        return Err(EvalError::ArgumentCount {
                            operator: name.to_string(),
                            expected: 3,
                            got: args.len(),
                        });
                    }
                };
                if self.evaluate(condition, bindings).is_truthy() {
                    Ok(self.evaluate(then, bindings))
                } else {
                    Ok(otherwise.map_or(Value::Null, |expr| self.evaluate(expr, bindings)))
                }
            }
            Builtin::And => Ok(Value::Bool(
                args.iter()
                    .all(|arg| self.evaluate(arg, bindings).is_truthy()),
            )),
            Builtin::Or => Ok(Value::Bool(
                args.iter()
                    .any(|arg| self.evaluate(arg, bindings).is_truthy()),
            )),
            Builtin::True => Ok(Value::Bool(true)),
            Builtin::False => Ok(Value::Bool(false)),
            Builtin::Let => {
                let [target, expr] = arity::<2>(name, args)?;
                let variable = match target {
                    Expr::Symbol(variable) | Expr::Str(variable) => variable.clone(),
                    other => {
                        return Err(EvalError::TypeMismatch {
                            operator: name.to_string(),
                            found: format!("variable name {other}"),
                        });
                    }
                };
                let value = self.evaluate(expr, bindings);
                bindings.set(variable, value.clone());
                Ok(value)
            }
            Builtin::Count => {
                let [list] = arity::<1>(name, args)?;
                match self.list_operand(list, bindings) {
                    Value::List(items) => Ok(Value::from(items.len())),
                    other => Err(mismatch(name, &other)),
                }
            }
            Builtin::All | Builtin::Any => {
                let [list, expected] = arity::<2>(name, args)?;
                let list = self.list_operand(list, bindings);
                let expected = self.evaluate(expected, bindings);
                let Value::List(items) = list else {
                    return Ok(Value::Bool(false));
                };
                if items.is_empty() {
                    return Ok(Value::Bool(false));
                }
                let matches = |item: &Value| compare(Builtin::Equal, item, &expected);
                Ok(Value::Bool(if builtin == Builtin::All {
                    items.iter().all(matches)
                } else {
                    items.iter().any(matches)
                }))
            }
            other => other.apply(name, &[]),
        }
    }

    /// A list whose head is not an operation is a literal list.
    fn list_operand(&self, expr: &Expr, bindings: &mut Bindings) -> Value {
        match expr {
            Expr::List(items) if !items.first().is_some_and(|head| self.is_operator(head)) => {
                quote(expr)
            }
            _ => self.evaluate(expr, bindings),
        }
    }

    fn is_operator(&self, head: &Expr) -> bool {
        match head {
            Expr::Symbol(name) | Expr::Str(name) => self.has_operation(name),
            Expr::Int(_) | Expr::List(_) => false,
        }
    }

    fn log_degraded(&self, expr: &Expr, error: &EvalError) {
        if let EvalError::UnknownOperator { name } = error {
            let suggestions = compute_suggestions(name, self.operation_names());
            if !suggestions.is_empty() {
                log::debug!(
                    "rule '{expr}' evaluated to null: {error} (did you mean {}?)",
                    suggestions.join(", ")
                );
                return;
            }
        }
        log::debug!("rule '{expr}' evaluated to null: {error}");
    }
}

/// Convert an unevaluated expression into a value.
fn quote(expr: &Expr) -> Value {
    match expr {
        Expr::Int(n) => Value::Int(*n),
        Expr::Str(s) | Expr::Symbol(s) => Value::Str(s.clone()),
        Expr::List(items) => Value::List(items.iter().map(quote).collect()),
    }
}

fn arity<'a, const N: usize>(name: &str, args: &'a [Expr]) -> Result<&'a [Expr; N], EvalError> {
    args.try_into().map_err(|_| EvalError::ArgumentCount {
        operator: name.to_string(),
        expected: N,
        got: args.len(),
    })
}
