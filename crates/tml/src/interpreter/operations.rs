//! Built-in operations of the rule language.
//!
//! Every built-in is a [`Builtin`] variant. Special forms (which receive
//! their arguments unevaluated) are evaluated by the
//! [`Evaluator`](super::Evaluator) itself; applicative built-ins are
//! implemented here over already-evaluated [`Value`]s.

use std::cmp::Ordering;
use std::sync::Arc;

use chrono::{Local, NaiveDate, NaiveDateTime, NaiveTime};
use regex::{Regex, RegexBuilder};

use crate::interpreter::casing;
use crate::interpreter::{Bindings, EvalError, Evaluator};
use crate::parser::Expr;
use crate::types::{Number, Value};

/// Handler for a caller-supplied applicative operation.
pub type OperationFn = Arc<dyn Fn(&[Value]) -> Value + Send + Sync>;

/// Handler for a caller-supplied special form.
///
/// Receives the evaluator, the current bindings and the unevaluated
/// arguments, and decides itself which arguments to evaluate.
pub type SpecialFormFn = Arc<dyn Fn(&Evaluator, &mut Bindings, &[Expr]) -> Value + Send + Sync>;

/// An entry in the evaluator's operation table.
#[derive(Clone)]
pub enum Operation {
    /// A built-in operation.
    Builtin(Builtin),
    /// A caller-supplied operation receiving evaluated arguments.
    Applicative(OperationFn),
    /// A caller-supplied operation receiving unevaluated arguments.
    SpecialForm(SpecialFormFn),
}

impl Operation {
    /// Whether arguments are passed to this operation unevaluated.
    pub fn is_special_form(&self) -> bool {
        match self {
            Operation::Builtin(builtin) => builtin.is_special_form(),
            Operation::Applicative(_) => false,
            Operation::SpecialForm(_) => true,
        }
    }
}

/// The built-in operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Builtin {
    Quote,
    Car,
    Cdr,
    Cons,
    Eq,
    Atom,
    If,
    And,
    Or,
    Not,
    True,
    False,
    Let,
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Equal,
    NotEqual,
    Less,
    LessEqual,
    Greater,
    GreaterEqual,
    In,
    Within,
    Count,
    All,
    Any,
    Match,
    Replace,
    Append,
    Prepend,
    Date,
    Time,
    Today,
    Now,
    Upcase,
    Downcase,
    Capitalize,
}

impl Builtin {
    /// Operator names and the built-in each one is registered under.
    pub const NAMES: &'static [(&'static str, Builtin)] = &[
        ("quote", Builtin::Quote),
        ("car", Builtin::Car),
        ("cdr", Builtin::Cdr),
        ("cons", Builtin::Cons),
        ("eq", Builtin::Eq),
        ("atom", Builtin::Atom),
        ("cond", Builtin::If),
        ("if", Builtin::If),
        ("&&", Builtin::And),
        ("and", Builtin::And),
        ("||", Builtin::Or),
        ("or", Builtin::Or),
        ("!", Builtin::Not),
        ("not", Builtin::Not),
        ("true", Builtin::True),
        ("false", Builtin::False),
        ("let", Builtin::Let),
        ("label", Builtin::Let),
        ("+", Builtin::Add),
        ("-", Builtin::Sub),
        ("*", Builtin::Mul),
        ("/", Builtin::Div),
        ("%", Builtin::Mod),
        ("mod", Builtin::Mod),
        ("=", Builtin::Equal),
        ("!=", Builtin::NotEqual),
        ("<", Builtin::Less),
        ("<=", Builtin::LessEqual),
        (">", Builtin::Greater),
        (">=", Builtin::GreaterEqual),
        ("in", Builtin::In),
        ("within", Builtin::Within),
        ("count", Builtin::Count),
        ("all", Builtin::All),
        ("any", Builtin::Any),
        ("match", Builtin::Match),
        ("replace", Builtin::Replace),
        ("append", Builtin::Append),
        ("prepend", Builtin::Prepend),
        ("date", Builtin::Date),
        ("time", Builtin::Time),
        ("today", Builtin::Today),
        ("now", Builtin::Now),
        ("upcase", Builtin::Upcase),
        ("downcase", Builtin::Downcase),
        ("capitalize", Builtin::Capitalize),
    ];

    /// Whether this built-in receives its arguments unevaluated.
    pub fn is_special_form(self) -> bool {
        match self {
            Builtin::Quote
            | Builtin::Car
            | Builtin::Cdr
            | Builtin::If
            | Builtin::And
            | Builtin::Or
            | Builtin::True
            | Builtin::False
            | Builtin::Let
            | Builtin::Count
            | Builtin::All
            | Builtin::Any => true,
            Builtin::Cons
            | Builtin::Eq
            | Builtin::Atom
            | Builtin::Not
            | Builtin::Add
            | Builtin::Sub
            | Builtin::Mul
            | Builtin::Div
            | Builtin::Mod
            | Builtin::Equal
            | Builtin::NotEqual
            | Builtin::Less
            | Builtin::LessEqual
            | Builtin::Greater
            | Builtin::GreaterEqual
            | Builtin::In
            | Builtin::Within
            | Builtin::Match
            | Builtin::Replace
            | Builtin::Append
            | Builtin::Prepend
            | Builtin::Date
            | Builtin::Time
            | Builtin::Today
            | Builtin::Now
            | Builtin::Upcase
            | Builtin::Downcase
            | Builtin::Capitalize => false,
        }
    }

    /// Apply an applicative built-in to evaluated arguments.
    ///
    /// `name` is the operator name used in the rule, for error messages.
    pub(crate) fn apply(self, name: &str, args: &[Value]) -> Result<Value, EvalError> {
        match self {
            Builtin::Cons => {
                let [head, cell] = arity::<2>(name, args)?;
                match cell {
                    Value::List(items) => {
                        let mut list = Vec::with_capacity(items.len() + 1);
                        list.push(head.clone());
                        list.extend(items.iter().cloned());
                        Ok(Value::List(list))
                    }
                    Value::Null => Ok(Value::List(vec![head.clone()])),
                    other => Err(mismatch(name, other)),
                }
            }
            Builtin::Eq => {
                let [l, r] = arity::<2>(name, args)?;
                Ok(Value::Bool(l == r))
            }
            Builtin::Atom => {
                let [value] = arity::<1>(name, args)?;
                Ok(Value::Bool(!matches!(value, Value::List(_))))
            }
            Builtin::Not => {
                let [value] = arity::<1>(name, args)?;
                Ok(Value::Bool(!value.is_truthy()))
            }
            Builtin::Add | Builtin::Sub | Builtin::Mul | Builtin::Div => {
                let [l, r] = arity::<2>(name, args)?;
                arithmetic(self, name, l, r)
            }
            Builtin::Mod => {
                let [l, r] = arity::<2>(name, args)?;
                let (Some(a), Some(b)) = (integer(l), integer(r)) else {
                    return Err(mismatch(name, if integer(l).is_none() { l } else { r }));
                };
                a.checked_rem(b)
                    .map(Value::Int)
                    .ok_or_else(|| EvalError::Arithmetic {
                        operator: name.to_string(),
                    })
            }
            Builtin::Equal
            | Builtin::NotEqual
            | Builtin::Less
            | Builtin::LessEqual
            | Builtin::Greater
            | Builtin::GreaterEqual => {
                let [l, r] = arity::<2>(name, args)?;
                Ok(Value::Bool(compare(self, l, r)))
            }
            Builtin::In => {
                let [values, search] = arity::<2>(name, args)?;
                Ok(Value::Bool(in_list(&values.to_string(), &search.to_string())))
            }
            Builtin::Within => {
                let [range, search] = arity::<2>(name, args)?;
                within(&range.to_string(), search).ok_or_else(|| mismatch(name, search))
            }
            Builtin::Match => {
                let [pattern, subject] = arity::<2>(name, args)?;
                let regex = regex_from_literal(&pattern.to_string())?;
                Ok(Value::Bool(regex.is_match(&subject.to_string())))
            }
            Builtin::Replace => {
                let [pattern, replacement, subject] = arity::<3>(name, args)?;
                let regex = regex_from_literal(&pattern.to_string())?;
                let subject = subject.to_string();
                Ok(Value::Str(
                    regex
                        .replace_all(&subject, replacement.to_string().as_str())
                        .into_owned(),
                ))
            }
            Builtin::Append => {
                let [suffix, base] = arity::<2>(name, args)?;
                Ok(Value::Str(format!("{base}{suffix}")))
            }
            Builtin::Prepend => {
                let [prefix, base] = arity::<2>(name, args)?;
                Ok(Value::Str(format!("{prefix}{base}")))
            }
            Builtin::Date => {
                let [text] = arity::<1>(name, args)?;
                parse_date(&text.to_string()).map(Value::Date)
            }
            Builtin::Time => {
                let [text] = arity::<1>(name, args)?;
                parse_time(&text.to_string()).map(Value::Date)
            }
            Builtin::Today => {
                arity::<0>(name, args)?;
                Ok(Value::Date(Local::now().date_naive().and_time(NaiveTime::MIN)))
            }
            Builtin::Now => {
                arity::<0>(name, args)?;
                Ok(Value::Date(Local::now().naive_local()))
            }
            Builtin::Upcase => {
                let [text] = arity::<1>(name, args)?;
                Ok(Value::Str(casing::upcase(&text.to_string())))
            }
            Builtin::Downcase => {
                let [text] = arity::<1>(name, args)?;
                Ok(Value::Str(casing::downcase(&text.to_string())))
            }
            Builtin::Capitalize => {
                let [text] = arity::<1>(name, args)?;
                Ok(Value::Str(casing::capitalize(&text.to_string())))
            }
            Builtin::Quote
            | Builtin::Car
            | Builtin::Cdr
            | Builtin::If
            | Builtin::And
            | Builtin::Or
            | Builtin::True
            | Builtin::False
            | Builtin::Let
            | Builtin::Count
            | Builtin::All
            | Builtin::Any => Err(EvalError::SpecialForm {
                name: name.to_string(),
            }),
        }
    }
}

/// Check the argument count and borrow the arguments as an array.
pub(crate) fn arity<'a, const N: usize>(
    name: &str,
    args: &'a [Value],
) -> Result<&'a [Value; N], EvalError> {
    args.try_into().map_err(|_| EvalError::ArgumentCount {
        operator: name.to_string(),
        expected: N,
        got: args.len(),
    })
}

pub(crate) fn mismatch(name: &str, found: &Value) -> EvalError {
    EvalError::TypeMismatch {
        operator: name.to_string(),
        found: describe(found),
    }
}

fn describe(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => format!("boolean {b}"),
        Value::Int(n) => format!("integer {n}"),
        Value::Float(f) => format!("float {f}"),
        Value::Str(s) => format!("string \"{s}\""),
        Value::Date(d) => format!("date {d}"),
        Value::List(items) => format!("list of {}", items.len()),
    }
}

/// Integer view for `mod`: integers and integer strings, never floats.
fn integer(value: &Value) -> Option<i64> {
    match value {
        Value::Float(_) => None,
        other => other.as_int(),
    }
}

fn arithmetic(op: Builtin, name: &str, l: &Value, r: &Value) -> Result<Value, EvalError> {
    let both_strings = matches!((l, r), (Value::Str(_), Value::Str(_)));
    match (l.as_number(), r.as_number()) {
        (Some(a), Some(b)) if !(both_strings && op == Builtin::Add) => {
            numeric(op, a, b).ok_or_else(|| EvalError::Arithmetic {
                operator: name.to_string(),
            })
        }
        _ if op == Builtin::Add && !l.is_null() && !r.is_null() => {
            Ok(Value::Str(format!("{l}{r}")))
        }
        (None, _) => Err(mismatch(name, l)),
        _ => Err(mismatch(name, r)),
    }
}

fn numeric(op: Builtin, a: Number, b: Number) -> Option<Value> {
    match (a, b) {
        (Number::Int(a), Number::Int(b)) => {
            let result = match op {
                Builtin::Add => a.checked_add(b),
                Builtin::Sub => a.checked_sub(b),
                Builtin::Mul => a.checked_mul(b),
                Builtin::Div => a.checked_div(b),
                _ => None,
            };
            result.map(Value::Int)
        }
        (a, b) => {
            let (a, b) = (a.as_f64(), b.as_f64());
            let result = match op {
                Builtin::Add => Some(a + b),
                Builtin::Sub => Some(a - b),
                Builtin::Mul => Some(a * b),
                Builtin::Div if b != 0.0 => Some(a / b),
                _ => None,
            };
            result.map(Value::Float)
        }
    }
}

/// Compare two values for one of the comparison operators.
///
/// Dates compare chronologically and numeric-looking values numerically.
/// Anything else compares by string form for `=`/`!=` and by string length
/// for the ordering operators.
// TODO: string-length ordering is kept for compatibility with existing rule
// sets; replace with lexicographic ordering once those are audited.
pub(crate) fn compare(op: Builtin, l: &Value, r: &Value) -> bool {
    let ordering = match (date_operand(l, r), date_operand(r, l)) {
        (Some(a), Some(b)) => Some(a.cmp(&b)),
        _ => match (l.as_number(), r.as_number()) {
            (Some(a), Some(b)) => a.compare(b),
            _ => {
                return match op {
                    Builtin::Equal => l.to_string() == r.to_string(),
                    Builtin::NotEqual => l.to_string() != r.to_string(),
                    _ => ordering_matches(
                        op,
                        Some(
                            l.to_string()
                                .chars()
                                .count()
                                .cmp(&r.to_string().chars().count()),
                        ),
                    ),
                };
            }
        },
    };
    ordering_matches(op, ordering)
}

fn ordering_matches(op: Builtin, ordering: Option<Ordering>) -> bool {
    let Some(ordering) = ordering else {
        return op == Builtin::NotEqual;
    };
    match op {
        Builtin::Equal => ordering == Ordering::Equal,
        Builtin::NotEqual => ordering != Ordering::Equal,
        Builtin::Less => ordering == Ordering::Less,
        Builtin::LessEqual => ordering != Ordering::Greater,
        Builtin::Greater => ordering == Ordering::Greater,
        Builtin::GreaterEqual => ordering != Ordering::Less,
        _ => false,
    }
}

/// A date view of `value`, parsing strings only when `other` is a date.
fn date_operand(value: &Value, other: &Value) -> Option<NaiveDateTime> {
    match (value, other) {
        (Value::Date(d), _) => Some(*d),
        (Value::Str(s), Value::Date(_)) => parse_time(s).or_else(|_| parse_date(s)).ok(),
        _ => None,
    }
}

/// Membership in a comma-separated list where `a..b` is an inclusive
/// integer range.
fn in_list(values: &str, search: &str) -> bool {
    let search = search.trim();
    values.split(',').map(str::trim).any(|element| {
        match element.split_once("..") {
            Some((lo, hi)) => match (
                lo.trim().parse::<i64>(),
                hi.trim().parse::<i64>(),
                search.parse::<i64>(),
            ) {
                (Ok(lo), Ok(hi), Ok(n)) => lo <= n && n <= hi,
                _ => false,
            },
            None => element == search,
        }
    })
}

/// Inclusive floating-point range test, `None` when anything is non-numeric.
fn within(range: &str, search: &Value) -> Option<Value> {
    let (lo, hi) = range.split_once("..")?;
    let lo: f64 = lo.trim().parse().ok()?;
    let hi: f64 = hi.trim().parse().ok()?;
    let n = search.as_float()?;
    Some(Value::Bool(lo <= n && n <= hi))
}

/// Compile a `/pattern/flags` literal.
///
/// The `i` flag makes the match case-insensitive. A string without the
/// leading `/` is used as the pattern as-is.
pub fn regex_from_literal(literal: &str) -> Result<Regex, EvalError> {
    let (pattern, case_insensitive) = match literal.strip_prefix('/') {
        Some(rest) => match rest.rfind('/') {
            Some(end) => (&rest[..end], rest[end + 1..].contains('i')),
            None => (rest, false),
        },
        None => (literal, false),
    };
    RegexBuilder::new(pattern)
        .case_insensitive(case_insensitive)
        .build()
        .map_err(|e| EvalError::InvalidRegex {
            pattern: pattern.to_string(),
            message: e.to_string(),
        })
}

fn parse_date(text: &str) -> Result<NaiveDateTime, EvalError> {
    NaiveDate::parse_from_str(text.trim(), "%Y-%m-%d")
        .map(|date| date.and_time(NaiveTime::MIN))
        .map_err(|_| EvalError::InvalidDate {
            kind: "date",
            text: text.to_string(),
        })
}

fn parse_time(text: &str) -> Result<NaiveDateTime, EvalError> {
    NaiveDateTime::parse_from_str(text.trim(), "%Y-%m-%d %H:%M:%S").map_err(|_| {
        EvalError::InvalidDate {
            kind: "time",
            text: text.to_string(),
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn in_list_handles_ranges_and_plain_entries() {
        assert!(in_list("1,2,3..5", "4"));
        assert!(in_list("1, 2, 3..5", " 2 "));
        assert!(!in_list("1,2,3..5", "6"));
        assert!(in_list("male,female", "female"));
    }

    #[test]
    fn regex_literal_flags() {
        let regex = regex_from_literal("/^ab/i").unwrap();
        assert!(regex.is_match("ABC"));
        let regex = regex_from_literal("^ab").unwrap();
        assert!(!regex.is_match("ABC"));
    }

    #[test]
    fn invalid_regex_is_an_error() {
        assert!(matches!(
            regex_from_literal("/(/"),
            Err(EvalError::InvalidRegex { .. })
        ));
    }
}
