//! Integration tests for rule evaluation.

use chrono::NaiveDate;
use proptest::prelude::*;
use tml::interpreter::{Bindings, EvalError, Evaluator};
use tml::parser::{Expr, parse};
use tml::Value;

fn eval(rule: &str) -> Value {
    Evaluator::shared().evaluate_str(rule, &mut Bindings::new())
}

fn eval_with(rule: &str, bindings: Bindings) -> Value {
    let mut bindings = bindings;
    Evaluator::shared().evaluate_str(rule, &mut bindings)
}

fn eval_n(rule: &str, n: i64) -> Value {
    eval_with(rule, Bindings::new().with("@n", n))
}

// =============================================================================
// Atoms and Bindings
// =============================================================================

#[test]
fn literals_evaluate_to_themselves() {
    assert_eq!(eval("42"), Value::Int(42));
    assert_eq!(eval("'hello world'"), Value::from("hello world"));
}

#[test]
fn bound_symbol_resolves_to_value() {
    assert_eq!(eval_n("@n", 7), Value::Int(7));
}

#[test]
fn unbound_symbol_is_self_evaluating() {
    assert_eq!(eval("@missing"), Value::from("@missing"));
    assert_eq!(eval("female"), Value::from("female"));
}

#[test]
fn quoted_string_is_not_resolved_against_bindings() {
    assert_eq!(eval_n("\"@n\"", 7), Value::from("@n"));
}

#[test]
fn empty_list_is_null() {
    assert_eq!(eval("()"), Value::Null);
    assert_eq!(eval(""), Value::Null);
}

// =============================================================================
// Plural Rules
// =============================================================================

const RUSSIAN_ONE: &str = "(&& (= 1 (mod @n 10)) (!= 11 (mod @n 100)))";
const RUSSIAN_FEW: &str =
    "(&& (in '2..4' (mod @n 10)) (not (in '12..14' (mod @n 100))))";

#[test]
fn russian_one_rule() {
    for n in [1, 21, 31, 101] {
        assert_eq!(eval_n(RUSSIAN_ONE, n), Value::Bool(true), "n = {n}");
    }
    for n in [0, 2, 11, 111] {
        assert_eq!(eval_n(RUSSIAN_ONE, n), Value::Bool(false), "n = {n}");
    }
}

#[test]
fn russian_few_rule() {
    for n in [2, 3, 4, 22, 104] {
        assert_eq!(eval_n(RUSSIAN_FEW, n), Value::Bool(true), "n = {n}");
    }
    for n in [1, 5, 12, 13, 14, 112] {
        assert_eq!(eval_n(RUSSIAN_FEW, n), Value::Bool(false), "n = {n}");
    }
}

proptest! {
    #[test]
    fn mod_matches_truncating_remainder(n in any::<i64>(), d in 1i64..1000) {
        let bindings = Bindings::new().with("@n", n).with("@d", d);
        prop_assert_eq!(eval_with("(mod @n @d)", bindings), Value::Int(n % d));
    }
}

#[test]
fn mod_of_negative_truncates() {
    assert_eq!(eval_n("(% @n 10)", -21), Value::Int(-1));
}

#[test]
fn mod_of_float_is_null() {
    let bindings = Bindings::new().with("@n", 2.5);
    assert_eq!(eval_with("(mod @n 2)", bindings), Value::Null);
}

#[test]
fn mod_by_zero_is_null() {
    assert_eq!(eval_n("(mod @n 0)", 5), Value::Null);
}

// =============================================================================
// Arithmetic
// =============================================================================

#[test]
fn integer_arithmetic() {
    assert_eq!(eval("(+ 2 3)"), Value::Int(5));
    assert_eq!(eval("(- 2 3)"), Value::Int(-1));
    assert_eq!(eval("(* 4 3)"), Value::Int(12));
    assert_eq!(eval("(/ 7 2)"), Value::Int(3));
}

#[test]
fn float_operand_promotes() {
    let bindings = Bindings::new().with("@x", 1.5);
    assert_eq!(eval_with("(+ @x 1)", bindings), Value::Float(2.5));
}

#[test]
fn numeric_strings_add_numerically() {
    let bindings = Bindings::new().with("@n", "2");
    assert_eq!(eval_with("(+ @n 3)", bindings), Value::Int(5));
}

#[test]
fn plus_concatenates_strings() {
    assert_eq!(eval("(+ 'foo' 'bar')"), Value::from("foobar"));
    assert_eq!(eval("(+ '1' '2')"), Value::from("12"));
}

#[test]
fn non_numeric_arithmetic_is_null() {
    assert_eq!(eval("(- 'foo' 1)"), Value::Null);
    assert_eq!(eval("(* 'foo' 'bar')"), Value::Null);
    assert_eq!(eval("(/ 1 0)"), Value::Null);
}

// =============================================================================
// Comparisons
// =============================================================================

#[test]
fn numeric_comparisons() {
    assert_eq!(eval_n("(< @n 5)", 3), Value::Bool(true));
    assert_eq!(eval_n("(>= @n 5)", 5), Value::Bool(true));
    assert_eq!(eval_n("(> @n '10')", 9), Value::Bool(false));
    assert_eq!(eval("(= 1 '1')"), Value::Bool(true));
}

#[test]
fn string_equality() {
    let bindings = Bindings::new().with("@gender", "female");
    assert_eq!(
        eval_with("(= 'female' @gender)", bindings.clone()),
        Value::Bool(true)
    );
    assert_eq!(eval_with("(!= 'male' @gender)", bindings), Value::Bool(true));
}

#[test]
fn string_ordering_compares_length() {
    assert_eq!(eval("(< 'zz' 'aaa')"), Value::Bool(true));
    assert_eq!(eval("(> 'zz' 'aaa')"), Value::Bool(false));
}

#[test]
fn date_comparisons() {
    let date = NaiveDate::from_ymd_opt(2024, 3, 15)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap();
    let bindings = Bindings::new().with("@date", date);
    assert_eq!(
        eval_with("(< @date (date '2024-04-01'))", bindings.clone()),
        Value::Bool(true)
    );
    assert_eq!(
        eval_with("(> @date '2024-01-01')", bindings.clone()),
        Value::Bool(true)
    );
    assert_eq!(
        eval_with("(= @date (time '2024-03-15 00:00:00'))", bindings),
        Value::Bool(true)
    );
}

#[test]
fn invalid_date_literal_is_null() {
    assert_eq!(eval("(date 'yesterday')"), Value::Null);
}

// =============================================================================
// Ranges and Membership
// =============================================================================

#[test]
fn within_is_inclusive() {
    assert_eq!(eval("(within '0..3' '3')"), Value::Bool(true));
    assert_eq!(eval("(within '0..3' '0')"), Value::Bool(true));
    assert_eq!(eval("(within '0..3' '4')"), Value::Bool(false));
    assert_eq!(eval("(within '0..3' '2.5')"), Value::Bool(true));
}

#[test]
fn within_non_numeric_is_null() {
    assert_eq!(eval("(within '0..3' 'abc')"), Value::Null);
}

#[test]
fn in_list_and_ranges() {
    let rule = "(in '1, 3..5, 10' @n)";
    for n in [1, 3, 4, 5, 10] {
        assert_eq!(eval_n(rule, n), Value::Bool(true), "n = {n}");
    }
    for n in [2, 6, 11] {
        assert_eq!(eval_n(rule, n), Value::Bool(false), "n = {n}");
    }
}

#[test]
fn in_matches_words() {
    let bindings = Bindings::new().with("@gender", "female");
    assert_eq!(
        eval_with("(in 'male, female' @gender)", bindings),
        Value::Bool(true)
    );
}

// =============================================================================
// Special Forms
// =============================================================================

#[test]
fn if_evaluates_taken_branch_only() {
    let mut bindings = Bindings::new();
    let result = Evaluator::shared().evaluate_str(
        "(if (true) 'yes' (let @touched 1))",
        &mut bindings,
    );
    assert_eq!(result, Value::from("yes"));
    assert!(!bindings.contains("@touched"));
}

#[test]
fn cond_without_else_is_null() {
    assert_eq!(eval("(cond (false) 'yes')"), Value::Null);
}

#[test]
fn and_or_short_circuit() {
    let mut bindings = Bindings::new();
    let evaluator = Evaluator::shared();
    assert_eq!(
        evaluator.evaluate_str("(&& (false) (let @a 1))", &mut bindings),
        Value::Bool(false)
    );
    assert_eq!(
        evaluator.evaluate_str("(|| (true) (let @b 1))", &mut bindings),
        Value::Bool(true)
    );
    assert!(bindings.is_empty());
}

#[test]
fn let_assigns_into_bindings() {
    let mut bindings = Bindings::new();
    let result = Evaluator::shared().evaluate_str("(label @x (+ 1 2))", &mut bindings);
    assert_eq!(result, Value::Int(3));
    assert_eq!(bindings.get("@x"), Some(&Value::Int(3)));
}

#[test]
fn quote_car_cdr() {
    assert_eq!(
        eval("(quote (a b c))"),
        Value::from(vec!["a", "b", "c"])
    );
    assert_eq!(eval("(car (quote (a b c)))"), Value::from("a"));
    assert_eq!(eval("(cdr (quote (a b c)))"), Value::from(vec!["b", "c"]));
}

#[test]
fn count_all_any_over_bound_list() {
    let genders = Bindings::new().with("@genders", vec!["female", "female"]);
    assert_eq!(
        eval_with("(count @genders)", genders.clone()),
        Value::Int(2)
    );
    assert_eq!(
        eval_with("(all @genders 'female')", genders.clone()),
        Value::Bool(true)
    );
    assert_eq!(
        eval_with("(any @genders 'male')", genders),
        Value::Bool(false)
    );
}

#[test]
fn count_all_any_over_literal_list() {
    assert_eq!(eval("(count (1 2 3))"), Value::Int(3));
    assert_eq!(eval("(all ('male' 'male') 'male')"), Value::Bool(true));
    assert_eq!(eval("(any ('female' 'male') 'other')"), Value::Bool(false));
    assert_eq!(eval("(count ())"), Value::Int(0));
}

#[test]
fn count_evaluates_operator_lists() {
    assert_eq!(eval("(count (quote (1 2 3)))"), Value::Int(3));
    assert_eq!(eval("(count (cdr (quote (1 2 3))))"), Value::Int(2));
}

#[test]
fn all_and_any_are_false_on_empty_list() {
    let empty = Bindings::new().with("@genders", Vec::<Value>::new());
    assert_eq!(
        eval_with("(all @genders 'female')", empty.clone()),
        Value::Bool(false)
    );
    assert_eq!(
        eval_with("(any @genders 'female')", empty),
        Value::Bool(false)
    );
}

// =============================================================================
// Strings and Regular Expressions
// =============================================================================

#[test]
fn match_with_regex_literal() {
    let bindings = Bindings::new().with("@value", "Apple");
    assert_eq!(
        eval_with("(match '/^[aeiou]/i' @value)", bindings.clone()),
        Value::Bool(true)
    );
    assert_eq!(
        eval_with("(match '/^[aeiou]/' @value)", bindings),
        Value::Bool(false)
    );
}

#[test]
fn replace_with_regex_literal() {
    let bindings = Bindings::new().with("@value", "city");
    assert_eq!(
        eval_with("(replace '/y$/' 'ies' @value)", bindings),
        Value::from("cities")
    );
}

#[test]
fn append_prepend_and_case_mapping() {
    let bindings = Bindings::new().with("@value", "anna");
    assert_eq!(
        eval_with("(append \"'s\" @value)", bindings.clone()),
        Value::from("anna's")
    );
    assert_eq!(
        eval_with("(prepend 'dear ' @value)", bindings.clone()),
        Value::from("dear anna")
    );
    assert_eq!(
        eval_with("(capitalize @value)", bindings.clone()),
        Value::from("Anna")
    );
    assert_eq!(eval_with("(upcase @value)", bindings), Value::from("ANNA"));
}

#[test]
fn invalid_regex_is_null() {
    assert_eq!(eval("(match '/(/' 'x')"), Value::Null);
}

// =============================================================================
// Failure Semantics
// =============================================================================

#[test]
fn unknown_operator_is_null() {
    assert_eq!(eval("(frobnicate 1 2)"), Value::Null);
}

#[test]
fn wrong_arity_is_null() {
    assert_eq!(eval("(mod 1)"), Value::Null);
    assert_eq!(eval("(within '0..3')"), Value::Null);
}

#[test]
fn non_symbol_head_is_null() {
    assert_eq!(eval("(1 2 3)"), Value::Null);
}

#[test]
fn apply_reports_errors() {
    let evaluator = Evaluator::shared();
    assert_eq!(
        evaluator.apply("mdo", &[]),
        Err(EvalError::UnknownOperator {
            name: "mdo".to_string()
        })
    );
    assert_eq!(
        evaluator.apply("mod", &[Value::Int(1)]),
        Err(EvalError::ArgumentCount {
            operator: "mod".to_string(),
            expected: 2,
            got: 1,
        })
    );
    assert!(matches!(
        evaluator.apply("if", &[]),
        Err(EvalError::SpecialForm { .. })
    ));
}

#[test]
fn eval_error_display() {
    let error = EvalError::ArgumentCount {
        operator: "mod".to_string(),
        expected: 2,
        got: 1,
    };
    assert_eq!(error.to_string(), "'mod' expects 2 arguments, got 1");
}

// =============================================================================
// Extension
// =============================================================================

#[test]
fn custom_operation() {
    let mut evaluator = Evaluator::new();
    evaluator.add_operation("double", |args: &[Value]| match args {
        [value] => value
            .as_int()
            .map_or(Value::Null, |n| Value::Int(n * 2)),
        _ => Value::Null,
    });
    let mut bindings = Bindings::new().with("@n", 21);
    assert_eq!(
        evaluator.evaluate(&parse("(double @n)"), &mut bindings),
        Value::Int(42)
    );
    assert!(!Evaluator::shared().has_operation("double"));
}

#[test]
fn custom_special_form_receives_unevaluated_arguments() {
    let mut evaluator = Evaluator::new();
    evaluator.add_special_form("source", |_: &Evaluator, _: &mut Bindings, args: &[Expr]| {
        Value::from(
            args.iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(" "),
        )
    });
    assert!(evaluator.is_special_form("source"));
    let mut bindings = Bindings::new().with("@n", 1);
    assert_eq!(
        evaluator.evaluate_str("(source @n (+ 1 2))", &mut bindings),
        Value::from("@n (+ 1 2)")
    );
}

#[test]
fn remove_operation() {
    let mut evaluator = Evaluator::new();
    assert!(evaluator.remove_operation("mod"));
    assert!(!evaluator.remove_operation("mod"));
    assert_eq!(
        evaluator.evaluate_str("(mod 5 2)", &mut Bindings::new()),
        Value::Null
    );
}

#[test]
fn empty_evaluator_knows_nothing() {
    let evaluator = Evaluator::empty();
    assert_eq!(evaluator.operation_names().count(), 0);
    assert_eq!(
        evaluator.evaluate_str("(true)", &mut Bindings::new()),
        Value::Null
    );
}
