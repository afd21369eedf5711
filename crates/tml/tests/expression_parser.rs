//! Integration tests for the rule expression parser.

use proptest::prelude::*;
use tml::parser::{Expr, ParseError, parse, try_parse};

fn list(items: Vec<Expr>) -> Expr {
    Expr::List(items)
}

fn sym(name: &str) -> Expr {
    Expr::symbol(name)
}

// =============================================================================
// Atoms
// =============================================================================

#[test]
fn parse_integer_atom() {
    assert_eq!(parse("42"), Expr::Int(42));
}

#[test]
fn parse_integer_overflow_stays_symbol() {
    assert_eq!(
        parse("99999999999999999999"),
        sym("99999999999999999999")
    );
}

#[test]
fn parse_variable_atom() {
    assert_eq!(parse("@gender"), sym("@gender"));
}

#[test]
fn parse_double_quoted_literal_keeps_spaces() {
    assert_eq!(parse(r#""one, two ""#), Expr::string("one, two "));
}

#[test]
fn parse_single_quoted_literal() {
    assert_eq!(parse("'/^[aeiou]/i'"), Expr::string("/^[aeiou]/i"));
}

#[test]
fn parse_blank_input_is_empty_list() {
    assert_eq!(parse(""), list(vec![]));
    assert_eq!(parse("   \n\t"), list(vec![]));
}

// =============================================================================
// Lists
// =============================================================================

#[test]
fn parse_plural_rule() {
    let expr = parse("(&& (= 1 (mod @n 10)) (!= 11 (mod @n 100)))");
    assert_eq!(
        expr,
        list(vec![
            sym("&&"),
            list(vec![
                sym("="),
                Expr::Int(1),
                list(vec![sym("mod"), sym("@n"), Expr::Int(10)]),
            ]),
            list(vec![
                sym("!="),
                Expr::Int(11),
                list(vec![sym("mod"), sym("@n"), Expr::Int(100)]),
            ]),
        ])
    );
}

#[test]
fn parse_operator_runs_are_single_symbols() {
    assert_eq!(
        parse("(<= @n 4)"),
        list(vec![sym("<="), sym("@n"), Expr::Int(4)])
    );
}

#[test]
fn parse_empty_list() {
    assert_eq!(parse("()"), list(vec![]));
}

#[test]
fn parse_skips_stray_characters() {
    assert_eq!(
        parse("(in ; \"1,2\" ? @n)"),
        list(vec![sym("in"), Expr::string("1,2"), sym("@n")])
    );
}

#[test]
fn parse_returns_first_expression_only() {
    assert_eq!(parse("(true) (false)"), list(vec![sym("true")]));
}

#[test]
fn operator_of_list() {
    assert_eq!(parse("(mod @n 10)").operator(), Some("mod"));
    assert_eq!(parse("@n").operator(), None);
    assert_eq!(parse("()").operator(), None);
}

// =============================================================================
// Malformed Input
// =============================================================================

#[test]
fn parse_unclosed_list_yields_partial_tree() {
    assert_eq!(
        parse("(= 1 (mod @n 10"),
        list(vec![
            sym("="),
            Expr::Int(1),
            list(vec![sym("mod"), sym("@n"), Expr::Int(10)]),
        ])
    );
}

#[test]
fn parse_stray_close_is_a_symbol() {
    assert_eq!(parse(")"), sym(")"));
}

#[test]
fn try_parse_accepts_balanced_input() {
    assert_eq!(try_parse("(= 1 @n)"), Ok(parse("(= 1 @n)")));
}

#[test]
fn try_parse_reports_unclosed_list() {
    assert_eq!(
        try_parse("(= 1\n  (mod @n 10)"),
        Err(ParseError::Unclosed { line: 1, column: 1 })
    );
}

#[test]
fn try_parse_reports_unexpected_close() {
    assert_eq!(
        try_parse(") @n"),
        Err(ParseError::UnexpectedClose { line: 1, column: 1 })
    );
}

#[test]
fn try_parse_reports_trailing_input() {
    assert_eq!(
        try_parse("(true) (false)"),
        Err(ParseError::TrailingInput { line: 1, column: 8 })
    );
}

#[test]
fn try_parse_reports_empty_input() {
    assert_eq!(try_parse("  "), Err(ParseError::Empty));
}

#[test]
fn parse_error_display() {
    let error = ParseError::Unclosed { line: 2, column: 5 };
    assert_eq!(error.to_string(), "unclosed '(' opened at 2:5");
}

// =============================================================================
// Display
// =============================================================================

#[test]
fn display_reserializes_prefix_notation() {
    let source = "(&& (= 1 (mod @n 10)) (in \"2..4\" @n))";
    assert_eq!(parse(source).to_string(), source);
}

#[test]
fn display_quotes_strings_containing_double_quotes() {
    let expr = list(vec![sym("append"), Expr::string("\"x\""), sym("@value")]);
    insta::assert_snapshot!(expr.to_string(), @r#"(append '"x"' @value)"#);
    assert_eq!(parse(&expr.to_string()), expr);
}

// =============================================================================
// Round Trip
// =============================================================================

fn atom() -> impl Strategy<Value = Expr> {
    prop_oneof![
        (0..=i64::MAX).prop_map(Expr::Int),
        "[a-z_][a-z0-9_]{0,6}".prop_map(Expr::Symbol),
        "@[a-z][a-z0-9_]{0,6}".prop_map(Expr::Symbol),
        prop::sample::select(vec!["+", "-", "=", "!=", "<=", ">=", "&&", "||", "%", "/"])
            .prop_map(Expr::symbol),
        "[a-z0-9 ,.]{0,8}".prop_map(Expr::Str),
    ]
}

fn expr() -> impl Strategy<Value = Expr> {
    atom().prop_recursive(4, 32, 6, |inner| {
        prop::collection::vec(inner, 0..6).prop_map(Expr::List)
    })
}

proptest! {
    #[test]
    fn display_then_parse_round_trips(expr in expr()) {
        prop_assert_eq!(parse(&expr.to_string()), expr);
    }
}
