//! Rule expression parser using winnow.
//!
//! Lexes a rule string into parentheses, words, variables, operator runs and
//! quoted literals, then builds the nested [`Expr`] tree. Characters that
//! match no lexeme (whitespace, stray punctuation) are skipped.

use std::iter::Peekable;
use std::vec::IntoIter;

use winnow::combinator::{alt, delimited};
use winnow::prelude::*;
use winnow::token::{any, one_of, take_till, take_while};

use super::ast::Expr;
use super::error::ParseError;

/// Sigil that starts a variable reference.
pub const VARIABLE_SIGIL: char = '@';

/// A lexeme with its byte offset in the source.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Spanned<'s> {
    lexeme: Lexeme<'s>,
    offset: usize,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Lexeme<'s> {
    Open,
    Close,
    Word(&'s str),
    Quoted(&'s str),
}

/// Parse a rule string into an expression.
///
/// Parsing never fails: blank input yields the empty list, and unbalanced
/// parentheses yield the partial tree read so far. Only the first top-level
/// expression is returned.
///
/// # Example
///
/// ```
/// use tml::parser::{Expr, parse};
///
/// let expr = parse("(mod @n 10)");
/// assert_eq!(
///     expr,
///     Expr::List(vec![Expr::symbol("mod"), Expr::symbol("@n"), Expr::Int(10)])
/// );
/// ```
pub fn parse(input: &str) -> Expr {
    let mut lexemes = lex(input).into_iter().peekable();
    if lexemes.peek().is_none() {
        return Expr::List(Vec::new());
    }
    parse_expr(&mut lexemes).unwrap_or_else(|| Expr::List(Vec::new()))
}

/// Parse a rule string, rejecting unbalanced or trailing input.
///
/// Returns the same tree as [`parse`] for well-formed input.
pub fn try_parse(input: &str) -> Result<Expr, ParseError> {
    let lexemes = lex(input);
    if lexemes.is_empty() {
        return Err(ParseError::Empty);
    }

    let mut open: Vec<usize> = Vec::new();
    let mut end = None;
    for (index, spanned) in lexemes.iter().enumerate() {
        match spanned.lexeme {
            Lexeme::Open => open.push(spanned.offset),
            Lexeme::Close => {
                if open.pop().is_none() {
                    let (line, column) = calculate_position(input, spanned.offset);
                    return Err(ParseError::UnexpectedClose { line, column });
                }
            }
            Lexeme::Word(_) | Lexeme::Quoted(_) => {}
        }
        if open.is_empty() {
            end = Some(index);
            break;
        }
    }

    if let Some(&offset) = open.first() {
        let (line, column) = calculate_position(input, offset);
        return Err(ParseError::Unclosed { line, column });
    }
    if let Some(next) = end.and_then(|index| lexemes.get(index + 1)) {
        let (line, column) = calculate_position(input, next.offset);
        return Err(ParseError::TrailingInput { line, column });
    }

    Ok(parse(input))
}

/// Calculate line and column from a byte offset.
fn calculate_position(input: &str, offset: usize) -> (usize, usize) {
    let consumed = &input[..offset];
    let line = consumed.chars().filter(|&c| c == '\n').count() + 1;
    let column = match consumed.rfind('\n') {
        Some(pos) => offset - pos,
        None => offset + 1,
    };
    (line, column)
}

fn parse_expr(lexemes: &mut Peekable<IntoIter<Spanned<'_>>>) -> Option<Expr> {
    let spanned = lexemes.next()?;
    Some(match spanned.lexeme {
        Lexeme::Open => parse_list(lexemes),
        Lexeme::Close => Expr::Symbol(")".to_string()),
        Lexeme::Quoted(text) => Expr::Str(text.to_string()),
        Lexeme::Word(word) => atom(word),
    })
}

/// Parse list children until the matching `)` or the end of input.
fn parse_list(lexemes: &mut Peekable<IntoIter<Spanned<'_>>>) -> Expr {
    let mut items = Vec::new();
    loop {
        match lexemes.peek() {
            None => break,
            Some(Spanned {
                lexeme: Lexeme::Close,
                ..
            }) => {
                lexemes.next();
                break;
            }
            Some(_) => {
                if let Some(item) = parse_expr(lexemes) {
                    items.push(item);
                }
            }
        }
    }
    Expr::List(items)
}

fn atom(word: &str) -> Expr {
    if word.bytes().all(|b| b.is_ascii_digit()) {
        if let Ok(n) = word.parse::<i64>() {
            return Expr::Int(n);
        }
    }
    Expr::Symbol(word.to_string())
}

fn lex(input: &str) -> Vec<Spanned<'_>> {
    let mut remaining = input;
    let mut lexemes = Vec::new();
    while !remaining.is_empty() {
        let offset = input.len() - remaining.len();
        match lexeme(&mut remaining) {
            Ok(Some(lexeme)) => lexemes.push(Spanned { lexeme, offset }),
            Ok(None) => {}
            Err(_) => break,
        }
    }
    lexemes
}

/// Lex one lexeme, or skip one unrecognized character.
fn lexeme<'s>(input: &mut &'s str) -> ModalResult<Option<Lexeme<'s>>> {
    alt((
        '('.value(Some(Lexeme::Open)),
        ')'.value(Some(Lexeme::Close)),
        take_while(1.., is_word_char).map(|w| Some(Lexeme::Word(w))),
        (one_of(VARIABLE_SIGIL), take_while(1.., is_word_char))
            .take()
            .map(|w| Some(Lexeme::Word(w))),
        take_while(1.., is_operator_char).map(|w| Some(Lexeme::Word(w))),
        delimited('"', take_till(0.., '"'), '"').map(|s| Some(Lexeme::Quoted(s))),
        delimited('\'', take_till(0.., '\''), '\'').map(|s| Some(Lexeme::Quoted(s))),
        any.value(None),
    ))
    .parse_next(input)
}

fn is_word_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

fn is_operator_char(c: char) -> bool {
    matches!(
        c,
        '+' | '-' | '!' | '|' | '=' | '>' | '<' | '&' | '*' | '/' | '%'
    )
}
