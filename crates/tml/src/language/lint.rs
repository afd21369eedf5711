//! Static lint rules for language data.
//!
//! Checks rule sources without evaluating them against real values, so broken
//! grammar data is caught when it is loaded rather than when a phrase
//! silently falls back at render time.

use std::collections::BTreeSet;

use thiserror::Error;

use crate::interpreter::{Evaluator, compute_suggestions};
use crate::language::{LanguageContextRule, LanguageDefinition};
use crate::parser::{Expr, ParseError, try_parse};

/// A problem found in language data.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuleWarning {
    /// A rule's conditions or operations do not parse.
    #[error("{owner} rule '{rule}': cannot parse {field}: {error}")]
    Unparseable {
        owner: String,
        rule: String,
        field: &'static str,
        error: ParseError,
    },

    /// A rule calls an operator the evaluator does not know.
    #[error(
        "{owner} rule '{rule}': unknown operator '{operator}'{}",
        format_suggestions(suggestions)
    )]
    UnknownOperator {
        owner: String,
        rule: String,
        operator: String,
        suggestions: Vec<String>,
    },

    /// A context has no rule for its fallback keyword.
    #[error("context '{context}' has no fallback rule '{default_key}'")]
    MissingFallback { context: String, default_key: String },

    /// Two contexts, two cases, or two rules of one owner share a keyword.
    #[error("duplicate {kind} keyword '{keyword}' in {owner}")]
    DuplicateKeyword {
        kind: &'static str,
        keyword: String,
        owner: String,
    },
}

fn format_suggestions(suggestions: &[String]) -> String {
    if suggestions.is_empty() {
        String::new()
    } else {
        format!(" (did you mean: {}?)", suggestions.join(", "))
    }
}

/// Runs all lint rules over a language definition, returning warnings.
///
/// Operators are checked against `evaluator`, so lint with the same evaluator
/// the language will be rendered with.
pub fn lint_language(language: &LanguageDefinition, evaluator: &Evaluator) -> Vec<RuleWarning> {
    let mut warnings = Vec::new();
    let owner = format!("language '{}'", language.locale);
    lint_duplicates(
        "context",
        &owner,
        language.contexts.iter().map(|context| context.keyword.as_str()),
        &mut warnings,
    );
    lint_duplicates(
        "case",
        &owner,
        language.cases.iter().map(|case| case.keyword.as_str()),
        &mut warnings,
    );

    for context in &language.contexts {
        let owner = format!("context '{}'", context.keyword);
        if !context.rules.is_empty() && context.fallback_rule().is_none() {
            warnings.push(RuleWarning::MissingFallback {
                context: context.keyword.clone(),
                default_key: context.default_key.clone(),
            });
        }
        lint_rules(&owner, &context.rules, evaluator, &mut warnings);
    }
    for case in &language.cases {
        let owner = format!("case '{}'", case.keyword);
        lint_rules(&owner, &case.rules, evaluator, &mut warnings);
    }
    warnings
}

fn lint_duplicates<'a>(
    kind: &'static str,
    owner: &str,
    keywords: impl Iterator<Item = &'a str>,
    warnings: &mut Vec<RuleWarning>,
) {
    let mut seen = BTreeSet::new();
    let mut reported = BTreeSet::new();
    for keyword in keywords {
        if !seen.insert(keyword) && reported.insert(keyword) {
            warnings.push(RuleWarning::DuplicateKeyword {
                kind,
                keyword: keyword.to_string(),
                owner: owner.to_string(),
            });
        }
    }
}

fn lint_rules(
    owner: &str,
    rules: &[LanguageContextRule],
    evaluator: &Evaluator,
    warnings: &mut Vec<RuleWarning>,
) {
    lint_duplicates(
        "rule",
        owner,
        rules.iter().map(|rule| rule.keyword.as_str()),
        warnings,
    );
    for rule in rules {
        let sources = [
            ("conditions", Some(rule.conditions.as_str())),
            ("operations", rule.operations.as_deref()),
        ];
        for (field, source) in sources {
            let Some(source) = source.filter(|source| !source.trim().is_empty()) else {
                continue;
            };
            match try_parse(source) {
                Ok(expr) => lint_operators(owner, rule, &expr, evaluator, warnings),
                Err(error) => warnings.push(RuleWarning::Unparseable {
                    owner: owner.to_string(),
                    rule: rule.keyword.clone(),
                    field,
                    error,
                }),
            }
        }
    }
}

/// Reports every list head that names no registered operation, once per
/// operator per rule source.
fn lint_operators(
    owner: &str,
    rule: &LanguageContextRule,
    expr: &Expr,
    evaluator: &Evaluator,
    warnings: &mut Vec<RuleWarning>,
) {
    let mut unknown = BTreeSet::new();
    collect_unknown(expr, evaluator, &mut unknown);
    for operator in unknown {
        let suggestions = compute_suggestions(&operator, evaluator.operation_names());
        warnings.push(RuleWarning::UnknownOperator {
            owner: owner.to_string(),
            rule: rule.keyword.clone(),
            operator,
            suggestions,
        });
    }
}

fn collect_unknown(expr: &Expr, evaluator: &Evaluator, unknown: &mut BTreeSet<String>) {
    let Expr::List(items) = expr else {
        return;
    };
    let operator = expr.operator();
    if let Some(operator) = operator.filter(|operator| !evaluator.has_operation(operator)) {
        unknown.insert(operator.to_string());
    }
    let takes_list = matches!(operator, Some("count" | "all" | "any"));
    for (index, item) in items.iter().enumerate() {
        // `(count ('a' 'b'))` counts a literal list.
        let literal = takes_list
            && index == 1
            && matches!(item, Expr::List(_))
            && item
                .operator()
                .is_none_or(|head| !evaluator.has_operation(head));
        if !literal {
            collect_unknown(item, evaluator, unknown);
        }
    }
}
