//! Language contexts: named groups of ordered rules (plural categories,
//! grammatical gender, ...) and the variables they are evaluated against.

use std::collections::BTreeMap;
use std::sync::OnceLock;

use bon::Builder;
use regex::Regex;
use serde::Deserialize;

use crate::interpreter::{Bindings, Evaluator, regex_from_literal};
use crate::language::LanguageContextRule;
use crate::types::{Subject, Value};

/// Keyword of the fallback rule when a context does not name one.
pub const DEFAULT_FALLBACK_KEY: &str = "other";

/// How a context variable is derived from the token's subject.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VariableSpec {
    /// The subject itself.
    Itself,
    /// A named attribute of the subject.
    Attribute(String),
    /// The named attribute of every element of a list subject.
    ListAttribute(String),
    /// The number of elements of a list subject.
    Size,
}

impl VariableSpec {
    /// The built-in derivation for a variable name.
    pub fn for_name(variable: &str) -> Self {
        match variable {
            "@n" | "@date" | "@time" | "@value" => Self::Itself,
            "@gender" => Self::Attribute("gender".to_string()),
            "@genders" => Self::ListAttribute("gender".to_string()),
            "@size" | "@count" => Self::Size,
            other => Self::Attribute(other.trim_start_matches('@').to_string()),
        }
    }

    /// Derive the variable's value from `subject`.
    pub fn resolve(&self, subject: &Subject) -> Value {
        match self {
            Self::Itself => value_of(subject),
            Self::Attribute(name) => attribute_of(subject, name),
            Self::ListAttribute(name) => match subject {
                Subject::List(items) => Value::List(
                    items
                        .iter()
                        .map(|item| attribute_of(item, name))
                        .collect(),
                ),
                Subject::Value(Value::List(items)) => Value::List(items.clone()),
                other => Value::List(vec![attribute_of(other, name)]),
            },
            Self::Size => match subject {
                Subject::List(items) => Value::from(items.len()),
                Subject::Value(Value::List(items)) => Value::from(items.len()),
                Subject::Value(Value::Null) => Value::Int(0),
                _ => Value::Int(1),
            },
        }
    }
}

fn value_of(subject: &Subject) -> Value {
    match subject {
        Subject::Value(value) => value.clone(),
        Subject::List(items) => Value::List(items.iter().map(value_of).collect()),
        other => other.display().map(Value::Str).unwrap_or_default(),
    }
}

/// A plain string subject stands for its own attributes, so `"female"` can
/// be passed where a gendered object is expected.
fn attribute_of(subject: &Subject, name: &str) -> Value {
    match subject {
        Subject::Value(value @ Value::Str(_)) => value.clone(),
        other => other.attribute(name).unwrap_or_default(),
    }
}

/// A parameter mapping for piped tokens, as declared by a context.
///
/// Maps rule keywords to phrase templates containing `{$N}` placeholders that
/// are filled from the piped token's parameters.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum TokenMapping {
    /// One mapping for any number of parameters.
    Single(BTreeMap<String, String>),
    /// Mappings indexed by parameter count minus one.
    ByArity(Vec<MappingEntry>),
}

/// One arity slot of a [`TokenMapping::ByArity`].
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum MappingEntry {
    /// The literal `"unsupported"` marker (or any other bare string).
    Unsupported(String),
    Map(BTreeMap<String, String>),
}

impl TokenMapping {
    /// The mapping to use for a token with `arity` parameters.
    pub fn for_arity(&self, arity: usize) -> Option<&BTreeMap<String, String>> {
        match self {
            Self::Single(map) => Some(map),
            Self::ByArity(entries) => match entries.get(arity.checked_sub(1)?)? {
                MappingEntry::Map(map) => Some(map),
                MappingEntry::Unsupported(_) => None,
            },
        }
    }
}

/// A named group of rules for one grammatical decision.
///
/// The rules are scanned in declaration order; see
/// [`find_matching_rule`](Self::find_matching_rule).
#[derive(Debug, Clone, Builder, Deserialize)]
#[builder(on(String, into))]
pub struct LanguageContext {
    pub keyword: String,

    #[builder(default)]
    #[serde(default)]
    pub description: String,

    /// All rule keywords, for display and validation.
    #[builder(default)]
    #[serde(default)]
    pub keys: Vec<String>,

    /// Keyword of the fallback rule.
    #[builder(default = DEFAULT_FALLBACK_KEY.to_string())]
    #[serde(default = "default_fallback_key")]
    pub default_key: String,

    /// Regex (optionally in `/pattern/flags` form) matching token names this
    /// context applies to, e.g. `/.*(count|num)(\d)*$/`.
    pub token_expression: Option<String>,

    /// Variables the rules refer to, e.g. `["@n"]`.
    #[builder(default)]
    #[serde(default)]
    pub variables: Vec<String>,

    /// Overrides for how variables are derived from the subject.
    #[builder(default)]
    #[serde(default)]
    pub variable_sources: BTreeMap<String, VariableSpec>,

    pub token_mapping: Option<TokenMapping>,

    #[builder(default)]
    #[serde(default)]
    pub rules: Vec<LanguageContextRule>,

    #[builder(skip)]
    #[serde(skip)]
    token_regex: OnceLock<Option<Regex>>,
}

fn default_fallback_key() -> String {
    DEFAULT_FALLBACK_KEY.to_string()
}

impl LanguageContext {
    /// Derive the evaluation variables for `subject`.
    pub fn vars(&self, subject: &Subject) -> Bindings {
        self.variables
            .iter()
            .map(|variable| {
                let value = match self.variable_sources.get(variable) {
                    Some(spec) => spec.resolve(subject),
                    None => VariableSpec::for_name(variable).resolve(subject),
                };
                (variable.clone(), value)
            })
            .collect()
    }

    /// The fallback rule, if the context declares one.
    pub fn fallback_rule(&self) -> Option<&LanguageContextRule> {
        self.rule(&self.default_key)
    }

    /// Look up a rule by keyword.
    pub fn rule(&self, keyword: &str) -> Option<&LanguageContextRule> {
        self.rules.iter().find(|rule| rule.keyword == keyword)
    }

    /// First rule, in declaration order, whose condition holds for `subject`.
    ///
    /// The fallback rule never matches here; callers that want it use
    /// [`fallback_rule`](Self::fallback_rule) or
    /// [`matching_rule_or_fallback`](Self::matching_rule_or_fallback).
    pub fn find_matching_rule(&self, subject: &Subject) -> Option<&LanguageContextRule> {
        self.find_matching_rule_with(Evaluator::shared(), subject)
    }

    /// [`find_matching_rule`](Self::find_matching_rule) with a caller-supplied
    /// evaluator.
    pub fn find_matching_rule_with(
        &self,
        evaluator: &Evaluator,
        subject: &Subject,
    ) -> Option<&LanguageContextRule> {
        let bindings = self.vars(subject);
        self.rules
            .iter()
            .filter(|rule| rule.keyword != self.default_key)
            .find(|rule| rule.evaluate_with(evaluator, &bindings))
    }

    /// The matching rule, else the fallback rule.
    pub fn matching_rule_or_fallback(&self, subject: &Subject) -> Option<&LanguageContextRule> {
        self.find_matching_rule(subject)
            .or_else(|| self.fallback_rule())
    }

    /// Whether this context governs tokens named `token_name`.
    ///
    /// Contexts without a token expression, or with one that does not
    /// compile, apply to no token.
    pub fn applies_to_token(&self, token_name: &str) -> bool {
        self.token_regex()
            .is_some_and(|regex| regex.is_match(token_name))
    }

    fn token_regex(&self) -> Option<&Regex> {
        self.token_regex
            .get_or_init(|| {
                let source = self.token_expression.as_deref()?;
                regex_from_literal(source)
                    .inspect_err(|error| {
                        log::warn!("context '{}': bad token expression: {error}", self.keyword);
                    })
                    .ok()
            })
            .as_ref()
    }
}
