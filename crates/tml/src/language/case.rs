//! Language cases: grammatical inflections (genitive, possessive, ...)
//! applied to substituted values through `::case` token keys.

use std::sync::LazyLock;

use bon::Builder;
use regex::Regex;
use serde::Deserialize;

use crate::config::RenderOptions;
use crate::interpreter::Bindings;
use crate::language::{Language, LanguageContextRule, VALUE_VARIABLE};
use crate::tokens::Decorator;
use crate::types::{Subject, Value};

const GENDER_VARIABLE: &str = "@gender";
const GENDER_CONTEXT: &str = "gender";
const UNKNOWN_GENDER: &str = "unknown";

/// Splits a value into markup tags, separators and words, in order.
static WORD_PIECES: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"</?[^>]*>|[\s/\\]+|[^\s/\\<]+|<").expect("word pattern should be valid")
});

/// What a case transforms: the whole value, or each word separately.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CaseApplication {
    #[default]
    Phrase,
    Words,
}

/// A named grammatical case with ordered transformation rules.
///
/// # Example
///
/// ```
/// use tml::language::{LanguageCase, LanguageContextRule, LanguageDefinition};
/// use tml::tokens::NoopDecorator;
/// use tml::RenderOptions;
///
/// let possessive = LanguageCase::builder()
///     .keyword("pos")
///     .rules(vec![
///         LanguageContextRule::builder()
///             .keyword("ends_in_s")
///             .conditions("(match '/s$/' @value)")
///             .operations("(append \"'\" @value)")
///             .build(),
///         LanguageContextRule::builder()
///             .keyword("other")
///             .conditions("(true)")
///             .operations("(append \"'s\" @value)")
///             .build(),
///     ])
///     .build();
///
/// let english = LanguageDefinition::builder().locale("en").build();
/// let render = |value| {
///     possessive.apply(value, None, &english, &NoopDecorator, &RenderOptions::default())
/// };
/// assert_eq!(render("Michael"), "Michael's");
/// assert_eq!(render("Chris"), "Chris'");
/// ```
#[derive(Debug, Clone, Builder, Deserialize)]
#[builder(on(String, into))]
pub struct LanguageCase {
    pub keyword: String,

    #[builder(default)]
    #[serde(default)]
    pub latin_name: String,

    #[builder(default)]
    #[serde(default)]
    pub native_name: String,

    #[builder(default)]
    #[serde(default)]
    pub description: String,

    #[builder(default)]
    #[serde(default)]
    pub application: CaseApplication,

    #[builder(default)]
    #[serde(default)]
    pub rules: Vec<LanguageContextRule>,
}

impl LanguageCase {
    /// Transform `value` with the first rule whose conditions hold.
    ///
    /// In [`CaseApplication::Words`] mode each word is transformed on its own;
    /// markup tags and separators pass through unchanged. `subject` supplies
    /// `@gender` for rules that mention it, via the language's gender context.
    /// Transformed elements go through
    /// [`Decorator::decorate_language_case`] unless decorations are skipped.
    pub fn apply(
        &self,
        value: &str,
        subject: Option<&Subject>,
        language: &dyn Language,
        decorator: &dyn Decorator,
        options: &RenderOptions,
    ) -> String {
        if self.rules.is_empty() {
            return value.to_string();
        }
        match self.application {
            CaseApplication::Phrase => {
                self.apply_element(value, subject, language, decorator, options)
            }
            CaseApplication::Words => WORD_PIECES
                .find_iter(value)
                .map(|piece| {
                    let text = piece.as_str();
                    if is_word(text) {
                        self.apply_element(text, subject, language, decorator, options)
                    } else {
                        text.to_string()
                    }
                })
                .collect(),
        }
    }

    fn apply_element(
        &self,
        element: &str,
        subject: Option<&Subject>,
        language: &dyn Language,
        decorator: &dyn Decorator,
        options: &RenderOptions,
    ) -> String {
        let mut bindings = Bindings::new().with(VALUE_VARIABLE, element);
        for rule in &self.rules {
            if rule.conditions.contains(GENDER_VARIABLE) && !bindings.contains(GENDER_VARIABLE) {
                bindings.set(GENDER_VARIABLE, gender_of(subject, language));
            }
            if rule.evaluate(&bindings) {
                let transformed = rule.apply(element, &bindings);
                if transformed == element || options.skip_decorations {
                    return transformed;
                }
                return decorator.decorate_language_case(&self.keyword, element, transformed);
            }
        }
        element.to_string()
    }
}

fn is_word(piece: &str) -> bool {
    !piece.starts_with('<')
        && !piece
            .chars()
            .all(|c| c.is_whitespace() || c == '/' || c == '\\')
}

fn gender_of(subject: Option<&Subject>, language: &dyn Language) -> Value {
    let derived = subject.zip(language.context_by_keyword(GENDER_CONTEXT)).and_then(
        |(subject, context)| context.vars(subject).get(GENDER_VARIABLE).cloned(),
    );
    match derived {
        Some(value) if !value.is_null() => value,
        _ => Value::from(UNKNOWN_GENDER),
    }
}
