//! Resolving tokens to values and splicing them into labels.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::config::{Config, RenderOptions};
use crate::interpreter::Evaluator;
use crate::language::{Language, LanguageContext};
use crate::tokens::{
    DataTokenizer, DecorationTokenizer, Decorator, MethodToken, NoopDecorator, PipedToken,
    Separator, Token, TokenName, TokenValues,
};
use crate::types::Subject;

static NOOP_DECORATOR: NoopDecorator = NoopDecorator;

/// `{$0}` or `{$1::gen::pos}` in a context's token mapping.
static MAPPING_PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{\$(\d+)((?:::\w+)*)\}").expect("mapping placeholder pattern should be valid")
});

/// Everything a substitution reads: token values, grammar and presentation.
///
/// # Example
///
/// ```
/// use tml::language::LanguageDefinition;
/// use tml::tokens::{SubstitutionContext, substitute_tokens};
/// use tml::token_values;
///
/// let english = LanguageDefinition::builder().locale("en").build();
/// let values = token_values! { "user" => "Anna" };
/// let context = SubstitutionContext::new(&values, &english);
///
/// assert_eq!(substitute_tokens("Hello [bold: {user}]", &context), "Hello Anna");
/// ```
#[derive(Clone, Copy)]
pub struct SubstitutionContext<'a> {
    pub data: &'a TokenValues,
    pub language: &'a dyn Language,
    pub decorator: &'a dyn Decorator,
    pub config: &'a Config,
    pub options: &'a RenderOptions,
    pub evaluator: &'a Evaluator,
}

impl<'a> SubstitutionContext<'a> {
    /// A context with the no-op decorator and shared defaults.
    pub fn new(data: &'a TokenValues, language: &'a dyn Language) -> Self {
        Self {
            data,
            language,
            decorator: &NOOP_DECORATOR,
            config: Config::shared(),
            options: RenderOptions::shared(),
            evaluator: Evaluator::shared(),
        }
    }

    pub fn with_decorator(self, decorator: &'a dyn Decorator) -> Self {
        Self { decorator, ..self }
    }

    pub fn with_config(self, config: &'a Config) -> Self {
        Self { config, ..self }
    }

    pub fn with_options(self, options: &'a RenderOptions) -> Self {
        Self { options, ..self }
    }

    pub fn with_evaluator(self, evaluator: &'a Evaluator) -> Self {
        Self { evaluator, ..self }
    }
}

/// Substitute data tokens, then decoration tokens, into `label`.
pub fn substitute_tokens(label: &str, context: &SubstitutionContext<'_>) -> String {
    let mut label = label.to_string();
    if label.contains('{') {
        label = DataTokenizer::new(label).substitute(context);
    }
    if label.contains('[') && !context.options.skip_decorations {
        label = DecorationTokenizer::new(label).substitute(context);
    }
    label
}

impl Token {
    /// Replace every occurrence of this token in `label` with its value.
    ///
    /// A token that cannot be resolved leaves `label` unchanged, so the raw
    /// token stays visible in the rendered text.
    pub fn substitute(&self, label: &str, context: &SubstitutionContext<'_>) -> String {
        if !context.options.allows(self.short_name()) {
            return label.to_string();
        }
        let resolved = match self {
            Token::Data(name) => data_value(name, context),
            Token::Method(method) => method_value(method, context),
            Token::Piped(piped) => piped.render(context),
        };
        let Some(value) = resolved else {
            log::warn!("unresolved token '{}' in '{label}'", self.full_name());
            return label.to_string();
        };
        let value = self.apply_language_cases(value, context);
        let value = context.decorator.decorate_token(self, value);
        label.replace(self.full_name(), &value)
    }

    /// The object the token's rules and cases are evaluated against.
    fn subject(&self, context: &SubstitutionContext<'_>) -> Option<Subject> {
        let key = match self {
            Token::Method(method) => method.object_name.as_str(),
            Token::Data(_) | Token::Piped(_) => self.short_name(),
        };
        context.data.get(key).and_then(|data| data.subject())
    }

    fn apply_language_cases(&self, value: String, context: &SubstitutionContext<'_>) -> String {
        if self.case_keys().is_empty() || !context.config.language_cases {
            return value;
        }
        let subject = self.subject(context);
        self.case_keys().iter().fold(value, |value, key| {
            match context.language.case_by_keyword(key) {
                Some(case) => case.apply(
                    &value,
                    subject.as_ref(),
                    context.language,
                    context.decorator,
                    context.options,
                ),
                None => {
                    log::warn!(
                        "language '{}' has no case '{key}' for token '{}'",
                        context.language.locale(),
                        self.full_name()
                    );
                    value
                }
            }
        })
    }
}

/// The configured default applies only when no data is present. Data that
/// renders to nothing leaves the token literal.
fn data_value(name: &TokenName, context: &SubstitutionContext<'_>) -> Option<String> {
    match context.data.get(&name.short_name) {
        Some(data) => data.token_value(),
        None => context
            .config
            .default_data(&name.short_name)
            .map(str::to_string),
    }
}

fn method_value(method: &MethodToken, context: &SubstitutionContext<'_>) -> Option<String> {
    let object = context.data.get(&method.object_name)?.subject()?;
    if object.is_null() {
        return None;
    }
    object
        .attribute(&method.method_name)
        .filter(|value| !value.is_null())
        .map(|value| value.to_string())
}

impl PipedToken {
    /// The context governing this token: the one named by its first context
    /// key, else the one whose token expression matches its name.
    pub fn language_context<'l>(&self, language: &'l dyn Language) -> Option<&'l LanguageContext> {
        match self.name.context_keys.first() {
            Some(keyword) => language.context_by_keyword(keyword),
            None => language.context_by_token_name(&self.name.short_name),
        }
    }

    /// The phrase selected for `subject`, before the value is spliced in.
    pub fn select_variant(
        &self,
        subject: &Subject,
        context: &SubstitutionContext<'_>,
    ) -> Option<String> {
        let Some(language_context) = self.language_context(context.language) else {
            log::warn!("no language context for token '{}'", self.name.full_name);
            return None;
        };
        let variants = self.variants(language_context, subject, context)?;
        language_context
            .find_matching_rule_with(context.evaluator, subject)
            .and_then(|rule| variants.get(&rule.keyword))
            .or_else(|| variants.get(&language_context.default_key))
            .cloned()
    }

    fn render(&self, context: &SubstitutionContext<'_>) -> Option<String> {
        let data = context.data.get(&self.name.short_name)?;
        let phrase = self.select_variant(&data.subject()?, context)?;
        match self.separator {
            Separator::Display => Some(format!("{} {phrase}", data.token_value()?)),
            Separator::Substitute => {
                let placeholder = format!("#{}#", self.name.short_name);
                if phrase.contains(&placeholder) {
                    Some(phrase.replace(&placeholder, &data.token_value()?))
                } else {
                    Some(phrase)
                }
            }
        }
    }

    /// Phrases keyed by rule keyword: literal `keyword: phrase` parameters,
    /// or the context's token mapping filled with the parameters.
    fn variants(
        &self,
        language_context: &LanguageContext,
        subject: &Subject,
        context: &SubstitutionContext<'_>,
    ) -> Option<BTreeMap<String, String>> {
        if self.params.first().is_some_and(|param| param.contains(':')) {
            return Some(
                self.params
                    .iter()
                    .filter_map(|param| param.split_once(':'))
                    .map(|(keyword, phrase)| {
                        (keyword.trim().to_string(), phrase.trim().to_string())
                    })
                    .collect(),
            );
        }
        let mapping = language_context
            .token_mapping
            .as_ref()
            .and_then(|mapping| mapping.for_arity(self.params.len()));
        let Some(mapping) = mapping else {
            log::warn!(
                "context '{}' cannot map {} parameters of token '{}'",
                language_context.keyword,
                self.params.len(),
                self.name.full_name
            );
            return None;
        };
        mapping
            .iter()
            .map(|(keyword, template)| {
                let phrase = self.fill_mapping(template, subject, context)?;
                Some((keyword.clone(), phrase))
            })
            .collect()
    }

    fn fill_mapping(
        &self,
        template: &str,
        subject: &Subject,
        context: &SubstitutionContext<'_>,
    ) -> Option<String> {
        let mut filled = String::with_capacity(template.len());
        let mut last = 0;
        for captures in MAPPING_PLACEHOLDER.captures_iter(template) {
            let whole = captures.get(0)?;
            filled.push_str(&template[last..whole.start()]);
            filled.push_str(&self.mapping_value(&captures, subject, context)?);
            last = whole.end();
        }
        filled.push_str(&template[last..]);
        Some(filled)
    }

    fn mapping_value(
        &self,
        captures: &Captures<'_>,
        subject: &Subject,
        context: &SubstitutionContext<'_>,
    ) -> Option<String> {
        let index: usize = captures[1].parse().ok()?;
        let Some(param) = self.params.get(index) else {
            log::warn!(
                "token '{}' has no parameter {index}",
                self.name.full_name
            );
            return None;
        };
        let mut value = param.clone();
        for key in captures[2].split("::").filter(|key| !key.is_empty()) {
            let Some(case) = context.language.case_by_keyword(key) else {
                log::warn!(
                    "language '{}' has no case '{key}' for token '{}'",
                    context.language.locale(),
                    self.name.full_name
                );
                return None;
            };
            value = case.apply(
                &value,
                Some(subject),
                context.language,
                context.decorator,
                context.options,
            );
        }
        Some(value)
    }
}
