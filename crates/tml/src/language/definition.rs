//! The language capability consumed by the substitution pipeline, and an
//! in-memory implementation loadable from JSON language data.

use bon::Builder;
use serde::Deserialize;

use crate::language::{LanguageCase, LanguageContext};

/// Grammar data for one locale.
///
/// The pipeline only reads through this trait, so hosts can back it with
/// whatever storage they already have.
pub trait Language: Send + Sync {
    /// The locale code, e.g. `"ru"`.
    fn locale(&self) -> &str;

    /// The context with the given keyword (`"number"`, `"gender"`, ...).
    fn context_by_keyword(&self, keyword: &str) -> Option<&LanguageContext>;

    /// The context whose token expression matches `token_name`.
    fn context_by_token_name(&self, token_name: &str) -> Option<&LanguageContext>;

    /// The language case with the given keyword (`"gen"`, `"pos"`, ...).
    fn case_by_keyword(&self, keyword: &str) -> Option<&LanguageCase>;
}

/// A language held entirely in memory.
///
/// Contexts are consulted in declaration order when inferring a context
/// from a token name.
///
/// # Example
///
/// ```
/// use tml::language::{Language, LanguageContext, LanguageDefinition};
///
/// let english = LanguageDefinition::builder()
///     .locale("en")
///     .contexts(vec![
///         LanguageContext::builder()
///             .keyword("number")
///             .token_expression("/.*(count|num)(\\d)*$/")
///             .build(),
///     ])
///     .build();
///
/// assert!(english.context_by_keyword("number").is_some());
/// assert!(english.context_by_token_name("item_count").is_some());
/// assert!(english.context_by_token_name("user").is_none());
/// ```
#[derive(Debug, Clone, Default, Builder, Deserialize)]
#[builder(on(String, into))]
pub struct LanguageDefinition {
    pub locale: String,

    #[builder(default)]
    #[serde(default)]
    pub name: String,

    #[builder(default)]
    #[serde(default)]
    pub contexts: Vec<LanguageContext>,

    #[builder(default)]
    #[serde(default)]
    pub cases: Vec<LanguageCase>,
}

impl Language for LanguageDefinition {
    fn locale(&self) -> &str {
        &self.locale
    }

    fn context_by_keyword(&self, keyword: &str) -> Option<&LanguageContext> {
        self.contexts
            .iter()
            .find(|context| context.keyword == keyword)
    }

    fn context_by_token_name(&self, token_name: &str) -> Option<&LanguageContext> {
        self.contexts
            .iter()
            .find(|context| context.applies_to_token(token_name))
    }

    fn case_by_keyword(&self, keyword: &str) -> Option<&LanguageCase> {
        self.cases.iter().find(|case| case.keyword == keyword)
    }
}
