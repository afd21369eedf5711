//! Per-locale grammar data: contexts for plural and gender decisions, cases
//! for inflections, and the lint that checks them.

mod case;
mod context;
mod definition;
mod lint;
mod rule;

pub use case::{CaseApplication, LanguageCase};
pub use context::{
    DEFAULT_FALLBACK_KEY, LanguageContext, MappingEntry, TokenMapping, VariableSpec,
};
pub use definition::{Language, LanguageDefinition};
pub use lint::{RuleWarning, lint_language};
pub use rule::{LanguageContextRule, VALUE_VARIABLE};
