pub mod config;
pub mod interpreter;
pub mod language;
pub mod parser;
pub mod tokens;
pub mod types;

pub use config::{Config, RenderOptions};
pub use interpreter::{Bindings, EvalError, Evaluator, compute_suggestions};
pub use language::{
    Language, LanguageCase, LanguageContext, LanguageContextRule, LanguageDefinition, RuleWarning,
    lint_language,
};
pub use parser::{Expr, ParseError, parse, try_parse};
pub use tokens::{
    DataTokenizer, DecorationTokenizer, Decorator, SubstitutionContext, Token, TokenData,
    TokenValues, substitute_tokens,
};
pub use types::{NamedAccessor, Subject, Value};

/// Creates a [`TokenValues`] map from key-value pairs.
///
/// Values are converted via `Into<TokenData>`, so you can pass integers,
/// strings, [`Subject`]s or decorations directly.
///
/// # Example
///
/// ```
/// use tml::tokens::Decoration;
/// use tml::token_values;
///
/// let values = token_values! {
///     "count" => 3,
///     "user" => "Anna",
///     "bold" => Decoration::Template("<b>{$0}</b>".into()),
/// };
/// assert_eq!(values.len(), 3);
/// assert_eq!(values["count"].token_value().as_deref(), Some("3"));
/// ```
#[macro_export]
macro_rules! token_values {
    {} => {
        ::std::collections::HashMap::<String, $crate::TokenData>::new()
    };
    { $($key:expr => $value:expr),+ $(,)? } => {
        {
            let mut map = ::std::collections::HashMap::<String, $crate::TokenData>::new();
            $(
                map.insert(
                    $key.to_string(),
                    ::std::convert::Into::<$crate::TokenData>::into($value),
                );
            )+
            map
        }
    };
}
