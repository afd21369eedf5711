//! Placeholder tokens: extraction from labels and substitution.
//!
//! Data tokens (`{name}`, `{user.name}`, `{count|| item, items}`) are found by
//! [`DataTokenizer`]; bracket markup (`[bold: text]`) by
//! [`DecorationTokenizer`]. [`substitute_tokens`] runs both.

mod data;
mod decoration;
mod decorator;
mod substitute;
mod token;
mod tokenizer;

pub use data::{Decoration, DecorationFn, TokenData, TokenValues, ValueHolder};
pub use decoration::{DecorationNode, DecorationTokenizer, RESERVED_TOKEN};
pub use decorator::{Decorator, NoopDecorator};
pub use substitute::{SubstitutionContext, substitute_tokens};
pub use token::{MethodToken, PipedToken, Separator, Token, TokenName};
pub use tokenizer::DataTokenizer;
