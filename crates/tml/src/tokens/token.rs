//! Placeholder tokens found in labels.

use std::fmt::{Display, Formatter, Result as FmtResult};

/// Name parts shared by every data token.
///
/// For `{user:gender::gen::pos}`: the short name is `user`, the context keys
/// are `["gender"]` and the case keys are `["gen", "pos"]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenName {
    /// The exact matched text, braces included.
    pub full_name: String,
    pub short_name: String,
    /// The label the token was extracted from.
    pub label: String,
    pub context_keys: Vec<String>,
    pub case_keys: Vec<String>,
}

impl TokenName {
    /// Split `declaration` (the token text without braces and parameters)
    /// into short name, context keys and case keys.
    fn parse(full_name: &str, declaration: &str, label: &str) -> Self {
        let mut cases = declaration.split("::");
        let head = cases.next().unwrap_or_default();
        let mut contexts = head.split(':');
        let short_name = contexts.next().unwrap_or_default().trim().to_string();
        Self {
            full_name: full_name.to_string(),
            short_name,
            label: label.to_string(),
            context_keys: keys(contexts),
            case_keys: keys(cases),
        }
    }
}

/// Trimmed, non-empty, first-occurrence-only keys.
fn keys<'a>(parts: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut keys: Vec<String> = Vec::new();
    for part in parts.map(str::trim).filter(|part| !part.is_empty()) {
        if !keys.iter().any(|key| key == part) {
            keys.push(part.to_string());
        }
    }
    keys
}

/// `{user.name}`: reads an attribute of a token object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodToken {
    pub name: TokenName,
    pub object_name: String,
    pub method_name: String,
}

/// How a piped token renders the selected phrase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Separator {
    /// `||`: the value followed by the phrase, `"5 items"`.
    Display,
    /// `|`: the phrase alone, with `#name#` replaced by the value.
    Substitute,
}

impl Separator {
    pub fn as_str(self) -> &'static str {
        match self {
            Separator::Display => "||",
            Separator::Substitute => "|",
        }
    }
}

/// `{count|| item, items}` or `{user| He, She}`: selects a phrase by the
/// grammatical category of the token value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipedToken {
    pub name: TokenName,
    pub separator: Separator,
    /// Phrases (`item`) or keyword-phrase pairs (`one: item`).
    pub params: Vec<String>,
}

/// A placeholder extracted from a label.
///
/// # Example
///
/// ```
/// use tml::tokens::{DataTokenizer, Token};
///
/// let tokens = DataTokenizer::extract("{user:gender::gen} has {count|| message, messages}");
/// assert_eq!(tokens.len(), 2);
///
/// let Token::Piped(piped) = &tokens[0] else { panic!("expected a piped token") };
/// assert_eq!(piped.name.short_name, "count");
/// assert_eq!(piped.params, ["message", "messages"]);
///
/// let Token::Data(data) = &tokens[1] else { panic!("expected a data token") };
/// assert_eq!(data.short_name, "user");
/// assert_eq!(data.context_keys, ["gender"]);
/// assert_eq!(data.case_keys, ["gen"]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// `{name}`, `{{name}}` or `%{name}`: a plain value.
    Data(TokenName),
    Method(MethodToken),
    Piped(PipedToken),
}

impl Token {
    pub(crate) fn data(full_name: &str, label: &str) -> Self {
        let declaration = full_name
            .trim_start_matches(['%', '{'])
            .trim_end_matches('}');
        Token::Data(TokenName::parse(full_name, declaration, label))
    }

    pub(crate) fn method(full_name: &str, label: &str) -> Self {
        let name = TokenName::parse(full_name, strip_braces(full_name), label);
        let (object_name, method_name) = match name.short_name.split_once('.') {
            Some((object, method)) => (object.to_string(), method.to_string()),
            None => (name.short_name.clone(), String::new()),
        };
        Token::Method(MethodToken {
            name,
            object_name,
            method_name,
        })
    }

    pub(crate) fn piped(full_name: &str, label: &str) -> Self {
        let body = strip_braces(full_name);
        let separator = if body.contains("||") {
            Separator::Display
        } else {
            Separator::Substitute
        };
        let (declaration, params) = body
            .split_once(separator.as_str())
            .unwrap_or((body, ""));
        Token::Piped(PipedToken {
            name: TokenName::parse(full_name, declaration, label),
            separator,
            params: params
                .split(',')
                .map(str::trim)
                .filter(|param| !param.is_empty())
                .map(str::to_string)
                .collect(),
        })
    }

    /// The name parts common to every variant.
    pub fn name(&self) -> &TokenName {
        match self {
            Token::Data(name) => name,
            Token::Method(method) => &method.name,
            Token::Piped(piped) => &piped.name,
        }
    }

    pub fn full_name(&self) -> &str {
        &self.name().full_name
    }

    pub fn short_name(&self) -> &str {
        &self.name().short_name
    }

    pub fn context_keys(&self) -> &[String] {
        &self.name().context_keys
    }

    pub fn case_keys(&self) -> &[String] {
        &self.name().case_keys
    }
}

impl Display for Token {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.full_name())
    }
}

fn strip_braces(full_name: &str) -> &str {
    let inner = full_name.strip_prefix('{').unwrap_or(full_name);
    inner.strip_suffix('}').unwrap_or(inner)
}
