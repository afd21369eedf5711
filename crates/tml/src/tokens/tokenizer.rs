//! Extraction of `{...}` data tokens from labels.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

use crate::tokens::{SubstitutionContext, Token};

static PIPED_TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{[^_:|]\w*(:\w+)*(::\w+)*\s*\|\|?[^{^}]+\}")
        .expect("piped token pattern should be valid")
});

static METHOD_TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{[^_:.]\w*(\.\w+)(:\w+)*(::\w+)*\}")
        .expect("method token pattern should be valid")
});

static DATA_TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"%?\{{1,2}\s*\w+\s*(:\s*\w+)*\s*(::\s*\w+)*\s*\}{1,2}")
        .expect("data token pattern should be valid")
});

#[derive(Debug, Clone, Copy)]
enum Grammar {
    Piped,
    Method,
    Data,
}

impl Grammar {
    /// Most specific first.
    const ALL: [Grammar; 3] = [Grammar::Piped, Grammar::Method, Grammar::Data];

    fn regex(self) -> &'static Regex {
        match self {
            Grammar::Piped => &PIPED_TOKEN,
            Grammar::Method => &METHOD_TOKEN,
            Grammar::Data => &DATA_TOKEN,
        }
    }

    fn token(self, full_name: &str, label: &str) -> Token {
        match self {
            Grammar::Piped => Token::piped(full_name, label),
            Grammar::Method => Token::method(full_name, label),
            Grammar::Data => Token::data(full_name, label),
        }
    }
}

/// The data tokens of one label.
///
/// Grammars are tried from most to least specific. Text claimed by one
/// grammar is removed before the next runs, so `{count|| item}` is never
/// also seen as a data token.
#[derive(Debug, Clone)]
pub struct DataTokenizer {
    label: String,
    tokens: Vec<Token>,
}

impl DataTokenizer {
    pub fn new(label: impl Into<String>) -> Self {
        let label = label.into();
        let tokens = Self::extract(&label);
        Self { label, tokens }
    }

    /// Extract the distinct tokens of `label`, in grammar order and then
    /// order of appearance.
    pub fn extract(label: &str) -> Vec<Token> {
        let mut scratch = label.to_string();
        let mut seen = HashSet::new();
        let mut tokens = Vec::new();
        for grammar in Grammar::ALL {
            let matches: Vec<String> = grammar
                .regex()
                .find_iter(&scratch)
                .map(|found| found.as_str().to_string())
                .collect();
            for full_name in matches {
                scratch = scratch.replace(&full_name, "");
                if seen.insert(full_name.clone()) {
                    tokens.push(grammar.token(&full_name, label));
                }
            }
        }
        tokens
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    /// Substitute every token into the label, in extraction order.
    pub fn substitute(&self, context: &SubstitutionContext<'_>) -> String {
        self.tokens
            .iter()
            .fold(self.label.clone(), |label, token| {
                token.substitute(&label, context)
            })
    }
}
