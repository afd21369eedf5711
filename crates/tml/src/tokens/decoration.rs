//! Bracket decoration markup: `[bold: text]` and `[link]text[/link]`.

use std::collections::{BTreeMap, VecDeque};
use std::sync::LazyLock;

use regex::Regex;

use crate::tokens::{Decoration, SubstitutionContext, TokenData};

/// Element wrapping the whole label.
pub const RESERVED_TOKEN: &str = "tml";

const RESERVED_END: &str = "[/tml]";

static FRAGMENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\[\w*:|\[/\w*\]|\[\w*\]|\]|[^\[\]]+|\[")
        .expect("decoration fragment pattern should be valid")
});

static SHORT_START: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\[\w*:$").expect("short start pattern should be valid"));

static LONG_START: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\[\w*\]$").expect("long start pattern should be valid"));

/// Placeholders left in a default decoration after filling.
static UNFILLED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\$[^}]*\}").expect("placeholder pattern should be valid"));

/// A node of the decoration tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecorationNode {
    Text(String),
    Element {
        name: String,
        children: Vec<DecorationNode>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ElementForm {
    /// `[name: ...]`
    Short,
    /// `[name]...[/name]`
    Long,
}

/// The parsed decoration markup of one label.
///
/// Parsing never fails: unterminated elements close at the end of the label.
///
/// # Example
///
/// ```
/// use tml::tokens::DecorationTokenizer;
///
/// let tokenizer = DecorationTokenizer::new("[bold: Hello [italic: World]]");
/// assert_eq!(tokenizer.tokens(), ["bold", "italic"]);
/// ```
#[derive(Debug, Clone)]
pub struct DecorationTokenizer {
    label: String,
    tree: DecorationNode,
    tokens: Vec<String>,
}

impl DecorationTokenizer {
    pub fn new(label: impl Into<String>) -> Self {
        let label = label.into();
        let wrapped = format!("[{RESERVED_TOKEN}]{label}{RESERVED_END}");
        let mut parser = Parser {
            fragments: FRAGMENT
                .find_iter(&wrapped)
                .map(|fragment| fragment.as_str())
                .collect(),
            tokens: Vec::new(),
        };
        let tree = parser.parse();
        let tokens = parser.tokens;
        Self {
            label,
            tree,
            tokens,
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// The tree, rooted at the reserved element.
    pub fn tree(&self) -> &DecorationNode {
        &self.tree
    }

    /// Element names in first-seen order, without the reserved element.
    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    /// Render the label with every element decorated.
    pub fn substitute(&self, context: &SubstitutionContext<'_>) -> String {
        self.evaluate(&self.tree, context)
    }

    fn evaluate(&self, node: &DecorationNode, context: &SubstitutionContext<'_>) -> String {
        match node {
            DecorationNode::Text(text) => text.clone(),
            DecorationNode::Element { name, children } => {
                let content: String = children
                    .iter()
                    .map(|child| self.evaluate(child, context))
                    .collect();
                self.apply(name, content, context)
            }
        }
    }

    fn apply(&self, name: &str, content: String, context: &SubstitutionContext<'_>) -> String {
        if name == RESERVED_TOKEN || !context.options.allows(name) {
            return content;
        }
        match context.data.get(name) {
            Some(TokenData::Decoration(Decoration::Function(decorate))) => decorate(&content),
            Some(TokenData::Decoration(Decoration::Template(template))) => {
                template.replace("{$0}", &content)
            }
            Some(TokenData::Decoration(Decoration::Attributes(attributes))) => {
                match context.config.default_decoration(name) {
                    Some(template) => fill_default(template, &content, attributes),
                    None => {
                        log::warn!(
                            "no default decoration for '{name}' in '{}'",
                            self.label
                        );
                        content
                    }
                }
            }
            Some(data) => match data.token_value() {
                Some(template) => template.replace("{$0}", &content),
                None => content,
            },
            None => match context.config.default_decoration(name) {
                Some(template) => fill_default(template, &content, &BTreeMap::new()),
                None => context.decorator.decorate_element(name, content),
            },
        }
    }
}

fn fill_default(
    template: &str,
    content: &str,
    attributes: &BTreeMap<String, String>,
) -> String {
    let mut filled = template.replace("{$0}", content);
    for (key, value) in attributes {
        filled = filled.replace(&format!("{{${key}}}"), value);
    }
    UNFILLED.replace_all(&filled, "").into_owned()
}

/// `link` for `[/link]`.
fn end_name(fragment: &str) -> Option<&str> {
    fragment.strip_prefix("[/")?.strip_suffix(']')
}

struct Parser<'a> {
    fragments: VecDeque<&'a str>,
    tokens: Vec<String>,
}

impl Parser<'_> {
    fn parse(&mut self) -> DecorationNode {
        let Some(fragment) = self.fragments.pop_front() else {
            return DecorationNode::Text(String::new());
        };
        if SHORT_START.is_match(fragment) {
            let name = fragment.trim_matches(['[', ':']);
            return self.parse_element(name, ElementForm::Short);
        }
        if LONG_START.is_match(fragment) {
            let name = fragment.trim_matches(['[', ']']);
            return self.parse_element(name, ElementForm::Long);
        }
        DecorationNode::Text(fragment.to_string())
    }

    fn parse_element(&mut self, name: &str, form: ElementForm) -> DecorationNode {
        if name != RESERVED_TOKEN && !self.tokens.iter().any(|token| token == name) {
            self.tokens.push(name.to_string());
        }
        let mut children = Vec::new();
        let mut first_text = form == ElementForm::Short;
        while let Some(&next) = self.fragments.front() {
            let closes = match form {
                ElementForm::Short => next == "]",
                ElementForm::Long => end_name(next) == Some(name),
            };
            if closes {
                self.fragments.pop_front();
                break;
            }
            // An unterminated element ends with the label.
            if name != RESERVED_TOKEN && next == RESERVED_END {
                break;
            }
            let child = match self.parse() {
                DecorationNode::Text(text) if first_text => {
                    first_text = false;
                    DecorationNode::Text(text.trim_start().to_string())
                }
                child => child,
            };
            children.push(child);
        }
        DecorationNode::Element {
            name: name.to_string(),
            children,
        }
    }
}
