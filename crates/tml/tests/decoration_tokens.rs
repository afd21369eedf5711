//! Integration tests for bracket decoration markup.

use std::collections::{BTreeMap, HashMap, HashSet};

use tml::language::LanguageDefinition;
use tml::tokens::{
    Decoration, DecorationNode, DecorationTokenizer, Decorator, SubstitutionContext, TokenValues,
    substitute_tokens,
};
use tml::{Config, RenderOptions, token_values};

fn render(label: &str, values: &TokenValues) -> String {
    let english = LanguageDefinition::builder().locale("en").build();
    DecorationTokenizer::new(label).substitute(&SubstitutionContext::new(values, &english))
}

fn render_with_config(label: &str, values: &TokenValues, config: &Config) -> String {
    let english = LanguageDefinition::builder().locale("en").build();
    let context = SubstitutionContext::new(values, &english).with_config(config);
    DecorationTokenizer::new(label).substitute(&context)
}

fn html_config() -> Config {
    Config::builder()
        .decoration_defaults(HashMap::from([
            ("strong".to_string(), "<strong>{$0}</strong>".to_string()),
            (
                "link".to_string(),
                "<a href='{$href}' class='{$class}'>{$0}</a>".to_string(),
            ),
        ]))
        .build()
}

fn text(value: &str) -> DecorationNode {
    DecorationNode::Text(value.to_string())
}

// =============================================================================
// Parsing
// =============================================================================

#[test]
fn tokens_in_first_seen_order() {
    let tokenizer = DecorationTokenizer::new("[b: one] [i]two[/i] [b: three]");
    assert_eq!(tokenizer.tokens(), ["b", "i"]);
    assert_eq!(tokenizer.label(), "[b: one] [i]two[/i] [b: three]");
}

#[test]
fn tree_of_nested_elements() {
    let tokenizer = DecorationTokenizer::new("[bold: Hello [italic: World]]!");
    assert_eq!(
        tokenizer.tree(),
        &DecorationNode::Element {
            name: "tml".to_string(),
            children: vec![
                DecorationNode::Element {
                    name: "bold".to_string(),
                    children: vec![
                        text("Hello "),
                        DecorationNode::Element {
                            name: "italic".to_string(),
                            children: vec![text("World")],
                        },
                    ],
                },
                text("!"),
            ],
        }
    );
}

#[test]
fn long_form_keeps_leading_whitespace() {
    let tokenizer = DecorationTokenizer::new("[link] click here[/link]");
    assert_eq!(
        tokenizer.tree(),
        &DecorationNode::Element {
            name: "tml".to_string(),
            children: vec![DecorationNode::Element {
                name: "link".to_string(),
                children: vec![text(" click here")],
            }],
        }
    );
}

#[test]
fn label_without_markup_has_no_tokens() {
    assert!(DecorationTokenizer::new("plain text").tokens().is_empty());
}

// =============================================================================
// Rendering
// =============================================================================

#[test]
fn undecorated_elements_render_their_content() {
    assert_eq!(
        render("[bold: Hello [italic: World]]", &token_values! {}),
        "Hello World"
    );
}

#[test]
fn stray_brackets_are_text() {
    assert_eq!(render("a [ b", &token_values! {}), "a [ b");
    assert_eq!(render("a ] b", &token_values! {}), "a ] b");
}

#[test]
fn unterminated_element_closes_at_end() {
    assert_eq!(render("see [bold: this", &token_values! {}), "see this");
    assert_eq!(render("see [link]that", &token_values! {}), "see that");
}

#[test]
fn reserved_element_is_transparent() {
    let values = token_values! { "tml" => Decoration::Template("<x>{$0}</x>".into()) };
    assert_eq!(render("[tml: inner]", &values), "inner");
}

#[test]
fn template_decoration() {
    let values = token_values! {
        "bold" => Decoration::Template("<b>{$0}</b>".into()),
        "italic" => Decoration::Template("<i>{$0}</i>".into()),
    };
    assert_eq!(
        render("[bold: Hello [italic: World]]", &values),
        "<b>Hello <i>World</i></b>"
    );
}

#[test]
fn function_decoration() {
    let values = token_values! {
        "shout" => Decoration::function(|content| content.to_uppercase()),
    };
    assert_eq!(render("Please [shout: stop]", &values), "Please STOP");
}

#[test]
fn plain_value_is_used_as_template() {
    let values = token_values! { "em" => "<em>{$0}</em>" };
    assert_eq!(render("[em]now[/em]", &values), "<em>now</em>");
}

#[test]
fn configured_default_decoration() {
    assert_eq!(
        render_with_config("[strong: careful]", &token_values! {}, &html_config()),
        "<strong>careful</strong>"
    );
}

#[test]
fn attribute_decoration_fills_default() {
    let values = token_values! {
        "link" => Decoration::Attributes(BTreeMap::from([
            ("href".to_string(), "/home".to_string()),
            ("class".to_string(), "nav".to_string()),
        ])),
    };
    assert_eq!(
        render_with_config("[link: Home]", &values, &html_config()),
        "<a href='/home' class='nav'>Home</a>"
    );
}

#[test]
fn unfilled_placeholders_are_removed() {
    let values = token_values! {
        "link" => Decoration::Attributes(BTreeMap::from([
            ("href".to_string(), "/home".to_string()),
        ])),
    };
    assert_eq!(
        render_with_config("[link: Home]", &values, &html_config()),
        "<a href='/home' class=''>Home</a>"
    );
    assert_eq!(
        render_with_config("[link: Home]", &token_values! {}, &html_config()),
        "<a href='' class=''>Home</a>"
    );
}

#[test]
fn attribute_decoration_without_default_renders_content() {
    let values = token_values! {
        "badge" => Decoration::Attributes(BTreeMap::new()),
    };
    assert_eq!(render("[badge: new]", &values), "new");
}

struct Tagging;

impl Decorator for Tagging {
    fn decorate_element(&self, name: &str, content: String) -> String {
        format!("<{name}>{content}</{name}>")
    }
}

#[test]
fn decorator_renders_unknown_elements() {
    let english = LanguageDefinition::builder().locale("en").build();
    let values = token_values! { "b" => Decoration::Template("**{$0}**".into()) };
    let context = SubstitutionContext::new(&values, &english).with_decorator(&Tagging);
    insta::assert_snapshot!(
        DecorationTokenizer::new("[b: bold] and [u: underlined [sup]x[/sup]]").substitute(&context),
        @"**bold** and <u>underlined <sup>x</sup></u>"
    );
}

#[test]
fn allowed_tokens_limit_decoration() {
    let english = LanguageDefinition::builder().locale("en").build();
    let values = token_values! {
        "bold" => Decoration::Template("<b>{$0}</b>".into()),
        "italic" => Decoration::Template("<i>{$0}</i>".into()),
    };
    let options = RenderOptions::builder()
        .allowed_tokens(HashSet::from(["bold".to_string()]))
        .build();
    let context = SubstitutionContext::new(&values, &english).with_options(&options);
    assert_eq!(
        DecorationTokenizer::new("[bold: a] [italic: b]").substitute(&context),
        "<b>a</b> b"
    );
}

#[test]
fn skip_decorations_leaves_markup() {
    let english = LanguageDefinition::builder().locale("en").build();
    let values = token_values! { "user" => "Anna" };
    let options = RenderOptions::builder().skip_decorations(true).build();
    let context = SubstitutionContext::new(&values, &english).with_options(&options);
    assert_eq!(
        substitute_tokens("[bold: {user}]", &context),
        "[bold: Anna]"
    );
}
