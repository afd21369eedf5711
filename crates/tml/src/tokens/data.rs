//! Caller-supplied values for tokens.

use std::collections::{BTreeMap, HashMap};
use std::fmt::{Debug, Formatter, Result as FmtResult};
use std::sync::Arc;

use chrono::NaiveDateTime;

use crate::types::{Subject, Value};

/// Token values keyed by token short name (or decoration name).
pub type TokenValues = HashMap<String, TokenData>;

/// Closure decoration: receives the decorated content.
pub type DecorationFn = Arc<dyn Fn(&str) -> String + Send + Sync>;

/// An object that knows both what it is (for rule matching) and how it reads
/// in a label.
pub trait ValueHolder: Send + Sync {
    /// The object rules are evaluated against.
    fn subject(&self) -> Subject;

    /// The text substituted into the label.
    fn token_value(&self) -> Option<String>;
}

/// How a decoration token wraps its content.
#[derive(Clone)]
pub enum Decoration {
    /// Template with `{$0}` standing for the content, e.g. `<b>{$0}</b>`.
    Template(String),
    /// Values for the `{$name}` placeholders of the configured default
    /// decoration, e.g. `{"href": "/home"}` for `<a href='{$href}'>{$0}</a>`.
    Attributes(BTreeMap<String, String>),
    Function(DecorationFn),
}

impl Decoration {
    pub fn function(decorate: impl Fn(&str) -> String + Send + Sync + 'static) -> Self {
        Decoration::Function(Arc::new(decorate))
    }
}

impl Debug for Decoration {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Decoration::Template(template) => f.debug_tuple("Template").field(template).finish(),
            Decoration::Attributes(attributes) => {
                f.debug_tuple("Attributes").field(attributes).finish()
            }
            Decoration::Function(_) => f.write_str("Function(..)"),
        }
    }
}

/// The value supplied for one token.
///
/// # Example
///
/// ```
/// use tml::tokens::TokenData;
/// use tml::Subject;
///
/// let count = TokenData::from(5);
/// assert_eq!(count.token_value().as_deref(), Some("5"));
///
/// // Rules see the subject; the label shows the value.
/// let user = TokenData::Pair(Subject::map([("gender", "female")]), "Anna".into());
/// assert_eq!(user.token_value().as_deref(), Some("Anna"));
/// ```
#[derive(Clone)]
pub enum TokenData {
    /// Both the subject and, through its display, the value.
    Raw(Subject),
    /// A subject and the text shown for it.
    Pair(Subject, String),
    Holder(Arc<dyn ValueHolder>),
    /// An object and an explicit way of reading its value: a literal
    /// `value`, else the named `attribute` or `property` of the object.
    Object {
        object: Subject,
        value: Option<String>,
        attribute: Option<String>,
        property: Option<String>,
    },
    Decoration(Decoration),
}

impl TokenData {
    /// Token data for an object read through one of its attributes.
    pub fn attribute(object: impl Into<Subject>, attribute: impl Into<String>) -> Self {
        TokenData::Object {
            object: object.into(),
            value: None,
            attribute: Some(attribute.into()),
            property: None,
        }
    }

    /// The object rules are evaluated against, if this is not a decoration.
    pub fn subject(&self) -> Option<Subject> {
        match self {
            TokenData::Raw(subject) | TokenData::Pair(subject, _) => Some(subject.clone()),
            TokenData::Holder(holder) => Some(holder.subject()),
            TokenData::Object { object, .. } => Some(object.clone()),
            TokenData::Decoration(_) => None,
        }
    }

    /// The text substituted into the label, if it can be resolved.
    pub fn token_value(&self) -> Option<String> {
        match self {
            TokenData::Raw(subject) => subject.display(),
            TokenData::Pair(_, value) => Some(value.clone()),
            TokenData::Holder(holder) => holder.token_value(),
            TokenData::Object {
                object,
                value,
                attribute,
                property,
            } => match value {
                Some(value) => Some(value.clone()),
                None => {
                    let key = attribute.as_ref().or(property.as_ref())?;
                    object
                        .attribute(key)
                        .filter(|value| !value.is_null())
                        .map(|value| value.to_string())
                }
            },
            TokenData::Decoration(_) => None,
        }
    }
}

impl Debug for TokenData {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            TokenData::Raw(subject) => f.debug_tuple("Raw").field(subject).finish(),
            TokenData::Pair(subject, value) => {
                f.debug_tuple("Pair").field(subject).field(value).finish()
            }
            TokenData::Holder(holder) => f
                .debug_tuple("Holder")
                .field(&holder.token_value())
                .finish(),
            TokenData::Object {
                object,
                value,
                attribute,
                property,
            } => f
                .debug_struct("Object")
                .field("object", object)
                .field("value", value)
                .field("attribute", attribute)
                .field("property", property)
                .finish(),
            TokenData::Decoration(decoration) => {
                f.debug_tuple("Decoration").field(decoration).finish()
            }
        }
    }
}

impl From<Subject> for TokenData {
    fn from(subject: Subject) -> Self {
        TokenData::Raw(subject)
    }
}

impl From<Decoration> for TokenData {
    fn from(decoration: Decoration) -> Self {
        TokenData::Decoration(decoration)
    }
}

macro_rules! token_data_from_subject {
    ($($source:ty),+ $(,)?) => {
        $(
            impl From<$source> for TokenData {
                fn from(value: $source) -> Self {
                    TokenData::Raw(Subject::from(value))
                }
            }
        )+
    };
}

token_data_from_subject!(
    Value,
    bool,
    i32,
    i64,
    u32,
    usize,
    f64,
    String,
    &str,
    NaiveDateTime,
);
