use std::collections::BTreeMap;
use std::fmt::{Debug, Formatter, Result as FmtResult};
use std::sync::Arc;

use chrono::NaiveDateTime;

use super::Value;

/// Named attribute access on a host application object.
///
/// Method tokens such as `{user.name}` and context variables such as
/// `@gender` read attributes through this trait instead of calling methods
/// by name at runtime. Implement it for each domain type that appears in
/// translation data.
///
/// # Example
///
/// ```
/// use tml::{NamedAccessor, Subject, Value};
///
/// struct User {
///     name: String,
///     gender: String,
/// }
///
/// impl NamedAccessor for User {
///     fn attribute(&self, name: &str) -> Option<Value> {
///         match name {
///             "name" => Some(self.name.as_str().into()),
///             "gender" => Some(self.gender.as_str().into()),
///             _ => None,
///         }
///     }
///
///     fn display(&self) -> Option<String> {
///         Some(self.name.clone())
///     }
/// }
///
/// let user = Subject::object(User { name: "Anna".into(), gender: "female".into() });
/// assert_eq!(user.attribute("gender"), Some(Value::from("female")));
/// assert_eq!(user.display().as_deref(), Some("Anna"));
/// ```
pub trait NamedAccessor: Send + Sync {
    /// Reads a named attribute, or `None` if the object has no such attribute.
    fn attribute(&self, name: &str) -> Option<Value>;

    /// The text shown when the object itself is substituted into a label.
    fn display(&self) -> Option<String> {
        None
    }
}

/// The host object a token or context rule is resolved against.
#[derive(Clone)]
pub enum Subject {
    /// A plain value (a count, a name, a date).
    Value(Value),

    /// A string-keyed map of attributes.
    Map(BTreeMap<String, Value>),

    /// An application object exposing named attributes.
    Object(Arc<dyn NamedAccessor>),

    /// A list of subjects (for example the users behind `@genders`).
    List(Vec<Subject>),
}

impl Subject {
    /// Wrap an application object.
    pub fn object(object: impl NamedAccessor + 'static) -> Self {
        Subject::Object(Arc::new(object))
    }

    /// Build a map subject from key/value pairs.
    pub fn map<K, V>(entries: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<Value>,
    {
        Subject::Map(
            entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    /// Reads a named attribute.
    ///
    /// Maps are looked up by key and objects go through [`NamedAccessor`].
    /// Plain values and lists have no attributes.
    pub fn attribute(&self, name: &str) -> Option<Value> {
        match self {
            Subject::Map(map) => map.get(name).cloned(),
            Subject::Object(object) => object.attribute(name),
            Subject::Value(_) | Subject::List(_) => None,
        }
    }

    /// The text shown when the subject itself is substituted into a label.
    ///
    /// Returns `None` for nulls and maps, which have no natural rendering.
    pub fn display(&self) -> Option<String> {
        match self {
            Subject::Value(Value::Null) | Subject::Map(_) => None,
            Subject::Value(value) => Some(value.to_string()),
            Subject::Object(object) => object.display(),
            Subject::List(items) => {
                let parts: Option<Vec<String>> = items.iter().map(Subject::display).collect();
                parts.map(|parts| parts.join(", "))
            }
        }
    }

    /// Get the wrapped plain value, if this subject is one.
    pub fn as_value(&self) -> Option<&Value> {
        match self {
            Subject::Value(value) => Some(value),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Subject::Value(Value::Null))
    }
}

impl Debug for Subject {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Subject::Value(value) => f.debug_tuple("Value").field(value).finish(),
            Subject::Map(map) => f.debug_tuple("Map").field(map).finish(),
            Subject::Object(object) => f
                .debug_tuple("Object")
                .field(&object.display().unwrap_or_default())
                .finish(),
            Subject::List(items) => f.debug_tuple("List").field(items).finish(),
        }
    }
}

macro_rules! subject_from_value {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl From<$ty> for Subject {
                fn from(value: $ty) -> Self {
                    Subject::Value(value.into())
                }
            }
        )+
    };
}

subject_from_value!(Value, bool, i32, i64, u32, usize, f64, String, &str, NaiveDateTime);
