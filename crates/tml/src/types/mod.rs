mod subject;
mod value;

pub use subject::{NamedAccessor, Subject};
pub use value::{Number, Value};
