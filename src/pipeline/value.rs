//! Values flowing through a pipeline.
//!
//! Every stage exchanges `serde_json::Value`s. A pulled item is an
//! `Option<Value>`: `None` marks the end of the stream, so `null`, `false`
//! and `0` travel through a pipeline like any other data.

pub use serde_json::Value;

/// Truthiness: everything except `null` and `false` counts as true.
#[inline]
pub fn is_truthy(value: &Value) -> bool {
    !matches!(value, Value::Null | Value::Bool(false))
}

/// A finite sequence a source stage hands out one element at a time.
///
/// Arrays yield their elements, strings yield their characters and any other
/// value yields itself once.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Series {
    items: Vec<Value>,
}

impl Series {
    pub fn new(items: Vec<Value>) -> Self {
        Self { items }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn into_vec(self) -> Vec<Value> {
        self.items
    }
}

impl From<Vec<Value>> for Series {
    fn from(items: Vec<Value>) -> Self {
        Self::new(items)
    }
}

impl From<Value> for Series {
    fn from(value: Value) -> Self {
        match value {
            Value::Array(items) => Self::new(items),
            Value::String(s) => Self::from(s.as_str()),
            other => Self::new(vec![other]),
        }
    }
}

impl From<&str> for Series {
    fn from(s: &str) -> Self {
        Self::new(s.chars().map(|c| Value::String(c.to_string())).collect())
    }
}

impl From<String> for Series {
    fn from(s: String) -> Self {
        Self::from(s.as_str())
    }
}

impl<const N: usize> From<[Value; N]> for Series {
    fn from(items: [Value; N]) -> Self {
        Self::new(items.into())
    }
}

impl FromIterator<Value> for Series {
    fn from_iter<I: IntoIterator<Item = Value>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl IntoIterator for Series {
    type Item = Value;
    type IntoIter = std::vec::IntoIter<Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}
