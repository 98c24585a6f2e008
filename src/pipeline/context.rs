use crate::error::{Result, ShiftworkError};
use crate::pipeline::value::Value;
use std::collections::{HashMap, VecDeque};

/// Per-worker scratch state that persists from one pull to the next.
///
/// The context holds arbitrary keyed values for tasks of the
/// `ConsumerWithSupplyAndContext` shape, plus the worker's handoff outbox.
/// Values queued with [`Context::handoff`] are emitted on successive pulls,
/// ahead of the task's own return value, without pulling upstream again.
///
/// # Example
/// ```
/// use shiftwork::pipeline::Context;
/// use serde_json::json;
///
/// let mut context = Context::new();
/// context.set("prefix", json!("bar"));
/// context.set_number("seen", 3.0);
///
/// assert_eq!(context.get_string("prefix").unwrap(), "bar");
/// assert_eq!(context.get_number("seen").unwrap(), 3.0);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Context {
    /// Key-value store for task data
    data: HashMap<String, Value>,

    /// Items waiting to be handed off on the next pulls
    outbox: VecDeque<Option<Value>>,
}

impl Context {
    /// Create an empty context
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a value in the context
    pub fn set(&mut self, key: impl Into<String>, value: Value) {
        self.data.insert(key.into(), value);
    }

    /// Get a value from the context
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.data.get(key)
    }

    /// Get a mutable value from the context
    pub fn get_mut(&mut self, key: &str) -> Option<&mut Value> {
        self.data.get_mut(key)
    }

    /// Get a value from the context or return an error if not found
    pub fn get_required(&self, key: &str) -> Result<&Value> {
        self.data.get(key).ok_or_else(|| {
            ShiftworkError::Task(format!("Required context key not found: {}", key))
        })
    }

    /// Set a string value
    pub fn set_string(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.data.insert(key.into(), Value::String(value.into()));
    }

    /// Get a string value
    pub fn get_string(&self, key: &str) -> Result<String> {
        match self.get_required(key)? {
            Value::String(s) => Ok(s.clone()),
            _ => Err(ShiftworkError::Task(format!(
                "Context key '{}' is not a string",
                key
            ))),
        }
    }

    /// Set a boolean value
    pub fn set_bool(&mut self, key: impl Into<String>, value: bool) {
        self.data.insert(key.into(), Value::Bool(value));
    }

    /// Get a boolean value
    pub fn get_bool(&self, key: &str) -> Result<bool> {
        match self.get_required(key)? {
            Value::Bool(b) => Ok(*b),
            _ => Err(ShiftworkError::Task(format!(
                "Context key '{}' is not a boolean",
                key
            ))),
        }
    }

    /// Set a number value. Non-finite numbers are stored as `null`.
    pub fn set_number(&mut self, key: impl Into<String>, value: f64) {
        let number = serde_json::Number::from_f64(value)
            .map(Value::Number)
            .unwrap_or(Value::Null);
        self.data.insert(key.into(), number);
    }

    /// Get a number value
    pub fn get_number(&self, key: &str) -> Result<f64> {
        match self.get_required(key)? {
            Value::Number(n) => n.as_f64().ok_or_else(|| {
                ShiftworkError::Task(format!("Context key '{}' is not a valid number", key))
            }),
            _ => Err(ShiftworkError::Task(format!(
                "Context key '{}' is not a number",
                key
            ))),
        }
    }

    /// Check if a key exists in the context
    pub fn has(&self, key: &str) -> bool {
        self.data.contains_key(key)
    }

    /// Remove a value from the context
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.data.remove(key)
    }

    /// Get all data keys
    pub fn keys(&self) -> Vec<&String> {
        self.data.keys().collect()
    }

    /// Clear all keyed data. Pending handoffs are kept.
    pub fn clear_data(&mut self) {
        self.data.clear();
    }

    /// Queue a value to be emitted on a later pull.
    pub fn handoff(&mut self, value: Value) {
        self.outbox.push_back(Some(value));
    }

    /// Number of queued handoffs.
    pub fn pending_handoffs(&self) -> usize {
        self.outbox.len()
    }

    pub(crate) fn has_pending(&self) -> bool {
        !self.outbox.is_empty()
    }

    pub(crate) fn push_pending(&mut self, item: Option<Value>) {
        self.outbox.push_back(item);
    }

    pub(crate) fn take_pending(&mut self) -> Option<Option<Value>> {
        self.outbox.pop_front()
    }
}

impl From<HashMap<String, Value>> for Context {
    fn from(data: HashMap<String, Value>) -> Self {
        Self {
            data,
            outbox: VecDeque::new(),
        }
    }
}

impl<K: Into<String>> FromIterator<(K, Value)> for Context {
    fn from_iter<I: IntoIterator<Item = (K, Value)>>(iter: I) -> Self {
        iter.into_iter()
            .map(|(k, v)| (k.into(), v))
            .collect::<HashMap<_, _>>()
            .into()
    }
}
