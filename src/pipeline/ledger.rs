//! Ledger: a non-empty accumulator.
//!
//! A ledger always starts from a first entry, so `last()` is total. Batch
//! stages gather into one while they pull.

use crate::pipeline::value::Value;

#[derive(Debug, Clone, PartialEq)]
pub struct Ledger {
    entries: Vec<Value>,
}

impl Ledger {
    pub fn new(first: Value) -> Self {
        Self {
            entries: vec![first],
        }
    }

    /// The most recent entry.
    pub fn last(&self) -> &Value {
        // entries is never empty
        &self.entries[self.entries.len() - 1]
    }

    pub fn push(&mut self, value: Value) -> &mut Self {
        self.entries.push(value);
        self
    }

    /// Drop the most recent entry. The first entry is never removed.
    pub fn pop(&mut self) -> &mut Self {
        if self.entries.len() > 1 {
            self.entries.pop();
        }
        self
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Always `false`; present for API symmetry with collections.
    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn as_slice(&self) -> &[Value] {
        &self.entries
    }

    pub fn into_vec(self) -> Vec<Value> {
        self.entries
    }
}

impl From<Ledger> for Value {
    fn from(ledger: Ledger) -> Self {
        Value::Array(ledger.entries)
    }
}
