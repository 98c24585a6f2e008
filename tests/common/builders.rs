//! Test data builders for creating test pipelines

use serde_json::json;
use shiftwork::pipeline::stages::{relay, source};
use shiftwork::pipeline::{Task, Value, Worker};

/// A source yielding the letters `a`, `b`, `c`.
pub fn letters() -> Worker {
    source("abc").expect("letters source")
}

/// A relay appending `_{suffix}` to string values.
pub fn appender(suffix: &str) -> Worker {
    let suffix = suffix.to_string();
    relay(Task::consumer(move |v: Value| {
        Ok(Some(json!(format!("{}_{}", v.as_str().unwrap_or_default(), suffix))))
    }))
    .expect("appender relay")
}

/// Builder for numeric sources
pub struct NumbersBuilder {
    start: i64,
    count: usize,
    step: i64,
}

impl NumbersBuilder {
    pub fn new(count: usize) -> Self {
        Self {
            start: 1,
            count,
            step: 1,
        }
    }

    pub fn start(mut self, start: i64) -> Self {
        self.start = start;
        self
    }

    pub fn step(mut self, step: i64) -> Self {
        self.step = step;
        self
    }

    pub fn values(&self) -> Vec<Value> {
        (0..self.count as i64)
            .map(|i| json!(self.start + i * self.step))
            .collect()
    }

    pub fn build(self) -> Worker {
        source(self.values()).expect("numbers source")
    }
}
