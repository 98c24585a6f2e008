//! Trailing stage: a sliding window over recent values.

use crate::error::{Result, ShiftworkError};
use crate::pipeline::task::Task;
use crate::pipeline::value::Value;
use crate::pipeline::worker::Worker;
use std::collections::VecDeque;

pub const DEFAULT_TRAIL_LENGTH: usize = 2;

/// Emit a sliding window over the last `size` values, most recent first.
///
/// The first pull fills the window; each later pull drops the oldest value
/// and takes one new one. If upstream runs dry before the window is full, the
/// partial window is emitted once and end-of-stream follows.
///
/// # Example
/// ```
/// use shiftwork::pipeline::stages::{source, trailing};
/// use serde_json::json;
///
/// let window = trailing(2).unwrap();
/// source(json!(["a", "b", "c"])).unwrap().chain_into(&window).unwrap();
///
/// assert_eq!(window.pull().unwrap(), Some(json!(["b", "a"])));
/// assert_eq!(window.pull().unwrap(), Some(json!(["c", "b"])));
/// assert_eq!(window.pull().unwrap(), None);
/// ```
pub fn trailing(size: usize) -> Result<Worker> {
    if size == 0 {
        return Err(ShiftworkError::InvalidOption {
            stage: "trailing",
            message: "window size must be at least 1".into(),
        });
    }

    let mut window: VecDeque<Value> = VecDeque::with_capacity(size);
    Worker::builder()
        .task(Task::with_supply(move |value, supply| {
            if window.len() >= size {
                window.pop_back();
            }
            window.push_front(value);
            while window.len() < size {
                match supply.pull()? {
                    Some(next) => window.push_front(next),
                    None => break,
                }
            }
            Ok(Some(Value::Array(window.iter().cloned().collect())))
        }))
        .name("trailing")
        .build()
}
