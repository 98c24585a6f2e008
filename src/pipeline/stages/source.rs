//! Source stages: upstream roots that take no supply.

use super::expect_consumer;
use crate::error::{Result, ShiftworkError};
use crate::pipeline::task::{Task, TaskShape};
use crate::pipeline::value::Series;
use crate::pipeline::worker::Worker;

/// Yield each element of `series` once, in order, then end-of-stream forever.
///
/// # Example
/// ```
/// use shiftwork::pipeline::stages::source;
/// use serde_json::json;
///
/// let letters = source(json!(["a", "b"])).unwrap();
/// assert_eq!(letters.pull().unwrap(), Some(json!("a")));
/// assert_eq!(letters.pull().unwrap(), Some(json!("b")));
/// assert_eq!(letters.pull().unwrap(), None);
/// assert_eq!(letters.pull().unwrap(), None);
/// ```
pub fn source(series: impl Into<Series>) -> Result<Worker> {
    let mut items = series.into().into_iter();
    Worker::builder()
        .task(Task::producer(move || Ok(items.next())))
        .name("source")
        .build()
}

/// Yield each element of `series` mapped through a consumer task.
///
/// Elements the task maps to `None` are skipped rather than ending the stream.
pub fn source_with(series: impl Into<Series>, task: Task) -> Result<Worker> {
    let mut f = expect_consumer("source", task)?;
    let mut items = series.into().into_iter();
    Worker::builder()
        .task(Task::producer(move || {
            for item in items.by_ref() {
                if let Some(output) = f(item)? {
                    return Ok(Some(output));
                }
            }
            Ok(None)
        }))
        .name("source")
        .build()
}

/// Run zero-input logic once per pull.
pub fn producer(task: Task) -> Result<Worker> {
    if task.shape() != TaskShape::Producer {
        return Err(ShiftworkError::InvalidTaskShape {
            stage: "source",
            expected: TaskShape::Producer,
            found: task.shape(),
        });
    }
    Worker::builder().task(task).name("source").build()
}

/// Build a source from a series, a task, or both.
///
/// With only a series the elements are yielded as-is; with both, the task
/// (a consumer) maps each element; with only a task, it must be a producer.
pub fn make_source(series: Option<Series>, task: Option<Task>) -> Result<Worker> {
    match (series, task) {
        (Some(series), None) => source(series),
        (Some(series), Some(task)) => source_with(series, task),
        (None, Some(task)) => producer(task),
        (None, None) => Err(ShiftworkError::MissingTask("source")),
    }
}
