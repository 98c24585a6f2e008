//! Filter stage: drops values until one satisfies the predicate.

use super::expect_consumer;
use crate::error::{Result, ShiftworkError};
use crate::pipeline::task::Task;
use crate::pipeline::value::is_truthy;
use crate::pipeline::worker::Worker;

/// Pass through only the values for which `task` returns a truthy result.
///
/// Failing values are discarded and the worker keeps pulling upstream within
/// the same pull, so a single downstream pull may consume many upstream values.
pub fn filter(task: Task) -> Result<Worker> {
    let mut predicate = expect_consumer("filter", task)?;
    Worker::builder()
        .task(Task::with_supply(move |value, supply| {
            let mut candidate = value;
            loop {
                let verdict = predicate(candidate.clone())?;
                if verdict.as_ref().is_some_and(is_truthy) {
                    return Ok(Some(candidate));
                }
                match supply.pull()? {
                    Some(next) => candidate = next,
                    None => return Ok(None),
                }
            }
        }))
        .name("filter")
        .build()
}

/// Build a filter from a standalone predicate or an inline block, but never
/// both.
pub fn make_filter(predicate: Option<Task>, block: Option<Task>) -> Result<Worker> {
    match (predicate, block) {
        (Some(_), Some(_)) => Err(ShiftworkError::ConflictingArguments(
            "filter takes a predicate or a block, not both".into(),
        )),
        (Some(task), None) | (None, Some(task)) => filter(task),
        (None, None) => Err(ShiftworkError::MissingTask("filter")),
    }
}
