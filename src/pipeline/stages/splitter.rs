//! Splitter stage: one upstream value fans out over several pulls.

use super::expect_consumer;
use crate::error::Result;
use crate::pipeline::task::Task;
use crate::pipeline::value::Value;
use crate::pipeline::worker::Worker;

/// Fan each upstream value out into several downstream values.
///
/// `task` maps a value to an array of parts; the parts are emitted one per
/// pull, and upstream is only pulled again once they are used up. A
/// non-array result is a single part. An empty array (or `None`) emits
/// nothing for that value and moves on to the next one. To emit an array as
/// one part, wrap it in another array.
pub fn splitter(task: Task) -> Result<Worker> {
    let mut split = expect_consumer("splitter", task)?;
    Worker::builder()
        .task(Task::with_context(move |value, supply, context| {
            let mut current = value;
            loop {
                let mut parts = into_parts(split(current)?);
                if let Some(last) = parts.pop() {
                    for part in parts {
                        context.handoff(part);
                    }
                    return Ok(Some(last));
                }
                match supply.pull()? {
                    Some(next) => current = next,
                    None => return Ok(None),
                }
            }
        }))
        .name("splitter")
        .build()
}

fn into_parts(result: Option<Value>) -> Vec<Value> {
    match result {
        Some(Value::Array(parts)) => parts,
        Some(single) => vec![single],
        None => Vec::new(),
    }
}
