//! Relay stage: maps each value through a consumer task.

use super::expect_consumer;
use crate::error::Result;
use crate::pipeline::task::Task;
use crate::pipeline::worker::Worker;

/// Apply a consumer task to every value. End-of-stream passes through without
/// invoking the task.
pub fn relay(task: Task) -> Result<Worker> {
    let f = expect_consumer("relay", task)?;
    Worker::builder()
        .task(Task::Consumer(f))
        .name("relay")
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::stages::source;
    use crate::pipeline::supply::Supply;
    use serde_json::json;
    use std::cell::Cell;
    use std::rc::Rc;

    #[test]
    fn test_relay_transforms_values() {
        let triple = relay(Task::consumer(|v| Ok(Some(json!(v.as_i64().unwrap_or(0) * 3))))).unwrap();
        source(vec![json!(1), json!(2), json!(3)])
            .unwrap()
            .chain_into(&triple)
            .unwrap();

        assert_eq!(triple.pull().unwrap(), Some(json!(3)));
        assert_eq!(triple.pull().unwrap(), Some(json!(6)));
        assert_eq!(triple.pull().unwrap(), Some(json!(9)));
        assert_eq!(triple.pull().unwrap(), None);
    }

    #[test]
    fn test_relay_short_circuits_end() {
        let calls = Rc::new(Cell::new(0));
        let seen = calls.clone();
        let worker = relay(Task::consumer(move |v| {
            seen.set(seen.get() + 1);
            Ok(Some(v))
        }))
        .unwrap();
        worker.set_supply(Supply::empty()).unwrap();

        assert_eq!(worker.pull().unwrap(), None);
        assert_eq!(calls.get(), 0);
    }

    #[test]
    fn test_relay_rejects_wrong_shape() {
        assert!(relay(Task::producer(|| Ok(None))).unwrap_err().is_construction());
        assert!(relay(Task::with_supply(|v, _| Ok(Some(v)))).is_err());
    }
}
