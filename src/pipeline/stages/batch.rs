//! Batch stage: gathers upstream values into arrays.
//!
//! Completion is either a fixed size or a caller-supplied predicate over the
//! latest value and the batch so far.

use crate::error::{Result, ShiftworkError};
use crate::pipeline::ledger::Ledger;
use crate::pipeline::task::Task;
use crate::pipeline::value::Value;
use crate::pipeline::worker::Worker;
use serde::{Deserialize, Serialize};

/// Decides whether a batch is complete, given the latest value and the batch
/// gathered so far (latest included).
pub type Completion = Box<dyn FnMut(&Value, &[Value]) -> bool>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchOptions {
    /// Batch size used when no completion predicate is given.
    pub gathering: usize,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self { gathering: 1 }
    }
}

impl BatchOptions {
    pub fn gathering(gathering: usize) -> Self {
        Self { gathering }
    }
}

/// Gather upstream values into arrays.
///
/// A batch is complete when `completion` says so or, without one, when it
/// holds `options.gathering` values. Exhaustion flushes whatever was gathered;
/// an empty batch is never emitted.
///
/// # Example
/// ```
/// use shiftwork::pipeline::stages::{batch, source, BatchOptions};
/// use serde_json::json;
///
/// let pairs = batch(BatchOptions::gathering(2), None).unwrap();
/// source(json!([1, 2, 3])).unwrap().chain_into(&pairs).unwrap();
///
/// assert_eq!(pairs.pull().unwrap(), Some(json!([1, 2])));
/// assert_eq!(pairs.pull().unwrap(), Some(json!([3])));
/// assert_eq!(pairs.pull().unwrap(), None);
/// ```
pub fn batch(options: BatchOptions, completion: Option<Completion>) -> Result<Worker> {
    let mut is_full: Completion = match completion {
        Some(completion) => completion,
        None if options.gathering == 0 => {
            return Err(ShiftworkError::InvalidOption {
                stage: "batch",
                message: "gathering must be at least 1".into(),
            });
        }
        None => {
            let size = options.gathering;
            Box::new(move |_: &Value, gathered: &[Value]| gathered.len() >= size)
        }
    };

    Worker::builder()
        .task(Task::with_supply(move |value, supply| {
            let mut ledger = Ledger::new(value);
            while !is_full(ledger.last(), ledger.as_slice()) {
                match supply.pull()? {
                    Some(next) => {
                        ledger.push(next);
                    }
                    None => break,
                }
            }
            Ok(Some(ledger.into()))
        }))
        .name("batch")
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::stages::source;
    use proptest::prelude::*;
    use serde_json::json;

    fn drain(worker: &Worker) -> Vec<Value> {
        std::iter::from_fn(|| worker.pull().unwrap()).collect()
    }

    #[test]
    fn test_default_gathers_singletons() {
        let worker = batch(BatchOptions::default(), None).unwrap();
        source(vec![json!("a"), json!("b")])
            .unwrap()
            .chain_into(&worker)
            .unwrap();
        assert_eq!(drain(&worker), vec![json!(["a"]), json!(["b"])]);
    }

    #[test]
    fn test_gathering_flushes_remainder() {
        let worker = batch(BatchOptions::gathering(2), None).unwrap();
        source(vec![json!(1), json!(2), json!(3)])
            .unwrap()
            .chain_into(&worker)
            .unwrap();
        assert_eq!(worker.pull().unwrap(), Some(json!([1, 2])));
        assert_eq!(worker.pull().unwrap(), Some(json!([3])));
        assert_eq!(worker.pull().unwrap(), None);
        assert_eq!(worker.pull().unwrap(), None);
    }

    #[test]
    fn test_completion_predicate() {
        // Close a batch on every sentence-ending word.
        let worker = batch(
            BatchOptions::default(),
            Some(Box::new(|last: &Value, _: &[Value]| {
                last.as_str().is_some_and(|s| s.ends_with('.'))
            })),
        )
        .unwrap();
        source(json!(["Hi", "there.", "Bye."]))
            .unwrap()
            .chain_into(&worker)
            .unwrap();

        assert_eq!(
            drain(&worker),
            vec![json!(["Hi", "there."]), json!(["Bye."])]
        );
    }

    #[test]
    fn test_completion_sees_gathered_batch() {
        let worker = batch(
            BatchOptions::default(),
            Some(Box::new(|_: &Value, gathered: &[Value]| {
                gathered.iter().filter_map(Value::as_i64).sum::<i64>() >= 5
            })),
        )
        .unwrap();
        source(json!([2, 2, 2, 4, 1])).unwrap().chain_into(&worker).unwrap();
        assert_eq!(drain(&worker), vec![json!([2, 2, 2]), json!([4, 1])]);
    }

    #[test]
    fn test_zero_gathering_rejected() {
        let err = batch(BatchOptions::gathering(0), None).unwrap_err();
        assert!(matches!(err, ShiftworkError::InvalidOption { stage: "batch", .. }));
        assert!(err.is_construction());
    }

    #[test]
    fn test_options_deserialize_with_default() {
        let options: BatchOptions = serde_json::from_value(json!({})).unwrap();
        assert_eq!(options.gathering, 1);
    }

    proptest! {
        #[test]
        fn prop_batches_preserve_order_and_size(
            items in prop::collection::vec(any::<i32>(), 0..40),
            size in 1usize..8,
        ) {
            let worker = batch(BatchOptions::gathering(size), None).unwrap();
            source(items.iter().copied().map(Value::from).collect::<Vec<_>>())
                .unwrap()
                .chain_into(&worker)
                .unwrap();

            let batches = drain(&worker);
            let flattened: Vec<Value> = batches
                .iter()
                .flat_map(|b| b.as_array().cloned().unwrap_or_default())
                .collect();
            let expected: Vec<Value> = items.iter().copied().map(Value::from).collect();
            prop_assert_eq!(flattened, expected);

            for (i, b) in batches.iter().enumerate() {
                let len = b.as_array().map_or(0, Vec::len);
                prop_assert!(len >= 1);
                if i + 1 < batches.len() {
                    prop_assert_eq!(len, size);
                } else {
                    prop_assert!(len <= size);
                }
            }
        }
    }
}
