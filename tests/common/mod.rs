//! Common test utilities and helpers

#![allow(dead_code)] // Test utilities may not all be used in every test file

pub mod builders;
pub mod mock_helpers;

use shiftwork::pipeline::{Supply, Value, Worker};

/// Pull `worker` until end of stream.
pub fn drain(worker: &Worker) -> Vec<Value> {
    std::iter::from_fn(|| worker.pull().expect("pull failed")).collect()
}

/// Pull any supply until end of stream.
pub fn drain_supply(supply: &Supply) -> Vec<Value> {
    std::iter::from_fn(|| supply.pull().expect("pull failed")).collect()
}

/// Assert a worker yields exactly `expected`, then ends.
pub fn assert_yields(worker: &Worker, expected: &[Value]) {
    assert_eq!(
        drain(worker),
        expected,
        "{} yielded an unexpected stream",
        worker.name()
    );
    assert_eq!(worker.pull().expect("pull failed"), None);
}
