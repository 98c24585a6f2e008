//! Side-effect stage: observe values without changing them.

use super::expect_consumer;
use crate::error::Result;
use crate::pipeline::task::Task;
use crate::pipeline::value::Value;
use crate::pipeline::worker::Worker;
use serde::{Deserialize, Serialize};

/// Tag carried by every side-effect worker.
pub const SIDE_EFFECT_TAG: &str = "side_effect";

/// How a side-effect task sees the value it observes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SideEffectMode {
    /// The task gets a clone of the value.
    #[default]
    Normal,
    /// The task gets a copy rebuilt from its serialized form, sharing nothing
    /// with the value that continues downstream.
    Hardened,
}

/// Run a consumer task for its effect only; the original value continues
/// downstream whatever the task returns.
pub fn side_effect(task: Task, mode: SideEffectMode) -> Result<Worker> {
    let mut f = expect_consumer("side_effect", task)?;
    Worker::builder()
        .task(Task::consumer(move |value| {
            let observed = match mode {
                SideEffectMode::Normal => value.clone(),
                SideEffectMode::Hardened => harden(&value)?,
            };
            f(observed)?;
            Ok(Some(value))
        }))
        .tag(SIDE_EFFECT_TAG)
        .name("side_effect")
        .build()
}

fn harden(value: &Value) -> Result<Value> {
    let bytes = serde_json::to_vec(value)?;
    Ok(serde_json::from_slice(&bytes)?)
}
