//! # shiftwork: pull-based pipelines
//!
//! A pipeline is a chain of stages. Nothing moves until the most-downstream
//! stage is pulled; each pull propagates upstream one value at a time.
//!
//! ## Architecture
//!
//! - **Worker**: a single stage wrapping a typed `Task`
//! - **Roster**: an ordered, wired list of workers
//! - **Gang**: a roster behaving as one stage, with its own tags and criteria
//! - **Stages**: factories for the canonical stage archetypes
//! - **Config**: TOML pipeline files built from built-in stages
//!
//! ## Example
//!
//! ```
//! use shiftwork::pipeline::stages::{batch, relay, source, BatchOptions};
//! use shiftwork::pipeline::Task;
//! use serde_json::json;
//!
//! let numbers = source(json!([1, 2, 3])).unwrap();
//! let doubled = relay(Task::consumer(|v| Ok(Some(json!(v.as_i64().unwrap_or(0) * 2))))).unwrap();
//! let pairs = batch(BatchOptions::gathering(2), None).unwrap();
//!
//! numbers.chain_into(&doubled).unwrap().chain_into(&pairs).unwrap();
//!
//! assert_eq!(pairs.pull().unwrap(), Some(json!([2, 4])));
//! assert_eq!(pairs.pull().unwrap(), Some(json!([6])));
//! assert_eq!(pairs.pull().unwrap(), None);
//! ```

pub mod config;
pub mod error;
pub mod logging;
pub mod pipeline;

// Re-export commonly used types
pub use config::{PipelineConfig, StageConfig, StageKind};
pub use error::{Result, ResultExt, ShiftworkError};
pub use pipeline::{Gang, Roster, Supply, Task, TaskShape, Value, Worker};
