//! Pull-based pipeline.
//!
//! Values flow downstream only when the most-downstream stage is pulled.
//! Each pull propagates upstream on demand, one value at a time.
//!
//! # Architecture
//!
//! ```text
//! [source] ◄── pull ── [relay] ◄── pull ── [batch] ◄── pull ── caller
//! ```
//!
//! # Design
//!
//! - **Shared handles**: `Worker` and `Gang` are cheap `Rc` clones; the
//!   downstream stage holds its upstream as a `Supply`.
//! - **Enum dispatch**: `Supply` dispatches to built-in workers and gangs
//!   directly, and to anything else through the `Pull` trait.
//! - **Typed tasks**: the `Task` enum fixes each callable's shape, so a stage
//!   knows at construction whether it is a source or a consumer.
//! - **Explicit end of stream**: a pull yields `Option<Value>`; `None` ends
//!   the stream and never collides with `null` or `false` data.
//! - **Single threaded**: a pipeline is driven by one caller; pulling a
//!   worker from inside its own pull fails with `Reentrant`.

pub mod context;
pub mod gang;
pub mod id;
pub mod ledger;
pub mod roster;
pub mod stages;
pub mod supply;
pub mod tags;
pub mod task;
pub mod value;
pub mod worker;

pub use context::Context;
pub use gang::{Gang, GangBuilder};
pub use id::{GangId, WorkerId};
pub use ledger::Ledger;
pub use roster::Roster;
pub use supply::{chain, Exhausted, Pull, Suppliable, Supply};
pub use tags::{criterion, Criterion, TagSet, Taggable};
pub use task::{Task, TaskShape};
pub use value::{is_truthy, Series, Value};
pub use worker::{Worker, WorkerBuilder};
