//! Stage archetypes.
//!
//! Factory functions returning correctly shaped workers for the canonical
//! stage behaviors. Every factory validates the shape of the task it is given
//! and fails with `ShiftworkError::InvalidTaskShape` on a mismatch.
//!
//! | Factory | Behavior |
//! |---|---|
//! | [`source`] | yields each element of a series once, then end forever |
//! | [`producer`] | runs arbitrary zero-input logic once per pull |
//! | [`relay`] | transforms each value |
//! | [`side_effect`] | observes each value, passes the original on |
//! | [`filter`] | skips values until one passes |
//! | [`batch`] | gathers values into arrays |
//! | [`splitter`] | fans one value out over several pulls |
//! | [`trailing`] | sliding window, most recent first |

mod batch;
mod filter;
mod relay;
mod side_effect;
mod source;
mod splitter;
mod trailing;

pub use batch::{batch, BatchOptions, Completion};
pub use filter::{filter, make_filter};
pub use relay::relay;
pub use side_effect::{side_effect, SideEffectMode, SIDE_EFFECT_TAG};
pub use source::{make_source, producer, source, source_with};
pub use splitter::splitter;
pub use trailing::{trailing, DEFAULT_TRAIL_LENGTH};

use crate::error::ShiftworkError;
use crate::pipeline::task::{ConsumerFn, Task, TaskShape};

/// Unwrap a consumer task or report which stage wanted one.
fn expect_consumer(stage: &'static str, task: Task) -> Result<ConsumerFn, ShiftworkError> {
    match task {
        Task::Consumer(f) => Ok(f),
        other => Err(ShiftworkError::InvalidTaskShape {
            stage,
            expected: TaskShape::Consumer,
            found: other.shape(),
        }),
    }
}
