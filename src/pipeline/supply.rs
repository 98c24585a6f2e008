//! Supply abstraction for the pipeline.
//!
//! Two-layer design, mirroring how stages are dispatched:
//! - **`Pull` trait**: for anything outside the crate that can hand out
//!   values on demand (a channel, a file reader, a test double).
//! - **`Supply` enum**: the built-in pullables (`Worker`, `Gang`) plus a
//!   `Plugin` arm wrapping a `Pull` trait object.

use crate::error::Result;
use crate::pipeline::gang::Gang;
use crate::pipeline::value::Value;
use crate::pipeline::worker::Worker;
use std::fmt;
use std::ops::BitOr;
use std::rc::Rc;

/// Trait for pluggable upstream sources.
#[cfg_attr(test, mockall::automock)]
pub trait Pull {
    /// Produce one item; `None` marks the end of the stream.
    fn pull(&self) -> Result<Option<Value>>;

    /// Whether a pull can currently succeed.
    fn is_ready(&self) -> bool {
        true
    }
}

/// A pullable that is always exhausted.
#[derive(Debug, Clone, Copy, Default)]
pub struct Exhausted;

impl Pull for Exhausted {
    fn pull(&self) -> Result<Option<Value>> {
        Ok(None)
    }
}

/// Upstream reference held by a worker.
///
/// Cloning is cheap; equality is handle identity, not value equality.
#[derive(Clone)]
pub enum Supply {
    Worker(Worker),
    Gang(Gang),
    Plugin(Rc<dyn Pull>),
}

impl Supply {
    /// Wrap an external pullable.
    pub fn plugin<P: Pull + 'static>(pull: P) -> Self {
        Supply::Plugin(Rc::new(pull))
    }

    /// A supply that only ever yields end-of-stream.
    pub fn empty() -> Self {
        Supply::plugin(Exhausted)
    }

    pub fn pull(&self) -> Result<Option<Value>> {
        match self {
            Supply::Worker(w) => w.pull(),
            Supply::Gang(g) => g.pull(),
            Supply::Plugin(p) => p.pull(),
        }
    }

    pub fn is_ready(&self) -> bool {
        match self {
            Supply::Worker(w) => w.is_ready(),
            Supply::Gang(g) => g.is_ready(),
            Supply::Plugin(p) => p.is_ready(),
        }
    }

    /// Human-readable name for logs.
    pub fn label(&self) -> String {
        match self {
            Supply::Worker(w) => w.name(),
            Supply::Gang(g) => g.id().to_string(),
            Supply::Plugin(_) => "plugin".to_string(),
        }
    }

    pub fn as_worker(&self) -> Option<&Worker> {
        match self {
            Supply::Worker(w) => Some(w),
            _ => None,
        }
    }

    pub fn as_gang(&self) -> Option<&Gang> {
        match self {
            Supply::Gang(g) => Some(g),
            _ => None,
        }
    }
}

impl PartialEq for Supply {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Supply::Worker(a), Supply::Worker(b)) => a == b,
            (Supply::Gang(a), Supply::Gang(b)) => a == b,
            (Supply::Plugin(a), Supply::Plugin(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl PartialEq<Worker> for Supply {
    fn eq(&self, other: &Worker) -> bool {
        self.as_worker() == Some(other)
    }
}

impl PartialEq<Gang> for Supply {
    fn eq(&self, other: &Gang) -> bool {
        self.as_gang() == Some(other)
    }
}

impl fmt::Debug for Supply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Supply").field(&self.label()).finish()
    }
}

impl From<Worker> for Supply {
    fn from(worker: Worker) -> Self {
        Supply::Worker(worker)
    }
}

impl From<&Worker> for Supply {
    fn from(worker: &Worker) -> Self {
        Supply::Worker(worker.clone())
    }
}

impl From<Gang> for Supply {
    fn from(gang: Gang) -> Self {
        Supply::Gang(gang)
    }
}

impl From<&Gang> for Supply {
    fn from(gang: &Gang) -> Self {
        Supply::Gang(gang.clone())
    }
}

/// Anything that can be handed a supply: workers and gangs.
pub trait Suppliable: Clone {
    fn set_supply(&self, supply: Supply) -> Result<()>;
}

/// Set `consumer`'s supply to `producer` and return the consumer, so linear
/// pipelines read left to right.
pub fn chain<C: Suppliable>(producer: impl Into<Supply>, consumer: &C) -> Result<C> {
    consumer.set_supply(producer.into())?;
    Ok(consumer.clone())
}

/// `&a | &b` chains like `chain(&a, &b)`. The result is the consumer, so the
/// operator keeps chaining: `(&a | &b | &c)?`.
macro_rules! impl_chain_operator {
    ($($upstream:ty => $downstream:ty),* $(,)?) => {$(
        impl BitOr<&$downstream> for &$upstream {
            type Output = Result<$downstream>;

            fn bitor(self, consumer: &$downstream) -> Result<$downstream> {
                chain(self, consumer)
            }
        }

        impl BitOr<&$downstream> for Result<$upstream> {
            type Output = Result<$downstream>;

            fn bitor(self, consumer: &$downstream) -> Result<$downstream> {
                chain(&self?, consumer)
            }
        }
    )*};
}

impl_chain_operator!(
    Worker => Worker,
    Worker => Gang,
    Gang => Worker,
    Gang => Gang,
);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ShiftworkError;
    use crate::pipeline::stages::{relay, source};
    use crate::pipeline::task::Task;
    use serde_json::json;

    fn appender(suffix: &'static str) -> Worker {
        relay(Task::consumer(move |v| {
            Ok(Some(json!(format!("{}{}", v.as_str().unwrap_or_default(), suffix))))
        }))
        .unwrap()
    }

    #[test]
    fn test_pipe_operator_chains_left_to_right() {
        let letters = source("ab").unwrap();
        let (b, c) = (appender("_b"), appender("_c"));

        let tail = (&letters | &b | &c).unwrap();

        assert_eq!(tail, c);
        assert_eq!(b.supply().unwrap(), letters);
        assert_eq!(tail.pull().unwrap(), Some(json!("a_b_c")));
        assert_eq!(tail.pull().unwrap(), Some(json!("b_b_c")));
        assert_eq!(tail.pull().unwrap(), None);
    }

    #[test]
    fn test_pipe_operator_through_gang() {
        let gang = Gang::new([appender("_b"), appender("_c")]).unwrap();
        let d = appender("_d");

        let letters = source("a").unwrap();

        let tail = (&letters | &gang | &d).unwrap();

        assert_eq!(gang.supply().unwrap(), letters);
        assert_eq!(d.supply().unwrap(), gang);
        assert_eq!(tail.pull().unwrap(), Some(json!("a_b_c_d")));
        assert_eq!(tail.pull().unwrap(), None);
    }

    #[test]
    fn test_pipe_operator_propagates_wiring_errors() {
        let letters = source("ab").unwrap();
        let err = (&appender("_x") | &letters).unwrap_err();
        assert!(matches!(err, ShiftworkError::SourceImmutable(_)));

        let err = (&appender("_x") | &letters | &appender("_y")).unwrap_err();
        assert!(matches!(err, ShiftworkError::SourceImmutable(_)));
    }

    #[test]
    fn test_empty_supply_is_exhausted() {
        let supply = Supply::empty();
        assert!(supply.is_ready());
        assert_eq!(supply.pull().unwrap(), None);
        assert_eq!(supply.pull().unwrap(), None);
    }

    #[test]
    fn test_plugin_delegates_to_pull() {
        let mut mock = MockPull::new();
        mock.expect_pull().times(1).returning(|| Ok(Some(json!("whatever"))));
        mock.expect_is_ready().return_const(false);

        let supply = Supply::plugin(mock);
        assert!(!supply.is_ready());
        assert_eq!(supply.pull().unwrap(), Some(json!("whatever")));
        assert_eq!(supply.label(), "plugin");
    }

    #[test]
    fn test_identity_equality() {
        let a = Supply::empty();
        let b = a.clone();
        let c = Supply::empty();
        assert_eq!(a, b);
        assert_ne!(a, c);
    }
}
