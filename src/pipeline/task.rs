//! Task shapes.
//!
//! A worker's behavior is decided by the shape of its task, fixed at
//! construction time:
//! - **Producer**: takes no input; the worker is an upstream root.
//! - **Consumer**: receives each upstream value.
//! - **ConsumerWithSupply**: also receives the supply, so it may pull more.
//! - **ConsumerWithSupplyAndContext**: also receives the worker's `Context`.

use crate::error::Result;
use crate::pipeline::context::Context;
use crate::pipeline::supply::Supply;
use crate::pipeline::value::Value;
use std::fmt;

pub type ProducerFn = Box<dyn FnMut() -> Result<Option<Value>>>;
pub type ConsumerFn = Box<dyn FnMut(Value) -> Result<Option<Value>>>;
pub type SupplyFn = Box<dyn FnMut(Value, &Supply) -> Result<Option<Value>>>;
pub type ContextFn = Box<dyn FnMut(Value, &Supply, &mut Context) -> Result<Option<Value>>>;

/// The field-less discriminant of a [`Task`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskShape {
    Producer,
    Consumer,
    ConsumerWithSupply,
    ConsumerWithSupplyAndContext,
}

impl TaskShape {
    /// How many arguments a task of this shape receives.
    pub fn arity(self) -> usize {
        match self {
            TaskShape::Producer => 0,
            TaskShape::Consumer => 1,
            TaskShape::ConsumerWithSupply => 2,
            TaskShape::ConsumerWithSupplyAndContext => 3,
        }
    }

    /// Whether a task of this shape consumes upstream values.
    pub fn accepts_value(self) -> bool {
        self.arity() > 0
    }
}

impl fmt::Display for TaskShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TaskShape::Producer => "producer",
            TaskShape::Consumer => "consumer",
            TaskShape::ConsumerWithSupply => "consumer-with-supply",
            TaskShape::ConsumerWithSupplyAndContext => "consumer-with-supply-and-context",
        };
        f.write_str(name)
    }
}

/// The work a `Worker` performs on each pull.
pub enum Task {
    Producer(ProducerFn),
    Consumer(ConsumerFn),
    ConsumerWithSupply(SupplyFn),
    ConsumerWithSupplyAndContext(ContextFn),
}

impl Task {
    pub fn producer<F>(f: F) -> Self
    where
        F: FnMut() -> Result<Option<Value>> + 'static,
    {
        Task::Producer(Box::new(f))
    }

    pub fn consumer<F>(f: F) -> Self
    where
        F: FnMut(Value) -> Result<Option<Value>> + 'static,
    {
        Task::Consumer(Box::new(f))
    }

    pub fn with_supply<F>(f: F) -> Self
    where
        F: FnMut(Value, &Supply) -> Result<Option<Value>> + 'static,
    {
        Task::ConsumerWithSupply(Box::new(f))
    }

    pub fn with_context<F>(f: F) -> Self
    where
        F: FnMut(Value, &Supply, &mut Context) -> Result<Option<Value>> + 'static,
    {
        Task::ConsumerWithSupplyAndContext(Box::new(f))
    }

    /// A consumer answering `true`/`false` for each value, for filter stages.
    pub fn predicate<F>(f: F) -> Self
    where
        F: Fn(&Value) -> bool + 'static,
    {
        Task::consumer(move |value| Ok(Some(Value::Bool(f(&value)))))
    }

    /// A consumer that hands every value on unchanged.
    pub fn identity() -> Self {
        Task::consumer(|value| Ok(Some(value)))
    }

    pub fn shape(&self) -> TaskShape {
        match self {
            Task::Producer(_) => TaskShape::Producer,
            Task::Consumer(_) => TaskShape::Consumer,
            Task::ConsumerWithSupply(_) => TaskShape::ConsumerWithSupply,
            Task::ConsumerWithSupplyAndContext(_) => TaskShape::ConsumerWithSupplyAndContext,
        }
    }

    /// Run a consumer-shaped task on one upstream value.
    ///
    /// Producers ignore `value`; they are invoked without a supply.
    pub(crate) fn call(
        &mut self,
        value: Value,
        supply: &Supply,
        context: &mut Context,
    ) -> Result<Option<Value>> {
        match self {
            Task::Producer(f) => f(),
            Task::Consumer(f) => f(value),
            Task::ConsumerWithSupply(f) => f(value, supply),
            Task::ConsumerWithSupplyAndContext(f) => f(value, supply, context),
        }
    }

    pub(crate) fn produce(&mut self) -> Result<Option<Value>> {
        match self {
            Task::Producer(f) => f(),
            // Consumers are never invoked without a value.
            _ => Ok(None),
        }
    }
}

impl fmt::Debug for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Task").field(&self.shape()).finish()
    }
}
