//! Worker: a single pipeline stage.
//!
//! A worker owns a task, an optional supply, a context, tags and criteria.
//! Each `pull()` runs the worker exactly one step:
//!
//! 1. If the context outbox holds handoffs from an earlier step, the next one
//!    is returned without touching the supply.
//! 2. Otherwise one value is pulled from the supply (producers pull nothing).
//! 3. If any criterion fails, that value is returned unchanged (bypass).
//! 4. End-of-stream is passed through without invoking a consumer task.
//! 5. The task runs; whatever it returns is the result of this pull.
//!
//! Tasks that take the supply may pull it any number of times inside one
//! step, so batch and filter stages still present one value per pull.

use crate::error::{Result, ShiftworkError};
use crate::pipeline::context::Context;
use crate::pipeline::id::WorkerId;
use crate::pipeline::supply::{chain, Supply, Suppliable};
use crate::pipeline::tags::{criteria_pass, Criterion, TagSet, Taggable};
use crate::pipeline::task::{Task, TaskShape};
use crate::pipeline::value::Value;
use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

/// Resumable execution state, materialized on the first pull.
#[derive(Debug, Clone, Copy, Default)]
struct Workflow {
    steps: u64,
}

struct WorkerCore {
    id: WorkerId,
    name: Option<String>,
    shape: TaskShape,
    task: RefCell<Task>,
    supply: RefCell<Option<Supply>>,
    context: RefCell<Context>,
    tags: RefCell<TagSet>,
    criteria: RefCell<Vec<Criterion>>,
    workflow: Cell<Option<Workflow>>,
    busy: Cell<bool>,
}

/// Resets the in-flight flag when a pull returns, including on error.
struct BusyGuard<'a>(&'a Cell<bool>);

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.0.set(false);
    }
}

/// Shared handle to a pipeline stage. Clones refer to the same worker.
#[derive(Clone)]
pub struct Worker {
    core: Rc<WorkerCore>,
}

impl Worker {
    /// Create a worker around `task` with an empty context and no tags.
    pub fn new(task: Task) -> Self {
        Self::from_parts(task, None, Context::new(), TagSet::new(), Vec::new(), None)
    }

    pub fn builder() -> WorkerBuilder {
        WorkerBuilder::new()
    }

    fn from_parts(
        task: Task,
        supply: Option<Supply>,
        context: Context,
        tags: TagSet,
        criteria: Vec<Criterion>,
        name: Option<String>,
    ) -> Self {
        Self {
            core: Rc::new(WorkerCore {
                id: WorkerId::next(),
                name,
                shape: task.shape(),
                task: RefCell::new(task),
                supply: RefCell::new(supply),
                context: RefCell::new(context),
                tags: RefCell::new(tags),
                criteria: RefCell::new(criteria),
                workflow: Cell::new(None),
                busy: Cell::new(false),
            }),
        }
    }

    pub fn id(&self) -> WorkerId {
        self.core.id
    }

    /// The configured name, or the id when unnamed.
    pub fn name(&self) -> String {
        match &self.core.name {
            Some(name) => format!("{} ({})", name, self.core.id),
            None => self.core.id.to_string(),
        }
    }

    pub fn shape(&self) -> TaskShape {
        self.core.shape
    }

    /// Producers are upstream roots and can never take a supply.
    pub fn is_suppliable(&self) -> bool {
        self.core.shape.accepts_value()
    }

    pub fn is_ready(&self) -> bool {
        !self.is_suppliable() || self.core.supply.borrow().is_some()
    }

    pub fn supply(&self) -> Option<Supply> {
        self.core.supply.borrow().clone()
    }

    pub fn set_supply(&self, supply: impl Into<Supply>) -> Result<()> {
        if !self.is_suppliable() {
            return Err(ShiftworkError::SourceImmutable(self.id()));
        }
        let supply = supply.into();
        tracing::debug!("{} now supplied by {}", self.name(), supply.label());
        *self.core.supply.borrow_mut() = Some(supply);
        Ok(())
    }

    /// Detach the worker from its supply. Always succeeds.
    pub fn clear_supply(&self) -> Option<Supply> {
        self.core.supply.borrow_mut().take()
    }

    /// Make this worker the supply of `consumer` and return the consumer.
    pub fn chain_into<C: Suppliable>(&self, consumer: &C) -> Result<C> {
        chain(self, consumer)
    }

    pub fn set_tags(&self, tags: impl Into<TagSet>) {
        *self.core.tags.borrow_mut() = tags.into();
    }

    pub fn add_tag(&self, tag: impl Into<String>) {
        self.core.tags.borrow_mut().insert(tag);
    }

    pub fn add_criterion(&self, criterion: Criterion) {
        self.core.criteria.borrow_mut().push(criterion);
    }

    pub fn set_criteria(&self, criteria: Vec<Criterion>) {
        *self.core.criteria.borrow_mut() = criteria;
    }

    pub fn criteria_passes(&self) -> bool {
        let criteria = self.core.criteria.borrow().clone();
        criteria_pass(&criteria, self)
    }

    /// Run `f` against this worker's context.
    ///
    /// Panics if called from inside this worker's own task.
    pub fn with_context<R>(&self, f: impl FnOnce(&mut Context) -> R) -> R {
        f(&mut self.core.context.borrow_mut())
    }

    /// Whether the first pull has happened.
    pub fn has_started(&self) -> bool {
        self.core.workflow.get().is_some()
    }

    /// Number of pulls answered so far.
    pub fn steps(&self) -> u64 {
        self.core.workflow.get().map(|w| w.steps).unwrap_or(0)
    }

    /// Produce one value, or `None` at end of stream.
    pub fn pull(&self) -> Result<Option<Value>> {
        let core = &self.core;
        if !self.is_ready() {
            return Err(ShiftworkError::NotReady(core.id));
        }
        if core.busy.replace(true) {
            return Err(ShiftworkError::Reentrant(core.id));
        }
        let _guard = BusyGuard(&core.busy);

        let mut workflow = match core.workflow.get() {
            Some(workflow) => workflow,
            None => {
                tracing::debug!("{} starting {} workflow", self.name(), core.shape);
                Workflow::default()
            }
        };
        workflow.steps += 1;
        core.workflow.set(Some(workflow));

        self.step()
    }

    fn step(&self) -> Result<Option<Value>> {
        let core = &self.core;

        if let Some(item) = core.context.borrow_mut().take_pending() {
            tracing::trace!("{} resumed pending handoff", self.name());
            return Ok(item);
        }

        let supply = self.supply();
        let value = match &supply {
            Some(supply) => supply.pull()?,
            None => None,
        };

        if !self.criteria_passes() {
            tracing::trace!("{} bypassed by criteria", self.name());
            return Ok(value);
        }

        let output = match (core.shape, value, supply) {
            (TaskShape::Producer, _, _) => core.task.borrow_mut().produce()?,
            (_, None, _) => return Ok(None),
            (_, Some(value), Some(supply)) => {
                let mut task = core.task.borrow_mut();
                let mut context = core.context.borrow_mut();
                task.call(value, &supply, &mut context)?
            }
            (_, Some(_), None) => return Err(ShiftworkError::NotReady(core.id)),
        };

        let mut context = core.context.borrow_mut();
        if context.has_pending() {
            context.push_pending(output);
            return Ok(context.take_pending().flatten());
        }
        Ok(output)
    }
}

impl Taggable for Worker {
    fn tags(&self) -> TagSet {
        self.core.tags.borrow().clone()
    }
}

impl Suppliable for Worker {
    fn set_supply(&self, supply: Supply) -> Result<()> {
        Worker::set_supply(self, supply)
    }
}

impl PartialEq for Worker {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.core, &other.core)
    }
}

impl Eq for Worker {}

impl fmt::Debug for Worker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Worker")
            .field("id", &self.core.id)
            .field("shape", &self.core.shape)
            .field("supply", &self.core.supply.borrow())
            .field("tags", &self.core.tags.borrow())
            .finish()
    }
}

/// Builder for workers that need more than a bare task.
///
/// # Example
/// ```
/// use shiftwork::pipeline::{Context, Task, Worker};
/// use serde_json::json;
///
/// let context: Context = [("foo", json!("bar"))].into_iter().collect();
/// let worker = Worker::builder()
///     .task(Task::with_context(|value, _supply, context| {
///         let prefix = context.get_string("foo")?;
///         Ok(Some(json!(format!("{}_{}", prefix, value))))
///     }))
///     .context(context)
///     .tag("prefixer")
///     .build()
///     .unwrap();
///
/// assert!(!worker.is_ready());
/// ```
#[derive(Default)]
pub struct WorkerBuilder {
    task: Option<Task>,
    supply: Option<Supply>,
    context: Option<Context>,
    tags: TagSet,
    criteria: Vec<Criterion>,
    name: Option<String>,
}

impl WorkerBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn task(mut self, task: Task) -> Self {
        self.task = Some(task);
        self
    }

    pub fn supply(mut self, supply: impl Into<Supply>) -> Self {
        self.supply = Some(supply.into());
        self
    }

    /// Inject a pre-populated context.
    pub fn context(mut self, context: Context) -> Self {
        self.context = Some(context);
        self
    }

    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.insert(tag);
        self
    }

    pub fn tags(mut self, tags: impl Into<TagSet>) -> Self {
        self.tags = tags.into();
        self
    }

    pub fn criterion(mut self, criterion: Criterion) -> Self {
        self.criteria.push(criterion);
        self
    }

    pub fn criteria(mut self, criteria: impl IntoIterator<Item = Criterion>) -> Self {
        self.criteria.extend(criteria);
        self
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Build the worker. Without a task the worker relays values unchanged.
    ///
    /// # Errors
    /// Returns `ShiftworkError::SourceImmutable` if a supply was given to a
    /// producer task.
    pub fn build(self) -> Result<Worker> {
        let task = self.task.unwrap_or_else(Task::identity);
        let producer = task.shape() == TaskShape::Producer;
        let worker = Worker::from_parts(
            task,
            None,
            self.context.unwrap_or_default(),
            self.tags,
            self.criteria,
            self.name,
        );
        if let Some(supply) = self.supply {
            if producer {
                return Err(ShiftworkError::SourceImmutable(worker.id()));
            }
            *worker.core.supply.borrow_mut() = Some(supply);
        }
        Ok(worker)
    }
}
