//! Gang: a roster presented as a single stage.
//!
//! A gang pulls like a worker. When its criteria pass, the pull goes to the
//! roster's tail and cascades through every internal stage. When they fail,
//! the gang reaches straight through to the supply of the roster's head, so
//! the whole sub-pipeline is skipped in one step.

use crate::error::{Result, ShiftworkError};
use crate::pipeline::id::GangId;
use crate::pipeline::roster::Roster;
use crate::pipeline::supply::{chain, Supply, Suppliable};
use crate::pipeline::tags::{criteria_pass, Criterion, TagSet, Taggable};
use crate::pipeline::value::Value;
use crate::pipeline::worker::Worker;
use std::cell::{Ref, RefCell, RefMut};
use std::fmt;
use std::rc::Rc;

struct GangCore {
    id: GangId,
    roster: RefCell<Roster>,
    tags: RefCell<TagSet>,
    criteria: RefCell<Vec<Criterion>>,
}

/// Shared handle to a gang. Clones refer to the same gang.
#[derive(Clone)]
pub struct Gang {
    core: Rc<GangCore>,
}

impl Gang {
    /// Build a gang around `workers`, wired in order.
    pub fn new(workers: impl IntoIterator<Item = Worker>) -> Result<Self> {
        Self::builder(workers).build()
    }

    pub fn builder(workers: impl IntoIterator<Item = Worker>) -> GangBuilder {
        GangBuilder {
            workers: workers.into_iter().collect(),
            tags: TagSet::new(),
            criteria: Vec::new(),
        }
    }

    pub fn id(&self) -> GangId {
        self.core.id
    }

    pub fn roster(&self) -> Ref<'_, Roster> {
        self.core.roster.borrow()
    }

    /// Mutable access for structural edits.
    ///
    /// Must not be held across a pull of this gang.
    pub fn roster_mut(&self) -> RefMut<'_, Roster> {
        self.core.roster.borrow_mut()
    }

    fn first(&self) -> Result<Worker> {
        self.roster().first().cloned().ok_or(ShiftworkError::EmptyRoster)
    }

    fn last(&self) -> Result<Worker> {
        self.roster().last().cloned().ok_or(ShiftworkError::EmptyRoster)
    }

    pub fn is_ready(&self) -> bool {
        self.roster().first().is_some_and(Worker::is_ready)
    }

    pub fn supply(&self) -> Option<Supply> {
        self.roster().first().and_then(Worker::supply)
    }

    pub fn set_supply(&self, supply: impl Into<Supply>) -> Result<()> {
        self.first()?.set_supply(supply)
    }

    /// Make this gang the supply of `consumer` and return the consumer.
    pub fn chain_into<C: Suppliable>(&self, consumer: &C) -> Result<C> {
        chain(self, consumer)
    }

    /// Append a worker to the end of the roster.
    pub fn append(&self, worker: Worker) -> Result<()> {
        self.roster_mut().push(worker)
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

    pub fn criteria_passes(&self) -> bool {
        let criteria = self.core.criteria.borrow().clone();
        criteria_pass(&criteria, self)
    }

    pub fn pull(&self) -> Result<Option<Value>> {
        if self.criteria_passes() {
            return self.last()?.pull();
        }

        let head = self.first()?;
        let supply = head.supply().ok_or(ShiftworkError::NotReady(head.id()))?;
        tracing::trace!("{} bypassed, pulling {} directly", self.id(), supply.label());
        supply.pull()
    }
}

impl Taggable for Gang {
    fn tags(&self) -> TagSet {
        self.core.tags.borrow().clone()
    }
}

impl Suppliable for Gang {
    fn set_supply(&self, supply: Supply) -> Result<()> {
        Gang::set_supply(self, supply)
    }
}

impl PartialEq for Gang {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.core, &other.core)
    }
}

impl Eq for Gang {}

impl fmt::Debug for Gang {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Gang")
            .field("id", &self.core.id)
            .field("roster", &self.core.roster.borrow().len())
            .field("tags", &self.core.tags.borrow())
            .finish()
    }
}

/// Builder for gangs with tags or criteria.
pub struct GangBuilder {
    workers: Vec<Worker>,
    tags: TagSet,
    criteria: Vec<Criterion>,
}

impl GangBuilder {
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

    /// # Errors
    /// Returns `ShiftworkError::SourceImmutable` if a producer appears after
    /// the first worker.
    pub fn build(self) -> Result<Gang> {
        let roster = Roster::new(self.workers)?;
        let gang = Gang {
            core: Rc::new(GangCore {
                id: GangId::next(),
                roster: RefCell::new(roster),
                tags: RefCell::new(self.tags),
                criteria: RefCell::new(self.criteria),
            }),
        };
        tracing::debug!("{} formed with {} workers", gang.id(), gang.roster().len());
        Ok(gang)
    }
}
