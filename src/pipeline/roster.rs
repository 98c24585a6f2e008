//! Roster: an ordered chain of workers.
//!
//! Append order is pipeline order: the head is the most upstream worker and
//! the tail the most downstream. Every structural edit keeps adjacent workers
//! wired, so `workers[i + 1].supply() == workers[i]` holds between calls.

use crate::error::Result;
use crate::pipeline::worker::Worker;

#[derive(Debug, Default)]
pub struct Roster {
    workers: Vec<Worker>,
}

impl Roster {
    /// Build a roster, wiring each worker to the one before it.
    ///
    /// # Errors
    /// Returns `ShiftworkError::SourceImmutable` if a producer appears after
    /// the first position.
    pub fn new(workers: impl IntoIterator<Item = Worker>) -> Result<Self> {
        let mut roster = Self::default();
        for worker in workers {
            roster.push(worker)?;
        }
        Ok(roster)
    }

    /// Append a worker, supplying it from the current tail. `None` is a no-op.
    pub fn push(&mut self, worker: impl Into<Option<Worker>>) -> Result<()> {
        let Some(worker) = worker.into() else {
            return Ok(());
        };
        if let Some(tail) = self.workers.last() {
            worker.set_supply(tail)?;
        }
        tracing::debug!("Roster appended {} at position {}", worker.name(), self.workers.len());
        self.workers.push(worker);
        Ok(())
    }

    /// Remove the tail. The removed worker loses its supply.
    pub fn pop(&mut self) -> Option<Worker> {
        let popped = self.workers.pop()?;
        popped.clear_supply();
        tracing::debug!("Roster popped {}", popped.name());
        Some(popped)
    }

    /// Remove the head. The new head is detached from the old one.
    pub fn shift(&mut self) -> Option<Worker> {
        if self.workers.is_empty() {
            return None;
        }
        let shifted = self.workers.remove(0);
        if let Some(head) = self.workers.first() {
            head.clear_supply();
        }
        tracing::debug!("Roster shifted {}", shifted.name());
        Some(shifted)
    }

    /// Insert a worker at the head, making it the old head's supply.
    ///
    /// # Errors
    /// Returns `ShiftworkError::SourceImmutable` if the current head is a
    /// producer; the roster is left unchanged.
    pub fn unshift(&mut self, worker: Worker) -> Result<()> {
        if let Some(head) = self.workers.first() {
            head.set_supply(&worker)?;
        }
        tracing::debug!("Roster unshifted {}", worker.name());
        self.workers.insert(0, worker);
        Ok(())
    }

    pub fn first(&self) -> Option<&Worker> {
        self.workers.first()
    }

    pub fn last(&self) -> Option<&Worker> {
        self.workers.last()
    }

    pub fn len(&self) -> usize {
        self.workers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.workers.is_empty()
    }

    pub fn workers(&self) -> &[Worker] {
        &self.workers
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Worker> {
        self.workers.iter()
    }

    /// Check that every worker is supplied by its predecessor.
    pub fn is_wired(&self) -> bool {
        self.workers
            .windows(2)
            .all(|pair| pair[1].supply().is_some_and(|s| s == pair[0]))
    }
}

impl<'a> IntoIterator for &'a Roster {
    type Item = &'a Worker;
    type IntoIter = std::slice::Iter<'a, Worker>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
