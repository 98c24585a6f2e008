//! Identity types for the pipeline system.
//!
//! IDs are newtypes over `u32` handed out from process-wide counters, so every
//! worker and gang can be named in errors and log fields without borrowing it.

use std::fmt;
use std::sync::atomic::{AtomicU32, Ordering};

static NEXT_WORKER: AtomicU32 = AtomicU32::new(0);
static NEXT_GANG: AtomicU32 = AtomicU32::new(0);

/// Identifies a `Worker` for its whole lifetime.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WorkerId(pub u32);

impl WorkerId {
    /// Allocate a fresh id.
    pub fn next() -> Self {
        Self(NEXT_WORKER.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Debug for WorkerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "WorkerId({})", self.0)
    }
}

impl fmt::Display for WorkerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "worker#{}", self.0)
    }
}

/// Identifies a `Gang`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GangId(pub u32);

impl GangId {
    pub fn next() -> Self {
        Self(NEXT_GANG.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Debug for GangId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "GangId({})", self.0)
    }
}

impl fmt::Display for GangId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "gang#{}", self.0)
    }
}
