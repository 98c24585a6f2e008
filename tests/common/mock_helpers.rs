//! Upstream doubles usable from integration tests

use std::cell::Cell;
use std::rc::Rc;

use shiftwork::pipeline::{Pull, Supply, Value};

/// An upstream that counts how often it is pulled.
pub struct CountingPull {
    items: Vec<Value>,
    pulls: Rc<Cell<usize>>,
}

impl CountingPull {
    /// Returns the supply and a handle to its pull counter.
    pub fn supply(items: Vec<Value>) -> (Supply, Rc<Cell<usize>>) {
        let pulls = Rc::new(Cell::new(0));
        let upstream = Self {
            items,
            pulls: pulls.clone(),
        };
        (Supply::plugin(upstream), pulls)
    }
}

impl Pull for CountingPull {
    fn pull(&self) -> shiftwork::Result<Option<Value>> {
        let n = self.pulls.get();
        self.pulls.set(n + 1);
        Ok(self.items.get(n).cloned())
    }
}
