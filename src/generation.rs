use std::cell::Cell;
use std::rc::Rc;

/// Monotonic request counter for one view.
///
/// Each load takes a ticket before it awaits; when the response comes back
/// it is applied only if no later load has started since.
#[derive(Clone, Debug, Default)]
pub struct Generation {
    latest: Rc<Cell<u64>>,
}

#[derive(Debug)]
pub struct Ticket {
    latest: Rc<Cell<u64>>,
    issued: u64,
}

impl Generation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin(&self) -> Ticket {
        let issued = self.latest.get() + 1;
        self.latest.set(issued);
        Ticket {
            latest: self.latest.clone(),
            issued,
        }
    }

    /// Makes every outstanding ticket stale.
    pub fn invalidate(&self) {
        self.latest.set(self.latest.get() + 1);
    }
}

impl Ticket {
    pub fn is_current(&self) -> bool {
        self.latest.get() == self.issued
    }

    pub fn issued(&self) -> u64 {
        self.issued
    }
}
