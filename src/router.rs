use std::cell::Cell;
use std::fmt;

use tracing::{debug, warn};

use crate::ui::Ui;

/// The tab set of one console.
pub trait Page: Copy + Eq + fmt::Debug + 'static {
    const DEFAULT: Self;

    fn name(&self) -> &'static str;

    fn all() -> &'static [Self];

    fn from_name(name: &str) -> Option<Self> {
        Self::all().iter().copied().find(|page| page.name() == name)
    }
}

/// In-memory tab state. Exactly one page is active at a time; there is no
/// URL routing.
#[derive(Debug)]
pub struct PageRouter<P: Page> {
    active: Cell<P>,
}

impl<P: Page> Default for PageRouter<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: Page> PageRouter<P> {
    pub fn new() -> Self {
        Self {
            active: Cell::new(P::DEFAULT),
        }
    }

    pub fn active(&self) -> P {
        self.active.get()
    }

    /// Activates the page called `name` and returns it so the caller can run
    /// its loader. Unknown names change nothing.
    pub fn select<U: Ui>(&self, ui: &U, name: &str) -> Option<P> {
        let Some(page) = P::from_name(name) else {
            warn!("unknown page {:?}", name);
            return None;
        };
        self.active.set(page);
        ui.show_page(page.name());
        debug!("page {:?} active", page);
        Some(page)
    }
}
