//! Mount context shared by every animated section

use crate::scheduler::SchedulerHandle;
use crate::viewport::{ScrollState, Viewport};
use std::rc::Rc;

/// What a component needs to mount: a clock to schedule against and the
/// viewport it lives in
#[derive(Clone)]
pub struct Host {
    pub scheduler: SchedulerHandle,
    pub viewport: Rc<Viewport>,
}

impl Host {
    pub fn new(scheduler: SchedulerHandle, viewport: Rc<Viewport>) -> Self {
        Self {
            scheduler,
            viewport,
        }
    }

    /// Current virtual time, 0 once the scheduler is gone
    pub fn now(&self) -> f64 {
        self.scheduler.now().unwrap_or(0.0)
    }

    pub fn scroll(&self) -> ScrollState {
        self.viewport.state()
    }
}

impl std::fmt::Debug for Host {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Host")
            .field("scheduler", &self.scheduler)
            .field("scroll", &self.viewport.state())
            .finish()
    }
}
