//! Applies actions received from other participants.
//!
//! Replay goes through the same [`ToolSession::apply`] path as local input
//! but never publishes, so a received action cannot echo back into the room.
//! A bad message is dropped and logged; it never stops the replay loop.

use crate::protocol::Action;
use crate::session::{Applied, ToolSession};
use crate::surface::VectorSurface;
use std::ops::AddAssign;

/// Counts of what a replay did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReplayReport {
    /// Actions that changed state.
    pub changed: usize,
    /// Well-formed actions that were no-ops.
    pub ignored: usize,
    /// Messages that could not be decoded.
    pub dropped: usize,
}

impl ReplayReport {
    pub fn total(&self) -> usize {
        self.changed + self.ignored + self.dropped
    }

    fn count(&mut self, applied: Applied) {
        match applied {
            Applied::Changed => self.changed += 1,
            Applied::Ignored(_) => self.ignored += 1,
        }
    }
}

impl AddAssign for ReplayReport {
    fn add_assign(&mut self, other: Self) {
        self.changed += other.changed;
        self.ignored += other.ignored;
        self.dropped += other.dropped;
    }
}

/// Feeds inbound actions into a session, keeping running totals.
#[derive(Debug, Clone, Default)]
pub struct ReplayDispatcher {
    totals: ReplayReport,
}

impl ReplayDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything dispatched so far.
    pub fn totals(&self) -> ReplayReport {
        self.totals
    }

    /// Apply one received action.
    pub fn dispatch(
        &mut self,
        session: &mut ToolSession,
        surface: &mut dyn VectorSurface,
        action: &Action,
    ) -> Applied {
        let applied = session.apply(action, surface);
        self.totals.count(applied);
        applied
    }

    /// Decode and apply one raw envelope. Returns `None` if it was dropped.
    pub fn dispatch_message(
        &mut self,
        session: &mut ToolSession,
        surface: &mut dyn VectorSurface,
        json: &str,
    ) -> Option<Applied> {
        match Action::decode(json) {
            Ok(action) => Some(self.dispatch(session, surface, &action)),
            Err(e) => {
                log::warn!("Dropping canvas message: {}", e);
                self.totals.dropped += 1;
                None
            }
        }
    }

    /// Apply a batch of actions in order.
    pub fn replay<'a>(
        &mut self,
        session: &mut ToolSession,
        surface: &mut dyn VectorSurface,
        actions: impl IntoIterator<Item = &'a Action>,
    ) -> ReplayReport {
        let mut report = ReplayReport::default();
        for action in actions {
            report.count(session.apply(action, surface));
        }
        self.totals += report;
        report
    }
}
