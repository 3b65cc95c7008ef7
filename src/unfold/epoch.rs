//! Epoch-stamped visited marks for conditions and events.
//!
//! A mark counts as set only while it equals the current epoch, so starting
//! a fresh walk costs one increment instead of clearing every mark.
use crate::net::index_vec::{Idx, IndexVec};
use crate::unfold::model::{ConditionId, EventId};

#[derive(Debug, Default)]
pub struct EpochMarks {
    epoch: u64,
    conditions: IndexVec<ConditionId, u64>,
    events: IndexVec<EventId, u64>,
}

impl EpochMarks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Starts a new walk; every mark from earlier walks becomes stale.
    pub fn advance(&mut self) -> u64 {
        self.epoch += 1;
        self.epoch
    }

    /// Marks `id` and returns `true` if it was not yet marked this epoch.
    pub fn mark_condition(&mut self, id: ConditionId) -> bool {
        debug_assert!(self.epoch > 0, "mark before the first advance");
        self.conditions.ensure_contains(id, 0);
        let slot = &mut self.conditions[id];
        let fresh = *slot != self.epoch;
        *slot = self.epoch;
        fresh
    }

    pub fn is_condition_marked(&self, id: ConditionId) -> bool {
        self.epoch > 0 && self.conditions.get(id).copied() == Some(self.epoch)
    }

    /// Marks `id` and returns `true` if it was not yet marked this epoch.
    pub fn mark_event(&mut self, id: EventId) -> bool {
        debug_assert!(self.epoch > 0, "mark before the first advance");
        self.events.ensure_contains(id, 0);
        let slot = &mut self.events[id];
        let fresh = *slot != self.epoch;
        *slot = self.epoch;
        fresh
    }

    pub fn is_event_marked(&self, id: EventId) -> bool {
        self.epoch > 0 && self.events.get(id).copied() == Some(self.epoch)
    }

    /// Pre-sizes the tables so walks over `conditions`/`events` do not grow them.
    pub fn reserve(&mut self, conditions: usize, events: usize) {
        if conditions > 0 {
            self.conditions
                .ensure_contains(ConditionId::from_usize(conditions - 1), 0);
        }
        if events > 0 {
            self.events.ensure_contains(EventId::from_usize(events - 1), 0);
        }
    }
}
