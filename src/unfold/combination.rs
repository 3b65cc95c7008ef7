//! 组合枚举：为新条件的每个后继迁移回溯搜索两两并发的输入条件组合。
use crate::net::ids::TransitionId;
use crate::net::Net;
use crate::unfold::conflict::ConflictChecker;
use crate::unfold::epoch::EpochMarks;
use crate::unfold::model::{ConditionId, Unfolding};
use crate::unfold::queue::PossibleExtension;

/// Candidates for one place of a transition's `preset ∪ reset`.
#[derive(Debug, Default)]
struct Slot {
    candidates: Vec<ConditionId>,
    cursor: usize,
}

impl Slot {
    fn current(&self) -> ConditionId {
        self.candidates[self.cursor]
    }
}

/// Slots in use for one transition. Dropping it empties every slot, so no
/// candidate list outlives the transition, whichever way the search ends.
struct SlotFrame<'a> {
    slots: &'a mut [Slot],
    used: usize,
}

impl<'a> SlotFrame<'a> {
    fn new(slots: &'a mut [Slot]) -> Self {
        Self { slots, used: 0 }
    }

    /// Opens the next slot; the returned list is filled by the caller.
    fn open(&mut self) -> &mut Vec<ConditionId> {
        let slot = &mut self.slots[self.used];
        slot.cursor = 0;
        slot.candidates.clear();
        self.used += 1;
        &mut slot.candidates
    }

    fn active(&mut self) -> &mut [Slot] {
        &mut self.slots[..self.used]
    }
}

impl Drop for SlotFrame<'_> {
    fn drop(&mut self) {
        for slot in &mut self.slots[..self.used] {
            slot.candidates.clear();
            slot.cursor = 0;
        }
    }
}

/// Finds, for every transition fed by a new condition, all sets of mutually
/// concurrent conditions that complete its inputs.
#[derive(Debug)]
pub struct CombinationEnumerator {
    slots: Vec<Slot>,
    partial: Vec<ConditionId>,
}

impl CombinationEnumerator {
    /// `max_prereset` bounds the number of slots any transition needs.
    pub fn new(max_prereset: usize) -> Self {
        Self {
            slots: (0..max_prereset).map(|_| Slot::default()).collect(),
            partial: Vec::with_capacity(max_prereset),
        }
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// All possible extensions that contain `cond`. `cond` must already be
    /// the newest condition of the unfolding's co-relation.
    pub fn extend(
        &mut self,
        net: &Net,
        unfolding: &Unfolding,
        checker: &mut ConflictChecker,
        marks: &mut EpochMarks,
        cond: ConditionId,
    ) -> Vec<PossibleExtension> {
        let mut found = Vec::new();
        let place = unfolding.condition(cond).place;

        for transition in net.place(place).consumers() {
            if !admissible(net, unfolding, cond, transition) {
                log::trace!(
                    "{} on emptied place {} cannot feed {}",
                    cond,
                    net.place(place).name,
                    net.transition(transition).name
                );
                continue;
            }
            self.enumerate(net, unfolding, checker, marks, cond, transition, &mut found);
        }

        found
    }

    #[allow(clippy::too_many_arguments)]
    fn enumerate(
        &mut self,
        net: &Net,
        unfolding: &Unfolding,
        checker: &mut ConflictChecker,
        marks: &mut EpochMarks,
        cond: ConditionId,
        transition: TransitionId,
        found: &mut Vec<PossibleExtension>,
    ) {
        let own_place = unfolding.condition(cond).place;
        let t = net.transition(transition);
        assert!(
            t.prereset_len() <= self.slots.len(),
            "transition {} needs more slots than the engine was sized for",
            t.name
        );

        let mut frame = SlotFrame::new(&mut self.slots);
        for place in t.prereset().filter(|p| *p != own_place) {
            let needs_token = t.consumes(place);
            let candidates = frame.open();
            candidates.extend(unfolding.co_conditions(cond).filter(|c| {
                let other = unfolding.condition(*c);
                other.place == place && !(needs_token && other.is_empty())
            }));
            if candidates.is_empty() {
                return;
            }
        }

        let slots = frame.active();
        if slots.is_empty() {
            found.push(PossibleExtension {
                transition,
                conditions: vec![cond],
            });
            return;
        }

        let last = slots.len() - 1;
        let mut depth = 0;
        loop {
            self.partial.clear();
            self.partial.extend(slots[..=depth].iter().map(Slot::current));

            if !checker.is_conflicting(marks, unfolding, &self.partial) {
                if depth < last {
                    depth += 1;
                    slots[depth].cursor = 0;
                    continue;
                }
                let mut conditions = Vec::with_capacity(slots.len() + 1);
                conditions.push(cond);
                conditions.extend_from_slice(&self.partial);
                found.push(PossibleExtension {
                    transition,
                    conditions,
                });
            }

            // next choice at this depth, backtracking over exhausted slots
            loop {
                let slot = &mut slots[depth];
                slot.cursor += 1;
                if slot.cursor < slot.candidates.len() {
                    break;
                }
                slot.cursor = 0;
                if depth == 0 {
                    return;
                }
                depth -= 1;
            }
        }
    }
}

/// An empty condition (a place emptied by a reset, or unmarked initially)
/// can only fill a reset slot, never a normal consuming arc.
fn admissible(net: &Net, unfolding: &Unfolding, cond: ConditionId, transition: TransitionId) -> bool {
    let c = unfolding.condition(cond);
    let consumes = net.transition(transition).consumes(c.place);
    match c.producer {
        None => !(consumes && !net.place(c.place).is_marked()),
        Some(event) => {
            let producer = net.transition(unfolding.event(event).transition);
            !(consumes && producer.resets(c.place) && !producer.produces(c.place))
        }
    }
}
