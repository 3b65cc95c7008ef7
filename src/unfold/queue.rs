//! 可能扩展的优先队列：按局部配置大小的最小堆，保证按大小单调地处理扩展。
use std::cmp::Ordering;

use crate::net::ids::TransitionId;
use crate::unfold::model::ConditionId;

/// Storage grows in steps of this many entries.
pub const QUEUE_ALLOC_STEP: usize = 1024;

/// A transition together with the conditions proposed as its inputs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PossibleExtension {
    pub transition: TransitionId,
    /// The condition that triggered the search comes first, then one
    /// condition per remaining place of `preset ∪ reset`.
    pub conditions: Vec<ConditionId>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeQueueEntry {
    pub extension: PossibleExtension,
    /// Sorted transitions of the local configuration, the new event included.
    pub parikh: Vec<TransitionId>,
    pub seq: u64,
}

impl PeQueueEntry {
    pub fn new(extension: PossibleExtension, parikh: Vec<TransitionId>) -> Self {
        debug_assert!(!parikh.is_empty());
        Self {
            extension,
            parikh,
            seq: 0,
        }
    }

    /// Size of the local configuration the event would have once committed.
    pub fn lc_size(&self) -> usize {
        self.parikh.len()
    }

    pub fn transition(&self) -> TransitionId {
        self.extension.transition
    }

    pub fn conditions(&self) -> &[ConditionId] {
        &self.extension.conditions
    }
}

impl Ord for PeQueueEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        self.lc_size()
            .cmp(&other.lc_size())
            .then_with(|| self.parikh.cmp(&other.parikh))
            .then_with(|| self.extension.transition.cmp(&other.extension.transition))
            .then_with(|| self.extension.conditions.cmp(&other.extension.conditions))
            .then_with(|| self.seq.cmp(&other.seq))
    }
}

impl PartialOrd for PeQueueEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// What [`PeQueue::insert`] did with an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    Queued,
    /// The focused-run target arrived; every other entry was discarded.
    FocusedTarget,
    /// Dropped: the local configuration is larger than the depth bound.
    DepthExceeded,
    /// Dropped: the focused-run target is already queued.
    FocusedRunClosed,
}

impl InsertOutcome {
    pub fn is_kept(self) -> bool {
        matches!(self, InsertOutcome::Queued | InsertOutcome::FocusedTarget)
    }
}

/// Binary min-heap of possible extensions.
#[derive(Debug, Default)]
pub struct PeQueue {
    heap: Vec<PeQueueEntry>,
    max_depth: Option<usize>,
    focus: Option<TransitionId>,
    focus_found: bool,
    next_seq: u64,
}

impl PeQueue {
    /// `max_depth` of `None` or `Some(0)` disables the depth bound.
    pub fn new(max_depth: Option<usize>, focus: Option<TransitionId>) -> Self {
        Self {
            heap: Vec::with_capacity(QUEUE_ALLOC_STEP),
            max_depth: max_depth.filter(|depth| *depth > 0),
            focus,
            focus_found: false,
            next_seq: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    pub fn peek(&self) -> Option<&PeQueueEntry> {
        self.heap.first()
    }

    /// `true` once the focused-run target was queued; later inserts are dropped.
    pub fn is_closed(&self) -> bool {
        self.focus_found
    }

    pub fn insert(&mut self, mut entry: PeQueueEntry) -> InsertOutcome {
        if let Some(depth) = self.max_depth {
            if entry.lc_size() > depth {
                return InsertOutcome::DepthExceeded;
            }
        }

        entry.seq = self.next_seq;
        self.next_seq += 1;

        if self.focus == Some(entry.transition()) && !self.focus_found {
            self.heap.clear();
            self.heap.push(entry);
            self.focus_found = true;
            return InsertOutcome::FocusedTarget;
        }
        if self.focus_found {
            return InsertOutcome::FocusedRunClosed;
        }

        if self.heap.len() == self.heap.capacity() {
            self.heap.reserve_exact(QUEUE_ALLOC_STEP);
        }
        self.heap.push(entry);
        self.sift_up(self.heap.len() - 1);
        InsertOutcome::Queued
    }

    /// Removes the entry with the smallest local configuration.
    pub fn pop(&mut self) -> Option<PeQueueEntry> {
        if self.heap.is_empty() {
            return None;
        }
        let last = self.heap.len() - 1;
        self.heap.swap(0, last);
        let first = self.heap.pop();
        if !self.heap.is_empty() {
            self.sift_down(0);
        }
        first
    }

    fn sift_up(&mut self, mut index: usize) {
        while index > 0 {
            let parent = (index - 1) / 2;
            if self.heap[index] >= self.heap[parent] {
                break;
            }
            self.heap.swap(index, parent);
            index = parent;
        }
    }

    fn sift_down(&mut self, mut index: usize) {
        let len = self.heap.len();
        loop {
            let left = 2 * index + 1;
            if left >= len {
                break;
            }
            let right = left + 1;
            let child = if right < len && self.heap[right] < self.heap[left] {
                right
            } else {
                left
            };
            if self.heap[index] <= self.heap[child] {
                break;
            }
            self.heap.swap(index, child);
            index = child;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;

    fn entry(transition: u32, size: usize) -> PeQueueEntry {
        PeQueueEntry::new(
            PossibleExtension {
                transition: TransitionId::new(transition),
                conditions: vec![ConditionId::new(transition)],
            },
            vec![TransitionId::new(transition); size],
        )
    }

    #[test]
    fn pops_in_non_decreasing_size() {
        let mut queue = PeQueue::new(None, None);
        for (t, size) in [(0, 5), (1, 2), (2, 9), (3, 2), (4, 1)] {
            assert_eq!(queue.insert(entry(t, size)), InsertOutcome::Queued);
        }
        assert_eq!(queue.peek().map(|e| e.transition()), Some(TransitionId::new(4)));
        let sizes: Vec<_> = std::iter::from_fn(|| queue.pop())
            .map(|e| e.lc_size())
            .collect();
        assert_eq!(sizes, vec![1, 2, 2, 5, 9]);
        assert!(queue.peek().is_none());
        assert!(queue.pop().is_none());
    }

    #[test]
    fn equal_entries_pop_in_insertion_order() {
        let mut queue = PeQueue::new(None, None);
        queue.insert(entry(7, 3));
        queue.insert(entry(7, 3));
        let first = queue.pop().unwrap();
        let second = queue.pop().unwrap();
        assert!(first.seq < second.seq);
    }

    #[test]
    fn matches_sorted_reference_under_random_workload() {
        let mut rng = rand::rng();
        let mut queue = PeQueue::new(None, None);
        let mut reference: Vec<usize> = Vec::new();
        let mut popped_max = 0;

        for round in 0..3000u32 {
            if rng.random_bool(0.6) || reference.is_empty() {
                let size = rng.random_range(1..40);
                queue.insert(entry(round % 13, size));
                reference.push(size);
                reference.sort_unstable();
            } else {
                assert_eq!(queue.peek().map(|e| e.lc_size()), reference.first().copied());
                let got = queue.pop().unwrap().lc_size();
                assert_eq!(got, reference.remove(0));
                popped_max = popped_max.max(got);
            }
            assert_eq!(queue.len(), reference.len());
        }
        while let Some(e) = queue.pop() {
            assert_eq!(e.lc_size(), reference.remove(0));
        }
        assert!(reference.is_empty());
        assert!(popped_max > 0);
    }

    #[test]
    fn depth_bound_drops_large_entries() {
        let mut queue = PeQueue::new(Some(3), None);
        assert_eq!(queue.insert(entry(0, 3)), InsertOutcome::Queued);
        assert_eq!(queue.insert(entry(1, 4)), InsertOutcome::DepthExceeded);
        assert_eq!(queue.len(), 1);

        let mut unbounded = PeQueue::new(Some(0), None);
        assert!(unbounded.insert(entry(1, 400)).is_kept());
    }

    #[test]
    fn focused_run_keeps_only_the_target() {
        let target = TransitionId::new(9);
        let mut queue = PeQueue::new(None, Some(target));
        queue.insert(entry(0, 1));
        queue.insert(entry(1, 1));
        assert_eq!(queue.len(), 2);
        assert!(!queue.is_closed());

        assert_eq!(queue.insert(entry(9, 6)), InsertOutcome::FocusedTarget);
        assert_eq!(queue.len(), 1);
        assert!(queue.is_closed());

        assert_eq!(queue.insert(entry(2, 1)), InsertOutcome::FocusedRunClosed);
        assert_eq!(queue.insert(entry(9, 1)), InsertOutcome::FocusedRunClosed);
        assert_eq!(queue.len(), 1);
        assert_eq!(queue.pop().unwrap().transition(), target);
    }

    #[test]
    fn depth_bound_applies_before_focus() {
        let target = TransitionId::new(9);
        let mut queue = PeQueue::new(Some(2), Some(target));
        queue.insert(entry(0, 1));
        assert_eq!(queue.insert(entry(9, 5)), InsertOutcome::DepthExceeded);
        assert_eq!(queue.len(), 1);
        assert!(!queue.is_closed());
    }
}
