//! 扩展引擎：每创建一个新条件调用一次，枚举组合、过滤冲突并送入优先队列。
use crate::net::ids::TransitionId;
use crate::net::Net;
use crate::unfold::combination::CombinationEnumerator;
use crate::unfold::conflict::ConflictChecker;
use crate::unfold::epoch::EpochMarks;
use crate::unfold::model::{ConditionId, Unfolding};
use crate::unfold::queue::{InsertOutcome, PeQueue, PeQueueEntry};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EngineConfig {
    /// Largest local configuration allowed into the queue; `None` or 0 means
    /// unbounded.
    pub max_depth: Option<usize>,
    /// Focused run: stop as soon as this transition can occur.
    pub stop_transition: Option<TransitionId>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EngineStats {
    pub conditions_seen: usize,
    pub extensions_found: usize,
    pub queued: usize,
    pub dropped_depth: usize,
    pub dropped_focus: usize,
}

impl EngineStats {
    fn record(&mut self, outcome: InsertOutcome) {
        match outcome {
            InsertOutcome::Queued | InsertOutcome::FocusedTarget => self.queued += 1,
            InsertOutcome::DepthExceeded => self.dropped_depth += 1,
            InsertOutcome::FocusedRunClosed => self.dropped_focus += 1,
        }
    }
}

/// Possible-extension engine: owns the epoch marks, the conflict checker's
/// work stack, the enumerator's scratch slots and the priority queue.
#[derive(Debug)]
pub struct ExtensionEngine {
    marks: EpochMarks,
    checker: ConflictChecker,
    enumerator: CombinationEnumerator,
    queue: PeQueue,
    stats: EngineStats,
}

impl ExtensionEngine {
    /// Sizes the scratch structures once: one slot per place of the largest
    /// `preset ∪ reset`, marks for at least the initial conditions.
    pub fn initialize(
        initial_marking_size: usize,
        max_prereset: usize,
        config: EngineConfig,
    ) -> Self {
        let mut marks = EpochMarks::new();
        marks.reserve(initial_marking_size, 0);
        log::debug!(
            "extension engine: {} slots, depth bound {:?}, focus {:?}",
            max_prereset,
            config.max_depth,
            config.stop_transition
        );
        Self {
            marks,
            checker: ConflictChecker::new(),
            enumerator: CombinationEnumerator::new(max_prereset),
            queue: PeQueue::new(config.max_depth, config.stop_transition),
            stats: EngineStats::default(),
        }
    }

    pub fn for_net(net: &Net, config: EngineConfig) -> Self {
        if let Some(stop) = config.stop_transition {
            assert!(
                stop.raw() < net.transitions_len() as u32,
                "focused-run target {stop} is not a transition of the net"
            );
        }
        Self::initialize(net.initial_marking_len(), net.max_prereset(), config)
    }

    /// Registers `cond` at its place and queues every possible extension
    /// that contains it. Returns how many of them were kept by the queue.
    pub fn on_new_condition(
        &mut self,
        net: &Net,
        unfolding: &mut Unfolding,
        cond: ConditionId,
    ) -> usize {
        assert!(
            unfolding.condition(cond).place.raw() < net.places_len() as u32,
            "condition {cond} lies on a place outside the net"
        );
        unfolding.register(cond);
        self.stats.conditions_seen += 1;

        if self.queue.is_closed() {
            return 0;
        }

        let extensions =
            self.enumerator
                .extend(net, unfolding, &mut self.checker, &mut self.marks, cond);
        self.stats.extensions_found += extensions.len();

        let mut kept = 0;
        for extension in extensions {
            let parikh = self.checker.local_configuration(
                &mut self.marks,
                unfolding,
                extension.transition,
                &extension.conditions,
            );
            let entry = PeQueueEntry::new(extension, parikh);
            let (transition, size) = (entry.transition(), entry.lc_size());
            let outcome = self.queue.insert(entry);
            log::debug!(
                "extension {} (size {}) from {}: {:?}",
                net.transition(transition).name,
                size,
                cond,
                outcome
            );
            self.stats.record(outcome);
            if outcome.is_kept() {
                kept += 1;
            }
        }
        kept
    }

    pub fn pop(&mut self) -> Option<PeQueueEntry> {
        self.queue.pop()
    }

    pub fn queue(&self) -> &PeQueue {
        &self.queue
    }

    pub fn stats(&self) -> EngineStats {
        self.stats
    }

    pub fn is_conflicting(&mut self, unfolding: &Unfolding, conditions: &[ConditionId]) -> bool {
        self.checker
            .is_conflicting(&mut self.marks, unfolding, conditions)
    }
}
