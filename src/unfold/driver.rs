//! 展开驱动：弹出可能扩展、提交为事件、为输出条件维护并发关系并继续扩展。
//!
//! Queued extensions are never re-validated when popped: a committed causal
//! history never changes, and a condition may feed any number of events, so an
//! extension that was valid on insertion stays valid.
use indexmap::IndexSet;

use crate::net::ids::{PlaceId, TransitionId};
use crate::net::structure::NodeList;
use crate::net::Net;
use crate::unfold::extension::{EngineConfig, EngineStats, ExtensionEngine};
use crate::unfold::model::{ConditionId, EventId, Unfolding};
use crate::unfold::queue::PeQueueEntry;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UnfoldSettings {
    pub max_depth: Option<usize>,
    pub stop_transition: Option<TransitionId>,
    /// Stop after committing this many events.
    pub max_events: Option<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    QueueExhausted,
    TargetFired(EventId),
    EventBudget,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnfoldStats {
    pub conditions: usize,
    pub events: usize,
    pub engine: EngineStats,
    pub stop: StopReason,
}

#[derive(Debug)]
pub struct UnfoldResult {
    pub unfolding: Unfolding,
    pub stats: UnfoldStats,
}

impl UnfoldResult {
    pub fn target_event(&self) -> Option<EventId> {
        match self.stats.stop {
            StopReason::TargetFired(event) => Some(event),
            _ => None,
        }
    }
}

pub struct Unfolder<'net> {
    net: &'net Net,
    unfolding: Unfolding,
    engine: ExtensionEngine,
    settings: UnfoldSettings,
    seeded: bool,
}

impl<'net> Unfolder<'net> {
    pub fn new(net: &'net Net, settings: UnfoldSettings) -> Self {
        let config = EngineConfig {
            max_depth: settings.max_depth,
            stop_transition: settings.stop_transition,
        };
        Self {
            net,
            unfolding: Unfolding::new(net),
            engine: ExtensionEngine::for_net(net, config),
            settings,
            seeded: false,
        }
    }

    pub fn unfolding(&self) -> &Unfolding {
        &self.unfolding
    }

    pub fn engine(&self) -> &ExtensionEngine {
        &self.engine
    }

    /// Creates the initial conditions: a full one per marked place and an
    /// empty one per unmarked place that some transition resets.
    pub fn seed_initial_marking(&mut self) {
        if self.seeded {
            return;
        }
        self.seeded = true;

        let net = self.net;
        let mut initial = Vec::new();
        for (place, data) in net.places.iter_enumerated() {
            let tokens = if data.is_marked() {
                1
            } else if net.is_reset_place(place) {
                0
            } else {
                continue;
            };
            let cond = self.unfolding.add_condition(place, tokens, None);
            for &earlier in &initial {
                self.unfolding.link_concurrent(cond, earlier);
            }
            initial.push(cond);
            self.engine.on_new_condition(net, &mut self.unfolding, cond);
        }
        log::info!(
            "initial marking: {} conditions, {} extensions queued",
            initial.len(),
            self.engine.queue().len()
        );
    }

    /// Commits the next extension. `None` once the queue is empty.
    pub fn step(&mut self) -> Option<EventId> {
        self.seed_initial_marking();
        let entry = self.engine.pop()?;
        Some(self.commit(entry))
    }

    /// Adds the event described by `entry`, creates its outputs and feeds
    /// each of them to the extension engine, one at a time.
    pub fn commit(&mut self, entry: PeQueueEntry) -> EventId {
        let transition = entry.transition();
        let preset: NodeList<ConditionId> = entry.conditions().iter().copied().collect();
        let common = self.inherited_co(&preset);
        let event = self.unfolding.add_event(transition, preset, common);
        log::debug!(
            "commit {} = {} (size {}) on {:?}",
            event,
            self.net.transition(transition).name,
            entry.lc_size(),
            entry.conditions()
        );

        let common = self.unfolding.event(event).co_common.clone();
        let mut siblings: Vec<ConditionId> = Vec::new();
        for (place, tokens) in self.output_places(transition) {
            let cond = self.unfolding.add_condition(place, tokens, Some(event));
            for &other in &common {
                self.unfolding.conditions[other].co_private.push(cond);
            }
            for &sibling in &siblings {
                self.unfolding.link_concurrent(cond, sibling);
            }
            siblings.push(cond);
            self.engine
                .on_new_condition(self.net, &mut self.unfolding, cond);
        }
        event
    }

    pub fn run(mut self) -> UnfoldResult {
        self.seed_initial_marking();
        let stop = loop {
            if let Some(budget) = self.settings.max_events {
                if self.unfolding.events_len() >= budget {
                    break StopReason::EventBudget;
                }
            }
            let Some(event) = self.step() else {
                break StopReason::QueueExhausted;
            };
            if Some(self.unfolding.event(event).transition) == self.settings.stop_transition {
                break StopReason::TargetFired(event);
            }
        };

        let stats = UnfoldStats {
            conditions: self.unfolding.conditions_len(),
            events: self.unfolding.events_len(),
            engine: self.engine.stats(),
            stop,
        };
        log::info!(
            "unfolding done: {} conditions, {} events, {:?}",
            stats.conditions,
            stats.events,
            stats.stop
        );
        UnfoldResult {
            unfolding: self.unfolding,
            stats,
        }
    }

    /// Conditions concurrent with every input: the intersection of their co-sets.
    fn inherited_co(&self, preset: &[ConditionId]) -> Vec<ConditionId> {
        let Some((&first, rest)) = preset.split_first() else {
            return Vec::new();
        };
        let mut common: IndexSet<ConditionId> = self.unfolding.co_conditions(first).collect();
        for &input in rest {
            let co: IndexSet<ConditionId> = self.unfolding.co_conditions(input).collect();
            common.retain(|c| co.contains(c));
        }
        common.into_iter().collect()
    }

    /// Output places with their token count: full conditions for the postset,
    /// empty ones for reset places the transition does not refill.
    fn output_places(&self, transition: TransitionId) -> Vec<(PlaceId, u32)> {
        let t = self.net.transition(transition);
        t.postset
            .iter()
            .map(|&p| (p, 1))
            .chain(
                t.reset
                    .iter()
                    .filter(|p| !t.produces(**p))
                    .map(|&p| (p, 0)),
            )
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::net::{Place, Transition};

    /// Two independent producers, one consumer joining them.
    fn diamond() -> Net {
        let mut net = Net::empty();
        let s1 = net.add_place(Place::new("s1", 1)).unwrap();
        let s2 = net.add_place(Place::new("s2", 1)).unwrap();
        let m1 = net.add_place(Place::new("m1", 0)).unwrap();
        let m2 = net.add_place(Place::new("m2", 0)).unwrap();
        let done = net.add_place(Place::new("done", 0)).unwrap();
        let a = net.add_transition(Transition::new("a")).unwrap();
        let b = net.add_transition(Transition::new("b")).unwrap();
        let j = net.add_transition(Transition::new("join")).unwrap();
        net.add_input_arc(s1, a);
        net.add_output_arc(m1, a);
        net.add_input_arc(s2, b);
        net.add_output_arc(m2, b);
        net.add_input_arc(m1, j);
        net.add_input_arc(m2, j);
        net.add_output_arc(done, j);
        net
    }

    #[test]
    fn diamond_unfolds_each_transition_once() {
        let net = diamond();
        let result = Unfolder::new(&net, UnfoldSettings::default()).run();
        assert_eq!(result.stats.stop, StopReason::QueueExhausted);
        assert_eq!(result.stats.events, 3);
        assert_eq!(result.stats.conditions, 5);

        let join = net.transition_by_name("join").unwrap();
        let last = result
            .unfolding
            .events
            .iter()
            .position(|e| e.transition == join)
            .unwrap();
        assert_eq!(last, 2);
    }

    #[test]
    fn outputs_inherit_concurrency_of_inputs() {
        let net = diamond();
        let mut unfolder = Unfolder::new(&net, UnfoldSettings::default());
        unfolder.seed_initial_marking();
        let first = unfolder.step().unwrap();

        let unf = unfolder.unfolding();
        let out = unf.event(first).postset[0];
        // the other initial condition is concurrent with the new output
        let other_initial: Vec<_> = unf
            .initial_conditions()
            .filter(|c| !unf.event(first).preset.contains(c))
            .collect();
        assert_eq!(unf.co_common(out), other_initial.as_slice());
        assert!(unf.co_private(other_initial[0]).contains(&out));
    }

    #[test]
    fn event_budget_stops_early() {
        let net = diamond();
        let settings = UnfoldSettings {
            max_events: Some(1),
            ..UnfoldSettings::default()
        };
        let result = Unfolder::new(&net, settings).run();
        assert_eq!(result.stats.stop, StopReason::EventBudget);
        assert_eq!(result.stats.events, 1);
    }

    #[test]
    fn reset_leaves_an_empty_condition() {
        let mut net = Net::empty();
        let s = net.add_place(Place::new("s", 1)).unwrap();
        let a = net.add_place(Place::new("a", 1)).unwrap();
        let r = net.add_transition(Transition::new("r")).unwrap();
        net.add_input_arc(s, r);
        net.add_reset_arc(a, r);

        let result = Unfolder::new(&net, UnfoldSettings::default()).run();
        assert_eq!(result.stats.events, 1);
        let event = result.unfolding.event(EventId::new(0));
        assert_eq!(event.preset.len(), 2);
        let emptied = result.unfolding.condition(event.postset[0]);
        assert_eq!(emptied.place, a);
        assert!(emptied.is_empty());
    }
}
