//! 展开的竞技场：条件（库所上的令牌出现）与事件（迁移的发生）。
use crate::net::ids::{PlaceId, TransitionId, define_id};
use crate::net::index_vec::IndexVec;
use crate::net::structure::NodeList;
use crate::net::Net;

define_id!(ConditionId, "c");
define_id!(EventId, "e");

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Condition {
    pub place: PlaceId,
    /// 1 for a real token; 0 for an empty condition left behind by a reset.
    pub tokens: u32,
    /// `None` for conditions of the initial marking.
    pub producer: Option<EventId>,
    /// Siblings and conditions created later that are concurrent with this one.
    pub co_private: Vec<ConditionId>,
    pub consumers: Vec<EventId>,
}

impl Condition {
    pub fn is_initial(&self) -> bool {
        self.producer.is_none()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens == 0
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    pub transition: TransitionId,
    /// Inputs, one per distinct place of `preset ∪ reset`.
    pub preset: NodeList<ConditionId>,
    pub postset: NodeList<ConditionId>,
    /// Co-set shared by every output: the conditions concurrent with all inputs.
    pub co_common: Vec<ConditionId>,
}

#[derive(Debug, Clone, Default)]
pub struct Unfolding {
    pub conditions: IndexVec<ConditionId, Condition>,
    pub events: IndexVec<EventId, Event>,
    place_conditions: IndexVec<PlaceId, Vec<ConditionId>>,
}

impl Unfolding {
    pub fn new(net: &Net) -> Self {
        Self {
            conditions: IndexVec::new(),
            events: IndexVec::new(),
            place_conditions: IndexVec::from(vec![Vec::new(); net.places_len()]),
        }
    }

    pub fn condition(&self, id: ConditionId) -> &Condition {
        &self.conditions[id]
    }

    pub fn event(&self, id: EventId) -> &Event {
        &self.events[id]
    }

    pub fn conditions_len(&self) -> usize {
        self.conditions.len()
    }

    pub fn events_len(&self) -> usize {
        self.events.len()
    }

    pub fn add_condition(
        &mut self,
        place: PlaceId,
        tokens: u32,
        producer: Option<EventId>,
    ) -> ConditionId {
        let id = self.conditions.push(Condition {
            place,
            tokens,
            producer,
            co_private: Vec::new(),
            consumers: Vec::new(),
        });
        if let Some(event) = producer {
            self.events[event].postset.push(id);
        }
        id
    }

    pub fn add_event(
        &mut self,
        transition: TransitionId,
        preset: NodeList<ConditionId>,
        co_common: Vec<ConditionId>,
    ) -> EventId {
        let id = self.events.next_index();
        for &input in &preset {
            self.conditions[input].consumers.push(id);
        }
        self.events.push(Event {
            transition,
            preset,
            postset: NodeList::new(),
            co_common,
        })
    }

    /// Records that `a` and `b` may appear together in one run.
    pub fn link_concurrent(&mut self, a: ConditionId, b: ConditionId) {
        debug_assert_ne!(a, b);
        self.conditions[a].co_private.push(b);
        self.conditions[b].co_private.push(a);
    }

    pub fn co_common(&self, id: ConditionId) -> &[ConditionId] {
        match self.conditions[id].producer {
            Some(event) => &self.events[event].co_common,
            None => &[],
        }
    }

    pub fn co_private(&self, id: ConditionId) -> &[ConditionId] {
        &self.conditions[id].co_private
    }

    /// Every condition known to be concurrent with `id`; both halves of the
    /// co-set are always consulted.
    pub fn co_conditions(&self, id: ConditionId) -> impl Iterator<Item = ConditionId> + '_ {
        self.co_common(id)
            .iter()
            .chain(self.co_private(id))
            .copied()
    }

    /// Makes `id` visible in its place's condition list.
    pub fn register(&mut self, id: ConditionId) {
        let place = self.conditions[id].place;
        debug_assert!(
            self.place_conditions.contains_index(place),
            "condition {id} lies on a place outside the net"
        );
        self.place_conditions[place].push(id);
    }

    pub fn conditions_at(&self, place: PlaceId) -> &[ConditionId] {
        &self.place_conditions[place]
    }

    pub fn initial_conditions(&self) -> impl Iterator<Item = ConditionId> + '_ {
        self.conditions
            .iter_enumerated()
            .filter(|(_, c)| c.is_initial())
            .map(|(id, _)| id)
    }
}
