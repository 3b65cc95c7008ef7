//! 安全 P/T 网（带复位弧）的静态结构元素：库所与迁移。
use smallvec::SmallVec;

use crate::net::ids::{PlaceId, TransitionId};

/// Small adjacency list; most places and transitions touch only a few arcs.
pub type NodeList<T> = SmallVec<[T; 4]>;

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Place {
    pub name: String,
    /// Initial marking, 0 or 1 for the safe nets handled here.
    pub tokens: u32,
    /// Transitions consuming from this place through a normal arc.
    pub postset: NodeList<TransitionId>,
    /// Transitions emptying this place through a reset arc.
    pub reset: NodeList<TransitionId>,
    /// Transitions producing into this place.
    pub preset: NodeList<TransitionId>,
}

impl Place {
    pub fn new(name: impl Into<String>, tokens: u32) -> Self {
        Self {
            name: name.into(),
            tokens,
            postset: NodeList::new(),
            reset: NodeList::new(),
            preset: NodeList::new(),
        }
    }

    pub fn is_marked(&self) -> bool {
        self.tokens > 0
    }

    /// Transitions reachable from this place through a normal or a reset arc,
    /// normal consumers first and without repetitions.
    pub fn consumers(&self) -> impl Iterator<Item = TransitionId> + '_ {
        self.postset.iter().copied().chain(
            self.reset
                .iter()
                .copied()
                .filter(|t| !self.postset.contains(t)),
        )
    }
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Transition {
    pub name: String,
    pub preset: NodeList<PlaceId>,
    pub reset: NodeList<PlaceId>,
    pub postset: NodeList<PlaceId>,
}

impl Transition {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            preset: NodeList::new(),
            reset: NodeList::new(),
            postset: NodeList::new(),
        }
    }

    /// Distinct places of `preset ∪ reset`, preset places first.
    pub fn prereset(&self) -> impl Iterator<Item = PlaceId> + '_ {
        self.preset.iter().copied().chain(
            self.reset
                .iter()
                .copied()
                .filter(|p| !self.preset.contains(p)),
        )
    }

    pub fn prereset_len(&self) -> usize {
        self.prereset().count()
    }

    pub fn consumes(&self, place: PlaceId) -> bool {
        self.preset.contains(&place)
    }

    pub fn resets(&self, place: PlaceId) -> bool {
        self.reset.contains(&place)
    }

    pub fn produces(&self, place: PlaceId) -> bool {
        self.postset.contains(&place)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prereset_skips_places_already_in_preset() {
        let mut t = Transition::new("t");
        t.preset.push(PlaceId::new(0));
        t.preset.push(PlaceId::new(2));
        t.reset.push(PlaceId::new(2));
        t.reset.push(PlaceId::new(5));
        assert_eq!(
            t.prereset().collect::<Vec<_>>(),
            vec![PlaceId::new(0), PlaceId::new(2), PlaceId::new(5)]
        );
        assert_eq!(t.prereset_len(), 3);
    }

    #[test]
    fn consumers_lists_postset_then_reset() {
        let mut p = Place::new("p", 1);
        p.postset.push(TransitionId::new(1));
        p.reset.push(TransitionId::new(1));
        p.reset.push(TransitionId::new(3));
        assert_eq!(
            p.consumers().collect::<Vec<_>>(),
            vec![TransitionId::new(1), TransitionId::new(3)]
        );
        assert!(p.is_marked());
    }
}
