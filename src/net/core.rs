//! 网模型：库所、迁移及其前集/后集/复位集邻接关系。
use std::fmt;

use indexmap::IndexMap;
use thiserror::Error;

use crate::net::ids::{PlaceId, TransitionId};
use crate::net::index_vec::IndexVec;
use crate::net::structure::{Place, Transition};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum NetError {
    #[error("duplicate place name `{0}`")]
    DuplicatePlace(String),
    #[error("duplicate transition name `{0}`")]
    DuplicateTransition(String),
    #[error("transition `{transition}` refers to unknown place `{place}`")]
    UnknownPlace { transition: String, place: String },
    #[error("place `{place}` starts with {tokens} tokens; only safe nets are supported")]
    NotSafe { place: String, tokens: u32 },
    #[error("net has no places")]
    Empty,
}

/// Connectivity findings that do not prevent unfolding but usually point at
/// a modelling mistake.
#[derive(Debug, Clone, Default)]
pub struct DiagnosticReport {
    pub isolated_places: Vec<(PlaceId, String)>,
    pub isolated_transitions: Vec<(TransitionId, String)>,
    pub warnings: Vec<String>,
    pub total_places: usize,
    pub total_transitions: usize,
}

impl DiagnosticReport {
    pub fn has_issues(&self) -> bool {
        !self.isolated_places.is_empty()
            || !self.isolated_transitions.is_empty()
            || !self.warnings.is_empty()
    }
}

#[derive(Clone, Default)]
pub struct Net {
    pub places: IndexVec<PlaceId, Place>,
    pub transitions: IndexVec<TransitionId, Transition>,
    place_names: IndexMap<String, PlaceId>,
    transition_names: IndexMap<String, TransitionId>,
}

impl fmt::Debug for Net {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Net")
            .field("places", &self.places)
            .field("transitions", &self.transitions)
            .finish()
    }
}

impl Net {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn add_place(&mut self, place: Place) -> Result<PlaceId, NetError> {
        if self.place_names.contains_key(&place.name) {
            return Err(NetError::DuplicatePlace(place.name));
        }
        if place.tokens > 1 {
            return Err(NetError::NotSafe {
                place: place.name,
                tokens: place.tokens,
            });
        }
        let name = place.name.clone();
        let id = self.places.push(place);
        self.place_names.insert(name, id);
        Ok(id)
    }

    pub fn add_transition(&mut self, transition: Transition) -> Result<TransitionId, NetError> {
        if self.transition_names.contains_key(&transition.name) {
            return Err(NetError::DuplicateTransition(transition.name));
        }
        let name = transition.name.clone();
        let id = self.transitions.push(transition);
        self.transition_names.insert(name, id);
        Ok(id)
    }

    /// 输入弧: place -> transition
    pub fn add_input_arc(&mut self, place: PlaceId, transition: TransitionId) {
        let t = &mut self.transitions[transition];
        if t.preset.contains(&place) {
            return;
        }
        t.preset.push(place);
        self.places[place].postset.push(transition);
    }

    /// 输出弧: transition -> place
    pub fn add_output_arc(&mut self, place: PlaceId, transition: TransitionId) {
        let t = &mut self.transitions[transition];
        if t.postset.contains(&place) {
            return;
        }
        t.postset.push(place);
        self.places[place].preset.push(transition);
    }

    /// 复位弧: firing `transition` empties `place`.
    pub fn add_reset_arc(&mut self, place: PlaceId, transition: TransitionId) {
        let t = &mut self.transitions[transition];
        if t.reset.contains(&place) {
            return;
        }
        t.reset.push(place);
        self.places[place].reset.push(transition);
    }

    pub fn place(&self, place: PlaceId) -> &Place {
        &self.places[place]
    }

    pub fn transition(&self, transition: TransitionId) -> &Transition {
        &self.transitions[transition]
    }

    pub fn place_by_name(&self, name: &str) -> Option<PlaceId> {
        self.place_names.get(name).copied()
    }

    pub fn transition_by_name(&self, name: &str) -> Option<TransitionId> {
        self.transition_names.get(name).copied()
    }

    pub fn places_len(&self) -> usize {
        self.places.len()
    }

    pub fn transitions_len(&self) -> usize {
        self.transitions.len()
    }

    pub fn prereset(&self, transition: TransitionId) -> Vec<PlaceId> {
        self.transitions[transition].prereset().collect()
    }

    /// Largest `|preset ∪ reset|` over all transitions.
    pub fn max_prereset(&self) -> usize {
        self.transitions
            .iter()
            .map(Transition::prereset_len)
            .max()
            .unwrap_or(0)
    }

    pub fn marked_places(&self) -> impl Iterator<Item = PlaceId> + '_ {
        self.places
            .iter_enumerated()
            .filter(|(_, place)| place.is_marked())
            .map(|(id, _)| id)
    }

    pub fn initial_marking_len(&self) -> usize {
        self.marked_places().count()
    }

    /// Place is the target of at least one reset arc.
    pub fn is_reset_place(&self, place: PlaceId) -> bool {
        !self.places[place].reset.is_empty()
    }

    pub fn diagnose(&self) -> DiagnosticReport {
        let mut report = DiagnosticReport {
            total_places: self.places_len(),
            total_transitions: self.transitions_len(),
            ..DiagnosticReport::default()
        };

        for (id, place) in self.places.iter_enumerated() {
            let touched =
                !place.preset.is_empty() || !place.postset.is_empty() || !place.reset.is_empty();
            if !touched {
                report.isolated_places.push((id, place.name.clone()));
            } else if place.preset.is_empty() && !place.is_marked() && place.reset.is_empty() {
                report.warnings.push(format!(
                    "place `{}` ({}) is unmarked and has no producers; it never holds a token",
                    place.name, id
                ));
            }
        }

        for (id, transition) in self.transitions.iter_enumerated() {
            if transition.preset.is_empty()
                && transition.reset.is_empty()
                && transition.postset.is_empty()
            {
                report.isolated_transitions.push((id, transition.name.clone()));
            } else if transition.preset.is_empty() && transition.reset.is_empty() {
                report.warnings.push(format!(
                    "transition `{}` ({}) has no input places and can never be unfolded",
                    transition.name, id
                ));
            }
        }

        report
    }

    pub fn log_diagnostics(&self) {
        let report = self.diagnose();
        if !report.has_issues() {
            log::info!(
                "net check passed: {} places, {} transitions",
                report.total_places,
                report.total_transitions
            );
            return;
        }

        for (id, name) in &report.isolated_places {
            log::warn!("isolated place [{}] {}", id, name);
        }
        for (id, name) in &report.isolated_transitions {
            log::warn!("isolated transition [{}] {}", id, name);
        }
        for warning in &report.warnings {
            log::warn!("{}", warning);
        }
    }
}
