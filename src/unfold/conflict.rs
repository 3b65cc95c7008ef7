//! 冲突检测：沿因果历史向后遍历，若两条路径汇合于同一条件则判定冲突。
//!
//! Both walks here use an explicit work stack instead of recursion, so
//! long causal chains never grow the call stack.
use crate::net::ids::TransitionId;
use crate::unfold::epoch::EpochMarks;
use crate::unfold::model::{ConditionId, EventId, Unfolding};

/// Decides whether a set of conditions can be marked together in one run.
#[derive(Debug, Default)]
pub struct ConflictChecker {
    stack: Vec<EventId>,
}

impl ConflictChecker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if no single run contains all of `conditions`, i.e.
    /// their causal pasts branch apart at some condition or one of them lies
    /// in another's past.
    pub fn is_conflicting(
        &mut self,
        marks: &mut EpochMarks,
        unfolding: &Unfolding,
        conditions: &[ConditionId],
    ) -> bool {
        if conditions.len() <= 1 {
            return false;
        }

        marks.advance();
        self.stack.clear();

        for &cond in conditions {
            marks.mark_condition(cond);
            if let Some(event) = unfolding.condition(cond).producer {
                if marks.mark_event(event) {
                    self.stack.push(event);
                }
            }
        }

        while let Some(event) = self.stack.pop() {
            for &input in &unfolding.event(event).preset {
                if !marks.mark_condition(input) {
                    log::trace!("conflict: {:?} reached twice via {}", conditions, input);
                    self.stack.clear();
                    return true;
                }
                if let Some(producer) = unfolding.condition(input).producer {
                    if marks.mark_event(producer) {
                        self.stack.push(producer);
                    }
                }
            }
        }

        false
    }

    /// Local configuration of a would-be event with inputs `conditions`,
    /// returned as its sorted Parikh vector (one entry per event, the new
    /// event's own `transition` included). Its length is the event's size.
    pub fn local_configuration(
        &mut self,
        marks: &mut EpochMarks,
        unfolding: &Unfolding,
        transition: TransitionId,
        conditions: &[ConditionId],
    ) -> Vec<TransitionId> {
        marks.advance();
        self.stack.clear();

        let mut parikh = vec![transition];
        for &cond in conditions {
            if let Some(event) = unfolding.condition(cond).producer {
                if marks.mark_event(event) {
                    self.stack.push(event);
                }
            }
        }

        while let Some(event) = self.stack.pop() {
            let event = unfolding.event(event);
            parikh.push(event.transition);
            for &input in &event.preset {
                if let Some(producer) = unfolding.condition(input).producer {
                    if marks.mark_event(producer) {
                        self.stack.push(producer);
                    }
                }
            }
        }

        parikh.sort_unstable();
        parikh
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::net::structure::NodeList;
    use crate::net::{Net, Place, Transition};

    /// `p` feeds both `t1 -> q, q2` and `t2 -> r`; `s` is independent.
    struct Fork {
        unf: Unfolding,
        c_p: ConditionId,
        c_s: ConditionId,
        c_q: ConditionId,
        c_r: ConditionId,
        c_q2: ConditionId,
        t1: TransitionId,
    }

    fn fork() -> Fork {
        let mut net = Net::empty();
        let p = net.add_place(Place::new("p", 1)).unwrap();
        let q = net.add_place(Place::new("q", 0)).unwrap();
        let r = net.add_place(Place::new("r", 0)).unwrap();
        let s = net.add_place(Place::new("s", 1)).unwrap();
        let q2 = net.add_place(Place::new("q2", 0)).unwrap();
        let t1 = net.add_transition(Transition::new("t1")).unwrap();
        let t2 = net.add_transition(Transition::new("t2")).unwrap();
        net.add_input_arc(p, t1);
        net.add_output_arc(q, t1);
        net.add_output_arc(q2, t1);
        net.add_input_arc(p, t2);
        net.add_output_arc(r, t2);

        let mut unf = Unfolding::new(&net);
        let c_p = unf.add_condition(p, 1, None);
        let c_s = unf.add_condition(s, 1, None);
        let e1 = unf.add_event(t1, NodeList::from_slice(&[c_p]), vec![c_s]);
        let c_q = unf.add_condition(q, 1, Some(e1));
        let c_q2 = unf.add_condition(q2, 1, Some(e1));
        let e2 = unf.add_event(t2, NodeList::from_slice(&[c_p]), vec![c_s]);
        let c_r = unf.add_condition(r, 1, Some(e2));
        Fork {
            unf,
            c_p,
            c_s,
            c_q,
            c_r,
            c_q2,
            t1,
        }
    }

    #[test]
    fn single_condition_never_conflicts() {
        let f = fork();
        let mut marks = EpochMarks::new();
        let mut checker = ConflictChecker::new();
        assert!(!checker.is_conflicting(&mut marks, &f.unf, &[]));
        assert!(!checker.is_conflicting(&mut marks, &f.unf, &[f.c_q]));
    }

    #[test]
    fn branches_from_shared_condition_conflict() {
        let f = fork();
        let mut marks = EpochMarks::new();
        let mut checker = ConflictChecker::new();
        assert!(checker.is_conflicting(&mut marks, &f.unf, &[f.c_q, f.c_r]));
        assert!(checker.is_conflicting(&mut marks, &f.unf, &[f.c_r, f.c_q]));
    }

    #[test]
    fn disjoint_histories_and_siblings_are_concurrent() {
        let f = fork();
        let mut marks = EpochMarks::new();
        let mut checker = ConflictChecker::new();
        assert!(!checker.is_conflicting(&mut marks, &f.unf, &[f.c_q, f.c_s]));
        assert!(!checker.is_conflicting(&mut marks, &f.unf, &[f.c_s, f.c_r]));
        assert!(!checker.is_conflicting(&mut marks, &f.unf, &[f.c_q, f.c_q2]));
        assert!(!checker.is_conflicting(&mut marks, &f.unf, &[f.c_q2, f.c_s, f.c_q]));
    }

    #[test]
    fn causally_ordered_conditions_conflict() {
        let f = fork();
        let mut marks = EpochMarks::new();
        let mut checker = ConflictChecker::new();
        assert!(checker.is_conflicting(&mut marks, &f.unf, &[f.c_p, f.c_q]));
        assert!(checker.is_conflicting(&mut marks, &f.unf, &[f.c_q, f.c_p]));
    }

    #[test]
    fn verdict_does_not_depend_on_order() {
        let f = fork();
        let mut marks = EpochMarks::new();
        let mut checker = ConflictChecker::new();
        let all = [f.c_q, f.c_s, f.c_r, f.c_q2];
        let expected = checker.is_conflicting(&mut marks, &f.unf, &all);
        for rotation in 0..all.len() {
            let mut combo = all.to_vec();
            combo.rotate_left(rotation);
            assert_eq!(checker.is_conflicting(&mut marks, &f.unf, &combo), expected);
            combo.reverse();
            assert_eq!(checker.is_conflicting(&mut marks, &f.unf, &combo), expected);
        }
        assert!(expected);
    }

    #[test]
    fn local_configuration_counts_distinct_past_events() {
        let f = fork();
        let mut marks = EpochMarks::new();
        let mut checker = ConflictChecker::new();
        let parikh = checker.local_configuration(&mut marks, &f.unf, f.t1, &[f.c_q, f.c_q2]);
        assert_eq!(parikh, vec![f.t1, f.t1]);

        let initial = checker.local_configuration(&mut marks, &f.unf, f.t1, &[f.c_p, f.c_s]);
        assert_eq!(initial, vec![f.t1]);
    }
}
