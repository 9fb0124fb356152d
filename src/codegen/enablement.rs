//! Initial markings and per-transition countdowns.
//!
//! The countdown of `t` is the number of its preconditions that the initial
//! marking leaves unmet:
//!
//! ```text
//! countdown(t) = |{ p : (p, t) normal,    M0(p) = 0 }|
//!              + |{ p : (p, t) inhibitor, M0(p) > 0 }|
//! ```
//!
//! so `t` starts enabled exactly when its countdown is zero. The runtime only
//! ever moves a countdown by one when a place crosses between empty and
//! marked, which is why the compiler must get the starting value right.
use crate::codegen::error::{AssignmentDefect, CodegenError};
use crate::codegen::index::IndexTable;
use crate::codegen::topology::Topology;
use crate::net::{IndexVec, NetModel, NodeKind, PlaceId, Tokens, TransitionId};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InitialState {
    pub markings: IndexVec<PlaceId, Tokens>,
    pub countdowns: IndexVec<TransitionId, u64>,
}

impl InitialState {
    pub fn marking(&self, place: PlaceId) -> Tokens {
        self.markings[place]
    }

    pub fn countdown(&self, transition: TransitionId) -> u64 {
        self.countdowns[transition]
    }

    pub fn is_enabled(&self, transition: TransitionId) -> bool {
        self.countdowns[transition] == 0
    }

    pub fn enabled(&self) -> Vec<TransitionId> {
        self.countdowns
            .iter_enumerated()
            .filter(|&(_, countdown)| *countdown == 0)
            .map(|(t, _)| t)
            .collect()
    }
}

pub fn initialize(
    model: &NetModel,
    places: &IndexTable<PlaceId>,
    topology: &Topology,
) -> Result<InitialState, CodegenError> {
    let mut markings = IndexVec::new();
    for (_, name) in places.iter_enumerated() {
        let place = model
            .place(name)
            .ok_or_else(|| CodegenError::HashAssignment {
                kind: NodeKind::Place,
                defect: AssignmentDefect::Unassigned {
                    name: name.to_string(),
                },
            })?;
        markings.push(place.marking);
    }

    let mut countdowns = IndexVec::from_elem_n(0u64, topology.transitions.len());
    for (place, neighbors) in topology.places.iter_enumerated() {
        let blocking = if markings[place] == 0 {
            &neighbors.trans_out
        } else {
            &neighbors.trans_out_inh
        };
        for &transition in blocking {
            countdowns[transition] += 1;
        }
    }

    Ok(InitialState {
        markings,
        countdowns,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codegen::index::assign;
    use crate::codegen::oracle::{OracleKind, OracleSpec};
    use crate::codegen::topology::build_topology;

    fn run(model: &NetModel) -> (IndexTable<TransitionId>, InitialState) {
        let spec = OracleSpec::new(OracleKind::Hashed, 3);
        let places = assign(NodeKind::Place, &model.place_names(), &spec).unwrap();
        let transitions = assign(NodeKind::Transition, &model.transition_names(), &spec).unwrap();
        let topology = build_topology(model, &places, &transitions).unwrap();
        let state = initialize(model, &places, &topology).unwrap();
        (transitions, state)
    }

    #[test]
    fn counts_unmarked_normal_inputs() {
        let model = NetModel::builder("n")
            .place("P1", 1)
            .place("P2", 0)
            .transition("t")
            .arc("P1", "t")
            .arc("P2", "t")
            .build()
            .unwrap();
        let (transitions, state) = run(&model);
        let t = transitions.id("t").unwrap();
        assert_eq!(state.countdown(t), 1);
        assert!(!state.is_enabled(t));
    }

    #[test]
    fn counts_marked_inhibitors() {
        for (marking, expected) in [(1, 1), (0, 0)] {
            let model = NetModel::builder("n")
                .place("P3", marking)
                .transition("t2")
                .inhibitor_arc("P3", "t2")
                .build()
                .unwrap();
            let (transitions, state) = run(&model);
            let t2 = transitions.id("t2").unwrap();
            assert_eq!(state.countdown(t2), expected, "marking {marking}");
        }
    }

    #[test]
    fn mixed_inputs_and_enabled_set() {
        let model = NetModel::builder("n")
            .place("full", 2)
            .place("empty", 0)
            .place("guard", 5)
            .transition("blocked")
            .transition("ready")
            .transition("free")
            .arc("empty", "blocked")
            .inhibitor_arc("guard", "blocked")
            .arc("full", "ready")
            .inhibitor_arc("empty", "ready")
            .build()
            .unwrap();
        let (transitions, state) = run(&model);

        let blocked = transitions.id("blocked").unwrap();
        let ready = transitions.id("ready").unwrap();
        let free = transitions.id("free").unwrap();
        assert_eq!(state.countdown(blocked), 2);
        assert_eq!(state.countdown(ready), 0);
        assert_eq!(state.countdown(free), 0);

        let mut enabled = state.enabled();
        enabled.sort();
        let mut expected = vec![ready, free];
        expected.sort();
        assert_eq!(enabled, expected);
    }

    #[test]
    fn markings_are_carried_forward() {
        let model = NetModel::builder("n")
            .place("a", 7)
            .place("b", 0)
            .build()
            .unwrap();
        let spec = OracleSpec::new(OracleKind::Sorted, 0);
        let places = assign(NodeKind::Place, &model.place_names(), &spec).unwrap();
        let transitions: IndexTable<TransitionId> =
            assign(NodeKind::Transition, &[], &spec).unwrap();
        let topology = build_topology(&model, &places, &transitions).unwrap();
        let state = initialize(&model, &places, &topology).unwrap();
        assert_eq!(state.markings.as_slice(), &[7, 0]);
        assert!(state.countdowns.is_empty());
    }
}
