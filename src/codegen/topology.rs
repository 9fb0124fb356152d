//! Per-node neighbor lists, in both directions, ordered by the canonical
//! index of the neighbor.
use smallvec::SmallVec;

use crate::codegen::error::{AssignmentDefect, CodegenError};
use crate::codegen::index::IndexTable;
use crate::net::{Idx, IndexVec, NetModel, NodeKind, PlaceId, TransitionId};

pub type TransitionRefs = SmallVec<[TransitionId; 4]>;
pub type PlaceRefs = SmallVec<[PlaceId; 4]>;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlaceTopology {
    /// Transitions fed by a normal arc from this place.
    pub trans_out: TransitionRefs,
    /// Transitions inhibited by this place.
    pub trans_out_inh: TransitionRefs,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransitionTopology {
    /// Normal input places.
    pub place_in: PlaceRefs,
    pub place_out: PlaceRefs,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Topology {
    pub places: IndexVec<PlaceId, PlaceTopology>,
    pub transitions: IndexVec<TransitionId, TransitionTopology>,
}

impl Topology {
    pub fn place(&self, id: PlaceId) -> &PlaceTopology {
        &self.places[id]
    }

    pub fn transition(&self, id: TransitionId) -> &TransitionTopology {
        &self.transitions[id]
    }

    /// `(normal inputs, inhibitor inputs, outputs)` after de-duplication.
    pub fn arc_counts(&self) -> (usize, usize, usize) {
        let normal = self.places.iter().map(|p| p.trans_out.len()).sum();
        let inhibitor = self.places.iter().map(|p| p.trans_out_inh.len()).sum();
        let output = self.transitions.iter().map(|t| t.place_out.len()).sum();
        (normal, inhibitor, output)
    }
}

pub fn build_topology(
    model: &NetModel,
    places: &IndexTable<PlaceId>,
    transitions: &IndexTable<TransitionId>,
) -> Result<Topology, CodegenError> {
    let mut topology = Topology {
        places: IndexVec::from_elem_n(PlaceTopology::default(), places.len()),
        transitions: IndexVec::from_elem_n(TransitionTopology::default(), transitions.len()),
    };

    for arc in model.arcs() {
        let place = lookup(places, NodeKind::Place, &arc.place)?;
        let transition = lookup(transitions, NodeKind::Transition, &arc.transition)?;
        // Inhibitor outputs are rejected when the model is built.
        if arc.is_output() {
            topology.transitions[transition].place_out.push(place);
        } else if arc.is_inhibitor() {
            topology.places[place].trans_out_inh.push(transition);
        } else {
            topology.places[place].trans_out.push(transition);
            topology.transitions[transition].place_in.push(place);
        }
    }

    for place in topology.places.iter_mut() {
        canonicalize(&mut place.trans_out);
        canonicalize(&mut place.trans_out_inh);
    }
    for transition in topology.transitions.iter_mut() {
        canonicalize(&mut transition.place_in);
        canonicalize(&mut transition.place_out);
    }

    Ok(topology)
}

fn lookup<I: Idx>(
    table: &IndexTable<I>,
    kind: NodeKind,
    name: &str,
) -> Result<I, CodegenError> {
    table.id(name).ok_or_else(|| CodegenError::HashAssignment {
        kind,
        defect: AssignmentDefect::Unassigned {
            name: name.to_string(),
        },
    })
}

fn canonicalize<T: Ord>(refs: &mut SmallVec<[T; 4]>) {
    refs.sort_unstable();
    refs.dedup();
}
