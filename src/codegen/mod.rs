//! Compilation of a [`NetModel`] into index-addressed runtime tables.
//!
//! The stages run strictly in order, each consuming only what the previous
//! ones produced:
//!
//! 1. [`width`]: reference widths for places and transitions;
//! 2. [`index`]: checked name <-> id bijections from an [`oracle`];
//! 3. [`topology`]: neighbor lists per node, partitioned by arc kind;
//! 4. [`enablement`]: initial markings and countdowns;
//! 5. [`emit`] / [`output`]: the `.h` / `.c` pair, written atomically.

pub mod emit;
pub mod enablement;
pub mod error;
pub mod ident;
pub mod index;
pub mod oracle;
pub mod output;
pub mod topology;
pub mod width;

pub use emit::{Artifacts, EmitOptions, render};
pub use enablement::InitialState;
pub use error::{AssignmentDefect, CodegenError};
pub use ident::canonical_identifier;
pub use index::IndexTable;
pub use oracle::{IndexOracle, OracleFactory, OracleKind, OracleSpec};
pub use output::{WrittenArtifacts, write_artifacts};
pub use topology::{PlaceTopology, Topology, TransitionTopology};
pub use width::RefWidth;

use crate::net::{NetModel, NodeKind, PlaceId, TransitionId};

/// Everything derived from one net, ready to be rendered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledNet {
    pub display_name: String,
    pub identifier: String,
    pub place_width: RefWidth,
    pub transition_width: RefWidth,
    pub places: IndexTable<PlaceId>,
    pub transitions: IndexTable<TransitionId>,
    pub topology: Topology,
    pub initial: InitialState,
}

pub struct Compiler<'a> {
    oracle: &'a dyn OracleFactory,
}

impl<'a> Compiler<'a> {
    pub fn new(oracle: &'a dyn OracleFactory) -> Self {
        Self { oracle }
    }

    pub fn compile(&self, model: &NetModel) -> Result<CompiledNet, CodegenError> {
        let identifier = canonical_identifier(model.name());
        log::debug!("compiling `{}` as `{}`", model.name(), identifier);

        let place_width = width::select_width(NodeKind::Place, model.places_len() as u128)?;
        let transition_width =
            width::select_width(NodeKind::Transition, model.transitions_len() as u128)?;

        let places = index::assign(NodeKind::Place, &model.place_names(), self.oracle)?;
        let transitions =
            index::assign(NodeKind::Transition, &model.transition_names(), self.oracle)?;

        let topology = topology::build_topology(model, &places, &transitions)?;
        let initial = enablement::initialize(model, &places, &topology)?;

        let (normal, inhibitor, output) = topology.arc_counts();
        log::info!(
            "`{}`: {} places ({}), {} transitions ({}), {} input / {} inhibitor / {} output arcs, {} initially enabled",
            identifier,
            places.len(),
            place_width,
            transitions.len(),
            transition_width,
            normal,
            inhibitor,
            output,
            initial.enabled().len()
        );

        Ok(CompiledNet {
            display_name: model.name().to_string(),
            identifier,
            place_width,
            transition_width,
            places,
            transitions,
            topology,
            initial,
        })
    }
}

/// Compiles and renders in one step; nothing touches the disk.
pub fn generate(
    model: &NetModel,
    oracle: &dyn OracleFactory,
    options: &EmitOptions,
) -> Result<Artifacts, CodegenError> {
    let compiled = Compiler::new(oracle).compile(model)?;
    render(&compiled, options)
}
