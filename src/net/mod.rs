//! # Place/transition nets with inhibitor arcs
//!
//! A net has places `P`, transitions `T` and arcs of two kinds. Normal arcs
//! run place -> transition (inputs) or transition -> place (outputs);
//! inhibitor arcs always run place -> transition. A transition `t` is enabled
//! under a marking `M` when
//!
//! * `M[p] > 0` for every normal input `p` of `t`, and
//! * `M[p] = 0` for every inhibitor input `p` of `t`.
//!
//! This module holds the typed, validated [`NetModel`] the code generator
//! consumes, plus the reader that builds it from a description file.
//!
//! ## Example
//!
//! ```rust
//! use petri_codegen::net::*;
//!
//! let model = NetModel::builder("demo")
//!     .place("A", 1)
//!     .place("B", 0)
//!     .transition("T")
//!     .arc("A", "T")
//!     .arc("B", "T")
//!     .arc("T", "B")
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(model.places_len(), 2);
//! assert_eq!(model.arcs().len(), 3);
//! ```

pub mod diagnostics;
pub mod ids;
pub mod index_vec;
pub mod io;
pub mod model;

pub use diagnostics::{DiagnosticReport, diagnose_connectivity, log_diagnostics};
pub use ids::{NodeKind, PlaceId, TransitionId};
pub use index_vec::{Idx, IndexVec};
pub use model::{
    Arc, ArcDefect, ArcDescription, ArcDirection, ArcKind, ModelError, NetDescription, NetModel,
    NetModelBuilder, Place, PlaceDescription, Tokens, Transition, TransitionDescription,
};
