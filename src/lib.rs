//! `petri_codegen` turns a Petri net description into the static C tables
//! consumed by the perpetuum runtime.
//!
//! [`net`] loads and validates the model, [`codegen`] derives and renders
//! the tables. [`config`] and [`options`] back the `pnc` binary.

pub mod codegen;
pub mod config;
pub mod net;
pub mod options;
