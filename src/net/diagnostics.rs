//! Connectivity diagnostics for a net model. Nothing here is fatal; the
//! report only points at nodes that are probably modelling mistakes.
use std::collections::HashSet;

use crate::net::model::NetModel;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiagnosticReport {
    /// Places without any arc.
    pub isolated_places: Vec<String>,
    /// Transitions without any arc.
    pub isolated_transitions: Vec<String>,
    /// Transitions with outputs but no input arc of either kind; they are
    /// enabled forever.
    pub unconditional_transitions: Vec<String>,
    /// Places that start empty and are never produced into.
    pub starved_places: Vec<String>,
    pub total_places: usize,
    pub total_transitions: usize,
}

impl DiagnosticReport {
    pub fn has_issues(&self) -> bool {
        !self.isolated_places.is_empty()
            || !self.isolated_transitions.is_empty()
            || !self.unconditional_transitions.is_empty()
            || !self.starved_places.is_empty()
    }
}

pub fn diagnose_connectivity(model: &NetModel) -> DiagnosticReport {
    let mut touched_places = HashSet::new();
    let mut produced_places = HashSet::new();
    let mut with_input = HashSet::new();
    let mut touched_transitions = HashSet::new();

    for arc in model.arcs() {
        touched_places.insert(arc.place.as_str());
        touched_transitions.insert(arc.transition.as_str());
        if arc.is_output() {
            produced_places.insert(arc.place.as_str());
        } else {
            with_input.insert(arc.transition.as_str());
        }
    }

    let mut report = DiagnosticReport {
        total_places: model.places_len(),
        total_transitions: model.transitions_len(),
        ..DiagnosticReport::default()
    };

    for place in model.places() {
        let name = place.name.as_str();
        if !touched_places.contains(name) {
            report.isolated_places.push(place.name.clone());
        } else if place.marking == 0 && !produced_places.contains(name) {
            report.starved_places.push(place.name.clone());
        }
    }

    for transition in model.transitions() {
        let name = transition.name.as_str();
        if !touched_transitions.contains(name) {
            report.isolated_transitions.push(transition.name.clone());
        } else if !with_input.contains(name) {
            report.unconditional_transitions.push(transition.name.clone());
        }
    }

    report
}

pub fn log_diagnostics(model: &NetModel) {
    let report = diagnose_connectivity(model);

    if !report.has_issues() {
        log::info!(
            "connectivity check passed for `{}` ({} places, {} transitions)",
            model.name(),
            report.total_places,
            report.total_transitions
        );
        return;
    }

    log::warn!(
        "connectivity report for `{}`: {} places, {} transitions",
        model.name(),
        report.total_places,
        report.total_transitions
    );
    for name in &report.isolated_places {
        log::warn!("  isolated place `{}`", name);
    }
    for name in &report.isolated_transitions {
        log::warn!("  isolated transition `{}`", name);
    }
    for name in &report.unconditional_transitions {
        log::warn!("  transition `{}` has no input arc and never blocks", name);
    }
    for name in &report.starved_places {
        log::warn!("  place `{}` starts empty and nothing produces into it", name);
    }
}
