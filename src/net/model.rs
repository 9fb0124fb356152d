//! Canonical, immutable net model: places, transitions and arcs, validated
//! once when built from a [`NetDescription`].
use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub type Tokens = u64;

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum ArcKind {
    #[default]
    Normal,
    Inhibitor,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ArcDirection {
    PlaceToTransition,
    TransitionToPlace,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Place {
    pub name: String,
    pub marking: Tokens,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Transition {
    pub name: String,
}

/// An arc with its endpoints resolved to one place and one transition.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Arc {
    pub place: String,
    pub transition: String,
    pub direction: ArcDirection,
    pub kind: ArcKind,
}

impl Arc {
    /// Normal place -> transition arc.
    pub fn is_normal_input(&self) -> bool {
        self.direction == ArcDirection::PlaceToTransition && self.kind == ArcKind::Normal
    }

    pub fn is_inhibitor(&self) -> bool {
        self.kind == ArcKind::Inhibitor
    }

    pub fn is_output(&self) -> bool {
        self.direction == ArcDirection::TransitionToPlace
    }
}

/// Raw, unvalidated form of a net as produced by a parser.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetDescription {
    pub name: String,
    #[serde(default)]
    pub places: Vec<PlaceDescription>,
    #[serde(default)]
    pub transitions: Vec<TransitionDescription>,
    #[serde(default)]
    pub arcs: Vec<ArcDescription>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaceDescription {
    pub name: String,
    #[serde(default)]
    pub marking: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionDescription {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArcDescription {
    pub source: String,
    pub target: String,
    #[serde(default)]
    pub kind: ArcKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArcDefect {
    UnknownSource,
    UnknownTarget,
    PlaceToPlace,
    TransitionToTransition,
    InhibitorFromTransition,
}

impl fmt::Display for ArcDefect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            ArcDefect::UnknownSource => "source names no place or transition",
            ArcDefect::UnknownTarget => "target names no place or transition",
            ArcDefect::PlaceToPlace => "arc connects two places",
            ArcDefect::TransitionToTransition => "arc connects two transitions",
            ArcDefect::InhibitorFromTransition => "inhibitor arc must lead from a place",
        };
        f.write_str(text)
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ModelError {
    #[error("duplicate place name `{0}`")]
    DuplicatePlace(String),
    #[error("duplicate transition name `{0}`")]
    DuplicateTransition(String),
    #[error("place `{place}` declares a negative initial marking ({marking})")]
    InvalidMarking { place: String, marking: i64 },
    #[error("malformed arc `{from}` -> `{to}`: {defect}")]
    MalformedArc {
        from: String,
        to: String,
        defect: ArcDefect,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetModel {
    name: String,
    places: IndexMap<String, Place>,
    transitions: IndexMap<String, Transition>,
    arcs: Vec<Arc>,
}

impl NetModel {
    pub fn builder(name: impl Into<String>) -> NetModelBuilder {
        NetModelBuilder::new(name)
    }

    /// Validates `description` and builds the canonical model. Places and
    /// transitions are kept sorted by name, arcs sorted and de-duplicated, so
    /// declaration order never leaks into derived tables.
    pub fn from_description(description: &NetDescription) -> Result<Self, ModelError> {
        let mut places = IndexMap::with_capacity(description.places.len());
        for place in &description.places {
            if place.marking < 0 {
                return Err(ModelError::InvalidMarking {
                    place: place.name.clone(),
                    marking: place.marking,
                });
            }
            let entry = Place {
                name: place.name.clone(),
                marking: place.marking as Tokens,
            };
            if places.insert(place.name.clone(), entry).is_some() {
                return Err(ModelError::DuplicatePlace(place.name.clone()));
            }
        }

        let mut transitions = IndexMap::with_capacity(description.transitions.len());
        for transition in &description.transitions {
            let entry = Transition {
                name: transition.name.clone(),
            };
            if transitions.insert(transition.name.clone(), entry).is_some() {
                return Err(ModelError::DuplicateTransition(transition.name.clone()));
            }
        }

        let mut arcs = Vec::with_capacity(description.arcs.len());
        for arc in &description.arcs {
            arcs.push(resolve_arc(arc, &places, &transitions)?);
        }

        places.sort_keys();
        transitions.sort_keys();
        arcs.sort();
        arcs.dedup();

        Ok(Self {
            name: description.name.clone(),
            places,
            transitions,
            arcs,
        })
    }

    /// Canonical description of this model, suitable for writing back out.
    pub fn to_description(&self) -> NetDescription {
        NetDescription {
            name: self.name.clone(),
            places: self
                .places
                .values()
                .map(|p| PlaceDescription {
                    name: p.name.clone(),
                    marking: p.marking as i64,
                })
                .collect(),
            transitions: self
                .transitions
                .values()
                .map(|t| TransitionDescription {
                    name: t.name.clone(),
                })
                .collect(),
            arcs: self
                .arcs
                .iter()
                .map(|arc| {
                    let (source, target) = match arc.direction {
                        ArcDirection::PlaceToTransition => (&arc.place, &arc.transition),
                        ArcDirection::TransitionToPlace => (&arc.transition, &arc.place),
                    };
                    ArcDescription {
                        source: source.clone(),
                        target: target.clone(),
                        kind: arc.kind,
                    }
                })
                .collect(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn places(&self) -> impl Iterator<Item = &Place> {
        self.places.values()
    }

    pub fn transitions(&self) -> impl Iterator<Item = &Transition> {
        self.transitions.values()
    }

    pub fn arcs(&self) -> &[Arc] {
        &self.arcs
    }

    pub fn place(&self, name: &str) -> Option<&Place> {
        self.places.get(name)
    }

    pub fn places_len(&self) -> usize {
        self.places.len()
    }

    pub fn transitions_len(&self) -> usize {
        self.transitions.len()
    }

    pub fn place_names(&self) -> Vec<&str> {
        self.places.keys().map(String::as_str).collect()
    }

    pub fn transition_names(&self) -> Vec<&str> {
        self.transitions.keys().map(String::as_str).collect()
    }
}

/// A source naming a place takes precedence, so when the two namespaces
/// overlap `x -> y` is read as place `x` feeding transition `y`.
fn resolve_arc(
    arc: &ArcDescription,
    places: &IndexMap<String, Place>,
    transitions: &IndexMap<String, Transition>,
) -> Result<Arc, ModelError> {
    let source_place = places.contains_key(&arc.source);
    let source_transition = transitions.contains_key(&arc.source);
    let target_place = places.contains_key(&arc.target);
    let target_transition = transitions.contains_key(&arc.target);

    let malformed = |defect| ModelError::MalformedArc {
        from: arc.source.clone(),
        to: arc.target.clone(),
        defect,
    };

    if source_place && target_transition {
        return Ok(Arc {
            place: arc.source.clone(),
            transition: arc.target.clone(),
            direction: ArcDirection::PlaceToTransition,
            kind: arc.kind,
        });
    }
    if source_transition && target_place {
        if arc.kind == ArcKind::Inhibitor {
            return Err(malformed(ArcDefect::InhibitorFromTransition));
        }
        return Ok(Arc {
            place: arc.target.clone(),
            transition: arc.source.clone(),
            direction: ArcDirection::TransitionToPlace,
            kind: arc.kind,
        });
    }

    let defect = if !source_place && !source_transition {
        ArcDefect::UnknownSource
    } else if !target_place && !target_transition {
        ArcDefect::UnknownTarget
    } else if source_place && target_place {
        ArcDefect::PlaceToPlace
    } else {
        ArcDefect::TransitionToTransition
    };
    Err(malformed(defect))
}

/// Incremental construction of a [`NetModel`]; validation happens in
/// [`NetModelBuilder::build`].
#[derive(Debug, Clone, Default)]
pub struct NetModelBuilder {
    description: NetDescription,
}

impl NetModelBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            description: NetDescription {
                name: name.into(),
                ..NetDescription::default()
            },
        }
    }

    pub fn place(mut self, name: impl Into<String>, marking: i64) -> Self {
        self.description.places.push(PlaceDescription {
            name: name.into(),
            marking,
        });
        self
    }

    pub fn transition(mut self, name: impl Into<String>) -> Self {
        self.description
            .transitions
            .push(TransitionDescription { name: name.into() });
        self
    }

    pub fn arc(self, source: impl Into<String>, target: impl Into<String>) -> Self {
        self.arc_of_kind(source, target, ArcKind::Normal)
    }

    pub fn inhibitor_arc(self, source: impl Into<String>, target: impl Into<String>) -> Self {
        self.arc_of_kind(source, target, ArcKind::Inhibitor)
    }

    pub fn arc_of_kind(
        mut self,
        source: impl Into<String>,
        target: impl Into<String>,
        kind: ArcKind,
    ) -> Self {
        self.description.arcs.push(ArcDescription {
            source: source.into(),
            target: target.into(),
            kind,
        });
        self
    }

    pub fn build(self) -> Result<NetModel, ModelError> {
        NetModel::from_description(&self.description)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_canonical_model() {
        let model = NetModel::builder("demo")
            .place("B", 0)
            .place("A", 1)
            .transition("T")
            .arc("B", "T")
            .arc("A", "T")
            .arc("T", "B")
            .arc("A", "T")
            .build()
            .unwrap();

        assert_eq!(model.place_names(), vec!["A", "B"]);
        assert_eq!(model.arcs().len(), 3);
        assert!(model.arcs()[0].is_normal_input());
        assert_eq!(model.arcs()[0].place, "A");
        assert_eq!(model.place("A").map(|p| p.marking), Some(1));
    }

    #[test]
    fn arc_predicates_partition_arcs() {
        let model = NetModel::builder("kinds")
            .place("p", 0)
            .place("g", 1)
            .transition("t")
            .arc("p", "t")
            .inhibitor_arc("g", "t")
            .arc("t", "p")
            .build()
            .unwrap();

        let kinds = model
            .arcs()
            .iter()
            .map(|a| (a.is_normal_input(), a.is_inhibitor(), a.is_output()))
            .collect::<Vec<_>>();
        assert_eq!(kinds.iter().filter(|k| k.0).count(), 1);
        assert_eq!(kinds.iter().filter(|k| k.1).count(), 1);
        assert_eq!(kinds.iter().filter(|k| k.2).count(), 1);
        assert!(kinds.iter().all(|&(n, i, o)| [n, i, o].iter().filter(|b| **b).count() == 1));
    }

    #[test]
    fn rejects_negative_marking() {
        let err = NetModel::builder("n").place("P", -2).build().unwrap_err();
        assert_eq!(err, ModelError::InvalidMarking {
            place: "P".into(),
            marking: -2,
        });
    }

    #[test]
    fn rejects_duplicate_names_within_a_class() {
        let err = NetModel::builder("n")
            .place("P", 0)
            .place("P", 1)
            .build()
            .unwrap_err();
        assert_eq!(err, ModelError::DuplicatePlace("P".into()));

        let err = NetModel::builder("n")
            .transition("T")
            .transition("T")
            .build()
            .unwrap_err();
        assert_eq!(err, ModelError::DuplicateTransition("T".into()));
    }

    #[test]
    fn place_and_transition_may_share_a_name() {
        let model = NetModel::builder("n")
            .place("X", 1)
            .transition("X")
            .arc("X", "X")
            .build()
            .unwrap();
        assert_eq!(model.arcs()[0].direction, ArcDirection::PlaceToTransition);
    }

    #[test]
    fn rejects_malformed_arcs() {
        let base = NetModel::builder("n")
            .place("P", 0)
            .place("Q", 0)
            .transition("T")
            .transition("U");

        let cases = [
            ("nope", "T", ArcKind::Normal, ArcDefect::UnknownSource),
            ("P", "nope", ArcKind::Normal, ArcDefect::UnknownTarget),
            ("P", "Q", ArcKind::Normal, ArcDefect::PlaceToPlace),
            ("T", "U", ArcKind::Normal, ArcDefect::TransitionToTransition),
            ("T", "P", ArcKind::Inhibitor, ArcDefect::InhibitorFromTransition),
        ];
        for (from, to, kind, defect) in cases {
            let err = base.clone().arc_of_kind(from, to, kind).build().unwrap_err();
            assert_eq!(err, ModelError::MalformedArc {
                from: from.into(),
                to: to.into(),
                defect,
            });
        }
    }

    #[test]
    fn description_round_trips_canonical_form() {
        let model = NetModel::builder("n")
            .place("P", 2)
            .transition("T")
            .inhibitor_arc("P", "T")
            .arc("T", "P")
            .build()
            .unwrap();
        let again = NetModel::from_description(&model.to_description()).unwrap();
        assert_eq!(model, again);
    }
}
