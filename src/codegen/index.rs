//! Turns an [`IndexOracle`] into a checked bijection between names and dense
//! ids in `[0, n)`.
use std::collections::HashMap;

use crate::codegen::error::{AssignmentDefect, CodegenError};
use crate::codegen::oracle::{IndexOracle, OracleFactory};
use crate::net::{Idx, IndexVec, NodeKind};

/// Both directions of a name <-> id bijection for one node class.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexTable<I: Idx> {
    names: IndexVec<I, String>,
    ids: HashMap<String, I>,
}

impl<I: Idx> IndexTable<I> {
    pub fn id(&self, name: &str) -> Option<I> {
        self.ids.get(name).copied()
    }

    pub fn name(&self, id: I) -> &str {
        &self.names[id]
    }

    pub fn names(&self) -> &IndexVec<I, String> {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn iter_enumerated(&self) -> impl Iterator<Item = (I, &str)> {
        self.names
            .iter_enumerated()
            .map(|(id, name)| (id, name.as_str()))
    }
}

/// Builds an oracle for `names` with `factory` and checks the result.
pub fn assign<I: Idx>(
    kind: NodeKind,
    names: &[&str],
    factory: &dyn OracleFactory,
) -> Result<IndexTable<I>, CodegenError> {
    let oracle = factory.build(kind, names)?;
    assign_with_oracle(kind, names, oracle.as_ref())
}

/// Every slot of `[0, names.len())` must be hit exactly once.
pub fn assign_with_oracle<I: Idx>(
    kind: NodeKind,
    names: &[&str],
    oracle: &dyn IndexOracle,
) -> Result<IndexTable<I>, CodegenError> {
    let len = names.len();
    let fail = |defect| CodegenError::HashAssignment { kind, defect };

    let mut slots: Vec<Option<&str>> = vec![None; len];
    for &name in names {
        let index = oracle.lookup(name).ok_or_else(|| {
            fail(AssignmentDefect::Unassigned {
                name: name.to_string(),
            })
        })?;
        let slot = usize::try_from(index)
            .ok()
            .and_then(|slot| slots.get_mut(slot))
            .ok_or_else(|| {
                fail(AssignmentDefect::OutOfRange {
                    name: name.to_string(),
                    index,
                    len,
                })
            })?;
        if let Some(first) = slot {
            return Err(fail(AssignmentDefect::Collision {
                index,
                first: first.to_string(),
                second: name.to_string(),
            }));
        }
        *slot = Some(name);
    }

    let ordered = slots
        .into_iter()
        .enumerate()
        .map(|(index, slot)| {
            slot.map(str::to_string)
                .ok_or_else(|| fail(AssignmentDefect::EmptySlot { index }))
        })
        .collect::<Result<IndexVec<I, String>, _>>()?;

    let ids = ordered
        .iter_enumerated()
        .map(|(id, name)| (name.clone(), id))
        .collect();
    log::debug!("assigned {} {} indices", len, kind);
    Ok(IndexTable {
        names: ordered,
        ids,
    })
}
