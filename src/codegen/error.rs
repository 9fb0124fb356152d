use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

use crate::net::NodeKind;

/// Why an index oracle failed to be a bijection onto `[0, n)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssignmentDefect {
    Unassigned { name: String },
    OutOfRange { name: String, index: u64, len: usize },
    Collision { index: u64, first: String, second: String },
    EmptySlot { index: usize },
}

impl fmt::Display for AssignmentDefect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssignmentDefect::Unassigned { name } => write!(f, "`{name}` has no index"),
            AssignmentDefect::OutOfRange { name, index, len } => {
                write!(f, "`{name}` maps to {index}, outside [0, {len})")
            }
            AssignmentDefect::Collision {
                index,
                first,
                second,
            } => write!(f, "`{first}` and `{second}` both map to {index}"),
            AssignmentDefect::EmptySlot { index } => write!(f, "slot {index} is never assigned"),
        }
    }
}

#[derive(Debug, Error)]
pub enum CodegenError {
    #[error("{kind} count {count} does not fit in a 64-bit reference")]
    ReferenceOverflow { kind: NodeKind, count: u128 },
    #[error("index oracle is not a bijection over the {kind} names: {defect}")]
    HashAssignment {
        kind: NodeKind,
        defect: AssignmentDefect,
    },
    #[error("no perfect hash found for {count} {kind} names after {attempts} attempts")]
    OracleConstruction {
        kind: NodeKind,
        count: usize,
        attempts: usize,
    },
    #[error("{kind}s `{first}` and `{second}` both become the C symbol `{symbol}`")]
    SymbolClash {
        kind: NodeKind,
        first: String,
        second: String,
        symbol: String,
    },
    #[error("failed to write `{}`: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl CodegenError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        CodegenError::Io {
            path: path.into(),
            source,
        }
    }
}
