//! Dense, strongly typed identities for places and transitions.
use std::fmt;

use crate::net::index_vec::Idx;

macro_rules! define_id {
    ($name:ident) => {
        #[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        #[repr(transparent)]
        pub struct $name(pub usize);

        impl $name {
            pub const fn new(raw: usize) -> Self {
                Self(raw)
            }

            pub const fn raw(self) -> usize {
                self.0
            }

            /// Reference value used in the emitted tables, which count from one.
            pub const fn one_based(self) -> u128 {
                self.0 as u128 + 1
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, stringify!($name))?;
                f.debug_tuple("").field(&self.0).finish()
            }
        }

        impl Idx for $name {
            fn index(self) -> usize {
                self.0
            }

            fn from_usize(idx: usize) -> Self {
                Self(idx)
            }
        }
    };
}

define_id!(PlaceId);
define_id!(TransitionId);

/// The two node classes of a bipartite net. They are indexed independently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Place,
    Transition,
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeKind::Place => f.write_str("place"),
            NodeKind::Transition => f.write_str("transition"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_based_reference_is_offset_by_one() {
        assert_eq!(PlaceId::new(0).one_based(), 1);
        assert_eq!(TransitionId::new(254).one_based(), 255);
    }

    #[test]
    fn debug_names_the_class() {
        assert_eq!(format!("{:?}", PlaceId::new(3)), "PlaceId(3)");
        assert_eq!(NodeKind::Transition.to_string(), "transition");
    }
}
