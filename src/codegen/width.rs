//! Narrowest unsigned reference type for a class of nodes.
//!
//! The emitted tables refer to nodes one-based and prefix every neighbor
//! array with its length, so the largest value ever stored for `n` nodes is
//! `n` itself. A width `w` is therefore usable exactly when `n < 2^w`.
use std::fmt;

use crate::codegen::error::CodegenError;
use crate::net::NodeKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RefWidth {
    U8,
    U16,
    U32,
    U64,
}

impl RefWidth {
    pub const ALL: [RefWidth; 4] = [RefWidth::U8, RefWidth::U16, RefWidth::U32, RefWidth::U64];

    pub const fn bits(self) -> u32 {
        match self {
            RefWidth::U8 => 8,
            RefWidth::U16 => 16,
            RefWidth::U32 => 32,
            RefWidth::U64 => 64,
        }
    }

    pub const fn c_type(self) -> &'static str {
        match self {
            RefWidth::U8 => "uint8_t",
            RefWidth::U16 => "uint16_t",
            RefWidth::U32 => "uint32_t",
            RefWidth::U64 => "uint64_t",
        }
    }

    pub fn holds(self, count: u128) -> bool {
        count < 1u128 << self.bits()
    }
}

impl fmt::Display for RefWidth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.c_type())
    }
}

pub fn select_width(kind: NodeKind, count: u128) -> Result<RefWidth, CodegenError> {
    RefWidth::ALL
        .into_iter()
        .find(|width| width.holds(count))
        .ok_or(CodegenError::ReferenceOverflow { kind, count })
}
