//! Name -> index oracles.
//!
//! An [`IndexOracle`] maps each key of the set it was built for onto
//! `[0, n)`. Nothing here is trusted: [`crate::codegen::index`] checks that
//! the mapping really is a bijection before any table is derived from it.
use std::cmp::Reverse;
use std::fmt;
use std::hash::Hasher;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use siphasher::sip::SipHasher13;

use crate::codegen::error::CodegenError;
use crate::net::NodeKind;

pub trait IndexOracle {
    /// Index of `key`, or `None` when the oracle has no answer for it.
    fn lookup(&self, key: &str) -> Option<u64>;
}

/// Builds an oracle for one key set.
pub trait OracleFactory {
    fn build(&self, kind: NodeKind, keys: &[&str]) -> Result<Box<dyn IndexOracle>, CodegenError>;
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OracleKind {
    /// Seeded minimal perfect hash.
    #[default]
    Hashed,
    /// Position in the sorted key list.
    Sorted,
}

impl fmt::Display for OracleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OracleKind::Hashed => f.write_str("hashed"),
            OracleKind::Sorted => f.write_str("sorted"),
        }
    }
}

impl std::str::FromStr for OracleKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "hashed" => Ok(OracleKind::Hashed),
            "sorted" => Ok(OracleKind::Sorted),
            other => Err(format!("unknown oracle kind `{other}`")),
        }
    }
}

/// Oracle choice plus the seed that makes hashed builds reproducible.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OracleSpec {
    pub kind: OracleKind,
    pub seed: u64,
}

impl OracleSpec {
    pub fn new(kind: OracleKind, seed: u64) -> Self {
        Self { kind, seed }
    }
}

impl OracleFactory for OracleSpec {
    fn build(&self, kind: NodeKind, keys: &[&str]) -> Result<Box<dyn IndexOracle>, CodegenError> {
        match self.kind {
            OracleKind::Sorted => Ok(Box::new(SortedOracle::new(keys))),
            OracleKind::Hashed => Ok(Box::new(HashedOracle::build(kind, keys, self.seed)?)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SortedOracle {
    keys: Vec<String>,
}

impl SortedOracle {
    pub fn new(keys: &[&str]) -> Self {
        let mut keys = keys.iter().map(|k| k.to_string()).collect::<Vec<_>>();
        keys.sort();
        keys.dedup();
        Self { keys }
    }
}

impl IndexOracle for SortedOracle {
    fn lookup(&self, key: &str) -> Option<u64> {
        self.keys
            .binary_search_by(|probe| probe.as_str().cmp(key))
            .ok()
            .map(|pos| pos as u64)
    }
}

const BUCKET_LOAD: usize = 4;
/// Fresh hash keys tried before the buckets are made finer.
const ATTEMPTS_PER_LEVEL: usize = 16;
/// Each level doubles the bucket count, ending at about 8 buckets per key.
const LEVELS: usize = 6;
const MAX_STRIDES: u64 = 256;

/// Hash-and-displace minimal perfect hash.
///
/// Keys are spread over `ceil(n / 4)` buckets. Each bucket stores a
/// displacement `(d0, d1)` and a key with slot hash halves `(f1, f2)` lands
/// on `(f1 + d0 * f2 + d1) mod n`. Buckets are placed largest first; a
/// single-key bucket always finds a free slot with `d0 = 0`.
///
/// Few large buckets over a small `n` often admit no displacement at all,
/// so when a level runs out of hash keys the bucket count is doubled.
#[derive(Debug, Clone)]
pub struct HashedOracle {
    bucket_keys: (u64, u64),
    slot_keys: (u64, u64),
    displacements: Vec<(u64, u64)>,
    len: usize,
}

impl HashedOracle {
    pub fn build(kind: NodeKind, keys: &[&str], seed: u64) -> Result<Self, CodegenError> {
        let mut rng = StdRng::seed_from_u64(seed);
        let base_buckets = keys.len().div_ceil(BUCKET_LOAD).max(1);
        for attempt in 0..ATTEMPTS_PER_LEVEL * LEVELS {
            let bucket_count = base_buckets << (attempt / ATTEMPTS_PER_LEVEL);
            let bucket_keys = (rng.random(), rng.random());
            let slot_keys = (rng.random(), rng.random());
            if let Some(oracle) = Self::try_build(keys, bucket_count, bucket_keys, slot_keys) {
                log::debug!(
                    "perfect hash for {} {} names found on attempt {} with {} buckets",
                    keys.len(),
                    kind,
                    attempt + 1,
                    bucket_count
                );
                return Ok(oracle);
            }
        }
        Err(CodegenError::OracleConstruction {
            kind,
            count: keys.len(),
            attempts: ATTEMPTS_PER_LEVEL * LEVELS,
        })
    }

    fn try_build(
        keys: &[&str],
        bucket_count: usize,
        bucket_keys: (u64, u64),
        slot_keys: (u64, u64),
    ) -> Option<Self> {
        let len = keys.len();
        let mut buckets = vec![Vec::new(); bucket_count];
        for key in keys {
            let bucket = (sip(bucket_keys, key) % bucket_count as u64) as usize;
            buckets[bucket].push(split(sip(slot_keys, key)));
        }

        let mut order = (0..bucket_count).collect::<Vec<_>>();
        order.sort_by_key(|&b| (Reverse(buckets[b].len()), b));

        let m = len as u64;
        let mut taken = vec![false; len];
        let mut displacements = vec![(0, 0); bucket_count];
        let mut slots = Vec::with_capacity(BUCKET_LOAD);

        for bucket in order {
            let entries = &buckets[bucket];
            if entries.is_empty() {
                break;
            }
            let strides = m.min(MAX_STRIDES);
            let found = (0..strides)
                .flat_map(|d0| (0..m).map(move |d1| (d0, d1)))
                .find(|&(d0, d1)| {
                    slots.clear();
                    entries.iter().all(|&(f1, f2)| {
                        let slot = slot_of(f1, f2, d0, d1, m);
                        if taken[slot] || slots.contains(&slot) {
                            false
                        } else {
                            slots.push(slot);
                            true
                        }
                    })
                })?;
            for &slot in &slots {
                taken[slot] = true;
            }
            displacements[bucket] = found;
        }

        Some(Self {
            bucket_keys,
            slot_keys,
            displacements,
            len,
        })
    }
}

impl IndexOracle for HashedOracle {
    fn lookup(&self, key: &str) -> Option<u64> {
        if self.len == 0 {
            return None;
        }
        let bucket = (sip(self.bucket_keys, key) % self.displacements.len() as u64) as usize;
        let (d0, d1) = self.displacements[bucket];
        let (f1, f2) = split(sip(self.slot_keys, key));
        Some(slot_of(f1, f2, d0, d1, self.len as u64) as u64)
    }
}

fn sip(keys: (u64, u64), key: &str) -> u64 {
    let mut hasher = SipHasher13::new_with_keys(keys.0, keys.1);
    hasher.write(key.as_bytes());
    hasher.finish()
}

fn split(hash: u64) -> (u64, u64) {
    (hash >> 32, hash & 0xffff_ffff)
}

fn slot_of(f1: u64, f2: u64, d0: u64, d1: u64, m: u64) -> usize {
    ((f1 as u128 + d0 as u128 * f2 as u128 + d1 as u128) % m as u128) as usize
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("place_{i}")).collect()
    }

    fn assert_bijective(oracle: &dyn IndexOracle, keys: &[&str]) {
        let mut seen = vec![false; keys.len()];
        for key in keys {
            let idx = oracle.lookup(key).unwrap() as usize;
            assert!(idx < keys.len(), "{key} -> {idx}");
            assert!(!seen[idx], "{key} collides on {idx}");
            seen[idx] = true;
        }
    }

    #[test]
    fn sorted_oracle_uses_name_order() {
        let oracle = SortedOracle::new(&["c", "a", "b"]);
        assert_eq!(oracle.lookup("a"), Some(0));
        assert_eq!(oracle.lookup("c"), Some(2));
        assert_eq!(oracle.lookup("zz"), None);
    }

    #[test]
    fn hashed_oracle_is_minimal_and_perfect() {
        for n in [1, 2, 5, 64, 1000] {
            let owned = names(n);
            let keys = owned.iter().map(String::as_str).collect::<Vec<_>>();
            let oracle = HashedOracle::build(NodeKind::Place, &keys, 7).unwrap();
            assert_bijective(&oracle, &keys);
        }
    }

    #[test]
    fn default_seed_builds_every_small_key_set() {
        let seed = crate::config::PncConfig::default().seed;
        for n in 2..=16 {
            for set in 0..600 {
                let owned = (0..n).map(|i| format!("n{set}_p{i}")).collect::<Vec<_>>();
                let keys = owned.iter().map(String::as_str).collect::<Vec<_>>();
                let oracle = HashedOracle::build(NodeKind::Place, &keys, seed)
                    .unwrap_or_else(|err| panic!("set {set} of {n} keys: {err}"));
                assert_bijective(&oracle, &keys);
            }
        }
    }

    #[test]
    fn single_bucket_key_sets_get_finer_buckets() {
        // Four keys start in one bucket over four slots.
        for seed in 0..200 {
            let keys = ["idle", "busy", "done", "fail"];
            let oracle = HashedOracle::build(NodeKind::Transition, &keys, seed).unwrap();
            assert_bijective(&oracle, &keys);
        }
    }

    #[test]
    fn hashed_oracle_is_reproducible_for_a_seed() {
        let owned = names(200);
        let keys = owned.iter().map(String::as_str).collect::<Vec<_>>();
        let a = HashedOracle::build(NodeKind::Transition, &keys, 42).unwrap();
        let b = HashedOracle::build(NodeKind::Transition, &keys, 42).unwrap();
        for key in &keys {
            assert_eq!(a.lookup(key), b.lookup(key));
        }
    }

    #[test]
    fn empty_key_set_builds() {
        let oracle = OracleSpec::new(OracleKind::Hashed, 1)
            .build(NodeKind::Place, &[])
            .unwrap();
        assert_eq!(oracle.lookup("anything"), None);
    }

    #[test]
    fn oracle_kind_parses() {
        assert_eq!("sorted".parse::<OracleKind>(), Ok(OracleKind::Sorted));
        assert!("bdz".parse::<OracleKind>().is_err());
    }
}
