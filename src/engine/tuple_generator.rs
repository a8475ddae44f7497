//! Correlated-randomness supply for the non-free gates.
//!
//! The engine only consumes tuples; producing them securely is the offline
//! phase's job and lives outside this crate. [TupleGenerator] is the
//! contract, [SharedSeedTupleGenerator] a consciously insecure dealer that
//! derives every party's share from one shared seed. It exists so tests and
//! benchmarks can run the online phase without an offline protocol: anyone
//! holding the seed can reconstruct all shares, so never use it beyond that.

use anyhow::Result;
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;

use crate::channel_utils::{PartyId, PrgSeed};
use crate::engine::prg::Prg;

/// One boolean Beaver tuple share: globally `a ∧ b = c`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BooleanTuple {
    pub a: bool,
    pub b: bool,
    pub c: bool,
}

/// A composite tuple share of width `k`: globally `a ∧ b[i] = c[i]` for each i.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CompositeBooleanTuple {
    pub a: bool,
    pub b: Vec<bool>,
    pub c: Vec<bool>,
}

/// One arithmetic tuple share: globally `a · b = c (mod 2^64)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct IntegerTuple {
    pub a: u64,
    pub b: u64,
    pub c: u64,
}

/// Supplier of Beaver tuples. May block on offline-phase communication.
pub trait TupleGenerator {
    fn get_boolean_tuples(&mut self, n: usize) -> Result<Vec<BooleanTuple>>;

    fn get_integer_tuples(&mut self, n: usize) -> Result<Vec<IntegerTuple>>;

    /// Whether [Self::get_normal_and_composite_boolean_tuples] is available.
    /// When false the engine expands composite gates into scalar tuples.
    fn supports_composite_tuple_generation(&self) -> bool;

    /// Fetch `n_normal` scalar tuples plus, per width, the requested number
    /// of composite tuples, in a single correlated request.
    fn get_normal_and_composite_boolean_tuples(
        &mut self,
        n_normal: usize,
        widths: &BTreeMap<usize, usize>,
    ) -> Result<(Vec<BooleanTuple>, BTreeMap<usize, Vec<CompositeBooleanTuple>>)>;

    /// (sent, received) bytes of the offline phase.
    fn traffic_statistics(&self) -> (u64, u64);
}

fn derive_seed(master: PrgSeed, tag: &str) -> PrgSeed {
    let mut hasher = Sha256::new();
    hasher.update(master);
    hasher.update(tag.as_bytes());
    let digest = hasher.finalize();
    digest[..16].try_into().unwrap()
}

/// Insecure dealer: every party holds the same seed and deterministically
/// derives the same tuple plaintexts and everyone's shares, then keeps only
/// its own. Zero communication, zero security.
pub struct SharedSeedTupleGenerator {
    my_id: PartyId,
    num_parties: usize,
    supports_composite: bool,
    bool_stream: Prg,
    composite_stream: Prg,
    int_stream: Prg,
}

impl SharedSeedTupleGenerator {
    pub fn new(seed: PrgSeed, my_id: PartyId, num_parties: usize) -> Self {
        Self::with_composite_support(seed, my_id, num_parties, true)
    }

    pub fn with_composite_support(
        seed: PrgSeed,
        my_id: PartyId,
        num_parties: usize,
        supports_composite: bool,
    ) -> Self {
        Self {
            my_id,
            num_parties,
            supports_composite,
            bool_stream: Prg::from_seed(derive_seed(seed, "boolean tuples")),
            composite_stream: Prg::from_seed(derive_seed(seed, "composite tuples")),
            int_stream: Prg::from_seed(derive_seed(seed, "integer tuples")),
        }
    }

    fn next_boolean_tuple(&mut self) -> BooleanTuple {
        let plain = self.bool_stream.get_random_bits(2);
        let (a, b) = (plain[0], plain[1]);
        let c = a & b;

        // parties 1.. draw their shares; party 0 takes the remainder
        let mut rest = (false, false, false);
        let mut mine = (a, b, c);
        for peer in 1..self.num_parties {
            let bits = self.bool_stream.get_random_bits(3);
            let share = (bits[0], bits[1], bits[2]);
            rest = (rest.0 ^ share.0, rest.1 ^ share.1, rest.2 ^ share.2);
            if peer == self.my_id {
                mine = share;
            }
        }
        if self.my_id == 0 {
            mine = (a ^ rest.0, b ^ rest.1, c ^ rest.2);
        }
        BooleanTuple {
            a: mine.0,
            b: mine.1,
            c: mine.2,
        }
    }

    fn next_composite_tuple(&mut self, width: usize) -> CompositeBooleanTuple {
        let a = self.composite_stream.get_random_bits(1)[0];
        let b = self.composite_stream.get_random_bits(width);
        let c: Vec<bool> = b.iter().map(|&bi| a & bi).collect();

        let mut rest_a = false;
        let mut rest_b = vec![false; width];
        let mut rest_c = vec![false; width];
        let mut mine = CompositeBooleanTuple {
            a,
            b: b.clone(),
            c: c.clone(),
        };
        for peer in 1..self.num_parties {
            let share_a = self.composite_stream.get_random_bits(1)[0];
            let share_b = self.composite_stream.get_random_bits(width);
            let share_c = self.composite_stream.get_random_bits(width);
            rest_a ^= share_a;
            for i in 0..width {
                rest_b[i] ^= share_b[i];
                rest_c[i] ^= share_c[i];
            }
            if peer == self.my_id {
                mine = CompositeBooleanTuple {
                    a: share_a,
                    b: share_b,
                    c: share_c,
                };
            }
        }
        if self.my_id == 0 {
            mine = CompositeBooleanTuple {
                a: a ^ rest_a,
                b: (0..width).map(|i| b[i] ^ rest_b[i]).collect(),
                c: (0..width).map(|i| c[i] ^ rest_c[i]).collect(),
            };
        }
        mine
    }

    fn next_integer_tuple(&mut self) -> IntegerTuple {
        let plain = self.int_stream.get_random_u64(2);
        let (a, b) = (plain[0], plain[1]);
        let c = a.wrapping_mul(b);

        let mut rest = (0u64, 0u64, 0u64);
        let mut mine = (a, b, c);
        for peer in 1..self.num_parties {
            let words = self.int_stream.get_random_u64(3);
            let share = (words[0], words[1], words[2]);
            rest = (
                rest.0.wrapping_add(share.0),
                rest.1.wrapping_add(share.1),
                rest.2.wrapping_add(share.2),
            );
            if peer == self.my_id {
                mine = share;
            }
        }
        if self.my_id == 0 {
            mine = (
                a.wrapping_sub(rest.0),
                b.wrapping_sub(rest.1),
                c.wrapping_sub(rest.2),
            );
        }
        IntegerTuple {
            a: mine.0,
            b: mine.1,
            c: mine.2,
        }
    }
}

impl TupleGenerator for SharedSeedTupleGenerator {
    fn get_boolean_tuples(&mut self, n: usize) -> Result<Vec<BooleanTuple>> {
        Ok((0..n).map(|_| self.next_boolean_tuple()).collect())
    }

    fn get_integer_tuples(&mut self, n: usize) -> Result<Vec<IntegerTuple>> {
        Ok((0..n).map(|_| self.next_integer_tuple()).collect())
    }

    fn supports_composite_tuple_generation(&self) -> bool {
        self.supports_composite
    }

    fn get_normal_and_composite_boolean_tuples(
        &mut self,
        n_normal: usize,
        widths: &BTreeMap<usize, usize>,
    ) -> Result<(Vec<BooleanTuple>, BTreeMap<usize, Vec<CompositeBooleanTuple>>)> {
        let normals = self.get_boolean_tuples(n_normal)?;
        let mut composites = BTreeMap::new();
        for (&width, &count) in widths {
            composites.insert(
                width,
                (0..count)
                    .map(|_| self.next_composite_tuple(width))
                    .collect(),
            );
        }
        Ok((normals, composites))
    }

    fn traffic_statistics(&self) -> (u64, u64) {
        (0, 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn generators(nparties: usize) -> Vec<SharedSeedTupleGenerator> {
        let seed = [3u8; 16];
        (0..nparties)
            .map(|me| SharedSeedTupleGenerator::new(seed, me, nparties))
            .collect()
    }

    #[test]
    fn test_boolean_tuples_are_correlated() {
        let mut gens = generators(3);
        let per_party: Vec<Vec<BooleanTuple>> = gens
            .iter_mut()
            .map(|g| g.get_boolean_tuples(20).unwrap())
            .collect();

        for i in 0..20 {
            let a = per_party.iter().fold(false, |acc, t| acc ^ t[i].a);
            let b = per_party.iter().fold(false, |acc, t| acc ^ t[i].b);
            let c = per_party.iter().fold(false, |acc, t| acc ^ t[i].c);
            assert_eq!(a & b, c);
        }
    }

    #[test]
    fn test_composite_tuples_are_correlated() {
        let mut gens = generators(2);
        let widths = BTreeMap::from([(3, 4usize)]);
        let per_party: Vec<_> = gens
            .iter_mut()
            .map(|g| {
                g.get_normal_and_composite_boolean_tuples(2, &widths)
                    .unwrap()
            })
            .collect();

        for i in 0..4 {
            let t0 = &per_party[0].1[&3][i];
            let t1 = &per_party[1].1[&3][i];
            let a = t0.a ^ t1.a;
            for j in 0..3 {
                assert_eq!(a & (t0.b[j] ^ t1.b[j]), t0.c[j] ^ t1.c[j]);
            }
        }
    }

    #[test]
    fn test_integer_tuples_are_correlated() {
        let mut gens = generators(2);
        let per_party: Vec<Vec<IntegerTuple>> = gens
            .iter_mut()
            .map(|g| g.get_integer_tuples(10).unwrap())
            .collect();

        for i in 0..10 {
            let a = per_party[0][i].a.wrapping_add(per_party[1][i].a);
            let b = per_party[0][i].b.wrapping_add(per_party[1][i].b);
            let c = per_party[0][i].c.wrapping_add(per_party[1][i].c);
            assert_eq!(a.wrapping_mul(b), c);
        }
    }

    #[test]
    fn test_streams_are_domain_separated() {
        let mut gens = generators(2);
        // pulling integer tuples first must not shift the boolean stream
        let mut other = SharedSeedTupleGenerator::new([3u8; 16], 0, 2);
        other.get_integer_tuples(5).unwrap();
        assert_eq!(
            gens[0].get_boolean_tuples(5).unwrap(),
            other.get_boolean_tuples(5).unwrap()
        );
    }
}
