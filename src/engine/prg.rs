//! Deterministic pseudo-random generator keyed by a 128-bit seed.
//!
//! Two [Prg]s built from the same seed produce identical streams, which is
//! what makes the input-masking trick work: the input owner masks with its
//! out-PRG while the peer regenerates the very same mask from the exchanged
//! seed.

use rand::Rng;
use rand_chacha::ChaCha20Rng;
use rand_core::{RngCore, SeedableRng};

use crate::channel_utils::{unpack_bits, PrgSeed};

/// Stream generator over a ChaCha20 keystream.
pub struct Prg {
    rng: ChaCha20Rng,
}

impl Prg {
    /// Construct a generator from a 128-bit seed. This is the whole factory:
    /// the construction is stateless, so peers only need to agree on seeds.
    pub fn from_seed(seed: PrgSeed) -> Self {
        let mut expanded = [0u8; 32];
        expanded[..16].copy_from_slice(&seed);
        expanded[16..].copy_from_slice(&seed);
        Self {
            rng: ChaCha20Rng::from_seed(expanded),
        }
    }

    /// Next `n` bits of the stream.
    pub fn get_random_bits(&mut self, n: usize) -> Vec<bool> {
        let mut bytes = vec![0u8; n.div_ceil(8)];
        self.rng.fill_bytes(&mut bytes);
        unpack_bits(&bytes, n)
    }

    /// Next `n` 64-bit words of the stream.
    pub fn get_random_u64(&mut self, n: usize) -> Vec<u64> {
        (0..n).map(|_| self.rng.next_u64()).collect()
    }
}

/// Fresh random seed from the OS entropy pool.
pub fn random_seed() -> PrgSeed {
    rand::thread_rng().gen()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_seed_same_stream() {
        let seed = [7u8; 16];
        let mut a = Prg::from_seed(seed);
        let mut b = Prg::from_seed(seed);

        assert_eq!(a.get_random_bits(100), b.get_random_bits(100));
        assert_eq!(a.get_random_u64(10), b.get_random_u64(10));
        // interleaving order matters but stays aligned
        assert_eq!(a.get_random_bits(3), b.get_random_bits(3));
    }

    #[test]
    fn test_different_seeds_diverge() {
        let mut a = Prg::from_seed([1u8; 16]);
        let mut b = Prg::from_seed([2u8; 16]);
        assert_ne!(a.get_random_u64(8), b.get_random_u64(8));
    }

    #[test]
    fn test_bit_stream_is_not_constant() {
        let mut prg = Prg::from_seed(random_seed());
        let bits = prg.get_random_bits(256);
        let ones = bits.iter().filter(|&&b| b).count();
        assert!(ones > 0 && ones < 256);
    }
}
