//! Seeded Random Number Generator
//!
//! Uses the Xoroshiro128+ algorithm for fast, high-quality randomness.
//! Given the same seed, produces identical sequence on all platforms, which
//! keeps coin layouts and spawn points reproducible in tests.

use serde::{Serialize, Deserialize};
use sha2::{Sha256, Digest};

/// Seeded PRNG using the Xoroshiro128+ algorithm.
///
/// # Example
///
/// ```
/// use coin_grid::core::rng::DeterministicRng;
///
/// let mut a = DeterministicRng::new(12345);
/// let mut b = DeterministicRng::new(12345);
/// assert_eq!(a.next_u64(), b.next_u64());
/// ```
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DeterministicRng {
    state: [u64; 2],
}

impl Default for DeterministicRng {
    fn default() -> Self {
        Self::new(0)
    }
}

impl DeterministicRng {
    /// Create a new RNG from a 64-bit seed.
    ///
    /// Uses SplitMix64 to initialize the internal state, ensuring
    /// good distribution even from weak seeds.
    pub fn new(seed: u64) -> Self {
        let mut s = seed;
        let state0 = splitmix64(&mut s);
        let state1 = splitmix64(&mut s);

        // Ensure state is never all zeros
        let state = if state0 == 0 && state1 == 0 {
            [1, 1]
        } else {
            [state0, state1]
        };

        Self { state }
    }

    /// Create an RNG seeded from fresh OS entropy (a random UUID).
    pub fn from_entropy() -> Self {
        let entropy = uuid::Uuid::new_v4();
        Self::new(derive_seed(entropy.as_bytes()))
    }

    /// Generate the next 64-bit random value.
    #[inline]
    pub fn next_u64(&mut self) -> u64 {
        let s0 = self.state[0];
        let mut s1 = self.state[1];
        let result = s0.wrapping_add(s1);

        s1 ^= s0;
        self.state[0] = s0.rotate_left(24) ^ s1 ^ (s1 << 16);
        self.state[1] = s1.rotate_left(37);

        result
    }

    /// Generate a uniformly distributed integer in range [0, bound).
    ///
    /// Uses rejection sampling, so every value is equally likely for any
    /// bound. Returns 0 when `bound` is 0 or 1.
    pub fn next_below(&mut self, bound: u64) -> u64 {
        if bound <= 1 {
            return 0;
        }
        // 2^64 mod bound: draws below this would over-represent small values
        let threshold = bound.wrapping_neg() % bound;
        loop {
            let raw = self.next_u64();
            if raw >= threshold {
                return raw % bound;
            }
        }
    }

    /// Generate a uniformly distributed index in range [0, len).
    #[inline]
    pub fn next_index(&mut self, len: usize) -> usize {
        self.next_below(len as u64) as usize
    }

    /// Shuffle a slice in place using the Fisher-Yates algorithm.
    ///
    /// Walks from the last index down to 1, swapping each element with one
    /// drawn uniformly from `[0, i]`.
    pub fn shuffle<T>(&mut self, slice: &mut [T]) {
        let len = slice.len();
        for i in (1..len).rev() {
            let j = self.next_index(i + 1);
            slice.swap(i, j);
        }
    }

    /// Return the integers `0..n` in uniformly random order.
    pub fn permutation(&mut self, n: usize) -> Vec<usize> {
        let mut cells: Vec<usize> = (0..n).collect();
        self.shuffle(&mut cells);
        cells
    }

    /// Get current state (for checkpointing/debugging).
    pub fn state(&self) -> [u64; 2] {
        self.state
    }

    /// Restore from saved state.
    pub fn set_state(&mut self, state: [u64; 2]) {
        self.state = state;
    }
}

/// SplitMix64 for seed initialization.
/// Produces well-distributed values from sequential seeds.
#[inline]
fn splitmix64(state: &mut u64) -> u64 {
    *state = state.wrapping_add(0x9E3779B97F4A7C15);
    let mut z = *state;
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58476D1CE4E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D049BB133111EB);
    z ^ (z >> 31)
}

/// Derive a 64-bit seed from arbitrary entropy bytes.
///
/// The entropy is hashed with a domain separator so that seeds derived here
/// never collide with raw seeds chosen by an operator.
pub fn derive_seed(entropy: &[u8]) -> u64 {
    let mut hasher = Sha256::new();
    hasher.update(b"COIN_GRID_SEED_V1");
    hasher.update(entropy);
    let hash = hasher.finalize();

    let mut seed = [0u8; 8];
    seed.copy_from_slice(&hash[..8]);
    u64::from_le_bytes(seed)
}

// =============================================================================
// TESTS
// =============================================================================
