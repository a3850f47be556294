//! Deterministic Random Number Generator
//!
//! Xorshift128+ seeded through SplitMix64. Given the same seed, a match
//! produces the same shuffles and the same NPC picks on every platform,
//! which is what makes recorded matches replayable.

use serde::{Serialize, Deserialize};
use sha2::{Sha256, Digest};

/// Deterministic PRNG using the Xorshift128+ algorithm.
///
/// # Example
///
/// ```
/// use tavern_duel::core::rng::DeterministicRng;
///
/// let mut rng = DeterministicRng::new(12345);
/// let value = rng.next_u64();
/// assert_eq!(value, 6233086606872742541); // Always the same!
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

        // State must never be all zeros
        let state = if state0 == 0 && state1 == 0 {
            [1, 1]
        } else {
            [state0, state1]
        };

        Self { state }
    }

    /// Create an RNG seeded from match parameters.
    ///
    /// See [`derive_match_seed`].
    pub fn from_match_params(match_id: &[u8; 16], catalog_digest: &[u8; 32]) -> Self {
        Self::new(derive_match_seed(match_id, catalog_digest))
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

    /// Generate a random integer in range [0, max).
    ///
    /// Uses rejection sampling, so every value in the range is exactly
    /// equally likely.
    #[inline]
    pub fn next_int(&mut self, max: u32) -> u32 {
        if max == 0 {
            return 0;
        }
        let max = max as u64;
        // Largest multiple of max representable in u64; values at or
        // above it would skew the modulo
        let zone = u64::MAX - u64::MAX % max;
        loop {
            let value = self.next_u64();
            if value < zone {
                return (value % max) as u32;
            }
        }
    }

    /// Shuffle a slice in place using Fisher-Yates.
    ///
    /// Scans from the last index down to 1, swapping each position with a
    /// uniformly chosen earlier-or-equal index. Every permutation of the
    /// slice is equally likely.
    pub fn shuffle<T>(&mut self, slice: &mut [T]) {
        let len = slice.len();
        for i in (1..len).rev() {
            let j = self.next_int((i + 1) as u32) as usize;
            slice.swap(i, j);
        }
    }

    /// Select a random element from a slice.
    pub fn choose<'a, T>(&mut self, slice: &'a [T]) -> Option<&'a T> {
        if slice.is_empty() {
            None
        } else {
            let idx = self.next_int(slice.len() as u32) as usize;
            Some(&slice[idx])
        }
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

/// Derive a match seed from the match id and the card catalog digest.
///
/// Binding the seed to the catalog means two matches over different card
/// sets never share a shuffle sequence, and a replayed match with the
/// same id and catalog always does.
pub fn derive_match_seed(match_id: &[u8; 16], catalog_digest: &[u8; 32]) -> u64 {
    let mut hasher = Sha256::new();

    // Domain separator
    hasher.update(b"TAVERN_DUEL_SEED_V1");
    hasher.update(match_id);
    hasher.update(catalog_digest);

    let hash = hasher.finalize();

    // Take first 8 bytes as seed
    u64::from_le_bytes(hash[0..8].try_into().unwrap())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rng_determinism() {
        // Same seed must produce same sequence
        let mut rng1 = DeterministicRng::new(12345);
        let mut rng2 = DeterministicRng::new(12345);

        for _ in 0..1000 {
            assert_eq!(rng1.next_u64(), rng2.next_u64());
        }
    }

    #[test]
    fn test_rng_different_seeds() {
        let mut rng1 = DeterministicRng::new(12345);
        let mut rng2 = DeterministicRng::new(54321);

        // Very unlikely to match
        assert_ne!(rng1.next_u64(), rng2.next_u64());
    }

    #[test]
    fn test_next_int() {
        let mut rng = DeterministicRng::new(1234);

        for _ in 0..1000 {
            let val = rng.next_int(100);
            assert!(val < 100);
        }

        // Edge case: max = 0
        assert_eq!(rng.next_int(0), 0);

        // Edge case: max = 1
        assert_eq!(rng.next_int(1), 0);
    }

    #[test]
    fn test_next_int_covers_range() {
        // 7 does not divide 2^64, the case where a plain modulo skews
        let mut rng = DeterministicRng::new(99);
        let mut seen = [0u32; 7];

        for _ in 0..1000 {
            seen[rng.next_int(7) as usize] += 1;
        }
        assert!(seen.iter().all(|&count| count > 0));
    }

    #[test]
    fn test_shuffle_determinism() {
        let mut rng1 = DeterministicRng::new(1111);
        let mut rng2 = DeterministicRng::new(1111);

        let mut arr1 = [1, 2, 3, 4, 5, 6, 7, 8, 9, 10];
        let mut arr2 = [1, 2, 3, 4, 5, 6, 7, 8, 9, 10];

        rng1.shuffle(&mut arr1);
        rng2.shuffle(&mut arr2);

        assert_eq!(arr1, arr2);
    }

    #[test]
    fn test_shuffle_preserves_multiset() {
        let mut rng = DeterministicRng::new(2222);
        let mut arr = [5, 1, 5, 3, 1, 9, 9, 9];
        rng.shuffle(&mut arr);

        let mut sorted = arr;
        sorted.sort();
        assert_eq!(sorted, [1, 1, 3, 5, 5, 9, 9, 9]);
    }

    #[test]
    fn test_choose_in_bounds() {
        let mut rng = DeterministicRng::new(3333);
        let items = [10, 20, 30];

        for _ in 0..100 {
            let picked = rng.choose(&items).unwrap();
            assert!(items.contains(picked));
        }

        let empty: [u32; 0] = [];
        assert!(rng.choose(&empty).is_none());
    }

    proptest::proptest! {
        #[test]
        fn prop_shuffle_preserves_multiset(mut values: Vec<u32>, seed: u64) {
            let mut expected = values.clone();
            expected.sort_unstable();

            let mut rng = DeterministicRng::new(seed);
            rng.shuffle(&mut values);
            values.sort_unstable();

            proptest::prop_assert_eq!(values, expected);
        }

        #[test]
        fn prop_next_int_in_range(seed: u64, max in 1u32..10_000) {
            let mut rng = DeterministicRng::new(seed);
            for _ in 0..100 {
                proptest::prop_assert!(rng.next_int(max) < max);
            }
        }
    }

    #[test]
    fn test_derive_match_seed() {
        let match_id = [1u8; 16];
        let digest = [7u8; 32];

        let seed1 = derive_match_seed(&match_id, &digest);
        let seed2 = derive_match_seed(&match_id, &digest);

        // Same inputs = same seed
        assert_eq!(seed1, seed2);

        // Different catalog = different seed
        let other_digest = [8u8; 32];
        let seed3 = derive_match_seed(&match_id, &other_digest);
        assert_ne!(seed1, seed3);
    }
}
