//! Core deterministic primitives.
//!
//! Everything the rules engine does with randomness goes through the
//! seeded PRNG in this module, so a match is fully reproducible from its
//! seed.

pub mod rng;

pub use rng::{DeterministicRng, derive_match_seed};
