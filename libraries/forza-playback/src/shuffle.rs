//! Shuffle order generation
//!
//! A shuffled cycle is a permutation of catalog positions, so every track is
//! visited exactly once before any repeats.

use rand::seq::SliceRandom;
use rand::{thread_rng, Rng};

/// Fisher-Yates permutation of `0..len`
pub fn shuffled_indices(len: usize) -> Vec<usize> {
    shuffled_indices_with(len, &mut thread_rng())
}

/// Same as [`shuffled_indices`] with a caller-supplied RNG
pub fn shuffled_indices_with<R: Rng + ?Sized>(len: usize, rng: &mut R) -> Vec<usize> {
    let mut order: Vec<usize> = (0..len).collect();
    order.shuffle(rng);
    order
}

/// Identity order `0..len`
pub fn sequential_indices(len: usize) -> Vec<usize> {
    (0..len).collect()
}
