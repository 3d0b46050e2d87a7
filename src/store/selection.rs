//! Reviewer candidate sampling.
//!
//! Uniform random permutation of the eligible candidates, truncated to the
//! requested limit. No weighting by workload or history.

use rand::seq::SliceRandom;
use rand::Rng;

/// Shuffle `candidates` with `rng` and keep at most `limit` of them.
pub fn sample_without_replacement<T, R>(mut candidates: Vec<T>, limit: usize, rng: &mut R) -> Vec<T>
where
    R: Rng + ?Sized,
{
    candidates.shuffle(rng);
    candidates.truncate(limit);
    candidates
}
