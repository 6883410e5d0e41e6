// ============================================================
// Layer 4 — Sampling Without Replacement
// ============================================================
// Splits a directory listing into a random sample and the
// remaining pool. Each draw picks a uniform index into the
// *current* pool and removes that element, so:
//
//   sample ∪ pool_after == pool_before
//   sample ∩ pool_after == ∅
//
// The generator is passed in explicitly. A fixed seed gives
// the same split on every run with the same listing.

use anyhow::{ensure, Result};
use rand::{rngs::StdRng, Rng, SeedableRng};

/// Seed used by the packer unless overridden
pub const DEFAULT_SEED: u64 = 17134;

/// Build the packer's deterministic generator
pub fn seeded_rng(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}

/// Remove and return `count` elements drawn uniformly from `pool`.
///
/// Fails when `count` exceeds the pool size; the pool is left
/// untouched in that case.
pub fn sample_without_replacement<T, R: Rng + ?Sized>(
    pool:  &mut Vec<T>,
    count: usize,
    rng:   &mut R,
) -> Result<Vec<T>> {
    ensure!(
        count <= pool.len(),
        "Cannot sample {} entries from a pool of {}",
        count,
        pool.len()
    );

    let mut picked = Vec::with_capacity(count);
    for _ in 0..count {
        let index = rng.gen_range(0..pool.len());
        picked.push(pool.remove(index));
    }

    tracing::debug!("Sampled {} entries, {} remain", picked.len(), pool.len());
    Ok(picked)
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_sample_and_remainder_partition_the_pool() {
        let original: Vec<usize> = (0..50).collect();
        let mut pool = original.clone();
        let mut rng  = seeded_rng(DEFAULT_SEED);

        let picked = sample_without_replacement(&mut pool, 20, &mut rng).unwrap();

        assert_eq!(picked.len(), 20);
        assert_eq!(pool.len(), 30);

        let picked_set: HashSet<_> = picked.iter().copied().collect();
        assert_eq!(picked_set.len(), 20, "sample contains duplicates");
        assert!(pool.iter().all(|x| !picked_set.contains(x)));

        let mut union: Vec<usize> = picked.into_iter().chain(pool).collect();
        union.sort();
        assert_eq!(union, original);
    }

    #[test]
    fn test_same_seed_gives_same_sample() {
        let run = || {
            let mut pool: Vec<String> = (0..40).map(|i| format!("{i}.bmp")).collect();
            let mut rng = seeded_rng(7);
            let picked  = sample_without_replacement(&mut pool, 10, &mut rng).unwrap();
            (picked, pool)
        };
        assert_eq!(run(), run());
    }

    #[test]
    fn test_sampling_entire_pool_empties_it() {
        let mut pool: Vec<u8> = vec![1, 2, 3];
        let mut rng = seeded_rng(1);
        let mut picked = sample_without_replacement(&mut pool, 3, &mut rng).unwrap();
        picked.sort();
        assert_eq!(picked, vec![1, 2, 3]);
        assert!(pool.is_empty());
    }

    #[test]
    fn test_zero_count_leaves_pool_alone() {
        let mut pool = vec!['a', 'b'];
        let picked   = sample_without_replacement(&mut pool, 0, &mut seeded_rng(3)).unwrap();
        assert!(picked.is_empty());
        assert_eq!(pool, vec!['a', 'b']);
    }

    #[test]
    fn test_oversized_request_fails_without_mutating() {
        let mut pool = vec![1, 2, 3];
        let result   = sample_without_replacement(&mut pool, 4, &mut seeded_rng(3));
        assert!(result.is_err());
        assert_eq!(pool, vec![1, 2, 3]);
    }
}
