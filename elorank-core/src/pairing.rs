/// Pair selection: prefer pairs that have been judged the fewest times.
///
/// Public functions accept `pool: &[ItemId]` and return owned identifier pairs.
/// Internal functions work on `usize` indices into the deduplicated pool.
///
/// Selection is approximate. Instead of scanning all N(N-1)/2 pairs it draws a
/// bounded number of random candidates and picks among the least-compared of
/// those. A rarely-seen pair can therefore be missed on any one call; over many
/// calls the least-seen pairs are strongly preferred.
use std::collections::HashSet;

use rand::Rng;

use crate::error::{EngineError, Result};
use crate::history::ComparisonHistory;
use crate::types::ItemId;

type IndexedPair = (usize, usize);

/// Number of random candidate pairs drawn for a pool of `pool_size` items.
pub fn candidate_budget(pool_size: usize, max_candidates: usize) -> usize {
    max_candidates.min(pool_size.saturating_mul(2))
}

/// Choose the next pair to present, in left/right order.
///
/// Errors with `InsufficientPool` when the pool has fewer than two distinct items.
pub fn select_pair(
    pool: &[ItemId],
    history: &ComparisonHistory,
    max_candidates: usize,
    rng: &mut impl Rng,
) -> Result<(ItemId, ItemId)> {
    let distinct = dedup_pool(pool);
    if distinct.len() < 2 {
        return Err(EngineError::InsufficientPool { available: distinct.len() });
    }

    let (a, b) = select_pair_indexed(&distinct, history, max_candidates, rng);
    Ok((distinct[a].to_string(), distinct[b].to_string()))
}

/// Order-preserving deduplication.
fn dedup_pool(pool: &[ItemId]) -> Vec<&str> {
    let mut seen = HashSet::with_capacity(pool.len());
    pool.iter()
        .map(String::as_str)
        .filter(|id| seen.insert(*id))
        .collect()
}

fn select_pair_indexed(
    pool: &[&str],
    history: &ComparisonHistory,
    max_candidates: usize,
    rng: &mut impl Rng,
) -> IndexedPair {
    let n = pool.len();
    let attempts = candidate_budget(n, max_candidates);

    let mut min_frequency = usize::MAX;
    let mut best: Vec<IndexedPair> = Vec::new();

    for _ in 0..attempts {
        let a = rng.random_range(0..n);
        let b = rng.random_range(0..n);
        if a == b {
            continue;
        }

        let frequency = history.frequency(pool[a], pool[b]);
        if frequency < min_frequency {
            min_frequency = frequency;
            best.clear();
            best.push((a, b));
        } else if frequency == min_frequency {
            best.push((a, b));
        }
    }

    if !best.is_empty() {
        return best[rng.random_range(0..best.len())];
    }

    // Every draw was degenerate. Only plausible for tiny pools.
    let a = rng.random_range(0..n);
    let mut b = rng.random_range(0..n);
    while b == a {
        b = rng.random_range(0..n);
    }
    (a, b)
}
