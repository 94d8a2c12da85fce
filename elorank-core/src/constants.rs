/// Rating assigned to an item the first time the engine sees it.
/// Every rating in a fresh pool starts here, so the pool's mean stays at this value
/// for as long as updates are zero-sum.
pub const DEFAULT_RATING: f64 = 1500.0;

/// Maximum rating change per comparison.
/// Larger values converge faster but make the ranking noisier.
pub const DEFAULT_K_FACTOR: f64 = 32.0;

/// Rating gap at which the stronger item is expected to win ten times as often.
pub const ELO_SCALE: f64 = 400.0;

/// Upper bound on the number of random candidate pairs drawn per selection.
///
/// The selector never enumerates all N(N-1)/2 pairs. It draws at most
/// `min(MAX_CANDIDATE_PAIRS, 2 * N)` random pairs and keeps the least-compared
/// ones. For small pools the 2N bound dominates; for large pools this cap keeps
/// each selection O(1) regardless of pool size.
pub const MAX_CANDIDATE_PAIRS: usize = 100;

/// Distance from the default rating beyond which an item counts as clearly
/// stronger or weaker than a newcomer.
pub const TIER_MARGIN: f64 = 100.0;
