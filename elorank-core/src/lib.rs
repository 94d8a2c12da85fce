/// elorank-core: Pairwise-comparison Elo rating engine.
///
/// Pick a pair → a human (or anything else) judges it → ratings move → repeat.
/// No IO, no UI, no filesystem. The front end owns one `RatingEngine` and
/// drives it with plain synchronous calls.
///
/// Items are identified by caller-provided string IDs (file names in the image
/// tool). Ratings start at 1500 and move by at most K = 32 per comparison.
///
/// # Quick start
///
/// ```rust
/// use elorank_core::{EngineConfig, RatingEngine};
///
/// let mut engine = RatingEngine::new(EngineConfig {
///     seed: Some(7),
///     ..EngineConfig::default()
/// })?;
/// engine.load_pool(Some("/photos".to_string()), ["a.jpg", "b.jpg", "c.jpg"])?;
///
/// let (left, right) = engine.select_pair()?;
/// engine.record_judgment(&left, &right)?; // left wins
///
/// for r in engine.rankings() {
///     println!("{}: {:.0} ({} comparisons)", r.item, r.rating, r.comparisons);
/// }
///
/// let saved = engine.export_snapshot()?;
/// engine.import_snapshot(&saved)?;
/// # Ok::<(), elorank_core::EngineError>(())
/// ```

pub mod constants;
pub mod elo;
pub mod engine;
pub mod error;
pub mod history;
pub mod pairing;
pub mod ratings;
pub mod shared;
pub mod snapshot;
pub mod types;

// Re-export primary public API at crate root.
pub use engine::{EngineConfig, RatingEngine};
pub use error::{EngineError, Result};
pub use history::ComparisonHistory;
pub use pairing::{candidate_budget, select_pair};
pub use ratings::RatingStore;
pub use shared::SharedEngine;
pub use snapshot::EngineState;
pub use types::{CanonicalPair, ItemId, JudgmentOutcome, RankedItem, RatingTier, Side};
