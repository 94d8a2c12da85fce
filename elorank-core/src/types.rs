use serde::{Deserialize, Serialize};

use crate::constants::TIER_MARGIN;
use crate::error::{EngineError, Result};

/// Caller-provided item identifier (a file name in the image tool).
///
/// Opaque to the engine. Must be non-empty and unique within one engine.
pub type ItemId = String;

/// An unordered pair of two distinct items, stored in sorted order.
///
/// `(a, b)` and `(b, a)` build the same value, so equality and hashing are
/// order-independent.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CanonicalPair {
    first: ItemId,
    second: ItemId,
}

impl CanonicalPair {
    pub fn new(a: impl Into<ItemId>, b: impl Into<ItemId>) -> Result<Self> {
        let (a, b) = (a.into(), b.into());
        if a.is_empty() || b.is_empty() {
            return Err(EngineError::EmptyIdentifier);
        }
        if a == b {
            return Err(EngineError::SelfComparison(a));
        }
        Ok(if a < b {
            CanonicalPair { first: a, second: b }
        } else {
            CanonicalPair { first: b, second: a }
        })
    }

    /// The lexicographically smaller identifier.
    pub fn first(&self) -> &str {
        &self.first
    }

    /// The lexicographically larger identifier.
    pub fn second(&self) -> &str {
        &self.second
    }

    pub fn contains(&self, id: &str) -> bool {
        self.first == id || self.second == id
    }

    pub fn into_parts(self) -> (ItemId, ItemId) {
        (self.first, self.second)
    }
}

/// Presentation side of a selected pair. The first element returned by
/// selection is shown on the left.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Left,
    Right,
}

/// Coarse strength bucket relative to the default rating.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RatingTier {
    Strong,
    Average,
    Weak,
}

impl RatingTier {
    pub fn classify(rating: f64, default_rating: f64) -> Self {
        if rating > default_rating + TIER_MARGIN {
            RatingTier::Strong
        } else if rating < default_rating - TIER_MARGIN {
            RatingTier::Weak
        } else {
            RatingTier::Average
        }
    }
}

/// One row of the rankings view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedItem {
    pub item: ItemId,
    pub rating: f64,
    /// Number of judged comparisons this item took part in.
    pub comparisons: usize,
    pub tier: RatingTier,
}

/// Ratings after a judgment was applied.
#[derive(Debug, Clone, PartialEq)]
pub struct JudgmentOutcome {
    pub winner: ItemId,
    pub loser: ItemId,
    pub winner_rating: f64,
    pub loser_rating: f64,
    /// Points moved from the loser to the winner.
    pub delta: f64,
}
