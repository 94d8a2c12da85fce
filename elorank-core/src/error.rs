use thiserror::Error;

use crate::types::ItemId;

/// Errors returned by the rating engine.
///
/// Every variant is recoverable: the engine state is left exactly as it was
/// before the failing call, and the caller may retry with corrected input.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Pair selection needs at least two distinct items.
    #[error("need at least 2 distinct items to compare, got {available}")]
    InsufficientPool { available: usize },

    /// A judgment named items that are not the pending pair.
    #[error("judgment {winner} > {loser} does not match the pending pair")]
    UnknownJudgment { winner: ItemId, loser: ItemId },

    /// Snapshot failed structural validation during import.
    #[error("malformed snapshot: {0}")]
    MalformedSnapshot(String),

    /// A comparison record cannot contain the same item twice.
    #[error("cannot compare {0} with itself")]
    SelfComparison(ItemId),

    /// Item identifiers must be non-empty.
    #[error("item identifier must not be empty")]
    EmptyIdentifier,

    #[error("invalid engine config: {0}")]
    InvalidConfig(String),

    #[error("snapshot serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, EngineError>;
