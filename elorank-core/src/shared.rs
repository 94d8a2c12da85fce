/// Thread-safe handle for hosts that drive the engine from several threads.
///
/// A single `RwLock` guards the whole engine. Every mutating operation holds the
/// write lock for its full duration, so readers see either the state before a
/// judgment or the state after it, never a rating update without its history
/// record. Nothing blocking runs under the lock.
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::engine::RatingEngine;
use crate::error::Result;
use crate::types::{ItemId, JudgmentOutcome, RankedItem, Side};

#[derive(Debug, Clone)]
pub struct SharedEngine {
    inner: Arc<RwLock<RatingEngine>>,
}

impl SharedEngine {
    pub fn new(engine: RatingEngine) -> Self {
        SharedEngine {
            inner: Arc::new(RwLock::new(engine)),
        }
    }

    // Mutations only touch the engine after their fallible checks pass, so a
    // panic elsewhere cannot leave a half-applied update behind the lock.
    fn read(&self) -> RwLockReadGuard<'_, RatingEngine> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, RatingEngine> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Run `f` with shared access.
    pub fn with<R>(&self, f: impl FnOnce(&RatingEngine) -> R) -> R {
        f(&self.read())
    }

    /// Run `f` with exclusive access, as one atomic unit.
    pub fn with_mut<R>(&self, f: impl FnOnce(&mut RatingEngine) -> R) -> R {
        f(&mut self.write())
    }

    pub fn load_pool(&self, source: Option<String>, items: Vec<ItemId>) -> Result<usize> {
        self.write().load_pool(source, items)
    }

    pub fn select_pair(&self) -> Result<(ItemId, ItemId)> {
        self.write().select_pair()
    }

    pub fn skip(&self) -> Result<(ItemId, ItemId)> {
        self.write().skip()
    }

    pub fn record_judgment(&self, winner: &str, loser: &str) -> Result<JudgmentOutcome> {
        self.write().record_judgment(winner, loser)
    }

    pub fn judge_side(&self, side: Side) -> Result<JudgmentOutcome> {
        self.write().judge_side(side)
    }

    pub fn import_snapshot(&self, blob: &str) -> Result<()> {
        self.write().import_snapshot(blob)
    }

    pub fn export_snapshot(&self) -> Result<String> {
        self.read().export_snapshot()
    }

    pub fn rating(&self, id: &str) -> f64 {
        self.read().rating(id)
    }

    pub fn frequency(&self, a: &str, b: &str) -> usize {
        self.read().frequency(a, b)
    }

    pub fn total_comparisons(&self) -> usize {
        self.read().total_comparisons()
    }

    pub fn rankings(&self) -> Vec<RankedItem> {
        self.read().rankings()
    }
}
