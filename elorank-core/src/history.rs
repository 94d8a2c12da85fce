use std::collections::HashMap;

use crate::error::Result;
use crate::types::{CanonicalPair, ItemId};

/// Append-only log of judged pairs, in judgment order.
///
/// Frequency and per-item counts are maintained incrementally on append, so
/// both lookups are O(1) regardless of history length. Retention is unbounded.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ComparisonHistory {
    records: Vec<CanonicalPair>,
    pair_counts: HashMap<CanonicalPair, usize>,
    item_counts: HashMap<ItemId, usize>,
}

impl ComparisonHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a history (and its counters) from records in judgment order.
    pub fn from_records(records: impl IntoIterator<Item = CanonicalPair>) -> Self {
        let mut history = Self::new();
        for pair in records {
            history.push(pair);
        }
        history
    }

    /// Record a judged comparison between `a` and `b` (order irrelevant).
    pub fn append(&mut self, a: &str, b: &str) -> Result<()> {
        let pair = CanonicalPair::new(a, b)?;
        self.push(pair);
        Ok(())
    }

    pub fn push(&mut self, pair: CanonicalPair) {
        *self.item_counts.entry(pair.first().to_string()).or_insert(0) += 1;
        *self.item_counts.entry(pair.second().to_string()).or_insert(0) += 1;
        *self.pair_counts.entry(pair.clone()).or_insert(0) += 1;
        self.records.push(pair);
    }

    /// How many times the unordered pair `(a, b)` has been judged.
    pub fn frequency(&self, a: &str, b: &str) -> usize {
        match CanonicalPair::new(a, b) {
            Ok(pair) => self.pair_counts.get(&pair).copied().unwrap_or(0),
            Err(_) => 0,
        }
    }

    /// How many judged comparisons involved `id`.
    pub fn count_involving(&self, id: &str) -> usize {
        self.item_counts.get(id).copied().unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[CanonicalPair] {
        &self.records
    }

    pub fn iter(&self) -> impl Iterator<Item = &CanonicalPair> {
        self.records.iter()
    }
}
