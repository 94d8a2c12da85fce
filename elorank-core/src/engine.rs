/// Rating engine orchestrator.
///
/// One explicit value owns every piece of ranking state. The front end creates
/// it, loads an item pool, then alternates `select_pair` and `record_judgment`.
/// No I/O happens here: snapshots are strings the caller stores wherever it likes.
use std::collections::HashSet;

use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::constants::{DEFAULT_K_FACTOR, DEFAULT_RATING, MAX_CANDIDATE_PAIRS};
use crate::elo;
use crate::error::{EngineError, Result};
use crate::history::ComparisonHistory;
use crate::pairing::select_pair;
use crate::ratings::RatingStore;
use crate::snapshot::{self, EngineState};
use crate::types::{CanonicalPair, ItemId, JudgmentOutcome, RankedItem, RatingTier, Side};

/// Configuration for the rating engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Rating given to items the engine has not seen before.
    pub default_rating: f64,
    pub k_factor: f64,
    /// Cap on random candidate pairs drawn per selection.
    pub max_candidate_pairs: usize,
    /// Fixed RNG seed for reproducible selection. `None` seeds from the OS.
    pub seed: Option<u64>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            default_rating: DEFAULT_RATING,
            k_factor: DEFAULT_K_FACTOR,
            max_candidate_pairs: MAX_CANDIDATE_PAIRS,
            seed: None,
        }
    }
}

impl EngineConfig {
    pub fn validate(&self) -> Result<()> {
        if !self.default_rating.is_finite() {
            return Err(EngineError::InvalidConfig(format!(
                "default_rating must be finite, got {}",
                self.default_rating
            )));
        }
        if !(self.k_factor.is_finite() && self.k_factor > 0.0) {
            return Err(EngineError::InvalidConfig(format!(
                "k_factor must be a positive number, got {}",
                self.k_factor
            )));
        }
        if self.max_candidate_pairs == 0 {
            return Err(EngineError::InvalidConfig(
                "max_candidate_pairs must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug)]
pub struct RatingEngine {
    config: EngineConfig,
    ratings: RatingStore,
    history: ComparisonHistory,
    /// Where the current pool came from (a directory path in the image tool).
    source: Option<String>,
    /// Items currently eligible for selection, deduplicated, in load order.
    pool: Vec<ItemId>,
    /// Last pair handed out by `select_pair`, in left/right order.
    pending: Option<(ItemId, ItemId)>,
    rng: StdRng,
}

impl RatingEngine {
    pub fn new(config: EngineConfig) -> Result<Self> {
        config.validate()?;
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };

        Ok(RatingEngine {
            ratings: RatingStore::new(config.default_rating),
            history: ComparisonHistory::new(),
            source: None,
            pool: Vec::new(),
            pending: None,
            rng,
            config,
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Replace the active pool.
    ///
    /// Known items keep their ratings, new ones start at the default. Duplicate
    /// identifiers are dropped. Any pending pair is discarded. Returns the number
    /// of items that had no rating before.
    pub fn load_pool<I, S>(&mut self, source: Option<String>, items: I) -> Result<usize>
    where
        I: IntoIterator<Item = S>,
        S: Into<ItemId>,
    {
        let mut seen = HashSet::new();
        let mut pool = Vec::new();
        for item in items {
            let id: ItemId = item.into();
            if id.is_empty() {
                return Err(EngineError::EmptyIdentifier);
            }
            if seen.insert(id.clone()) {
                pool.push(id);
            } else {
                warn!(item = %id, "duplicate item identifier dropped from pool");
            }
        }

        let mut added = 0;
        for id in &pool {
            if !self.ratings.contains(id) {
                self.ratings.ensure(id);
                added += 1;
            }
        }

        debug!(items = pool.len(), new = added, source = ?source, "loaded item pool");
        self.pool = pool;
        self.source = source;
        self.pending = None;
        Ok(added)
    }

    pub fn pool(&self) -> &[ItemId] {
        &self.pool
    }

    pub fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }

    pub fn rating(&self, id: &str) -> f64 {
        self.ratings.get(id)
    }

    pub fn ratings(&self) -> &RatingStore {
        &self.ratings
    }

    pub fn history(&self) -> &ComparisonHistory {
        &self.history
    }

    pub fn frequency(&self, a: &str, b: &str) -> usize {
        self.history.frequency(a, b)
    }

    pub fn comparisons_for(&self, id: &str) -> usize {
        self.history.count_involving(id)
    }

    pub fn total_comparisons(&self) -> usize {
        self.history.len()
    }

    pub fn pending_pair(&self) -> Option<(&str, &str)> {
        self.pending.as_ref().map(|(a, b)| (a.as_str(), b.as_str()))
    }

    /// Pick the next pair to judge and remember it as pending.
    ///
    /// Returns `(left, right)`. Replaces any previously pending pair.
    pub fn select_pair(&mut self) -> Result<(ItemId, ItemId)> {
        let pair = select_pair(
            &self.pool,
            &self.history,
            self.config.max_candidate_pairs,
            &mut self.rng,
        )?;
        debug!(left = %pair.0, right = %pair.1, frequency = self.history.frequency(&pair.0, &pair.1), "selected pair");
        self.pending = Some(pair.clone());
        Ok(pair)
    }

    /// Discard the pending pair without rating it and select another.
    pub fn skip(&mut self) -> Result<(ItemId, ItemId)> {
        if let Some((left, right)) = self.pending.take() {
            debug!(left = %left, right = %right, "skipped pair");
        }
        self.select_pair()
    }

    /// Apply the judgment `winner` beat `loser` to the pending pair.
    ///
    /// Both identifiers must be the two members of the pending pair. Ratings and
    /// history are updated together; on error neither changes.
    pub fn record_judgment(&mut self, winner: &str, loser: &str) -> Result<JudgmentOutcome> {
        let matches_pending = match &self.pending {
            Some((a, b)) => (a == winner && b == loser) || (a == loser && b == winner),
            None => false,
        };
        if !matches_pending {
            return Err(EngineError::UnknownJudgment {
                winner: winner.to_string(),
                loser: loser.to_string(),
            });
        }

        let record = CanonicalPair::new(winner, loser)?;
        let winner_before = self.ratings.get(winner);
        let loser_before = self.ratings.get(loser);
        let (winner_rating, loser_rating) =
            elo::update(winner_before, loser_before, self.config.k_factor);

        self.ratings.set(winner, winner_rating);
        self.ratings.set(loser, loser_rating);
        self.history.push(record);
        self.pending = None;

        debug!(
            winner = %winner,
            loser = %loser,
            winner_rating,
            loser_rating,
            total = self.history.len(),
            "recorded judgment"
        );

        Ok(JudgmentOutcome {
            winner: winner.to_string(),
            loser: loser.to_string(),
            winner_rating,
            loser_rating,
            delta: winner_rating - winner_before,
        })
    }

    /// Judge the pending pair by presentation side.
    pub fn judge_side(&mut self, side: Side) -> Result<JudgmentOutcome> {
        let Some((left, right)) = self.pending.clone() else {
            return Err(EngineError::UnknownJudgment {
                winner: String::new(),
                loser: String::new(),
            });
        };
        match side {
            Side::Left => self.record_judgment(&left, &right),
            Side::Right => self.record_judgment(&right, &left),
        }
    }

    /// Items sorted by rating, best first. Ties are ordered by identifier.
    ///
    /// Covers the active pool, or every rated item when no pool is loaded.
    pub fn rankings(&self) -> Vec<RankedItem> {
        let ids: Vec<&str> = if self.pool.is_empty() {
            self.ratings.iter().map(|(id, _)| id).collect()
        } else {
            self.pool.iter().map(String::as_str).collect()
        };

        let default_rating = self.ratings.default_rating();
        let mut ranked: Vec<RankedItem> = ids
            .into_iter()
            .map(|id| {
                let rating = self.ratings.get(id);
                RankedItem {
                    item: id.to_string(),
                    rating,
                    comparisons: self.history.count_involving(id),
                    tier: RatingTier::classify(rating, default_rating),
                }
            })
            .collect();
        ranked.sort_by(|a, b| b.rating.total_cmp(&a.rating).then_with(|| a.item.cmp(&b.item)));
        ranked
    }

    /// Copy of the persistent state (ratings, history, source).
    pub fn state(&self) -> EngineState {
        EngineState {
            ratings: self.ratings.as_map().clone(),
            history: self.history.records().to_vec(),
            source: self.source.clone(),
        }
    }

    pub fn export_snapshot(&self) -> Result<String> {
        let blob = snapshot::export(&self.state())?;
        info!(ratings = self.ratings.len(), comparisons = self.history.len(), "exported snapshot");
        Ok(blob)
    }

    /// Replace ratings, history and source with a decoded snapshot.
    ///
    /// The snapshot is fully validated first; on error the engine is untouched.
    /// The active pool is kept, the pending pair is discarded.
    pub fn import_snapshot(&mut self, blob: &str) -> Result<()> {
        let state = snapshot::import(blob)?;
        self.restore(state);
        Ok(())
    }

    pub fn restore(&mut self, state: EngineState) {
        info!(ratings = state.ratings.len(), comparisons = state.history.len(), "restored snapshot");
        self.ratings = RatingStore::from_ratings(self.config.default_rating, state.ratings);
        self.history = ComparisonHistory::from_records(state.history);
        self.source = state.source;
        self.pending = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded(seed: u64) -> RatingEngine {
        RatingEngine::new(EngineConfig {
            seed: Some(seed),
            ..EngineConfig::default()
        })
        .unwrap()
    }

    // Only meaningful for two-item pools, where the pending pair is always {winner, loser}.
    fn judge(engine: &mut RatingEngine, winner: &str, loser: &str) -> JudgmentOutcome {
        engine.select_pair().unwrap();
        engine.record_judgment(winner, loser).unwrap()
    }

    #[test]
    fn test_engine_basic_scenario() {
        let mut engine = seeded(1);
        engine.load_pool(None, ["A", "B"]).unwrap();

        let outcome = judge(&mut engine, "A", "B");
        assert_eq!(outcome.winner_rating, 1516.0);
        assert_eq!(outcome.loser_rating, 1484.0);
        assert_eq!(outcome.delta, 16.0);
        assert_eq!(engine.rating("A"), 1516.0);
        assert_eq!(engine.rating("B"), 1484.0);
        assert_eq!(engine.total_comparisons(), 1);
        assert_eq!(engine.history().records()[0], CanonicalPair::new("A", "B").unwrap());
        assert_eq!(engine.frequency("A", "B"), 1);
        assert_eq!(engine.frequency("B", "A"), 1);
        assert!(engine.pending_pair().is_none());
    }

    #[test]
    fn test_rating_pool_is_conserved() {
        let mut engine = seeded(2);
        let items: Vec<String> = (0..8).map(|i| format!("img{i}.png")).collect();
        engine.load_pool(None, items.clone()).unwrap();

        for round in 0..300 {
            let (left, right) = engine.select_pair().unwrap();
            if round % 3 == 0 {
                engine.record_judgment(&right, &left).unwrap();
            } else {
                engine.record_judgment(&left, &right).unwrap();
            }
        }

        let total: f64 = items.iter().map(|id| engine.rating(id)).sum();
        assert!((total - 8.0 * 1500.0).abs() < 1e-6, "total drifted to {total}");
        let per_item: usize = items.iter().map(|id| engine.comparisons_for(id)).sum();
        assert_eq!(per_item, 2 * engine.total_comparisons());
    }

    #[test]
    fn test_load_pool_preserves_known_ratings() {
        let mut engine = seeded(3);
        engine.load_pool(Some("/a".into()), ["x", "y"]).unwrap();
        judge(&mut engine, "x", "y");

        let added = engine.load_pool(Some("/b".into()), ["x", "y", "z", "z"]).unwrap();
        assert_eq!(added, 1);
        assert_eq!(engine.pool(), ["x", "y", "z"]);
        assert_eq!(engine.source(), Some("/b"));
        assert_eq!(engine.rating("x"), 1516.0);
        assert_eq!(engine.rating("z"), 1500.0);
        assert!(engine.ratings().contains("z"));
    }

    #[test]
    fn test_load_pool_rejects_empty_identifier_without_mutation() {
        let mut engine = seeded(4);
        engine.load_pool(None, ["a", "b"]).unwrap();
        let err = engine.load_pool(None, ["c", ""]).unwrap_err();
        assert!(matches!(err, EngineError::EmptyIdentifier));
        assert_eq!(engine.pool(), ["a", "b"]);
        assert!(!engine.ratings().contains("c"));
    }

    #[test]
    fn test_select_requires_two_items() {
        let mut engine = seeded(5);
        assert!(matches!(
            engine.select_pair(),
            Err(EngineError::InsufficientPool { available: 0 })
        ));
        engine.load_pool(None, ["only.png"]).unwrap();
        assert!(matches!(
            engine.select_pair(),
            Err(EngineError::InsufficientPool { available: 1 })
        ));
    }

    #[test]
    fn test_unknown_judgment_leaves_state_unchanged() {
        let mut engine = seeded(6);
        engine.load_pool(None, ["a", "b", "c"]).unwrap();

        // Nothing pending yet.
        assert!(matches!(
            engine.record_judgment("a", "b"),
            Err(EngineError::UnknownJudgment { .. })
        ));

        let (left, right) = engine.select_pair().unwrap();
        let outsider = ["a", "b", "c"]
            .into_iter()
            .find(|id| *id != left && *id != right)
            .unwrap();

        let before = engine.state();
        for (w, l) in [(left.as_str(), outsider), (outsider, right.as_str()), (left.as_str(), left.as_str())] {
            let err = engine.record_judgment(w, l).unwrap_err();
            assert!(matches!(err, EngineError::UnknownJudgment { .. }), "{w} > {l}: {err}");
        }
        assert_eq!(engine.state(), before);
        assert_eq!(engine.pending_pair(), Some((left.as_str(), right.as_str())));

        // The pending pair still accepts a valid judgment afterwards.
        engine.record_judgment(&right, &left).unwrap();
        assert_eq!(engine.total_comparisons(), 1);
    }

    #[test]
    fn test_pending_pair_is_consumed_by_judgment() {
        let mut engine = seeded(7);
        engine.load_pool(None, ["a", "b"]).unwrap();
        let (left, right) = engine.select_pair().unwrap();
        engine.record_judgment(&left, &right).unwrap();
        assert!(matches!(
            engine.record_judgment(&left, &right),
            Err(EngineError::UnknownJudgment { .. })
        ));
        assert_eq!(engine.total_comparisons(), 1);
    }

    #[test]
    fn test_judge_side() {
        let mut engine = seeded(8);
        engine.load_pool(None, ["a", "b"]).unwrap();
        assert!(engine.judge_side(Side::Left).is_err());

        let (left, right) = engine.select_pair().unwrap();
        let outcome = engine.judge_side(Side::Right).unwrap();
        assert_eq!(outcome.winner, right);
        assert_eq!(outcome.loser, left);
        assert!(engine.rating(&right) > engine.rating(&left));
    }

    #[test]
    fn test_skip_does_not_rate() {
        let mut engine = seeded(9);
        engine.load_pool(None, ["a", "b", "c"]).unwrap();
        engine.select_pair().unwrap();
        let (left, right) = engine.skip().unwrap();
        assert_ne!(left, right);
        assert_eq!(engine.total_comparisons(), 0);
        assert!(engine.ratings().iter().all(|(_, r)| r == 1500.0));
        assert_eq!(engine.pending_pair(), Some((left.as_str(), right.as_str())));
    }

    #[test]
    fn test_repeated_wins_strictly_increase() {
        let mut engine = seeded(10);
        engine.load_pool(None, ["champ", "rival"]).unwrap();
        let mut last = engine.rating("champ");
        for _ in 0..50 {
            judge(&mut engine, "champ", "rival");
            let now = engine.rating("champ");
            assert!(now > last);
            last = now;
        }
    }

    #[test]
    fn test_prefers_unseen_pairs() {
        let mut engine = seeded(11);
        engine.load_pool(None, ["A", "B", "C"]).unwrap();
        engine.restore(EngineState {
            ratings: engine.state().ratings,
            history: vec![
                CanonicalPair::new("A", "B").unwrap(),
                CanonicalPair::new("A", "B").unwrap(),
            ],
            source: None,
        });

        let trials = 400;
        let ab = (0..trials)
            .filter(|_| {
                let (a, b) = engine.select_pair().unwrap();
                CanonicalPair::new(a, b).unwrap() == CanonicalPair::new("A", "B").unwrap()
            })
            .count();
        assert!(ab < trials / 10, "(A,B) selected {ab}/{trials} times");
    }

    #[test]
    fn test_same_seed_reproduces_session() {
        let run = || {
            let mut engine = seeded(12);
            engine.load_pool(None, (0..10).map(|i| format!("{i}.jpg"))).unwrap();
            let mut picks = Vec::new();
            for _ in 0..40 {
                let (left, right) = engine.select_pair().unwrap();
                engine.record_judgment(&left, &right).unwrap();
                picks.push((left, right));
            }
            (picks, engine.state())
        };
        assert_eq!(run(), run());
    }

    #[test]
    fn test_snapshot_round_trip_through_engine() {
        let mut engine = seeded(13);
        engine.load_pool(Some("/photos".into()), ["a", "b", "c", "d"]).unwrap();
        for _ in 0..25 {
            let (left, right) = engine.select_pair().unwrap();
            engine.record_judgment(&left, &right).unwrap();
        }
        let blob = engine.export_snapshot().unwrap();

        let mut restored = seeded(99);
        restored.import_snapshot(&blob).unwrap();
        assert_eq!(restored.state(), engine.state());
        assert_eq!(restored.source(), Some("/photos"));
        assert_eq!(restored.frequency("a", "b"), engine.frequency("a", "b"));
    }

    #[test]
    fn test_failed_import_leaves_engine_untouched() {
        let mut engine = seeded(14);
        engine.load_pool(Some("/photos".into()), ["a", "b"]).unwrap();
        judge(&mut engine, "a", "b");
        let before = engine.state();

        let missing_ratings = r#"{"comparison_history": [], "source": null, "total_comparisons": 0}"#;
        let err = engine.import_snapshot(missing_ratings).unwrap_err();
        assert!(matches!(err, EngineError::MalformedSnapshot(_)));

        let bad_pair = r#"{"ratings": {"a": 1.0}, "comparison_history": [["a"]], "source": null, "total_comparisons": 1}"#;
        assert!(engine.import_snapshot(bad_pair).is_err());

        assert_eq!(engine.state(), before);
        assert_eq!(engine.rating("a"), 1516.0);
    }

    #[test]
    fn test_import_keeps_pool_and_clears_pending() {
        let mut engine = seeded(15);
        engine.load_pool(None, ["a", "b"]).unwrap();
        engine.select_pair().unwrap();
        engine
            .import_snapshot(r#"{"ratings": {"a": 1600}, "comparison_history": [], "source": "/x", "total_comparisons": 0}"#)
            .unwrap();
        assert_eq!(engine.pool(), ["a", "b"]);
        assert!(engine.pending_pair().is_none());
        assert_eq!(engine.rating("a"), 1600.0);
        assert_eq!(engine.rating("b"), 1500.0);
    }

    #[test]
    fn test_rankings_sorted_with_tiers() {
        let mut engine = seeded(16);
        engine.load_pool(None, ["a", "b", "c"]).unwrap();
        engine.restore(EngineState {
            ratings: [("a", 1390.0), ("b", 1650.0), ("c", 1500.0)]
                .into_iter()
                .map(|(id, r)| (id.to_string(), r))
                .collect(),
            history: vec![CanonicalPair::new("a", "b").unwrap()],
            source: None,
        });

        let rankings = engine.rankings();
        let order: Vec<&str> = rankings.iter().map(|r| r.item.as_str()).collect();
        assert_eq!(order, vec!["b", "c", "a"]);
        assert_eq!(rankings[0].tier, RatingTier::Strong);
        assert_eq!(rankings[1].tier, RatingTier::Average);
        assert_eq!(rankings[2].tier, RatingTier::Weak);
        assert_eq!(rankings[0].comparisons, 1);
        assert_eq!(rankings[1].comparisons, 0);
    }

    #[test]
    fn test_rankings_without_pool_use_all_rated_items() {
        let mut engine = seeded(17);
        engine
            .import_snapshot(r#"{"ratings": {"x": 1400, "y": 1600}, "comparison_history": [["x", "y"]], "source": null, "total_comparisons": 1}"#)
            .unwrap();
        let rankings = engine.rankings();
        assert_eq!(rankings.len(), 2);
        assert_eq!(rankings[0].item, "y");
    }

    #[test]
    fn test_invalid_config_rejected() {
        for config in [
            EngineConfig { k_factor: 0.0, ..EngineConfig::default() },
            EngineConfig { k_factor: f64::NAN, ..EngineConfig::default() },
            EngineConfig { default_rating: f64::INFINITY, ..EngineConfig::default() },
            EngineConfig { max_candidate_pairs: 0, ..EngineConfig::default() },
        ] {
            assert!(matches!(RatingEngine::new(config), Err(EngineError::InvalidConfig(_))));
        }
    }
}
