/// Simulate command: measures how well the engine recovers a known ranking.
///
/// Every item gets a hidden "true" rating. A simulated judge decides each
/// selected pair by sampling the Elo win probability of the true ratings, so
/// the engine sees exactly the kind of noisy verdicts a human would give.
/// At the end we compare the learned order against the true one.
use std::collections::HashMap;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;

use elorank_core::elo::expected_score;
use elorank_core::{EngineConfig, EngineError, RatingEngine};

/// Spread of the hidden ratings around the default.
const TRUE_RATING_STDDEV: f64 = 200.0;

/// Offsets the judge's RNG seed from the engine's so the two streams differ.
const JUDGE_SEED_OFFSET: u64 = 0x9E37_79B9_7F4A_7C15;

#[derive(Debug, Clone, Serialize)]
pub struct SimulationReport {
    pub items: usize,
    pub comparisons: usize,
    /// Spearman rank correlation between true and learned ratings.
    pub spearman: f64,
    /// Fraction of all possible pairs judged at least once.
    pub pair_coverage: f64,
    pub min_pair_frequency: usize,
    pub max_pair_frequency: usize,
    /// Judgments won by the item with the lower true rating.
    pub upsets: usize,
}

pub fn run_simulation(
    num_items: usize,
    num_comparisons: usize,
    config: EngineConfig,
) -> Result<SimulationReport, EngineError> {
    let mut rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(JUDGE_SEED_OFFSET)),
        None => StdRng::from_os_rng(),
    };
    let default_rating = config.default_rating;

    let ids: Vec<String> = (0..num_items).map(|i| format!("item_{i:04}")).collect();
    let true_ratings: Vec<f64> = (0..num_items)
        .map(|_| default_rating + TRUE_RATING_STDDEV * standard_normal(&mut rng))
        .collect();
    let truth: HashMap<&str, f64> = ids.iter().map(String::as_str).zip(true_ratings.iter().copied()).collect();
    let true_rating = |id: &str| truth.get(id).copied().unwrap_or(default_rating);

    let mut engine = RatingEngine::new(config)?;
    engine.load_pool(Some("simulation".to_string()), ids.iter().cloned())?;

    let mut upsets = 0;
    for _ in 0..num_comparisons {
        let (left, right) = engine.select_pair()?;
        let (left_true, right_true) = (true_rating(&left), true_rating(&right));
        let left_wins = rng.random::<f64>() < expected_score(left_true, right_true);
        let upset = if left_wins { left_true < right_true } else { right_true < left_true };
        if upset {
            upsets += 1;
        }
        if left_wins {
            engine.record_judgment(&left, &right)?;
        } else {
            engine.record_judgment(&right, &left)?;
        }
    }

    let learned: Vec<f64> = ids.iter().map(|id| engine.rating(id)).collect();

    let mut min_pair_frequency = usize::MAX;
    let mut max_pair_frequency = 0;
    let mut covered = 0;
    let mut total_pairs = 0;
    for i in 0..num_items {
        for j in (i + 1)..num_items {
            let f = engine.frequency(&ids[i], &ids[j]);
            min_pair_frequency = min_pair_frequency.min(f);
            max_pair_frequency = max_pair_frequency.max(f);
            covered += usize::from(f > 0);
            total_pairs += 1;
        }
    }

    Ok(SimulationReport {
        items: num_items,
        comparisons: engine.total_comparisons(),
        spearman: spearman(&true_ratings, &learned),
        pair_coverage: if total_pairs == 0 { 0.0 } else { covered as f64 / total_pairs as f64 },
        min_pair_frequency: if total_pairs == 0 { 0 } else { min_pair_frequency },
        max_pair_frequency,
        upsets,
    })
}

pub fn print_report(report: &SimulationReport) {
    println!("Simulated {} comparisons over {} items", report.comparisons, report.items);
    println!("Rank correlation (Spearman): {:.4}", report.spearman);
    println!(
        "Pair coverage: {:.1}% (per-pair comparisons {}..={})",
        report.pair_coverage * 100.0,
        report.min_pair_frequency,
        report.max_pair_frequency,
    );
    println!("Upsets (weaker item won): {}", report.upsets);
}

/// Box-Muller transform.
fn standard_normal(rng: &mut impl Rng) -> f64 {
    let u1: f64 = rng.random::<f64>().max(1e-10);
    let u2: f64 = rng.random();
    (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos()
}

/// 1-based ranks, ties get the average of the ranks they span.
fn ranks(values: &[f64]) -> Vec<f64> {
    let mut order: Vec<usize> = (0..values.len()).collect();
    order.sort_by(|&a, &b| values[a].total_cmp(&values[b]));

    let mut ranks = vec![0.0; values.len()];
    let mut start = 0;
    while start < order.len() {
        let mut end = start + 1;
        while end < order.len() && values[order[end]] == values[order[start]] {
            end += 1;
        }
        let avg = (start + end + 1) as f64 / 2.0;
        for &idx in &order[start..end] {
            ranks[idx] = avg;
        }
        start = end;
    }
    ranks
}

fn spearman(a: &[f64], b: &[f64]) -> f64 {
    let ra = ranks(a);
    let rb = ranks(b);
    let n = ra.len() as f64;
    if n < 2.0 {
        return 0.0;
    }
    let mean_a = ra.iter().sum::<f64>() / n;
    let mean_b = rb.iter().sum::<f64>() / n;
    let mut cov = 0.0;
    let mut var_a = 0.0;
    let mut var_b = 0.0;
    for (x, y) in ra.iter().zip(&rb) {
        cov += (x - mean_a) * (y - mean_b);
        var_a += (x - mean_a).powi(2);
        var_b += (y - mean_b).powi(2);
    }
    if var_a == 0.0 || var_b == 0.0 {
        return 0.0;
    }
    cov / (var_a * var_b).sqrt()
}
