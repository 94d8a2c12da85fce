/// Elo rating updates for a single judged comparison.
///
/// Pure functions over ratings; the engine decides where the ratings live.
use crate::constants::ELO_SCALE;

/// Probability that an item rated `rating` beats an item rated `opponent`.
pub fn expected_score(rating: f64, opponent: f64) -> f64 {
    1.0 / (1.0 + 10f64.powf((opponent - rating) / ELO_SCALE))
}

/// Apply one decisive result. Returns `(new_winner_rating, new_loser_rating)`.
///
/// The loser's expected score is taken as the exact complement of the winner's,
/// and the same delta is added to one side and subtracted from the other, so the
/// total rating in the pool never changes. Ratings are not clamped.
pub fn update(winner_rating: f64, loser_rating: f64, k_factor: f64) -> (f64, f64) {
    let delta = rating_delta(winner_rating, loser_rating, k_factor);
    (winner_rating + delta, loser_rating - delta)
}

/// Points the winner takes from the loser: `K * (1 - E_winner)`, which equals
/// `-K * (0 - E_loser)` with `E_loser = 1 - E_winner`.
pub fn rating_delta(winner_rating: f64, loser_rating: f64, k_factor: f64) -> f64 {
    let expected_winner = expected_score(winner_rating, loser_rating);
    let expected_loser = 1.0 - expected_winner;
    k_factor * expected_loser
}
