use std::collections::BTreeMap;

use crate::types::ItemId;

/// Current rating of every known item.
///
/// Reads never insert: an unknown item reports the default rating until
/// something writes to it. Keys are kept sorted so snapshots are deterministic.
#[derive(Debug, Clone, PartialEq)]
pub struct RatingStore {
    default_rating: f64,
    ratings: BTreeMap<ItemId, f64>,
}

impl RatingStore {
    pub fn new(default_rating: f64) -> Self {
        RatingStore {
            default_rating,
            ratings: BTreeMap::new(),
        }
    }

    /// Build a store from previously exported ratings.
    pub fn from_ratings(default_rating: f64, ratings: BTreeMap<ItemId, f64>) -> Self {
        RatingStore { default_rating, ratings }
    }

    pub fn default_rating(&self) -> f64 {
        self.default_rating
    }

    pub fn get(&self, id: &str) -> f64 {
        self.ratings.get(id).copied().unwrap_or(self.default_rating)
    }

    /// Insert the default rating for `id` if it has none. Returns the rating.
    pub fn ensure(&mut self, id: &str) -> f64 {
        if let Some(&rating) = self.ratings.get(id) {
            return rating;
        }
        self.ratings.insert(id.to_string(), self.default_rating);
        self.default_rating
    }

    pub fn set(&mut self, id: &str, rating: f64) {
        match self.ratings.get_mut(id) {
            Some(slot) => *slot = rating,
            None => {
                self.ratings.insert(id.to_string(), rating);
            }
        }
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ratings.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.ratings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ratings.is_empty()
    }

    /// Ratings in identifier order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.ratings.iter().map(|(id, &r)| (id.as_str(), r))
    }

    pub fn as_map(&self) -> &BTreeMap<ItemId, f64> {
        &self.ratings
    }
}
