/// Snapshot export/import of the full engine state.
///
/// Wire format (JSON object):
///
/// ```json
/// {
///   "ratings": { "a.png": 1516.0, "b.png": 1484.0 },
///   "comparison_history": [["a.png", "b.png"]],
///   "source": "/photos/shortlist",
///   "total_comparisons": 1
/// }
/// ```
///
/// All four fields are required (`source` may be null). Unknown fields are
/// ignored, and `images_dir` stands in for a missing `source` in files written
/// by older tools. Decoding validates the whole document before returning
/// anything, so a failed import never yields a partial state.
use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{EngineError, Result};
use crate::types::{CanonicalPair, ItemId};

/// Everything a snapshot carries: ratings, judged pairs in order, and where the
/// item pool came from.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EngineState {
    pub ratings: BTreeMap<ItemId, f64>,
    pub history: Vec<CanonicalPair>,
    pub source: Option<String>,
}

impl EngineState {
    pub fn total_comparisons(&self) -> usize {
        self.history.len()
    }
}

#[derive(Serialize)]
struct SnapshotOut<'a> {
    ratings: &'a BTreeMap<ItemId, f64>,
    comparison_history: Vec<[&'a str; 2]>,
    source: Option<&'a str>,
    total_comparisons: usize,
}

#[derive(Deserialize)]
struct SnapshotIn {
    ratings: BTreeMap<ItemId, f64>,
    comparison_history: Vec<Vec<ItemId>>,
    // Outer `None` means the key is absent, inner `None` means it is null.
    #[serde(default, deserialize_with = "present")]
    source: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    images_dir: Option<Option<String>>,
    total_comparisons: u64,
}

fn present<'de, D>(deserializer: D) -> std::result::Result<Option<Option<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::deserialize(deserializer).map(Some)
}

/// Encode `state` as pretty-printed JSON.
pub fn export(state: &EngineState) -> Result<String> {
    let out = SnapshotOut {
        ratings: &state.ratings,
        comparison_history: state
            .history
            .iter()
            .map(|pair| [pair.first(), pair.second()])
            .collect(),
        source: state.source.as_deref(),
        total_comparisons: state.history.len(),
    };
    Ok(serde_json::to_string_pretty(&out)?)
}

/// Decode and validate a snapshot.
pub fn import(blob: &str) -> Result<EngineState> {
    let raw: SnapshotIn = serde_json::from_str(blob)
        .map_err(|e| EngineError::MalformedSnapshot(e.to_string()))?;
    raw.into_state()
}

impl SnapshotIn {
    fn into_state(self) -> Result<EngineState> {
        let source = match (self.source, self.images_dir) {
            (Some(source), _) => source,
            (None, Some(images_dir)) => images_dir,
            (None, None) => return Err(malformed("missing field `source`")),
        };

        for (id, &rating) in &self.ratings {
            if id.is_empty() {
                return Err(malformed("ratings contains an empty identifier"));
            }
            if !rating.is_finite() {
                return Err(malformed(format!("rating for {id:?} is not finite")));
            }
        }

        if self.total_comparisons != self.comparison_history.len() as u64 {
            return Err(malformed(format!(
                "total_comparisons is {} but comparison_history has {} entries",
                self.total_comparisons,
                self.comparison_history.len(),
            )));
        }

        let mut history = Vec::with_capacity(self.comparison_history.len());
        for (i, entry) in self.comparison_history.into_iter().enumerate() {
            let [a, b]: [ItemId; 2] = entry.try_into().map_err(|entry: Vec<ItemId>| {
                malformed(format!(
                    "comparison_history[{i}] has {} identifiers, expected 2",
                    entry.len()
                ))
            })?;
            let pair = CanonicalPair::new(a, b)
                .map_err(|e| malformed(format!("comparison_history[{i}]: {e}")))?;
            history.push(pair);
        }

        Ok(EngineState {
            ratings: self.ratings,
            history,
            source,
        })
    }
}

fn malformed(msg: impl Into<String>) -> EngineError {
    EngineError::MalformedSnapshot(msg.into())
}
