//! The persisted trade collection and the reconciliation rule that feeds it.
//!
//! On disk the collection is `{ "activities": [ ... ] }`, keys sorted at every
//! level, two-space indentation. In memory it is append-only: records are
//! never removed or rewritten once inserted.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::activity::TradeRecord;

#[derive(Debug, Error)]
pub enum CollectionError {
    #[error("reading {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("{path} is not a valid trade collection: {source}")]
    Corrupt {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("serializing trade collection: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("writing {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Result of offering a candidate record to the collection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Integration {
    Added,
    /// A record with the same `date` is already present; candidate dropped
    Duplicate,
}

#[derive(Serialize, Deserialize)]
struct Persisted {
    activities: Vec<TradeRecord>,
}

/// Ordered, date-deduplicated set of trade records.
///
/// The duplicate key is the settlement timestamp alone: two different trades
/// settling at the same instant collapse into whichever was seen first.
#[derive(Debug, Clone, Default)]
pub struct TradeCollection {
    activities: Vec<TradeRecord>,
    dates: HashSet<NaiveDateTime>,
}

impl TradeCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from previously persisted records, keeping all of them as-is.
    pub fn from_records(activities: Vec<TradeRecord>) -> Self {
        let dates = activities.iter().map(|a| a.date).collect();
        Self { activities, dates }
    }

    pub fn len(&self) -> usize {
        self.activities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.activities.is_empty()
    }

    pub fn activities(&self) -> &[TradeRecord] {
        &self.activities
    }

    /// Append `candidate` unless a record with the same `date` exists.
    pub fn integrate(&mut self, candidate: TradeRecord) -> Integration {
        if !self.dates.insert(candidate.date) {
            return Integration::Duplicate;
        }
        self.activities.push(candidate);
        Integration::Added
    }

    /// Load a persisted collection.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, CollectionError> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).map_err(|source| CollectionError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let persisted: Persisted =
            serde_json::from_str(&raw).map_err(|source| CollectionError::Corrupt {
                path: path.to_path_buf(),
                source,
            })?;
        Ok(Self::from_records(persisted.activities))
    }

    /// Starting collection for a run: the existing file in merge mode, empty otherwise.
    pub fn load_or_empty(path: impl AsRef<Path>, merge: bool) -> Result<Self, CollectionError> {
        let path = path.as_ref();
        if merge && path.exists() {
            Self::load(path)
        } else {
            Ok(Self::new())
        }
    }

    /// Render the collection exactly as it is written to disk.
    ///
    /// Activities are ordered by `date`; insertion order is not preserved.
    pub fn to_json(&self) -> Result<String, CollectionError> {
        let mut activities = self.activities.clone();
        activities.sort_by(|a, b| a.date.cmp(&b.date));
        let value = serde_json::to_value(Persisted { activities })?;
        Ok(serde_json::to_string_pretty(&sort_keys(value))?)
    }

    /// Write the full collection, replacing `path` atomically.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), CollectionError> {
        let path = path.as_ref();
        let json = self.to_json()?;

        let mut tmp = path.as_os_str().to_owned();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        let result = fs::write(&tmp, json).and_then(|()| fs::rename(&tmp, path));
        if let Err(source) = result {
            // Best effort; the write error is what gets reported.
            let _ = fs::remove_file(&tmp);
            return Err(CollectionError::Write {
                path: path.to_path_buf(),
                source,
            });
        }
        Ok(())
    }
}

/// Rebuild every object with lexicographically ordered keys.
fn sort_keys(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let sorted: BTreeMap<String, Value> =
                map.into_iter().map(|(k, v)| (k, sort_keys(v))).collect();
            Value::Object(sorted.into_iter().collect::<Map<String, Value>>())
        }
        Value::Array(items) => Value::Array(items.into_iter().map(sort_keys).collect()),
        other => other,
    }
}
