//! Snapshot types for serializing sequence progress.
//!
//! This module provides serializable, point-in-time captures of
//! [`Observable`] values. They are plain data: once taken, a snapshot no
//! longer follows the sequence it was taken from.
//!
//! # Feature Flag
//!
//! This module requires the `serde` feature:
//!
//! ```toml
//! [dependencies]
//! sequenze = { version = "0.1", features = ["serde"] }
//! ```
//!
//! # Examples
//!
//! ```rust,ignore
//! use sequenze::sequences::sequence::Sequence;
//! use sequenze::snapshot::SequenceSnapshot;
//!
//! let cursor = Sequence::new(42).with_name("cursor");
//! let snapshot = SequenceSnapshot::from_observable(&cursor);
//!
//! let json = serde_json::to_string(&snapshot).unwrap();
//! assert_eq!(json, r#"{"name":"cursor","value":42}"#);
//! ```

use crate::sequences::Observable;
use serde::{Deserialize, Serialize};

/// A snapshot of a single sequence's progress.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SequenceSnapshot {
    /// The name of the sequence.
    pub name: String,
    /// Labels attached to the sequence, if any.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub labels: Vec<(String, String)>,
    /// The value of the sequence (the gating value for a group).
    pub value: i64,
}

impl SequenceSnapshot {
    /// Creates a new, unlabeled sequence snapshot.
    pub fn new(name: impl Into<String>, value: i64) -> Self {
        Self {
            name: name.into(),
            labels: Vec::new(),
            value,
        }
    }

    /// Captures the current state of an observable sequence or group.
    ///
    /// Unnamed observables are recorded as `(unnamed)`.
    pub fn from_observable(sequence: &dyn Observable) -> Self {
        Self {
            name: if sequence.name().is_empty() {
                "(unnamed)".to_string()
            } else {
                sequence.name().to_string()
            },
            labels: sequence.labels().to_vec(),
            value: sequence.value(),
        }
    }
}

/// A collection of sequence snapshots taken together.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProgressSnapshot {
    /// Optional timestamp in milliseconds since Unix epoch.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp_ms: Option<u64>,
    /// The sequence snapshots.
    pub sequences: Vec<SequenceSnapshot>,
}

impl ProgressSnapshot {
    /// Creates a new progress snapshot with the given sequences.
    pub fn new(sequences: Vec<SequenceSnapshot>) -> Self {
        Self {
            timestamp_ms: None,
            sequences,
        }
    }

    /// Creates a new progress snapshot with sequences and a timestamp.
    pub fn with_timestamp(sequences: Vec<SequenceSnapshot>, timestamp_ms: u64) -> Self {
        Self {
            timestamp_ms: Some(timestamp_ms),
            sequences,
        }
    }

    /// Finds the first sequence with the given name.
    pub fn get(&self, name: &str) -> Option<&SequenceSnapshot> {
        self.sequences.iter().find(|s| s.name == name)
    }

    /// Captures every observable of the iterator.
    pub fn collect<'a>(sequences: impl Iterator<Item = &'a dyn Observable>) -> Self {
        Self::new(sequences.map(SequenceSnapshot::from_observable).collect())
    }

    /// Returns how far each captured sequence trails `cursor`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use sequenze::snapshot::{ProgressSnapshot, SequenceSnapshot};
    ///
    /// let snapshot = ProgressSnapshot::new(vec![
    ///     SequenceSnapshot::new("journaler", 90),
    ///     SequenceSnapshot::new("replicator", 75),
    /// ]);
    ///
    /// let lag: Vec<_> = snapshot.lag_behind(100).collect();
    /// assert_eq!(lag, vec![("journaler", 10), ("replicator", 25)]);
    /// ```
    pub fn lag_behind(&self, cursor: i64) -> impl Iterator<Item = (&str, i64)> {
        self.sequences
            .iter()
            .map(move |s| (s.name.as_str(), cursor.saturating_sub(s.value)))
    }
}
