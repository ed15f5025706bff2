//! JSON observer for serializing sequence progress.
//!
//! This module provides [`JsonObserver`], which serializes a collection of
//! [`Observable`] sequences to JSON using the [`snapshot`](crate::snapshot)
//! types.
//!
//! # Feature Flag
//!
//! This module requires the `json` feature:
//!
//! ```toml
//! [dependencies]
//! sequenze = { version = "0.1", features = ["json"] }
//! ```
//!
//! # Examples
//!
//! ```rust,ignore
//! use sequenze::sequences::sequence::Sequence;
//! use sequenze::sequences::Observable;
//! use sequenze::observers::json::JsonObserver;
//!
//! let cursor = Sequence::new(1000).with_name("cursor");
//! let journaler = Sequence::new(995).with_name("journaler");
//!
//! let sequences: Vec<&dyn Observable> = vec![&cursor, &journaler];
//! let json = JsonObserver::new().to_json(sequences.into_iter())?;
//!
//! // [{"name":"cursor","value":1000},{"name":"journaler","value":995}]
//! ```

use crate::observers::Result;
use crate::sequences::Observable;
use crate::snapshot::{ProgressSnapshot, SequenceSnapshot};

/// Configuration for the JSON observer.
#[derive(Debug, Clone, Default)]
pub struct JsonConfig {
    /// Whether to pretty-print the JSON output.
    pub pretty: bool,
    /// Whether to include a timestamp in the output.
    pub include_timestamp: bool,
    /// Whether to wrap sequences in a [`ProgressSnapshot`] object.
    pub wrap_in_snapshot: bool,
}

/// An observer that serializes sequences to JSON format.
///
/// By default the output is a bare array of `{"name", "value"}` objects.
/// With [`wrap_in_snapshot`](JsonObserver::wrap_in_snapshot) the array is
/// wrapped in a [`ProgressSnapshot`], optionally timestamped.
#[derive(Debug, Clone, Default)]
pub struct JsonObserver {
    config: JsonConfig,
}

impl JsonObserver {
    /// Creates a new JSON observer with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new JSON observer with the specified configuration.
    pub fn with_config(config: JsonConfig) -> Self {
        Self { config }
    }

    /// Enables or disables pretty-printing.
    pub fn pretty(mut self, enabled: bool) -> Self {
        self.config.pretty = enabled;
        self
    }

    /// Enables or disables timestamp inclusion.
    ///
    /// Only has effect when `wrap_in_snapshot` is also enabled.
    pub fn include_timestamp(mut self, enabled: bool) -> Self {
        self.config.include_timestamp = enabled;
        self
    }

    /// Enables or disables wrapping the output in a [`ProgressSnapshot`].
    pub fn wrap_in_snapshot(mut self, enabled: bool) -> Self {
        self.config.wrap_in_snapshot = enabled;
        self
    }

    /// Collects sequences into a vector of [`SequenceSnapshot`].
    pub fn collect<'a>(
        &self,
        sequences: impl Iterator<Item = &'a dyn Observable>,
    ) -> Vec<SequenceSnapshot> {
        sequences.map(SequenceSnapshot::from_observable).collect()
    }

    /// Serializes sequences to a JSON string.
    ///
    /// # Errors
    ///
    /// Returns [`ObserverError::Json`](crate::observers::ObserverError::Json)
    /// if serialization fails.
    pub fn to_json<'a>(&self, sequences: impl Iterator<Item = &'a dyn Observable>) -> Result<String> {
        let snapshots = self.collect(sequences);

        let json = if self.config.wrap_in_snapshot {
            let snapshot = self.wrap(snapshots);
            if self.config.pretty {
                serde_json::to_string_pretty(&snapshot)?
            } else {
                serde_json::to_string(&snapshot)?
            }
        } else if self.config.pretty {
            serde_json::to_string_pretty(&snapshots)?
        } else {
            serde_json::to_string(&snapshots)?
        };
        Ok(json)
    }

    /// Serializes sequences to a JSON byte vector.
    ///
    /// # Errors
    ///
    /// Returns [`ObserverError::Json`](crate::observers::ObserverError::Json)
    /// if serialization fails.
    pub fn to_json_bytes<'a>(
        &self,
        sequences: impl Iterator<Item = &'a dyn Observable>,
    ) -> Result<Vec<u8>> {
        let snapshots = self.collect(sequences);

        let bytes = if self.config.wrap_in_snapshot {
            serde_json::to_vec(&self.wrap(snapshots))?
        } else {
            serde_json::to_vec(&snapshots)?
        };
        Ok(bytes)
    }

    fn wrap(&self, snapshots: Vec<SequenceSnapshot>) -> ProgressSnapshot {
        if self.config.include_timestamp {
            ProgressSnapshot::with_timestamp(snapshots, current_timestamp_ms())
        } else {
            ProgressSnapshot::new(snapshots)
        }
    }
}

/// Returns the current timestamp in milliseconds since Unix epoch.
fn current_timestamp_ms() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::Labeled;
    use crate::sequences::group::SequenceGroup;
    use crate::sequences::sequence::Sequence;
    use crate::sequences::UNINITIALIZED;
    use std::sync::Arc;

    #[test]
    fn test_to_json_empty() {
        let sequences: Vec<&dyn Observable> = vec![];
        let json = JsonObserver::new().to_json(sequences.into_iter()).unwrap();
        assert_eq!(json, "[]");
    }

    #[test]
    fn test_to_json_sequences() {
        let cursor = Sequence::new(1000).with_name("cursor");
        let journaler = Sequence::new(-1).with_name("journaler");
        let sequences: Vec<&dyn Observable> = vec![&cursor, &journaler];

        let json = JsonObserver::new().to_json(sequences.into_iter()).unwrap();
        assert_eq!(
            json,
            r#"[{"name":"cursor","value":1000},{"name":"journaler","value":-1}]"#
        );
    }

    #[test]
    fn test_to_json_group_and_labels() {
        let group = Labeled::new(SequenceGroup::new().with_name("gating"))
            .with_label("ring", "orders");
        group.add(Arc::new(Sequence::new(5)));
        group.add(Arc::new(Sequence::new(3)));
        let sequences: Vec<&dyn Observable> = vec![&group];

        let json = JsonObserver::new().to_json(sequences.into_iter()).unwrap();
        assert_eq!(
            json,
            r#"[{"name":"gating","labels":[["ring","orders"]],"value":3}]"#
        );
    }

    #[test]
    fn test_to_json_empty_group_reports_sentinel() {
        let group = SequenceGroup::new().with_name("gating");
        let sequences: Vec<&dyn Observable> = vec![&group];

        let json = JsonObserver::new().to_json(sequences.into_iter()).unwrap();
        assert!(json.contains(&UNINITIALIZED.to_string()));
    }

    #[test]
    fn test_to_json_pretty() {
        let cursor = Sequence::new(1).with_name("cursor");
        let sequences: Vec<&dyn Observable> = vec![&cursor];

        let json = JsonObserver::new()
            .pretty(true)
            .to_json(sequences.into_iter())
            .unwrap();
        assert!(json.contains('\n'));
    }

    #[test]
    fn test_to_json_with_snapshot_and_timestamp() {
        let cursor = Sequence::new(8).with_name("cursor");
        let sequences: Vec<&dyn Observable> = vec![&cursor];

        let json = JsonObserver::new()
            .wrap_in_snapshot(true)
            .include_timestamp(true)
            .to_json(sequences.into_iter())
            .unwrap();

        let snapshot: ProgressSnapshot = serde_json::from_str(&json).unwrap();
        assert!(snapshot.timestamp_ms.is_some());
        assert_eq!(snapshot.get("cursor").map(|s| s.value), Some(8));
    }

    #[test]
    fn test_to_json_with_snapshot_without_timestamp() {
        let sequences: Vec<&dyn Observable> = vec![];
        let json = JsonObserver::new()
            .wrap_in_snapshot(true)
            .to_json(sequences.into_iter())
            .unwrap();
        assert_eq!(json, r#"{"sequences":[]}"#);
    }

    #[test]
    fn test_to_json_bytes() {
        let cursor = Sequence::new(2).with_name("cursor");
        let sequences: Vec<&dyn Observable> = vec![&cursor];

        let bytes = JsonObserver::new()
            .to_json_bytes(sequences.into_iter())
            .unwrap();
        let decoded: Vec<SequenceSnapshot> = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(decoded, vec![SequenceSnapshot::new("cursor", 2)]);
    }
}
