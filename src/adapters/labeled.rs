//! Labeled wrapper for attaching dimensions to sequences and groups.
//!
//! This module provides [`Labeled`], a wrapper that adds key-value labels to
//! any [`Observable`]. Labels are how several sequences with the same name
//! (one per consumer, one per ring buffer) are told apart once exported.
//!
//! # Example
//!
//! ```rust
//! use sequenze::adapters::Labeled;
//! use sequenze::sequences::sequence::Sequence;
//! use sequenze::sequences::Observable;
//!
//! let consumer = Labeled::new(Sequence::new(-1).with_name("consumer_sequence"))
//!     .with_label("ring", "orders")
//!     .with_label("handler", "journaler");
//!
//! consumer.set(128);
//!
//! for (key, value) in consumer.labels() {
//!     println!("{}: {}", key, value);
//! }
//! assert_eq!(consumer.value(), 128);
//! ```

use crate::sequences::{Cursored, Observable, Progress};
use std::fmt::{self, Debug};
use std::ops::Deref;

/// A wrapper that adds labels (key-value tags) to a sequence or group.
///
/// The wrapper is transparent: it dereferences to the inner value and
/// forwards [`Progress`] and [`Cursored`], so a `Labeled<SequenceGroup>` can
/// still be used as a gating sequence.
///
/// # Use with the Prometheus observer
///
/// ```rust,ignore
/// use sequenze::adapters::Labeled;
/// use sequenze::sequences::sequence::Sequence;
/// use sequenze::observers::prometheus::PrometheusObserver;
///
/// let orders = Labeled::new(Sequence::new(41).with_name("cursor")).with_label("ring", "orders");
/// let fills = Labeled::new(Sequence::new(7).with_name("cursor")).with_label("ring", "fills");
///
/// // Output will show:
/// // cursor{ring="orders"} 41
/// // cursor{ring="fills"} 7
/// ```
pub struct Labeled<T> {
    inner: T,
    labels: Vec<(String, String)>,
}

impl<T> Labeled<T> {
    /// Creates a new labeled wrapper with no labels.
    pub fn new(inner: T) -> Self {
        Self {
            inner,
            labels: Vec::new(),
        }
    }

    /// Creates a new labeled wrapper with pre-defined labels.
    ///
    /// A key given more than once keeps its last value, at the position of
    /// its first occurrence.
    ///
    /// # Example
    ///
    /// ```rust
    /// use sequenze::adapters::Labeled;
    /// use sequenze::sequences::group::SequenceGroup;
    ///
    /// let labels = vec![("stage".to_string(), "persist".to_string())];
    /// let gating = Labeled::with_labels(SequenceGroup::new(), labels);
    /// assert_eq!(gating.get_label("stage"), Some("persist"));
    /// ```
    pub fn with_labels(inner: T, labels: Vec<(String, String)>) -> Self {
        let mut labeled = Self::new(inner);
        for (key, value) in labels {
            labeled.add_label(key, value);
        }
        labeled
    }

    /// Adds a label, returning `self` for method chaining.
    ///
    /// If the label already exists, its value is updated.
    pub fn with_label(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.add_label(key, value);
        self
    }

    /// Adds a label to an existing wrapper (non-builder pattern).
    ///
    /// If the label already exists, its value is updated.
    pub fn add_label(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();

        match self.labels.iter_mut().find(|(k, _)| *k == key) {
            Some((_, v)) => *v = value,
            None => self.labels.push((key, value)),
        }
    }

    /// Removes a label, returning its previous value if it existed.
    pub fn remove_label(&mut self, key: &str) -> Option<String> {
        let pos = self.labels.iter().position(|(k, _)| k == key)?;
        Some(self.labels.remove(pos).1)
    }

    /// Returns the value of a label, if it exists.
    pub fn get_label(&self, key: &str) -> Option<&str> {
        self.labels
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Returns an iterator over all labels as (&str, &str) tuples.
    pub fn labels_iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.labels.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Returns true if any label is attached.
    pub fn has_labels(&self) -> bool {
        !self.labels.is_empty()
    }

    /// Returns a reference to the inner value.
    pub fn inner(&self) -> &T {
        &self.inner
    }

    /// Consumes the wrapper and returns the inner value.
    pub fn into_inner(self) -> T {
        self.inner
    }

    /// Consumes the wrapper and returns both the inner value and labels.
    pub fn into_parts(self) -> (T, Vec<(String, String)>) {
        (self.inner, self.labels)
    }
}

impl<T: Observable> Observable for Labeled<T> {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn value(&self) -> i64 {
        self.inner.value()
    }

    fn labels(&self) -> &[(String, String)] {
        &self.labels
    }
}

impl<T: Progress> Progress for Labeled<T> {
    #[inline]
    fn get(&self) -> i64 {
        self.inner.get()
    }

    #[inline]
    fn set(&self, value: i64) {
        self.inner.set(value)
    }

    #[inline]
    fn lazy_set(&self, value: i64) {
        self.inner.lazy_set(value)
    }
}

impl<T: Cursored> Cursored for Labeled<T> {
    #[inline]
    fn cursor(&self) -> i64 {
        self.inner.cursor()
    }
}

impl<T: Debug> Debug for Labeled<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Labeled")
            .field("inner", &self.inner)
            .field("labels", &self.labels)
            .finish()
    }
}

impl<T> Deref for Labeled<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sequences::group::SequenceGroup;
    use crate::sequences::sequence::Sequence;
    use std::sync::Arc;

    #[test]
    fn test_new() {
        let sequence = Labeled::new(Sequence::new(0).with_name("test"));
        assert_eq!(sequence.name(), "test");
        assert!(!sequence.has_labels());
    }

    #[test]
    fn test_with_label() {
        let sequence = Labeled::new(Sequence::default())
            .with_label("ring", "orders")
            .with_label("handler", "replicator");

        assert_eq!(sequence.get_label("ring"), Some("orders"));
        assert_eq!(sequence.get_label("handler"), Some("replicator"));
        assert_eq!(sequence.labels().len(), 2);
    }

    #[test]
    fn test_label_update() {
        let sequence = Labeled::new(Sequence::default())
            .with_label("key", "old")
            .with_label("key", "new");

        assert_eq!(sequence.get_label("key"), Some("new"));
        assert_eq!(sequence.labels().len(), 1);
    }

    #[test]
    fn test_remove_label() {
        let mut sequence = Labeled::new(Sequence::default()).with_label("key", "value");

        assert_eq!(sequence.remove_label("key"), Some("value".to_string()));
        assert_eq!(sequence.remove_label("key"), None);
        assert!(!sequence.has_labels());
    }

    #[test]
    fn test_labels_order_preserved() {
        let mut sequence = Labeled::new(Sequence::default())
            .with_label("c", "3")
            .with_label("a", "1");
        sequence.add_label("b", "2");

        let labels: Vec<_> = sequence.labels_iter().collect();
        assert_eq!(labels, vec![("c", "3"), ("a", "1"), ("b", "2")]);
    }

    #[test]
    fn test_deref_and_progress() {
        let sequence = Labeled::new(Sequence::new(0));
        sequence.set(10);
        assert_eq!(sequence.increment_and_get(), 11);
        assert_eq!(Progress::get(&sequence), 11);
        assert_eq!(sequence.cursor(), 11);
    }

    #[test]
    fn test_labeled_group_gates() {
        let slow = Arc::new(Sequence::new(3));
        let gating = Labeled::new(SequenceGroup::new().with_name("gating"))
            .with_label("stage", "business_logic");
        gating.add(Arc::clone(&slow));
        gating.add(Arc::new(Sequence::new(9)));

        assert_eq!(gating.value(), 3);
        let progress: &dyn Progress = &gating;
        progress.set(12);
        assert_eq!(slow.get(), 12);
    }

    #[test]
    fn test_labeled_shared_handle() {
        let consumer = Arc::new(Sequence::new(4).with_name("consumer"));
        let labeled = Labeled::new(Arc::clone(&consumer)).with_label("id", "0");

        consumer.set(8);
        assert_eq!(labeled.name(), "consumer");
        assert_eq!(labeled.value(), 8);
        assert_eq!(labeled.cursor(), 8);
    }

    #[test]
    fn test_with_labels_deduplicates_keys() {
        let labels = vec![
            ("ring".to_string(), "orders".to_string()),
            ("stage".to_string(), "persist".to_string()),
            ("ring".to_string(), "fills".to_string()),
        ];
        let sequence = Labeled::with_labels(Sequence::default(), labels);

        let labels: Vec<_> = sequence.labels_iter().collect();
        assert_eq!(labels, vec![("ring", "fills"), ("stage", "persist")]);
    }

    #[test]
    fn test_inner_and_into_inner() {
        let sequence = Labeled::new(Sequence::new(7).with_name("journaler")).with_label("id", "1");
        assert_eq!(sequence.inner().name(), "journaler");
        assert_eq!(sequence.inner().get(), 7);

        let inner = sequence.into_inner();
        assert_eq!(inner.get(), 7);
        assert_eq!(inner.labels().len(), 0);
    }

    #[test]
    fn test_into_parts() {
        let sequence = Labeled::new(Sequence::new(42)).with_label("key", "value");

        let (inner, labels) = sequence.into_parts();
        assert_eq!(inner.get(), 42);
        assert_eq!(labels, vec![("key".to_string(), "value".to_string())]);
    }

    #[test]
    fn test_debug() {
        let sequence =
            Labeled::new(Sequence::new(0).with_name("debug_test")).with_label("key", "value");

        let debug_str = format!("{:?}", sequence);
        assert!(debug_str.contains("Labeled"));
        assert!(debug_str.contains("key"));
        assert!(debug_str.contains("debug_test"));
    }
}
