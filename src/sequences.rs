//! Core module containing the sequence types and the traits they share.
//!
//! A [`Sequence`](sequence::Sequence) is a single, cache-line padded progress
//! counter owned by one participant (a producer publishing slots, a consumer
//! acknowledging them). A [`SequenceGroup`](group::SequenceGroup) aggregates
//! any number of sequences and behaves as one virtual sequence whose value is
//! the minimum of its members: the progress of the slowest participant.
//!
//! # Architecture
//!
//! ```text
//!                  ┌──────────────────────────────────────────┐
//!                  │              SequenceGroup               │
//!                  │  Atomic ──► [ seq A | seq B | seq C ]    │  immutable snapshot
//!                  └──────────────────────────────────────────┘
//!                        │            │            │
//!   consumer A ─set──►  [A: 41]      [B: 37]      [C: 40]
//!                                     │
//!                                     ▼
//!                           get() == 37 (gating value)
//! ```
//!
//! Membership changes never modify a published snapshot. `add`/`remove`
//! build a new vector and install it with a compare-and-swap on the single
//! atomic pointer, retrying if another thread won the race. Readers pin the
//! current epoch, load the pointer once and scan the vector, so they never
//! wait on a mutator and never observe a half-built membership list.
//!
//! # Shared capabilities
//!
//! Rather than modelling a group as a kind of sequence, both types implement
//! the same small traits:
//!
//! - [`Progress`] - read, publish and lazily publish a progress value
//! - [`Cursored`] - expose the latest published position of a producer
//! - [`Observable`] - name, labels and value, for the [`observers`](crate::observers)

pub mod group;
pub mod sequence;

use std::fmt::{Debug, Display};
use std::sync::Arc;

use sequence::Sequence;

/// Value of a freshly created [`Sequence`]: nothing has been published yet.
pub const INITIAL_VALUE: i64 = -1;

/// Value reported by an empty [`SequenceGroup`](group::SequenceGroup).
///
/// An empty group gates nothing, so it reports the lowest representable
/// progress rather than a value some member could actually hold.
pub const UNINITIALIZED: i64 = i64::MIN;

/// A readable and writable progress counter.
///
/// Implemented by [`Sequence`] and by
/// [`SequenceGroup`](group::SequenceGroup), so code that gates on or
/// publishes progress can accept either.
///
/// # Examples
///
/// ```rust
/// use std::sync::Arc;
/// use sequenze::sequences::Progress;
/// use sequenze::sequences::group::SequenceGroup;
/// use sequenze::sequences::sequence::Sequence;
///
/// fn reset(progress: &dyn Progress) {
///     progress.set(0);
/// }
///
/// let single = Sequence::new(10);
/// let group = SequenceGroup::new();
/// group.add(Arc::new(Sequence::new(5)));
///
/// reset(&single);
/// reset(&group);
/// assert_eq!(single.get(), 0);
/// assert_eq!(Progress::get(&group), 0);
/// ```
pub trait Progress: Send + Sync {
    /// Returns the current progress value.
    fn get(&self) -> i64;

    /// Publishes a value, immediately visible to every other thread.
    fn set(&self, value: i64);

    /// Publishes a value with release semantics only.
    ///
    /// The calling thread observes the write in program order; other threads
    /// observe it eventually. Cheaper than [`set`](Progress::set) on hot paths.
    fn lazy_set(&self, value: i64);
}

/// A producer-side position that new consumers can be aligned with.
pub trait Cursored {
    /// Returns the latest published position.
    fn cursor(&self) -> i64;
}

impl<T: Cursored + ?Sized> Cursored for Arc<T> {
    #[inline]
    fn cursor(&self) -> i64 {
        (**self).cursor()
    }
}

/// A trait for types whose progress can be observed and exported.
///
/// # Examples
///
/// ```rust
/// use sequenze::sequences::Observable;
/// use sequenze::sequences::sequence::Sequence;
///
/// let cursor = Sequence::new(41).with_name("ring_cursor");
///
/// println!("Name: {}", cursor.name());
/// println!("Value: {}", cursor.value());
/// assert_eq!(format!("{}", &cursor as &dyn Observable), "ring_cursor:41");
/// ```
pub trait Observable: Debug {
    /// Returns the name of this sequence, or an empty string if unnamed.
    fn name(&self) -> &str;

    /// Returns the current progress value.
    ///
    /// For a group this is the gating value (minimum over the members).
    fn value(&self) -> i64;

    /// Returns the key-value labels attached to this observable.
    ///
    /// Plain sequences and groups carry no labels; see
    /// [`Labeled`](crate::adapters::Labeled).
    fn labels(&self) -> &[(String, String)] {
        &[]
    }
}

impl Display for dyn Observable + '_ {
    /// Formats the sequence as `name:value` if named, or just `value` otherwise.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if !self.name().is_empty() {
            write!(f, "{}:{}", self.name(), self.value())
        } else {
            write!(f, "{}", self.value())
        }
    }
}

impl<T: Observable + ?Sized> Observable for Arc<T> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn value(&self) -> i64 {
        (**self).value()
    }

    fn labels(&self) -> &[(String, String)] {
        (**self).labels()
    }
}

/// Returns the smallest value among `sequences`, or `minimum` if there are
/// none or all of them are larger.
///
/// Each member is read independently, so the result is a lower bound on the
/// members' progress rather than an instantaneous snapshot.
///
/// # Examples
///
/// ```rust
/// use std::sync::Arc;
/// use sequenze::sequences::minimum_sequence;
/// use sequenze::sequences::sequence::Sequence;
///
/// let sequences = vec![Arc::new(Sequence::new(5)), Arc::new(Sequence::new(3))];
/// assert_eq!(minimum_sequence(&sequences, i64::MAX), 3);
/// assert_eq!(minimum_sequence(&[], 42), 42);
/// ```
#[inline]
pub fn minimum_sequence(sequences: &[Arc<Sequence>], minimum: i64) -> i64 {
    sequences
        .iter()
        .map(|sequence| sequence.get())
        .fold(minimum, i64::min)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimum_sequence_empty() {
        assert_eq!(minimum_sequence(&[], i64::MAX), i64::MAX);
    }

    #[test]
    fn test_minimum_sequence_caps_at_default() {
        let sequences = vec![Arc::new(Sequence::new(10)), Arc::new(Sequence::new(20))];
        assert_eq!(minimum_sequence(&sequences, 4), 4);
        assert_eq!(minimum_sequence(&sequences, i64::MAX), 10);
    }

    #[test]
    fn test_display_unnamed() {
        let sequence = Sequence::new(-3);
        assert_eq!(format!("{}", &sequence as &dyn Observable), "-3");
    }

    #[test]
    fn test_arc_cursored() {
        let cursor = Arc::new(Sequence::new(12));
        assert_eq!(cursor.cursor(), 12);
    }
}
