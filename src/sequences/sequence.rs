//! Single progress counter with cache-line padded atomic storage.
//!
//! This module provides [`Sequence`], the per-participant counter that
//! producers and consumers advance and that a
//! [`SequenceGroup`](super::group::SequenceGroup) aggregates.

use std::fmt::{self, Debug, Display};
use std::sync::atomic::{AtomicI64, Ordering};

use crossbeam_utils::CachePadded;

use crate::sequences::{Cursored, Observable, Progress, INITIAL_VALUE};

/// A monotonic (by convention) progress counter.
///
/// The value lives in its own cache line so that sequences advanced by
/// different threads never invalidate each other's lines.
///
/// Identity matters: two sequences holding the same value are different
/// participants. Share them as `Arc<Sequence>`; groups compare handles with
/// [`Arc::ptr_eq`].
///
/// # Memory Ordering
///
/// | Operation | Ordering |
/// |-----------|----------|
/// | [`get`](Sequence::get) | `Acquire` |
/// | [`set`](Sequence::set) | `SeqCst` |
/// | [`lazy_set`](Sequence::lazy_set) | `Release` |
/// | [`compare_and_set`](Sequence::compare_and_set), [`add_and_get`](Sequence::add_and_get) | `AcqRel` |
///
/// # Examples
///
/// ```rust
/// use sequenze::sequences::sequence::Sequence;
/// use sequenze::sequences::INITIAL_VALUE;
///
/// let consumer = Sequence::default().with_name("consumer");
/// assert_eq!(consumer.get(), INITIAL_VALUE);
///
/// consumer.set(10);
/// assert_eq!(consumer.increment_and_get(), 11);
/// assert!(consumer.compare_and_set(11, 20));
/// assert_eq!(consumer.get(), 20);
/// ```
pub struct Sequence {
    name: &'static str,
    value: CachePadded<AtomicI64>,
}

impl Sequence {
    /// Creates a new sequence holding `initial`.
    ///
    /// This is a `const fn`, so sequences can live in statics:
    ///
    /// ```rust
    /// use sequenze::sequences::sequence::Sequence;
    ///
    /// static CURSOR: Sequence = Sequence::new(-1).with_name("cursor");
    /// CURSOR.set(7);
    /// assert_eq!(CURSOR.get(), 7);
    /// ```
    pub const fn new(initial: i64) -> Self {
        Sequence {
            name: "",
            value: CachePadded::new(AtomicI64::new(initial)),
        }
    }

    /// Sets the name of this sequence, returning `self` for method chaining.
    pub const fn with_name(self, name: &'static str) -> Self {
        Self { name, ..self }
    }

    /// Returns the current value.
    #[inline]
    pub fn get(&self) -> i64 {
        self.value.load(Ordering::Acquire)
    }

    /// Stores a value, immediately visible to every thread.
    #[inline]
    pub fn set(&self, value: i64) {
        self.value.store(value, Ordering::SeqCst);
    }

    /// Stores a value with release ordering only.
    ///
    /// Writes made before this call are visible to whoever observes the new
    /// value, but other threads may observe it with some delay.
    #[inline]
    pub fn lazy_set(&self, value: i64) {
        self.value.store(value, Ordering::Release);
    }

    /// Atomically replaces `expected` with `new`.
    ///
    /// Returns `true` if the value was `expected` and has been replaced.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use sequenze::sequences::sequence::Sequence;
    ///
    /// let sequence = Sequence::new(3);
    /// assert!(!sequence.compare_and_set(2, 9));
    /// assert!(sequence.compare_and_set(3, 9));
    /// assert_eq!(sequence.get(), 9);
    /// ```
    #[inline]
    pub fn compare_and_set(&self, expected: i64, new: i64) -> bool {
        self.value
            .compare_exchange(expected, new, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    /// Atomically increments the value by one, returning the new value.
    #[inline]
    pub fn increment_and_get(&self) -> i64 {
        self.add_and_get(1)
    }

    /// Atomically adds `increment`, returning the new value.
    #[inline]
    pub fn add_and_get(&self, increment: i64) -> i64 {
        self.value.fetch_add(increment, Ordering::AcqRel) + increment
    }
}

impl Progress for Sequence {
    #[inline]
    fn get(&self) -> i64 {
        Sequence::get(self)
    }

    #[inline]
    fn set(&self, value: i64) {
        Sequence::set(self, value)
    }

    #[inline]
    fn lazy_set(&self, value: i64) {
        Sequence::lazy_set(self, value)
    }
}

impl Cursored for Sequence {
    #[inline]
    fn cursor(&self) -> i64 {
        self.get()
    }
}

impl Observable for Sequence {
    #[inline]
    fn name(&self) -> &str {
        self.name
    }

    #[inline]
    fn value(&self) -> i64 {
        self.get()
    }
}

impl Default for Sequence {
    /// Creates an unnamed sequence holding [`INITIAL_VALUE`].
    fn default() -> Self {
        Self::new(INITIAL_VALUE)
    }
}

impl Display for Sequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.get())
    }
}

impl Debug for Sequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{{{}}}", self.name, self.get())
    }
}
