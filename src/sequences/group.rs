//! Lock-free, dynamically sized group of sequences.
//!
//! This module provides [`SequenceGroup`], which aggregates any number of
//! [`Sequence`]s into a single virtual sequence whose value is the minimum of
//! its members. Members can be added and removed while other threads read
//! the group.
//!
//! # Algorithm
//!
//! The group holds one atomic pointer to an immutable `Vec<Arc<Sequence>>`.
//!
//! - **Reads** (`get`, `size`, `members`) pin the current epoch, load the
//!   pointer with `Acquire` and scan the vector. No retry loop.
//! - **Writes** (`add`, `remove`) copy the current vector, apply the change
//!   and publish the copy with a compare-and-swap (`AcqRel`). If another
//!   thread published first, the change is recomputed against the vector
//!   that won.
//! - Replaced vectors are handed to `crossbeam-epoch`, which frees them once
//!   no pinned reader can still hold a reference.
//!
//! # Examples
//!
//! ```rust
//! use std::sync::Arc;
//! use sequenze::sequences::group::SequenceGroup;
//! use sequenze::sequences::sequence::Sequence;
//!
//! let fast = Arc::new(Sequence::new(120));
//! let slow = Arc::new(Sequence::new(87));
//!
//! let gating = SequenceGroup::new().with_name("consumers");
//! gating.add(Arc::clone(&fast));
//! gating.add(Arc::clone(&slow));
//!
//! // The producer may not wrap past the slowest consumer.
//! assert_eq!(gating.get(), 87);
//!
//! assert!(gating.remove(&slow));
//! assert_eq!(gating.get(), 120);
//! ```

use std::fmt::{self, Debug};
use std::sync::atomic::Ordering;
use std::sync::Arc;

use crossbeam_epoch::{self as epoch, Atomic, Guard, Owned};
use crossbeam_utils::Backoff;
use tracing::{debug, trace};

use crate::sequences::sequence::Sequence;
use crate::sequences::{minimum_sequence, Cursored, Observable, Progress, UNINITIALIZED};

/// A group of sequences that behaves as a single sequence.
///
/// Reading the group returns the minimum value of its members, or
/// [`UNINITIALIZED`] when it has none. Writing the group writes every member.
///
/// Membership is identity based: the same `Arc<Sequence>` may be added more
/// than once, and [`remove`](SequenceGroup::remove) drops **every**
/// occurrence of the given handle in one call.
///
/// # Consistency
///
/// The membership seen by a reader is always one that actually existed.
/// Member values, however, are read one at a time, so [`get`](SequenceGroup::get)
/// is a lower bound on the members' progress at the time of the call, not an
/// atomic snapshot across members. Likewise [`set`](SequenceGroup::set) and
/// [`lazy_set`](SequenceGroup::lazy_set) update members one after the other.
pub struct SequenceGroup {
    name: &'static str,
    sequences: Atomic<Vec<Arc<Sequence>>>,
}

impl SequenceGroup {
    /// Creates an empty group.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use sequenze::sequences::group::SequenceGroup;
    /// use sequenze::sequences::UNINITIALIZED;
    ///
    /// let group = SequenceGroup::new();
    /// assert_eq!(group.size(), 0);
    /// assert_eq!(group.get(), UNINITIALIZED);
    /// ```
    pub fn new() -> Self {
        SequenceGroup {
            name: "",
            sequences: Atomic::new(Vec::new()),
        }
    }

    /// Sets the name of this group, returning `self` for method chaining.
    pub fn with_name(mut self, name: &'static str) -> Self {
        self.name = name;
        self
    }

    /// Returns the snapshot published at the time of the call.
    #[inline]
    fn snapshot<'g>(&self, guard: &'g Guard) -> &'g [Arc<Sequence>] {
        let current = self.sequences.load(Ordering::Acquire, guard);
        // SAFETY: the pointer is never null, and a replaced snapshot is only
        // destroyed through `defer_destroy`, after `guard` is dropped.
        unsafe { current.deref() }
    }

    /// Publishes the snapshot computed by `f` from the current one.
    ///
    /// `f` is called again with the winning snapshot whenever another thread
    /// publishes first. Returning `None` leaves the group untouched. Returns
    /// whether a new snapshot was published.
    fn update<F>(&self, mut f: F) -> bool
    where
        F: FnMut(&[Arc<Sequence>]) -> Option<Vec<Arc<Sequence>>>,
    {
        let guard = &epoch::pin();
        let backoff = Backoff::new();
        let mut current = self.sequences.load(Ordering::Acquire, guard);

        loop {
            // SAFETY: see `snapshot`.
            let members = unsafe { current.deref() };
            let next = match f(members) {
                Some(next) => next,
                None => return false,
            };

            match self.sequences.compare_exchange(
                current,
                Owned::new(next),
                Ordering::AcqRel,
                Ordering::Acquire,
                guard,
            ) {
                Ok(_) => {
                    // SAFETY: `current` is no longer reachable from the group;
                    // readers still holding it are pinned.
                    unsafe { guard.defer_destroy(current) };
                    return true;
                }
                Err(err) => {
                    trace!(group = self.name, "snapshot replaced concurrently, retrying");
                    current = err.current;
                    backoff.spin();
                }
            }
        }
    }

    /// Adds a sequence to the group.
    ///
    /// Duplicates are allowed. Once this returns, the sequence is part of
    /// every snapshot until it is removed; concurrent adds are never lost.
    pub fn add(&self, sequence: Arc<Sequence>) {
        self.add_all(std::slice::from_ref(&sequence));
    }

    /// Adds several sequences at once.
    ///
    /// All of them become visible in the same snapshot.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use std::sync::Arc;
    /// use sequenze::sequences::group::SequenceGroup;
    /// use sequenze::sequences::sequence::Sequence;
    ///
    /// let group = SequenceGroup::new();
    /// group.add_all(&[Arc::new(Sequence::new(4)), Arc::new(Sequence::new(2))]);
    /// assert_eq!(group.size(), 2);
    /// assert_eq!(group.get(), 2);
    /// ```
    pub fn add_all(&self, sequences: &[Arc<Sequence>]) {
        if sequences.is_empty() {
            return;
        }

        let mut size = 0;
        self.update(|members| {
            let mut next = Vec::with_capacity(members.len() + sequences.len());
            next.extend_from_slice(members);
            next.extend_from_slice(sequences);
            size = next.len();
            Some(next)
        });
        debug!(group = self.name, added = sequences.len(), size, "sequences added");
    }

    /// Adds a sequence to a group that is already gating a running producer.
    ///
    /// The sequence is set to `cursor` before it becomes visible and again
    /// once it is published, so a late joiner starts at the producer's
    /// position instead of pulling the gating value back to wherever the new
    /// sequence happened to be.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use std::sync::Arc;
    /// use sequenze::sequences::group::SequenceGroup;
    /// use sequenze::sequences::sequence::Sequence;
    ///
    /// let cursor = Sequence::new(1024);
    /// let group = SequenceGroup::new();
    ///
    /// let late = Arc::new(Sequence::default());
    /// group.add_while_running(&cursor, Arc::clone(&late));
    ///
    /// assert_eq!(late.get(), 1024);
    /// assert_eq!(group.get(), 1024);
    /// ```
    pub fn add_while_running<C>(&self, cursor: &C, sequence: Arc<Sequence>)
    where
        C: Cursored + ?Sized,
    {
        let mut size = 0;
        self.update(|members| {
            sequence.set(cursor.cursor());
            let mut next = Vec::with_capacity(members.len() + 1);
            next.extend_from_slice(members);
            next.push(Arc::clone(&sequence));
            size = next.len();
            Some(next)
        });
        sequence.set(cursor.cursor());
        debug!(group = self.name, size, "sequence added while running");
    }

    /// Removes every occurrence of `sequence` from the group.
    ///
    /// Members are matched by identity, not by value. Returns `true` if at
    /// least one occurrence was removed, `false` if the sequence was not a
    /// member (the group is left untouched).
    ///
    /// # Examples
    ///
    /// ```rust
    /// use std::sync::Arc;
    /// use sequenze::sequences::group::SequenceGroup;
    /// use sequenze::sequences::sequence::Sequence;
    ///
    /// let member = Arc::new(Sequence::new(0));
    /// let stranger = Sequence::new(0);
    ///
    /// let group = SequenceGroup::new();
    /// group.add(Arc::clone(&member));
    /// group.add(Arc::clone(&member));
    ///
    /// assert!(!group.remove(&stranger));
    /// assert!(group.remove(&member));
    /// assert_eq!(group.size(), 0);
    /// ```
    pub fn remove(&self, sequence: &Sequence) -> bool {
        let mut removed = 0;
        let mut size = 0;
        let changed = self.update(|members| {
            removed = members
                .iter()
                .filter(|member| is_same(member, sequence))
                .count();
            if removed == 0 {
                return None;
            }
            let next: Vec<_> = members
                .iter()
                .filter(|member| !is_same(member, sequence))
                .cloned()
                .collect();
            size = next.len();
            Some(next)
        });

        if changed {
            debug!(group = self.name, removed, size, "sequence removed");
        }
        changed
    }

    /// Returns `true` if `sequence` is currently a member.
    pub fn contains(&self, sequence: &Sequence) -> bool {
        let guard = &epoch::pin();
        self.snapshot(guard)
            .iter()
            .any(|member| is_same(member, sequence))
    }

    /// Returns the number of members at the time of the call.
    ///
    /// Concurrent adds and removes may change it as soon as this returns.
    pub fn size(&self) -> usize {
        let guard = &epoch::pin();
        self.snapshot(guard).len()
    }

    /// Returns `true` if the group has no members.
    pub fn is_empty(&self) -> bool {
        self.size() == 0
    }

    /// Returns a copy of the current membership, in insertion order.
    pub fn members(&self) -> Vec<Arc<Sequence>> {
        let guard = &epoch::pin();
        self.snapshot(guard).to_vec()
    }

    /// Returns the minimum value of the members, or [`UNINITIALIZED`] if the
    /// group is empty.
    ///
    /// Wait-free: a single load of the membership and one read per member.
    #[inline]
    pub fn get(&self) -> i64 {
        let guard = &epoch::pin();
        let members = self.snapshot(guard);
        if members.is_empty() {
            UNINITIALIZED
        } else {
            minimum_sequence(members, i64::MAX)
        }
    }

    /// Sets every current member to `value`.
    ///
    /// Members are written one after the other; a concurrent reader may see
    /// a mix of old and new values. Meant for initialization and reset.
    pub fn set(&self, value: i64) {
        let guard = &epoch::pin();
        for member in self.snapshot(guard) {
            member.set(value);
        }
    }

    /// Lazily sets every current member to `value`.
    ///
    /// Same as [`set`](SequenceGroup::set) but with
    /// [`Sequence::lazy_set`] on each member.
    pub fn lazy_set(&self, value: i64) {
        let guard = &epoch::pin();
        for member in self.snapshot(guard) {
            member.lazy_set(value);
        }
    }
}

#[inline]
fn is_same(member: &Arc<Sequence>, sequence: &Sequence) -> bool {
    std::ptr::eq(Arc::as_ptr(member), sequence)
}

impl Progress for SequenceGroup {
    #[inline]
    fn get(&self) -> i64 {
        SequenceGroup::get(self)
    }

    #[inline]
    fn set(&self, value: i64) {
        SequenceGroup::set(self, value)
    }

    #[inline]
    fn lazy_set(&self, value: i64) {
        SequenceGroup::lazy_set(self, value)
    }
}

impl Observable for SequenceGroup {
    #[inline]
    fn name(&self) -> &str {
        self.name
    }

    /// Returns the gating value of the group.
    #[inline]
    fn value(&self) -> i64 {
        self.get()
    }
}

impl Default for SequenceGroup {
    fn default() -> Self {
        Self::new()
    }
}

impl Debug for SequenceGroup {
    /// Formats the group as `name[member, ...]`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let guard = &epoch::pin();
        write!(f, "{}", self.name)?;
        f.debug_list().entries(self.snapshot(guard)).finish()
    }
}

impl Drop for SequenceGroup {
    fn drop(&mut self) {
        // SAFETY: `&mut self` means no other thread can reach the snapshot.
        unsafe {
            let guard = epoch::unprotected();
            drop(self.sequences.load(Ordering::Relaxed, guard).into_owned());
        }
    }
}
