//! # Sequenze - Lock-Free Gating Groups of Progress Sequences
//!
//! A Rust library for coordinating producers and consumers around a shared
//! ring of slots. Each participant advances its own [`Sequence`](sequences::sequence::Sequence);
//! a producer must never overtake the slowest consumer, so it gates on a
//! [`SequenceGroup`](sequences::group::SequenceGroup) whose value is the
//! minimum of its members.
//!
//! ## The Problem
//!
//! The set of consumers is not fixed: handlers join while the pipeline is
//! running and leave when they shut down. A gating set protected by a mutex
//! would make every producer read contend with every membership change, and a
//! reader preempted while holding the lock would stall the producer.
//!
//! ## The Solution: Copy-on-Write Membership
//!
//! A group stores its members in an immutable vector behind a single atomic
//! pointer.
//!
//! 1. **Wait-free reads**: `get()` and `size()` load the pointer once and scan
//!    the vector. They never retry and never wait on a writer.
//!
//! 2. **Lock-free writes**: `add()` and `remove()` copy the vector, apply the
//!    change and publish the copy with a compare-and-swap, recomputing from
//!    the winner if another writer got there first. Contended attempts back
//!    off with [`crossbeam_utils::Backoff`].
//!
//! 3. **Safe reclamation**: replaced vectors are freed by
//!    [`crossbeam_epoch`] once no reader can still see them.
//!
//! 4. **No false sharing**: every sequence sits in its own cache line
//!    ([`crossbeam_utils::CachePadded`]), so consumers advancing neighbouring
//!    sequences do not slow each other down.
//!
//! ## Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use sequenze::sequences::group::SequenceGroup;
//! use sequenze::sequences::sequence::Sequence;
//! use sequenze::sequences::UNINITIALIZED;
//!
//! let gating = SequenceGroup::new().with_name("consumers");
//! assert_eq!(gating.get(), UNINITIALIZED);
//!
//! let journaler = Arc::new(Sequence::new(10));
//! let replicator = Arc::new(Sequence::new(7));
//! gating.add(Arc::clone(&journaler));
//! gating.add(Arc::clone(&replicator));
//!
//! // The producer may claim slots up to the slowest consumer.
//! assert_eq!(gating.get(), 7);
//!
//! replicator.set(12);
//! assert_eq!(gating.get(), 10);
//!
//! // Consumers can leave at any time.
//! assert!(gating.remove(&journaler));
//! assert_eq!(gating.get(), 12);
//! ```
//!
//! ## Thread Safety
//!
//! `Sequence` and `SequenceGroup` are `Send + Sync`; share them with `Arc`.
//! The value of a group is read member by member, so it is a lower bound on
//! the consumers' progress, never a value ahead of it.
//!
//! ## Logging
//!
//! Membership changes are reported through [`tracing`] at `debug` level and
//! lost compare-and-swap races at `trace` level. The library never installs
//! a subscriber.
//!
//! ## Observers
//!
//! Optional modules export the current progress of sequences and groups:
//!
//! | Feature | Module | Description |
//! |---------|--------|-------------|
//! | `table` | `observers::table` | Pretty-print progress as ASCII tables |
//! | `json` | `observers::json` | Serialize progress to JSON |
//! | `prometheus` | `observers::prometheus` | Export gauges in Prometheus exposition format |
//! | `full` | All observers | Enables all observer modules |

pub mod adapters;
pub mod observers;
pub mod sequences;

#[cfg(feature = "serde")]
pub mod snapshot;
