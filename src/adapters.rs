//! Wrapper types for extending sequence functionality.
//!
//! This module provides wrappers that add behavior to sequences and groups
//! while keeping them usable through the [`Observable`](crate::sequences::Observable)
//! and [`Progress`](crate::sequences::Progress) traits.
//!
//! | Wrapper | Description |
//! |---------|-------------|
//! | [`Labeled`] | Adds key-value labels to a sequence or group |

mod labeled;

pub use labeled::Labeled;
