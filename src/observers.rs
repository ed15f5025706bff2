//! Observer implementations for exporting sequence progress.
//!
//! This module provides ways to render the current value of sequences and
//! gating groups, typically to watch how far each consumer trails the
//! producer:
//!
//! - [`table`] - Pretty-print sequences as tables using the `tabled` crate
//! - [`json`] - Serialize sequences to JSON format
//! - [`prometheus`] - Export sequences as gauges in Prometheus exposition format
//!
//! # Unified Error Handling
//!
//! All observers use a unified [`ObserverError`] type.
//!
//! # Feature Flags
//!
//! - `table` - Enables the [`table`] module
//! - `json` - Enables the [`json`] module
//! - `prometheus` - Enables the [`prometheus`] module
//! - `full` - Enables all observer modules
//!
//! # Example
//!
//! ```rust,ignore
//! use sequenze::sequences::Observable;
//! use sequenze::sequences::sequence::Sequence;
//! use sequenze::observers::Result;
//!
//! static CURSOR: Sequence = Sequence::new(-1).with_name("cursor");
//! static JOURNALER: Sequence = Sequence::new(-1).with_name("journaler");
//!
//! fn export_progress() -> Result<()> {
//!     let sequences: &[&'static dyn Observable] = &[&CURSOR, &JOURNALER];
//!
//!     #[cfg(feature = "prometheus")]
//!     {
//!         use sequenze::observers::prometheus::PrometheusObserver;
//!         let output = PrometheusObserver::new().render(sequences.iter().copied())?;
//!         println!("{}", output);
//!     }
//!
//!     Ok(())
//! }
//! ```

mod error;

pub use error::{ObserverError, Result};

#[cfg(feature = "prometheus")]
pub use error::PrometheusError;

#[cfg(feature = "table")]
pub mod table;

#[cfg(feature = "json")]
pub mod json;

#[cfg(feature = "prometheus")]
pub mod prometheus;
