//! Prometheus observer for exporting sequence progress.
//!
//! This module provides [`PrometheusObserver`], which renders a collection of
//! [`Observable`] sequences in the Prometheus text exposition format using
//! the official `prometheus` crate.
//!
//! Every sequence is exported as a gauge: sequences are signed, start at
//! [`INITIAL_VALUE`](crate::sequences::INITIAL_VALUE) and may be reset by
//! [`Progress::set`](crate::sequences::Progress::set), none of which a
//! Prometheus counter can represent.
//!
//! # Feature Flag
//!
//! This module requires the `prometheus` feature:
//!
//! ```toml
//! [dependencies]
//! sequenze = { version = "0.1", features = ["prometheus"] }
//! ```
//!
//! # Examples
//!
//! ```rust,ignore
//! use sequenze::adapters::Labeled;
//! use sequenze::sequences::sequence::Sequence;
//! use sequenze::sequences::Observable;
//! use sequenze::observers::prometheus::PrometheusObserver;
//!
//! let orders = Labeled::new(Sequence::new(41).with_name("cursor")).with_label("ring", "orders");
//! let fills = Labeled::new(Sequence::new(7).with_name("cursor")).with_label("ring", "fills");
//!
//! let observer = PrometheusObserver::new()
//!     .with_namespace("exchange")
//!     .with_help("cursor", "Last published slot");
//!
//! let sequences: Vec<&dyn Observable> = vec![&orders, &fills];
//! println!("{}", observer.render(sequences.into_iter())?);
//! // # HELP exchange_cursor Last published slot
//! // # TYPE exchange_cursor gauge
//! // exchange_cursor{ring="fills"} 7
//! // exchange_cursor{ring="orders"} 41
//! ```

use std::collections::hash_map::Entry;
use std::collections::{BTreeMap, HashMap, HashSet};

use prometheus::{Encoder, IntGaugeVec, Opts, Registry, TextEncoder};

use crate::observers::{PrometheusError, Result};
use crate::sequences::Observable;

/// Observer that exports sequences as Prometheus gauges.
#[derive(Debug, Clone, Default)]
pub struct PrometheusObserver {
    /// Namespace (prefix) for all metrics.
    namespace: Option<String>,
    /// Subsystem for all metrics.
    subsystem: Option<String>,
    /// Constant labels applied to all metrics.
    const_labels: BTreeMap<String, String>,
    /// Help text keyed by raw sequence name.
    help: HashMap<String, String>,
}

/// A gauge family being assembled during one render.
struct Family {
    label_names: Vec<String>,
    series: HashSet<Vec<String>>,
    gauges: IntGaugeVec,
}

impl PrometheusObserver {
    /// Creates a new observer with no namespace and no labels.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the namespace (prefix) for all metrics.
    ///
    /// For example, namespace "myapp" + sequence "cursor" = "myapp_cursor".
    pub fn with_namespace(mut self, namespace: &str) -> Self {
        self.namespace = Some(namespace.to_string());
        self
    }

    /// Sets the subsystem, placed between namespace and sequence name.
    pub fn with_subsystem(mut self, subsystem: &str) -> Self {
        self.subsystem = Some(subsystem.to_string());
        self
    }

    /// Adds a constant label to all metrics.
    pub fn with_const_label(mut self, name: &str, value: &str) -> Self {
        self.const_labels
            .insert(name.to_string(), value.to_string());
        self
    }

    /// Sets the help text for the sequences named `name`.
    pub fn with_help(mut self, name: &str, help: &str) -> Self {
        self.help.insert(name.to_string(), help.to_string());
        self
    }

    /// Sanitizes a metric name to be Prometheus-compatible.
    ///
    /// Prometheus metric names must match `[a-zA-Z_:][a-zA-Z0-9_:]*`.
    fn sanitize_name(name: &str) -> String {
        let mut result: String = name
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || c == '_' || c == ':' {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        if result.is_empty() {
            result.push_str("unnamed");
        }
        if result.starts_with(|c: char| c.is_ascii_digit()) {
            result.insert(0, '_');
        }
        result
    }

    /// Sanitizes a label name: like metric names, without colons.
    fn sanitize_label_name(name: &str) -> String {
        Self::sanitize_name(name).replace(':', "_")
    }

    /// Builds the full metric name with namespace and subsystem.
    fn build_full_name(&self, name: &str) -> String {
        let sanitized = Self::sanitize_name(name);
        match (&self.namespace, &self.subsystem) {
            (Some(ns), Some(ss)) => format!("{}_{}_{}", ns, ss, sanitized),
            (Some(ns), None) => format!("{}_{}", ns, sanitized),
            (None, Some(ss)) => format!("{}_{}", ss, sanitized),
            (None, None) => sanitized,
        }
    }

    /// Renders sequences to Prometheus exposition format.
    ///
    /// Sequences sharing a name become one gauge family, distinguished by
    /// their labels. A fresh registry is used for every render.
    ///
    /// # Errors
    ///
    /// Returns an error if two sequences with the same name carry different
    /// label keys or identical labels, or if metric creation or encoding
    /// fails.
    pub fn render<'a>(&self, sequences: impl Iterator<Item = &'a dyn Observable>) -> Result<String> {
        let registry = Registry::new();
        let mut families: HashMap<String, Family> = HashMap::new();

        for sequence in sequences {
            let raw_name = if sequence.name().is_empty() {
                "unnamed"
            } else {
                sequence.name()
            };
            let full_name = self.build_full_name(raw_name);

            let mut labels: BTreeMap<String, String> = self
                .const_labels
                .iter()
                .map(|(k, v)| (Self::sanitize_label_name(k), v.clone()))
                .collect();
            labels.extend(
                sequence
                    .labels()
                    .iter()
                    .map(|(k, v)| (Self::sanitize_label_name(k), v.clone())),
            );
            let label_names: Vec<String> = labels.keys().cloned().collect();
            let label_values: Vec<&str> = labels.values().map(String::as_str).collect();

            let family = match families.entry(full_name.clone()) {
                Entry::Occupied(entry) => entry.into_mut(),
                Entry::Vacant(entry) => {
                    let help = self
                        .help
                        .get(raw_name)
                        .cloned()
                        .unwrap_or_else(|| format!("{} sequence", raw_name));
                    let names: Vec<&str> = label_names.iter().map(String::as_str).collect();
                    let gauges = IntGaugeVec::new(Opts::new(full_name.as_str(), help), &names)?;
                    registry.register(Box::new(gauges.clone()))?;
                    entry.insert(Family {
                        label_names: label_names.clone(),
                        series: HashSet::new(),
                        gauges,
                    })
                }
            };

            if family.label_names != label_names {
                return Err(PrometheusError::Metric(format!(
                    "sequence `{}` exported with label keys {:?}, expected {:?}",
                    full_name, label_names, family.label_names
                ))
                .into());
            }

            let series: Vec<String> = label_values.iter().map(|v| v.to_string()).collect();
            if !family.series.insert(series) {
                return Err(PrometheusError::Metric(format!(
                    "duplicate series `{}` with labels {:?}",
                    full_name, label_values
                ))
                .into());
            }

            family
                .gauges
                .get_metric_with_label_values(&label_values)?
                .set(sequence.value());
        }

        Self::encode_registry(&registry)
    }

    /// Renders sequences to bytes (useful for HTTP responses).
    ///
    /// # Errors
    ///
    /// Same as [`render`](PrometheusObserver::render).
    pub fn render_bytes<'a>(
        &self,
        sequences: impl Iterator<Item = &'a dyn Observable>,
    ) -> Result<Vec<u8>> {
        Ok(self.render(sequences)?.into_bytes())
    }

    fn encode_registry(registry: &Registry) -> Result<String> {
        let mut buffer = Vec::new();
        TextEncoder::new()
            .encode(&registry.gather(), &mut buffer)
            .map_err(|e| PrometheusError::Encode(e.to_string()))?;
        Ok(String::from_utf8(buffer)?)
    }
}
