//! Unified error type for all observers.
//!
//! Reading sequences never fails; errors only appear when observed values
//! are encoded for export. Every observer reports them through
//! [`ObserverError`], so exporters can be swapped without touching error
//! handling.

use thiserror::Error;

/// Unified error type for all observer operations.
#[derive(Debug, Error)]
pub enum ObserverError {
    /// Error from the JSON observer.
    #[cfg(feature = "json")]
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// Error from the Prometheus observer.
    #[cfg(feature = "prometheus")]
    #[error("prometheus error: {0}")]
    Prometheus(#[from] PrometheusError),

    /// Error encoding to UTF-8.
    #[error("utf8 error: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

/// Result type for observer operations.
pub type Result<T> = std::result::Result<T, ObserverError>;

/// Error type specific to Prometheus observer operations.
#[cfg(feature = "prometheus")]
#[derive(Debug, Error)]
pub enum PrometheusError {
    /// Error creating or registering a metric.
    #[error("metric error: {0}")]
    Metric(String),

    /// Error encoding metrics to text format.
    #[error("encode error: {0}")]
    Encode(String),
}

#[cfg(feature = "prometheus")]
impl From<prometheus::Error> for PrometheusError {
    fn from(err: prometheus::Error) -> Self {
        PrometheusError::Metric(err.to_string())
    }
}

#[cfg(feature = "prometheus")]
impl From<prometheus::Error> for ObserverError {
    fn from(err: prometheus::Error) -> Self {
        ObserverError::Prometheus(PrometheusError::from(err))
    }
}
