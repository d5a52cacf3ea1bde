//! Error taxonomy for registry and store operations.
//!
//! Probe-level failures are deliberately absent: they are absorbed by the
//! sampler and recorded as `Unknown` samples rather than surfaced as errors.

use thiserror::Error;

/// Errors returned synchronously by Coordinator and SeriesStore operations.
#[derive(Error, Debug)]
pub enum MonitorError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("target not found: {0}")]
    NotFound(String),
}
