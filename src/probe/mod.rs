//! Prober abstraction for health-checking targets.
//!
//! Implementations are pluggable: the scheduler only sees the [`Prober`]
//! trait and converts outcomes and errors into samples.

mod http;
mod metrics;

pub use http::*;
pub use metrics::*;

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use crate::model::Target;

/// Probe error types.
///
/// These never propagate past the sampler; a failed probe becomes an
/// `Unknown` sample so the pipeline keeps producing a signal.
#[derive(Error, Debug)]
pub enum ProbeError {
    #[error("probe timed out after {0:?}")]
    Timeout(Duration),
    #[error("network error: {0}")]
    Network(String),
    #[error("invalid configuration: {0}")]
    Config(String),
}

/// Result of one completed probe.
#[derive(Debug, Clone, Copy)]
pub struct ProbeOutcome {
    /// Whether the target answered as healthy.
    pub up: bool,
    /// Numeric reading for graded probes (latency or pulled metric).
    pub latency_ms: Option<f64>,
}

impl ProbeOutcome {
    pub fn up(latency_ms: f64) -> Self {
        Self {
            up: true,
            latency_ms: Some(latency_ms),
        }
    }

    pub fn down() -> Self {
        Self {
            up: false,
            latency_ms: None,
        }
    }
}

/// A pluggable health check for a target.
///
/// `Ok(outcome)` is a completed observation (up or down). `Err` means the
/// probe could not produce a verdict at all; the caller records the period
/// as unknown rather than treating it as an outage.
#[async_trait]
pub trait Prober: Send + Sync {
    async fn probe(&self, target: &Target) -> Result<ProbeOutcome, ProbeError>;
}
