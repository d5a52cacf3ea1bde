//! HTTP reachability prober.

use std::time::{Duration, Instant};

use async_trait::async_trait;

use super::{ProbeError, ProbeOutcome, Prober};
use crate::model::Target;

/// Probes a target with an HTTP HEAD request.
///
/// Any response at all, including error statuses, proves the target is
/// reachable and counts as up. A timeout or refused connection is a
/// definite down. DNS failures and other ambiguous transport errors are
/// returned as probe errors, which the sampler records as unknown.
pub struct HttpProber {
    client: reqwest::Client,
}

impl HttpProber {
    pub fn new() -> Result<Self, ProbeError> {
        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| ProbeError::Config(e.to_string()))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Prober for HttpProber {
    async fn probe(&self, target: &Target) -> Result<ProbeOutcome, ProbeError> {
        let url = normalize_url(&target.address);
        let timeout = Duration::from_millis(target.timeout_ms);

        // Jitter to avoid thundering herd when many targets share a cadence
        let jitter = rand::random::<u64>() % 100;
        tokio::time::sleep(Duration::from_millis(jitter)).await;

        let start = Instant::now();
        let result = self.client.head(&url).timeout(timeout).send().await;

        match result {
            Ok(_response) => Ok(ProbeOutcome::up(start.elapsed().as_secs_f64() * 1000.0)),
            Err(e) if e.is_timeout() => Ok(ProbeOutcome::down()),
            Err(e) if is_connection_refused(&e) => Ok(ProbeOutcome::down()),
            Err(e) => Err(ProbeError::Network(e.to_string())),
        }
    }
}

/// Prefix bare host addresses with a scheme.
fn normalize_url(address: &str) -> String {
    if address.starts_with("http://") || address.starts_with("https://") {
        address.to_string()
    } else {
        format!("http://{}", address)
    }
}

/// Walk the error source chain looking for a refused connection.
fn is_connection_refused(err: &reqwest::Error) -> bool {
    let mut source = std::error::Error::source(err);
    while let Some(e) = source {
        if let Some(io) = e.downcast_ref::<std::io::Error>() {
            if io.kind() == std::io::ErrorKind::ConnectionRefused {
                return true;
            }
        }
        source = e.source();
    }
    false
}
