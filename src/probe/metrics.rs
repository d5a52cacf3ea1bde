//! Metrics-pull prober: reads a numeric gauge from a JSON endpoint.

use async_trait::async_trait;
use serde_json::Value;

use super::{ProbeError, ProbeOutcome, Prober};
use crate::model::Target;

/// Pulls a JSON document from the target address and extracts one numeric
/// reading by dotted field path (e.g. `"node.cpu_percent"`).
///
/// A finite reading means the source is up, with the value carried as the
/// sample's numeric reading. Transport or parse failures are probe errors;
/// the sampler records those periods as unknown.
pub struct MetricsProber {
    client: reqwest::Client,
    field_path: Vec<String>,
}

impl MetricsProber {
    pub fn new(field_path: &str) -> Result<Self, ProbeError> {
        if field_path.is_empty() {
            return Err(ProbeError::Config("empty metric field path".to_string()));
        }
        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| ProbeError::Config(e.to_string()))?;
        Ok(Self {
            client,
            field_path: field_path.split('.').map(str::to_string).collect(),
        })
    }
}

#[async_trait]
impl Prober for MetricsProber {
    async fn probe(&self, target: &Target) -> Result<ProbeOutcome, ProbeError> {
        let response = self
            .client
            .get(&target.address)
            .timeout(std::time::Duration::from_millis(target.timeout_ms))
            .send()
            .await
            .map_err(|e| ProbeError::Network(e.to_string()))?;

        let body: Value = response
            .json()
            .await
            .map_err(|e| ProbeError::Network(format!("invalid metrics payload: {}", e)))?;

        let reading = extract_number(&body, &self.field_path).ok_or_else(|| {
            ProbeError::Config(format!(
                "metric field '{}' missing or not numeric",
                self.field_path.join(".")
            ))
        })?;

        Ok(ProbeOutcome::up(reading))
    }
}

/// Navigate a dotted path through a JSON document to a finite number.
fn extract_number(value: &Value, path: &[String]) -> Option<f64> {
    let mut current = value;
    for key in path {
        current = current.get(key)?;
    }
    current.as_f64().filter(|v| v.is_finite())
}
