//! Configuration module for pollwell.
//!
//! Loads configuration from environment variables with sensible defaults.

use std::env;

/// Monitor configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct MonitorConfig {
    /// Look-back window kept per target, in milliseconds (default: 24h).
    pub window_ms: i64,
    /// Width of one series bucket, in milliseconds (default: 60s).
    pub bucket_ms: i64,
    /// Per-subscriber pending-event buffer (default: 16).
    pub hub_capacity: usize,
    /// Uptime percentage reported when a series has no recorded points yet
    /// (default: 100.0). A policy choice, not a measurement.
    pub default_uptime: f64,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            window_ms: 86_400_000,
            bucket_ms: 60_000,
            hub_capacity: 16,
            default_uptime: 100.0,
        }
    }
}

impl MonitorConfig {
    /// Load configuration from environment variables.
    ///
    /// Environment variables:
    /// - `POLLWELL_WINDOW_MS`: look-back window (default: 86400000)
    /// - `POLLWELL_BUCKET_MS`: bucket width (default: 60000)
    /// - `POLLWELL_HUB_CAPACITY`: subscriber buffer size (default: 16)
    /// - `POLLWELL_DEFAULT_UPTIME`: no-data uptime percentage (default: 100.0)
    pub fn load() -> Self {
        let mut cfg = Self::default();

        if let Ok(v) = env::var("POLLWELL_WINDOW_MS") {
            if let Ok(ms) = v.parse::<i64>() {
                if ms > 0 {
                    cfg.window_ms = ms;
                }
            }
        }

        if let Ok(v) = env::var("POLLWELL_BUCKET_MS") {
            if let Ok(ms) = v.parse::<i64>() {
                if ms > 0 {
                    cfg.bucket_ms = ms;
                }
            }
        }

        if let Ok(v) = env::var("POLLWELL_HUB_CAPACITY") {
            if let Ok(n) = v.parse::<usize>() {
                if n > 0 {
                    cfg.hub_capacity = n;
                }
            }
        }

        if let Ok(v) = env::var("POLLWELL_DEFAULT_UPTIME") {
            if let Ok(p) = v.parse::<f64>() {
                if (0.0..=100.0).contains(&p) {
                    cfg.default_uptime = p;
                }
            }
        }

        cfg
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let cfg = MonitorConfig::default();
        assert_eq!(cfg.window_ms, 86_400_000);
        assert_eq!(cfg.bucket_ms, 60_000);
        assert_eq!(cfg.hub_capacity, 16);
        assert_eq!(cfg.default_uptime, 100.0);
    }
}
