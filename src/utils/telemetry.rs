//! Telemetry Module
//!
//! In-process counters for the estimate endpoint:
//! - estimates served / rejected (by error code)
//! - average estimate latency
//! - mean predicted price
//!
//! Privacy-first: no request fields are stored, only counts.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::models::errors::ErrorCode;

/// Aggregated statistics for reporting
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct TelemetryStats {
    /// Requests that reached the estimator
    pub total_requests: u64,
    /// Requests that produced a price
    pub total_estimates: u64,
    /// Requests rejected or failed
    pub total_rejected: u64,
    /// Rejections by error code
    pub rejected_by_code: HashMap<String, u64>,
    /// Average estimate latency (ms)
    pub avg_latency_ms: f64,
    /// Mean of all predicted prices
    pub mean_estimated_price: f64,
    /// Period start timestamp
    pub period_start: u64,
    /// Period end timestamp
    pub period_end: u64,
}

impl TelemetryStats {
    /// Export as JSON
    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_default()
    }
}

/// Main telemetry collector
pub struct TelemetryCollector {
    total_estimates: AtomicU64,
    total_rejected: AtomicU64,
    total_latency_us: AtomicU64,
    /// Signed sum of predicted prices, stored as `f64` bits
    total_price_bits: AtomicU64,
    rejected_by_code: RwLock<HashMap<&'static str, u64>>,
    session_start: u64,
    export_dir: PathBuf,
}

impl TelemetryCollector {
    /// Create new collector with default settings
    pub fn new() -> Self {
        Self::with_export_dir(PathBuf::from("./telemetry"))
    }

    pub fn with_export_dir(export_dir: PathBuf) -> Self {
        Self {
            total_estimates: AtomicU64::new(0),
            total_rejected: AtomicU64::new(0),
            total_latency_us: AtomicU64::new(0),
            total_price_bits: AtomicU64::new(0f64.to_bits()),
            rejected_by_code: RwLock::new(HashMap::new()),
            session_start: current_timestamp(),
            export_dir,
        }
    }

    /// Record a served estimate
    pub fn record_estimate(&self, price: f64, latency_us: u64) {
        self.total_estimates.fetch_add(1, Ordering::Relaxed);
        self.total_latency_us.fetch_add(latency_us, Ordering::Relaxed);
        // Negative predictions count as they are
        let _ = self
            .total_price_bits
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |bits| {
                Some((f64::from_bits(bits) + price).to_bits())
            });
    }

    /// Record a rejected or failed request
    pub fn record_rejection(&self, code: ErrorCode, latency_us: u64) {
        self.total_rejected.fetch_add(1, Ordering::Relaxed);
        self.total_latency_us.fetch_add(latency_us, Ordering::Relaxed);
        if let Ok(mut counts) = self.rejected_by_code.write() {
            *counts.entry(code.as_str()).or_insert(0) += 1;
        }
    }

    /// Get current statistics
    pub fn get_stats(&self) -> TelemetryStats {
        let total_estimates = self.total_estimates.load(Ordering::Relaxed);
        let total_rejected = self.total_rejected.load(Ordering::Relaxed);
        let total_latency_us = self.total_latency_us.load(Ordering::Relaxed);
        let total_price = f64::from_bits(self.total_price_bits.load(Ordering::Relaxed));
        let total_requests = total_estimates + total_rejected;

        let avg_latency_ms = if total_requests > 0 {
            total_latency_us as f64 / total_requests as f64 / 1000.0
        } else {
            0.0
        };

        let mean_estimated_price = if total_estimates > 0 {
            total_price / total_estimates as f64
        } else {
            0.0
        };

        let rejected_by_code = self
            .rejected_by_code
            .read()
            .map(|counts| counts.iter().map(|(k, v)| (k.to_string(), *v)).collect())
            .unwrap_or_default();

        TelemetryStats {
            total_requests,
            total_estimates,
            total_rejected,
            rejected_by_code,
            avg_latency_ms,
            mean_estimated_price,
            period_start: self.session_start,
            period_end: current_timestamp(),
        }
    }

    /// Export current stats to JSON file
    pub fn export_stats_json(&self) -> Result<PathBuf, std::io::Error> {
        fs::create_dir_all(&self.export_dir)?;
        let stats = self.get_stats();
        let path = self
            .export_dir
            .join(format!("stats_{}.json", current_timestamp()));
        fs::write(&path, stats.to_json())?;
        Ok(path)
    }
}

impl Default for TelemetryCollector {
    fn default() -> Self {
        Self::new()
    }
}

fn current_timestamp() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collector_basic() {
        let collector = TelemetryCollector::new();

        collector.record_estimate(400_000.0, 1_000);
        collector.record_estimate(600_000.0, 3_000);
        collector.record_rejection(ErrorCode::Validation, 2_000);

        let stats = collector.get_stats();
        assert_eq!(stats.total_requests, 3);
        assert_eq!(stats.total_estimates, 2);
        assert_eq!(stats.total_rejected, 1);
        assert_eq!(stats.rejected_by_code.get("VALIDATION_ERROR"), Some(&1));
        assert!((stats.avg_latency_ms - 2.0).abs() < 1e-9);
        assert!((stats.mean_estimated_price - 500_000.0).abs() < 1e-6);
    }

    #[test]
    fn test_mean_price_keeps_sign() {
        let collector = TelemetryCollector::new();
        collector.record_estimate(-1_000.0, 100);
        collector.record_estimate(3_000.0, 100);

        let stats = collector.get_stats();
        assert!((stats.mean_estimated_price - 1_000.0).abs() < 1e-9);
    }

    #[test]
    fn test_mean_price_handles_huge_values() {
        let collector = TelemetryCollector::new();
        collector.record_estimate(1e30, 100);
        collector.record_estimate(1e30, 100);

        let stats = collector.get_stats();
        assert!(stats.mean_estimated_price.is_finite());
        assert!((stats.mean_estimated_price / 1e30 - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_empty_stats() {
        let stats = TelemetryCollector::new().get_stats();
        assert_eq!(stats.total_requests, 0);
        assert_eq!(stats.avg_latency_ms, 0.0);
        assert_eq!(stats.mean_estimated_price, 0.0);
    }

    #[test]
    fn test_stats_json_export() {
        let dir = tempfile::tempdir().unwrap();
        let collector = TelemetryCollector::with_export_dir(dir.path().join("telemetry"));
        collector.record_estimate(123_456.78, 500);

        let path = collector.export_stats_json().unwrap();
        let json = std::fs::read_to_string(path).unwrap();
        assert!(json.contains("total_estimates"));
        assert!(json.contains("123456.78"));
    }
}
