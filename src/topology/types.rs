//! Core data types for the latency topology.
//!
//! Node types (exchange servers, cloud regions) are created once at
//! startup from the catalog and never mutated afterwards. Edges are
//! created once by the topology builder and mutated in place by the
//! simulator tick.

use std::collections::VecDeque;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Timestamp in milliseconds since the Unix epoch.
///
/// The engine never consults the wall clock itself; boundary code passes
/// `now` values in, which keeps every tick and query deterministic in tests.
pub type TimestampMs = i64;

/// Cloud provider hosting a region or an exchange server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CloudProvider {
    #[serde(rename = "AWS")]
    Aws,
    #[serde(rename = "GCP")]
    Gcp,
    #[serde(rename = "Azure")]
    Azure,
}

impl CloudProvider {
    /// All known providers, in catalog order.
    pub const ALL: [CloudProvider; 3] = [CloudProvider::Aws, CloudProvider::Gcp, CloudProvider::Azure];
}

impl fmt::Display for CloudProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CloudProvider::Aws => write!(f, "AWS"),
            CloudProvider::Gcp => write!(f, "GCP"),
            CloudProvider::Azure => write!(f, "Azure"),
        }
    }
}

/// An exchange server location.
///
/// `provider` records which cloud the exchange itself runs on and is used
/// to match the server to a same-provider region. `region` is a coarse
/// human-readable label ("Asia", "Europe"), not a foreign key.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExchangeServer {
    pub id: String,
    pub name: String,
    pub provider: CloudProvider,
    pub lat: f64,
    pub lng: f64,
    pub region: String,
    /// Optional `host:port` pair probed by the peripheral connectivity
    /// sampler. `None` excludes the server from probing entirely.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
}

impl ExchangeServer {
    pub fn position(&self) -> (f64, f64) {
        (self.lat, self.lng)
    }
}

/// A cloud provider region.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CloudRegion {
    pub id: String,
    pub provider: CloudProvider,
    pub name: String,
    pub lat: f64,
    pub lng: f64,
}

impl CloudRegion {
    pub fn position(&self) -> (f64, f64) {
        (self.lat, self.lng)
    }
}

/// One latency observation on an edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LatencySample {
    pub timestamp: TimestampMs,
    pub latency_ms: u32,
}

/// A directed simulated link from one exchange server to its assigned
/// cloud region.
///
/// Invariants, maintained by [`LatencyEdge::push_sample`]:
/// - `history` is never empty (it is seeded with one sample at construction);
/// - `current_latency_ms` equals the latency of the newest history entry;
/// - `history` holds at most the configured cap of samples, oldest evicted
///   first.
#[derive(Debug, Clone, Serialize)]
pub struct LatencyEdge {
    pub id: String,
    pub source_id: String,
    pub target_id: String,
    pub current_latency_ms: u32,
    history: VecDeque<LatencySample>,
}

impl LatencyEdge {
    /// Deterministic composite edge id for a server/region pair.
    pub fn edge_id(source_id: &str, target_id: &str) -> String {
        format!("{}__{}", source_id, target_id)
    }

    /// Create an edge seeded with a single history sample at `now`.
    pub fn new(source_id: &str, target_id: &str, latency_ms: u32, now: TimestampMs) -> Self {
        let mut history = VecDeque::new();
        history.push_back(LatencySample {
            timestamp: now,
            latency_ms,
        });
        Self {
            id: Self::edge_id(source_id, target_id),
            source_id: source_id.to_string(),
            target_id: target_id.to_string(),
            current_latency_ms: latency_ms,
            history,
        }
    }

    /// Append a sample, evicting the oldest entries past `cap`.
    pub fn push_sample(&mut self, timestamp: TimestampMs, latency_ms: u32, cap: usize) {
        self.history.push_back(LatencySample {
            timestamp,
            latency_ms,
        });
        while self.history.len() > cap {
            self.history.pop_front();
        }
        self.current_latency_ms = latency_ms;
    }

    /// Ordered-by-time history, oldest first.
    pub fn history(&self) -> &VecDeque<LatencySample> {
        &self.history
    }

    /// The newest sample. The history is seeded at construction, so this
    /// always exists.
    pub fn latest(&self) -> Option<&LatencySample> {
        self.history.back()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_edge_id_is_composite() {
        assert_eq!(LatencyEdge::edge_id("binance-tokyo", "aws-ap-northeast-1"), "binance-tokyo__aws-ap-northeast-1");
    }

    #[test]
    fn test_new_edge_seeds_one_sample() {
        let edge = LatencyEdge::new("a", "b", 42, 1000);
        assert_eq!(edge.history().len(), 1);
        assert_eq!(edge.current_latency_ms, 42);
        assert_eq!(edge.latest().unwrap().timestamp, 1000);
        assert_eq!(edge.latest().unwrap().latency_ms, 42);
    }

    #[test]
    fn test_push_sample_evicts_oldest_past_cap() {
        let mut edge = LatencyEdge::new("a", "b", 10, 0);
        for i in 1..=5 {
            edge.push_sample(i as TimestampMs, 10 + i, 3);
        }
        assert_eq!(edge.history().len(), 3);
        // Oldest surviving sample is the third push
        assert_eq!(edge.history().front().unwrap().timestamp, 3);
        assert_eq!(edge.current_latency_ms, 15);
        assert_eq!(edge.latest().unwrap().latency_ms, 15);
    }

    #[test]
    fn test_provider_serde_round_trip() {
        for provider in CloudProvider::ALL {
            let json = serde_json::to_string(&provider).unwrap();
            let back: CloudProvider = serde_json::from_str(&json).unwrap();
            assert_eq!(provider, back);
        }
        assert_eq!(serde_json::to_string(&CloudProvider::Aws).unwrap(), "\"AWS\"");
    }
}
