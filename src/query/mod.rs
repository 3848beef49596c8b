//! Windowed statistics and visibility filtering.
//!
//! Pure reads over the simulator's edge set: which edges pass the current
//! filters, and what the latency statistics look like over a trailing time
//! window. Empty results are legitimate and reported through explicit
//! sentinels (`None` statistics, empty sample lists), never as errors and
//! never as zero-valued data.

use serde::{Deserialize, Serialize};

use crate::topology::types::{
    CloudProvider, CloudRegion, ExchangeServer, LatencyEdge, LatencySample, TimestampMs,
};

/// Default upper latency bound for the visibility filter, in milliseconds.
pub const DEFAULT_MAX_LATENCY_MS: u32 = 300;

/// Trailing time span used to filter an edge's history for statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum TimeWindow {
    #[default]
    #[serde(rename = "1h")]
    OneHour,
    #[serde(rename = "24h")]
    TwentyFourHours,
    #[serde(rename = "7d")]
    SevenDays,
    #[serde(rename = "30d")]
    ThirtyDays,
}

impl TimeWindow {
    pub const ALL: [TimeWindow; 4] = [
        TimeWindow::OneHour,
        TimeWindow::TwentyFourHours,
        TimeWindow::SevenDays,
        TimeWindow::ThirtyDays,
    ];

    /// Window span in milliseconds.
    pub fn window_ms(self) -> i64 {
        match self {
            TimeWindow::OneHour => 60 * 60 * 1_000,
            TimeWindow::TwentyFourHours => 24 * 60 * 60 * 1_000,
            TimeWindow::SevenDays => 7 * 24 * 60 * 60 * 1_000,
            TimeWindow::ThirtyDays => 30 * 24 * 60 * 60 * 1_000,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            TimeWindow::OneHour => "1h",
            TimeWindow::TwentyFourHours => "24h",
            TimeWindow::SevenDays => "7d",
            TimeWindow::ThirtyDays => "30d",
        }
    }
}

/// Query-time visibility filters. Not persisted to edges.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeFilters {
    /// Providers whose servers' edges are visible.
    pub providers: Vec<CloudProvider>,
    /// Exchange-id allow-list; empty means all exchanges are allowed.
    pub exchanges: Vec<String>,
    pub min_latency_ms: u32,
    pub max_latency_ms: u32,
}

impl Default for EdgeFilters {
    fn default() -> Self {
        Self {
            providers: CloudProvider::ALL.to_vec(),
            exchanges: Vec::new(),
            min_latency_ms: 0,
            max_latency_ms: DEFAULT_MAX_LATENCY_MS,
        }
    }
}

/// Select the edges visible under the given filters.
///
/// An edge is visible iff its source server and target region both exist,
/// the source server's provider is in `filters.providers`, the exchange
/// allow-list is empty or contains the source id, the current latency lies
/// within the inclusive `[min, max]` bounds, and the external
/// `servers_visible` display toggle is on. A missing referenced node makes
/// the edge not-visible rather than erroring.
///
/// Widening any filter (more providers, a cleared allow-list, wider
/// latency bounds) can only add edges to the result, never remove any.
pub fn filter_visible_edges<'a>(
    edges: &'a [LatencyEdge],
    servers: &[ExchangeServer],
    regions: &[CloudRegion],
    filters: &EdgeFilters,
    servers_visible: bool,
) -> Vec<&'a LatencyEdge> {
    if !servers_visible {
        return Vec::new();
    }

    edges
        .iter()
        .filter(|edge| {
            let server = match servers.iter().find(|s| s.id == edge.source_id) {
                Some(server) => server,
                None => return false,
            };
            if !regions.iter().any(|r| r.id == edge.target_id) {
                return false;
            }
            if !filters.providers.contains(&server.provider) {
                return false;
            }
            if !filters.exchanges.is_empty() && !filters.exchanges.contains(&server.id) {
                return false;
            }
            (filters.min_latency_ms..=filters.max_latency_ms).contains(&edge.current_latency_ms)
        })
        .collect()
}

/// Statistics over the samples of one edge falling inside a trailing
/// window. All statistic fields are `None` when no sample qualifies:
/// insufficient data, not an error.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WindowedStats {
    pub samples: Vec<LatencySample>,
    pub min_ms: Option<u32>,
    pub max_ms: Option<u32>,
    pub avg_ms: Option<f64>,
}

impl WindowedStats {
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    fn empty() -> Self {
        Self {
            samples: Vec::new(),
            min_ms: None,
            max_ms: None,
            avg_ms: None,
        }
    }
}

/// Compute min/max/avg over the edge samples with
/// `now - timestamp <= window_ms`.
pub fn windowed_stats(edge: &LatencyEdge, now: TimestampMs, window_ms: i64) -> WindowedStats {
    let samples: Vec<LatencySample> = edge
        .history()
        .iter()
        .filter(|s| now - s.timestamp <= window_ms)
        .copied()
        .collect();

    if samples.is_empty() {
        return WindowedStats::empty();
    }

    let mut min = u32::MAX;
    let mut max = 0u32;
    let mut sum = 0u64;
    for s in &samples {
        min = min.min(s.latency_ms);
        max = max.max(s.latency_ms);
        sum += u64::from(s.latency_ms);
    }
    let avg = sum as f64 / samples.len() as f64;

    WindowedStats {
        min_ms: Some(min),
        max_ms: Some(max),
        avg_ms: Some(avg),
        samples,
    }
}

/// Aggregate metrics over a visible edge set.
///
/// `avg_latency_ms` and `max_latency_ms` are `None` (not zero) for an
/// empty set.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VisibleSetSummary {
    pub active_count: usize,
    pub avg_latency_ms: Option<f64>,
    pub max_latency_ms: Option<u32>,
}

/// Summarize the current latencies of a visible edge set.
pub fn summarize_visible(visible: &[&LatencyEdge]) -> VisibleSetSummary {
    if visible.is_empty() {
        return VisibleSetSummary {
            active_count: 0,
            avg_latency_ms: None,
            max_latency_ms: None,
        };
    }

    let sum: u64 = visible.iter().map(|e| u64::from(e.current_latency_ms)).sum();
    let max = visible.iter().map(|e| e.current_latency_ms).max();

    VisibleSetSummary {
        active_count: visible.len(),
        avg_latency_ms: Some(sum as f64 / visible.len() as f64),
        max_latency_ms: max,
    }
}
