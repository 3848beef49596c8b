//! JSON report generation for external consumers.
//!
//! The machine-readable analogue of a dashboard view: the full state
//! snapshot, per-edge statistics over the store's current time window,
//! the visible-set summary, and (when probing ran) the measured endpoint
//! latencies.

use std::fs;
use std::path::Path;

use color_eyre::eyre::WrapErr;
use color_eyre::Result;
use serde::Serialize;

use crate::probe::ProbeLatencyMap;
use crate::query::{windowed_stats, TimeWindow, VisibleSetSummary, WindowedStats};
use crate::store::{Snapshot, StateStore};
use crate::topology::types::TimestampMs;

/// Windowed statistics for one edge.
#[derive(Debug, Serialize)]
pub struct EdgeWindowReport {
    pub edge_id: String,
    pub window: TimeWindow,
    pub stats: WindowedStats,
}

/// Full simulation report.
#[derive(Debug, Serialize)]
pub struct SimulationReport {
    pub generated_at: TimestampMs,
    pub snapshot: Snapshot,
    pub summary: VisibleSetSummary,
    pub edge_windows: Vec<EdgeWindowReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub probe_latencies: Option<ProbeLatencyMap>,
}

/// Assemble a report from the store's current state.
pub fn build_report(
    store: &StateStore,
    now: TimestampMs,
    probe_latencies: Option<ProbeLatencyMap>,
) -> SimulationReport {
    let window = store.time_window();
    let edge_windows = store
        .edges()
        .iter()
        .map(|edge| EdgeWindowReport {
            edge_id: edge.id.clone(),
            window,
            stats: windowed_stats(edge, now, window.window_ms()),
        })
        .collect();

    SimulationReport {
        generated_at: now,
        snapshot: store.snapshot(),
        summary: store.visible_summary(),
        edge_windows,
        probe_latencies,
    }
}

/// Serialize a report to pretty-printed JSON at `path`.
pub fn write_report(report: &SimulationReport, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(report)
        .wrap_err("Failed to serialize simulation report")?;
    fs::write(path, json)
        .wrap_err_with(|| format!("Failed to write report to '{}'", path.display()))?;
    log::info!("Wrote simulation report: {:?}", path);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;
    use crate::config::GeneralConfig;
    use tempfile::tempdir;

    fn reported_store() -> StateStore {
        let catalog = Catalog::builtin();
        let general = GeneralConfig {
            seed: Some(5),
            ..GeneralConfig::default()
        };
        let mut store = StateStore::new(catalog.servers, catalog.regions, &general, 0);
        for n in 1..=3 {
            store.advance_tick(n * 5_000);
        }
        store
    }

    #[test]
    fn test_report_covers_every_edge() {
        let store = reported_store();
        let report = build_report(&store, 15_000, None);

        assert_eq!(report.edge_windows.len(), store.edges().len());
        assert_eq!(report.summary.active_count, store.visible_edges().len());
        for edge_window in &report.edge_windows {
            assert_eq!(edge_window.window, TimeWindow::OneHour);
            assert_eq!(edge_window.stats.samples.len(), 4);
        }
    }

    #[test]
    fn test_report_round_trips_through_json() {
        let store = reported_store();
        let report = build_report(&store, 15_000, Some(ProbeLatencyMap::new()));
        let json = serde_json::to_string(&report).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["generated_at"], 15_000);
        assert!(value["snapshot"]["edges"].as_array().unwrap().len() > 0);
    }

    #[test]
    fn test_write_report_creates_file() {
        let store = reported_store();
        let report = build_report(&store, 15_000, None);
        let dir = tempdir().unwrap();
        let path = dir.path().join("report.json");

        write_report(&report, &path).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("\"edge_windows\""));
    }
}
