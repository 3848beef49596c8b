//! # Latsim - Latency topology simulation engine
//!
//! This library simulates network latency between cryptocurrency exchange
//! servers and cloud-provider regions: it builds a synthetic graph of
//! servers and their nearest compatible regions, continuously mutates edge
//! latencies with a bounded-history random walk, and answers time-windowed
//! aggregate queries over the result.
//!
//! ## Overview
//!
//! Latsim enables controlled, reproducible latency studies of exchange
//! connectivity without probing real infrastructure. An optional
//! best-effort connectivity sampler can measure real endpoints, but its
//! results are a side channel and never feed the simulated state.
//!
//! ## Architecture
//!
//! The library is organized into several modules:
//!
//! - `geo`: great-circle distance and latency estimation
//! - `topology`: node/edge types and initial graph construction
//! - `engine`: the random-walk simulator and its wall-clock tick runner
//! - `query`: visibility filtering and windowed statistics
//! - `store`: the authoritative state snapshot with subscriber notification
//! - `catalog`: the built-in server/region catalog and YAML loading
//! - `config`: typed configuration structures and YAML parsing
//! - `probe`: peripheral best-effort endpoint measurement
//! - `report`: JSON report generation for external consumers
//!
//! ## Example Usage
//!
//! ```rust
//! use latsim::catalog::Catalog;
//! use latsim::config::GeneralConfig;
//! use latsim::store::StateStore;
//!
//! let catalog = Catalog::builtin();
//! let general = GeneralConfig { seed: Some(42), ..GeneralConfig::default() };
//! let mut store = StateStore::new(catalog.servers, catalog.regions, &general, 0);
//!
//! // Drive the simulation explicitly (tests never need a wall clock)
//! store.advance_tick(5_000);
//! store.advance_tick(10_000);
//!
//! let summary = store.visible_summary();
//! assert_eq!(summary.active_count, store.edges().len());
//! ```
//!
//! ## Error Handling
//!
//! Fallible I/O boundaries (config, catalog, report files) return
//! `Result<T, color_eyre::eyre::Error>` with context; configuration and
//! catalog validation use dedicated `thiserror` enums. Core queries never
//! error: missing edges are `None`, empty windows and empty filter results
//! are explicit sentinels.

pub mod catalog;
pub mod config;
pub mod engine;
pub mod geo;
pub mod probe;
pub mod query;
pub mod report;
pub mod store;
pub mod topology;

// Re-export the types most consumers need
pub use engine::{LatencySimulator, SimulationState, TickRunner};
pub use query::{EdgeFilters, TimeWindow, VisibleSetSummary, WindowedStats};
pub use store::{Snapshot, StateStore, StoreEvent, SubscriberId};
pub use topology::{CloudProvider, CloudRegion, ExchangeServer, LatencyEdge, LatencySample, TimestampMs};
