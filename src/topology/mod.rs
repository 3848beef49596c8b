//! Network topology module.
//!
//! Types for the synthetic server/region graph and the one-shot builder
//! that assigns each exchange server to its nearest compatible cloud
//! region.

pub mod builder;
pub mod types;

// Re-export key types and functions for easier access
pub use builder::{assign_nearest_region, build_initial_edges};
pub use types::{CloudProvider, CloudRegion, ExchangeServer, LatencyEdge, LatencySample, TimestampMs};
