//! Latency simulation engine.
//!
//! `simulator` holds the random-walk engine itself; `runner` is the
//! wall-clock scheduler that drives it through the state store.

pub mod runner;
pub mod simulator;

pub use runner::TickRunner;
pub use simulator::{LatencySimulator, SimulationState, DEFAULT_HISTORY_CAP, DEFAULT_JITTER_MS};
