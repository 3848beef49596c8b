//! The latency random-walk engine.
//!
//! Owns the edge set produced by the topology builder and advances every
//! edge's latency one discrete step at a time. Each tick applies uniform
//! jitter to the current value, floors the result at 1 ms, and appends one
//! bounded history sample per edge.
//!
//! The walk has a reflecting floor at 1 ms and is deliberately NOT
//! mean-reverting: latencies may drift upward without bound over long
//! runs. Keep it that way: a mean-reverting walk would change what the
//! simulation models, not fix a bug.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::topology::types::{LatencyEdge, TimestampMs};

/// Default number of history samples retained per edge.
pub const DEFAULT_HISTORY_CAP: usize = 500;

/// Default per-tick jitter amplitude in milliseconds.
pub const DEFAULT_JITTER_MS: f64 = 5.0;

/// Simulator run state. The initial state is `Running`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum SimulationState {
    Running,
    Paused,
}

/// Stateful engine advancing edge latencies on discrete ticks.
///
/// The engine never consults the wall clock: callers pass `now` into
/// [`LatencySimulator::advance_tick`], so tests drive time explicitly and
/// a paused simulator performs no catch-up replay on resume.
#[derive(Debug)]
pub struct LatencySimulator {
    edges: Vec<LatencyEdge>,
    state: SimulationState,
    jitter_ms: f64,
    history_cap: usize,
    rng: StdRng,
}

impl LatencySimulator {
    pub fn new(edges: Vec<LatencyEdge>, jitter_ms: f64, history_cap: usize, rng: StdRng) -> Self {
        Self {
            edges,
            state: SimulationState::Running,
            jitter_ms,
            history_cap,
            rng,
        }
    }

    /// Convenience constructor: seeded RNG when `seed` is given (for
    /// reproducible simulations), entropy otherwise.
    pub fn with_seed(
        edges: Vec<LatencyEdge>,
        jitter_ms: f64,
        history_cap: usize,
        seed: Option<u64>,
    ) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self::new(edges, jitter_ms, history_cap, rng)
    }

    pub fn state(&self) -> SimulationState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == SimulationState::Running
    }

    /// Flip between `Running` and `Paused`, returning the new state.
    pub fn toggle(&mut self) -> SimulationState {
        self.state = match self.state {
            SimulationState::Running => SimulationState::Paused,
            SimulationState::Paused => SimulationState::Running,
        };
        self.state
    }

    /// Set the run state directly. Idempotent; setting the current state
    /// is a no-op.
    pub fn set_state(&mut self, state: SimulationState) {
        self.state = state;
    }

    pub fn edges(&self) -> &[LatencyEdge] {
        &self.edges
    }

    /// Look up an edge by id. Unknown ids yield `None`, never a panic.
    pub fn edge(&self, id: &str) -> Option<&LatencyEdge> {
        self.edges.iter().find(|e| e.id == id)
    }

    /// Advance one tick at `now`.
    ///
    /// While `Paused` this is a no-op returning `false`; state and history
    /// are frozen. While `Running`, every edge independently receives
    /// uniform jitter in `[-jitter, +jitter]`, floored at 1 ms and rounded
    /// to the nearest integer, and one history sample is appended (oldest
    /// evicted past the cap). Returns `true` when a tick was processed.
    pub fn advance_tick(&mut self, now: TimestampMs) -> bool {
        if self.state == SimulationState::Paused {
            return false;
        }

        for edge in &mut self.edges {
            let jitter = if self.jitter_ms > 0.0 {
                self.rng.gen_range(-self.jitter_ms..=self.jitter_ms)
            } else {
                0.0
            };
            let next = (edge.current_latency_ms as f64 + jitter).max(1.0);
            let latency = next.round() as u32;
            edge.push_sample(now, latency, self.history_cap);
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn simulator_with_one_edge(start_latency: u32, cap: usize) -> LatencySimulator {
        let edges = vec![LatencyEdge::new("src", "dst", start_latency, 0)];
        LatencySimulator::with_seed(edges, DEFAULT_JITTER_MS, cap, Some(42))
    }

    #[test]
    fn test_history_length_after_n_ticks() {
        let mut sim = simulator_with_one_edge(50, DEFAULT_HISTORY_CAP);
        for n in 1..=40 {
            sim.advance_tick(n as TimestampMs * 5_000);
            // Seed sample plus one per tick
            assert_eq!(sim.edges()[0].history().len(), n + 1);
        }
    }

    #[test]
    fn test_floor_invariant_holds() {
        // Start at the floor; arbitrary jitter sequences must never push
        // latency below 1 ms.
        let mut sim = simulator_with_one_edge(1, DEFAULT_HISTORY_CAP);
        for n in 1..=1_000 {
            sim.advance_tick(n * 5_000);
            assert!(sim.edges()[0].current_latency_ms >= 1);
        }
    }

    #[test]
    fn test_current_latency_matches_last_history_entry() {
        let mut sim = simulator_with_one_edge(80, DEFAULT_HISTORY_CAP);
        for n in 1..=100 {
            sim.advance_tick(n * 5_000);
            let edge = &sim.edges()[0];
            assert_eq!(edge.current_latency_ms, edge.latest().unwrap().latency_ms);
        }
    }

    #[test]
    fn test_501_ticks_evicts_oldest() {
        let mut sim = simulator_with_one_edge(50, DEFAULT_HISTORY_CAP);
        for n in 1..=501i64 {
            sim.advance_tick(n * 5_000);
        }
        let edge = &sim.edges()[0];
        assert_eq!(edge.history().len(), 500);
        // Seed (t=0) and tick-1 (t=5000) are gone; tick-2 survives as the
        // oldest entry, tick-501 is the newest.
        assert_eq!(edge.history().front().unwrap().timestamp, 2 * 5_000);
        assert_eq!(edge.history().back().unwrap().timestamp, 501 * 5_000);
    }

    #[test]
    fn test_paused_simulator_is_frozen() {
        let mut sim = simulator_with_one_edge(60, DEFAULT_HISTORY_CAP);
        sim.advance_tick(5_000);
        let latency_before = sim.edges()[0].current_latency_ms;
        let len_before = sim.edges()[0].history().len();

        assert_eq!(sim.toggle(), SimulationState::Paused);
        // Several tick intervals pass; none are processed
        for n in 2..=6 {
            assert!(!sim.advance_tick(n * 5_000));
        }
        assert_eq!(sim.edges()[0].current_latency_ms, latency_before);
        assert_eq!(sim.edges()[0].history().len(), len_before);

        // Resuming does not replay missed ticks
        assert_eq!(sim.toggle(), SimulationState::Running);
        assert_eq!(sim.edges()[0].history().len(), len_before);
        assert!(sim.advance_tick(7 * 5_000));
        assert_eq!(sim.edges()[0].history().len(), len_before + 1);
    }

    #[test]
    fn test_set_state_is_idempotent() {
        let mut sim = simulator_with_one_edge(60, DEFAULT_HISTORY_CAP);
        sim.set_state(SimulationState::Paused);
        sim.set_state(SimulationState::Paused);
        assert_eq!(sim.state(), SimulationState::Paused);
        sim.set_state(SimulationState::Running);
        assert!(sim.is_running());
    }

    #[test]
    fn test_edge_lookup() {
        let sim = simulator_with_one_edge(60, DEFAULT_HISTORY_CAP);
        assert!(sim.edge("src__dst").is_some());
        assert!(sim.edge("missing__edge").is_none());
    }

    #[test]
    fn test_seeded_runs_are_reproducible() {
        let run = |seed| {
            let edges = vec![LatencyEdge::new("src", "dst", 50, 0)];
            let mut sim = LatencySimulator::with_seed(edges, DEFAULT_JITTER_MS, DEFAULT_HISTORY_CAP, Some(seed));
            for n in 1..=50 {
                sim.advance_tick(n * 5_000);
            }
            sim.edges()[0].current_latency_ms
        };
        assert_eq!(run(9), run(9));
    }
}
