//! Authoritative simulation state and subscriber notification.
//!
//! The store owns the node catalog, the simulator (and through it the edge
//! set), the query-time filters, and the presentation-facing selections
//! (selected edge, time window, server visibility). All mutation flows
//! through the store's entry points; each one fully applies its change and
//! then synchronously notifies subscribers, so a subscriber always
//! observes a self-consistent snapshot and never a half-applied tick.
//!
//! The store is a plain owned value. Construct one per simulation (tests
//! routinely hold several, fully independent) and share it behind
//! `Arc<Mutex<_>>` only where a wall-clock runner needs it.

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;

use crate::config::GeneralConfig;
use crate::engine::simulator::{LatencySimulator, SimulationState};
use crate::query::{
    filter_visible_edges, summarize_visible, windowed_stats, EdgeFilters, TimeWindow,
    VisibleSetSummary, WindowedStats,
};
use crate::topology::builder::build_initial_edges;
use crate::topology::types::{CloudProvider, CloudRegion, ExchangeServer, LatencyEdge, TimestampMs};

/// Handle identifying one subscription, for `unsubscribe`.
pub type SubscriberId = u64;

/// What changed, delivered to every subscriber after the change applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreEvent {
    /// One simulation tick was processed (all edges updated together).
    Tick,
    SimulationStateChanged,
    FiltersChanged,
    TimeWindowChanged,
    SelectionChanged,
    VisibilityChanged,
}

type Subscriber = Box<dyn FnMut(&StoreEvent) + Send>;

/// A cloned, serializable view of the full store state.
#[derive(Debug, Clone, Serialize)]
pub struct Snapshot {
    pub servers: Vec<ExchangeServer>,
    pub regions: Vec<CloudRegion>,
    pub edges: Vec<LatencyEdge>,
    pub filters: EdgeFilters,
    pub time_window: TimeWindow,
    pub simulation_state: SimulationState,
    pub selected_edge_id: Option<String>,
    pub servers_visible: bool,
}

/// The in-memory snapshot `{servers, regions, edges, filters, simulation
/// state, selection, time window}` plus its subscription list.
pub struct StateStore {
    servers: Vec<ExchangeServer>,
    regions: Vec<CloudRegion>,
    simulator: LatencySimulator,
    filters: EdgeFilters,
    time_window: TimeWindow,
    selected_edge_id: Option<String>,
    servers_visible: bool,
    subscribers: Vec<(SubscriberId, Subscriber)>,
    next_subscriber_id: SubscriberId,
}

impl StateStore {
    /// Build a store from a node catalog: assigns regions, seeds the
    /// initial edges at `now`, and starts the simulator in `Running`
    /// state. The catalog is fixed for the lifetime of the store.
    pub fn new(
        servers: Vec<ExchangeServer>,
        regions: Vec<CloudRegion>,
        general: &GeneralConfig,
        now: TimestampMs,
    ) -> Self {
        let mut rng = match general.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let edges = build_initial_edges(&servers, &regions, now, general.seed_jitter_ms, &mut rng);
        log::info!(
            "Initialized topology: {} servers, {} regions, {} edges",
            servers.len(),
            regions.len(),
            edges.len()
        );
        let simulator = LatencySimulator::new(edges, general.jitter_ms, general.history_cap, rng);

        Self {
            servers,
            regions,
            simulator,
            filters: EdgeFilters::default(),
            time_window: TimeWindow::default(),
            selected_edge_id: None,
            servers_visible: true,
            subscribers: Vec::new(),
            next_subscriber_id: 0,
        }
    }

    // --- Read access -----------------------------------------------------

    /// Exchange server catalog, static for the process lifetime.
    pub fn servers(&self) -> &[ExchangeServer] {
        &self.servers
    }

    /// Cloud region catalog, static for the process lifetime.
    pub fn regions(&self) -> &[CloudRegion] {
        &self.regions
    }

    pub fn edges(&self) -> &[LatencyEdge] {
        self.simulator.edges()
    }

    /// Look up one edge; an unknown id is a `None`, never an error.
    pub fn edge(&self, id: &str) -> Option<&LatencyEdge> {
        self.simulator.edge(id)
    }

    pub fn filters(&self) -> &EdgeFilters {
        &self.filters
    }

    pub fn time_window(&self) -> TimeWindow {
        self.time_window
    }

    pub fn selected_edge_id(&self) -> Option<&str> {
        self.selected_edge_id.as_deref()
    }

    pub fn servers_visible(&self) -> bool {
        self.servers_visible
    }

    pub fn simulation_state(&self) -> SimulationState {
        self.simulator.state()
    }

    pub fn is_running(&self) -> bool {
        self.simulator.is_running()
    }

    /// Clone the full state into a serializable snapshot.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            servers: self.servers.clone(),
            regions: self.regions.clone(),
            edges: self.simulator.edges().to_vec(),
            filters: self.filters.clone(),
            time_window: self.time_window,
            simulation_state: self.simulator.state(),
            selected_edge_id: self.selected_edge_id.clone(),
            servers_visible: self.servers_visible,
        }
    }

    // --- Query conveniences ----------------------------------------------

    /// Edges passing the current filters and visibility toggle.
    pub fn visible_edges(&self) -> Vec<&LatencyEdge> {
        filter_visible_edges(
            self.simulator.edges(),
            &self.servers,
            &self.regions,
            &self.filters,
            self.servers_visible,
        )
    }

    /// Aggregate metrics over the currently visible edge set.
    pub fn visible_summary(&self) -> VisibleSetSummary {
        summarize_visible(&self.visible_edges())
    }

    /// Windowed statistics for the selected edge over the current time
    /// window. `None` when nothing is selected or the id no longer
    /// resolves.
    pub fn selected_edge_stats(&self, now: TimestampMs) -> Option<WindowedStats> {
        let id = self.selected_edge_id.as_deref()?;
        let edge = self.simulator.edge(id)?;
        Some(windowed_stats(edge, now, self.time_window.window_ms()))
    }

    // --- Mutation entry points -------------------------------------------

    /// Advance one simulation tick at `now`. No-op (and no notification)
    /// while paused. All edges update before any subscriber runs.
    pub fn advance_tick(&mut self, now: TimestampMs) -> bool {
        if self.simulator.advance_tick(now) {
            self.notify(StoreEvent::Tick);
            true
        } else {
            false
        }
    }

    /// Flip the simulator between running and paused.
    pub fn toggle_simulation(&mut self) -> SimulationState {
        let state = self.simulator.toggle();
        log::info!("Simulation toggled to {:?}", state);
        self.notify(StoreEvent::SimulationStateChanged);
        state
    }

    /// Set the simulator state directly. Notifies even when idempotent so
    /// subscribers never miss an explicit consumer action.
    pub fn set_simulation_state(&mut self, state: SimulationState) {
        self.simulator.set_state(state);
        self.notify(StoreEvent::SimulationStateChanged);
    }

    /// Replace the provider filter set.
    pub fn set_providers(&mut self, providers: Vec<CloudProvider>) {
        self.filters.providers = providers;
        self.notify(StoreEvent::FiltersChanged);
    }

    /// Replace the exchange allow-list; empty allows all exchanges.
    pub fn set_exchange_filter(&mut self, exchange_ids: Vec<String>) {
        self.filters.exchanges = exchange_ids;
        self.notify(StoreEvent::FiltersChanged);
    }

    /// Replace the inclusive latency bounds.
    pub fn set_latency_range(&mut self, min_ms: u32, max_ms: u32) {
        self.filters.min_latency_ms = min_ms;
        self.filters.max_latency_ms = max_ms;
        self.notify(StoreEvent::FiltersChanged);
    }

    pub fn set_time_window(&mut self, window: TimeWindow) {
        self.time_window = window;
        self.notify(StoreEvent::TimeWindowChanged);
    }

    /// Select an edge for inspection, or clear the selection with `None`.
    /// Selecting an unknown edge id is rejected and leaves state
    /// unchanged.
    pub fn set_selected_edge(&mut self, edge_id: Option<String>) {
        if let Some(id) = &edge_id {
            if self.simulator.edge(id).is_none() {
                log::warn!("Ignoring selection of unknown edge {}", id);
                return;
            }
        }
        self.selected_edge_id = edge_id;
        self.notify(StoreEvent::SelectionChanged);
    }

    /// Externally controlled display toggle gating all edge visibility.
    pub fn set_servers_visible(&mut self, visible: bool) {
        self.servers_visible = visible;
        self.notify(StoreEvent::VisibilityChanged);
    }

    // --- Subscription ----------------------------------------------------

    /// Register a callback invoked synchronously after every state change,
    /// in subscription order.
    pub fn subscribe<F>(&mut self, callback: F) -> SubscriberId
    where
        F: FnMut(&StoreEvent) + Send + 'static,
    {
        let id = self.next_subscriber_id;
        self.next_subscriber_id += 1;
        self.subscribers.push((id, Box::new(callback)));
        id
    }

    /// Remove a subscription. Returns whether it existed.
    pub fn unsubscribe(&mut self, id: SubscriberId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(sub_id, _)| *sub_id != id);
        self.subscribers.len() != before
    }

    fn notify(&mut self, event: StoreEvent) {
        for (_, callback) in &mut self.subscribers {
            callback(&event);
        }
    }
}
