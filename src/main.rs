use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use chrono::Utc;
use clap::Parser;
use color_eyre::Result;
use env_logger::Env;
use log::{info, warn};

use latsim::catalog::Catalog;
use latsim::config::{self, SimulationConfig};
use latsim::engine::TickRunner;
use latsim::probe::{measure_endpoints, probe_targets, ProbeLatencyMap, ProbeTarget};
use latsim::report::{build_report, write_report};
use latsim::store::StateStore;
use latsim::topology::types::TimestampMs;

/// Latency topology simulation engine for cryptocurrency exchange infrastructure
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the simulation configuration YAML file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Number of ticks to simulate headlessly (simulated clock, no waiting)
    #[arg(short, long, conflicts_with = "duration")]
    ticks: Option<u64>,

    /// Wall-clock duration to run the simulation (e.g. "2m", "30s")
    #[arg(short, long, value_parser = humantime::parse_duration)]
    duration: Option<Duration>,

    /// Output path for the JSON report
    #[arg(short, long, default_value = "latsim_report.json")]
    output: PathBuf,

    /// Probe real exchange endpoints (best-effort, side channel only)
    #[arg(long)]
    probe: bool,
}

/// Tick count used when neither --ticks nor --duration is given.
const DEFAULT_HEADLESS_TICKS: u64 = 120;

fn main() -> Result<()> {
    // Initialize error handling
    color_eyre::install()?;

    let args = Args::parse();

    // Initialize logging with default filter level of "info"
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    info!("Starting latsim latency topology simulator");

    let config = match &args.config {
        Some(path) => config::load_config(path)?,
        None => SimulationConfig::default(),
    };
    config.validate()?;

    let catalog = match &config.catalog {
        Some(catalog_config) => Catalog::from_yaml_file(catalog_config.path.as_ref())?,
        None => Catalog::builtin(),
    };
    catalog.validate()?;
    info!(
        "Catalog: {} exchange servers, {} cloud regions",
        catalog.servers.len(),
        catalog.regions.len()
    );

    let probe_enabled = args.probe || config.probe.enabled;
    let now = Utc::now().timestamp_millis();
    let store = StateStore::new(catalog.servers, catalog.regions, &config.general, now);

    match (args.ticks, args.duration) {
        (Some(ticks), _) => run_headless(store, &config, ticks, now, probe_enabled, &args.output),
        (None, Some(duration)) => run_wall_clock(store, &config, duration, probe_enabled, &args.output),
        (None, None) => {
            info!("No run mode given; simulating {} ticks", DEFAULT_HEADLESS_TICKS);
            run_headless(store, &config, DEFAULT_HEADLESS_TICKS, now, probe_enabled, &args.output)
        }
    }
}

/// Advance a simulated clock tick by tick, then write the report. No real
/// time passes; with a configured RNG seed the run is fully reproducible.
fn run_headless(
    mut store: StateStore,
    config: &SimulationConfig,
    ticks: u64,
    start: TimestampMs,
    probe_enabled: bool,
    output: &std::path::Path,
) -> Result<()> {
    let interval_ms = config.general.tick_interval.as_millis() as i64;
    info!("Running {} simulated ticks at {:?} cadence", ticks, config.general.tick_interval);

    let mut now = start;
    for _ in 0..ticks {
        now += interval_ms;
        store.advance_tick(now);
    }

    let summary = store.visible_summary();
    match summary.avg_latency_ms {
        Some(avg) => info!("{} visible edges, avg latency {:.1} ms", summary.active_count, avg),
        None => warn!("No visible edges after {} ticks", ticks),
    }

    let probe_latencies = if probe_enabled {
        Some(probe_round(&probe_targets(store.servers()), config))
    } else {
        None
    };
    let report = build_report(&store, now, probe_latencies);
    write_report(&report, output)?;

    info!("Simulation completed successfully");
    Ok(())
}

/// Run against the wall clock: a background runner drives ticks while the
/// main thread handles probe rounds, then the report is written.
fn run_wall_clock(
    mut store: StateStore,
    config: &SimulationConfig,
    duration: Duration,
    probe_enabled: bool,
    output: &std::path::Path,
) -> Result<()> {
    info!("Running for {:?} with {:?} tick cadence", duration, config.general.tick_interval);

    store.subscribe(|event| log::debug!("Store event: {:?}", event));
    let store = Arc::new(Mutex::new(store));
    let runner = TickRunner::spawn(Arc::clone(&store), config.general.tick_interval);

    let deadline = Instant::now() + duration;
    let mut probe_latencies = None;
    while Instant::now() < deadline {
        if probe_enabled {
            // Targets are read under the lock, measured outside it;
            // probing never blocks tick progress
            let targets = {
                let store = lock_store(&store);
                probe_targets(store.servers())
            };
            probe_latencies = Some(probe_round(&targets, config));
        }
        let remaining = deadline.saturating_duration_since(Instant::now());
        thread::sleep(remaining.min(config.probe.poll_interval));
    }
    runner.stop();

    let store = lock_store(&store);
    let now = Utc::now().timestamp_millis();
    let report = build_report(&store, now, probe_latencies);
    write_report(&report, output)?;

    info!("Simulation completed successfully");
    Ok(())
}

fn probe_round(targets: &[ProbeTarget], config: &SimulationConfig) -> ProbeLatencyMap {
    let latencies = measure_endpoints(targets, config.probe.timeout);
    info!("Probe round measured {}/{} endpoints", latencies.len(), targets.len());
    latencies
}

fn lock_store(store: &Arc<Mutex<StateStore>>) -> std::sync::MutexGuard<'_, StateStore> {
    match store.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}
