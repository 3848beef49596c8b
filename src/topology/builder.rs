//! Initial topology construction.
//!
//! Runs once at startup: assigns each exchange server to its nearest
//! compatible cloud region and seeds one latency edge per server. The
//! simulator owns the resulting edge set for the rest of the process
//! lifetime; no edges are added or removed afterwards.

use rand::Rng;

use crate::geo::{estimate_latency_ms, great_circle_distance_km};
use crate::topology::types::{CloudRegion, ExchangeServer, LatencyEdge, TimestampMs};

/// Select the region closest to `server`.
///
/// Regions of the server's own provider are preferred; if none exist the
/// whole catalog is considered (prefer affinity, degrade to any candidate
/// rather than failing to assign). Ties are broken by first-encountered
/// order, so the result is deterministic for a fixed region ordering.
///
/// Returns `None` only when `regions` is empty.
pub fn assign_nearest_region<'a>(
    server: &ExchangeServer,
    regions: &'a [CloudRegion],
) -> Option<&'a CloudRegion> {
    let same_provider: Vec<&CloudRegion> = regions
        .iter()
        .filter(|r| r.provider == server.provider)
        .collect();

    let candidates: Vec<&CloudRegion> = if same_provider.is_empty() {
        regions.iter().collect()
    } else {
        same_provider
    };

    let mut best: Option<&CloudRegion> = None;
    let mut best_dist = f64::INFINITY;
    for region in candidates {
        let d = great_circle_distance_km(server.position(), region.position());
        // Strict comparison keeps the first-encountered region on ties
        if d < best_dist {
            best_dist = d;
            best = Some(region);
        }
    }
    best
}

/// Build the initial edge set: exactly one edge per server, assigned to
/// its nearest region, with latency seeded from the distance estimate plus
/// one symmetric jitter of up to `seed_jitter_ms`, floored at 1 ms.
///
/// Servers are skipped (with a warning) only when the region catalog is
/// empty.
pub fn build_initial_edges<R: Rng>(
    servers: &[ExchangeServer],
    regions: &[CloudRegion],
    now: TimestampMs,
    seed_jitter_ms: f64,
    rng: &mut R,
) -> Vec<LatencyEdge> {
    let mut edges = Vec::with_capacity(servers.len());

    for server in servers {
        let region = match assign_nearest_region(server, regions) {
            Some(region) => region,
            None => {
                log::warn!("No candidate region for server {}; skipping edge", server.id);
                continue;
            }
        };

        let distance = great_circle_distance_km(server.position(), region.position());
        let base = estimate_latency_ms(distance);
        let jitter = if seed_jitter_ms > 0.0 {
            rng.gen_range(-seed_jitter_ms..=seed_jitter_ms)
        } else {
            0.0
        };
        let latency = (base + jitter).max(1.0).round() as u32;

        log::debug!(
            "Edge {} -> {}: {:.0} km, base {:.1} ms, seeded at {} ms",
            server.id,
            region.id,
            distance,
            base,
            latency
        );
        edges.push(LatencyEdge::new(&server.id, &region.id, latency, now));
    }

    edges
}
