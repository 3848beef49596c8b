//! Best-effort connectivity probe of real exchange endpoints.
//!
//! Strictly peripheral: results go into a side-channel id-to-latency map and
//! never feed back into simulated edge state. Each target is measured
//! independently with a fixed connect timeout; a target that fails or
//! times out is logged and skipped without affecting the others, and the
//! sampler is simply retried on its own polling cadence, without backoff.

use std::collections::HashMap;
use std::net::{TcpStream, ToSocketAddrs};
use std::time::{Duration, Instant};

use rayon::prelude::*;

use crate::topology::types::ExchangeServer;

/// Measured connect latency per server id, in milliseconds.
pub type ProbeLatencyMap = HashMap<String, u32>;

/// One probe target: a server id and its `host:port` endpoint.
#[derive(Debug, Clone)]
pub struct ProbeTarget {
    pub id: String,
    pub name: String,
    pub endpoint: String,
}

/// Collect the probe targets from a server catalog (servers without an
/// endpoint are not probed).
pub fn probe_targets(servers: &[ExchangeServer]) -> Vec<ProbeTarget> {
    servers
        .iter()
        .filter_map(|s| {
            s.endpoint.as_ref().map(|endpoint| ProbeTarget {
                id: s.id.clone(),
                name: s.name.clone(),
                endpoint: endpoint.clone(),
            })
        })
        .collect()
}

/// Measure TCP connect time to every target in parallel.
///
/// Returns only the targets that connected within `timeout`; resolution
/// failures, refused connections, and timeouts are logged at `warn` and
/// omitted from the map.
pub fn measure_endpoints(targets: &[ProbeTarget], timeout: Duration) -> ProbeLatencyMap {
    targets
        .par_iter()
        .filter_map(|target| measure_one(target, timeout).map(|ms| (target.id.clone(), ms)))
        .collect()
}

fn measure_one(target: &ProbeTarget, timeout: Duration) -> Option<u32> {
    let addr = match target.endpoint.to_socket_addrs() {
        Ok(mut addrs) => addrs.next(),
        Err(e) => {
            log::warn!("Failed to resolve {} ({}): {}", target.name, target.endpoint, e);
            return None;
        }
    };
    let addr = match addr {
        Some(addr) => addr,
        None => {
            log::warn!("No address for {} ({})", target.name, target.endpoint);
            return None;
        }
    };

    let start = Instant::now();
    match TcpStream::connect_timeout(&addr, timeout) {
        Ok(_stream) => {
            let elapsed_ms = start.elapsed().as_millis().min(u128::from(u32::MAX)) as u32;
            log::debug!("Probed {} ({}) in {} ms", target.name, target.endpoint, elapsed_ms);
            Some(elapsed_ms)
        }
        Err(e) => {
            log::warn!("Failed to probe {} ({}): {}", target.name, target.endpoint, e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;
    use std::net::TcpListener;

    #[test]
    fn test_targets_come_from_servers_with_endpoints() {
        let catalog = Catalog::builtin();
        let targets = probe_targets(&catalog.servers);
        assert!(!targets.is_empty());
        assert!(targets.len() < catalog.servers.len(), "endpoint-less servers are excluded");
        assert!(targets.iter().any(|t| t.id == "binance-tokyo"));
    }

    #[test]
    fn test_unresolvable_target_is_skipped() {
        let targets = vec![ProbeTarget {
            id: "ghost".to_string(),
            name: "Ghost".to_string(),
            endpoint: "host.invalid:1".to_string(),
        }];
        let map = measure_endpoints(&targets, Duration::from_millis(100));
        assert!(map.is_empty());
    }

    #[test]
    fn test_local_listener_is_measured() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let targets = vec![
            ProbeTarget {
                id: "local".to_string(),
                name: "Local".to_string(),
                endpoint: addr.to_string(),
            },
            ProbeTarget {
                id: "ghost".to_string(),
                name: "Ghost".to_string(),
                endpoint: "host.invalid:1".to_string(),
            },
        ];

        let map = measure_endpoints(&targets, Duration::from_secs(1));
        // The failing target never blocks or poisons the healthy one
        assert!(map.contains_key("local"));
        assert!(!map.contains_key("ghost"));
    }
}
