//! Geographic distance and latency estimation.
//!
//! Pure functions shared by the topology builder: great-circle distance
//! between two coordinates and a deterministic latency estimate derived
//! from that distance.

/// Mean Earth radius in kilometers, used by the haversine formula.
const EARTH_RADIUS_KM: f64 = 6371.0;

/// Propagation speed approximation: roughly 1 ms per 200 km one-way.
const KM_PER_MS: f64 = 200.0;

/// Round-trip multiplier applied to the one-way propagation estimate.
const ROUND_TRIP_FACTOR: f64 = 2.5;

/// Fixed processing/handshake overhead added to every estimate.
const BASE_OVERHEAD_MS: f64 = 10.0;

/// Compute the great-circle distance between two `(lat, lng)` points in
/// kilometers using the haversine formula.
///
/// The function is total over valid coordinates and symmetric in its
/// arguments: `great_circle_distance_km(a, b) == great_circle_distance_km(b, a)`.
pub fn great_circle_distance_km(a: (f64, f64), b: (f64, f64)) -> f64 {
    let (lat1, lng1) = a;
    let (lat2, lng2) = b;

    let d_lat = (lat2 - lat1).to_radians();
    let d_lng = (lng2 - lng1).to_radians();

    let h = (d_lat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (d_lng / 2.0).sin().powi(2);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());

    EARTH_RADIUS_KM * c
}

/// Estimate the round-trip latency in milliseconds for a given distance.
///
/// Models propagation delay (about 1 ms per 200 km one-way, scaled for the
/// round trip) plus a fixed baseline overhead. Monotonically increasing in
/// distance; returns the 10 ms baseline for distance 0.
pub fn estimate_latency_ms(distance_km: f64) -> f64 {
    distance_km / KM_PER_MS * ROUND_TRIP_FACTOR + BASE_OVERHEAD_MS
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOKYO: (f64, f64) = (35.6895, 139.6917);
    const SAN_FRANCISCO: (f64, f64) = (37.7749, -122.4194);
    const DUBLIN: (f64, f64) = (53.3498, -6.2603);

    #[test]
    fn test_distance_is_symmetric() {
        let pairs = [(TOKYO, SAN_FRANCISCO), (TOKYO, DUBLIN), (SAN_FRANCISCO, DUBLIN)];
        for (a, b) in pairs {
            let d_ab = great_circle_distance_km(a, b);
            let d_ba = great_circle_distance_km(b, a);
            assert!((d_ab - d_ba).abs() < 1e-9, "distance not symmetric for {:?} / {:?}", a, b);
        }
    }

    #[test]
    fn test_distance_to_self_is_zero() {
        assert_eq!(great_circle_distance_km(TOKYO, TOKYO), 0.0);
        assert_eq!(great_circle_distance_km(DUBLIN, DUBLIN), 0.0);
    }

    #[test]
    fn test_known_distance_tokyo_sf() {
        // Tokyo <-> San Francisco is roughly 8270 km
        let d = great_circle_distance_km(TOKYO, SAN_FRANCISCO);
        assert!((8000.0..8500.0).contains(&d), "unexpected distance {}", d);
    }

    #[test]
    fn test_latency_baseline_at_zero_distance() {
        assert_eq!(estimate_latency_ms(0.0), 10.0);
    }

    #[test]
    fn test_latency_monotonic_in_distance() {
        let mut prev = estimate_latency_ms(0.0);
        for km in [1.0, 10.0, 100.0, 1000.0, 10000.0] {
            let next = estimate_latency_ms(km);
            assert!(next > prev, "latency not monotonic at {} km", km);
            prev = next;
        }
    }

    #[test]
    fn test_latency_formula() {
        // 200 km one-way ~ 1 ms, scaled by 2.5, plus 10 ms overhead
        assert!((estimate_latency_ms(200.0) - 12.5).abs() < 1e-9);
        assert!((estimate_latency_ms(2000.0) - 35.0).abs() < 1e-9);
    }
}
