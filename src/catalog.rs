//! The node catalog: exchange servers and cloud-provider regions.
//!
//! Nodes are created once at startup and never mutated or destroyed for
//! the lifetime of the process. The built-in catalog covers the major
//! exchanges and the regions of the three providers; a YAML file can
//! replace it wholesale.

use std::fs::File;
use std::path::Path;

use color_eyre::Result;
use log::info;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::topology::types::{CloudProvider, CloudRegion, ExchangeServer};

/// A fixed set of servers and regions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Catalog {
    pub servers: Vec<ExchangeServer>,
    pub regions: Vec<CloudRegion>,
}

#[derive(Debug, Error, PartialEq)]
pub enum CatalogError {
    #[error("Duplicate node id '{0}' (ids must be unique across servers and regions)")]
    DuplicateId(String),
    #[error("Node '{id}' has out-of-range coordinates ({lat}, {lng})")]
    InvalidCoordinates { id: String, lat: f64, lng: f64 },
    #[error("Server '{id}' has malformed endpoint '{endpoint}' (expected host:port)")]
    InvalidEndpoint { id: String, endpoint: String },
}

impl Catalog {
    /// The built-in catalog.
    pub fn builtin() -> Self {
        Self {
            servers: builtin_servers(),
            regions: builtin_regions(),
        }
    }

    /// Load a catalog from a YAML file with `servers:` and `regions:`
    /// lists.
    pub fn from_yaml_file(path: &Path) -> Result<Self> {
        info!("Loading node catalog from: {:?}", path);
        let file = File::open(path)?;
        let catalog: Catalog = serde_yaml::from_reader(file)?;
        catalog.validate()?;
        Ok(catalog)
    }

    /// Check id uniqueness, coordinate ranges, and endpoint shapes.
    pub fn validate(&self) -> Result<(), CatalogError> {
        use std::collections::HashSet;

        let mut ids = HashSet::new();
        let coords = self
            .servers
            .iter()
            .map(|s| (s.id.as_str(), s.lat, s.lng))
            .chain(self.regions.iter().map(|r| (r.id.as_str(), r.lat, r.lng)));

        for (id, lat, lng) in coords {
            if !ids.insert(id.to_string()) {
                return Err(CatalogError::DuplicateId(id.to_string()));
            }
            if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lng) {
                return Err(CatalogError::InvalidCoordinates {
                    id: id.to_string(),
                    lat,
                    lng,
                });
            }
        }

        for server in &self.servers {
            if let Some(endpoint) = &server.endpoint {
                let valid = match endpoint.rsplit_once(':') {
                    Some((host, port)) => !host.is_empty() && port.parse::<u16>().is_ok(),
                    None => false,
                };
                if !valid {
                    return Err(CatalogError::InvalidEndpoint {
                        id: server.id.clone(),
                        endpoint: endpoint.clone(),
                    });
                }
            }
        }

        Ok(())
    }
}

fn server(
    id: &str,
    name: &str,
    provider: CloudProvider,
    lat: f64,
    lng: f64,
    region: &str,
    endpoint: Option<&str>,
) -> ExchangeServer {
    ExchangeServer {
        id: id.to_string(),
        name: name.to_string(),
        provider,
        lat,
        lng,
        region: region.to_string(),
        endpoint: endpoint.map(str::to_string),
    }
}

fn region(id: &str, provider: CloudProvider, name: &str, lat: f64, lng: f64) -> CloudRegion {
    CloudRegion {
        id: id.to_string(),
        provider,
        name: name.to_string(),
        lat,
        lng,
    }
}

/// Major exchange server locations. Endpoints are real public WebSocket
/// hosts used only by the opportunistic connectivity probe.
fn builtin_servers() -> Vec<ExchangeServer> {
    use CloudProvider::*;
    vec![
        server("binance-tokyo", "Binance (Asia)", Aws, 35.6895, 139.6917, "Asia", Some("stream.binance.com:9443")),
        server("coinbase-sf", "Coinbase (US)", Gcp, 37.7749, -122.4194, "North America", Some("ws-feed.exchange.coinbase.com:443")),
        server("kraken-eu", "Kraken (EU)", Azure, 53.3498, -6.2603, "Europe", Some("ws.kraken.com:443")),
        server("bybit-dubai", "Bybit (MENA)", Aws, 25.2048, 55.2708, "Middle East", None),
        server("okx-hk", "OKX (HK)", Gcp, 22.3193, 114.1694, "Asia", None),
        server("deribit-amsterdam", "Deribit (EU)", Azure, 52.3676, 4.9041, "Europe", None),
    ]
}

/// Cloud regions of the three providers.
fn builtin_regions() -> Vec<CloudRegion> {
    use CloudProvider::*;
    vec![
        // AWS
        region("aws-us-east-1", Aws, "AWS US East (N. Virginia)", 38.88, -77.03),
        region("aws-us-west-1", Aws, "AWS US West (N. California)", 37.77, -122.42),
        region("aws-us-west-2", Aws, "AWS US West (Oregon)", 45.52, -122.68),
        region("aws-eu-west-1", Aws, "AWS EU (Ireland)", 53.34, -6.26),
        region("aws-eu-central-1", Aws, "AWS EU (Frankfurt)", 50.11, 8.68),
        region("aws-ap-northeast-1", Aws, "AWS Asia Pacific (Tokyo)", 35.68, 139.69),
        region("aws-ap-southeast-1", Aws, "AWS Asia Pacific (Singapore)", 1.35, 103.82),
        region("aws-sa-east-1", Aws, "AWS South America (Sao Paulo)", -23.55, -46.63),
        // GCP
        region("gcp-us-central1", Gcp, "GCP US Central (Iowa)", 41.87, -93.60),
        region("gcp-europe-west1", Gcp, "GCP Europe West (Belgium)", 50.45, 3.82),
        region("gcp-asia-east1", Gcp, "GCP Asia East (Taiwan)", 25.03, 121.56),
        // Azure
        region("azure-eastus", Azure, "Azure East US", 37.37, -79.85),
        region("azure-westeurope", Azure, "Azure West Europe", 52.36, 4.90),
        region("azure-japaneast", Azure, "Azure Japan East", 35.68, 139.69),
    ]
}
