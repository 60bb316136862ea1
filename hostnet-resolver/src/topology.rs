//! Local topology resolution
//!
//! Picks the network driver service out of all services, follows it to the
//! primary service of its stack and keeps the containers of that service
//! running on this host as the per-network routers. Networks are local when
//! they live in the host's environment, carry a CNI config and have a router
//! here.
//!
//! Nothing in here fails. A missing or ambiguous driver service is logged and
//! reported through [`DriverSelection`], and the result is simply empty or
//! partial.

use crate::models::{Container, Host, LocalRouterMap, Network, Service};
use serde::Serialize;
use tracing::{debug, error};

/// Service kind of network driver services
pub const NETWORK_DRIVER_SERVICE_KIND: &str = "networkDriverService";

/// Name preferred when several driver services exist
pub const CNI_DRIVER_SERVICE_NAME: &str = "cni-driver";

/// How the network driver service was selected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "outcome")]
pub enum DriverSelection {
    /// Exactly one service of the driver kind
    Unique,
    /// Several driver services, narrowed to a single `cni-driver`
    Disambiguated,
    /// No driver service left after filtering
    NotFound,
    /// More than one `cni-driver` service left after filtering
    Ambiguous { candidates: usize },
}

impl DriverSelection {
    fn from_counts(unfiltered: usize, filtered: usize) -> Self {
        match (unfiltered, filtered) {
            (1, 1) => Self::Unique,
            (_, 1) => Self::Disambiguated,
            (_, 0) => Self::NotFound,
            (_, candidates) => Self::Ambiguous { candidates },
        }
    }

    /// Whether the selection deviates from the single expected driver
    pub fn is_anomaly(&self) -> bool {
        matches!(self, Self::NotFound | Self::Ambiguous { .. })
    }
}

/// Networks and routers relevant to one host
#[derive(Debug, Clone, PartialEq)]
pub struct LocalTopology {
    /// Host the topology was resolved for
    pub host: Host,
    pub networks: Vec<Network>,
    pub routers: LocalRouterMap,
    pub driver_selection: DriverSelection,
}

impl LocalTopology {
    /// Router container of `network_uuid` on this host
    pub fn router_for(&self, network_uuid: &str) -> Option<&Container> {
        self.routers.get(network_uuid)
    }
}

/// Resolve the networks local to `host` and their router containers
pub fn resolve_local(networks: &[Network], host: &Host, services: &[Service]) -> LocalTopology {
    let unfiltered: Vec<&Service> = services
        .iter()
        .filter(|service| service.kind == NETWORK_DRIVER_SERVICE_KIND)
        .collect();

    let drivers: Vec<&Service> = if unfiltered.len() != 1 {
        debug!(
            "Found {} network driver services, filtering on {}: {:?}",
            unfiltered.len(),
            CNI_DRIVER_SERVICE_NAME,
            service_names(&unfiltered)
        );
        unfiltered
            .iter()
            .copied()
            .filter(|service| service.name == CNI_DRIVER_SERVICE_NAME)
            .collect()
    } else {
        unfiltered.clone()
    };
    debug!("Network driver services: {:?}", service_names(&drivers));

    let driver_selection = DriverSelection::from_counts(unfiltered.len(), drivers.len());
    if driver_selection.is_anomaly() {
        error!(
            selection = ?driver_selection,
            "Expected one CNI driver service, but found: {}",
            drivers.len()
        );
    }

    let network_service = drivers
        .first()
        .and_then(|driver| find_network_service(driver, services));

    let routers = local_routers(network_service, host);

    let networks: Vec<Network> = networks
        .iter()
        .filter(|network| network.environment_uuid == host.environment_uuid)
        .filter(|network| network.cni_config().is_some())
        .filter(|network| routers.contains_key(&network.uuid))
        .cloned()
        .collect();

    debug!(
        "Local networks: {:?}, local routers: {:?}",
        networks.iter().map(|n| n.uuid.as_str()).collect::<Vec<_>>(),
        routers.iter().map(|(n, c)| (n.as_str(), c.uuid.as_str())).collect::<Vec<_>>()
    );

    LocalTopology {
        host: host.clone(),
        networks,
        routers,
        driver_selection,
    }
}

/// Primary service of the driver's stack, other than the driver itself
fn find_network_service<'a>(driver: &Service, services: &'a [Service]) -> Option<&'a Service> {
    let found = services.iter().find(|service| {
        service.stack_uuid == driver.stack_uuid && service.uuid != driver.uuid && service.is_primary()
    });

    match found {
        Some(service) => debug!("Network service for driver {}: {}", driver.name, service.name),
        None => debug!("No primary service found in stack {} of driver {}", driver.stack_uuid, driver.name),
    }

    found
}

/// Containers of `service` on `host` keyed by network, last one wins
fn local_routers(service: Option<&Service>, host: &Host) -> LocalRouterMap {
    let mut routers = LocalRouterMap::new();

    for container in service.into_iter().flat_map(|s| &s.containers) {
        if container.host_uuid == host.uuid {
            routers.insert(container.network_uuid.clone(), container.clone());
        }
    }

    routers
}

fn service_names<'a>(services: &[&'a Service]) -> Vec<&'a str> {
    services.iter().map(|service| service.name.as_str()).collect()
}
