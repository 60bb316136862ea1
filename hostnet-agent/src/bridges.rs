//! Per-network bridge status for the local topology
//!
//! For each local network this reports:
//! - The bridge device and subnet from its CNI config
//! - The router container on this host and whether it is running
//! - Whether the bridge already holds an address from the subnet

use hostnet_resolver::{get_bridge_info, InterfaceError, LocalTopology};
use serde::Serialize;
use tracing::{info, warn};

/// Bridge address check outcome
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "state", content = "detail")]
pub enum AddressCheck {
    /// Bridge or subnet unknown, nothing to check
    Skipped,
    Present,
    Missing,
    Failed(String),
}

/// Status of one local network
#[derive(Debug, Clone, Serialize)]
pub struct NetworkStatus {
    pub network_uuid: String,
    pub network_name: String,
    pub bridge: String,
    pub bridge_subnet: String,
    pub router_uuid: Option<String>,
    pub router_running: bool,
    pub address: AddressCheck,
}

/// Build the status of every local network, using `inspect` to check bridge
/// addresses
pub fn collect_statuses<F>(topology: &LocalTopology, inspect: F) -> Vec<NetworkStatus>
where
    F: Fn(&str, &str) -> Result<bool, InterfaceError>,
{
    topology
        .networks
        .iter()
        .map(|network| {
            let info = get_bridge_info(network, &topology.host);
            let router = topology.router_for(&network.uuid);

            let address = if info.bridge.is_empty() || info.bridge_subnet.is_empty() {
                AddressCheck::Skipped
            } else {
                match inspect(&info.bridge, &info.bridge_subnet) {
                    Ok(true) => AddressCheck::Present,
                    Ok(false) => AddressCheck::Missing,
                    Err(e) => {
                        warn!("Failed to inspect bridge {} of network {}: {}", info.bridge, network.uuid, e);
                        AddressCheck::Failed(e.to_string())
                    }
                }
            };

            NetworkStatus {
                network_uuid: network.uuid.clone(),
                network_name: network.name.clone(),
                bridge: info.bridge,
                bridge_subnet: info.bridge_subnet,
                router_uuid: router.map(|c| c.uuid.clone()),
                router_running: router.is_some_and(|c| c.is_considered_running()),
                address,
            }
        })
        .collect()
}

/// Log one line per network status
pub fn report(statuses: &[NetworkStatus]) {
    for status in statuses {
        if !status.router_running {
            warn!(
                "Router {:?} of network {} is not running",
                status.router_uuid, status.network_uuid
            );
        }

        info!(
            network = %status.network_uuid,
            bridge = %status.bridge,
            subnet = %status.bridge_subnet,
            address = ?status.address,
            "Local network {} ready on bridge {:?}",
            status.network_name,
            status.bridge
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hostnet_resolver::{resolve_local, Container, Host, Network, Service, CNI_CONFIG_KEY};
    use serde_json::json;

    fn topology(cni: serde_json::Value, router_state: &str) -> LocalTopology {
        let host = Host {
            uuid: "host-a".into(),
            environment_uuid: "env-1".into(),
            labels: [("bridge".to_string(), "br-label".to_string())].into_iter().collect(),
            ..Host::default()
        };
        let mut network = Network {
            uuid: "net-1".into(),
            name: "ipsec".into(),
            environment_uuid: "env-1".into(),
            ..Network::default()
        };
        network.metadata.insert(CNI_CONFIG_KEY.into(), cni);

        let services = vec![
            Service {
                uuid: "d-1".into(),
                name: "cni-driver".into(),
                kind: "networkDriverService".into(),
                stack_uuid: "stack-1".into(),
                primary_service_name: "ipsec".into(),
                ..Service::default()
            },
            Service {
                uuid: "s-1".into(),
                name: "ipsec".into(),
                stack_uuid: "stack-1".into(),
                primary_service_name: "ipsec".into(),
                containers: vec![Container {
                    uuid: "c-1".into(),
                    host_uuid: "host-a".into(),
                    network_uuid: "net-1".into(),
                    state: router_state.into(),
                    ..Container::default()
                }],
                ..Service::default()
            },
        ];

        resolve_local(&[network], &host, &services)
    }

    #[test]
    fn test_status_with_present_address() {
        let topology = topology(
            json!({"10-rancher.conf": {"type": "rancher-bridge", "bridge": "__host_label__:bridge", "bridgeSubnet": "10.42.0.0/16"}}),
            "running",
        );

        let statuses = collect_statuses(&topology, |bridge, subnet| {
            assert_eq!(bridge, "br-label");
            assert_eq!(subnet, "10.42.0.0/16");
            Ok(true)
        });

        assert_eq!(statuses.len(), 1);
        assert_eq!(statuses[0].router_uuid.as_deref(), Some("c-1"));
        assert!(statuses[0].router_running);
        assert_eq!(statuses[0].address, AddressCheck::Present);
    }

    #[test]
    fn test_status_skips_check_without_bridge() {
        let topology = topology(json!({"10-flat.conf": {"type": "macvlan"}}), "stopped");

        let statuses = collect_statuses(&topology, |_, _| panic!("no bridge to inspect"));

        assert_eq!(statuses[0].bridge, "");
        assert!(!statuses[0].router_running);
        assert_eq!(statuses[0].address, AddressCheck::Skipped);
    }

    #[test]
    fn test_status_records_inspection_failure() {
        let topology = topology(
            json!({"10-rancher.conf": {"type": "rancher-bridge", "bridge": "docker0", "bridgeSubnet": "10.42.0.0/16"}}),
            "starting",
        );

        let statuses = collect_statuses(&topology, |bridge, _| {
            Err(InterfaceError::List {
                name: bridge.to_string(),
                source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
            })
        });

        assert_eq!(
            statuses[0].address,
            AddressCheck::Failed("failed to list addresses of interface docker0: denied".to_string())
        );
        assert!(statuses[0].router_running);
    }
}
