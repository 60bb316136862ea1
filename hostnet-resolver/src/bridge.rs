//! Bridge device and subnet lookup from a network's CNI config

use crate::keywords::substitute;
use crate::models::{Host, Network};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

/// CNI plugin type that owns the host bridge
pub const RANCHER_BRIDGE_TYPE: &str = "rancher-bridge";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BridgeInfo {
    pub bridge: String,
    pub bridge_subnet: String,
}

/// Figure out the bridge name and subnet from the CNI config of `network`.
///
/// Config files are visited in file-name order, each one with host keywords
/// substituted. The first `rancher-bridge` file naming a bridge wins and
/// stops the walk. Without such a file the bridge is empty and the subnet is
/// whatever the last visited file carried (empty when it had none).
///
/// The network itself is not modified; substitution runs on copies.
pub fn get_bridge_info(network: &Network, host: &Host) -> BridgeInfo {
    let mut info = BridgeInfo::default();

    let Some(files) = network.cni_config() else {
        return info;
    };

    for (file_name, file) in files {
        let file = substitute(file.clone(), host);
        let cni_type = string_field(&file, "type");
        let bridge = string_field(&file, "bridge");
        info.bridge_subnet = string_field(&file, "bridgeSubnet").to_string();

        if cni_type == RANCHER_BRIDGE_TYPE && !bridge.is_empty() {
            debug!("Network {} uses bridge {} from {}", network.uuid, bridge, file_name);
            info.bridge = bridge.to_string();
            break;
        }
    }

    info
}

fn string_field<'a>(file: &'a Value, key: &str) -> &'a str {
    file.get(key).and_then(Value::as_str).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CNI_CONFIG_KEY;
    use serde_json::json;

    fn network_with_cni(cni: Value) -> Network {
        let mut network = Network {
            uuid: "net-1".into(),
            environment_uuid: "env-1".into(),
            ..Network::default()
        };
        network.metadata.insert(CNI_CONFIG_KEY.into(), cni);
        network
    }

    #[test]
    fn test_single_bridge_file() {
        let network = network_with_cni(json!({
            "10-rancher.conf": {
                "type": "rancher-bridge",
                "bridge": "docker0",
                "bridgeSubnet": "10.42.0.0/16"
            }
        }));

        let info = get_bridge_info(&network, &Host::default());
        assert_eq!(info.bridge, "docker0");
        assert_eq!(info.bridge_subnet, "10.42.0.0/16");
    }

    #[test]
    fn test_no_bridge_file_keeps_last_subnet() {
        let network = network_with_cni(json!({
            "10-a.conf": {"type": "bridge", "bridge": "cni0", "bridgeSubnet": "10.1.0.0/16"},
            "20-b.conf": {"type": "macvlan", "bridgeSubnet": "10.2.0.0/16"}
        }));

        let info = get_bridge_info(&network, &Host::default());
        assert_eq!(info.bridge, "");
        assert_eq!(info.bridge_subnet, "10.2.0.0/16");
    }

    #[test]
    fn test_first_matching_file_stops_the_walk() {
        let network = network_with_cni(json!({
            "10-first.conf": {"type": "rancher-bridge", "bridge": "docker0", "bridgeSubnet": "10.42.0.0/16"},
            "20-second.conf": {"type": "rancher-bridge", "bridge": "br1", "bridgeSubnet": "10.43.0.0/16"}
        }));

        let info = get_bridge_info(&network, &Host::default());
        assert_eq!(info.bridge, "docker0");
        assert_eq!(info.bridge_subnet, "10.42.0.0/16");
    }

    #[test]
    fn test_rancher_bridge_without_name_is_skipped() {
        let network = network_with_cni(json!({
            "10-empty.conf": {"type": "rancher-bridge", "bridge": "", "bridgeSubnet": "10.9.0.0/16"},
            "20-real.conf": {"type": "rancher-bridge", "bridge": "docker0"}
        }));

        let info = get_bridge_info(&network, &Host::default());
        assert_eq!(info.bridge, "docker0");
        assert_eq!(info.bridge_subnet, "");
    }

    #[test]
    fn test_bridge_from_host_label() {
        let host = Host {
            labels: [("bridge".to_string(), "br-host".to_string())].into_iter().collect(),
            ..Host::default()
        };
        let network = network_with_cni(json!({
            "10-rancher.conf": {
                "type": "rancher-bridge",
                "bridge": "__host_label__: bridge",
                "bridgeSubnet": "10.42.0.0/16"
            }
        }));

        let info = get_bridge_info(&network, &host);
        assert_eq!(info.bridge, "br-host");

        // source metadata stays untouched
        assert_eq!(
            network.cni_config().unwrap()["10-rancher.conf"]["bridge"],
            "__host_label__: bridge"
        );
    }

    #[test]
    fn test_missing_or_malformed_cni_config() {
        let info = get_bridge_info(&Network::default(), &Host::default());
        assert_eq!(info, BridgeInfo::default());

        let network = network_with_cni(json!(["not", "a", "map"]));
        assert_eq!(get_bridge_info(&network, &Host::default()), BridgeInfo::default());

        let network = network_with_cni(json!({"10-odd.conf": "just a string"}));
        assert_eq!(get_bridge_info(&network, &Host::default()), BridgeInfo::default());
    }
}
