//! Metadata snapshot models
//!
//! Read-only views of the hosts, networks, services and containers served by
//! the cluster metadata service. Field names follow the service's snake_case
//! JSON and every field defaults when absent.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;

/// Metadata key holding a network's CNI config files
pub const CNI_CONFIG_KEY: &str = "cniConfig";

/// Container states treated as running
const RUNNING_STATES: &[&str] = &["running", "starting", "stopping"];

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Host {
    pub uuid: String,
    pub name: String,
    pub hostname: String,
    pub environment_uuid: String,
    pub labels: HashMap<String, String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Network {
    pub uuid: String,
    pub name: String,
    pub environment_uuid: String,
    pub metadata: Map<String, Value>,
}

impl Network {
    /// CNI config files keyed by file name, when `cniConfig` is a mapping
    pub fn cni_config(&self) -> Option<&Map<String, Value>> {
        self.metadata.get(CNI_CONFIG_KEY).and_then(Value::as_object)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Service {
    pub uuid: String,
    pub name: String,
    pub kind: String,
    pub stack_uuid: String,
    pub stack_name: String,
    pub primary_service_name: String,
    pub containers: Vec<Container>,
}

impl Service {
    /// True for the stack's designated primary service
    pub fn is_primary(&self) -> bool {
        self.name == self.primary_service_name
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Container {
    pub uuid: String,
    pub name: String,
    pub host_uuid: String,
    pub network_uuid: String,
    pub state: String,
    pub primary_ip: String,
}

impl Container {
    /// Whether the container is in one of the states considered running
    pub fn is_considered_running(&self) -> bool {
        RUNNING_STATES.contains(&self.state.as_str())
    }
}

/// Router container per network UUID, for a single host
pub type LocalRouterMap = HashMap<String, Container>;

/// Everything one resolution pass reads, as fetched at one point in time
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MetadataSnapshot {
    pub host: Host,
    pub networks: Vec<Network>,
    pub services: Vec<Service>,
}
