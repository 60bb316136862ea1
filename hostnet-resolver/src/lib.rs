//! Hostnet Resolver - Local network topology for container-networking agents
//!
//! Given a metadata snapshot of the cluster, this crate decides which overlay
//! networks a host must configure and which container acts as each network's
//! router on that host:
//! - Host keyword substitution in CNI configs (`__host_label__: <label>`)
//! - Bridge name/subnet extraction from a network's CNI config
//! - Network driver service selection and per-host router lookup
//! - Fetch-then-resolve entry point over a [`MetadataClient`]
//! - Bridge address inspection on the host's interfaces
//!
//! Everything here is synchronous and works on snapshots handed in by the
//! caller. Shape problems in the metadata degrade to empty results; only
//! metadata fetches and interface inspection return errors.

pub mod bridge;
pub mod interfaces;
pub mod keywords;
pub mod metadata;
pub mod models;
pub mod topology;

pub use bridge::{get_bridge_info, BridgeInfo};
pub use interfaces::{has_address_from_subnet, InterfaceError};
pub use keywords::{substitute, substitute_in_place, ConfigNode, HOST_LABEL_KEYWORD};
pub use metadata::{resolve_local_from_metadata, MetadataClient};
pub use models::{Container, Host, LocalRouterMap, MetadataSnapshot, Network, Service, CNI_CONFIG_KEY};
pub use topology::{resolve_local, DriverSelection, LocalTopology};
