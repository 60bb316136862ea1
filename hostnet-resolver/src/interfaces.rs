//! Host network interface inspection
//!
//! Answers whether a bridge device already carries an address from the
//! subnet its network is configured with. Only IPv4 addresses are inspected,
//! an IPv6 subnet is never found on a bridge.

use if_addrs::{get_if_addrs, IfAddr};
use ipnet::{IpNet, Ipv4Net};
use std::net::Ipv4Addr;
use thiserror::Error;
use tracing::{debug, error};

#[derive(Debug, Error)]
pub enum InterfaceError {
    #[error("failed to look up interface {name}: {source}")]
    Lookup {
        name: String,
        #[source]
        source: nix::Error,
    },
    #[error("failed to list addresses of interface {name}: {source}")]
    List {
        name: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid subnet {subnet}: {source}")]
    InvalidSubnet {
        subnet: String,
        #[source]
        source: ipnet::AddrParseError,
    },
}

/// Check if `interface_name` has an IPv4 address whose network contains the
/// network address of `subnet` (a CIDR such as `10.42.0.0/16`). An IPv6
/// subnet parses but is never found.
pub fn has_address_from_subnet(interface_name: &str, subnet: &str) -> Result<bool, InterfaceError> {
    lookup_interface(interface_name)?;
    let assigned = interface_ipv4_networks(interface_name)?;
    let found = match parse_subnet(subnet)? {
        IpNet::V4(expected) => contains_subnet(&assigned, &expected),
        IpNet::V6(_) => {
            debug!("Subnet {} is IPv6, bridges only carry IPv4 addresses", subnet);
            false
        }
    };
    debug!("Interface {} has address from {}: {}", interface_name, subnet, found);
    Ok(found)
}

/// Whether any of `assigned` contains the network address of `subnet`
pub fn contains_subnet(assigned: &[Ipv4Net], subnet: &Ipv4Net) -> bool {
    let expected = subnet.network();
    assigned.iter().any(|net| net.contains(&expected))
}

/// Kernel index of the named interface
fn lookup_interface(name: &str) -> Result<u32, InterfaceError> {
    nix::net::if_::if_nametoindex(name).map_err(|source| InterfaceError::Lookup {
        name: name.to_string(),
        source,
    })
}

/// IPv4 networks assigned to the named interface
fn interface_ipv4_networks(name: &str) -> Result<Vec<Ipv4Net>, InterfaceError> {
    let addrs = get_if_addrs().map_err(|source| InterfaceError::List {
        name: name.to_string(),
        source,
    })?;

    let networks = addrs
        .into_iter()
        .filter(|iface| iface.name == name)
        .filter_map(|iface| match iface.addr {
            IfAddr::V4(v4) => to_network(v4.ip, v4.netmask),
            IfAddr::V6(_) => None,
        })
        .collect();

    Ok(networks)
}

fn to_network(ip: Ipv4Addr, netmask: Ipv4Addr) -> Option<Ipv4Net> {
    match ipnet::ipv4_mask_to_prefix(netmask).and_then(|prefix| Ipv4Net::new(ip, prefix)) {
        Ok(net) => Some(net),
        Err(e) => {
            debug!("Skipping address {} with netmask {}: {}", ip, netmask, e);
            None
        }
    }
}

fn parse_subnet(subnet: &str) -> Result<IpNet, InterfaceError> {
    subnet.parse::<IpNet>().map_err(|source| {
        error!("Error parsing subnet: {}", subnet);
        InterfaceError::InvalidSubnet {
            subnet: subnet.to_string(),
            source,
        }
    })
}
