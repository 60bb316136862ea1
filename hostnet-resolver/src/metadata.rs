//! Metadata collaborator interface and the fetch-then-resolve entry point

use crate::models::{Host, MetadataSnapshot, Network, Service};
use crate::topology::{resolve_local, LocalTopology};
use std::convert::Infallible;
use tracing::debug;

/// Source of the cluster metadata snapshot
///
/// Implementations own transport, caching and timeouts. Their errors reach
/// callers of [`resolve_local_from_metadata`] unchanged.
pub trait MetadataClient {
    type Error: std::error::Error + Send + Sync + 'static;

    /// All networks visible to this host
    fn get_networks(&self) -> Result<Vec<Network>, Self::Error>;

    /// The host this agent runs on
    fn get_self_host(&self) -> Result<Host, Self::Error>;

    /// All services, containers included
    fn get_services(&self) -> Result<Vec<Service>, Self::Error>;
}

/// An already fetched snapshot serves itself
impl MetadataClient for MetadataSnapshot {
    type Error = Infallible;

    fn get_networks(&self) -> Result<Vec<Network>, Self::Error> {
        Ok(self.networks.clone())
    }

    fn get_self_host(&self) -> Result<Host, Self::Error> {
        Ok(self.host.clone())
    }

    fn get_services(&self) -> Result<Vec<Service>, Self::Error> {
        Ok(self.services.clone())
    }
}

/// Fetch networks, host and services, in that order, and resolve the local
/// topology. The first failing fetch aborts with its error; nothing is
/// retried and later fetches are not attempted.
pub fn resolve_local_from_metadata<C>(client: &C) -> Result<LocalTopology, C::Error>
where
    C: MetadataClient + ?Sized,
{
    let networks = client.get_networks()?;
    let host = client.get_self_host()?;
    let services = client.get_services()?;

    debug!(
        "Fetched {} networks and {} services for host {}",
        networks.len(),
        services.len(),
        host.uuid
    );

    Ok(resolve_local(&networks, &host, &services))
}
