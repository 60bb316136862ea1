/*!
Test Harness pour le résolveur de topologie locale

Facilite l'écriture de tests avec:
- Setup automatique du mock de métadonnées
- Exécution du fetch + résolution
- Assertions sur les réseaux locaux et les routeurs
*/

use crate::metadata_stub::{FetchStep, MockMetadataClient};
use anyhow::Result;
use hostnet_resolver::{
    resolve_local_from_metadata, DriverSelection, Host, LocalTopology, MetadataSnapshot, Network,
    Service,
};

/// Harness de test complet pour le résolveur
pub struct TestHarness {
    pub metadata: MockMetadataClient,
    last: Option<LocalTopology>,
}

impl TestHarness {
    /// Crée un nouveau harness avec un snapshot vide
    pub fn new() -> Self {
        env_logger::builder().is_test(true).try_init().ok(); // Init logging pour tests

        Self {
            metadata: MockMetadataClient::default(),
            last: None,
        }
    }

    /// Configure l'hôte local
    pub fn with_host(self, host: Host) -> Self {
        self.metadata.update_snapshot(|s| s.host = host);
        self
    }

    /// Ajoute des réseaux au snapshot
    pub fn with_networks(self, networks: impl IntoIterator<Item = Network>) -> Self {
        self.metadata.update_snapshot(|s| s.networks.extend(networks));
        self
    }

    /// Ajoute des services au snapshot
    pub fn with_services(self, services: impl IntoIterator<Item = Service>) -> Self {
        self.metadata.update_snapshot(|s| s.services.extend(services));
        self
    }

    /// Configure le snapshot complet
    pub fn with_snapshot(self, snapshot: MetadataSnapshot) -> Self {
        self.metadata.set_snapshot(snapshot);
        self
    }

    /// Exécute fetch + résolution et garde le résultat pour les assertions
    pub fn resolve(&mut self) -> Result<&LocalTopology> {
        let topology = resolve_local_from_metadata(&self.metadata)?;
        log::info!(
            "🔍 Resolved {} local networks, {} routers ({:?})",
            topology.networks.len(),
            topology.routers.len(),
            topology.driver_selection
        );
        Ok(self.last.insert(topology))
    }

    fn topology(&self) -> Result<&LocalTopology> {
        self.last
            .as_ref()
            .ok_or_else(|| anyhow::anyhow!("resolve() has not run yet"))
    }

    /// Assert que les réseaux locaux sont exactement ceux-ci, dans cet ordre
    pub fn assert_local_networks(&self, expected: &[&str]) -> Result<()> {
        let actual: Vec<&str> = self
            .topology()?
            .networks
            .iter()
            .map(|n| n.uuid.as_str())
            .collect();

        if actual != expected {
            anyhow::bail!("Local networks mismatch: expected {:?}, got {:?}", expected, actual);
        }
        log::info!("✅ Local networks: {:?}", actual);
        Ok(())
    }

    /// Assert que le routeur du réseau est le conteneur donné
    pub fn assert_router(&self, network_uuid: &str, container_uuid: &str) -> Result<()> {
        match self.topology()?.router_for(network_uuid) {
            Some(router) if router.uuid == container_uuid => {
                log::info!("✅ Router of {}: {}", network_uuid, container_uuid);
                Ok(())
            }
            Some(router) => anyhow::bail!(
                "Router mismatch for {}: expected {}, got {}",
                network_uuid,
                container_uuid,
                router.uuid
            ),
            None => anyhow::bail!("No router found for network {}", network_uuid),
        }
    }

    /// Assert qu'aucun routeur n'existe pour le réseau
    pub fn assert_no_router(&self, network_uuid: &str) -> Result<()> {
        if let Some(router) = self.topology()?.router_for(network_uuid) {
            anyhow::bail!("Unexpected router {} for network {}", router.uuid, network_uuid);
        }
        Ok(())
    }

    /// Assert sur le résultat de la sélection du driver
    pub fn assert_driver_selection(&self, expected: DriverSelection) -> Result<()> {
        let actual = self.topology()?.driver_selection;
        if actual != expected {
            anyhow::bail!("Driver selection mismatch: expected {:?}, got {:?}", expected, actual);
        }
        Ok(())
    }

    /// Assert sur la séquence de fetchs effectués
    pub fn assert_calls(&self, expected: &[FetchStep]) -> Result<()> {
        let actual = self.metadata.get_calls();
        if actual != expected {
            anyhow::bail!("Fetch sequence mismatch: expected {:?}, got {:?}", expected, actual);
        }
        Ok(())
    }

    /// Reset le harness pour un nouveau test
    pub fn reset(&mut self) {
        self.metadata.clear();
        self.metadata.recover();
        self.last = None;
        log::info!("🧹 Test harness reset");
    }
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{host, rancher_bridge_conf, ContainerBuilder, NetworkBuilder, StackBuilder};

    #[test]
    fn test_harness_basic_functionality() {
        let mut harness = TestHarness::new()
            .with_host(host("host-a", "env-1", &[]))
            .with_networks([NetworkBuilder::new("env-1")
                .uuid("net-1")
                .cni_file("10-rancher.conf", rancher_bridge_conf("docker0", "10.42.0.0/16"))
                .build()])
            .with_services(
                StackBuilder::new()
                    .router(ContainerBuilder::new("host-a", "net-1").uuid("c-1").build())
                    .build(),
            );

        harness.resolve().unwrap();

        harness.assert_local_networks(&["net-1"]).unwrap();
        harness.assert_router("net-1", "c-1").unwrap();
        harness.assert_driver_selection(DriverSelection::Unique).unwrap();
        harness
            .assert_calls(&[FetchStep::Networks, FetchStep::SelfHost, FetchStep::Services])
            .unwrap();
    }

    #[test]
    fn test_assertions_fail_before_resolve() {
        let harness = TestHarness::new();
        assert!(harness.assert_local_networks(&[]).is_err());
    }

    #[test]
    fn test_reset() {
        let mut harness = TestHarness::new();
        harness.metadata.fail_at(FetchStep::Networks);
        assert!(harness.resolve().is_err());

        harness.reset();
        assert!(harness.metadata.get_calls().is_empty());
        assert!(harness.resolve().is_ok());
    }
}
