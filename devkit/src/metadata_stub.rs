/*!
Mock du service de métadonnées pour développement sans cluster

Sert un snapshot en mémoire via le trait `MetadataClient`, enregistre chaque
fetch effectué et permet de simuler une panne à une étape donnée.
*/

use hostnet_resolver::{Host, MetadataClient, MetadataSnapshot, Network, Service};
use std::fmt;
use std::sync::{Arc, Mutex};

/// Étapes de fetch, dans l'ordre où le résolveur les appelle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchStep {
    Networks,
    SelfHost,
    Services,
}

impl fmt::Display for FetchStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FetchStep::Networks => "networks",
            FetchStep::SelfHost => "self host",
            FetchStep::Services => "services",
        };
        f.write_str(name)
    }
}

/// Erreur simulée renvoyée par le mock
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("simulated metadata failure while fetching {step}")]
pub struct StubError {
    pub step: FetchStep,
}

/// Mock client qui simule le service de métadonnées
#[derive(Clone, Default)]
pub struct MockMetadataClient {
    snapshot: Arc<Mutex<MetadataSnapshot>>,
    fail_at: Arc<Mutex<Option<FetchStep>>>,
    calls: Arc<Mutex<Vec<FetchStep>>>,
}

impl MockMetadataClient {
    pub fn new(snapshot: MetadataSnapshot) -> Self {
        Self {
            snapshot: Arc::new(Mutex::new(snapshot)),
            ..Self::default()
        }
    }

    /// Fait échouer le fetch de l'étape donnée (et seulement celle-ci)
    pub fn fail_at(&self, step: FetchStep) {
        *self.fail_at.lock().unwrap() = Some(step);
    }

    /// Rétablit un service de métadonnées sain
    pub fn recover(&self) {
        *self.fail_at.lock().unwrap() = None;
    }

    /// Remplace le snapshot servi
    pub fn set_snapshot(&self, snapshot: MetadataSnapshot) {
        *self.snapshot.lock().unwrap() = snapshot;
    }

    /// Modifie le snapshot servi sur place
    pub fn update_snapshot(&self, update: impl FnOnce(&mut MetadataSnapshot)) {
        update(&mut self.snapshot.lock().unwrap());
    }

    /// Récupère les fetchs effectués (pour assertions de tests)
    pub fn get_calls(&self) -> Vec<FetchStep> {
        self.calls.lock().unwrap().clone()
    }

    /// Reset les fetchs enregistrés
    pub fn clear(&self) {
        self.calls.lock().unwrap().clear();
    }

    fn fetch<T>(&self, step: FetchStep, read: impl FnOnce(&MetadataSnapshot) -> T) -> Result<T, StubError> {
        self.calls.lock().unwrap().push(step);

        if *self.fail_at.lock().unwrap() == Some(step) {
            log::warn!("💥 [MOCK] Failing fetch of {}", step);
            return Err(StubError { step });
        }

        log::info!("📥 [MOCK] Served {}", step);
        Ok(read(&self.snapshot.lock().unwrap()))
    }
}

impl MetadataClient for MockMetadataClient {
    type Error = StubError;

    fn get_networks(&self) -> Result<Vec<Network>, Self::Error> {
        self.fetch(FetchStep::Networks, |s| s.networks.clone())
    }

    fn get_self_host(&self) -> Result<Host, Self::Error> {
        self.fetch(FetchStep::SelfHost, |s| s.host.clone())
    }

    fn get_services(&self) -> Result<Vec<Service>, Self::Error> {
        self.fetch(FetchStep::Services, |s| s.services.clone())
    }
}
