/*!
# Hostnet DevKit - Stubs et Utilitaires pour Développement

Bibliothèque facilitant les tests du résolveur de topologie locale avec:
- Stub du service de métadonnées (injection d'erreurs par étape de fetch)
- Builders de fixtures (hôtes, réseaux, services, conteneurs)
- Harness de test avec assertions sur les réseaux et routeurs locaux
*/

pub mod metadata_stub;
pub mod fixtures;
pub mod test_utils;

pub use metadata_stub::{FetchStep, MockMetadataClient, StubError};
pub use fixtures::{ContainerBuilder, NetworkBuilder, ServiceBuilder, StackBuilder};
pub use test_utils::TestHarness;
