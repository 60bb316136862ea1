/*!
Builders de fixtures pour les snapshots de métadonnées

Construisent des hôtes, réseaux, services et conteneurs cohérents entre eux,
avec des UUID générés quand le test ne les fixe pas.
*/

use hostnet_resolver::topology::{CNI_DRIVER_SERVICE_NAME, NETWORK_DRIVER_SERVICE_KIND};
use hostnet_resolver::{Container, Host, Network, Service, CNI_CONFIG_KEY};
use serde_json::{Map, Value};
use uuid::Uuid;

fn new_uuid() -> String {
    Uuid::new_v4().to_string()
}

/// Crée un hôte dans un environnement, avec des labels
pub fn host<S: Into<String>>(uuid: S, environment_uuid: S, labels: &[(&str, &str)]) -> Host {
    Host {
        uuid: uuid.into(),
        environment_uuid: environment_uuid.into(),
        labels: labels
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect(),
        ..Host::default()
    }
}

/// Crée un fichier CNI rancher-bridge
pub fn rancher_bridge_conf(bridge: &str, bridge_subnet: &str) -> Value {
    serde_json::json!({
        "name": "rancher-cni-network",
        "type": "rancher-bridge",
        "bridge": bridge,
        "bridgeSubnet": bridge_subnet,
        "isDebugLevel": "false",
        "ipam": {
            "type": "rancher-cni-ipam",
            "logToFile": "/var/log/rancher-cni.log"
        }
    })
}

/// Builder de réseau
pub struct NetworkBuilder {
    network: Network,
    cni_files: Option<Map<String, Value>>,
}

impl NetworkBuilder {
    pub fn new<S: Into<String>>(environment_uuid: S) -> Self {
        let uuid = new_uuid();
        Self {
            network: Network {
                name: format!("network-{}", &uuid[..8]),
                uuid,
                environment_uuid: environment_uuid.into(),
                ..Network::default()
            },
            cni_files: None,
        }
    }

    pub fn uuid<S: Into<String>>(mut self, uuid: S) -> Self {
        self.network.uuid = uuid.into();
        self
    }

    pub fn name<S: Into<String>>(mut self, name: S) -> Self {
        self.network.name = name.into();
        self
    }

    /// Ajoute un fichier de config CNI
    pub fn cni_file<S: Into<String>>(mut self, file_name: S, conf: Value) -> Self {
        self.cni_files
            .get_or_insert_with(Map::new)
            .insert(file_name.into(), conf);
        self
    }

    /// Ajoute une valeur brute sous `cniConfig` (ex: forme invalide)
    pub fn raw_cni_config(mut self, value: Value) -> Self {
        self.cni_files = None;
        self.network.metadata.insert(CNI_CONFIG_KEY.into(), value);
        self
    }

    pub fn build(mut self) -> Network {
        if let Some(files) = self.cni_files {
            self.network
                .metadata
                .insert(CNI_CONFIG_KEY.into(), Value::Object(files));
        }
        self.network
    }
}

/// Builder de conteneur
pub struct ContainerBuilder {
    container: Container,
}

impl ContainerBuilder {
    pub fn new<S: Into<String>>(host_uuid: S, network_uuid: S) -> Self {
        Self {
            container: Container {
                uuid: new_uuid(),
                host_uuid: host_uuid.into(),
                network_uuid: network_uuid.into(),
                state: "running".into(),
                ..Container::default()
            },
        }
    }

    pub fn uuid<S: Into<String>>(mut self, uuid: S) -> Self {
        self.container.uuid = uuid.into();
        self
    }

    pub fn state<S: Into<String>>(mut self, state: S) -> Self {
        self.container.state = state.into();
        self
    }

    pub fn build(self) -> Container {
        self.container
    }
}

/// Builder de service
pub struct ServiceBuilder {
    service: Service,
}

impl ServiceBuilder {
    pub fn new<S: Into<String>>(name: S, stack_uuid: S) -> Self {
        let name = name.into();
        Self {
            service: Service {
                uuid: new_uuid(),
                primary_service_name: name.clone(),
                name,
                kind: "service".into(),
                stack_uuid: stack_uuid.into(),
                ..Service::default()
            },
        }
    }

    pub fn uuid<S: Into<String>>(mut self, uuid: S) -> Self {
        self.service.uuid = uuid.into();
        self
    }

    pub fn kind<S: Into<String>>(mut self, kind: S) -> Self {
        self.service.kind = kind.into();
        self
    }

    pub fn primary_service_name<S: Into<String>>(mut self, primary: S) -> Self {
        self.service.primary_service_name = primary.into();
        self
    }

    pub fn container(mut self, container: Container) -> Self {
        self.service.containers.push(container);
        self
    }

    pub fn build(self) -> Service {
        self.service
    }
}

/// Builder d'une stack de plugin réseau: un service driver + le service
/// primaire qui porte les conteneurs routeurs
pub struct StackBuilder {
    stack_uuid: String,
    driver_name: String,
    primary_name: String,
    routers: Vec<Container>,
}

impl StackBuilder {
    pub fn new() -> Self {
        Self {
            stack_uuid: new_uuid(),
            driver_name: CNI_DRIVER_SERVICE_NAME.into(),
            primary_name: "ipsec".into(),
            routers: Vec::new(),
        }
    }

    pub fn stack_uuid<S: Into<String>>(mut self, stack_uuid: S) -> Self {
        self.stack_uuid = stack_uuid.into();
        self
    }

    pub fn driver_name<S: Into<String>>(mut self, name: S) -> Self {
        self.driver_name = name.into();
        self
    }

    pub fn primary_name<S: Into<String>>(mut self, name: S) -> Self {
        self.primary_name = name.into();
        self
    }

    /// Ajoute un conteneur routeur au service primaire
    pub fn router(mut self, container: Container) -> Self {
        self.routers.push(container);
        self
    }

    /// Retourne `[driver, primaire]`
    pub fn build(self) -> Vec<Service> {
        let driver = ServiceBuilder::new(self.driver_name.as_str(), self.stack_uuid.as_str())
            .kind(NETWORK_DRIVER_SERVICE_KIND)
            .primary_service_name(self.primary_name.as_str())
            .build();

        let primary = self
            .routers
            .into_iter()
            .fold(
                ServiceBuilder::new(self.primary_name.as_str(), self.stack_uuid.as_str()),
                ServiceBuilder::container,
            )
            .build();

        vec![driver, primary]
    }
}

impl Default for StackBuilder {
    fn default() -> Self {
        Self::new()
    }
}
