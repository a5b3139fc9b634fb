//! Warren provider implementation
//!
//! Dispatches the orchestrator's untyped attribute sets to the typed
//! reconcilers and data sources.

use crate::client::WarrenClient;
use crate::config::ProviderConfig;
use crate::data_sources::{LocationDataSource, NetworkDataSource, OsBaseImageDataSource};
use crate::model::{DiskModel, FloatingIpModel, NetworkModel, VirtualMachineModel};
use crate::registry::ClientRegistry;
use crate::resources::{
    DiskReconciler, FloatingIpReconciler, NetworkReconciler, VirtualMachineReconciler,
};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::{Arc, RwLock};
use warren_cloud::{
    AuthStatus, CloudError, Plan, Reconciler, ResourceKind, ResourceProvider, ResourceState,
    Result, Schema,
};

/// Data source type names
pub const DATA_SOURCE_TYPES: [&str; 3] = [
    "warren_location",
    "warren_network",
    "warren_os_base_image",
];

struct Session {
    token: String,
    client: Arc<WarrenClient>,
}

/// Warren platform provider
pub struct WarrenProvider {
    registry: ClientRegistry,
    session: RwLock<Option<Session>>,
}

impl Default for WarrenProvider {
    fn default() -> Self {
        Self::new(ClientRegistry::new())
    }
}

impl WarrenProvider {
    /// Create an unconfigured provider sharing the given client registry
    pub fn new(registry: ClientRegistry) -> Self {
        Self {
            registry,
            session: RwLock::new(None),
        }
    }

    /// Resolve the configuration and bind a client to this provider
    ///
    /// Without an explicit API URL an already registered client for the same
    /// token is reused.
    pub fn configure(&self, config: ProviderConfig) -> Result<()> {
        let settings = config.resolve()?;

        let reusable = if settings.explicit_url {
            None
        } else {
            self.registry.get(&settings.api_token)
        };

        let client = match reusable {
            Some(client) => {
                tracing::debug!("Reusing registered client for {}", client.base_url());
                client
            }
            None => {
                let client = Arc::new(
                    WarrenClient::from_settings(&settings)
                        .map_err(|e| CloudError::InvalidConfig(e.to_string()))?,
                );
                self.registry.insert(settings.api_token.clone(), Arc::clone(&client));
                client
            }
        };

        tracing::info!(
            "Configured Warren provider for {} (location: {})",
            client.base_url(),
            client.location_slug().unwrap_or("default")
        );

        let mut session = self.session.write().unwrap_or_else(|e| e.into_inner());
        *session = Some(Session {
            token: settings.api_token,
            client,
        });
        Ok(())
    }

    /// Drop the session and its registry entry
    pub fn shutdown(&self) {
        let mut session = self.session.write().unwrap_or_else(|e| e.into_inner());
        if let Some(session) = session.take() {
            self.registry.remove(&session.token);
            tracing::debug!("Warren provider shut down");
        }
    }

    pub fn is_configured(&self) -> bool {
        self.session
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .is_some()
    }

    /// Client of the current session
    pub fn client(&self) -> Result<Arc<WarrenClient>> {
        self.session
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .as_ref()
            .map(|session| Arc::clone(&session.client))
            .ok_or(CloudError::NotConfigured)
    }

    /// Look up reference data; returns the filled in attribute set
    pub async fn read_data_source(&self, data_type: &str, query: Value) -> Result<Value> {
        let client = self.client()?;

        match data_type {
            "warren_location" => {
                let model = LocationDataSource::new(client).read(decode(query)?).await?;
                Ok(serde_json::to_value(model)?)
            }
            "warren_network" => {
                let model = NetworkDataSource::new(client).read(decode(query)?).await?;
                Ok(serde_json::to_value(model)?)
            }
            "warren_os_base_image" => {
                let model = OsBaseImageDataSource::new(client).read(decode(query)?).await?;
                Ok(serde_json::to_value(model)?)
            }
            other => Err(CloudError::UnknownResourceType(other.to_string())),
        }
    }
}

fn managed_kind(resource_type: &str) -> Result<ResourceKind> {
    ResourceKind::from_type_name(resource_type)
        .ok_or_else(|| CloudError::UnknownResourceType(resource_type.to_string()))
}

fn decode<T: DeserializeOwned>(value: Value) -> Result<T> {
    Ok(serde_json::from_value(value)?)
}

fn state<M: Schema>(model: &M) -> Result<ResourceState> {
    ResourceState::from_model(model)
}

fn plan<M: Schema>(prior: Option<&Value>, planned: Option<&Value>) -> Result<Plan> {
    let prior: Option<M> = prior.cloned().map(decode).transpose()?;
    let planned: Option<M> = planned.cloned().map(decode).transpose()?;
    Plan::between(prior.as_ref(), planned.as_ref())
}

async fn create_with<R: Reconciler>(reconciler: R, planned: Value) -> Result<ResourceState> {
    let model = reconciler.create(decode(planned)?).await?;
    state(&model)
}

async fn read_with<R: Reconciler>(reconciler: R, current: Value) -> Result<Option<ResourceState>> {
    match reconciler.read(decode(current)?).await?.found() {
        Some(model) => Ok(Some(state(&model)?)),
        None => Ok(None),
    }
}

async fn update_with<R: Reconciler>(reconciler: R, prior: Value, planned: Value) -> Result<ResourceState> {
    let model = reconciler.update(decode(prior)?, decode(planned)?).await?;
    state(&model)
}

async fn delete_with<R: Reconciler>(reconciler: R, current: Value) -> Result<()> {
    let current: R::Model = decode(current)?;
    reconciler.delete(&current).await
}

async fn import_with<R: Reconciler>(reconciler: R, id: &str) -> Result<ResourceState> {
    let model = reconciler.import(id).await?;
    state(&model)
}

fn unmanaged(kind: ResourceKind) -> CloudError {
    CloudError::UnknownResourceType(kind.type_name().to_string())
}

#[async_trait]
impl ResourceProvider for WarrenProvider {
    fn name(&self) -> &str {
        "warren"
    }

    fn display_name(&self) -> &str {
        "Warren Platform"
    }

    fn resource_types(&self) -> Vec<&'static str> {
        ResourceKind::MANAGED.iter().map(|k| k.type_name()).collect()
    }

    async fn check_auth(&self) -> Result<AuthStatus> {
        let client = self.client()?;

        match client.locations().list().await {
            Ok(locations) => {
                let slug = client.location_slug().unwrap_or("default");
                Ok(AuthStatus::ok(format!(
                    "{} (location {}, {} locations available)",
                    client.base_url(),
                    slug,
                    locations.len()
                )))
            }
            Err(e) => Ok(AuthStatus::failed(e.to_string())),
        }
    }

    fn diff(&self, resource_type: &str, prior: Option<&Value>, planned: Option<&Value>) -> Result<Plan> {
        match managed_kind(resource_type)? {
            ResourceKind::Disk => plan::<DiskModel>(prior, planned),
            ResourceKind::FloatingIp => plan::<FloatingIpModel>(prior, planned),
            ResourceKind::Network => plan::<NetworkModel>(prior, planned),
            ResourceKind::VirtualMachine => plan::<VirtualMachineModel>(prior, planned),
            kind => Err(unmanaged(kind)),
        }
    }

    async fn create(&self, resource_type: &str, planned: Value) -> Result<ResourceState> {
        let kind = managed_kind(resource_type)?;
        let client = self.client()?;

        match kind {
            ResourceKind::Disk => create_with(DiskReconciler::new(client), planned).await,
            ResourceKind::FloatingIp => create_with(FloatingIpReconciler::new(client), planned).await,
            ResourceKind::Network => create_with(NetworkReconciler::new(client), planned).await,
            ResourceKind::VirtualMachine => {
                create_with(VirtualMachineReconciler::new(client), planned).await
            }
            kind => Err(unmanaged(kind)),
        }
    }

    async fn read(&self, resource_type: &str, current: Value) -> Result<Option<ResourceState>> {
        let kind = managed_kind(resource_type)?;
        let client = self.client()?;

        match kind {
            ResourceKind::Disk => read_with(DiskReconciler::new(client), current).await,
            ResourceKind::FloatingIp => read_with(FloatingIpReconciler::new(client), current).await,
            ResourceKind::Network => read_with(NetworkReconciler::new(client), current).await,
            ResourceKind::VirtualMachine => {
                read_with(VirtualMachineReconciler::new(client), current).await
            }
            kind => Err(unmanaged(kind)),
        }
    }

    async fn update(&self, resource_type: &str, prior: Value, planned: Value) -> Result<ResourceState> {
        let kind = managed_kind(resource_type)?;
        let client = self.client()?;

        match kind {
            ResourceKind::Disk => update_with(DiskReconciler::new(client), prior, planned).await,
            ResourceKind::FloatingIp => {
                update_with(FloatingIpReconciler::new(client), prior, planned).await
            }
            ResourceKind::Network => update_with(NetworkReconciler::new(client), prior, planned).await,
            ResourceKind::VirtualMachine => {
                update_with(VirtualMachineReconciler::new(client), prior, planned).await
            }
            kind => Err(unmanaged(kind)),
        }
    }

    async fn delete(&self, resource_type: &str, current: Value) -> Result<()> {
        let kind = managed_kind(resource_type)?;
        let client = self.client()?;

        match kind {
            ResourceKind::Disk => delete_with(DiskReconciler::new(client), current).await,
            ResourceKind::FloatingIp => delete_with(FloatingIpReconciler::new(client), current).await,
            ResourceKind::Network => delete_with(NetworkReconciler::new(client), current).await,
            ResourceKind::VirtualMachine => {
                delete_with(VirtualMachineReconciler::new(client), current).await
            }
            kind => Err(unmanaged(kind)),
        }
    }

    async fn import(&self, resource_type: &str, id: &str) -> Result<ResourceState> {
        let kind = managed_kind(resource_type)?;
        let client = self.client()?;

        match kind {
            ResourceKind::Disk => import_with(DiskReconciler::new(client), id).await,
            ResourceKind::FloatingIp => import_with(FloatingIpReconciler::new(client), id).await,
            ResourceKind::Network => import_with(NetworkReconciler::new(client), id).await,
            ResourceKind::VirtualMachine => {
                import_with(VirtualMachineReconciler::new(client), id).await
            }
            kind => Err(unmanaged(kind)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use warren_cloud::ActionType;

    fn configured() -> WarrenProvider {
        let provider = WarrenProvider::default();
        provider
            .configure(
                ProviderConfig::new("token-a")
                    .with_api_url("https://api.example.com/v1")
                    .with_location("tll"),
            )
            .unwrap();
        provider
    }

    #[test]
    fn test_provider_info() {
        let provider = WarrenProvider::default();
        assert_eq!(provider.name(), "warren");
        assert_eq!(
            provider.resource_types(),
            vec![
                "warren_disk",
                "warren_floating_ip",
                "warren_network",
                "warren_virtual_machine"
            ]
        );
    }

    #[test]
    fn test_unconfigured() {
        let provider = WarrenProvider::default();
        assert!(!provider.is_configured());
        assert!(matches!(provider.client(), Err(CloudError::NotConfigured)));
    }

    #[test]
    fn test_configure_and_shutdown() {
        let registry = ClientRegistry::new();
        let provider = WarrenProvider::new(registry.clone());
        provider
            .configure(ProviderConfig::new("token-a").with_api_url("https://api.example.com/v1/tll"))
            .unwrap();

        assert!(provider.is_configured());
        assert_eq!(provider.client().unwrap().location_slug(), Some("tll"));
        assert!(registry.get("token-a").is_some());

        provider.shutdown();
        assert!(!provider.is_configured());
        assert!(registry.get("token-a").is_none());
    }

    #[test]
    fn test_registered_client_is_reused_without_explicit_url() {
        let registry = ClientRegistry::new();
        let double = Arc::new(
            WarrenClient::builder()
                .api_url("http://127.0.0.1:9/v1")
                .api_token("token-a")
                .location_slug("cyc01")
                .build()
                .unwrap(),
        );
        registry.insert("token-a", Arc::clone(&double));

        let provider = WarrenProvider::new(registry);
        temp_env::with_vars_unset(["WARREN_API_URL", "WARREN_API_LOCATION"], || {
            provider.configure(ProviderConfig::new("token-a")).unwrap();
        });

        assert!(Arc::ptr_eq(&provider.client().unwrap(), &double));
    }

    #[test]
    fn test_unknown_resource_type() {
        let provider = configured();
        let err = provider.diff("aws_instance", None, None).unwrap_err();
        assert!(matches!(err, CloudError::UnknownResourceType(_)));

        let err = provider.diff("warren_location", None, None).unwrap_err();
        assert!(matches!(err, CloudError::UnknownResourceType(_)));
    }

    #[test]
    fn test_diff_dispatch() {
        let provider = configured();

        let prior = json!({"id": "d-1", "size_in_gb": 20, "server_uuid": "vm-1", "status": "Active"});
        let planned = json!({"size_in_gb": 20, "server_uuid": "vm-2"});
        let plan = provider.diff("warren_disk", Some(&prior), Some(&planned)).unwrap();
        assert_eq!(plan.action, ActionType::Update);
        assert_eq!(plan.updated_attributes(), vec!["server_uuid"]);

        let planned = json!({"size_in_gb": 40, "server_uuid": "vm-1"});
        let plan = provider.diff("warren_disk", Some(&prior), Some(&planned)).unwrap();
        assert_eq!(plan.action, ActionType::Replace);

        let plan = provider.diff("warren_network", None, Some(&json!({"name": "n"}))).unwrap();
        assert_eq!(plan.action, ActionType::Create);

        let plan = provider.diff("warren_virtual_machine", Some(&json!({"id": "vm-1"})), None).unwrap();
        assert_eq!(plan.action, ActionType::Delete);
    }

    #[tokio::test]
    async fn test_unknown_data_source() {
        let provider = configured();
        let err = provider
            .read_data_source("warren_disk", json!({}))
            .await
            .unwrap_err();
        assert!(matches!(err, CloudError::UnknownResourceType(_)));
    }
}
