//! Provider and reconciler trait definitions

use crate::error::Result;
use crate::plan::{Plan, Schema};
use crate::state::ResourceState;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Kinds of platform objects known to the provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    Disk,
    FloatingIp,
    Network,
    VirtualMachine,
    Location,
    OsBaseImage,
}

impl ResourceKind {
    /// Resource kinds that can be created and destroyed
    pub const MANAGED: [ResourceKind; 4] = [
        ResourceKind::Disk,
        ResourceKind::FloatingIp,
        ResourceKind::Network,
        ResourceKind::VirtualMachine,
    ];

    /// Returns the orchestrator-facing type name (e.g. "warren_disk")
    pub fn type_name(&self) -> &'static str {
        match self {
            ResourceKind::Disk => "warren_disk",
            ResourceKind::FloatingIp => "warren_floating_ip",
            ResourceKind::Network => "warren_network",
            ResourceKind::VirtualMachine => "warren_virtual_machine",
            ResourceKind::Location => "warren_location",
            ResourceKind::OsBaseImage => "warren_os_base_image",
        }
    }

    /// Looks up a managed resource kind by its type name
    pub fn from_type_name(name: &str) -> Option<Self> {
        Self::MANAGED.into_iter().find(|k| k.type_name() == name)
    }
}

impl std::fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResourceKind::Disk => write!(f, "disk"),
            ResourceKind::FloatingIp => write!(f, "floating IP"),
            ResourceKind::Network => write!(f, "network"),
            ResourceKind::VirtualMachine => write!(f, "virtual machine"),
            ResourceKind::Location => write!(f, "location"),
            ResourceKind::OsBaseImage => write!(f, "OS base image"),
        }
    }
}

/// Outcome of reading a resource
#[derive(Debug, Clone, PartialEq)]
pub enum ReadOutcome<M> {
    /// The resource exists and its observed state is attached
    Found(M),
    /// The resource no longer exists; the orchestrator drops it from state
    Gone,
}

impl<M> ReadOutcome<M> {
    pub fn found(self) -> Option<M> {
        match self {
            ReadOutcome::Found(model) => Some(model),
            ReadOutcome::Gone => None,
        }
    }

    pub fn is_gone(&self) -> bool {
        matches!(self, ReadOutcome::Gone)
    }
}

/// Per-resource-type reconciliation operations
///
/// One reconciler exists per managed resource type. The orchestrator invokes
/// a single operation at a time for a given resource instance.
#[async_trait]
pub trait Reconciler: Send + Sync {
    /// Canonical attribute set for this resource type
    type Model: Schema + Send + Sync;

    /// Create the resource described by the planned model
    async fn create(&self, planned: Self::Model) -> Result<Self::Model>;

    /// Refresh the observed state, or report that the resource is gone
    async fn read(&self, current: Self::Model) -> Result<ReadOutcome<Self::Model>>;

    /// Apply in-place changes between prior and planned state
    async fn update(&self, prior: Self::Model, planned: Self::Model) -> Result<Self::Model>;

    /// Delete the resource; an already missing resource counts as success
    async fn delete(&self, current: &Self::Model) -> Result<()>;

    /// Derive full state from an identity alone
    async fn import(&self, id: &str) -> Result<Self::Model>;
}

/// Provider abstraction over JSON attribute sets
///
/// The orchestrator talks to the provider with untyped attribute sets keyed
/// by resource type name; implementations decode them into the typed models
/// of their reconcilers.
#[async_trait]
pub trait ResourceProvider: Send + Sync {
    /// Returns the provider name (e.g., "warren")
    fn name(&self) -> &str;

    /// Returns the provider display name for UI
    fn display_name(&self) -> &str;

    /// Resource type names this provider manages
    fn resource_types(&self) -> Vec<&'static str>;

    /// Check if the provider is properly configured and authenticated
    async fn check_auth(&self) -> Result<AuthStatus>;

    /// Compute drift between prior and planned attribute sets
    fn diff(
        &self,
        resource_type: &str,
        prior: Option<&serde_json::Value>,
        planned: Option<&serde_json::Value>,
    ) -> Result<Plan>;

    async fn create(&self, resource_type: &str, planned: serde_json::Value)
    -> Result<ResourceState>;

    /// Returns `None` when the resource is gone
    async fn read(
        &self,
        resource_type: &str,
        current: serde_json::Value,
    ) -> Result<Option<ResourceState>>;

    async fn update(
        &self,
        resource_type: &str,
        prior: serde_json::Value,
        planned: serde_json::Value,
    ) -> Result<ResourceState>;

    async fn delete(&self, resource_type: &str, current: serde_json::Value) -> Result<()>;

    async fn import(&self, resource_type: &str, id: &str) -> Result<ResourceState>;
}

/// Authentication status
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthStatus {
    /// Whether authentication is valid
    pub authenticated: bool,

    /// Account/location information if available
    pub account_info: Option<String>,

    /// Error message if not authenticated
    pub error: Option<String>,
}

impl AuthStatus {
    pub fn ok(account_info: impl Into<String>) -> Self {
        Self {
            authenticated: true,
            account_info: Some(account_info.into()),
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            authenticated: false,
            account_info: None,
            error: Some(error.into()),
        }
    }
}
