//! Warren platform provider
//!
//! Reconciles disks, floating IPs, networks and virtual machines against the
//! Warren REST API.
//!
//! # Layers
//!
//! - [`client`]: authenticated, location-scoped HTTP transport with typed errors
//! - [`classify`]: maps transport errors onto the reconciliation taxonomy
//! - [`resources`]: one reconciler per managed resource type
//! - [`mapper`]: wire objects to canonical state
//! - [`data_sources`]: read-only lookups of locations, networks and OS images
//! - [`provider`]: [`WarrenProvider`], dispatching by resource type name
//!
//! # Example
//!
//! ```no_run
//! use warren_cloud::ResourceProvider;
//! use warren_provider::{ProviderConfig, WarrenProvider};
//!
//! # async fn run() -> warren_cloud::Result<()> {
//! let provider = WarrenProvider::default();
//! provider.configure(ProviderConfig::new("my-token").with_location("tll"))?;
//!
//! let state = provider.import("warren_network", "6c4a0d0e-52b1-4b3a-9a3e-0d3d7d1f1a2b").await?;
//! println!("{}", serde_json::to_string_pretty(&state.into_value())?);
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod classify;
pub mod client;
pub mod cloud_init;
pub mod config;
pub mod data_sources;
pub mod error;
pub mod lookup;
pub mod mapper;
pub mod model;
pub mod password;
pub mod provider;
pub mod registry;
pub mod resources;

// Re-exports
pub use client::{ApiCall, ClientBuilder, WarrenClient};
pub use config::{ClientSettings, ProviderConfig};
pub use error::ApiError;
pub use model::{DiskModel, FloatingIpModel, NetworkModel, VirtualMachineModel};
pub use provider::{DATA_SOURCE_TYPES, WarrenProvider};
pub use registry::ClientRegistry;
pub use resources::{
    CreateTransaction, DiskReconciler, FloatingIpReconciler, NetworkReconciler,
    VirtualMachineReconciler,
};
