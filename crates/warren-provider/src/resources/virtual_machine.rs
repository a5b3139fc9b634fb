//! Virtual machines
//!
//! Machines are created once and never changed in place; every configurable
//! attribute forces a replacement.

use super::{ignore_not_found, require_id};
use crate::api::{CreateVirtualMachineRequest, VirtualMachine};
use crate::classify::into_cloud_error;
use crate::client::WarrenClient;
use crate::cloud_init::prepare_cloud_init;
use crate::lookup::network_for_server;
use crate::mapper::virtual_machine_to_model;
use crate::model::VirtualMachineModel;
use crate::password::generate_password;
use async_trait::async_trait;
use std::sync::Arc;
use warren_cloud::{CloudError, ReadOutcome, Reconciler, ResourceKind, Result};

const KIND: ResourceKind = ResourceKind::VirtualMachine;

pub const DEFAULT_USERNAME: &str = "user";

pub struct VirtualMachineReconciler {
    client: Arc<WarrenClient>,
}

impl VirtualMachineReconciler {
    pub fn new(client: Arc<WarrenClient>) -> Self {
        Self { client }
    }

    async fn get(&self, uuid: &str) -> Result<VirtualMachine> {
        self.client
            .virtual_machines()
            .get(uuid)
            .await
            .map_err(|e| into_cloud_error(KIND, uuid, e))
    }

    /// Canonical state including the derived network membership
    async fn observe(&self, vm: &VirtualMachine, desired: &VirtualMachineModel) -> VirtualMachineModel {
        let network_uuid = match network_for_server(&self.client, &vm.uuid).await {
            Ok(network) => Some(network.uuid),
            Err(err) => {
                tracing::debug!("No network found for virtual machine {}: {}", vm.uuid, err);
                None
            }
        };

        virtual_machine_to_model(vm, desired, network_uuid)
    }
}

/// Fill in the credentials the platform needs but the configuration may omit
fn with_defaults(mut planned: VirtualMachineModel) -> VirtualMachineModel {
    if planned.password.as_deref().is_none_or(str::is_empty) {
        planned.password = Some(generate_password());
    }
    if planned.username.as_deref().is_none_or(str::is_empty) {
        planned.username = Some(DEFAULT_USERNAME.to_string());
    }
    planned.backup.get_or_insert(false);
    planned.reserve_public_ip.get_or_insert(false);
    planned
}

fn build_request(planned: &VirtualMachineModel) -> Result<CreateVirtualMachineRequest> {
    let mut request = CreateVirtualMachineRequest {
        name: planned.name.clone(),
        os_name: planned.os_name.clone(),
        os_version: planned.os_version.clone(),
        disks: planned.disk_size_in_gb,
        vcpu: planned.vcpu,
        ram: planned.memory,
        username: planned.username.clone(),
        password: planned.password.clone(),
        billing_account_id: planned.billing_account,
        backup: planned.backup,
        reserve_public_ip: planned.reserve_public_ip,
        public_key: planned.public_key.clone(),
        network_uuid: planned.network_uuid.clone().filter(|uuid| !uuid.is_empty()),
        ..Default::default()
    };

    if let Some(cloud_init) = &planned.cloud_init {
        request.cloud_init = Some(prepare_cloud_init(cloud_init)?);
    }

    // A replica only makes sense together with its source
    if let Some(source_uuid) = &planned.source_uuid {
        request.source_uuid = Some(source_uuid.clone());
        request.source_replica = planned.source_replica.clone();
    }

    Ok(request)
}

#[async_trait]
impl Reconciler for VirtualMachineReconciler {
    type Model = VirtualMachineModel;

    async fn create(&self, planned: VirtualMachineModel) -> Result<VirtualMachineModel> {
        let planned = with_defaults(planned);
        let request = build_request(&planned)?;

        let vm = self
            .client
            .virtual_machines()
            .create(&request)
            .await
            .map_err(|e| into_cloud_error(KIND, planned.name.as_deref().unwrap_or("new machine"), e))?;
        tracing::info!("Created virtual machine {} ({}), status {}", vm.uuid, vm.name, vm.status);

        Ok(self.observe(&vm, &planned).await)
    }

    async fn read(&self, current: VirtualMachineModel) -> Result<ReadOutcome<VirtualMachineModel>> {
        let uuid = require_id(KIND, current.id.as_deref())?;

        match self.get(uuid).await {
            Ok(vm) => Ok(ReadOutcome::Found(self.observe(&vm, &current).await)),
            Err(err) if err.is_not_found() => {
                tracing::trace!("Virtual machine has been deleted: {}", uuid);
                Ok(ReadOutcome::Gone)
            }
            Err(err) => Err(err),
        }
    }

    async fn update(&self, prior: VirtualMachineModel, _planned: VirtualMachineModel) -> Result<VirtualMachineModel> {
        Err(CloudError::unsupported(
            KIND,
            prior.id.unwrap_or_default(),
            "Updating an existing machine is currently not implemented",
        ))
    }

    async fn delete(&self, current: &VirtualMachineModel) -> Result<()> {
        let uuid = require_id(KIND, current.id.as_deref())?;

        if let Err(err) = self.get(uuid).await {
            return ignore_not_found(KIND, uuid, Err(err));
        }

        let result = self
            .client
            .virtual_machines()
            .delete(uuid)
            .await
            .map_err(|e| into_cloud_error(KIND, uuid, e));
        ignore_not_found(KIND, uuid, result)
    }

    async fn import(&self, id: &str) -> Result<VirtualMachineModel> {
        let vm = self.get(id).await?;
        Ok(self.observe(&vm, &VirtualMachineModel::default()).await)
    }
}
