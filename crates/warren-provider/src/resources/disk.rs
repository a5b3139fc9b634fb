//! Block storage disks
//!
//! A disk may be attached to one virtual machine. The attachment is not
//! stored on the disk; it is derived by scanning the storage lists of all
//! machines.

use super::{CreateTransaction, ignore_not_found, require_id};
use crate::api::{CreateDiskRequest, Disk, SourceImageType};
use crate::classify::into_cloud_error;
use crate::client::WarrenClient;
use crate::lookup::server_for_disk;
use crate::mapper::disk_to_model;
use crate::model::DiskModel;
use async_trait::async_trait;
use std::sync::Arc;
use warren_cloud::{CloudError, Plan, ReadOutcome, Reconciler, ResourceKind, Result};

const KIND: ResourceKind = ResourceKind::Disk;

pub struct DiskReconciler {
    client: Arc<WarrenClient>,
}

impl DiskReconciler {
    pub fn new(client: Arc<WarrenClient>) -> Self {
        Self { client }
    }

    fn build_request(planned: &DiskModel) -> Result<CreateDiskRequest> {
        let size_gb = planned
            .size_in_gb
            .ok_or_else(|| CloudError::InvalidConfig("disk size_in_gb is required".to_string()))?;

        let mut request = CreateDiskRequest {
            size_gb: Some(size_gb),
            billing_account_id: planned.billing_account,
            ..Default::default()
        };

        // The source type is only meaningful together with a source
        if let Some(source) = non_empty(planned.source_image_uuid.as_deref()) {
            request.source_image = Some(source.to_string());
            request.source_image_type = planned
                .source_image_type
                .as_deref()
                .map(str::parse::<SourceImageType>)
                .transpose()
                .map_err(CloudError::InvalidConfig)?;
        }

        Ok(request)
    }

    async fn create_disk(&self, planned: &DiskModel, tx: &mut CreateTransaction) -> Result<DiskModel> {
        let request = Self::build_request(planned)?;

        let disk = self
            .client
            .disks()
            .create(&request)
            .await
            .map_err(|e| into_cloud_error(KIND, "new disk", e))?;
        tx.record(disk.uuid.clone());
        tracing::debug!("Created disk {} ({} GB)", disk.uuid, disk.size_gb);

        if let Some(server_uuid) = non_empty(planned.server_uuid.as_deref()) {
            self.attach(server_uuid, &disk.uuid).await?;
        }

        Ok(self.observe(&disk).await)
    }

    async fn attach(&self, server_uuid: &str, disk_uuid: &str) -> Result<()> {
        tracing::trace!("Disk {} will be attached to server UUID: {}", disk_uuid, server_uuid);
        self.client
            .virtual_machines()
            .attach_disk(server_uuid, disk_uuid)
            .await
            .map_err(|e| into_cloud_error(ResourceKind::VirtualMachine, server_uuid, e))?;
        Ok(())
    }

    async fn detach(&self, server_uuid: &str, disk_uuid: &str) -> Result<()> {
        tracing::trace!("Disk {} will be detached from server UUID: {}", disk_uuid, server_uuid);
        self.client
            .virtual_machines()
            .detach_disk(server_uuid, disk_uuid)
            .await
            .map_err(|e| into_cloud_error(ResourceKind::VirtualMachine, server_uuid, e))
    }

    async fn delete_by_uuid(&self, uuid: &str) -> Result<()> {
        self.client
            .disks()
            .delete(uuid)
            .await
            .map_err(|e| into_cloud_error(KIND, uuid, e))
    }

    async fn get(&self, uuid: &str) -> Result<Disk> {
        self.client
            .disks()
            .get(uuid)
            .await
            .map_err(|e| into_cloud_error(KIND, uuid, e))
    }

    /// Canonical state including the derived server attachment
    async fn observe(&self, disk: &Disk) -> DiskModel {
        let server_uuid = match server_for_disk(&self.client, &disk.uuid).await {
            Ok(server) => Some(server.uuid),
            Err(err) => {
                tracing::debug!("No server found for disk {}: {}", disk.uuid, err);
                None
            }
        };

        disk_to_model(disk, server_uuid)
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

#[async_trait]
impl Reconciler for DiskReconciler {
    type Model = DiskModel;

    async fn create(&self, planned: DiskModel) -> Result<DiskModel> {
        let mut tx = CreateTransaction::new(KIND);
        let result = self.create_disk(&planned, &mut tx).await;

        tx.settle(result, |uuid| async move { self.delete_by_uuid(&uuid).await })
            .await
    }

    async fn read(&self, current: DiskModel) -> Result<ReadOutcome<DiskModel>> {
        let uuid = require_id(KIND, current.id.as_deref())?;

        match self.get(uuid).await {
            Ok(disk) => Ok(ReadOutcome::Found(self.observe(&disk).await)),
            Err(err) if err.is_not_found() => {
                tracing::trace!("Disk has been deleted: {}", uuid);
                Ok(ReadOutcome::Gone)
            }
            Err(err) => Err(err),
        }
    }

    async fn update(&self, prior: DiskModel, planned: DiskModel) -> Result<DiskModel> {
        let uuid = require_id(KIND, prior.id.as_deref())?;

        let plan = Plan::between(Some(&prior), Some(&planned))?;
        let replaced = plan.replacement_attributes();
        if !replaced.is_empty() {
            return Err(CloudError::unsupported(
                KIND,
                uuid,
                format!("changing {} requires replacing the disk", replaced.join(", ")),
            ));
        }

        if prior.server_uuid != planned.server_uuid {
            if let Some(old_server) = non_empty(prior.server_uuid.as_deref()) {
                self.detach(old_server, uuid).await?;
            }

            if let Some(new_server) = non_empty(planned.server_uuid.as_deref()) {
                self.attach(new_server, uuid).await?;
            }
        }

        let disk = self.get(uuid).await?;
        Ok(self.observe(&disk).await)
    }

    async fn delete(&self, current: &DiskModel) -> Result<()> {
        let uuid = require_id(KIND, current.id.as_deref())?;

        if let Err(err) = self.get(uuid).await {
            return ignore_not_found(KIND, uuid, Err(err));
        }

        ignore_not_found(KIND, uuid, self.delete_by_uuid(uuid).await)
    }

    async fn import(&self, id: &str) -> Result<DiskModel> {
        let disk = self.get(id).await?;
        Ok(self.observe(&disk).await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_requires_size() {
        let err = DiskReconciler::build_request(&DiskModel::default()).unwrap_err();
        assert!(matches!(err, CloudError::InvalidConfig(_)));
    }

    #[test]
    fn test_source_type_needs_source() {
        let planned = DiskModel {
            size_in_gb: Some(20),
            source_image_type: Some("SNAPSHOT".to_string()),
            ..Default::default()
        };
        let request = DiskReconciler::build_request(&planned).unwrap();
        assert_eq!(request.source_image_type, None);
        assert_eq!(request.form_params(), vec![("size_gb", "20".to_string())]);

        let planned = DiskModel {
            source_image_uuid: Some("s-1".to_string()),
            billing_account: Some(9),
            ..planned
        };
        let request = DiskReconciler::build_request(&planned).unwrap();
        assert_eq!(request.source_image_type, Some(SourceImageType::Snapshot));
        assert_eq!(request.source_image.as_deref(), Some("s-1"));
        assert_eq!(request.billing_account_id, Some(9));
    }

    #[test]
    fn test_unknown_source_type() {
        let planned = DiskModel {
            size_in_gb: Some(20),
            source_image_uuid: Some("s-1".to_string()),
            source_image_type: Some("TAPE".to_string()),
            ..Default::default()
        };
        let err = DiskReconciler::build_request(&planned).unwrap_err();
        assert!(err.to_string().contains("TAPE"));
    }
}
