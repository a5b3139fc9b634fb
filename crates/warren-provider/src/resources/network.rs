//! VPC networks

use super::{CreateTransaction, ignore_not_found, require_id};
use crate::api::Network;
use crate::classify::into_cloud_error;
use crate::client::WarrenClient;
use crate::mapper::network_to_model;
use crate::model::NetworkModel;
use async_trait::async_trait;
use std::sync::Arc;
use warren_cloud::{CloudError, ReadOutcome, Reconciler, ResourceKind, Result};

const KIND: ResourceKind = ResourceKind::Network;

pub struct NetworkReconciler {
    client: Arc<WarrenClient>,
}

impl NetworkReconciler {
    pub fn new(client: Arc<WarrenClient>) -> Self {
        Self { client }
    }

    async fn create_network(&self, planned: &NetworkModel, tx: &mut CreateTransaction) -> Result<NetworkModel> {
        let name = planned
            .name
            .as_deref()
            .filter(|name| !name.is_empty())
            .ok_or_else(|| CloudError::InvalidConfig("network name is required".to_string()))?;

        let mut network = self
            .client
            .networks()
            .create(name)
            .await
            .map_err(|e| into_cloud_error(KIND, name, e))?;
        tx.record(network.uuid.clone());
        tracing::debug!("Created network {} ({})", network.uuid, network.name);

        if planned.is_default == Some(true) && !network.is_default {
            network = self.set_default(&network.uuid).await?;
        }

        Ok(network_to_model(&network))
    }

    async fn get(&self, uuid: &str) -> Result<Network> {
        self.client
            .networks()
            .get(uuid)
            .await
            .map_err(|e| into_cloud_error(KIND, uuid, e))
    }

    async fn set_default(&self, uuid: &str) -> Result<Network> {
        tracing::trace!("Network {} will become the default network", uuid);
        self.client
            .networks()
            .set_default(uuid)
            .await
            .map_err(|e| into_cloud_error(KIND, uuid, e))
    }

    async fn delete_by_uuid(&self, uuid: &str) -> Result<()> {
        self.client
            .networks()
            .delete(uuid)
            .await
            .map_err(|e| into_cloud_error(KIND, uuid, e))
    }
}

#[async_trait]
impl Reconciler for NetworkReconciler {
    type Model = NetworkModel;

    async fn create(&self, planned: NetworkModel) -> Result<NetworkModel> {
        let mut tx = CreateTransaction::new(KIND);
        let result = self.create_network(&planned, &mut tx).await;

        tx.settle(result, |uuid| async move { self.delete_by_uuid(&uuid).await })
            .await
    }

    async fn read(&self, current: NetworkModel) -> Result<ReadOutcome<NetworkModel>> {
        let uuid = require_id(KIND, current.id.as_deref())?;

        match self.get(uuid).await {
            Ok(network) => Ok(ReadOutcome::Found(network_to_model(&network))),
            Err(err) if err.is_not_found() => {
                tracing::trace!("Network has been deleted: {}", uuid);
                Ok(ReadOutcome::Gone)
            }
            Err(err) => Err(err),
        }
    }

    async fn update(&self, prior: NetworkModel, planned: NetworkModel) -> Result<NetworkModel> {
        let uuid = require_id(KIND, prior.id.as_deref())?;

        // The platform can only move the default flag to another network
        if prior.is_default == Some(true) && planned.is_default == Some(false) {
            return Err(CloudError::unsupported(
                KIND,
                uuid,
                "the default flag can only be cleared by making another network the default",
            ));
        }

        let mut network = None;

        let rename = planned
            .name
            .as_deref()
            .filter(|name| prior.name.as_deref() != Some(*name));

        if let Some(name) = rename {
            tracing::trace!("Network {} will be renamed to {}", uuid, name);
            network = Some(
                self.client
                    .networks()
                    .rename(uuid, name)
                    .await
                    .map_err(|e| into_cloud_error(KIND, uuid, e))?,
            );
        }

        if planned.is_default == Some(true) && prior.is_default != Some(true) {
            network = Some(self.set_default(uuid).await?);
        }

        let network = match network {
            Some(network) => network,
            None => self.get(uuid).await?,
        };

        Ok(network_to_model(&network))
    }

    async fn delete(&self, current: &NetworkModel) -> Result<()> {
        let uuid = require_id(KIND, current.id.as_deref())?;

        if let Err(err) = self.get(uuid).await {
            return ignore_not_found(KIND, uuid, Err(err));
        }

        ignore_not_found(KIND, uuid, self.delete_by_uuid(uuid).await)
    }

    async fn import(&self, id: &str) -> Result<NetworkModel> {
        let network = self.get(id).await?;
        Ok(network_to_model(&network))
    }
}
