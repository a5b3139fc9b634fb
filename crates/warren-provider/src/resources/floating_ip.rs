//! Floating IPs
//!
//! Floating IPs are identified by a numeric id but addressed by their IP in
//! every mutating call, so most operations resolve the id to the current
//! record first.

use super::{CreateTransaction, ignore_not_found};
use crate::api::{ASSIGNED_TO_VIRTUAL_MACHINE, CreateFloatingIpRequest, FloatingIp};
use crate::classify::into_cloud_error;
use crate::client::WarrenClient;
use crate::lookup::{floating_ip_assigned_to, floating_ip_by_id, network_for_server};
use crate::mapper::floating_ip_to_model;
use crate::model::FloatingIpModel;
use async_trait::async_trait;
use std::sync::Arc;
use warren_cloud::{CloudError, Plan, ReadOutcome, Reconciler, ResourceKind, Result};

const KIND: ResourceKind = ResourceKind::FloatingIp;

pub struct FloatingIpReconciler {
    client: Arc<WarrenClient>,
}

impl FloatingIpReconciler {
    pub fn new(client: Arc<WarrenClient>) -> Self {
        Self { client }
    }

    async fn create_floating_ip(
        &self,
        planned: &FloatingIpModel,
        tx: &mut CreateTransaction,
    ) -> Result<FloatingIpModel> {
        let target = non_empty(planned.assigned_to.as_deref());

        let existing = match target {
            Some(target) => match floating_ip_assigned_to(&self.client, target).await {
                Ok(ip) => {
                    tracing::debug!("Reusing floating IP {} assigned to {}", ip.id, target);
                    Some(ip)
                }
                Err(err) if err.is_not_found() => None,
                Err(err) => return Err(err),
            },
            None => None,
        };

        let floating_ip = match existing {
            Some(ip) => ip,
            None => {
                let request = CreateFloatingIpRequest {
                    name: planned.name.clone(),
                    billing_account_id: planned.billing_account,
                };
                let ip = self
                    .client
                    .floating_ips()
                    .create(&request)
                    .await
                    .map_err(|e| into_cloud_error(KIND, "new floating IP", e))?;
                tx.record(ip.id.to_string());
                tracing::debug!("Created floating IP {} ({})", ip.id, ip.address);
                ip
            }
        };

        check_existing(&floating_ip, planned.name.as_deref(), target)?;

        let floating_ip = match target {
            Some(target) if !floating_ip.is_assigned() => self.assign(&floating_ip, target).await?,
            _ => floating_ip,
        };

        Ok(self.observe(&floating_ip).await)
    }

    async fn assign(&self, floating_ip: &FloatingIp, target: &str) -> Result<FloatingIp> {
        tracing::trace!("Floating IP {} will be attached to server UUID: {}", floating_ip.id, target);
        self.client
            .floating_ips()
            .assign(&floating_ip.address, target)
            .await
            .map_err(|e| into_cloud_error(KIND, floating_ip.id.to_string(), e))
    }

    async fn unassign(&self, floating_ip: &FloatingIp, from: &str) -> Result<FloatingIp> {
        tracing::trace!("Floating IP {} will be detached from resource UUID: {}", floating_ip.id, from);
        self.client
            .floating_ips()
            .unassign(&floating_ip.address)
            .await
            .map_err(|e| into_cloud_error(KIND, floating_ip.id.to_string(), e))
    }

    async fn delete_by_id(&self, id: i64) -> Result<()> {
        let floating_ip = floating_ip_by_id(&self.client, id).await?;
        self.client
            .floating_ips()
            .delete(&floating_ip.address)
            .await
            .map_err(|e| into_cloud_error(KIND, id.to_string(), e))
    }

    /// Canonical state including the network of the assigned server
    async fn observe(&self, floating_ip: &FloatingIp) -> FloatingIpModel {
        let network_uuid = if floating_ip.is_assigned() {
            match network_for_server(&self.client, &floating_ip.assigned_to).await {
                Ok(network) => Some(network.uuid),
                Err(err) => {
                    tracing::debug!(
                        "No network found for server {} of floating IP {}: {}",
                        floating_ip.assigned_to,
                        floating_ip.id,
                        err
                    );
                    None
                }
            }
        } else {
            None
        };

        floating_ip_to_model(floating_ip, network_uuid)
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

fn parse_id(id: Option<&str>) -> Result<i64> {
    let id = id.unwrap_or_default();
    id.parse()
        .map_err(|e| CloudError::InvalidConfig(format!("invalid floating IP id {:?}: {}", id, e)))
}

/// Refuse to adopt a floating IP whose name or assignment differs from the configuration
fn check_existing(floating_ip: &FloatingIp, name: Option<&str>, target: Option<&str>) -> Result<()> {
    let name = name.unwrap_or_default();
    if !floating_ip.name.is_empty() && floating_ip.name != name {
        return Err(CloudError::mismatch(
            KIND,
            format!(
                "Floating IP configuration mismatch between existing instance name and given one: {} - {}",
                floating_ip.name, name
            ),
        ));
    }

    let target = target.unwrap_or_default();
    if floating_ip.is_assigned() && floating_ip.assigned_to != target {
        if floating_ip.assigned_to_resource_type != ASSIGNED_TO_VIRTUAL_MACHINE {
            return Err(CloudError::mismatch(
                KIND,
                format!(
                    "Floating IP configuration mismatch between existing instance attached resource type: {} = {}",
                    floating_ip.assigned_to, floating_ip.assigned_to_resource_type
                ),
            ));
        }

        return Err(CloudError::mismatch(
            KIND,
            format!(
                "Floating IP configuration mismatch between existing instance attached server UUID and given one: {} - {}",
                floating_ip.assigned_to, target
            ),
        ));
    }

    Ok(())
}

#[async_trait]
impl Reconciler for FloatingIpReconciler {
    type Model = FloatingIpModel;

    async fn create(&self, planned: FloatingIpModel) -> Result<FloatingIpModel> {
        let mut tx = CreateTransaction::new(KIND);
        let result = self.create_floating_ip(&planned, &mut tx).await;

        tx.settle(result, |id| async move {
            let id = parse_id(Some(&id))?;
            self.delete_by_id(id).await
        })
        .await
    }

    async fn read(&self, current: FloatingIpModel) -> Result<ReadOutcome<FloatingIpModel>> {
        let id = parse_id(current.id.as_deref())?;

        match floating_ip_by_id(&self.client, id).await {
            Ok(floating_ip) => Ok(ReadOutcome::Found(self.observe(&floating_ip).await)),
            Err(err) if err.is_not_found() => {
                tracing::trace!("Floating IP has been deleted: {}", id);
                Ok(ReadOutcome::Gone)
            }
            Err(err) => Err(err),
        }
    }

    async fn update(&self, prior: FloatingIpModel, planned: FloatingIpModel) -> Result<FloatingIpModel> {
        let id = parse_id(prior.id.as_deref())?;

        let plan = Plan::between(Some(&prior), Some(&planned))?;
        let replaced = plan.replacement_attributes();
        if !replaced.is_empty() {
            return Err(CloudError::unsupported(
                KIND,
                id.to_string(),
                format!("changing {} requires replacing the floating IP", replaced.join(", ")),
            ));
        }

        let old_target = non_empty(prior.assigned_to.as_deref());
        let new_target = non_empty(planned.assigned_to.as_deref());

        if old_target != new_target {
            let mut floating_ip = floating_ip_by_id(&self.client, id).await?;

            if let Some(old_target) = old_target {
                floating_ip = self.unassign(&floating_ip, old_target).await?;
            }

            if let Some(new_target) = new_target {
                floating_ip = self.assign(&floating_ip, new_target).await?;
            }

            return Ok(self.observe(&floating_ip).await);
        }

        let floating_ip = floating_ip_by_id(&self.client, id).await?;
        Ok(self.observe(&floating_ip).await)
    }

    async fn delete(&self, current: &FloatingIpModel) -> Result<()> {
        let id = parse_id(current.id.as_deref())?;
        ignore_not_found(KIND, &id.to_string(), self.delete_by_id(id).await)
    }

    async fn import(&self, id: &str) -> Result<FloatingIpModel> {
        let id = parse_id(Some(id))?;
        let floating_ip = floating_ip_by_id(&self.client, id).await?;
        Ok(self.observe(&floating_ip).await)
    }
}
