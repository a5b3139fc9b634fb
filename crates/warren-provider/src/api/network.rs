//! VPC network and floating IP endpoints

use super::nullable;
use crate::client::WarrenClient;
use crate::error::{ApiError, Result};
use serde::{Deserialize, Serialize};
use std::net::IpAddr;

/// Resource type tag of a floating IP assigned to a virtual machine
pub const ASSIGNED_TO_VIRTUAL_MACHINE: &str = "virtual_machine";

/// VPC network
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Network {
    #[serde(deserialize_with = "nullable")]
    pub uuid: String,
    #[serde(deserialize_with = "nullable")]
    pub vlan_id: i64,
    #[serde(deserialize_with = "nullable")]
    pub subnet: String,
    #[serde(deserialize_with = "nullable")]
    pub subnet_ipv6: String,
    #[serde(deserialize_with = "nullable")]
    pub name: String,
    #[serde(deserialize_with = "nullable")]
    pub created_at: String,
    #[serde(deserialize_with = "nullable")]
    pub updated_at: String,
    #[serde(rename = "type", deserialize_with = "nullable")]
    pub network_type: String,
    #[serde(deserialize_with = "nullable")]
    pub is_default: bool,
    #[serde(deserialize_with = "nullable")]
    pub vm_uuids: Vec<String>,
    #[serde(deserialize_with = "nullable")]
    pub resources_count: i64,
}

/// Floating IP; identified by a numeric id, addressed by its IP in paths
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FloatingIp {
    #[serde(deserialize_with = "nullable")]
    pub id: i64,
    #[serde(deserialize_with = "nullable")]
    pub is_ipv6: bool,
    #[serde(deserialize_with = "nullable")]
    pub address: String,
    #[serde(deserialize_with = "nullable")]
    pub user_id: i64,
    #[serde(deserialize_with = "nullable")]
    pub billing_account_id: i64,
    #[serde(rename = "type", deserialize_with = "nullable")]
    pub ip_type: String,
    #[serde(deserialize_with = "nullable")]
    pub name: String,
    #[serde(deserialize_with = "nullable")]
    pub enabled: bool,
    #[serde(deserialize_with = "nullable")]
    pub created_at: String,
    #[serde(deserialize_with = "nullable")]
    pub updated_at: String,
    #[serde(deserialize_with = "nullable")]
    pub uuid: String,
    #[serde(deserialize_with = "nullable")]
    pub assigned_to: String,
    #[serde(deserialize_with = "nullable")]
    pub assigned_to_resource_type: String,
    #[serde(deserialize_with = "nullable")]
    pub assigned_to_private_ip: String,
}

impl FloatingIp {
    pub fn is_assigned(&self) -> bool {
        !self.assigned_to.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CreateFloatingIpRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub billing_account_id: Option<i64>,
}

#[derive(Serialize)]
struct RenameNetwork<'a> {
    name: &'a str,
}

#[derive(Serialize)]
struct AssignFloatingIp<'a> {
    vm_uuid: &'a str,
}

pub struct NetworkApi<'a> {
    client: &'a WarrenClient,
}

impl<'a> NetworkApi<'a> {
    pub(crate) fn new(client: &'a WarrenClient) -> Self {
        Self { client }
    }

    pub async fn get(&self, uuid: &str) -> Result<Network> {
        self.client
            .get(format!("/network/network/{}/", uuid))
            .call()
            .await
    }

    pub async fn list(&self) -> Result<Vec<Network>> {
        self.client.get("/network/networks").call().await
    }

    pub async fn create(&self, name: &str) -> Result<Network> {
        self.client
            .post("/network/network")
            .query("name", name)
            .call()
            .await
    }

    pub async fn rename(&self, uuid: &str, name: &str) -> Result<Network> {
        self.client
            .patch(format!("/network/network/{}", uuid))
            .json(&RenameNetwork { name })
            .call()
            .await
    }

    /// Make the network the location's default
    pub async fn set_default(&self, uuid: &str) -> Result<Network> {
        self.client
            .put(format!("/network/network/{}/default", uuid))
            .call()
            .await
    }

    /// Only networks without resources that are not the default can be deleted
    pub async fn delete(&self, uuid: &str) -> Result<()> {
        self.client
            .delete(format!("/network/network/{}/", uuid))
            .call_no_content()
            .await
    }
}

pub struct FloatingIpApi<'a> {
    client: &'a WarrenClient,
}

impl<'a> FloatingIpApi<'a> {
    pub(crate) fn new(client: &'a WarrenClient) -> Self {
        Self { client }
    }

    pub async fn list(&self) -> Result<Vec<FloatingIp>> {
        self.client.get("/network/ip_addresses").call().await
    }

    pub async fn create(&self, request: &CreateFloatingIpRequest) -> Result<FloatingIp> {
        self.client
            .post("/network/ip_addresses")
            .json(request)
            .call()
            .await
    }

    pub async fn assign(&self, address: &str, vm_uuid: &str) -> Result<FloatingIp> {
        self.client
            .post(format!("/network/ip_addresses/{}/assign", canonical(address)?))
            .json(&AssignFloatingIp { vm_uuid })
            .call()
            .await
    }

    pub async fn unassign(&self, address: &str) -> Result<FloatingIp> {
        self.client
            .post(format!("/network/ip_addresses/{}/unassign", canonical(address)?))
            .json(&serde_json::json!({}))
            .call()
            .await
    }

    pub async fn delete(&self, address: &str) -> Result<()> {
        self.client
            .delete(format!("/network/ip_addresses/{}/", canonical(address)?))
            .call_no_content()
            .await
    }
}

fn canonical(address: &str) -> Result<String> {
    address
        .parse::<IpAddr>()
        .map(|ip| ip.to_string())
        .map_err(|_| ApiError::Url(format!("invalid IP address {:?}", address)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_address() {
        assert_eq!(canonical("192.0.2.10").unwrap(), "192.0.2.10");
        assert_eq!(canonical("2001:0db8:0000::0001").unwrap(), "2001:db8::1");
        assert!(canonical("").is_err());
    }

    #[test]
    fn test_create_request_omits_unset() {
        let request = CreateFloatingIpRequest {
            name: Some("web".to_string()),
            billing_account_id: None,
        };
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            serde_json::json!({"name": "web"})
        );
    }

    #[test]
    fn test_network_type_field() {
        let network: Network = serde_json::from_value(serde_json::json!({
            "uuid": "n-1",
            "type": "private",
            "vm_uuids": null,
            "subnet": "10.0.0.0/24"
        }))
        .unwrap();
        assert_eq!(network.network_type, "private");
        assert!(network.vm_uuids.is_empty());
    }

    #[test]
    fn test_decode_null_scalars() {
        let ip: FloatingIp = serde_json::from_value(serde_json::json!({
            "id": 7,
            "address": "192.0.2.10",
            "enabled": true,
            "is_ipv6": null,
            "user_id": null,
            "billing_account_id": null
        }))
        .unwrap();
        assert_eq!(ip.id, 7);
        assert!(ip.enabled);
        assert!(!ip.is_ipv6);
        assert_eq!(ip.user_id, 0);
        assert_eq!(ip.billing_account_id, 0);

        let networks: Vec<Network> = serde_json::from_value(serde_json::json!([
            {"uuid": "n-1", "vlan_id": null, "is_default": null, "resources_count": null},
            {"uuid": "n-2", "vlan_id": 12, "is_default": true, "resources_count": 3}
        ]))
        .unwrap();
        assert_eq!(networks[0].vlan_id, 0);
        assert!(!networks[0].is_default);
        assert_eq!(networks[0].resources_count, 0);
        assert_eq!(networks[1].vlan_id, 12);
    }
}
