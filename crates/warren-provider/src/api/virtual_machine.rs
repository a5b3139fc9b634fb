//! Virtual machine endpoints

use super::nullable;
use crate::client::WarrenClient;
use crate::error::Result;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VirtualMachine {
    #[serde(deserialize_with = "nullable")]
    pub uuid: String,
    #[serde(deserialize_with = "nullable")]
    pub backup: bool,
    #[serde(deserialize_with = "nullable")]
    pub billing_account: i64,
    #[serde(deserialize_with = "nullable")]
    pub created_at: String,
    #[serde(deserialize_with = "nullable")]
    pub description: String,
    #[serde(deserialize_with = "nullable")]
    pub hostname: String,
    #[serde(deserialize_with = "nullable")]
    pub mac: String,
    #[serde(deserialize_with = "nullable")]
    pub memory: i64,
    #[serde(deserialize_with = "nullable")]
    pub name: String,
    #[serde(deserialize_with = "nullable")]
    pub os_name: String,
    #[serde(deserialize_with = "nullable")]
    pub os_version: String,
    #[serde(deserialize_with = "nullable")]
    pub private_ipv4: String,
    #[serde(deserialize_with = "nullable")]
    pub public_ipv6: String,
    #[serde(deserialize_with = "nullable")]
    pub status: String,
    #[serde(deserialize_with = "nullable")]
    pub storage: Vec<VmStorage>,
    #[serde(deserialize_with = "nullable")]
    pub updated_at: String,
    #[serde(deserialize_with = "nullable")]
    pub user_id: i64,
    #[serde(deserialize_with = "nullable")]
    pub username: String,
    #[serde(deserialize_with = "nullable")]
    pub vcpu: i64,
}

impl VirtualMachine {
    /// Boot disk of the machine
    pub fn primary_storage(&self) -> Option<&VmStorage> {
        self.storage.iter().find(|s| s.primary)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VmStorage {
    #[serde(deserialize_with = "nullable")]
    pub created_at: String,
    #[serde(deserialize_with = "nullable")]
    pub name: String,
    #[serde(deserialize_with = "nullable")]
    pub primary: bool,
    #[serde(deserialize_with = "nullable")]
    pub replica: Vec<StorageReplica>,
    #[serde(deserialize_with = "nullable")]
    pub size: i64,
    #[serde(deserialize_with = "nullable")]
    pub user_id: i64,
    #[serde(deserialize_with = "nullable")]
    pub uuid: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageReplica {
    #[serde(deserialize_with = "nullable")]
    pub created_at: String,
    #[serde(deserialize_with = "nullable")]
    pub master_uuid: String,
    #[serde(deserialize_with = "nullable")]
    pub size: i64,
    #[serde(rename = "type", deserialize_with = "nullable")]
    pub replica_type: String,
    #[serde(deserialize_with = "nullable")]
    pub uuid: String,
}

/// OS base image offered for new machines
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BaseImage {
    #[serde(deserialize_with = "nullable")]
    pub os_name: String,
    #[serde(deserialize_with = "nullable")]
    pub display_name: String,
    #[serde(deserialize_with = "nullable")]
    pub ui_position: i64,
    #[serde(deserialize_with = "nullable")]
    pub is_default: bool,
    #[serde(deserialize_with = "nullable")]
    pub is_app_catalog: bool,
    #[serde(deserialize_with = "nullable")]
    pub icon: String,
    #[serde(deserialize_with = "nullable")]
    pub versions: Vec<BaseImageVersion>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BaseImageVersion {
    #[serde(deserialize_with = "nullable")]
    pub os_version: String,
    #[serde(deserialize_with = "nullable")]
    pub display_name: String,
    #[serde(deserialize_with = "nullable")]
    pub published: bool,
}

/// Create request; `None` fields are omitted from the JSON body
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CreateVirtualMachineRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub os_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub os_version: Option<String>,
    /// Boot disk size in GB
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disks: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vcpu: Option<i64>,
    /// Memory in MB
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ram: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub billing_account_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backup: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub public_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub network_uuid: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_replica: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_uuid: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reserve_public_ip: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cloud_init: Option<String>,
}

pub struct VirtualMachineApi<'a> {
    client: &'a WarrenClient,
}

impl<'a> VirtualMachineApi<'a> {
    pub(crate) fn new(client: &'a WarrenClient) -> Self {
        Self { client }
    }

    pub async fn get(&self, uuid: &str) -> Result<VirtualMachine> {
        self.client
            .get("/user-resource/vm")
            .query("uuid", uuid)
            .call()
            .await
    }

    pub async fn list(&self) -> Result<Vec<VirtualMachine>> {
        self.client.get("/user-resource/vm/list").call().await
    }

    pub async fn create(&self, request: &CreateVirtualMachineRequest) -> Result<VirtualMachine> {
        self.client
            .post("/user-resource/vm")
            .json(request)
            .call()
            .await
    }

    pub async fn start(&self, uuid: &str) -> Result<VirtualMachine> {
        self.client
            .post("/user-resource/vm/start")
            .form("uuid", uuid)
            .call()
            .await
    }

    pub async fn stop(&self, uuid: &str, force: bool) -> Result<VirtualMachine> {
        self.client
            .post("/user-resource/vm/stop")
            .form("uuid", uuid)
            .form("force", force.to_string())
            .call()
            .await
    }

    pub async fn delete(&self, uuid: &str) -> Result<()> {
        self.client
            .delete("/user-resource/vm")
            .form("uuid", uuid)
            .call_no_content()
            .await
    }

    pub async fn attach_disk(&self, vm_uuid: &str, disk_uuid: &str) -> Result<VmStorage> {
        self.client
            .post("/user-resource/vm/storage/attach")
            .form("uuid", vm_uuid)
            .form("storage_uuid", disk_uuid)
            .call()
            .await
    }

    pub async fn detach_disk(&self, vm_uuid: &str, disk_uuid: &str) -> Result<()> {
        self.client
            .post("/user-resource/vm/storage/detach")
            .form("uuid", vm_uuid)
            .form("storage_uuid", disk_uuid)
            .call_no_content()
            .await
    }

    pub async fn base_images(&self) -> Result<Vec<BaseImage>> {
        self.client.get("/config/vm_images").call().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_request_omits_unset() {
        let request = CreateVirtualMachineRequest {
            name: Some("web".to_string()),
            disks: Some(20),
            ram: Some(2048),
            vcpu: Some(1),
            backup: Some(false),
            ..Default::default()
        };
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            serde_json::json!({
                "name": "web",
                "disks": 20,
                "ram": 2048,
                "vcpu": 1,
                "backup": false
            })
        );
    }

    #[test]
    fn test_primary_storage() {
        let vm: VirtualMachine = serde_json::from_value(serde_json::json!({
            "uuid": "vm-1",
            "storage": [
                {"uuid": "s-2", "primary": false, "size": 50, "replica": null},
                {"uuid": "s-1", "primary": true, "size": 20, "replica": [
                    {"uuid": "r-1", "type": "backup", "size": 20, "master_uuid": "s-1"}
                ]}
            ]
        }))
        .unwrap();

        let primary = vm.primary_storage().unwrap();
        assert_eq!(primary.uuid, "s-1");
        assert_eq!(primary.replica[0].replica_type, "backup");
        assert!(vm.storage[0].replica.is_empty());
    }

    #[test]
    fn test_decode_null_scalars() {
        let vm: VirtualMachine = serde_json::from_value(serde_json::json!({
            "uuid": "vm-1",
            "backup": null,
            "billing_account": null,
            "memory": null,
            "user_id": null,
            "vcpu": null,
            "storage": [
                {"uuid": "s-1", "primary": null, "size": null, "user_id": null, "replica": [
                    {"uuid": "r-1", "size": null}
                ]}
            ]
        }))
        .unwrap();
        assert!(!vm.backup);
        assert_eq!(vm.memory, 0);
        assert_eq!(vm.vcpu, 0);
        assert!(!vm.storage[0].primary);
        assert_eq!(vm.storage[0].size, 0);
        assert_eq!(vm.storage[0].replica[0].size, 0);

        let image: BaseImage = serde_json::from_value(serde_json::json!({
            "os_name": "ubuntu",
            "ui_position": null,
            "is_default": null,
            "is_app_catalog": null,
            "versions": [{"os_version": "22.04", "published": null}]
        }))
        .unwrap();
        assert_eq!(image.ui_position, 0);
        assert!(!image.is_default);
        assert!(!image.versions[0].published);
    }
}
