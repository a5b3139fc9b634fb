//! Canonical attribute sets persisted by the orchestrator
//!
//! Every attribute is optional: `None` serializes to `null` and means
//! "unknown" or "not configured". The [`Schema`] implementations carry the
//! per-attribute drift policy.

use serde::{Deserialize, Serialize};
use warren_cloud::{ResourceKind, Schema};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiskModel {
    /// Disk UUID
    pub id: Option<String>,
    pub billing_account: Option<i64>,
    pub created_at: Option<String>,
    /// Server the disk is attached to; derived from the servers' storage lists
    pub server_uuid: Option<String>,
    pub size_in_gb: Option<i64>,
    pub snapshots: Option<Vec<DiskSnapshotModel>>,
    /// One of OS_BASE, DISK, SNAPSHOT, EXTERNAL or EMPTY
    pub source_image_type: Option<String>,
    pub source_image_uuid: Option<String>,
    pub status: Option<String>,
    pub status_comment: Option<String>,
    pub updated_at: Option<String>,
    pub user_id: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiskSnapshotModel {
    pub created_at: Option<String>,
    pub disk_uuid: Option<String>,
    pub size_in_gb: Option<i64>,
    pub uuid: Option<String>,
}

impl Schema for DiskModel {
    const KIND: ResourceKind = ResourceKind::Disk;
    const REPLACE_ON_CHANGE: &'static [&'static str] = &[
        "billing_account",
        "size_in_gb",
        "source_image_type",
        "source_image_uuid",
    ];
    const COMPUTED: &'static [&'static str] = &[
        "id",
        "created_at",
        "snapshots",
        "status",
        "status_comment",
        "updated_at",
        "user_id",
    ];
    const DEFAULTED: &'static [&'static str] =
        &["billing_account", "source_image_type", "source_image_uuid"];

    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FloatingIpModel {
    /// Numeric platform id rendered as a decimal string
    pub id: Option<String>,
    pub uuid: Option<String>,
    pub address: Option<String>,
    /// UUID of the resource the address is assigned to
    pub assigned_to: Option<String>,
    pub assigned_to_private_ip: Option<String>,
    pub assigned_to_resource_type: Option<String>,
    pub billing_account: Option<i64>,
    pub created_at: Option<String>,
    pub enabled: Option<bool>,
    pub is_ipv6: Option<bool>,
    pub name: Option<String>,
    /// Network of the assigned server; empty when unassigned
    pub network_uuid: Option<String>,
    #[serde(rename = "type")]
    pub ip_type: Option<String>,
    pub updated_at: Option<String>,
    pub user_id: Option<i64>,
}

impl FloatingIpModel {
    /// Numeric platform id, if known and well formed
    pub fn numeric_id(&self) -> Option<i64> {
        self.id.as_deref().and_then(|id| id.parse().ok())
    }
}

impl Schema for FloatingIpModel {
    const KIND: ResourceKind = ResourceKind::FloatingIp;
    const REPLACE_ON_CHANGE: &'static [&'static str] = &["billing_account", "name"];
    const COMPUTED: &'static [&'static str] = &[
        "id",
        "uuid",
        "address",
        "assigned_to_private_ip",
        "assigned_to_resource_type",
        "created_at",
        "enabled",
        "is_ipv6",
        "network_uuid",
        "type",
        "updated_at",
        "user_id",
    ];
    const DEFAULTED: &'static [&'static str] = &["billing_account", "name"];

    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkModel {
    /// Network UUID
    pub id: Option<String>,
    pub name: Option<String>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
    pub is_default: Option<bool>,
    pub server_uuids: Option<Vec<String>>,
    pub subnet_ipv4: Option<String>,
    pub subnet_ipv6: Option<String>,
    #[serde(rename = "type")]
    pub network_type: Option<String>,
    pub vlan_id: Option<i64>,
    pub resources_count: Option<i64>,
}

impl Schema for NetworkModel {
    const KIND: ResourceKind = ResourceKind::Network;
    const REPLACE_ON_CHANGE: &'static [&'static str] = &[];
    const COMPUTED: &'static [&'static str] = &[
        "id",
        "created_at",
        "updated_at",
        "server_uuids",
        "subnet_ipv4",
        "subnet_ipv6",
        "type",
        "vlan_id",
        "resources_count",
    ];
    const DEFAULTED: &'static [&'static str] = &["name", "is_default"];

    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }
}

#[derive(Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VirtualMachineModel {
    /// Virtual machine UUID
    pub id: Option<String>,
    pub backup: Option<bool>,
    pub billing_account: Option<i64>,
    /// Not echoed by the platform; carried over from the configuration
    pub cloud_init: Option<String>,
    pub created_at: Option<String>,
    pub description: Option<String>,
    /// Boot disk size in GB
    pub disk_size_in_gb: Option<i64>,
    pub hostname: Option<String>,
    pub mac: Option<String>,
    /// Memory in MB
    pub memory: Option<i64>,
    pub name: Option<String>,
    pub network_uuid: Option<String>,
    pub os_name: Option<String>,
    pub os_version: Option<String>,
    /// Not echoed by the platform; generated on create when unset
    pub password: Option<String>,
    pub private_ipv4: Option<String>,
    pub public_ipv6: Option<String>,
    pub public_key: Option<String>,
    pub reserve_public_ip: Option<bool>,
    pub source_replica: Option<String>,
    pub source_uuid: Option<String>,
    pub status: Option<String>,
    pub storage: Option<Vec<VmStorageModel>>,
    pub updated_at: Option<String>,
    pub user_id: Option<i64>,
    pub username: Option<String>,
    pub vcpu: Option<i64>,
}

impl std::fmt::Debug for VirtualMachineModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VirtualMachineModel")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("status", &self.status)
            .field("vcpu", &self.vcpu)
            .field("memory", &self.memory)
            .field("disk_size_in_gb", &self.disk_size_in_gb)
            .field("os_name", &self.os_name)
            .field("os_version", &self.os_version)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("network_uuid", &self.network_uuid)
            .field("private_ipv4", &self.private_ipv4)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VmStorageModel {
    pub created_at: Option<String>,
    pub name: Option<String>,
    pub primary: Option<bool>,
    pub replica: Option<Vec<StorageReplicaModel>>,
    pub size_in_gb: Option<i64>,
    pub user_id: Option<i64>,
    pub uuid: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageReplicaModel {
    pub created_at: Option<String>,
    pub master_uuid: Option<String>,
    pub size_in_gb: Option<i64>,
    #[serde(rename = "type")]
    pub replica_type: Option<String>,
    pub uuid: Option<String>,
}

impl Schema for VirtualMachineModel {
    const KIND: ResourceKind = ResourceKind::VirtualMachine;
    const REPLACE_ON_CHANGE: &'static [&'static str] = &[
        "backup",
        "billing_account",
        "cloud_init",
        "disk_size_in_gb",
        "memory",
        "name",
        "os_name",
        "os_version",
        "password",
        "public_key",
        "reserve_public_ip",
        "source_replica",
        "source_uuid",
        "username",
        "vcpu",
    ];
    const COMPUTED: &'static [&'static str] = &[
        "id",
        "created_at",
        "description",
        "hostname",
        "mac",
        "private_ipv4",
        "public_ipv6",
        "status",
        "storage",
        "updated_at",
        "user_id",
    ];
    const DEFAULTED: &'static [&'static str] = &[
        "backup",
        "billing_account",
        "disk_size_in_gb",
        "network_uuid",
        "password",
        "reserve_public_ip",
        "username",
    ];

    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }
}
