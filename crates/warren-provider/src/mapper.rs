//! Wire objects to canonical state
//!
//! Pure conversions without I/O. Nested lists keep the platform's order.
//! Derived relations (attached server, network membership) are passed in by
//! the caller and stay `None` when the lookup was not done or failed.

use crate::api::{
    BaseImage, Disk, FloatingIp, Location, Network, Snapshot, StorageReplica, VirtualMachine,
    VmStorage,
};
use crate::data_sources::{LocationModel, OsBaseImageModel, OsBaseImageVersionModel};
use crate::model::{
    DiskModel, DiskSnapshotModel, FloatingIpModel, NetworkModel, StorageReplicaModel,
    VirtualMachineModel, VmStorageModel,
};

fn non_empty(value: &str) -> Option<String> {
    (!value.is_empty()).then(|| value.to_string())
}

pub fn disk_to_model(disk: &Disk, server_uuid: Option<String>) -> DiskModel {
    DiskModel {
        id: Some(disk.uuid.clone()),
        billing_account: Some(disk.billing_account_id),
        created_at: Some(disk.created_at.clone()),
        server_uuid,
        size_in_gb: Some(disk.size_gb),
        snapshots: Some(disk.snapshots.iter().map(snapshot_to_model).collect()),
        source_image_type: Some(disk.source_image_type.clone()),
        source_image_uuid: Some(disk.source_image.clone()),
        status: Some(disk.status.clone()),
        status_comment: Some(disk.status_comment.clone()),
        updated_at: Some(disk.updated_at.clone()),
        user_id: Some(disk.user_id),
    }
}

fn snapshot_to_model(snapshot: &Snapshot) -> DiskSnapshotModel {
    DiskSnapshotModel {
        created_at: Some(snapshot.created_at.clone()),
        disk_uuid: Some(snapshot.disk_uuid.clone()),
        size_in_gb: Some(snapshot.size_gb),
        uuid: Some(snapshot.uuid.clone()),
    }
}

/// `network_uuid` is the derived network of the assigned server
pub fn floating_ip_to_model(ip: &FloatingIp, network_uuid: Option<String>) -> FloatingIpModel {
    FloatingIpModel {
        id: Some(ip.id.to_string()),
        uuid: Some(ip.uuid.clone()),
        address: Some(ip.address.clone()),
        assigned_to: non_empty(&ip.assigned_to),
        assigned_to_private_ip: Some(ip.assigned_to_private_ip.clone()),
        assigned_to_resource_type: Some(ip.assigned_to_resource_type.clone()),
        billing_account: Some(ip.billing_account_id),
        created_at: Some(ip.created_at.clone()),
        enabled: Some(ip.enabled),
        is_ipv6: Some(ip.is_ipv6),
        name: Some(ip.name.clone()),
        network_uuid: if ip.is_assigned() {
            network_uuid
        } else {
            Some(String::new())
        },
        ip_type: Some(ip.ip_type.clone()),
        updated_at: Some(ip.updated_at.clone()),
        user_id: Some(ip.user_id),
    }
}

pub fn network_to_model(network: &Network) -> NetworkModel {
    NetworkModel {
        id: Some(network.uuid.clone()),
        name: Some(network.name.clone()),
        created_at: Some(network.created_at.clone()),
        updated_at: Some(network.updated_at.clone()),
        is_default: Some(network.is_default),
        server_uuids: Some(network.vm_uuids.clone()),
        subnet_ipv4: Some(network.subnet.clone()),
        subnet_ipv6: Some(network.subnet_ipv6.clone()),
        network_type: Some(network.network_type.clone()),
        vlan_id: Some(network.vlan_id),
        resources_count: Some(network.resources_count),
    }
}

/// Observed machine state on top of the configured attributes
///
/// Attributes the platform never echoes (password, cloud-init, public key,
/// source image) are kept from `desired`. The boot disk size is only taken
/// from the primary storage entry when it was not configured.
pub fn virtual_machine_to_model(
    vm: &VirtualMachine,
    desired: &VirtualMachineModel,
    network_uuid: Option<String>,
) -> VirtualMachineModel {
    let disk_size_in_gb = desired
        .disk_size_in_gb
        .or_else(|| vm.primary_storage().map(|s| s.size));

    VirtualMachineModel {
        id: Some(vm.uuid.clone()),
        backup: Some(vm.backup),
        billing_account: Some(vm.billing_account),
        cloud_init: desired.cloud_init.clone(),
        created_at: Some(vm.created_at.clone()),
        description: Some(vm.description.clone()),
        disk_size_in_gb,
        hostname: Some(vm.hostname.clone()),
        mac: Some(vm.mac.clone()),
        memory: Some(vm.memory),
        name: Some(vm.name.clone()),
        // A failed membership lookup keeps the configured network rather than reporting drift
        network_uuid: network_uuid.or_else(|| desired.network_uuid.clone()),
        os_name: Some(vm.os_name.clone()),
        os_version: Some(vm.os_version.clone()),
        password: desired.password.clone(),
        private_ipv4: Some(vm.private_ipv4.clone()),
        public_ipv6: Some(vm.public_ipv6.clone()),
        public_key: desired.public_key.clone(),
        reserve_public_ip: desired.reserve_public_ip,
        source_replica: desired.source_replica.clone(),
        source_uuid: desired.source_uuid.clone(),
        status: Some(vm.status.clone()),
        storage: Some(vm.storage.iter().map(storage_to_model).collect()),
        updated_at: Some(vm.updated_at.clone()),
        user_id: Some(vm.user_id),
        username: Some(vm.username.clone()),
        vcpu: Some(vm.vcpu),
    }
}

fn storage_to_model(storage: &VmStorage) -> VmStorageModel {
    VmStorageModel {
        created_at: Some(storage.created_at.clone()),
        name: Some(storage.name.clone()),
        primary: Some(storage.primary),
        replica: Some(storage.replica.iter().map(replica_to_model).collect()),
        size_in_gb: Some(storage.size),
        user_id: Some(storage.user_id),
        uuid: Some(storage.uuid.clone()),
    }
}

fn replica_to_model(replica: &StorageReplica) -> StorageReplicaModel {
    StorageReplicaModel {
        created_at: Some(replica.created_at.clone()),
        master_uuid: Some(replica.master_uuid.clone()),
        size_in_gb: Some(replica.size),
        replica_type: Some(replica.replica_type.clone()),
        uuid: Some(replica.uuid.clone()),
    }
}

pub fn location_to_model(location: &Location) -> LocationModel {
    LocationModel {
        slug: Some(location.slug.clone()),
        display_name: Some(location.display_name.clone()),
        country_code: Some(location.country_code.clone()),
        description: Some(location.description.clone()),
        is_default: Some(location.is_default),
        is_preferred: Some(location.is_preferred),
    }
}

pub fn base_image_to_model(image: &BaseImage, os_version: Option<String>) -> OsBaseImageModel {
    OsBaseImageModel {
        os_name: Some(image.os_name.clone()),
        display_name: Some(image.display_name.clone()),
        os_version,
        is_app_catalog: Some(image.is_app_catalog),
        is_default: Some(image.is_default),
        versions: Some(
            image
                .versions
                .iter()
                .map(|v| OsBaseImageVersionModel {
                    display_name: Some(v.display_name.clone()),
                    os_version: Some(v.os_version.clone()),
                    published: Some(v.published),
                })
                .collect(),
        ),
    }
}
