//! Wire types and endpoint groups of the Warren platform API

mod disk;
mod location;
mod network;
mod virtual_machine;

pub use disk::{CreateDiskRequest, Disk, DiskApi, Snapshot, SourceImageType};
pub use location::{Location, LocationApi};
pub use network::{
    ASSIGNED_TO_VIRTUAL_MACHINE, CreateFloatingIpRequest, FloatingIp, FloatingIpApi, Network,
    NetworkApi,
};
pub use virtual_machine::{
    BaseImage, BaseImageVersion, CreateVirtualMachineRequest, StorageReplica, VirtualMachine,
    VirtualMachineApi, VmStorage,
};

use serde::{Deserialize, Deserializer};

/// Treat an explicit JSON `null` like a missing field
pub(crate) fn nullable<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
