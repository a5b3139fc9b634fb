//! Cross-resource lookups
//!
//! The platform offers no server-side filter for these relations, so every
//! lookup scans a full list response.

use crate::api::{FloatingIp, Network, VirtualMachine};
use crate::classify::into_cloud_error;
use crate::client::WarrenClient;
use ipnet::IpNet;
use std::net::IpAddr;
use warren_cloud::{CloudError, ResourceKind, Result};

/// Network a server belongs to
///
/// The network has to list the server AND its subnet has to contain the
/// server's private IPv4 address.
pub async fn network_for_server(client: &WarrenClient, server_uuid: &str) -> Result<Network> {
    let server = client
        .virtual_machines()
        .get(server_uuid)
        .await
        .map_err(|e| into_cloud_error(ResourceKind::VirtualMachine, server_uuid, e))?;

    let networks = client
        .networks()
        .list()
        .await
        .map_err(|e| into_cloud_error(ResourceKind::Network, server_uuid, e))?;

    let address = server.private_ipv4.parse::<IpAddr>().ok();

    find_network_for_server(&networks, server_uuid, address)?
        .cloned()
        .ok_or_else(|| CloudError::NoMatch {
            kind: ResourceKind::Network,
            filter: format!("server UUID {}", server_uuid),
        })
}

pub fn find_network_for_server<'a>(
    networks: &'a [Network],
    server_uuid: &str,
    address: Option<IpAddr>,
) -> Result<Option<&'a Network>> {
    for network in networks {
        if !network.vm_uuids.iter().any(|uuid| uuid == server_uuid) {
            continue;
        }

        // Parse the subnet only once the network lists the server
        let subnet: IpNet = network.subnet.parse().map_err(|e| CloudError::MalformedResponse {
            kind: ResourceKind::Network,
            id: network.uuid.clone(),
            message: format!("invalid subnet {:?}: {}", network.subnet, e),
        })?;

        if address.is_some_and(|ip| subnet.contains(&ip)) {
            return Ok(Some(network));
        }
    }

    Ok(None)
}

/// Server the disk is attached to
pub async fn server_for_disk(client: &WarrenClient, disk_uuid: &str) -> Result<VirtualMachine> {
    let servers = client
        .virtual_machines()
        .list()
        .await
        .map_err(|e| into_cloud_error(ResourceKind::VirtualMachine, disk_uuid, e))?;

    find_server_for_disk(&servers, disk_uuid)
        .cloned()
        .ok_or_else(|| CloudError::NoMatch {
            kind: ResourceKind::VirtualMachine,
            filter: format!("disk UUID {}", disk_uuid),
        })
}

pub fn find_server_for_disk<'a>(
    servers: &'a [VirtualMachine],
    disk_uuid: &str,
) -> Option<&'a VirtualMachine> {
    servers
        .iter()
        .find(|server| server.storage.iter().any(|s| s.uuid == disk_uuid))
}

/// Enabled floating IP with the given numeric id
pub async fn floating_ip_by_id(client: &WarrenClient, id: i64) -> Result<FloatingIp> {
    let floating_ips = list_floating_ips(client, &id.to_string()).await?;

    floating_ips
        .into_iter()
        .find(|ip| ip.enabled && ip.id == id)
        .ok_or_else(|| CloudError::NotFound {
            kind: ResourceKind::FloatingIp,
            id: id.to_string(),
        })
}

/// Enabled floating IP assigned to the given resource
pub async fn floating_ip_assigned_to(client: &WarrenClient, resource_uuid: &str) -> Result<FloatingIp> {
    let floating_ips = list_floating_ips(client, resource_uuid).await?;

    floating_ips
        .into_iter()
        .find(|ip| ip.enabled && ip.assigned_to == resource_uuid)
        .ok_or_else(|| CloudError::NoMatch {
            kind: ResourceKind::FloatingIp,
            filter: format!("assigned UUID {}", resource_uuid),
        })
}

async fn list_floating_ips(client: &WarrenClient, context: &str) -> Result<Vec<FloatingIp>> {
    client
        .floating_ips()
        .list()
        .await
        .map_err(|e| into_cloud_error(ResourceKind::FloatingIp, context, e))
}
