//! Network data source

use super::{describe_constraints, describe_filter};
use crate::api::Network;
use crate::classify::into_cloud_error;
use crate::client::WarrenClient;
use crate::mapper::network_to_model;
use crate::model::NetworkModel;
use std::sync::Arc;
use warren_cloud::{CloudError, ResourceKind, Result};

pub struct NetworkDataSource {
    client: Arc<WarrenClient>,
}

impl NetworkDataSource {
    pub fn new(client: Arc<WarrenClient>) -> Self {
        Self { client }
    }

    /// Look up a network by `id`, `name` or the `is_default` flag
    pub async fn read(&self, query: NetworkModel) -> Result<NetworkModel> {
        if query.id.is_none() && query.name.is_none() && query.is_default.is_none() {
            return Err(CloudError::InvalidConfig(
                "network lookup needs at least one of id, name or is_default".to_string(),
            ));
        }

        let networks = self
            .client
            .networks()
            .list()
            .await
            .map_err(|e| into_cloud_error(ResourceKind::Network, describe(&query), e))?;

        select(&networks, &query).map(network_to_model)
    }
}

fn matches(query: &NetworkModel, network: &Network) -> bool {
    let selected = match (&query.id, &query.name) {
        (Some(id), _) => *id == network.uuid,
        (None, Some(name)) => *name == network.name,
        (None, None) => true,
    };

    selected && query.is_default.is_none_or(|v| v == network.is_default)
}

fn describe(query: &NetworkModel) -> String {
    let constraints = describe_constraints(&[("Default", query.is_default)]);

    match (&query.id, &query.name) {
        (Some(id), _) => describe_filter(format!("UUID: {}", id), &constraints),
        (None, Some(name)) => describe_filter(format!("name: {}", name), &constraints),
        (None, None) => format!("parameter: {}", constraints),
    }
}

fn select<'a>(networks: &'a [Network], query: &NetworkModel) -> Result<&'a Network> {
    networks
        .iter()
        .find(|network| matches(query, network))
        .ok_or_else(|| CloudError::NoMatch {
            kind: ResourceKind::Network,
            filter: describe(query),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn networks() -> Vec<Network> {
        vec![
            Network {
                uuid: "n-1".to_string(),
                name: "backend".to_string(),
                subnet: "10.1.0.0/24".to_string(),
                ..Default::default()
            },
            Network {
                uuid: "n-2".to_string(),
                name: "default".to_string(),
                subnet: "10.2.0.0/24".to_string(),
                is_default: true,
                ..Default::default()
            },
        ]
    }

    #[test]
    fn test_select() {
        let all = networks();

        let by_name = NetworkModel {
            name: Some("backend".to_string()),
            ..Default::default()
        };
        assert_eq!(select(&all, &by_name).unwrap().uuid, "n-1");

        let by_id = NetworkModel {
            id: Some("n-2".to_string()),
            ..Default::default()
        };
        assert_eq!(select(&all, &by_id).unwrap().name, "default");

        let default_only = NetworkModel {
            is_default: Some(true),
            ..Default::default()
        };
        assert_eq!(select(&all, &default_only).unwrap().uuid, "n-2");
    }

    #[test]
    fn test_no_match_messages() {
        let all = networks();

        let query = NetworkModel {
            name: Some("backend".to_string()),
            is_default: Some(true),
            ..Default::default()
        };
        let err = select(&all, &query).unwrap_err();
        assert!(err.to_string().contains("name: backend (Default true)"));

        let query = NetworkModel {
            id: Some("n-9".to_string()),
            ..Default::default()
        };
        assert!(select(&all, &query).unwrap_err().to_string().contains("UUID: n-9"));

        let only_default = vec![all[1].clone()];
        let query = NetworkModel {
            is_default: Some(false),
            ..Default::default()
        };
        assert!(
            select(&only_default, &query)
                .unwrap_err()
                .to_string()
                .contains("parameter: Default false")
        );
    }
}
