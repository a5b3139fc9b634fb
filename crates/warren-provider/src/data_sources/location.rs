//! Location data source

use super::{describe_constraints, describe_filter};
use crate::api::Location;
use crate::classify::into_cloud_error;
use crate::client::WarrenClient;
use crate::mapper::location_to_model;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use warren_cloud::{CloudError, ResourceKind, Result};

/// Datacenter location; the slug doubles as the identity
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocationModel {
    #[serde(rename = "id")]
    pub slug: Option<String>,
    pub display_name: Option<String>,
    pub country_code: Option<String>,
    pub description: Option<String>,
    pub is_default: Option<bool>,
    pub is_preferred: Option<bool>,
}

impl LocationModel {
    fn is_parameter_only(&self) -> bool {
        self.slug.is_none() && self.display_name.is_none()
    }

    fn matches(&self, location: &Location) -> bool {
        let selected = self.is_parameter_only()
            || self.slug.as_deref() == Some(location.slug.as_str())
            || self.display_name.as_deref() == Some(location.display_name.as_str());

        selected
            && self.is_default.is_none_or(|v| v == location.is_default)
            && self.is_preferred.is_none_or(|v| v == location.is_preferred)
    }

    fn describe(&self) -> String {
        let constraints = describe_constraints(&[
            ("Default", self.is_default),
            ("Preferred", self.is_preferred),
        ]);

        match (&self.display_name, &self.slug) {
            (Some(name), _) => describe_filter(format!("display name: {}", name), &constraints),
            (None, Some(slug)) => describe_filter(format!("slug: {}", slug), &constraints),
            (None, None) => format!("parameter: {}", constraints),
        }
    }
}

pub struct LocationDataSource {
    client: Arc<WarrenClient>,
}

impl LocationDataSource {
    pub fn new(client: Arc<WarrenClient>) -> Self {
        Self { client }
    }

    pub async fn read(&self, query: LocationModel) -> Result<LocationModel> {
        if query.is_parameter_only() && query.is_default.is_none() && query.is_preferred.is_none() {
            return Err(CloudError::InvalidConfig(
                "location lookup needs at least one of id, display_name, is_default or is_preferred"
                    .to_string(),
            ));
        }

        let locations = self
            .client
            .locations()
            .list()
            .await
            .map_err(|e| into_cloud_error(ResourceKind::Location, query.describe(), e))?;

        select(&locations, &query).map(location_to_model)
    }
}

fn select<'a>(locations: &'a [Location], query: &LocationModel) -> Result<&'a Location> {
    locations
        .iter()
        .find(|location| query.matches(location))
        .ok_or_else(|| CloudError::NoMatch {
            kind: ResourceKind::Location,
            filter: query.describe(),
        })
}
