use super::nullable;
use crate::client::WarrenClient;
use crate::error::Result;
use serde::{Deserialize, Serialize};

/// Datacenter location
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Location {
    #[serde(deserialize_with = "nullable")]
    pub slug: String,
    #[serde(deserialize_with = "nullable")]
    pub display_name: String,
    #[serde(deserialize_with = "nullable")]
    pub is_default: bool,
    #[serde(deserialize_with = "nullable")]
    pub is_preferred: bool,
    #[serde(deserialize_with = "nullable")]
    pub description: String,
    #[serde(deserialize_with = "nullable")]
    pub order_nr: i64,
    #[serde(deserialize_with = "nullable")]
    pub country_code: String,
}

pub struct LocationApi<'a> {
    client: &'a WarrenClient,
}

impl<'a> LocationApi<'a> {
    pub(crate) fn new(client: &'a WarrenClient) -> Self {
        Self { client }
    }

    pub async fn list(&self) -> Result<Vec<Location>> {
        self.client.get("/config/locations").call().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_null_scalars() {
        let location: Location = serde_json::from_value(serde_json::json!({
            "slug": "tll",
            "is_default": null,
            "is_preferred": null,
            "order_nr": null,
            "description": null
        }))
        .unwrap();
        assert_eq!(location.slug, "tll");
        assert!(!location.is_default);
        assert!(!location.is_preferred);
        assert_eq!(location.order_nr, 0);
    }
}
