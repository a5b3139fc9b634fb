//! Canonical resource state handed back to the orchestrator
//!
//! The orchestrator persists state itself; this envelope only carries the
//! attribute set of one resource together with its identity.

use crate::error::{CloudError, Result};
use crate::plan::Schema;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// State of a single resource
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceState {
    /// Platform identity (UUID, or numeric id for floating IPs)
    pub id: String,

    /// Resource type (e.g., "warren_virtual_machine")
    pub resource_type: String,

    /// Canonical attributes
    pub attributes: serde_json::Map<String, serde_json::Value>,

    /// When this state was observed
    pub observed_at: DateTime<Utc>,
}

impl ResourceState {
    /// Build the envelope from a typed model
    pub fn from_model<M: Schema>(model: &M) -> Result<Self> {
        let id = model.id().unwrap_or_default().to_string();
        let attributes = match serde_json::to_value(model)? {
            serde_json::Value::Object(map) => map,
            other => {
                return Err(CloudError::InvalidConfig(format!(
                    "{} state is not an object: {}",
                    M::KIND,
                    other
                )));
            }
        };

        Ok(Self {
            id,
            resource_type: M::KIND.type_name().to_string(),
            attributes,
            observed_at: Utc::now(),
        })
    }

    /// Decode the attributes back into a typed model
    pub fn to_model<M: Schema>(&self) -> Result<M> {
        Ok(serde_json::from_value(serde_json::Value::Object(
            self.attributes.clone(),
        ))?)
    }

    pub fn get_attribute<T: serde::de::DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.attributes
            .get(key)
            .and_then(|v| serde_json::from_value(v.clone()).ok())
    }

    pub fn into_value(self) -> serde_json::Value {
        serde_json::Value::Object(self.attributes)
    }
}
