//! Drift detection between prior and planned resource state
//!
//! Each canonical model declares which attributes force a replacement and
//! which ones are reported by the platform only. [`Plan::between`] compares
//! two models attribute by attribute and decides whether the orchestrator
//! has to create, update in place, replace, or delete the resource.

use crate::error::Result;
use crate::provider::ResourceKind;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// Attribute policy of a canonical model
pub trait Schema: Serialize + DeserializeOwned {
    const KIND: ResourceKind;

    /// Attributes whose change requires destroying and recreating the resource
    const REPLACE_ON_CHANGE: &'static [&'static str];

    /// Attributes reported by the platform only; never part of a diff
    const COMPUTED: &'static [&'static str];

    /// Optional attributes the platform fills in when unset. A null planned
    /// value keeps whatever was observed.
    const DEFAULTED: &'static [&'static str];

    /// Remote identity, if the resource exists
    fn id(&self) -> Option<&str>;
}

/// Type of action to perform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionType {
    /// Create a new resource
    Create,
    /// Update an existing resource in place
    Update,
    /// Destroy and recreate the resource
    Replace,
    /// Delete a resource
    Delete,
    /// No changes needed
    NoOp,
}

impl std::fmt::Display for ActionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ActionType::Create => write!(f, "create"),
            ActionType::Update => write!(f, "update"),
            ActionType::Replace => write!(f, "replace"),
            ActionType::Delete => write!(f, "delete"),
            ActionType::NoOp => write!(f, "no-op"),
        }
    }
}

/// A single attribute difference
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttributeChange {
    /// Attribute name
    pub attribute: String,

    /// Observed value
    pub before: serde_json::Value,

    /// Planned value
    pub after: serde_json::Value,

    /// Whether this change alone forces a replacement
    pub requires_replace: bool,
}

/// Planned action for one resource instance
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Plan {
    /// Resource type (e.g., "warren_disk")
    pub resource_type: String,

    /// Action to perform
    pub action: ActionType,

    /// Attribute differences backing the action
    pub changes: Vec<AttributeChange>,
}

impl Plan {
    /// Compute the plan between prior (observed) and planned (desired) state
    pub fn between<M: Schema>(prior: Option<&M>, planned: Option<&M>) -> Result<Self> {
        let resource_type = M::KIND.type_name().to_string();

        let (prior, planned) = match (prior, planned) {
            (None, None) => {
                return Ok(Self {
                    resource_type,
                    action: ActionType::NoOp,
                    changes: Vec::new(),
                });
            }
            (Some(_), None) => {
                return Ok(Self {
                    resource_type,
                    action: ActionType::Delete,
                    changes: Vec::new(),
                });
            }
            (None, Some(planned)) => (serde_json::Value::Null, serde_json::to_value(planned)?),
            (Some(prior), Some(planned)) => {
                (serde_json::to_value(prior)?, serde_json::to_value(planned)?)
            }
        };

        let creating = prior.is_null();
        let changes = attribute_changes::<M>(&prior, &planned);

        let action = if creating {
            ActionType::Create
        } else if changes.iter().any(|c| c.requires_replace) {
            ActionType::Replace
        } else if changes.is_empty() {
            ActionType::NoOp
        } else {
            ActionType::Update
        };

        tracing::trace!(
            "Planned {} for {} ({} attribute changes)",
            action,
            resource_type,
            changes.len()
        );

        Ok(Self {
            resource_type,
            action,
            changes,
        })
    }

    pub fn has_changes(&self) -> bool {
        self.action != ActionType::NoOp
    }

    /// Names of the attributes that force a replacement
    pub fn replacement_attributes(&self) -> Vec<&str> {
        self.changes
            .iter()
            .filter(|c| c.requires_replace)
            .map(|c| c.attribute.as_str())
            .collect()
    }

    /// Names of the attributes that change in place
    pub fn updated_attributes(&self) -> Vec<&str> {
        self.changes
            .iter()
            .filter(|c| !c.requires_replace)
            .map(|c| c.attribute.as_str())
            .collect()
    }
}

fn attribute_changes<M: Schema>(
    prior: &serde_json::Value,
    planned: &serde_json::Value,
) -> Vec<AttributeChange> {
    let empty = serde_json::Map::new();
    let prior_map = prior.as_object().unwrap_or(&empty);
    let planned_map = planned.as_object().unwrap_or(&empty);

    let mut names: Vec<&String> = prior_map.keys().chain(planned_map.keys()).collect();
    names.sort();
    names.dedup();

    let mut changes = Vec::new();

    for name in names {
        if M::COMPUTED.contains(&name.as_str()) {
            continue;
        }

        let before = prior_map
            .get(name)
            .cloned()
            .unwrap_or(serde_json::Value::Null);
        let after = planned_map
            .get(name)
            .cloned()
            .unwrap_or(serde_json::Value::Null);

        if after.is_null() && M::DEFAULTED.contains(&name.as_str()) {
            continue;
        }

        if before != after {
            changes.push(AttributeChange {
                attribute: name.clone(),
                before,
                after,
                requires_replace: !prior.is_null()
                    && M::REPLACE_ON_CHANGE.contains(&name.as_str()),
            });
        }
    }

    changes
}

/// Summary of planned actions
#[derive(Debug, Clone, Default)]
pub struct PlanSummary {
    pub create: usize,
    pub update: usize,
    pub replace: usize,
    pub delete: usize,
    pub no_change: usize,
}

impl PlanSummary {
    pub fn from_plans<'a>(plans: impl IntoIterator<Item = &'a Plan>) -> Self {
        let mut summary = Self::default();
        for plan in plans {
            match plan.action {
                ActionType::Create => summary.create += 1,
                ActionType::Update => summary.update += 1,
                ActionType::Replace => summary.replace += 1,
                ActionType::Delete => summary.delete += 1,
                ActionType::NoOp => summary.no_change += 1,
            }
        }
        summary
    }
}

impl std::fmt::Display for PlanSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} to create, {} to update, {} to replace, {} to delete, {} unchanged",
            self.create, self.update, self.replace, self.delete, self.no_change
        )
    }
}
