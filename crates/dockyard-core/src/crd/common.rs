//! Fields and status types shared across kinds

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::conditions::{Condition, StatusConditions};

/// Reference to one key of a Secret in the object's namespace
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct SecretKeyRef {
    pub name: String,
    pub key: String,
}

/// Cross-cutting settings every Harbor-backed spec carries
pub trait HarborSpec {
    /// Name of the `HarborConnection` in the same namespace
    fn connection_ref(&self) -> &str;

    /// Bind to an existing remote entity with the same name instead of creating one
    fn adopt_existing(&self) -> bool;

    /// How often to re-check the remote entity for drift
    fn drift_detection_interval(&self) -> Option<&str>;
}

/// Observed state of a Harbor-backed resource
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ResourceStatus {
    /// Harbor identifier of the corresponding entity.
    /// Serialized even when unset so that merge patches clear it.
    #[serde(default)]
    pub remote_id: Option<i64>,

    #[serde(default)]
    pub observed_generation: i64,

    #[serde(default)]
    pub conditions: Vec<Condition>,
}

impl ResourceStatus {
    /// The remote ID, treating `0` as unset
    pub fn known_remote_id(&self) -> Option<i64> {
        self.remote_id.filter(|id| *id != 0)
    }
}

impl StatusConditions for ResourceStatus {
    fn conditions(&self) -> &[Condition] {
        &self.conditions
    }

    fn conditions_mut(&mut self) -> &mut Vec<Condition> {
        &mut self.conditions
    }

    fn set_observed_generation(&mut self, generation: i64) {
        self.observed_generation = generation;
    }
}

/// Observed state of a `HarborConnection`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionStatus {
    #[serde(default)]
    pub observed_generation: i64,

    #[serde(default)]
    pub conditions: Vec<Condition>,
}

impl StatusConditions for ConnectionStatus {
    fn conditions(&self) -> &[Condition] {
        &self.conditions
    }

    fn conditions_mut(&mut self) -> &mut Vec<Condition> {
        &mut self.conditions
    }

    fn set_observed_generation(&mut self, generation: i64) {
        self.observed_generation = generation;
    }
}
