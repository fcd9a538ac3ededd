use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::common::{HarborSpec, ResourceStatus};

/// HarborRegistrySpec declares a replication/proxy-cache registry endpoint
#[derive(CustomResource, Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[kube(
    group = "dockyard.dev",
    version = "v1alpha1",
    kind = "HarborRegistry",
    plural = "harborregistries",
    shortname = "hreg",
    status = "ResourceStatus",
    namespaced,
    printcolumn = r#"{"name":"ID","type":"integer","jsonPath":".status.remoteId"}"#,
    printcolumn = r#"{"name":"Ready","type":"string","jsonPath":".status.conditions[?(@.type==\"Ready\")].status"}"#
)]
#[serde(rename_all = "camelCase")]
pub struct HarborRegistrySpec {
    pub connection_ref: String,

    #[serde(default)]
    pub adopt_existing: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub drift_detection_interval: Option<String>,

    /// Registry name in Harbor; defaults to the object name
    #[serde(default)]
    pub name: String,

    /// Endpoint URL, scheme included
    pub url: String,

    /// Provider type (`harbor`, `docker-hub`, `docker-registry`, ...)
    #[serde(rename = "type")]
    pub registry_type: String,

    #[serde(default)]
    pub description: String,

    /// Skip TLS verification towards the endpoint
    #[serde(default)]
    pub insecure: bool,
}

impl HarborSpec for HarborRegistrySpec {
    fn connection_ref(&self) -> &str {
        &self.connection_ref
    }

    fn adopt_existing(&self) -> bool {
        self.adopt_existing
    }

    fn drift_detection_interval(&self) -> Option<&str> {
        self.drift_detection_interval.as_deref()
    }
}
