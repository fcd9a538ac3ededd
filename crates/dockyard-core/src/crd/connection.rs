use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::common::{ConnectionStatus, SecretKeyRef};

/// HarborConnectionSpec describes how to reach a Harbor instance
#[derive(CustomResource, Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[kube(
    group = "dockyard.dev",
    version = "v1alpha1",
    kind = "HarborConnection",
    plural = "harborconnections",
    shortname = "hconn",
    status = "ConnectionStatus",
    namespaced,
    printcolumn = r#"{"name":"URL","type":"string","jsonPath":".spec.baseURL"}"#,
    printcolumn = r#"{"name":"Ready","type":"string","jsonPath":".status.conditions[?(@.type==\"Ready\")].status"}"#
)]
#[serde(rename_all = "camelCase")]
pub struct HarborConnectionSpec {
    /// Base address of the Harbor instance, e.g. `https://harbor.example.com`
    #[serde(rename = "baseURL")]
    pub base_url: String,

    /// Credentials for authenticated calls; omitted for anonymous access
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credentials: Option<ConnectionCredentials>,

    /// Re-probe interval (e.g. `5m`); unset disables periodic probes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub drift_detection_interval: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionCredentials {
    pub username: String,

    /// Secret key holding the password
    pub password_secret_ref: SecretKeyRef,
}
