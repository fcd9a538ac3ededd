use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::common::{HarborSpec, ResourceStatus, SecretKeyRef};

/// HarborUserSpec declares a local Harbor user
#[derive(CustomResource, Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[kube(
    group = "dockyard.dev",
    version = "v1alpha1",
    kind = "HarborUser",
    plural = "harborusers",
    shortname = "huser",
    status = "ResourceStatus",
    namespaced,
    printcolumn = r#"{"name":"ID","type":"integer","jsonPath":".status.remoteId"}"#,
    printcolumn = r#"{"name":"Ready","type":"string","jsonPath":".status.conditions[?(@.type==\"Ready\")].status"}"#
)]
#[serde(rename_all = "camelCase")]
pub struct HarborUserSpec {
    pub connection_ref: String,

    #[serde(default)]
    pub adopt_existing: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub drift_detection_interval: Option<String>,

    /// Login name; defaults to the object name
    #[serde(default)]
    pub username: String,

    pub email: String,

    pub realname: String,

    #[serde(default)]
    pub comment: String,

    /// Initial password, used when the user is created
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password_secret_ref: Option<SecretKeyRef>,
}

impl HarborSpec for HarborUserSpec {
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
