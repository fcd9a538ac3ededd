use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::common::{HarborSpec, ResourceStatus};

/// HarborProjectSpec declares a Harbor project
#[derive(CustomResource, Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[kube(
    group = "dockyard.dev",
    version = "v1alpha1",
    kind = "HarborProject",
    plural = "harborprojects",
    shortname = "hproj",
    status = "ResourceStatus",
    namespaced,
    printcolumn = r#"{"name":"ID","type":"integer","jsonPath":".status.remoteId"}"#,
    printcolumn = r#"{"name":"Public","type":"boolean","jsonPath":".spec.public"}"#,
    printcolumn = r#"{"name":"Ready","type":"string","jsonPath":".status.conditions[?(@.type==\"Ready\")].status"}"#
)]
#[serde(rename_all = "camelCase")]
pub struct HarborProjectSpec {
    pub connection_ref: String,

    #[serde(default)]
    pub adopt_existing: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub drift_detection_interval: Option<String>,

    /// Project name in Harbor; defaults to the object name
    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub public: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<ProjectMetadataSpec>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cve_allowlist: Option<CveAllowlistSpec>,

    /// Storage quota in bytes, `-1` for unlimited
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storage_limit: Option<i64>,

    /// Name of the registry backing a proxy-cache project
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub registry_name: Option<String>,
}

/// Project feature flags
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProjectMetadataSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enable_content_trust: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auto_scan: Option<bool>,

    /// Minimum severity that blocks pulls (`none`, `low`, `medium`, `high`, `critical`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub severity: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prevent_vulnerable_images: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reuse_sys_cve_allowlist: Option<bool>,
}

/// CVEs exempted from vulnerability-based pull prevention
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct CveAllowlistSpec {
    #[serde(default)]
    pub items: Vec<String>,

    /// Unix timestamp after which the allowlist stops applying
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<i64>,
}

impl HarborSpec for HarborProjectSpec {
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
