use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::common::{HarborSpec, ResourceStatus};

/// HarborMemberSpec grants a user or group a role in a project
///
/// Exactly one of `user` and `group` must be set.
#[derive(CustomResource, Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[kube(
    group = "dockyard.dev",
    version = "v1alpha1",
    kind = "HarborMember",
    plural = "harbormembers",
    shortname = "hmem",
    status = "ResourceStatus",
    namespaced,
    printcolumn = r#"{"name":"Project","type":"string","jsonPath":".spec.projectRef"}"#,
    printcolumn = r#"{"name":"Role","type":"string","jsonPath":".spec.role"}"#,
    printcolumn = r#"{"name":"Ready","type":"string","jsonPath":".status.conditions[?(@.type==\"Ready\")].status"}"#
)]
#[serde(rename_all = "camelCase")]
pub struct HarborMemberSpec {
    pub connection_ref: String,

    #[serde(default)]
    pub adopt_existing: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub drift_detection_interval: Option<String>,

    /// Name of the `HarborProject` in the same namespace
    pub project_ref: String,

    pub role: MemberRole,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<MemberUser>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<MemberGroup>,
}

/// Project role, mapped to Harbor's role IDs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub enum MemberRole {
    ProjectAdmin,
    Developer,
    Guest,
    Maintainer,
    LimitedGuest,
}

impl MemberRole {
    pub fn role_id(self) -> i64 {
        match self {
            Self::ProjectAdmin => 1,
            Self::Developer => 2,
            Self::Guest => 3,
            Self::Maintainer => 4,
            Self::LimitedGuest => 5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct MemberUser {
    pub username: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct MemberGroup {
    pub group_name: String,

    pub group_type: GroupType,

    #[serde(default, rename = "ldapGroupDN", skip_serializing_if = "Option::is_none")]
    pub ldap_group_dn: Option<String>,
}

/// User group backend, mapped to Harbor's group type IDs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum GroupType {
    Ldap,
    Http,
    Oidc,
}

impl GroupType {
    pub fn type_id(self) -> i64 {
        match self {
            Self::Ldap => 1,
            Self::Http => 2,
            Self::Oidc => 3,
        }
    }
}

impl HarborSpec for HarborMemberSpec {
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
