//! Wire payloads for the Harbor v2.0 API
//!
//! Request types serialize exactly the fields Harbor expects; response types
//! deserialize only the fields Dockyard compares and ignore the rest.

use serde::{Deserialize, Serialize};

// ============ Registries ============

/// Body of `POST /registries` and `PUT /registries/{id}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryReq {
    pub url: String,
    pub name: String,
    pub description: String,
    #[serde(rename = "type")]
    pub registry_type: String,
    pub insecure: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Registry {
    pub id: i64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub description: String,
    #[serde(rename = "type", default)]
    pub registry_type: String,
    #[serde(default)]
    pub insecure: bool,
}

// ============ Projects ============

/// Body of `POST /projects` and `PUT /projects/{id}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectReq {
    pub project_name: String,
    pub public: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
    pub metadata: ProjectMetadata,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cve_allowlist: Option<CveAllowlist>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub storage_limit: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub registry_id: Option<i64>,
}

/// Project metadata; Harbor encodes every flag as a string
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enable_content_trust: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auto_scan: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub severity: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prevent_vul: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reuse_sys_cve_allowlist: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CveAllowlist {
    #[serde(default)]
    pub items: Vec<CveItem>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CveItem {
    pub cve_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub project_id: i64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub owner_name: Option<String>,
    #[serde(default)]
    pub metadata: ProjectMetadata,
    #[serde(default)]
    pub cve_allowlist: Option<CveAllowlist>,
    #[serde(default)]
    pub registry_id: Option<i64>,
}

// ============ Members ============

/// Body of `POST /projects/{project_id}/members`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberReq {
    pub role_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub member_user: Option<UserEntity>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub member_group: Option<UserGroup>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserEntity {
    pub username: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserGroup {
    pub group_name: String,
    pub group_type: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ldap_group_dn: Option<String>,
}

/// Body of `PUT /projects/{project_id}/members/{mid}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleRequest {
    pub role_id: i64,
}

/// Entity type of a member: `u` for users, `g` for groups
pub const ENTITY_USER: &str = "u";
pub const ENTITY_GROUP: &str = "g";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    pub id: i64,
    #[serde(default)]
    pub project_id: i64,
    #[serde(default)]
    pub entity_name: String,
    #[serde(default)]
    pub entity_type: String,
    #[serde(default)]
    pub role_id: i64,
    #[serde(default)]
    pub role_name: String,
}

// ============ Users ============

/// Body of `POST /users`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserCreationReq {
    pub email: String,
    pub realname: String,
    pub comment: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    pub username: String,
}

/// Body of `PUT /users/{user_id}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub email: String,
    pub realname: String,
    pub comment: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub user_id: i64,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub realname: String,
    #[serde(default)]
    pub comment: String,
}
