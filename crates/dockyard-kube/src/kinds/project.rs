use async_trait::async_trait;
use dockyard_core::crd::{HarborProject, HarborProjectSpec};
use dockyard_core::{HarborSpec, ResourceStatus};
use dockyard_harbor::{
    CveAllowlist, CveItem, HarborClient, Project, ProjectMetadata, ProjectReq,
    Result as HarborResult,
};
use kube::ResourceExt;

use super::names_match;
use crate::diff::{FieldChange, FieldDiff};
use crate::engine::HarborResource;
use crate::error::{ReconcileError, Result};
use crate::secrets::SecretResolver;
use crate::store::Store;

const SEVERITIES: &[&str] = &["none", "low", "medium", "high", "critical"];

/// Harbor encodes metadata flags as strings
fn flag(value: bool) -> String {
    value.to_string()
}

fn lowercase(value: &Option<String>) -> Option<String> {
    value.as_ref().map(|v| v.to_lowercase())
}

/// Request body for a project spec and an already resolved registry ID
fn project_payload(spec: &HarborProjectSpec, registry_id: Option<i64>) -> ProjectReq {
    let meta = spec.metadata.clone().unwrap_or_default();

    ProjectReq {
        project_name: spec.name.clone(),
        public: spec.public,
        owner: spec.owner.clone(),
        metadata: ProjectMetadata {
            public: Some(flag(spec.public)),
            enable_content_trust: meta.enable_content_trust.map(flag),
            auto_scan: meta.auto_scan.map(flag),
            severity: lowercase(&meta.severity),
            prevent_vul: meta.prevent_vulnerable_images.map(flag),
            reuse_sys_cve_allowlist: meta.reuse_sys_cve_allowlist.map(flag),
        },
        cve_allowlist: spec.cve_allowlist.as_ref().map(|list| CveAllowlist {
            items: list
                .items
                .iter()
                .map(|id| CveItem { cve_id: id.clone() })
                .collect(),
            expires_at: list.expires_at,
        }),
        storage_limit: spec.storage_limit,
        registry_id,
    }
}

fn sorted_cve_ids(list: Option<&CveAllowlist>) -> Vec<String> {
    let mut ids: Vec<String> = list
        .map(|l| l.items.iter().map(|i| i.cve_id.clone()).collect())
        .unwrap_or_default();
    ids.sort();
    ids
}

#[async_trait]
impl HarborResource for HarborProject {
    type Payload = ProjectReq;
    type Remote = Project;
    type Parent = ();

    fn settings(&self) -> &(dyn HarborSpec + Sync) {
        &self.spec
    }

    fn status(&self) -> Option<&ResourceStatus> {
        self.status.as_ref()
    }

    fn status_mut(&mut self) -> &mut ResourceStatus {
        self.status.get_or_insert_with(ResourceStatus::default)
    }

    fn validate(&self) -> Result<()> {
        if let Some(limit) = self.spec.storage_limit {
            if limit < -1 {
                return Err(ReconcileError::InvalidSpec(format!(
                    "storageLimit must be -1 (unlimited) or a byte count, got {}",
                    limit
                )));
            }
        }

        let severity = self.spec.metadata.as_ref().and_then(|m| m.severity.as_deref());
        if let Some(severity) = severity {
            if !SEVERITIES.contains(&severity.to_lowercase().as_str()) {
                return Err(ReconcileError::InvalidSpec(format!(
                    "unknown severity '{}', expected one of {}",
                    severity,
                    SEVERITIES.join(", ")
                )));
            }
        }

        if let Some(list) = &self.spec.cve_allowlist {
            if list.items.iter().any(|id| id.trim().is_empty()) {
                return Err(ReconcileError::InvalidSpec(
                    "cveAllowlist contains an empty CVE ID".to_string(),
                ));
            }
        }

        Ok(())
    }

    fn apply_defaults(&mut self) {
        if self.spec.name.is_empty() {
            self.spec.name = self.name_any();
        }
    }

    async fn resolve_parent<S: Store>(&self, _store: &S) -> Result<()> {
        Ok(())
    }

    async fn find_existing(&self, harbor: &HarborClient, _parent: &()) -> HarborResult<Option<i64>> {
        let projects = harbor.list_projects().await?;
        Ok(projects
            .into_iter()
            .find(|p| names_match(&p.name, &self.spec.name))
            .map(|p| p.project_id))
    }

    async fn build_payload(
        &self,
        harbor: &HarborClient,
        _parent: &(),
        _secrets: &dyn SecretResolver,
    ) -> Result<ProjectReq> {
        let registry_id = match &self.spec.registry_name {
            Some(name) => {
                let registries = harbor
                    .list_registries()
                    .await
                    .map_err(ReconcileError::Get)?;
                let found = registries
                    .into_iter()
                    .find(|r| names_match(&r.name, name))
                    .ok_or_else(|| {
                        ReconcileError::DependencyNotReady(format!(
                            "registry '{}' not found in Harbor",
                            name
                        ))
                    })?;
                Some(found.id)
            }
            None => None,
        };

        Ok(project_payload(&self.spec, registry_id))
    }

    async fn fetch(&self, harbor: &HarborClient, _parent: &(), id: i64) -> HarborResult<Project> {
        harbor.get_project(id).await
    }

    async fn create(&self, harbor: &HarborClient, _parent: &(), payload: &ProjectReq) -> HarborResult<i64> {
        harbor.create_project(payload).await
    }

    async fn update(
        &self,
        harbor: &HarborClient,
        _parent: &(),
        id: i64,
        payload: &ProjectReq,
    ) -> HarborResult<()> {
        harbor.update_project(id, payload).await
    }

    async fn delete(&self, harbor: &HarborClient, _parent: &(), id: i64) -> HarborResult<()> {
        harbor.delete_project(id).await
    }

    // Owner and storage limit are not part of the project read model
    fn diff(&self, desired: &ProjectReq, remote: &Project) -> Vec<FieldChange> {
        let current = &remote.metadata;
        let wanted = &desired.metadata;

        let mut diff = FieldDiff::new()
            .declared("public", &lowercase(&current.public), &wanted.public)
            .declared(
                "enable_content_trust",
                &lowercase(&current.enable_content_trust),
                &wanted.enable_content_trust,
            )
            .declared("auto_scan", &lowercase(&current.auto_scan), &wanted.auto_scan)
            .declared("severity", &lowercase(&current.severity), &wanted.severity)
            .declared("prevent_vul", &lowercase(&current.prevent_vul), &wanted.prevent_vul)
            .declared(
                "reuse_sys_cve_allowlist",
                &lowercase(&current.reuse_sys_cve_allowlist),
                &wanted.reuse_sys_cve_allowlist,
            );

        if let Some(list) = &desired.cve_allowlist {
            let observed = remote.cve_allowlist.as_ref();
            diff = diff
                .field(
                    "cve_allowlist.items",
                    &sorted_cve_ids(observed),
                    &sorted_cve_ids(Some(list)),
                )
                .field(
                    "cve_allowlist.expires_at",
                    &observed.and_then(|l| l.expires_at),
                    &list.expires_at,
                );
        }

        diff.into_changes()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kinds::fixtures::meta;
    use dockyard_core::crd::{CveAllowlistSpec, ProjectMetadataSpec};

    fn project() -> HarborProject {
        HarborProject {
            metadata: meta("team-a"),
            spec: HarborProjectSpec {
                connection_ref: "harbor".to_string(),
                adopt_existing: false,
                drift_detection_interval: None,
                name: "team-a".to_string(),
                public: false,
                owner: None,
                metadata: Some(ProjectMetadataSpec {
                    auto_scan: Some(true),
                    severity: Some("High".to_string()),
                    ..Default::default()
                }),
                cve_allowlist: Some(CveAllowlistSpec {
                    items: vec!["CVE-2024-0002".to_string(), "CVE-2024-0001".to_string()],
                    expires_at: None,
                }),
                storage_limit: Some(10_737_418_240),
                registry_name: None,
            },
            status: None,
        }
    }

    fn remote(payload: &ProjectReq) -> Project {
        Project {
            project_id: 3,
            name: "team-a".to_string(),
            owner_name: Some("admin".to_string()),
            metadata: ProjectMetadata {
                public: Some("false".to_string()),
                auto_scan: Some("true".to_string()),
                severity: Some("high".to_string()),
                ..Default::default()
            },
            cve_allowlist: payload.cve_allowlist.clone().map(|mut l| {
                l.items.reverse();
                l
            }),
            registry_id: None,
        }
    }

    #[test]
    fn test_payload_formats_flags() {
        let payload = project_payload(&project().spec, Some(4));

        insta::assert_json_snapshot!(payload, @r#"
        {
          "project_name": "team-a",
          "public": false,
          "metadata": {
            "public": "false",
            "auto_scan": "true",
            "severity": "high"
          },
          "cve_allowlist": {
            "items": [
              {
                "cve_id": "CVE-2024-0002"
              },
              {
                "cve_id": "CVE-2024-0001"
              }
            ]
          },
          "storage_limit": 10737418240,
          "registry_id": 4
        }
        "#);
    }

    #[test]
    fn test_diff_in_sync() {
        let obj = project();
        let payload = project_payload(&obj.spec, None);
        assert!(obj.diff(&payload, &remote(&payload)).is_empty());
    }

    #[test]
    fn test_diff_detects_flag_and_allowlist_drift() {
        let obj = project();
        let payload = project_payload(&obj.spec, None);
        let mut drifted = remote(&payload);
        drifted.metadata.auto_scan = Some("false".to_string());
        drifted.cve_allowlist = None;

        let fields: Vec<&str> = obj.diff(&payload, &drifted).iter().map(|c| c.field).collect();
        assert_eq!(fields, vec!["auto_scan", "cve_allowlist.items"]);
    }

    #[test]
    fn test_undeclared_flags_are_server_managed() {
        let mut obj = project();
        obj.spec.metadata = None;
        obj.spec.cve_allowlist = None;
        let payload = project_payload(&obj.spec, None);

        let mut observed = remote(&payload);
        observed.metadata.severity = Some("critical".to_string());
        observed.metadata.enable_content_trust = Some("true".to_string());

        assert!(obj.diff(&payload, &observed).is_empty());
    }

    #[test]
    fn test_validate() {
        let mut obj = project();
        assert!(obj.validate().is_ok());

        obj.spec.storage_limit = Some(-2);
        assert_eq!(obj.validate().unwrap_err().reason(), "InvalidSpec");

        obj.spec.storage_limit = Some(-1);
        obj.spec.metadata = Some(ProjectMetadataSpec {
            severity: Some("severe".to_string()),
            ..Default::default()
        });
        assert!(obj.validate().unwrap_err().to_string().contains("severe"));
    }
}
